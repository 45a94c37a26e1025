//! Game State Definitions
//!
//! A game state is the triple (score differential, situation code, zone)
//! sampled every 10 seconds of regulation play. Score differentials are
//! taken from the home team's perspective and saturate at ±6; situation
//! codes are the 19 NHL manpower configurations the model recognizes;
//! zones are a coarse puck location relative to the home team.

use serde::{Deserialize, Serialize};

pub mod space;

pub use space::{SpaceError, StateSpace};

/// Score differentials saturate at this bound (home goals minus away goals).
pub const SCORE_CLIP: i32 = 6;

/// Number of distinct score differential values (-6 ..= 6).
pub const SCORE_VALUES: usize = (2 * SCORE_CLIP + 1) as usize;

/// Coarse puck location relative to the home team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Home team's attacking third
    Offensive,
    /// Between the blue lines
    Neutral,
    /// Home team's defending third
    Defensive,
}

impl Zone {
    /// All zones in enumeration order
    pub const ALL: [Zone; 3] = [Zone::Offensive, Zone::Neutral, Zone::Defensive];

    /// Get zone index (0-2)
    pub fn index(&self) -> usize {
        match self {
            Zone::Offensive => 0,
            Zone::Neutral => 1,
            Zone::Defensive => 2,
        }
    }

    /// Create from index
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Get the single-letter wire symbol used by the play-by-play discretizer
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Offensive => "O",
            Zone::Neutral => "N",
            Zone::Defensive => "D",
        }
    }

    /// Parse from the wire symbol
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "O" => Some(Zone::Offensive),
            "N" => Some(Zone::Neutral),
            "D" => Some(Zone::Defensive),
            _ => None,
        }
    }
}

/// Manpower/strength configuration identifier.
///
/// The numeric codes follow the play-by-play feed with digit order
/// `[home goalie][home skaters][away skaters][away goalie]` and any
/// leading zero dropped, so e.g. `641` is the home team playing with an
/// extra attacker (no goalie, six skaters) against four skaters.
/// Variant names read `<situation><home skaters>v<away skaters>` from
/// the home team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SituationCode {
    HomeEmptyNet6v4,
    AwayEmptyNet4v6,
    HomeEmptyNet6v5,
    AwayEmptyNet5v6,
    PowerPlay5v4,
    ShortHanded4v5,
    Even5v5,
    AwayEmptyNet5v5,
    HomeEmptyNet5v5,
    PowerPlay5v3,
    ShortHanded3v5,
    HomeEmptyNet5v4,
    AwayEmptyNet4v5,
    HomeEmptyNet5v3,
    AwayEmptyNet3v5,
    Even4v4,
    PowerPlay4v3,
    ShortHanded3v4,
    Even3v3,
}

impl SituationCode {
    /// All 19 recognized situations in enumeration order
    pub const ALL: [SituationCode; 19] = [
        SituationCode::HomeEmptyNet6v4,
        SituationCode::AwayEmptyNet4v6,
        SituationCode::HomeEmptyNet6v5,
        SituationCode::AwayEmptyNet5v6,
        SituationCode::PowerPlay5v4,
        SituationCode::ShortHanded4v5,
        SituationCode::Even5v5,
        SituationCode::AwayEmptyNet5v5,
        SituationCode::HomeEmptyNet5v5,
        SituationCode::PowerPlay5v3,
        SituationCode::ShortHanded3v5,
        SituationCode::HomeEmptyNet5v4,
        SituationCode::AwayEmptyNet4v5,
        SituationCode::HomeEmptyNet5v3,
        SituationCode::AwayEmptyNet3v5,
        SituationCode::Even4v4,
        SituationCode::PowerPlay4v3,
        SituationCode::ShortHanded3v4,
        SituationCode::Even3v3,
    ];

    /// Get the numeric feed code
    pub fn code(&self) -> u16 {
        match self {
            SituationCode::HomeEmptyNet6v4 => 641,
            SituationCode::AwayEmptyNet4v6 => 1460,
            SituationCode::HomeEmptyNet6v5 => 651,
            SituationCode::AwayEmptyNet5v6 => 1560,
            SituationCode::PowerPlay5v4 => 1541,
            SituationCode::ShortHanded4v5 => 1451,
            SituationCode::Even5v5 => 1551,
            SituationCode::AwayEmptyNet5v5 => 1550,
            SituationCode::HomeEmptyNet5v5 => 551,
            SituationCode::PowerPlay5v3 => 1531,
            SituationCode::ShortHanded3v5 => 1351,
            SituationCode::HomeEmptyNet5v4 => 541,
            SituationCode::AwayEmptyNet4v5 => 1450,
            SituationCode::HomeEmptyNet5v3 => 531,
            SituationCode::AwayEmptyNet3v5 => 1350,
            SituationCode::Even4v4 => 1441,
            SituationCode::PowerPlay4v3 => 1431,
            SituationCode::ShortHanded3v4 => 1341,
            SituationCode::Even3v3 => 1331,
        }
    }

    /// Resolve a numeric feed code; `None` for anything outside the
    /// recognized set
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            641 => Some(SituationCode::HomeEmptyNet6v4),
            1460 => Some(SituationCode::AwayEmptyNet4v6),
            651 => Some(SituationCode::HomeEmptyNet6v5),
            1560 => Some(SituationCode::AwayEmptyNet5v6),
            1541 => Some(SituationCode::PowerPlay5v4),
            1451 => Some(SituationCode::ShortHanded4v5),
            1551 => Some(SituationCode::Even5v5),
            1550 => Some(SituationCode::AwayEmptyNet5v5),
            551 => Some(SituationCode::HomeEmptyNet5v5),
            1531 => Some(SituationCode::PowerPlay5v3),
            1351 => Some(SituationCode::ShortHanded3v5),
            541 => Some(SituationCode::HomeEmptyNet5v4),
            1450 => Some(SituationCode::AwayEmptyNet4v5),
            531 => Some(SituationCode::HomeEmptyNet5v3),
            1350 => Some(SituationCode::AwayEmptyNet3v5),
            1441 => Some(SituationCode::Even4v4),
            1431 => Some(SituationCode::PowerPlay4v3),
            1341 => Some(SituationCode::ShortHanded3v4),
            1331 => Some(SituationCode::Even3v3),
            _ => None,
        }
    }

    /// Get the string ID (for display and logs)
    pub fn as_str(&self) -> &'static str {
        match self {
            SituationCode::HomeEmptyNet6v4 => "HOME_EN_6V4",
            SituationCode::AwayEmptyNet4v6 => "AWAY_EN_4V6",
            SituationCode::HomeEmptyNet6v5 => "HOME_EN_6V5",
            SituationCode::AwayEmptyNet5v6 => "AWAY_EN_5V6",
            SituationCode::PowerPlay5v4 => "PP_5V4",
            SituationCode::ShortHanded4v5 => "SH_4V5",
            SituationCode::Even5v5 => "EV_5V5",
            SituationCode::AwayEmptyNet5v5 => "AWAY_EN_5V5",
            SituationCode::HomeEmptyNet5v5 => "HOME_EN_5V5",
            SituationCode::PowerPlay5v3 => "PP_5V3",
            SituationCode::ShortHanded3v5 => "SH_3V5",
            SituationCode::HomeEmptyNet5v4 => "HOME_EN_5V4",
            SituationCode::AwayEmptyNet4v5 => "AWAY_EN_4V5",
            SituationCode::HomeEmptyNet5v3 => "HOME_EN_5V3",
            SituationCode::AwayEmptyNet3v5 => "AWAY_EN_3V5",
            SituationCode::Even4v4 => "EV_4V4",
            SituationCode::PowerPlay4v3 => "PP_4V3",
            SituationCode::ShortHanded3v4 => "SH_3V4",
            SituationCode::Even3v3 => "EV_3V3",
        }
    }

    /// Is one of the nets empty?
    pub fn is_empty_net(&self) -> bool {
        matches!(
            self,
            SituationCode::HomeEmptyNet6v4
                | SituationCode::HomeEmptyNet6v5
                | SituationCode::HomeEmptyNet5v5
                | SituationCode::HomeEmptyNet5v4
                | SituationCode::HomeEmptyNet5v3
                | SituationCode::AwayEmptyNet4v6
                | SituationCode::AwayEmptyNet5v6
                | SituationCode::AwayEmptyNet5v5
                | SituationCode::AwayEmptyNet4v5
                | SituationCode::AwayEmptyNet3v5
        )
    }
}

/// One per-tick game state as supplied by the play-by-play discretizer.
///
/// The situation field deliberately stays the raw feed code rather than
/// [`SituationCode`]: external sequences may carry codes outside the
/// recognized set, and those must be representable so that transition
/// accumulation can drop them silently instead of failing upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    /// Home goals minus away goals
    pub score: i32,
    /// Raw manpower code from the feed
    pub situation: u16,
    /// Puck location relative to the home team
    pub zone: Zone,
}

impl GameState {
    pub fn new(score: i32, situation: u16, zone: Zone) -> Self {
        Self { score, situation, zone }
    }

    /// Build a state with the score saturated into `[-SCORE_CLIP, SCORE_CLIP]`,
    /// matching the discretizer's clipping of blowout scores
    pub fn clamped(score: i32, situation: u16, zone: Zone) -> Self {
        Self { score: score.clamp(-SCORE_CLIP, SCORE_CLIP), situation, zone }
    }
}

/// Final result of a game from the home team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    AwayWin,
    Draw,
    HomeWin,
}

impl Outcome {
    /// All outcomes, ordered by increasing score differential block
    pub const ALL: [Outcome; 3] = [Outcome::AwayWin, Outcome::Draw, Outcome::HomeWin];

    /// Outcome implied by a final score differential
    pub fn of_score(score: i32) -> Self {
        match score {
            s if s < 0 => Outcome::AwayWin,
            0 => Outcome::Draw,
            _ => Outcome::HomeWin,
        }
    }
}

/// Three-way outcome distribution derived from a propagated state vector.
///
/// The components sum to at most 1.0: probability mass that reaches a
/// never-observed state vanishes rather than being redistributed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeProbabilities {
    pub away_win: f64,
    pub draw: f64,
    pub home_win: f64,
}

impl OutcomeProbabilities {
    /// Total mass across the three outcomes
    pub fn total(&self) -> f64 {
        self.away_win + self.draw + self.home_win
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_roundtrip() {
        for zone in Zone::ALL {
            assert_eq!(Zone::from_index(zone.index()), Some(zone));
            assert_eq!(Zone::from_str(zone.as_str()), Some(zone));
        }
        assert_eq!(Zone::from_index(3), None);
        assert_eq!(Zone::from_str("X"), None);
    }

    #[test]
    fn test_situation_code_roundtrip() {
        for situation in SituationCode::ALL {
            assert_eq!(SituationCode::from_code(situation.code()), Some(situation));
        }
        assert_eq!(SituationCode::from_code(0), None);
        assert_eq!(SituationCode::from_code(1552), None);
    }

    #[test]
    fn test_situation_codes_unique() {
        let mut seen = std::collections::HashSet::new();
        for situation in SituationCode::ALL {
            assert!(seen.insert(situation.code()), "Duplicate code for {:?}", situation);
        }
        assert_eq!(seen.len(), 19);
    }

    #[test]
    fn test_empty_net_count() {
        let empty: Vec<_> = SituationCode::ALL.iter().filter(|s| s.is_empty_net()).collect();
        assert_eq!(empty.len(), 10); // 5 home + 5 away configurations
    }

    #[test]
    fn test_score_clamping() {
        assert_eq!(GameState::clamped(9, 1551, Zone::Neutral).score, SCORE_CLIP);
        assert_eq!(GameState::clamped(-11, 1551, Zone::Neutral).score, -SCORE_CLIP);
        assert_eq!(GameState::clamped(2, 1551, Zone::Neutral).score, 2);
    }

    #[test]
    fn test_outcome_of_score() {
        assert_eq!(Outcome::of_score(-3), Outcome::AwayWin);
        assert_eq!(Outcome::of_score(0), Outcome::Draw);
        assert_eq!(Outcome::of_score(1), Outcome::HomeWin);
    }
}
