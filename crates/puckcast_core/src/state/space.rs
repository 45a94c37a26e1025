//! State Space
//!
//! Bijective mapping between every recognized (score, situation, zone)
//! triple and a dense index in `[0, N)`, `N = 13 × 19 × 3 = 741`.
//!
//! The enumeration is score-major: all states sharing a score
//! differential occupy one contiguous index block, and blocks are
//! ordered by increasing score. Consumers aggregate final-state
//! probability mass into the three outcomes by summing over those
//! blocks, so the block layout is part of the public contract here
//! rather than caller knowledge — see [`StateSpace::outcome_range`].

use std::collections::HashMap;
use std::ops::Range;

use nalgebra::DVector;
use thiserror::Error;

use super::{GameState, Outcome, OutcomeProbabilities, SituationCode, Zone, SCORE_CLIP};

/// Mapping validation failure when restoring a persisted state space
#[derive(Error, Debug)]
pub enum SpaceError {
    #[error("state mapping is empty")]
    Empty,

    #[error("duplicate state {0:?} in mapping")]
    DuplicateState(GameState),

    #[error("score {0} occupies a non-contiguous index block")]
    BrokenBlock(i32),
}

/// Immutable enumeration of the full state domain
#[derive(Debug, Clone)]
pub struct StateSpace {
    index: HashMap<(i32, u16, Zone), usize>,
    entries: Vec<GameState>,
    /// Score blocks in ascending score order, covering `[0, N)`
    blocks: Vec<(i32, Range<usize>)>,
}

impl Default for StateSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl StateSpace {
    /// Enumerate the full domain: scores `-6..=6`, the 19 situations in
    /// declaration order, the 3 zones in declaration order
    pub fn new() -> Self {
        let mut entries =
            Vec::with_capacity(super::SCORE_VALUES * SituationCode::ALL.len() * Zone::ALL.len());
        for score in -SCORE_CLIP..=SCORE_CLIP {
            for situation in SituationCode::ALL {
                for zone in Zone::ALL {
                    entries.push(GameState::new(score, situation.code(), zone));
                }
            }
        }
        // The generated enumeration is a bijection by construction
        Self::from_entries(entries).expect("generated enumeration is a valid bijection")
    }

    /// Rebuild a state space from an explicitly persisted entry list,
    /// where each entry's index is its position. The list is validated
    /// as a bijection with contiguous score blocks; it is not required
    /// to match what [`StateSpace::new`] would currently generate, so
    /// saved models stay loadable if the enumeration rules evolve.
    pub fn from_entries(entries: Vec<GameState>) -> Result<Self, SpaceError> {
        if entries.is_empty() {
            return Err(SpaceError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (idx, state) in entries.iter().enumerate() {
            if index.insert((state.score, state.situation, state.zone), idx).is_some() {
                return Err(SpaceError::DuplicateState(*state));
            }
        }

        let mut blocks: Vec<(i32, Range<usize>)> = Vec::new();
        for (idx, state) in entries.iter().enumerate() {
            match blocks.last_mut() {
                Some((score, range)) if *score == state.score => range.end = idx + 1,
                _ => {
                    if blocks.iter().any(|(score, _)| *score == state.score) {
                        return Err(SpaceError::BrokenBlock(state.score));
                    }
                    blocks.push((state.score, idx..idx + 1));
                }
            }
        }
        if let Some(pair) = blocks.windows(2).find(|w| w[0].0 >= w[1].0) {
            return Err(SpaceError::BrokenBlock(pair[1].0));
        }

        Ok(Self { index, entries, blocks })
    }

    /// Number of states, `N`
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a state to its dense index.
    ///
    /// Total over arbitrary input: any triple outside the enumerated
    /// domain (saturated-out score, unrecognized situation code) yields
    /// `None` rather than an error, so callers feeding externally
    /// sourced telemetry decide how to handle the miss.
    pub fn index_of(&self, state: &GameState) -> Option<usize> {
        self.index.get(&(state.score, state.situation, state.zone)).copied()
    }

    /// Inverse lookup
    pub fn state_at(&self, idx: usize) -> Option<&GameState> {
        self.entries.get(idx)
    }

    /// The entry list in index order (persisted verbatim by snapshots)
    pub fn entries(&self) -> &[GameState] {
        &self.entries
    }

    /// Contiguous index block of all states with the given score
    pub fn score_block(&self, score: i32) -> Option<Range<usize>> {
        self.blocks.iter().find(|(s, _)| *s == score).map(|(_, range)| range.clone())
    }

    /// Contiguous index range whose states imply the given final outcome.
    ///
    /// The three ranges partition `[0, N)`: negative-score blocks, the
    /// zero block, then positive-score blocks.
    pub fn outcome_range(&self, outcome: Outcome) -> Range<usize> {
        let draw_start = self
            .blocks
            .iter()
            .find(|(score, _)| *score >= 0)
            .map(|(_, range)| range.start)
            .unwrap_or(self.len());
        let draw_end = self
            .blocks
            .iter()
            .find(|(score, _)| *score > 0)
            .map(|(_, range)| range.start)
            .unwrap_or(self.len());

        match outcome {
            Outcome::AwayWin => 0..draw_start,
            Outcome::Draw => draw_start..draw_end,
            Outcome::HomeWin => draw_end..self.len(),
        }
    }

    /// Outcome implied by ending the game in the state at `idx`
    pub fn outcome_of(&self, idx: usize) -> Option<Outcome> {
        self.entries.get(idx).map(|state| Outcome::of_score(state.score))
    }

    /// Aggregate a propagated distribution into the three outcomes by
    /// summing over the outcome blocks
    pub fn outcome_probabilities(&self, distribution: &DVector<f64>) -> OutcomeProbabilities {
        let mass = |range: Range<usize>| distribution.rows(range.start, range.len()).sum();
        OutcomeProbabilities {
            away_win: mass(self.outcome_range(Outcome::AwayWin)),
            draw: mass(self.outcome_range(Outcome::Draw)),
            home_win: mass(self.outcome_range(Outcome::HomeWin)),
        }
    }
}
