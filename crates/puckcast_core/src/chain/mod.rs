//! Markov Chain Engine
//!
//! Accumulates per-game state sequences into transition counts,
//! normalizes them into a row-stochastic matrix, and propagates
//! distributions forward through cached matrix powers.

pub mod cache;
pub mod counts;
pub mod matrix;
pub mod propagate;

pub use cache::{PowerCache, POWER_VERSION};
pub use counts::TransitionCounts;
pub use matrix::TransitionMatrix;
pub use propagate::Propagator;

use crate::state::{GameState, StateSpace};

/// State space plus the transition counts accumulated over it.
///
/// The training entry point: feed it discretized game sequences with
/// [`GameModel::observe_game`], then take an immutable normalized
/// matrix with [`GameModel::normalized`] for propagation.
#[derive(Debug, Clone)]
pub struct GameModel {
    space: StateSpace,
    counts: TransitionCounts,
}

impl Default for GameModel {
    fn default() -> Self {
        Self::new()
    }
}

impl GameModel {
    /// Model over the full 741-state hockey domain
    pub fn new() -> Self {
        Self::with_space(StateSpace::new())
    }

    /// Model over a caller-supplied state space
    pub fn with_space(space: StateSpace) -> Self {
        let counts = TransitionCounts::new(space.len());
        Self { space, counts }
    }

    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    pub fn counts(&self) -> &TransitionCounts {
        &self.counts
    }

    /// Accumulate every consecutive state pair of one played-out game.
    ///
    /// Pairs with an endpoint outside the state space (unrecognized
    /// situation code, saturated-out score) are dropped silently —
    /// partially-invalid telemetry is tolerated at the cost of
    /// undercounting — but the drop is tallied for observability.
    /// Games may be fed in any order; counts are additive across calls.
    pub fn observe_game(&mut self, ticks: &[GameState]) {
        for pair in ticks.windows(2) {
            match (self.space.index_of(&pair[0]), self.space.index_of(&pair[1])) {
                (Some(from), Some(to)) => self.counts.record(from, to),
                _ => self.counts.drop_pair(),
            }
        }
    }

    /// Transitions recorded across all observed games
    pub fn observed_transitions(&self) -> u64 {
        self.counts.observed()
    }

    /// Pairs dropped because an endpoint was outside the state space
    pub fn dropped_transitions(&self) -> u64 {
        self.counts.dropped()
    }

    /// Produce the row-stochastic matrix for the current counts
    pub fn normalized(&self) -> TransitionMatrix {
        self.counts.normalized()
    }

    pub(crate) fn from_parts(space: StateSpace, counts: TransitionCounts) -> Self {
        Self { space, counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Zone;

    fn seq(states: &[(i32, u16)]) -> Vec<GameState> {
        states.iter().map(|&(score, sit)| GameState::new(score, sit, Zone::Neutral)).collect()
    }

    #[test]
    fn test_observe_counts_consecutive_pairs() {
        let mut model = GameModel::new();
        let game = seq(&[(0, 1551), (0, 1551), (1, 1551)]);
        model.observe_game(&game);

        let i0 = model.space().index_of(&game[0]).unwrap();
        let i2 = model.space().index_of(&game[2]).unwrap();
        assert_eq!(model.counts().count(i0, i0), 1.0);
        assert_eq!(model.counts().count(i0, i2), 1.0);
        assert_eq!(model.observed_transitions(), 2);
        assert_eq!(model.dropped_transitions(), 0);
    }

    #[test]
    fn test_invalid_pairs_dropped_and_tallied() {
        let mut model = GameModel::new();
        // 9999 is not a recognized situation code: both pairs touching
        // it are dropped, the surrounding valid pair is kept
        let game = seq(&[(0, 1551), (0, 9999), (0, 1551), (1, 1551)]);
        model.observe_game(&game);

        assert_eq!(model.observed_transitions(), 1);
        assert_eq!(model.dropped_transitions(), 2);
    }

    #[test]
    fn test_accumulation_commutes_across_games() {
        let game_a = seq(&[(0, 1551), (1, 1541), (1, 1551)]);
        let game_b = seq(&[(0, 1441), (0, 1551), (-1, 1551)]);

        let mut forward = GameModel::new();
        forward.observe_game(&game_a);
        forward.observe_game(&game_b);

        let mut reverse = GameModel::new();
        reverse.observe_game(&game_b);
        reverse.observe_game(&game_a);

        assert_eq!(forward.counts(), reverse.counts());
    }

    #[test]
    fn test_order_within_game_matters() {
        let mut model = GameModel::new();
        let game = seq(&[(0, 1551), (1, 1551)]);
        model.observe_game(&game);

        let i0 = model.space().index_of(&game[0]).unwrap();
        let i1 = model.space().index_of(&game[1]).unwrap();
        assert_eq!(model.counts().count(i0, i1), 1.0);
        assert_eq!(model.counts().count(i1, i0), 0.0);
    }

    #[test]
    fn test_empty_and_single_tick_games_are_noops() {
        let mut model = GameModel::new();
        model.observe_game(&[]);
        model.observe_game(&seq(&[(0, 1551)]));
        assert_eq!(model.observed_transitions(), 0);
        assert_eq!(model.dropped_transitions(), 0);
    }

    #[test]
    fn test_normalized_rows_are_stochastic() {
        let mut model = GameModel::new();
        for _ in 0..3 {
            model.observe_game(&seq(&[(0, 1551), (0, 1441), (1, 1551), (1, 1541)]));
        }
        let matrix = model.normalized();

        for row in 0..matrix.dim() {
            let sum = matrix.row_sum(row);
            assert!(
                sum == 0.0 || (sum - 1.0).abs() < 1e-9,
                "row {} sums to {}",
                row,
                sum
            );
        }
    }
}
