//! # puckcast_core — Hockey Win-Probability Markov Engine
//!
//! Estimates, at every 10-second tick of regulation play, the
//! probability that a game ends with the home team ahead, behind, or
//! tied, via a discrete-time Markov chain over (score differential,
//! manpower situation, zone) states.
//!
//! ## Pipeline
//! 1. An external discretizer turns play-by-play into per-tick
//!    [`GameState`] sequences (up to 360 ticks per game).
//! 2. [`GameModel::observe_game`] accumulates transition counts.
//! 3. [`GameModel::normalized`] produces an immutable row-stochastic
//!    [`TransitionMatrix`].
//! 4. [`Propagator::propagate`] computes n-step-ahead distributions,
//!    with matrix powers memoized and optionally disk-cached.
//! 5. [`persist`] saves and loads the trained model as one atomic unit.
//!
//! Parsing play-by-play, network I/O, and visualization live outside
//! this crate.

// Method naming follows the feed vocabulary (from_str/from_code) rather
// than the std trait spellings
#![allow(clippy::should_implement_trait)]

pub mod chain;
pub mod error;
pub mod persist;
pub mod state;

pub use chain::{GameModel, PowerCache, Propagator, TransitionCounts, TransitionMatrix};
pub use error::{ChainError, Result};
pub use persist::{load_model, save_model, ModelSnapshot, PersistError, RestoredModel};
pub use state::{
    GameState, Outcome, OutcomeProbabilities, SituationCode, StateSpace, Zone, SCORE_CLIP,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    /// Full-pipeline smoke test over the real 741-state domain
    #[test]
    fn test_train_and_forecast_pipeline() {
        let mut model = GameModel::new();

        // A short tied game that ends with the home team up one
        let game = vec![
            GameState::new(0, 1551, Zone::Neutral),
            GameState::new(0, 1551, Zone::Offensive),
            GameState::new(1, 1551, Zone::Neutral),
            GameState::new(1, 1541, Zone::Defensive),
            GameState::new(1, 1551, Zone::Neutral),
        ];
        model.observe_game(&game);
        assert_eq!(model.observed_transitions(), 4);

        let mut propagator = Propagator::new(model.space().clone(), model.normalized());
        let probs = propagator
            .forecast(&GameState::new(0, 1551, Zone::Neutral), 4)
            .unwrap();

        // All observed paths lead to a home lead within 4 ticks
        assert!(probs.home_win > 0.0);
        assert!(probs.total() <= 1.0 + 1e-9);
    }
}
