//! Raw Transition Counts
//!
//! Mutable accumulator for observed state-to-state transitions. Turning
//! counts into probabilities is an explicit transformation producing a
//! separate [`TransitionMatrix`] value, so there is no "did I forget to
//! normalize" flag to keep in sync.

use nalgebra::DMatrix;

use super::matrix::TransitionMatrix;

/// Observed transition counts over an `N × N` state space
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCounts {
    counts: DMatrix<f64>,
    observed: u64,
    dropped: u64,
}

impl TransitionCounts {
    /// Zero-initialized counts for a `dim`-state space
    pub fn new(dim: usize) -> Self {
        Self { counts: DMatrix::zeros(dim, dim), observed: 0, dropped: 0 }
    }

    /// Matrix dimension `N`
    pub fn dim(&self) -> usize {
        self.counts.nrows()
    }

    /// Count accumulated for one ordered state pair
    pub fn count(&self, from: usize, to: usize) -> f64 {
        self.counts[(from, to)]
    }

    /// The raw count matrix
    pub fn counts(&self) -> &DMatrix<f64> {
        &self.counts
    }

    /// Transitions recorded so far, across all observed games
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Consecutive pairs silently dropped because at least one endpoint
    /// fell outside the state space
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub(crate) fn record(&mut self, from: usize, to: usize) {
        self.counts[(from, to)] += 1.0;
        self.observed += 1;
    }

    pub(crate) fn drop_pair(&mut self) {
        self.dropped += 1;
    }

    /// Produce the row-stochastic transition matrix for these counts.
    ///
    /// Rows with a positive total are scaled to sum to exactly 1; rows
    /// never observed stay identically zero. Mass propagated into such
    /// a row later vanishes — that is expected, not repaired here.
    pub fn normalized(&self) -> TransitionMatrix {
        let mut probs = self.counts.clone();
        for mut row in probs.row_iter_mut() {
            let total: f64 = row.sum();
            if total > 0.0 {
                row /= total;
            }
        }
        TransitionMatrix::from_probs(probs)
    }

    pub(crate) fn from_parts(counts: DMatrix<f64>, dropped: u64) -> Self {
        let observed = counts.sum() as u64;
        Self { counts, observed, dropped }
    }
}
