//! Row-Stochastic Transition Matrix
//!
//! Immutable value produced by [`TransitionCounts::normalized`]. Each
//! row either sums to 1.0 or is identically zero (never observed).
//! Carries a SHA-256 content fingerprint so that cached matrix powers
//! can be scoped to the exact matrix that produced them.

use nalgebra::DMatrix;
use sha2::{Digest, Sha256};

/// Normalized transition probabilities over an `N × N` state space
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    probs: DMatrix<f64>,
    fingerprint: String,
}

impl TransitionMatrix {
    pub(crate) fn from_probs(probs: DMatrix<f64>) -> Self {
        let fingerprint = fingerprint_of(&probs);
        Self { probs, fingerprint }
    }

    /// Matrix dimension `N`
    pub fn dim(&self) -> usize {
        self.probs.nrows()
    }

    /// The probability matrix
    pub fn probs(&self) -> &DMatrix<f64> {
        &self.probs
    }

    /// Hex SHA-256 over the matrix contents; two matrices share a
    /// fingerprint only if they are bitwise identical
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Total mass of one row (1.0 for observed rows, 0.0 for unvisited)
    pub fn row_sum(&self, row: usize) -> f64 {
        self.probs.row(row).sum()
    }

    /// `M^n` by exponentiation by squaring, `O(log n)` multiplications.
    ///
    /// `n == 0` yields the identity.
    pub fn power(&self, mut n: u32) -> DMatrix<f64> {
        let dim = self.dim();
        let mut result = DMatrix::identity(dim, dim);
        if n == 0 {
            return result;
        }
        let mut base = self.probs.clone();
        while n > 1 {
            if n & 1 == 1 {
                result = &result * &base;
            }
            base = &base * &base;
            n >>= 1;
        }
        &result * &base
    }
}

fn fingerprint_of(probs: &DMatrix<f64>) -> String {
    let mut hasher = Sha256::new();
    hasher.update((probs.nrows() as u64).to_le_bytes());
    hasher.update((probs.ncols() as u64).to_le_bytes());
    // Column-major iteration order, fixed by nalgebra's storage layout
    for value in probs.iter() {
        hasher.update(value.to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TransitionCounts;

    fn two_state_cycle() -> TransitionMatrix {
        let mut counts = TransitionCounts::new(2);
        counts.record(0, 1);
        counts.record(1, 0);
        counts.normalized()
    }

    #[test]
    fn test_power_zero_is_identity() {
        let matrix = two_state_cycle();
        assert_eq!(matrix.power(0), DMatrix::identity(2, 2));
    }

    #[test]
    fn test_power_matches_repeated_multiplication() {
        let mut counts = TransitionCounts::new(3);
        for (from, to) in [(0, 1), (0, 2), (1, 1), (1, 0), (2, 0), (0, 0)] {
            counts.record(from, to);
        }
        let matrix = counts.normalized();

        let mut expected = DMatrix::identity(3, 3);
        for n in 0..=9u32 {
            let fast = matrix.power(n);
            assert!(
                (&fast - &expected).abs().max() < 1e-12,
                "power {} diverged from naive product",
                n
            );
            expected = &expected * matrix.probs();
        }
    }

    #[test]
    fn test_cycle_powers_alternate() {
        let matrix = two_state_cycle();
        let even = matrix.power(2);
        let odd = matrix.power(3);
        assert!((even[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((odd[(0, 1)] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = two_state_cycle();
        let b = two_state_cycle();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let mut counts = TransitionCounts::new(2);
        counts.record(0, 0);
        let c = counts.normalized();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
