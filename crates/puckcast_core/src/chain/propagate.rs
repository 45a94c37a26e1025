//! N-Step Propagation
//!
//! Given a starting state and a horizon of `n` 10-second ticks, compute
//! the distribution over all states exactly `n` transitions later:
//! build a one-hot vector at the starting index and right-multiply it
//! against `M^n`. Powers are memoized in memory and optionally in a
//! fingerprint-scoped disk cache.
//!
//! Total mass can fall below 1.0 when paths reach never-observed states
//! (zero rows): that mass vanishes and is deliberately not
//! redistributed.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};

use super::cache::PowerCache;
use super::matrix::TransitionMatrix;
use crate::error::{ChainError, Result};
use crate::state::{GameState, OutcomeProbabilities, StateSpace};

/// Forward propagation over a trained transition matrix
#[derive(Debug)]
pub struct Propagator {
    space: StateSpace,
    matrix: TransitionMatrix,
    memo: HashMap<u32, DMatrix<f64>>,
    cache: Option<PowerCache>,
}

impl Propagator {
    /// Memory-only propagator
    pub fn new(space: StateSpace, matrix: TransitionMatrix) -> Self {
        Self { space, matrix, memo: HashMap::new(), cache: None }
    }

    /// Propagator backed by an on-disk power cache
    pub fn with_cache(space: StateSpace, matrix: TransitionMatrix, cache: PowerCache) -> Self {
        Self { space, matrix, memo: HashMap::new(), cache: Some(cache) }
    }

    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    pub fn matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }

    /// Distribution over all states after exactly `steps` transitions
    /// from `start`.
    ///
    /// An unresolvable start state is the one fatal input error in the
    /// core: the whole query is meaningless without a valid one-hot
    /// origin. `steps == 0` returns that one-hot vector unchanged.
    pub fn propagate(&mut self, start: &GameState, steps: u32) -> Result<DVector<f64>> {
        let idx = self.space.index_of(start).ok_or(ChainError::UnknownState(*start))?;

        let mut one_hot = DVector::zeros(self.matrix.dim());
        one_hot[idx] = 1.0;
        if steps == 0 {
            return Ok(one_hot);
        }

        let power = self.power(steps);
        Ok((one_hot.transpose() * power).transpose())
    }

    /// Propagate and aggregate into the 3-way outcome distribution
    pub fn forecast(&mut self, start: &GameState, steps: u32) -> Result<OutcomeProbabilities> {
        let distribution = self.propagate(start, steps)?;
        Ok(self.space.outcome_probabilities(&distribution))
    }

    fn power(&mut self, steps: u32) -> &DMatrix<f64> {
        if !self.memo.contains_key(&steps) {
            let power = match self.cached_power(steps) {
                Some(power) => power,
                None => {
                    let power = self.matrix.power(steps);
                    self.store_power(steps, &power);
                    power
                }
            };
            self.memo.insert(steps, power);
        }
        &self.memo[&steps]
    }

    /// Disk lookup; any read failure degrades to a recompute, the cache
    /// is an optimization rather than a source of truth
    fn cached_power(&self, steps: u32) -> Option<DMatrix<f64>> {
        let cache = self.cache.as_ref()?;
        match cache.load(self.matrix.fingerprint(), steps) {
            Ok(hit) => hit.filter(|power| {
                if power.nrows() == self.matrix.dim() {
                    true
                } else {
                    log::warn!(
                        "Power cache entry for horizon {} has dimension {}, expected {}; recomputing",
                        steps,
                        power.nrows(),
                        self.matrix.dim()
                    );
                    false
                }
            }),
            Err(err) => {
                log::warn!("Power cache read failed for horizon {}: {}; recomputing", steps, err);
                None
            }
        }
    }

    fn store_power(&self, steps: u32, power: &DMatrix<f64>) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.store(self.matrix.fingerprint(), steps, power) {
                log::warn!("Power cache write failed for horizon {}: {}", steps, err);
            }
        }
    }
}
