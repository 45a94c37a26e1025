//! Power-Matrix Disk Cache
//!
//! Computed matrix powers are expensive for a 741-state space, so they
//! are cached on disk. Entries are keyed by the transition matrix's
//! content fingerprint *and* the horizon: `<dir>/<fp prefix>/pow_<n>.bin`.
//! Two differently-trained models can therefore share one cache
//! directory without ever serving each other stale powers.
//!
//! Uses the same record framing as model persistence (MessagePack, LZ4,
//! SHA-256 checksum) and the same atomic temp-file writes, so racing
//! writers of the same entry are benign.

use std::path::{Path, PathBuf};

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::persist::error::PersistError;
use crate::persist::format::{decode_record, encode_record, matrix_to_row_major};
use crate::persist::store::write_atomic;

/// Bumped whenever the cache record layout changes incompatibly
pub const POWER_VERSION: u32 = 1;

/// Directory prefix length taken from the 64-char fingerprint
const FP_PREFIX_LEN: usize = 16;

#[derive(Serialize, Deserialize, Debug)]
struct PowerRecord {
    version: u32,
    horizon: u32,
    dim: usize,
    /// Row-major `dim × dim` power matrix
    data: Vec<f64>,
}

/// On-disk cache of transition-matrix powers
#[derive(Debug, Clone)]
pub struct PowerCache {
    dir: PathBuf,
}

impl PowerCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, fingerprint: &str, horizon: u32) -> PathBuf {
        let prefix = &fingerprint[..FP_PREFIX_LEN.min(fingerprint.len())];
        self.dir.join(prefix).join(format!("pow_{}.bin", horizon))
    }

    /// Fetch a cached power; `Ok(None)` when no entry exists. A present
    /// but unreadable entry is an error — the caller decides whether to
    /// degrade to recomputation.
    pub fn load(&self, fingerprint: &str, horizon: u32) -> Result<Option<DMatrix<f64>>, PersistError> {
        let path = self.entry_path(fingerprint, horizon);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&path)?;
        let record: PowerRecord = decode_record(&bytes)?;
        if record.version > POWER_VERSION
            || record.horizon != horizon
            || record.data.len() != record.dim * record.dim
        {
            return Err(PersistError::Corrupted);
        }

        log::debug!("Power cache hit: horizon {} from {}", horizon, path.display());
        Ok(Some(DMatrix::from_row_slice(record.dim, record.dim, &record.data)))
    }

    /// Store a computed power atomically
    pub fn store(
        &self,
        fingerprint: &str,
        horizon: u32,
        matrix: &DMatrix<f64>,
    ) -> Result<(), PersistError> {
        let record = PowerRecord {
            version: POWER_VERSION,
            horizon,
            dim: matrix.nrows(),
            data: matrix_to_row_major(matrix),
        };
        let bytes = encode_record(&record)?;
        let path = self.entry_path(fingerprint, horizon);
        write_atomic(&path, &bytes)?;

        log::debug!("Power cache store: horizon {} to {}", horizon, path.display());
        Ok(())
    }
}
