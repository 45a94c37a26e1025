//! Model Artifact Format
//!
//! One [`ModelSnapshot`] captures everything needed to reconstruct a
//! model: the matrix (raw counts or normalized probabilities, told
//! apart by the `normalized` flag), the full state-to-index mapping,
//! and the dropped-pair counter. The mapping is persisted verbatim so a
//! loaded model keeps the exact indices it was trained with even if the
//! enumeration rules change in a later build.
//!
//! On-disk framing: MessagePack with field names, LZ4 compression with
//! prepended size, trailing SHA-256 checksum.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use nalgebra::DMatrix;
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

use super::error::PersistError;
use crate::chain::{GameModel, TransitionCounts, TransitionMatrix};
use crate::state::{GameState, StateSpace};

/// Bumped whenever the snapshot layout changes incompatibly
pub const MODEL_VERSION: u32 = 1;

const CHECKSUM_LEN: usize = 32;

/// Serialized form of a model (trained or raw)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModelSnapshot {
    /// Snapshot format version for migration
    pub version: u32,

    /// Whether `matrix` holds row-stochastic probabilities (true) or
    /// raw transition counts (false)
    pub normalized: bool,

    /// State space dimension `N`
    pub dim: usize,

    /// Row-major `N × N` matrix
    pub matrix: Vec<f64>,

    /// State-to-index mapping; a state's index is its position here
    pub states: Vec<GameState>,

    /// Transition pairs dropped during accumulation
    pub dropped: u64,
}

/// What a snapshot turns back into, depending on its `normalized` flag
#[derive(Debug)]
pub enum RestoredModel {
    /// Raw counts, ready for further accumulation
    Counts(GameModel),
    /// Trained matrix, ready for propagation
    Trained { space: StateSpace, matrix: TransitionMatrix, dropped: u64 },
}

impl ModelSnapshot {
    /// Capture a model's raw counts
    pub fn from_model(model: &GameModel) -> Self {
        Self {
            version: MODEL_VERSION,
            normalized: false,
            dim: model.space().len(),
            matrix: matrix_to_row_major(model.counts().counts()),
            states: model.space().entries().to_vec(),
            dropped: model.dropped_transitions(),
        }
    }

    /// Capture a trained (normalized) matrix
    pub fn from_trained(space: &StateSpace, matrix: &TransitionMatrix, dropped: u64) -> Self {
        Self {
            version: MODEL_VERSION,
            normalized: true,
            dim: space.len(),
            matrix: matrix_to_row_major(matrix.probs()),
            states: space.entries().to_vec(),
            dropped,
        }
    }

    /// Reconstruct the model this snapshot captured
    pub fn restore(self) -> Result<RestoredModel, PersistError> {
        if self.states.len() != self.dim || self.matrix.len() != self.dim * self.dim {
            return Err(PersistError::Corrupted);
        }

        let space = StateSpace::from_entries(self.states)
            .map_err(|err| PersistError::StateMapping(err.to_string()))?;
        let matrix = DMatrix::from_row_slice(self.dim, self.dim, &self.matrix);

        if self.normalized {
            Ok(RestoredModel::Trained {
                space,
                matrix: TransitionMatrix::from_probs(matrix),
                dropped: self.dropped,
            })
        } else {
            let counts = TransitionCounts::from_parts(matrix, self.dropped);
            Ok(RestoredModel::Counts(GameModel::from_parts(space, counts)))
        }
    }
}

pub(crate) fn matrix_to_row_major(matrix: &DMatrix<f64>) -> Vec<f64> {
    let mut data = Vec::with_capacity(matrix.nrows() * matrix.ncols());
    for row in matrix.row_iter() {
        data.extend(row.iter().copied());
    }
    data
}

/// Serialize, compress, and append a SHA-256 checksum
pub fn encode_record<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistError> {
    let msgpack = to_vec_named(value)?;
    let compressed = compress_prepend_size(&msgpack);

    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Verify the checksum, decompress, and deserialize
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    // Minimum: LZ4 size header + checksum
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(PersistError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    if hasher.finalize().as_slice() != checksum_bytes {
        return Err(PersistError::ChecksumMismatch);
    }

    let msgpack =
        decompress_size_prepended(payload).map_err(|_| PersistError::Decompression)?;
    Ok(from_slice(&msgpack)?)
}
