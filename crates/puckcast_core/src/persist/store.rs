//! Model Save/Load
//!
//! Atomic file persistence for [`ModelSnapshot`]: write to a temp file,
//! fsync, rename into place. Load failures are fatal and surfaced to
//! the caller; no recovery is attempted.

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

use super::error::PersistError;
use super::format::{decode_record, encode_record, ModelSnapshot, MODEL_VERSION};

/// Serialize a snapshot to `path` as one atomic unit
pub fn save_model(path: &Path, snapshot: &ModelSnapshot) -> Result<(), PersistError> {
    let data = encode_record(snapshot)?;
    write_atomic(path, &data)?;
    log::info!("Model saved to {} ({} bytes)", path.display(), data.len());
    Ok(())
}

/// Read a snapshot back from `path`
pub fn load_model(path: &Path) -> Result<ModelSnapshot, PersistError> {
    if !path.exists() {
        return Err(PersistError::FileNotFound { path: path.display().to_string() });
    }

    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let snapshot: ModelSnapshot = decode_record(&data)?;
    if snapshot.version > MODEL_VERSION {
        return Err(PersistError::VersionMismatch {
            found: snapshot.version,
            expected: MODEL_VERSION,
        });
    }

    log::debug!("Loaded {} bytes from {}", data.len(), path.display());
    Ok(snapshot)
}

/// Write bytes to a temp file, sync, then rename over the destination.
/// Concurrent writers of identical content race benignly: whichever
/// rename lands last leaves the same bytes in place.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.flush()?;

        // sync_all ensures data is on disk before the rename (portable fsync)
        file.sync_all()?;
    }
    rename(&temp_path, path)?;

    log::debug!("Saved {} bytes to {}", data.len(), path.display());
    Ok(())
}
