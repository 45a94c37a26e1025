//! Model Builder Library
//!
//! Discretized game files (JSON) → trained Markov model artifact.
//!
//! A game file holds the three parallel per-tick arrays the upstream
//! play-by-play discretizer emits: score differentials, situation
//! codes, and zone letters. Unrecognized situation codes flow through
//! into accumulation, where the core drops the affected pairs and
//! counts them; malformed zone letters or mismatched array lengths are
//! format errors and abort the build.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use puckcast_core::{
    save_model, GameModel, GameState, ModelSnapshot, Zone, VERSION as CORE_VERSION,
};

/// Parallel per-tick arrays for one game, as produced by the discretizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameFile {
    /// Score differential (home minus away) per 10-second tick
    pub goals: Vec<i32>,
    /// Raw situation code per tick
    pub situations: Vec<u16>,
    /// Zone letter per tick: "O", "N", or "D"
    pub zones: Vec<String>,
}

/// Metadata sidecar describing a trained model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    /// Core library version that produced the artifact
    pub core_version: String,
    /// SHA256 checksum of the artifact file (hex string)
    pub checksum: String,
    /// Creation time (RFC3339)
    pub created_at: String,
    /// Artifact size (bytes)
    pub artifact_size: u64,
    /// Games accumulated
    pub games: usize,
    /// State space dimension
    pub dim: usize,
    /// Transitions recorded
    pub observed_transitions: u64,
    /// Pairs dropped for touching out-of-domain states
    pub dropped_transitions: u64,
}

/// Parse one game file into a per-tick state sequence
pub fn read_game(path: &Path) -> Result<Vec<GameState>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read game file: {}", path.display()))?;
    let game: GameFile = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse game file: {}", path.display()))?;

    if game.goals.len() != game.situations.len() || game.goals.len() != game.zones.len() {
        bail!(
            "Mismatched tick arrays in {}: {} goals, {} situations, {} zones",
            path.display(),
            game.goals.len(),
            game.situations.len(),
            game.zones.len()
        );
    }

    let mut ticks = Vec::with_capacity(game.goals.len());
    for (tick, ((&score, &situation), zone)) in
        game.goals.iter().zip(&game.situations).zip(&game.zones).enumerate()
    {
        let zone = Zone::from_str(zone)
            .with_context(|| format!("Invalid zone {:?} at tick {} in {}", zone, tick, path.display()))?;
        ticks.push(GameState::clamped(score, situation, zone));
    }
    Ok(ticks)
}

/// Expand the given paths into game files: directories contribute their
/// `.json` entries (sorted for reproducible accumulation logs), plain
/// files are taken as-is
pub fn collect_game_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("Failed to list game directory: {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    if files.is_empty() {
        bail!("No game files found");
    }
    Ok(files)
}

/// Train a model over all given game files and save the normalized
/// snapshot to `out`
pub fn train(game_files: &[PathBuf], out: &Path) -> Result<TrainReport> {
    let mut model = GameModel::new();

    for (n, path) in game_files.iter().enumerate() {
        log::info!("Processing game {} of {}: {}", n + 1, game_files.len(), path.display());
        let ticks = read_game(path)?;
        model.observe_game(&ticks);
    }

    let matrix = model.normalized();
    let snapshot = ModelSnapshot::from_trained(model.space(), &matrix, model.dropped_transitions());
    save_model(out, &snapshot)
        .with_context(|| format!("Failed to save model to {}", out.display()))?;

    let artifact = fs::read(out)?;
    let mut hasher = Sha256::new();
    hasher.update(&artifact);

    Ok(TrainReport {
        core_version: CORE_VERSION.to_string(),
        checksum: format!("{:x}", hasher.finalize()),
        created_at: chrono::Utc::now().to_rfc3339(),
        artifact_size: artifact.len() as u64,
        games: game_files.len(),
        dim: model.space().len(),
        observed_transitions: model.observed_transitions(),
        dropped_transitions: model.dropped_transitions(),
    })
}

/// Verify a model artifact against its recorded checksum
pub fn verify_artifact(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read model artifact: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let actual = format!("{:x}", hasher.finalize());
    Ok(actual == expected_checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use puckcast_core::{load_model, Propagator, RestoredModel};
    use tempfile::TempDir;

    fn write_game(dir: &Path, name: &str, game: &GameFile) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, serde_json::to_string(game).unwrap()).unwrap();
        path
    }

    fn short_game() -> GameFile {
        GameFile {
            goals: vec![0, 0, 1, 1],
            situations: vec![1551, 1551, 1551, 1541],
            zones: vec!["N".into(), "O".into(), "N".into(), "D".into()],
        }
    }

    #[test]
    fn test_read_game_parses_and_clamps() {
        let temp_dir = TempDir::new().unwrap();
        let game = GameFile {
            goals: vec![0, 9],
            situations: vec![1551, 1551],
            zones: vec!["N".into(), "O".into()],
        };
        let path = write_game(temp_dir.path(), "game.json", &game);

        let ticks = read_game(&path).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].score, 0);
        assert_eq!(ticks[1].score, 6); // clipped at the saturation bound
        assert_eq!(ticks[1].zone, Zone::Offensive);
    }

    #[test]
    fn test_read_game_rejects_bad_zone() {
        let temp_dir = TempDir::new().unwrap();
        let game = GameFile {
            goals: vec![0, 0],
            situations: vec![1551, 1551],
            zones: vec!["N".into(), "X".into()],
        };
        let path = write_game(temp_dir.path(), "game.json", &game);
        assert!(read_game(&path).is_err());
    }

    #[test]
    fn test_read_game_rejects_length_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let game = GameFile {
            goals: vec![0, 0, 0],
            situations: vec![1551, 1551],
            zones: vec!["N".into(), "N".into()],
        };
        let path = write_game(temp_dir.path(), "game.json", &game);
        assert!(read_game(&path).is_err());
    }

    #[test]
    fn test_train_produces_loadable_trained_model() {
        let temp_dir = TempDir::new().unwrap();
        let game_path = write_game(temp_dir.path(), "game.json", &short_game());
        let out = temp_dir.path().join("model.bin");

        let report = train(&[game_path], &out).unwrap();
        assert_eq!(report.games, 1);
        assert_eq!(report.observed_transitions, 3);
        assert_eq!(report.dropped_transitions, 0);
        assert_eq!(report.dim, 741);
        assert!(verify_artifact(&out, &report.checksum).unwrap());

        match load_model(&out).unwrap().restore().unwrap() {
            RestoredModel::Trained { space, matrix, .. } => {
                let mut propagator = Propagator::new(space, matrix);
                let probs = propagator
                    .forecast(&GameState::new(0, 1551, Zone::Neutral), 3)
                    .unwrap();
                assert!(probs.home_win > 0.0);
            }
            RestoredModel::Counts(_) => panic!("train must save a normalized snapshot"),
        }
    }

    #[test]
    fn test_unknown_situation_codes_are_dropped_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let game = GameFile {
            goals: vec![0, 0, 0],
            situations: vec![1551, 4242, 1551],
            zones: vec!["N".into(), "N".into(), "N".into()],
        };
        let game_path = write_game(temp_dir.path(), "game.json", &game);
        let out = temp_dir.path().join("model.bin");

        let report = train(&[game_path], &out).unwrap();
        assert_eq!(report.observed_transitions, 0);
        assert_eq!(report.dropped_transitions, 2);
    }

    #[test]
    fn test_collect_game_files_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_game(temp_dir.path(), "b.json", &short_game());
        write_game(temp_dir.path(), "a.json", &short_game());
        fs::write(temp_dir.path().join("notes.txt"), "not a game").unwrap();

        let files = collect_game_files(&[temp_dir.path().to_path_buf()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.json"));
        assert!(files[1].ends_with("b.json"));
    }

    #[test]
    fn test_collect_game_files_empty_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(collect_game_files(&[temp_dir.path().to_path_buf()]).is_err());
    }
}
