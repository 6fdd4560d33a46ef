//! Configuration and library seed I/O.
//!
//! Segue keeps all playback state in memory; the only things on disk are an
//! optional runtime configuration file and the JSON library seed files the
//! CLI loads a catalog from. Both live in the platform-standard data
//! directory:
//!
//! - Linux: `~/.local/share/segue/`
//! - macOS: `~/Library/Application Support/segue/`
//! - Windows: `%APPDATA%\segue\`

use crate::catalog::{SeedSong, Song};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the platform-appropriate data directory for Segue, creating the
/// `segue` subdirectory if it does not exist yet.
///
/// # Errors
///
/// Fails when the system data directory cannot be determined, or the
/// subdirectory cannot be created (permissions, read-only filesystem).
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!("Could not determine the system data directory for this platform.")
    })?;

    let segue_dir = data_dir.join("segue");
    fs::create_dir_all(&segue_dir).with_context(|| {
        format!(
            "Failed to create the Segue data directory at {}",
            segue_dir.display()
        )
    })?;

    Ok(segue_dir)
}

/// Path of the runtime configuration file inside the data directory.
///
/// # Errors
///
/// Same failure modes as [`get_data_dir`].
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("config.json"))
}

/// Runtime configuration. Every field has a default, so a missing file is
/// equivalent to an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// User name the shell assumes when `--user` is not given.
    pub default_user: String,
    /// Library seed file loaded when `--library` is not given.
    pub library_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_user: "listener".to_string(),
            library_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load the configuration from the standard location, falling back to
    /// defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed - a broken
    /// config should be fixed, not silently ignored.
    pub fn load() -> Result<Self> {
        let path = get_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load the configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Fails on unreadable files or invalid JSON.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in config file {}", path.display()))
    }

    /// Write the configuration to an explicit path.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }
}

/// Load a JSON library seed file: an array of `{"title", "artist", "genre"}`
/// records (artist and genre may be omitted).
///
/// # Errors
///
/// Fails on unreadable files or invalid JSON.
pub fn load_library(path: &Path) -> Result<Vec<SeedSong>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read library file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in library file {}", path.display()))
}

/// Dump catalog songs (ids included) to a JSON file. The output is accepted
/// by [`load_library`] again - the extra `id` field is simply ignored there,
/// and fresh ids are assigned on import.
///
/// # Errors
///
/// Fails when the file cannot be written.
pub fn save_library(path: &Path, songs: &[Song]) -> Result<()> {
    let raw = serde_json::to_string_pretty(songs).context("Failed to serialize library")?;
    fs::write(path, raw)
        .with_context(|| format!("Failed to write library file {}", path.display()))
}

/// A starter library seed, printed by `segue library sample`.
#[must_use]
pub fn sample_library() -> String {
    serde_json::to_string_pretty(&[
        SeedSong {
            title: "Hymn for the Morning".to_string(),
            artist: "Coldwave".to_string(),
            genre: "Pop".to_string(),
        },
        SeedSong {
            title: "Rhapsody in Grey".to_string(),
            artist: "Quartz".to_string(),
            genre: "Rock".to_string(),
        },
        SeedSong {
            title: "Lose the Thread".to_string(),
            artist: "Minim".to_string(),
            genre: "Hip Hop".to_string(),
        },
    ])
    .unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SongId;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_a_user() {
        let config = RuntimeConfig::default();
        assert!(!config.default_user.is_empty());
        assert!(config.library_path.is_none());
    }

    #[test]
    fn config_roundtrips_through_disk() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        let config = RuntimeConfig {
            default_user: "ada".to_string(),
            library_path: Some(PathBuf::from("/tmp/songs.json")),
        };
        config.save_to(&path)?;

        let loaded = RuntimeConfig::load_from(&path)?;
        assert_eq!(loaded.default_user, "ada");
        assert_eq!(loaded.library_path, Some(PathBuf::from("/tmp/songs.json")));
        Ok(())
    }

    #[test]
    fn partial_config_files_fill_in_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_user": "grace"}"#)?;

        let loaded = RuntimeConfig::load_from(&path)?;
        assert_eq!(loaded.default_user, "grace");
        assert!(loaded.library_path.is_none());
        Ok(())
    }

    #[test]
    fn library_files_roundtrip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("songs.json");

        let songs = vec![
            Song {
                id: SongId(1),
                title: "One".to_string(),
                artist: "A".to_string(),
                genre: "Pop".to_string(),
            },
            Song {
                id: SongId(2),
                title: "Two".to_string(),
                artist: "B".to_string(),
                genre: "Rock".to_string(),
            },
        ];
        save_library(&path, &songs)?;

        let seeds = load_library(&path)?;
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].title, "One");
        assert_eq!(seeds[1].genre, "Rock");
        Ok(())
    }

    #[test]
    fn sample_library_is_valid_seed_json() {
        let seeds: Vec<SeedSong> =
            serde_json::from_str(&sample_library()).expect("sample must parse");
        assert!(!seeds.is_empty());
    }

    #[test]
    fn missing_library_file_is_an_error() {
        let result = load_library(Path::new("/definitely/not/here.json"));
        assert!(result.is_err());
    }
}
