//! # Segue - deterministic playback ordering
//!
//! Segue is a single-process playback engine: it manages the *ordering* of
//! music (explicit queues, browse queues, playlists, similarity suggestions),
//! not the audio bytes. The binary wraps the engine in a small CLI plus an
//! interactive shell; see the library crate for the engine itself.
//!
//! ## Usage
//!
//! ```bash
//! # Print a starter library seed and edit it
//! segue library sample > songs.json
//!
//! # List the catalog a seed file describes
//! segue list --library songs.json
//!
//! # Open a playback session
//! segue shell --library songs.json --user ada
//!
//! # Or just explore with built-in data
//! segue shell --demo
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{info, warn};
use segue::catalog::SeedSong;
use segue::config::RuntimeConfig;
use segue::engine::Engine;
use segue::{cli, completion, config, shell};

/// Main entry point for the Segue application.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the appropriate module functions. All operations return Results for
/// consistent error handling throughout the application.
///
/// # Logging
///
/// Initializes the environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug segue shell` - Enable debug logging
/// - `RUST_LOG=segue::resolver=debug segue shell` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = RuntimeConfig::load().unwrap_or_else(|err| {
        warn!("falling back to default config: {err:#}");
        RuntimeConfig::default()
    });

    match args.command {
        cli::Command::Shell { user, library, demo } => {
            let user = user.unwrap_or_else(|| config.default_user.clone());
            let engine = Engine::new();
            if demo && library.is_none() {
                shell::seed_demo(&engine, &user);
            } else if let Some(seeds) = load_seeds(&config, library)? {
                engine.import_songs(seeds);
            }
            info!("starting shell as '{user}'");
            shell::run(&engine, &user)?;
        }

        cli::Command::List { query, library, demo } => {
            let engine = Engine::new();
            if demo && library.is_none() {
                engine.import_songs(shell::demo_library());
            } else if let Some(seeds) = load_seeds(&config, library)? {
                engine.import_songs(seeds);
            } else {
                warn!("no library given; the catalog is empty (see `segue library sample`)");
            }
            let query = query.unwrap_or_default();
            for song in engine.search_songs(&query) {
                println!("{:>4}  {} - {} [{}]", song.id, song.artist, song.title, song.genre);
            }
        }

        cli::Command::Library { action } => match action {
            cli::LibraryAction::Sample => println!("{}", config::sample_library()),
            cli::LibraryAction::Check { file } => {
                let seeds = config::load_library(&file)?;
                println!("{}: {} songs", file.display(), seeds.len());
            }
        },

        cli::Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
    }

    Ok(())
}

/// Resolve the library seed source: an explicit `--library` flag wins, then
/// the configured path; `None` when neither is set.
fn load_seeds(
    config: &RuntimeConfig,
    library: Option<std::path::PathBuf>,
) -> Result<Option<Vec<SeedSong>>> {
    let path = library.or_else(|| config.library_path.clone());
    match path {
        Some(path) => Ok(Some(config::load_library(&path)?)),
        None => Ok(None),
    }
}
