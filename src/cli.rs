//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Segue using Clap derive
//! macros. It provides a type-safe way to parse command-line arguments and
//! route them to appropriate functionality.
//!
//! ## Commands
//!
//! - `shell`: Open the interactive playback shell
//! - `list`: Print the catalog (optionally filtered by a search query)
//! - `library`: Seed-file utilities (sample, check)
//! - `completion`: Generate shell completions
//!
//! ## Examples
//!
//! ```bash
//! segue library sample > songs.json
//! segue list --library songs.json pop
//! segue shell --library songs.json --user ada
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Uses Clap derive macros to automatically generate argument parsing,
/// help text, and validation. The main structure contains only a subcommand
/// since all functionality is accessed through specific commands.
#[derive(Parser)]
#[command(name = "segue")]
#[command(about = "Segue: deterministic playback ordering - queues, playlists & similarity")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
///
/// Each variant corresponds to a major piece of functionality in Segue.
/// Command arguments are embedded directly in the enum variants for
/// type safety and automatic validation.
#[derive(Subcommand)]
pub enum Command {
    /// Open the interactive playback shell
    ///
    /// Starts a single-process playback session: search the catalog, manage
    /// playlists, queue songs explicitly and navigate with next/prev. Type
    /// `help` inside the shell for the full verb list. All state lives in
    /// memory and is gone when the shell exits.
    Shell {
        /// User to run the session as
        ///
        /// Sessions are independent per user; the engine creates the user's
        /// state at first login. Defaults to the configured default user.
        #[arg(short, long)]
        user: Option<String>,

        /// JSON library seed file to load the catalog from
        ///
        /// Overrides the library path in the config file. See
        /// `segue library sample` for the expected format.
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Start with a built-in demo catalog and playlists
        ///
        /// Handy for trying every playback source without preparing a
        /// library file first. Ignored when `--library` is given.
        #[arg(long)]
        demo: bool,
    },

    /// Print the catalog, optionally filtered
    ///
    /// Loads the library seed file and prints the songs the given query
    /// matches, in the same ordering the shell's `search` verb would use:
    /// case-insensitive substring against title, artist or genre, exact
    /// match against the id, ascending ids. Without a query, prints
    /// everything.
    List {
        /// Search query (omit to list the whole catalog)
        query: Option<String>,

        /// JSON library seed file to load the catalog from
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Use the built-in demo catalog instead of a library file
        #[arg(long)]
        demo: bool,
    },

    /// Library seed-file utilities
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// Generate shell completions
    ///
    /// Generates completion scripts for various shells to enable tab
    /// completion of commands and options.
    ///
    /// Usage: segue completion bash > ~/.local/share/bash-completion/completions/segue
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Seed-file utilities
#[derive(Subcommand)]
pub enum LibraryAction {
    /// Print a starter library seed to stdout
    ///
    /// The output is a JSON array of `{"title", "artist", "genre"}` records;
    /// redirect it to a file and edit from there.
    Sample,

    /// Parse a library seed file and report what it contains
    ///
    /// Exits non-zero when the file is unreadable or not valid seed JSON.
    Check {
        /// Library seed file to validate
        file: PathBuf,
    },
}
