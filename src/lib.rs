//! Segue - a deterministic playback ordering engine.
//!
//! Segue tracks, per user session, "what plays next" across four competing
//! sources of music ordering: an explicit play-next queue, a search/browse
//! queue, an ordered playlist chain, and a similarity-based recommendation
//! fallback. Advance and retreat requests consult these sources in strict
//! priority order and degrade to silence when nothing remains - never to an
//! error.
//!
//! Core modules:
//! - [`catalog`] - the global indexed song store with id lookup and search
//! - [`playlist`] - ordered, duplicate-free song chains with node anchors
//! - [`similar`] - the similarity scorer behind the recommendation fallback
//! - [`session`] - per-user playback state (current song, queues, source)
//! - [`resolver`] - the advance/retreat state machine over all sources
//! - [`engine`] - the process-wide session registry and entry points
//!
//! ### Supporting Modules
//!
//! - [`config`] - data directory, runtime config and library seed files
//! - [`cli`] - command-line interface definitions with clap integration
//! - [`completion`] - shell completion generation
//! - [`shell`] - the interactive playback REPL
//!
//! ## Quick Start Example
//!
//! ```
//! use segue::engine::Engine;
//!
//! let engine = Engine::new();
//! let hymn = engine.add_song("Hymn for the Morning", "Coldwave", "Pop");
//! let amber = engine.add_song("Amber", "Coldwave", "Rock");
//!
//! engine.login("ada");
//! // Play straight from a search listing; "hymn" matches only one song.
//! assert!(engine.play_from_library("ada", "hymn", hymn));
//! assert_eq!(engine.now_playing("ada").map(|s| s.id), Some(hymn));
//!
//! // That one-song browse queue is already exhausted, so advancing falls
//! // through to the similarity recommender - Amber shares Hymn's artist.
//! assert_eq!(engine.advance("ada"), Some(amber));
//! ```
//!
//! ## Resolution order
//!
//! On `advance`, the first source that can produce a song wins:
//!
//! 1. the explicit queue (pops its front and silences every other source),
//! 2. the linear browse queue, while its cursor has room ahead,
//! 3. the active playlist chain, node by node,
//! 4. the similarity recommender, seeded by the current song and the linear
//!    queue as played-history.
//!
//! A playlist running off its tail drops the source but keeps the current
//! song, so the following advance consults the recommender. When nothing
//! matches at all, the session resets to full silence.
//!
//! ## Error Handling
//!
//! Domain operations signal "not found" with `Option` and expected
//! rejections (duplicate playlist entries, name collisions) with `bool`;
//! nothing in the core returns an error. `anyhow::Result` appears only at
//! the I/O boundary (config files, library seeds, the terminal).

pub mod catalog;
pub mod cli;
pub mod completion;
pub mod config;
pub mod engine;
pub mod playlist;
pub mod resolver;
pub mod session;
pub mod shell;
pub mod similar;
