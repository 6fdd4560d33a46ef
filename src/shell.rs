//! Interactive playback shell.
//!
//! A single-user REPL over an [`Engine`]: every verb maps 1:1 onto an engine
//! entry point, and unknown songs, names or ids print a notice instead of
//! failing. EOF or Ctrl-C leaves the shell.

use crate::catalog::{SeedSong, Song, SongId};
use crate::config;
use crate::engine::{Engine, Enqueued};
use anyhow::Result;
use log::{debug, info};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

enum Flow {
    Continue,
    Quit,
}

/// Run the shell for one user until quit/EOF.
///
/// # Errors
///
/// Fails only on terminal I/O problems; every playback-level miss is
/// reported inline and the loop continues.
pub fn run(engine: &Engine, user: &str) -> Result<()> {
    engine.login(user);
    info!("shell session started for '{user}'");

    println!("Segue - what plays next. {} songs in the catalog.", engine.all_songs().len());
    println!("Type 'help' for commands, 'quit' to leave.");

    let mut rl = DefaultEditor::new()?;
    loop {
        match rl.readline("segue> ") {
            Ok(line) => {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);
                match dispatch(engine, user, &line) {
                    Flow::Continue => {}
                    Flow::Quit => break,
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    println!("Bye.");
    Ok(())
}

fn dispatch(engine: &Engine, user: &str, line: &str) -> Flow {
    let mut tokens = line.split_whitespace();
    let Some(verb) = tokens.next() else {
        return Flow::Continue;
    };
    let rest: Vec<&str> = tokens.collect();

    match verb {
        "help" => print_help(),
        "quit" | "exit" => return Flow::Quit,

        "list" => print_songs(&engine.all_songs()),
        "search" => print_songs(&engine.search_songs(&rest.join(" "))),

        "play" => match parse_id(rest.first()) {
            Some(id) => {
                let query = rest[1..].join(" ");
                if engine.play_from_library(user, &query, id) {
                    print_now(engine, user);
                } else {
                    println!("Song {id} is not in that listing.");
                }
            }
            None => println!("Usage: play <id> [query]"),
        },

        "start" => {
            let name = rest.join(" ");
            if name.is_empty() {
                println!("Usage: start <playlist>");
            } else if engine.play_playlist(user, &name) {
                print_now(engine, user);
            } else {
                println!("No playlist '{name}' with songs in it.");
            }
        }

        // `from <playlist...> <id>`: the last token is the song id.
        "from" => match rest.split_last() {
            Some((last, name_tokens)) if !name_tokens.is_empty() => {
                match parse_id(Some(last)) {
                    Some(id) => {
                        let name = name_tokens.join(" ");
                        if engine.play_from_playlist(user, &name, id) {
                            print_now(engine, user);
                        } else {
                            println!("Song {id} is not in playlist '{name}'.");
                        }
                    }
                    None => println!("Usage: from <playlist> <id>"),
                }
            }
            _ => println!("Usage: from <playlist> <id>"),
        },

        "queue" => match rest.first() {
            Some(_) => match parse_id(rest.first()) {
                Some(id) => match engine.enqueue(user, id) {
                    Some(Enqueued::Started) => print_now(engine, user),
                    Some(Enqueued::Queued) => println!("Queued song {id}."),
                    None => println!("No song {id} in the catalog."),
                },
                None => println!("Usage: queue [<id>]"),
            },
            None => {
                let queued = engine.queued_songs(user);
                if queued.is_empty() {
                    println!("The explicit queue is empty.");
                } else {
                    println!("Up next:");
                    print_songs(&queued);
                }
            }
        },

        "next" => match engine.advance(user) {
            Some(_) => print_now(engine, user),
            None => match engine.now_playing(user) {
                // A playlist just ran out; the current song lingers and the
                // next `next` consults the recommender.
                Some(song) => println!("End of the playlist. Still on: {}", describe(&song)),
                None => println!("Nothing left to play."),
            },
        },
        "prev" => match engine.retreat(user) {
            Some(_) => print_now(engine, user),
            None => println!("Nothing to step back to."),
        },
        "stop" => {
            engine.stop(user);
            println!("Stopped.");
        }
        "now" => print_now(engine, user),
        "roulette" => match engine.roulette(user) {
            Some(_) => print_now(engine, user),
            None => println!("The catalog is empty."),
        },

        "playlists" => {
            let names = engine.playlist_names(user);
            if names.is_empty() {
                println!("No playlists yet. Try: playlist create <name>");
            } else {
                for name in names {
                    let count = engine.playlist_songs(user, &name).map_or(0, |s| s.len());
                    println!("  {name} ({count} songs)");
                }
            }
        }
        "playlist" => playlist_verb(engine, user, &rest),

        "add" => match parse_fields(&rest.join(" ")) {
            Some((title, artist, genre)) => {
                let id = engine.add_song(title, artist, genre);
                println!("Added song {id}.");
            }
            None => println!("Usage: add <title> | <artist> | <genre>"),
        },
        "edit" => match parse_id(rest.first()) {
            Some(id) => match parse_fields(&rest[1..].join(" ")) {
                Some((title, artist, genre)) => {
                    if engine.update_song(id, title, artist, genre) {
                        println!("Updated song {id}.");
                    } else {
                        println!("No song {id} in the catalog.");
                    }
                }
                None => println!("Usage: edit <id> <title> | <artist> | <genre>"),
            },
            None => println!("Usage: edit <id> <title> | <artist> | <genre>"),
        },
        "remove" => match parse_id(rest.first()) {
            Some(id) => {
                if engine.delete_song(id) {
                    println!("Removed song {id} from the catalog and every playlist.");
                } else {
                    println!("No song {id} in the catalog.");
                }
            }
            None => println!("Usage: remove <id>"),
        },

        "import" => match rest.first() {
            Some(path) => match config::load_library(Path::new(path)) {
                Ok(seeds) => {
                    let added = engine.import_songs(seeds);
                    println!("Imported {added} songs.");
                }
                Err(err) => println!("Import failed: {err:#}"),
            },
            None => println!("Usage: import <file.json>"),
        },
        "export" => match rest.first() {
            Some(path) => match config::save_library(Path::new(path), &engine.all_songs()) {
                Ok(()) => println!("Exported {} songs to {path}.", engine.all_songs().len()),
                Err(err) => println!("Export failed: {err:#}"),
            },
            None => println!("Usage: export <file.json>"),
        },

        other => {
            debug!("unrecognized shell verb '{other}'");
            println!("Unrecognized command '{other}'. Try 'help'.");
        }
    }

    Flow::Continue
}

fn playlist_verb(engine: &Engine, user: &str, rest: &[&str]) {
    let usage = || println!("Usage: playlist <create|delete|show|add|remove> ...");
    let Some((&action, args)) = rest.split_first() else {
        usage();
        return;
    };

    match action {
        "create" => {
            let name = args.join(" ");
            if engine.create_playlist(user, &name) {
                println!("Created playlist '{name}'.");
            } else {
                println!("A playlist needs a fresh, non-empty name.");
            }
        }
        "delete" => {
            let name = args.join(" ");
            if engine.delete_playlist(user, &name) {
                println!("Deleted playlist '{name}'.");
            } else {
                println!("No playlist '{name}'.");
            }
        }
        "show" => {
            let name = args.join(" ");
            match engine.playlist_songs(user, &name) {
                Some(ids) => {
                    let songs: Vec<Song> =
                        ids.into_iter().filter_map(|id| engine.get_song(id)).collect();
                    print_songs(&songs);
                }
                None => println!("No playlist '{name}'."),
            }
        }
        // `playlist add <name...> <id>` / `playlist remove <name...> <id>`
        "add" | "remove" => match args.split_last() {
            Some((last, name_tokens)) if !name_tokens.is_empty() => {
                let Some(id) = parse_id(Some(last)) else {
                    usage();
                    return;
                };
                let name = name_tokens.join(" ");
                if action == "add" {
                    if engine.add_to_playlist(user, &name, id) {
                        println!("Added song {id} to '{name}'.");
                    } else {
                        println!("Could not add {id} to '{name}' (unknown, or already there).");
                    }
                } else {
                    let removed = engine.remove_from_playlist(user, &name, id);
                    if removed > 0 {
                        println!("Removed song {id} from '{name}'.");
                    } else {
                        println!("Song {id} was not in '{name}'.");
                    }
                }
            }
            _ => usage(),
        },
        _ => usage(),
    }
}

fn parse_id(token: Option<&&str>) -> Option<SongId> {
    token.and_then(|t| t.parse().ok())
}

/// Split `title | artist | genre`. Title is required; the rest defaults to
/// empty.
fn parse_fields(raw: &str) -> Option<(String, String, String)> {
    let mut parts = raw.splitn(3, '|').map(|part| part.trim().to_string());
    let title = parts.next().filter(|t| !t.is_empty())?;
    let artist = parts.next().unwrap_or_default();
    let genre = parts.next().unwrap_or_default();
    Some((title, artist, genre))
}

fn describe(song: &Song) -> String {
    format!("{} - {} [{}]", song.artist, song.title, song.genre)
}

fn print_songs(songs: &[Song]) {
    if songs.is_empty() {
        println!("  (nothing)");
        return;
    }
    for song in songs {
        println!("  {:>4}  {}", song.id, describe(song));
    }
}

fn print_now(engine: &Engine, user: &str) {
    match engine.now_playing(user) {
        Some(song) => {
            let label = engine.source_label(user).unwrap_or_default();
            println!("Now playing: {} ({label})", describe(&song));
        }
        None => println!("Nothing is playing."),
    }
    let queued = engine.queued_songs(user);
    if !queued.is_empty() {
        println!("Up next: {}", queued.iter().map(describe).collect::<Vec<_>>().join(", "));
    }
}

fn print_help() {
    println!(
        "\
Catalog
  list                        all songs
  search <query>              title/artist/genre substring, or an exact id
  add <title>|<artist>|<genre>   catalog a song
  edit <id> <title>|<artist>|<genre>
  remove <id>                 delete a song everywhere
  import <file.json>          load a library seed file
  export <file.json>          dump the catalog

Playback
  play <id> [query]           play from the library/search listing
  start <playlist>            play a playlist from the top
  from <playlist> <id>        play a playlist from a given song
  queue <id> / queue          play-next queue: add / show
  next, prev                  advance / step back
  roulette                    play a random song from the library
  now, stop

Playlists
  playlists                   list your playlists
  playlist create <name>
  playlist delete <name>
  playlist show <name>
  playlist add <name> <id>
  playlist remove <name> <id>

quit"
    );
}

/// Built-in demo catalog: enough overlap in genres and artists to exercise
/// the recommender, the queues and the playlists.
#[must_use]
pub fn demo_library() -> Vec<SeedSong> {
    let raw = [
        ("Hymn for the Morning", "Coldwave", "Pop"),
        ("Rhapsody in Grey", "Quartz", "Rock"),
        ("Happier Later", "Billie Crest", "Pop"),
        ("Static Bloom", "Nightjar", "Pop"),
        ("Lose the Thread", "Minim", "Hip Hop"),
        ("Paper Lanterns", "Seorin", "K-Pop"),
        ("Gravity Well", "Dua Vega", "Pop"),
        ("Amber", "Coldwave", "Rock"),
        ("Satu Arah", "Larasati", "Pop"),
        ("Counting Floors", "Minim", "Hip Hop"),
        ("Neon Garden", "Haneul", "K-Pop"),
        ("Ladder to the Loft", "Quartz", "Rock"),
        ("Monochrome", "Tilde", "Jazz"),
    ];
    raw.iter()
        .map(|&(title, artist, genre)| SeedSong {
            title: title.to_string(),
            artist: artist.to_string(),
            genre: genre.to_string(),
        })
        .collect()
}

/// Seed the engine with the demo catalog and a couple of playlists for
/// `user`, so every playback source is reachable immediately.
pub fn seed_demo(engine: &Engine, user: &str) {
    engine.login(user);
    let count = engine.import_songs(demo_library());
    debug!("seeded demo catalog with {count} songs");

    engine.create_playlist(user, "favorites");
    for id in [1, 3, 5] {
        engine.add_to_playlist(user, "favorites", SongId(id));
    }
    engine.create_playlist(user, "rainy");
    for id in [6, 7, 8, 9, 10] {
        engine.add_to_playlist(user, "rainy", SongId(id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fields_requires_a_title() {
        assert_eq!(
            parse_fields("Song | Artist | Genre"),
            Some(("Song".to_string(), "Artist".to_string(), "Genre".to_string()))
        );
        assert_eq!(
            parse_fields("Solo"),
            Some(("Solo".to_string(), String::new(), String::new()))
        );
        assert_eq!(parse_fields(""), None);
        assert_eq!(parse_fields("  | x | y"), None);
    }

    #[test]
    fn demo_library_seeds_cleanly() {
        let engine = Engine::new();
        seed_demo(&engine, "demo");
        assert_eq!(engine.all_songs().len(), 13);
        assert_eq!(engine.playlist_names("demo").len(), 2);
        assert_eq!(
            engine.playlist_songs("demo", "rainy").map(|s| s.len()),
            Some(5)
        );
    }

    #[test]
    fn demo_library_has_recommender_overlap() {
        // At least two songs must share a genre and two an artist, or the
        // similarity fallback would always hit the zero-score path.
        let seeds = demo_library();
        let genres: Vec<&str> = seeds.iter().map(|s| s.genre.as_str()).collect();
        let artists: Vec<&str> = seeds.iter().map(|s| s.artist.as_str()).collect();
        assert!(genres.iter().filter(|&&g| g == "Pop").count() >= 2);
        assert!(artists.iter().filter(|&&a| a == "Coldwave").count() >= 2);
    }
}
