//! Command catalog
//!
//! Fixed player commands, search types and status queries understood by the
//! Squeezebox server, plus free-text resolution of command names.

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{SqueezeError, SqueezeResult};
use crate::utils::fuzzy::{rank, CandidateOption};

/// A named command and the request arguments it sends to a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub args: &'static [&'static str],
    /// Alternation patterns for free-text resolution
    pub synonyms: &'static [&'static str],
}

impl CommandSpec {
    /// The command as a JSON-RPC argument list
    pub fn request(&self) -> Value {
        json!(self.args)
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "PLAY",
        args: &["play"],
        synonyms: &["(resume|start) (playing|music|playback)", "play music"],
    },
    CommandSpec {
        name: "PAUSE",
        args: &["pause"],
        synonyms: &["(pause|stop) (the )?(music|playback)"],
    },
    CommandSpec {
        name: "POWER ON",
        args: &["power", "1"],
        synonyms: &["(turn|switch) on", "wake up"],
    },
    CommandSpec {
        name: "POWER OFF",
        args: &["power", "0"],
        synonyms: &["(turn|switch) off", "shut down"],
    },
    CommandSpec {
        name: "VOLUME UP",
        args: &["mixer", "volume", "+20"],
        synonyms: &["turn (it|the volume) up", "louder"],
    },
    CommandSpec {
        name: "VOLUME DOWN",
        args: &["mixer", "volume", "-20"],
        synonyms: &["turn (it|the volume) down", "(quieter|softer)"],
    },
    CommandSpec {
        name: "SLEEP",
        args: &["sleep", "300"],
        synonyms: &["go to sleep"],
    },
    CommandSpec {
        name: "SLEEP SONG",
        args: &["jiveendoftracksleep"],
        synonyms: &["sleep after (this|the) (song|track)"],
    },
    CommandSpec {
        name: "SKIP",
        args: &["playlist", "index", "+1"],
        synonyms: &["(next|skip) (song|track)", "next"],
    },
    CommandSpec {
        name: "PREVIOUS",
        args: &["playlist", "index", "-1"],
        synonyms: &["(previous|last) (song|track)", "go back"],
    },
    CommandSpec {
        name: "UNSYNC",
        args: &["sync", "-"],
        synonyms: &["(unsync|unlink) (the )?players"],
    },
    CommandSpec {
        name: "SHUFFLE OFF",
        args: &["playlist", "shuffle", "0"],
        synonyms: &["(stop|no) shuffl(e|ing)"],
    },
    CommandSpec {
        name: "SHUFFLE SONGS",
        args: &["playlist", "shuffle", "1"],
        synonyms: &["shuffle( tracks)?"],
    },
    CommandSpec {
        name: "SHUFFLE ALBUMS",
        args: &["playlist", "shuffle", "2"],
        synonyms: &["shuffle by album"],
    },
    CommandSpec {
        name: "REPEAT OFF",
        args: &["playlist", "repeat", "0"],
        synonyms: &["(stop|no) repeat(ing)?"],
    },
    CommandSpec {
        name: "REPEAT SONG",
        args: &["playlist", "repeat", "1"],
        synonyms: &["repeat (this )?(song|track)"],
    },
    CommandSpec {
        name: "REPEAT PLAYLIST",
        args: &["playlist", "repeat", "2"],
        synonyms: &["repeat (the )?playlist"],
    },
    CommandSpec {
        name: "MUTE",
        args: &["mixer", "volume", "0"],
        synonyms: &["silence"],
    },
];

/// Look up a catalog command by its exact name (case-insensitive)
pub fn find_command(name: &str) -> SqueezeResult<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            SqueezeError::Request(format!(
                "command must be one of: {}",
                command_names().join(", ")
            ))
        })
}

pub fn command_names() -> Vec<&'static str> {
    COMMANDS.iter().map(|c| c.name).collect()
}

/// The catalog as ranking options, in catalog order
pub fn command_options() -> Vec<CandidateOption> {
    COMMANDS
        .iter()
        .map(|c| CandidateOption::with_synonyms(c.name, c.synonyms.iter().copied()))
        .collect()
}

/// Resolve free text ("turn it up", "paus") to a catalog command
pub fn resolve_command(text: &str, threshold: i32) -> SqueezeResult<Option<&'static CommandSpec>> {
    let ranked = rank(text.trim(), &command_options(), threshold)?;
    Ok(ranked.and_then(|m| COMMANDS.iter().find(|c| c.name == m.label)))
}

/// Kind of library item a search looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Song,
    Album,
    Artist,
    Genre,
    Playlist,
}

impl SearchType {
    pub const ALL: [SearchType; 5] = [
        SearchType::Song,
        SearchType::Album,
        SearchType::Artist,
        SearchType::Genre,
        SearchType::Playlist,
    ];

    /// Word used in user-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            SearchType::Song => "song",
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::Genre => "genre",
            SearchType::Playlist => "playlist",
        }
    }

    /// Server query verb
    pub fn search_command(&self) -> &'static str {
        match self {
            SearchType::Song => "tracks",
            SearchType::Album => "albums",
            SearchType::Artist => "artists",
            SearchType::Genre => "genres",
            SearchType::Playlist => "playlists",
        }
    }

    /// Key of the result list in the search response
    pub fn loop_key(&self) -> &'static str {
        match self {
            SearchType::Song => "titles_loop",
            SearchType::Album => "albums_loop",
            SearchType::Artist => "artists_loop",
            SearchType::Genre => "genres_loop",
            SearchType::Playlist => "playlists_loop",
        }
    }

    /// Field of a result item holding its display name
    pub fn name_key(&self) -> &'static str {
        match self {
            SearchType::Song => "title",
            SearchType::Album => "album",
            SearchType::Artist => "artist",
            SearchType::Genre => "genre",
            SearchType::Playlist => "playlist",
        }
    }

    /// Menu suffix of the Spotify plugin's search for this type, if it has one
    pub fn spotify_menu(&self) -> Option<&'static str> {
        match self {
            SearchType::Artist => Some("0"),
            SearchType::Album => Some("1"),
            SearchType::Song => Some("2"),
            SearchType::Genre | SearchType::Playlist => None,
        }
    }

    /// Parameter name used to load an item by id
    pub fn play_key(&self) -> &'static str {
        match self {
            SearchType::Song => "track_id",
            SearchType::Album => "album_id",
            SearchType::Artist => "artist_id",
            SearchType::Genre => "genre_id",
            SearchType::Playlist => "playlist_id",
        }
    }
}

impl FromStr for SearchType {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "song" | "songs" | "track" | "tracks" => Ok(SearchType::Song),
            "album" | "albums" => Ok(SearchType::Album),
            "artist" | "artists" => Ok(SearchType::Artist),
            "genre" | "genres" => Ok(SearchType::Genre),
            "playlist" | "playlists" => Ok(SearchType::Playlist),
            _ => Err(SqueezeError::Request(
                "Search type must be one of: SONG, ALBUM, ARTIST, GENRE, PLAYLIST".to_string(),
            )),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Status queries answered from a player's `status` document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// The whole status document
    Raw,
    Volume,
    NowPlaying,
}

/// Answer to a [`Query`]
#[derive(Debug, Clone, PartialEq)]
pub enum QueryReply {
    Text(String),
    Raw(Value),
}

impl fmt::Display for QueryReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryReply::Text(text) => f.write_str(text),
            QueryReply::Raw(value) => write!(f, "{}", value),
        }
    }
}

impl Query {
    pub fn answer(&self, status: Value) -> SqueezeResult<QueryReply> {
        match self {
            Query::Raw => Ok(QueryReply::Raw(status)),
            Query::Volume => {
                let volume = status
                    .get("mixer volume")
                    .and_then(number_of)
                    .ok_or_else(|| {
                        SqueezeError::Server("status has no 'mixer volume'".to_string())
                    })?;
                Ok(QueryReply::Text(format!(
                    "The volume is at {} percent",
                    volume
                )))
            }
            Query::NowPlaying => {
                let current = status
                    .get("playlist_loop")
                    .and_then(Value::as_array)
                    .and_then(|tracks| tracks.first());

                let text = match current {
                    Some(track) => {
                        let title = track.get("title").and_then(Value::as_str).unwrap_or("");
                        match track.get("artist").and_then(Value::as_str) {
                            Some(artist) => format!("{} by {}", title, artist),
                            None => title.to_string(),
                        }
                    }
                    None => "Nothing is playing".to_string(),
                };
                Ok(QueryReply::Text(text))
            }
        }
    }
}

impl FromStr for Query {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "raw" => Ok(Query::Raw),
            "volume" => Ok(Query::Volume),
            "now playing" => Ok(Query::NowPlaying),
            _ => Err(SqueezeError::Request(
                "Query must be one of: RAW, VOLUME, NOW PLAYING".to_string(),
            )),
        }
    }
}

/// Integer reading of a number that may arrive as a JSON number or string
fn number_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_command() {
        assert_eq!(find_command("play").unwrap().args, &["play"]);
        assert_eq!(
            find_command("VOLUME UP").unwrap().request(),
            json!(["mixer", "volume", "+20"])
        );
        assert!(matches!(
            find_command("dance"),
            Err(SqueezeError::Request(_))
        ));
    }

    #[test]
    fn test_catalog_synonyms_expand() {
        for option in command_options() {
            for pattern in &option.synonyms {
                assert!(
                    crate::utils::expand(pattern).is_ok(),
                    "bad synonym for {}: {}",
                    option.label,
                    pattern
                );
            }
        }
    }

    #[test]
    fn test_resolve_command() {
        assert_eq!(resolve_command("ply", 5).unwrap().unwrap().name, "PLAY");
        assert_eq!(resolve_command("paus", 5).unwrap().unwrap().name, "PAUSE");
        assert_eq!(
            resolve_command("louder", 5).unwrap().unwrap().name,
            "VOLUME UP"
        );
        assert_eq!(
            resolve_command("next track", 5).unwrap().unwrap().name,
            "SKIP"
        );
        assert!(resolve_command("xyzzy qwerty", 5).unwrap().is_none());
    }

    #[test]
    fn test_search_type_parse() {
        assert_eq!("ALBUM".parse::<SearchType>().unwrap(), SearchType::Album);
        assert_eq!("songs".parse::<SearchType>().unwrap(), SearchType::Song);
        assert!("podcast".parse::<SearchType>().is_err());
        assert_eq!(SearchType::Song.loop_key(), "titles_loop");
        assert_eq!(SearchType::Artist.play_key(), "artist_id");
    }

    #[test]
    fn test_spotify_menus() {
        assert_eq!(SearchType::Song.spotify_menu(), Some("2"));
        assert_eq!(SearchType::Artist.spotify_menu(), Some("0"));
        assert_eq!(SearchType::Playlist.spotify_menu(), None);
    }

    #[test]
    fn test_volume_query() {
        let reply = Query::Volume.answer(json!({"mixer volume": 35})).unwrap();
        assert_eq!(reply, QueryReply::Text("The volume is at 35 percent".into()));
        let reply = Query::Volume.answer(json!({"mixer volume": "40"})).unwrap();
        assert_eq!(reply.to_string(), "The volume is at 40 percent");
        assert!(Query::Volume.answer(json!({})).is_err());
    }

    #[test]
    fn test_now_playing_query() {
        let status = json!({"playlist_loop": [{"title": "Karma Police", "artist": "Radiohead"}]});
        assert_eq!(
            Query::NowPlaying.answer(status).unwrap().to_string(),
            "Karma Police by Radiohead"
        );
        let status = json!({"playlist_loop": [{"title": "Untitled"}]});
        assert_eq!(Query::NowPlaying.answer(status).unwrap().to_string(), "Untitled");
        assert_eq!(
            Query::NowPlaying.answer(json!({})).unwrap().to_string(),
            "Nothing is playing"
        );
    }

    #[test]
    fn test_query_parse() {
        assert_eq!("now-playing".parse::<Query>().unwrap(), Query::NowPlaying);
        assert_eq!("NOW PLAYING".parse::<Query>().unwrap(), Query::NowPlaying);
        assert_eq!("raw".parse::<Query>().unwrap(), Query::Raw);
    }
}
