//! Squeezebox Controller
//!
//! High level player operations on top of the server's JSON-RPC interface:
//! fixed commands, search-and-play, volume, sleep, moving music between
//! players, status queries and user-defined commands.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::commands::{find_command, Query, QueryReply, SearchType};
use crate::config::Config;
use crate::custom::{CustomCommand, Helper};
use crate::error::{SqueezeError, SqueezeResult};
use crate::players::{
    result_of, HttpTransport, NameCleanup, PlayerDirectory, PlayerTarget, RpcClient, Transport,
};
use crate::session::Session;
use crate::utils::fuzzy::{best_by_distance, rank};

/// What to search for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    /// `None` searches every type and takes the best result overall
    pub search_type: Option<SearchType>,
}

impl SearchRequest {
    pub fn new(term: impl Into<String>, search_type: Option<SearchType>) -> Self {
        Self {
            term: term.into(),
            search_type,
        }
    }
}

/// Direction for [`SqueezeBoxController::send_music`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// From the addressed player to the other one
    To,
    /// From the other player to the addressed one
    From,
}

impl std::str::FromStr for Direction {
    type Err = SqueezeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "to" => Ok(Direction::To),
            "from" => Ok(Direction::From),
            _ => Err(SqueezeError::Request(
                "direction must be either \"from\" or \"to\"".to_string(),
            )),
        }
    }
}

/// Where a found item goes in the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaylistMode {
    Load,
    Insert,
    Add,
}

impl PlaylistMode {
    fn command(self) -> &'static str {
        match self {
            PlaylistMode::Load => "cmd:load",
            PlaylistMode::Insert => "cmd:insert",
            PlaylistMode::Add => "cmd:add",
        }
    }
}

struct RegisteredCommand {
    handler: Arc<dyn CustomCommand>,
    cached: bool,
}

pub struct SqueezeBoxController {
    client: RpcClient,
    base_url: String,
    players: PlayerDirectory,
    custom_commands: HashMap<String, RegisteredCommand>,
}

impl SqueezeBoxController {
    /// Connect over HTTP and discover the server's players
    pub async fn connect(config: &Config, cleanup: Option<NameCleanup>) -> SqueezeResult<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Self::with_transport(config, transport, cleanup).await
    }

    /// Build a controller over any transport
    pub async fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
        cleanup: Option<NameCleanup>,
    ) -> SqueezeResult<Self> {
        let base_url = config.base_url();
        let client = RpcClient::new(transport, &base_url);
        let players = PlayerDirectory::discover(&client, cleanup.as_ref()).await?;

        Ok(Self {
            client,
            base_url,
            players,
            custom_commands: HashMap::new(),
        })
    }

    pub fn players(&self) -> &PlayerDirectory {
        &self.players
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one of the fixed catalog commands
    pub async fn simple_command(
        &self,
        session: &mut Session,
        player: Option<&str>,
        command: &str,
    ) -> SqueezeResult<()> {
        let target = self.target(session, player)?;
        let spec = find_command(command)?;

        info!("▶️ {} -> {:?}", spec.name, target);
        self.client.request_target(&target, spec.request()).await?;
        Ok(())
    }

    /// Search for music and play it now
    pub async fn search_and_play(
        &self,
        session: &mut Session,
        player: Option<&str>,
        request: &SearchRequest,
    ) -> SqueezeResult<String> {
        let target = self.target(session, player)?;
        let name = self.search_and(&target, request, PlaylistMode::Load).await?;
        Ok(format!("Playing {}", name))
    }

    /// Search for music and play it after the current track
    pub async fn search_and_play_next(
        &self,
        session: &mut Session,
        player: Option<&str>,
        request: &SearchRequest,
    ) -> SqueezeResult<String> {
        let target = self.target(session, player)?;
        let name = self.search_and(&target, request, PlaylistMode::Insert).await?;
        Ok(format!("Playing {} next", name))
    }

    /// Search for music and queue it at the end of the playlist
    pub async fn search_and_play_end(
        &self,
        session: &mut Session,
        player: Option<&str>,
        request: &SearchRequest,
    ) -> SqueezeResult<String> {
        let target = self.target(session, player)?;
        let name = self.search_and(&target, request, PlaylistMode::Add).await?;
        Ok(format!("Queuing {}", name))
    }

    async fn search_and(
        &self,
        target: &PlayerTarget,
        request: &SearchRequest,
        mode: PlaylistMode,
    ) -> SqueezeResult<String> {
        let term = request.term.trim();
        if term.is_empty() {
            return Err(SqueezeError::User("Search term cannot be empty".to_string()));
        }

        let search_mac = target
            .primary()
            .ok_or_else(|| SqueezeError::Player("no players available".to_string()))?;
        let types = match request.search_type {
            Some(t) => vec![t],
            None => SearchType::ALL.to_vec(),
        };

        let mut results: Vec<(Value, SearchType)> = Vec::new();
        for search_type in types {
            let command = json!([
                search_type.search_command(),
                0,
                10,
                format!("search:{}", term)
            ]);
            let result = result_of(self.client.request(search_mac, command).await?)?;
            if let Some(items) = result.get(search_type.loop_key()).and_then(Value::as_array) {
                debug!("{} {} results for '{}'", items.len(), search_type, term);
                results.extend(items.iter().cloned().map(|item| (item, search_type)));
            }
        }

        let ranked = best_by_distance(term, results, |(item, search_type)| {
            item.get(search_type.name_key())
                .and_then(Value::as_str)
                .unwrap_or("")
        });
        let Some((entity, search_type)) = ranked.into_iter().next() else {
            return Err(SqueezeError::User(format!("Nothing matching: {}", term)));
        };

        let name = entity
            .get(search_type.name_key())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = match entity.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(SqueezeError::Server(format!(
                    "{} result '{}' has no id",
                    search_type, name
                )))
            }
        };

        info!("🎯 Matched {}: '{}' for '{}'", search_type, name, term);
        let command = json!([
            "playlistcontrol",
            mode.command(),
            format!("{}:{}", search_type.play_key(), id)
        ]);
        self.client.request_target(target, command).await?;
        Ok(name)
    }

    /// Search the Spotify plugin and play the first hit now.
    ///
    /// Only songs, albums and artists can be searched; no type means songs.
    pub async fn spotify_search_and_play(
        &self,
        session: &mut Session,
        player: Option<&str>,
        request: &SearchRequest,
    ) -> SqueezeResult<String> {
        let target = self.target(session, player)?;
        let term = request.term.trim();
        if term.is_empty() {
            return Err(SqueezeError::User("Search term cannot be empty".to_string()));
        }

        let search_type = request.search_type.unwrap_or(SearchType::Song);
        let menu = search_type.spotify_menu().ok_or_else(|| {
            SqueezeError::Request(
                "Spotify search type must be one of: SONG, ALBUM, ARTIST".to_string(),
            )
        })?;
        let search_mac = target
            .primary()
            .ok_or_else(|| SqueezeError::Player("no players available".to_string()))?;

        let command = json!([
            "spotify",
            "items",
            "0",
            "1",
            format!("item_id:8_{}.{}", term, menu),
            "menu:spotify"
        ]);
        let result = result_of(self.client.request(search_mac, command).await?)?;
        let first = result
            .get("item_loop")
            .and_then(Value::as_array)
            .and_then(|items| items.first());
        let count = result.get("count").and_then(Value::as_u64).unwrap_or(0);
        let Some(item) = first.filter(|_| count > 0) else {
            return Err(SqueezeError::User(format!(
                "No {} matching: {} on Spotify",
                search_type, term
            )));
        };

        let uri = item
            .pointer("/actions/play/params/uri")
            .and_then(Value::as_str)
            .ok_or_else(|| SqueezeError::Server("Spotify result has no play uri".to_string()))?;
        let title = item.get("text").and_then(Value::as_str).unwrap_or(term);

        info!("🎯 Spotify {}: '{}' for '{}'", search_type, title, term);
        self.client
            .request_target(
                &target,
                json!(["spotifyplcmd", format!("uri:{}", uri), "cmd:load"]),
            )
            .await?;
        Ok(format!("Playing {}", title))
    }

    /// Set the volume to `percent` (0 to 100)
    pub async fn set_volume(
        &self,
        session: &mut Session,
        player: Option<&str>,
        percent: &str,
    ) -> SqueezeResult<()> {
        let target = self.target(session, player)?;
        let percent: i64 = percent
            .trim()
            .parse()
            .map_err(|_| SqueezeError::Request("Percentage must be an integer".to_string()))?;
        if !(0..=100).contains(&percent) {
            return Err(SqueezeError::Request(
                "Percentage must be between 0 and 100".to_string(),
            ));
        }

        self.client
            .request_target(&target, json!(["mixer", "volume", percent.to_string()]))
            .await?;
        Ok(())
    }

    /// Put the player to sleep after `minutes`
    pub async fn sleep_in(
        &self,
        session: &mut Session,
        player: Option<&str>,
        minutes: &str,
    ) -> SqueezeResult<()> {
        let target = self.target(session, player)?;
        let minutes: i64 = minutes
            .trim()
            .parse()
            .map_err(|_| SqueezeError::Request("Time must be an integer".to_string()))?;
        if minutes < 0 {
            return Err(SqueezeError::Request("Time must be positive".to_string()));
        }

        let seconds = minutes
            .checked_mul(60)
            .ok_or_else(|| SqueezeError::Request("Time is too long".to_string()))?;

        self.client
            .request_target(&target, json!(["sleep", seconds.to_string()]))
            .await?;
        Ok(())
    }

    /// Move whatever is playing between the addressed player and `other`
    pub async fn send_music(
        &self,
        session: &mut Session,
        player: Option<&str>,
        other: &str,
        direction: Direction,
    ) -> SqueezeResult<()> {
        let name = session.resolve(player)?;
        let this_mac = self.single_mac(&name)?;
        let other_mac = self.single_mac(other)?;

        let (source, dest) = match direction {
            Direction::To => (&this_mac, &other_mac),
            Direction::From => (&other_mac, &this_mac),
        };
        let command = json!([
            "switchplayer",
            format!("from:{}", source),
            format!("to:{}", dest)
        ]);
        self.client.request(&this_mac, command).await?;
        Ok(())
    }

    /// Sync the addressed player to `other` and power both on
    pub async fn sync_player(
        &self,
        session: &mut Session,
        player: Option<&str>,
        other: &str,
    ) -> SqueezeResult<()> {
        let name = session.resolve(player)?;
        let slave = self.single_mac(&name)?;
        let master = self.single_mac(other)?;
        let power_on = find_command("POWER ON")?.request();

        self.client.request(&master, json!(["sync", slave])).await?;
        self.client.request(&slave, power_on.clone()).await?;
        self.client.request(&master, power_on).await?;
        Ok(())
    }

    /// Answer a status query about the addressed player
    pub async fn simple_query(
        &self,
        session: &mut Session,
        player: Option<&str>,
        query: Query,
    ) -> SqueezeResult<QueryReply> {
        let name = session.resolve(player)?;
        let mac = self.single_mac(&name)?;
        let status = self.client.player_info(&mac).await?;
        query.answer(status)
    }

    /// Best known player for a loosely spelled name
    pub fn resolve_player(&self, name: &str, threshold: i32) -> SqueezeResult<Option<String>> {
        if self.players.contains(name) {
            return Ok(Some(name.to_string()));
        }
        Ok(rank(name, &self.players.options(), threshold)?.map(|m| m.label))
    }

    /// Register an extension command; `cached` applies the session's player memory
    pub fn add_custom_command(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn CustomCommand>,
        cached: bool,
    ) {
        let name = name.into();
        debug!("Registered custom command '{}' (cached: {})", name, cached);
        self.custom_commands
            .insert(name, RegisteredCommand { handler, cached });
    }

    /// Run a registered extension command
    pub async fn custom_command(
        &self,
        session: &mut Session,
        name: &str,
        details: Option<Value>,
    ) -> SqueezeResult<Value> {
        let registered = self
            .custom_commands
            .get(name)
            .ok_or_else(|| SqueezeError::Request("Custom Command not available".to_string()))?;

        let details = if registered.cached {
            let mut details = details.unwrap_or_else(|| json!({}));
            session.apply_to_details(&mut details)?;
            Some(details)
        } else {
            details
        };

        let helper = Helper::new(&self.client, &self.base_url, &self.players);
        registered.handler.run(&helper, details).await
    }

    fn target(&self, session: &mut Session, player: Option<&str>) -> SqueezeResult<PlayerTarget> {
        let name = session.resolve(player)?;
        self.players.target(&name)
    }

    fn single_mac(&self, name: &str) -> SqueezeResult<String> {
        match self.players.target(name)? {
            PlayerTarget::Single(mac) => Ok(mac),
            PlayerTarget::Group(_) => Err(SqueezeError::Request(format!(
                "'{}' addresses several players and cannot be used here",
                name
            ))),
        }
    }
}
