use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{SqueezeError, SqueezeResult};
use crate::utils::fuzzy::CandidateOption;

pub mod http;

pub use http::HttpTransport;

/// Reserved player name addressing every player at once
pub const ALL_PLAYERS: &str = "ALL";

/// Player id used for server-wide requests
pub const SERVER: &str = "-";

/// Tidies player names reported by the server (e.g. strip a room suffix)
pub type NameCleanup = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Moves JSON documents to and from the server
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to `url` and return the decoded response body
    async fn post(&self, url: &str, payload: &Value) -> SqueezeResult<Value>;
}

/// One player or a group of players addressed by MAC
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerTarget {
    Single(String),
    Group(Vec<String>),
}

impl PlayerTarget {
    /// First MAC of the target, for requests that only make sense once
    pub fn primary(&self) -> Option<&str> {
        match self {
            PlayerTarget::Single(mac) => Some(mac),
            PlayerTarget::Group(macs) => macs.first().map(String::as_str),
        }
    }
}

/// JSON-RPC client for the server's `slim.request` endpoint
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            endpoint: format!("{}/jsonrpc.js", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `command` to a single player (or [`SERVER`])
    pub async fn request(&self, player: &str, command: Value) -> SqueezeResult<Value> {
        let payload = json!({
            "method": "slim.request",
            "params": [player, command],
        });
        debug!("slim.request -> {}: {}", player, payload["params"][1]);
        self.transport.post(&self.endpoint, &payload).await
    }

    /// Send `command` to every player of `target`.
    ///
    /// A group answers with a JSON array holding one response per player.
    pub async fn request_target(&self, target: &PlayerTarget, command: Value) -> SqueezeResult<Value> {
        match target {
            PlayerTarget::Single(mac) => self.request(mac, command).await,
            PlayerTarget::Group(macs) => {
                let responses =
                    join_all(macs.iter().map(|mac| self.request(mac, command.clone()))).await;
                let responses = responses.into_iter().collect::<SqueezeResult<Vec<_>>>()?;
                Ok(Value::Array(responses))
            }
        }
    }

    /// The `status` document of one player
    pub async fn player_info(&self, mac: &str) -> SqueezeResult<Value> {
        let response = self.request(mac, json!(["status", "-"])).await?;
        result_of(response)
    }
}

/// Pull the `result` member out of a response
pub fn result_of(mut response: Value) -> SqueezeResult<Value> {
    match response.get_mut("result").map(Value::take) {
        Some(result) => Ok(result),
        None => Err(SqueezeError::Server(format!(
            "response has no result: {}",
            response
        ))),
    }
}

/// Known players by display name, in server order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDirectory {
    players: Vec<(String, String)>,
}

impl PlayerDirectory {
    /// Build a directory from (name, MAC) pairs
    pub fn from_players<I>(players: I) -> SqueezeResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut directory = Self::default();
        for (name, mac) in players {
            if name == ALL_PLAYERS {
                return Err(SqueezeError::Player(format!(
                    "'{}' is reserved and cannot name a player",
                    ALL_PLAYERS
                )));
            }
            match directory.players.iter_mut().find(|(n, _)| *n == name) {
                Some(entry) => entry.1 = mac,
                None => directory.players.push((name, mac)),
            }
        }
        Ok(directory)
    }

    /// Ask the server for its players
    pub async fn discover(client: &RpcClient, cleanup: Option<&NameCleanup>) -> SqueezeResult<Self> {
        let count = result_of(client.request(SERVER, json!(["player", "count", "?"])).await?)?;
        let count = count
            .get("_count")
            .and_then(as_count)
            .ok_or_else(|| SqueezeError::Server("player count missing".to_string()))?;

        let listing = result_of(client.request(SERVER, json!(["players", "0", count])).await?)?;
        let entries = listing
            .get("players_loop")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut players = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = entry.get("name").and_then(Value::as_str);
            let mac = entry.get("playerid").and_then(Value::as_str);
            if let (Some(name), Some(mac)) = (name, mac) {
                // Reserved-name check happens on the raw server name.
                if name == ALL_PLAYERS {
                    return Err(SqueezeError::Player(format!(
                        "server reports a player named '{}'",
                        ALL_PLAYERS
                    )));
                }
                let name = match cleanup {
                    Some(f) => f(name),
                    None => name.to_string(),
                };
                players.push((name, mac.to_string()));
            }
        }

        let directory = Self::from_players(players)?;
        info!("🔊 Found {} players: {}", directory.len(), directory.names().join(", "));
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Player names, followed by [`ALL_PLAYERS`]
    pub fn names(&self) -> Vec<String> {
        self.players
            .iter()
            .map(|(name, _)| name.clone())
            .chain(std::iter::once(ALL_PLAYERS.to_string()))
            .collect()
    }

    pub fn mac(&self, name: &str) -> Option<&str> {
        self.players
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, mac)| mac.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        name == ALL_PLAYERS || self.mac(name).is_some()
    }

    /// Resolve a player name; [`ALL_PLAYERS`] addresses every player
    pub fn target(&self, name: &str) -> SqueezeResult<PlayerTarget> {
        if name == ALL_PLAYERS {
            return Ok(PlayerTarget::Group(
                self.players.iter().map(|(_, mac)| mac.clone()).collect(),
            ));
        }
        self.mac(name)
            .map(|mac| PlayerTarget::Single(mac.to_string()))
            .ok_or_else(|| {
                SqueezeError::Request(format!(
                    "player must be one of: {}",
                    self.names().join(", ")
                ))
            })
    }

    /// Player names as ranking options
    pub fn options(&self) -> Vec<CandidateOption> {
        self.names().into_iter().map(CandidateOption::bare).collect()
    }

    /// Name to MAC lookup, without the group entry
    pub fn entries(&self) -> &[(String, String)] {
        &self.players
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> PlayerDirectory {
        PlayerDirectory::from_players(vec![
            ("Kitchen".to_string(), "00:01".to_string()),
            ("Lounge".to_string(), "00:02".to_string()),
        ])
        .unwrap()
    }

    #[test]
    fn test_target_lookup() {
        let dir = directory();
        assert_eq!(
            dir.target("Lounge").unwrap(),
            PlayerTarget::Single("00:02".to_string())
        );
        assert_eq!(
            dir.target(ALL_PLAYERS).unwrap(),
            PlayerTarget::Group(vec!["00:01".to_string(), "00:02".to_string()])
        );
        assert!(matches!(dir.target("Attic"), Err(SqueezeError::Request(_))));
    }

    #[test]
    fn test_names_include_group() {
        assert_eq!(directory().names(), vec!["Kitchen", "Lounge", "ALL"]);
        assert!(directory().contains("ALL"));
    }

    #[test]
    fn test_reserved_name_rejected() {
        let result = PlayerDirectory::from_players(vec![("ALL".to_string(), "x".to_string())]);
        assert!(matches!(result, Err(SqueezeError::Player(_))));
    }

    #[test]
    fn test_result_of() {
        assert_eq!(result_of(json!({"result": {"a": 1}})).unwrap(), json!({"a": 1}));
        assert!(matches!(
            result_of(json!({"error": "nope"})),
            Err(SqueezeError::Server(_))
        ));
    }

    #[test]
    fn test_count_parsing() {
        assert_eq!(as_count(&json!(3)), Some(3));
        assert_eq!(as_count(&json!("2")), Some(2));
        assert_eq!(as_count(&json!(null)), None);
    }

    struct Echo;

    #[async_trait]
    impl Transport for Echo {
        async fn post(&self, _url: &str, payload: &Value) -> SqueezeResult<Value> {
            Ok(json!({"result": {"player": payload["params"][0]}}))
        }
    }

    #[test]
    fn test_group_request_fans_out() {
        let client = RpcClient::new(Arc::new(Echo), "http://host:9000/");
        assert_eq!(client.endpoint(), "http://host:9000/jsonrpc.js");

        let target = PlayerTarget::Group(vec!["00:01".into(), "00:02".into()]);
        let response = tokio_test::block_on(client.request_target(&target, json!(["play"]))).unwrap();
        assert_eq!(
            response,
            json!([
                {"result": {"player": "00:01"}},
                {"result": {"player": "00:02"}}
            ])
        );
    }

    #[test]
    fn test_group_primary() {
        assert_eq!(PlayerTarget::Group(vec![]).primary(), None);
        assert_eq!(PlayerTarget::Single("m".into()).primary(), Some("m"));
    }
}
