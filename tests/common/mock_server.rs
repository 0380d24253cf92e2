//! Mock Squeezebox Server for Testing
//!
//! Answers `slim.request` calls from canned responses and records every
//! request for verification.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

use squeezebox_controller::players::Transport;
use squeezebox_controller::SqueezeResult;

/// Mock server that records (player, command) pairs
#[derive(Debug)]
pub struct MockServer {
    players: Vec<(String, String)>,
    /// Canned `result` documents keyed by the command's first word
    responses: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<(String, Value)>>,
    urls: Mutex<Vec<String>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::with_players(&[("a", "1"), ("b", "2")])
    }

    pub fn with_players(players: &[(&str, &str)]) -> Self {
        Self {
            players: players
                .iter()
                .map(|(name, mac)| (name.to_string(), mac.to_string()))
                .collect(),
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Answer commands starting with `verb` with `result`
    pub fn respond(&self, verb: &str, result: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(verb.to_string(), result);
    }

    /// All requests so far as (player, command)
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests after player discovery
    pub fn player_requests(&self) -> Vec<(String, Value)> {
        self.requests()
            .into_iter()
            .filter(|(player, _)| player != "-")
            .collect()
    }

    pub fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockServer {
    async fn post(&self, url: &str, payload: &Value) -> SqueezeResult<Value> {
        assert_eq!(payload["method"], "slim.request");
        let player = payload["params"][0].as_str().unwrap_or_default().to_string();
        let command = payload["params"][1].clone();

        self.urls.lock().unwrap().push(url.to_string());
        self.requests
            .lock()
            .unwrap()
            .push((player.clone(), command.clone()));

        let verb = command[0].as_str().unwrap_or_default().to_string();
        let result = match (player.as_str(), verb.as_str()) {
            ("-", "player") => json!({"_count": self.players.len()}),
            ("-", "players") => json!({
                "players_loop": self
                    .players
                    .iter()
                    .map(|(name, mac)| json!({"name": name, "playerid": mac}))
                    .collect::<Vec<_>>()
            }),
            _ => self
                .responses
                .lock()
                .unwrap()
                .get(&verb)
                .cloned()
                .unwrap_or_else(|| json!("success")),
        };
        Ok(json!({ "result": result }))
    }
}
