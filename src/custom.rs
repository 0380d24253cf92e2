//! User-defined commands
//!
//! Extensions register a [`CustomCommand`] under a name; when invoked they get
//! a [`Helper`] with the same request plumbing the built-in commands use.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SqueezeResult;
use crate::players::{PlayerDirectory, PlayerTarget, RpcClient};

/// Request plumbing handed to custom commands
pub struct Helper<'a> {
    client: &'a RpcClient,
    base_url: &'a str,
    players: &'a PlayerDirectory,
}

impl<'a> Helper<'a> {
    pub(crate) fn new(client: &'a RpcClient, base_url: &'a str, players: &'a PlayerDirectory) -> Self {
        Self {
            client,
            base_url,
            players,
        }
    }

    /// Send a raw command to a player or group
    pub async fn make_request(&self, target: &PlayerTarget, command: Value) -> SqueezeResult<Value> {
        self.client.request_target(target, command).await
    }

    /// The `status` document of one player
    pub async fn get_player_info(&self, mac: &str) -> SqueezeResult<Value> {
        self.client.player_info(mac).await
    }

    pub fn base_url(&self) -> &str {
        self.base_url
    }

    /// Name to MAC lookup of known players
    pub fn player_lookup(&self) -> &PlayerDirectory {
        self.players
    }
}

/// A named extension command
#[async_trait]
pub trait CustomCommand: Send + Sync {
    /// Run the command. `details` is whatever the caller passed, with the
    /// remembered player filled in when the command was registered as cached.
    async fn run(&self, helper: &Helper<'_>, details: Option<Value>) -> SqueezeResult<Value>;
}
