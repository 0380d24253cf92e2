//! Player Session
//!
//! Remembers the last player a command was addressed to, so follow-up
//! commands ("pause", "louder") can omit it.

use serde_json::Value;
use tracing::debug;

use crate::error::{SqueezeError, SqueezeResult};

/// Stands for "the remembered player" in requests and custom command details
pub const PLAYER_PLACEHOLDER: &str = "$player";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cached_player: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a remembered player, e.g. from the config
    pub fn with_player(player: Option<String>) -> Self {
        Self {
            cached_player: player.filter(|p| !p.is_empty()),
        }
    }

    pub fn cached_player(&self) -> Option<&str> {
        self.cached_player.as_deref()
    }

    /// Pick the player for a command.
    ///
    /// An absent, empty or [`PLAYER_PLACEHOLDER`] request falls back to the
    /// remembered player; a named player becomes the new remembered one.
    pub fn resolve(&mut self, requested: Option<&str>) -> SqueezeResult<String> {
        match requested.filter(|p| !p.is_empty() && *p != PLAYER_PLACEHOLDER) {
            Some(player) => {
                if self.cached_player.as_deref() != Some(player) {
                    debug!("Remembering player '{}'", player);
                }
                self.cached_player = Some(player.to_string());
                Ok(player.to_string())
            }
            None => self
                .cached_player
                .clone()
                .ok_or_else(|| SqueezeError::Request("player not specified".to_string())),
        }
    }

    /// Same rule as [`Session::resolve`], applied to the `"player"` field of a
    /// custom command's details object.
    pub fn apply_to_details(&mut self, details: &mut Value) -> SqueezeResult<()> {
        let requested = details
            .get("player")
            .and_then(Value::as_str)
            .map(str::to_string);
        let player = self.resolve(requested.as_deref())?;
        if let Some(obj) = details.as_object_mut() {
            obj.insert("player".to_string(), Value::String(player));
        }
        Ok(())
    }
}
