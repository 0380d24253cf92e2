//! Squeezebox Controller Library
//!
//! Issues playback commands to a Squeezebox (Logitech Media Server) and
//! resolves loosely typed search terms and command names with a block edit
//! similarity score.

pub mod commands;
pub mod config;
pub mod controller;
pub mod custom;
pub mod error;
pub mod players;
pub mod session;
pub mod utils;

pub use controller::{Direction, SearchRequest, SqueezeBoxController};
pub use error::{SqueezeError, SqueezeResult};
pub use session::Session;
