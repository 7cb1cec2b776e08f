//! Server-wide configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sketchroom_room::SessionOptions;
use tracing::warn;

use crate::SketchroomError;

/// Everything the server needs besides the word list.
///
/// Loadable from JSON; every field is optional and falls back to its
/// default. `session` holds the defaults each new room starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub bind: String,
    /// Depth of each connection's outbound queue. A player whose queue is
    /// full misses messages rather than stalling the room.
    pub outbound_queue: usize,
    /// Depth of each room's command channel.
    pub room_channel: usize,
    /// How long a new socket may wait before sending `create-room`/`join`.
    pub join_timeout_secs: u64,
    /// Close a connection after this long without a frame; 0 disables.
    pub idle_timeout_secs: u64,
    pub session: SessionOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            outbound_queue: 256,
            room_channel: 64,
            join_timeout_secs: 10,
            idle_timeout_secs: 0,
            session: SessionOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Reads a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SketchroomError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(json: &str) -> Result<Self, SketchroomError> {
        serde_json::from_str(json).map_err(SketchroomError::Config)
    }

    /// Clamps queue sizes and timeouts, then validates the room defaults.
    pub fn validated(mut self) -> Self {
        if self.outbound_queue == 0 {
            warn!("outboundQueue must be positive; using 1");
            self.outbound_queue = 1;
        }
        if self.room_channel == 0 {
            warn!("roomChannel must be positive; using 1");
            self.room_channel = 1;
        }
        if self.join_timeout_secs == 0 {
            warn!("joinTimeoutSecs must be positive; using 1");
            self.join_timeout_secs = 1;
        }
        self.session = self.session.validated();
        self
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}
