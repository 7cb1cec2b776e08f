//! A single participant and its connection lifecycle.
//!
//! ```text
//!                 disconnect(conn)            grace timer expires
//!   Connected ───────────────────► GracePeriod ──────────────────► Removed
//!       ▲                              │
//!       └──────── connect(conn) ───────┘
//! ```
//!
//! `Connected → Connected` via [`Player::connect`] is a takeover: a new
//! socket replaces the old one. `leave` and kicks go straight to
//! `Removed` from either live state. `Removed` is terminal.

use sketchroom_protocol::{ConnectionId, ConnectionStatus, PlayerId, PlayerView};
use sketchroom_timer::TimerHandle;
use tokio::time::Instant;

use crate::SessionError;

/// Liveness of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    /// The socket dropped at `since`; the slot is held for reconnection.
    GracePeriod { since: Instant },
    Removed,
}

impl ConnectionState {
    pub fn status(&self) -> ConnectionStatus {
        match self {
            ConnectionState::Connected => ConnectionStatus::Connected,
            ConnectionState::GracePeriod { .. } => ConnectionStatus::GracePeriod,
            ConnectionState::Removed => ConnectionStatus::Removed,
        }
    }
}

/// What [`Player::connect`] replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconnect {
    /// The player was in its grace period. The pending removal timer, if
    /// any, must be stopped by the caller.
    Resumed { pending_removal: Option<TimerHandle> },
    /// The player was still connected on another socket, which is now
    /// superseded.
    TookOver { previous: Option<ConnectionId> },
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    score: u32,
    pub is_host: bool,
    pub is_drawing: bool,
    has_guessed_correctly: bool,
    state: ConnectionState,
    connection: Option<ConnectionId>,
    pending_removal: Option<TimerHandle>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, color: String, connection: ConnectionId) -> Self {
        Self {
            id,
            name,
            color,
            score: 0,
            is_host: false,
            is_drawing: false,
            has_guessed_correctly: false,
            state: ConnectionState::Connected,
            connection: Some(connection),
            pending_removal: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn has_guessed_correctly(&self) -> bool {
        self.has_guessed_correctly
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    pub fn connection(&self) -> Option<ConnectionId> {
        self.connection
    }

    pub fn pending_removal(&self) -> Option<&TimerHandle> {
        self.pending_removal.as_ref()
    }

    // -- Transitions --------------------------------------------------------

    /// Attaches a new socket.
    ///
    /// # Errors
    /// `AlreadyRemoved` once the player has been removed.
    pub fn connect(&mut self, connection: ConnectionId) -> Result<Reconnect, SessionError> {
        match self.state {
            ConnectionState::Removed => Err(SessionError::AlreadyRemoved(self.id.clone())),
            ConnectionState::GracePeriod { .. } => {
                self.state = ConnectionState::Connected;
                self.connection = Some(connection);
                Ok(Reconnect::Resumed {
                    pending_removal: self.pending_removal.take(),
                })
            }
            ConnectionState::Connected => {
                let previous = self.connection.replace(connection);
                Ok(Reconnect::TookOver { previous })
            }
        }
    }

    /// Starts the grace period if `connection` is the live socket.
    ///
    /// Returns `false` (and changes nothing) for a superseded socket or a
    /// player that is not connected.
    pub fn disconnect(&mut self, connection: ConnectionId) -> bool {
        if !self.is_connected() || self.connection != Some(connection) {
            return false;
        }
        self.state = ConnectionState::GracePeriod {
            since: Instant::now(),
        };
        self.connection = None;
        true
    }

    /// Records the timer that will remove this player unless it reconnects.
    pub fn set_pending_removal(&mut self, handle: TimerHandle) {
        self.pending_removal = Some(handle);
    }

    /// Terminal transition. Returns the pending removal timer, if any.
    pub fn mark_removed(&mut self) -> Option<TimerHandle> {
        self.state = ConnectionState::Removed;
        self.connection = None;
        self.is_drawing = false;
        self.is_host = false;
        self.pending_removal.take()
    }

    /// Sets the per-round flag. Returns `false` if it was already set.
    pub fn mark_guessed(&mut self) -> bool {
        if self.has_guessed_correctly {
            return false;
        }
        self.has_guessed_correctly = true;
        true
    }

    pub fn reset_guess(&mut self) {
        self.has_guessed_correctly = false;
    }

    /// Adds `points` and returns the new score. Scores never decrease.
    pub fn award(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            name: self.name.clone(),
            color: self.color.clone(),
            score: self.score,
            is_host: self.is_host,
            is_drawing: self.is_drawing,
            has_guessed: self.has_guessed_correctly,
            connection: self.state.status(),
        }
    }
}
