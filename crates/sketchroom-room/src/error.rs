//! Error types for the room layer.
//!
//! Every variant is recoverable: it is reported to the player whose action
//! caused it and never stops the room.

use sketchroom_protocol::{PlayerId, RoomId, ServerMessage};
use sketchroom_session::SessionError;

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room with this ID exists (or it was torn down mid-request).
    #[error("room {0} not found")]
    SessionNotFound(RoomId),

    /// `create` was called with an ID that is already taken.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The action is not allowed in the current phase or by this player.
    #[error("{0}")]
    InvalidTransition(String),

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("room is full ({max} players)")]
    CapacityExceeded { max: usize },

    /// A transition handler panicked; the room kept its previous state.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RoomError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidTransition(reason.into())
    }

    /// HTTP-style status code for the wire.
    pub fn code(&self) -> u16 {
        match self {
            RoomError::SessionNotFound(_) | RoomError::PlayerNotFound(_) => 404,
            RoomError::AlreadyExists(_) => 409,
            RoomError::InvalidTransition(_) => 400,
            RoomError::CapacityExceeded { .. } => 503,
            RoomError::Internal(_) => 500,
        }
    }

    /// Stable kebab-case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            RoomError::SessionNotFound(_) => "session-not-found",
            RoomError::AlreadyExists(_) => "already-exists",
            RoomError::InvalidTransition(_) => "invalid-transition",
            RoomError::PlayerNotFound(_) => "player-not-found",
            RoomError::CapacityExceeded { .. } => "capacity-exceeded",
            RoomError::Internal(_) => "internal",
        }
    }

    /// The `error` message sent back to the originator.
    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error {
            code: self.code(),
            kind: self.kind().to_owned(),
            message: self.to_string(),
        }
    }
}

impl From<SessionError> for RoomError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::PlayerNotFound(id) | SessionError::AlreadyRemoved(id) => {
                RoomError::PlayerNotFound(id)
            }
            SessionError::CapacityExceeded { max } => RoomError::CapacityExceeded { max },
            banned @ SessionError::Banned(_) => RoomError::InvalidTransition(banned.to_string()),
        }
    }
}
