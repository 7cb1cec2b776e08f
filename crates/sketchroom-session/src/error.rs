//! Error types for the roster.

use sketchroom_protocol::PlayerId;

/// Errors that can occur when changing a room's roster.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("room is full ({max} players)")]
    CapacityExceeded { max: usize },

    /// The host removed this player; the ID may not rejoin.
    #[error("player {0} was removed from this room")]
    Banned(PlayerId),

    /// The player has already been removed; nothing left to do.
    #[error("player {0} was already removed")]
    AlreadyRemoved(PlayerId),
}
