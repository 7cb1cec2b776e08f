//! Unified error type for the Sketchroom server.

use sketchroom_protocol::ProtocolError;
use sketchroom_room::RoomError;
use sketchroom_transport::TransportError;
use sketchroom_words::WordError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SketchroomError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame that could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rejected room operation.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A word list that could not be loaded.
    #[error(transparent)]
    Words(#[from] WordError),

    #[error("invalid config: {0}")]
    Config(serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
