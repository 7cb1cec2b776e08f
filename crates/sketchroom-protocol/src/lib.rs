//! Wire protocol for Sketchroom.
//!
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the closed set of
//!   events that travel between browser and room.
//! - **Types** ([`PlayerId`], [`GamePhase`], [`RoomSnapshot`], ...): the
//!   identities and views those messages carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes in, typed values out.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room (state machine)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientMessage, ServerMessage};
pub use sketchroom_transport::ConnectionId;
pub use types::{
    Classification, ConnectionStatus, GamePhase, PlayerId, PlayerView, RemovalReason, RoomId,
    RoomOptions, RoomSnapshot, ScoreEntry, TimerKind, TimerStatus, WordChoice,
};
