//! # Sketchroom
//!
//! Session coordination server for real-time drawing-and-guessing games.
//!
//! Sketchroom owns the authoritative game state of every room: who is in
//! it, whose turn it is to draw, which word is secret, how guesses score
//! and when timers fire. Browsers talk to it over WebSocket with the JSON
//! messages in [`protocol`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketchroom::prelude::*;
//!
//! # async fn run() -> Result<(), SketchroomError> {
//! let server = SketchroomServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::SketchroomError;
pub use server::{SketchroomServer, SketchroomServerBuilder};

pub use sketchroom_protocol as protocol;
pub use sketchroom_room as room;
pub use sketchroom_session as session;
pub use sketchroom_timer as timer;
pub use sketchroom_transport as transport;
pub use sketchroom_words as words;

pub mod prelude {
    pub use crate::{ServerConfig, SketchroomError, SketchroomServer, SketchroomServerBuilder};
    pub use sketchroom_protocol::{
        ClientMessage, GamePhase, PlayerId, RoomId, RoomOptions, RoomSnapshot, ServerMessage,
        TimerKind, WordChoice,
    };
    pub use sketchroom_room::{RoomError, RoomHandle, SessionOptions, SessionRegistry};
    pub use sketchroom_words::{FixedWords, WordBank, WordProvider};
}
