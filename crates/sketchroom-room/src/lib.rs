//! Rooms for Sketchroom: the game state machine and the tasks that run it.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`Session`]: roster, timers, word history and broadcast fanout. Nothing
//! is shared between rooms except the [`SessionRegistry`] index.
//!
//! # Key types
//!
//! - [`Session`]: synchronous round/turn state machine
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`SessionRegistry`]: create, look up and tear down rooms
//! - [`SessionOptions`]: per-room game settings
//! - [`RevealSchedule`]: when hint letters are uncovered

mod config;
mod error;
mod fanout;
mod registry;
pub mod reveal;
mod room;
mod round;
mod session;

pub use config::SessionOptions;
pub use error::RoomError;
pub use fanout::{Fanout, Outbox};
pub use registry::SessionRegistry;
pub use reveal::{RevealSchedule, RevealStep, RevealTarget};
pub use room::{RoomHandle, RoomInfo};
pub use round::Round;
pub use session::{Flow, PlayerAction, Session};
