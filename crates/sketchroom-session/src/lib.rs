//! Player connection management for Sketchroom.
//!
//! A [`Roster`] holds the players of one room in join order. Each
//! [`Player`] carries an explicit [`ConnectionState`] with transition
//! methods; reconnection is "join with a known ID", detected by the roster
//! rather than by flags scattered over the player.
//!
//! Grace timers themselves live in the room's timer registry. The roster
//! only remembers each player's pending removal handle so it can be
//! cancelled on reconnect.

mod error;
mod player;
mod roster;

pub use error::SessionError;
pub use player::{ConnectionState, Player, Reconnect};
pub use roster::{FALLBACK_COLOR, JoinOutcome, PALETTE, Removal, Roster};
