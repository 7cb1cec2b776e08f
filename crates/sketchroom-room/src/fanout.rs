//! Broadcast fanout: delivers one room's events to its players' outboxes.
//!
//! Each connected player has a bounded queue drained by its connection's
//! writer task. Delivery uses `try_send`, so a full or closed queue costs
//! that one recipient a message and never blocks the room. Because a room
//! is driven by a single task, each recipient sees messages in exactly the
//! order they were issued.

use std::collections::HashMap;

use sketchroom_protocol::{PlayerId, RoomId, ServerMessage};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace, warn};

/// The sending half of one player's outbound queue.
pub type Outbox = mpsc::Sender<ServerMessage>;

pub struct Fanout {
    room_id: RoomId,
    outboxes: HashMap<PlayerId, Outbox>,
}

impl Fanout {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            outboxes: HashMap::new(),
        }
    }

    /// Routes `player_id`'s messages to `outbox`, returning the outbox it
    /// replaces. Dropping the old outbox ends the old writer task.
    pub fn attach(&mut self, player_id: PlayerId, outbox: Outbox) -> Option<Outbox> {
        self.outboxes.insert(player_id, outbox)
    }

    pub fn detach(&mut self, player_id: &PlayerId) -> Option<Outbox> {
        self.outboxes.remove(player_id)
    }

    pub fn is_attached(&self, player_id: &PlayerId) -> bool {
        self.outboxes.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.outboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outboxes.is_empty()
    }

    /// Drops every outbox.
    pub fn clear(&mut self) {
        self.outboxes.clear();
    }

    pub fn to_room(&self, msg: ServerMessage) {
        for (player_id, outbox) in &self.outboxes {
            self.deliver(player_id, outbox, msg.clone());
        }
    }

    pub fn to_player(&self, player_id: &PlayerId, msg: ServerMessage) {
        if let Some(outbox) = self.outboxes.get(player_id) {
            self.deliver(player_id, outbox, msg);
        }
    }

    pub fn to_others(&self, excluded: &PlayerId, msg: ServerMessage) {
        for (player_id, outbox) in &self.outboxes {
            if player_id != excluded {
                self.deliver(player_id, outbox, msg.clone());
            }
        }
    }

    fn deliver(&self, player_id: &PlayerId, outbox: &Outbox, msg: ServerMessage) {
        let name = msg.name();
        match outbox.try_send(msg) {
            Ok(()) => trace!(room_id = %self.room_id, %player_id, msg = name, "queued"),
            Err(TrySendError::Full(_)) => {
                warn!(room_id = %self.room_id, %player_id, msg = name, "outbound queue full, message dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(room_id = %self.room_id, %player_id, msg = name, "outbound queue closed");
            }
        }
    }
}
