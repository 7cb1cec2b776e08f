//! Session registry: creates, finds and tears down rooms.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sketchroom_protocol::{ConnectionId, PlayerId, RoomId, RoomOptions};
use sketchroom_timer::TimerRegistry;
use sketchroom_words::WordProvider;
use tracing::info;

use crate::room::spawn_room;
use crate::{Outbox, RoomError, RoomHandle, Session, SessionOptions};

/// Live rooms keyed by ID; shared with every actor so it can deregister.
pub(crate) type Rooms = Arc<DashMap<RoomId, RoomHandle>>;

/// Every live room of the process.
///
/// Cheap to clone and safe to use from any number of connection tasks.
/// Creating a room is check-and-insert under the map's shard lock, so two
/// concurrent creates with the same ID can never both succeed.
#[derive(Clone)]
pub struct SessionRegistry {
    rooms: Rooms,
    defaults: Arc<SessionOptions>,
    words: Arc<dyn WordProvider>,
    channel_size: usize,
}

impl SessionRegistry {
    /// Default command channel size for room actors.
    pub const DEFAULT_CHANNEL_SIZE: usize = 64;

    pub fn new(defaults: SessionOptions, words: Arc<dyn WordProvider>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            defaults: Arc::new(defaults.validated()),
            words,
            channel_size: Self::DEFAULT_CHANNEL_SIZE,
        }
    }

    pub fn with_channel_size(mut self, channel_size: usize) -> Self {
        self.channel_size = channel_size.max(1);
        self
    }

    pub fn defaults(&self) -> &SessionOptions {
        &self.defaults
    }

    /// Creates `room_id` with `host_id` as its first player and host.
    ///
    /// The host is joined before the room becomes visible, so nobody can
    /// slip in ahead of them.
    pub fn create(
        &self,
        room_id: RoomId,
        host_id: PlayerId,
        name: String,
        connection: ConnectionId,
        outbox: Outbox,
        overrides: Option<&RoomOptions>,
    ) -> Result<RoomHandle, RoomError> {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(_) => Err(RoomError::AlreadyExists(room_id)),
            Entry::Vacant(vacant) => {
                let options = match overrides {
                    Some(overrides) => self.defaults.as_ref().clone().with_overrides(overrides),
                    None => self.defaults.as_ref().clone(),
                };
                let (timers, timer_events) = TimerRegistry::new(room_id.clone());
                let mut session = Session::new(room_id.clone(), options, self.words.clone(), timers);
                session.join(host_id.clone(), name, connection, outbox)?;

                let handle = spawn_room(session, timer_events, self.rooms.clone(), self.channel_size);
                vacant.insert(handle.clone());
                info!(%room_id, host = %host_id, rooms = self.rooms.len(), "room created");
                Ok(handle)
            }
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RoomError::SessionNotFound(room_id.clone()))
    }

    /// Joins (or reattaches) a player to an existing room.
    pub async fn join(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        name: String,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<RoomHandle, RoomError> {
        let handle = self.get(room_id)?;
        handle.join(player_id, name, connection, outbox).await?;
        Ok(handle)
    }

    /// Shuts a room down and forgets it.
    pub async fn remove(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let (_, handle) = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::SessionNotFound(room_id.clone()))?;
        // Already stopped is fine.
        let _ = handle.shutdown().await;
        info!(%room_id, "room removed");
        Ok(())
    }

    /// Shuts down every room.
    pub async fn shutdown_all(&self) {
        let handles: Vec<RoomHandle> = self.rooms.iter().map(|e| e.value().clone()).collect();
        self.rooms.clear();
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Sorted IDs of every live room.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }
}
