//! Room actor: one Tokio task per room that owns its [`Session`].
//!
//! The actor multiplexes two inputs with `select!`: commands from
//! connection handlers (through a bounded mpsc channel) and events from
//! the room's own timers. It processes exactly one of them at a time, so
//! the session never sees interleaved updates.
//!
//! A panicking handler is contained: the caller gets
//! [`RoomError::Internal`] and the room keeps serving. Nothing is rolled
//! back, so whatever the handler changed before the panic stays changed
//! and the session may be left partially updated.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use sketchroom_protocol::{ConnectionId, GamePhase, PlayerId, RoomId, RoomSnapshot};
use sketchroom_timer::TimerEvent;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::registry::Rooms;
use crate::{Flow, Outbox, PlayerAction, RoomError, Session};

/// Distinguishes successive rooms that reuse the same ID.
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Commands sent to a room actor through its channel.
///
/// Variants with a `reply` sender are request/response; the caller
/// awaits the oneshot.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        connection: ConnectionId,
        outbox: Outbox,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A socket closed. Fire-and-forget.
    Disconnect {
        player_id: PlayerId,
        connection: ConnectionId,
    },

    Action {
        player_id: PlayerId,
        action: PlayerAction,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Snapshot {
        viewer: Option<PlayerId>,
        reply: oneshot::Sender<RoomSnapshot>,
    },

    Shutdown,
}

/// Room metadata, without game details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub phase: GamePhase,
    pub round_number: u32,
    pub player_count: usize,
    pub connected_count: usize,
    pub max_players: usize,
    pub paused: bool,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Every method fails with
/// [`RoomError::SessionNotFound`] once the room has been torn down.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    instance: u64,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub(crate) fn instance(&self) -> u64 {
        self.instance
    }

    /// The actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn gone(&self) -> RoomError {
        RoomError::SessionNotFound(self.room_id.clone())
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())
    }

    /// Joins a new player or reattaches a returning one.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player_id,
            name,
            connection,
            outbox,
            reply,
        })
        .await?
    }

    /// Reports a closed socket (fire-and-forget).
    pub async fn disconnect(
        &self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnect {
                player_id,
                connection,
            })
            .await
            .map_err(|_| self.gone())
    }

    pub async fn act(&self, player_id: PlayerId, action: PlayerAction) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Action {
            player_id,
            action,
            reply,
        })
        .await?
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// The room as `viewer` would see it; `None` views as a spectator.
    pub async fn snapshot(&self, viewer: Option<PlayerId>) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { viewer, reply })
            .await
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.gone())
    }
}

struct RoomActor {
    room_id: RoomId,
    instance: u64,
    session: Session,
    commands: mpsc::Receiver<RoomCommand>,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
    rooms: Rooms,
}

impl RoomActor {
    async fn run(mut self) {
        info!(room_id = %self.room_id, instance = self.instance, "room actor started");

        loop {
            let flow = tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        debug!(room_id = %self.room_id, "all handles dropped");
                        Flow::Teardown
                    }
                },
                Some(event) = self.timer_events.recv() => {
                    self.guarded("timer", |session| Ok(session.on_timer(event)))
                        .unwrap_or(Flow::Continue)
                }
            };
            if flow == Flow::Teardown {
                break;
            }
        }

        self.session.shutdown();
        let instance = self.instance;
        self.rooms
            .remove_if(&self.room_id, |_, handle| handle.instance() == instance);
        info!(room_id = %self.room_id, instance, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) -> Flow {
        match cmd {
            RoomCommand::Join {
                player_id,
                name,
                connection,
                outbox,
                reply,
            } => {
                let result = self.guarded("join", |session| {
                    session.join(player_id, name, connection, outbox)
                });
                let _ = reply.send(result);
                Flow::Continue
            }
            RoomCommand::Disconnect {
                player_id,
                connection,
            } => {
                let _ = self.guarded("disconnect", |session| {
                    session.disconnect(&player_id, connection);
                    Ok(())
                });
                Flow::Continue
            }
            RoomCommand::Action {
                player_id,
                action,
                reply,
            } => {
                let what = action.name();
                let result = self.guarded(what, |session| session.act(&player_id, action));
                if let Err(err) = &result {
                    debug!(room_id = %self.room_id, %player_id, action = what, %err, "action rejected");
                }
                let flow = result.as_ref().copied().unwrap_or(Flow::Continue);
                let _ = reply.send(result.map(|_| ()));
                flow
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
                Flow::Continue
            }
            RoomCommand::Snapshot { viewer, reply } => {
                let _ = reply.send(self.session.snapshot_for(viewer.as_ref()));
                Flow::Continue
            }
            RoomCommand::Shutdown => {
                info!(room_id = %self.room_id, "room shutting down");
                Flow::Teardown
            }
        }
    }

    /// Runs `f` against the session, turning a panic into
    /// [`RoomError::Internal`].
    ///
    /// Mutations `f` made before panicking are kept, and no invariant is
    /// restored afterwards.
    fn guarded<T>(
        &mut self,
        what: &'static str,
        f: impl FnOnce(&mut Session) -> Result<T, RoomError>,
    ) -> Result<T, RoomError> {
        let session = &mut self.session;
        match panic::catch_unwind(AssertUnwindSafe(|| f(session))) {
            Ok(result) => result,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                error!(room_id = %self.room_id, handler = what, %reason, "room handler panicked");
                Err(RoomError::Internal(format!("{what} handler failed")))
            }
        }
    }

    fn info(&self) -> RoomInfo {
        let roster = self.session.roster();
        RoomInfo {
            room_id: self.room_id.clone(),
            phase: self.session.phase(),
            round_number: self.session.round_number(),
            player_count: roster.len(),
            connected_count: roster.connected_count(),
            max_players: roster.max_players(),
            paused: self.session.is_paused(),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Spawns the actor for `session` and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
/// On teardown the actor removes itself from `rooms`, unless the entry has
/// since been replaced by a newer room with the same ID.
pub(crate) fn spawn_room(
    session: Session,
    timer_events: mpsc::UnboundedReceiver<TimerEvent>,
    rooms: Rooms,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let room_id = session.room_id().clone();
    let instance = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);

    let actor = RoomActor {
        room_id: room_id.clone(),
        instance,
        session,
        commands: rx,
        timer_events,
        rooms,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        instance,
        sender: tx,
    }
}
