//! Per-connection handler: room entry and message routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `create-room` or `join` → enter a room
//!   2. Spawn the writer task that drains the player's outbox
//!   3. Loop: decode frames → `PlayerAction` → room actor
//!   4. On close → report the disconnect so the grace period starts

use std::sync::Arc;

use sketchroom_protocol::{
    ClientMessage, Codec, JsonCodec, PlayerId, ProtocolError, ServerMessage,
};
use sketchroom_room::{PlayerAction, RoomError, RoomHandle};
use sketchroom_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::SketchroomError;
use crate::server::ServerState;

/// A player that made it into a room.
struct Entered {
    handle: RoomHandle,
    player_id: PlayerId,
    outbox: mpsc::Receiver<ServerMessage>,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), SketchroomError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let Entered {
        handle,
        player_id,
        outbox,
    } = match enter_room(&conn, &state).await {
        Ok(entered) => entered,
        Err(e) => {
            let _ = conn.close().await;
            return Err(e);
        }
    };
    info!(%conn_id, room_id = %handle.room_id(), %player_id, "player entered room");

    // The room owns the sending half. Whenever it lets go (leave, kick,
    // takeover, teardown) the writer closes the socket.
    let writer = tokio::spawn(write_loop(Arc::clone(&conn), outbox, state.codec));

    let result = message_loop(&conn, &state, &handle, &player_id).await;

    if let Err(e) = handle.disconnect(player_id.clone(), conn_id).await {
        trace!(%conn_id, error = %e, "room already gone at disconnect");
    }
    let _ = writer.await;
    debug!(%conn_id, %player_id, "connection finished");
    result
}

/// Waits for the first frame and routes it to the registry.
async fn enter_room(
    conn: &WebSocketConnection,
    state: &ServerState,
) -> Result<Entered, SketchroomError> {
    let data = match timeout(state.config.join_timeout(), conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before join".into()).into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("join timed out".into()).into());
        }
    };

    let msg: ClientMessage = match state.codec.decode(&data) {
        Ok(msg) => msg,
        Err(e) => {
            send(conn, &state.codec, &protocol_error(&e)).await?;
            return Err(e.into());
        }
    };

    let (tx, rx) = mpsc::channel(state.config.outbound_queue);
    let conn_id = conn.id();
    let entered = match msg {
        ClientMessage::CreateRoom {
            room_id,
            player_id,
            name,
            options,
        } => state
            .registry
            .create(room_id, player_id.clone(), name, conn_id, tx, options.as_ref())
            .map(|handle| (handle, player_id)),
        ClientMessage::Join {
            room_id,
            player_id,
            name,
        } => state
            .registry
            .join(&room_id, player_id.clone(), name, conn_id, tx)
            .await
            .map(|handle| (handle, player_id)),
        other => Err(RoomError::InvalidTransition(format!(
            "first message must be create-room or join, got {}",
            other.name()
        ))),
    };

    match entered {
        Ok((handle, player_id)) => Ok(Entered {
            handle,
            player_id,
            outbox: rx,
        }),
        Err(e) => {
            debug!(%conn_id, error = %e, "room entry rejected");
            send(conn, &state.codec, &e.to_message()).await?;
            Err(e.into())
        }
    }
}

/// Forwards frames to the room until the player leaves or the socket ends.
async fn message_loop(
    conn: &WebSocketConnection,
    state: &ServerState,
    handle: &RoomHandle,
    player_id: &PlayerId,
) -> Result<(), SketchroomError> {
    loop {
        let next = match state.config.idle_timeout() {
            Some(limit) => match timeout(limit, conn.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    info!(%player_id, "connection idle, closing");
                    return Ok(());
                }
            },
            None => conn.recv().await,
        };

        let data = match next {
            Ok(Some(data)) => data,
            Ok(None) => {
                info!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Err(e) => {
                debug!(%player_id, error = %e, "recv error");
                return Ok(());
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(%player_id, error = %e, "failed to decode message");
                send(conn, &state.codec, &protocol_error(&e)).await?;
                continue;
            }
        };
        trace!(%player_id, message = msg.name(), "received");

        let action = match PlayerAction::try_from(msg) {
            Ok(action) => action,
            Err(e) => {
                send(conn, &state.codec, &e.to_message()).await?;
                continue;
            }
        };
        let leaving = action == PlayerAction::Leave;

        match handle.act(player_id.clone(), action).await {
            Ok(()) if leaving => return Ok(()),
            Ok(()) => {}
            Err(e @ RoomError::SessionNotFound(_)) => {
                let _ = send(conn, &state.codec, &e.to_message()).await;
                return Ok(());
            }
            Err(e) => {
                debug!(%player_id, error = %e, "action rejected");
                send(conn, &state.codec, &e.to_message()).await?;
            }
        }
    }
}

/// Drains the outbox onto the socket, then closes it.
async fn write_loop(
    conn: Arc<WebSocketConnection>,
    mut outbox: mpsc::Receiver<ServerMessage>,
    codec: JsonCodec,
) {
    let conn_id = conn.id();
    while let Some(msg) = outbox.recv().await {
        let bytes = match codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%conn_id, message = msg.name(), error = %e, "failed to encode");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
    let _ = conn.close().await;
    trace!(%conn_id, "writer stopped");
}

fn protocol_error(err: &ProtocolError) -> ServerMessage {
    ServerMessage::Error {
        code: 400,
        kind: "invalid-message".to_owned(),
        message: err.to_string(),
    }
}

async fn send(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    msg: &ServerMessage,
) -> Result<(), SketchroomError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await.map_err(SketchroomError::Transport)
}
