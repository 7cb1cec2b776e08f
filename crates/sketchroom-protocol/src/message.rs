//! The closed inbound and outbound message unions.
//!
//! Every frame on the wire is a JSON object whose `type` field names the
//! variant in kebab-case; the remaining fields are camelCase. Anything that
//! does not decode into one of these variants is rejected at the transport
//! boundary and never reaches a room.

use serde::{Deserialize, Serialize};

use crate::types::{
    Classification, PlayerId, PlayerView, RemovalReason, RoomId, RoomOptions, RoomSnapshot,
    ScoreEntry, TimerKind, WordChoice,
};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A message sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Create a room and join it as host. First frame only.
    CreateRoom {
        room_id: RoomId,
        player_id: PlayerId,
        name: String,
        #[serde(default)]
        options: Option<RoomOptions>,
    },

    /// Join an existing room, or reconnect to it with a known player ID.
    /// First frame only.
    Join {
        room_id: RoomId,
        player_id: PlayerId,
        name: String,
    },

    /// Leave immediately, without a grace period.
    Leave,

    /// Host only, in `waiting`.
    StartGame,

    /// Drawer only, during word selection.
    SelectWord { word: String },

    /// Any non-drawing player, during drawing.
    Guess { text: String },

    /// Host only. Administrative timer control.
    StartTimer { timer_type: TimerKind },

    /// Host only. Administrative timer control.
    StopTimer { timer_type: TimerKind },

    /// Host only. Kicks a player; the ID may not rejoin.
    RemovePlayer { player_id: PlayerId },

    /// Asks for a fresh `room-state` addressed to the sender only.
    RequestState,
}

impl ClientMessage {
    /// The wire name of this message, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::CreateRoom { .. } => "create-room",
            ClientMessage::Join { .. } => "join",
            ClientMessage::Leave => "leave",
            ClientMessage::StartGame => "start-game",
            ClientMessage::SelectWord { .. } => "select-word",
            ClientMessage::Guess { .. } => "guess",
            ClientMessage::StartTimer { .. } => "start-timer",
            ClientMessage::StopTimer { .. } => "stop-timer",
            ClientMessage::RemovePlayer { .. } => "remove-player",
            ClientMessage::RequestState => "request-state",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A message sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // -- Roster --
    PlayerJoined {
        player: PlayerView,
    },

    PlayerReconnected {
        player_id: PlayerId,
    },

    PlayerDisconnected {
        player_id: PlayerId,
        grace_secs: u32,
    },

    PlayerRemoved {
        player_id: PlayerId,
        reason: RemovalReason,
    },

    HostChanged {
        player_id: PlayerId,
    },

    /// Sent only to the player who just joined or reconnected.
    RoomState {
        snapshot: RoomSnapshot,
    },

    // -- Round flow --
    RoundStarted {
        drawer_id: PlayerId,
        round_number: u32,
    },

    /// Drawer only.
    WordChoices {
        candidates: Vec<WordChoice>,
    },

    /// `word` is present only in the drawer's copy.
    WordSelected {
        length: usize,
        mask: String,
        category: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        word: Option<String>,
    },

    /// Non-drawing players only. `index` counts characters, not bytes.
    LetterRevealed {
        index: usize,
        #[serde(rename = "char")]
        letter: char,
    },

    /// `text` echoes wrong guesses only.
    GuessResult {
        player_id: PlayerId,
        classification: Classification,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },

    ScoreUpdated {
        player_id: PlayerId,
        score: u32,
    },

    // -- Timers --
    TimerUpdate {
        timer_type: TimerKind,
        seconds_remaining: u32,
    },

    TimerEnded {
        timer_type: TimerKind,
    },

    // -- Results --
    RoundComplete {
        round_number: u32,
        word: Option<String>,
        scores: Vec<ScoreEntry>,
    },

    /// Score descending, ties in join order.
    GameFinished {
        final_scores: Vec<ScoreEntry>,
    },

    // -- Errors --
    /// A rejected action. Only ever sent to the player who caused it.
    Error {
        code: u16,
        kind: String,
        message: String,
    },
}

impl ServerMessage {
    /// The wire name of this message, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::PlayerJoined { .. } => "player-joined",
            ServerMessage::PlayerReconnected { .. } => "player-reconnected",
            ServerMessage::PlayerDisconnected { .. } => "player-disconnected",
            ServerMessage::PlayerRemoved { .. } => "player-removed",
            ServerMessage::HostChanged { .. } => "host-changed",
            ServerMessage::RoomState { .. } => "room-state",
            ServerMessage::RoundStarted { .. } => "round-started",
            ServerMessage::WordChoices { .. } => "word-choices",
            ServerMessage::WordSelected { .. } => "word-selected",
            ServerMessage::LetterRevealed { .. } => "letter-revealed",
            ServerMessage::GuessResult { .. } => "guess-result",
            ServerMessage::ScoreUpdated { .. } => "score-updated",
            ServerMessage::TimerUpdate { .. } => "timer-update",
            ServerMessage::TimerEnded { .. } => "timer-ended",
            ServerMessage::RoundComplete { .. } => "round-complete",
            ServerMessage::GameFinished { .. } => "game-finished",
            ServerMessage::Error { .. } => "error",
        }
    }
}
