//! Shared wire types: identities, phases, timer kinds and the read-only
//! views that outbound messages carry.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player, supplied by the client.
///
/// Identity is owned by an external provider; the server only requires
/// that a reconnecting client presents the same ID again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The identifier of one game room, chosen by whoever creates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Phases and timers
// ---------------------------------------------------------------------------

/// The phase of a room's round/turn state machine.
///
/// ```text
/// Waiting → WordSelection → Drawing → RoundComplete ─┬→ WordSelection
///                                                    └→ GameFinished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    #[default]
    Waiting,
    WordSelection,
    Drawing,
    RoundComplete,
    GameFinished,
}

impl GamePhase {
    /// Whether the state machine may move from `self` to `next`.
    pub fn can_transition_to(&self, next: GamePhase) -> bool {
        matches!(
            (self, next),
            (GamePhase::Waiting, GamePhase::WordSelection)
                | (GamePhase::WordSelection, GamePhase::Drawing)
                | (GamePhase::WordSelection, GamePhase::RoundComplete)
                | (GamePhase::Drawing, GamePhase::RoundComplete)
                | (GamePhase::RoundComplete, GamePhase::WordSelection)
                | (GamePhase::RoundComplete, GamePhase::GameFinished)
        )
    }

    /// A round (selection or drawing) is in progress.
    pub fn is_active_round(&self) -> bool {
        matches!(self, GamePhase::WordSelection | GamePhase::Drawing)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GamePhase::Waiting => "waiting",
            GamePhase::WordSelection => "word-selection",
            GamePhase::Drawing => "drawing",
            GamePhase::RoundComplete => "round-complete",
            GamePhase::GameFinished => "game-finished",
        };
        f.write_str(s)
    }
}

/// The named countdowns a client can see.
///
/// Grace-period timers exist too, but they are per player and never
/// appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerKind {
    StartCountdown,
    SelectWord,
    Round,
    Intermission,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerKind::StartCountdown => "start-countdown",
            TimerKind::SelectWord => "select-word",
            TimerKind::Round => "round",
            TimerKind::Intermission => "intermission",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Guesses and players
// ---------------------------------------------------------------------------

/// How a guess compared to the secret word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Exact,
    Close,
    Wrong,
}

/// Liveness of a player as other clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
    Connected,
    GracePeriod,
    Removed,
}

/// Why a player left the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemovalReason {
    /// The player sent `leave`.
    Left,
    /// The grace period ran out before the player reconnected.
    TimedOut,
    /// The host removed the player.
    Kicked,
}

/// One candidate offered to the drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordChoice {
    pub word: String,
    pub category: String,
}

impl WordChoice {
    pub fn new(word: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            category: category.into(),
        }
    }
}

/// Public view of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub is_host: bool,
    pub is_drawing: bool,
    pub has_guessed: bool,
    pub connection: ConnectionStatus,
}

/// One line of a scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// A running countdown in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub timer_type: TimerKind,
    pub seconds_remaining: u32,
}

/// Everything a freshly (re)connected client needs to render the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub phase: GamePhase,
    pub round_number: u32,
    pub max_rounds: u32,
    pub host_id: Option<PlayerId>,
    pub drawer_id: Option<PlayerId>,
    pub players: Vec<PlayerView>,
    /// The word with unrevealed letters as `_`; `None` before a word is chosen.
    pub mask: Option<String>,
    /// The literal word, only in the drawer's copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    pub category: Option<String>,
    pub timers: Vec<TimerStatus>,
}

/// Per-room configuration overrides carried by `create-room`.
///
/// Every field is optional; absent fields fall back to the server's
/// defaults. Out-of-range values are clamped, not rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoomOptions {
    pub min_players: Option<usize>,
    pub max_players: Option<usize>,
    pub max_rounds: Option<u32>,
    pub turn_secs: Option<u32>,
    pub select_secs: Option<u32>,
    pub intermission_secs: Option<u32>,
    pub countdown_secs: Option<u32>,
    pub grace_secs: Option<u32>,
    pub candidate_count: Option<usize>,
    /// Restrict candidates to one word-bank category.
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::from("alice")).unwrap();
        assert_eq!(json, r#""alice""#);
    }

    #[test]
    fn test_room_id_display_is_raw_value() {
        assert_eq!(RoomId::from("R1").to_string(), "R1");
    }

    #[test]
    fn test_game_phase_serializes_kebab_case() {
        let json = serde_json::to_string(&GamePhase::WordSelection).unwrap();
        assert_eq!(json, r#""word-selection""#);
        assert_eq!(GamePhase::RoundComplete.to_string(), "round-complete");
    }

    #[test]
    fn test_game_phase_can_transition_follows_round_cycle() {
        assert!(GamePhase::Waiting.can_transition_to(GamePhase::WordSelection));
        assert!(GamePhase::WordSelection.can_transition_to(GamePhase::Drawing));
        assert!(GamePhase::Drawing.can_transition_to(GamePhase::RoundComplete));
        assert!(GamePhase::RoundComplete.can_transition_to(GamePhase::WordSelection));
        assert!(GamePhase::RoundComplete.can_transition_to(GamePhase::GameFinished));
    }

    #[test]
    fn test_game_phase_can_transition_rejects_skips_and_restarts() {
        assert!(!GamePhase::Waiting.can_transition_to(GamePhase::Drawing));
        assert!(!GamePhase::Drawing.can_transition_to(GamePhase::WordSelection));
        assert!(!GamePhase::GameFinished.can_transition_to(GamePhase::WordSelection));
        assert!(!GamePhase::GameFinished.can_transition_to(GamePhase::Waiting));
    }

    #[test]
    fn test_timer_kind_round_trips_through_json() {
        for kind in [
            TimerKind::StartCountdown,
            TimerKind::SelectWord,
            TimerKind::Round,
            TimerKind::Intermission,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_room_options_missing_fields_default_to_none() {
        let opts: RoomOptions = serde_json::from_str(r#"{"maxRounds":5}"#).unwrap();
        assert_eq!(opts.max_rounds, Some(5));
        assert_eq!(opts.turn_secs, None);
        assert_eq!(opts.category, None);
    }

    #[test]
    fn test_player_view_uses_camel_case_fields() {
        let view = PlayerView {
            id: PlayerId::from("p1"),
            name: "Ann".into(),
            color: "#e6194b".into(),
            score: 40,
            is_host: true,
            is_drawing: false,
            has_guessed: true,
            connection: ConnectionStatus::GracePeriod,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["isHost"], true);
        assert_eq!(json["hasGuessed"], true);
        assert_eq!(json["connection"], "grace-period");
    }

    #[test]
    fn test_room_snapshot_omits_word_when_absent() {
        let snapshot = RoomSnapshot {
            room_id: RoomId::from("R1"),
            phase: GamePhase::Drawing,
            round_number: 1,
            max_rounds: 3,
            host_id: None,
            drawer_id: Some(PlayerId::from("p1")),
            players: vec![],
            mask: Some("_____".into()),
            word: None,
            category: Some("Random".into()),
            timers: vec![TimerStatus {
                timer_type: TimerKind::Round,
                seconds_remaining: 42,
            }],
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("word").is_none());
        assert_eq!(json["timers"][0]["secondsRemaining"], 42);
    }
}
