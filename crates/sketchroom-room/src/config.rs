//! Per-room game configuration.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sketchroom_protocol::RoomOptions;
use sketchroom_words::ScoreTable;
use tracing::warn;

use crate::RevealSchedule;

/// Settings for one room's game.
///
/// The server holds one instance as the default; `create-room` may
/// override individual fields with [`RoomOptions`]. Always pass through
/// [`validated`](Self::validated) before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// Connected players needed before the host can start.
    pub min_players: usize,
    pub max_players: usize,
    /// Full drawer rotations before the game ends.
    pub max_rounds: u32,
    /// Length of the drawing phase.
    pub turn_secs: u32,
    /// Time the drawer has to pick a word before the first one is taken.
    pub select_secs: u32,
    /// Pause between turns; 0 advances immediately.
    pub intermission_secs: u32,
    pub countdown_secs: u32,
    /// How long a disconnected player's slot is held.
    pub grace_secs: u32,
    pub candidate_count: usize,
    /// Points for the drawer when every connected guesser got the word.
    pub drawer_bonus: u32,
    pub category: Option<String>,
    pub scoring: ScoreTable,
    pub reveal: RevealSchedule,
    /// Seeds the room's RNG for reproducible reveals.
    pub rng_seed: Option<u64>,
    /// How long a finished room stays up for its final scores; 0 keeps it.
    pub finished_linger_secs: u32,
    /// Seconds without any join or action before an unfinished room is
    /// closed; 0 disables.
    pub idle_room_secs: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 8,
            max_rounds: 3,
            turn_secs: 80,
            select_secs: 15,
            intermission_secs: 5,
            countdown_secs: 5,
            grace_secs: 20,
            candidate_count: 3,
            drawer_bonus: 50,
            category: None,
            scoring: ScoreTable::default(),
            reveal: RevealSchedule::default(),
            rng_seed: None,
            finished_linger_secs: 900,
            idle_room_secs: 7200,
        }
    }
}

fn clamp_warn<T>(field: &'static str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + Display,
{
    if value < min || value > max {
        let clamped = if value < min { min } else { max };
        warn!(field, %value, %clamped, "room option out of range; clamping");
        clamped
    } else {
        value
    }
}

impl SessionOptions {
    pub const MAX_PLAYERS_LIMIT: usize = 32;
    pub const MAX_ROUNDS_LIMIT: u32 = 20;
    pub const MAX_TURN_SECS: u32 = 600;
    pub const MAX_REAP_SECS: u32 = 86_400;

    /// Overlays every field set in `overrides`.
    pub fn with_overrides(mut self, overrides: &RoomOptions) -> Self {
        if let Some(v) = overrides.min_players {
            self.min_players = v;
        }
        if let Some(v) = overrides.max_players {
            self.max_players = v;
        }
        if let Some(v) = overrides.max_rounds {
            self.max_rounds = v;
        }
        if let Some(v) = overrides.turn_secs {
            self.turn_secs = v;
        }
        if let Some(v) = overrides.select_secs {
            self.select_secs = v;
        }
        if let Some(v) = overrides.intermission_secs {
            self.intermission_secs = v;
        }
        if let Some(v) = overrides.countdown_secs {
            self.countdown_secs = v;
        }
        if let Some(v) = overrides.grace_secs {
            self.grace_secs = v;
        }
        if let Some(v) = overrides.candidate_count {
            self.candidate_count = v;
        }
        if let Some(v) = &overrides.category {
            self.category = Some(v.clone());
        }
        self
    }

    /// Clamps every field into its supported range, logging each change.
    pub fn validated(mut self) -> Self {
        self.max_players = clamp_warn("maxPlayers", self.max_players, 2, Self::MAX_PLAYERS_LIMIT);
        self.min_players = clamp_warn("minPlayers", self.min_players, 2, self.max_players);
        self.max_rounds = clamp_warn("maxRounds", self.max_rounds, 1, Self::MAX_ROUNDS_LIMIT);
        self.turn_secs = clamp_warn("turnSecs", self.turn_secs, 10, Self::MAX_TURN_SECS);
        self.select_secs = clamp_warn("selectSecs", self.select_secs, 1, 120);
        self.intermission_secs = clamp_warn("intermissionSecs", self.intermission_secs, 0, 60);
        self.countdown_secs = clamp_warn("countdownSecs", self.countdown_secs, 0, 60);
        self.grace_secs = clamp_warn("graceSecs", self.grace_secs, 0, 600);
        self.candidate_count = clamp_warn("candidateCount", self.candidate_count, 1, 10);
        self.finished_linger_secs =
            clamp_warn("finishedLingerSecs", self.finished_linger_secs, 0, Self::MAX_REAP_SECS);
        self.idle_room_secs =
            clamp_warn("idleRoomSecs", self.idle_room_secs, 0, Self::MAX_REAP_SECS);
        self.scoring = self.scoring.validated();
        self.reveal = self.reveal.validated();
        self
    }
}
