//! The authoritative state of one room and its round/turn state machine.
//!
//! A [`Session`] is plain synchronous state. It is owned by exactly one
//! room task, which feeds it commands and timer events one at a time, so
//! every check-then-act sequence below is atomic with respect to other
//! events in the same room. Side effects go out through the room's
//! [`Fanout`] and [`TimerRegistry`].
//!
//! ```text
//! Waiting ─start─► WordSelection ─select/timeout─► Drawing ─time up/all guessed─► RoundComplete
//!                       ▲                                                           │
//!                       └──────────────────── next drawer ◄─────── intermission ────┤
//!                                                                                   ▼
//!                                                                             GameFinished
//! ```
//!
//! Drawer rotation walks the roster in join order, skipping players who
//! are not connected, and remembers who already drew in the current
//! rotation. When everyone connected has drawn, the round number advances;
//! past `max_rounds` the game finishes.
//!
//! A silent cleanup timer retires the room once a finished game has
//! lingered for `finished_linger_secs`, or once nobody has joined or acted
//! for `idle_room_secs`.

use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sketchroom_protocol::{
    Classification, ClientMessage, ConnectionId, GamePhase, PlayerId, RemovalReason, RoomId,
    RoomSnapshot, ServerMessage, TimerKind, TimerStatus, WordChoice,
};
use sketchroom_session::{ConnectionState, JoinOutcome, Reconnect, Roster};
use sketchroom_timer::{TimerEvent, TimerRegistry, TimerType};
use sketchroom_words::{WordProvider, evaluate};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::{Fanout, Outbox, RoomError, Round, SessionOptions, reveal};

/// Whether the room should keep running after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The last player is gone; the room must be torn down.
    Teardown,
}

/// An in-room request from a player who has already joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Leave,
    StartGame,
    SelectWord { word: String },
    Guess { text: String },
    StartTimer(TimerKind),
    StopTimer(TimerKind),
    RemovePlayer(PlayerId),
    /// Resend the caller's own snapshot.
    RequestState,
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Leave => "leave",
            PlayerAction::StartGame => "start-game",
            PlayerAction::SelectWord { .. } => "select-word",
            PlayerAction::Guess { .. } => "guess",
            PlayerAction::StartTimer(_) => "start-timer",
            PlayerAction::StopTimer(_) => "stop-timer",
            PlayerAction::RemovePlayer(_) => "remove-player",
            PlayerAction::RequestState => "request-state",
        }
    }
}

impl TryFrom<ClientMessage> for PlayerAction {
    type Error = RoomError;

    fn try_from(msg: ClientMessage) -> Result<Self, Self::Error> {
        Ok(match msg {
            ClientMessage::Leave => PlayerAction::Leave,
            ClientMessage::StartGame => PlayerAction::StartGame,
            ClientMessage::SelectWord { word } => PlayerAction::SelectWord { word },
            ClientMessage::Guess { text } => PlayerAction::Guess { text },
            ClientMessage::StartTimer { timer_type } => PlayerAction::StartTimer(timer_type),
            ClientMessage::StopTimer { timer_type } => PlayerAction::StopTimer(timer_type),
            ClientMessage::RemovePlayer { player_id } => PlayerAction::RemovePlayer(player_id),
            ClientMessage::RequestState => PlayerAction::RequestState,
            ClientMessage::CreateRoom { .. } | ClientMessage::Join { .. } => {
                return Err(RoomError::invalid("already in a room on this connection"));
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    TimeUp,
    AllGuessed,
    DrawerLeft,
    Skipped,
}

pub struct Session {
    room_id: RoomId,
    options: SessionOptions,
    roster: Roster,
    timers: TimerRegistry,
    fanout: Fanout,
    words: Arc<dyn WordProvider>,
    rng: StdRng,
    phase: GamePhase,
    round: Option<Round>,
    round_number: u32,
    drawn_this_cycle: HashSet<PlayerId>,
    used_words: HashSet<String>,
    paused: bool,
    last_activity: Instant,
}

impl Session {
    pub fn new(
        room_id: RoomId,
        options: SessionOptions,
        words: Arc<dyn WordProvider>,
        timers: TimerRegistry,
    ) -> Self {
        let options = options.validated();
        let rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            roster: Roster::new(options.max_players),
            fanout: Fanout::new(room_id.clone()),
            room_id,
            options,
            timers,
            words,
            rng,
            phase: GamePhase::Waiting,
            round: None,
            round_number: 0,
            drawn_this_cycle: HashSet::new(),
            used_words: HashSet::new(),
            paused: false,
            last_activity: Instant::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    /// No connected player is left to draw; the next join resumes play.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn used_words(&self) -> &HashSet<String> {
        &self.used_words
    }

    // -----------------------------------------------------------------------
    // Connection lifecycle
    // -----------------------------------------------------------------------

    /// Adds a player or reattaches a known one, then sends them a snapshot.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        name: String,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), RoomError> {
        let outcome = self.roster.join(player_id.clone(), name, connection)?;
        self.fanout.attach(player_id.clone(), outbox);
        self.touch();

        match outcome {
            JoinOutcome::Joined => {
                if let Some(player) = self.roster.get(&player_id) {
                    self.fanout.to_others(
                        &player_id,
                        ServerMessage::PlayerJoined {
                            player: player.view(),
                        },
                    );
                }
                info!(room_id = %self.room_id, %player_id, players = self.roster.len(), "player joined");
            }
            JoinOutcome::Reconnected(reconnect) => {
                if let Reconnect::Resumed {
                    pending_removal: Some(handle),
                } = &reconnect
                {
                    self.timers.stop(handle.timer_type());
                }
                self.fanout.to_others(
                    &player_id,
                    ServerMessage::PlayerReconnected {
                        player_id: player_id.clone(),
                    },
                );
                info!(room_id = %self.room_id, %player_id, ?reconnect, "player reconnected");
            }
        }

        self.send_state(&player_id);
        if self.phase == GamePhase::WordSelection {
            if let Some(round) = self.round.as_ref().filter(|r| r.is_drawer(&player_id)) {
                self.fanout.to_player(
                    &player_id,
                    ServerMessage::WordChoices {
                        candidates: round.candidates.clone(),
                    },
                );
            }
        }

        if self.paused {
            info!(room_id = %self.room_id, "player available again, resuming");
            self.begin_next_turn();
        }
        Ok(())
    }

    /// Handles a closed socket. Only the player's live connection counts;
    /// a superseded socket closing later is ignored.
    pub fn disconnect(&mut self, player_id: &PlayerId, connection: ConnectionId) {
        match self.roster.disconnect(player_id, connection) {
            Ok(true) => {}
            Ok(false) => {
                debug!(room_id = %self.room_id, %player_id, %connection, "superseded connection closed");
                return;
            }
            Err(err) => {
                debug!(room_id = %self.room_id, %player_id, %err, "disconnect for absent player");
                return;
            }
        }

        self.fanout.detach(player_id);
        let grace_secs = self.options.grace_secs;
        if let Some(handle) = self
            .timers
            .start(TimerType::Grace(player_id.clone()), grace_secs)
        {
            if let Some(player) = self.roster.get_mut(player_id) {
                player.set_pending_removal(handle);
            }
        }
        self.fanout.to_others(
            player_id,
            ServerMessage::PlayerDisconnected {
                player_id: player_id.clone(),
                grace_secs,
            },
        );
        info!(room_id = %self.room_id, %player_id, grace_secs, "player disconnected, grace period started");

        self.check_all_guessed();
    }

    /// Applies one in-room request from `player_id`.
    pub fn act(&mut self, player_id: &PlayerId, action: PlayerAction) -> Result<Flow, RoomError> {
        if !self.roster.contains(player_id) {
            return Err(RoomError::PlayerNotFound(player_id.clone()));
        }
        self.touch();
        match action {
            PlayerAction::Leave => return Ok(self.remove_player(player_id, RemovalReason::Left)),
            PlayerAction::RemovePlayer(target) => return self.kick(player_id, &target),
            PlayerAction::StartGame => self.start_game(player_id)?,
            PlayerAction::SelectWord { word } => self.select_word(player_id, &word)?,
            PlayerAction::Guess { text } => self.guess(player_id, &text)?,
            PlayerAction::StartTimer(kind) => self.start_timer_action(player_id, kind)?,
            PlayerAction::StopTimer(kind) => self.stop_timer_action(player_id, kind)?,
            PlayerAction::RequestState => self.send_state(player_id),
        }
        Ok(Flow::Continue)
    }

    /// Drives the state machine from one timer event.
    pub fn on_timer(&mut self, event: TimerEvent) -> Flow {
        match event {
            TimerEvent::Tick { handle, remaining } => {
                if !self.timers.is_current(&handle) {
                    return Flow::Continue;
                }
                if let Some(kind) = handle.timer_type().kind() {
                    trace!(room_id = %self.room_id, timer = %kind, remaining, "tick");
                    self.fanout.to_room(ServerMessage::TimerUpdate {
                        timer_type: kind,
                        seconds_remaining: remaining,
                    });
                }
                if *handle.timer_type() == TimerType::Round {
                    self.reveal_letters(remaining);
                }
                Flow::Continue
            }
            TimerEvent::Expired { handle } => {
                if !self.timers.complete(&handle) {
                    return Flow::Continue;
                }
                if let Some(kind) = handle.timer_type().kind() {
                    self.fanout
                        .to_room(ServerMessage::TimerEnded { timer_type: kind });
                }
                match handle.timer_type() {
                    TimerType::StartCountdown => self.on_countdown_expired(),
                    TimerType::SelectWord => self.on_selection_expired(),
                    TimerType::Round => self.end_round(RoundEnd::TimeUp),
                    TimerType::Intermission => {
                        if self.phase == GamePhase::RoundComplete {
                            self.begin_next_turn();
                        }
                    }
                    TimerType::Grace(player_id) => return self.on_grace_expired(player_id),
                    TimerType::Cleanup => return self.on_cleanup_expired(),
                }
                Flow::Continue
            }
        }
    }

    /// What `viewer` should see right now. The literal word is included
    /// for the drawer, and for everyone once the turn is over.
    pub fn snapshot_for(&self, viewer: Option<&PlayerId>) -> RoomSnapshot {
        let is_drawer = match (viewer, self.round.as_ref()) {
            (Some(viewer), Some(round)) => round.is_drawer(viewer),
            _ => false,
        };
        let word_public = self.phase == GamePhase::RoundComplete;

        let (mask, word, category) = match self.round.as_ref() {
            Some(round) => match round.word.as_ref() {
                Some(choice) => (
                    round.mask(),
                    (is_drawer || word_public).then(|| choice.word.clone()),
                    Some(choice.category.clone()),
                ),
                None => (None, None, None),
            },
            None => (None, None, None),
        };

        RoomSnapshot {
            room_id: self.room_id.clone(),
            phase: self.phase,
            round_number: self.round_number,
            max_rounds: self.options.max_rounds,
            host_id: self.roster.host().map(|p| p.id.clone()),
            drawer_id: self.roster.drawer().map(|p| p.id.clone()),
            players: self.roster.views(),
            mask,
            word,
            category,
            timers: self
                .timers
                .visible()
                .into_iter()
                .map(|(timer_type, seconds_remaining)| TimerStatus {
                    timer_type,
                    seconds_remaining,
                })
                .collect(),
        }
    }

    /// Cancels every timer and drops every outbox.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.fanout.clear();
    }

    fn send_state(&self, player_id: &PlayerId) {
        self.fanout.to_player(
            player_id,
            ServerMessage::RoomState {
                snapshot: self.snapshot_for(Some(player_id)),
            },
        );
    }

    // -----------------------------------------------------------------------
    // Room expiry
    // -----------------------------------------------------------------------

    /// Records activity and arms the idle check if it is not running yet.
    fn touch(&mut self) {
        self.last_activity = Instant::now();
        let idle_secs = self.options.idle_room_secs;
        if idle_secs > 0 && self.phase != GamePhase::GameFinished {
            self.timers.start(TimerType::Cleanup, idle_secs);
        }
    }

    fn arm_linger(&mut self) {
        self.timers.stop(&TimerType::Cleanup);
        if self.options.finished_linger_secs > 0 {
            self.timers
                .start(TimerType::Cleanup, self.options.finished_linger_secs);
        }
    }

    fn on_cleanup_expired(&mut self) -> Flow {
        if self.phase == GamePhase::GameFinished {
            info!(room_id = %self.room_id, linger_secs = self.options.finished_linger_secs, "finished room expired, tearing down");
            self.shutdown();
            return Flow::Teardown;
        }

        let idle_secs = self.options.idle_room_secs;
        if idle_secs == 0 {
            return Flow::Continue;
        }
        let idle_for = u32::try_from(self.last_activity.elapsed().as_secs()).unwrap_or(u32::MAX);
        if idle_for >= idle_secs {
            info!(room_id = %self.room_id, idle_for, "room idle, tearing down");
            self.shutdown();
            return Flow::Teardown;
        }
        // Activity since the check was armed; wait out the rest.
        self.timers
            .start(TimerType::Cleanup, idle_secs - idle_for);
        Flow::Continue
    }

    // -----------------------------------------------------------------------
    // Roster changes
    // -----------------------------------------------------------------------

    fn require_host(&self, player_id: &PlayerId, what: &str) -> Result<(), RoomError> {
        if self.roster.is_host(player_id) {
            Ok(())
        } else {
            Err(RoomError::invalid(format!("only the host can {what}")))
        }
    }

    fn kick(&mut self, host: &PlayerId, target: &PlayerId) -> Result<Flow, RoomError> {
        self.require_host(host, "remove players")?;
        if host == target {
            return Err(RoomError::invalid("the host cannot remove themselves; leave instead"));
        }
        if !self.roster.contains(target) {
            return Err(RoomError::PlayerNotFound(target.clone()));
        }
        self.roster.ban(target.clone());
        Ok(self.remove_player(target, RemovalReason::Kicked))
    }

    fn on_grace_expired(&mut self, player_id: &PlayerId) -> Flow {
        let still_away = self
            .roster
            .get(player_id)
            .is_some_and(|p| matches!(p.state(), ConnectionState::GracePeriod { .. }));
        if still_away {
            self.remove_player(player_id, RemovalReason::TimedOut)
        } else {
            Flow::Continue
        }
    }

    fn remove_player(&mut self, player_id: &PlayerId, reason: RemovalReason) -> Flow {
        let was_drawer = self.phase.is_active_round()
            && self.round.as_ref().is_some_and(|r| r.is_drawer(player_id));

        let removal = match self.roster.remove(player_id) {
            Ok(removal) => removal,
            Err(err) => {
                debug!(room_id = %self.room_id, %player_id, %err, "remove ignored");
                return Flow::Continue;
            }
        };
        if let Some(handle) = &removal.pending_removal {
            self.timers.stop(handle.timer_type());
        }
        // A later join under the same ID is a new player with a turn owed.
        self.drawn_this_cycle.remove(player_id);

        // The removed player hears about it too, then loses its outbox.
        self.fanout.to_room(ServerMessage::PlayerRemoved {
            player_id: player_id.clone(),
            reason,
        });
        self.fanout.detach(player_id);
        info!(room_id = %self.room_id, %player_id, ?reason, remaining = self.roster.len(), "player removed");

        if let Some(new_host) = removal.new_host {
            info!(room_id = %self.room_id, player_id = %new_host, "host promoted");
            self.fanout
                .to_room(ServerMessage::HostChanged { player_id: new_host });
        }

        if self.roster.is_empty() {
            info!(room_id = %self.room_id, "room empty, tearing down");
            self.shutdown();
            return Flow::Teardown;
        }

        if was_drawer {
            self.end_round(RoundEnd::DrawerLeft);
        } else {
            self.check_all_guessed();
        }

        if self.phase == GamePhase::Waiting
            && self.roster.connected_count() < self.options.min_players
        {
            self.stop_timer(&TimerType::StartCountdown);
        }
        Flow::Continue
    }

    // -----------------------------------------------------------------------
    // Game start
    // -----------------------------------------------------------------------

    fn require_startable(&self) -> Result<(), RoomError> {
        if self.phase != GamePhase::Waiting {
            return Err(RoomError::invalid(format!(
                "cannot start a game while {}",
                self.phase
            )));
        }
        let connected = self.roster.connected_count();
        if connected < self.options.min_players {
            return Err(RoomError::invalid(format!(
                "need at least {} connected players, have {connected}",
                self.options.min_players
            )));
        }
        Ok(())
    }

    fn start_game(&mut self, player_id: &PlayerId) -> Result<(), RoomError> {
        self.require_host(player_id, "start the game")?;
        self.require_startable()?;
        self.stop_timer(&TimerType::StartCountdown);
        self.begin_game();
        Ok(())
    }

    fn start_timer_action(&mut self, player_id: &PlayerId, kind: TimerKind) -> Result<(), RoomError> {
        self.require_host(player_id, "control timers")?;
        match kind {
            TimerKind::StartCountdown => {
                self.require_startable()?;
                self.start_timer(TimerType::StartCountdown, self.options.countdown_secs);
                Ok(())
            }
            other => Err(RoomError::invalid(format!(
                "the {other} timer cannot be started manually"
            ))),
        }
    }

    fn stop_timer_action(&mut self, player_id: &PlayerId, kind: TimerKind) -> Result<(), RoomError> {
        self.require_host(player_id, "control timers")?;
        match kind {
            TimerKind::StartCountdown => {
                self.stop_timer(&TimerType::StartCountdown);
                Ok(())
            }
            TimerKind::Round => {
                if self.phase == GamePhase::Drawing {
                    self.end_round(RoundEnd::Skipped);
                }
                Ok(())
            }
            other => Err(RoomError::invalid(format!(
                "the {other} timer cannot be stopped manually"
            ))),
        }
    }

    fn on_countdown_expired(&mut self) {
        match self.require_startable() {
            Ok(()) => self.begin_game(),
            Err(err) => debug!(room_id = %self.room_id, %err, "countdown ended but game cannot start"),
        }
    }

    fn begin_game(&mut self) {
        self.round_number = 1;
        self.drawn_this_cycle.clear();
        info!(room_id = %self.room_id, players = self.roster.len(), max_rounds = self.options.max_rounds, "game started");
        self.begin_next_turn();
    }

    // -----------------------------------------------------------------------
    // Turn rotation
    // -----------------------------------------------------------------------

    /// First connected player, in join order, who has not drawn this
    /// rotation.
    fn next_drawer(&self) -> Option<PlayerId> {
        self.roster
            .connected()
            .find(|p| !self.drawn_this_cycle.contains(&p.id))
            .map(|p| p.id.clone())
    }

    fn begin_next_turn(&mut self) {
        self.paused = false;
        let drawer = match self.next_drawer() {
            Some(drawer) => drawer,
            None if self.roster.connected_count() == 0 => return self.pause(),
            None => {
                if self.round_number >= self.options.max_rounds {
                    return self.finish_game();
                }
                self.round_number += 1;
                self.drawn_this_cycle.clear();
                info!(room_id = %self.room_id, round_number = self.round_number, "rotation complete");
                match self.next_drawer() {
                    Some(drawer) => drawer,
                    None => return self.pause(),
                }
            }
        };
        self.enter_word_selection(drawer);
    }

    fn pause(&mut self) {
        self.paused = true;
        info!(room_id = %self.room_id, "no connected player can draw, session paused");
    }

    /// The turn that just ended was the last one of the game.
    fn is_final_turn(&self) -> bool {
        self.round_number >= self.options.max_rounds
            && self.roster.connected_count() > 0
            && self.next_drawer().is_none()
    }

    fn draw_candidates(&self) -> Vec<WordChoice> {
        let category = self.options.category.as_deref();
        let count = self.options.candidate_count;
        let batch = self.words.batch(category, count, &self.used_words);
        if !batch.is_empty() {
            return batch;
        }
        debug!(room_id = %self.room_id, "word pool exhausted, allowing repeats");
        self.words.batch(category, count, &HashSet::new())
    }

    fn enter_word_selection(&mut self, drawer: PlayerId) {
        let candidates = self.draw_candidates();
        if candidates.is_empty() {
            warn!(room_id = %self.room_id, "word provider returned no candidates, ending game");
            return self.finish_game();
        }

        self.set_phase(GamePhase::WordSelection);
        self.drawn_this_cycle.insert(drawer.clone());
        self.roster.set_drawer(Some(&drawer));
        self.roster.reset_guesses();
        debug!(room_id = %self.room_id, %drawer, round_number = self.round_number, "word selection started");

        self.fanout.to_room(ServerMessage::RoundStarted {
            drawer_id: drawer.clone(),
            round_number: self.round_number,
        });
        self.fanout.to_player(
            &drawer,
            ServerMessage::WordChoices {
                candidates: candidates.clone(),
            },
        );
        self.round = Some(Round::new(self.round_number, drawer, candidates));
        self.start_timer(TimerType::SelectWord, self.options.select_secs);
    }

    fn select_word(&mut self, player_id: &PlayerId, word: &str) -> Result<(), RoomError> {
        if self.phase != GamePhase::WordSelection {
            return Err(RoomError::invalid("no word selection in progress"));
        }
        let round = self
            .round
            .as_ref()
            .ok_or_else(|| RoomError::invalid("no word selection in progress"))?;
        if !round.is_drawer(player_id) {
            return Err(RoomError::invalid("only the drawer can select a word"));
        }
        let choice = round
            .candidate(word)
            .cloned()
            .ok_or_else(|| RoomError::invalid(format!("{word:?} is not one of the offered words")))?;

        self.stop_timer(&TimerType::SelectWord);
        self.enter_drawing(choice);
        Ok(())
    }

    fn on_selection_expired(&mut self) {
        if self.phase != GamePhase::WordSelection {
            return;
        }
        match self.round.as_ref().and_then(|r| r.candidates.first().cloned()) {
            Some(choice) => {
                debug!(room_id = %self.room_id, "selection timed out, taking first candidate");
                self.enter_drawing(choice);
            }
            None => self.end_round(RoundEnd::TimeUp),
        }
    }

    fn enter_drawing(&mut self, choice: WordChoice) {
        let Some(round) = self.round.as_mut() else {
            warn!(room_id = %self.room_id, "drawing requested without a round");
            return;
        };
        round.word = Some(choice.clone());
        round.revealed.clear();
        round.fired_steps.clear();
        let drawer = round.drawer.clone();

        self.used_words.insert(choice.word.to_lowercase());
        self.roster.reset_guesses();
        self.set_phase(GamePhase::Drawing);
        debug!(room_id = %self.room_id, %drawer, word = %choice.word, "drawing started");

        let length = choice.word.chars().count();
        let mask = reveal::mask(&choice.word, &[]);
        self.fanout.to_others(
            &drawer,
            ServerMessage::WordSelected {
                length,
                mask: mask.clone(),
                category: choice.category.clone(),
                word: None,
            },
        );
        self.fanout.to_player(
            &drawer,
            ServerMessage::WordSelected {
                length,
                mask,
                category: choice.category,
                word: Some(choice.word),
            },
        );
        self.start_timer(TimerType::Round, self.options.turn_secs);
    }

    fn reveal_letters(&mut self, remaining: u32) {
        if self.phase != GamePhase::Drawing {
            return;
        }
        let Some(round) = self.round.as_mut() else {
            return;
        };
        let Some(word) = round.word.as_ref().map(|w| w.word.clone()) else {
            return;
        };

        let fraction = f64::from(remaining) / f64::from(self.options.turn_secs.max(1));
        for step_index in self.options.reveal.due(fraction, &round.fired_steps) {
            round.fired_steps.insert(step_index);
            let step = &self.options.reveal.steps()[step_index];
            if let Some((index, letter)) = reveal::pick(step, &word, &round.revealed, &mut self.rng) {
                round.revealed.push(index);
                debug!(room_id = %self.room_id, index, remaining, "letter revealed");
                self.fanout
                    .to_others(&round.drawer, ServerMessage::LetterRevealed { index, letter });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Guessing and round end
    // -----------------------------------------------------------------------

    fn guess(&mut self, player_id: &PlayerId, text: &str) -> Result<(), RoomError> {
        if self.phase != GamePhase::Drawing {
            return Err(RoomError::invalid("guesses are only accepted while drawing"));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(RoomError::invalid("empty guess"));
        }
        let round = self
            .round
            .as_ref()
            .ok_or_else(|| RoomError::invalid("no round in progress"))?;
        if round.is_drawer(player_id) {
            return Err(RoomError::invalid("the drawer cannot guess"));
        }
        let secret = round
            .word
            .as_ref()
            .map(|w| w.word.clone())
            .ok_or_else(|| RoomError::invalid("no word chosen yet"))?;
        let player = self
            .roster
            .get_mut(player_id)
            .ok_or_else(|| RoomError::PlayerNotFound(player_id.clone()))?;
        if player.has_guessed_correctly() {
            return Err(RoomError::invalid("already guessed the word this round"));
        }

        let classification = evaluate(&secret, text).classification();
        debug!(room_id = %self.room_id, %player_id, ?classification, "guess evaluated");

        match classification {
            Classification::Exact => {
                let remaining = self.timers.remaining(&TimerType::Round).unwrap_or(0);
                let points = self.options.scoring.score(remaining);
                player.mark_guessed();
                let score = player.award(points);
                info!(room_id = %self.room_id, %player_id, points, score, remaining, "correct guess");

                self.fanout.to_room(ServerMessage::GuessResult {
                    player_id: player_id.clone(),
                    classification,
                    text: None,
                });
                self.fanout.to_room(ServerMessage::ScoreUpdated {
                    player_id: player_id.clone(),
                    score,
                });
                self.check_all_guessed();
            }
            Classification::Close => {
                self.fanout.to_room(ServerMessage::GuessResult {
                    player_id: player_id.clone(),
                    classification,
                    text: None,
                });
            }
            Classification::Wrong => {
                self.fanout.to_room(ServerMessage::GuessResult {
                    player_id: player_id.clone(),
                    classification,
                    text: Some(text.to_owned()),
                });
            }
        }
        Ok(())
    }

    /// Ends the drawing phase early once every connected guesser has the
    /// word. Needs at least one connected guesser.
    fn check_all_guessed(&mut self) {
        if self.phase != GamePhase::Drawing {
            return;
        }
        let Some(drawer) = self.round.as_ref().map(|r| r.drawer.clone()) else {
            return;
        };

        let all_guessed = {
            let mut guessers = self.roster.connected().filter(|p| p.id != drawer).peekable();
            guessers.peek().is_some() && guessers.all(|p| p.has_guessed_correctly())
        };
        if !all_guessed {
            return;
        }

        let bonus = self.options.drawer_bonus;
        if bonus > 0 {
            if let Some(player) = self.roster.get_mut(&drawer) {
                let score = player.award(bonus);
                self.fanout.to_room(ServerMessage::ScoreUpdated {
                    player_id: drawer,
                    score,
                });
            }
        }
        self.end_round(RoundEnd::AllGuessed);
    }

    fn end_round(&mut self, reason: RoundEnd) {
        if !self.phase.is_active_round() {
            return;
        }
        self.stop_timer(&TimerType::SelectWord);
        self.stop_timer(&TimerType::Round);
        self.set_phase(GamePhase::RoundComplete);
        self.roster.set_drawer(None);

        let (round_number, word) = match self.round.as_ref() {
            Some(round) => (round.number, round.word.as_ref().map(|w| w.word.clone())),
            None => (self.round_number, None),
        };
        info!(room_id = %self.room_id, round_number, ?reason, "turn complete");
        self.fanout.to_room(ServerMessage::RoundComplete {
            round_number,
            word,
            scores: self.roster.scores(),
        });

        if self.is_final_turn() {
            return self.finish_game();
        }
        match self.options.intermission_secs {
            0 => self.begin_next_turn(),
            secs => self.start_timer(TimerType::Intermission, secs),
        }
    }

    fn finish_game(&mut self) {
        for timer_type in [
            TimerType::StartCountdown,
            TimerType::SelectWord,
            TimerType::Round,
            TimerType::Intermission,
        ] {
            self.stop_timer(&timer_type);
        }
        self.set_phase(GamePhase::GameFinished);
        self.paused = false;
        self.round = None;
        self.roster.set_drawer(None);

        let final_scores = self.roster.ranking();
        info!(room_id = %self.room_id, winner = ?final_scores.first().map(|s| &s.player_id), "game finished");
        self.fanout
            .to_room(ServerMessage::GameFinished { final_scores });
        self.arm_linger();
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_phase(&mut self, next: GamePhase) {
        if !self.phase.can_transition_to(next) {
            warn!(room_id = %self.room_id, from = %self.phase, to = %next, "unexpected phase transition");
        }
        self.phase = next;
    }

    /// Starts a timer and announces its full duration. No-op if running.
    fn start_timer(&mut self, timer_type: TimerType, secs: u32) {
        let kind = timer_type.kind();
        if self.timers.start(timer_type, secs).is_some() {
            if let Some(kind) = kind {
                self.fanout.to_room(ServerMessage::TimerUpdate {
                    timer_type: kind,
                    seconds_remaining: secs,
                });
            }
        }
    }

    /// Stops a timer and announces it. No-op if not running.
    fn stop_timer(&mut self, timer_type: &TimerType) -> bool {
        let stopped = self.timers.stop(timer_type);
        if stopped {
            if let Some(kind) = timer_type.kind() {
                self.fanout.to_room(ServerMessage::TimerEnded { timer_type: kind });
            }
        }
        stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_action_from_client_message() {
        let action = PlayerAction::try_from(ClientMessage::Guess {
            text: "apple".into(),
        })
        .unwrap();
        assert_eq!(action, PlayerAction::Guess { text: "apple".into() });
        assert_eq!(action.name(), "guess");
    }

    #[test]
    fn test_player_action_from_request_state() {
        let action = PlayerAction::try_from(ClientMessage::RequestState).unwrap();
        assert_eq!(action, PlayerAction::RequestState);
        assert_eq!(action.name(), "request-state");
    }

    #[test]
    fn test_player_action_from_join_is_rejected() {
        let result = PlayerAction::try_from(ClientMessage::Join {
            room_id: RoomId::from("R1"),
            player_id: PlayerId::from("p1"),
            name: "Ann".into(),
        });
        assert!(matches!(result, Err(RoomError::InvalidTransition(_))));
    }
}
