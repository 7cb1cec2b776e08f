//! Drives a `Session` directly, feeding it timer events by hand.
//!
//! All tests run on paused Tokio time, so countdowns finish instantly and
//! deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use sketchroom_protocol::{
    Classification, ConnectionId, ConnectionStatus, GamePhase, PlayerId, RemovalReason, RoomId,
    ServerMessage, TimerKind,
};
use sketchroom_room::{
    Flow, PlayerAction, RevealSchedule, RoomError, Session, SessionOptions,
};
use sketchroom_timer::{TimerEvent, TimerRegistry, TimerType};
use sketchroom_words::{FixedWords, WordProvider};
use tokio::sync::mpsc;

// =========================================================================
// Harness
// =========================================================================

const WORDS: [&str; 10] = [
    "apple", "banana", "cherry", "grape", "lemon", "mango", "peach", "plum", "melon", "kiwi",
];

fn pid(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn options() -> SessionOptions {
    SessionOptions {
        intermission_secs: 0,
        rng_seed: Some(7),
        ..SessionOptions::default()
    }
}

struct Harness {
    session: Session,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    inboxes: HashMap<String, mpsc::Receiver<ServerMessage>>,
    connections: HashMap<String, ConnectionId>,
    next_conn: u64,
}

impl Harness {
    fn new(options: SessionOptions) -> Self {
        Self::with_words(options, Arc::new(FixedWords::new("Random", WORDS)))
    }

    fn with_words(options: SessionOptions, words: Arc<dyn WordProvider>) -> Self {
        let room_id = RoomId::from("R1");
        let (timers, timer_rx) = TimerRegistry::new(room_id.clone());
        Self {
            session: Session::new(room_id, options, words, timers),
            timer_rx,
            inboxes: HashMap::new(),
            connections: HashMap::new(),
            next_conn: 1,
        }
    }

    fn try_join(&mut self, id: &str) -> Result<(), RoomError> {
        let conn = ConnectionId::new(self.next_conn);
        self.next_conn += 1;
        let (tx, rx) = mpsc::channel(1024);
        self.session
            .join(pid(id), id.to_uppercase(), conn, tx)?;
        self.inboxes.insert(id.to_owned(), rx);
        self.connections.insert(id.to_owned(), conn);
        Ok(())
    }

    fn join(&mut self, id: &str) {
        self.try_join(id).unwrap();
    }

    fn disconnect(&mut self, id: &str) {
        let conn = self.connections[id];
        self.session.disconnect(&pid(id), conn);
    }

    fn act(&mut self, id: &str, action: PlayerAction) -> Result<Flow, RoomError> {
        self.session.act(&pid(id), action)
    }

    fn drain(&mut self, id: &str) -> Vec<ServerMessage> {
        let rx = self.inboxes.get_mut(id).unwrap();
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn drain_all(&mut self) {
        let ids: Vec<String> = self.inboxes.keys().cloned().collect();
        for id in ids {
            self.drain(&id);
        }
    }

    /// Feeds timer events until `timer_type` expires, returning the flow of
    /// that expiry.
    async fn run_until_expired(&mut self, timer_type: TimerType) -> Flow {
        loop {
            let event = self.timer_rx.recv().await.unwrap();
            let done = matches!(
                &event,
                TimerEvent::Expired { handle } if *handle.timer_type() == timer_type
            );
            let flow = self.session.on_timer(event);
            if done {
                return flow;
            }
        }
    }

    fn drawer(&self) -> PlayerId {
        self.session.round().unwrap().drawer.clone()
    }

    fn first_candidate(&self) -> String {
        self.session.round().unwrap().candidates[0].word.clone()
    }

    /// The current drawer picks the first word offered.
    fn select_first(&mut self) {
        let drawer = self.drawer();
        let word = self.first_candidate();
        self.session
            .act(&drawer, PlayerAction::SelectWord { word })
            .unwrap();
    }

    fn drawing_count(&self) -> usize {
        self.session
            .roster()
            .iter()
            .filter(|p| p.is_drawing)
            .count()
    }
}

fn guess(text: &str) -> PlayerAction {
    PlayerAction::Guess { text: text.into() }
}

// =========================================================================
// A full turn
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_turn_create_join_draw_guess_completes() {
    let mut h = Harness::new(options());
    h.join("alice");

    let first = h.drain("alice");
    match &first[..] {
        [ServerMessage::RoomState { snapshot }] => {
            assert_eq!(snapshot.host_id, Some(pid("alice")));
            assert_eq!(snapshot.phase, GamePhase::Waiting);
        }
        other => panic!("unexpected {other:?}"),
    }

    h.join("bob");
    let to_alice = h.drain("alice");
    assert!(matches!(&to_alice[..], [ServerMessage::PlayerJoined { player }] if player.id == pid("bob")));
    assert!(matches!(&h.drain("bob")[..], [ServerMessage::RoomState { snapshot }] if snapshot.players.len() == 2));

    h.act("alice", PlayerAction::StartGame).unwrap();
    assert_eq!(h.session.phase(), GamePhase::WordSelection);
    assert_eq!(h.drawer(), pid("alice"));

    let to_alice = h.drain("alice");
    assert!(to_alice.contains(&ServerMessage::RoundStarted {
        drawer_id: pid("alice"),
        round_number: 1
    }));
    let choices: Vec<String> = to_alice
        .iter()
        .find_map(|m| match m {
            ServerMessage::WordChoices { candidates } => {
                Some(candidates.iter().map(|c| c.word.clone()).collect())
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(choices, vec!["apple", "banana", "cherry"]);
    let to_bob = h.drain("bob");
    assert!(!to_bob.iter().any(|m| matches!(m, ServerMessage::WordChoices { .. })));
    assert!(to_bob.contains(&ServerMessage::TimerUpdate {
        timer_type: TimerKind::SelectWord,
        seconds_remaining: 15
    }));

    // Only the drawer picks.
    let err = h.act("bob", PlayerAction::SelectWord { word: "apple".into() });
    assert!(matches!(err, Err(RoomError::InvalidTransition(_))));
    let err = h.act("alice", PlayerAction::SelectWord { word: "durian".into() });
    assert!(matches!(err, Err(RoomError::InvalidTransition(_))));

    h.act("alice", PlayerAction::SelectWord { word: "apple".into() }).unwrap();
    assert_eq!(h.session.phase(), GamePhase::Drawing);
    assert!(h.drain("bob").contains(&ServerMessage::WordSelected {
        length: 5,
        mask: "_____".into(),
        category: "Random".into(),
        word: None,
    }));
    assert!(h.drain("alice").contains(&ServerMessage::WordSelected {
        length: 5,
        mask: "_____".into(),
        category: "Random".into(),
        word: Some("apple".into()),
    }));

    // A dropped letter shifts every later position: wrong, shown to all.
    h.act("bob", guess("aple")).unwrap();
    assert!(h.drain("alice").contains(&ServerMessage::GuessResult {
        player_id: pid("bob"),
        classification: Classification::Wrong,
        text: Some("aple".into()),
    }));

    // One letter off: close, and the text is withheld.
    h.act("bob", guess("aplle")).unwrap();
    assert!(h.drain("alice").contains(&ServerMessage::GuessResult {
        player_id: pid("bob"),
        classification: Classification::Close,
        text: None,
    }));

    assert!(matches!(h.act("alice", guess("apple")), Err(RoomError::InvalidTransition(_))));

    h.drain_all();
    h.act("bob", guess(" Apple ")).unwrap();
    let to_alice = h.drain("alice");

    let pos = |wanted: &ServerMessage| to_alice.iter().position(|m| m == wanted).unwrap();
    let exact = pos(&ServerMessage::GuessResult {
        player_id: pid("bob"),
        classification: Classification::Exact,
        text: None,
    });
    let bob_score = pos(&ServerMessage::ScoreUpdated {
        player_id: pid("bob"),
        score: 100,
    });
    let bonus = pos(&ServerMessage::ScoreUpdated {
        player_id: pid("alice"),
        score: 50,
    });
    let complete = to_alice
        .iter()
        .position(|m| {
            matches!(m, ServerMessage::RoundComplete { round_number: 1, word: Some(w), .. } if w == "apple")
        })
        .unwrap();
    let next = pos(&ServerMessage::RoundStarted {
        drawer_id: pid("bob"),
        round_number: 1,
    });
    assert!(exact < bob_score && bob_score < bonus && bonus < complete && complete < next);

    assert_eq!(h.session.phase(), GamePhase::WordSelection);
    assert!(h.session.used_words().contains("apple"));
}

#[tokio::test(start_paused = true)]
async fn test_guess_after_correct_is_rejected() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.join("c");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();

    h.act("b", guess("apple")).unwrap();
    assert_eq!(h.session.phase(), GamePhase::Drawing);
    let again = h.act("b", guess("apple"));
    assert!(matches!(again, Err(RoomError::InvalidTransition(_))));
    assert_eq!(h.session.roster().get(&pid("b")).unwrap().score(), 100);
}

#[tokio::test(start_paused = true)]
async fn test_guess_empty_text_is_rejected() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    assert!(matches!(h.act("b", guess("   ")), Err(RoomError::InvalidTransition(_))));
}

#[tokio::test(start_paused = true)]
async fn test_guess_outside_drawing_is_rejected() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    assert!(matches!(h.act("b", guess("apple")), Err(RoomError::InvalidTransition(_))));
    h.act("a", PlayerAction::StartGame).unwrap();
    assert!(matches!(h.act("b", guess("apple")), Err(RoomError::InvalidTransition(_))));
}

#[tokio::test(start_paused = true)]
async fn test_score_decays_with_time_remaining() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.join("c");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();

    // 80s turn; wait until 55s remain, inside the 40..60 band.
    tokio::time::advance(std::time::Duration::from_secs(25)).await;
    h.act("b", guess("apple")).unwrap();
    assert_eq!(h.session.roster().get(&pid("b")).unwrap().score(), 80);
}

// =========================================================================
// Rotation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_rotation_every_player_draws_once_per_round() {
    let mut h = Harness::new(SessionOptions {
        max_rounds: 2,
        ..options()
    });
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.act("a", PlayerAction::StartGame).unwrap();

    let mut turns = Vec::new();
    while h.session.phase() != GamePhase::GameFinished {
        assert_eq!(h.drawing_count(), 1);
        let round = h.session.round().unwrap();
        turns.push((round.drawer.to_string(), round.number));
        h.select_first();
        h.act("a", PlayerAction::StopTimer(TimerKind::Round)).unwrap();
    }

    let expected: Vec<(String, u32)> = [("a", 1), ("b", 1), ("c", 1), ("a", 2), ("b", 2), ("c", 2)]
        .iter()
        .map(|(p, n)| (p.to_string(), *n))
        .collect();
    assert_eq!(turns, expected);
    assert_eq!(h.drawing_count(), 0);
    assert_eq!(h.session.used_words().len(), 6);

    let finished = h.drain("b");
    assert!(matches!(
        finished.last(),
        Some(ServerMessage::GameFinished { final_scores }) if final_scores.len() == 3
    ));
}

#[tokio::test(start_paused = true)]
async fn test_rotation_skips_disconnected_player() {
    let mut h = Harness::new(options());
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.act("a", PlayerAction::StartGame).unwrap();
    h.disconnect("b");
    h.select_first();
    h.act("a", PlayerAction::StopTimer(TimerKind::Round)).unwrap();
    assert_eq!(h.drawer(), pid("c"));
}

#[tokio::test(start_paused = true)]
async fn test_rotation_rejoined_player_draws_again_in_same_round() {
    let mut h = Harness::new(SessionOptions {
        max_rounds: 1,
        ..options()
    });
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.act("a", PlayerAction::StartGame).unwrap();
    for _ in 0..2 {
        h.select_first();
        h.act("a", PlayerAction::StopTimer(TimerKind::Round)).unwrap();
    }
    assert_eq!(h.drawer(), pid("c"));

    // b already drew, leaves, and comes back as a new player.
    h.act("b", PlayerAction::Leave).unwrap();
    h.join("b");
    h.select_first();
    h.act("a", PlayerAction::StopTimer(TimerKind::Round)).unwrap();

    assert_eq!(h.session.phase(), GamePhase::WordSelection);
    assert_eq!(h.drawer(), pid("b"));
    assert_eq!(h.session.round_number(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_words_repeat_once_provider_is_exhausted() {
    let mut h = Harness::with_words(options(), Arc::new(FixedWords::new("Random", ["apple"])));
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.act("a", PlayerAction::StopTimer(TimerKind::Round)).unwrap();

    assert_eq!(h.drawer(), pid("b"));
    assert_eq!(h.first_candidate(), "apple");
}

#[tokio::test(start_paused = true)]
async fn test_empty_provider_finishes_game() {
    let empty: Vec<&str> = Vec::new();
    let mut h = Harness::with_words(options(), Arc::new(FixedWords::new("Random", empty)));
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    assert_eq!(h.session.phase(), GamePhase::GameFinished);
}

// =========================================================================
// Timers
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_round_timer_expiry_completes_turn() {
    let mut h = Harness::new(SessionOptions {
        turn_secs: 10,
        intermission_secs: 3,
        ..options()
    });
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.drain_all();

    h.run_until_expired(TimerType::Round).await;
    assert_eq!(h.session.phase(), GamePhase::RoundComplete);
    assert!(!h.session.timers().is_running(&TimerType::Round));
    assert!(h.session.timers().is_running(&TimerType::Intermission));

    let to_b = h.drain("b");
    let ticks: Vec<u32> = to_b
        .iter()
        .filter_map(|m| match m {
            ServerMessage::TimerUpdate {
                timer_type: TimerKind::Round,
                seconds_remaining,
            } => Some(*seconds_remaining),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, (1..10).rev().collect::<Vec<_>>());
    assert!(to_b.contains(&ServerMessage::TimerEnded {
        timer_type: TimerKind::Round
    }));
    assert!(to_b.iter().any(|m| matches!(
        m,
        ServerMessage::RoundComplete { word: Some(w), .. } if w == "apple"
    )));

    h.run_until_expired(TimerType::Intermission).await;
    assert_eq!(h.session.phase(), GamePhase::WordSelection);
    assert_eq!(h.drawer(), pid("b"));
}

#[tokio::test(start_paused = true)]
async fn test_letters_revealed_to_guessers_only() {
    let mut h = Harness::new(SessionOptions {
        turn_secs: 10,
        ..options()
    });
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.drain_all();

    // Stop one tick before the end to inspect the mask mid-turn.
    loop {
        let event = h.timer_rx.recv().await.unwrap();
        let last_tick = matches!(&event, TimerEvent::Tick { remaining: 1, handle } if *handle.timer_type() == TimerType::Round);
        h.session.on_timer(event);
        if last_tick {
            break;
        }
    }

    let reveals: Vec<(usize, char)> = h
        .drain("b")
        .into_iter()
        .filter_map(|m| match m {
            ServerMessage::LetterRevealed { index, letter } => Some((index, letter)),
            _ => None,
        })
        .collect();
    assert_eq!(reveals.first(), Some(&(0, 'a')));
    assert!(reveals.len() >= 2);
    assert!(!h
        .drain("a")
        .iter()
        .any(|m| matches!(m, ServerMessage::LetterRevealed { .. })));

    let mask = h.session.snapshot_for(Some(&pid("b"))).mask.unwrap();
    assert!(mask.starts_with('a'));
    assert!(mask.contains('_'));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_reveal_schedule_keeps_word_hidden() {
    let mut h = Harness::new(SessionOptions {
        turn_secs: 10,
        reveal: RevealSchedule::disabled(),
        ..options()
    });
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.drain_all();

    h.run_until_expired(TimerType::Round).await;
    assert!(!h
        .drain("b")
        .iter()
        .any(|m| matches!(m, ServerMessage::LetterRevealed { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_selection_timeout_takes_first_candidate() {
    let mut h = Harness::new(SessionOptions {
        select_secs: 2,
        ..options()
    });
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();

    h.run_until_expired(TimerType::SelectWord).await;
    assert_eq!(h.session.phase(), GamePhase::Drawing);
    let word = h.session.round().unwrap().word.as_ref().unwrap().word.clone();
    assert_eq!(word, "apple");
}

#[tokio::test(start_paused = true)]
async fn test_countdown_starts_game() {
    let mut h = Harness::new(SessionOptions {
        countdown_secs: 3,
        ..options()
    });
    h.join("a");
    h.join("b");
    assert!(matches!(
        h.act("b", PlayerAction::StartTimer(TimerKind::StartCountdown)),
        Err(RoomError::InvalidTransition(_))
    ));
    h.act("a", PlayerAction::StartTimer(TimerKind::StartCountdown)).unwrap();

    h.run_until_expired(TimerType::StartCountdown).await;
    assert_eq!(h.session.phase(), GamePhase::WordSelection);
}

#[tokio::test(start_paused = true)]
async fn test_countdown_cancelled_when_players_drop_below_minimum() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartTimer(TimerKind::StartCountdown)).unwrap();
    h.drain_all();

    h.act("b", PlayerAction::Leave).unwrap();
    assert!(!h.session.timers().is_running(&TimerType::StartCountdown));
    assert!(h.drain("a").contains(&ServerMessage::TimerEnded {
        timer_type: TimerKind::StartCountdown
    }));
}

#[tokio::test(start_paused = true)]
async fn test_manual_timers_other_than_countdown_are_rejected() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    let result = h.act("a", PlayerAction::StartTimer(TimerKind::Round));
    assert!(matches!(result, Err(RoomError::InvalidTransition(_))));
}

// =========================================================================
// Start preconditions
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_start_game_requires_host_and_enough_players() {
    let mut h = Harness::new(options());
    h.join("a");
    assert!(matches!(h.act("a", PlayerAction::StartGame), Err(RoomError::InvalidTransition(_))));
    h.join("b");
    assert!(matches!(h.act("b", PlayerAction::StartGame), Err(RoomError::InvalidTransition(_))));
    h.act("a", PlayerAction::StartGame).unwrap();
    assert!(matches!(h.act("a", PlayerAction::StartGame), Err(RoomError::InvalidTransition(_))));
}

#[tokio::test(start_paused = true)]
async fn test_act_from_unknown_player_is_not_found() {
    let mut h = Harness::new(options());
    h.join("a");
    assert_eq!(
        h.act("ghost", PlayerAction::StartGame),
        Err(RoomError::PlayerNotFound(pid("ghost")))
    );
}

// =========================================================================
// Connections
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_reconnect_within_grace_keeps_state() {
    let mut h = Harness::new(options());
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.act("c", guess("apple")).unwrap();
    h.drain_all();

    h.disconnect("c");
    assert_eq!(
        h.session.roster().get(&pid("c")).unwrap().state().status(),
        ConnectionStatus::GracePeriod
    );
    assert!(h.drain("b").contains(&ServerMessage::PlayerDisconnected {
        player_id: pid("c"),
        grace_secs: 20
    }));
    assert!(h.session.timers().is_running(&TimerType::Grace(pid("c"))));

    h.join("c");
    assert!(!h.session.timers().is_running(&TimerType::Grace(pid("c"))));
    assert!(h.drain("b").contains(&ServerMessage::PlayerReconnected {
        player_id: pid("c")
    }));
    let player = h.session.roster().get(&pid("c")).unwrap();
    assert_eq!(player.score(), 100);
    assert!(player.has_guessed_correctly());
    assert!(matches!(&h.drain("c")[..], [ServerMessage::RoomState { snapshot }] if snapshot.phase == GamePhase::Drawing && snapshot.word.is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_drawer_reconnect_during_selection_gets_choices_again() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.disconnect("a");
    h.join("a");
    let to_a = h.drain("a");
    assert!(matches!(to_a.last(), Some(ServerMessage::WordChoices { candidates }) if candidates.len() == 3));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_connection_close_is_ignored() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    let old = h.connections["b"];
    h.join("b");

    h.session.disconnect(&pid("b"), old);
    assert!(h.session.roster().get(&pid("b")).unwrap().is_connected());
    assert!(!h.session.timers().is_running(&TimerType::Grace(pid("b"))));
}

#[tokio::test(start_paused = true)]
async fn test_grace_expiry_removes_player() {
    let mut h = Harness::new(SessionOptions {
        grace_secs: 5,
        ..options()
    });
    h.join("a");
    h.join("b");
    h.disconnect("b");
    h.drain_all();

    let flow = h.run_until_expired(TimerType::Grace(pid("b"))).await;
    assert_eq!(flow, Flow::Continue);
    assert!(!h.session.roster().contains(&pid("b")));
    assert!(h.drain("a").contains(&ServerMessage::PlayerRemoved {
        player_id: pid("b"),
        reason: RemovalReason::TimedOut
    }));
}

#[tokio::test(start_paused = true)]
async fn test_last_player_leaving_tears_down() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.disconnect("b");
    assert_eq!(h.act("a", PlayerAction::Leave), Ok(Flow::Continue));

    let flow = h.run_until_expired(TimerType::Grace(pid("b"))).await;
    assert_eq!(flow, Flow::Teardown);
    assert!(h.session.roster().is_empty());
    assert!(h.session.timers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_grace_expiry_mid_game_cancels_every_timer() {
    let mut h = Harness::new(SessionOptions {
        grace_secs: 2,
        ..options()
    });
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    assert!(h.session.timers().is_running(&TimerType::Round));
    h.disconnect("a");
    h.disconnect("b");

    loop {
        let event = h.timer_rx.recv().await.unwrap();
        if h.session.on_timer(event) == Flow::Teardown {
            break;
        }
    }
    assert!(h.session.roster().is_empty());
    assert!(h.session.timers().is_empty());

    // Whatever was still queued at teardown is stale, and nothing new arrives.
    tokio::time::sleep(std::time::Duration::from_secs(80)).await;
    let mut leftover = 0;
    while let Ok(event) = h.timer_rx.try_recv() {
        assert!(!h.session.timers().is_current(event.handle()));
        assert_eq!(h.session.on_timer(event), Flow::Continue);
        leftover += 1;
    }
    assert!(leftover <= 2, "{leftover} events after teardown");
}

#[tokio::test(start_paused = true)]
async fn test_all_disconnected_pauses_until_rejoin() {
    let mut h = Harness::new(SessionOptions {
        turn_secs: 10,
        ..options()
    });
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.disconnect("a");
    h.disconnect("b");

    h.run_until_expired(TimerType::Round).await;
    assert!(h.session.is_paused());
    assert_eq!(h.session.phase(), GamePhase::RoundComplete);

    h.join("b");
    assert!(!h.session.is_paused());
    assert_eq!(h.session.phase(), GamePhase::WordSelection);
    assert_eq!(h.drawer(), pid("b"));
}

// =========================================================================
// Roster changes
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_host_leaving_promotes_next_player() {
    let mut h = Harness::new(options());
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.drain_all();

    h.act("a", PlayerAction::Leave).unwrap();
    assert!(h.drain("c").contains(&ServerMessage::HostChanged {
        player_id: pid("b")
    }));
    assert!(h.session.roster().is_host(&pid("b")));
    h.act("b", PlayerAction::StartGame).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_drawer_leaving_ends_turn() {
    let mut h = Harness::new(options());
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.drain_all();

    h.act("a", PlayerAction::Leave).unwrap();
    let to_b = h.drain("b");
    assert!(to_b.iter().any(|m| matches!(m, ServerMessage::RoundComplete { .. })));
    assert_eq!(h.session.phase(), GamePhase::WordSelection);
    assert_eq!(h.drawer(), pid("b"));
    assert_eq!(h.drawing_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_last_guesser_leaving_ends_turn_early() {
    let mut h = Harness::new(options());
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.act("b", guess("apple")).unwrap();
    h.act("c", PlayerAction::Leave).unwrap();
    assert_ne!(h.drawer(), pid("a"));
}

#[tokio::test(start_paused = true)]
async fn test_kick_bans_player() {
    let mut h = Harness::new(options());
    for id in ["a", "b", "c"] {
        h.join(id);
    }
    h.drain_all();

    let not_host = h.act("b", PlayerAction::RemovePlayer(pid("c")));
    assert!(matches!(not_host, Err(RoomError::InvalidTransition(_))));
    let self_kick = h.act("a", PlayerAction::RemovePlayer(pid("a")));
    assert!(matches!(self_kick, Err(RoomError::InvalidTransition(_))));
    let unknown = h.act("a", PlayerAction::RemovePlayer(pid("zed")));
    assert_eq!(unknown, Err(RoomError::PlayerNotFound(pid("zed"))));

    h.act("a", PlayerAction::RemovePlayer(pid("c"))).unwrap();
    let removed = ServerMessage::PlayerRemoved {
        player_id: pid("c"),
        reason: RemovalReason::Kicked,
    };
    assert!(h.drain("c").contains(&removed));
    assert!(h.drain("b").contains(&removed));

    assert!(matches!(h.try_join("c"), Err(RoomError::InvalidTransition(_))));
}

#[tokio::test(start_paused = true)]
async fn test_capacity_exceeded() {
    let mut h = Harness::new(SessionOptions {
        max_players: 2,
        ..options()
    });
    h.join("a");
    h.join("b");
    assert_eq!(h.try_join("c"), Err(RoomError::CapacityExceeded { max: 2 }));
    // A known player reconnecting is not a new seat.
    h.join("b");
}

// =========================================================================
// Snapshots
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_snapshot_reveals_word_to_drawer_only() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();

    let drawer_view = h.session.snapshot_for(Some(&pid("a")));
    assert_eq!(drawer_view.word.as_deref(), Some("apple"));
    assert_eq!(drawer_view.drawer_id, Some(pid("a")));

    let guesser_view = h.session.snapshot_for(Some(&pid("b")));
    assert_eq!(guesser_view.word, None);
    assert_eq!(guesser_view.mask.as_deref(), Some("_____"));
    assert_eq!(guesser_view.category.as_deref(), Some("Random"));
    assert!(guesser_view
        .timers
        .iter()
        .any(|t| t.timer_type == TimerKind::Round && t.seconds_remaining == 80));

    assert_eq!(h.session.snapshot_for(None).word, None);
}

#[tokio::test(start_paused = true)]
async fn test_request_state_answers_caller_only() {
    let mut h = Harness::new(options());
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    h.select_first();
    h.drain_all();

    assert_eq!(h.act("b", PlayerAction::RequestState), Ok(Flow::Continue));
    match &h.drain("b")[..] {
        [ServerMessage::RoomState { snapshot }] => {
            assert_eq!(snapshot.phase, GamePhase::Drawing);
            assert_eq!(snapshot.word, None);
            assert_eq!(snapshot.mask.as_deref(), Some("_____"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(h.drain("a").is_empty());
}

// =========================================================================
// Room expiry
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_finished_game_lingers_then_tears_down() {
    let empty: Vec<&str> = Vec::new();
    let mut h = Harness::with_words(
        SessionOptions {
            finished_linger_secs: 30,
            ..options()
        },
        Arc::new(FixedWords::new("Random", empty)),
    );
    h.join("a");
    h.join("b");
    h.act("a", PlayerAction::StartGame).unwrap();
    assert_eq!(h.session.phase(), GamePhase::GameFinished);
    assert_eq!(h.session.timers().remaining(&TimerType::Cleanup), Some(30));

    let flow = h.run_until_expired(TimerType::Cleanup).await;
    assert_eq!(flow, Flow::Teardown);
    assert!(h.session.timers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_idle_check_rearms_after_activity() {
    let mut h = Harness::new(SessionOptions {
        idle_room_secs: 100,
        ..options()
    });
    h.join("a");
    assert!(h.session.timers().is_running(&TimerType::Cleanup));

    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
    h.act("a", PlayerAction::RequestState).unwrap();

    // The first check finds 40s of quiet and waits out the other 60.
    assert_eq!(h.run_until_expired(TimerType::Cleanup).await, Flow::Continue);
    assert_eq!(h.session.timers().remaining(&TimerType::Cleanup), Some(60));
    assert_eq!(h.run_until_expired(TimerType::Cleanup).await, Flow::Teardown);
}

#[tokio::test(start_paused = true)]
async fn test_zero_idle_secs_never_arms_cleanup() {
    let mut h = Harness::new(SessionOptions {
        idle_room_secs: 0,
        ..options()
    });
    h.join("a");
    h.join("b");
    assert!(!h.session.timers().is_running(&TimerType::Cleanup));
}
