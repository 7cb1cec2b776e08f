//! Integration tests for the timer registry.
//!
//! Every test runs on a paused clock; awaiting the receiver auto-advances
//! time to the next timer deadline.

use std::time::Duration;

use sketchroom_protocol::{PlayerId, RoomId};
use sketchroom_timer::{TimerEvent, TimerRegistry, TimerType};
use tokio::sync::mpsc::UnboundedReceiver;

// =========================================================================
// Helpers
// =========================================================================

fn registry() -> (TimerRegistry, UnboundedReceiver<TimerEvent>) {
    TimerRegistry::new(RoomId::from("R1"))
}

/// Asserts nothing arrives within `secs` of virtual time.
async fn assert_quiet(rx: &mut UnboundedReceiver<TimerEvent>, secs: u64) {
    let result = tokio::time::timeout(Duration::from_secs(secs), rx.recv()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}

// =========================================================================
// Start / tick / expire
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_start_ticks_every_second_then_expires() {
    let (mut timers, mut rx) = registry();
    let handle = timers.start(TimerType::Round, 3).unwrap();

    let mut remaining = Vec::new();
    loop {
        match rx.recv().await.unwrap() {
            TimerEvent::Tick { handle: h, remaining: r } => {
                assert_eq!(h, handle);
                remaining.push(r);
            }
            TimerEvent::Expired { handle: h } => {
                assert_eq!(h, handle);
                break;
            }
        }
    }
    assert_eq!(remaining, vec![2, 1]);
    assert!(timers.complete(&handle));
    assert!(!timers.is_running(&TimerType::Round));
}

#[tokio::test(start_paused = true)]
async fn test_start_expiry_arrives_after_full_duration() {
    let (mut timers, mut rx) = registry();
    let begin = tokio::time::Instant::now();
    timers.start(TimerType::SelectWord, 5).unwrap();

    while let Some(event) = rx.recv().await {
        if matches!(event, TimerEvent::Expired { .. }) {
            break;
        }
    }
    let elapsed = begin.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn test_start_zero_seconds_expires_immediately() {
    let (mut timers, mut rx) = registry();
    let handle = timers.start(TimerType::Intermission, 0).unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event, TimerEvent::Expired { handle });
}

#[tokio::test(start_paused = true)]
async fn test_start_duplicate_is_noop() {
    let (mut timers, mut rx) = registry();
    let first = timers.start(TimerType::Round, 10).unwrap();

    tokio::time::advance(Duration::from_secs(4)).await;
    assert!(timers.start(TimerType::Round, 10).is_none());
    assert_eq!(timers.remaining(&TimerType::Round), Some(6));
    assert!(timers.is_current(&first));
    assert_eq!(timers.len(), 1);

    // Only the original run ever expires.
    let mut expiries = 0;
    while let Ok(Some(event)) = tokio::time::timeout(Duration::from_secs(20), rx.recv()).await {
        if let TimerEvent::Expired { handle } = event {
            assert_eq!(handle, first);
            expiries += 1;
        }
    }
    assert_eq!(expiries, 1);
}

// =========================================================================
// Stop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stop_absent_timer_returns_false() {
    let (mut timers, _rx) = registry();
    assert!(!timers.stop(&TimerType::Round));
    assert!(!timers.stop(&TimerType::Round));
}

#[tokio::test(start_paused = true)]
async fn test_stop_running_timer_silences_it() {
    let (mut timers, mut rx) = registry();
    timers.start(TimerType::Round, 5).unwrap();

    assert!(timers.stop(&TimerType::Round));
    assert!(!timers.stop(&TimerType::Round));
    assert_quiet(&mut rx, 30).await;
}

#[tokio::test(start_paused = true)]
async fn test_complete_stale_handle_after_restart_returns_false() {
    let (mut timers, mut rx) = registry();
    let old = timers.start(TimerType::Round, 0).unwrap();

    // The old run's expiry is already queued when it gets restarted.
    tokio::time::sleep(Duration::from_millis(1)).await;
    timers.stop(&TimerType::Round);
    let new = timers.start(TimerType::Round, 10).unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.handle(), &old);
    assert!(!timers.complete(&old));
    assert!(timers.is_current(&new));
    assert!(timers.is_running(&TimerType::Round));
}

#[tokio::test(start_paused = true)]
async fn test_complete_twice_returns_true_once() {
    let (mut timers, mut rx) = registry();
    let handle = timers.start(TimerType::StartCountdown, 1).unwrap();

    let event = rx.recv().await.unwrap();
    assert!(matches!(event, TimerEvent::Expired { .. }));
    assert!(timers.complete(&handle));
    assert!(!timers.complete(&handle));
}

// =========================================================================
// Grace timers, remaining, teardown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_grace_timer_expires_without_ticks() {
    let (mut timers, mut rx) = registry();
    let handle = timers
        .start(TimerType::Grace(PlayerId::from("p2")), 20)
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event, TimerEvent::Expired { handle });
}

#[tokio::test(start_paused = true)]
async fn test_grace_timers_are_keyed_per_player() {
    let (mut timers, _rx) = registry();
    assert!(timers.start(TimerType::Grace(PlayerId::from("a")), 20).is_some());
    assert!(timers.start(TimerType::Grace(PlayerId::from("b")), 20).is_some());
    assert!(timers.start(TimerType::Grace(PlayerId::from("a")), 20).is_none());
    assert_eq!(timers.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down_with_clock() {
    let (mut timers, _rx) = registry();
    timers.start(TimerType::Round, 80).unwrap();

    assert_eq!(timers.remaining(&TimerType::Round), Some(80));
    tokio::time::advance(Duration::from_secs(25)).await;
    assert_eq!(timers.remaining(&TimerType::Round), Some(55));
    assert_eq!(timers.remaining(&TimerType::SelectWord), None);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_stops_every_timer() {
    let (mut timers, mut rx) = registry();
    timers.start(TimerType::Round, 80);
    timers.start(TimerType::Grace(PlayerId::from("p1")), 20);
    timers.start(TimerType::Intermission, 5);

    timers.cancel_all();
    assert!(timers.is_empty());
    assert_quiet(&mut rx, 120).await;
}

#[tokio::test(start_paused = true)]
async fn test_drop_registry_aborts_timers() {
    let (mut timers, mut rx) = registry();
    timers.start(TimerType::Round, 3);
    drop(timers);

    // All senders are gone once the aborted task is dropped.
    let result = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
    assert_eq!(result, Ok(None));
}

#[tokio::test(start_paused = true)]
async fn test_rooms_do_not_interfere() {
    let (mut a, mut rx_a) = TimerRegistry::new(RoomId::from("A"));
    let (mut b, mut rx_b) = TimerRegistry::new(RoomId::from("B"));
    a.start(TimerType::Round, 2);
    b.start(TimerType::Round, 2);

    assert!(a.stop(&TimerType::Round));
    assert!(b.is_running(&TimerType::Round));

    assert_quiet(&mut rx_a, 10).await;
    let event = rx_b.recv().await.unwrap();
    assert!(matches!(event, TimerEvent::Tick { remaining: 1, .. }));
}
