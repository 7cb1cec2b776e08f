//! Per-room named countdown timers.
//!
//! A [`TimerRegistry`] belongs to exactly one room. It keeps at most one
//! live countdown per [`TimerType`] and reports progress on a single
//! channel, so the room's event loop can `select!` over its command queue
//! and its timers without any callbacks.
//!
//! # Lifecycle
//!
//! ```text
//! start(type, n) ──► Tick{n-1} ──► Tick{n-2} ──► ... ──► Expired
//!        │                                                 │
//!        └── stop(type) cancels; no further events         └── owner calls complete(handle)
//! ```
//!
//! Every started countdown gets a fresh generation number inside its
//! [`TimerHandle`]. An event whose handle is no longer current (the timer
//! was stopped, or stopped and started again, while the event sat in the
//! channel) is stale, and [`TimerRegistry::complete`] refuses it. That is
//! what makes expiry fire at most once even when a stop races the last
//! tick.
//!
//! Starting a type that is already running and stopping a type that is not
//! running are both no-ops, never errors.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use sketchroom_protocol::{PlayerId, RoomId, TimerKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Timer identity
// ---------------------------------------------------------------------------

/// Names one countdown slot within a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerType {
    StartCountdown,
    SelectWord,
    Round,
    Intermission,
    /// Reconnection window for one disconnected player. Silent: no ticks.
    Grace(PlayerId),
    /// Retires a finished or idle room. Silent.
    Cleanup,
}

impl TimerType {
    /// The client-visible kind, or `None` for timers that never appear on
    /// the wire.
    pub fn kind(&self) -> Option<TimerKind> {
        match self {
            TimerType::StartCountdown => Some(TimerKind::StartCountdown),
            TimerType::SelectWord => Some(TimerKind::SelectWord),
            TimerType::Round => Some(TimerKind::Round),
            TimerType::Intermission => Some(TimerKind::Intermission),
            TimerType::Grace(_) | TimerType::Cleanup => None,
        }
    }
}

impl From<TimerKind> for TimerType {
    fn from(kind: TimerKind) -> Self {
        match kind {
            TimerKind::StartCountdown => TimerType::StartCountdown,
            TimerKind::SelectWord => TimerType::SelectWord,
            TimerKind::Round => TimerType::Round,
            TimerKind::Intermission => TimerType::Intermission,
        }
    }
}

impl fmt::Display for TimerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerType::Grace(player_id) => write!(f, "grace:{player_id}"),
            TimerType::Cleanup => f.write_str("cleanup"),
            other => match other.kind() {
                Some(kind) => write!(f, "{kind}"),
                None => Ok(()),
            },
        }
    }
}

/// Identifies one particular run of a timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    timer_type: TimerType,
    generation: u64,
}

impl TimerHandle {
    pub fn timer_type(&self) -> &TimerType {
        &self.timer_type
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Progress reported by a running countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining` is always > 0.
    Tick { handle: TimerHandle, remaining: u32 },
    /// The countdown reached zero.
    Expired { handle: TimerHandle },
}

impl TimerEvent {
    pub fn handle(&self) -> &TimerHandle {
        match self {
            TimerEvent::Tick { handle, .. } | TimerEvent::Expired { handle } => handle,
        }
    }
}

// ---------------------------------------------------------------------------
// TimerRegistry
// ---------------------------------------------------------------------------

struct ActiveTimer {
    generation: u64,
    duration_secs: u32,
    started_at: Instant,
    task: JoinHandle<()>,
}

/// All countdowns of one room.
///
/// Dropping the registry aborts every countdown it still owns.
pub struct TimerRegistry {
    room_id: RoomId,
    timers: HashMap<TimerType, ActiveTimer>,
    next_generation: u64,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerRegistry {
    /// Creates an empty registry for `room_id` and the receiver on which
    /// all of its timer events arrive.
    pub fn new(room_id: RoomId) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let registry = Self {
            room_id,
            timers: HashMap::new(),
            next_generation: 1,
            events,
        };
        (registry, rx)
    }

    /// Starts a countdown of `secs` seconds.
    ///
    /// Returns `None` without touching the running countdown if one of the
    /// same type is already live. A zero-second countdown expires on the
    /// next turn of the event loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, timer_type: TimerType, secs: u32) -> Option<TimerHandle> {
        if self.timers.contains_key(&timer_type) {
            trace!(room_id = %self.room_id, timer = %timer_type, "timer already running, start ignored");
            return None;
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        let handle = TimerHandle {
            timer_type: timer_type.clone(),
            generation,
        };

        let started_at = Instant::now();
        let task = tokio::spawn(run_countdown(
            handle.clone(),
            secs,
            started_at,
            self.events.clone(),
        ));

        debug!(room_id = %self.room_id, timer = %timer_type, secs, generation, "timer started");
        self.timers.insert(
            timer_type,
            ActiveTimer {
                generation,
                duration_secs: secs,
                started_at,
                task,
            },
        );
        Some(handle)
    }

    /// Cancels the countdown of `timer_type`.
    ///
    /// Returns whether a countdown was actually running; stopping an
    /// absent timer is a no-op.
    pub fn stop(&mut self, timer_type: &TimerType) -> bool {
        match self.timers.remove(timer_type) {
            Some(active) => {
                active.task.abort();
                debug!(room_id = %self.room_id, timer = %timer_type, "timer stopped");
                true
            }
            None => false,
        }
    }

    /// Whether `handle` still names the live run of its timer type.
    pub fn is_current(&self, handle: &TimerHandle) -> bool {
        self.timers
            .get(&handle.timer_type)
            .is_some_and(|active| active.generation == handle.generation)
    }

    /// Retires the timer named by an `Expired` event.
    ///
    /// Returns `true` exactly once per run; a stale handle returns `false`
    /// and leaves any newer run of the same type untouched.
    pub fn complete(&mut self, handle: &TimerHandle) -> bool {
        if !self.is_current(handle) {
            trace!(room_id = %self.room_id, timer = %handle.timer_type, "stale expiry ignored");
            return false;
        }
        self.timers.remove(&handle.timer_type);
        debug!(room_id = %self.room_id, timer = %handle.timer_type, "timer expired");
        true
    }

    pub fn is_running(&self, timer_type: &TimerType) -> bool {
        self.timers.contains_key(timer_type)
    }

    /// Whole seconds left on `timer_type`, if it is running.
    pub fn remaining(&self, timer_type: &TimerType) -> Option<u32> {
        self.timers.get(timer_type).map(remaining_secs)
    }

    /// Client-visible timers with their remaining seconds.
    pub fn visible(&self) -> Vec<(TimerKind, u32)> {
        let mut out: Vec<_> = self
            .timers
            .iter()
            .filter_map(|(ty, active)| ty.kind().map(|kind| (kind, remaining_secs(active))))
            .collect();
        out.sort_by_key(|(kind, _)| *kind as u8);
        out
    }

    /// Number of live countdowns, silent ones included.
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Aborts every countdown. Used on room teardown.
    pub fn cancel_all(&mut self) {
        if self.timers.is_empty() {
            return;
        }
        debug!(room_id = %self.room_id, count = self.timers.len(), "cancelling all timers");
        for (_, active) in self.timers.drain() {
            active.task.abort();
        }
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn remaining_secs(active: &ActiveTimer) -> u32 {
    let elapsed = u32::try_from(active.started_at.elapsed().as_secs()).unwrap_or(u32::MAX);
    active.duration_secs.saturating_sub(elapsed)
}

/// Sleeps to each whole-second boundary measured from `started_at`, so a
/// slow event loop never stretches the countdown.
async fn run_countdown(
    handle: TimerHandle,
    secs: u32,
    started_at: Instant,
    events: mpsc::UnboundedSender<TimerEvent>,
) {
    let silent = handle.timer_type.kind().is_none();

    if silent {
        time::sleep_until(started_at + Duration::from_secs(u64::from(secs))).await;
    } else {
        for elapsed in 1..secs {
            time::sleep_until(started_at + Duration::from_secs(u64::from(elapsed))).await;
            let tick = TimerEvent::Tick {
                handle: handle.clone(),
                remaining: secs - elapsed,
            };
            if events.send(tick).is_err() {
                return;
            }
        }
        if secs > 0 {
            time::sleep_until(started_at + Duration::from_secs(u64::from(secs))).await;
        }
    }

    // Receiver gone means the room is being torn down.
    let _ = events.send(TimerEvent::Expired { handle });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_type_kind_maps_visible_types() {
        assert_eq!(TimerType::Round.kind(), Some(TimerKind::Round));
        assert_eq!(TimerType::Grace(PlayerId::from("p1")).kind(), None);
        assert_eq!(TimerType::Cleanup.kind(), None);
        assert_eq!(TimerType::from(TimerKind::SelectWord), TimerType::SelectWord);
    }

    #[test]
    fn test_timer_type_display() {
        assert_eq!(TimerType::StartCountdown.to_string(), "start-countdown");
        assert_eq!(TimerType::Grace(PlayerId::from("p1")).to_string(), "grace:p1");
        assert_eq!(TimerType::Cleanup.to_string(), "cleanup");
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_assigns_increasing_generations() {
        let (mut timers, _rx) = TimerRegistry::new(RoomId::from("R1"));
        let a = timers.start(TimerType::Round, 10).unwrap();
        assert!(timers.stop(&TimerType::Round));
        let b = timers.start(TimerType::Round, 10).unwrap();
        assert!(b.generation() > a.generation());
        assert!(!timers.is_current(&a));
        assert!(timers.is_current(&b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_excludes_grace_timers() {
        let (mut timers, _rx) = TimerRegistry::new(RoomId::from("R1"));
        timers.start(TimerType::Round, 80);
        timers.start(TimerType::Grace(PlayerId::from("p2")), 20);
        assert_eq!(timers.len(), 2);
        assert_eq!(timers.visible(), vec![(TimerKind::Round, 80)]);
    }
}
