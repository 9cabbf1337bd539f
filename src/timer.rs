//! Clocks and cancellable timers.
//!
//! Every delayed behavior in the crate (slideshow auto-play, search debounce,
//! two-phase show/hide) goes through the same two pieces:
//!
//! - a [`Clock`] that reports monotonic time since its origin, and
//! - a [`TimerQueue`] holding pending events keyed by deadline.
//!
//! Engines never sleep and never spawn anything. They schedule into their own
//! queue and fire whatever is due when the host calls `poll()`. A page host
//! drives `poll()` from its frame or event loop with a [`SystemClock`]; tests
//! and scenario replay share a [`ManualClock`] with the engine and advance it
//! explicitly, which makes the 5000 ms and 300 ms behaviors deterministic.
//!
//! ## Ordering
//!
//! Timers are ordered by `(deadline, sequence)`. Two timers with the same
//! deadline fire in the order they were scheduled. Cancelling is O(log n) and
//! cancelling an already-fired or unknown id is a no-op.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn elapsed(&self) -> Duration;
}

/// Wall-clock time source backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the engine under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Jump to an absolute time. Moving backwards is ignored.
    pub fn set(&self, at: Duration) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Pending events ordered by deadline.
#[derive(Debug)]
pub struct TimerQueue<E> {
    pending: BTreeMap<(Duration, u64), E>,
    deadlines: HashMap<TimerId, Duration>,
    next_seq: u64,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            deadlines: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `event` to become due at `deadline`.
    pub fn schedule_at(&mut self, deadline: Duration, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = TimerId(seq);
        self.pending.insert((deadline, seq), event);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer, returning its event if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let deadline = self.deadlines.remove(&id)?;
        self.pending.remove(&(deadline, id.0))
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.deadlines.get(&id).copied()
    }

    /// Earliest deadline among pending timers.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first_key_value().map(|(&(deadline, _), _)| deadline)
    }

    /// Remove and return the earliest timer if it is due at `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, Duration, E)> {
        let (&(deadline, seq), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let event = self.pending.remove(&(deadline, seq))?;
        let id = TimerId(seq);
        self.deadlines.remove(&id);
        Some((id, deadline, event))
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
