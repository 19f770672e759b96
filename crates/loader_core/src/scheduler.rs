//! Named, cancellable delayed tasks.
//!
//! The controller never runs callbacks itself. It asks a [`Scheduler`] to arm a
//! timer and later receives a [`TimerFired`] from whatever host drives it. A
//! fired timer is honoured only if its id is still the one armed for its kind.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::clock::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Delayed show after the debounce window.
    Show,
    /// Deferred hide once the minimum visible duration has passed.
    Hide,
    /// End of the window in which the next unload is not announced.
    SkipUnload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub id: TimerId,
}

pub trait Scheduler: Send {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId;
    fn cancel(&mut self, id: TimerId);
}

/// Timers ordered by deadline, for hosts that poll instead of sleeping.
#[derive(Debug, Default)]
pub struct DeadlineQueue {
    next_id: u64,
    pending: Vec<(Instant, TimerFired)>,
}

impl DeadlineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, deadline: Instant, kind: TimerKind) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push((deadline, TimerFired { kind, id }));
        id
    }

    pub fn remove(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(_, fired)| fired.id != id);
        before != self.pending.len()
    }

    /// Earliest timer due at or before `now`; ties go to the older timer.
    pub fn take_due(&mut self, now: Instant) -> Option<(Instant, TimerFired)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (deadline, _))| *deadline <= now)
            .min_by_key(|(_, (deadline, fired))| (*deadline, fired.id))
            .map(|(index, _)| index)?;
        Some(self.pending.swap_remove(index))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(deadline, _)| *deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scheduler drained by a frame loop: the host calls
/// [`take_due`](Self::take_due) every frame and feeds the result back to the
/// controller.
#[derive(Clone)]
pub struct PollingScheduler {
    clock: Arc<dyn Clock>,
    queue: Arc<Mutex<DeadlineQueue>>,
}

impl PollingScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            queue: Arc::new(Mutex::new(DeadlineQueue::new())),
        }
    }

    pub fn take_due(&self, now: Instant) -> Option<TimerFired> {
        lock(&self.queue).take_due(now).map(|(_, fired)| fired)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        lock(&self.queue).next_deadline()
    }
}

impl Scheduler for PollingScheduler {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        let deadline = self.clock.now() + delay;
        lock(&self.queue).push(deadline, kind)
    }

    fn cancel(&mut self, id: TimerId) {
        lock(&self.queue).remove(id);
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
