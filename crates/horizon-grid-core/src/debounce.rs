//! Timer-based coalescing for Horizon Grid.
//!
//! A [`Debouncer<T>`] holds at most one pending task. Scheduling while a task
//! is pending replaces it: the deadline moves to `now + delay` and the payload
//! of the latest call is the one that eventually runs. Nothing fires on its
//! own; the owner drives time by calling [`Debouncer::take_due`] from its
//! event loop (or [`Debouncer::take_now`] to flush synchronously).
//!
//! Instants are passed in explicitly so owners can drive the queue from a
//! host clock, and tests can step time deterministically.

use std::time::{Duration, Instant};

use crate::logging::targets;

/// A pending task and the instant it becomes due.
#[derive(Debug, Clone)]
struct PendingTask<T> {
    fire_time: Instant,
    payload: T,
}

/// A single-slot debounce queue.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<PendingTask<T>>,
    /// Calls folded into the currently pending task.
    coalesced: usize,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given coalescing window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            coalesced: 0,
        }
    }

    /// The coalescing window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Change the coalescing window. An already pending task keeps its deadline.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `payload` to run at `now + delay`, replacing any pending task.
    ///
    /// Returns `true` if a pending task was superseded.
    pub fn schedule(&mut self, payload: T, now: Instant) -> bool {
        let superseded = self.pending.is_some();
        self.coalesced = if superseded { self.coalesced + 1 } else { 1 };
        self.pending = Some(PendingTask {
            fire_time: now + self.delay,
            payload,
        });
        tracing::trace!(
            target: targets::DEBOUNCE,
            superseded,
            coalesced = self.coalesced,
            "debounced task scheduled"
        );
        superseded
    }

    /// Whether a task is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of calls that collapsed into the pending task (0 when idle).
    pub fn coalesced_calls(&self) -> usize {
        self.coalesced
    }

    /// Time left until the pending task becomes due, if any.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|task| task.fire_time.saturating_duration_since(now))
    }

    /// Take the pending payload if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(task) if task.fire_time <= now => self.take_now(),
            _ => None,
        }
    }

    /// Take the pending payload regardless of its deadline.
    pub fn take_now(&mut self) -> Option<T> {
        let task = self.pending.take()?;
        tracing::trace!(
            target: targets::DEBOUNCE,
            coalesced = self.coalesced,
            "debounced task released"
        );
        self.coalesced = 0;
        Some(task.payload)
    }

    /// Drop the pending task without running it.
    ///
    /// Returns `true` if something was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.coalesced = 0;
        self.pending.take().is_some()
    }
}
