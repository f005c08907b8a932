//! Deadline bookkeeping for the switcher's timers.
//!
//! Timers are keyed by purpose and there is at most one pending timer per
//! kind: scheduling a kind that is already pending replaces it. Nothing here
//! sleeps; the owner asks for [`Timers::next_deadline`], waits however it
//! likes, and then collects what is due with [`Timers::take_due`].

use std::time::{Duration, Instant};

use strum::Display;

use crate::common::collections::HashMap;

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

/// Reads tokio's clock, so paused test time moves the timers too.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant { tokio::time::Instant::now().into_std() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimerKind {
    RebuildDebounce,
    AutoCommit,
    OverlayDoublePress,
    FocusRetry,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    deadline: Instant,
    interval: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct Timers {
    pending: HashMap<TimerKind, Pending>,
}

impl Timers {
    pub fn new() -> Self { Self::default() }

    pub fn schedule(&mut self, kind: TimerKind, now: Instant, delay: Duration) {
        self.pending.insert(kind, Pending { deadline: now + delay, interval: None });
    }

    pub fn schedule_repeating(&mut self, kind: TimerKind, now: Instant, interval: Duration) {
        self.pending.insert(kind, Pending {
            deadline: now + interval,
            interval: Some(interval),
        });
    }

    /// Returns whether a timer of this kind was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool { self.pending.remove(&kind).is_some() }

    pub fn cancel_all(&mut self) { self.pending.clear(); }

    pub fn is_pending(&self, kind: TimerKind) -> bool { self.pending.contains_key(&kind) }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Timers whose deadline has passed, earliest first. One-shot timers are
    /// removed; repeating ones are rearmed one interval after `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerKind> {
        let mut due: Vec<(Instant, TimerKind)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(kind, p)| (p.deadline, *kind))
            .collect();
        due.sort();

        for (_, kind) in &due {
            let Some(pending) = self.pending.get_mut(kind) else { continue };
            match pending.interval {
                Some(interval) => pending.deadline = now + interval,
                None => {
                    self.pending.remove(kind);
                }
            }
        }
        due.into_iter().map(|(_, kind)| kind).collect()
    }
}
