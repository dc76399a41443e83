//! Delayed actions driven by the host clock.
//!
//! Each engine owns one queue. Entries carry the round generation they were
//! scheduled in; ending a round clears the queue and bumps the generation,
//! and anything that still surfaces with an old generation is dropped.

use crate::error::GameError;
use crate::session::Session;

#[derive(Debug)]
struct Entry<A> {
    due_ms: f64,
    seq: u64,
    generation: u64,
    action: A,
}

/// An action whose due time has passed.
#[derive(Debug, PartialEq)]
pub struct Fired<A> {
    pub at_ms: f64,
    pub action: A,
}

#[derive(Debug)]
pub struct Timers<A> {
    generation: u64,
    seq: u64,
    entries: Vec<Entry<A>>,
}

impl<A> Default for Timers<A> {
    fn default() -> Self {
        Self { generation: 0, seq: 0, entries: Vec::new() }
    }
}

impl<A> Timers<A> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, action: A) {
        self.seq += 1;
        self.entries.push(Entry {
            due_ms: now_ms + delay_ms.max(0.0),
            seq: self.seq,
            generation: self.generation,
            action,
        });
    }

    /// Removes every entry and invalidates the current generation.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.generation += 1;
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Earliest entry due at or before `now_ms`; ties keep scheduling order.
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Fired<A>> {
        loop {
            let idx = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.due_ms <= now_ms)
                .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
                .map(|(i, _)| i)?;
            let entry = self.entries.swap_remove(idx);
            if entry.generation != self.generation {
                log::debug!("dropping stale timer from generation {}", entry.generation);
                continue;
            }
            return Some(Fired { at_ms: entry.due_ms, action: entry.action });
        }
    }
}

/// Engines with a timer queue. `run_due` fires every due action in order,
/// presenting each one's due time as `now_ms` so chained delays add up
/// from when the previous step was meant to happen.
pub(crate) trait Scheduled {
    type Action;

    fn timers_mut(&mut self) -> &mut Timers<Self::Action>;

    fn fire(&mut self, action: Self::Action, s: &mut Session<'_>) -> Result<(), GameError>;

    fn run_due(&mut self, s: &mut Session<'_>) -> Result<(), GameError> {
        let now = s.now_ms;
        let mut result = Ok(());
        while let Some(fired) = self.timers_mut().pop_due(now) {
            s.now_ms = fired.at_ms;
            result = self.fire(fired.action, s);
            if result.is_err() {
                break;
            }
        }
        s.now_ms = now;
        result
    }
}
