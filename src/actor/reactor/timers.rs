//! Events scheduled for later delivery. The dispatch loop sleeps until the
//! earliest deadline and re-posts whatever is due to the back of the queue.

use std::time::Instant;

use super::Event;
use crate::common::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct DeferredTasks {
    queue: BTreeMap<(Instant, u64), Event>,
    next_seq: u64,
}

impl DeferredTasks {
    pub fn new() -> Self { Self::default() }

    pub fn schedule(&mut self, at: Instant, event: Event) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.insert((at, seq), event);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Removes and returns everything due at `now`, earliest first. Ties keep
    /// scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<Event> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due
    }

    pub fn len(&self) -> usize { self.queue.len() }

    pub fn is_empty(&self) -> bool { self.queue.is_empty() }
}
