//! Events that arrived before their subject was registered.
//!
//! An activation can beat the application's launch through the queue, and a
//! focus notification can name a window we have not observed yet (or one that
//! is minimized and cannot really hold focus). Those are parked here and
//! re-posted once when the subject becomes ready.

use super::EventKind;
use crate::common::collections::HashSet;
use crate::sys::process::pid_t;
use crate::sys::window_server::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LostEventSubject {
    Application(pid_t),
    Window(WindowId),
}

#[derive(Debug, Default)]
pub struct LostEventTracker {
    pending: HashSet<(LostEventSubject, EventKind)>,
}

impl LostEventTracker {
    pub fn new() -> Self { Self::default() }

    /// Returns false if the same deferral was already pending.
    pub fn defer(&mut self, subject: LostEventSubject, kind: EventKind) -> bool {
        self.pending.insert((subject, kind))
    }

    pub fn is_pending(&self, subject: LostEventSubject, kind: EventKind) -> bool {
        self.pending.contains(&(subject, kind))
    }

    /// Returns whether a deferral existed; it is gone afterwards.
    pub fn take_and_clear(&mut self, subject: LostEventSubject, kind: EventKind) -> bool {
        self.pending.remove(&(subject, kind))
    }

    pub fn forget(&mut self, subject: LostEventSubject) {
        self.pending.retain(|(s, _)| *s != subject);
    }

    /// Drops window deferrals whose window fails `keep`. Returns how many
    /// were dropped.
    pub fn retain_windows(&mut self, mut keep: impl FnMut(WindowId) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(subject, _)| match subject {
            LostEventSubject::Window(wid) => keep(*wid),
            LostEventSubject::Application(_) => true,
        });
        before - self.pending.len()
    }

    pub fn clear(&mut self) { self.pending.clear(); }

    pub fn len(&self) -> usize { self.pending.len() }

    pub fn is_empty(&self) -> bool { self.pending.is_empty() }
}
