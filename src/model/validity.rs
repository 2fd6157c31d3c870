//! Liveness tokens for host window handles.
//!
//! The host owns a slot holding the window's id and clears it to zero from
//! whatever thread learns that the window is gone. The reactor holds a token
//! over the same slot and checks it before acting on the window; a failed
//! check means the handle died while an event about it was still queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::sys::window_server::WindowId;

#[derive(Debug, Clone)]
pub struct ValidityToken {
    slot: Arc<AtomicU32>,
    expected: u32,
}

impl ValidityToken {
    pub fn new(id: WindowId) -> ValidityToken {
        ValidityToken {
            slot: Arc::new(AtomicU32::new(id.as_u32())),
            expected: id.as_u32(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.slot
            .compare_exchange(self.expected, self.expected, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn invalidate(&self) { self.slot.store(0, Ordering::Release); }

    pub fn invalidation_handle(&self) -> InvalidationHandle {
        InvalidationHandle { slot: Arc::clone(&self.slot) }
    }
}

/// Host-side half of a [`ValidityToken`]. Safe to use from any thread.
#[derive(Debug, Clone)]
pub struct InvalidationHandle {
    slot: Arc<AtomicU32>,
}

impl InvalidationHandle {
    pub fn invalidate(&self) { self.slot.store(0, Ordering::Release); }
}
