use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// The host's window number. Zero is reserved for "no window", which is also
/// what a cleared validity slot holds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WindowId(NonZeroU32);

impl WindowId {
    /// Panics on zero.
    pub fn new(id: u32) -> WindowId {
        match Self::from_raw(id) {
            Some(id) => id,
            None => panic!("window id must be non-zero"),
        }
    }

    pub fn from_raw(id: u32) -> Option<WindowId> { NonZeroU32::new(id).map(WindowId) }

    pub fn as_u32(&self) -> u32 { self.0.get() }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
