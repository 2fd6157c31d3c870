use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// A virtual desktop as reported by the host.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SpaceId(NonZeroU64);

impl SpaceId {
    /// Panics on zero; the host never reports space 0.
    pub fn new(id: u64) -> SpaceId {
        match NonZeroU64::new(id) {
            Some(id) => SpaceId(id),
            None => panic!("space id must be non-zero"),
        }
    }

    pub fn get(&self) -> u64 { self.0.get() }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// A physical monitor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DisplayId(u32);

impl DisplayId {
    pub const fn new(id: u32) -> DisplayId { DisplayId(id) }

    pub const fn as_u32(&self) -> u32 { self.0 }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
