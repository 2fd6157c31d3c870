use crate::common::collections::BTreeSet;
use crate::sys::screen::{DisplayId, SpaceId};
use crate::sys::window_server::WindowId;

/// Tiling membership of one window on one space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub window: WindowId,
    pub space: SpaceId,
}

#[derive(Debug, Clone)]
pub struct Space {
    pub id: SpaceId,
    pub display: Option<DisplayId>,
    /// Windows with a view on this space.
    pub windows: BTreeSet<WindowId>,
    /// Membership changed while the space was not visible; the layout has to
    /// be flushed when it is shown again.
    pub is_dirty: bool,
    /// Geometry changed under the space; the layout has to be recomputed.
    pub is_invalid: bool,
}

impl Space {
    pub fn new(id: SpaceId) -> Space {
        Space {
            id,
            display: None,
            windows: BTreeSet::new(),
            is_dirty: false,
            is_invalid: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Display {
    pub id: DisplayId,
    pub space: Option<SpaceId>,
    pub last_space: Option<SpaceId>,
}

impl Display {
    pub fn new(id: DisplayId, space: Option<SpaceId>) -> Display {
        Display { id, space, last_space: None }
    }

    pub fn set_space(&mut self, space: SpaceId) {
        if self.space != Some(space) {
            self.last_space = self.space;
            self.space = Some(space);
        }
    }
}
