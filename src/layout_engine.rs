//! The tiling seam. Geometry lives behind this trait; the reactor only
//! decides which windows participate and when layouts need work.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::model::space::View;
use crate::model::window::Window;
use crate::sys::screen::SpaceId;

bitflags! {
    /// Edges a relative resize applies to. Left/top deltas move the origin,
    /// right/bottom deltas grow the size.
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResizeHandle: u8 {
        const TOP = 1 << 0;
        const BOTTOM = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

pub trait TilingEngine: Send {
    /// Re-evaluated at every admission point; implementations must not cache.
    fn should_manage_window(&self, window: &Window) -> bool {
        window.is_standard && !window.is_floating && !window.is_minimized && !window.is_hidden
    }

    fn tile_window_on_space(&mut self, window: &Window, space: SpaceId) -> View;
    fn untile_window(&mut self, view: &View, window: &Window);

    /// Recompute the layout of a space whose geometry changed.
    fn update_space(&mut self, space: SpaceId);
    /// Apply a layout whose membership changed while it was not visible.
    fn flush_space(&mut self, space: SpaceId);

    fn resize_window_relative(&mut self, window: &Window, handle: ResizeHandle, dx: f64, dy: f64);
}
