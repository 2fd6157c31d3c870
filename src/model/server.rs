use serde::{Deserialize, Serialize};

use crate::sys::geometry::Rect;
use crate::sys::process::pid_t;
use crate::sys::screen::{DisplayId, SpaceId};
use crate::sys::window_server::WindowId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowData {
    pub id: WindowId,
    pub pid: pid_t,
    pub app_name: Option<String>,
    pub title: String,
    pub frame: Rect,
    pub is_floating: bool,
    pub is_minimized: bool,
    pub is_focused: bool,
    /// The space the window is tiled on, if it is managed.
    pub space: Option<SpaceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationData {
    pub pid: pid_t,
    pub name: String,
    pub is_hidden: bool,
    pub is_focused: bool,
    pub window_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceData {
    pub id: SpaceId,
    pub display: Option<DisplayId>,
    pub windows: Vec<WindowId>,
    pub is_current: bool,
    pub is_dirty: bool,
    pub is_invalid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayData {
    pub id: DisplayId,
    pub space: Option<SpaceId>,
    pub last_space: Option<SpaceId>,
    pub is_current: bool,
}
