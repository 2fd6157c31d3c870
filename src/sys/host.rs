//! The seam between the reactor and the platform's accessibility and window
//! server APIs.
//!
//! Everything here is called from the reactor thread only. Notifications flow
//! the other way, as [`Event`](crate::actor::reactor::Event)s posted from
//! whichever thread the platform delivers them on.

use thiserror::Error;

use super::geometry::{Point, Rect};
use super::process::{self, pid_t};
use super::screen::{DisplayId, SpaceId};
use super::window_server::WindowId;
use crate::model::app::Process;
use crate::model::validity::ValidityToken;
use crate::model::window::WindowElement;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("could not observe application {pid}: {reason}")]
    ObserveApplication { pid: pid_t, reason: String },
    #[error("could not observe window {window}: {reason}")]
    ObserveWindow { window: WindowId, reason: String },
}

pub trait Host: Send {
    fn is_process_alive(&self, pid: pid_t) -> bool { process::pid_is_alive(pid) }

    fn observe_application(&mut self, process: &Process) -> Result<(), HostError>;
    fn unobserve_application(&mut self, pid: pid_t);
    /// Windows the application currently has, including ones we may already
    /// track.
    fn application_windows(&self, pid: pid_t) -> Vec<WindowElement>;
    fn focused_window(&self, pid: pid_t) -> Option<WindowId>;
    fn main_window(&self, pid: pid_t) -> Option<WindowId>;

    /// Subscribes to the window's notifications. The returned token is cleared
    /// by the host when the window dies.
    fn observe_window(
        &mut self,
        window: WindowId,
        element: &WindowElement,
    ) -> Result<ValidityToken, HostError>;
    fn unobserve_window(&mut self, window: WindowId);
    fn window_frame(&self, window: WindowId) -> Option<Rect>;
    fn window_title(&self, window: WindowId) -> Option<String>;
    fn window_spaces(&self, window: WindowId) -> Vec<SpaceId>;
    fn window_at_point(&self, point: Point) -> Option<WindowId>;

    fn active_space(&self) -> SpaceId;
    fn active_display(&self) -> DisplayId;
    fn main_display(&self) -> DisplayId;
    fn display_space(&self, display: DisplayId) -> Option<SpaceId>;
    fn space_display(&self, space: SpaceId) -> Option<DisplayId>;
    fn space_windows(&self, space: SpaceId) -> Vec<WindowId>;
    fn is_display_animating(&self) -> bool;

    fn cursor_location(&self) -> Option<Point>;
    fn warp_cursor(&mut self, point: Point);
    fn focus_window(&mut self, window: WindowId, raise: bool);
    fn set_window_opacity(&mut self, window: WindowId, opacity: f32);
}
