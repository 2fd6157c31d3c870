//! Requests to the focus border renderer. All of them are fire-and-forget.

use crate::actor;
use crate::sys::geometry::Rect;
use crate::sys::window_server::WindowId;

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Activate(WindowId),
    Deactivate(WindowId),
    Show(WindowId),
    Hide(WindowId),
    Refresh(WindowId, Rect),
    SetTopmost(WindowId, bool),
}

pub type Sender = actor::Sender<Request>;
pub type Receiver = actor::Receiver<Request>;
