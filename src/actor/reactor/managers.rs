use std::time::Duration;

use tracing::{debug, trace};

use super::Event;
use crate::actor::{self, border};
use crate::sys::geometry::Rect;
use crate::sys::process::pid_t;
use crate::sys::screen::{DisplayId, SpaceId};
use crate::sys::window_server::WindowId;

/// Manages the focused window. The stored id is either None or a tracked,
/// non-minimized window.
#[derive(Debug, Default)]
pub struct FocusManager {
    pub focused_window: Option<WindowId>,
    pub focused_pid: Option<pid_t>,
    /// Set when an application activated while the display was animating;
    /// the next space change reasserts the focused window's visuals.
    pub reactivate_focused_window: bool,
}

impl FocusManager {
    pub fn set(&mut self, window: WindowId, pid: pid_t) {
        self.focused_window = Some(window);
        self.focused_pid = Some(pid);
    }

    pub fn clear(&mut self) {
        self.focused_window = None;
        self.focused_pid = None;
    }

    pub fn clear_if(&mut self, window: WindowId) -> bool {
        if self.focused_window == Some(window) {
            self.clear();
            return true;
        }
        false
    }
}

/// Manages the current and previous space
#[derive(Debug, Default)]
pub struct SpaceManager {
    pub current_space: Option<SpaceId>,
    pub last_space: Option<SpaceId>,
}

impl SpaceManager {
    pub fn advance(&mut self, space: SpaceId) {
        self.last_space = self.current_space;
        self.current_space = Some(space);
    }

    pub fn is_current(&self, space: SpaceId) -> bool { self.current_space == Some(space) }
}

/// Manages the current and previous display
#[derive(Debug, Default)]
pub struct DisplayManager {
    pub current_display: Option<DisplayId>,
    pub last_display: Option<DisplayId>,
}

impl DisplayManager {
    pub fn advance(&mut self, display: DisplayId) {
        self.last_display = self.current_display;
        self.current_display = Some(display);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub window: WindowId,
    pub start_frame: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Inactive,
    Active { session: DragSession },
}

/// Manages the left-button drag target and pointer-move throttling
#[derive(Debug, Default)]
pub struct DragManager {
    pub drag_state: DragState,
    last_mouse_move_ns: Option<u64>,
}

impl DragManager {
    pub fn start(&mut self, window: WindowId, start_frame: Rect) {
        self.drag_state = DragState::Active {
            session: DragSession { window, start_frame },
        };
    }

    pub fn take_session(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.drag_state) {
            DragState::Active { session } => Some(session),
            DragState::Inactive => None,
        }
    }

    pub fn dragged(&self) -> Option<WindowId> {
        match self.drag_state {
            DragState::Active { session } => Some(session.window),
            DragState::Inactive => None,
        }
    }

    /// Drops the drag target if it is `window`.
    pub fn forget_window(&mut self, window: WindowId) {
        if self.dragged() == Some(window) {
            trace!(%window, "clearing drag target");
            self.drag_state = DragState::Inactive;
        }
    }

    /// Returns true if a move at `timestamp_ns` should be processed, and
    /// records it as the last processed move.
    pub fn accept_mouse_move(&mut self, timestamp_ns: u64, min_interval: Duration) -> bool {
        if let Some(last) = self.last_mouse_move_ns {
            let elapsed = Duration::from_nanos(timestamp_ns.saturating_sub(last));
            if elapsed < min_interval {
                return false;
            }
        }
        self.last_mouse_move_ns = Some(timestamp_ns);
        true
    }
}

/// Manages communication channels to other actors
pub struct CommunicationManager {
    /// Our own queue. Weak so that the loop ends once every external handle
    /// is gone.
    pub events_tx: actor::WeakSender<Event>,
    pub border_tx: border::Sender,
}

impl CommunicationManager {
    /// Posts to the back of our own queue.
    pub fn post(&self, event: Event) {
        match self.events_tx.upgrade() {
            Some(tx) => tx.send(event),
            None => debug!(?event, "reactor queue closed; dropping event"),
        }
    }

    pub fn border(&self, request: border::Request) { self.border_tx.send(request); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_moves_inside_the_interval_are_dropped() {
        let mut drag = DragManager::default();
        let interval = Duration::from_millis(35);
        assert!(drag.accept_mouse_move(1_000_000_000, interval));
        assert!(!drag.accept_mouse_move(1_020_000_000, interval));
        // Dropped moves do not reset the window.
        assert!(drag.accept_mouse_move(1_035_000_000, interval));
        assert!(!drag.accept_mouse_move(1_069_000_000, interval));
    }

    #[test]
    fn forgetting_another_window_keeps_the_session() {
        let mut drag = DragManager::default();
        drag.start(WindowId::new(1), Rect::ZERO);
        drag.forget_window(WindowId::new(2));
        assert_eq!(drag.dragged(), Some(WindowId::new(1)));
        drag.forget_window(WindowId::new(1));
        assert_eq!(drag.take_session(), None);
    }

    #[test]
    fn focus_clear_if_only_matches_the_focused_window() {
        let mut focus = FocusManager::default();
        focus.set(WindowId::new(4), 9);
        assert!(!focus.clear_if(WindowId::new(5)));
        assert!(focus.clear_if(WindowId::new(4)));
        assert_eq!(focus.focused_pid, None);
    }
}
