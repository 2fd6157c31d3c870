use tracing::{debug, trace};

use crate::actor::border;
use crate::actor::reactor::Reactor;
use crate::common::config::FocusFollowsMouse;
use crate::layout_engine::ResizeHandle;
use crate::sys::geometry::Point;

pub struct DragEventHandler;

impl DragEventHandler {
    pub fn handle_mouse_down(reactor: &mut Reactor, point: Point) {
        let under_pointer = reactor
            .host
            .window_at_point(point)
            .filter(|wid| reactor.registry.find_window(*wid).is_some_and(|w| w.is_valid()));
        let Some(wid) = under_pointer.or(reactor.focus_manager.focused_window) else {
            return;
        };
        let Some(window) = reactor.registry.find_window(wid) else {
            return;
        };
        let start_frame = reactor.host.window_frame(wid).unwrap_or(window.frame);
        trace!(%wid, ?start_frame, "drag started");
        reactor.drag_manager.start(wid, start_frame);
        reactor.communication_manager.border(border::Request::SetTopmost(wid, true));
    }

    pub fn handle_mouse_up(reactor: &mut Reactor, point: Point) {
        let Some(session) = reactor.drag_manager.take_session() else {
            return;
        };
        let wid = session.window;
        if reactor.live_window(wid).is_none() {
            return;
        }

        let start = session.start_frame;
        let end = reactor.host.window_frame(wid).unwrap_or(start);
        let dx = end.origin.x - start.origin.x;
        let dy = end.origin.y - start.origin.y;
        let dw = end.size.width - start.size.width;
        let dh = end.size.height - start.size.height;
        trace!(%wid, ?point, dx, dy, dw, dh, "drag ended");

        let moved = dx != 0.0 || dy != 0.0;
        let resized = dw != 0.0 || dh != 0.0;
        let Some(window) = reactor.registry.find_window(wid) else {
            return;
        };

        // Dragging the left or top edge moves the origin as well as the size.
        if moved && resized {
            let mut handle = ResizeHandle::empty();
            handle.set(ResizeHandle::LEFT, dx != 0.0);
            handle.set(ResizeHandle::TOP, dy != 0.0);
            debug!(%wid, ?handle, dx, dy, "resizing from the leading edges");
            reactor.layout.resize_window_relative(window, handle, dx, dy);
        }
        if resized {
            let mut handle = ResizeHandle::empty();
            handle.set(ResizeHandle::RIGHT, dw != 0.0);
            handle.set(ResizeHandle::BOTTOM, dh != 0.0);
            debug!(%wid, ?handle, dw, dh, "resizing from the trailing edges");
            reactor.layout.resize_window_relative(window, handle, dw, dh);
        }

        reactor.communication_manager.border(border::Request::SetTopmost(wid, false));
    }

    pub fn handle_mouse_moved(reactor: &mut Reactor, point: Point, timestamp_ns: u64) {
        let throttle = reactor.config.settings.mouse_move_throttle;
        if !reactor.drag_manager.accept_mouse_move(timestamp_ns, throttle) {
            return;
        }

        let mode = reactor.config.settings.focus_follows_mouse;
        if mode == FocusFollowsMouse::Disabled {
            return;
        }
        let Some(wid) = reactor.host.window_at_point(point) else {
            return;
        };
        if reactor.focus_manager.focused_window == Some(wid) {
            return;
        }
        let Some(window) = reactor.registry.find_window(wid) else {
            return;
        };
        if !window.is_valid() || !window.is_standard {
            return;
        }
        trace!(%wid, ?mode, "focus follows mouse");
        reactor.host.focus_window(wid, mode == FocusFollowsMouse::Autoraise);
    }
}
