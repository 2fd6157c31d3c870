use tracing::{debug, trace};

use crate::actor::border;
use crate::actor::reactor::{EventKind, LostEventSubject, Reactor, WindowStatus};
use crate::model::window::{Window, WindowElement};
use crate::sys::window_server::WindowId;

pub struct WindowEventHandler;

impl WindowEventHandler {
    /// Starts tracking a window. Returns None if it cannot be resolved, is
    /// already tracked, or belongs to an application we do not observe.
    pub fn track_window(reactor: &mut Reactor, element: &WindowElement) -> Option<WindowId> {
        let Some(wid) = element.id else {
            trace!("window element has no id");
            return None;
        };
        let Some(pid) = element.pid else {
            trace!(%wid, "window element has no owner");
            return None;
        };
        if reactor.registry.find_window(wid).is_some() {
            return None;
        }
        let Some(application) = reactor.registry.find_application(pid) else {
            trace!(%wid, pid, "window of an unobserved application");
            return None;
        };
        let is_hidden = application.is_hidden;

        let token = match reactor.host.observe_window(wid, element) {
            Ok(token) => token,
            Err(err) => {
                debug!(%wid, pid, %err, "could not observe window");
                reactor.host.unobserve_window(wid);
                reactor
                    .lost_events
                    .take_and_clear(LostEventSubject::Window(wid), EventKind::WindowFocused);
                return None;
            }
        };

        let mut window = Window::new(wid, pid, element, token);
        window.is_hidden = is_hidden;
        reactor.registry.add_window(window);
        debug!(%wid, pid, title = %element.title, "window tracked");

        reactor.set_window_opacity(wid, reactor.config.settings.normal_window_opacity);
        reactor.on_window_registered(wid);
        Some(wid)
    }

    pub fn handle_window_created(reactor: &mut Reactor, element: WindowElement) {
        let Some(wid) = Self::track_window(reactor, &element) else {
            return;
        };
        let space = reactor.host.active_space();
        reactor.admit_window(wid, space);
    }

    pub fn handle_auxiliary_window_created(element: &WindowElement) {
        debug!(
            id = ?element.id,
            pid = ?element.pid,
            title = %element.title,
            "auxiliary window created"
        );
    }

    pub fn handle_window_destroyed(reactor: &mut Reactor, wid: WindowId) {
        let Some(window) = reactor.registry.find_window(wid) else {
            return;
        };
        if window.is_valid() {
            trace!(%wid, "destroy notification arrived before the host invalidated the window");
        }
        debug!(%wid, pid = window.pid, "window destroyed");
        reactor.destroy_window(wid);
    }

    pub fn handle_window_focused(reactor: &mut Reactor, wid: WindowId) {
        match reactor.window_status(wid) {
            WindowStatus::Untracked => {
                debug!(%wid, "focus for a window that is not ready yet");
                reactor.lost_events.defer(LostEventSubject::Window(wid), EventKind::WindowFocused);
                return;
            }
            WindowStatus::Invalidated => {
                debug!(%wid, "window has been marked invalid by the system, ignoring event");
                return;
            }
            WindowStatus::Live => {}
        }
        let Some(window) = reactor.registry.find_window(wid) else {
            return;
        };
        let pid = window.pid;
        if window.is_minimized {
            debug!(%wid, "focus for a minimized window; waiting for it to be restored");
            reactor.lost_events.defer(LostEventSubject::Window(wid), EventKind::WindowFocused);
            return;
        }

        if let Some(previous) = reactor.focus_manager.focused_window
            && previous != wid
            && reactor.live_window(previous).is_some()
        {
            reactor.deactivate_window(previous);
        }
        reactor.activate_window(wid);
        reactor.center_mouse(wid);
        reactor.focus_manager.set(wid, pid);
    }

    pub fn handle_window_frame_changed(reactor: &mut Reactor, wid: WindowId) {
        let Some(window) = reactor.live_window(wid) else {
            return;
        };
        if window.is_hidden {
            return;
        }
        let frame = reactor.host.window_frame(wid).unwrap_or(window.frame);
        if let Some(window) = reactor.registry.find_window_mut(wid) {
            window.frame = frame;
        }
        reactor.communication_manager.border(border::Request::Refresh(wid, frame));
    }

    pub fn handle_window_minimized(reactor: &mut Reactor, wid: WindowId) {
        if reactor.live_window(wid).is_none() {
            return;
        }
        if let Some(window) = reactor.registry.find_window_mut(wid) {
            window.is_minimized = true;
        }
        reactor.communication_manager.border(border::Request::Hide(wid));
        reactor.remove_managed_window(wid);
        if reactor.focus_manager.clear_if(wid) {
            trace!(%wid, "focused window minimized");
        }
    }

    pub fn handle_window_deminimized(reactor: &mut Reactor, wid: WindowId) {
        match reactor.window_status(wid) {
            WindowStatus::Untracked => return,
            WindowStatus::Invalidated => {
                debug!(%wid, "window has been marked invalid by the system, ignoring event");
                reactor
                    .lost_events
                    .take_and_clear(LostEventSubject::Window(wid), EventKind::WindowFocused);
                return;
            }
            WindowStatus::Live => {}
        }
        if let Some(window) = reactor.registry.find_window_mut(wid) {
            window.is_minimized = false;
        }
        reactor.communication_manager.border(border::Request::Show(wid));

        let space = reactor.host.active_space();
        if reactor.is_window_on_active_space(wid) {
            debug!(%wid, %space, "window restored on the active space");
            reactor.admit_window(wid, space);
        } else {
            debug!(%wid, "window restored on an inactive space");
        }

        reactor.on_window_registered(wid);
    }

    pub fn handle_window_title_changed(reactor: &mut Reactor, wid: WindowId) {
        if reactor.live_window(wid).is_none() {
            return;
        }
        let Some(title) = reactor.host.window_title(wid) else {
            return;
        };
        if let Some(window) = reactor.registry.find_window_mut(wid) {
            window.title = title;
        }
    }
}
