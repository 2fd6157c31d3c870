use tracing::{debug, trace};

use super::window::WindowEventHandler;
use crate::actor::reactor::Reactor;
use crate::model::space::Display;
use crate::sys::screen::{DisplayId, SpaceId};

pub struct SpaceEventHandler;

impl SpaceEventHandler {
    pub fn handle_space_changed(reactor: &mut Reactor) {
        let space = reactor.host.active_space();
        reactor.space_manager.advance(space);
        debug!(%space, last = ?reactor.space_manager.last_space, "space changed");

        if let Some(display) = reactor.host.space_display(space) {
            reactor.registry.ensure_display(display).set_space(space);
        }
        Self::refresh_space_layout(reactor, space);

        let found_new_windows = Self::refresh_application_windows(reactor);
        Self::prune_lost_window_events(reactor);
        if (found_new_windows || reactor.focus_manager.reactivate_focused_window)
            && reactor.reactivate_focused_window()
        {
            reactor.focus_manager.reactivate_focused_window = false;
        }

        Self::validate_windows_on_space(reactor, space);
        Self::check_for_windows_on_space(reactor, space);
    }

    pub fn handle_display_changed(reactor: &mut Reactor) {
        let display_id = reactor.host.active_display();
        reactor.display_manager.advance(display_id);
        let space =
            reactor.host.display_space(display_id).unwrap_or_else(|| reactor.host.active_space());
        reactor.space_manager.advance(space);
        let last = reactor.display_manager.last_display;
        debug!(%display_id, %space, ?last, "display changed");

        // The platform never reports a display whose active space lives
        // elsewhere; if it does, our picture of the topology is wrong.
        assert_eq!(
            reactor.host.space_display(space),
            Some(display_id),
            "active space {space} is not on the active display {display_id}"
        );
        reactor.registry.ensure_display(display_id).set_space(space);
        Self::refresh_space_layout(reactor, space);

        if Self::refresh_application_windows(reactor) {
            reactor.reactivate_focused_window();
        }

        Self::validate_windows_on_space(reactor, space);
        Self::check_for_windows_on_space(reactor, space);
    }

    pub fn handle_display_added(reactor: &mut Reactor, display_id: DisplayId) {
        let space = reactor.host.display_space(display_id);
        if !reactor.registry.add_display(Display::new(display_id, space)) {
            trace!(%display_id, "display already known");
        }
        debug!(%display_id, ?space, "display added");
        if let Some(space) = space {
            Self::resync_display(reactor, display_id, space);
        }
    }

    pub fn handle_display_removed(reactor: &mut Reactor, display_id: DisplayId) {
        reactor.registry.remove_display(display_id);
        let main = reactor.host.main_display();
        debug!(%display_id, %main, "display removed");
        if let Some(space) = reactor.host.display_space(main) {
            Self::resync_display(reactor, main, space);
        }
    }

    pub fn handle_display_moved(reactor: &mut Reactor, display_id: DisplayId) {
        debug!(%display_id, "display moved");
        reactor.registry.mark_spaces_invalid();
    }

    pub fn handle_display_resized(reactor: &mut Reactor, display_id: DisplayId) {
        debug!(%display_id, "display resized");
        reactor.registry.mark_spaces_invalid_for_display(display_id);
    }

    pub fn handle_menu_bar_hidden_changed(reactor: &mut Reactor) {
        debug!("menu bar visibility changed");
        reactor.registry.mark_spaces_invalid();
    }

    /// Windows can move between spaces while a display comes or goes, so the
    /// visible space is re-checked from scratch.
    fn resync_display(reactor: &mut Reactor, display: DisplayId, space: SpaceId) {
        reactor.registry.mark_spaces_invalid_for_display(display);
        reactor.ensure_space(space).is_invalid = true;
        if reactor.space_manager.is_current(space) {
            Self::refresh_space_layout(reactor, space);
        }
        Self::validate_windows_on_space(reactor, space);
        Self::check_for_windows_on_space(reactor, space);
    }

    fn refresh_space_layout(reactor: &mut Reactor, space: SpaceId) {
        let entry = reactor.ensure_space(space);
        let invalid = std::mem::take(&mut entry.is_invalid);
        let dirty = std::mem::take(&mut entry.is_dirty);
        if invalid {
            trace!(%space, "updating invalid space");
            reactor.layout.update_space(space);
        }
        if dirty {
            trace!(%space, "flushing dirty space");
            reactor.layout.flush_space(space);
        }
    }

    /// Picks up windows we missed, such as ones created before their
    /// application finished launching. Returns whether any were found.
    pub(crate) fn refresh_application_windows(reactor: &mut Reactor) -> bool {
        let mut found = false;
        for pid in reactor.registry.application_pids() {
            for element in reactor.host.application_windows(pid) {
                if WindowEventHandler::track_window(reactor, &element).is_some() {
                    found = true;
                }
            }
        }
        found
    }

    /// Focus deferred for a window that is still unknown after a full refresh
    /// belongs to something we will never observe.
    fn prune_lost_window_events(reactor: &mut Reactor) {
        let registry = &reactor.registry;
        let dropped =
            reactor.lost_events.retain_windows(|wid| registry.find_window(wid).is_some());
        if dropped > 0 {
            trace!(dropped, "dropped deferred events for unknown windows");
        }
    }

    /// Untiles windows that are no longer on `space` or no longer eligible.
    fn validate_windows_on_space(reactor: &mut Reactor, space: SpaceId) {
        for view in reactor.registry.views_on_space(space) {
            let wid = view.window;
            if reactor.live_window(wid).is_none() {
                continue;
            }
            if !reactor.host.window_spaces(wid).contains(&space) {
                debug!(%wid, %space, "window left the space");
                reactor.remove_managed_window(wid);
            } else if !reactor.should_manage(wid) {
                debug!(%wid, %space, "window is no longer eligible for tiling");
                reactor.remove_managed_window(wid);
            }
        }
    }

    /// Tiles tracked windows the host reports on `space` that have no view.
    fn check_for_windows_on_space(reactor: &mut Reactor, space: SpaceId) {
        for wid in reactor.host.space_windows(space) {
            if reactor.registry.find_view(wid).is_some() {
                continue;
            }
            if reactor.live_window(wid).is_none() || !reactor.should_manage(wid) {
                continue;
            }
            reactor.admit_window(wid, space);
        }
    }
}
