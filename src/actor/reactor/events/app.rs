use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace, warn};

use super::window::WindowEventHandler;
use crate::actor::border;
use crate::actor::reactor::{Event, EventKind, LostEventSubject, Reactor};
use crate::model::app::{Application, Process};
use crate::sys::process::pid_t;

pub struct AppEventHandler;

impl AppEventHandler {
    pub fn handle_application_launched(
        reactor: &mut Reactor,
        process: Arc<Process>,
        is_retry: bool,
    ) {
        let pid = process.pid;
        if process.is_terminated() || !reactor.host.is_process_alive(pid) {
            debug!(pid, name = %process.name, "process exited before it could be observed");
            let subject = LostEventSubject::Application(pid);
            reactor.lost_events.take_and_clear(subject, EventKind::ApplicationActivated);
            // A failed first attempt already recorded the process.
            reactor.registry.remove_process(pid);
            return;
        }
        if reactor.registry.find_application(pid).is_some() {
            trace!(pid, "application is already observed");
            return;
        }
        reactor.registry.add_process(process.clone());

        if let Err(err) = reactor.host.observe_application(&process) {
            reactor.host.unobserve_application(pid);
            if is_retry {
                warn!(pid, name = %process.name, %err, "could not observe application; giving up");
                reactor.lost_events.forget(LostEventSubject::Application(pid));
            } else {
                debug!(pid, name = %process.name, %err, "could not observe application; retrying");
                let at = Instant::now() + reactor.config.settings.observe_retry_delay;
                let retry = Event::ApplicationLaunched { process, is_retry: true };
                reactor.deferred_tasks.schedule(at, retry);
            }
            return;
        }

        debug!(pid, name = %process.name, "application launched");
        reactor.registry.add_application(Application::new(&process));

        for element in reactor.host.application_windows(pid) {
            WindowEventHandler::track_window(reactor, &element);
        }
        let space = reactor.host.active_space();
        for wid in reactor.registry.windows_of(pid) {
            reactor.admit_window(wid, space);
        }

        reactor.on_application_registered(pid);
    }

    pub fn handle_application_terminated(reactor: &mut Reactor, pid: pid_t) {
        if reactor.registry.find_application(pid).is_some() {
            debug!(pid, "application terminated");
            reactor.destroy_application(pid);
        } else {
            trace!(pid, "unobserved application terminated");
        }
        reactor.lost_events.forget(LostEventSubject::Application(pid));
        if let Some(process) = reactor.registry.remove_process(pid) {
            process.mark_terminated();
        }
    }

    pub fn handle_application_activated(reactor: &mut Reactor, pid: pid_t) {
        let Some(application) = reactor.registry.find_application(pid) else {
            debug!(pid, "activation for an application that is not ready yet");
            reactor
                .lost_events
                .defer(LostEventSubject::Application(pid), EventKind::ApplicationActivated);
            return;
        };
        if application.process().is_none_or(|process| process.is_terminated()) {
            trace!(pid, "activation for an application that is shutting down");
            return;
        }

        let Some(wid) = reactor.host.focused_window(pid) else {
            return;
        };
        if reactor.focus_manager.focused_window == Some(wid) {
            return;
        }
        let Some(window) = reactor.live_window(wid) else {
            return;
        };
        if window.is_minimized {
            return;
        }

        reactor.activate_window(wid);
        reactor.center_mouse(wid);
        reactor.focus_manager.set(wid, pid);
        reactor.focus_manager.reactivate_focused_window = reactor.host.is_display_animating();
    }

    pub fn handle_application_deactivated(reactor: &mut Reactor, pid: pid_t) {
        if reactor.registry.find_application(pid).is_none() {
            return;
        }
        let Some(wid) = reactor.host.focused_window(pid) else {
            return;
        };
        let Some(window) = reactor.live_window(wid) else {
            return;
        };
        let is_standard = window.is_standard;
        reactor.deactivate_window(wid);

        // A sheet or panel can hold focus while the main window still shows as
        // active.
        if !is_standard
            && let Some(main) = reactor.host.main_window(pid)
            && main != wid
            && reactor.live_window(main).is_some()
        {
            reactor.deactivate_window(main);
        }
    }

    pub fn handle_application_visible(reactor: &mut Reactor, pid: pid_t) {
        let Some(application) = reactor.registry.find_application_mut(pid) else {
            return;
        };
        application.is_hidden = false;
        debug!(pid, "application visible");

        for wid in reactor.registry.windows_of(pid) {
            if let Some(window) = reactor.registry.find_window_mut(wid) {
                window.is_hidden = false;
            }
            if reactor.live_window(wid).is_none() || !reactor.should_manage(wid) {
                continue;
            }
            let space = match reactor.host.window_spaces(wid).first() {
                Some(space) => *space,
                None => reactor.host.active_space(),
            };
            reactor.admit_window(wid, space);
            reactor.communication_manager.border(border::Request::Show(wid));
        }
    }

    pub fn handle_application_hidden(reactor: &mut Reactor, pid: pid_t) {
        let Some(application) = reactor.registry.find_application_mut(pid) else {
            return;
        };
        application.is_hidden = true;
        debug!(pid, "application hidden");

        for wid in reactor.registry.windows_of(pid) {
            if let Some(window) = reactor.registry.find_window_mut(wid) {
                window.is_hidden = true;
            }
            if reactor.live_window(wid).is_none() {
                continue;
            }
            reactor.communication_manager.border(border::Request::Hide(wid));
            reactor.remove_managed_window(wid);
        }
    }
}
