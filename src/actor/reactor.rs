//! The Reactor's job is to maintain coherence between the host and model state.
//!
//! Notification sources post events from whatever thread the host delivers
//! them on. A single reactor thread drains the queue in the order it observed
//! them and updates the registry, so nothing it owns needs locking. The one
//! exception is a window's validity slot, which the host may clear at any
//! time; handlers check it before acting on a window and treat a failed check
//! as "this window is already gone".

mod events;
mod lost_events;
mod managers;
mod query;
mod timers;

#[cfg(test)]
mod testing;


use std::sync::Arc;
use std::thread;
use std::time::Instant;

use events::app::AppEventHandler;
use events::command::CommandEventHandler;
pub use events::command::{ControlCommand, ControlError, ControlMessage, QueryTarget};
use events::drag::DragEventHandler;
use events::space::SpaceEventHandler;
use events::window::WindowEventHandler;
pub use lost_events::{LostEventSubject, LostEventTracker};
use managers::{CommunicationManager, DisplayManager, DragManager, FocusManager, SpaceManager};
pub use query::{QueryRequest, ReactorQueryHandle};
use strum::{EnumDiscriminants, IntoStaticStr};
use thiserror::Error;
use timers::DeferredTasks;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::actor::{self, border};
use crate::common::config::Config;
use crate::layout_engine::TilingEngine;
use crate::model::app::Process;
use crate::model::registry::Registry;
use crate::model::space::Space;
use crate::model::window::{Window, WindowElement};
use crate::sys::geometry::Point;
use crate::sys::host::Host;
use crate::sys::process::pid_t;
use crate::sys::screen::{DisplayId, SpaceId};
use crate::sys::window_server::WindowId;

pub type Sender = actor::Sender<Event>;
type Receiver = actor::Receiver<Event>;

#[derive(Clone)]
pub struct ReactorHandle {
    sender: Sender,
    queries: ReactorQueryHandle,
}

impl ReactorHandle {
    pub fn new(sender: Sender, queries: ReactorQueryHandle) -> Self { Self { sender, queries } }

    pub fn sender(&self) -> Sender { self.sender.clone() }

    pub fn send(&self, event: Event) { self.sender.send(event) }
}

impl std::ops::Deref for ReactorHandle {
    type Target = ReactorQueryHandle;

    fn deref(&self) -> &Self::Target { &self.queries }
}

static_assertions::assert_impl_all!(ReactorHandle: Send, Sync);

#[derive(Debug, EnumDiscriminants)]
#[strum_discriminants(name(EventKind), derive(Hash, IntoStaticStr, strum::Display))]
pub enum Event {
    /// A process appeared. `is_retry` marks the single redelivery scheduled
    /// after observation failed.
    ApplicationLaunched {
        process: Arc<Process>,
        is_retry: bool,
    },
    ApplicationTerminated(pid_t),
    ApplicationActivated(pid_t),
    ApplicationDeactivated(pid_t),
    ApplicationVisible(pid_t),
    ApplicationHidden(pid_t),

    WindowCreated(WindowElement),
    WindowSheetCreated(WindowElement),
    WindowDrawerCreated(WindowElement),
    WindowDestroyed(WindowId),
    WindowFocused(WindowId),
    WindowMoved(WindowId),
    WindowResized(WindowId),
    WindowMinimized(WindowId),
    WindowDeminimized(WindowId),
    WindowTitleChanged(WindowId),

    SpaceChanged,
    DisplayChanged,
    DisplayAdded(DisplayId),
    DisplayRemoved(DisplayId),
    DisplayMoved(DisplayId),
    DisplayResized(DisplayId),
    MenuBarHiddenChanged,

    MouseDown(Point),
    MouseUp(Point),
    /// Throttled by timestamp; see `Settings::mouse_move_throttle`.
    MouseMoved {
        point: Point,
        timestamp_ns: u64,
    },

    /// A message from the control socket. The response channel is closed when
    /// the message is dropped.
    DaemonMessage(ControlMessage),
    Query(QueryRequest),
}

impl Event {
    pub fn kind(&self) -> EventKind { self.into() }
}

#[derive(Debug, Error)]
pub enum ReactorError {
    #[error("failed to spawn reactor thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Result of running the staleness guard on a window id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowStatus {
    Untracked,
    Invalidated,
    Live,
}

pub struct Reactor {
    pub config: Config,
    registry: Registry,
    host: Box<dyn Host>,
    layout: Box<dyn TilingEngine>,
    focus_manager: FocusManager,
    space_manager: SpaceManager,
    display_manager: DisplayManager,
    drag_manager: DragManager,
    communication_manager: CommunicationManager,
    lost_events: LostEventTracker,
    deferred_tasks: DeferredTasks,
}

impl Reactor {
    pub fn spawn(
        config: Config,
        host: Box<dyn Host>,
        layout: Box<dyn TilingEngine>,
        border_tx: border::Sender,
    ) -> Result<ReactorHandle, ReactorError> {
        for issue in config.validate() {
            warn!("config: {issue}");
        }
        let (events_tx, events) = actor::channel();
        let reactor = Reactor::new(config, host, layout, border_tx, events_tx.downgrade());
        thread::Builder::new().name("reactor".to_string()).spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(%err, "failed to build reactor runtime");
                    return;
                }
            };
            runtime.block_on(reactor.run(events));
        })?;
        let query_handle = ReactorQueryHandle::new(events_tx.clone());
        Ok(ReactorHandle::new(events_tx, query_handle))
    }

    pub fn new(
        config: Config,
        host: Box<dyn Host>,
        layout: Box<dyn TilingEngine>,
        border_tx: border::Sender,
        events_tx: actor::WeakSender<Event>,
    ) -> Reactor {
        let mut space_manager = SpaceManager::default();
        space_manager.advance(host.active_space());
        let mut display_manager = DisplayManager::default();
        display_manager.advance(host.active_display());
        Reactor {
            config,
            registry: Registry::new(),
            host,
            layout,
            focus_manager: FocusManager::default(),
            space_manager,
            display_manager,
            drag_manager: DragManager::default(),
            communication_manager: CommunicationManager { events_tx, border_tx },
            lost_events: LostEventTracker::new(),
            deferred_tasks: DeferredTasks::new(),
        }
    }

    pub fn registry(&self) -> &Registry { &self.registry }

    pub fn focused_window(&self) -> Option<WindowId> { self.focus_manager.focused_window }

    async fn run(mut self, mut events: Receiver) {
        info!("reactor started");
        loop {
            let deadline = self.deferred_tasks.next_deadline();
            let sleep = tokio::time::sleep_until(
                deadline.map_or_else(tokio::time::Instant::now, tokio::time::Instant::from_std),
            );
            tokio::select! {
                event = events.recv() => {
                    let Some((span, event)) = event else { break };
                    let _guard = span.enter();
                    self.handle_event(event);
                }
                () = sleep, if deadline.is_some() => self.fire_deferred_tasks(Instant::now()),
            }
        }
        self.teardown();
        info!("reactor stopped");
    }

    /// Re-posts every deferred event that is due at `now`.
    pub fn fire_deferred_tasks(&mut self, now: Instant) {
        for event in self.deferred_tasks.take_due(now) {
            trace!(?event, "deferred event due");
            self.communication_manager.post(event);
        }
    }

    fn teardown(&mut self) {
        for pid in self.registry.application_pids() {
            self.destroy_application(pid);
            self.registry.remove_process(pid);
        }
        self.lost_events.clear();
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::MouseMoved { .. } => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self, event), fields(kind = %event.kind()))]
    pub fn handle_event(&mut self, event: Event) {
        self.log_event(&event);

        match event {
            Event::ApplicationLaunched { process, is_retry } => {
                AppEventHandler::handle_application_launched(self, process, is_retry);
            }
            Event::ApplicationTerminated(pid) => {
                AppEventHandler::handle_application_terminated(self, pid);
            }
            Event::ApplicationActivated(pid) => {
                AppEventHandler::handle_application_activated(self, pid);
            }
            Event::ApplicationDeactivated(pid) => {
                AppEventHandler::handle_application_deactivated(self, pid);
            }
            Event::ApplicationVisible(pid) => {
                AppEventHandler::handle_application_visible(self, pid);
            }
            Event::ApplicationHidden(pid) => AppEventHandler::handle_application_hidden(self, pid),
            Event::WindowCreated(element) => {
                WindowEventHandler::handle_window_created(self, element);
            }
            Event::WindowSheetCreated(element) | Event::WindowDrawerCreated(element) => {
                WindowEventHandler::handle_auxiliary_window_created(&element);
            }
            Event::WindowDestroyed(wid) => WindowEventHandler::handle_window_destroyed(self, wid),
            Event::WindowFocused(wid) => WindowEventHandler::handle_window_focused(self, wid),
            Event::WindowMoved(wid) | Event::WindowResized(wid) => {
                WindowEventHandler::handle_window_frame_changed(self, wid);
            }
            Event::WindowMinimized(wid) => WindowEventHandler::handle_window_minimized(self, wid),
            Event::WindowDeminimized(wid) => {
                WindowEventHandler::handle_window_deminimized(self, wid);
            }
            Event::WindowTitleChanged(wid) => {
                WindowEventHandler::handle_window_title_changed(self, wid);
            }
            Event::SpaceChanged => SpaceEventHandler::handle_space_changed(self),
            Event::DisplayChanged => SpaceEventHandler::handle_display_changed(self),
            Event::DisplayAdded(display) => SpaceEventHandler::handle_display_added(self, display),
            Event::DisplayRemoved(display) => {
                SpaceEventHandler::handle_display_removed(self, display);
            }
            Event::DisplayMoved(display) => SpaceEventHandler::handle_display_moved(self, display),
            Event::DisplayResized(display) => {
                SpaceEventHandler::handle_display_resized(self, display);
            }
            Event::MenuBarHiddenChanged => SpaceEventHandler::handle_menu_bar_hidden_changed(self),
            Event::MouseDown(point) => DragEventHandler::handle_mouse_down(self, point),
            Event::MouseUp(point) => DragEventHandler::handle_mouse_up(self, point),
            Event::MouseMoved { point, timestamp_ns } => {
                DragEventHandler::handle_mouse_moved(self, point, timestamp_ns);
            }
            Event::DaemonMessage(message) => {
                CommandEventHandler::handle_daemon_message(self, message);
            }
            Event::Query(request) => self.handle_query_request(request),
        }
    }

    fn window_status(&self, wid: WindowId) -> WindowStatus {
        match self.registry.find_window(wid) {
            None => WindowStatus::Untracked,
            Some(window) if !window.is_valid() => WindowStatus::Invalidated,
            Some(_) => WindowStatus::Live,
        }
    }

    /// The staleness guard. Returns None for untracked windows and for windows
    /// the host invalidated while the event was in flight.
    fn live_window(&self, wid: WindowId) -> Option<&Window> {
        let window = self.registry.find_window(wid)?;
        if !window.is_valid() {
            debug!(%wid, "window has been marked invalid by the system, ignoring event");
            return None;
        }
        Some(window)
    }

    fn should_manage(&self, wid: WindowId) -> bool {
        self.registry
            .find_window(wid)
            .is_some_and(|window| self.layout.should_manage_window(window))
    }

    fn is_window_on_active_space(&self, wid: WindowId) -> bool {
        self.host.window_spaces(wid).contains(&self.host.active_space())
    }

    fn ensure_space(&mut self, space: SpaceId) -> &mut Space {
        let display = self.host.space_display(space);
        let entry = self.registry.ensure_space(space);
        if entry.display.is_none() {
            entry.display = display;
        }
        entry
    }

    /// Layout changes on a space that is not visible are applied when it is
    /// shown again.
    fn note_space_membership_changed(&mut self, space: SpaceId) {
        let active = self.host.active_space();
        let entry = self.ensure_space(space);
        if space != active {
            entry.is_dirty = true;
        }
    }

    /// Puts a window under tiling on `space` if it is live and eligible. A view
    /// on another space is removed first.
    fn admit_window(&mut self, wid: WindowId, space: SpaceId) {
        let Some(window) = self.live_window(wid) else {
            return;
        };
        if !self.layout.should_manage_window(window) {
            return;
        }
        match self.registry.find_view(wid) {
            Some(view) if view.space == space => return,
            Some(_) => {
                self.remove_managed_window(wid);
            }
            None => {}
        }
        let Some(window) = self.registry.find_window(wid) else {
            return;
        };
        let view = self.layout.tile_window_on_space(window, space);
        if let Err(err) = self.registry.add_view(view) {
            warn!(%err, "tiling engine returned a view the registry refused");
            return;
        }
        debug!(%wid, space = %view.space, "window managed");
        self.note_space_membership_changed(view.space);
    }

    /// Removes a window's view, if any. Returns whether it was managed.
    fn remove_managed_window(&mut self, wid: WindowId) -> bool {
        let Some(view) = self.registry.remove_view(wid) else {
            return false;
        };
        if let Some(window) = self.registry.find_window(wid) {
            self.layout.untile_window(&view, window);
        }
        debug!(%wid, space = %view.space, "window unmanaged");
        self.note_space_membership_changed(view.space);
        true
    }

    /// Drops every trace of a window. Its view is removed even if the host has
    /// already invalidated it, since the record itself is going away.
    fn destroy_window(&mut self, wid: WindowId) {
        self.remove_managed_window(wid);
        self.drag_manager.forget_window(wid);
        self.focus_manager.clear_if(wid);
        self.lost_events.forget(LostEventSubject::Window(wid));
        if let Some(window) = self.registry.remove_window(wid) {
            window.invalidate();
        }
        self.host.unobserve_window(wid);
    }

    fn destroy_application(&mut self, pid: pid_t) {
        let Some(application) = self.registry.remove_application(pid) else {
            return;
        };
        for wid in self.registry.windows_of(pid) {
            self.destroy_window(wid);
        }
        if self.focus_manager.focused_pid == Some(pid) {
            self.focus_manager.clear();
        }
        self.host.unobserve_application(pid);
        trace!(pid, name = %application.name, "application destroyed");
    }

    fn set_window_opacity(&mut self, wid: WindowId, opacity: f32) {
        if self.config.settings.window_opacity {
            self.host.set_window_opacity(wid, opacity);
        }
    }

    fn activate_window(&mut self, wid: WindowId) {
        self.communication_manager.border(border::Request::Activate(wid));
        self.set_window_opacity(wid, self.config.settings.active_window_opacity);
    }

    fn deactivate_window(&mut self, wid: WindowId) {
        self.communication_manager.border(border::Request::Deactivate(wid));
        self.set_window_opacity(wid, self.config.settings.normal_window_opacity);
    }

    /// Warps the pointer to the window's center unless it is already inside.
    fn center_mouse(&mut self, wid: WindowId) {
        if !self.config.settings.mouse_follows_focus {
            return;
        }
        let Some(frame) = self
            .host
            .window_frame(wid)
            .or_else(|| self.registry.find_window(wid).map(|w| w.frame))
        else {
            return;
        };
        if self.host.cursor_location().is_some_and(|cursor| frame.contains(cursor)) {
            return;
        }
        self.host.warp_cursor(frame.mid());
    }

    /// Reasserts the focused window's visuals and pointer position.
    fn reactivate_focused_window(&mut self) -> bool {
        let Some(wid) = self.focus_manager.focused_window else {
            return false;
        };
        if self.live_window(wid).is_none() {
            return false;
        }
        self.activate_window(wid);
        self.center_mouse(wid);
        true
    }

    /// Replays an activation that arrived before the application was ready.
    fn on_application_registered(&mut self, pid: pid_t) {
        let subject = LostEventSubject::Application(pid);
        if self.lost_events.take_and_clear(subject, EventKind::ApplicationActivated) {
            debug!(pid, "replaying lost activation");
            self.communication_manager.post(Event::ApplicationActivated(pid));
        }
    }

    /// Replays a focus that arrived before the window was ready.
    fn on_window_registered(&mut self, wid: WindowId) {
        let subject = LostEventSubject::Window(wid);
        if self.lost_events.take_and_clear(subject, EventKind::WindowFocused) {
            debug!(%wid, "replaying lost focus");
            self.communication_manager.post(Event::WindowFocused(wid));
        }
    }
}
