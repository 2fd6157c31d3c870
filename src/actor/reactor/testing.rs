use std::sync::Arc;

use parking_lot::Mutex;

use super::{Event, Reactor};
use crate::actor::{self, border};
use crate::common::collections::{HashMap, HashSet};
use crate::common::config::Config;
use crate::layout_engine::{ResizeHandle, TilingEngine};
use crate::model::app::Process;
use crate::model::space::View;
use crate::model::validity::{InvalidationHandle, ValidityToken};
use crate::model::window::{Window, WindowElement};
use crate::sys::geometry::{Point, Rect};
use crate::sys::host::{Host, HostError};
use crate::sys::process::pid_t;
use crate::sys::screen::{DisplayId, SpaceId};
use crate::sys::window_server::WindowId;

pub fn make_window(id: u32, pid: pid_t) -> WindowElement {
    WindowElement {
        id: Some(WindowId::new(id)),
        pid: Some(pid),
        title: format!("Window{id}"),
        is_standard: true,
        can_move: true,
        can_resize: true,
        is_minimized: false,
        frame: Rect::from_xywh(100.0 * f64::from(id), 0.0, 100.0, 100.0),
    }
}

pub fn make_windows(pid: pid_t, ids: impl IntoIterator<Item = u32>) -> Vec<WindowElement> {
    ids.into_iter().map(|id| make_window(id, pid)).collect()
}

/// Platform state the fake host reports, plus a record of what the reactor
/// asked it to do.
pub struct HostState {
    pub dead_pids: HashSet<pid_t>,
    /// Number of observation attempts that fail before one succeeds.
    pub failing_observations: HashMap<pid_t, usize>,
    pub failing_windows: HashSet<WindowId>,
    pub app_windows: HashMap<pid_t, Vec<WindowElement>>,
    pub focused: HashMap<pid_t, WindowId>,
    pub main: HashMap<pid_t, WindowId>,
    pub frames: HashMap<WindowId, Rect>,
    pub titles: HashMap<WindowId, String>,
    pub window_spaces: HashMap<WindowId, Vec<SpaceId>>,
    pub window_under_pointer: Option<WindowId>,
    pub active_space: SpaceId,
    pub active_display: DisplayId,
    pub main_display: DisplayId,
    pub display_spaces: HashMap<DisplayId, SpaceId>,
    pub space_displays: HashMap<SpaceId, DisplayId>,
    pub animating: bool,
    pub cursor: Option<Point>,

    pub observe_attempts: Vec<pid_t>,
    pub observed_apps: HashSet<pid_t>,
    pub unobserved_apps: Vec<pid_t>,
    pub observed_windows: HashMap<WindowId, InvalidationHandle>,
    pub unobserved_windows: Vec<WindowId>,
    pub warps: Vec<Point>,
    pub focus_requests: Vec<(WindowId, bool)>,
    pub opacity_requests: Vec<(WindowId, f32)>,
}

impl Default for HostState {
    fn default() -> Self {
        let space = SpaceId::new(1);
        let display = DisplayId::new(1);
        HostState {
            dead_pids: HashSet::default(),
            failing_observations: HashMap::default(),
            failing_windows: HashSet::default(),
            app_windows: HashMap::default(),
            focused: HashMap::default(),
            main: HashMap::default(),
            frames: HashMap::default(),
            titles: HashMap::default(),
            window_spaces: HashMap::default(),
            window_under_pointer: None,
            active_space: space,
            active_display: display,
            main_display: display,
            display_spaces: [(display, space)].into_iter().collect(),
            space_displays: [(space, display)].into_iter().collect(),
            animating: false,
            cursor: None,
            observe_attempts: Vec::new(),
            observed_apps: HashSet::default(),
            unobserved_apps: Vec::new(),
            observed_windows: HashMap::default(),
            unobserved_windows: Vec::new(),
            warps: Vec::new(),
            focus_requests: Vec::new(),
            opacity_requests: Vec::new(),
        }
    }
}

impl HostState {
    /// What the platform does when a window dies: clear the slot, from
    /// whatever thread.
    pub fn invalidate(&self, wid: WindowId) {
        if let Some(handle) = self.observed_windows.get(&wid) {
            handle.invalidate();
        }
    }

    pub fn switch_space(&mut self, space: SpaceId, display: DisplayId) {
        self.active_space = space;
        self.active_display = display;
        self.display_spaces.insert(display, space);
        self.space_displays.insert(space, display);
    }

    fn spaces_of(&self, wid: WindowId) -> Vec<SpaceId> {
        self.window_spaces.get(&wid).cloned().unwrap_or_else(|| vec![self.active_space])
    }
}

#[derive(Clone, Default)]
pub struct FakeHost(pub Arc<Mutex<HostState>>);

impl Host for FakeHost {
    fn is_process_alive(&self, pid: pid_t) -> bool { !self.0.lock().dead_pids.contains(&pid) }

    fn observe_application(&mut self, process: &Process) -> Result<(), HostError> {
        let mut state = self.0.lock();
        state.observe_attempts.push(process.pid);
        if let Some(remaining) = state.failing_observations.get_mut(&process.pid)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(HostError::ObserveApplication {
                pid: process.pid,
                reason: "not ready".into(),
            });
        }
        state.observed_apps.insert(process.pid);
        Ok(())
    }

    fn unobserve_application(&mut self, pid: pid_t) {
        let mut state = self.0.lock();
        state.observed_apps.remove(&pid);
        state.unobserved_apps.push(pid);
    }

    fn application_windows(&self, pid: pid_t) -> Vec<WindowElement> {
        self.0.lock().app_windows.get(&pid).cloned().unwrap_or_default()
    }

    fn focused_window(&self, pid: pid_t) -> Option<WindowId> {
        self.0.lock().focused.get(&pid).copied()
    }

    fn main_window(&self, pid: pid_t) -> Option<WindowId> { self.0.lock().main.get(&pid).copied() }

    fn observe_window(
        &mut self,
        window: WindowId,
        _element: &WindowElement,
    ) -> Result<ValidityToken, HostError> {
        let mut state = self.0.lock();
        if state.failing_windows.contains(&window) {
            return Err(HostError::ObserveWindow { window, reason: "no element".into() });
        }
        let token = ValidityToken::new(window);
        state.observed_windows.insert(window, token.invalidation_handle());
        Ok(token)
    }

    fn unobserve_window(&mut self, window: WindowId) {
        self.0.lock().unobserved_windows.push(window);
    }

    fn window_frame(&self, window: WindowId) -> Option<Rect> {
        self.0.lock().frames.get(&window).copied()
    }

    fn window_title(&self, window: WindowId) -> Option<String> {
        self.0.lock().titles.get(&window).cloned()
    }

    fn window_spaces(&self, window: WindowId) -> Vec<SpaceId> { self.0.lock().spaces_of(window) }

    fn window_at_point(&self, _point: Point) -> Option<WindowId> {
        self.0.lock().window_under_pointer
    }

    fn active_space(&self) -> SpaceId { self.0.lock().active_space }

    fn active_display(&self) -> DisplayId { self.0.lock().active_display }

    fn main_display(&self) -> DisplayId { self.0.lock().main_display }

    fn display_space(&self, display: DisplayId) -> Option<SpaceId> {
        self.0.lock().display_spaces.get(&display).copied()
    }

    fn space_display(&self, space: SpaceId) -> Option<DisplayId> {
        self.0.lock().space_displays.get(&space).copied()
    }

    fn space_windows(&self, space: SpaceId) -> Vec<WindowId> {
        let state = self.0.lock();
        let mut windows: Vec<_> = state
            .observed_windows
            .keys()
            .copied()
            .filter(|wid| state.spaces_of(*wid).contains(&space))
            .collect();
        windows.sort();
        windows
    }

    fn is_display_animating(&self) -> bool { self.0.lock().animating }

    fn cursor_location(&self) -> Option<Point> { self.0.lock().cursor }

    fn warp_cursor(&mut self, point: Point) {
        let mut state = self.0.lock();
        state.cursor = Some(point);
        state.warps.push(point);
    }

    fn focus_window(&mut self, window: WindowId, raise: bool) {
        self.0.lock().focus_requests.push((window, raise));
    }

    fn set_window_opacity(&mut self, window: WindowId, opacity: f32) {
        self.0.lock().opacity_requests.push((window, opacity));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutCall {
    Tile(WindowId, SpaceId),
    Untile(WindowId, SpaceId),
    Update(SpaceId),
    Flush(SpaceId),
    Resize(WindowId, ResizeHandle, f64, f64),
}

/// Records every call; tiles each window on the space it is asked for.
#[derive(Clone, Default)]
pub struct RecordingLayout(pub Arc<Mutex<Vec<LayoutCall>>>);

impl RecordingLayout {
    pub fn take(&self) -> Vec<LayoutCall> { std::mem::take(&mut *self.0.lock()) }
}

impl TilingEngine for RecordingLayout {
    fn tile_window_on_space(&mut self, window: &Window, space: SpaceId) -> View {
        self.0.lock().push(LayoutCall::Tile(window.id, space));
        View { window: window.id, space }
    }

    fn untile_window(&mut self, view: &View, _window: &Window) {
        self.0.lock().push(LayoutCall::Untile(view.window, view.space));
    }

    fn update_space(&mut self, space: SpaceId) { self.0.lock().push(LayoutCall::Update(space)); }

    fn flush_space(&mut self, space: SpaceId) { self.0.lock().push(LayoutCall::Flush(space)); }

    fn resize_window_relative(&mut self, window: &Window, handle: ResizeHandle, dx: f64, dy: f64) {
        self.0.lock().push(LayoutCall::Resize(window.id, handle, dx, dy));
    }
}

/// A reactor wired to fakes, driven synchronously. Events the reactor posts
/// to itself land in `events` and are handled by [`Harness::pump`].
pub struct Harness {
    pub reactor: Reactor,
    pub host: FakeHost,
    pub layout: RecordingLayout,
    pub events_tx: actor::Sender<Event>,
    events: actor::Receiver<Event>,
    borders: border::Receiver,
}

impl Reactor {
    pub fn new_for_test(config: Config) -> Harness {
        let host = FakeHost::default();
        let layout = RecordingLayout::default();
        let (events_tx, events) = actor::channel();
        let (border_tx, borders) = actor::channel();
        let reactor = Reactor::new(
            config,
            Box::new(host.clone()),
            Box::new(layout.clone()),
            border_tx,
            events_tx.downgrade(),
        );
        Harness {
            reactor,
            host,
            layout,
            events_tx,
            events,
            borders,
        }
    }
}

impl Harness {
    pub fn new() -> Harness { Reactor::new_for_test(Config::default()) }

    pub fn state(&self) -> parking_lot::MutexGuard<'_, HostState> { self.host.0.lock() }

    /// Handles one event, then everything it caused the reactor to post.
    pub fn handle_event(&mut self, event: Event) {
        self.reactor.handle_event(event);
        self.pump();
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.handle_event(event);
        }
    }

    /// Drains re-posted events. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok((_, event)) = self.events.try_recv() {
            self.reactor.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Events posted by the reactor that have not been handled yet.
    pub fn pending_events(&mut self) -> Vec<Event> {
        std::iter::from_fn(|| self.events.try_recv().ok().map(|(_, event)| event)).collect()
    }

    pub fn border_requests(&mut self) -> Vec<border::Request> {
        std::iter::from_fn(|| self.borders.try_recv().ok().map(|(_, request)| request)).collect()
    }

    pub fn layout_calls(&self) -> Vec<LayoutCall> { self.layout.take() }

    /// Registers `windows` with the fake platform and delivers the launch.
    pub fn launch(&mut self, pid: pid_t, windows: Vec<WindowElement>) -> Arc<Process> {
        let process = Process::new(pid, format!("App{pid}"));
        self.state().app_windows.insert(pid, windows);
        self.handle_event(Event::ApplicationLaunched {
            process: process.clone(),
            is_retry: false,
        });
        process
    }

    /// Makes a window known to the platform after its application launched.
    pub fn add_platform_window(&mut self, element: WindowElement) {
        let Some(pid) = element.pid else { return };
        self.state().app_windows.entry(pid).or_default().push(element);
    }
}
