use std::sync::mpsc::{RecvError, SyncSender, sync_channel};

use crate::actor::reactor::{Event, Reactor, Sender};
use crate::model::server::{ApplicationData, DisplayData, SpaceData, WindowData};
use crate::model::window::Window;
use crate::sys::window_server::WindowId;

/// Synchronous read access to the reactor's model from other threads.
#[derive(Clone)]
pub struct ReactorQueryHandle {
    tx: Sender,
}

impl ReactorQueryHandle {
    pub(super) fn new(tx: Sender) -> Self { Self { tx } }

    fn send_query<T>(
        &self,
        build: impl FnOnce(SyncSender<T>) -> QueryRequest,
    ) -> Result<T, RecvError> {
        let (tx, rx) = sync_channel(1);
        if self.tx.try_send(Event::Query(build(tx))).is_err() {
            return Err(RecvError);
        }
        rx.recv().map_err(|_| RecvError)
    }

    pub fn query_windows(&self) -> Vec<WindowData> {
        self.send_query(QueryRequest::Windows).unwrap_or_default()
    }

    pub fn query_window_info(&self, window_id: WindowId) -> Option<WindowData> {
        self.send_query(|resp| QueryRequest::WindowInfo { window_id, resp }).ok().flatten()
    }

    pub fn query_applications(&self) -> Vec<ApplicationData> {
        self.send_query(QueryRequest::Applications).unwrap_or_default()
    }

    pub fn query_spaces(&self) -> Vec<SpaceData> {
        self.send_query(QueryRequest::Spaces).unwrap_or_default()
    }

    pub fn query_displays(&self) -> Vec<DisplayData> {
        self.send_query(QueryRequest::Displays).unwrap_or_default()
    }

    pub fn query_focused_window(&self) -> Option<WindowData> {
        self.send_query(QueryRequest::Focused).ok().flatten()
    }
}

#[derive(Debug)]
pub enum QueryRequest {
    Windows(SyncSender<Vec<WindowData>>),
    WindowInfo {
        window_id: WindowId,
        resp: SyncSender<Option<WindowData>>,
    },
    Applications(SyncSender<Vec<ApplicationData>>),
    Spaces(SyncSender<Vec<SpaceData>>),
    Displays(SyncSender<Vec<DisplayData>>),
    Focused(SyncSender<Option<WindowData>>),
}

impl Reactor {
    pub(super) fn handle_query_request(&mut self, request: QueryRequest) {
        // A requester that gave up has dropped its receiver; nothing to do.
        match request {
            QueryRequest::Windows(resp) => {
                let _ = resp.send(self.query_windows());
            }
            QueryRequest::WindowInfo { window_id, resp } => {
                let _ = resp.send(self.query_window_info(window_id));
            }
            QueryRequest::Applications(resp) => {
                let _ = resp.send(self.query_applications());
            }
            QueryRequest::Spaces(resp) => {
                let _ = resp.send(self.query_spaces());
            }
            QueryRequest::Displays(resp) => {
                let _ = resp.send(self.query_displays());
            }
            QueryRequest::Focused(resp) => {
                let _ = resp.send(self.query_focused_window());
            }
        }
    }

    pub(super) fn query_windows(&self) -> Vec<WindowData> {
        let mut windows: Vec<_> =
            self.registry.windows().map(|w| self.create_window_data(w)).collect();
        windows.sort_by_key(|w| w.id);
        windows
    }

    pub(super) fn query_window_info(&self, window_id: WindowId) -> Option<WindowData> {
        self.registry.find_window(window_id).map(|w| self.create_window_data(w))
    }

    pub(super) fn query_applications(&self) -> Vec<ApplicationData> {
        let mut applications: Vec<_> = self
            .registry
            .applications()
            .map(|app| ApplicationData {
                pid: app.pid,
                name: app.name.clone(),
                is_hidden: app.is_hidden,
                is_focused: self.focus_manager.focused_pid == Some(app.pid),
                window_count: self.registry.windows_of(app.pid).len(),
            })
            .collect();
        applications.sort_by_key(|app| app.pid);
        applications
    }

    pub(super) fn query_spaces(&self) -> Vec<SpaceData> {
        let mut spaces: Vec<_> = self
            .registry
            .spaces()
            .map(|space| SpaceData {
                id: space.id,
                display: space.display,
                windows: space.windows.iter().copied().collect(),
                is_current: self.space_manager.is_current(space.id),
                is_dirty: space.is_dirty,
                is_invalid: space.is_invalid,
            })
            .collect();
        spaces.sort_by_key(|space| space.id);
        spaces
    }

    pub(super) fn query_displays(&self) -> Vec<DisplayData> {
        let mut displays: Vec<_> = self
            .registry
            .displays()
            .map(|display| DisplayData {
                id: display.id,
                space: display.space,
                last_space: display.last_space,
                is_current: self.display_manager.current_display == Some(display.id),
            })
            .collect();
        displays.sort_by_key(|display| display.id);
        displays
    }

    pub(super) fn query_focused_window(&self) -> Option<WindowData> {
        let wid = self.focus_manager.focused_window?;
        self.query_window_info(wid)
    }

    fn create_window_data(&self, window: &Window) -> WindowData {
        WindowData {
            id: window.id,
            pid: window.pid,
            app_name: self.registry.find_application(window.pid).map(|app| app.name.clone()),
            title: window.title.clone(),
            frame: window.frame,
            is_floating: window.is_floating,
            is_minimized: window.is_minimized,
            is_focused: self.focus_manager.focused_window == Some(window.id),
            space: self.registry.find_view(window.id).map(|view| view.space),
        }
    }
}
