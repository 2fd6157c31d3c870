//! Canonical maps of everything the reactor tracks.
//!
//! Only the reactor thread touches the registry, so nothing here locks.
//! Insertions are idempotent so that replayed or duplicated notifications
//! cannot create a second record for the same entity.

use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use super::app::{Application, Process};
use super::space::{Display, Space, View};
use super::window::Window;
use crate::common::collections::HashMap;
use crate::sys::process::pid_t;
use crate::sys::screen::{DisplayId, SpaceId};
use crate::sys::window_server::WindowId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("window {window} already has a view on space {space}")]
    AlreadyManaged { window: WindowId, space: SpaceId },
    #[error("window {0} is not tracked")]
    UnknownWindow(WindowId),
}

#[derive(Debug, Default)]
pub struct Registry {
    processes: HashMap<pid_t, Arc<Process>>,
    applications: HashMap<pid_t, Application>,
    windows: HashMap<WindowId, Window>,
    views: HashMap<WindowId, View>,
    spaces: HashMap<SpaceId, Space>,
    displays: HashMap<DisplayId, Display>,
}

impl Registry {
    pub fn new() -> Registry { Registry::default() }

    pub fn add_process(&mut self, process: Arc<Process>) -> bool {
        if self.processes.contains_key(&process.pid) {
            return false;
        }
        self.processes.insert(process.pid, process);
        true
    }

    pub fn remove_process(&mut self, pid: pid_t) -> Option<Arc<Process>> {
        self.processes.remove(&pid)
    }

    pub fn add_application(&mut self, application: Application) -> bool {
        if self.applications.contains_key(&application.pid) {
            trace!(pid = application.pid, "application already tracked");
            return false;
        }
        self.applications.insert(application.pid, application);
        true
    }

    pub fn find_application(&self, pid: pid_t) -> Option<&Application> {
        self.applications.get(&pid)
    }

    pub fn find_application_mut(&mut self, pid: pid_t) -> Option<&mut Application> {
        self.applications.get_mut(&pid)
    }

    pub fn remove_application(&mut self, pid: pid_t) -> Option<Application> {
        self.applications.remove(&pid)
    }

    pub fn applications(&self) -> impl Iterator<Item = &Application> { self.applications.values() }

    /// Tracked pids in ascending order.
    pub fn application_pids(&self) -> Vec<pid_t> {
        let mut pids: Vec<pid_t> = self.applications.keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    pub fn add_window(&mut self, window: Window) -> bool {
        if self.windows.contains_key(&window.id) {
            trace!(wid = %window.id, "window already tracked");
            return false;
        }
        self.windows.insert(window.id, window);
        true
    }

    pub fn find_window(&self, id: WindowId) -> Option<&Window> { self.windows.get(&id) }

    pub fn find_window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    /// Removes the window record. Any view must have been removed first.
    pub fn remove_window(&mut self, id: WindowId) -> Option<Window> {
        debug_assert!(!self.views.contains_key(&id), "window {id} removed while managed");
        self.windows.remove(&id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> { self.windows.values() }

    /// Snapshot of the windows owned by `pid`, ordered by id. The caller owns
    /// the list, so the registry can be mutated while walking it.
    pub fn windows_of(&self, pid: pid_t) -> Vec<WindowId> {
        let mut ids: Vec<WindowId> =
            self.windows.values().filter(|w| w.pid == pid).map(|w| w.id).collect();
        ids.sort_unstable();
        ids
    }

    pub fn add_view(&mut self, view: View) -> Result<(), RegistryError> {
        if !self.windows.contains_key(&view.window) {
            return Err(RegistryError::UnknownWindow(view.window));
        }
        if let Some(existing) = self.views.get(&view.window) {
            return Err(RegistryError::AlreadyManaged {
                window: view.window,
                space: existing.space,
            });
        }
        self.ensure_space(view.space).windows.insert(view.window);
        self.views.insert(view.window, view);
        Ok(())
    }

    pub fn find_view(&self, window: WindowId) -> Option<View> { self.views.get(&window).copied() }

    pub fn remove_view(&mut self, window: WindowId) -> Option<View> {
        let view = self.views.remove(&window)?;
        if let Some(space) = self.spaces.get_mut(&view.space) {
            space.windows.remove(&window);
        }
        Some(view)
    }

    /// Views on `space`, ordered by window id.
    pub fn views_on_space(&self, space: SpaceId) -> Vec<View> {
        self.spaces
            .get(&space)
            .map(|s| s.windows.iter().filter_map(|w| self.views.get(w).copied()).collect())
            .unwrap_or_default()
    }

    pub fn view_count(&self) -> usize { self.views.len() }

    pub fn ensure_space(&mut self, id: SpaceId) -> &mut Space {
        self.spaces.entry(id).or_insert_with(|| Space::new(id))
    }

    pub fn find_space(&self, id: SpaceId) -> Option<&Space> { self.spaces.get(&id) }

    pub fn spaces(&self) -> impl Iterator<Item = &Space> { self.spaces.values() }

    pub fn mark_spaces_invalid(&mut self) {
        for space in self.spaces.values_mut() {
            space.is_invalid = true;
        }
    }

    pub fn mark_spaces_invalid_for_display(&mut self, display: DisplayId) {
        for space in self.spaces.values_mut().filter(|s| s.display == Some(display)) {
            space.is_invalid = true;
        }
    }

    pub fn add_display(&mut self, display: Display) -> bool {
        if self.displays.contains_key(&display.id) {
            return false;
        }
        self.displays.insert(display.id, display);
        true
    }

    pub fn find_display(&self, id: DisplayId) -> Option<&Display> { self.displays.get(&id) }

    pub fn ensure_display(&mut self, id: DisplayId) -> &mut Display {
        self.displays.entry(id).or_insert_with(|| Display::new(id, None))
    }

    pub fn remove_display(&mut self, id: DisplayId) -> Option<Display> { self.displays.remove(&id) }

    pub fn displays(&self) -> impl Iterator<Item = &Display> { self.displays.values() }

    pub fn process_count(&self) -> usize { self.processes.len() }

    pub fn application_count(&self) -> usize { self.applications.len() }

    pub fn window_count(&self) -> usize { self.windows.len() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::validity::ValidityToken;
    use crate::model::window::WindowElement;
    use crate::sys::geometry::Rect;

    fn window(pid: pid_t, id: u32) -> Window {
        let id = WindowId::new(id);
        let element = WindowElement {
            id: Some(id),
            pid: Some(pid),
            title: format!("window {id}"),
            is_standard: true,
            can_move: true,
            can_resize: true,
            is_minimized: false,
            frame: Rect::from_xywh(0.0, 0.0, 100.0, 100.0),
        };
        Window::new(id, pid, &element, ValidityToken::new(id))
    }

    #[test]
    fn duplicate_insertions_are_ignored() {
        let mut registry = Registry::new();
        let process = Process::new(1, "app");
        assert!(registry.add_process(process.clone()));
        assert!(!registry.add_process(process.clone()));
        assert!(registry.add_application(Application::new(&process)));
        assert!(!registry.add_application(Application::new(&process)));
        assert!(registry.add_window(window(1, 5)));
        assert!(!registry.add_window(window(1, 5)));
        assert_eq!(registry.process_count(), 1);
        assert_eq!(registry.application_count(), 1);
        assert_eq!(registry.window_count(), 1);
    }

    #[test]
    fn windows_of_is_a_sorted_snapshot() {
        let mut registry = Registry::new();
        registry.add_window(window(1, 9));
        registry.add_window(window(2, 4));
        registry.add_window(window(1, 3));
        let ids = registry.windows_of(1);
        assert_eq!(ids, vec![WindowId::new(3), WindowId::new(9)]);
        for id in &ids {
            registry.remove_window(*id);
        }
        assert!(registry.windows_of(1).is_empty());
        assert_eq!(registry.window_count(), 1);
    }

    #[test]
    fn second_view_for_a_window_is_refused() {
        let mut registry = Registry::new();
        registry.add_window(window(1, 5));
        let wid = WindowId::new(5);
        let first = View { window: wid, space: SpaceId::new(1) };
        let second = View { window: wid, space: SpaceId::new(2) };
        assert_eq!(registry.add_view(first), Ok(()));
        assert_eq!(
            registry.add_view(second),
            Err(RegistryError::AlreadyManaged { window: wid, space: SpaceId::new(1) })
        );
        assert_eq!(registry.view_count(), 1);

        assert_eq!(registry.remove_view(wid), Some(first));
        assert_eq!(registry.add_view(second), Ok(()));
        assert!(registry.find_space(SpaceId::new(1)).unwrap().windows.is_empty());
        assert_eq!(registry.views_on_space(SpaceId::new(2)), vec![second]);
    }

    #[test]
    fn views_require_a_tracked_window() {
        let mut registry = Registry::new();
        let view = View { window: WindowId::new(8), space: SpaceId::new(1) };
        assert_eq!(registry.add_view(view), Err(RegistryError::UnknownWindow(WindowId::new(8))));
    }

    #[test]
    fn display_invalidation_only_touches_its_spaces() {
        let mut registry = Registry::new();
        registry.ensure_space(SpaceId::new(1)).display = Some(DisplayId::new(1));
        registry.ensure_space(SpaceId::new(2)).display = Some(DisplayId::new(2));
        registry.mark_spaces_invalid_for_display(DisplayId::new(2));
        assert!(!registry.find_space(SpaceId::new(1)).unwrap().is_invalid);
        assert!(registry.find_space(SpaceId::new(2)).unwrap().is_invalid);
        registry.mark_spaces_invalid();
        assert!(registry.spaces().all(|s| s.is_invalid));
    }
}
