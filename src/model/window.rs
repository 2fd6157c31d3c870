use super::validity::ValidityToken;
use crate::sys::geometry::Rect;
use crate::sys::process::pid_t;
use crate::sys::window_server::WindowId;

/// What a window-creation notification carries. The id and pid are optional
/// because the host may fail to resolve them for elements that are already
/// going away.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowElement {
    pub id: Option<WindowId>,
    pub pid: Option<pid_t>,
    pub title: String,
    pub is_standard: bool,
    pub can_move: bool,
    pub can_resize: bool,
    pub is_minimized: bool,
    pub frame: Rect,
}

#[derive(Debug)]
pub struct Window {
    pub id: WindowId,
    pub pid: pid_t,
    pub title: String,
    pub frame: Rect,
    pub is_floating: bool,
    pub is_standard: bool,
    pub can_move: bool,
    pub can_resize: bool,
    pub is_minimized: bool,
    pub is_hidden: bool,
    token: ValidityToken,
}

impl Window {
    pub fn new(id: WindowId, pid: pid_t, element: &WindowElement, token: ValidityToken) -> Window {
        Window {
            id,
            pid,
            title: element.title.clone(),
            frame: element.frame,
            is_floating: !element.is_standard || !element.can_move || !element.can_resize,
            is_standard: element.is_standard,
            can_move: element.can_move,
            can_resize: element.can_resize,
            is_minimized: element.is_minimized,
            is_hidden: false,
            token,
        }
    }

    /// The staleness check; see [`ValidityToken::is_valid`].
    pub fn is_valid(&self) -> bool { self.token.is_valid() }

    pub(crate) fn invalidate(&self) { self.token.invalidate(); }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(is_standard: bool, can_move: bool, can_resize: bool) -> WindowElement {
        WindowElement {
            id: Some(WindowId::new(1)),
            pid: Some(10),
            title: String::new(),
            is_standard,
            can_move,
            can_resize,
            is_minimized: false,
            frame: Rect::ZERO,
        }
    }

    fn window(element: &WindowElement) -> Window {
        let id = WindowId::new(1);
        Window::new(id, 10, element, ValidityToken::new(id))
    }

    #[test]
    fn non_standard_or_fixed_windows_float() {
        assert!(!window(&element(true, true, true)).is_floating);
        assert!(window(&element(false, true, true)).is_floating);
        assert!(window(&element(true, false, true)).is_floating);
        assert!(window(&element(true, true, false)).is_floating);
    }
}
