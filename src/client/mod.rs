pub mod icon;
pub mod registry;
pub mod size_hints;

pub use icon::Icon;
pub use registry::{ClientId, ClientRegistry};
pub use size_hints::{HintContext, SizeHints, apply_size_hints};

use crate::display::Window;
use crate::geometry::Rect;
use crate::tags::TagMask;

/// Placeholder name for windows without a usable title or class.
pub const BROKEN: &str = "broken";

/// Which window a client currently shows on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Own(Window),
    /// A terminal standing in for a graphical child it launched. `visible`
    /// is the child's window, `own` the terminal's unmapped window and
    /// `swallowed` the detached client record of the child.
    Swallowing {
        visible: Window,
        own: Window,
        swallowed: ClientId,
    },
}

#[derive(Debug, Clone)]
pub struct Client {
    pub name: String,
    pub icon: Option<Icon>,
    pub geometry: Rect,
    pub old_geometry: Rect,
    pub border_width: i32,
    pub old_border_width: i32,
    pub hints: SizeHints,
    pub tags: TagMask,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    /// Floating state saved while fullscreen.
    pub old_state: bool,
    pub is_fullscreen: bool,
    pub is_terminal: bool,
    pub no_swallow: bool,
    pub is_sticky: bool,
    pub is_centered: bool,
    pub managed_size: bool,
    pub is_steam: bool,
    pub is_hidden: bool,
    pub pid: u32,
    pub monitor: usize,
    pub presentation: Presentation,
}

impl Client {
    pub fn new(window: Window, geometry: Rect, border_width: i32, monitor: usize) -> Self {
        Self {
            name: String::new(),
            icon: None,
            geometry,
            old_geometry: geometry,
            border_width: 0,
            old_border_width: border_width,
            hints: SizeHints::default(),
            tags: 0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            is_terminal: false,
            no_swallow: false,
            is_sticky: false,
            is_centered: false,
            managed_size: false,
            is_steam: false,
            is_hidden: false,
            pid: 0,
            monitor,
            presentation: Presentation::Own(window),
        }
    }

    /// The window currently on screen for this client.
    pub fn window(&self) -> Window {
        match self.presentation {
            Presentation::Own(window) => window,
            Presentation::Swallowing { visible, .. } => visible,
        }
    }

    pub fn swallowed(&self) -> Option<ClientId> {
        match self.presentation {
            Presentation::Own(_) => None,
            Presentation::Swallowing { swallowed, .. } => Some(swallowed),
        }
    }

    pub fn is_swallowing(&self) -> bool {
        self.swallowed().is_some()
    }

    /// Empty or missing titles show as [`BROKEN`].
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| BROKEN.to_string());
    }

    pub fn width_with_border(&self) -> i32 {
        self.geometry.width + 2 * self.border_width
    }

    pub fn height_with_border(&self) -> i32 {
        self.geometry.height + 2 * self.border_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_follows_presentation() {
        let mut registry = ClientRegistry::default();
        let child = registry.insert(Client::new(20, Rect::default(), 0, 0));
        let mut terminal = Client::new(10, Rect::default(), 0, 0);
        assert_eq!(terminal.window(), 10);

        terminal.presentation = Presentation::Swallowing {
            visible: 20,
            own: 10,
            swallowed: child,
        };
        assert_eq!(terminal.window(), 20);
        assert_eq!(terminal.swallowed(), Some(child));
    }

    #[test]
    fn test_empty_name_is_broken() {
        let mut client = Client::new(1, Rect::default(), 0, 0);
        client.set_name(Some(String::new()));
        assert_eq!(client.name, BROKEN);
        client.set_name(Some("st".into()));
        assert_eq!(client.name, "st");
    }
}
