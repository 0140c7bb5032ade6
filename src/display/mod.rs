//! The window system as the window manager sees it.
//!
//! [`Display`] carries every request the core makes of the X server and
//! every query it needs answered; [`Event`] is what comes back. The core
//! never touches the protocol directly, which keeps the handlers testable
//! against an in-memory double.

pub mod signals;
pub mod x11;

use crate::client::{Icon, SizeHints};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::keyboard::Keysym;
use crate::tags::TagMask;

pub use signals::SignalKind;
pub use x11::X11Display;

pub type Window = u32;

pub const BUTTON_LEFT: u8 = 1;
pub const BUTTON_MIDDLE: u8 = 2;
pub const BUTTON_RIGHT: u8 = 3;
pub const BUTTON_SCROLL_UP: u8 = 4;
pub const BUTTON_SCROLL_DOWN: u8 = 5;

/// ICCCM `WM_STATE` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Withdrawn = 0,
    Normal = 1,
    Iconic = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    DeleteWindow,
    TakeFocus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    Normal,
    Resize,
    Move,
}

/// Which watched property changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Name,
    TransientFor,
    NormalHints,
    Hints,
    WindowType,
    Icon,
    Other,
}

/// `_NET_WM_STATE` change requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Remove,
    Add,
    Toggle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRequest {
    Activate,
    Fullscreen(StateAction),
}

/// A configure request with the fields the client asked to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigureRequest {
    pub window: Window,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub border_width: Option<i32>,
    pub sibling: Option<Window>,
    pub stack_mode: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub window: Window,
    pub x: i32,
    pub y: i32,
    pub root_x: i32,
    pub root_y: i32,
    pub button: u8,
    pub state: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MapRequest {
        window: Window,
    },
    UnmapNotify {
        window: Window,
        synthetic: bool,
    },
    DestroyNotify {
        window: Window,
    },
    ConfigureRequest(ConfigureRequest),
    /// The root window changed size, usually an output was plugged.
    RootConfigured {
        width: i32,
        height: i32,
    },
    PropertyNotify {
        window: Window,
        kind: PropertyKind,
        deleted: bool,
    },
    RootNameChanged,
    ClientMessage {
        window: Window,
        request: ClientRequest,
    },
    ButtonPress(ButtonEvent),
    ButtonRelease(ButtonEvent),
    MotionNotify {
        window: Window,
        root_x: i32,
        root_y: i32,
        time: u32,
    },
    /// Pointer crossing into a window. Only normal, non-inferior crossings
    /// and crossings into the root are reported.
    EnterNotify {
        window: Window,
    },
    FocusIn {
        window: Window,
    },
    KeyPress {
        keysym: Keysym,
        state: u16,
    },
    MappingNotify {
        keyboard: bool,
    },
    Expose {
        window: Window,
        count: u16,
    },
    Signal(SignalKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    pub geometry: Rect,
    pub border_width: i32,
    pub override_redirect: bool,
    pub viewable: bool,
}

/// The parts of ICCCM `WM_HINTS` the window manager reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WmHints {
    pub urgent: bool,
    /// `None` when the input hint is absent.
    pub input: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassHint {
    pub instance: String,
    pub class: String,
}

pub trait Display {
    fn root(&self) -> Window;
    fn screen_size(&self) -> (i32, i32);
    /// Output rectangles, or the whole screen when there is no XINERAMA.
    fn screens(&self) -> WmResult<Vec<Rect>>;

    /// Blocks until the next event.
    fn next_event(&mut self) -> WmResult<Event>;
    fn flush(&mut self) -> WmResult<()>;
    /// Flushes, waits for the server and drops queued pointer crossings.
    fn discard_enter_events(&mut self) -> WmResult<()>;

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes>;
    fn top_level_windows(&self) -> Vec<Window>;
    fn transient_for(&self, window: Window) -> Option<Window>;
    fn class_hint(&self, window: Window) -> Option<ClassHint>;
    fn title(&self, window: Window) -> Option<String>;
    fn size_hints(&self, window: Window) -> Option<SizeHints>;
    fn wm_hints(&self, window: Window) -> Option<WmHints>;
    fn set_urgency_hint(&mut self, window: Window, urgent: bool) -> WmResult<()>;
    fn icon(&self, window: Window, size: u32) -> Option<Icon>;
    fn window_pid(&self, window: Window) -> u32;
    fn wants_fullscreen(&self, window: Window) -> bool;
    fn is_dialog(&self, window: Window) -> bool;
    fn window_state(&self, window: Window) -> Option<WindowState>;
    /// The `[tags, monitor]` pair stored on the window by a previous session.
    fn saved_desktop(&self, window: Window) -> Option<(TagMask, usize)>;
    fn root_name(&self) -> Option<String>;
    fn pointer_position(&self) -> Option<(i32, i32)>;
    /// Removes lock modifiers from a key or button state.
    fn clean_mask(&self, state: u16) -> u16;

    fn select_client_events(&mut self, window: Window) -> WmResult<()>;
    fn configure_window(&mut self, window: Window, geometry: Rect, border_width: i32)
    -> WmResult<()>;
    /// Applies a request from a window the manager does not manage.
    fn configure_unmanaged(&mut self, request: &ConfigureRequest) -> WmResult<()>;
    fn send_configure_notify(
        &mut self,
        window: Window,
        geometry: Rect,
        border_width: i32,
    ) -> WmResult<()>;
    fn move_window(&mut self, window: Window, x: i32, y: i32) -> WmResult<()>;
    fn set_border_width(&mut self, window: Window, width: i32) -> WmResult<()>;
    fn set_border_color(&mut self, window: Window, color: u32) -> WmResult<()>;
    fn map_window(&mut self, window: Window) -> WmResult<()>;
    fn unmap_window(&mut self, window: Window) -> WmResult<()>;
    /// Unmaps without producing an unmap notification the manager would
    /// mistake for the client withdrawing.
    fn unmap_quietly(&mut self, window: Window) -> WmResult<()>;
    fn raise_window(&mut self, window: Window) -> WmResult<()>;
    /// Stacks `windows`, topmost first, directly below `sibling`.
    fn stack_below(&mut self, sibling: Window, windows: &[Window]) -> WmResult<()>;

    fn set_input_focus(&mut self, window: Window) -> WmResult<()>;
    fn focus_root(&mut self) -> WmResult<()>;
    fn set_active_window(&mut self, window: Option<Window>) -> WmResult<()>;
    /// Delivers a WM_PROTOCOLS message if the window supports it.
    fn send_protocol(&mut self, window: Window, protocol: Protocol) -> WmResult<bool>;
    fn kill_client(&mut self, window: Window) -> WmResult<()>;

    fn set_window_state(&mut self, window: Window, state: WindowState) -> WmResult<()>;
    fn set_fullscreen_state(&mut self, window: Window, fullscreen: bool) -> WmResult<()>;
    fn set_window_name(&mut self, window: Window, name: &str) -> WmResult<()>;
    fn set_desktop(&mut self, window: Window, tags: TagMask, monitor: usize) -> WmResult<()>;
    fn set_current_desktop(&mut self, tags: TagMask) -> WmResult<()>;
    fn set_monitor_center(&mut self, x: i32, y: i32) -> WmResult<()>;
    fn set_client_list(&mut self, windows: &[Window]) -> WmResult<()>;

    fn grab_keys(&mut self, keys: &[(u16, Keysym)]) -> WmResult<()>;
    /// Grabs `buttons` on a client; unfocused clients also grab every
    /// button so a click focuses them.
    fn grab_buttons(&mut self, window: Window, focused: bool, buttons: &[(u16, u8)])
    -> WmResult<()>;
    fn ungrab_buttons(&mut self, window: Window) -> WmResult<()>;
    fn refresh_keyboard_mapping(&mut self) -> WmResult<()>;
    fn replay_pointer(&mut self) -> WmResult<()>;
    fn grab_pointer(&mut self, cursor: CursorKind) -> WmResult<bool>;
    fn ungrab_pointer(&mut self) -> WmResult<()>;
    /// Moves the pointer to `(x, y)` relative to `window`.
    fn warp_pointer(&mut self, window: Window, x: i32, y: i32) -> WmResult<()>;

    /// Releases everything the manager set up on the server.
    fn cleanup(&mut self) -> WmResult<()>;
}
