//! In-memory doubles for the display, renderer and process table.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::rc::Rc;

use crate::bar::{BarModel, Renderer};
use crate::client::{Icon, SizeHints};
use crate::display::{
    ClassHint, ConfigureRequest, CursorKind, Display, Event, Protocol, Window, WindowAttributes,
    WindowState, WmHints,
};
use crate::errors::{WmError, WmResult};
use crate::geometry::Rect;
use crate::keyboard::Keysym;
use crate::process::Processes;
use crate::tags::TagMask;

pub const ROOT: Window = 1;

/// Every intent the core sent, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Configure {
        window: Window,
        geometry: Rect,
        border_width: i32,
    },
    ConfigureUnmanaged(ConfigureRequest),
    ConfigureNotify(Window),
    Move {
        window: Window,
        x: i32,
        y: i32,
    },
    BorderWidth(Window, i32),
    BorderColor(Window, u32),
    Map(Window),
    Unmap(Window),
    UnmapQuietly(Window),
    Raise(Window),
    StackBelow(Window, Vec<Window>),
    Focus(Window),
    FocusRoot,
    ActiveWindow(Option<Window>),
    Protocol(Window, Protocol),
    Kill(Window),
    State(Window, WindowState),
    Fullscreen(Window, bool),
    Name(Window, String),
    Desktop(Window, TagMask, usize),
    CurrentDesktop(TagMask),
    MonitorCenter(i32, i32),
    ClientList(Vec<Window>),
    GrabKeys,
    GrabButtons(Window, bool),
    UngrabButtons(Window),
    Warp(Window, i32, i32),
    GrabPointer(CursorKind),
    UngrabPointer,
    ReplayPointer,
    Urgency(Window, bool),
    Cleanup,
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub attributes: WindowAttributes,
    pub class: Option<ClassHint>,
    pub title: Option<String>,
    pub transient_for: Option<Window>,
    pub pid: u32,
    pub size_hints: Option<SizeHints>,
    pub wm_hints: Option<WmHints>,
    pub fullscreen: bool,
    pub dialog: bool,
    pub state: Option<WindowState>,
    pub protocols: Vec<Protocol>,
    pub saved_desktop: Option<(TagMask, usize)>,
}

impl FakeWindow {
    pub fn new(geometry: Rect) -> Self {
        Self {
            attributes: WindowAttributes {
                geometry,
                border_width: 0,
                override_redirect: false,
                viewable: false,
            },
            class: None,
            title: None,
            transient_for: None,
            pid: 0,
            size_hints: None,
            wm_hints: None,
            fullscreen: false,
            dialog: false,
            state: None,
            protocols: Vec::new(),
            saved_desktop: None,
        }
    }

    pub fn class(mut self, instance: &str, class: &str) -> Self {
        self.class = Some(ClassHint {
            instance: instance.to_string(),
            class: class.to_string(),
        });
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }
}

pub struct MockDisplay {
    pub screens: Vec<Rect>,
    pub windows: HashMap<Window, FakeWindow>,
    pub events: VecDeque<Event>,
    pub calls: Vec<Call>,
    pub pointer: (i32, i32),
    pub root_name: Option<String>,
    /// Configuring this window fails, as if it vanished mid-request.
    pub failing: Option<Window>,
}

impl MockDisplay {
    pub fn new(screens: Vec<Rect>) -> Self {
        Self {
            screens,
            windows: HashMap::new(),
            events: VecDeque::new(),
            calls: Vec::new(),
            pointer: (0, 0),
            root_name: None,
            failing: None,
        }
    }

    pub fn add_window(&mut self, window: Window, fake: FakeWindow) {
        self.windows.insert(window, fake);
    }

    /// Calls recorded since the last `take_calls`.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn configures_of(&self, window: Window) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Configure {
                    window: target,
                    geometry,
                    ..
                } if *target == window => Some(*geometry),
                _ => None,
            })
            .collect()
    }

    fn window(&self, window: Window) -> Option<&FakeWindow> {
        self.windows.get(&window)
    }

    fn record(&mut self, call: Call) -> WmResult<()> {
        self.calls.push(call);
        Ok(())
    }
}

impl Display for MockDisplay {
    fn root(&self) -> Window {
        ROOT
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screens.iter().fold((0, 0), |(width, height), screen| {
            (width.max(screen.right()), height.max(screen.bottom()))
        })
    }

    fn screens(&self) -> WmResult<Vec<Rect>> {
        Ok(self.screens.clone())
    }

    fn next_event(&mut self) -> WmResult<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| WmError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "no events")))
    }

    fn flush(&mut self) -> WmResult<()> {
        Ok(())
    }

    fn discard_enter_events(&mut self) -> WmResult<()> {
        self.events
            .retain(|event| !matches!(event, Event::EnterNotify { .. }));
        Ok(())
    }

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes> {
        self.window(window).map(|fake| fake.attributes)
    }

    fn top_level_windows(&self) -> Vec<Window> {
        let mut windows: Vec<Window> = self.windows.keys().copied().collect();
        windows.sort_unstable();
        windows
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.window(window)?.transient_for
    }

    fn class_hint(&self, window: Window) -> Option<ClassHint> {
        self.window(window)?.class.clone()
    }

    fn title(&self, window: Window) -> Option<String> {
        self.window(window)?.title.clone()
    }

    fn size_hints(&self, window: Window) -> Option<SizeHints> {
        self.window(window)?.size_hints
    }

    fn wm_hints(&self, window: Window) -> Option<WmHints> {
        self.window(window)?.wm_hints
    }

    fn set_urgency_hint(&mut self, window: Window, urgent: bool) -> WmResult<()> {
        if let Some(hints) = self.windows.get_mut(&window).and_then(|fake| fake.wm_hints.as_mut()) {
            hints.urgent = urgent;
        }
        self.record(Call::Urgency(window, urgent))
    }

    fn icon(&self, _window: Window, _size: u32) -> Option<Icon> {
        None
    }

    fn window_pid(&self, window: Window) -> u32 {
        self.window(window).map_or(0, |fake| fake.pid)
    }

    fn wants_fullscreen(&self, window: Window) -> bool {
        self.window(window).is_some_and(|fake| fake.fullscreen)
    }

    fn is_dialog(&self, window: Window) -> bool {
        self.window(window).is_some_and(|fake| fake.dialog)
    }

    fn window_state(&self, window: Window) -> Option<WindowState> {
        self.window(window)?.state
    }

    fn saved_desktop(&self, window: Window) -> Option<(TagMask, usize)> {
        self.window(window)?.saved_desktop
    }

    fn root_name(&self) -> Option<String> {
        self.root_name.clone()
    }

    fn pointer_position(&self) -> Option<(i32, i32)> {
        Some(self.pointer)
    }

    fn clean_mask(&self, state: u16) -> u16 {
        // drop lock and numlock
        state & !(0x02 | 0x10)
    }

    fn select_client_events(&mut self, _window: Window) -> WmResult<()> {
        Ok(())
    }

    fn configure_window(&mut self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()> {
        if self.failing == Some(window) {
            return Err(WmError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "window gone")));
        }
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.attributes.geometry = geometry;
            fake.attributes.border_width = border_width;
        }
        self.record(Call::Configure {
            window,
            geometry,
            border_width,
        })
    }

    fn configure_unmanaged(&mut self, request: &ConfigureRequest) -> WmResult<()> {
        self.record(Call::ConfigureUnmanaged(*request))
    }

    fn send_configure_notify(&mut self, window: Window, _geometry: Rect, _border_width: i32) -> WmResult<()> {
        self.record(Call::ConfigureNotify(window))
    }

    fn move_window(&mut self, window: Window, x: i32, y: i32) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.attributes.geometry.x = x;
            fake.attributes.geometry.y = y;
        }
        self.record(Call::Move { window, x, y })
    }

    fn set_border_width(&mut self, window: Window, width: i32) -> WmResult<()> {
        self.record(Call::BorderWidth(window, width))
    }

    fn set_border_color(&mut self, window: Window, color: u32) -> WmResult<()> {
        self.record(Call::BorderColor(window, color))
    }

    fn map_window(&mut self, window: Window) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.attributes.viewable = true;
        }
        self.record(Call::Map(window))
    }

    fn unmap_window(&mut self, window: Window) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.attributes.viewable = false;
        }
        self.record(Call::Unmap(window))
    }

    fn unmap_quietly(&mut self, window: Window) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.attributes.viewable = false;
        }
        self.record(Call::UnmapQuietly(window))
    }

    fn raise_window(&mut self, window: Window) -> WmResult<()> {
        self.record(Call::Raise(window))
    }

    fn stack_below(&mut self, sibling: Window, windows: &[Window]) -> WmResult<()> {
        self.record(Call::StackBelow(sibling, windows.to_vec()))
    }

    fn set_input_focus(&mut self, window: Window) -> WmResult<()> {
        self.record(Call::Focus(window))
    }

    fn focus_root(&mut self) -> WmResult<()> {
        self.record(Call::FocusRoot)
    }

    fn set_active_window(&mut self, window: Option<Window>) -> WmResult<()> {
        self.record(Call::ActiveWindow(window))
    }

    fn send_protocol(&mut self, window: Window, protocol: Protocol) -> WmResult<bool> {
        let supported = self
            .window(window)
            .is_some_and(|fake| fake.protocols.contains(&protocol));
        if supported {
            self.record(Call::Protocol(window, protocol))?;
        }
        Ok(supported)
    }

    fn kill_client(&mut self, window: Window) -> WmResult<()> {
        self.record(Call::Kill(window))
    }

    fn set_window_state(&mut self, window: Window, state: WindowState) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.state = Some(state);
        }
        self.record(Call::State(window, state))
    }

    fn set_fullscreen_state(&mut self, window: Window, fullscreen: bool) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.fullscreen = fullscreen;
        }
        self.record(Call::Fullscreen(window, fullscreen))
    }

    fn set_window_name(&mut self, window: Window, name: &str) -> WmResult<()> {
        if let Some(fake) = self.windows.get_mut(&window) {
            fake.title = Some(name.to_string());
        }
        self.record(Call::Name(window, name.to_string()))
    }

    fn set_desktop(&mut self, window: Window, tags: TagMask, monitor: usize) -> WmResult<()> {
        self.record(Call::Desktop(window, tags, monitor))
    }

    fn set_current_desktop(&mut self, tags: TagMask) -> WmResult<()> {
        self.record(Call::CurrentDesktop(tags))
    }

    fn set_monitor_center(&mut self, x: i32, y: i32) -> WmResult<()> {
        self.record(Call::MonitorCenter(x, y))
    }

    fn set_client_list(&mut self, windows: &[Window]) -> WmResult<()> {
        self.record(Call::ClientList(windows.to_vec()))
    }

    fn grab_keys(&mut self, _keys: &[(u16, Keysym)]) -> WmResult<()> {
        self.record(Call::GrabKeys)
    }

    fn grab_buttons(&mut self, window: Window, focused: bool, _buttons: &[(u16, u8)]) -> WmResult<()> {
        self.record(Call::GrabButtons(window, focused))
    }

    fn ungrab_buttons(&mut self, window: Window) -> WmResult<()> {
        self.record(Call::UngrabButtons(window))
    }

    fn refresh_keyboard_mapping(&mut self) -> WmResult<()> {
        Ok(())
    }

    fn replay_pointer(&mut self) -> WmResult<()> {
        self.record(Call::ReplayPointer)
    }

    fn grab_pointer(&mut self, cursor: CursorKind) -> WmResult<bool> {
        self.record(Call::GrabPointer(cursor))?;
        Ok(true)
    }

    fn ungrab_pointer(&mut self) -> WmResult<()> {
        self.record(Call::UngrabPointer)
    }

    fn warp_pointer(&mut self, window: Window, x: i32, y: i32) -> WmResult<()> {
        self.record(Call::Warp(window, x, y))
    }

    fn cleanup(&mut self) -> WmResult<()> {
        self.record(Call::Cleanup)
    }
}

/// Measures ten pixels per character plus twenty of padding and hands out
/// bar windows from a private id range.
#[derive(Debug, Default)]
pub struct NullRenderer {
    next_bar: Window,
}

pub const BAR_BASE: Window = 9000;

impl Renderer for NullRenderer {
    fn bar_height(&self) -> i32 {
        20
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * 10 + 20
    }

    fn icon_size(&self) -> i32 {
        16
    }

    fn create_bar(&mut self, _rect: Rect) -> WmResult<Window> {
        let bar = BAR_BASE + self.next_bar;
        self.next_bar += 1;
        Ok(bar)
    }

    fn move_bar(&mut self, _bar: Window, _rect: Rect) -> WmResult<()> {
        Ok(())
    }

    fn destroy_bar(&mut self, _bar: Window) -> WmResult<()> {
        Ok(())
    }

    fn draw_bar(&mut self, _bar: Window, _model: &BarModel) -> WmResult<()> {
        Ok(())
    }
}

/// Parent links set up by the test, and a log of spawned commands.
#[derive(Debug, Default, Clone)]
pub struct FakeProcesses {
    pub parents: HashMap<u32, u32>,
    pub spawned: Rc<RefCell<Vec<Vec<String>>>>,
}

impl Processes for FakeProcesses {
    fn parent(&self, pid: u32) -> Option<u32> {
        self.parents.get(&pid).copied()
    }

    fn spawn(&self, argv: &[String]) -> io::Result<()> {
        self.spawned.borrow_mut().push(argv.to_vec());
        Ok(())
    }
}
