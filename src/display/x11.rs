use std::collections::VecDeque;
use std::os::fd::AsRawFd;
use std::rc::Rc;

use x11rb::CURRENT_TIME;
use x11rb::NONE;
use x11rb::connection::Connection;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::Event as XEvent;
use x11rb::protocol::res::{ClientIdMask, ClientIdSpec, ConnectionExt as _};
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use super::signals::SignalPipe;
use super::{
    ButtonEvent, ClassHint, ClientRequest, ConfigureRequest, CursorKind, Display, Event,
    PropertyKind, Protocol, StateAction, WindowAttributes, WindowState, WmHints,
};
use crate::client::{Icon, SizeHints};
use crate::errors::{WmResult, X11Error};
use crate::geometry::Rect;
use crate::keyboard::Keysym;
use crate::keyboard::keysyms::{self, XK_NUM_LOCK};
use crate::tags::TagMask;

fn root_event_mask() -> EventMask {
    EventMask::SUBSTRUCTURE_REDIRECT
        | EventMask::SUBSTRUCTURE_NOTIFY
        | EventMask::BUTTON_PRESS
        | EventMask::POINTER_MOTION
        | EventMask::ENTER_WINDOW
        | EventMask::LEAVE_WINDOW
        | EventMask::STRUCTURE_NOTIFY
        | EventMask::PROPERTY_CHANGE
}

fn client_event_mask() -> EventMask {
    EventMask::ENTER_WINDOW
        | EventMask::FOCUS_CHANGE
        | EventMask::PROPERTY_CHANGE
        | EventMask::STRUCTURE_NOTIFY
}

fn without(mask: EventMask, removed: EventMask) -> EventMask {
    EventMask::from(u32::from(mask) & !u32::from(removed))
}

fn button_mask() -> EventMask {
    EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE
}

const WM_HINTS_INPUT: u32 = 1;
const WM_HINTS_URGENCY: u32 = 1 << 8;

const XC_LEFT_PTR: u16 = 68;
const XC_SIZING: u16 = 120;
const XC_FLEUR: u16 = 52;

const WM_NAME: &str = "tagwm";

struct AtomCache {
    wm_protocols: Atom,
    wm_delete_window: Atom,
    wm_state: Atom,
    wm_take_focus: Atom,
    net_active_window: Atom,
    net_supported: Atom,
    net_wm_name: Atom,
    net_wm_state: Atom,
    net_wm_check: Atom,
    net_wm_fullscreen: Atom,
    net_wm_window_type: Atom,
    net_wm_window_type_dialog: Atom,
    net_wm_icon: Atom,
    net_wm_desktop: Atom,
    net_client_list: Atom,
    net_current_desktop: Atom,
    net_current_mon_center: Atom,
    utf8_string: Atom,
}

impl AtomCache {
    fn new(connection: &RustConnection) -> WmResult<Self> {
        let intern = |name: &[u8]| -> WmResult<Atom> {
            Ok(connection.intern_atom(false, name)?.reply()?.atom)
        };
        Ok(Self {
            wm_protocols: intern(b"WM_PROTOCOLS")?,
            wm_delete_window: intern(b"WM_DELETE_WINDOW")?,
            wm_state: intern(b"WM_STATE")?,
            wm_take_focus: intern(b"WM_TAKE_FOCUS")?,
            net_active_window: intern(b"_NET_ACTIVE_WINDOW")?,
            net_supported: intern(b"_NET_SUPPORTED")?,
            net_wm_name: intern(b"_NET_WM_NAME")?,
            net_wm_state: intern(b"_NET_WM_STATE")?,
            net_wm_check: intern(b"_NET_SUPPORTING_WM_CHECK")?,
            net_wm_fullscreen: intern(b"_NET_WM_STATE_FULLSCREEN")?,
            net_wm_window_type: intern(b"_NET_WM_WINDOW_TYPE")?,
            net_wm_window_type_dialog: intern(b"_NET_WM_WINDOW_TYPE_DIALOG")?,
            net_wm_icon: intern(b"_NET_WM_ICON")?,
            net_wm_desktop: intern(b"_NET_WM_DESKTOP")?,
            net_client_list: intern(b"_NET_CLIENT_LIST")?,
            net_current_desktop: intern(b"_NET_CURRENT_DESKTOP")?,
            net_current_mon_center: intern(b"_NET_CURRENT_MON_CENTER")?,
            utf8_string: intern(b"UTF8_STRING")?,
        })
    }

    fn supported(&self) -> [Atom; 9] {
        [
            self.net_active_window,
            self.net_supported,
            self.net_wm_name,
            self.net_wm_state,
            self.net_wm_check,
            self.net_wm_fullscreen,
            self.net_wm_window_type,
            self.net_wm_window_type_dialog,
            self.net_client_list,
        ]
    }
}

struct Cursors {
    normal: Cursor,
    resize: Cursor,
    moving: Cursor,
}

impl Cursors {
    fn new(connection: &RustConnection) -> WmResult<Self> {
        let font = connection.generate_id()?;
        connection.open_font(font, b"cursor")?;
        let glyph = |shape: u16| -> WmResult<Cursor> {
            let cursor = connection.generate_id()?;
            connection.create_glyph_cursor(
                cursor,
                font,
                font,
                shape,
                shape + 1,
                0,
                0,
                0,
                0xffff,
                0xffff,
                0xffff,
            )?;
            Ok(cursor)
        };
        let cursors = Self {
            normal: glyph(XC_LEFT_PTR)?,
            resize: glyph(XC_SIZING)?,
            moving: glyph(XC_FLEUR)?,
        };
        connection.close_font(font)?;
        Ok(cursors)
    }

    fn get(&self, kind: CursorKind) -> Cursor {
        match kind {
            CursorKind::Normal => self.normal,
            CursorKind::Resize => self.resize,
            CursorKind::Move => self.moving,
        }
    }
}

/// Keycode to keysym table loaded from the server.
#[derive(Default)]
struct Keymap {
    min_keycode: u8,
    per_keycode: usize,
    keysyms: Vec<Keysym>,
}

impl Keymap {
    fn load(connection: &RustConnection) -> WmResult<Self> {
        let setup = connection.setup();
        let (min_keycode, max_keycode) = (setup.min_keycode, setup.max_keycode);
        let mapping = connection
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;
        Ok(Self {
            min_keycode,
            per_keycode: usize::from(mapping.keysyms_per_keycode),
            keysyms: mapping.keysyms,
        })
    }

    fn keysym(&self, keycode: u8) -> Keysym {
        let Some(index) = keycode.checked_sub(self.min_keycode) else {
            return 0;
        };
        self.keysyms
            .get(usize::from(index) * self.per_keycode)
            .copied()
            .unwrap_or(0)
    }

    fn keycodes(&self, keysym: Keysym) -> Vec<u8> {
        if self.per_keycode == 0 {
            return Vec::new();
        }
        self.keysyms
            .chunks(self.per_keycode)
            .enumerate()
            .filter(|(_, syms)| syms.contains(&keysym))
            .map(|(index, _)| self.min_keycode + index as u8)
            .collect()
    }
}

/// The X server behind [`Display`], spoken to through x11rb.
pub struct X11Display {
    connection: Rc<RustConnection>,
    screen_number: usize,
    root: Window,
    screen_width: i32,
    screen_height: i32,
    atoms: AtomCache,
    cursors: Cursors,
    check_window: Window,
    keymap: Keymap,
    numlock_mask: u16,
    signals: SignalPipe,
    /// Events read while draining crossings, replayed before new ones.
    pending: VecDeque<Event>,
}

impl X11Display {
    /// Connects, becomes the window manager and advertises EWMH support.
    pub fn connect() -> WmResult<Self> {
        let (connection, screen_number) = x11rb::connect(None)?;
        let screen = &connection.setup().roots[screen_number];
        let root = screen.root;
        let (screen_width, screen_height) = (
            i32::from(screen.width_in_pixels),
            i32::from(screen.height_in_pixels),
        );

        connection
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new().event_mask(EventMask::SUBSTRUCTURE_REDIRECT),
            )?
            .check()
            .map_err(|_| X11Error::OtherWindowManager)?;

        let signals = SignalPipe::install()?;
        let atoms = AtomCache::new(&connection)?;
        let cursors = Cursors::new(&connection)?;

        let check_window = connection.generate_id()?;
        connection.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            check_window,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new(),
        )?;
        for window in [check_window, root] {
            connection.change_property32(
                PropMode::REPLACE,
                window,
                atoms.net_wm_check,
                AtomEnum::WINDOW,
                &[check_window],
            )?;
        }
        connection.change_property8(
            PropMode::REPLACE,
            check_window,
            atoms.net_wm_name,
            atoms.utf8_string,
            WM_NAME.as_bytes(),
        )?;
        connection.change_property32(
            PropMode::REPLACE,
            root,
            atoms.net_supported,
            AtomEnum::ATOM,
            &atoms.supported(),
        )?;
        connection.delete_property(root, atoms.net_client_list)?;

        connection
            .change_window_attributes(
                root,
                &ChangeWindowAttributesAux::new()
                    .event_mask(root_event_mask())
                    .cursor(cursors.normal),
            )?
            .check()?;

        let mut display = Self {
            connection: Rc::new(connection),
            screen_number,
            root,
            screen_width,
            screen_height,
            atoms,
            cursors,
            check_window,
            keymap: Keymap::default(),
            numlock_mask: 0,
            signals,
            pending: VecDeque::new(),
        };
        display.refresh_keyboard_mapping()?;
        display.connection.flush()?;
        tracing::info!("managing display on screen {}", screen_number);
        Ok(display)
    }

    /// Shared connection for the bar renderer.
    pub fn connection(&self) -> Rc<RustConnection> {
        Rc::clone(&self.connection)
    }

    pub fn screen_number(&self) -> usize {
        self.screen_number
    }

    fn property32(&self, window: Window, property: Atom, kind: impl Into<Atom>, length: u32) -> Option<Vec<u32>> {
        let reply = self
            .connection
            .get_property(false, window, property, kind, 0, length)
            .ok()?
            .reply()
            .ok()?;
        Some(reply.value32()?.collect())
    }

    fn text_property(&self, window: Window, property: impl Into<Atom>) -> Option<String> {
        let reply = self
            .connection
            .get_property(false, window, property, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?;
        if reply.value.is_empty() {
            return None;
        }
        let end = reply
            .value
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(reply.value.len());
        Some(String::from_utf8_lossy(&reply.value[..end]).into_owned())
    }

    fn has_atom(&self, window: Window, property: Atom, atom: Atom) -> bool {
        self.property32(window, property, AtomEnum::ATOM, 32)
            .is_some_and(|atoms| atoms.contains(&atom))
    }

    fn load_numlock_mask(&mut self) -> WmResult<()> {
        let mapping = self.connection.get_modifier_mapping()?.reply()?;
        let per_modifier = usize::from(mapping.keycodes_per_modifier());
        let numlock_codes = self.keymap.keycodes(XK_NUM_LOCK);
        self.numlock_mask = 0;
        if per_modifier == 0 {
            return Ok(());
        }
        for (modifier, codes) in mapping.keycodes.chunks(per_modifier).enumerate() {
            if codes.iter().any(|code| *code != 0 && numlock_codes.contains(code)) {
                self.numlock_mask = 1 << modifier;
            }
        }
        Ok(())
    }

    fn lock_variants(&self) -> [u16; 4] {
        let lock = u16::from(ModMask::LOCK);
        [0, lock, self.numlock_mask, self.numlock_mask | lock]
    }

    /// Returns `false` for protocol errors a window manager routinely
    /// provokes by racing clients that are going away.
    fn is_expected_error(error: &x11rb::x11_utils::X11Error) -> bool {
        match (error.error_kind, error.major_opcode) {
            (ErrorKind::Window, _) => true,
            (ErrorKind::Match, SET_INPUT_FOCUS_REQUEST | CONFIGURE_WINDOW_REQUEST) => true,
            (
                ErrorKind::Drawable,
                POLY_TEXT8_REQUEST | POLY_FILL_RECTANGLE_REQUEST | POLY_SEGMENT_REQUEST
                | COPY_AREA_REQUEST,
            ) => true,
            (ErrorKind::Access, GRAB_BUTTON_REQUEST | GRAB_KEY_REQUEST) => true,
            _ => false,
        }
    }

    fn property_kind(&self, atom: Atom) -> PropertyKind {
        if atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
            PropertyKind::TransientFor
        } else if atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
            PropertyKind::NormalHints
        } else if atom == u32::from(AtomEnum::WM_HINTS) {
            PropertyKind::Hints
        } else if atom == u32::from(AtomEnum::WM_NAME) || atom == self.atoms.net_wm_name {
            PropertyKind::Name
        } else if atom == self.atoms.net_wm_window_type {
            PropertyKind::WindowType
        } else if atom == self.atoms.net_wm_icon {
            PropertyKind::Icon
        } else {
            PropertyKind::Other
        }
    }

    fn translate(&mut self, event: XEvent) -> WmResult<Option<Event>> {
        let translated = match event {
            XEvent::Error(error) => {
                if !Self::is_expected_error(&error) {
                    tracing::warn!(
                        "X error {:?} on request {} (resource {})",
                        error.error_kind,
                        error.major_opcode,
                        error.bad_value
                    );
                }
                None
            }
            XEvent::MapRequest(event) => Some(Event::MapRequest {
                window: event.window,
            }),
            XEvent::UnmapNotify(event) => Some(Event::UnmapNotify {
                window: event.window,
                synthetic: event.response_type & 0x80 != 0,
            }),
            XEvent::DestroyNotify(event) => Some(Event::DestroyNotify {
                window: event.window,
            }),
            XEvent::ConfigureRequest(event) => {
                let mask = u16::from(event.value_mask);
                let has = |flag: ConfigWindow| mask & u16::from(flag) != 0;
                Some(Event::ConfigureRequest(ConfigureRequest {
                    window: event.window,
                    x: has(ConfigWindow::X).then_some(i32::from(event.x)),
                    y: has(ConfigWindow::Y).then_some(i32::from(event.y)),
                    width: has(ConfigWindow::WIDTH).then_some(i32::from(event.width)),
                    height: has(ConfigWindow::HEIGHT).then_some(i32::from(event.height)),
                    border_width: has(ConfigWindow::BORDER_WIDTH)
                        .then_some(i32::from(event.border_width)),
                    sibling: has(ConfigWindow::SIBLING).then_some(event.sibling),
                    stack_mode: has(ConfigWindow::STACK_MODE)
                        .then_some(u32::from(event.stack_mode)),
                }))
            }
            XEvent::ConfigureNotify(event) if event.window == self.root => {
                self.screen_width = i32::from(event.width);
                self.screen_height = i32::from(event.height);
                Some(Event::RootConfigured {
                    width: self.screen_width,
                    height: self.screen_height,
                })
            }
            XEvent::PropertyNotify(event) => {
                if event.window == self.root && event.atom == u32::from(AtomEnum::WM_NAME) {
                    Some(Event::RootNameChanged)
                } else {
                    Some(Event::PropertyNotify {
                        window: event.window,
                        kind: self.property_kind(event.atom),
                        deleted: event.state == Property::DELETE,
                    })
                }
            }
            XEvent::ClientMessage(event) => {
                let data = event.data.as_data32();
                if event.type_ == self.atoms.net_wm_state
                    && (data[1] == self.atoms.net_wm_fullscreen
                        || data[2] == self.atoms.net_wm_fullscreen)
                {
                    let action = match data[0] {
                        0 => StateAction::Remove,
                        1 => StateAction::Add,
                        _ => StateAction::Toggle,
                    };
                    Some(Event::ClientMessage {
                        window: event.window,
                        request: ClientRequest::Fullscreen(action),
                    })
                } else if event.type_ == self.atoms.net_active_window {
                    Some(Event::ClientMessage {
                        window: event.window,
                        request: ClientRequest::Activate,
                    })
                } else {
                    None
                }
            }
            XEvent::ButtonPress(event) => Some(Event::ButtonPress(ButtonEvent {
                window: event.event,
                x: i32::from(event.event_x),
                y: i32::from(event.event_y),
                root_x: i32::from(event.root_x),
                root_y: i32::from(event.root_y),
                button: event.detail,
                state: u16::from(event.state),
            })),
            XEvent::ButtonRelease(event) => Some(Event::ButtonRelease(ButtonEvent {
                window: event.event,
                x: i32::from(event.event_x),
                y: i32::from(event.event_y),
                root_x: i32::from(event.root_x),
                root_y: i32::from(event.root_y),
                button: event.detail,
                state: u16::from(event.state),
            })),
            XEvent::MotionNotify(event) => Some(Event::MotionNotify {
                window: event.event,
                root_x: i32::from(event.root_x),
                root_y: i32::from(event.root_y),
                time: event.time,
            }),
            XEvent::EnterNotify(event) => {
                let crossing = event.mode != NotifyMode::NORMAL
                    || event.detail == NotifyDetail::INFERIOR;
                if crossing && event.event != self.root {
                    None
                } else {
                    Some(Event::EnterNotify { window: event.event })
                }
            }
            XEvent::FocusIn(event) => Some(Event::FocusIn { window: event.event }),
            XEvent::KeyPress(event) => Some(Event::KeyPress {
                keysym: self.keymap.keysym(event.detail),
                state: u16::from(event.state),
            }),
            XEvent::MappingNotify(event) => Some(Event::MappingNotify {
                keyboard: event.request == Mapping::KEYBOARD,
            }),
            XEvent::Expose(event) => Some(Event::Expose {
                window: event.window,
                count: event.count,
            }),
            _ => None,
        };
        Ok(translated)
    }

    fn wait_readable(&self) -> WmResult<()> {
        let mut fds = [
            libc::pollfd {
                fd: self.connection.stream().as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            },
            libc::pollfd {
                fd: self.signals.fd(),
                events: libc::POLLIN,
                revents: 0,
            },
        ];
        // SAFETY: fds is a valid array of two pollfd entries.
        let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, -1) };
        if ready == -1 {
            let error = std::io::Error::last_os_error();
            if error.kind() != std::io::ErrorKind::Interrupted {
                return Err(error.into());
            }
        }
        Ok(())
    }
}

impl Display for X11Display {
    fn root(&self) -> Window {
        self.root
    }

    fn screen_size(&self) -> (i32, i32) {
        (self.screen_width, self.screen_height)
    }

    fn screens(&self) -> WmResult<Vec<Rect>> {
        let whole = vec![Rect::new(0, 0, self.screen_width, self.screen_height)];

        let xinerama_active = self
            .connection
            .xinerama_is_active()
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .is_some_and(|reply| reply.state != 0);
        if !xinerama_active {
            return Ok(whole);
        }

        let Ok(cookie) = self.connection.xinerama_query_screens() else {
            return Ok(whole);
        };
        let Ok(reply) = cookie.reply() else {
            return Ok(whole);
        };

        let screens: Vec<Rect> = reply
            .screen_info
            .iter()
            .filter(|info| info.width > 0 && info.height > 0)
            .map(|info| {
                Rect::new(
                    i32::from(info.x_org),
                    i32::from(info.y_org),
                    i32::from(info.width),
                    i32::from(info.height),
                )
            })
            .collect();
        Ok(if screens.is_empty() { whole } else { screens })
    }

    fn next_event(&mut self) -> WmResult<Event> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(event);
            }
            if let Some(signal) = self.signals.drain().into_iter().next() {
                return Ok(Event::Signal(signal));
            }
            if let Some(event) = self.connection.poll_for_event()? {
                if let Some(event) = self.translate(event)? {
                    return Ok(event);
                }
                continue;
            }
            self.connection.flush()?;
            self.wait_readable()?;
        }
    }

    fn flush(&mut self) -> WmResult<()> {
        self.connection.flush()?;
        Ok(())
    }

    fn discard_enter_events(&mut self) -> WmResult<()> {
        self.connection.get_input_focus()?.reply()?;
        while let Some(event) = self.connection.poll_for_event()? {
            if matches!(event, XEvent::EnterNotify(_)) {
                continue;
            }
            if let Some(event) = self.translate(event)? {
                self.pending.push_back(event);
            }
        }
        Ok(())
    }

    fn window_attributes(&self, window: Window) -> Option<WindowAttributes> {
        let attributes = self
            .connection
            .get_window_attributes(window)
            .ok()?
            .reply()
            .ok()?;
        let geometry = self.connection.get_geometry(window).ok()?.reply().ok()?;
        Some(WindowAttributes {
            geometry: Rect::new(
                i32::from(geometry.x),
                i32::from(geometry.y),
                i32::from(geometry.width),
                i32::from(geometry.height),
            ),
            border_width: i32::from(geometry.border_width),
            override_redirect: attributes.override_redirect,
            viewable: attributes.map_state == MapState::VIEWABLE,
        })
    }

    fn top_level_windows(&self) -> Vec<Window> {
        self.connection
            .query_tree(self.root)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|tree| tree.children)
            .unwrap_or_default()
    }

    fn transient_for(&self, window: Window) -> Option<Window> {
        self.property32(window, AtomEnum::WM_TRANSIENT_FOR.into(), AtomEnum::WINDOW, 1)?
            .first()
            .copied()
            .filter(|&parent| parent != NONE)
    }

    fn class_hint(&self, window: Window) -> Option<ClassHint> {
        let reply = self
            .connection
            .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 1024)
            .ok()?
            .reply()
            .ok()?;
        let mut parts = reply
            .value
            .split(|&byte| byte == 0)
            .map(|part| String::from_utf8_lossy(part).into_owned());
        Some(ClassHint {
            instance: parts.next().unwrap_or_default(),
            class: parts.next().unwrap_or_default(),
        })
    }

    fn title(&self, window: Window) -> Option<String> {
        self.text_property(window, self.atoms.net_wm_name)
            .or_else(|| self.text_property(window, AtomEnum::WM_NAME))
    }

    fn size_hints(&self, window: Window) -> Option<SizeHints> {
        let words = self.property32(
            window,
            AtomEnum::WM_NORMAL_HINTS.into(),
            AtomEnum::WM_SIZE_HINTS,
            18,
        )?;
        Some(SizeHints::from_words(&words))
    }

    fn wm_hints(&self, window: Window) -> Option<WmHints> {
        let words = self.property32(window, AtomEnum::WM_HINTS.into(), AtomEnum::WM_HINTS, 9)?;
        let flags = *words.first()?;
        Some(WmHints {
            urgent: flags & WM_HINTS_URGENCY != 0,
            input: (flags & WM_HINTS_INPUT != 0).then(|| words.get(1).is_some_and(|&v| v != 0)),
        })
    }

    fn set_urgency_hint(&mut self, window: Window, urgent: bool) -> WmResult<()> {
        let Some(mut words) =
            self.property32(window, AtomEnum::WM_HINTS.into(), AtomEnum::WM_HINTS, 9)
        else {
            return Ok(());
        };
        let Some(flags) = words.first_mut() else {
            return Ok(());
        };
        if urgent {
            *flags |= WM_HINTS_URGENCY;
        } else {
            *flags &= !WM_HINTS_URGENCY;
        }
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            &words,
        )?;
        Ok(())
    }

    fn icon(&self, window: Window, size: u32) -> Option<Icon> {
        let data = self.property32(window, self.atoms.net_wm_icon, AtomEnum::CARDINAL, u32::MAX)?;
        Icon::pick(&data, size)
    }

    fn window_pid(&self, window: Window) -> u32 {
        let spec = ClientIdSpec {
            client: window,
            mask: ClientIdMask::LOCAL_CLIENT_PID,
        };
        self.connection
            .res_query_client_ids(&[spec])
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| {
                reply
                    .ids
                    .into_iter()
                    .find(|id| id.spec.mask.contains(ClientIdMask::LOCAL_CLIENT_PID))
                    .and_then(|id| id.value.first().copied())
            })
            .unwrap_or(0)
    }

    fn wants_fullscreen(&self, window: Window) -> bool {
        self.has_atom(window, self.atoms.net_wm_state, self.atoms.net_wm_fullscreen)
    }

    fn is_dialog(&self, window: Window) -> bool {
        self.has_atom(
            window,
            self.atoms.net_wm_window_type,
            self.atoms.net_wm_window_type_dialog,
        )
    }

    fn window_state(&self, window: Window) -> Option<WindowState> {
        let words = self.property32(window, self.atoms.wm_state, self.atoms.wm_state, 2)?;
        match words.first()? {
            0 => Some(WindowState::Withdrawn),
            1 => Some(WindowState::Normal),
            3 => Some(WindowState::Iconic),
            _ => None,
        }
    }

    fn saved_desktop(&self, window: Window) -> Option<(TagMask, usize)> {
        match self
            .property32(window, self.atoms.net_wm_desktop, AtomEnum::CARDINAL, 2)?
            .as_slice()
        {
            [tags, monitor] => Some((*tags, *monitor as usize)),
            _ => None,
        }
    }

    fn root_name(&self) -> Option<String> {
        self.text_property(self.root, AtomEnum::WM_NAME)
    }

    fn pointer_position(&self) -> Option<(i32, i32)> {
        let reply = self.connection.query_pointer(self.root).ok()?.reply().ok()?;
        Some((i32::from(reply.root_x), i32::from(reply.root_y)))
    }

    fn clean_mask(&self, state: u16) -> u16 {
        let modifiers = ModMask::SHIFT
            | ModMask::CONTROL
            | ModMask::M1
            | ModMask::M2
            | ModMask::M3
            | ModMask::M4
            | ModMask::M5;
        state & !(self.numlock_mask | u16::from(ModMask::LOCK)) & u16::from(modifiers)
    }

    fn select_client_events(&mut self, window: Window) -> WmResult<()> {
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(client_event_mask()),
        )?;
        Ok(())
    }

    fn configure_window(&mut self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()> {
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(geometry.width.max(1) as u32)
                .height(geometry.height.max(1) as u32)
                .border_width(border_width.max(0) as u32),
        )?;
        Ok(())
    }

    fn configure_unmanaged(&mut self, request: &ConfigureRequest) -> WmResult<()> {
        let aux = ConfigureWindowAux {
            x: request.x,
            y: request.y,
            width: request.width.map(|width| width.max(1) as u32),
            height: request.height.map(|height| height.max(1) as u32),
            border_width: request.border_width.map(|width| width.max(0) as u32),
            sibling: request.sibling,
            stack_mode: request.stack_mode.map(|mode| StackMode::from(mode as u8)),
        };
        self.connection.configure_window(request.window, &aux)?;
        Ok(())
    }

    fn send_configure_notify(&mut self, window: Window, geometry: Rect, border_width: i32) -> WmResult<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: NONE,
            x: geometry.x as i16,
            y: geometry.y as i16,
            width: geometry.width as u16,
            height: geometry.height as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };
        self.connection
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, event)?;
        Ok(())
    }

    fn move_window(&mut self, window: Window, x: i32, y: i32) -> WmResult<()> {
        self.connection
            .configure_window(window, &ConfigureWindowAux::new().x(x).y(y))?;
        Ok(())
    }

    fn set_border_width(&mut self, window: Window, width: i32) -> WmResult<()> {
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new().border_width(width.max(0) as u32),
        )?;
        Ok(())
    }

    fn set_border_color(&mut self, window: Window, color: u32) -> WmResult<()> {
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().border_pixel(color),
        )?;
        Ok(())
    }

    fn map_window(&mut self, window: Window) -> WmResult<()> {
        self.connection.map_window(window)?;
        Ok(())
    }

    fn unmap_window(&mut self, window: Window) -> WmResult<()> {
        self.connection.unmap_window(window)?;
        Ok(())
    }

    fn unmap_quietly(&mut self, window: Window) -> WmResult<()> {
        self.connection.grab_server()?;
        self.connection.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new()
                .event_mask(without(root_event_mask(), EventMask::SUBSTRUCTURE_NOTIFY)),
        )?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new()
                .event_mask(without(client_event_mask(), EventMask::STRUCTURE_NOTIFY)),
        )?;
        self.connection.unmap_window(window)?;
        self.connection.change_window_attributes(
            self.root,
            &ChangeWindowAttributesAux::new().event_mask(root_event_mask()),
        )?;
        self.connection.change_window_attributes(
            window,
            &ChangeWindowAttributesAux::new().event_mask(client_event_mask()),
        )?;
        self.connection.ungrab_server()?;
        Ok(())
    }

    fn raise_window(&mut self, window: Window) -> WmResult<()> {
        self.connection.configure_window(
            window,
            &ConfigureWindowAux::new().stack_mode(StackMode::ABOVE),
        )?;
        Ok(())
    }

    fn stack_below(&mut self, sibling: Window, windows: &[Window]) -> WmResult<()> {
        let mut above = sibling;
        for &window in windows {
            self.connection.configure_window(
                window,
                &ConfigureWindowAux::new()
                    .sibling(above)
                    .stack_mode(StackMode::BELOW),
            )?;
            above = window;
        }
        Ok(())
    }

    fn set_input_focus(&mut self, window: Window) -> WmResult<()> {
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, window, CURRENT_TIME)?;
        Ok(())
    }

    fn focus_root(&mut self) -> WmResult<()> {
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;
        Ok(())
    }

    fn set_active_window(&mut self, window: Option<Window>) -> WmResult<()> {
        match window {
            Some(window) => {
                self.connection.change_property32(
                    PropMode::REPLACE,
                    self.root,
                    self.atoms.net_active_window,
                    AtomEnum::WINDOW,
                    &[window],
                )?;
            }
            None => {
                self.connection
                    .delete_property(self.root, self.atoms.net_active_window)?;
            }
        }
        Ok(())
    }

    fn send_protocol(&mut self, window: Window, protocol: Protocol) -> WmResult<bool> {
        let atom = match protocol {
            Protocol::DeleteWindow => self.atoms.wm_delete_window,
            Protocol::TakeFocus => self.atoms.wm_take_focus,
        };
        let supported = self
            .property32(window, self.atoms.wm_protocols, AtomEnum::ATOM, 100)
            .is_some_and(|protocols| protocols.contains(&atom));
        if !supported {
            return Ok(false);
        }

        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms.wm_protocols,
            [atom, CURRENT_TIME, 0, 0, 0],
        );
        self.connection
            .send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(true)
    }

    fn kill_client(&mut self, window: Window) -> WmResult<()> {
        self.connection.grab_server()?;
        self.connection
            .set_close_down_mode(CloseDown::DESTROY_ALL)?;
        self.connection.kill_client(window)?;
        self.connection.ungrab_server()?;
        Ok(())
    }

    fn set_window_state(&mut self, window: Window, state: WindowState) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.wm_state,
            self.atoms.wm_state,
            &[state as u32, NONE],
        )?;
        Ok(())
    }

    fn set_fullscreen_state(&mut self, window: Window, fullscreen: bool) -> WmResult<()> {
        let state: &[Atom] = if fullscreen {
            &[self.atoms.net_wm_fullscreen]
        } else {
            &[]
        };
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_state,
            AtomEnum::ATOM,
            state,
        )?;
        Ok(())
    }

    fn set_window_name(&mut self, window: Window, name: &str) -> WmResult<()> {
        self.connection.change_property8(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_name,
            self.atoms.utf8_string,
            name.as_bytes(),
        )?;
        Ok(())
    }

    fn set_desktop(&mut self, window: Window, tags: TagMask, monitor: usize) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            window,
            self.atoms.net_wm_desktop,
            AtomEnum::CARDINAL,
            &[tags, monitor as u32],
        )?;
        Ok(())
    }

    fn set_current_desktop(&mut self, tags: TagMask) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms.net_current_desktop,
            AtomEnum::CARDINAL,
            &[tags],
        )?;
        Ok(())
    }

    fn set_monitor_center(&mut self, x: i32, y: i32) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms.net_current_mon_center,
            AtomEnum::CARDINAL,
            &[x as u32, y as u32],
        )?;
        Ok(())
    }

    fn set_client_list(&mut self, windows: &[Window]) -> WmResult<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            self.root,
            self.atoms.net_client_list,
            AtomEnum::WINDOW,
            windows,
        )?;
        Ok(())
    }

    fn grab_keys(&mut self, keys: &[(u16, Keysym)]) -> WmResult<()> {
        self.connection
            .ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        for &(modifiers, keysym) in keys {
            let keycodes = self.keymap.keycodes(keysym);
            if keycodes.is_empty() {
                tracing::debug!("no keycode for {}", keysyms::format_keysym(keysym));
            }
            for keycode in keycodes {
                for variant in self.lock_variants() {
                    self.connection.grab_key(
                        true,
                        self.root,
                        ModMask::from(modifiers | variant),
                        keycode,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn grab_buttons(&mut self, window: Window, focused: bool, buttons: &[(u16, u8)]) -> WmResult<()> {
        self.connection
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
        if !focused {
            self.connection.grab_button(
                false,
                window,
                button_mask(),
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )?;
        }
        for &(modifiers, button) in buttons {
            for variant in self.lock_variants() {
                self.connection.grab_button(
                    false,
                    window,
                    button_mask(),
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(button),
                    ModMask::from(modifiers | variant),
                )?;
            }
        }
        Ok(())
    }

    fn ungrab_buttons(&mut self, window: Window) -> WmResult<()> {
        self.connection
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
        Ok(())
    }

    fn refresh_keyboard_mapping(&mut self) -> WmResult<()> {
        self.keymap = Keymap::load(&self.connection)?;
        self.load_numlock_mask()
    }

    fn replay_pointer(&mut self) -> WmResult<()> {
        self.connection
            .allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)?;
        Ok(())
    }

    fn grab_pointer(&mut self, cursor: CursorKind) -> WmResult<bool> {
        let reply = self
            .connection
            .grab_pointer(
                false,
                self.root,
                button_mask() | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                self.cursors.get(cursor),
                CURRENT_TIME,
            )?
            .reply()?;
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    fn ungrab_pointer(&mut self) -> WmResult<()> {
        self.connection.ungrab_pointer(CURRENT_TIME)?;
        Ok(())
    }

    fn warp_pointer(&mut self, window: Window, x: i32, y: i32) -> WmResult<()> {
        self.connection
            .warp_pointer(NONE, window, 0, 0, 0, 0, x as i16, y as i16)?;
        Ok(())
    }

    fn cleanup(&mut self) -> WmResult<()> {
        self.connection
            .ungrab_key(Grab::ANY, self.root, ModMask::ANY)?;
        for cursor in [self.cursors.normal, self.cursors.resize, self.cursors.moving] {
            self.connection.free_cursor(cursor)?;
        }
        self.connection.destroy_window(self.check_window)?;
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, self.root, CURRENT_TIME)?;
        self.connection
            .delete_property(self.root, self.atoms.net_active_window)?;
        self.connection.flush()?;
        Ok(())
    }
}
