use tracing::{debug, info, trace};

use super::{Control, WindowManager};
use crate::bar::BarHit;
use crate::client::ClientId;
use crate::display::{
    BUTTON_LEFT, ButtonEvent, ClientRequest, ConfigureRequest, Display, Event, PropertyKind,
    SignalKind, StateAction, Window, WindowState,
};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::keyboard::{self, Arg, Click, KeyAction, Keysym};
use crate::process;
use crate::tags;

impl<D: Display> WindowManager<D> {
    pub(super) fn handle_event(&mut self, event: Event) -> WmResult<()> {
        trace!("event {:?}", event);
        match event {
            Event::MapRequest { window } => self.map_request(window),
            Event::UnmapNotify { window, synthetic } => self.unmap_notify(window, synthetic),
            Event::DestroyNotify { window } => self.destroy_notify(window),
            Event::ConfigureRequest(request) => self.configure_request(&request),
            Event::RootConfigured { width, height } => self.root_configured(width, height),
            Event::PropertyNotify {
                window,
                kind,
                deleted,
            } => self.property_notify(window, kind, deleted),
            Event::RootNameChanged => self.update_status(),
            Event::ClientMessage { window, request } => self.client_message(window, request),
            Event::ButtonPress(event) => self.button_press(&event),
            Event::ButtonRelease(_) => Ok(()),
            Event::MotionNotify {
                window,
                root_x,
                root_y,
                ..
            } => self.motion_notify(window, root_x, root_y),
            Event::EnterNotify { window } => self.enter_notify(window),
            Event::FocusIn { window } => self.focus_in(window),
            Event::KeyPress { keysym, state } => self.key_press(keysym, state),
            Event::MappingNotify { keyboard } => {
                self.display.refresh_keyboard_mapping()?;
                if keyboard {
                    self.grab_keys()?;
                }
                Ok(())
            }
            Event::Expose { window, count } => {
                if count == 0 {
                    let monitor = self.window_to_monitor(window);
                    self.draw_bar(monitor)?;
                }
                Ok(())
            }
            Event::Signal(kind) => {
                self.handle_signal(kind);
                Ok(())
            }
        }
    }

    fn handle_signal(&mut self, kind: SignalKind) {
        match kind {
            SignalKind::Child => process::reap_children(),
            SignalKind::Hangup => {
                info!("restart requested");
                self.control = Control::Restart;
            }
            SignalKind::Terminate => {
                info!("quit requested");
                self.control = Control::Quit;
            }
        }
    }

    fn map_request(&mut self, window: Window) -> WmResult<()> {
        let Some(attributes) = self.display.window_attributes(window) else {
            return Ok(());
        };
        if attributes.override_redirect
            || self.window_to_client(window).is_some()
            || self.swallowing_client(window).is_some()
        {
            return Ok(());
        }
        self.manage(window, attributes)
    }

    fn unmap_notify(&mut self, window: Window, synthetic: bool) -> WmResult<()> {
        let Some(id) = self.window_to_client(window) else {
            return Ok(());
        };
        if synthetic {
            self.display.set_window_state(window, WindowState::Withdrawn)
        } else {
            self.unmanage(id, false)
        }
    }

    fn destroy_notify(&mut self, window: Window) -> WmResult<()> {
        if let Some(id) = self.window_to_client(window) {
            self.unmanage(id, true)
        } else if let Some(id) = self.swallowing_client(window) {
            self.release_swallowed(id)
        } else {
            Ok(())
        }
    }

    /// Floating clients and clients under a non-tiling layout get what they
    /// ask for, within their monitor. Tiled ones are told their current
    /// geometry.
    fn configure_request(&mut self, request: &ConfigureRequest) -> WmResult<()> {
        let Some(id) = self.window_to_client(request.window) else {
            return self.display.configure_unmanaged(request);
        };

        if let Some(border_width) = request.border_width {
            self.clients[id].border_width = border_width;
            return Ok(());
        }
        if !self.clients[id].is_floating && self.layout_arranges(self.selmon) {
            return self.send_configure(id);
        }

        let client = &mut self.clients[id];
        let screen = self.monitors[client.monitor].screen;
        if !client.is_steam {
            if let Some(x) = request.x {
                client.old_geometry.x = client.geometry.x;
                client.geometry.x = screen.x + x;
            }
            if let Some(y) = request.y {
                client.old_geometry.y = client.geometry.y;
                client.geometry.y = screen.y + y;
            }
        }
        if let Some(width) = request.width {
            client.old_geometry.width = client.geometry.width;
            client.geometry.width = width;
        }
        if let Some(height) = request.height {
            client.old_geometry.height = client.geometry.height;
            client.geometry.height = height;
        }
        if client.is_floating && client.geometry.x + client.geometry.width > screen.right() {
            client.geometry.x = screen.x + (screen.width / 2 - client.width_with_border() / 2);
        }
        if client.is_floating && client.geometry.y + client.geometry.height > screen.bottom() {
            client.geometry.y = screen.y + (screen.height / 2 - client.height_with_border() / 2);
        }

        let moved_only = (request.x.is_some() || request.y.is_some())
            && request.width.is_none()
            && request.height.is_none();
        if moved_only {
            self.send_configure(id)?;
        }
        if self.is_visible(id) {
            let client = &self.clients[id];
            self.display
                .configure_window(client.window(), client.geometry, client.border_width)?;
        }
        Ok(())
    }

    fn property_notify(&mut self, window: Window, kind: PropertyKind, deleted: bool) -> WmResult<()> {
        if deleted {
            return Ok(());
        }
        let Some(id) = self.window_to_client(window) else {
            return Ok(());
        };

        match kind {
            PropertyKind::TransientFor => {
                let parent_managed = self
                    .display
                    .transient_for(window)
                    .is_some_and(|parent| self.window_to_client(parent).is_some());
                if !self.clients[id].is_floating && parent_managed {
                    self.clients[id].is_floating = true;
                    let monitor = self.clients[id].monitor;
                    self.arrange(Some(monitor))?;
                }
            }
            PropertyKind::NormalHints => self.update_size_hints(id),
            PropertyKind::Hints => {
                self.update_wm_hints(id)?;
                self.draw_bars()?;
            }
            PropertyKind::Name | PropertyKind::Icon => {
                if kind == PropertyKind::Name {
                    self.update_title(id);
                }
                self.update_icon(id);
                let monitor = self.clients[id].monitor;
                if self.monitors[monitor].selected == Some(id) {
                    self.draw_bar(monitor)?;
                }
            }
            PropertyKind::WindowType => self.update_window_type(id)?,
            PropertyKind::Other => {}
        }
        Ok(())
    }

    fn client_message(&mut self, window: Window, request: ClientRequest) -> WmResult<()> {
        let Some(id) = self.window_to_client(window) else {
            return Ok(());
        };
        match request {
            ClientRequest::Fullscreen(action) => {
                let fullscreen = match action {
                    StateAction::Add => true,
                    StateAction::Remove => false,
                    StateAction::Toggle => !self.clients[id].is_fullscreen,
                };
                self.set_fullscreen(id, fullscreen)
            }
            ClientRequest::Activate => self.activate(id),
        }
    }

    /// Brings `id` into view on its monitor, restoring it if hidden.
    fn activate(&mut self, id: ClientId) -> WmResult<()> {
        if self.selected() == Some(id) && !self.clients[id].is_hidden {
            return Ok(());
        }
        debug!("activating window {}", self.clients[id].window());
        self.selmon = self.clients[id].monitor;
        self.update_monitor_center()?;
        if let Some(tag) = tags::lowest_tag(self.clients[id].tags)
            && !self.is_visible(id)
        {
            self.view(1 << tag)?;
        }
        self.show_window(id)?;
        self.focus(Some(id))?;
        let client = &self.clients[id];
        if !client.is_floating {
            self.display.warp_pointer(
                client.window(),
                client.geometry.width / 2,
                client.geometry.height / 2,
            )?;
        }
        self.restack(self.selmon)
    }

    fn button_press(&mut self, event: &ButtonEvent) -> WmResult<()> {
        let monitor = self.window_to_monitor(event.window);
        if monitor != self.selmon {
            if let Some(selected) = self.selected() {
                self.unfocus(selected, true)?;
            }
            self.selmon = monitor;
            self.update_monitor_center()?;
            self.focus(None)?;
        }

        let mut click = Click::RootWin;
        let mut tag_arg = None;
        if Some(event.window) == self.monitors[self.selmon].bar_window {
            let hit = self.monitors[self.selmon]
                .bar
                .as_ref()
                .and_then(|bar| bar.hit(event.x));
            match hit {
                Some(BarHit::Tag(index)) => {
                    click = Click::TagBar;
                    tag_arg = Some(Arg::Mask(1 << index));
                }
                Some(BarHit::LayoutSymbol) => click = Click::LtSymbol,
                Some(BarHit::Launcher(index)) => {
                    if let Some(launcher) = self.config.launchers.get(index) {
                        let command = launcher.command.clone();
                        self.spawn(&command);
                    }
                    return Ok(());
                }
                Some(BarHit::Title) => {
                    click = Click::WinTitle;
                    if let Some(selected) = self.selected()
                        && event.button == BUTTON_LEFT
                        && self.clients[selected].is_hidden
                    {
                        self.show_window(selected)?;
                        self.focus(Some(selected))?;
                        return Ok(());
                    }
                }
                Some(BarHit::Status { signal }) => {
                    click = Click::StatusText;
                    self.status_signal = signal.unwrap_or(0);
                }
                None => {}
            }
        } else if let Some(id) = self.window_to_client(event.window) {
            self.focus(Some(id))?;
            self.restack(self.selmon)?;
            self.display.replay_pointer()?;
            click = Click::ClientWin;
        }

        let state = self.display.clean_mask(event.state);
        let bindings: Vec<(KeyAction, Arg)> =
            keyboard::handle_button_press(click, event.button, state, &self.config.buttons)
                .map(|binding| {
                    let arg = match (&tag_arg, &binding.arg) {
                        (Some(tag_arg), Arg::None) => tag_arg.clone(),
                        _ => binding.arg.clone(),
                    };
                    (binding.action, arg)
                })
                .collect();
        for (action, arg) in bindings {
            self.execute(action, &arg)?;
        }
        Ok(())
    }

    /// Follows the pointer across monitors while it moves over the root.
    fn motion_notify(&mut self, window: Window, x: i32, y: i32) -> WmResult<()> {
        if window != self.display.root() {
            return Ok(());
        }
        let monitor = self.rect_to_monitor(&Rect::new(x, y, 1, 1));
        if self.pointer_monitor.is_some_and(|last| last != monitor) {
            if let Some(selected) = self.selected() {
                self.unfocus(selected, true)?;
            }
            self.selmon = monitor;
            self.focus(None)?;
        }
        self.pointer_monitor = Some(monitor);
        Ok(())
    }

    fn enter_notify(&mut self, window: Window) -> WmResult<()> {
        let client = self.window_to_client(window);
        let monitor = match client {
            Some(id) => self.clients[id].monitor,
            None => self.window_to_monitor(window),
        };
        if monitor != self.selmon {
            if let Some(selected) = self.selected() {
                self.unfocus(selected, true)?;
            }
            self.selmon = monitor;
            self.update_monitor_center()?;
        } else if client.is_none() || client == self.selected() {
            return Ok(());
        }
        self.focus(client)
    }

    /// Some clients grab focus on their own; hand it back to the selection.
    fn focus_in(&mut self, window: Window) -> WmResult<()> {
        match self.selected() {
            Some(selected) if self.clients[selected].window() != window => {
                self.set_focus(selected)
            }
            _ => Ok(()),
        }
    }

    fn key_press(&mut self, keysym: Keysym, state: u16) -> WmResult<()> {
        let state = self.display.clean_mask(state);
        let bindings: Vec<(KeyAction, Arg)> = keyboard::handle_key_press(keysym, state, &self.keys)
            .map(|(action, arg)| (action, arg.clone()))
            .collect();
        for (action, arg) in bindings {
            self.execute(action, &arg)?;
        }
        Ok(())
    }
}
