use tracing::{debug, info};

use super::WindowManager;
use crate::client::{Client, ClientId, Presentation};
use crate::display::{Display, Protocol, Window, WindowAttributes, WindowState};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::monitor::{Monitor, unique_geometries};
use crate::rules::{self, WindowIdentity};

const HIDDEN_PREFIX: &str = "[HIDDEN]";

impl<D: Display> WindowManager<D> {
    /// Starts managing `window`: reads its properties, applies rules, places
    /// it and lets a launching terminal swallow it.
    pub(super) fn manage(&mut self, window: Window, attributes: WindowAttributes) -> WmResult<()> {
        let mut client = Client::new(
            window,
            attributes.geometry,
            attributes.border_width,
            self.selmon,
        );
        client.pid = self.display.window_pid(window);
        client.is_hidden = self.display.window_state(window) == Some(WindowState::Iconic);
        let id = self.clients.insert(client);
        self.update_icon(id);
        self.update_title(id);
        self.update_size_hints(id);
        self.update_wm_hints(id)?;

        let transient_for = self.display.transient_for(window);
        let parent = transient_for.and_then(|parent| self.window_to_client(parent));
        let mut terminal = None;
        if let Some(parent) = parent {
            let (monitor, tags) = (self.clients[parent].monitor, self.clients[parent].tags);
            let client = &mut self.clients[id];
            client.monitor = monitor;
            client.tags = tags;
        } else {
            self.apply_rules(id);
            terminal = self.terminal_for(id);
        }
        self.update_window_type(id)?;

        if let Some((tags, monitor_num)) = self.display.saved_desktop(window) {
            let tags = tags & self.space.all();
            let monitor = self.monitors.iter().position(|monitor| monitor.num == monitor_num);
            let client = &mut self.clients[id];
            if tags != 0 {
                client.tags = tags;
            }
            if let Some(monitor) = monitor {
                client.monitor = monitor;
            }
        }
        self.publish_desktop(id)?;
        self.place_new_client(id);

        let border_width = if self.clients[id].is_fullscreen {
            0
        } else {
            self.config.border_width as i32
        };
        self.clients[id].border_width = border_width;
        self.display.set_border_width(window, border_width)?;
        self.display
            .set_border_color(window, self.config.schemes.normal.border)?;
        self.send_configure(id)?;
        self.display.select_client_events(window)?;
        self.grab_buttons(id, false)?;

        let client = &mut self.clients[id];
        if !client.is_floating {
            client.is_floating = transient_for.is_some() || client.is_fixed;
            client.old_state = client.is_floating;
        }
        if client.is_floating {
            self.display.raise_window(window)?;
        }

        let monitor = self.clients[id].monitor;
        self.monitors[monitor].attach(id);
        self.monitors[monitor].attach_stack(id);
        self.update_client_list()?;

        // Park off-screen until the first arrange puts it in place.
        let client = &self.clients[id];
        let parked = Rect {
            x: client.geometry.x + 2 * self.screen.width,
            ..client.geometry
        };
        self.display
            .configure_window(window, parked, client.border_width)?;
        let hidden = client.is_hidden;
        if !hidden {
            self.display.set_window_state(window, WindowState::Normal)?;
        }
        debug!("managing window {} on monitor {}", window, monitor);

        if let Some(selected) = self.monitors[monitor].selected
            && self.clients[selected].is_fullscreen
        {
            self.display.map_window(window)?;
            return Ok(());
        }

        if monitor == self.selmon
            && let Some(selected) = self.selected()
        {
            self.unfocus(selected, false)?;
        }
        self.monitors[monitor].selected = Some(id);
        if !hidden {
            self.arrange(Some(monitor))?;
            self.display.map_window(window)?;
            if let Some(terminal) = terminal {
                self.swallow(terminal, id)?;
            }
        }
        self.focus(None)
    }

    fn apply_rules(&mut self, id: ClientId) {
        let window = self.clients[id].window();
        let (class, instance) = match self.display.class_hint(window) {
            Some(hint) => (Some(hint.class), Some(hint.instance)),
            None => (None, None),
        };
        let identity = WindowIdentity::new(class, instance, &self.clients[id].name);
        let outcome = rules::apply_rules(
            &self.rules,
            &identity,
            self.space.scratch_mask(),
            self.monitors.len(),
        );

        let client = &mut self.clients[id];
        client.is_steam = outcome.is_steam;
        client.is_centered = outcome.is_centered;
        client.is_terminal = outcome.is_terminal;
        client.is_floating = outcome.is_floating;
        client.no_swallow = outcome.no_swallow;
        client.managed_size = outcome.managed_size;
        if let Some(monitor) = outcome.monitor {
            client.monitor = monitor;
        }

        let monitor = &self.monitors[client.monitor];
        if outcome.managed_size {
            client.geometry.width = monitor.area.width / 2;
            client.geometry.height = monitor.area.height / 2;
        }
        if outcome.center_on_monitor {
            client.geometry.x = monitor.area.x + monitor.area.width / 2 - client.width_with_border() / 2;
            client.geometry.y = monitor.area.y + monitor.area.height / 2 - client.height_with_border() / 2;
        }
        let fallback = match monitor.view() & !self.space.scratch_mask() {
            0 => 1,
            view => view,
        };
        client.tags = outcome.resolve_tags(self.space.all(), fallback);
    }

    /// Keeps a new client inside its monitor, or centers it in the usable
    /// area when a rule or its window type asks for that.
    fn place_new_client(&mut self, id: ClientId) {
        let bar_height = self.renderer.bar_height();
        let client = &mut self.clients[id];
        let monitor = &self.monitors[client.monitor];
        let (screen, area) = (monitor.screen, monitor.area);

        if client.is_centered {
            client.geometry.x = area.x + (area.width - client.width_with_border()) / 2;
            client.geometry.y = area.y + (area.height - client.height_with_border()) / 2;
            return;
        }
        if client.geometry.x + client.width_with_border() > screen.right() {
            client.geometry.x = screen.right() - client.width_with_border();
        }
        if client.geometry.y + client.height_with_border() > screen.bottom() {
            client.geometry.y = screen.bottom() - client.height_with_border();
        }
        client.geometry.x = client.geometry.x.max(screen.x);
        let center_x = client.geometry.x + client.geometry.width / 2;
        let covers_bar = monitor.bar_y == screen.y && center_x >= area.x && center_x < area.right();
        let top = if covers_bar { bar_height } else { screen.y };
        client.geometry.y = client.geometry.y.max(top);
    }

    /// The terminal that started the process owning the new client, if any.
    fn terminal_for(&self, id: ClientId) -> Option<ClientId> {
        let client = &self.clients[id];
        if client.is_terminal || client.pid == 0 {
            return None;
        }
        self.monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter().copied())
            .find(|&other| {
                let terminal = &self.clients[other];
                other != id
                    && terminal.is_terminal
                    && !terminal.is_swallowing()
                    && terminal.pid != 0
                    && self.processes.is_descendant(terminal.pid, client.pid)
            })
    }

    /// Shows `child` in place of `terminal`. The child's record is detached
    /// and kept until it goes away.
    pub(super) fn swallow(&mut self, terminal: ClientId, child: ClientId) -> WmResult<()> {
        let candidate = &self.clients[child];
        if candidate.no_swallow
            || candidate.is_terminal
            || (!self.config.swallow_floating && candidate.is_floating)
        {
            return Ok(());
        }

        let monitor = candidate.monitor;
        let visible = candidate.window();
        self.monitors[monitor].detach(child);
        self.detach_stack(child);

        let own = self.clients[terminal].window();
        self.display.unmap_window(own)?;
        self.display.set_window_state(own, WindowState::Withdrawn)?;

        let terminal_monitor = self.clients[terminal].monitor;
        self.clients[child].monitor = terminal_monitor;
        self.clients[terminal].presentation = Presentation::Swallowing {
            visible,
            own,
            swallowed: child,
        };
        self.update_icon(terminal);
        self.update_title(terminal);

        let (geometry, border_width) = (
            self.clients[terminal].geometry,
            self.clients[terminal].border_width,
        );
        self.display.set_border_width(visible, border_width)?;
        self.display.configure_window(visible, geometry, border_width)?;
        self.arrange(Some(terminal_monitor))?;
        self.send_configure(terminal)?;
        self.update_client_list()?;
        info!("terminal window {} swallowed window {}", own, visible);
        Ok(())
    }

    /// Brings back the terminal's own window after its swallowed child went
    /// away.
    pub(super) fn unswallow(&mut self, terminal: ClientId) -> WmResult<()> {
        let Presentation::Swallowing { own, swallowed, .. } = self.clients[terminal].presentation
        else {
            return Ok(());
        };
        self.clients[terminal].presentation = Presentation::Own(own);
        self.clients.remove(swallowed);

        self.set_fullscreen(terminal, false)?;
        self.update_title(terminal);
        self.update_icon(terminal);

        let monitor = self.clients[terminal].monitor;
        self.arrange(Some(monitor))?;
        let (geometry, border_width) = (
            self.clients[terminal].geometry,
            self.clients[terminal].border_width,
        );
        self.display.map_window(own)?;
        self.display.configure_window(own, geometry, border_width)?;
        self.send_configure(terminal)?;
        self.display.set_window_state(own, WindowState::Normal)?;
        self.focus(None)?;
        self.arrange(Some(monitor))?;
        self.update_client_list()?;
        info!("terminal window {} restored", own);
        Ok(())
    }

    /// The terminal's hidden window died while it was swallowing: the
    /// visible child becomes a plain client again.
    pub(super) fn release_swallowed(&mut self, terminal: ClientId) -> WmResult<()> {
        let Presentation::Swallowing { visible, swallowed, .. } =
            self.clients[terminal].presentation
        else {
            return Ok(());
        };
        let child = self.clients.remove(swallowed);
        let client = &mut self.clients[terminal];
        if let Some(child) = child {
            client.pid = child.pid;
            client.is_terminal = child.is_terminal;
            client.no_swallow = child.no_swallow;
        }
        client.presentation = Presentation::Own(visible);

        let monitor = client.monitor;
        self.arrange(Some(monitor))?;
        self.focus(None)?;
        self.update_client_list()
    }

    /// Stops managing `id`. Unless the window is already gone its border
    /// and state are restored.
    pub(super) fn unmanage(&mut self, id: ClientId, destroyed: bool) -> WmResult<()> {
        if self.clients[id].is_swallowing() {
            return self.unswallow(id);
        }

        let client = &self.clients[id];
        let (monitor, window, old_border_width) =
            (client.monitor, client.window(), client.old_border_width);
        self.monitors[monitor].detach(id);
        self.detach_stack(id);
        if !destroyed {
            self.display.set_border_width(window, old_border_width)?;
            self.display.ungrab_buttons(window)?;
            self.display
                .set_window_state(window, WindowState::Withdrawn)?;
        }
        self.clients.remove(id);
        debug!("unmanaged window {}", window);

        self.arrange(Some(monitor))?;
        self.focus(None)?;
        self.update_client_list()
    }

    pub(super) fn update_title(&mut self, id: ClientId) {
        let title = self.display.title(self.clients[id].window());
        self.clients[id].set_name(title);
    }

    pub(super) fn update_icon(&mut self, id: ClientId) {
        let size = self.renderer.icon_size().max(0) as u32;
        self.clients[id].icon = self.display.icon(self.clients[id].window(), size);
    }

    pub(super) fn update_size_hints(&mut self, id: ClientId) {
        let hints = self
            .display
            .size_hints(self.clients[id].window())
            .unwrap_or_default();
        let client = &mut self.clients[id];
        client.is_fixed = hints.is_fixed();
        client.hints = hints;
    }

    pub(super) fn update_wm_hints(&mut self, id: ClientId) -> WmResult<()> {
        let window = self.clients[id].window();
        let Some(hints) = self.display.wm_hints(window) else {
            return Ok(());
        };
        if self.selected() == Some(id) && hints.urgent {
            self.display.set_urgency_hint(window, false)?;
        } else {
            self.clients[id].is_urgent = hints.urgent;
        }
        self.clients[id].never_focus = hints.input.is_some_and(|input| !input);
        Ok(())
    }

    pub(super) fn update_window_type(&mut self, id: ClientId) -> WmResult<()> {
        let window = self.clients[id].window();
        if self.display.wants_fullscreen(window) {
            self.set_fullscreen(id, true)?;
        }
        if self.display.is_dialog(window) {
            let client = &mut self.clients[id];
            client.is_centered = true;
            client.is_floating = true;
        }
        Ok(())
    }

    pub(super) fn set_fullscreen(&mut self, id: ClientId, fullscreen: bool) -> WmResult<()> {
        let client = &mut self.clients[id];
        let window = client.window();
        if fullscreen && !client.is_fullscreen {
            self.display.set_fullscreen_state(window, true)?;
            client.is_fullscreen = true;
            client.old_state = client.is_floating;
            client.old_border_width = client.border_width;
            client.border_width = 0;
            client.is_floating = true;
            let screen = self.monitors[client.monitor].screen;
            self.resize_client(id, screen)?;
            self.display.raise_window(window)?;
        } else if !fullscreen && client.is_fullscreen {
            self.display.set_fullscreen_state(window, false)?;
            client.is_fullscreen = false;
            client.is_floating = client.old_state;
            client.border_width = client.old_border_width;
            let (monitor, restored) = (client.monitor, client.old_geometry);
            self.resize_client(id, restored)?;
            self.arrange(Some(monitor))?;
        }
        Ok(())
    }

    /// Iconifies a client and marks its title.
    pub(super) fn hide_window(&mut self, id: ClientId) -> WmResult<()> {
        if self.clients[id].is_hidden {
            return Ok(());
        }
        let window = self.clients[id].window();
        let name = format!("{}{}", HIDDEN_PREFIX, self.clients[id].name);
        self.display.set_window_name(window, &name)?;
        self.display.unmap_quietly(window)?;
        self.display.set_window_state(window, WindowState::Iconic)?;
        let client = &mut self.clients[id];
        client.name = name;
        client.is_hidden = true;
        Ok(())
    }

    pub(super) fn show_window(&mut self, id: ClientId) -> WmResult<()> {
        if !self.clients[id].is_hidden {
            return Ok(());
        }
        let window = self.clients[id].window();
        self.display.map_window(window)?;
        self.display.set_window_state(window, WindowState::Normal)?;
        let name = self.clients[id].name.clone();
        let name = name.strip_prefix(HIDDEN_PREFIX).unwrap_or(&name).to_string();
        self.display.set_window_name(window, &name)?;
        let client = &mut self.clients[id];
        client.name = name;
        client.is_hidden = false;
        let monitor = client.monitor;
        self.arrange(Some(monitor))
    }

    /// Asks the selected client to close, killing it if it does not speak
    /// WM_DELETE_WINDOW.
    pub(super) fn kill_client(&mut self) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let window = self.clients[selected].window();
        if !self.display.send_protocol(window, Protocol::DeleteWindow)? {
            self.display.kill_client(window)?;
        }
        Ok(())
    }

    /// Matches monitors to the current screens. Returns whether anything
    /// changed.
    pub(super) fn update_geometry(&mut self) -> WmResult<bool> {
        let mut screens = unique_geometries(&self.display.screens()?);
        if screens.is_empty() {
            screens.push(self.screen);
        }
        let mut dirty = false;

        while self.monitors.len() > screens.len() {
            let Some(removed) = self.monitors.pop() else {
                break;
            };
            dirty = true;
            for &id in removed.clients.iter().rev() {
                self.clients[id].monitor = 0;
                self.monitors[0].attach(id);
                self.monitors[0].attach_stack(id);
                if let Some(child) = self.clients[id].swallowed() {
                    self.clients[child].monitor = 0;
                }
            }
            if let Some(bar) = removed.bar_window {
                self.renderer.destroy_bar(bar)?;
            }
            if self.selmon >= self.monitors.len() {
                self.selmon = 0;
            }
            info!("removed monitor {}", removed.num);
        }

        let known = self.monitors.len();
        for (index, &screen) in screens.iter().enumerate() {
            if index >= known {
                let monitor = Monitor::new(
                    index,
                    screen,
                    self.monitor_defaults(),
                    self.config.top_bar,
                    self.config.gaps,
                    &self.space,
                );
                self.monitors.push(monitor);
                info!("added monitor {} at {:?}", index, screen);
            } else if self.monitors[index].screen != screen {
                self.monitors[index].num = index;
                self.monitors[index].screen = screen;
            } else {
                continue;
            }
            dirty = true;
            self.place_bar(index)?;
        }

        if dirty {
            self.selmon = 0;
            self.selmon = self.window_to_monitor(self.display.root());
        }
        Ok(dirty)
    }

    /// The root window changed size: refit monitors, bars and fullscreen
    /// clients.
    pub(super) fn root_configured(&mut self, width: i32, height: i32) -> WmResult<()> {
        let resized = self.screen.width != width || self.screen.height != height;
        self.screen = Rect::new(0, 0, width, height);
        if !self.update_geometry()? && !resized {
            return Ok(());
        }

        self.update_bars()?;
        for monitor in 0..self.monitors.len() {
            let screen = self.monitors[monitor].screen;
            for id in self.monitors[monitor].clients.clone() {
                if self.clients[id].is_fullscreen {
                    self.resize_client(id, screen)?;
                }
            }
            if let Some(bar) = self.monitors[monitor].bar_window {
                self.renderer.move_bar(bar, self.bar_rect(monitor))?;
            }
        }
        self.focus(None)?;
        self.arrange(None)
    }
}
