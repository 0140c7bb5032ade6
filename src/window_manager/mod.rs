//! The window manager core: one [`WindowManager`] owns every monitor and
//! client and reacts to display events one at a time.

mod actions;
mod arrange;
mod events;
mod focus;
mod lifecycle;
mod mouse;
mod tagging;

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::Config;
use crate::bar::{Renderer, StatusSignaler, StatusText};
use crate::client::{ClientId, ClientRegistry, Presentation};
use crate::display::{Display, Event, Window, WindowState};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::keyboard::Key;
use crate::monitor::{Monitor, TagSettings};
use crate::process::Processes;
use crate::rules::Rule;
use crate::tags::TagSpace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Running,
    Quit,
    Restart,
}

pub struct WindowManager<D: Display> {
    display: D,
    renderer: Box<dyn Renderer>,
    processes: Box<dyn Processes>,
    config: Config,
    keys: Vec<Key>,
    rules: Vec<Rule>,
    space: TagSpace,
    clients: ClientRegistry,
    monitors: Vec<Monitor>,
    selmon: usize,
    screen: Rect,
    gaps_enabled: bool,
    status: StatusText,
    signaler: StatusSignaler,
    /// Status block under the last click on the status area.
    status_signal: u8,
    /// Monitor the pointer was last seen on while moving over the root.
    pointer_monitor: Option<usize>,
    control: Control,
    /// Events read during a drag that the main loop still has to handle.
    deferred: VecDeque<Event>,
}

impl<D: Display> WindowManager<D> {
    /// Takes over the display: builds monitors and bars, grabs keys and
    /// adopts the windows that already exist.
    pub fn new(
        display: D,
        renderer: Box<dyn Renderer>,
        processes: Box<dyn Processes>,
        config: Config,
    ) -> WmResult<Self> {
        config.validate()?;
        let (width, height) = display.screen_size();
        let mut wm = Self {
            keys: config.all_keys(),
            rules: config.all_rules(),
            space: config.tag_space(),
            gaps_enabled: config.gaps_enabled,
            signaler: StatusSignaler::new(config.status_program.clone()),
            display,
            renderer,
            processes,
            config,
            clients: ClientRegistry::default(),
            monitors: Vec::new(),
            selmon: 0,
            screen: Rect::new(0, 0, width, height),
            status: StatusText::default(),
            status_signal: 0,
            pointer_monitor: None,
            control: Control::Running,
            deferred: VecDeque::new(),
        };

        wm.update_geometry()?;
        wm.update_bars()?;
        wm.update_status()?;
        wm.grab_keys()?;
        wm.focus(None)?;
        wm.scan()?;
        Ok(wm)
    }

    /// Runs the configured autostart commands.
    pub fn autostart(&mut self) {
        for command in self.config.autostart.clone() {
            let argv = vec!["sh".to_string(), "-c".to_string(), command];
            self.spawn(&argv);
        }
    }

    /// Handles events until quit or restart and releases the display.
    /// Returns whether the process should restart itself.
    pub fn run(&mut self) -> WmResult<bool> {
        info!("tagwm started on {} monitor(s)", self.monitors.len());
        self.display.flush()?;

        while self.control == Control::Running {
            let event = match self.deferred.pop_front() {
                Some(event) => event,
                None => self.display.next_event()?,
            };
            if let Err(error) = self.handle_event(event) {
                warn!("event handler failed: {}", error);
            }
            self.display.flush()?;
        }

        let restart = self.control == Control::Restart;
        self.cleanup()?;
        Ok(restart)
    }

    /// Adopts viewable or iconic windows, transients after the rest so
    /// their parents are already managed.
    fn scan(&mut self) -> WmResult<()> {
        let windows = self.display.top_level_windows();
        for transients in [false, true] {
            for &window in &windows {
                let Some(attributes) = self.display.window_attributes(window) else {
                    continue;
                };
                if attributes.override_redirect
                    || self.display.transient_for(window).is_some() != transients
                {
                    continue;
                }
                if attributes.viewable
                    || self.display.window_state(window) == Some(WindowState::Iconic)
                {
                    self.manage(window, attributes)?;
                }
            }
        }
        Ok(())
    }

    fn cleanup(&mut self) -> WmResult<()> {
        self.view(!0)?;
        for monitor in 0..self.monitors.len() {
            while let Some(&id) = self.monitors[monitor].stack.first() {
                self.unmanage(id, false)?;
            }
        }
        for monitor in std::mem::take(&mut self.monitors) {
            if let Some(bar) = monitor.bar_window {
                self.renderer.destroy_bar(bar)?;
            }
        }
        self.display.cleanup()?;
        self.display.flush()?;
        debug!("released the display");
        Ok(())
    }

    fn monitor_defaults(&self) -> TagSettings {
        TagSettings {
            nmaster: self.config.nmaster,
            mfact: self.config.mfact,
            layouts: [0, 1 % self.config.layouts.len()],
            selected_layout: 0,
            show_bar: self.config.show_bar,
        }
    }

    fn selected(&self) -> Option<ClientId> {
        self.monitors.get(self.selmon).and_then(|monitor| monitor.selected)
    }

    /// Managed client showing `window`. Swallowed clients are not found.
    fn window_to_client(&self, window: Window) -> Option<ClientId> {
        self.monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter().copied())
            .find(|&id| self.clients[id].window() == window)
    }

    /// Client currently standing in for its own hidden terminal `window`.
    fn swallowing_client(&self, window: Window) -> Option<ClientId> {
        self.monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter().copied())
            .find(|&id| {
                matches!(self.clients[id].presentation, Presentation::Swallowing { own, .. } if own == window)
            })
    }

    fn window_to_monitor(&self, window: Window) -> usize {
        if window == self.display.root()
            && let Some((x, y)) = self.display.pointer_position()
        {
            return self.rect_to_monitor(&Rect::new(x, y, 1, 1));
        }
        if let Some(monitor) = self
            .monitors
            .iter()
            .position(|monitor| monitor.bar_window == Some(window))
        {
            return monitor;
        }
        self.window_to_client(window)
            .map_or(self.selmon, |id| self.clients[id].monitor)
    }

    fn rect_to_monitor(&self, rect: &Rect) -> usize {
        crate::monitor::rect_to_monitor(&self.monitors, rect, self.selmon)
    }

    /// On one of the active tags of its monitor, or sticky.
    fn is_visible(&self, id: ClientId) -> bool {
        let client = &self.clients[id];
        client.is_sticky || client.tags & self.monitors[client.monitor].view() != 0
    }

    /// Visible and not iconified.
    fn is_shown(&self, id: ClientId) -> bool {
        self.is_visible(id) && !self.clients[id].is_hidden
    }

    fn update_client_list(&mut self) -> WmResult<()> {
        let windows: Vec<Window> = self
            .monitors
            .iter()
            .flat_map(|monitor| monitor.clients.iter())
            .map(|&id| self.clients[id].window())
            .collect();
        self.display.set_client_list(&windows)
    }

    fn update_monitor_center(&mut self) -> WmResult<()> {
        let (x, y) = self.monitors[self.selmon].screen.center();
        self.display.set_monitor_center(x, y)
    }

    fn update_status(&mut self) -> WmResult<()> {
        self.status = match self.display.root_name() {
            Some(name) => StatusText::parse(&name),
            None => StatusText::default(),
        };
        self.draw_bar(self.selmon)
    }

    fn spawn(&self, argv: &[String]) {
        let monitor = self.monitors.get(self.selmon).map_or(0, |monitor| monitor.num);
        let argv: Vec<String> = argv
            .iter()
            .map(|part| part.replace("{monitor}", &monitor.to_string()))
            .collect();
        if let Err(error) = self.processes.spawn(&argv) {
            warn!("failed to spawn {:?}: {}", argv, error);
        }
    }
}

#[cfg(test)]
mod tests;
