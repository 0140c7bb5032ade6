use tracing::debug;

use super::WindowManager;
use crate::bar::{BarInput, BarModel, TitleInput};
use crate::client::{ClientId, HintContext, apply_size_hints};
use crate::display::{Display, Window};
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::keyboard::Arg;
use crate::layout::LayoutInput;
use crate::process;

impl<D: Display> WindowManager<D> {
    /// Shows and hides clients, re-tiles and restacks `monitor`, or every
    /// monitor when `None`.
    pub(super) fn arrange(&mut self, monitor: Option<usize>) -> WmResult<()> {
        match monitor {
            Some(monitor) => {
                self.display
                    .set_current_desktop(self.monitors[monitor].view())?;
                self.show_hide(monitor)?;
                self.arrange_monitor(monitor)?;
                self.restack(monitor)
            }
            None => {
                for monitor in 0..self.monitors.len() {
                    self.show_hide(monitor)?;
                }
                for monitor in 0..self.monitors.len() {
                    self.arrange_monitor(monitor)?;
                }
                self.draw_bars()
            }
        }
    }

    pub(super) fn layout_arranges(&self, monitor: usize) -> bool {
        self.config.layouts[self.monitors[monitor].layout()]
            .kind
            .arranges()
    }

    /// Visible, non-floating, non-hidden clients in tiling order.
    pub(super) fn tiled(&self, monitor: usize) -> Vec<ClientId> {
        self.monitors[monitor]
            .clients
            .iter()
            .copied()
            .filter(|&id| !self.clients[id].is_floating && self.is_shown(id))
            .collect()
    }

    fn arrange_monitor(&mut self, monitor: usize) -> WmResult<()> {
        let entry = &self.config.layouts[self.monitors[monitor].layout()];
        let kind = entry.kind;
        self.monitors[monitor].layout_symbol = entry.symbol.clone();
        if !kind.arranges() {
            return Ok(());
        }

        let tiled = self.tiled(monitor);
        let borders: Vec<i32> = tiled
            .iter()
            .map(|&id| self.clients[id].border_width)
            .collect();
        let current = &self.monitors[monitor];
        let input = LayoutInput {
            area: current.area,
            borders: &borders,
            nmaster: current.nmaster,
            mfact: current.mfact,
            gaps: current
                .gaps
                .effective(self.gaps_enabled, self.config.smart_gaps, tiled.len()),
            min_split: self.renderer.bar_height(),
        };
        let arrangement = kind.layout().arrange(&input);

        if let Some(symbol) = arrangement.symbol {
            self.monitors[monitor].layout_symbol = symbol;
        }
        for (id, geometry) in tiled.into_iter().zip(arrangement.geometries) {
            self.resize(id, geometry, false)?;
        }
        Ok(())
    }

    /// Moves visible clients into place top-down and parks the rest above
    /// the screen bottom-up.
    fn show_hide(&mut self, monitor: usize) -> WmResult<()> {
        let stack = self.monitors[monitor].stack.clone();
        let arranges = self.layout_arranges(monitor);
        let area = self.monitors[monitor].area;
        let scratch = self.space.scratch_mask();

        for &id in &stack {
            if !self.is_shown(id) {
                continue;
            }
            let client = &mut self.clients[id];
            if client.tags & scratch != 0 && client.is_floating {
                client.geometry.x = area.x + area.width / 2 - client.width_with_border() / 2;
                client.geometry.y = area.y + area.height / 2 - client.height_with_border() / 2;
            }
            let (window, geometry) = (client.window(), client.geometry);
            self.display.move_window(window, geometry.x, geometry.y)?;
            let client = &self.clients[id];
            if (!arranges || client.is_floating) && !client.is_fullscreen {
                self.resize(id, geometry, false)?;
            }
        }

        for &id in stack.iter().rev() {
            if self.is_shown(id) {
                continue;
            }
            let client = &self.clients[id];
            let x = area.x + area.width / 2 - client.width_with_border() / 2;
            let y = -(client.height_with_border() * 3) / 2;
            self.display.move_window(client.window(), x, y)?;
        }
        Ok(())
    }

    /// Applies size hints and resizes only when the result differs from the
    /// current geometry.
    pub(super) fn resize(&mut self, id: ClientId, requested: Rect, interactive: bool) -> WmResult<()> {
        let client = &self.clients[id];
        let monitor = client.monitor;
        let context = HintContext {
            screen: self.screen,
            area: self.monitors[monitor].area,
            bar_height: self.renderer.bar_height(),
            interactive,
            respect_hints: self.config.resize_hints
                || client.is_floating
                || !self.layout_arranges(monitor),
        };
        let geometry = apply_size_hints(
            &client.hints,
            client.geometry,
            client.border_width,
            requested,
            &context,
        );
        if geometry != client.geometry {
            self.resize_client(id, geometry)?;
        }
        Ok(())
    }

    pub(super) fn resize_client(&mut self, id: ClientId, geometry: Rect) -> WmResult<()> {
        let client = &mut self.clients[id];
        client.old_geometry = client.geometry;
        client.geometry = geometry;
        let (window, border_width) = (client.window(), client.border_width);
        self.display.configure_window(window, geometry, border_width)?;
        self.display
            .send_configure_notify(window, geometry, border_width)
    }

    /// Tells a client where it is without moving it.
    pub(super) fn send_configure(&mut self, id: ClientId) -> WmResult<()> {
        let client = &self.clients[id];
        self.display
            .send_configure_notify(client.window(), client.geometry, client.border_width)
    }

    /// Raises the selection if it floats and chains the tiled clients below
    /// the bar in focus order.
    pub(super) fn restack(&mut self, monitor: usize) -> WmResult<()> {
        self.draw_bar(monitor)?;
        let Some(selected) = self.monitors[monitor].selected else {
            return Ok(());
        };
        let arranges = self.layout_arranges(monitor);
        if self.clients[selected].is_floating || !arranges {
            self.display.raise_window(self.clients[selected].window())?;
        }
        if arranges && let Some(bar) = self.monitors[monitor].bar_window {
            let windows: Vec<Window> = self.monitors[monitor]
                .stack
                .iter()
                .copied()
                .filter(|&id| !self.clients[id].is_floating && self.is_shown(id))
                .map(|id| self.clients[id].window())
                .collect();
            self.display.stack_below(bar, &windows)?;
        }
        self.display.discard_enter_events()
    }

    pub(super) fn bar_rect(&self, monitor: usize) -> Rect {
        let current = &self.monitors[monitor];
        let (padding_x, _) = self.config.bar_padding;
        Rect::new(
            current.screen.x + padding_x,
            current.bar_y,
            current.screen.width - 2 * padding_x,
            self.renderer.bar_height(),
        )
    }

    /// Creates bars for monitors that have none yet.
    pub(super) fn update_bars(&mut self) -> WmResult<()> {
        for monitor in 0..self.monitors.len() {
            if self.monitors[monitor].bar_window.is_none() {
                let bar = self.renderer.create_bar(self.bar_rect(monitor))?;
                self.monitors[monitor].bar_window = Some(bar);
            }
        }
        Ok(())
    }

    /// Recomputes the usable area and moves the bar with it.
    pub(super) fn place_bar(&mut self, monitor: usize) -> WmResult<()> {
        let (_, padding_y) = self.config.bar_padding;
        let bar_height = self.renderer.bar_height();
        self.monitors[monitor].update_bar_position(bar_height, padding_y);
        if let Some(bar) = self.monitors[monitor].bar_window {
            self.renderer.move_bar(bar, self.bar_rect(monitor))?;
        }
        Ok(())
    }

    pub(super) fn draw_bars(&mut self) -> WmResult<()> {
        for monitor in 0..self.monitors.len() {
            self.draw_bar(monitor)?;
        }
        Ok(())
    }

    pub(super) fn draw_bar(&mut self, monitor: usize) -> WmResult<()> {
        let Some(current) = self.monitors.get(monitor) else {
            return Ok(());
        };
        let Some(bar) = current.bar_window else {
            return Ok(());
        };

        let ordinary = self.space.ordinary();
        let (mut occupied, mut urgent) = (0, 0);
        for &id in &current.clients {
            let client = &self.clients[id];
            // clients on every tag would light up the whole bar
            if client.tags & ordinary != ordinary {
                occupied |= client.tags;
            }
            if client.is_urgent {
                urgent |= client.tags;
            }
        }

        let is_selected = monitor == self.selmon;
        let title = current
            .selected
            .filter(|_| is_selected)
            .map(|id| &self.clients[id])
            .map(|client| TitleInput {
                name: &client.name,
                floating: client.is_floating,
                fixed: client.is_fixed,
                hidden: client.is_hidden,
                icon: client.icon.as_ref(),
            });
        let launchers: Vec<String> = self
            .config
            .launchers
            .iter()
            .map(|launcher| launcher.name.clone())
            .collect();
        let input = BarInput {
            width: self.bar_rect(monitor).width,
            tags: &self.config.tags,
            view: current.view(),
            occupied,
            urgent,
            layout_symbol: &current.layout_symbol,
            launchers: &launchers,
            title,
            status: is_selected.then_some(&self.status),
        };
        let model = BarModel::build(&input, self.renderer.as_ref());

        self.renderer.draw_bar(bar, &model)?;
        self.monitors[monitor].bar = Some(model);
        Ok(())
    }

    pub(super) fn toggle_bar(&mut self) -> WmResult<()> {
        let monitor = self.selmon;
        let show = !self.monitors[monitor].show_bar;
        self.monitors[monitor].set_show_bar(show);
        self.place_bar(monitor)?;
        self.arrange(Some(monitor))
    }

    /// Catalog index named by a layout argument: a position or a layout
    /// name. Anything else selects the other layout slot.
    pub(super) fn layout_index(&self, arg: &Arg) -> Option<usize> {
        match arg {
            Arg::Int(index) => usize::try_from(*index)
                .ok()
                .filter(|&index| index < self.config.layouts.len()),
            Arg::Str(name) => self
                .config
                .layouts
                .iter()
                .position(|entry| entry.kind.as_str() == name),
            _ => None,
        }
    }

    pub(super) fn set_layout(&mut self, layout: Option<usize>) -> WmResult<()> {
        let monitor = self.selmon;
        self.monitors[monitor].set_layout(layout);
        let symbol = self.config.layouts[self.monitors[monitor].layout()]
            .symbol
            .clone();
        self.monitors[monitor].layout_symbol = symbol;
        if self.monitors[monitor].selected.is_some() {
            self.arrange(Some(monitor))
        } else {
            self.draw_bar(monitor)
        }
    }

    pub(super) fn cycle_layout(&mut self, direction: i32) -> WmResult<()> {
        let count = self.config.layouts.len();
        let current = self.monitors[self.selmon].layout();
        let next = if direction > 0 {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        self.set_layout(Some(next))
    }

    /// Asks the layout menu helper for a catalog index.
    pub(super) fn layout_menu(&mut self) -> WmResult<()> {
        let output = process::read_command(&self.config.layout_menu_command)?;
        let choice = output.trim();
        if choice.is_empty() {
            return Ok(());
        }
        match choice.parse::<usize>() {
            Ok(index) if index < self.config.layouts.len() => self.set_layout(Some(index)),
            _ => {
                debug!("layout menu returned {:?}", choice);
                Ok(())
            }
        }
    }

    /// Values below 1.0 adjust the master factor, larger ones set it to
    /// `value - 1.0`.
    pub(super) fn set_mfact(&mut self, value: f32) -> WmResult<()> {
        let monitor = self.selmon;
        if !self.layout_arranges(monitor) {
            return Ok(());
        }
        let mfact = if value < 1.0 {
            value + self.monitors[monitor].mfact
        } else {
            value - 1.0
        };
        if !(0.05..=0.95).contains(&mfact) {
            return Ok(());
        }
        self.monitors[monitor].set_mfact(mfact);
        self.arrange(Some(monitor))
    }

    pub(super) fn inc_nmaster(&mut self, delta: i32) -> WmResult<()> {
        let monitor = self.selmon;
        let nmaster = (self.monitors[monitor].nmaster + delta).max(0);
        self.monitors[monitor].set_nmaster(nmaster);
        self.arrange(Some(monitor))
    }

    pub(super) fn inc_gaps(&mut self, delta: i32) -> WmResult<()> {
        let monitor = self.selmon;
        self.monitors[monitor].gaps = self.monitors[monitor].gaps.grown(delta);
        self.arrange(Some(monitor))
    }

    pub(super) fn toggle_gaps(&mut self) -> WmResult<()> {
        self.gaps_enabled = !self.gaps_enabled;
        self.arrange(Some(self.selmon))
    }

    pub(super) fn default_gaps(&mut self) -> WmResult<()> {
        let monitor = self.selmon;
        self.monitors[monitor].gaps = self.config.gaps;
        self.arrange(Some(monitor))
    }
}
