use super::WindowManager;
use crate::client::ClientId;
use crate::display::{Display, Protocol, WindowState};
use crate::errors::WmResult;
use crate::keyboard::Click;

impl<D: Display> WindowManager<D> {
    /// Gives input focus to `target`, or to the top of the focus stack when
    /// `target` is absent or not on a visible tag.
    pub(super) fn focus(&mut self, target: Option<ClientId>) -> WmResult<()> {
        let mut target = target.filter(|&id| self.is_visible(id));
        if target.is_none() {
            let prefer_unsticky = !self
                .selected()
                .is_some_and(|id| self.clients[id].is_sticky);
            let stack = &self.monitors[self.selmon].stack;
            target = stack
                .iter()
                .copied()
                .find(|&id| self.is_shown(id) && !(prefer_unsticky && self.clients[id].is_sticky))
                .or_else(|| stack.iter().copied().find(|&id| self.is_shown(id)));
        }

        if let Some(previous) = self.selected()
            && Some(previous) != target
        {
            self.unfocus(previous, false)?;
        }

        if let Some(id) = target {
            let monitor = self.clients[id].monitor;
            self.selmon = monitor;
            if self.clients[id].is_urgent {
                self.set_urgent(id, false)?;
            }
            self.monitors[monitor].detach_stack(id);
            self.monitors[monitor].attach_stack(id);
            self.grab_buttons(id, true)?;
            let border = self.config.schemes.selected.border;
            self.display
                .set_border_color(self.clients[id].window(), border)?;
            self.set_focus(id)?;
        } else {
            self.display.focus_root()?;
            self.display.set_active_window(None)?;
        }

        self.monitors[self.selmon].selected = target;
        self.update_monitor_center()?;
        self.draw_bars()
    }

    pub(super) fn unfocus(&mut self, id: ClientId, set_focus: bool) -> WmResult<()> {
        self.grab_buttons(id, false)?;
        let border = self.config.schemes.normal.border;
        self.display
            .set_border_color(self.clients[id].window(), border)?;
        if set_focus {
            self.display.focus_root()?;
            self.display.set_active_window(None)?;
        }
        Ok(())
    }

    pub(super) fn set_focus(&mut self, id: ClientId) -> WmResult<()> {
        let client = &self.clients[id];
        let window = client.window();
        if !client.never_focus {
            self.display.set_input_focus(window)?;
            self.display.set_active_window(Some(window))?;
        }
        // Steam windows drop their own WM_STATE when they lose focus.
        if client.is_steam {
            self.display.set_window_state(window, WindowState::Normal)?;
        }
        self.display.send_protocol(window, Protocol::TakeFocus)?;
        Ok(())
    }

    pub(super) fn set_urgent(&mut self, id: ClientId, urgent: bool) -> WmResult<()> {
        self.clients[id].is_urgent = urgent;
        self.display
            .set_urgency_hint(self.clients[id].window(), urgent)
    }

    /// Unfocused clients get every button so a click can focus them,
    /// focused ones only the configured client bindings.
    pub(super) fn grab_buttons(&mut self, id: ClientId, focused: bool) -> WmResult<()> {
        let buttons: Vec<(u16, u8)> = self
            .config
            .buttons
            .iter()
            .filter(|binding| binding.click == Click::ClientWin)
            .map(|binding| (binding.mask(), binding.button))
            .collect();
        self.display
            .grab_buttons(self.clients[id].window(), focused, &buttons)
    }

    pub(super) fn grab_keys(&mut self) -> WmResult<()> {
        let keys: Vec<_> = self
            .keys
            .iter()
            .map(|key| (key.mask(), key.keysym))
            .collect();
        self.display.grab_keys(&keys)
    }

    /// Removes `id` from its monitor's focus stack and picks a new
    /// selection if it was the selected client.
    pub(super) fn detach_stack(&mut self, id: ClientId) {
        let monitor = self.clients[id].monitor;
        self.monitors[monitor].detach_stack(id);
        if self.monitors[monitor].selected == Some(id) {
            let next = self.monitors[monitor]
                .stack
                .iter()
                .copied()
                .find(|&other| self.is_visible(other));
            self.monitors[monitor].selected = next;
        }
    }

    pub(super) fn focus_stack(&mut self, step: i32) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let clients = self.monitors[self.selmon].clients.clone();
        let Some(position) = clients.iter().position(|&id| id == selected) else {
            return Ok(());
        };

        let shown = |id: &&ClientId| self.is_shown(**id);
        let target = if step > 0 {
            clients[position + 1..]
                .iter()
                .find(shown)
                .or_else(|| clients.iter().find(shown))
        } else {
            clients[..position]
                .iter()
                .rev()
                .find(shown)
                .or_else(|| clients[position..].iter().rev().find(shown))
        };
        let Some(&target) = target else {
            return Ok(());
        };

        self.focus(Some(target))?;
        self.restack(self.selmon)?;
        let geometry = self.clients[target].geometry;
        self.display.warp_pointer(
            self.clients[target].window(),
            geometry.width / 2,
            geometry.height / 2,
        )
    }

    /// Moves the selection within the client list. Zero moves it to the
    /// head, other values move it relative to its position among visible
    /// clients, wrapping around.
    pub(super) fn push_stack(&mut self, offset: i32) -> WmResult<()> {
        let monitor = self.selmon;
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let clients = self.monitors[monitor].clients.clone();

        let position = if offset == 0 {
            0
        } else {
            let visible: Vec<ClientId> = clients
                .iter()
                .copied()
                .filter(|&id| self.is_visible(id))
                .collect();
            let Some(current) = visible.iter().position(|&id| id == selected) else {
                return Ok(());
            };
            (current as i32 + offset).rem_euclid(visible.len() as i32) as usize
        };

        if position == 0 {
            self.monitors[monitor].detach(selected);
            self.monitors[monitor].attach(selected);
        } else {
            let mut remaining = position;
            let mut anchor = clients.last().copied();
            for &id in &clients {
                if id != selected && self.is_visible(id) {
                    remaining -= 1;
                    if remaining == 0 {
                        anchor = Some(id);
                        break;
                    }
                }
            }
            let Some(anchor) = anchor.filter(|&anchor| anchor != selected) else {
                return Ok(());
            };
            let list = &mut self.monitors[monitor].clients;
            list.retain(|&id| id != selected);
            let at = list.iter().position(|&id| id == anchor).map_or(list.len(), |at| at + 1);
            list.insert(at, selected);
        }
        self.arrange(Some(monitor))
    }

    /// Swaps the selection with the master, or promotes the next tiled
    /// client when the selection already is the master.
    pub(super) fn zoom(&mut self) -> WmResult<()> {
        let monitor = self.selmon;
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        if !self.layout_arranges(monitor) || self.clients[selected].is_floating {
            return Ok(());
        }
        let tiled = self.tiled(monitor);
        let target = if tiled.first() == Some(&selected) {
            match tiled.get(1) {
                Some(&next) => next,
                None => return Ok(()),
            }
        } else {
            selected
        };

        self.monitors[monitor].detach(target);
        self.monitors[monitor].attach(target);
        self.focus(Some(target))?;
        self.arrange(Some(monitor))
    }

    pub(super) fn direction_to_monitor(&self, direction: i32) -> usize {
        let count = self.monitors.len();
        if direction > 0 {
            (self.selmon + 1) % count
        } else {
            (self.selmon + count - 1) % count
        }
    }

    pub(super) fn focus_monitor(&mut self, direction: i32) -> WmResult<()> {
        if self.monitors.len() <= 1 {
            return Ok(());
        }
        let monitor = self.direction_to_monitor(direction);
        if monitor == self.selmon {
            return Ok(());
        }
        if let Some(selected) = self.selected() {
            self.unfocus(selected, false)?;
        }
        self.selmon = monitor;
        self.focus(None)?;
        if let Some(selected) = self.selected() {
            let geometry = self.clients[selected].geometry;
            self.display.warp_pointer(
                self.clients[selected].window(),
                geometry.width / 2,
                geometry.height / 2,
            )?;
        }
        Ok(())
    }
}
