use tracing::debug;

use super::WindowManager;
use crate::client::ClientId;
use crate::display::Display;
use crate::errors::WmResult;
use crate::tags::{self, TagMask};

impl<D: Display> WindowManager<D> {
    pub(super) fn view(&mut self, mask: TagMask) -> WmResult<()> {
        let monitor = self.selmon;
        let Some(bar_changed) = self.monitors[monitor].view_tags(mask, &self.space) else {
            return Ok(());
        };
        if bar_changed {
            self.place_bar(monitor)?;
        }
        self.focus(None)?;
        self.arrange(Some(monitor))
    }

    pub(super) fn toggle_view(&mut self, mask: TagMask) -> WmResult<()> {
        let monitor = self.selmon;
        let Some(bar_changed) = self.monitors[monitor].toggle_view_tags(mask, &self.space) else {
            return Ok(());
        };
        if bar_changed {
            self.place_bar(monitor)?;
        }
        self.focus(None)?;
        self.arrange(Some(monitor))
    }

    pub(super) fn tag(&mut self, mask: TagMask) -> WmResult<()> {
        let mask = mask & self.space.all();
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        if mask == 0 {
            return Ok(());
        }
        self.clients[selected].tags = mask;
        self.publish_desktop(selected)?;
        self.focus(None)?;
        self.arrange(Some(self.selmon))
    }

    pub(super) fn toggle_tag(&mut self, mask: TagMask) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        let tags = self.clients[selected].tags ^ (mask & self.space.all());
        if tags == 0 {
            return Ok(());
        }
        self.clients[selected].tags = tags;
        self.publish_desktop(selected)?;
        self.focus(None)?;
        self.arrange(Some(self.selmon))
    }

    /// Tags holding clients on the selected monitor.
    fn occupied_tags(&self) -> TagMask {
        self.monitors[self.selmon]
            .clients
            .iter()
            .fold(0, |occupied, &id| occupied | self.clients[id].tags)
    }

    /// Views the nearest occupied tag `step` positions away.
    pub(super) fn shift_view(&mut self, step: i32) -> WmResult<()> {
        let current = self.monitors[self.selmon].view();
        match tags::next_occupied_rotation(current, step, self.space.tags, self.occupied_tags()) {
            Some(mask) => self.view(mask),
            None => Ok(()),
        }
    }

    /// Moves the selection to the nearest occupied tag `step` positions away.
    pub(super) fn shift_tag(&mut self, step: i32) -> WmResult<()> {
        let current = self.monitors[self.selmon].view();
        match tags::next_occupied_rotation(current, step, self.space.tags, self.occupied_tags()) {
            Some(mask) => self.tag(mask),
            None => Ok(()),
        }
    }

    /// Exchanges every client of the viewed tag with those of `mask` and
    /// follows the clients there, carrying the per-tag settings along.
    pub(super) fn swap_tags(&mut self, mask: TagMask) -> WmResult<()> {
        let monitor = self.selmon;
        let target = mask & self.space.all();
        let current = self.monitors[monitor].view();
        if target == current || !tags::is_single_tag(current) || target == 0 {
            return Ok(());
        }

        for id in self.monitors[monitor].clients.clone() {
            let client = &mut self.clients[id];
            if client.tags & (target | current) != 0 {
                client.tags ^= current ^ target;
            }
            if client.tags == 0 {
                client.tags = target;
            }
            self.publish_desktop(id)?;
        }

        let (from, to) = (self.space.slot_for(current), self.space.slot_for(target));
        let current_monitor = &mut self.monitors[monitor];
        if from != 0 && to != 0 {
            current_monitor.pertag.slots.swap(from, to);
        }
        current_monitor.tagset[current_monitor.selected_tags] = target;
        current_monitor.pertag.previous = from;
        current_monitor.pertag.current = to;
        if current_monitor.load_tag_settings() {
            self.place_bar(monitor)?;
        }

        self.focus(None)?;
        self.arrange(Some(monitor))
    }

    /// Shows or hides scratchpad `index`, starting its command when no
    /// client carries its tag yet.
    pub(super) fn toggle_scratch(&mut self, index: usize) -> WmResult<()> {
        let Some(command) = self
            .config
            .scratchpads
            .get(index)
            .map(|pad| pad.command.clone())
        else {
            return Ok(());
        };
        let monitor = self.selmon;
        let tag = self.space.scratch_tag(index);
        let found = self.monitors[monitor]
            .clients
            .iter()
            .copied()
            .find(|&id| self.clients[id].tags & tag != 0);

        match found {
            Some(id) => {
                let view = self.monitors[monitor].view() ^ tag;
                if view != 0 {
                    let current = &mut self.monitors[monitor];
                    current.tagset[current.selected_tags] = view;
                    self.focus(None)?;
                    self.arrange(Some(monitor))?;
                }
                if self.is_visible(id) {
                    self.focus(Some(id))?;
                    self.restack(monitor)?;
                }
            }
            None => {
                debug!("starting scratchpad {}", index);
                let current = &mut self.monitors[monitor];
                current.tagset[current.selected_tags] |= tag;
                self.spawn(&command);
            }
        }
        Ok(())
    }

    /// Publishes the client's tags and monitor on its window.
    pub(super) fn publish_desktop(&mut self, id: ClientId) -> WmResult<()> {
        let client = &self.clients[id];
        let monitor = self.monitors[client.monitor].num;
        self.display
            .set_desktop(client.window(), client.tags, monitor)
    }

    pub(super) fn send_to_monitor(&mut self, id: ClientId, monitor: usize) -> WmResult<()> {
        if self.clients[id].monitor == monitor {
            return Ok(());
        }
        self.unfocus(id, true)?;
        let from = self.clients[id].monitor;
        self.monitors[from].detach(id);
        self.detach_stack(id);

        let client = &mut self.clients[id];
        client.monitor = monitor;
        client.tags = self.monitors[monitor].view();
        self.monitors[monitor].attach(id);
        self.monitors[monitor].attach_stack(id);
        self.publish_desktop(id)?;

        self.focus(None)?;
        self.arrange(None)
    }

    pub(super) fn tag_monitor(&mut self, direction: i32) -> WmResult<()> {
        let Some(selected) = self.selected() else {
            return Ok(());
        };
        if self.monitors.len() <= 1 {
            return Ok(());
        }
        let monitor = self.direction_to_monitor(direction);
        self.send_to_monitor(selected, monitor)
    }
}
