use tracing::warn;

use super::WindowManager;
use crate::client::ClientId;
use crate::display::{CursorKind, Display, Event};
use crate::errors::WmResult;
use crate::geometry::Rect;

/// Minimum spacing between handled motion events while dragging.
const DRAG_INTERVAL_MS: u32 = 1000 / 280;

/// Which drag is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Move,
    Resize,
}

impl<D: Display> WindowManager<D> {
    /// Drags the selected client with the pointer, snapping to the edges of
    /// the usable area.
    pub(super) fn move_mouse(&mut self) -> WmResult<()> {
        self.drag(Drag::Move)
    }

    /// Resizes the selected client from its bottom-right corner.
    pub(super) fn resize_mouse(&mut self) -> WmResult<()> {
        self.drag(Drag::Resize)
    }

    fn drag(&mut self, drag: Drag) -> WmResult<()> {
        let Some(id) = self.selected() else {
            return Ok(());
        };
        if self.clients[id].is_fullscreen {
            return Ok(());
        }
        self.restack(self.selmon)?;

        let origin = self.clients[id].geometry;
        let cursor = match drag {
            Drag::Move => CursorKind::Move,
            Drag::Resize => CursorKind::Resize,
        };
        if !self.display.grab_pointer(cursor)? {
            return Ok(());
        }
        let start = match drag {
            Drag::Move => self.display.pointer_position(),
            Drag::Resize => match self.warp_to_corner(id) {
                Ok(()) => Some((0, 0)),
                Err(error) => {
                    self.display.ungrab_pointer()?;
                    return Err(error);
                }
            },
        };
        let Some((start_x, start_y)) = start else {
            return self.display.ungrab_pointer();
        };

        let dragged = self.drag_loop(id, drag, origin, (start_x, start_y));
        let released = self.release_drag(id, drag);
        dragged?;
        released?;

        let monitor = self.rect_to_monitor(&self.clients[id].geometry);
        if monitor != self.selmon {
            self.send_to_monitor(id, monitor)?;
            self.selmon = monitor;
            self.focus(None)?;
        }
        Ok(())
    }

    /// Follows the pointer until the button is released. Failures of single
    /// events are logged; only losing the event stream ends the drag early.
    fn drag_loop(
        &mut self,
        id: ClientId,
        drag: Drag,
        origin: Rect,
        (start_x, start_y): (i32, i32),
    ) -> WmResult<()> {
        let mut last_motion = 0u32;
        loop {
            let handled = match self.display.next_event()? {
                event @ (Event::ConfigureRequest(_)
                | Event::Expose { .. }
                | Event::MapRequest { .. }) => self.handle_event(event),
                Event::MotionNotify {
                    root_x,
                    root_y,
                    time,
                    ..
                } => {
                    if time.wrapping_sub(last_motion) <= DRAG_INTERVAL_MS {
                        continue;
                    }
                    last_motion = time;
                    match drag {
                        Drag::Move => {
                            let x = origin.x + root_x - start_x;
                            let y = origin.y + root_y - start_y;
                            self.drag_move(id, x, y)
                        }
                        Drag::Resize => self.drag_resize(id, origin, root_x, root_y),
                    }
                }
                Event::ButtonRelease(_) => return Ok(()),
                event => {
                    self.deferred.push_back(event);
                    Ok(())
                }
            };
            if let Err(error) = handled {
                warn!("drag step failed: {}", error);
            }
        }
    }

    /// Gives the pointer back, whatever ended the drag.
    fn release_drag(&mut self, id: ClientId, drag: Drag) -> WmResult<()> {
        let warped = match drag {
            Drag::Resize => self.warp_to_corner(id),
            Drag::Move => Ok(()),
        };
        self.display.ungrab_pointer()?;
        self.display.discard_enter_events()?;
        warped
    }

    fn warp_to_corner(&mut self, id: ClientId) -> WmResult<()> {
        let client = &self.clients[id];
        let border = client.border_width;
        self.display.warp_pointer(
            client.window(),
            client.geometry.width + border - 1,
            client.geometry.height + border - 1,
        )
    }

    fn drag_move(&mut self, id: ClientId, mut x: i32, mut y: i32) -> WmResult<()> {
        let snap = self.config.snap;
        let area = self.monitors[self.selmon].area;
        let client = &self.clients[id];
        let (width, height) = (client.width_with_border(), client.height_with_border());

        if (area.x - x).abs() < snap {
            x = area.x;
        } else if (area.right() - (x + width)).abs() < snap {
            x = area.right() - width;
        }
        if (area.y - y).abs() < snap {
            y = area.y;
        } else if (area.bottom() - (y + height)).abs() < snap {
            y = area.bottom() - height;
        }

        let arranges = self.layout_arranges(self.selmon);
        if !client.is_floating
            && arranges
            && ((x - client.geometry.x).abs() > snap || (y - client.geometry.y).abs() > snap)
        {
            self.toggle_floating()?;
        }
        if !arranges || self.clients[id].is_floating {
            let geometry = self.clients[id].geometry;
            self.resize(id, Rect { x, y, ..geometry }, true)?;
        }
        Ok(())
    }

    fn drag_resize(&mut self, id: ClientId, origin: Rect, root_x: i32, root_y: i32) -> WmResult<()> {
        let snap = self.config.snap;
        let client = &self.clients[id];
        let border = client.border_width;
        let width = (root_x - origin.x - 2 * border + 1).max(1);
        let height = (root_y - origin.y - 2 * border + 1).max(1);

        let own_area = self.monitors[client.monitor].area;
        let selected_area = self.monitors[self.selmon].area;
        let inside = own_area.x + width >= selected_area.x
            && own_area.x + width <= selected_area.right()
            && own_area.y + height >= selected_area.y
            && own_area.y + height <= selected_area.bottom();

        let arranges = self.layout_arranges(self.selmon);
        if inside
            && !client.is_floating
            && arranges
            && ((width - client.geometry.width).abs() > snap
                || (height - client.geometry.height).abs() > snap)
        {
            self.toggle_floating()?;
        }
        if !arranges || self.clients[id].is_floating {
            let geometry = self.clients[id].geometry;
            self.resize(
                id,
                Rect {
                    width,
                    height,
                    ..geometry
                },
                true,
            )?;
        }
        Ok(())
    }
}
