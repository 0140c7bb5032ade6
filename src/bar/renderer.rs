use std::rc::Rc;

use x11rb::COPY_DEPTH_FROM_PARENT;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::rust_connection::RustConnection;

use super::{BarModel, DELIMITER_WIDTH, ICON_MARGIN, Level, Renderer, SegmentKind};
use crate::client::Icon;
use crate::errors::{WmResult, X11Error};
use crate::geometry::Rect;
use crate::{ColorScheme, Schemes};

const FALLBACK_FONT: &str = "fixed";

struct Metrics {
    ascent: i32,
    descent: i32,
    min_char: u16,
    default_width: i32,
    widths: Vec<i32>,
}

impl Metrics {
    fn height(&self) -> i32 {
        self.ascent + self.descent
    }

    fn glyph_width(&self, byte: u8) -> i32 {
        let index = usize::from(u16::from(byte).wrapping_sub(self.min_char));
        self.widths
            .get(index)
            .copied()
            .filter(|&width| width > 0)
            .unwrap_or(self.default_width)
    }
}

/// Draws bars with a core X font through the window manager's connection.
pub struct CoreFontRenderer {
    connection: Rc<RustConnection>,
    root: Window,
    depth: u8,
    font: Font,
    gc: Gcontext,
    metrics: Metrics,
    bar_height: i32,
    padding: i32,
    schemes: Schemes,
}

impl CoreFontRenderer {
    pub fn new(
        connection: Rc<RustConnection>,
        screen_number: usize,
        font_name: &str,
        bar_height: i32,
        schemes: Schemes,
    ) -> WmResult<Self> {
        let screen = &connection.setup().roots[screen_number];
        let (root, depth) = (screen.root, screen.root_depth);

        let font = connection.generate_id()?;
        let opened = connection.open_font(font, font_name.as_bytes())?.check();
        if opened.is_err() {
            tracing::warn!("font {} not found, using {}", font_name, FALLBACK_FONT);
            connection
                .open_font(font, FALLBACK_FONT.as_bytes())?
                .check()
                .map_err(|_| X11Error::FontLoadFailed(font_name.to_string()))?;
        }

        let info = connection.query_font(font)?.reply()?;
        let metrics = Metrics {
            ascent: i32::from(info.font_ascent),
            descent: i32::from(info.font_descent),
            min_char: info.min_char_or_byte2,
            default_width: i32::from(info.max_bounds.character_width),
            widths: info
                .char_infos
                .iter()
                .map(|glyph| i32::from(glyph.character_width))
                .collect(),
        };

        let gc = connection.generate_id()?;
        connection.create_gc(
            gc,
            root,
            &CreateGCAux::new()
                .font(font)
                .foreground(schemes.normal.foreground)
                .background(schemes.normal.background)
                .graphics_exposures(0),
        )?;

        let padding = metrics.height();
        let bar_height = if bar_height > 0 {
            bar_height
        } else {
            metrics.height() + 2
        };

        Ok(Self {
            connection,
            root,
            depth,
            font,
            gc,
            metrics,
            bar_height,
            padding,
            schemes,
        })
    }

    fn raw_width(&self, text: &str) -> i32 {
        latin1(text)
            .iter()
            .map(|&byte| self.metrics.glyph_width(byte))
            .sum()
    }

    fn fill(&self, bar: Window, color: u32, x: i32, y: i32, width: i32, height: i32) -> WmResult<()> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        self.connection
            .change_gc(self.gc, &ChangeGCAux::new().foreground(color))?;
        self.connection.poly_fill_rectangle(
            bar,
            self.gc,
            &[Rectangle {
                x: x as i16,
                y: y as i16,
                width: width as u16,
                height: height as u16,
            }],
        )?;
        Ok(())
    }

    /// Fills the cell with the scheme background and draws `text` at
    /// `offset` from its left edge, centered vertically.
    fn text(
        &self,
        bar: Window,
        scheme: &ColorScheme,
        x: i32,
        width: i32,
        offset: i32,
        text: &str,
        invert: bool,
    ) -> WmResult<()> {
        let (foreground, background) = if invert {
            (scheme.background, scheme.foreground)
        } else {
            (scheme.foreground, scheme.background)
        };
        self.fill(bar, background, x, 0, width, self.bar_height)?;

        let mut bytes = latin1(text);
        let room = width - offset;
        while !bytes.is_empty() && self.width_of(&bytes) > room {
            bytes.pop();
        }
        if bytes.is_empty() {
            return Ok(());
        }

        self.connection.change_gc(
            self.gc,
            &ChangeGCAux::new().foreground(foreground).background(background),
        )?;
        let baseline = (self.bar_height - self.metrics.height()) / 2 + self.metrics.ascent;
        bytes.truncate(255);
        self.connection
            .image_text8(bar, self.gc, (x + offset) as i16, baseline as i16, &bytes)?;
        Ok(())
    }

    fn width_of(&self, bytes: &[u8]) -> i32 {
        bytes.iter().map(|&byte| self.metrics.glyph_width(byte)).sum()
    }

    fn icon(&self, bar: Window, icon: &Icon, x: i32) -> WmResult<()> {
        if self.depth != 24 && self.depth != 32 {
            return Ok(());
        }
        let (width, height) = (icon.display_width, icon.display_height);
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for row in 0..height {
            let source_row = row * icon.height / height;
            for column in 0..width {
                let source_column = column * icon.width / width;
                let pixel = icon.pixels[(source_row * icon.width + source_column) as usize];
                data.extend_from_slice(&pixel.to_ne_bytes());
            }
        }
        let y = (self.bar_height - height as i32) / 2;
        self.connection.put_image(
            ImageFormat::Z_PIXMAP,
            bar,
            self.gc,
            width as u16,
            height as u16,
            x as i16,
            y as i16,
            0,
            self.depth,
            &data,
        )?;
        Ok(())
    }
}

impl Renderer for CoreFontRenderer {
    fn bar_height(&self) -> i32 {
        self.bar_height
    }

    fn text_width(&self, text: &str) -> i32 {
        self.raw_width(text) + self.padding
    }

    fn icon_size(&self) -> i32 {
        self.metrics.height()
    }

    fn create_bar(&mut self, rect: Rect) -> WmResult<Window> {
        let window = self.connection.generate_id()?;
        self.connection.create_window(
            COPY_DEPTH_FROM_PARENT,
            window,
            self.root,
            rect.x as i16,
            rect.y as i16,
            rect.width.max(1) as u16,
            rect.height.max(1) as u16,
            0,
            WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &CreateWindowAux::new()
                .background_pixel(self.schemes.normal.background)
                .override_redirect(1)
                .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE),
        )?;
        self.connection.map_window(window)?;
        Ok(window)
    }

    fn move_bar(&mut self, bar: Window, rect: Rect) -> WmResult<()> {
        self.connection.configure_window(
            bar,
            &ConfigureWindowAux::new()
                .x(rect.x)
                .y(rect.y)
                .width(rect.width.max(1) as u32)
                .height(rect.height.max(1) as u32),
        )?;
        Ok(())
    }

    fn destroy_bar(&mut self, bar: Window) -> WmResult<()> {
        self.connection.unmap_window(bar)?;
        self.connection.destroy_window(bar)?;
        Ok(())
    }

    fn draw_bar(&mut self, bar: Window, model: &BarModel) -> WmResult<()> {
        let schemes = &self.schemes;
        let half = self.padding / 2;
        self.fill(bar, schemes.normal.background, 0, 0, model.width, self.bar_height)?;

        for cell in &model.tags {
            let scheme = if cell.selected {
                &schemes.tags_selected
            } else {
                &schemes.tags_normal
            };
            self.text(bar, scheme, cell.x, cell.width, half, &cell.label, cell.urgent)?;
        }

        if let Some(layout) = &model.layout {
            self.text(bar, &schemes.optimal, layout.x, layout.width, half, &layout.text, false)?;
        }

        for launcher in &model.launchers {
            self.text(
                bar,
                &schemes.tags_normal,
                launcher.x,
                launcher.width,
                half,
                &launcher.text,
                false,
            )?;
        }

        if let Some(title) = &model.title {
            let icon_width = title
                .icon
                .as_ref()
                .map_or(0, |icon| icon.display_width as i32 + ICON_MARGIN);
            self.text(
                bar,
                &schemes.status,
                title.x,
                title.width,
                half + icon_width,
                &title.text,
                title.hidden,
            )?;
            if let Some(icon) = &title.icon {
                self.icon(bar, icon, title.x + half)?;
            }
            if title.floating {
                let boxs = self.metrics.height() / 9;
                let boxw = self.metrics.height() / 6 + 2;
                let color = schemes.status.foreground;
                if title.fixed {
                    self.fill(bar, color, title.x + boxs, boxs, boxw, boxw)?;
                } else {
                    self.connection
                        .change_gc(self.gc, &ChangeGCAux::new().foreground(color))?;
                    self.connection.poly_rectangle(
                        bar,
                        self.gc,
                        &[Rectangle {
                            x: (title.x + boxs) as i16,
                            y: boxs as i16,
                            width: boxw as u16,
                            height: boxw as u16,
                        }],
                    )?;
                }
            }
        }

        let last = model.status.len().saturating_sub(1);
        for (index, cell) in model.status.iter().enumerate() {
            match &cell.segment.kind {
                SegmentKind::Icon { slot, label } => {
                    let slot_width = self.icon_size() + ICON_MARGIN;
                    let scheme = &schemes.info;
                    self.text(bar, scheme, cell.x, slot_width, 0, &slot.to_string(), true)?;
                    self.text(
                        bar,
                        scheme,
                        cell.x + slot_width,
                        cell.width - slot_width,
                        half,
                        label,
                        false,
                    )?;
                }
                SegmentKind::Value { text, level } => {
                    let scheme = match level {
                        Level::Critical => &schemes.critical,
                        Level::Optimal => &schemes.optimal,
                    };
                    self.text(bar, scheme, cell.x, cell.width, ICON_MARGIN, text, false)?;
                }
                SegmentKind::Text(text) => {
                    self.text(bar, &schemes.info, cell.x, cell.width, ICON_MARGIN, text, false)?;
                }
            }
            if index != last {
                let separator = cell.x + cell.width - DELIMITER_WIDTH;
                self.fill(
                    bar,
                    schemes.selected.border,
                    separator,
                    self.bar_height / 10,
                    DELIMITER_WIDTH,
                    self.bar_height - 2 * (self.bar_height / 10),
                )?;
            }
        }

        self.connection.flush()?;
        Ok(())
    }
}

impl Drop for CoreFontRenderer {
    fn drop(&mut self) {
        let _ = self.connection.free_gc(self.gc);
        let _ = self.connection.close_font(self.font);
        let _ = self.connection.flush();
    }
}

/// Core fonts address glyphs by byte; characters outside Latin-1 become `?`.
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}
