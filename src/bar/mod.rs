pub mod renderer;
pub mod status;

pub use renderer::CoreFontRenderer;
pub use status::{Level, Segment, SegmentKind, StatusSignaler, StatusText};

use crate::client::Icon;
use crate::display::Window;
use crate::errors::WmResult;
use crate::geometry::Rect;
use crate::tags::TagMask;

/// Space between an icon and its label.
pub const ICON_MARGIN: i32 = 12;
/// Width of the separator drawn between status segments.
pub const DELIMITER_WIDTH: i32 = 4;

/// Draws the bars. Measurement lives here too so the bar model can lay
/// out cells without knowing about fonts.
pub trait Renderer {
    fn bar_height(&self) -> i32;
    /// Width of `text` including the horizontal padding around it.
    fn text_width(&self, text: &str) -> i32;
    fn icon_size(&self) -> i32;
    fn create_bar(&mut self, rect: Rect) -> WmResult<Window>;
    fn move_bar(&mut self, bar: Window, rect: Rect) -> WmResult<()>;
    fn destroy_bar(&mut self, bar: Window) -> WmResult<()>;
    fn draw_bar(&mut self, bar: Window, model: &BarModel) -> WmResult<()>;
}

/// Where a bar click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarHit {
    Tag(usize),
    LayoutSymbol,
    Launcher(usize),
    Title,
    Status { signal: Option<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCell {
    pub index: usize,
    pub label: String,
    pub x: i32,
    pub width: i32,
    pub selected: bool,
    pub occupied: bool,
    pub urgent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell {
    pub text: String,
    pub x: i32,
    pub width: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCell {
    pub text: String,
    pub x: i32,
    pub width: i32,
    pub floating: bool,
    pub fixed: bool,
    pub hidden: bool,
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCell {
    pub segment: Segment,
    pub x: i32,
    pub width: i32,
}

/// Focused client as the bar shows it.
#[derive(Debug, Clone, Copy)]
pub struct TitleInput<'a> {
    pub name: &'a str,
    pub floating: bool,
    pub fixed: bool,
    pub hidden: bool,
    pub icon: Option<&'a Icon>,
}

#[derive(Debug, Clone, Copy)]
pub struct BarInput<'a> {
    pub width: i32,
    pub tags: &'a [String],
    pub view: TagMask,
    pub occupied: TagMask,
    pub urgent: TagMask,
    pub layout_symbol: &'a str,
    pub launchers: &'a [String],
    /// Present only on the selected monitor.
    pub title: Option<TitleInput<'a>>,
    /// Present only on the selected monitor.
    pub status: Option<&'a StatusText>,
}

/// Cells of one monitor's bar with their horizontal extents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BarModel {
    pub width: i32,
    pub tags: Vec<TagCell>,
    pub layout: Option<TextCell>,
    pub launchers: Vec<TextCell>,
    pub title: Option<TitleCell>,
    pub status: Vec<StatusCell>,
    pub status_x: i32,
}

impl BarModel {
    pub fn build(input: &BarInput, renderer: &dyn Renderer) -> Self {
        let mut model = BarModel {
            width: input.width,
            status_x: input.width,
            ..BarModel::default()
        };

        let mut x = 0;
        for (index, label) in input.tags.iter().enumerate() {
            let bit = 1 << index;
            let selected = input.view & bit != 0;
            let occupied = input.occupied & bit != 0;
            // vacant tags take no room
            if !selected && !occupied {
                continue;
            }
            let width = renderer.text_width(label);
            model.tags.push(TagCell {
                index,
                label: label.clone(),
                x,
                width,
                selected,
                occupied,
                urgent: input.urgent & bit != 0,
            });
            x += width;
        }

        let width = renderer.text_width(input.layout_symbol);
        model.layout = Some(TextCell {
            text: input.layout_symbol.to_string(),
            x,
            width,
        });
        x += width;

        for name in input.launchers {
            let width = renderer.text_width(name);
            model.launchers.push(TextCell {
                text: name.clone(),
                x,
                width,
            });
            x += width;
        }

        if let Some(status) = input.status {
            model.status = status_cells(status, renderer, input.width);
            model.status_x = model.status.first().map_or(input.width, |cell| cell.x);
        }

        let available = model.status_x - x;
        if let Some(title) = input.title
            && available > renderer.bar_height()
        {
            let icon_width = title
                .icon
                .map_or(0, |icon| icon.display_width as i32 + ICON_MARGIN);
            let width = available.min(renderer.text_width(title.name) + icon_width);
            model.title = Some(TitleCell {
                text: title.name.to_string(),
                x: x + (available - width) / 2,
                width,
                floating: title.floating,
                fixed: title.fixed,
                hidden: title.hidden,
                icon: title.icon.cloned(),
            });
        }

        model
    }

    pub fn hit(&self, x: i32) -> Option<BarHit> {
        let inside = |cell_x: i32, width: i32| x >= cell_x && x < cell_x + width;

        if let Some(cell) = self.tags.iter().find(|cell| inside(cell.x, cell.width)) {
            return Some(BarHit::Tag(cell.index));
        }
        if let Some(layout) = &self.layout
            && inside(layout.x, layout.width)
        {
            return Some(BarHit::LayoutSymbol);
        }
        if let Some(index) = self
            .launchers
            .iter()
            .position(|cell| inside(cell.x, cell.width))
        {
            return Some(BarHit::Launcher(index));
        }
        if !self.status.is_empty() && x >= self.status_x {
            let signal = self
                .status
                .iter()
                .find(|cell| inside(cell.x, cell.width))
                .and_then(|cell| cell.segment.signal);
            return Some(BarHit::Status { signal });
        }
        match &self.title {
            Some(title) if inside(title.x, title.width) => Some(BarHit::Title),
            _ => None,
        }
    }
}

fn status_cells(status: &StatusText, renderer: &dyn Renderer, bar_width: i32) -> Vec<StatusCell> {
    let widths: Vec<i32> = status
        .segments()
        .iter()
        .map(|segment| match &segment.kind {
            SegmentKind::Icon { label, .. } => {
                renderer.icon_size() + ICON_MARGIN + renderer.text_width(label)
            }
            _ => renderer.text_width(segment.text()) + DELIMITER_WIDTH + 2 * ICON_MARGIN,
        })
        .collect();

    let mut x = bar_width - widths.iter().sum::<i32>();
    status
        .segments()
        .iter()
        .zip(widths)
        .map(|(segment, width)| {
            let cell = StatusCell {
                segment: segment.clone(),
                x,
                width,
            };
            x += width;
            cell
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::NullRenderer;

    fn labels() -> Vec<String> {
        (1..=9).map(|tag| tag.to_string()).collect()
    }

    fn input<'a>(tags: &'a [String], status: Option<&'a StatusText>) -> BarInput<'a> {
        BarInput {
            width: 1000,
            tags,
            view: 1,
            occupied: 1 << 2,
            urgent: 1 << 2,
            layout_symbol: "[]=",
            launchers: &[],
            title: None,
            status,
        }
    }

    #[test]
    fn test_vacant_tags_take_no_room() {
        let tags = labels();
        let model = BarModel::build(&input(&tags, None), &NullRenderer::default());
        let indices: Vec<usize> = model.tags.iter().map(|cell| cell.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(model.tags[1].urgent);
        assert_eq!(model.tags[1].x, model.tags[0].width);
    }

    #[test]
    fn test_hit_resolves_cells() {
        let tags = labels();
        let model = BarModel::build(&input(&tags, None), &NullRenderer::default());
        let second = &model.tags[1];
        assert_eq!(model.hit(second.x + 1), Some(BarHit::Tag(2)));
        let layout = model.layout.as_ref().unwrap();
        assert_eq!(model.hit(layout.x), Some(BarHit::LayoutSymbol));
        assert_eq!(model.hit(layout.x + layout.width + 5), None);
    }

    #[test]
    fn test_status_is_right_aligned_and_carries_signals() {
        let tags = labels();
        let status = StatusText::parse("\u{5}cpu|\u{7}12:00");
        let model = BarModel::build(&input(&tags, Some(&status)), &NullRenderer::default());
        let last = model.status.last().unwrap();
        assert_eq!(last.x + last.width, 1000);
        assert_eq!(
            model.hit(last.x + 1),
            Some(BarHit::Status { signal: Some(7) })
        );
        assert_eq!(
            model.hit(model.status_x),
            Some(BarHit::Status { signal: Some(5) })
        );
    }

    #[test]
    fn test_title_sits_between_left_cells_and_status() {
        let tags = labels();
        let mut input = input(&tags, None);
        input.title = Some(TitleInput {
            name: "term",
            floating: true,
            fixed: false,
            hidden: false,
            icon: None,
        });
        let model = BarModel::build(&input, &NullRenderer::default());
        let title = model.title.as_ref().unwrap();
        assert!(title.floating);
        assert_eq!(model.hit(title.x + 1), Some(BarHit::Title));
    }
}
