use crate::geometry::Rect;

pub mod flags {
    pub const P_MIN_SIZE: u32 = 1 << 4;
    pub const P_MAX_SIZE: u32 = 1 << 5;
    pub const P_RESIZE_INC: u32 = 1 << 6;
    pub const P_ASPECT: u32 = 1 << 7;
    pub const P_BASE_SIZE: u32 = 1 << 8;
}

pub mod offset {
    pub const FLAGS: usize = 0;
    pub const MIN_WIDTH: usize = 5;
    pub const MIN_HEIGHT: usize = 6;
    pub const MAX_WIDTH: usize = 7;
    pub const MAX_HEIGHT: usize = 8;
    pub const WIDTH_INC: usize = 9;
    pub const HEIGHT_INC: usize = 10;
    pub const MIN_ASPECT_X: usize = 11;
    pub const MIN_ASPECT_Y: usize = 12;
    pub const MAX_ASPECT_X: usize = 13;
    pub const MAX_ASPECT_Y: usize = 14;
    pub const BASE_WIDTH: usize = 15;
    pub const BASE_HEIGHT: usize = 16;
}

/// ICCCM `WM_NORMAL_HINTS`, normalized: a missing base size falls back to
/// the minimum size and vice versa, absent fields are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeHints {
    pub base_width: i32,
    pub base_height: i32,
    pub increment_width: i32,
    pub increment_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl SizeHints {
    /// Decodes the 32-bit words of a `WM_NORMAL_HINTS` property.
    pub fn from_words(words: &[u32]) -> Self {
        let word = |index: usize| words.get(index).copied().unwrap_or(0);
        let field = |index: usize| word(index) as i32;
        let hint_flags = word(offset::FLAGS);
        let has = |flag: u32| hint_flags & flag != 0;

        let mut hints = SizeHints::default();

        if has(flags::P_BASE_SIZE) {
            hints.base_width = field(offset::BASE_WIDTH);
            hints.base_height = field(offset::BASE_HEIGHT);
        } else if has(flags::P_MIN_SIZE) {
            hints.base_width = field(offset::MIN_WIDTH);
            hints.base_height = field(offset::MIN_HEIGHT);
        }

        if has(flags::P_RESIZE_INC) {
            hints.increment_width = field(offset::WIDTH_INC);
            hints.increment_height = field(offset::HEIGHT_INC);
        }

        if has(flags::P_MAX_SIZE) {
            hints.max_width = field(offset::MAX_WIDTH);
            hints.max_height = field(offset::MAX_HEIGHT);
        }

        if has(flags::P_MIN_SIZE) {
            hints.min_width = field(offset::MIN_WIDTH);
            hints.min_height = field(offset::MIN_HEIGHT);
        } else if has(flags::P_BASE_SIZE) {
            hints.min_width = field(offset::BASE_WIDTH);
            hints.min_height = field(offset::BASE_HEIGHT);
        }

        if has(flags::P_ASPECT) {
            hints.min_aspect = ratio(field(offset::MIN_ASPECT_Y), field(offset::MIN_ASPECT_X));
            hints.max_aspect = ratio(field(offset::MAX_ASPECT_X), field(offset::MAX_ASPECT_Y));
        }

        hints
    }

    pub fn is_fixed(&self) -> bool {
        self.max_width > 0
            && self.max_height > 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }

    /// Applies base size, aspect, increment and min/max constraints to a
    /// requested client size.
    pub fn constrain(&self, mut width: i32, mut height: i32) -> (i32, i32) {
        let base_is_min = self.base_width == self.min_width && self.base_height == self.min_height;
        if !base_is_min {
            width -= self.base_width;
            height -= self.base_height;
        }

        if self.min_aspect > 0.0 && self.max_aspect > 0.0 && width > 0 && height > 0 {
            if self.max_aspect < width as f32 / height as f32 {
                width = (height as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < height as f32 / width as f32 {
                height = (width as f32 * self.min_aspect + 0.5) as i32;
            }
        }

        if base_is_min {
            width -= self.base_width;
            height -= self.base_height;
        }

        if self.increment_width > 0 {
            width -= width % self.increment_width;
        }
        if self.increment_height > 0 {
            height -= height % self.increment_height;
        }

        width = (width + self.base_width).max(self.min_width);
        height = (height + self.base_height).max(self.min_height);

        if self.max_width > 0 {
            width = width.min(self.max_width);
        }
        if self.max_height > 0 {
            height = height.min(self.max_height);
        }

        (width, height)
    }
}

fn ratio(numerator: i32, denominator: i32) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

/// Where a resize happens and which rules constrain it.
#[derive(Debug, Clone, Copy)]
pub struct HintContext {
    /// Whole screen, used while the user drags a window.
    pub screen: Rect,
    /// Usable area of the client's monitor.
    pub area: Rect,
    pub bar_height: i32,
    pub interactive: bool,
    /// Whether size hints apply, true for floating clients, the null layout
    /// and whenever hints are honored in tiled layouts.
    pub respect_hints: bool,
}

/// Clamps `requested` the way a resize must be clamped before it reaches
/// the display. `current` and `border` describe the client as it is now.
pub fn apply_size_hints(
    hints: &SizeHints,
    current: Rect,
    border: i32,
    requested: Rect,
    context: &HintContext,
) -> Rect {
    let Rect {
        mut x,
        mut y,
        mut width,
        mut height,
    } = requested;
    width = width.max(1);
    height = height.max(1);
    let outer_width = current.width + 2 * border;
    let outer_height = current.height + 2 * border;

    if context.interactive {
        let screen = &context.screen;
        if x > screen.right() {
            x = screen.right() - outer_width;
        }
        if y > screen.bottom() {
            y = screen.bottom() - outer_height;
        }
        if x + width + 2 * border < screen.x {
            x = screen.x;
        }
        if y + height + 2 * border < screen.y {
            y = screen.y;
        }
    } else {
        let area = &context.area;
        if x >= area.right() {
            x = area.right() - outer_width;
        }
        if y >= area.bottom() {
            y = area.bottom() - outer_height;
        }
        if x + width + 2 * border <= area.x {
            x = area.x;
        }
        if y + height + 2 * border <= area.y {
            y = area.y;
        }
    }

    height = height.max(context.bar_height);
    width = width.max(context.bar_height);

    if context.respect_hints {
        (width, height) = hints.constrain(width, height);
    }

    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(entries: &[(usize, u32)]) -> Vec<u32> {
        let mut words = vec![0; 18];
        for &(index, value) in entries {
            words[index] = value;
        }
        words
    }

    fn context() -> HintContext {
        HintContext {
            screen: Rect::new(0, 0, 1920, 1080),
            area: Rect::new(0, 20, 1920, 1060),
            bar_height: 0,
            interactive: false,
            respect_hints: true,
        }
    }

    #[test]
    fn test_base_falls_back_to_min() {
        let hints = SizeHints::from_words(&words(&[
            (offset::FLAGS, flags::P_MIN_SIZE),
            (offset::MIN_WIDTH, 100),
            (offset::MIN_HEIGHT, 50),
        ]));
        assert_eq!((hints.base_width, hints.base_height), (100, 50));
        assert_eq!((hints.min_width, hints.min_height), (100, 50));
    }

    #[test]
    fn test_fixed_when_min_equals_max() {
        let hints = SizeHints::from_words(&words(&[
            (offset::FLAGS, flags::P_MIN_SIZE | flags::P_MAX_SIZE),
            (offset::MIN_WIDTH, 300),
            (offset::MIN_HEIGHT, 200),
            (offset::MAX_WIDTH, 300),
            (offset::MAX_HEIGHT, 200),
        ]));
        assert!(hints.is_fixed());
    }

    #[test]
    fn test_missing_hints_only_enforce_one_pixel() {
        let hints = SizeHints::from_words(&[]);
        assert_eq!(hints, SizeHints::default());
        let result = apply_size_hints(
            &hints,
            Rect::new(0, 20, 10, 10),
            0,
            Rect::new(0, 20, 0, -5),
            &context(),
        );
        assert_eq!(result, Rect::new(0, 20, 1, 1));
    }

    #[test]
    fn test_increments_round_down() {
        let hints = SizeHints::from_words(&words(&[
            (offset::FLAGS, flags::P_RESIZE_INC | flags::P_BASE_SIZE),
            (offset::WIDTH_INC, 10),
            (offset::HEIGHT_INC, 20),
            (offset::BASE_WIDTH, 4),
            (offset::BASE_HEIGHT, 4),
        ]));
        assert_eq!(hints.constrain(109, 109), (104, 104));
    }

    #[test]
    fn test_aspect_ratio_limits_width() {
        let hints = SizeHints {
            min_aspect: 0.5,
            max_aspect: 1.0,
            ..SizeHints::default()
        };
        assert_eq!(hints.constrain(400, 200), (200, 200));
    }

    #[test]
    fn test_offscreen_position_pulled_into_area() {
        let hints = SizeHints::default();
        let result = apply_size_hints(
            &hints,
            Rect::new(0, 20, 100, 100),
            0,
            Rect::new(5000, 20, 100, 100),
            &context(),
        );
        assert_eq!(result.x, 1820);
    }
}
