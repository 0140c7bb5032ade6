use crate::bar::BarModel;
use crate::client::ClientId;
use crate::display::Window;
use crate::geometry::Rect;
use crate::layout::GapConfig;
use crate::tags::{TagMask, TagSpace};

/// Values a monitor starts with, and every per-tag slot along with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagSettings {
    pub nmaster: i32,
    pub mfact: f32,
    pub layouts: [usize; 2],
    pub selected_layout: usize,
    pub show_bar: bool,
}

/// Per-tag memory of layout settings. Slot 0 belongs to the all-tags view.
#[derive(Debug, Clone)]
pub struct Pertag {
    pub current: usize,
    pub previous: usize,
    pub slots: Vec<TagSettings>,
}

impl Pertag {
    pub fn new(slots: usize, defaults: TagSettings) -> Self {
        Self {
            current: 1,
            previous: 1,
            slots: vec![defaults; slots],
        }
    }

    pub fn settings(&self) -> &TagSettings {
        &self.slots[self.current]
    }

    fn settings_mut(&mut self) -> &mut TagSettings {
        &mut self.slots[self.current]
    }
}

#[derive(Debug, Clone)]
pub struct Monitor {
    pub num: usize,
    pub screen: Rect,
    /// Usable area: the screen minus bar and padding.
    pub area: Rect,
    pub bar_y: i32,
    pub show_bar: bool,
    pub top_bar: bool,
    pub bar_window: Option<Window>,
    /// Last bar drawn, kept to resolve clicks.
    pub bar: Option<BarModel>,
    pub layout_symbol: String,
    pub mfact: f32,
    pub nmaster: i32,
    pub layouts: [usize; 2],
    pub selected_layout: usize,
    pub tagset: [TagMask; 2],
    pub selected_tags: usize,
    pub gaps: GapConfig,
    pub clients: Vec<ClientId>,
    pub stack: Vec<ClientId>,
    pub selected: Option<ClientId>,
    pub pertag: Pertag,
}

impl Monitor {
    pub fn new(
        num: usize,
        screen: Rect,
        defaults: TagSettings,
        top_bar: bool,
        gaps: GapConfig,
        space: &TagSpace,
    ) -> Self {
        Self {
            num,
            screen,
            area: screen,
            bar_y: 0,
            show_bar: defaults.show_bar,
            top_bar,
            bar_window: None,
            bar: None,
            layout_symbol: String::new(),
            mfact: defaults.mfact,
            nmaster: defaults.nmaster,
            layouts: defaults.layouts,
            selected_layout: defaults.selected_layout,
            tagset: [1, 1],
            selected_tags: 0,
            gaps,
            clients: Vec::new(),
            stack: Vec::new(),
            selected: None,
            pertag: Pertag::new(space.slots(), defaults),
        }
    }

    /// The active tag view.
    pub fn view(&self) -> TagMask {
        self.tagset[self.selected_tags]
    }

    /// Index of the active layout in the layout catalog.
    pub fn layout(&self) -> usize {
        self.layouts[self.selected_layout]
    }

    /// Recomputes the usable area and the bar position.
    pub fn update_bar_position(&mut self, bar_height: i32, padding_y: i32) {
        let mut area = self.screen;
        if self.show_bar {
            area.y += padding_y;
            area.height -= padding_y + bar_height;
            if self.top_bar {
                self.bar_y = area.y;
                area.y += bar_height;
            } else {
                self.bar_y = area.y + area.height;
            }
        } else {
            self.bar_y = -bar_height;
        }
        self.area = area;
    }

    pub fn attach(&mut self, id: ClientId) {
        self.clients.insert(0, id);
    }

    pub fn attach_stack(&mut self, id: ClientId) {
        self.stack.insert(0, id);
    }

    pub fn detach(&mut self, id: ClientId) {
        self.clients.retain(|&other| other != id);
    }

    pub fn detach_stack(&mut self, id: ClientId) {
        self.stack.retain(|&other| other != id);
    }

    pub fn set_mfact(&mut self, mfact: f32) {
        self.mfact = mfact;
        self.pertag.settings_mut().mfact = mfact;
    }

    pub fn set_nmaster(&mut self, nmaster: i32) {
        self.nmaster = nmaster;
        self.pertag.settings_mut().nmaster = nmaster;
    }

    pub fn set_show_bar(&mut self, show_bar: bool) {
        self.show_bar = show_bar;
        self.pertag.settings_mut().show_bar = show_bar;
    }

    /// Flips to the other layout slot unless `layout` is already active,
    /// then stores `layout` into the selected slot.
    pub fn set_layout(&mut self, layout: Option<usize>) {
        if layout != Some(self.layout()) {
            self.selected_layout ^= 1;
            self.pertag.settings_mut().selected_layout = self.selected_layout;
        }
        if let Some(layout) = layout {
            self.layouts[self.selected_layout] = layout;
            self.pertag.settings_mut().layouts[self.selected_layout] = layout;
        }
    }

    /// Switches the view. Returns `None` when nothing changed, otherwise
    /// whether bar visibility changed with the restored per-tag settings.
    pub fn view_tags(&mut self, mask: TagMask, space: &TagSpace) -> Option<bool> {
        let masked = mask & space.all();
        if masked == self.view() {
            return None;
        }
        self.selected_tags ^= 1;
        if masked != 0 {
            self.tagset[self.selected_tags] = masked;
            self.pertag.previous = self.pertag.current;
            self.pertag.current = space.slot_for(mask);
        } else {
            std::mem::swap(&mut self.pertag.current, &mut self.pertag.previous);
        }
        Some(self.load_tag_settings())
    }

    /// XORs `mask` into the view; an empty result is rejected.
    pub fn toggle_view_tags(&mut self, mask: TagMask, space: &TagSpace) -> Option<bool> {
        let toggled = self.view() ^ (mask & space.all());
        if toggled == 0 {
            return None;
        }
        self.tagset[self.selected_tags] = toggled;

        let current = self.pertag.current;
        if toggled == space.all() {
            self.pertag.previous = current;
            self.pertag.current = 0;
        } else if current == 0 || toggled & (1 << (current - 1)) == 0 {
            self.pertag.previous = current;
            self.pertag.current = space.slot_for(toggled);
        }
        Some(self.load_tag_settings())
    }

    /// Restores the live settings from the current per-tag slot and reports
    /// whether bar visibility changed.
    pub fn load_tag_settings(&mut self) -> bool {
        let settings = *self.pertag.settings();
        self.nmaster = settings.nmaster;
        self.mfact = settings.mfact;
        self.selected_layout = settings.selected_layout;
        self.layouts = settings.layouts;
        let bar_changed = self.show_bar != settings.show_bar;
        self.show_bar = settings.show_bar;
        bar_changed
    }
}

/// Drops empty and duplicate screens, ordered top to bottom, left to right.
pub fn unique_geometries(screens: &[Rect]) -> Vec<Rect> {
    let mut unique: Vec<Rect> = Vec::new();
    for screen in screens {
        let has_valid_dimensions = screen.width > 0 && screen.height > 0;
        if has_valid_dimensions && !unique.contains(screen) {
            unique.push(*screen);
        }
    }

    unique.sort_by(|a, b| match a.y.cmp(&b.y) {
        std::cmp::Ordering::Equal => a.x.cmp(&b.x),
        other => other,
    });
    unique
}

/// Index of the monitor sharing the largest area with `rect`, `fallback`
/// when none overlaps.
pub fn rect_to_monitor(monitors: &[Monitor], rect: &Rect, fallback: usize) -> usize {
    let mut best = fallback;
    let mut best_area = 0;
    for (index, monitor) in monitors.iter().enumerate() {
        let area = monitor.area.intersection_area(rect);
        if area > best_area {
            best_area = area;
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> TagSettings {
        TagSettings {
            nmaster: 1,
            mfact: 0.55,
            layouts: [0, 1],
            selected_layout: 0,
            show_bar: true,
        }
    }

    fn monitor() -> (Monitor, TagSpace) {
        let space = TagSpace::new(9, 1);
        let monitor = Monitor::new(
            0,
            Rect::new(0, 0, 1920, 1080),
            defaults(),
            true,
            GapConfig::default(),
            &space,
        );
        (monitor, space)
    }

    #[test]
    fn test_bar_position_top_and_hidden() {
        let (mut monitor, _) = monitor();
        monitor.update_bar_position(40, 12);
        assert_eq!(monitor.bar_y, 12);
        assert_eq!(monitor.area, Rect::new(0, 52, 1920, 1028));

        monitor.show_bar = false;
        monitor.update_bar_position(40, 12);
        assert_eq!(monitor.bar_y, -40);
        assert_eq!(monitor.area, monitor.screen);
    }

    #[test]
    fn test_bar_position_bottom() {
        let (mut monitor, _) = monitor();
        monitor.top_bar = false;
        monitor.update_bar_position(40, 12);
        assert_eq!(monitor.area, Rect::new(0, 12, 1920, 1028));
        assert_eq!(monitor.bar_y, 1040);
    }

    #[test]
    fn test_view_same_mask_is_noop() {
        let (mut monitor, space) = monitor();
        assert_eq!(monitor.view_tags(1, &space), None);
        assert_eq!(monitor.selected_tags, 0);
    }

    #[test]
    fn test_view_round_trip_restores_settings() {
        let (mut monitor, space) = monitor();
        monitor.set_mfact(0.7);
        monitor.set_nmaster(2);
        monitor.set_layout(Some(2));

        monitor.view_tags(1 << 3, &space);
        assert_eq!(monitor.view(), 1 << 3);
        assert_eq!(monitor.pertag.current, 4);
        assert_eq!(monitor.mfact, 0.55);
        assert_eq!(monitor.nmaster, 1);
        assert_eq!(monitor.layout(), 0);

        monitor.view_tags(1, &space);
        assert_eq!(monitor.mfact, 0.7);
        assert_eq!(monitor.nmaster, 2);
        assert_eq!(monitor.layout(), 2);
    }

    #[test]
    fn test_view_empty_mask_returns_to_previous() {
        let (mut monitor, space) = monitor();
        monitor.view_tags(1 << 2, &space);
        monitor.view_tags(0, &space);
        assert_eq!(monitor.view(), 1);
        assert_eq!(monitor.pertag.current, 1);
        assert_eq!(monitor.pertag.previous, 3);
    }

    #[test]
    fn test_view_all_uses_reserved_slot() {
        let (mut monitor, space) = monitor();
        monitor.view_tags(!0, &space);
        assert_eq!(monitor.view(), space.all());
        assert_eq!(monitor.pertag.current, 0);
    }

    #[test]
    fn test_toggle_view_rejects_empty_view() {
        let (mut monitor, space) = monitor();
        assert_eq!(monitor.toggle_view_tags(1, &space), None);
        assert_eq!(monitor.view(), 1);
    }

    #[test]
    fn test_toggle_view_moves_slot_when_current_tag_leaves() {
        let (mut monitor, space) = monitor();
        monitor.toggle_view_tags(1 << 4, &space);
        assert_eq!(monitor.pertag.current, 1);
        monitor.toggle_view_tags(1, &space);
        assert_eq!(monitor.view(), 1 << 4);
        assert_eq!(monitor.pertag.current, 5);
    }

    #[test]
    fn test_set_layout_toggles_slot() {
        let (mut monitor, _) = monitor();
        monitor.set_layout(None);
        assert_eq!(monitor.layout(), 1);
        monitor.set_layout(Some(1));
        assert_eq!(monitor.layout(), 1);
        assert_eq!(monitor.selected_layout, 1);
    }

    #[test]
    fn test_unique_geometries_drops_duplicates() {
        let screens = [
            Rect::new(1920, 0, 1920, 1080),
            Rect::new(0, 0, 1920, 1080),
            Rect::new(0, 0, 1920, 1080),
            Rect::new(0, 0, 0, 0),
        ];
        assert_eq!(
            unique_geometries(&screens),
            vec![Rect::new(0, 0, 1920, 1080), Rect::new(1920, 0, 1920, 1080)]
        );
    }
}
