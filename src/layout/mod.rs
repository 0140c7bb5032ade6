pub mod bstack;
pub mod centered;
pub mod fibonacci;
pub mod floating;
pub mod monocle;
pub mod tiling;

use crate::geometry::Rect;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapConfig {
    pub inner_horizontal: i32,
    pub inner_vertical: i32,
    pub outer_horizontal: i32,
    pub outer_vertical: i32,
}

impl GapConfig {
    pub fn uniform(size: i32) -> Self {
        Self {
            inner_horizontal: size,
            inner_vertical: size,
            outer_horizontal: size,
            outer_vertical: size,
        }
    }

    /// Gaps actually applied for `tiled` clients. Disabled gaps are zero, and
    /// smart gaps drop everything around a lone client.
    pub fn effective(&self, enabled: bool, smart: bool, tiled: usize) -> Self {
        if !enabled || (smart && tiled == 1) {
            return Self::default();
        }
        *self
    }

    pub fn grown(&self, by: i32) -> Self {
        Self {
            inner_horizontal: (self.inner_horizontal + by).max(0),
            inner_vertical: (self.inner_vertical + by).max(0),
            outer_horizontal: (self.outer_horizontal + by).max(0),
            outer_vertical: (self.outer_vertical + by).max(0),
        }
    }
}

/// Everything a layout needs; `borders` holds one entry per visible tiled
/// client in tiling order.
#[derive(Debug, Clone)]
pub struct LayoutInput<'a> {
    pub area: Rect,
    pub borders: &'a [i32],
    pub nmaster: i32,
    pub mfact: f32,
    pub gaps: GapConfig,
    /// Smallest extent the fibonacci family keeps splitting into.
    pub min_split: i32,
}

impl LayoutInput<'_> {
    pub fn count(&self) -> i32 {
        self.borders.len() as i32
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arrangement {
    /// Client geometry excluding borders, one per input client.
    pub geometries: Vec<Rect>,
    pub symbol: Option<String>,
}

pub trait Layout {
    fn arrange(&self, input: &LayoutInput) -> Arrangement;
    fn name(&self) -> &'static str;
    fn symbol(&self) -> &'static str;
    fn arranges(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum LayoutKind {
    Tile,
    BottomStack,
    Monocle,
    Deck,
    Spiral,
    Dwindle,
    CenteredMaster,
    CenteredFloatingMaster,
    Floating,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 9] = [
        Self::Tile,
        Self::BottomStack,
        Self::Monocle,
        Self::Deck,
        Self::Spiral,
        Self::Dwindle,
        Self::CenteredMaster,
        Self::CenteredFloatingMaster,
        Self::Floating,
    ];

    pub fn layout(&self) -> &'static dyn Layout {
        match self {
            Self::Tile => &tiling::TilingLayout,
            Self::BottomStack => &bstack::BottomStackLayout,
            Self::Monocle => &monocle::MonocleLayout,
            Self::Deck => &monocle::DeckLayout,
            Self::Spiral => &fibonacci::SpiralLayout,
            Self::Dwindle => &fibonacci::DwindleLayout,
            Self::CenteredMaster => &centered::CenteredMasterLayout,
            Self::CenteredFloatingMaster => &centered::CenteredFloatingMasterLayout,
            Self::Floating => &floating::FloatingLayout,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.layout().name()
    }

    pub fn arranges(&self) -> bool {
        self.layout().arranges()
    }

    pub fn from_str(s: &str) -> Result<Self, String> {
        let lowered = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .or(match lowered.as_str() {
                "tiling" => Some(Self::Tile),
                "normie" | "null" => Some(Self::Floating),
                "fibonacci" => Some(Self::Spiral),
                _ => None,
            })
            .ok_or_else(|| format!("Invalid Layout Type: {}", s))
    }
}

/// One entry of the configured layout catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEntry {
    pub kind: LayoutKind,
    pub symbol: String,
}

impl LayoutEntry {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            symbol: kind.layout().symbol().to_string(),
        }
    }

    pub fn with_symbol(kind: LayoutKind, symbol: &str) -> Self {
        Self {
            kind,
            symbol: symbol.to_string(),
        }
    }
}

/// Equal shares of `size` among `count` clients, plus the pixels left over
/// that go one by one to the first clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Share {
    pub each: i32,
    pub rest: i32,
}

impl Share {
    pub fn of(size: i32, count: i32) -> Self {
        if count <= 0 {
            return Self { each: 0, rest: 0 };
        }
        let each = size / count;
        Self {
            each,
            rest: size - each * count,
        }
    }

    pub fn nth(&self, index: i32) -> i32 {
        self.each + i32::from(index < self.rest)
    }
}

pub(crate) fn client_rect(x: i32, y: i32, width: i32, height: i32, border: i32) -> Rect {
    Rect::new(x, y, width - 2 * border, height - 2 * border)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn input(area: Rect, borders: &[i32], nmaster: i32, mfact: f32) -> LayoutInput<'_> {
        LayoutInput {
            area,
            borders,
            nmaster,
            mfact,
            gaps: GapConfig::default(),
            min_split: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_gaps_smart_single_client() {
        let gaps = GapConfig::uniform(10);
        assert_eq!(gaps.effective(true, true, 1), GapConfig::default());
        assert_eq!(gaps.effective(true, true, 2), gaps);
        assert_eq!(gaps.effective(false, false, 2), GapConfig::default());
    }

    #[test]
    fn test_grown_clamps_at_zero() {
        let gaps = GapConfig::uniform(3).grown(-5);
        assert_eq!(gaps, GapConfig::default());
    }

    #[test]
    fn test_share_distributes_remainder() {
        let share = Share::of(1000, 3);
        assert_eq!(share.each, 333);
        assert_eq!(share.rest, 1);
        assert_eq!(share.nth(0), 334);
        assert_eq!(share.nth(1), 333);
    }

    #[test]
    fn test_layout_kind_from_str() {
        assert_eq!(LayoutKind::from_str("tile"), Ok(LayoutKind::Tile));
        assert_eq!(LayoutKind::from_str("Dwindle"), Ok(LayoutKind::Dwindle));
        assert_eq!(LayoutKind::from_str("normie"), Ok(LayoutKind::Floating));
        assert!(LayoutKind::from_str("grid").is_err());
    }

    #[test]
    fn test_every_layout_is_noop_without_clients() {
        let area = Rect::new(0, 0, 800, 600);
        for kind in LayoutKind::ALL {
            let arrangement = kind.layout().arrange(&test_support::input(area, &[], 1, 0.5));
            assert!(arrangement.geometries.is_empty(), "{:?}", kind);
        }
    }

    #[test]
    fn test_every_layout_places_every_client() {
        let area = Rect::new(0, 0, 1920, 1080);
        let borders = [2; 5];
        for kind in LayoutKind::ALL.into_iter().filter(LayoutKind::arranges) {
            let arrangement = kind.layout().arrange(&test_support::input(area, &borders, 1, 0.55));
            assert_eq!(arrangement.geometries.len(), borders.len(), "{:?}", kind);
        }
    }
}
