/// Largest edge accepted in a `_NET_WM_ICON` entry.
const MAX_ICON_EDGE: u32 = 16384;

/// A window icon picked from `_NET_WM_ICON`, premultiplied ARGB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub width: u32,
    pub height: u32,
    /// Size the icon is drawn at, aspect preserved inside `size`x`size`.
    pub display_width: u32,
    pub display_height: u32,
    pub pixels: Vec<u32>,
}

impl Icon {
    /// Picks the entry whose larger edge is closest to `size`, preferring
    /// entries at least that large.
    pub fn pick(data: &[u32], size: u32) -> Option<Icon> {
        let entries = entries(data)?;

        let best = entries
            .iter()
            .filter(|entry| entry.edge() >= size)
            .min_by_key(|entry| entry.edge() - size)
            .or_else(|| entries.iter().min_by_key(|entry| size - entry.edge()))?;

        if best.width == 0 || best.height == 0 {
            return None;
        }

        let (display_width, display_height) = if best.width <= best.height {
            ((best.width * size / best.height).max(1), size)
        } else {
            (size, (best.height * size / best.width).max(1))
        };

        Some(Icon {
            width: best.width,
            height: best.height,
            display_width,
            display_height,
            pixels: data[best.offset..best.offset + best.len()]
                .iter()
                .map(|&pixel| premultiply(pixel))
                .collect(),
        })
    }
}

struct Entry {
    width: u32,
    height: u32,
    offset: usize,
}

impl Entry {
    fn edge(&self) -> u32 {
        self.width.max(self.height)
    }

    fn len(&self) -> usize {
        (self.width * self.height) as usize
    }
}

fn entries(data: &[u32]) -> Option<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut cursor = 0;
    while cursor + 2 <= data.len() {
        let (width, height) = (data[cursor], data[cursor + 1]);
        if width >= MAX_ICON_EDGE || height >= MAX_ICON_EDGE {
            return None;
        }
        let entry = Entry {
            width,
            height,
            offset: cursor + 2,
        };
        if entry.offset + entry.len() > data.len() {
            break;
        }
        cursor = entry.offset + entry.len();
        entries.push(entry);
    }
    Some(entries)
}

fn premultiply(argb: u32) -> u32 {
    let alpha = argb >> 24;
    let scale = |channel: u32| (channel & 0xff) * alpha / 255;
    (alpha << 24) | (scale(argb >> 16) << 16) | (scale(argb >> 8) << 8) | scale(argb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icon_data(sizes: &[(u32, u32)]) -> Vec<u32> {
        let mut data = Vec::new();
        for &(width, height) in sizes {
            data.push(width);
            data.push(height);
            data.extend(std::iter::repeat_n(0xff00_00ff, (width * height) as usize));
        }
        data
    }

    #[test]
    fn test_pick_prefers_smallest_larger_icon() {
        let icon = Icon::pick(&icon_data(&[(16, 16), (48, 48), (64, 64)]), 32).unwrap();
        assert_eq!((icon.width, icon.height), (48, 48));
        assert_eq!((icon.display_width, icon.display_height), (32, 32));
    }

    #[test]
    fn test_pick_falls_back_to_largest_smaller_icon() {
        let icon = Icon::pick(&icon_data(&[(16, 16), (24, 12)]), 32).unwrap();
        assert_eq!((icon.width, icon.height), (24, 12));
        assert_eq!((icon.display_width, icon.display_height), (32, 16));
    }

    #[test]
    fn test_truncated_data_is_ignored() {
        let mut data = icon_data(&[(16, 16)]);
        data.extend([64, 64, 1, 2, 3]);
        let icon = Icon::pick(&data, 32).unwrap();
        assert_eq!(icon.width, 16);
    }

    #[test]
    fn test_premultiply_opaque_is_identity() {
        assert_eq!(premultiply(0xff12_3456), 0xff12_3456);
        assert_eq!(premultiply(0x00ff_ffff), 0);
    }
}
