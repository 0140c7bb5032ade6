//! Tag bitmask arithmetic.
//!
//! Ordinary tags occupy the low bits, scratchpad tags sit directly above
//! them. The per-tag slot index 0 is reserved for the "all tags" view, slot
//! `i + 1` belongs to ordinary tag `i`.

pub type TagMask = u32;

/// Attempts made by `shiftview`/`shifttag` before giving up.
pub const SHIFT_ATTEMPTS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagSpace {
    pub tags: usize,
    pub scratchpads: usize,
}

impl TagSpace {
    pub fn new(tags: usize, scratchpads: usize) -> Self {
        Self { tags, scratchpads }
    }

    /// Every valid bit, ordinary and scratchpad.
    pub fn all(&self) -> TagMask {
        low_bits(self.tags + self.scratchpads)
    }

    pub fn ordinary(&self) -> TagMask {
        low_bits(self.tags)
    }

    pub fn scratch_mask(&self) -> TagMask {
        low_bits(self.scratchpads) << self.tags
    }

    pub fn scratch_tag(&self, index: usize) -> TagMask {
        1 << (self.tags + index)
    }

    pub fn tag(&self, index: usize) -> TagMask {
        1 << index
    }

    /// Number of per-tag slots, including the "all tags" slot.
    pub fn slots(&self) -> usize {
        self.tags + 1
    }

    /// Per-tag slot for a view mask: 0 for the all-tags view, otherwise the
    /// lowest ordinary tag plus one. Pure scratchpad views share slot 0.
    pub fn slot_for(&self, mask: TagMask) -> usize {
        if mask == self.all() || mask == !0 {
            return 0;
        }
        lowest_tag(mask & self.ordinary()).map_or(0, |index| index + 1)
    }
}

fn low_bits(count: usize) -> TagMask {
    if count >= TagMask::BITS as usize {
        !0
    } else {
        (1 << count) - 1
    }
}

pub fn lowest_tag(mask: TagMask) -> Option<usize> {
    (mask != 0).then(|| mask.trailing_zeros() as usize)
}

pub fn is_single_tag(mask: TagMask) -> bool {
    mask.count_ones() == 1
}

/// Rotates `mask` as a circular bit-string of `width` bits. Positive `by`
/// shifts towards higher tags, negative towards lower ones.
pub fn rotate(mask: TagMask, by: i32, width: usize) -> TagMask {
    if width == 0 {
        return mask;
    }
    let width_bits = low_bits(width);
    let mask = mask & width_bits;
    let shift = by.rem_euclid(width as i32) as u32;
    if shift == 0 {
        return mask;
    }
    ((mask << shift) | (mask >> (width as u32 - shift))) & width_bits
}

/// Searches rotations by increasing multiples of `step` for one that hits an
/// occupied tag, as `shiftview` and `shifttag` do.
pub fn next_occupied_rotation(
    current: TagMask,
    step: i32,
    width: usize,
    occupied: TagMask,
) -> Option<TagMask> {
    if step == 0 {
        return None;
    }
    let mut by = step;
    for _ in 0..SHIFT_ATTEMPTS {
        let candidate = rotate(current, by, width);
        if candidate & occupied != 0 {
            return Some(candidate);
        }
        by += step;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_for_nine_tags_one_scratchpad() {
        let space = TagSpace::new(9, 1);
        assert_eq!(space.all(), 0x3ff);
        assert_eq!(space.ordinary(), 0x1ff);
        assert_eq!(space.scratch_mask(), 0x200);
        assert_eq!(space.scratch_tag(0), 0x200);
    }

    #[test]
    fn test_slot_for() {
        let space = TagSpace::new(9, 1);
        assert_eq!(space.slot_for(!0), 0);
        assert_eq!(space.slot_for(space.all()), 0);
        assert_eq!(space.slot_for(1 << 4), 5);
        assert_eq!(space.slot_for((1 << 2) | (1 << 6)), 3);
        assert_eq!(space.slot_for(space.scratch_tag(0)), 0);
    }

    #[test]
    fn test_rotate_wraps_within_width() {
        assert_eq!(rotate(1 << 8, 1, 9), 1);
        assert_eq!(rotate(1, -1, 9), 1 << 8);
        assert_eq!(rotate(0b11, 2, 9), 0b1100);
        assert_eq!(rotate(1, 9, 9), 1);
    }

    #[test]
    fn test_next_occupied_rotation_skips_empty_tags() {
        let occupied = 1 << 4;
        assert_eq!(next_occupied_rotation(1, 1, 9, occupied), Some(1 << 4));
        assert_eq!(next_occupied_rotation(1, -1, 9, occupied), Some(1 << 4));
    }

    #[test]
    fn test_next_occupied_rotation_gives_up_without_clients() {
        assert_eq!(next_occupied_rotation(1, 1, 9, 0), None);
    }
}
