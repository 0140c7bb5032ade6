use super::{Arrangement, Layout, LayoutInput, Share, client_rect};

pub struct MonocleLayout;

impl Layout for MonocleLayout {
    fn name(&self) -> &'static str {
        "monocle"
    }

    fn symbol(&self) -> &'static str {
        "[M]"
    }

    fn arrange(&self, input: &LayoutInput) -> Arrangement {
        let window_count = input.count();
        if window_count == 0 {
            return Arrangement::default();
        }

        let gaps = &input.gaps;
        let area = &input.area;
        let geometries = input
            .borders
            .iter()
            .map(|&border| {
                client_rect(
                    area.x + gaps.outer_vertical,
                    area.y + gaps.outer_horizontal,
                    area.width - 2 * gaps.outer_vertical,
                    area.height - 2 * gaps.outer_horizontal,
                    border,
                )
            })
            .collect();

        Arrangement {
            geometries,
            symbol: Some(format!("[{}]", window_count)),
        }
    }
}

/// Master column as in tile, the stack piled up monocle-style beside it.
pub struct DeckLayout;

impl Layout for DeckLayout {
    fn name(&self) -> &'static str {
        "deck"
    }

    fn symbol(&self) -> &'static str {
        "H[]"
    }

    fn arrange(&self, input: &LayoutInput) -> Arrangement {
        let window_count = input.count();
        if window_count == 0 {
            return Arrangement::default();
        }

        let gaps = &input.gaps;
        let area = &input.area;
        let nmaster = input.nmaster.max(0);
        let master_count = window_count.min(nmaster);

        let master_x = area.x + gaps.outer_vertical;
        let mut master_y = area.y + gaps.outer_horizontal;
        let mut stack_x = master_x;
        let stack_y = master_y;
        let master_height =
            area.height - 2 * gaps.outer_horizontal - gaps.inner_horizontal * (master_count - 1);
        let mut stack_height = master_height;
        let mut master_width = area.width - 2 * gaps.outer_vertical;
        let mut stack_width = master_width;

        if nmaster > 0 && window_count > nmaster {
            stack_width = ((master_width - gaps.inner_vertical) as f32 * (1.0 - input.mfact)) as i32;
            master_width = master_width - gaps.inner_vertical - stack_width;
            stack_x = master_x + master_width + gaps.inner_vertical;
            stack_height = area.height - 2 * gaps.outer_horizontal;
        }

        let master_share = Share::of(master_height, master_count);

        let mut geometries = Vec::with_capacity(input.borders.len());
        for (index, &border) in input.borders.iter().enumerate() {
            let index = index as i32;
            if index < nmaster {
                let height = master_share.nth(index);
                geometries.push(client_rect(master_x, master_y, master_width, height, border));
                master_y += height + gaps.inner_horizontal;
            } else {
                geometries.push(client_rect(stack_x, stack_y, stack_width, stack_height, border));
            }
        }

        let symbol = (window_count > nmaster).then(|| format!("D {}", window_count - nmaster));
        Arrangement { geometries, symbol }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::test_support::input;

    #[test]
    fn test_monocle_gives_every_client_the_full_area() {
        let area = Rect::new(0, 0, 1000, 1000);
        let arrangement = MonocleLayout.arrange(&input(area, &[0, 0, 0, 0], 1, 0.5));
        assert_eq!(arrangement.geometries, vec![area; 4]);
        assert_eq!(arrangement.symbol.as_deref(), Some("[4]"));
    }

    #[test]
    fn test_deck_stacks_non_master_clients_in_one_slot() {
        let arrangement = DeckLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0, 0], 1, 0.5));
        assert_eq!(arrangement.geometries[0], Rect::new(0, 0, 500, 1000));
        assert_eq!(arrangement.geometries[1], Rect::new(500, 0, 500, 1000));
        assert_eq!(arrangement.geometries[1], arrangement.geometries[2]);
        assert_eq!(arrangement.symbol.as_deref(), Some("D 2"));
    }

    #[test]
    fn test_deck_keeps_symbol_when_only_masters() {
        let arrangement = DeckLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0], 1, 0.5));
        assert_eq!(arrangement.symbol, None);
    }
}
