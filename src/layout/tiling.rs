use super::{Arrangement, Layout, LayoutInput, Share, client_rect};

pub struct TilingLayout;

impl Layout for TilingLayout {
    fn name(&self) -> &'static str {
        "tile"
    }

    fn symbol(&self) -> &'static str {
        "[]="
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
        let stack_count = window_count - nmaster;

        let master_x = area.x + gaps.outer_vertical;
        let mut master_y = area.y + gaps.outer_horizontal;
        let mut stack_x = master_x;
        let mut stack_y = master_y;
        let master_height =
            area.height - 2 * gaps.outer_horizontal - gaps.inner_horizontal * (master_count - 1);
        let stack_height =
            area.height - 2 * gaps.outer_horizontal - gaps.inner_horizontal * (stack_count - 1);
        let mut master_width = area.width - 2 * gaps.outer_vertical;
        let mut stack_width = master_width;

        if nmaster > 0 && window_count > nmaster {
            stack_width = ((master_width - gaps.inner_vertical) as f32 * (1.0 - input.mfact)) as i32;
            master_width = master_width - gaps.inner_vertical - stack_width;
            stack_x = master_x + master_width + gaps.inner_vertical;
        }

        let master_share = Share::of(master_height, master_count);
        let stack_share = Share::of(stack_height, stack_count);

        let mut geometries = Vec::with_capacity(input.borders.len());
        for (index, &border) in input.borders.iter().enumerate() {
            let index = index as i32;
            if index < nmaster {
                let height = master_share.nth(index);
                geometries.push(client_rect(master_x, master_y, master_width, height, border));
                master_y += height + gaps.inner_horizontal;
            } else {
                let height = stack_share.nth(index - nmaster);
                geometries.push(client_rect(stack_x, stack_y, stack_width, height, border));
                stack_y += height + gaps.inner_horizontal;
            }
        }

        Arrangement {
            geometries,
            symbol: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::GapConfig;
    use crate::layout::test_support::input;

    #[test]
    fn test_tile_master_and_two_stack_clients() {
        let arrangement =
            TilingLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0, 0], 1, 0.5));
        assert_eq!(
            arrangement.geometries,
            vec![
                Rect::new(0, 0, 500, 1000),
                Rect::new(500, 0, 500, 500),
                Rect::new(500, 500, 500, 500),
            ]
        );
    }

    #[test]
    fn test_tile_single_client_takes_full_width() {
        let arrangement = TilingLayout.arrange(&input(Rect::new(0, 0, 1000, 800), &[0], 1, 0.5));
        assert_eq!(arrangement.geometries, vec![Rect::new(0, 0, 1000, 800)]);
    }

    #[test]
    fn test_tile_without_master_stacks_everything() {
        let arrangement =
            TilingLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0], 0, 0.5));
        assert_eq!(
            arrangement.geometries,
            vec![Rect::new(0, 0, 1000, 500), Rect::new(0, 500, 1000, 500)]
        );
    }

    #[test]
    fn test_tile_subtracts_borders_and_gaps() {
        let mut layout_input = input(Rect::new(0, 0, 1000, 1000), &[2, 2], 1, 0.5);
        layout_input.gaps = GapConfig::uniform(10);
        let arrangement = TilingLayout.arrange(&layout_input);
        assert_eq!(
            arrangement.geometries,
            vec![Rect::new(10, 10, 481, 976), Rect::new(505, 10, 481, 976)]
        );
    }
}
