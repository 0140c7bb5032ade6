use super::{Arrangement, Layout, LayoutInput, Share, client_rect};

/// Master row on top, the rest side by side underneath.
pub struct BottomStackLayout;

impl Layout for BottomStackLayout {
    fn name(&self) -> &'static str {
        "bstack"
    }

    fn symbol(&self) -> &'static str {
        "TTT"
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

        let mut master_x = area.x + gaps.outer_vertical;
        let master_y = area.y + gaps.outer_horizontal;
        let mut stack_x = master_x;
        let mut stack_y = master_y;
        let mut master_height = area.height - 2 * gaps.outer_horizontal;
        let mut stack_height = master_height;
        let master_width =
            area.width - 2 * gaps.outer_vertical - gaps.inner_vertical * (master_count - 1);
        let stack_width =
            area.width - 2 * gaps.outer_vertical - gaps.inner_vertical * (stack_count - 1);

        if nmaster > 0 && window_count > nmaster {
            stack_height =
                ((master_height - gaps.inner_horizontal) as f32 * (1.0 - input.mfact)) as i32;
            master_height = master_height - gaps.inner_horizontal - stack_height;
            stack_y = master_y + master_height + gaps.inner_horizontal;
        }

        let master_share = Share::of(master_width, master_count);
        let stack_share = Share::of(stack_width, stack_count);

        let mut geometries = Vec::with_capacity(input.borders.len());
        for (index, &border) in input.borders.iter().enumerate() {
            let index = index as i32;
            if index < nmaster {
                let width = master_share.nth(index);
                geometries.push(client_rect(master_x, master_y, width, master_height, border));
                master_x += width + gaps.inner_vertical;
            } else {
                let width = stack_share.nth(index - nmaster);
                geometries.push(client_rect(stack_x, stack_y, width, stack_height, border));
                stack_x += width + gaps.inner_vertical;
            }
        }

        Arrangement {
            geometries,
            symbol: None,
        }
    }
}
