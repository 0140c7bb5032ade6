use super::{Arrangement, Layout, LayoutInput, Share, client_rect};

pub struct CenteredMasterLayout;
pub struct CenteredFloatingMasterLayout;

impl Layout for CenteredMasterLayout {
    fn name(&self) -> &'static str {
        "centeredmaster"
    }

    fn symbol(&self) -> &'static str {
        "|M|"
    }

    fn arrange(&self, input: &LayoutInput) -> Arrangement {
        let window_count = input.count();
        if window_count == 0 {
            return Arrangement::default();
        }

        let gaps = &input.gaps;
        let area = &input.area;
        let (inner_h, inner_v) = (gaps.inner_horizontal, gaps.inner_vertical);
        let (outer_h, outer_v) = (gaps.outer_horizontal, gaps.outer_vertical);
        let nmaster = input.nmaster.max(0);
        let stack_count = window_count - nmaster;
        let is_master = |index: i32| nmaster == 0 || index < nmaster;

        let mut master_x = area.x + outer_v;
        let mut master_y = area.y + outer_h;
        let master_rows = if nmaster == 0 {
            window_count
        } else {
            window_count.min(nmaster)
        };
        let master_height = area.height - 2 * outer_h - inner_h * (master_rows - 1);
        let mut master_width = area.width - 2 * outer_v;
        let left_height = area.height - 2 * outer_h - inner_h * (stack_count / 2 - 1);
        let right_height = area.height
            - 2 * outer_h
            - inner_h * (stack_count / 2 - if stack_count % 2 == 1 { 0 } else { 1 });

        let (mut left_x, mut left_y, mut left_width) = (0, 0, 0);
        let (mut right_x, mut right_y, mut right_width) = (0, 0, 0);

        if nmaster > 0 && window_count > nmaster {
            if stack_count > 1 {
                master_width =
                    ((area.width - 2 * outer_v - 2 * inner_v) as f32 * input.mfact) as i32;
                left_width = (area.width - master_width - 2 * outer_v - 2 * inner_v) / 2;
                right_width = (area.width - master_width - 2 * outer_v - 2 * inner_v) - left_width;
                master_x += left_width + inner_v;
            } else {
                master_width = ((master_width - inner_v) as f32 * input.mfact) as i32;
                right_width = area.width - master_width - inner_v - 2 * outer_v;
            }
            left_x = area.x + outer_v;
            left_y = area.y + outer_h;
            right_x = master_x + master_width + inner_v;
            right_y = area.y + outer_h;
        }

        let (mut masters, mut lefts, mut rights) = (0, 0, 0);
        for index in 0..window_count {
            if is_master(index) {
                masters += 1;
            } else if (index - nmaster) % 2 == 1 {
                lefts += 1;
            } else {
                rights += 1;
            }
        }
        let master_share = Share::of(master_height, masters);
        let left_share = Share::of(left_height, lefts);
        let right_share = Share::of(right_height, rights);

        let mut geometries = Vec::with_capacity(input.borders.len());
        for (index, &border) in input.borders.iter().enumerate() {
            let index = index as i32;
            if is_master(index) {
                let height = master_share.nth(index);
                geometries.push(client_rect(master_x, master_y, master_width, height, border));
                master_y += height + inner_h;
                continue;
            }

            let column_index = (index - nmaster) / 2;
            if (index - nmaster) % 2 == 1 {
                let height = left_share.nth(column_index);
                geometries.push(client_rect(left_x, left_y, left_width, height, border));
                left_y += height + inner_h;
            } else {
                let height = right_share.nth(column_index);
                geometries.push(client_rect(right_x, right_y, right_width, height, border));
                right_y += height + inner_h;
            }
        }

        Arrangement {
            geometries,
            symbol: None,
        }
    }
}

impl Layout for CenteredFloatingMasterLayout {
    fn name(&self) -> &'static str {
        "centeredfloatingmaster"
    }

    fn symbol(&self) -> &'static str {
        ">M>"
    }

    fn arrange(&self, input: &LayoutInput) -> Arrangement {
        let window_count = input.count();
        if window_count == 0 {
            return Arrangement::default();
        }

        let gaps = &input.gaps;
        let area = &input.area;
        let inner_v = gaps.inner_vertical;
        let (outer_h, outer_v) = (gaps.outer_horizontal, gaps.outer_vertical);
        let nmaster = input.nmaster.max(0);
        let master_count = window_count.min(nmaster);
        let mut master_gap_factor = 1.0_f32;

        let mut master_x = area.x + outer_v;
        let mut master_y = area.y + outer_h;
        let mut stack_x = master_x;
        let stack_y = master_y;
        let mut master_height = area.height - 2 * outer_h;
        let stack_height = master_height;
        let mut master_width = area.width - 2 * outer_v - inner_v * (window_count - 1);
        let stack_width = area.width - 2 * outer_v - inner_v * (window_count - nmaster - 1);

        if nmaster > 0 && window_count > nmaster {
            master_gap_factor = 0.8;
            let master_gaps = inner_v as f32 * master_gap_factor * (master_count - 1) as f32;
            if area.width > area.height {
                master_width = (area.width as f32 * input.mfact - master_gaps) as i32;
                master_height = (area.height as f64 * 0.9) as i32;
            } else {
                master_width = (area.width as f64 * 0.9 - master_gaps as f64) as i32;
                master_height = (area.height as f32 * input.mfact) as i32;
            }
            master_x = area.x + (area.width - master_width) / 2;
            master_y = area.y + (area.height - master_height - 2 * outer_h) / 2;
            stack_x = area.x + outer_v;
        }

        let master_share = Share::of(master_width, master_count);
        let stack_share = Share::of(stack_width, window_count - nmaster);

        let mut geometries = Vec::with_capacity(input.borders.len());
        for (index, &border) in input.borders.iter().enumerate() {
            let index = index as i32;
            if index < nmaster {
                let width = master_share.nth(index);
                geometries.push(client_rect(master_x, master_y, width, master_height, border));
                master_x =
                    (master_x as f32 + width as f32 + inner_v as f32 * master_gap_factor) as i32;
            } else {
                let width = stack_share.nth(index - nmaster);
                geometries.push(client_rect(stack_x, stack_y, width, stack_height, border));
                stack_x += width + inner_v;
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
    use crate::layout::test_support::input;

    #[test]
    fn test_centered_master_between_two_columns() {
        let arrangement =
            CenteredMasterLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0, 0], 1, 0.5));
        assert_eq!(
            arrangement.geometries,
            vec![
                Rect::new(250, 0, 500, 1000),
                Rect::new(750, 0, 250, 1000),
                Rect::new(0, 0, 250, 1000),
            ]
        );
    }

    #[test]
    fn test_centered_master_with_single_stack_client_uses_right_column() {
        let arrangement =
            CenteredMasterLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0], 1, 0.5));
        assert_eq!(
            arrangement.geometries,
            vec![Rect::new(0, 0, 500, 1000), Rect::new(500, 0, 500, 1000)]
        );
    }

    #[test]
    fn test_centered_floating_master_overlaps_stack() {
        let arrangement = CenteredFloatingMasterLayout
            .arrange(&input(Rect::new(0, 0, 2000, 1000), &[0, 0, 0], 1, 0.5));
        assert_eq!(arrangement.geometries[0], Rect::new(500, 50, 1000, 900));
        assert_eq!(arrangement.geometries[1], Rect::new(0, 0, 1000, 1000));
        assert_eq!(arrangement.geometries[2], Rect::new(1000, 0, 1000, 1000));
    }
}
