use super::{Arrangement, Layout, LayoutInput, client_rect};

pub struct SpiralLayout;
pub struct DwindleLayout;

impl Layout for SpiralLayout {
    fn name(&self) -> &'static str {
        "spiral"
    }

    fn symbol(&self) -> &'static str {
        "[@]"
    }

    fn arrange(&self, input: &LayoutInput) -> Arrangement {
        fibonacci(input, false)
    }
}

impl Layout for DwindleLayout {
    fn name(&self) -> &'static str {
        "dwindle"
    }

    fn symbol(&self) -> &'static str {
        "[\\]"
    }

    fn arrange(&self, input: &LayoutInput) -> Arrangement {
        fibonacci(input, true)
    }
}

/// Halves the remaining area once per client, alternating the split axis.
/// Spiral walks the new slot around the four sides, dwindle always moves
/// towards the bottom right corner. Splitting stops once a half would be no
/// larger than `min_split`; the remaining clients then share the last slot.
fn fibonacci(input: &LayoutInput, dwindle: bool) -> Arrangement {
    let window_count = input.count();
    if window_count == 0 {
        return Arrangement::default();
    }

    let gaps = &input.gaps;
    let area = &input.area;
    let (inner_h, inner_v) = (gaps.inner_horizontal, gaps.inner_vertical);

    let mut x = area.x + gaps.outer_vertical;
    let mut y = area.y + gaps.outer_horizontal;
    let mut width = area.width - 2 * gaps.outer_vertical;
    let mut height = area.height - 2 * gaps.outer_horizontal;
    let mut height_rest = 0;
    let mut width_rest = 0;
    let mut splitting = true;
    let mut index = 0;

    let mut geometries = Vec::with_capacity(input.borders.len());
    for &border in input.borders {
        if splitting {
            let too_small = if index % 2 == 1 {
                (height - inner_h) / 2 <= input.min_split + 2 * border
            } else {
                (width - inner_v) / 2 <= input.min_split + 2 * border
            };
            if too_small {
                splitting = false;
            }

            if splitting && index < window_count - 1 {
                if index % 2 == 1 {
                    let half = (height - inner_h) / 2;
                    height_rest = height - 2 * half - inner_h;
                    height = half;
                } else {
                    let half = (width - inner_v) / 2;
                    width_rest = width - 2 * half - inner_v;
                    width = half;
                }

                if index % 4 == 2 && !dwindle {
                    x += width + inner_v;
                } else if index % 4 == 3 && !dwindle {
                    y += height + inner_h;
                }
            }

            match index % 4 {
                0 => {
                    if dwindle {
                        y += height + inner_h;
                        height += height_rest;
                    } else {
                        height -= height_rest;
                        y -= height + inner_h;
                    }
                }
                1 => {
                    x += width + inner_v;
                    width += width_rest;
                }
                2 => {
                    y += height + inner_h;
                    height += height_rest;
                    if index < window_count - 1 {
                        width += width_rest;
                    }
                }
                _ => {
                    if dwindle {
                        x += width + inner_v;
                        width -= width_rest;
                    } else {
                        width -= width_rest;
                        x -= width + inner_v;
                        height += height_rest;
                    }
                }
            }

            if index == 0 {
                if window_count != 1 {
                    let usable = (area.width - inner_v - 2 * gaps.outer_vertical) as f32;
                    width = (usable - usable * (1.0 - input.mfact)) as i32;
                    width_rest = 0;
                }
                y = area.y + gaps.outer_horizontal;
            } else if index == 1 {
                width = area.width - width - inner_v - 2 * gaps.outer_vertical;
            }
            index += 1;
        }

        geometries.push(client_rect(x, y, width, height, border));
    }

    Arrangement {
        geometries,
        symbol: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layout::test_support::input;

    #[test]
    fn test_dwindle_shrinks_towards_corner() {
        let arrangement =
            DwindleLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0, 0, 0], 1, 0.5));
        assert_eq!(
            arrangement.geometries,
            vec![
                Rect::new(0, 0, 500, 1000),
                Rect::new(500, 0, 500, 500),
                Rect::new(500, 500, 250, 500),
                Rect::new(750, 500, 250, 500),
            ]
        );
    }

    #[test]
    fn test_spiral_turns_back_on_the_fourth_client() {
        let arrangement =
            SpiralLayout.arrange(&input(Rect::new(0, 0, 1000, 1000), &[0, 0, 0, 0], 1, 0.5));
        assert_eq!(arrangement.geometries[2], Rect::new(750, 500, 250, 500));
        assert_eq!(arrangement.geometries[3], Rect::new(500, 500, 250, 500));
    }

    #[test]
    fn test_single_client_fills_area() {
        let arrangement = SpiralLayout.arrange(&input(Rect::new(0, 0, 800, 600), &[0], 1, 0.5));
        assert_eq!(arrangement.geometries, vec![Rect::new(0, 0, 800, 600)]);
    }
}
