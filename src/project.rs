use crate::map::Grid;
use crate::ray::{Side, Trace};
use glam::{IVec2, Vec2};

/// Closest distance a wall is projected at; keeps slices finite when the
/// camera stands on a boundary or inside a wall.
pub const MIN_DISTANCE: f32 = 1e-3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
    pub const YELLOW: Self = Self::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn halved(self) -> Self {
        Self::new(self.r / 2, self.g / 2, self.b / 2)
    }
}

/// Base color of a wall type.
pub fn cell_color(value: u8) -> Rgb {
    match value {
        1 => Rgb::RED,
        2 => Rgb::GREEN,
        3 => Rgb::BLUE,
        4 => Rgb::WHITE,
        _ => Rgb::YELLOW,
    }
}

/// Wall color as seen from `side`. Faces crossed on a y boundary are drawn at
/// half brightness so corners stay readable; this is flat shading, not lighting.
pub fn shade(value: u8, side: Side) -> Rgb {
    match side {
        Side::X => cell_color(value),
        Side::Y => cell_color(value).halved(),
    }
}

/// A primitive for the rasterizer, in screen pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DrawCommand {
    /// Inclusive on both ends.
    VerticalLine { x: i32, y0: i32, y1: i32, color: Rgb },
    Line { from: IVec2, to: IVec2, color: Rgb },
    FillCircle { center: IVec2, radius: i32, color: Rgb },
    FillRect { min: IVec2, size: IVec2, color: Rgb },
    StrokeRect { min: IVec2, size: IVec2, color: Rgb },
}

/// Vertical extent `(top, bottom)` of a wall slice `distance` away on a
/// `height` pixel tall screen, centered and clipped to the screen.
pub fn slice_extent(distance: f32, height: usize) -> (i32, i32) {
    if height == 0 {
        return (0, 0);
    }
    let h = height as i64;
    let line_height = (height as f32 / distance.max(MIN_DISTANCE)).min(1e9) as i64;
    let top = (h / 2 - line_height / 2).clamp(0, h - 1);
    let bottom = (h / 2 + line_height / 2).clamp(0, h - 1);
    (top as i32, bottom as i32)
}

/// One resolved screen column.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Column {
    pub x: usize,
    pub trace: Trace,
}

impl Column {
    /// The wall slice for this column, or nothing if its ray missed.
    pub fn command(&self, height: usize) -> Option<DrawCommand> {
        let hit = self.trace.hit()?;
        let (y0, y1) = slice_extent(hit.distance, height);
        Some(DrawCommand::VerticalLine {
            x: self.x as i32,
            y0,
            y1,
            color: shade(hit.value, hit.side),
        })
    }
}

/// Flat ceiling over the top half and floor over the bottom half.
pub fn backdrop(width: usize, height: usize, ceiling: Rgb, floor: Rgb) -> [DrawCommand; 2] {
    let (w, h) = (width as i32, height as i32);
    [
        DrawCommand::FillRect {
            min: IVec2::ZERO,
            size: IVec2::new(w, h / 2),
            color: ceiling,
        },
        DrawCommand::FillRect {
            min: IVec2::new(0, h / 2),
            size: IVec2::new(w, h - h / 2),
            color: floor,
        },
    ]
}

/// Segments of a dashed line from `from` to `to`; the last dash is cut at `to`.
pub fn dashed_line(
    from: Vec2,
    to: Vec2,
    dash: f32,
    gap: f32,
    color: Rgb,
) -> impl Iterator<Item = DrawCommand> {
    let delta = to - from;
    let length = delta.length();
    let dir = delta.normalize_or_zero();
    let period = (dash + gap).max(1.);
    let count = (length / period).ceil() as usize;

    (0..count).map(move |i| {
        let start = i as f32 * period;
        let end = (start + dash).min(length);
        DrawCommand::Line {
            from: (from + dir * start).round().as_ivec2(),
            to: (from + dir * end).round().as_ivec2(),
            color,
        }
    })
}

/// Top down projection: one grid cell is `cell_px` screen pixels.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Overhead {
    pub cell_px: f32,
}

impl Overhead {
    /// Largest whole pixel cell size that fits the grid on screen.
    pub fn fit(grid: &Grid, width: usize, height: usize) -> Self {
        let cols = grid.width().max(1);
        let rows = grid.height().max(1);
        let cell_px = (width / cols).min(height / rows).max(1);
        Self {
            cell_px: cell_px as f32,
        }
    }

    pub fn to_screen(&self, world: Vec2) -> IVec2 {
        (world * self.cell_px).round().as_ivec2()
    }

    pub fn to_world(&self, screen: IVec2) -> Vec2 {
        screen.as_vec2() / self.cell_px
    }

    /// Every cell outlined, occupied cells filled with their type color.
    pub fn grid<'a>(&self, grid: &'a Grid) -> impl Iterator<Item = DrawCommand> + 'a {
        let px = self.cell_px as i32;
        grid.iter().flat_map(move |(cell, value)| {
            let min = cell * px;
            let size = IVec2::splat(px);
            let fill = (value != 0).then_some(DrawCommand::FillRect {
                min,
                size,
                color: cell_color(value),
            });
            fill.into_iter().chain(std::iter::once(DrawCommand::StrokeRect {
                min,
                size,
                color: Rgb::WHITE,
            }))
        })
    }

    pub fn marker(&self, world: Vec2, radius: i32, color: Rgb) -> DrawCommand {
        DrawCommand::FillCircle {
            center: self.to_screen(world),
            radius,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray::Hit;

    #[test]
    fn slices_shrink_with_distance_and_stay_centered() {
        assert_eq!(slice_extent(1., 480), (0, 479));
        assert_eq!(slice_extent(2., 480), (120, 360));
        assert_eq!(slice_extent(4., 480), (180, 300));
        let (top, bottom) = slice_extent(11., 480);
        assert_eq!(240 - top, bottom - 240);
    }

    #[test]
    fn tiny_distances_are_clamped_to_the_screen() {
        assert_eq!(slice_extent(0., 480), (0, 479));
        assert_eq!(slice_extent(1e-9, 480), (0, 479));
        assert_eq!(slice_extent(0.5, 480), (0, 479));
    }

    #[test]
    fn y_side_halves_the_color() {
        assert_eq!(shade(1, Side::X), Rgb::RED);
        assert_eq!(shade(1, Side::Y), Rgb::new(127, 0, 0));
        assert_eq!(shade(4, Side::Y), Rgb::new(127, 127, 127));
        assert_eq!(cell_color(9), Rgb::YELLOW);
    }

    #[test]
    fn missed_columns_draw_nothing() {
        let column = Column {
            x: 3,
            trace: Trace::DEGENERATE,
        };
        assert_eq!(column.command(480), None);

        let column = Column {
            x: 3,
            trace: Trace::Hit(Hit {
                cell: IVec2::new(1, 1),
                value: 2,
                distance: 2.,
                side: Side::Y,
            }),
        };
        assert_eq!(
            column.command(480),
            Some(DrawCommand::VerticalLine {
                x: 3,
                y0: 120,
                y1: 360,
                color: Rgb::new(0, 127, 0)
            })
        );
    }

    #[test]
    fn dashes_alternate_and_stop_at_the_end() {
        let lines = dashed_line(Vec2::ZERO, Vec2::new(32., 0.), 10., 5., Rgb::WHITE)
            .map(|command| match command {
                DrawCommand::Line { from, to, .. } => (from.x, to.x),
                other => panic!("unexpected {other:?}"),
            })
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![(0, 10), (15, 25), (30, 32)]);
        assert_eq!(
            dashed_line(Vec2::ONE, Vec2::ONE, 10., 5., Rgb::WHITE).count(),
            0
        );
    }

    #[test]
    fn overhead_maps_cells_to_pixels() {
        let grid = Grid::bordered(20, 20, 1);
        let view = Overhead::fit(&grid, 640, 480);
        assert_eq!(view.cell_px, 24.);
        assert_eq!(view.to_screen(Vec2::new(1.5, 2.)), IVec2::new(36, 48));
        assert_eq!(view.to_world(IVec2::new(36, 48)), Vec2::new(1.5, 2.));

        let commands = view.grid(&grid).collect::<Vec<_>>();
        let fills = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
            .count();
        assert_eq!(fills, 4 * 19);
        assert_eq!(commands.len(), 400 + 4 * 19);
    }
}
