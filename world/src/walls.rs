use glam::Vec2;
use tank_arena_core::{OccupancyGrid, PlayfieldConfig, Rect};

/// Collision rectangles of a round: the four border strips first, then one
/// square per blocked cell in row-major order.
pub(crate) fn wall_rects(grid: &OccupancyGrid, playfield: &PlayfieldConfig) -> Vec<Rect> {
    let (width, height) = (playfield.width, playfield.height);
    let thickness = playfield.border_thickness;

    let mut walls = Vec::with_capacity(4 + grid.len());
    if thickness > 0.0 {
        walls.extend([
            Rect::from_min_size(Vec2::ZERO, Vec2::new(width, thickness)),
            Rect::from_min_size(Vec2::new(0.0, height - thickness), Vec2::new(width, thickness)),
            Rect::from_min_size(Vec2::ZERO, Vec2::new(thickness, height)),
            Rect::from_min_size(Vec2::new(width - thickness, 0.0), Vec2::new(thickness, height)),
        ]);
    }
    walls.extend(grid.blocked_cells().map(|cell| grid.cell_rect(cell)));
    walls
}
