use glam::Vec2;

/// Mapping between grid cells and the world-space square they cover.
///
/// The square is centred on the origin in the XZ plane; `Vec2` values here
/// are (x, z) world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub width: u32,
    pub bounds: f32,
}

impl Domain {
    pub fn new(width: u32, bounds: f32) -> Self {
        Self { width, bounds }
    }

    /// World units per cell
    pub fn cell_size(&self) -> f32 {
        self.bounds / self.width as f32
    }

    pub fn half_extent(&self) -> f32 {
        self.bounds * 0.5
    }

    /// World position of the centre of cell (i, j)
    pub fn cell_center(&self, i: u32, j: u32) -> Vec2 {
        (Vec2::new(i as f32, j as f32) + 0.5) * self.cell_size() - self.half_extent()
    }

    /// Continuous grid coordinates; cell centres land on integers
    pub fn to_grid(&self, world: Vec2) -> Vec2 {
        (world + self.half_extent()) / self.cell_size() - 0.5
    }

    /// Cell containing `world`, clamped to the edge for points outside the square
    pub fn cell_at(&self, world: Vec2) -> (u32, u32) {
        let grid = ((world + self.half_extent()) / self.cell_size()).floor();
        let last = (self.width - 1) as f32;
        (
            grid.x.clamp(0.0, last) as u32,
            grid.y.clamp(0.0, last) as u32,
        )
    }

    pub fn contains(&self, world: Vec2) -> bool {
        let h = self.half_extent();
        world.x >= -h && world.x <= h && world.y >= -h && world.y <= h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_center_round_trip() {
        let domain = Domain::new(256, 12.0);
        for j in (0..256).step_by(5) {
            for i in (0..256).step_by(3) {
                assert_eq!(domain.cell_at(domain.cell_center(i, j)), (i, j));
            }
        }
        assert_eq!(domain.cell_at(domain.cell_center(255, 255)), (255, 255));
    }

    #[test]
    fn test_corner_cells() {
        let domain = Domain::new(4, 8.0);
        assert_eq!(domain.cell_center(0, 0), Vec2::new(-3.0, -3.0));
        assert_eq!(domain.cell_center(3, 3), Vec2::new(3.0, 3.0));
    }

    #[test]
    fn test_out_of_domain_clamps() {
        let domain = Domain::new(16, 12.0);
        assert_eq!(domain.cell_at(Vec2::new(-100.0, 100.0)), (0, 15));
        assert_eq!(domain.cell_at(Vec2::new(6.0, -6.0)), (15, 0));
        assert!(!domain.contains(Vec2::new(6.5, 0.0)));
    }

    #[test]
    fn test_to_grid_centres_are_integral() {
        let domain = Domain::new(8, 2.0);
        let g = domain.to_grid(domain.cell_center(5, 2));
        assert!((g.x - 5.0).abs() < 1e-5);
        assert!((g.y - 2.0).abs() < 1e-5);
    }
}
