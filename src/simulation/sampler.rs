use glam::{Vec2, Vec3};

use crate::simulation::domain::Domain;
use crate::simulation::grid::HeightGrid;

/// Height and normal of the surface at a world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub height: f32,
    pub normal: Vec3,
}

/// Point queries against the read buffer of a `HeightGrid`.
///
/// Queries outside the domain are clamped to the nearest edge cell.
pub struct SurfaceSampler<'a> {
    grid: &'a HeightGrid,
    domain: Domain,
}

impl<'a> SurfaceSampler<'a> {
    pub fn new(grid: &'a HeightGrid, bounds: f32) -> Self {
        Self {
            grid,
            domain: Domain::new(grid.width(), bounds),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Nearest-cell height and central-difference normal at world (x, z)
    pub fn sample(&self, x: f32, z: f32) -> SurfaceSample {
        let (i, j) = self.domain.cell_at(Vec2::new(x, z));
        SurfaceSample {
            height: self.grid.read(i, j).height,
            normal: self.normal_at_cell(i, j),
        }
    }

    /// Bilinearly interpolated height between the four surrounding cell centres
    pub fn height_bilinear(&self, x: f32, z: f32) -> f32 {
        let last = (self.grid.width() - 1) as f32;
        let g = self.domain.to_grid(Vec2::new(x, z)).clamp(Vec2::ZERO, Vec2::splat(last));
        let base = g.floor();
        let t = g - base;
        let (i, j) = (base.x as i64, base.y as i64);

        let h00 = self.grid.height_at(i, j);
        let h10 = self.grid.height_at(i + 1, j);
        let h01 = self.grid.height_at(i, j + 1);
        let h11 = self.grid.height_at(i + 1, j + 1);

        let top = h00 + (h10 - h00) * t.x;
        let bottom = h01 + (h11 - h01) * t.x;
        top + (bottom - top) * t.y
    }

    /// Surface normal from the height gradient, scaled to world units
    pub fn normal_at_cell(&self, i: u32, j: u32) -> Vec3 {
        let (x, y) = (i as i64, j as i64);
        let scale = 1.0 / self.domain.cell_size();
        let nx = (self.grid.height_at(x - 1, y) - self.grid.height_at(x + 1, y)) * scale;
        let nz = (self.grid.height_at(x, y - 1) - self.grid.height_at(x, y + 1)) * scale;
        Vec3::new(nx, 1.0, nz).normalize()
    }
}
