//! Objects drifting on the simulated surface.

use glam::{Quat, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{
    FLOATER_BOUNCE, FLOATER_DRAG, FLOATER_MARGIN, FLOATER_PUSH, FLOATER_TURN_RATE,
};
use crate::simulation::sampler::SurfaceSampler;

/// Offset applied when pushing a body back inside the edge
const EDGE_NUDGE: f32 = 0.001;

#[derive(Debug, Clone, PartialEq)]
pub struct Floater {
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
}

impl Floater {
    pub fn new(x: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, 0.0, z),
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    /// Drift one step along the surface slope
    pub fn step(&mut self, sampler: &SurfaceSampler) {
        let start = self.position;
        let surface = sampler.sample(self.position.x, self.position.z);

        self.position.y = surface.height;

        let push = Vec3::new(surface.normal.x, 0.0, surface.normal.z) * FLOATER_PUSH;
        self.velocity = (self.velocity + push) * FLOATER_DRAG;
        self.position += self.velocity;

        let limit = sampler.domain().half_extent() - FLOATER_MARGIN;
        bounce(&mut self.position.x, &mut self.velocity.x, limit);
        bounce(&mut self.position.z, &mut self.velocity.z, limit);

        // Face the direction of travel, tilted onto the surface
        let mut heading = start - self.position;
        heading.y = 0.0;
        let Some(heading) = heading.try_normalize() else {
            return;
        };
        let yaw = Quat::from_rotation_arc(Vec3::NEG_Z, heading);
        let tilt = Quat::from_rotation_arc(Vec3::Y, surface.normal);
        self.orientation = self.orientation.slerp(tilt * yaw, FLOATER_TURN_RATE);
    }
}

fn bounce(position: &mut f32, velocity: &mut f32, limit: f32) {
    if *position < -limit {
        *position = -limit + EDGE_NUDGE;
        *velocity *= FLOATER_BOUNCE;
    } else if *position > limit {
        *position = limit - EDGE_NUDGE;
        *velocity *= FLOATER_BOUNCE;
    }
}

/// A set of floaters scattered over the central part of the domain
pub struct FloaterField {
    pub floaters: Vec<Floater>,
}

impl FloaterField {
    pub fn scatter(count: usize, bounds: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let spread = bounds * 0.35;
        let floaters = (0..count)
            .map(|_| {
                Floater::new(
                    rng.gen_range(-spread..=spread),
                    rng.gen_range(-spread..=spread),
                )
            })
            .collect();
        Self { floaters }
    }

    pub fn step(&mut self, sampler: &SurfaceSampler) {
        for floater in &mut self.floaters {
            floater.step(sampler);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::cell::GpuCell;
    use crate::simulation::grid::{EdgeMode, HeightGrid};

    fn tilted(width: u32) -> HeightGrid {
        // Rises towards +x
        let cells = (0..width * width)
            .map(|idx| GpuCell::at_rest((idx % width) as f32 * 0.05))
            .collect();
        HeightGrid::from_cells(width, EdgeMode::Clamp, cells)
    }

    #[test]
    fn test_scatter_is_seeded_and_inside() {
        let a = FloaterField::scatter(20, 12.0, 3);
        let b = FloaterField::scatter(20, 12.0, 3);
        assert_eq!(a.floaters, b.floaters);
        for f in &a.floaters {
            assert!(f.position.x.abs() <= 4.2 && f.position.z.abs() <= 4.2);
        }
    }

    #[test]
    fn test_still_water_keeps_floater_in_place() {
        let grid = HeightGrid::new(16, EdgeMode::Clamp);
        let sampler = SurfaceSampler::new(&grid, 12.0);
        let mut floater = Floater::new(1.0, -2.0);
        for _ in 0..10 {
            floater.step(&sampler);
        }
        assert_eq!(floater.position, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(floater.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_floater_slides_downhill() {
        let grid = tilted(32);
        let sampler = SurfaceSampler::new(&grid, 12.0);
        let mut floater = Floater::new(0.0, 0.0);
        for _ in 0..5 {
            floater.step(&sampler);
        }
        assert!(floater.position.x < 0.0);
        assert!(floater.velocity.x < 0.0);
        assert!(floater.position.z.abs() < 1e-6);
        assert!(floater.orientation.is_normalized());
    }

    #[test]
    fn test_floater_bounces_off_edge() {
        let grid = HeightGrid::new(16, EdgeMode::Clamp);
        let sampler = SurfaceSampler::new(&grid, 12.0);
        let mut floater = Floater::new(5.7, 0.0);
        floater.velocity = Vec3::new(0.2, 0.0, 0.0);

        floater.step(&sampler);

        assert!((floater.position.x - (5.8 - EDGE_NUDGE)).abs() < 1e-5);
        assert!(floater.velocity.x < 0.0);
    }
}
