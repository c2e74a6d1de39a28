use std::time::Duration;

use crate::gpu::surface_index_bytes;
use crate::simulation::{cell_count, EdgeMode, GpuCell};

/// Grid resolution (256x256 = 65K cells)
pub const GRID_WIDTH: u32 = 256;

/// Side length of the simulated square in world units
pub const BOUNDS: f32 = 12.0;

/// Compute shader workgroup size (must match @workgroup_size in wave.wgsl)
pub const WORKGROUP_SIZE: u32 = 16;

// ============================================
// Wave Equation Parameters
// ============================================

/// Per-step damping applied to the unforced update (< 1.0 so the surface settles)
pub const VISCOSITY: f32 = 0.95;

/// Radius of the pointer depression in world units
pub const FORCING_RADIUS: f32 = 0.2;

/// Impulse magnitude; the centre of a depression sinks by twice this per step
pub const FORCING_DEPTH: f32 = 0.01;

/// Forcing position meaning "no forcing this step"
pub const FAR_AWAY: [f32; 2] = [10000.0, 10000.0];

/// Simulation-to-render cadence input; a step runs every max(1, 7 - speed) frames
pub const SPEED: u32 = 5;

/// Window after an accepted press during which further presses are dropped
pub const COOLDOWN_MS: u64 = 120;

// ============================================
// Initial Terrain
// ============================================

/// Amplitude of the first noise octave
pub const WATER_MAX_HEIGHT: f32 = 0.1;

/// Number of summed noise octaves
pub const NOISE_OCTAVES: u32 = 15;

/// Frequency of the first noise octave
pub const NOISE_BASE_FREQUENCY: f32 = 0.025;

/// Noise coordinates span [0, NOISE_WINDOW) across the grid regardless of its width
pub const NOISE_WINDOW: f32 = 128.0;

pub const DEFAULT_SEED: u32 = 0;

// ============================================
// Camera and Shading
// ============================================

pub const CAMERA_EYE: [f32; 3] = [0.0, 2.0, -1.0];
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.2;
pub const CAMERA_FAR: f32 = 100.0;

/// Direction towards the sun (not normalized)
pub const SUN_POSITION: [f32; 3] = [-1.0, 2.6, 1.4];

/// 0x9bd2ec with 0.8 opacity
pub const WATER_COLOR: [f32; 4] = [0.608, 0.824, 0.925, 0.8];

// ============================================
// Floating Objects
// ============================================

/// Horizontal push per step along the surface normal
pub const FLOATER_PUSH: f32 = 0.01;

/// Per-step velocity retention
pub const FLOATER_DRAG: f32 = 0.998;

/// Velocity factor applied when bouncing off the edge
pub const FLOATER_BOUNCE: f32 = -0.3;

/// Distance kept from the edge of the domain
pub const FLOATER_MARGIN: f32 = 0.2;

/// Orientation slerp factor per step
pub const FLOATER_TURN_RATE: f32 = 0.017;

/// Tunable simulation parameters, fixed for a run
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    pub width: u32,
    pub bounds: f32,
    pub viscosity: f32,
    pub forcing_radius: f32,
    pub forcing_depth: f32,
    pub speed: u32,
    pub cooldown: Duration,
    pub edge_mode: EdgeMode,
    pub seed: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            bounds: BOUNDS,
            viscosity: VISCOSITY,
            forcing_radius: FORCING_RADIUS,
            forcing_depth: FORCING_DEPTH,
            speed: SPEED,
            cooldown: Duration::from_millis(COOLDOWN_MS),
            edge_mode: EdgeMode::Clamp,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationParameters {
    /// Reject parameter sets the update rule cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.width > 0, "grid width must be positive");
        let cell_bytes = cell_count(self.width) as u64 * std::mem::size_of::<GpuCell>() as u64;
        let limit = wgpu::Limits::default().max_storage_buffer_binding_size as u64;
        anyhow::ensure!(
            cell_bytes <= limit,
            "grid width {} needs {} bytes per height buffer, more than the {} byte storage limit",
            self.width,
            cell_bytes,
            limit
        );
        let index_bytes = surface_index_bytes(self.width);
        let max_buffer = wgpu::Limits::default().max_buffer_size;
        anyhow::ensure!(
            index_bytes <= max_buffer,
            "grid width {} needs a {} byte index buffer, more than the {} byte buffer limit",
            self.width,
            index_bytes,
            max_buffer
        );
        anyhow::ensure!(
            self.bounds.is_finite() && self.bounds > 0.0,
            "bounds must be a positive finite number, got {}",
            self.bounds
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.viscosity),
            "viscosity must lie in [0, 1], got {}",
            self.viscosity
        );
        anyhow::ensure!(
            self.forcing_radius.is_finite() && self.forcing_radius > 0.0,
            "forcing radius must be positive, got {}",
            self.forcing_radius
        );
        anyhow::ensure!(
            self.forcing_depth.is_finite(),
            "forcing depth must be finite"
        );
        if !self.width.is_power_of_two() {
            log::warn!("Grid width {} is not a power of two", self.width);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimulationParameters::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_viscosity() {
        let params = SimulationParameters {
            viscosity: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_radius() {
        let params = SimulationParameters {
            forcing_radius: 0.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_width() {
        let params = SimulationParameters {
            width: 70_000,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        // Fits one height buffer but not the index buffer
        let mesh_too_large = SimulationParameters {
            width: 4096,
            ..Default::default()
        };
        assert!(mesh_too_large.validate().is_err());

        let large = SimulationParameters {
            width: 2048,
            ..Default::default()
        };
        assert!(large.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_width() {
        let params = SimulationParameters {
            width: 0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
