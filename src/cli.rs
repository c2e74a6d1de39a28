//! Command-line argument parsing.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{
    SimulationParameters, BOUNDS, COOLDOWN_MS, DEFAULT_SEED, FORCING_DEPTH, FORCING_RADIUS,
    GRID_WIDTH, SPEED, VISCOSITY,
};
use crate::simulation::EdgeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeArg {
    Clamp,
    Wrap,
}

impl From<EdgeArg> for EdgeMode {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Clamp => EdgeMode::Clamp,
            EdgeArg::Wrap => EdgeMode::Wrap,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "ripple-pond")]
#[command(about = "Interactive GPU water surface", long_about = None)]
pub struct Args {
    /// Grid resolution (cells per side)
    #[arg(long, default_value_t = GRID_WIDTH)]
    pub width: u32,

    /// Side length of the water square in world units
    #[arg(long, default_value_t = BOUNDS)]
    pub bounds: f32,

    /// Damping applied every step (0..1)
    #[arg(long, default_value_t = VISCOSITY)]
    pub viscosity: f32,

    /// Radius of a pointer ripple in world units
    #[arg(long, default_value_t = FORCING_RADIUS)]
    pub forcing_radius: f32,

    /// Depth of a pointer ripple
    #[arg(long, default_value_t = FORCING_DEPTH)]
    pub forcing_depth: f32,

    /// Simulation cadence: one step every max(1, 7 - speed) frames
    #[arg(long, default_value_t = SPEED)]
    pub speed: u32,

    /// Minimum time between accepted pointer presses
    #[arg(long, value_name = "MS", default_value_t = COOLDOWN_MS)]
    pub cooldown_ms: u64,

    /// Seed for the initial noise terrain
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u32,

    /// Neighbor lookup past the grid edge
    #[arg(long, value_enum, default_value = "clamp")]
    pub edge_mode: EdgeArg,

    /// Run the CPU simulation for this many steps without a window
    #[arg(long, value_name = "STEPS")]
    pub headless: Option<u32>,

    /// Number of floating objects simulated in headless mode
    #[arg(long, value_name = "COUNT", default_value_t = 0)]
    pub floaters: usize,
}

impl Args {
    pub fn simulation_parameters(&self) -> SimulationParameters {
        SimulationParameters {
            width: self.width,
            bounds: self.bounds,
            viscosity: self.viscosity,
            forcing_radius: self.forcing_radius,
            forcing_depth: self.forcing_depth,
            speed: self.speed,
            cooldown: Duration::from_millis(self.cooldown_ms),
            edge_mode: self.edge_mode.into(),
            seed: self.seed,
        }
    }
}
