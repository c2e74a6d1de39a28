mod cell;
mod clock;
mod domain;
mod floaters;
mod forcing;
mod grid;
mod noise_field;
mod sampler;
mod wave;

pub use cell::GpuCell;
pub use clock::{SimulationClock, StepScheduler};
pub use domain::Domain;
pub use floaters::{Floater, FloaterField};
pub use forcing::{
    normalize_pointer, ForcingController, InputSnapshot, PointerPhase, PointerState, Ray,
    Raycaster,
};
pub use grid::{cell_count, EdgeMode, GridStats, HeightGrid};
pub use noise_field::NoiseField;
pub use sampler::{SurfaceSample, SurfaceSampler};
pub use wave::{forcing_impulse, Forcing, WaveSimulator};
