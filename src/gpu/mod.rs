mod buffers;
mod compute;
mod context;
mod render;

pub use buffers::{HeightBuffers, SurfaceUniforms, WaveParams};
pub use compute::WaveCompute;
pub use context::GpuContext;
pub use render::{surface_index_bytes, surface_indices, SurfaceRenderer};
