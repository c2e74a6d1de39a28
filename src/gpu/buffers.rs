use glam::{Mat4, Vec2, Vec3};
use wgpu::{Buffer, BufferUsages, Device, Queue};

use crate::config::{SimulationParameters, SUN_POSITION, WATER_COLOR};
use crate::gpu::context::validated;
use crate::simulation::{cell_count, GpuCell};

/// Manages ping-pong storage buffers for the heightfield
pub struct HeightBuffers {
    /// Buffer A - ping
    pub buffer_a: Buffer,
    /// Buffer B - pong
    pub buffer_b: Buffer,
    /// Uniform buffer for wave parameters
    pub params_buffer: Buffer,
    /// Uniform buffer for surface shading
    pub surface_buffer: Buffer,
    /// Which buffer is current input (true = A is input, false = B is input)
    read_from_a: bool,
    params: SimulationParameters,
}

/// Wave parameters passed to the compute shader (32 bytes, aligned to 16)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaveParams {
    // Grid info (16 bytes)
    pub width: u32,
    pub edge_mode: u32,
    pub bounds: f32,
    pub viscosity: f32,

    // Forcing (16 bytes)
    pub forcing_pos: [f32; 2],
    pub forcing_radius: f32,
    pub forcing_depth: f32,
}

/// Surface shading parameters passed to the render shader (128 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w unused
    pub camera_pos: [f32; 4],
    /// xyz = direction towards the sun, w unused
    pub sun_dir: [f32; 4],
    pub water_color: [f32; 4],

    pub width: u32,
    pub edge_mode: u32,
    pub bounds: f32,
    pub _padding: f32,
}

impl WaveParams {
    pub fn new(params: &SimulationParameters, forcing_pos: Vec2) -> Self {
        Self {
            width: params.width,
            edge_mode: params.edge_mode.shader_id(),
            bounds: params.bounds,
            viscosity: params.viscosity,
            forcing_pos: forcing_pos.to_array(),
            forcing_radius: params.forcing_radius,
            forcing_depth: params.forcing_depth,
        }
    }
}

impl SurfaceUniforms {
    pub fn new(params: &SimulationParameters, view_proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: eye.extend(1.0).to_array(),
            sun_dir: Vec3::from_array(SUN_POSITION).normalize().extend(0.0).to_array(),
            water_color: WATER_COLOR,
            width: params.width,
            edge_mode: params.edge_mode.shader_id(),
            bounds: params.bounds,
            _padding: 0.0,
        }
    }
}

impl HeightBuffers {
    /// Create new height buffers and upload the initial grid
    pub fn new(
        device: &Device,
        queue: &Queue,
        params: &SimulationParameters,
        initial_data: &[GpuCell],
    ) -> anyhow::Result<Self> {
        let cells = cell_count(params.width);
        anyhow::ensure!(
            initial_data.len() == cells,
            "initial data holds {} cells, expected {}",
            initial_data.len(),
            cells
        );

        let buffer_size = (cells * std::mem::size_of::<GpuCell>()) as u64;

        let (buffer_a, buffer_b) = validated(device, "height buffers", || {
            let create = |label| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: buffer_size,
                    usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            };
            (create("height-buffer-a"), create("height-buffer-b"))
        })?;

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave-params-buffer"),
            size: std::mem::size_of::<WaveParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let surface_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("surface-uniforms-buffer"),
            size: std::mem::size_of::<SurfaceUniforms>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Both halves start from the same state so either can be read first
        queue.write_buffer(&buffer_a, 0, bytemuck::cast_slice(initial_data));
        queue.write_buffer(&buffer_b, 0, bytemuck::cast_slice(initial_data));

        Ok(Self {
            buffer_a,
            buffer_b,
            params_buffer,
            surface_buffer,
            read_from_a: true,
            params: params.clone(),
        })
    }

    pub fn width(&self) -> u32 {
        self.params.width
    }

    /// Get (input_buffer, output_buffer) for the next step
    pub fn io_buffers(&self) -> (&Buffer, &Buffer) {
        if self.read_from_a {
            (&self.buffer_a, &self.buffer_b)
        } else {
            (&self.buffer_b, &self.buffer_a)
        }
    }

    /// Buffer holding the latest completed step
    pub fn current(&self) -> &Buffer {
        self.io_buffers().0
    }

    /// Swap buffers after a compute pass has been encoded
    pub fn swap(&mut self) {
        self.read_from_a = !self.read_from_a;
    }

    /// Upload the forcing for the next step
    pub fn update_params(&self, queue: &Queue, forcing_pos: Vec2) {
        let params = WaveParams::new(&self.params, forcing_pos);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));
    }

    /// Upload camera and lighting for this frame
    pub fn update_surface(&self, queue: &Queue, view_proj: Mat4, eye: Vec3) {
        let uniforms = SurfaceUniforms::new(&self.params, view_proj, eye);
        queue.write_buffer(&self.surface_buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}
