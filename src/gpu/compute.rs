use wgpu::{BindGroup, BindGroupLayout, Buffer, ComputePipeline as WgpuComputePipeline, Device};

use crate::config::WORKGROUP_SIZE;
use crate::gpu::context::validated;

/// Compute pipeline running one wave step per dispatch
pub struct WaveCompute {
    pipeline: WgpuComputePipeline,
    bind_group_layout: BindGroupLayout,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl WaveCompute {
    pub fn new(device: &Device) -> anyhow::Result<Self> {
        let shader = validated(device, "wave compute shader", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("wave-compute-shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/wave.wgsl").into()),
            })
        })?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("wave-bind-group-layout"),
            entries: &[
                // Heights from the previous step
                storage_entry(0, true),
                // Heights being written
                storage_entry(1, false),
                // Wave parameters (uniform)
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("wave-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = validated(device, "wave compute pipeline", || {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("wave-compute-pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        })?;

        Ok(Self {
            pipeline,
            bind_group_layout,
        })
    }

    /// Create a bind group for the given buffers
    pub fn create_bind_group(
        &self,
        device: &Device,
        input_buffer: &Buffer,
        output_buffer: &Buffer,
        params_buffer: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("wave-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Dispatch one step over a `width` x `width` grid
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder, bind_group: &BindGroup, width: u32) {
        let workgroups = width.div_ceil(WORKGROUP_SIZE);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("wave-compute-pass"),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(workgroups, workgroups, 1);
    }
}
