use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline as WgpuRenderPipeline,
    TextureFormat, TextureView,
};

use crate::gpu::context::validated;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Byte size of the index buffer for a `width` x `width` lattice
pub fn surface_index_bytes(width: u32) -> u64 {
    let quads = width.saturating_sub(1) as u64;
    quads * quads * 6 * std::mem::size_of::<u32>() as u64
}

/// Triangle indices for a `width` x `width` vertex lattice (counter-clockwise seen from +y)
pub fn surface_indices(width: u32) -> Vec<u32> {
    let quads = width.saturating_sub(1);
    let mut indices = Vec::with_capacity((quads * quads * 6) as usize);

    for j in 0..quads {
        for i in 0..quads {
            let top_left = j * width + i;
            let top_right = top_left + 1;
            let bottom_left = top_left + width;
            let bottom_right = bottom_left + 1;

            indices.extend_from_slice(&[
                top_left,
                bottom_left,
                top_right,
                top_right,
                bottom_left,
                bottom_right,
            ]);
        }
    }

    indices
}

/// Render pipeline drawing the simulated heightfield as a lit water mesh
pub struct SurfaceRenderer {
    pipeline: WgpuRenderPipeline,
    bind_group_layout: BindGroupLayout,
    index_buffer: Buffer,
    index_count: u32,
    depth_view: TextureView,
}

impl SurfaceRenderer {
    pub fn new(
        device: &Device,
        format: TextureFormat,
        width: u32,
        size: (u32, u32),
    ) -> anyhow::Result<Self> {
        let shader = validated(device, "surface shader", || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("surface-shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/surface.wgsl").into()),
            })
        })?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("surface-bind-group-layout"),
            entries: &[
                // Heights storage buffer (read-only)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Camera and lighting (uniform)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
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
            label: Some("surface-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = validated(device, "surface render pipeline", || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("surface-render-pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    // Visible from both sides
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        })?;

        let indices = surface_indices(width);
        let index_buffer = validated(device, "surface index buffer", || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("surface-index-buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        })?;

        Ok(Self {
            pipeline,
            bind_group_layout,
            index_buffer,
            index_count: indices.len() as u32,
            depth_view: create_depth_view(device, size),
        })
    }

    /// Recreate the depth buffer for a new surface size
    pub fn resize(&mut self, device: &Device, size: (u32, u32)) {
        self.depth_view = create_depth_view(device, size);
    }

    /// Create a bind group for the given height buffer and uniforms
    pub fn create_bind_group(
        &self,
        device: &Device,
        heights_buffer: &Buffer,
        surface_buffer: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("surface-bind-group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: heights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: surface_buffer.as_entire_binding(),
                },
            ],
        })
    }

    /// Draw the water surface to the given texture view
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &TextureView,
        bind_group: &BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("surface-render-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.02, // Dark pond floor
                        g: 0.05,
                        b: 0.07,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

fn create_depth_view(device: &Device, (width, height): (u32, u32)) -> TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("surface-depth-texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_shader_validates() {
        let module = naga::front::wgsl::parse_str(include_str!("../shaders/surface.wgsl"))
            .expect("surface.wgsl should parse");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .expect("surface.wgsl should validate");

        let uniforms = module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(n), naga::TypeInner::Struct { span, .. }) if n == "SurfaceUniforms" => {
                    Some(*span)
                }
                _ => None,
            })
            .expect("SurfaceUniforms declared in surface.wgsl");
        assert_eq!(
            uniforms as usize,
            std::mem::size_of::<crate::gpu::SurfaceUniforms>()
        );

        let stages: Vec<_> = module.entry_points.iter().map(|ep| ep.name.as_str()).collect();
        assert!(stages.contains(&"vs_main") && stages.contains(&"fs_main"));
    }

    #[test]
    fn test_index_count() {
        assert_eq!(surface_indices(256).len(), 255 * 255 * 6);
        assert!(surface_indices(1).is_empty());
        assert_eq!(
            surface_index_bytes(256),
            (surface_indices(256).len() * 4) as u64
        );
    }

    #[test]
    fn test_indices_stay_in_range() {
        let width = 5;
        let indices = surface_indices(width);
        assert!(indices.iter().all(|&i| i < width * width));
        assert_eq!(&indices[..6], &[0, 5, 1, 1, 5, 6]);
    }
}
