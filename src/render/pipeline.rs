use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::instance::ShapeInstance;

/// Quad vertex — position in pixels relative to center, UV coords.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2,  // position
        1 => Float32x2,  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Half-size of the base quad in pixels.
const HALF_SIZE: f32 = 48.0;
/// Full edge of the base quad in pixels. Instance size 1.0 = this many pixels.
pub const QUAD_PX: f32 = HALF_SIZE * 2.0;

/// Unit quad centered at origin, 96x96 pixels at scale 1.0.
pub const QUAD_VERTICES: [Vertex; 4] = [
    Vertex { position: [-HALF_SIZE, -HALF_SIZE], uv: [0.0, 0.0] }, // top-left
    Vertex { position: [ HALF_SIZE, -HALF_SIZE], uv: [1.0, 0.0] }, // top-right
    Vertex { position: [ HALF_SIZE,  HALF_SIZE], uv: [1.0, 1.0] }, // bottom-right
    Vertex { position: [-HALF_SIZE,  HALF_SIZE], uv: [0.0, 1.0] }, // bottom-left
];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Upper bound on shapes per frame. The pet is ~15, each sparkle 6.
pub const MAX_INSTANCES: usize = 1024;

/// Screen uniform contents: (width, height, srgb flag, unused).
///
/// The flag tells the shader whether packed colors need linearizing for an
/// `*Srgb` target.
pub fn screen_uniform(width: f32, height: f32, srgb: bool) -> [f32; 4] {
    [width, height, if srgb { 1.0 } else { 0.0 }, 0.0]
}

/// All GPU resources for the shape pipeline.
pub struct ShapePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub instance_buffer: wgpu::Buffer,
    pub screen_uniform_buffer: wgpu::Buffer,
    pub screen_bind_group: wgpu::BindGroup,
    pub num_instances: u32,
    srgb: bool,
}

impl ShapePipeline {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shape_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/shapes.wgsl").into()),
        });

        // Bind group layout for the screen uniform
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("screen_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Instance buffer layout (28 bytes per instance)
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // offset (vec2<f32>) — 0
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 2,
                },
                // size (vec2<f32>) — 8
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 3,
                },
                // color (u32) — 16
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint32,
                    offset: 16,
                    shader_location: 4,
                },
                // shape (u32) — 20
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Uint32,
                    offset: 20,
                    shader_location: 5,
                },
                // rotation (f32) — 24
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 24,
                    shader_location: 6,
                },
            ],
        };

        // Premultiplied alpha blending
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shape_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), instance_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // 2D shapes, no culling
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_index_buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shape_instance_buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<ShapeInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let srgb = format.is_srgb();
        let screen_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("screen_uniform_buffer"),
            contents: bytemuck::cast_slice(&screen_uniform(1.0, 1.0, srgb)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let screen_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("screen_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: screen_uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            screen_uniform_buffer,
            screen_bind_group,
            num_instances: 0,
            srgb,
        }
    }

    /// Upload new instance data to the GPU. Anything past `MAX_INSTANCES` is dropped.
    pub fn update_instances(&mut self, queue: &wgpu::Queue, instances: &[ShapeInstance]) {
        let count = instances.len().min(MAX_INSTANCES);
        if count < instances.len() {
            log::warn!("Dropping {} shapes over the instance cap", instances.len() - count);
        }
        self.num_instances = count as u32;
        if count > 0 {
            queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&instances[..count]),
            );
        }
    }

    pub fn update_screen_size(&self, queue: &wgpu::Queue, width: f32, height: f32) {
        queue.write_buffer(
            &self.screen_uniform_buffer,
            0,
            bytemuck::cast_slice(&screen_uniform(width, height, self.srgb)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_uniform_carries_srgb_flag() {
        assert_eq!(screen_uniform(800.0, 600.0, true), [800.0, 600.0, 1.0, 0.0]);
        assert_eq!(screen_uniform(800.0, 600.0, false), [800.0, 600.0, 0.0, 0.0]);
    }

    #[test]
    fn uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of_val(&screen_uniform(1.0, 1.0, false)), 16);
    }

    #[test]
    fn quad_spans_quad_px() {
        let w = QUAD_VERTICES[1].position[0] - QUAD_VERTICES[0].position[0];
        assert_eq!(w, QUAD_PX);
    }
}
