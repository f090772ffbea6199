//! wgpu renderer for UI draw lists.
//!
//! ```text
//! upload_atlas ─► R8 texture + bind group        (once)
//! render       ─► projection uniform, vertex buffer, optional pass
//! paint        ─► draw into a pass the host owns
//! ```

use std::sync::Arc;

use vesper_ui::{DrawData, GlyphAtlas, Rect, RenderBackend, RenderError, Vertex};

use crate::projection::{orthographic, Mat4};

/// Vertices the buffer is first sized for.
pub const INITIAL_VERTEX_CAPACITY: usize = 4096;

/// Vertex attributes matching [`Vertex`]: position, color, uv.
pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2,
    1 => Float32x4,
    2 => Float32x2
];

/// Buffer layout for [`Vertex`].
#[must_use]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

/// Vertex capacity to allocate so `needed` vertices fit.
#[must_use]
pub fn grown_capacity(current: usize, needed: usize) -> usize {
    if needed <= current {
        current
    } else {
        needed.next_power_of_two().max(INITIAL_VERTEX_CAPACITY)
    }
}

/// Atlas texture and the bind group that samples it.
struct AtlasBinding {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// Draws VESPER frames with one pipeline and one draw call.
pub struct UiRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertex_count: u32,
    viewport: Rect,
    atlas: Option<AtlasBinding>,
    target: Option<wgpu::TextureView>,
}

impl UiRenderer {
    /// Creates the pipeline for color targets of `format`.
    #[must_use]
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("VESPER UI Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/ui.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("VESPER UI Uniforms"),
            size: std::mem::size_of::<Mat4>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("VESPER UI Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("VESPER UI Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("VESPER UI Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[vertex_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("VESPER Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let vertex_buffer = create_vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);

        Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            vertex_count: 0,
            viewport: Rect::ZERO,
            atlas: None,
            target: None,
        }
    }

    /// Sets the view [`render`](RenderBackend::render) draws into. With no
    /// target, `render` only uploads and the host calls
    /// [`paint`](Self::paint) from its own pass.
    pub fn set_target(&mut self, view: Option<wgpu::TextureView>) {
        self.target = view;
    }

    /// Vertices uploaded by the last `render`.
    #[must_use]
    pub const fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Records the last uploaded frame into `pass`.
    pub fn paint<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        let Some(atlas) = &self.atlas else { return };
        if self.vertex_count == 0 || self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return;
        }

        let vp = self.viewport;
        pass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &atlas.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }

    fn upload_vertices(&mut self, draw: &DrawData) -> Result<(), RenderError> {
        let count = draw.list.len();
        self.vertex_count = u32::try_from(count)
            .map_err(|_| RenderError::new(format!("{count} vertices exceed a single draw")))?;

        let capacity = grown_capacity(self.vertex_capacity, count);
        if capacity != self.vertex_capacity {
            tracing::debug!(from = self.vertex_capacity, to = capacity, "growing ui vertex buffer");
            self.vertex_buffer = create_vertex_buffer(&self.device, capacity);
            self.vertex_capacity = capacity;
        }

        if count > 0 {
            self.queue.write_buffer(&self.vertex_buffer, 0, draw.list.as_bytes());
        }
        Ok(())
    }

    fn encode_pass(&self, view: &wgpu::TextureView) {
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("VESPER UI Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("VESPER UI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.paint(&mut pass);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Runs `f` inside a validation error scope.
    fn scoped<T>(&self, what: &str, f: impl FnOnce(&Self) -> T) -> Result<T, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(self);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(e) => Err(RenderError::new(format!("{what}: {e}"))),
            None => Ok(value),
        }
    }
}

impl RenderBackend for UiRenderer {
    fn upload_atlas(&mut self, atlas: &GlyphAtlas) -> Result<(), RenderError> {
        let size = wgpu::Extent3d {
            width: atlas.width(),
            height: atlas.height(),
            depth_or_array_layers: 1,
        };

        let binding = self.scoped("atlas upload", |r| {
            let texture = r.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("VESPER Glyph Atlas"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            });

            r.queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                atlas.bitmap(),
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(atlas.width()),
                    rows_per_image: Some(atlas.height()),
                },
                size,
            );

            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let bind_group = r.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("VESPER UI Bind Group"),
                layout: &r.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: r.uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&r.sampler),
                    },
                ],
            });

            AtlasBinding {
                _texture: texture,
                bind_group,
            }
        })?;

        tracing::debug!(width = atlas.width(), height = atlas.height(), "glyph atlas uploaded");
        self.atlas = Some(binding);
        Ok(())
    }

    fn render(&mut self, draw: &DrawData) -> Result<(), RenderError> {
        if self.atlas.is_none() {
            return Err(RenderError::new("render before atlas upload"));
        }

        self.viewport = draw.target;
        let projection = orthographic(draw.target);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&projection));
        self.upload_vertices(draw)?;

        if let Some(view) = &self.target {
            self.scoped("ui pass", |r| r.encode_pass(view))?;
        }
        Ok(())
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("VESPER UI Vertices"),
        size: (capacity * std::mem::size_of::<Vertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_matches_vertex() {
        let layout = vertex_layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes[0].offset, bytemuck::offset_of!(Vertex, position) as u64);
        assert_eq!(layout.attributes[1].offset, bytemuck::offset_of!(Vertex, color) as u64);
        assert_eq!(layout.attributes[2].offset, bytemuck::offset_of!(Vertex, uv) as u64);
    }

    #[test]
    fn test_vertex_buffer_growth() {
        assert_eq!(grown_capacity(4096, 100), 4096);
        assert_eq!(grown_capacity(4096, 4096), 4096);
        assert_eq!(grown_capacity(4096, 5000), 8192);
        assert_eq!(grown_capacity(0, 10), INITIAL_VERTEX_CAPACITY);
    }
}
