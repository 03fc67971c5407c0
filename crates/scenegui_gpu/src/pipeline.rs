//! The UI blit material: a single alpha-blended pipeline sampling the font
//! atlas, compiled from the material template on disk.

use crate::bindings::blit;
use crate::context::GpuContext;
use crate::error::Result;
use crate::material::MaterialTemplate;
use crate::texture::FontAtlas;
use crate::uniform::ProjectionUniform;
use crate::vertex::DrawVert;

/// Builder for the bind group layout used by the blit material.
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    label: Option<&'a str>,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            label: None,
            entries: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn add_uniform_buffer(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    pub fn add_texture_2d(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
        self
    }

    pub fn add_sampler(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        self
    }

    pub fn build(self) -> wgpu::BindGroupLayout {
        self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: self.label,
            entries: &self.entries,
        })
    }
}

/// Compiled blit material plus the resources its bind group points at.
pub struct BlitPipeline {
    pub render_pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    projection_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    atlas: FontAtlas,
}

impl BlitPipeline {
    /// Compile `template` for the context's surface format.
    pub fn new(ctx: &GpuContext, template: &MaterialTemplate) -> Result<Self> {
        let device = &ctx.device;
        let source = template.source()?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("UI Blit Shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout = BindGroupLayoutBuilder::new(device)
            .with_label("UI Blit Bind Group Layout")
            .add_uniform_buffer(blit::PROJECTION_BINDING, wgpu::ShaderStages::VERTEX)
            .add_texture_2d(blit::ATLAS_BINDING, wgpu::ShaderStages::FRAGMENT)
            .add_sampler(blit::SAMPLER_BINDING, wgpu::ShaderStages::FRAGMENT)
            .build();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("UI Blit Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("UI Blit Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[DrawVert::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let projection_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("UI Projection Uniform"),
            size: std::mem::size_of::<ProjectionUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        ctx.queue.write_buffer(
            &projection_buffer,
            0,
            bytemuck::bytes_of(&ProjectionUniform::ortho(ctx.width() as f32, ctx.height() as f32)),
        );

        let atlas = FontAtlas::white(ctx)?;
        let bind_group =
            Self::create_bind_group(device, &bind_group_layout, &projection_buffer, &atlas);

        Ok(Self {
            render_pipeline,
            bind_group_layout,
            projection_buffer,
            bind_group,
            atlas,
        })
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        projection: &wgpu::Buffer,
        atlas: &FontAtlas,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("UI Blit Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: blit::PROJECTION_BINDING,
                    resource: projection.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: blit::ATLAS_BINDING,
                    resource: wgpu::BindingResource::TextureView(&atlas.view),
                },
                wgpu::BindGroupEntry {
                    binding: blit::SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&atlas.sampler),
                },
            ],
        })
    }

    /// Update the projection for a viewport of `width` x `height` points.
    pub fn set_projection(&self, ctx: &GpuContext, width: f32, height: f32) {
        let projection = ProjectionUniform::ortho(width, height);
        ctx.queue
            .write_buffer(&self.projection_buffer, 0, bytemuck::bytes_of(&projection));
    }

    /// Replace the font atlas; the previous texture is released.
    pub fn set_atlas(&mut self, ctx: &GpuContext, atlas: FontAtlas) {
        self.bind_group = Self::create_bind_group(
            &ctx.device,
            &self.bind_group_layout,
            &self.projection_buffer,
            &atlas,
        );
        self.atlas = atlas;
    }

    pub fn atlas_size(&self) -> (u32, u32) {
        (self.atlas.width, self.atlas.height)
    }
}
