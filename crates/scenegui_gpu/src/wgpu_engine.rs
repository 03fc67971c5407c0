//! [`RenderEngine`] implementation on top of wgpu.
//!
//! Buffers are plain wgpu buffers written through `Queue::write_buffer`,
//! which copies the staged bytes before returning. Material instances are
//! scissor regions applied with `set_scissor_rect` when the renderables are
//! encoded into a render pass.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::bindings::blit;
use crate::config::ClearColor;
use crate::context::GpuContext;
use crate::engine::{
    IndexBufferId, MaterialInstanceId, Primitive, RenderEngine, RenderableId, ScissorRect,
    VertexBufferId,
};
use crate::error::{GpuError, Result};
use crate::material::MaterialTemplate;
use crate::pipeline::BlitPipeline;
use crate::texture::FontAtlas;
use crate::vertex::{DrawIdx, DrawVert};

struct GpuBuffer {
    buffer: wgpu::Buffer,
    /// Capacity in elements (vertices or indices).
    capacity: usize,
}

pub struct WgpuEngine {
    ctx: GpuContext,
    /// `None` when the material template could not be loaded; nothing is
    /// drawn in that case.
    blit: Option<BlitPipeline>,
    next_id: u32,
    vertex_buffers: HashMap<VertexBufferId, GpuBuffer>,
    index_buffers: HashMap<IndexBufferId, GpuBuffer>,
    materials: HashMap<MaterialInstanceId, ScissorRect>,
    renderables: BTreeMap<RenderableId, Vec<Primitive>>,
}

impl WgpuEngine {
    /// Create the engine and load `ui_blit.wgsl` from `resource_dir`.
    ///
    /// A missing or unreadable template is logged and the engine continues
    /// without a material.
    pub fn new(ctx: GpuContext, resource_dir: impl AsRef<Path>) -> Self {
        let blit = match MaterialTemplate::load_ui_blit(resource_dir.as_ref()) {
            Ok(template) => match BlitPipeline::new(&ctx, &template) {
                Ok(pipeline) => Some(pipeline),
                Err(e) => {
                    log::error!("Could not build UI material: {e}");
                    None
                }
            },
            Err(e) => {
                log::error!("{e}");
                None
            }
        };

        Self {
            ctx,
            blit,
            next_id: 0,
            vertex_buffers: HashMap::new(),
            index_buffers: HashMap::new(),
            materials: HashMap::new(),
            renderables: BTreeMap::new(),
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GpuContext {
        &mut self.ctx
    }

    pub fn has_material(&self) -> bool {
        self.blit.is_some()
    }

    /// Upload an 8-bit alpha font atlas, replacing the current one.
    pub fn set_font_atlas(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<()> {
        let atlas = FontAtlas::from_alpha8(&self.ctx, pixels, width, height)?;
        match self.blit.as_mut() {
            Some(blit) => {
                blit.set_atlas(&self.ctx, atlas);
                log::debug!("Uploaded {}x{} font atlas", width, height);
            }
            None => log::warn!("Font atlas ignored: no UI material loaded"),
        }
        Ok(())
    }

    /// Encode every registered renderable into a pass over `view`.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        clear: Option<ClearColor>,
    ) {
        let load = match clear {
            Some(color) => wgpu::LoadOp::Clear(color.into()),
            None => wgpu::LoadOp::Load,
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("UI Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(pipeline) = &self.blit else {
            return;
        };

        pass.set_pipeline(&pipeline.render_pipeline);
        pass.set_bind_group(blit::GROUP, &pipeline.bind_group, &[]);

        let (target_w, target_h) = (self.ctx.width(), self.ctx.height());

        for primitives in self.renderables.values() {
            let mut ordered: Vec<&Primitive> = primitives.iter().collect();
            ordered.sort_by_key(|p| p.blend_order);

            for prim in ordered {
                let (Some(vb), Some(ib)) = (
                    self.vertex_buffers.get(&prim.vertex_buffer),
                    self.index_buffers.get(&prim.index_buffer),
                ) else {
                    log::warn!("Primitive references a destroyed buffer, skipping");
                    continue;
                };
                let scissor = self.materials.get(&prim.material).copied().unwrap_or_default();
                let Some((x, y, w, h)) = scissor.to_top_left(target_w, target_h) else {
                    continue;
                };

                pass.set_scissor_rect(x, y, w, h);
                pass.set_vertex_buffer(0, vb.buffer.slice(..));
                pass.set_index_buffer(ib.buffer.slice(..), wgpu::IndexFormat::Uint16);
                let start = prim.index_offset;
                pass.draw_indexed(start..start + prim.index_count, 0, 0..1);
            }
        }
    }

    /// Acquire the next surface texture, render into it and present.
    pub fn render_frame(&mut self, clear: ClearColor) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = self.ctx.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("UI Encoder"),
            });
        self.render(&mut encoder, &view, Some(clear));

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn create_buffer(
        &self,
        kind: &'static str,
        count: usize,
        elem_size: usize,
        usage: wgpu::BufferUsages,
    ) -> Result<wgpu::Buffer> {
        let bytes = wgpu::util::align_to((count * elem_size) as u64, wgpu::COPY_BUFFER_ALIGNMENT);
        let limit = self.ctx.device.limits().max_buffer_size;
        if bytes > limit {
            return Err(GpuError::BufferTooLarge { kind, bytes, limit });
        }
        Ok(self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(kind),
            size: bytes,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    fn write(queue: &wgpu::Queue, target: &GpuBuffer, elem_size: usize, mut staged: Vec<u8>) -> Result<()> {
        if staged.is_empty() {
            return Ok(());
        }
        let capacity = (target.capacity * elem_size) as u64;
        if staged.len() as u64 > capacity {
            return Err(GpuError::BufferTooLarge {
                kind: "upload",
                bytes: staged.len() as u64,
                limit: capacity,
            });
        }
        // write_buffer requires a 4-byte multiple; the buffer itself was
        // allocated with the same rounding.
        let aligned = wgpu::util::align_to(staged.len(), wgpu::COPY_BUFFER_ALIGNMENT as usize);
        staged.resize(aligned, 0);
        queue.write_buffer(&target.buffer, 0, &staged);
        Ok(())
    }
}

impl RenderEngine for WgpuEngine {
    fn create_vertex_buffer(&mut self, vertex_count: usize) -> Result<VertexBufferId> {
        let buffer = self.create_buffer(
            "UI Vertex Buffer",
            vertex_count,
            DrawVert::SIZE,
            wgpu::BufferUsages::VERTEX,
        )?;
        let id = VertexBufferId(self.allocate_id());
        self.vertex_buffers.insert(
            id,
            GpuBuffer {
                buffer,
                capacity: vertex_count,
            },
        );
        Ok(id)
    }

    fn create_index_buffer(&mut self, index_count: usize) -> Result<IndexBufferId> {
        let buffer = self.create_buffer(
            "UI Index Buffer",
            index_count,
            std::mem::size_of::<DrawIdx>(),
            wgpu::BufferUsages::INDEX,
        )?;
        let id = IndexBufferId(self.allocate_id());
        self.index_buffers.insert(
            id,
            GpuBuffer {
                buffer,
                capacity: index_count,
            },
        );
        Ok(id)
    }

    fn destroy_vertex_buffer(&mut self, id: VertexBufferId) {
        if let Some(vb) = self.vertex_buffers.remove(&id) {
            vb.buffer.destroy();
        }
    }

    fn destroy_index_buffer(&mut self, id: IndexBufferId) {
        if let Some(ib) = self.index_buffers.remove(&id) {
            ib.buffer.destroy();
        }
    }

    fn set_vertex_data(&mut self, id: VertexBufferId, staged: Vec<u8>) -> Result<()> {
        let target = self
            .vertex_buffers
            .get(&id)
            .ok_or(GpuError::UnknownHandle {
                kind: "vertex buffer",
                id: id.0,
            })?;
        Self::write(&self.ctx.queue, target, DrawVert::SIZE, staged)
    }

    fn set_index_data(&mut self, id: IndexBufferId, staged: Vec<u8>) -> Result<()> {
        let target = self
            .index_buffers
            .get(&id)
            .ok_or(GpuError::UnknownHandle {
                kind: "index buffer",
                id: id.0,
            })?;
        Self::write(&self.ctx.queue, target, std::mem::size_of::<DrawIdx>(), staged)
    }

    fn create_material_instance(&mut self) -> MaterialInstanceId {
        let id = MaterialInstanceId(self.allocate_id());
        self.materials.insert(id, ScissorRect::default());
        id
    }

    fn set_scissor(&mut self, id: MaterialInstanceId, scissor: ScissorRect) {
        if let Some(slot) = self.materials.get_mut(&id) {
            *slot = scissor;
        }
    }

    fn destroy_material_instance(&mut self, id: MaterialInstanceId) {
        self.materials.remove(&id);
    }

    fn build_renderable(&mut self, primitives: Vec<Primitive>) -> Result<RenderableId> {
        let id = RenderableId(self.allocate_id());
        log::trace!("Built {} with {} primitives", id, primitives.len());
        self.renderables.insert(id, primitives);
        Ok(id)
    }

    fn destroy_renderable(&mut self, id: RenderableId) {
        self.renderables.remove(&id);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        if let Some(blit) = &self.blit {
            blit.set_projection(&self.ctx, width as f32, height as f32);
        }
    }

    fn wait_for_render_thread(&mut self) {
        self.ctx.wait_idle();
    }
}
