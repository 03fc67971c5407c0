//! A [`RenderEngine`] that keeps everything on the CPU.
//!
//! Every resource the bridge creates is tracked in plain maps so the state of
//! the "scene" can be inspected without a GPU. Used for tests and for running
//! the bridge where no adapter is available.

use std::collections::BTreeMap;

use crate::engine::{
    IndexBufferId, MaterialInstanceId, Primitive, RenderEngine, RenderableId, ScissorRect,
    VertexBufferId,
};
use crate::error::{GpuError, Result};
use crate::vertex::{DrawIdx, DrawVert};

/// A CPU-side buffer with a fixed element capacity.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBuffer {
    pub capacity: usize,
    pub contents: Vec<u8>,
}

/// Counters for every engine operation, used to check resource churn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCounters {
    pub vertex_buffers_created: usize,
    pub index_buffers_created: usize,
    pub vertex_buffers_destroyed: usize,
    pub index_buffers_destroyed: usize,
    pub material_instances_created: usize,
    pub renderables_built: usize,
    pub renderables_destroyed: usize,
    pub fence_waits: usize,
}

#[derive(Debug, Default)]
pub struct HeadlessEngine {
    next_id: u32,
    vertex_buffers: BTreeMap<VertexBufferId, HeadlessBuffer>,
    index_buffers: BTreeMap<IndexBufferId, HeadlessBuffer>,
    materials: BTreeMap<MaterialInstanceId, ScissorRect>,
    renderables: BTreeMap<RenderableId, Vec<Primitive>>,
    viewport: (u32, u32),
    threading: bool,
    max_elements: Option<usize>,
    counters: EngineCounters,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self {
            threading: true,
            ..Default::default()
        }
    }

    /// Engine that reports no render thread, as on single-threaded targets.
    pub fn single_threaded() -> Self {
        Self {
            threading: false,
            ..Default::default()
        }
    }

    /// Refuse buffers larger than `max_elements` elements.
    pub fn with_buffer_limit(mut self, max_elements: usize) -> Self {
        self.max_elements = Some(max_elements);
        self
    }

    pub fn counters(&self) -> EngineCounters {
        self.counters
    }

    pub fn vertex_buffer(&self, id: VertexBufferId) -> Option<&HeadlessBuffer> {
        self.vertex_buffers.get(&id)
    }

    pub fn index_buffer(&self, id: IndexBufferId) -> Option<&HeadlessBuffer> {
        self.index_buffers.get(&id)
    }

    pub fn scissor(&self, id: MaterialInstanceId) -> Option<ScissorRect> {
        self.materials.get(&id).copied()
    }

    pub fn renderable(&self, id: RenderableId) -> Option<&[Primitive]> {
        self.renderables.get(&id).map(Vec::as_slice)
    }

    pub fn live_vertex_buffers(&self) -> usize {
        self.vertex_buffers.len()
    }

    pub fn live_index_buffers(&self) -> usize {
        self.index_buffers.len()
    }

    pub fn live_material_instances(&self) -> usize {
        self.materials.len()
    }

    pub fn live_renderables(&self) -> usize {
        self.renderables.len()
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_limit(&self, kind: &'static str, count: usize, elem_size: usize) -> Result<()> {
        match self.max_elements {
            Some(limit) if count > limit => Err(GpuError::BufferTooLarge {
                kind,
                bytes: (count * elem_size) as u64,
                limit: (limit * elem_size) as u64,
            }),
            _ => Ok(()),
        }
    }
}

impl RenderEngine for HeadlessEngine {
    fn create_vertex_buffer(&mut self, vertex_count: usize) -> Result<VertexBufferId> {
        self.check_limit("vertex", vertex_count, DrawVert::SIZE)?;
        let id = VertexBufferId(self.allocate_id());
        self.vertex_buffers.insert(
            id,
            HeadlessBuffer {
                capacity: vertex_count,
                contents: Vec::new(),
            },
        );
        self.counters.vertex_buffers_created += 1;
        Ok(id)
    }

    fn create_index_buffer(&mut self, index_count: usize) -> Result<IndexBufferId> {
        self.check_limit("index", index_count, std::mem::size_of::<DrawIdx>())?;
        let id = IndexBufferId(self.allocate_id());
        self.index_buffers.insert(
            id,
            HeadlessBuffer {
                capacity: index_count,
                contents: Vec::new(),
            },
        );
        self.counters.index_buffers_created += 1;
        Ok(id)
    }

    fn destroy_vertex_buffer(&mut self, id: VertexBufferId) {
        if self.vertex_buffers.remove(&id).is_some() {
            self.counters.vertex_buffers_destroyed += 1;
        }
    }

    fn destroy_index_buffer(&mut self, id: IndexBufferId) {
        if self.index_buffers.remove(&id).is_some() {
            self.counters.index_buffers_destroyed += 1;
        }
    }

    fn set_vertex_data(&mut self, id: VertexBufferId, staged: Vec<u8>) -> Result<()> {
        let buffer = self
            .vertex_buffers
            .get_mut(&id)
            .ok_or(GpuError::UnknownHandle {
                kind: "vertex buffer",
                id: id.0,
            })?;
        let limit = buffer.capacity * DrawVert::SIZE;
        if staged.len() > limit {
            return Err(GpuError::BufferTooLarge {
                kind: "vertex",
                bytes: staged.len() as u64,
                limit: limit as u64,
            });
        }
        buffer.contents = staged;
        Ok(())
    }

    fn set_index_data(&mut self, id: IndexBufferId, staged: Vec<u8>) -> Result<()> {
        let buffer = self
            .index_buffers
            .get_mut(&id)
            .ok_or(GpuError::UnknownHandle {
                kind: "index buffer",
                id: id.0,
            })?;
        let limit = buffer.capacity * std::mem::size_of::<DrawIdx>();
        if staged.len() > limit {
            return Err(GpuError::BufferTooLarge {
                kind: "index",
                bytes: staged.len() as u64,
                limit: limit as u64,
            });
        }
        buffer.contents = staged;
        Ok(())
    }

    fn create_material_instance(&mut self) -> MaterialInstanceId {
        let id = MaterialInstanceId(self.allocate_id());
        self.materials.insert(id, ScissorRect::default());
        self.counters.material_instances_created += 1;
        id
    }

    fn set_scissor(&mut self, id: MaterialInstanceId, scissor: ScissorRect) {
        if let Some(slot) = self.materials.get_mut(&id) {
            *slot = scissor;
        } else {
            log::warn!("set_scissor on unknown {}", id);
        }
    }

    fn destroy_material_instance(&mut self, id: MaterialInstanceId) {
        self.materials.remove(&id);
    }

    fn build_renderable(&mut self, primitives: Vec<Primitive>) -> Result<RenderableId> {
        let id = RenderableId(self.allocate_id());
        self.renderables.insert(id, primitives);
        self.counters.renderables_built += 1;
        Ok(id)
    }

    fn destroy_renderable(&mut self, id: RenderableId) {
        if self.renderables.remove(&id).is_some() {
            self.counters.renderables_destroyed += 1;
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn supports_threading(&self) -> bool {
        self.threading
    }

    fn wait_for_render_thread(&mut self) {
        self.counters.fence_waits += 1;
    }
}
