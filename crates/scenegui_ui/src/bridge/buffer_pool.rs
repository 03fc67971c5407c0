//! Per-draw-list vertex/index buffers that only ever grow.

use scenegui_gpu::{IndexBufferId, RenderEngine, VertexBufferId};

use super::sync::SyncGuard;
use crate::error::{BridgeError, Result};

/// Engine buffers backing one draw list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSlot {
    pub vertex_buffer: VertexBufferId,
    /// Capacity in vertices.
    pub vertex_capacity: usize,
    pub index_buffer: IndexBufferId,
    /// Capacity in indices.
    pub index_capacity: usize,
}

#[derive(Debug)]
pub struct BufferPool {
    slots: Vec<BufferSlot>,
    default_vertices: usize,
    default_indices: usize,
    sync: SyncGuard,
}

impl BufferPool {
    pub fn new(default_vertices: usize, default_indices: usize) -> Self {
        Self {
            slots: Vec::new(),
            default_vertices,
            default_indices,
            sync: SyncGuard::new(),
        }
    }

    /// Reset per-frame state. Must be called once before any growth in a frame.
    pub fn begin_frame(&mut self) {
        self.sync.begin_episode();
    }

    /// Make sure slot `index` exists and can hold the given element counts.
    ///
    /// Missing slots up to and including `index` are created at the default
    /// capacity. A slot that is too small is replaced by one of exactly the
    /// required size after syncing with the render thread.
    pub fn ensure_capacity<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        index: usize,
        required_vertices: usize,
        required_indices: usize,
    ) -> Result<()> {
        while self.slots.len() <= index {
            let slot = self.create_slot(engine)?;
            log::debug!(
                "Created buffer slot {} ({} vertices, {} indices)",
                self.slots.len(),
                slot.vertex_capacity,
                slot.index_capacity
            );
            self.slots.push(slot);
        }

        let slot = self.slots[index];

        if required_vertices > slot.vertex_capacity {
            self.sync.sync(engine);
            let replacement = engine.create_vertex_buffer(required_vertices)?;
            engine.destroy_vertex_buffer(slot.vertex_buffer);
            self.slots[index].vertex_buffer = replacement;
            self.slots[index].vertex_capacity = required_vertices;
            log::debug!(
                "Grew vertex buffer {} from {} to {} vertices",
                index,
                slot.vertex_capacity,
                required_vertices
            );
        }

        if required_indices > slot.index_capacity {
            self.sync.sync(engine);
            let replacement = engine.create_index_buffer(required_indices)?;
            engine.destroy_index_buffer(slot.index_buffer);
            self.slots[index].index_buffer = replacement;
            self.slots[index].index_capacity = required_indices;
            log::debug!(
                "Grew index buffer {} from {} to {} indices",
                index,
                slot.index_capacity,
                required_indices
            );
        }

        Ok(())
    }

    fn create_slot<E: RenderEngine + ?Sized>(&self, engine: &mut E) -> Result<BufferSlot> {
        let vertex_buffer = engine.create_vertex_buffer(self.default_vertices)?;
        let index_buffer = match engine.create_index_buffer(self.default_indices) {
            Ok(id) => id,
            Err(e) => {
                engine.destroy_vertex_buffer(vertex_buffer);
                return Err(e.into());
            }
        };
        Ok(BufferSlot {
            vertex_buffer,
            vertex_capacity: self.default_vertices,
            index_buffer,
            index_capacity: self.default_indices,
        })
    }

    /// Hand staged copies of `vertices` and `indices` to slot `index`.
    pub fn upload<E: RenderEngine + ?Sized>(
        &self,
        engine: &mut E,
        index: usize,
        vertices: &[u8],
        indices: &[u8],
    ) -> Result<()> {
        let slot = self.slot(index).ok_or(BridgeError::MissingSlot(index))?;
        engine.set_vertex_data(slot.vertex_buffer, vertices.to_vec())?;
        engine.set_index_data(slot.index_buffer, indices.to_vec())?;
        Ok(())
    }

    pub fn slot(&self, index: usize) -> Option<&BufferSlot> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn sync_guard(&self) -> &SyncGuard {
        &self.sync
    }

    /// Destroy every engine buffer owned by the pool.
    pub fn release<E: RenderEngine + ?Sized>(&mut self, engine: &mut E) {
        for slot in self.slots.drain(..) {
            engine.destroy_vertex_buffer(slot.vertex_buffer);
            engine.destroy_index_buffer(slot.index_buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenegui_gpu::HeadlessEngine;

    #[test]
    fn test_new_slots_use_default_capacity() {
        let mut engine = HeadlessEngine::new();
        let mut pool = BufferPool::new(1000, 5000);
        pool.begin_frame();

        pool.ensure_capacity(&mut engine, 2, 10, 10).unwrap();

        assert_eq!(pool.len(), 3);
        for i in 0..3 {
            let slot = pool.slot(i).unwrap();
            assert_eq!(slot.vertex_capacity, 1000);
            assert_eq!(slot.index_capacity, 5000);
        }
        assert_eq!(engine.live_vertex_buffers(), 3);
        assert_eq!(engine.live_index_buffers(), 3);
        // Creating fresh slots never needs the fence.
        assert_eq!(engine.counters().fence_waits, 0);
    }

    #[test]
    fn test_grows_to_exact_size_and_replaces() {
        let mut engine = HeadlessEngine::new();
        let mut pool = BufferPool::new(1000, 5000);
        pool.begin_frame();
        pool.ensure_capacity(&mut engine, 0, 0, 0).unwrap();
        let before = *pool.slot(0).unwrap();

        pool.ensure_capacity(&mut engine, 0, 1500, 6000).unwrap();
        let after = *pool.slot(0).unwrap();

        assert_eq!(after.vertex_capacity, 1500);
        assert_eq!(after.index_capacity, 6000);
        assert_ne!(after.vertex_buffer, before.vertex_buffer);
        assert_ne!(after.index_buffer, before.index_buffer);
        assert!(engine.vertex_buffer(before.vertex_buffer).is_none());
        assert!(engine.index_buffer(before.index_buffer).is_none());
        assert_eq!(engine.live_vertex_buffers(), 1);
        // Both replacements share one fence wait.
        assert_eq!(engine.counters().fence_waits, 1);
    }

    #[test]
    fn test_never_shrinks() {
        let mut engine = HeadlessEngine::new();
        let mut pool = BufferPool::new(1000, 5000);
        pool.begin_frame();
        pool.ensure_capacity(&mut engine, 0, 2000, 0).unwrap();
        let created = engine.counters();

        pool.begin_frame();
        pool.ensure_capacity(&mut engine, 0, 10, 10).unwrap();
        pool.ensure_capacity(&mut engine, 0, 2000, 5000).unwrap();

        assert_eq!(pool.slot(0).unwrap().vertex_capacity, 2000);
        assert_eq!(engine.counters(), created);
    }

    #[test]
    fn test_creation_failure_propagates() {
        let mut engine = HeadlessEngine::new().with_buffer_limit(4000);
        let mut pool = BufferPool::new(1000, 5000);
        pool.begin_frame();

        let err = pool.ensure_capacity(&mut engine, 0, 1, 1).unwrap_err();
        assert!(matches!(err, BridgeError::Gpu(_)));
        // The half-built slot does not leak its vertex buffer.
        assert!(pool.is_empty());
        assert_eq!(engine.live_vertex_buffers(), 0);
    }

    #[test]
    fn test_upload_stages_bytes() {
        let mut engine = HeadlessEngine::new();
        let mut pool = BufferPool::new(4, 6);
        pool.begin_frame();
        pool.ensure_capacity(&mut engine, 0, 1, 3).unwrap();

        pool.upload(&mut engine, 0, &[1u8; 20], &[0, 0, 1, 0, 2, 0])
            .unwrap();
        let slot = *pool.slot(0).unwrap();
        assert_eq!(engine.vertex_buffer(slot.vertex_buffer).unwrap().contents, vec![1u8; 20]);
        assert_eq!(engine.index_buffer(slot.index_buffer).unwrap().contents.len(), 6);

        let err = pool.upload(&mut engine, 3, &[], &[]).unwrap_err();
        assert!(matches!(err, BridgeError::MissingSlot(3)));
    }

    #[test]
    fn test_release_destroys_everything() {
        let mut engine = HeadlessEngine::new();
        let mut pool = BufferPool::new(10, 10);
        pool.begin_frame();
        pool.ensure_capacity(&mut engine, 3, 0, 0).unwrap();
        pool.release(&mut engine);

        assert!(pool.is_empty());
        assert_eq!(engine.live_vertex_buffers(), 0);
        assert_eq!(engine.live_index_buffers(), 0);
    }
}
