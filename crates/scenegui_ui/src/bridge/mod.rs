//! Translation of per-frame draw data into render engine primitives.
//!
//! The [`Bridge`] owns every engine resource it creates: one vertex/index
//! buffer pair per draw list ([`BufferPool`]), one material instance per
//! unique scissor rectangle ([`ScissorBatcher`]) and the renderable holding
//! the current frame's primitives.

mod buffer_pool;
mod scissor;
mod sync;

pub use buffer_pool::{BufferPool, BufferSlot};
pub use scissor::{ScissorAssignment, ScissorBatcher, ScissorKey};
pub use sync::SyncGuard;

use scenegui_gpu::{Primitive, RenderEngine, RenderableId};
use serde::{Deserialize, Serialize};

use crate::draw::DrawData;
use crate::error::{BridgeError, Result};

/// Initial buffer capacities for newly created draw-list slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub default_vertex_capacity: usize,
    pub default_index_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_vertex_capacity: 1000,
            default_index_capacity: 5000,
        }
    }
}

/// What a call to [`Bridge::translate_frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// The framebuffer had zero area and nothing was touched.
    pub skipped: bool,
    pub draw_lists: usize,
    pub primitives: usize,
    pub callbacks: usize,
    pub unique_scissors: usize,
    pub vertices: usize,
    pub indices: usize,
    /// The render thread was waited on before buffers were replaced.
    pub synced: bool,
    pub framebuffer: (u32, u32),
}

impl FrameStats {
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

pub struct Bridge<E: RenderEngine> {
    engine: E,
    pool: BufferPool,
    batcher: ScissorBatcher,
    renderable: Option<RenderableId>,
    released: bool,
}

/// Blend order of the `index`-th primitive in a frame.
///
/// Primitives past `u16::MAX` share the last order. `saturated` limits the
/// warning to once per frame.
fn blend_order(index: usize, saturated: &mut bool) -> u16 {
    u16::try_from(index).unwrap_or_else(|_| {
        if !*saturated {
            *saturated = true;
            log::warn!(
                "More than {} primitives in one frame, blend order is no longer distinct",
                u16::MAX as usize + 1
            );
        }
        u16::MAX
    })
}

impl<E: RenderEngine> Bridge<E> {
    pub fn new(engine: E, config: BridgeConfig) -> Self {
        log::info!(
            "UI bridge created (slot defaults: {} vertices, {} indices, threading: {})",
            config.default_vertex_capacity,
            config.default_index_capacity,
            engine.supports_threading()
        );
        Self {
            engine,
            pool: BufferPool::new(config.default_vertex_capacity, config.default_index_capacity),
            batcher: ScissorBatcher::new(),
            renderable: None,
            released: false,
        }
    }

    /// Replace the current renderable with one reflecting `data`.
    ///
    /// A zero-area framebuffer skips the frame without touching any engine
    /// resource. On error the frame is abandoned.
    pub fn translate_frame(&mut self, data: &DrawData) -> Result<FrameStats> {
        let (fb_width, fb_height) = data.framebuffer_size();
        if fb_width == 0 || fb_height == 0 {
            log::trace!("Skipping frame with empty framebuffer");
            return Ok(FrameStats::skipped());
        }
        let scale = data.framebuffer_scale;

        self.pool.begin_frame();
        for (i, list) in data.cmd_lists.iter().enumerate() {
            self.pool.ensure_capacity(
                &mut self.engine,
                i,
                list.vtx_buffer.len(),
                list.idx_buffer.len(),
            )?;
        }

        let clips = data
            .cmd_lists
            .iter()
            .flat_map(|list| list.commands.iter())
            .filter(|cmd| !cmd.is_callback())
            .map(|cmd| cmd.clip_rect.scaled(scale));
        let assignment = self.batcher.assign(&mut self.engine, fb_height, clips);

        if let Some(previous) = self.renderable.take() {
            self.engine.destroy_renderable(previous);
        }

        let mut stats = FrameStats {
            draw_lists: data.cmd_lists.len(),
            unique_scissors: assignment.len(),
            vertices: data.total_vtx_count(),
            indices: data.total_idx_count(),
            synced: self.pool.sync_guard().has_synced(),
            framebuffer: (fb_width, fb_height),
            ..Default::default()
        };
        let mut primitives = Vec::new();
        let mut order_saturated = false;

        for (i, list) in data.cmd_lists.iter().enumerate() {
            self.pool
                .upload(&mut self.engine, i, list.vertex_bytes(), list.index_bytes())?;
            let slot = *self.pool.slot(i).ok_or(BridgeError::MissingSlot(i))?;

            let mut index_offset = 0u32;
            for cmd in &list.commands {
                if let Some(callback) = &cmd.callback {
                    callback.call(list, cmd);
                    stats.callbacks += 1;
                } else {
                    let key = ScissorKey::from_clip(fb_height, &cmd.clip_rect.scaled(scale));
                    let material = assignment
                        .get(key)
                        .ok_or(BridgeError::UnassignedScissor(key))?;
                    primitives.push(Primitive {
                        vertex_buffer: slot.vertex_buffer,
                        index_buffer: slot.index_buffer,
                        index_offset,
                        index_count: cmd.elem_count,
                        material,
                        blend_order: blend_order(primitives.len(), &mut order_saturated),
                    });
                }
                index_offset += cmd.elem_count;
            }
        }

        stats.primitives = primitives.len();
        if !data.cmd_lists.is_empty() {
            self.renderable = Some(self.engine.build_renderable(primitives)?);
        }

        log::trace!(
            "Frame {}x{}: {} lists, {} vertices, {} indices, {} primitives, {} scissors",
            fb_width,
            fb_height,
            stats.draw_lists,
            stats.vertices,
            stats.indices,
            stats.primitives,
            stats.unique_scissors
        );
        Ok(stats)
    }

    /// Forward a new window size to the engine's UI view.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.engine.set_viewport(width, height);
    }

    /// The renderable built by the last translated frame, if any.
    pub fn renderable(&self) -> Option<RenderableId> {
        self.renderable
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.pool
    }

    pub fn material_pool_size(&self) -> usize {
        self.batcher.pool_size()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Destroy every engine resource owned by the bridge. Safe to call twice.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        if let Some(renderable) = self.renderable.take() {
            self.engine.destroy_renderable(renderable);
        }
        self.batcher.release(&mut self.engine);
        self.pool.release(&mut self.engine);
        self.released = true;
        log::debug!("UI bridge released its engine resources");
    }
}

impl<E: RenderEngine> Drop for Bridge<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::DrawCallback;
    use crate::draw::{ClipRect, DrawCmd, DrawList};
    use crate::layout::Rectangle;
    use scenegui_gpu::{HeadlessEngine, ScissorRect};
    use std::cell::Cell;
    use std::rc::Rc;

    const WHITE: [u8; 4] = [255; 4];

    fn quads(n: usize, clip: ClipRect) -> DrawList {
        let mut list = DrawList::new();
        for i in 0..n {
            list.add_rect(Rectangle::new(i as f32, 0.0, 1.0, 1.0), WHITE, clip);
        }
        list
    }

    fn frame(lists: Vec<DrawList>) -> DrawData {
        let mut data = DrawData::new([800.0, 600.0], [1.0, 1.0]);
        data.cmd_lists = lists;
        data
    }

    fn bridge() -> Bridge<HeadlessEngine> {
        Bridge::new(HeadlessEngine::new(), BridgeConfig::default())
    }

    #[test]
    fn test_zero_area_frame_is_skipped() {
        let mut bridge = bridge();
        let mut data = frame(vec![quads(1, ClipRect::new(0.0, 0.0, 10.0, 10.0))]);
        data.display_size = [0.0, 600.0];

        let stats = bridge.translate_frame(&data).unwrap();

        assert!(stats.skipped);
        assert_eq!(bridge.renderable(), None);
        assert_eq!(bridge.engine().counters(), Default::default());
    }

    #[test]
    fn test_zero_area_frame_keeps_previous_renderable() {
        let mut bridge = bridge();
        let data = frame(vec![quads(1, ClipRect::new(0.0, 0.0, 10.0, 10.0))]);
        bridge.translate_frame(&data).unwrap();
        let before = bridge.renderable();
        let counters = bridge.engine().counters();

        let mut hidden = frame(Vec::new());
        hidden.framebuffer_scale = [0.0, 0.0];
        bridge.translate_frame(&hidden).unwrap();

        assert_eq!(bridge.renderable(), before);
        assert_eq!(bridge.engine().counters(), counters);
    }

    #[test]
    fn test_primitives_and_offsets_per_list() {
        let mut bridge = bridge();
        let a = ClipRect::new(0.0, 0.0, 100.0, 100.0);
        let b = ClipRect::new(0.0, 0.0, 50.0, 50.0);

        let mut first = quads(2, a);
        first.add_rect(Rectangle::new(0.0, 0.0, 1.0, 1.0), WHITE, b);
        first.add_rect(Rectangle::new(0.0, 0.0, 1.0, 1.0), WHITE, a);
        let second = quads(1, b);

        let stats = bridge.translate_frame(&frame(vec![first, second])).unwrap();
        assert_eq!(stats.primitives, 4);
        assert_eq!(stats.unique_scissors, 2);

        let id = bridge.renderable().unwrap();
        let prims = bridge.engine().renderable(id).unwrap();
        let ranges: Vec<(u32, u32)> = prims.iter().map(|p| (p.index_offset, p.index_count)).collect();
        assert_eq!(ranges, vec![(0, 12), (12, 6), (18, 6), (0, 6)]);

        let orders: Vec<u16> = prims.iter().map(|p| p.blend_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);

        let slot0 = *bridge.buffer_pool().slot(0).unwrap();
        let slot1 = *bridge.buffer_pool().slot(1).unwrap();
        assert!(prims[..3].iter().all(|p| p.vertex_buffer == slot0.vertex_buffer));
        assert_eq!(prims[3].index_buffer, slot1.index_buffer);
        assert_eq!(prims[0].material, prims[2].material);
        assert_eq!(prims[1].material, prims[3].material);
        assert_ne!(prims[0].material, prims[1].material);
    }

    #[test]
    fn test_uploads_staged_copies() {
        let mut bridge = bridge();
        let list = quads(3, ClipRect::new(0.0, 0.0, 10.0, 10.0));
        let expected_vertices = list.vertex_bytes().to_vec();
        let expected_indices = list.index_bytes().to_vec();

        bridge.translate_frame(&frame(vec![list])).unwrap();

        let slot = *bridge.buffer_pool().slot(0).unwrap();
        let engine = bridge.engine();
        assert_eq!(engine.vertex_buffer(slot.vertex_buffer).unwrap().contents, expected_vertices);
        assert_eq!(engine.index_buffer(slot.index_buffer).unwrap().contents, expected_indices);
    }

    #[test]
    fn test_callback_commands_skip_primitive_but_advance_offset() {
        let mut bridge = bridge();
        let clip = ClipRect::new(0.0, 0.0, 10.0, 10.0);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();

        let mut list = quads(1, clip);
        list.commands.push(crate::draw::DrawCmd::with_callback(
            3,
            ClipRect::new(1.0, 1.0, 2.0, 2.0),
            DrawCallback::new(move |_, cmd| {
                assert_eq!(cmd.elem_count, 3);
                counter.set(counter.get() + 1);
            }),
        ));
        list.add_rect(Rectangle::new(0.0, 0.0, 1.0, 1.0), WHITE, clip);

        let stats = bridge.translate_frame(&frame(vec![list])).unwrap();

        assert_eq!(calls.get(), 1);
        assert_eq!(stats.callbacks, 1);
        assert_eq!(stats.primitives, 2);
        // The callback's clip rect never reaches the batcher.
        assert_eq!(stats.unique_scissors, 1);
        let prims = bridge.engine().renderable(bridge.renderable().unwrap()).unwrap();
        assert_eq!(prims[1].index_offset, 9);
    }

    #[test]
    fn test_renderable_replaced_each_frame() {
        let mut bridge = bridge();
        let data = frame(vec![quads(1, ClipRect::new(0.0, 0.0, 10.0, 10.0))]);

        bridge.translate_frame(&data).unwrap();
        let first = bridge.renderable().unwrap();
        bridge.translate_frame(&data).unwrap();
        let second = bridge.renderable().unwrap();

        assert_ne!(first, second);
        assert!(bridge.engine().renderable(first).is_none());
        assert_eq!(bridge.engine().live_renderables(), 1);
    }

    #[test]
    fn test_empty_frame_leaves_no_renderable() {
        let mut bridge = bridge();
        bridge
            .translate_frame(&frame(vec![quads(1, ClipRect::new(0.0, 0.0, 10.0, 10.0))]))
            .unwrap();

        let stats = bridge.translate_frame(&frame(Vec::new())).unwrap();

        assert!(!stats.skipped);
        assert_eq!(bridge.renderable(), None);
        assert_eq!(bridge.engine().live_renderables(), 0);
    }

    #[test]
    fn test_material_pool_grows_only_with_unique_scissors() {
        let mut bridge = bridge();
        let clip = |i: usize| ClipRect::new(i as f32, 0.0, 100.0, 100.0);
        let frame_with = |n: usize| {
            let mut list = DrawList::new();
            for i in 0..n {
                list.add_rect(Rectangle::new(0.0, 0.0, 1.0, 1.0), WHITE, clip(i));
            }
            frame(vec![list])
        };

        bridge.translate_frame(&frame_with(3)).unwrap();
        bridge.translate_frame(&frame_with(2)).unwrap();
        bridge.translate_frame(&frame_with(3)).unwrap();
        assert_eq!(bridge.engine().counters().material_instances_created, 3);

        bridge.translate_frame(&frame_with(5)).unwrap();
        assert_eq!(bridge.engine().counters().material_instances_created, 5);
        assert_eq!(bridge.material_pool_size(), 5);
    }

    #[test]
    fn test_blend_order_saturates_past_u16() {
        let mut saturated = false;
        assert_eq!(blend_order(65_535, &mut saturated), u16::MAX);
        assert!(!saturated);
        assert_eq!(blend_order(65_536, &mut saturated), u16::MAX);
        assert!(saturated);
        assert_eq!(blend_order(70_000, &mut saturated), u16::MAX);
    }

    #[test]
    fn test_frame_with_more_primitives_than_blend_orders() {
        let clip = ClipRect::new(0.0, 0.0, 10.0, 10.0);
        let mut list = DrawList::new();
        for _ in 0..65_537 {
            list.commands.push(DrawCmd::new(0, clip));
        }
        let mut bridge = bridge();
        let stats = bridge.translate_frame(&frame(vec![list])).unwrap();
        assert_eq!(stats.primitives, 65_537);

        let id = bridge.renderable().unwrap();
        let prims = bridge.engine().renderable(id).unwrap();
        assert_eq!(prims[65_534].blend_order, 65_534);
        assert_eq!(prims[65_535].blend_order, u16::MAX);
        assert_eq!(prims[65_536].blend_order, u16::MAX);
    }

    #[test]
    fn test_growth_syncs_once_and_buffers_never_shrink() {
        let config = BridgeConfig {
            default_vertex_capacity: 8,
            default_index_capacity: 12,
        };
        let mut bridge = Bridge::new(HeadlessEngine::new(), config);
        let clip = ClipRect::new(0.0, 0.0, 10.0, 10.0);

        let stats = bridge.translate_frame(&frame(vec![quads(1, clip)])).unwrap();
        assert_eq!(bridge.engine().counters().fence_waits, 0);
        assert!(!stats.synced);

        // Two lists both outgrow their slots: one fence for the whole frame.
        let stats = bridge
            .translate_frame(&frame(vec![quads(5, clip), quads(3, clip)]))
            .unwrap();
        assert_eq!(bridge.engine().counters().fence_waits, 1);
        assert!(stats.synced);
        assert_eq!((stats.vertices, stats.indices), (32, 48));
        let slot = *bridge.buffer_pool().slot(0).unwrap();
        assert_eq!(slot.vertex_capacity, 20);
        assert_eq!(slot.index_capacity, 30);

        let created = bridge.engine().counters();
        bridge.translate_frame(&frame(vec![quads(1, clip), quads(1, clip)])).unwrap();
        assert_eq!(bridge.buffer_pool().slot(0).unwrap().vertex_capacity, 20);
        assert_eq!(
            bridge.engine().counters().vertex_buffers_created,
            created.vertex_buffers_created
        );
        assert_eq!(bridge.engine().counters().fence_waits, 1);
    }

    #[test]
    fn test_framebuffer_scale_applies_to_scissors() {
        let mut bridge = bridge();
        let mut data = frame(vec![quads(1, ClipRect::new(10.0, 10.0, 110.0, 60.0))]);
        data.framebuffer_scale = [2.0, 2.0];

        let stats = bridge.translate_frame(&data).unwrap();
        assert_eq!(stats.framebuffer, (1600, 1200));

        let prims = bridge.engine().renderable(bridge.renderable().unwrap()).unwrap();
        assert_eq!(
            bridge.engine().scissor(prims[0].material),
            Some(ScissorRect::new(20, 1080, 200, 100))
        );
    }

    #[test]
    fn test_buffer_failure_abandons_frame() {
        let engine = HeadlessEngine::new().with_buffer_limit(5000);
        let mut bridge = Bridge::new(engine, BridgeConfig::default());
        let clip = ClipRect::new(0.0, 0.0, 10.0, 10.0);
        bridge.translate_frame(&frame(vec![quads(1, clip)])).unwrap();
        let before = bridge.renderable();

        let err = bridge
            .translate_frame(&frame(vec![quads(1001, clip)]))
            .unwrap_err();

        assert!(matches!(err, BridgeError::Gpu(_)));
        assert_eq!(bridge.renderable(), before);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut bridge = bridge();
        bridge.resize(1024, 768);
        assert_eq!(bridge.engine().viewport(), (1024, 768));
    }

    #[test]
    fn test_shutdown_releases_everything() {
        let mut bridge = bridge();
        let clip = ClipRect::new(0.0, 0.0, 10.0, 10.0);
        bridge.translate_frame(&frame(vec![quads(1, clip), quads(1, clip)])).unwrap();

        bridge.shutdown();
        bridge.shutdown();

        let engine = bridge.engine();
        assert_eq!(engine.live_vertex_buffers(), 0);
        assert_eq!(engine.live_index_buffers(), 0);
        assert_eq!(engine.live_material_instances(), 0);
        assert_eq!(engine.live_renderables(), 0);
        assert_eq!(engine.counters().vertex_buffers_destroyed, 2);
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: BridgeConfig = serde_json::from_str(r#"{"default_vertex_capacity": 64}"#).unwrap();
        assert_eq!(config.default_vertex_capacity, 64);
        assert_eq!(config.default_index_capacity, 5000);
    }
}
