//! The render-engine seam.
//!
//! The UI bridge never talks to wgpu directly. Everything it needs from a
//! scene-graph renderer (buffer objects, material instances carrying a
//! scissor region, renderables, and a fence) goes through [`RenderEngine`].

use crate::error::Result;

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle_type!(
    /// Opaque handle to an engine vertex buffer.
    VertexBufferId
);
handle_type!(
    /// Opaque handle to an engine index buffer.
    IndexBufferId
);
handle_type!(
    /// Opaque handle to an instance of the UI blit material.
    MaterialInstanceId
);
handle_type!(
    /// Opaque handle to a renderable (a set of primitives).
    RenderableId
);

/// Scissor region in framebuffer pixels, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScissorRect {
    pub left: u32,
    pub bottom: u32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    pub fn new(left: u32, bottom: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    /// Convert to a top-left origin rectangle `(x, y, w, h)` clamped to the
    /// target. Returns `None` when nothing of the region is visible.
    pub fn to_top_left(&self, target_width: u32, target_height: u32) -> Option<(u32, u32, u32, u32)> {
        let x = self.left.min(target_width);
        let top = target_height.saturating_sub(self.bottom.saturating_add(self.height));
        let bottom_edge = target_height.saturating_sub(self.bottom);
        let w = self.width.min(target_width - x);
        let h = bottom_edge.saturating_sub(top);
        if w == 0 || h == 0 {
            None
        } else {
            Some((x, top, w, h))
        }
    }
}

/// One indexed triangle-list draw inside a renderable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub vertex_buffer: VertexBufferId,
    pub index_buffer: IndexBufferId,
    /// Offset into the index buffer, in indices.
    pub index_offset: u32,
    pub index_count: u32,
    pub material: MaterialInstanceId,
    /// Primitives are composited in ascending blend order.
    pub blend_order: u16,
}

/// Operations a scene-graph renderer must provide to host UI geometry.
pub trait RenderEngine {
    /// Create a vertex buffer able to hold `vertex_count` vertices.
    fn create_vertex_buffer(&mut self, vertex_count: usize) -> Result<VertexBufferId>;

    /// Create an index buffer able to hold `index_count` 16-bit indices.
    fn create_index_buffer(&mut self, index_count: usize) -> Result<IndexBufferId>;

    fn destroy_vertex_buffer(&mut self, id: VertexBufferId);

    fn destroy_index_buffer(&mut self, id: IndexBufferId);

    /// Hand a staged copy of vertex bytes to the engine. The engine owns the
    /// bytes from here on and may consume them on another thread.
    fn set_vertex_data(&mut self, id: VertexBufferId, staged: Vec<u8>) -> Result<()>;

    /// Hand a staged copy of index bytes to the engine.
    fn set_index_data(&mut self, id: IndexBufferId, staged: Vec<u8>) -> Result<()>;

    /// Create a new instance of the UI blit material.
    fn create_material_instance(&mut self) -> MaterialInstanceId;

    fn set_scissor(&mut self, id: MaterialInstanceId, scissor: ScissorRect);

    fn destroy_material_instance(&mut self, id: MaterialInstanceId);

    /// Register a renderable made of `primitives` with the scene.
    fn build_renderable(&mut self, primitives: Vec<Primitive>) -> Result<RenderableId>;

    fn destroy_renderable(&mut self, id: RenderableId);

    /// Update the UI view after the window changed size.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Whether a separate thread may be consuming buffer contents.
    fn supports_threading(&self) -> bool {
        !cfg!(target_arch = "wasm32")
    }

    /// Block until all work enqueued so far has been consumed.
    fn wait_for_render_thread(&mut self);
}
