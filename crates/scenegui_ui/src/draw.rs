//! Per-frame draw data produced by the immediate-mode UI layer.

use scenegui_gpu::{DrawIdx, DrawVert};

use crate::callback::DrawCallback;
use crate::layout::Rectangle;

/// Clip rectangle in screen space: `(x1, y1)` top-left, `(x2, y2)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl ClipRect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Scale into framebuffer pixels.
    pub fn scaled(&self, scale: [f32; 2]) -> Self {
        Self {
            x1: self.x1 * scale[0],
            y1: self.y1 * scale[1],
            x2: self.x2 * scale[0],
            y2: self.y2 * scale[1],
        }
    }
}

impl From<Rectangle> for ClipRect {
    fn from(rect: Rectangle) -> Self {
        Self::new(rect.x, rect.y, rect.right(), rect.bottom())
    }
}

/// A run of indices sharing one clip rectangle, or a user callback.
#[derive(Debug, Default)]
pub struct DrawCmd {
    /// Number of indices this command consumes.
    pub elem_count: u32,
    pub clip_rect: ClipRect,
    /// When set, the command is handed to the callback instead of producing
    /// a primitive. Its indices are still skipped.
    pub callback: Option<DrawCallback>,
}

impl DrawCmd {
    pub fn new(elem_count: u32, clip_rect: ClipRect) -> Self {
        Self {
            elem_count,
            clip_rect,
            callback: None,
        }
    }

    pub fn with_callback(elem_count: u32, clip_rect: ClipRect, callback: DrawCallback) -> Self {
        Self {
            elem_count,
            clip_rect,
            callback: Some(callback),
        }
    }

    pub fn is_callback(&self) -> bool {
        self.callback.is_some()
    }
}

/// Geometry for one window or widget layer.
#[derive(Debug, Default)]
pub struct DrawList {
    pub vtx_buffer: Vec<DrawVert>,
    pub idx_buffer: Vec<DrawIdx>,
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filled axis-aligned quad and a command drawing it.
    ///
    /// Indices are relative to this list's vertex buffer. A quad whose
    /// vertices would not fit in a 16-bit index is dropped with a warning.
    pub fn add_rect(&mut self, rect: Rectangle, color: [u8; 4], clip: ClipRect) {
        let Ok(last) = DrawIdx::try_from(self.vtx_buffer.len() + 3) else {
            log::warn!(
                "Draw list is full at {} vertices, dropping quad",
                self.vtx_buffer.len()
            );
            return;
        };
        let base = last - 3;
        let corners = [
            [rect.x, rect.y],
            [rect.right(), rect.y],
            [rect.right(), rect.bottom()],
            [rect.x, rect.bottom()],
        ];
        for pos in corners {
            self.vtx_buffer.push(DrawVert::new(pos, [0.0, 0.0], color));
        }
        self.idx_buffer
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        // Merge into the previous command when the clip rect is unchanged.
        match self.commands.last_mut() {
            Some(cmd) if !cmd.is_callback() && cmd.clip_rect == clip => cmd.elem_count += 6,
            _ => self.commands.push(DrawCmd::new(6, clip)),
        }
    }

    pub fn add_callback(&mut self, clip: ClipRect, callback: DrawCallback) {
        self.commands.push(DrawCmd::with_callback(0, clip, callback));
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vtx_buffer)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.idx_buffer)
    }
}

/// Everything the UI layer produced for one frame.
#[derive(Debug, Default)]
pub struct DrawData {
    /// Logical display size in points.
    pub display_size: [f32; 2],
    /// Pixels per point on each axis.
    pub framebuffer_scale: [f32; 2],
    pub cmd_lists: Vec<DrawList>,
}

impl DrawData {
    pub fn new(display_size: [f32; 2], framebuffer_scale: [f32; 2]) -> Self {
        Self {
            display_size,
            framebuffer_scale,
            cmd_lists: Vec::new(),
        }
    }

    /// Framebuffer size in pixels, truncated toward zero.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        (
            (self.display_size[0] * self.framebuffer_scale[0]) as u32,
            (self.display_size[1] * self.framebuffer_scale[1]) as u32,
        )
    }

    pub fn total_vtx_count(&self) -> usize {
        self.cmd_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.cmd_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }
}
