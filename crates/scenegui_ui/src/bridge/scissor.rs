//! Deduplication of clip rectangles into scissored material instances.

use std::collections::{HashMap, HashSet};

use scenegui_gpu::{MaterialInstanceId, RenderEngine, ScissorRect};

use crate::draw::ClipRect;

/// Integer scissor region packed into 64 bits: `left | bottom << 16 |
/// width << 32 | height << 48`, with each component clamped to `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScissorKey(u64);

impl ScissorKey {
    pub fn new(left: u16, bottom: u16, width: u16, height: u16) -> Self {
        Self(
            u64::from(left)
                | (u64::from(bottom) << 16)
                | (u64::from(width) << 32)
                | (u64::from(height) << 48),
        )
    }

    /// Key for a clip rectangle already scaled to framebuffer pixels.
    ///
    /// The clip rect has a top-left origin, the key a bottom-left one.
    /// Negative and oversized components saturate.
    pub fn from_clip(framebuffer_height: u32, clip: &ClipRect) -> Self {
        let left = clip.x1 as u16;
        let bottom = (framebuffer_height as f32 - clip.y2) as u16;
        let width = (clip.x2 - clip.x1) as u16;
        let height = (clip.y2 - clip.y1) as u16;
        Self::new(left, bottom, width, height)
    }

    pub fn packed(self) -> u64 {
        self.0
    }

    pub fn left(self) -> u16 {
        self.0 as u16
    }

    pub fn bottom(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn width(self) -> u16 {
        (self.0 >> 32) as u16
    }

    pub fn height(self) -> u16 {
        (self.0 >> 48) as u16
    }

    pub fn to_scissor(self) -> ScissorRect {
        ScissorRect::new(
            u32::from(self.left()),
            u32::from(self.bottom()),
            u32::from(self.width()),
            u32::from(self.height()),
        )
    }
}

/// The key to material mapping for one frame.
#[derive(Debug, Default)]
pub struct ScissorAssignment {
    order: Vec<ScissorKey>,
    handles: HashMap<ScissorKey, MaterialInstanceId>,
}

impl ScissorAssignment {
    pub fn get(&self, key: ScissorKey) -> Option<MaterialInstanceId> {
        self.handles.get(&key).copied()
    }

    /// Number of unique keys in the frame.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys with their handles, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (ScissorKey, MaterialInstanceId)> + '_ {
        self.order.iter().map(move |k| (*k, self.handles[k]))
    }
}

/// Persistent pool of material instances, one per unique scissor per frame.
#[derive(Debug, Default)]
pub struct ScissorBatcher {
    pool: Vec<MaterialInstanceId>,
}

impl ScissorBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a material instance to every unique scissor among `clips`.
    ///
    /// Pooled instances are reused in order; only the shortfall is created.
    pub fn assign<E, I>(&mut self, engine: &mut E, framebuffer_height: u32, clips: I) -> ScissorAssignment
    where
        E: RenderEngine + ?Sized,
        I: IntoIterator<Item = ClipRect>,
    {
        let mut assignment = ScissorAssignment::default();
        let mut seen = HashSet::new();
        for clip in clips {
            let key = ScissorKey::from_clip(framebuffer_height, &clip);
            if seen.insert(key) {
                assignment.order.push(key);
            }
        }

        let needed = assignment.order.len();
        if needed > self.pool.len() {
            let shortfall = needed - self.pool.len();
            self.pool
                .extend((0..shortfall).map(|_| engine.create_material_instance()));
            log::debug!(
                "Material pool grew by {} to {} instances",
                shortfall,
                self.pool.len()
            );
        }

        for (key, handle) in assignment.order.iter().zip(&self.pool) {
            engine.set_scissor(*handle, key.to_scissor());
            assignment.handles.insert(*key, *handle);
        }

        assignment
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn release<E: RenderEngine + ?Sized>(&mut self, engine: &mut E) {
        for handle in self.pool.drain(..) {
            engine.destroy_material_instance(handle);
        }
    }
}
