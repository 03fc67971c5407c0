//! Uniform types shared with the UI blit shader.

use bytemuck::{Pod, Zeroable};

/// Orthographic projection mapping UI points to clip space.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ProjectionUniform {
    pub matrix: [[f32; 4]; 4],
}

impl ProjectionUniform {
    /// Projection for a viewport of `width` x `height` points with the
    /// origin at the top-left corner and y growing downwards.
    pub fn ortho(width: f32, height: f32) -> Self {
        let w = width.max(1.0);
        let h = height.max(1.0);
        Self {
            matrix: [
                [2.0 / w, 0.0, 0.0, 0.0],
                [0.0, -2.0 / h, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [-1.0, 1.0, 0.0, 1.0],
            ],
        }
    }

    /// Apply the projection to a 2D point (column-major, w = 1).
    pub fn apply(&self, x: f32, y: f32) -> [f32; 2] {
        let m = &self.matrix;
        [
            m[0][0] * x + m[1][0] * y + m[3][0],
            m[0][1] * x + m[1][1] * y + m[3][1],
        ]
    }
}

impl Default for ProjectionUniform {
    fn default() -> Self {
        Self::ortho(1.0, 1.0)
    }
}
