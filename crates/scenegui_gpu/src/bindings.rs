//! Shader binding locations shared between Rust and `ui_blit.wgsl`.
//!
//! ```wgsl
//! @group(0) @binding(0) var<uniform> projection: Projection;
//! @group(0) @binding(1) var atlas: texture_2d<f32>;
//! @group(0) @binding(2) var atlas_sampler: sampler;
//! ```

/// Binding constants for the UI blit material.
pub mod blit {
    /// Group 0: everything the blit material reads.
    pub const GROUP: u32 = 0;
    /// Orthographic projection uniform.
    pub const PROJECTION_BINDING: u32 = 0;
    /// Single-channel font atlas.
    pub const ATLAS_BINDING: u32 = 1;
    pub const SAMPLER_BINDING: u32 = 2;
}
