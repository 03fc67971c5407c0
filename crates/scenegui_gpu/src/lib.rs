//! scenegui_gpu - render engine seam and wgpu backend for the UI bridge

pub mod bindings;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod headless;
pub mod material;
pub mod pipeline;
pub mod texture;
pub mod uniform;
pub mod vertex;
pub mod wgpu_engine;

pub use config::{ClearColor, GpuConfig};
pub use context::GpuContext;
pub use engine::{
    IndexBufferId, MaterialInstanceId, Primitive, RenderEngine, RenderableId, ScissorRect,
    VertexBufferId,
};
pub use error::{GpuError, Result};
pub use headless::{EngineCounters, HeadlessEngine};
pub use material::{describe_io_error, MaterialTemplate, UI_BLIT_MATERIAL};
pub use uniform::ProjectionUniform;
pub use vertex::{DrawIdx, DrawVert};
pub use wgpu_engine::WgpuEngine;
