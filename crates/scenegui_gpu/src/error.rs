use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpuError {
    #[error("Failed to request adapter: {0}")]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("Could not read {}: {reason}", path.display())]
    ResourceRead { path: PathBuf, reason: String },

    #[error("Material template {} is not valid UTF-8 WGSL", path.display())]
    MaterialEncoding { path: PathBuf },

    #[error("Cannot create {kind} buffer of {bytes} bytes (limit {limit})")]
    BufferTooLarge {
        kind: &'static str,
        bytes: u64,
        limit: u64,
    },

    #[error("Font atlas error: {0}")]
    Atlas(String),

    #[error("Unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },
}

pub type Result<T> = std::result::Result<T, GpuError>;
