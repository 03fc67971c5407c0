use scenegui_gpu::GpuError;
use thiserror::Error;

use crate::bridge::ScissorKey;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Render engine error: {0}")]
    Gpu(#[from] GpuError),

    #[error("No buffer slot for draw list {0}")]
    MissingSlot(usize),

    #[error("No material instance assigned to scissor {0:?}")]
    UnassignedScissor(ScissorKey),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
