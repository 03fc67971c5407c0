//! Loading of the UI blit material template from the resource directory.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{GpuError, Result};

/// File name of the pass-through blit material inside the resource directory.
pub const UI_BLIT_MATERIAL: &str = "ui_blit.wgsl";

/// Raw material template read from disk.
#[derive(Debug, Clone)]
pub struct MaterialTemplate {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl MaterialTemplate {
    /// Read the template file in full.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| GpuError::ResourceRead {
            path: path.to_path_buf(),
            reason: describe_io_error(&e),
        })?;
        log::debug!("Loaded material template {} ({} bytes)", path.display(), bytes.len());
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    /// Read `ui_blit.wgsl` from `resource_dir`.
    pub fn load_ui_blit(resource_dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(resource_dir.as_ref().join(UI_BLIT_MATERIAL))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Template contents as WGSL source.
    pub fn source(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes).map_err(|_| GpuError::MaterialEncoding {
            path: self.path.clone(),
        })
    }
}

/// Translate an I/O error into a short human-readable reason.
pub fn describe_io_error(err: &io::Error) -> String {
    use io::ErrorKind;

    let reason = match err.kind() {
        ErrorKind::PermissionDenied => "Access denied",
        ErrorKind::NotFound => "No such file or directory",
        ErrorKind::AlreadyExists => "File already exists",
        ErrorKind::WouldBlock => "Resource temporarily unavailable",
        ErrorKind::Interrupted => "Read interrupted by a signal",
        ErrorKind::UnexpectedEof => "File is truncated",
        ErrorKind::InvalidInput => "Bad filename",
        ErrorKind::OutOfMemory => "Out of memory",
        ErrorKind::NotADirectory => "Bad path",
        ErrorKind::IsADirectory => "Path is a directory",
        ErrorKind::StorageFull => "No space available",
        ErrorKind::ReadOnlyFilesystem => "Read-only filesystem",
        ErrorKind::FileTooLarge => "File is too big",
        ErrorKind::TooManyLinks => "Too many links",
        _ => {
            return match err.raw_os_error() {
                Some(code) => format!("IO error {code} ({err})"),
                None => format!("IO error ({err})"),
            }
        }
    };
    reason.to_string()
}
