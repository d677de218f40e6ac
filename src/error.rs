use std::path::PathBuf;
use thiserror::Error;

/// Startup asset failures. Always fatal: a missing texture is never replaced
/// with a blank one.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("texture not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to decode texture {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Parameter file failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// GPU setup and presentation failures
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to find an appropriate adapter")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire device")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface error")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
