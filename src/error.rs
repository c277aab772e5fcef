use std::path::PathBuf;

/// Everything that can stop Bubbles from starting.
///
/// The running pet itself never fails: sound is best-effort and GPU
/// hiccups skip a frame. Only startup and platform setup land here.
#[derive(Debug, thiserror::Error)]
pub enum BubblesError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create wgpu surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create wgpu device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface has no supported formats")]
    NoSurfaceFormat,
}

pub type Result<T> = std::result::Result<T, BubblesError>;
