use embedding_data::AssetError;
use thiserror::Error;

/// GPU resources could not be created. Fatal at startup.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("surface supports no texture format")]
    NoSurfaceFormat,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

/// The background dataset load did not produce a point cloud.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("dataset loader exited without a result")]
    WorkerExited,
}
