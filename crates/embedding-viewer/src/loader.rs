//! Dataset loading off the render thread.

use crate::error::LoadError;
use crossbeam_channel::{Receiver, TryRecvError};
use embedding_data::{AssetError, PointCloudBuffer};
use std::{fmt, path::PathBuf, thread};

/// What the HUD shows about the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready(usize),
    Failed(String),
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Loading => f.write_str("Loading embeddings…"),
            LoadStatus::Ready(n) => write!(f, "{n} points"),
            LoadStatus::Failed(msg) => write!(f, "Load failed: {msg}"),
        }
    }
}

/// One-shot worker that builds the point cloud and hands it back over a channel.
pub struct DatasetLoader {
    rx: Option<Receiver<Result<PointCloudBuffer, AssetError>>>,
}

impl DatasetLoader {
    /// Loads the JSON assets under `dir`.
    pub fn spawn(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        Self::spawn_with(move || embedding_data::load_dir(dir))
    }

    pub fn spawn_with<F>(load: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> Result<PointCloudBuffer, AssetError> + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::Builder::new()
            .name("dataset-loader".into())
            .spawn(move || {
                // The receiver may be gone if the app already quit.
                let _ = tx.send(load());
            })?;
        Ok(Self { rx: Some(rx) })
    }

    /// Non-blocking. Yields the result exactly once; `None` before and after.
    pub fn poll(&mut self) -> Option<Result<PointCloudBuffer, LoadError>> {
        let rx = self.rx.as_ref()?;
        let out = match rx.try_recv() {
            Ok(result) => result.map_err(LoadError::from),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LoadError::WorkerExited),
        };
        self.rx = None;
        Some(out)
    }

    pub fn is_pending(&self) -> bool {
        self.rx.is_some()
    }
}
