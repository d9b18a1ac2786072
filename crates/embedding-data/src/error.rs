use std::path::PathBuf;
use thiserror::Error;

/// A dataset that cannot be turned into a point buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("parallel arrays disagree: {positions} positions, {categories} categories, {labels} labels")]
    LengthMismatch {
        positions: usize,
        categories: usize,
        labels: usize,
    },

    #[error("point {index} has category {category}, expected 1..={palette_len}")]
    CategoryOutOfRange {
        index: usize,
        category: i64,
        palette_len: usize,
    },

    #[error("palette is empty")]
    EmptyPalette,
}

/// Failure while reading a dataset from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
