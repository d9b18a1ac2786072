//! Embedding point clouds: palette lookup, dataset validation and GPU-ready buffers.
//!
//! - A dataset is three parallel arrays: positions, 1-based category codes, labels.
//! - Categories index a [`Palette`]; codes outside `1..=palette.len()` are rejected.
//! - Each point gets a uniform random phase in `[0, 1)` that drives its brightness pulse.
//! - [`PointVertex`] is the 28-byte instance layout consumed by the point shader.

pub mod assets;
pub mod buffer;
pub mod dataset;
pub mod error;
pub mod palette;

pub use self::{
    assets::load_dir,
    buffer::{BoundingSphere, PointCloudBuffer, PointVertex},
    dataset::{PointCloudDataset, PLACEHOLDER_LABEL},
    error::{AssetError, ValidationError},
    palette::Palette,
};
