//! Reads an embedding dataset from a directory of JSON files.
//!
//! Layout:
//!   embeddings.json           `[[x, y, z], ...]`
//!   embeddings-category.json  `[c, ...]` (1-based palette index)
//!   embeddings-labels.json    `["label", ...]`  (optional)
//!   palette.json              `[[r, g, b], ...]` (optional, 0..=255)

use crate::{
    dataset::PointCloudDataset,
    error::AssetError,
    palette::Palette,
    PointCloudBuffer,
};
use serde::de::DeserializeOwned;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

pub const POSITIONS_FILE: &str = "embeddings.json";
pub const CATEGORIES_FILE: &str = "embeddings-category.json";
pub const LABELS_FILE: &str = "embeddings-labels.json";
pub const PALETTE_FILE: &str = "palette.json";

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AssetError> {
    let bytes = fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| AssetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, AssetError> {
    if path.is_file() {
        read_json(path).map(Some)
    } else {
        Ok(None)
    }
}

/// Loads the three parallel arrays. Labels fall back to placeholders.
pub fn load_dataset(dir: &Path) -> Result<PointCloudDataset, AssetError> {
    let positions: Vec<[f32; 3]> = read_json(&dir.join(POSITIONS_FILE))?;
    let raw_categories: Vec<i64> = read_json(&dir.join(CATEGORIES_FILE))?;
    let labels: Option<Vec<String>> = read_optional_json(&dir.join(LABELS_FILE))?;

    if labels.is_none() {
        log::warn!(
            "No {} in '{}'; using placeholder labels.",
            LABELS_FILE,
            dir.display()
        );
    }

    // Saturated codes are still out of range and get rejected by validation.
    let categories = raw_categories
        .into_iter()
        .map(|c| c.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
        .collect();

    Ok(PointCloudDataset::new(positions, categories, labels))
}

/// Loads `palette.json` if present, otherwise the reference palette.
pub fn load_palette(dir: &Path) -> Result<Palette, AssetError> {
    match read_optional_json::<Vec<[u8; 3]>>(&dir.join(PALETTE_FILE))? {
        Some(colors) => Ok(Palette::new(colors)?),
        None => Ok(Palette::reference()),
    }
}

/// Reads, validates and builds the point buffer for `dir`.
pub fn load_dir(dir: impl Into<PathBuf>) -> Result<PointCloudBuffer, AssetError> {
    let dir = dir.into();
    let start = Instant::now();

    let palette = load_palette(&dir)?;
    let dataset = load_dataset(&dir)?;
    let n = dataset.len();
    let buffer = dataset.into_buffer(&palette)?;

    log::info!(
        "Loaded {} points ({} categories) from '{}' in {:.1?}.",
        n,
        palette.len(),
        dir.display(),
        start.elapsed()
    );

    Ok(buffer)
}
