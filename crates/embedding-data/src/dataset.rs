//! Parallel source arrays and their conversion into a [`PointCloudBuffer`].

use crate::{
    buffer::{PointCloudBuffer, PointVertex},
    error::ValidationError,
    palette::Palette,
};
use rand::Rng;
use rayon::prelude::*;

/// Label used for every point when the dataset ships without labels.
pub const PLACEHOLDER_LABEL: &str = "REDACTED";

/// Three aligned arrays describing the same points.
#[derive(Debug, Clone, Default)]
pub struct PointCloudDataset {
    pub positions: Vec<[f32; 3]>,
    pub categories: Vec<i32>,
    pub labels: Vec<String>,
}

impl PointCloudDataset {
    /// Builds a dataset. Missing labels become [`PLACEHOLDER_LABEL`], one per category.
    pub fn new(
        positions: Vec<[f32; 3]>,
        categories: Vec<i32>,
        labels: Option<Vec<String>>,
    ) -> Self {
        let labels =
            labels.unwrap_or_else(|| vec![PLACEHOLDER_LABEL.to_string(); categories.len()]);
        Self {
            positions,
            categories,
            labels,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks array alignment and that every category resolves in `palette`.
    /// Reports the first offending point.
    pub fn validate(&self, palette: &Palette) -> Result<(), ValidationError> {
        if palette.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }

        let n = self.positions.len();
        if self.categories.len() != n || self.labels.len() != n {
            return Err(ValidationError::LengthMismatch {
                positions: n,
                categories: self.categories.len(),
                labels: self.labels.len(),
            });
        }

        if let Some((index, &category)) = self
            .categories
            .iter()
            .enumerate()
            .find(|(_, c)| palette.get(**c as i64).is_none())
        {
            return Err(ValidationError::CategoryOutOfRange {
                index,
                category: category as i64,
                palette_len: palette.len(),
            });
        }

        Ok(())
    }

    /// Validates and builds the buffer, drawing phases from a per-thread RNG.
    pub fn into_buffer(self, palette: &Palette) -> Result<PointCloudBuffer, ValidationError> {
        self.validate(palette)?;

        let vertices: Vec<PointVertex> = self
            .positions
            .par_iter()
            .zip(self.categories.par_iter())
            .map_init(rand::thread_rng, |rng, (&position, &category)| {
                make_vertex(palette, position, category, rng.gen())
            })
            .collect();

        Ok(PointCloudBuffer::new(vertices, self.labels))
    }

    /// Like [`PointCloudDataset::into_buffer`], but phases come from `rng` in point order.
    pub fn into_buffer_with_rng<R: Rng>(
        self,
        palette: &Palette,
        rng: &mut R,
    ) -> Result<PointCloudBuffer, ValidationError> {
        self.validate(palette)?;

        let vertices = self
            .positions
            .iter()
            .zip(&self.categories)
            .map(|(&position, &category)| make_vertex(palette, position, category, rng.gen()))
            .collect();

        Ok(PointCloudBuffer::new(vertices, self.labels))
    }
}

#[inline]
fn make_vertex(palette: &Palette, position: [f32; 3], category: i32, phase: f32) -> PointVertex {
    // Categories are validated before any vertex is built.
    let color = palette.normalized(category as i64).unwrap_or([0.0; 3]);
    PointVertex {
        position,
        color,
        phase,
    }
}
