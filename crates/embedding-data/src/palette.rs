//! Category palette: 1-based category codes map onto RGB triples.

use crate::error::ValidationError;

/// Ordered RGB colors, indexed by `category - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
}

impl Palette {
    pub fn new(colors: Vec<[u8; 3]>) -> Result<Self, ValidationError> {
        if colors.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// The four-color palette the viewer ships with.
    ///
    /// The first entry was authored with a red channel of 292; it saturates to 255 here.
    pub fn reference() -> Self {
        Self {
            colors: vec![
                [255, 60, 136],
                [244, 193, 125],
                [198, 227, 169],
                [92, 80, 157],
            ],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Looks up a 1-based category. `None` outside `1..=len`.
    pub fn get(&self, category: i64) -> Option<[u8; 3]> {
        let index = usize::try_from(category.checked_sub(1)?).ok()?;
        self.colors.get(index).copied()
    }

    /// Same as [`Palette::get`], with channels scaled to `[0, 1]`.
    pub fn normalized(&self, category: i64) -> Option<[f32; 3]> {
        self.get(category).map(normalize_rgb)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::reference()
    }
}

#[inline]
pub fn normalize_rgb(rgb: [u8; 3]) -> [f32; 3] {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    ]
}
