use crate::{
    controls::{ControlSettings, DeviceClass},
    picking::PickSettings,
    renderer::BloomParams,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// `embedding-viewer` - an interactive 3D viewer for embedding point clouds.
///
/// Loads a directory of JSON assets, draws every point as an animated glowing sprite, and
/// shows the label of the point under the cursor. Clicking a point reports its label.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory holding `embeddings.json`, `embeddings-category.json` and the optional
    /// `embeddings-labels.json` / `palette.json`.
    #[arg(long, env = "EMBEDDINGS_DIR", default_value = "assets")]
    pub assets: PathBuf,

    /// Navigation style. `auto` classifies the host once at startup.
    #[arg(long, value_enum, default_value_t = DeviceChoice::Auto)]
    pub device: DeviceChoice,

    /// Strength of the bloom added back onto the scene.
    #[arg(long, default_value_t = 2.0)]
    pub bloom_intensity: f32,

    /// Luminance above which pixels contribute to bloom.
    #[arg(long, default_value_t = 0.25)]
    pub bloom_threshold: f32,

    /// Blur radius of the bloom, in pixels.
    #[arg(long, default_value_t = 4.0)]
    pub bloom_radius: f32,

    /// Present the scene without the bloom passes.
    #[arg(long)]
    pub no_bloom: bool,

    /// Free-flight movement speed multiplier.
    #[arg(long, default_value_t = 10.0)]
    pub translation_sensitivity: f32,

    /// Free-flight look speed multiplier.
    #[arg(long, default_value_t = 10.0)]
    pub rotation_sensitivity: f32,

    /// Pixels a pressed pointer must move before a click becomes a drag. 0: any move.
    #[arg(long, default_value_t = 0.0)]
    pub drag_threshold_px: f32,

    /// Maximum distance, in world units, between a point and the pick ray.
    #[arg(long, default_value_t = 1.0)]
    pub pick_radius: f32,

    /// Only pick while the pointer is pressed.
    #[arg(long)]
    pub no_hover_pick: bool,

    /// Prefix logged in front of the label of a clicked point, e.g. a base URL.
    #[arg(long, env = "SELECT_URL_PREFIX", default_value = "")]
    pub select_url_prefix: String,

    /// Vertical field of view, in degrees.
    #[arg(long, default_value_t = 70.0)]
    pub fov: f32,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Show a panel for tuning bloom at runtime.
    #[arg(long)]
    pub debug_panel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceChoice {
    Auto,
    Touch,
    Desktop,
}

impl Config {
    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::detect(match self.device {
            DeviceChoice::Auto => None,
            DeviceChoice::Touch => Some(DeviceClass::Touch),
            DeviceChoice::Desktop => Some(DeviceClass::Desktop),
        })
    }

    pub fn bloom(&self) -> BloomParams {
        BloomParams {
            enabled: !self.no_bloom,
            intensity: self.bloom_intensity.max(0.0),
            threshold: self.bloom_threshold.clamp(0.0, 1.0),
            radius_px: self.bloom_radius.max(0.0),
        }
    }

    pub fn controls(&self) -> ControlSettings {
        ControlSettings {
            translation_sensitivity: self.translation_sensitivity,
            rotation_sensitivity: self.rotation_sensitivity,
        }
    }

    pub fn picking(&self) -> PickSettings {
        PickSettings {
            pick_radius: self.pick_radius.max(0.0),
            drag_threshold_px: self.drag_threshold_px.max(0.0),
            hover_pick: !self.no_hover_pick,
        }
    }
}
