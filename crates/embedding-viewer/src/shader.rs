//! Animated point shading: uniform layout, time source and the per-point formulas
//! implemented by `shaders/animated_points.wgsl`.

use crate::camera::{CameraState, Viewport};
use std::time::Duration;

/// Global uniform for the point pipeline, std140 layout.
/// Must match `PointUniform` in `animated_points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Physical pixels.
    pub viewport_size: [f32; 2],
    /// Seconds since start.
    pub time: f32,
    pub _pad: f32,
}

const _: [(); 144] = [(); core::mem::size_of::<PointUniform>()];

impl PointUniform {
    pub fn new(camera: &CameraState, viewport: Viewport, time: f32) -> Self {
        Self {
            view: camera.view().to_cols_array_2d(),
            proj: camera.proj().to_cols_array_2d(),
            viewport_size: viewport.size().to_array(),
            time,
            _pad: 0.0,
        }
    }
}

/// On-screen point size in pixels for a view-space depth (negative in front).
#[inline]
pub fn point_size_px(view_depth: f32) -> f32 {
    (1.5 + 2.5 / -view_depth).max(1.0)
}

/// Brightness multiplier applied to a point's color, in `[0.8, 1.8]`.
#[inline]
pub fn pulse(phase: f32, time: f32) -> f32 {
    0.8 + 0.5 * ((phase * 50.0 + time * 3.0).sin() + 1.0)
}

/// Source of the `time` uniform: seconds since start, never decreasing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShaderClock {
    time: f32,
}

impl ShaderClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves to `elapsed`. An earlier reading keeps the current time.
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.time = self.time.max(elapsed.as_secs_f32());
        self.time
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }
}
