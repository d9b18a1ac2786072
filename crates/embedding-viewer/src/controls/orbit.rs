//! Orbit navigation around a pivot, for touch devices.
//!
//! Primary drag / one finger rotates, secondary or middle drag / two fingers pan,
//! wheel / pinch dolly. Speeds follow three.js `OrbitControls` defaults.

use super::CameraControlAdapter;
use crate::{
    camera::{CameraState, Viewport},
    input::{InputEvent, PointerButton, TouchPhase},
};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

const ROTATE_SPEED: f32 = 1.0;
const ZOOM_SPEED: f32 = 1.0;
const MIN_DISTANCE: f32 = 1e-3;
const MAX_DISTANCE: f32 = 1e5;
/// Keeps the polar angle off the poles so `look_at` stays well defined.
const POLAR_EPS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

/// Camera offset from the pivot in spherical coordinates (three.js convention, +Y up).
#[derive(Debug, Clone, Copy)]
struct Spherical {
    radius: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius <= f32::EPSILON {
            return Self {
                radius: 0.0,
                theta: 0.0,
                phi: PI * 0.5,
            };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        )
    }
}

pub struct OrbitControls {
    camera: CameraState,
    target: Vec3,
    viewport: Viewport,

    // Accumulated since the last advance().
    rotate_px: Vec2,
    pan_px: Vec2,
    dolly_scale: f32,

    drag: Option<DragMode>,
    last_pointer: Option<Vec2>,
    touches: Vec<(u64, Vec2)>,
}

impl OrbitControls {
    /// Orbits the origin, starting from the camera's current position.
    pub fn new(camera: CameraState, viewport: Viewport) -> Self {
        let mut controls = Self {
            camera,
            target: Vec3::ZERO,
            viewport,
            rotate_px: Vec2::ZERO,
            pan_px: Vec2::ZERO,
            dolly_scale: 1.0,
            drag: None,
            last_pointer: None,
            touches: Vec::new(),
        };
        controls.apply();
        controls
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    fn on_touch(&mut self, id: u64, phase: TouchPhase, position: Vec2) {
        match phase {
            TouchPhase::Started => {
                if !self.touches.iter().any(|(t, _)| *t == id) {
                    self.touches.push((id, position));
                }
            }
            TouchPhase::Ended | TouchPhase::Cancelled => self.touches.retain(|(t, _)| *t != id),
            TouchPhase::Moved => {
                let Some(idx) = self.touches.iter().position(|(t, _)| *t == id) else {
                    return;
                };
                match self.touches.len() {
                    1 => {
                        self.rotate_px += position - self.touches[idx].1;
                        self.touches[idx].1 = position;
                    }
                    2 => {
                        let other = self.touches[1 - idx].1;
                        let before = self.touches[idx].1;
                        let mid_before = (before + other) * 0.5;
                        let mid_after = (position + other) * 0.5;
                        self.pan_px += mid_after - mid_before;

                        let d_before = before.distance(other);
                        let d_after = position.distance(other);
                        if d_before > f32::EPSILON && d_after > f32::EPSILON {
                            // Fingers apart -> zoom in -> smaller radius.
                            self.dolly_scale *= d_before / d_after;
                        }
                        self.touches[idx].1 = position;
                    }
                    _ => self.touches[idx].1 = position,
                }
            }
        }
    }

    /// Writes the pending deltas into the spherical offset and the camera pose.
    fn apply(&mut self) {
        let height = self.viewport.size().y;
        let mut offset = self.camera.position - self.target;

        // Pan scales with the distance to the pivot so the pivot tracks the finger.
        if self.pan_px != Vec2::ZERO {
            let target_distance =
                offset.length() * (self.camera.projection.fov_y_rad * 0.5).tan();
            let dx = 2.0 * self.pan_px.x * target_distance / height;
            let dy = 2.0 * self.pan_px.y * target_distance / height;
            let pan = -self.camera.right() * dx + self.camera.up() * dy;
            self.target += pan;
        }

        let mut s = Spherical::from_offset(offset);
        s.theta -= TAU * self.rotate_px.x / height * ROTATE_SPEED;
        s.phi -= TAU * self.rotate_px.y / height * ROTATE_SPEED;
        s.phi = s.phi.clamp(POLAR_EPS, PI - POLAR_EPS);
        s.radius = (s.radius * self.dolly_scale).clamp(MIN_DISTANCE, MAX_DISTANCE);
        offset = s.to_offset();

        self.camera.position = self.target + offset;
        self.camera.look_at(self.target, Vec3::Y);

        self.rotate_px = Vec2::ZERO;
        self.pan_px = Vec2::ZERO;
        self.dolly_scale = 1.0;
    }
}

impl CameraControlAdapter for OrbitControls {
    fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { button, position } => {
                self.drag = Some(match button {
                    PointerButton::Primary => DragMode::Rotate,
                    PointerButton::Secondary | PointerButton::Middle => DragMode::Pan,
                });
                self.last_pointer = Some(position);
            }
            InputEvent::PointerUp { .. } => {
                self.drag = None;
                self.last_pointer = None;
            }
            InputEvent::PointerMove { position } => {
                if let (Some(mode), Some(last)) = (self.drag, self.last_pointer) {
                    let delta = position - last;
                    match mode {
                        DragMode::Rotate => self.rotate_px += delta,
                        DragMode::Pan => self.pan_px += delta,
                    }
                    self.last_pointer = Some(position);
                }
            }
            InputEvent::Wheel { delta } => {
                self.dolly_scale *= 0.95f32.powf(ZOOM_SPEED * delta);
            }
            InputEvent::Touch {
                id,
                phase,
                position,
            } => self.on_touch(id, phase, position),
            InputEvent::Cancel => {
                self.drag = None;
                self.last_pointer = None;
                self.touches.clear();
            }
            InputEvent::Key { .. } => {}
        }
    }

    fn advance(&mut self, _time_s: f64) {
        self.apply();
    }

    fn camera(&self) -> &CameraState {
        &self.camera
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
    }

    fn name(&self) -> &'static str {
        "orbit"
    }
}
