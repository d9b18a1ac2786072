//! Free-flight navigation for pointer + keyboard devices.

use super::{CameraControlAdapter, ControlSettings};
use crate::{
    camera::{CameraState, Viewport},
    input::{InputEvent, MoveKey, PointerButton},
};
use glam::{EulerRot, Quat, Vec2, Vec3};
use std::collections::HashSet;

/// Radians of yaw/pitch per dragged pixel, per unit of rotation sensitivity.
const ROTATION_RAD_PER_PX: f32 = 2.5e-4;
/// World units per second of held movement, per unit of translation sensitivity.
const TRANSLATION_UNITS_PER_S: f32 = 0.1;
/// World units per wheel line, per unit of translation sensitivity.
const DOLLY_UNITS_PER_LINE: f32 = 0.01;
/// Longest frame step applied to held keys; avoids a jump after a stall.
const MAX_STEP_S: f64 = 0.1;
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

pub struct FreeFlightControls {
    camera: CameraState,
    settings: ControlSettings,
    yaw: f32,
    pitch: f32,

    look_px: Vec2,
    dolly_lines: f32,
    held: HashSet<MoveKey>,

    rotating: bool,
    last_pointer: Option<Vec2>,
    last_time_s: Option<f64>,
}

impl FreeFlightControls {
    pub fn new(camera: CameraState, settings: ControlSettings) -> Self {
        let (yaw, pitch, _) = camera.orientation.to_euler(EulerRot::YXZ);
        Self {
            camera,
            settings,
            yaw,
            pitch,
            look_px: Vec2::ZERO,
            dolly_lines: 0.0,
            held: HashSet::new(),
            rotating: false,
            last_pointer: None,
            last_time_s: None,
        }
    }

    fn held_direction(&self) -> Vec3 {
        let mut dir = Vec3::ZERO;
        for key in &self.held {
            dir += match key {
                MoveKey::Forward => Vec3::NEG_Z,
                MoveKey::Backward => Vec3::Z,
                MoveKey::Left => Vec3::NEG_X,
                MoveKey::Right => Vec3::X,
                MoveKey::Up => Vec3::Y,
                MoveKey::Down => Vec3::NEG_Y,
            };
        }
        dir.normalize_or_zero()
    }
}

impl CameraControlAdapter for FreeFlightControls {
    fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown {
                button: PointerButton::Primary,
                position,
            } => {
                self.rotating = true;
                self.last_pointer = Some(position);
            }
            InputEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                self.rotating = false;
                self.last_pointer = None;
            }
            InputEvent::PointerMove { position } => {
                if let (true, Some(last)) = (self.rotating, self.last_pointer) {
                    self.look_px += position - last;
                    self.last_pointer = Some(position);
                }
            }
            InputEvent::Wheel { delta } => self.dolly_lines += delta,
            InputEvent::Key { key, pressed } => {
                if pressed {
                    self.held.insert(key);
                } else {
                    self.held.remove(&key);
                }
            }
            InputEvent::Cancel => {
                self.held.clear();
                self.rotating = false;
                self.last_pointer = None;
            }
            InputEvent::PointerDown { .. }
            | InputEvent::PointerUp { .. }
            | InputEvent::Touch { .. } => {}
        }
    }

    fn advance(&mut self, time_s: f64) {
        let dt = match self.last_time_s {
            Some(last) => (time_s - last).clamp(0.0, MAX_STEP_S) as f32,
            None => 0.0,
        };
        self.last_time_s = Some(self.last_time_s.map_or(time_s, |last| last.max(time_s)));

        let rot = ROTATION_RAD_PER_PX * self.settings.rotation_sensitivity;
        self.yaw -= self.look_px.x * rot;
        self.pitch = (self.pitch - self.look_px.y * rot).clamp(-MAX_PITCH, MAX_PITCH);
        self.camera.orientation = Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0);

        let speed = TRANSLATION_UNITS_PER_S * self.settings.translation_sensitivity;
        let mut local = self.held_direction() * speed * dt;
        local += Vec3::NEG_Z
            * self.dolly_lines
            * DOLLY_UNITS_PER_LINE
            * self.settings.translation_sensitivity;
        self.camera.position += self.camera.orientation * local;

        self.look_px = Vec2::ZERO;
        self.dolly_lines = 0.0;
    }

    fn camera(&self) -> &CameraState {
        &self.camera
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.camera.set_viewport(viewport);
    }

    fn name(&self) -> &'static str {
        "free-flight"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DEFAULT_FOV_DEG;
    use approx::assert_abs_diff_eq;

    fn controls(settings: ControlSettings) -> FreeFlightControls {
        FreeFlightControls::new(
            CameraState::new(DEFAULT_FOV_DEG, Viewport::new(800, 600)),
            settings,
        )
    }

    #[test]
    fn held_forward_moves_along_view_direction() {
        let mut c = controls(ControlSettings::default());
        c.advance(0.0);
        c.handle_input(&InputEvent::Key {
            key: MoveKey::Forward,
            pressed: true,
        });
        c.advance(0.05);
        // 10 sensitivity * 0.1 u/s * 0.05 s
        assert_abs_diff_eq!(c.camera().position.z, 1.0 - 0.05, epsilon = 1e-5);
        c.handle_input(&InputEvent::Key {
            key: MoveKey::Forward,
            pressed: false,
        });
        c.advance(0.1);
        assert_abs_diff_eq!(c.camera().position.z, 1.0 - 0.05, epsilon = 1e-5);
    }

    #[test]
    fn cancel_releases_held_keys_and_drag() {
        let mut c = controls(ControlSettings::default());
        c.advance(0.0);
        c.handle_input(&InputEvent::Key {
            key: MoveKey::Forward,
            pressed: true,
        });
        c.handle_input(&InputEvent::PointerDown {
            button: PointerButton::Primary,
            position: Vec2::ZERO,
        });
        c.handle_input(&InputEvent::Cancel);
        let before = c.camera().clone();

        c.handle_input(&InputEvent::PointerMove {
            position: Vec2::new(80.0, 40.0),
        });
        c.advance(0.05);
        c.advance(0.1);
        assert_eq!(c.camera(), &before);
    }

    #[test]
    fn translation_sensitivity_scales_speed() {
        let mut slow = controls(ControlSettings {
            translation_sensitivity: 1.0,
            rotation_sensitivity: 10.0,
        });
        let mut fast = controls(ControlSettings {
            translation_sensitivity: 20.0,
            rotation_sensitivity: 10.0,
        });
        for c in [&mut slow, &mut fast] {
            c.advance(0.0);
            c.handle_input(&InputEvent::Key {
                key: MoveKey::Right,
                pressed: true,
            });
            c.advance(0.05);
        }
        assert_abs_diff_eq!(
            fast.camera().position.x,
            20.0 * slow.camera().position.x,
            epsilon = 1e-5
        );
    }

    #[test]
    fn drag_yaws_with_rotation_sensitivity() {
        let mut c = controls(ControlSettings::default());
        c.handle_input(&InputEvent::PointerDown {
            button: PointerButton::Primary,
            position: Vec2::ZERO,
        });
        c.handle_input(&InputEvent::PointerMove { position: Vec2::new(100.0, 0.0) });
        c.advance(0.0);
        let (yaw, pitch, _) = c.camera().orientation.to_euler(EulerRot::YXZ);
        assert_abs_diff_eq!(yaw, -100.0 * ROTATION_RAD_PER_PX * 10.0, epsilon = 1e-5);
        assert_abs_diff_eq!(pitch, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn hover_does_not_rotate() {
        let mut c = controls(ControlSettings::default());
        let before = c.camera().orientation;
        c.handle_input(&InputEvent::PointerMove { position: Vec2::new(100.0, 50.0) });
        c.advance(0.0);
        assert!(c.camera().orientation.abs_diff_eq(before, 1e-6));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut c = controls(ControlSettings::default());
        c.handle_input(&InputEvent::PointerDown {
            button: PointerButton::Primary,
            position: Vec2::ZERO,
        });
        c.handle_input(&InputEvent::PointerMove {
            position: Vec2::new(0.0, -1.0e6),
        });
        c.advance(0.0);
        let (_, pitch, _) = c.camera().orientation.to_euler(EulerRot::YXZ);
        assert!(pitch <= MAX_PITCH + 1e-4);
    }

    #[test]
    fn time_going_backwards_does_not_move() {
        let mut c = controls(ControlSettings::default());
        c.advance(1.0);
        c.handle_input(&InputEvent::Key {
            key: MoveKey::Forward,
            pressed: true,
        });
        c.advance(0.5);
        assert_abs_diff_eq!(c.camera().position.z, 1.0, epsilon = 1e-6);
    }
}
