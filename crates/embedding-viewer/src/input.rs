//! Window-system independent input events.
//!
//! Camera controls and picking consume [`InputEvent`]s. [`translate`] maps winit window
//! events onto them, so both can be driven from tests without a window.

use glam::Vec2;
use winit::{
    event::{
        ElementState, MouseButton, MouseScrollDelta, TouchPhase as WinitTouchPhase, WindowEvent,
    },
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    /// The OS took the touch away. Never completes a tap.
    Cancelled,
}

/// Movement keys, already mapped from physical key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Positions are physical pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerUp { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    /// Positive is "scroll up" / zoom in, in wheel lines.
    Wheel { delta: f32 },
    Touch { id: u64, phase: TouchPhase, position: Vec2 },
    Key { key: MoveKey, pressed: bool },
    /// Focus was lost. Held keys, buttons and touches are dropped without a release.
    Cancel,
}

fn move_key(code: KeyCode) -> Option<MoveKey> {
    Some(match code {
        KeyCode::KeyW | KeyCode::ArrowUp => MoveKey::Forward,
        KeyCode::KeyS | KeyCode::ArrowDown => MoveKey::Backward,
        KeyCode::KeyA | KeyCode::ArrowLeft => MoveKey::Left,
        KeyCode::KeyD | KeyCode::ArrowRight => MoveKey::Right,
        KeyCode::KeyE | KeyCode::Space => MoveKey::Up,
        KeyCode::KeyQ | KeyCode::ShiftLeft => MoveKey::Down,
        _ => return None,
    })
}

/// Translates a winit event. `cursor` tracks the last pointer position, because winit
/// button events carry no coordinates.
pub fn translate(event: &WindowEvent, cursor: &mut Vec2) -> Option<InputEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            *cursor = Vec2::new(position.x as f32, position.y as f32);
            Some(InputEvent::PointerMove { position: *cursor })
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                MouseButton::Middle => PointerButton::Middle,
                _ => return None,
            };
            Some(match state {
                ElementState::Pressed => InputEvent::PointerDown {
                    button,
                    position: *cursor,
                },
                ElementState::Released => InputEvent::PointerUp {
                    button,
                    position: *cursor,
                },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let delta = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
            };
            Some(InputEvent::Wheel { delta })
        }
        WindowEvent::Touch(touch) => {
            let phase = match touch.phase {
                WinitTouchPhase::Started => TouchPhase::Started,
                WinitTouchPhase::Moved => TouchPhase::Moved,
                WinitTouchPhase::Ended => TouchPhase::Ended,
                WinitTouchPhase::Cancelled => TouchPhase::Cancelled,
            };
            Some(InputEvent::Touch {
                id: touch.id,
                phase,
                position: Vec2::new(touch.location.x as f32, touch.location.y as f32),
            })
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let PhysicalKey::Code(code) = event.physical_key else {
                return None;
            };
            move_key(code).map(|key| InputEvent::Key {
                key,
                pressed: event.state == ElementState::Pressed,
            })
        }
        // winit sends no releases for input held while the window was unfocused.
        WindowEvent::Focused(false) => Some(InputEvent::Cancel),
        _ => None,
    }
}
