//! Device-dependent camera navigation.
//!
//! One [`CameraControlAdapter`] is chosen at startup from the [`DeviceClass`] and owns the
//! [`CameraState`] from then on. Input is queued by `handle_input` and applied once per frame
//! by `advance`.

pub mod free_flight;
pub mod orbit;

pub use self::{free_flight::FreeFlightControls, orbit::OrbitControls};

use crate::{
    camera::{CameraState, Viewport},
    input::InputEvent,
};

/// Navigation over a camera it owns. Knows nothing about scene content.
pub trait CameraControlAdapter {
    /// Queues an input event. The camera does not move until [`Self::advance`].
    fn handle_input(&mut self, event: &InputEvent);

    /// Applies pending input. `time_s` is seconds since start, non-decreasing.
    fn advance(&mut self, time_s: f64);

    fn camera(&self) -> &CameraState;

    /// Resizes the projection to match the host surface.
    fn set_viewport(&mut self, viewport: Viewport);

    fn name(&self) -> &'static str;
}

/// Coarse input capability of the host device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Touch,
    Desktop,
}

const MOBILE_UA_TOKENS: [&str; 8] = [
    "Android",
    "webOS",
    "iPhone",
    "iPad",
    "iPod",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

impl DeviceClass {
    /// Classifies a browser user-agent string by its mobile tokens (case-insensitive).
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if MOBILE_UA_TOKENS
            .iter()
            .any(|token| ua.contains(&token.to_ascii_lowercase()))
        {
            Self::Touch
        } else {
            Self::Desktop
        }
    }

    /// Resolves the device class once. An explicit choice wins, then a `USER_AGENT`
    /// environment variable, then the target OS.
    pub fn detect(forced: Option<DeviceClass>) -> Self {
        if let Some(class) = forced {
            return class;
        }
        if let Ok(ua) = std::env::var("USER_AGENT") {
            return Self::from_user_agent(&ua);
        }
        match std::env::consts::OS {
            "android" | "ios" => Self::Touch,
            _ => Self::Desktop,
        }
    }
}

/// Free-flight sensitivities. The orbit variant uses fixed three.js-style speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSettings {
    pub translation_sensitivity: f32,
    pub rotation_sensitivity: f32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            translation_sensitivity: 10.0,
            rotation_sensitivity: 10.0,
        }
    }
}

/// Builds the adapter for `class`, taking ownership of `camera`.
pub fn select_adapter(
    class: DeviceClass,
    camera: CameraState,
    viewport: Viewport,
    settings: ControlSettings,
) -> Box<dyn CameraControlAdapter> {
    let adapter: Box<dyn CameraControlAdapter> = match class {
        DeviceClass::Touch => Box::new(OrbitControls::new(camera, viewport)),
        DeviceClass::Desktop => Box::new(FreeFlightControls::new(camera, settings)),
    };
    log::info!("Device class {:?}: using {} controls.", class, adapter.name());
    adapter
}
