//! Interactive 3D viewer for embedding point clouds.
//!
//! Points are drawn as animated, distance-scaled sprites with a bloom post stack. The camera is
//! driven by an orbit or free-flight adapter chosen per device, and pointer picking selects the
//! point nearest the cursor ray. Everything except [`renderer`] and [`app`] runs without a GPU.

pub mod app;
pub mod camera;
pub mod config;
pub mod controls;
pub mod error;
pub mod frame_loop;
pub mod input;
pub mod loader;
pub mod picking;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod ui;
