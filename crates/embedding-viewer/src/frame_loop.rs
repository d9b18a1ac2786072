//! Per-refresh driver: time uniform, then camera, then composite.

use crate::{camera::CameraState, controls::CameraControlAdapter, shader::ShaderClock};
use std::time::{Duration, Instant};

/// Draws one frame for the given camera and shader time, and presents it.
pub trait Compositor {
    type Error;

    fn composite(&mut self, camera: &CameraState, time_s: f32) -> Result<(), Self::Error>;
}

pub struct FrameLoop {
    started: Instant,
    clock: ShaderClock,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            clock: ShaderClock::new(),
        }
    }

    /// Runs one tick at wall-clock `elapsed` since start.
    pub fn tick<C: Compositor>(
        &mut self,
        elapsed: Duration,
        controls: &mut dyn CameraControlAdapter,
        compositor: &mut C,
    ) -> Result<(), C::Error> {
        let time = self.clock.advance(elapsed);
        controls.advance(elapsed.as_secs_f64());
        compositor.composite(controls.camera(), time)
    }

    pub fn tick_now<C: Compositor>(
        &mut self,
        controls: &mut dyn CameraControlAdapter,
        compositor: &mut C,
    ) -> Result<(), C::Error> {
        self.tick(self.started.elapsed(), controls, compositor)
    }

    pub fn time(&self) -> f32 {
        self.clock.time()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        camera::{Viewport, DEFAULT_FOV_DEG},
        input::InputEvent,
    };
    use glam::Vec3;
    use std::{cell::RefCell, rc::Rc};

    type Log = Rc<RefCell<Vec<String>>>;

    struct MockControls {
        camera: CameraState,
        log: Log,
    }

    impl CameraControlAdapter for MockControls {
        fn handle_input(&mut self, _event: &InputEvent) {}

        fn advance(&mut self, time_s: f64) {
            self.camera.position = Vec3::splat(time_s as f32);
            self.log.borrow_mut().push(format!("advance {time_s}"));
        }

        fn camera(&self) -> &CameraState {
            &self.camera
        }

        fn set_viewport(&mut self, viewport: Viewport) {
            self.camera.set_viewport(viewport);
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    struct MockCompositor {
        log: Log,
        seen: Vec<(Vec3, f32)>,
        fail: bool,
    }

    impl Compositor for MockCompositor {
        type Error = &'static str;

        fn composite(&mut self, camera: &CameraState, time_s: f32) -> Result<(), Self::Error> {
            self.log.borrow_mut().push("composite".into());
            self.seen.push((camera.position, time_s));
            if self.fail {
                Err("lost")
            } else {
                Ok(())
            }
        }
    }

    fn setup(fail: bool) -> (MockControls, MockCompositor, Log) {
        let log = Log::default();
        let controls = MockControls {
            camera: CameraState::new(DEFAULT_FOV_DEG, Viewport::new(4, 4)),
            log: log.clone(),
        };
        let compositor = MockCompositor { log: log.clone(), seen: Vec::new(), fail };
        (controls, compositor, log)
    }

    #[test]
    fn advance_runs_before_composite_with_current_camera() {
        let (mut controls, mut compositor, log) = setup(false);
        let mut frames = FrameLoop::new();
        frames
            .tick(Duration::from_millis(500), &mut controls, &mut compositor)
            .unwrap();

        assert_eq!(*log.borrow(), vec!["advance 0.5".to_owned(), "composite".to_owned()]);
        assert_eq!(compositor.seen, vec![(Vec3::splat(0.5), 0.5)]);
    }

    #[test]
    fn shader_time_never_goes_back() {
        let (mut controls, mut compositor, _) = setup(false);
        let mut frames = FrameLoop::new();
        for ms in [16, 33, 20, 50] {
            frames
                .tick(Duration::from_millis(ms), &mut controls, &mut compositor)
                .unwrap();
        }
        let times: Vec<f32> = compositor.seen.iter().map(|(_, t)| *t).collect();
        assert!(times.windows(2).all(|w| w[1] >= w[0]));
        approx::assert_abs_diff_eq!(frames.time(), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn compositor_error_propagates() {
        let (mut controls, mut compositor, _) = setup(true);
        let mut frames = FrameLoop::new();
        assert_eq!(frames.tick_now(&mut controls, &mut compositor), Err("lost"));
    }
}
