use crate::{
    camera::{CameraState, Viewport},
    config::Config,
    controls::{self, CameraControlAdapter},
    frame_loop::{Compositor, FrameLoop},
    input,
    loader::{DatasetLoader, LoadStatus},
    picking::{PickingController, Selection},
    renderer::Renderer,
    scene::SceneGraph,
    ui,
};
use anyhow::{Context as _, Result};
use glam::Vec2;
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

pub struct App {
    pub renderer: Renderer,
    controls: Box<dyn CameraControlAdapter>,
    picking: PickingController,
    scene: SceneGraph,
    frame_loop: FrameLoop,
    loader: DatasetLoader,
    status: LoadStatus,
    cursor: Vec2,
    debug_panel: bool,
}

impl App {
    pub async fn new(window: Arc<Window>, config: &Config) -> Result<Self> {
        let renderer = Renderer::new(window, config.bloom())
            .await
            .context("failed to initialise the GPU")?;
        let viewport = renderer.viewport();

        let camera = CameraState::new(config.fov, viewport);
        let controls =
            controls::select_adapter(config.device_class(), camera, viewport, config.controls());

        let prefix = config.select_url_prefix.clone();
        let picking = PickingController::new(
            config.picking(),
            Box::new(move |label: &str| log::info!("Selected {prefix}{label}")),
        );

        let loader = DatasetLoader::spawn(&config.assets)
            .context("failed to start the dataset loader")?;
        log::info!("Loading embeddings from '{}'.", config.assets.display());

        Ok(Self {
            renderer,
            controls,
            picking,
            scene: SceneGraph::new(),
            frame_loop: FrameLoop::new(),
            loader,
            status: LoadStatus::Loading,
            cursor: Vec2::ZERO,
            debug_panel: config.debug_panel,
        })
    }

    /// Propagates a new surface size to the swapchain, render targets and projection.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        log::debug!("Resize to {}x{}.", viewport.width, viewport.height);
        self.renderer.resize(viewport);
        self.controls.set_viewport(viewport);
    }

    /// Returns `true` when the overlay consumed the event.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        if self.renderer.overlay.on_window_event(window, event) {
            return true;
        }

        if let WindowEvent::Resized(size) = event {
            self.resize(Viewport::from(*size));
            return false;
        }

        if let Some(ev) = input::translate(event, &mut self.cursor) {
            self.controls.handle_input(&ev);
            self.picking.handle_input(
                &ev,
                self.controls.camera(),
                self.renderer.viewport(),
                &mut self.scene,
            );
        }

        false
    }

    fn poll_loader(&mut self) {
        if !self.loader.is_pending() {
            return;
        }
        let Some(result) = self.loader.poll() else {
            return;
        };
        match result {
            Ok(cloud) => {
                self.renderer.upload_cloud(&cloud);
                self.scene.set_cloud(cloud);
                self.status = LoadStatus::Ready(self.scene.point_count());
            }
            Err(err) => {
                log::error!("Failed to load embeddings: {err}");
                self.status = LoadStatus::Failed(err.to_string());
            }
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        self.poll_loader();

        let mut presenter = Presenter {
            renderer: &mut self.renderer,
            window,
            scene: &self.scene,
            status: &self.status,
            selection: self.picking.selection(),
            debug_panel: self.debug_panel,
        };
        self.frame_loop
            .tick_now(self.controls.as_mut(), &mut presenter)
    }
}

/// Draws one frame into the window surface and presents it.
struct Presenter<'a> {
    renderer: &'a mut Renderer,
    window: &'a Window,
    scene: &'a SceneGraph,
    status: &'a LoadStatus,
    selection: &'a Selection,
    debug_panel: bool,
}

impl Compositor for Presenter<'_> {
    type Error = wgpu::SurfaceError;

    fn composite(&mut self, camera: &CameraState, time_s: f32) -> Result<(), Self::Error> {
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = self.renderer.viewport();
        let mut bloom = self.renderer.bloom.params;
        let overlay = self.renderer.overlay.frame(self.window, viewport, |ctx| {
            ui::draw_label(ctx, &self.scene.label, camera, viewport);
            ui::draw_hud(ctx, self.status, self.selection);
            if self.debug_panel {
                ui::draw_debug_panel(ctx, &mut bloom);
            }
        });
        self.renderer.bloom.params = bloom;

        self.renderer.render(&swap_view, camera, time_s, &overlay);
        frame.present();
        Ok(())
    }
}
