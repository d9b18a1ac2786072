use crate::{camera::Viewport, error::ResourceError};
use std::sync::Arc;
use winit::window::Window;

/// Device, queue and the configured window surface.
pub struct GfxContext {
    pub surface:  wgpu::Surface<'static>,
    pub device:   wgpu::Device,
    pub queue:    wgpu::Queue,
    pub config:   wgpu::SurfaceConfiguration,
    pub viewport: Viewport,
}

impl GfxContext {
    /// Creates the context for `window`, sized to its current inner size.
    pub async fn new(window: Arc<Window>) -> Result<Self, ResourceError> {
        let viewport = Viewport::from(window.inner_size());
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // `Arc<Window>` keeps the window alive as long as the surface.
        let surface = instance.create_surface(window)?;

        // Any high-performance adapter that can present to the surface.
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(ResourceError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?}).", info.name, info.backend);

        // Device and queue with downlevel limits, raised to what the adapter supports.
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None, // no trace
            )
            .await?;

        // Surface format: prefer sRGB, else whatever comes first.
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(ResourceError::NoSurfaceFormat)?;

        // Configure the swapchain.
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            present_mode: wgpu::PresentMode::Fifo, // V-sync
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            viewport,
        })
    }

    /// Reconfigures the swapchain. Empty sizes (minimized window) are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.viewport = viewport;
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}
