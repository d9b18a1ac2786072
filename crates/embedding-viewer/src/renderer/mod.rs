//! GPU side of the viewer. Owns the context, the offscreen targets, the point and bloom
//! pipelines, the egui overlay, and the GPU copy of the point cloud.

pub mod context;
pub mod overlay;
pub mod pipelines;
pub mod targets;

pub use self::pipelines::bloom::BloomParams;

use self::{
    context::GfxContext,
    overlay::{Overlay, OverlayFrame},
    pipelines::{
        bloom::BloomStack,
        points::{PointCloudGpu, PointsPipeline},
    },
    targets::{Targets, COLOR_FMT, DEPTH_FMT},
};
use crate::{
    camera::{CameraState, Viewport},
    error::ResourceError,
    shader::PointUniform,
};
use embedding_data::PointCloudBuffer;
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering state.
pub struct Renderer {
    pub gfx:     GfxContext,
    pub targets: Targets,
    pub points:  PointsPipeline,
    pub bloom:   BloomStack,
    pub overlay: Overlay,
    /// `None` until a non-empty cloud is uploaded.
    cloud:       Option<PointCloudGpu>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, bloom: BloomParams) -> Result<Self, ResourceError> {
        let gfx = GfxContext::new(window.clone()).await?;
        let viewport = gfx.viewport;

        // Offscreen HDR color + depth, then the passes that read or write them.
        let targets = Targets::new(&gfx.device, viewport);
        let points = PointsPipeline::new(&gfx.device, COLOR_FMT, DEPTH_FMT);
        let bloom = BloomStack::new(&gfx.device, gfx.format(), viewport, bloom);
        let overlay = Overlay::new(&window, &gfx.device, gfx.format());

        Ok(Self {
            gfx,
            targets,
            points,
            bloom,
            overlay,
            cloud: None,
        })
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.gfx.viewport
    }

    /// Copies the cloud to the GPU. An empty cloud draws nothing.
    pub fn upload_cloud(&mut self, cloud: &PointCloudBuffer) {
        self.cloud = (!cloud.is_empty()).then(|| PointCloudGpu::upload(&self.gfx.device, cloud));
    }

    /// Resizes the swapchain and every size-dependent target.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        self.gfx.resize(viewport);
        self.targets.resize(&self.gfx.device, viewport);
        self.bloom.resize(&self.gfx.device, viewport);
    }

    /// Points, then bloom into `swap_view`, then the overlay on top.
    pub fn render(
        &mut self,
        swap_view: &wgpu::TextureView,
        camera: &CameraState,
        time: f32,
        overlay: &OverlayFrame,
    ) {
        // Per-frame uniforms.
        self.points
            .update(&self.gfx.queue, &PointUniform::new(camera, self.viewport(), time));

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // 1. Points into the HDR target.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Points Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(cloud) = &self.cloud {
                self.points.draw(&mut pass, cloud);
            }
        }

        // 2. Bloom (or a plain blit) into the swapchain.
        self.bloom.run(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            swap_view,
            &self.targets.color,
        );

        // 3. Labels, HUD and panels on top.
        self.overlay
            .paint(&self.gfx.device, &self.gfx.queue, &mut encoder, swap_view, overlay);

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }
}
