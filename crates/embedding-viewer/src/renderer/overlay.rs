//! egui overlay: the point label, the status HUD and the optional debug panel.

use crate::camera::Viewport;
use winit::{event::WindowEvent, window::Window};

/// Tessellated UI for one frame.
pub struct OverlayFrame {
    shapes: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

pub struct Overlay {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl Overlay {
    pub fn new(window: &Window, device: &wgpu::Device, out_fmt: wgpu::TextureFormat) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(ctx.clone(), ctx.viewport_id(), window, None, None);
        let renderer = egui_wgpu::Renderer::new(device, out_fmt, None, 1);
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Feeds a window event to egui. `true` when a widget consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Runs `build` for this frame and tessellates the result.
    pub fn frame(
        &mut self,
        window: &Window,
        viewport: Viewport,
        build: impl FnOnce(&egui::Context),
    ) -> OverlayFrame {
        let input = self.state.take_egui_input(window);
        self.ctx.begin_frame(input);
        build(&self.ctx);
        let output = self.ctx.end_frame();
        self.state
            .handle_platform_output(window, output.platform_output);

        let pixels_per_point = self.ctx.pixels_per_point();
        OverlayFrame {
            shapes: self.ctx.tessellate(output.shapes, pixels_per_point),
            textures_delta: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [viewport.width, viewport.height],
                pixels_per_point,
            },
        }
    }

    /// Draws `frame` on top of `dst`, keeping what is already there.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        frame: &OverlayFrame,
    ) {
        for (id, delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        self.renderer
            .update_buffers(device, queue, encoder, &frame.shapes, &frame.screen);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: dst,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .render(&mut render_pass, &frame.shapes, &frame.screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}
