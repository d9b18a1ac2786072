//! Offscreen scene targets. Bloom reads the color target; the swapchain only sees the composite.

use crate::camera::Viewport;

pub const COLOR_FMT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const DEPTH_FMT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct Targets {
    _color_tex: wgpu::Texture,
    _depth_tex: wgpu::Texture,

    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
    viewport: Viewport,
}

impl Targets {
    pub fn new(device: &wgpu::Device, viewport: Viewport) -> Self {
        let size = wgpu::Extent3d {
            width: viewport.width.max(1),
            height: viewport.height.max(1),
            depth_or_array_layers: 1,
        };

        let create_tex = |label: &str, format, usage| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            })
        };

        let color_tex = create_tex(
            "Scene Color Target",
            COLOR_FMT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let depth_tex = create_tex(
            "Scene Depth Target",
            DEPTH_FMT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );

        Self {
            color: color_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            depth: depth_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            _color_tex: color_tex,
            _depth_tex: depth_tex,
            viewport,
        }
    }

    /// Recreates the textures unless the size is unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        if viewport == self.viewport || viewport.is_empty() {
            return;
        }
        *self = Self::new(device, viewport);
    }
}
