//! Bloom post stack: bright pass, separable blur, composite onto the swapchain.

use crate::camera::Viewport;
use wgpu::util::DeviceExt;

const INTERMEDIATE_FMT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Soft knee above the threshold.
const THRESHOLD_SMOOTHING: f32 = 0.025;

const FS_TRI: [[f32; 2]; 3] = [[-1.0, -1.0], [3.0, -1.0], [-1.0, 3.0]];

const BLIT_WGSL: &str = r#"
struct VSOut {
    @builtin(position) clip: vec4<f32>,
    @location(0)         uv: vec2<f32>,
}

@vertex
fn vs_main(@location(0) pos: vec2<f32>) -> VSOut {
    var out: VSOut;
    out.clip = vec4<f32>(pos, 0.0, 1.0);
    out.uv = vec2<f32>(0.5 * (pos.x + 1.0), 0.5 * (-pos.y + 1.0));
    return out;
}

@group(0) @binding(0) var tSrc: texture_2d<f32>;
@group(0) @binding(1) var samp: sampler;

@fragment
fn fs_main(in: VSOut) -> @location(0) vec4<f32> {
    return textureSampleLevel(tSrc, samp, in.uv, 0.0);
}
"#;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomParams {
    pub enabled: bool,
    pub intensity: f32,
    /// Luminance in `[0, 1]`.
    pub threshold: f32,
    pub radius_px: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 2.0,
            threshold: 0.25,
            radius_px: 4.0,
        }
    }
}

/// Two full-resolution intermediates for the bright and blur passes.
struct PingPong {
    ping: wgpu::TextureView,
    pong: wgpu::TextureView,
    viewport: Viewport,
    _tex_ping: wgpu::Texture,
    _tex_pong: wgpu::Texture,
}

impl PingPong {
    fn new(device: &wgpu::Device, viewport: Viewport) -> Self {
        let make_tex = |label| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: viewport.width.max(1),
                    height: viewport.height.max(1),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: INTERMEDIATE_FMT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        };

        let tex_ping = make_tex("Bloom Ping");
        let tex_pong = make_tex("Bloom Pong");
        Self {
            ping: tex_ping.create_view(&wgpu::TextureViewDescriptor::default()),
            pong: tex_pong.create_view(&wgpu::TextureViewDescriptor::default()),
            viewport,
            _tex_ping: tex_ping,
            _tex_pong: tex_pong,
        }
    }

    fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        if self.viewport == viewport || viewport.is_empty() {
            return;
        }
        *self = Self::new(device, viewport);
    }
}

// -------------------- Uniform Buffers --------------------

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboBright {
    threshold: f32,
    smoothing: f32,
    _pad: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboBlur {
    inv_size: [f32; 2],
    direction: [f32; 2],
    radius_px: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboComposite {
    intensity: f32,
    _pad: [f32; 3],
}

// -------------------- Pass Types --------------------

struct BrightPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

/// One instance per axis; each owns its UBO so both writes survive until submit.
struct BlurPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

struct BlitPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    fs_vbo: wgpu::Buffer,
}

pub struct BloomStack {
    pingpong: PingPong,
    bright: BrightPass,
    blur_h: BlurPass,
    blur_v: BlurPass,
    composite: CompositePass,
    blit: BlitPass,
    pub params: BloomParams,
}

impl BloomStack {
    pub fn new(
        device: &wgpu::Device,
        out_fmt: wgpu::TextureFormat,
        viewport: Viewport,
        params: BloomParams,
    ) -> Self {
        Self {
            pingpong: PingPong::new(device, viewport),
            bright: BrightPass::new(device, INTERMEDIATE_FMT),
            blur_h: BlurPass::new(device, INTERMEDIATE_FMT),
            blur_v: BlurPass::new(device, INTERMEDIATE_FMT),
            composite: CompositePass::new(device, out_fmt),
            blit: BlitPass::new(device, out_fmt),
            params,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, viewport: Viewport) {
        self.pingpong.resize(device, viewport);
    }

    /// Bright → blur H → blur V → composite, or a plain blit when disabled.
    pub fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        swapchain_dst: &wgpu::TextureView,
        scene_color: &wgpu::TextureView,
    ) {
        if !self.params.enabled {
            self.blit.draw(device, encoder, swapchain_dst, scene_color);
            return;
        }

        let size = self.pingpong.viewport.size();
        let inv_size = [1.0 / size.x, 1.0 / size.y];
        let (ping, pong) = (&self.pingpong.ping, &self.pingpong.pong);

        self.bright.draw(device, queue, encoder, ping, scene_color, self.params.threshold);
        self.blur_h
            .draw(device, queue, encoder, pong, ping, inv_size, [1.0, 0.0], self.params.radius_px);
        self.blur_v
            .draw(device, queue, encoder, ping, pong, inv_size, [0.0, 1.0], self.params.radius_px);
        self.composite
            .draw(device, queue, encoder, swapchain_dst, scene_color, ping, self.params.intensity);
    }
}

// -------------------- Pass Implementations --------------------

macro_rules! create_post_pass {
    ($name:ident, $ubo_type:ty, $shader:expr) => {
        impl $name {
            fn new(device: &wgpu::Device, out_fmt: wgpu::TextureFormat) -> Self {
                let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
                    binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                };

                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(concat!(stringify!($name), " Layout")),
                    entries: &[
                        texture_entry(0),
                        texture_entry(1),
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 3,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: wgpu::BufferSize::new(
                                    std::mem::size_of::<$ubo_type>() as u64,
                                ),
                            },
                            count: None,
                        },
                    ],
                });

                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some($shader),
                    source: wgpu::ShaderSource::Wgsl(
                        include_str!(concat!("../../../shaders/", $shader)).into(),
                    ),
                });

                let pipe_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(concat!(stringify!($name), " PipelineLayout")),
                    bind_group_layouts: &[&layout],
                    push_constant_ranges: &[],
                });

                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(concat!(stringify!($name), " Pipeline")),
                    layout: Some(&pipe_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: "vs_main",
                        buffers: &[fs_tri_layout()],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: "fs_main",
                        targets: &[Some(wgpu::ColorTargetState {
                            format: out_fmt,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                });

                let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some(concat!(stringify!($name), " Sampler")),
                    address_mode_u: wgpu::AddressMode::ClampToEdge,
                    address_mode_v: wgpu::AddressMode::ClampToEdge,
                    mag_filter: wgpu::FilterMode::Nearest,
                    min_filter: wgpu::FilterMode::Nearest,
                    ..Default::default()
                });

                let ubo = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(concat!(stringify!($name), " UBO")),
                    size: std::mem::size_of::<$ubo_type>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                Self {
                    pipeline,
                    layout,
                    sampler,
                    ubo,
                    fs_vbo: fs_tri_buffer(device, stringify!($name)),
                }
            }

            fn bind(
                &self,
                device: &wgpu::Device,
                tex0: &wgpu::TextureView,
                tex1: &wgpu::TextureView,
            ) -> wgpu::BindGroup {
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(concat!(stringify!($name), " Bind")),
                    layout: &self.layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(tex0),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(tex1),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 3,
                            resource: self.ubo.as_entire_binding(),
                        },
                    ],
                })
            }
        }
    };
}

create_post_pass!(BrightPass, UboBright, "bloom_bright.wgsl");
create_post_pass!(BlurPass, UboBlur, "bloom_blur.wgsl");
create_post_pass!(CompositePass, UboComposite, "bloom_composite.wgsl");

fn fs_tri_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
        shader_location: 0,
        offset: 0,
        format: wgpu::VertexFormat::Float32x2,
    }];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRS,
    }
}

fn fs_tri_buffer(device: &wgpu::Device, name: &str) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{name} FS VBO")),
        contents: bytemuck::cast_slice(&FS_TRI),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

fn execute_pass(
    pipeline: &wgpu::RenderPipeline,
    encoder: &mut wgpu::CommandEncoder,
    bind_group: &wgpu::BindGroup,
    fs_vbo: &wgpu::Buffer,
    dst: &wgpu::TextureView,
    label: &str,
) {
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: dst,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    rpass.set_pipeline(pipeline);
    rpass.set_bind_group(0, bind_group, &[]);
    rpass.set_vertex_buffer(0, fs_vbo.slice(..));
    rpass.draw(0..3, 0..1);
}

impl BrightPass {
    fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        src: &wgpu::TextureView,
        threshold: f32,
    ) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&UboBright {
                threshold,
                smoothing: THRESHOLD_SMOOTHING,
                _pad: [0.0; 2],
            }),
        );
        let bind = self.bind(device, src, src);
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Bloom Bright Pass");
    }
}

impl BlurPass {
    #[allow(clippy::too_many_arguments)]
    fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        src: &wgpu::TextureView,
        inv_size: [f32; 2],
        direction: [f32; 2],
        radius_px: f32,
    ) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&UboBlur {
                inv_size,
                direction,
                radius_px,
                _pad: [0.0; 3],
            }),
        );
        let bind = self.bind(device, src, src);
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Bloom Blur Pass");
    }
}

impl CompositePass {
    #[allow(clippy::too_many_arguments)]
    fn draw(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        scene: &wgpu::TextureView,
        bloom: &wgpu::TextureView,
        intensity: f32,
    ) {
        queue.write_buffer(
            &self.ubo,
            0,
            bytemuck::bytes_of(&UboComposite {
                intensity,
                _pad: [0.0; 3],
            }),
        );
        let bind = self.bind(device, scene, bloom);
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Bloom Composite Pass");
    }
}

impl BlitPass {
    fn new(device: &wgpu::Device, out_fmt: wgpu::TextureFormat) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("BlitPass Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                    count: None,
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit.wgsl"),
            source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });

        let pipe_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("BlitPass PipelineLayout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("BlitPass Pipeline"),
            layout: Some(&pipe_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[fs_tri_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: out_fmt,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("BlitPass Sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            pipeline,
            layout,
            sampler,
            fs_vbo: fs_tri_buffer(device, "BlitPass"),
        }
    }

    fn draw(
        &self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        dst: &wgpu::TextureView,
        src: &wgpu::TextureView,
    ) {
        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(src),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        execute_pass(&self.pipeline, encoder, &bind, &self.fs_vbo, dst, "Blit Pass");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_bloom_settings() {
        let p = BloomParams::default();
        assert!(p.enabled);
        assert_eq!(p.intensity, 2.0);
        assert_eq!(p.threshold, 0.25);
    }

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<UboBright>(), 16);
        assert_eq!(std::mem::size_of::<UboBlur>(), 32);
        assert_eq!(std::mem::size_of::<UboComposite>(), 16);
    }
}
