// GPU-accelerated overlay rendering using wgpu with raw Wayland surface
// This renderer integrates with layer-shell surfaces without winit

use crate::image_loader::ImageData;
use crate::overlay::OverlayState;
use crate::render::{scaled_size, DownscaleCache};
use anyhow::{Context, Result};
use image::RgbaImage;
use log::{debug, info, warn};
use raw_window_handle::{
    RawDisplayHandle, RawWindowHandle, WaylandDisplayHandle, WaylandWindowHandle,
};
use std::ptr::NonNull;
use wgpu::util::DeviceExt;

pub struct WgpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    texture: Option<wgpu::Texture>,
    texture_bind_group: Option<wgpu::BindGroup>,
    // Resampled copy backing the texture while zoomed out
    downscaled: DownscaleCache,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: Uniforms,
    width: u32,
    height: u32,
    max_texture_size: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    tex_coords: [f32; 2],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

// Unit quad; the vertex shader maps it onto the placement rectangle
const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 1.0, 0.0],
        tex_coords: [0.0, 1.0],
    }, // Bottom-left
    Vertex {
        position: [1.0, 1.0, 0.0],
        tex_coords: [1.0, 1.0],
    }, // Bottom-right
    Vertex {
        position: [1.0, 0.0, 0.0],
        tex_coords: [1.0, 0.0],
    }, // Top-right
    Vertex {
        position: [0.0, 0.0, 0.0],
        tex_coords: [0.0, 0.0],
    }, // Top-left
];

const INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    /// Placement in clip space: left, top, right, bottom
    rect: [f32; 4],
    opacity: f32,
    _padding: [f32; 3],
}

/// Texture dimensions for drawing an image of `image` pixels at `scale`.
///
/// Zoomed out, the texture holds the image already resampled to its on-screen
/// size so the quad maps texels 1:1; otherwise it holds the full image. Either
/// way it is shrunk to fit `limit` on both axes.
pub fn texture_size_for(image: (u32, u32), scale: f64, limit: u32) -> (u32, u32) {
    let scaled = scaled_size(image.0, image.1, scale);
    let wanted = if scaled.0 < image.0 && scaled.0 > 0 && scaled.1 > 0 {
        scaled
    } else {
        image
    };
    if wanted.0 <= limit && wanted.1 <= limit {
        return wanted;
    }
    let ratio =
        (f64::from(limit) / f64::from(wanted.0)).min(f64::from(limit) / f64::from(wanted.1));
    (
        ((f64::from(wanted.0) * ratio) as u32).clamp(1, limit),
        ((f64::from(wanted.1) * ratio) as u32).clamp(1, limit),
    )
}

/// Clip-space rectangle covered by an image of `size` placed at `offset`
/// on a surface of `surface` pixels
pub fn placement_rect(offset: (i32, i32), size: (u32, u32), surface: (u32, u32)) -> [f32; 4] {
    let (sw, sh) = (f64::from(surface.0.max(1)), f64::from(surface.1.max(1)));
    let left = f64::from(offset.0);
    let top = f64::from(offset.1);
    let right = left + f64::from(size.0);
    let bottom = top + f64::from(size.1);
    [
        (left / sw * 2.0 - 1.0) as f32,
        (1.0 - top / sh * 2.0) as f32,
        (right / sw * 2.0 - 1.0) as f32,
        (1.0 - bottom / sh * 2.0) as f32,
    ]
}

impl WgpuRenderer {
    /// Create a new WgpuRenderer from raw Wayland display and surface pointers
    ///
    /// # Safety
    /// - `display_ptr` must be a valid pointer to a wl_display
    /// - `surface_ptr` must be a valid pointer to a wl_surface
    /// - The display and surface must remain valid for the lifetime of the renderer
    pub fn new(
        display_ptr: *mut std::ffi::c_void,
        surface_ptr: *mut std::ffi::c_void,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        info!("Initializing wgpu renderer with size {}x{}", width, height);

        let display_non_null = NonNull::new(display_ptr).context("Display pointer is null")?;
        let surface_non_null = NonNull::new(surface_ptr).context("Surface pointer is null")?;

        let raw_display_handle =
            RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display_non_null));
        let raw_window_handle =
            RawWindowHandle::Wayland(WaylandWindowHandle::new(surface_non_null));

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::VULKAN | wgpu::Backends::GL,
            ..Default::default()
        });

        // Create surface from raw handles
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle,
                raw_window_handle,
            })?
        };

        pollster::block_on(Self::init_async(surface, instance, width, height))
    }

    async fn init_async(
        surface: wgpu::Surface<'static>,
        instance: wgpu::Instance,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find an appropriate adapter")?;

        info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("Failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        debug!("Surface capabilities: {:?}", surface_caps);

        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface reports no formats")?;

        // The overlay must composite over other windows, so an alpha-aware mode is required
        let alpha_mode = if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else if surface_caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PostMultiplied)
        {
            wgpu::CompositeAlphaMode::PostMultiplied
        } else {
            anyhow::bail!(
                "Surface supports no transparent alpha mode: {:?}",
                surface_caps.alpha_modes
            );
        };
        info!("Using alpha mode: {:?}", alpha_mode);

        // Surfaces and textures share the device's 2D size limit
        let max_texture_size = device.limits().max_texture_dimension_2d;
        info!("Max texture size: {}", max_texture_size);

        let safe_width = width.clamp(1, max_texture_size);
        let safe_height = height.clamp(1, max_texture_size);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: safe_width,
            height: safe_height,
            present_mode: wgpu::PresentMode::Fifo, // VSync, stable
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        // Shader
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        // Texture bind group layout
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("texture_bind_group_layout"),
            });

        // Uniforms are read by both stages: placement in the vertex stage, opacity in the fragment stage
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniforms = Uniforms {
            rect: placement_rect((0, 0), (0, 0), (safe_width, safe_height)),
            opacity: 1.0,
            _padding: [0.0; 3],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&texture_bind_group_layout, &uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            texture: None,
            texture_bind_group: None,
            downscaled: DownscaleCache::default(),
            vertex_buffer,
            index_buffer,
            uniform_buffer,
            uniform_bind_group,
            uniforms,
            width: safe_width,
            height: safe_height,
            max_texture_size,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            let safe_width = new_width.min(self.max_texture_size);
            let safe_height = new_height.min(self.max_texture_size);

            if safe_width != self.width || safe_height != self.height {
                self.width = safe_width;
                self.height = safe_height;
                self.config.width = safe_width;
                self.config.height = safe_height;

                // Reconfigure surface with new size
                self.surface.configure(&self.device, &self.config);
                debug!("Resized to {}x{}", safe_width, safe_height);
            }
        }
    }

    fn texture_size(&self) -> Option<(u32, u32)> {
        self.texture
            .as_ref()
            .map(|texture| (texture.width(), texture.height()))
    }

    /// Push offset, scale and opacity from the overlay state to the GPU,
    /// re-uploading `image` when the scale calls for a different texture size
    pub fn update_state(&mut self, state: &OverlayState, image: &ImageData) {
        let size = scaled_size(image.width, image.height, state.scale_factor());
        if size.0 > 0 && size.1 > 0 {
            let wanted = texture_size_for(
                (image.width, image.height),
                state.scale_factor(),
                self.max_texture_size,
            );
            if self.texture_size() != Some(wanted) {
                self.upload_texture(image, wanted);
            }
        }

        let offset = state.offset();
        let uniforms = Uniforms {
            rect: placement_rect((offset.x, offset.y), size, (self.width, self.height)),
            opacity: state.opacity().clamp(0.0, 1.0) as f32,
            _padding: [0.0; 3],
        };
        if uniforms != self.uniforms {
            self.uniforms = uniforms;
            self.queue
                .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
        }
    }

    /// Replace the texture with `image` resampled to `size`
    fn upload_texture(&mut self, image: &ImageData, size: (u32, u32)) {
        let pixels: &RgbaImage = if size == (image.width, image.height) {
            &image.pixels
        } else {
            self.downscaled.resized(&image.pixels, size.0, size.1)
        };
        let (tex_width, tex_height) = size;

        debug!("Uploading texture: {}x{}", tex_width, tex_height);

        let texture_size = wgpu::Extent3d {
            width: tex_width,
            height: tex_height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            size: texture_size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            label: Some("overlay_texture"),
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.as_raw(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * tex_width),
                rows_per_image: Some(tex_height),
            },
            texture_size,
        );

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        // Zoomed out the texture is already screen-sized, so a single level suffices
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.render_pipeline.get_bind_group_layout(0),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("texture_bind_group"),
        });

        self.texture = Some(texture);
        self.texture_bind_group = Some(texture_bind_group);
    }

    /// Render a frame and return whether successful
    pub fn render(&mut self) -> Result<bool> {
        let Some(texture_bind_group) = self.texture_bind_group.as_ref() else {
            return Ok(false); // No texture uploaded yet
        };

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Outdated) | Err(wgpu::SurfaceError::Lost) => {
                debug!("Surface outdated or lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(false);
            }
            Err(e) => {
                warn!("Surface error: {:?}", e);
                return Err(e.into());
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, texture_bind_group, &[]);
            render_pass.set_bind_group(1, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..INDICES.len() as u32, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_covers_whole_surface_at_origin() {
        assert_eq!(
            placement_rect((0, 0), (800, 600), (800, 600)),
            [-1.0, 1.0, 1.0, -1.0]
        );
    }

    #[test]
    fn placement_follows_offset_and_size() {
        let rect = placement_rect((200, 150), (200, 150), (800, 600));
        assert_eq!(rect, [-0.5, 0.5, 0.0, 0.0]);

        let offscreen = placement_rect((-800, 0), (400, 600), (800, 600));
        assert_eq!(offscreen, [-3.0, 1.0, -2.0, -1.0]);
    }

    #[test]
    fn zoomed_out_texture_matches_on_screen_size() {
        assert_eq!(texture_size_for((4000, 3000), 0.25, 8192), (1000, 750));
        assert_eq!(texture_size_for((4000, 3000), 0.9, 8192), (3600, 2700));
    }

    #[test]
    fn full_image_is_uploaded_at_or_above_native_size() {
        assert_eq!(texture_size_for((4000, 3000), 1.0, 8192), (4000, 3000));
        assert_eq!(texture_size_for((4000, 3000), 3.0, 8192), (4000, 3000));
        // Vanishing scales keep the last usable texture size
        assert_eq!(texture_size_for((4000, 3000), 1e-6, 8192), (4000, 3000));
    }

    #[test]
    fn textures_fit_the_device_limit() {
        assert_eq!(texture_size_for((16384, 8192), 1.0, 8192), (8192, 4096));
        assert_eq!(texture_size_for((20000, 100), 0.5, 8192), (8192, 40));
    }

    #[test]
    fn uniforms_match_shader_layout() {
        assert_eq!(std::mem::size_of::<Uniforms>(), 32);
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
    }
}
