//! Environment cubemap loading and background rendering.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbaImage;

use crate::engine::DEPTH_FORMAT;
use crate::error::{RenderError, RenderResult};
use crate::mipmap::mip_level_count;

/// Face order of the cubemap: +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_COUNT: usize = 6;

/// An environment cubemap.
///
/// `draw` renders it as the scene background with a less-or-equal depth
/// test, so it passes against a cleared depth buffer and never occludes
/// geometry. The cubemap view/sampler pair doubles as the reflection
/// fallback attached to the mirror composite.
pub struct Skybox {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl Skybox {
    /// Loads a cubemap from six face images in +X,-X,+Y,-Y,+Z,-Z order.
    ///
    /// All faces must be square and equally sized. A full mip chain is built
    /// on the CPU by successive halving so the environment also filters
    /// smoothly at glancing angles.
    pub fn from_faces<P: AsRef<Path>>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        faces: &[P; FACE_COUNT],
    ) -> RenderResult<Self> {
        let mut images = Vec::with_capacity(FACE_COUNT);
        for path in faces {
            let image = image::open(path.as_ref())?.to_rgba8();
            images.push(image);
        }

        let size = images[0].width();
        if images
            .iter()
            .any(|img| img.width() != size || img.height() != size)
        {
            return Err(RenderError::TextureCreationFailed(
                "cubemap faces must be square and equally sized".to_string(),
            ));
        }

        Ok(Self::from_images(
            device,
            queue,
            camera_layout,
            surface_format,
            &images,
        ))
    }

    /// Creates a 1x1 single-color cubemap; used by tests and as a neutral
    /// environment.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        rgba: [u8; 4],
    ) -> Self {
        let face = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        let images = [face.clone(), face.clone(), face.clone(), face.clone(), face.clone(), face];
        Self::from_images(device, queue, camera_layout, surface_format, &images)
    }

    fn from_images(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        camera_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        images: &[RgbaImage],
    ) -> Self {
        let size = images[0].width();
        let mip_levels = mip_level_count(size, size);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("skybox cubemap"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: FACE_COUNT as u32,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (face, image) in images.iter().enumerate() {
            let mut level_image = image.clone();
            for level in 0..mip_levels {
                let level_size = (size >> level).max(1);
                if level_image.width() != level_size {
                    level_image =
                        image::imageops::resize(&level_image, level_size, level_size, FilterType::Triangle);
                }
                write_cubemap_level(queue, &texture, face as u32, level, level_size, &level_image);
            }
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("skybox cubemap view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
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
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skybox.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox pipeline layout"),
            bind_group_layouts: &[camera_layout, &bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                // The background sits at maximum depth; less-or-equal lets
                // it pass against a cleared depth buffer.
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            texture,
            view,
            sampler,
            pipeline,
            bind_group,
        }
    }

    /// Draws the skybox as a full-screen background. The caller's pass must
    /// target the surface format this skybox was built for.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.draw(0..3, 0..1); // Fullscreen triangle
    }

    /// The cubemap view, attachable as the mirror composite's environment.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// The cubemap sampler.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// The underlying texture.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

/// Writes one face's mip level into a cubemap texture.
fn write_cubemap_level(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    face: u32,
    level: u32,
    level_size: u32,
    image: &RgbaImage,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: level,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: face,
            },
            aspect: wgpu::TextureAspect::All,
        },
        image.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * level_size),
            rows_per_image: Some(level_size),
        },
        wgpu::Extent3d {
            width: level_size,
            height: level_size,
            depth_or_array_layers: 1,
        },
    );
}

/// Creates a bare 1x1 single-color cubemap texture without a pipeline; the
/// mirror composite uses this as its default environment.
pub fn create_solid_cubemap(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    rgba: [u8; 4],
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("solid cubemap"),
        size: wgpu::Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: FACE_COUNT as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let face = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
    for face_index in 0..FACE_COUNT as u32 {
        write_cubemap_level(queue, &texture, face_index, 0, 1, &face);
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("solid cubemap view"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });

    (texture, view)
}
