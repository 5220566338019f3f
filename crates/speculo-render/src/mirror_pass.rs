//! GPU resources and pipelines for the two-pass mirror reflection algorithm.
//!
//! Pass 1 (mask) renders every mirror plane into a single-channel uint
//! target, writing `plane index + 1` per covered pixel (0 is the no-plane
//! sentinel, matching the cleared value). Depth testing makes the nearest
//! plane own a pixel. Pass 2 (reflection) renders the scene geometry once,
//! instanced over the active planes: each instance reflects the world about
//! its plane and survives only where the mask attributes the pixel to it.
//! The reflection target then gets a full mip chain so the composite stage
//! can drive blur per plane by sampling at `blur_level`.
//!
//! All textures, buffers, and bind groups are created here, once; the
//! per-frame path only writes buffers and records passes.

use speculo_core::mirror::{MirrorPlaneUniforms, MAX_MIRROR_PLANES, MIRROR_PLANE_BUFFER_BINDING};
use speculo_core::options::MirrorConfig;

use crate::buffer;
use crate::engine::DEPTH_FORMAT;
use crate::lights::LightsBuffer;
use crate::mesh::Vertex;
use crate::mipmap::{mip_level_count, MipChainGenerator};
use crate::skybox;

/// Format of the plane-ID mask target. Uint so IDs are exact; uint targets
/// cannot blend, which is also what the mask pass requires.
pub const MASK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Uint;

/// Format of the reflection color target. Float so mip downsampling
/// interpolates, with alpha carrying reflection coverage.
pub const REFLECT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// GPU representation of the reflection pass parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ReflectParamsUniforms {
    /// Mask target size in pixels.
    pub mask_size: [f32; 2],
    /// Reflection target size in pixels.
    pub reflect_size: [f32; 2],
    /// Number of active planes this frame.
    pub plane_count: u32,
    pub _padding: [u32; 3],
}

/// Off-screen targets, parameter buffers, and pipelines of the mirror
/// subsystem. Lives for the manager's lifetime; nothing here is reallocated
/// per frame.
pub struct MirrorPassResources {
    config: MirrorConfig,

    mask_texture: wgpu::Texture,
    mask_view: wgpu::TextureView,
    mask_depth_view: wgpu::TextureView,

    reflect_texture: wgpu::Texture,
    /// Full-chain view, sampled by the composite with a mip-aware sampler.
    reflect_view: wgpu::TextureView,
    /// One view per mip level, for the downsample chain and debug display.
    reflect_mip_views: Vec<wgpu::TextureView>,
    depth_view: wgpu::TextureView,

    plane_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,

    mask_pipeline: wgpu::RenderPipeline,
    reflect_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,

    reflect_bind_group: wgpu::BindGroup,
    composite_bind_group_layout: wgpu::BindGroupLayout,
    composite_bind_group: wgpu::BindGroup,
    composite_sampler: wgpu::Sampler,
    lights_buffer: wgpu::Buffer,

    mip_generator: MipChainGenerator,
    mip_bind_groups: Vec<wgpu::BindGroup>,

    // Fallback environment, replaced via set_environment.
    _fallback_env_texture: wgpu::Texture,
}

impl MirrorPassResources {
    /// Creates every GPU resource of the mirror subsystem.
    ///
    /// `surface_format` is the format of the main color target the composite
    /// pipeline draws into.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        config: MirrorConfig,
        camera_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        lights: &LightsBuffer,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let mask_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mirror mask"),
            size: wgpu::Extent3d {
                width: config.mask_width,
                height: config.mask_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: MASK_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let mask_view = mask_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mip_levels = mip_level_count(config.reflect_width, config.reflect_height);
        let reflect_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mirror reflection"),
            size: wgpu::Extent3d {
                width: config.reflect_width,
                height: config.reflect_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: REFLECT_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let reflect_view = reflect_texture.create_view(&wgpu::TextureViewDescriptor::default());
        let reflect_mip_views: Vec<_> = (0..mip_levels)
            .map(|level| {
                reflect_texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("mirror reflection mip view"),
                    base_mip_level: level,
                    mip_level_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let (_, depth_view) =
            Self::create_depth(device, config.reflect_width, config.reflect_height);
        // The mask pass shares the reflection depth buffer when resolutions
        // match; a differing mask resolution gets its own allocation.
        let mask_depth_view = if config.shared_depth() {
            depth_view.clone()
        } else {
            Self::create_depth(device, config.mask_width, config.mask_height).1
        };

        let plane_buffer = buffer::create_storage_buffer_zeroed(
            device,
            (MAX_MIRROR_PLANES * std::mem::size_of::<MirrorPlaneUniforms>()) as u64,
            Some("mirror plane records"),
        );

        let params_buffer = buffer::create_uniform_buffer(
            device,
            &ReflectParamsUniforms {
                mask_size: [config.mask_width as f32, config.mask_height as f32],
                reflect_size: [config.reflect_width as f32, config.reflect_height as f32],
                plane_count: 0,
                _padding: [0; 3],
            },
            Some("mirror reflect params"),
        );

        // Reflect-pass bind group (slot 2): mask, params, plane records at
        // the fixed storage binding, and the light block.
        let reflect_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mirror reflect bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Uint,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: MIRROR_PLANE_BUFFER_BINDING,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let reflect_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirror reflect bind group"),
            layout: &reflect_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&mask_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: MIRROR_PLANE_BUFFER_BINDING,
                    resource: plane_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: lights.buffer().as_entire_binding(),
                },
            ],
        });

        // Composite bind group (slot 2 of the composite pipeline): the
        // finished reflection chain, plane records, lights, and the
        // environment cubemap fallback.
        let composite_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mirror composite bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
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
                    wgpu::BindGroupLayoutEntry {
                        binding: MIRROR_PLANE_BUFFER_BINDING,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 5,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let composite_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mirror composite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // A black 1x1 environment until the caller attaches a real skybox.
        let (fallback_env_texture, fallback_env_view) =
            skybox::create_solid_cubemap(device, queue, [0, 0, 0, 255]);

        let composite_bind_group = Self::build_composite_bind_group(
            device,
            &composite_bind_group_layout,
            &reflect_view,
            &composite_sampler,
            &plane_buffer,
            lights.buffer(),
            &fallback_env_view,
            &composite_sampler,
        );

        let mask_pipeline = Self::create_mask_pipeline(device, camera_layout, model_layout);
        let reflect_pipeline = Self::create_reflect_pipeline(
            device,
            camera_layout,
            model_layout,
            &reflect_bind_group_layout,
            material_layout,
        );
        let composite_pipeline = Self::create_composite_pipeline(
            device,
            camera_layout,
            model_layout,
            &composite_bind_group_layout,
            material_layout,
            surface_format,
        );

        let mip_generator = MipChainGenerator::new(device, REFLECT_FORMAT);
        let mip_bind_groups = mip_generator.bind_groups_for(device, &reflect_mip_views);

        Self {
            config,
            mask_texture,
            mask_view,
            mask_depth_view,
            reflect_texture,
            reflect_view,
            reflect_mip_views,
            depth_view,
            plane_buffer,
            params_buffer,
            mask_pipeline,
            reflect_pipeline,
            composite_pipeline,
            reflect_bind_group,
            composite_bind_group_layout,
            composite_bind_group,
            composite_sampler,
            lights_buffer: lights.buffer().clone(),
            mip_generator,
            mip_bind_groups,
            _fallback_env_texture: fallback_env_texture,
        }
    }

    fn create_depth(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mirror depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_composite_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        reflect_view: &wgpu::TextureView,
        reflect_sampler: &wgpu::Sampler,
        plane_buffer: &wgpu::Buffer,
        lights_buffer: &wgpu::Buffer,
        env_view: &wgpu::TextureView,
        env_sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mirror composite bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(reflect_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(reflect_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: MIRROR_PLANE_BUFFER_BINDING,
                    resource: plane_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(env_view),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::Sampler(env_sampler),
                },
            ],
        })
    }

    fn create_mask_pipeline(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirror mask shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mirror_mask.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mirror mask pipeline layout"),
            bind_group_layouts: &[camera_layout, model_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mirror mask pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: MASK_FORMAT,
                    // Uint target: no blending, coverage stays exact.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_reflect_pipeline(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        reflect_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirror reflect shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mirror_reflect.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mirror reflect pipeline layout"),
            bind_group_layouts: &[camera_layout, model_layout, reflect_layout, material_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mirror reflect pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: REFLECT_FORMAT,
                    // Alpha carries reflection coverage for the composite;
                    // write it straight through.
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Reflection flips triangle winding.
                cull_mode: None,
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_composite_pipeline(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        model_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        material_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mirror composite shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mirror_composite.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mirror composite pipeline layout"),
            bind_group_layouts: &[camera_layout, model_layout, composite_layout, material_layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mirror composite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..wgpu::PrimitiveState::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Replaces the environment cubemap sampled by the composite as the
    /// reflection fallback.
    pub fn set_environment(
        &mut self,
        device: &wgpu::Device,
        env_view: &wgpu::TextureView,
        env_sampler: &wgpu::Sampler,
    ) {
        self.composite_bind_group = Self::build_composite_bind_group(
            device,
            &self.composite_bind_group_layout,
            &self.reflect_view,
            &self.composite_sampler,
            &self.plane_buffer,
            &self.lights_buffer,
            env_view,
            env_sampler,
        );
    }

    /// Rewrites the active prefix of the plane-parameter buffer and the
    /// plane count. Always a wholesale write; sparse updates are not
    /// supported.
    pub fn upload_records(&self, queue: &wgpu::Queue, records: &[MirrorPlaneUniforms]) {
        debug_assert!(records.len() <= MAX_MIRROR_PLANES);

        let params = ReflectParamsUniforms {
            mask_size: [self.config.mask_width as f32, self.config.mask_height as f32],
            reflect_size: [
                self.config.reflect_width as f32,
                self.config.reflect_height as f32,
            ],
            plane_count: records.len() as u32,
            _padding: [0; 3],
        };
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&params));

        if !records.is_empty() {
            queue.write_buffer(&self.plane_buffer, 0, bytemuck::cast_slice(records));
        }
    }

    /// Begins the mask pass: mask cleared to the no-plane sentinel, depth
    /// cleared to far.
    pub fn begin_mask_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("mirror mask pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.mask_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.mask_depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Begins the reflection pass: color cleared to transparent (alpha 0 =
    /// no reflection), depth cleared to far.
    pub fn begin_reflection_pass<'a>(
        &'a self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> wgpu::RenderPass<'a> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("mirror reflection pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.reflect_mip_views[0],
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        })
    }

    /// Fills the reflection target's mip chain. Called exactly once per
    /// generation, after all scene draws of the reflection pass.
    pub fn generate_mipmaps(&self, encoder: &mut wgpu::CommandEncoder) {
        self.mip_generator
            .encode(encoder, &self.reflect_mip_views, &self.mip_bind_groups);
    }

    /// The mask-pass pipeline.
    pub fn mask_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.mask_pipeline
    }

    /// The reflection-pass pipeline.
    pub fn reflect_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.reflect_pipeline
    }

    /// The composite pipeline used when drawing the mirror surfaces.
    pub fn composite_pipeline(&self) -> &wgpu::RenderPipeline {
        &self.composite_pipeline
    }

    /// Bind group for slot 2 of the reflection pipeline.
    pub fn reflect_bind_group(&self) -> &wgpu::BindGroup {
        &self.reflect_bind_group
    }

    /// Bind group for slot 2 of the composite pipeline.
    pub fn composite_bind_group(&self) -> &wgpu::BindGroup {
        &self.composite_bind_group
    }

    /// The plane-ID mask view (debug display).
    pub fn mask_view(&self) -> &wgpu::TextureView {
        &self.mask_view
    }

    /// The reflection color view, full mip chain.
    pub fn reflect_view(&self) -> &wgpu::TextureView {
        &self.reflect_view
    }

    /// The target configuration.
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_params_size() {
        assert_eq!(std::mem::size_of::<ReflectParamsUniforms>(), 32);
    }

    #[test]
    fn test_plane_buffer_capacity_bytes() {
        // The storage buffer must hold the full fixed capacity.
        assert_eq!(
            MAX_MIRROR_PLANES * std::mem::size_of::<MirrorPlaneUniforms>(),
            640
        );
    }
}
