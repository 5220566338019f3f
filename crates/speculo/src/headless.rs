//! Headless rendering into an offscreen target.
//!
//! Drives the same frame sequence as the windowed app, but into a readable
//! color texture. Used by the integration tests and the capture demo.

use glam::Vec3;
use pollster::FutureExt;

use speculo_core::LightManager;
use speculo_render::engine::RenderEngine;
use speculo_render::error::RenderResult;
use speculo_render::screenshot::{self, ScreenshotError};
use speculo_render::skybox::Skybox;
use speculo_scene::{MirrorManager, Model};

use crate::frame;

/// A windowless renderer with a readable color target.
pub struct HeadlessRenderer {
    engine: RenderEngine,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
}

impl HeadlessRenderer {
    /// Creates a headless engine and its offscreen color target.
    ///
    /// Fails when no GPU adapter is available (fatal initialization error,
    /// as for the windowed engine).
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let engine = RenderEngine::new_headless(width, height).block_on()?;

        let color_texture = engine.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("headless color target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: engine.surface_config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color_texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            engine,
            color_texture,
            color_view,
        })
    }

    /// The underlying engine.
    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    /// Mutable access to the underlying engine (camera edits).
    pub fn engine_mut(&mut self) -> &mut RenderEngine {
        &mut self.engine
    }

    /// Renders one frame into the offscreen target.
    pub fn render_frame(
        &mut self,
        background: Vec3,
        scene_models: &[Model],
        mirrors: &mut MirrorManager,
        skybox: Option<&Skybox>,
        lights: &LightManager,
    ) {
        let mut encoder = self
            .engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("headless frame encoder"),
            });

        frame::encode_frame(
            &self.engine,
            &mut encoder,
            &self.color_view,
            background,
            scene_models,
            mirrors,
            skybox,
            lights,
        );

        self.engine.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Reads back the offscreen target as tightly packed RGBA8 pixels.
    pub fn read_pixels(&self) -> Result<Vec<u8>, ScreenshotError> {
        screenshot::read_texture(
            &self.engine.device,
            &self.engine.queue,
            &self.color_texture,
            self.engine.width,
            self.engine.height,
            4,
        )
    }

    /// Renders one frame and returns its pixels.
    #[allow(clippy::too_many_arguments)]
    pub fn render_to_image(
        &mut self,
        background: Vec3,
        scene_models: &[Model],
        mirrors: &mut MirrorManager,
        skybox: Option<&Skybox>,
        lights: &LightManager,
    ) -> Result<Vec<u8>, ScreenshotError> {
        self.render_frame(background, scene_models, mirrors, skybox, lights);
        self.read_pixels()
    }
}
