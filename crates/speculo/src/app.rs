//! Application window and event loop management.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use speculo_core::{LightManager, Options, SpeculoError};
use speculo_render::camera::CameraMovement;
use speculo_render::engine::RenderEngine;
use speculo_render::screen_quad::ScreenQuad;
use speculo_render::skybox::Skybox;
use speculo_scene::{MirrorManager, Model};

use crate::frame;

/// Everything the app renders each frame.
pub struct Scene {
    /// Non-mirror geometry, drawn in the primary pass and reflected by the
    /// mirror subsystem.
    pub models: Vec<Model>,
    /// The mirror subsystem.
    pub mirrors: MirrorManager,
    /// Optional environment; doubles as the mirrors' reflection fallback.
    pub skybox: Option<Skybox>,
    /// Scene lights.
    pub lights: LightManager,
}

type SetupFn = Box<dyn FnOnce(&mut RenderEngine) -> Scene>;

/// The windowed application: window, engine, scene, and input handling.
///
/// The scene is built by a user callback once the GPU engine exists.
/// Controls: WASD + QE to fly, left-drag to look, scroll to zoom, M to
/// toggle the reflection-target debug overlay, Escape to quit.
pub struct App {
    options: Options,
    setup: Option<SetupFn>,
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    scene: Option<Scene>,
    debug_quad: Option<ScreenQuad>,
    show_debug: bool,
    close_requested: bool,
    needs_reconfigure: bool,
    keys_down: HashSet<KeyCode>,
    mouse_pos: (f64, f64),
    left_mouse_down: bool,
    last_frame_time: Option<Instant>,
}

impl App {
    /// Creates an app that will build its scene with `setup` once the
    /// engine is up.
    pub fn new(options: Options, setup: impl FnOnce(&mut RenderEngine) -> Scene + 'static) -> Self {
        Self {
            options,
            setup: Some(Box::new(setup)),
            window: None,
            engine: None,
            scene: None,
            debug_quad: None,
            show_debug: false,
            close_requested: false,
            needs_reconfigure: false,
            keys_down: HashSet::new(),
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            last_frame_time: None,
        }
    }

    /// Runs the event loop until the window closes.
    pub fn run(mut self) -> speculo_core::Result<()> {
        let event_loop =
            EventLoop::new().map_err(|e| SpeculoError::Render(format!("event loop: {e}")))?;
        event_loop
            .run_app(&mut self)
            .map_err(|e| SpeculoError::Render(format!("event loop: {e}")))
    }

    fn process_movement(&mut self, dt: f32) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        for key in &self.keys_down {
            let movement = match key {
                KeyCode::KeyW => CameraMovement::Forward,
                KeyCode::KeyS => CameraMovement::Backward,
                KeyCode::KeyA => CameraMovement::Left,
                KeyCode::KeyD => CameraMovement::Right,
                KeyCode::KeyQ => CameraMovement::Up,
                KeyCode::KeyE => CameraMovement::Down,
                _ => continue,
            };
            engine.camera.process_keyboard(movement, dt);
        }
    }

    fn render(&mut self) {
        let now = Instant::now();
        let dt = self
            .last_frame_time
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame_time = Some(now);
        self.process_movement(dt);

        if self.needs_reconfigure {
            self.needs_reconfigure = false;
            if let Some(engine) = &mut self.engine {
                let (width, height) = (engine.width, engine.height);
                engine.resize(width, height);
            }
        }

        let Some(engine) = &self.engine else {
            return;
        };
        let Some(scene) = &mut self.scene else {
            return;
        };
        let Some(surface) = &engine.surface else {
            return;
        };

        let frame_texture = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost/outdated, reconfiguring");
                self.needs_reconfigure = true;
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory, exiting");
                self.close_requested = true;
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };

        let view = frame_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = engine
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        frame::encode_frame(
            engine,
            &mut encoder,
            &view,
            self.options.background_color,
            &scene.models,
            &mut scene.mirrors,
            scene.skybox.as_ref(),
            &scene.lights,
        );

        // Debug overlay: present the reflection target full-screen.
        if self.show_debug {
            if let Some(quad) = &self.debug_quad {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("debug overlay pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                });
                quad.draw(&mut pass);
            }
        }

        engine.queue.submit(std::iter::once(encoder.finish()));
        frame_texture.present();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(LogicalSize::new(
                self.options.window_width,
                self.options.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("failed to create window"),
        );

        // Engine creation failures are fatal initialization errors.
        let mut engine = RenderEngine::new_windowed(window.clone(), self.options.vsync)
            .block_on()
            .expect("failed to create render engine");

        let mut scene = self
            .setup
            .take()
            .expect("scene setup ran twice")(&mut engine);
        if let Some(skybox) = &scene.skybox {
            scene.mirrors.set_environment(&engine, skybox);
        }

        let mut debug_quad = ScreenQuad::new(&engine.device, engine.surface_config.format);
        debug_quad.set_texture(&engine.device, scene.mirrors.reflect_view());

        self.window = Some(window);
        self.engine = Some(engine);
        self.scene = Some(scene);
        self.debug_quad = Some(debug_quad);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                match event.state {
                    ElementState::Pressed => {
                        match code {
                            KeyCode::Escape => self.close_requested = true,
                            KeyCode::KeyM => self.show_debug = !self.show_debug,
                            _ => {}
                        }
                        self.keys_down.insert(code);
                    }
                    ElementState::Released => {
                        self.keys_down.remove(&code);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.left_mouse_down = state == ElementState::Pressed;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let delta_x = position.x - self.mouse_pos.0;
                let delta_y = position.y - self.mouse_pos.1;
                self.mouse_pos = (position.x, position.y);

                if self.left_mouse_down {
                    if let Some(engine) = &mut self.engine {
                        // Screen y grows downward; pitch grows upward.
                        engine
                            .camera
                            .process_mouse(delta_x as f32, -delta_y as f32);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 * 0.05,
                };
                if let Some(engine) = &mut self.engine {
                    engine.camera.process_scroll(dy);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if self.close_requested {
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
