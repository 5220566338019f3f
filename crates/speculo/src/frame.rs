//! Per-frame pass orchestration.
//!
//! One frame is: primary scene pass (clear) → mirror reflection generation
//! (off-screen) → composite pass (mirror surfaces, then skybox) into the
//! same color target. The composite pass loads color and depth from the
//! primary pass so mirrors are correctly occluded by scene geometry.

use glam::Vec3;

use speculo_core::LightManager;
use speculo_render::engine::RenderEngine;
use speculo_render::skybox::Skybox;
use speculo_scene::{MirrorManager, Model};

/// Encodes one complete frame into `encoder`, targeting `view`.
///
/// Buffer writes (camera, model matrices, lights, mirror records) are
/// enqueued here as well; they execute before the passes when the encoder
/// is submitted.
#[allow(clippy::too_many_arguments)]
pub fn encode_frame(
    engine: &RenderEngine,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    background: Vec3,
    scene_models: &[Model],
    mirrors: &mut MirrorManager,
    skybox: Option<&Skybox>,
    lights: &LightManager,
) {
    engine.update_camera_uniforms();
    for model in scene_models {
        model.update_uniforms(&engine.queue);
    }

    // Primary pass: scene geometry into a cleared frame.
    {
        let mut pass = engine.begin_main_pass(encoder, view, Some(background));
        pass.set_pipeline(engine.scene_pipeline());
        pass.set_bind_group(0, engine.camera_bind_group(), &[]);
        pass.set_bind_group(2, engine.lights.bind_group(), &[]);
        for model in scene_models {
            model.draw(&mut pass, 0..1);
        }
    }

    // Off-screen mirror generation: mask, records, reflection, mips.
    mirrors.generate_reflection(engine, encoder, lights, scene_models);

    // Composite pass: mirror surfaces on top of the primary frame, then the
    // skybox behind everything still at far depth.
    {
        let mut pass = engine.begin_main_pass(encoder, view, None);
        mirrors.draw(&mut pass, engine.camera_bind_group());
        if let Some(skybox) = skybox {
            skybox.draw(&mut pass, engine.camera_bind_group());
        }
    }
}
