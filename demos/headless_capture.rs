//! Renders one mirrored frame without a window and writes it to a PNG.

use speculo::{
    save_image, HeadlessRenderer, LightManager, MirrorManager, MirrorMaterial, MirrorPlane, Model,
    Options, Skybox, Vec3,
};

fn main() {
    speculo::init_logging();

    let options = Options::default();
    let mut renderer = match HeadlessRenderer::new(options.window_width, options.window_height) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("no GPU available for headless capture: {e}");
            return;
        }
    };

    let engine = renderer.engine_mut();
    engine.camera.position = Vec3::new(0.0, 0.0, 2.0);

    let mut subject = Model::cube(engine, "subject", 0.8);
    subject.position = Vec3::new(0.8, -0.2, 0.0);
    subject.rotate_axis_angle(Vec3::Y, 35.0);

    let mut mirrors = MirrorManager::new(engine, options.mirror);
    let mut surface = Model::plane(engine, "mirror", 2.0);
    surface.position = Vec3::new(0.0, 0.0, -2.0);
    let plane = MirrorPlane::from_model(surface, MirrorMaterial::default())
        .expect("procedural plane has geometry");
    mirrors.add_plane(plane).expect("one plane fits the capacity");

    let skybox = Skybox::solid(
        &engine.device,
        &engine.queue,
        engine.camera_bind_group_layout(),
        engine.surface_config.format,
        [96, 132, 180, 255],
    );
    mirrors.set_environment(renderer.engine(), &skybox);

    let mut lights = LightManager::new();
    lights.add_point_light(Vec3::new(2.0, 1.5, 2.0), Vec3::ONE, 2.5);

    let models = vec![subject];
    let pixels = renderer
        .render_to_image(
            Vec3::splat(0.35),
            &models,
            &mut mirrors,
            Some(&skybox),
            &lights,
        )
        .expect("readback failed");

    let (width, height) = renderer.engine().dimensions();
    save_image("mirror_capture.png", &pixels, width, height).expect("failed to write PNG");
    log::info!("wrote mirror_capture.png");
}
