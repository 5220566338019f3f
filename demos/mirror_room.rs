//! A row of four mirrors with increasing blur and tint, reflecting a
//! spinning-room style scene.
//!
//! Controls: WASD/QE to fly, left-drag to look, scroll to zoom, M to show
//! the raw reflection target, Escape to quit.

use speculo::{
    App, LightManager, MirrorManager, MirrorMaterial, MirrorPlane, Model, Options, Scene, Skybox,
    Vec3,
};

fn main() -> speculo::Result<()> {
    speculo::init_logging();

    let options = Options::default();
    let mirror_config = options.mirror;

    let app = App::new(options, move |engine| {
        engine.camera.position = Vec3::new(-0.5, 0.0, 1.5);

        let mut subject = Model::cube(engine, "subject", 0.8);
        subject.position = Vec3::new(0.3, -0.2, -0.5);
        subject.rotate_axis_angle(Vec3::Y, 35.0);

        let mut floor = Model::plane(engine, "floor", 8.0);
        floor.rotate_axis_angle(Vec3::X, -90.0);
        floor.position = Vec3::new(0.0, -0.6, 0.0);

        let mut mirrors = MirrorManager::new(engine, mirror_config);
        for i in 0..4 {
            let mut surface = Model::plane(engine, format!("mirror-{i}"), 0.9);
            surface.position = Vec3::new(i as f32 - 1.5, -0.1, -2.0);

            let material = MirrorMaterial::new(
                Vec3::splat(0.75 + 0.25 * i as f32),
                1.0,
                0.7 * i as f32,
            );
            let plane = MirrorPlane::from_model(surface, material)
                .expect("procedural plane has geometry");
            mirrors.add_plane(plane).expect("four planes fit the capacity");
        }

        let skybox = Skybox::solid(
            &engine.device,
            &engine.queue,
            engine.camera_bind_group_layout(),
            engine.surface_config.format,
            [96, 132, 180, 255],
        );

        let mut lights = LightManager::new();
        lights.add_point_light(Vec3::new(2.0, 1.5, 2.0), Vec3::ONE, 2.5);
        lights.add_spot_light(
            Vec3::new(0.0, 2.0, 3.0),
            Vec3::new(0.0, -0.5, -1.0),
            Vec3::new(1.0, 0.95, 0.85),
            1.5,
            12.0,
            25.0,
        );

        Scene {
            models: vec![subject, floor],
            mirrors,
            skybox: Some(skybox),
            lights,
        }
    });

    app.run()
}
