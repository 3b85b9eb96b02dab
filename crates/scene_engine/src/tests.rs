//! End-to-end scenarios across import, scene and rendering

use std::path::{Path, PathBuf};

use approx::assert_relative_eq;

use crate::assets::{ImportSettings, ModelImporter, ObjSceneSource};
use crate::config::{Config, SceneConfig};
use crate::foundation::math::{constants::TAU, Mat4, Vec3};
use crate::render::{HeadlessBackend, RecordedCommand, RenderableMesh, SpotLight, TextureRole};
use crate::scene::{EllipticalOrbit, FrameInput, Scene, SceneBuilder, SceneEntity};

const TWO_PANELS: &str = "\
mtllib panels.mtl
o left
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl painted
f 1/1/1 2/2/1 3/3/1 4/4/1
o right
v 2 0 0
v 3 0 0
v 3 1 0
vt 0 0
vt 1 0
vt 1 1
vn 0 0 1
usemtl painted
f 5/5/2 6/6/2 7/7/2
";

const PAINTED_MTL: &str = "\
newmtl painted
map_Kd paint.png
map_Ks gloss.png
";

/// Fresh per-test directory under the system temp dir
fn fixture_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("scene_engine_{test}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(dir: &Path, name: &str) {
    image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 40, 40, 255]))
        .save(dir.join(name))
        .unwrap();
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn panels_fixture(test: &str) -> PathBuf {
    let dir = fixture_dir(test);
    write(&dir, "panels.mtl", PAINTED_MTL);
    write_png(&dir, "paint.png");
    write_png(&dir, "gloss.png");
    write(&dir, "panels.obj", TWO_PANELS)
}

fn frame(dt: f32) -> FrameInput {
    FrameInput::new(dt, Mat4::identity(), Mat4::identity(), Vec3::new(0.0, 10.0, 50.0))
}

#[test]
fn test_shared_texture_loads_once() {
    let path = panels_fixture("dedup");
    let mut backend = HeadlessBackend::new();
    let model = ModelImporter::new(&ObjSceneSource, ImportSettings::default())
        .import(&path, &mut backend)
        .unwrap();

    assert_eq!(model.meshes().len(), 2);
    assert_eq!(model.textures().len(), 2);
    assert_eq!(backend.texture_upload_count(), 2);

    let left = model.meshes()[0].textures();
    let right = model.meshes()[1].textures();
    assert_eq!(left, right);
    assert_eq!(left[0].role, TextureRole::Diffuse);
    assert_eq!(left[1].role, TextureRole::Specular);
}

#[test]
fn test_import_order_is_deterministic() {
    let path = panels_fixture("determinism");
    let names = || {
        let model = ModelImporter::new(&ObjSceneSource, ImportSettings::default())
            .import(&path, &mut HeadlessBackend::new())
            .unwrap();
        model
            .meshes()
            .iter()
            .map(|m| {
                let textures: Vec<_> = m.textures().iter().map(|t| (t.role, t.path.clone())).collect();
                (m.name().to_string(), m.indices().to_vec(), textures)
            })
            .collect::<Vec<_>>()
    };

    let first = names();
    assert_eq!(first.iter().map(|(n, _, _)| n.as_str()).collect::<Vec<_>>(), vec!["left", "right"]);
    for (_, _, textures) in &first {
        assert_eq!(
            textures,
            &vec![
                (TextureRole::Diffuse, "paint.png".to_string()),
                (TextureRole::Specular, "gloss.png".to_string()),
            ]
        );
    }
    assert_eq!(first, names());
}

#[test]
fn test_mesh_without_uvs() {
    let dir = fixture_dir("no_uv");
    let path = write(&dir, "tri.obj", "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");

    let model = ModelImporter::new(&ObjSceneSource, ImportSettings::default())
        .import(&path, &mut HeadlessBackend::new())
        .unwrap();
    let mesh = &model.meshes()[0];

    assert_eq!(mesh.vertices().len(), 3);
    assert_eq!(mesh.indices(), &[0, 1, 2]);
    assert!(mesh.textures().is_empty());
    for v in mesh.vertices() {
        assert_eq!(v.tex_coords, [0.0, 0.0]);
        assert_eq!(v.tangent, [0.0; 3]);
        assert_eq!(v.bitangent, [0.0; 3]);
        // generated by post-processing
        assert_relative_eq!(Vec3::from(v.normal), Vec3::z(), epsilon = 1e-6);
    }
}

#[test]
fn test_missing_texture_is_skipped() {
    let dir = fixture_dir("missing_texture");
    write(&dir, "panels.mtl", PAINTED_MTL);
    write_png(&dir, "paint.png");
    let path = write(&dir, "panels.obj", TWO_PANELS);

    let mut backend = HeadlessBackend::new();
    let model = ModelImporter::new(&ObjSceneSource, ImportSettings::default())
        .import(&path, &mut backend)
        .unwrap();

    for mesh in model.meshes() {
        assert_eq!(mesh.textures().len(), 1);
        assert_eq!(mesh.textures()[0].path, "paint.png");
        assert_eq!(mesh.sampler_bindings()[0].name, "texture_diffuse1");
    }
    // one skip per referencing mesh, but only one disk attempt
    assert_eq!(model.skipped_textures().len(), 2);
    assert!(model.skipped_textures().iter().all(|s| s.role == TextureRole::Specular));
    assert_eq!(backend.texture_upload_count(), 1);
}

#[test]
fn test_malformed_scene_does_not_stop_the_app() {
    let dir = fixture_dir("malformed");
    write(&dir, "empty.obj", "# nothing but a comment\n");
    let panels = panels_fixture("malformed_ok");

    let importer = ModelImporter::new(&ObjSceneSource, ImportSettings::default());
    let mut backend = HeadlessBackend::new();
    assert!(importer.import(dir.join("empty.obj"), &mut backend).is_err());
    assert!(importer.import(dir.join("missing.obj"), &mut backend).is_err());
    assert_eq!(backend.mesh_upload_count(), 0);

    let config = SceneConfig::load_from_str(
        &format!(
            "[[models]]\nname = \"broken\"\npath = \"{}\"\n\n[[models]]\nname = \"panels\"\npath = \"{}\"\n",
            dir.join("empty.obj").display(),
            panels.display()
        ),
        "scene.toml",
    )
    .unwrap();
    let mut scene = SceneBuilder::new(&config).build(&ObjSceneSource, &mut backend).unwrap();

    let broken = scene.find("broken").unwrap();
    assert!(scene.entity(broken).unwrap().meshes().is_empty());
    let stats = scene.render_frame(&frame(0.016), &mut backend).unwrap();
    assert_eq!(stats.entities_drawn, 2);
    assert_eq!(stats.meshes_drawn, 2);
}

#[test]
fn test_orbit_closes_after_one_period() {
    let mut orbit = EllipticalOrbit::default().with_phase(0.3);
    let start = orbit.position();
    let steps = 1000;
    let dt = orbit.period().unwrap() / steps as f32;

    for _ in 0..steps {
        orbit.advance(dt);
    }
    assert_relative_eq!(orbit.position(), start, epsilon = 1e-3);

    // phase lives in [0, 2π); measure the distance around the circle
    let drift = (orbit.phase() - 0.3).rem_euclid(TAU);
    assert!(drift.min(TAU - drift) < 1e-3, "phase ended at {}", orbit.phase());
}

#[test]
fn test_yaw_is_continuous_across_wrap() {
    let mut orbit = EllipticalOrbit::default().with_phase(TAU - 0.05);
    let mut previous = orbit.yaw_degrees();
    let mut wrapped = false;

    for _ in 0..20 {
        let phase_before = orbit.phase();
        orbit.advance(0.01);
        wrapped |= orbit.phase() < phase_before;

        let yaw = orbit.yaw_degrees();
        let step = (yaw - previous + 540.0).rem_euclid(360.0) - 180.0;
        assert!(step.abs() < 1.0, "yaw jumped {previous} -> {yaw}");
        previous = yaw;
    }
    assert!(wrapped);
}

#[test]
fn test_light_follows_this_frames_position() {
    let mut scene = Scene::new();
    let blimp = scene.spawn(SceneEntity::kinematic(
        "blimp",
        Vec::<RenderableMesh>::new(),
        EllipticalOrbit::default(),
    ));
    let light = SpotLight::new(Vec3::new(1.2, 1.0, 2.0), -Vec3::y(), 12.5, 17.5).unwrap();
    scene.add_following_light(light, blimp).unwrap();

    let mut backend = HeadlessBackend::new();
    for _ in 0..3 {
        // A is the position before this frame's update, B the one after
        let a = scene.entity(blimp).unwrap().position();
        scene.render_frame(&frame(0.5), &mut backend).unwrap();
        let b = scene.entity(blimp).unwrap().position();

        let forwarded = backend.last_spot_lights().unwrap()[0];
        assert_relative_eq!(forwarded.position, b);
        assert!((forwarded.position - a).norm() > 1e-3);
    }
}

#[test]
fn test_builder_end_to_end() {
    let panels = panels_fixture("builder");
    let dir = panels.parent().unwrap().to_path_buf();
    let config_path = write(
        &dir,
        "scene.ron",
        r#"(
    import: (gamma_correction: true),
    models: [
        (name: "ground", path: "panels.obj"),
        (name: "blimp", path: "panels.obj", orbit: Some((speed: 1.0))),
    ],
    spot_lights: [
        (follow: Some("blimp")),
        (position: (0.0, 4.0, 0.0)),
    ],
)"#,
    );

    let config = SceneConfig::load_from_file(&config_path).unwrap();
    let mut backend = HeadlessBackend::new();
    let mut scene = SceneBuilder::new(&config)
        .with_base_dir(&dir)
        .build(&ObjSceneSource, &mut backend)
        .unwrap();

    // same file, imported once
    assert_eq!(backend.mesh_upload_count(), 2);
    assert!(backend
        .commands()
        .iter()
        .all(|c| !matches!(c, RecordedCommand::UploadTexture { srgb: false, .. })));

    let ground = scene.find("ground").unwrap();
    let blimp = scene.find("blimp").unwrap();
    assert!(std::sync::Arc::ptr_eq(
        scene.entity(ground).unwrap().meshes(),
        scene.entity(blimp).unwrap().meshes()
    ));
    assert_eq!(scene.lights().follow_target(0), Some(blimp));
    assert_eq!(scene.lights().follow_target(1), None);

    backend.clear_commands();
    let stats = scene.render_frame(&frame(0.1), &mut backend).unwrap();
    assert_eq!(stats.entities_drawn, 2);
    assert_eq!(stats.meshes_drawn, 4);
    assert_eq!(stats.triangles_drawn, 6);
    assert_eq!(stats.lights_forwarded, 2);

    let samplers: Vec<_> = backend
        .commands()
        .iter()
        .filter_map(|c| match c {
            RecordedCommand::BindSampler(b) => Some(b.name.as_str()),
            _ => None,
        })
        .take(2)
        .collect();
    assert_eq!(samplers, vec!["texture_diffuse1", "texture_specular1"]);
}

#[test]
fn test_unknown_follow_target_fails_the_build() {
    let config = SceneConfig::load_from_str("[[spot_lights]]\nfollow = \"ghost\"\n", "scene.toml").unwrap();
    let result = SceneBuilder::new(&config).build(&ObjSceneSource, &mut HeadlessBackend::new());
    assert!(matches!(result, Err(crate::scene::SceneError::UnknownFollowTarget(name)) if name == "ghost"));
}
