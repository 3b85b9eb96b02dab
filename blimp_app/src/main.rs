//! Blimp demo
//!
//! Loads a scene description, imports its models into a headless backend and
//! runs the frame loop for a fixed number of frames, logging where the blimp
//! and its chase light are.
//!
//! ```text
//! blimp_demo [scene.toml|scene.ron] [frames]
//! ```

use std::path::{Path, PathBuf};

use scene_engine::foundation::logging;
use scene_engine::prelude::*;

const DEFAULT_SCENE: &str = "resources/scenes/blimp.toml";
const DEFAULT_FRAMES: u64 = 600;
const FRAME_TIME: f32 = 1.0 / 60.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let scene_path = args.next().map_or_else(|| PathBuf::from(DEFAULT_SCENE), PathBuf::from);
    let frames = match args.next() {
        Some(raw) => raw.parse::<u64>()?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Loading scene {}", scene_path.display());
    let config = SceneConfig::load_from_file(&scene_path)?;
    let base_dir = scene_path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut backend = HeadlessBackend::new();
    let mut scene = SceneBuilder::new(&config)
        .with_base_dir(base_dir)
        .build(&ObjSceneSource, &mut backend)?;

    let view = config.camera.view_matrix();
    let projection = config.camera.projection_matrix();
    let blimp = scene
        .entities()
        .find(|(_, entity)| entity.motion().is_kinematic())
        .map(|(id, _)| id);
    let chase_light = blimp.and_then(|id| (0..scene.lights().len()).find(|&i| scene.lights().follow_target(i) == Some(id)));

    let mut clock = FrameClock::new(config.frame.max_delta);
    let mut totals = FrameStats::default();

    for _ in 0..frames {
        let dt = clock.advance(FRAME_TIME);
        let input = FrameInput::new(dt, view, projection, config.camera.eye);
        let stats = scene.render_frame(&input, &mut backend)?;
        totals.triangles_drawn += stats.triangles_drawn;
        totals.meshes_drawn += stats.meshes_drawn;
        // only the last frame's commands are of interest
        backend.clear_commands();

        if clock.frame_count() % 60 == 0 {
            report(&scene, &clock, blimp, chase_light);
        }
    }

    log::info!(
        "Ran {} frames ({:.1}s simulated): {} meshes, {} triangles submitted",
        clock.frame_count(),
        clock.total_time(),
        totals.meshes_drawn,
        totals.triangles_drawn
    );
    Ok(())
}

fn report(scene: &Scene, clock: &FrameClock, blimp: Option<EntityId>, chase_light: Option<usize>) {
    let Some(entity) = blimp.and_then(|id| scene.entity(id)) else {
        log::info!("t = {:5.2}s: no kinematic entity in scene", clock.total_time());
        return;
    };

    let position = entity.position();
    log::info!(
        "t = {:5.2}s: {} at ({:6.3}, {:6.3}, {:6.3}) yaw {:7.2}°",
        clock.total_time(),
        entity.name(),
        position.x,
        position.y,
        position.z,
        entity.transform().rotation.y
    );
    if let Some(light) = chase_light.and_then(|i| scene.lights().light(i)) {
        let p = light.position();
        log::info!("           chase light at ({:6.3}, {:6.3}, {:6.3})", p.x, p.y, p.z);
    }
}
