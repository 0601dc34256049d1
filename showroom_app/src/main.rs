//! Headless showroom demo
//!
//! Assembles the showroom, plays a short scripted walk (line up with the left
//! door, open it with `E`, walk in, look around the car, leave with `Escape`)
//! and renders every frame through the recording backend, logging what each
//! frame produced.
//!
//! Usage: `showroom [config.toml|config.ron]`

mod showroom;

use std::time::Duration;

use scene_engine::config::ConfigError;
use scene_engine::foundation::{logging, time::FrameClock};
use scene_engine::prelude::*;
use scene_engine::render::FrameStats;
use scene_engine::scene::SceneError;
use thiserror::Error;

const FRAME: Duration = Duration::from_millis(16);
/// Hard stop in case the script never presses `Escape`
const SCRIPT_SECONDS: f32 = 10.0;

#[derive(Error, Debug)]
enum ShowroomError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene assembly failed: {0}")]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One step of the scripted walk
#[derive(Debug, Clone, Copy)]
enum Cue {
    Press(KeyCode),
    Release(KeyCode),
    Look(f32, f32),
}

fn script() -> Vec<(f32, Cue)> {
    vec![
        // Line up with the left door's label
        (0.0, Cue::Press(KeyCode::A)),
        (0.15, Cue::Release(KeyCode::A)),
        (0.2, Cue::Press(KeyCode::W)),
        (1.0, Cue::Release(KeyCode::W)),
        (1.1, Cue::Press(KeyCode::E)),
        (1.2, Cue::Release(KeyCode::E)),
        // Step back into the middle of the doorway
        (1.3, Cue::Press(KeyCode::D)),
        (1.35, Cue::Release(KeyCode::D)),
        (2.0, Cue::Press(KeyCode::W)),
        (3.5, Cue::Look(-200.0, 40.0)),
        (4.0, Cue::Press(KeyCode::Space)),
        (4.1, Cue::Release(KeyCode::Space)),
        (5.0, Cue::Release(KeyCode::W)),
        (5.0, Cue::Look(400.0, -40.0)),
        (6.0, Cue::Press(KeyCode::Escape)),
    ]
}

/// Play the script until `Escape`, rendering every frame into `backend`
fn walk(engine: &mut Engine, backend: &mut RecordingBackend) -> Result<(FrameClock, FrameStats), ShowroomError> {
    let mut clock = FrameClock::new(engine.config().engine.max_frame_delta);
    let mut cues = script().into_iter().peekable();
    let mut totals = FrameStats::default();

    while !engine.exit_requested() && clock.total_time() < SCRIPT_SECONDS {
        let delta_time = clock.advance(FRAME);

        while let Some((_, cue)) = cues.next_if(|(at, _)| *at <= clock.total_time()) {
            log::debug!("t = {:.2}s: {:?}", clock.total_time(), cue);
            match cue {
                Cue::Press(key) => engine.handle_key(key, true),
                Cue::Release(key) => engine.handle_key(key, false),
                Cue::Look(dx, dy) => engine.handle_mouse_move(dx, dy),
            }
        }

        let outcome = engine.update_frame(delta_time);
        if outcome.blocked_x || outcome.blocked_z {
            log::debug!("Movement blocked at {:?}", engine.viewer.position);
        }

        backend.clear();
        let stats = engine.render_frame(backend)?;
        totals.opaque += stats.opaque;
        totals.shadow += stats.shadow;
        totals.transparent_back += stats.transparent_back;
        totals.transparent_front += stats.transparent_front;
    }
    Ok((clock, totals))
}

fn load_config() -> Result<ApplicationConfig, ShowroomError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(ApplicationConfig::load_from_file(path)?),
        None => Ok(ApplicationConfig::default()),
    }
}

fn run() -> Result<(), ShowroomError> {
    let config = load_config()?;
    logging::init(&config.engine.log_level);
    log::info!("Starting showroom demo");

    let mut engine = Engine::new(config)?;
    let room = showroom::build(&mut engine)?;

    let mut backend = RecordingBackend::new();
    let (clock, totals) = walk(&mut engine, &mut backend)?;

    let door = engine.scene.node(room.left_door)?;
    let turntable = engine.scene.real_rotation(room.turntable)?;
    log::info!(
        "Simulated {} frame(s) in {:.2}s; viewer ended at {:?}",
        clock.frame_count(),
        clock.total_time(),
        engine.viewer.position
    );
    log::info!(
        "Left door at {:.1} degrees, turntable at {:.1} degrees",
        door.swing().map_or(0.0, |s| s.current),
        turntable.y
    );
    log::info!(
        "Leaf draws: {} opaque, {} shadow, {} + {} transparent ({} total over {} frame(s))",
        totals.opaque,
        totals.shadow,
        totals.transparent_back,
        totals.transparent_front,
        totals.total(),
        backend.frames()
    );
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("Showroom failed: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_opens_left_door_and_enters() {
        let mut engine = Engine::new(ApplicationConfig::default()).unwrap();
        let room = showroom::build(&mut engine).unwrap();
        let mut backend = RecordingBackend::new();
        let (clock, totals) = walk(&mut engine, &mut backend).unwrap();

        assert!(engine.exit_requested());
        assert!(clock.total_time() < SCRIPT_SECONDS);
        assert!(totals.total() > 0);

        let left = *engine.scene.node(room.left_door).unwrap().swing().unwrap();
        assert_eq!(left.target, 90.0);
        assert_eq!(left.current, 90.0);
        assert_eq!(engine.scene.node(room.right_door).unwrap().swing().unwrap().target, 0.0);

        let z = engine.viewer.position.z;
        assert!(z < -1.0, "viewer stayed outside: z = {z}");
    }
}
