//! Starlane headless runner
//!
//! Runs the demo galaxy through the simulation pipeline with a null
//! renderer, printing HUD messages as they appear. Optional first argument:
//! path to a settings JSON file.

use std::path::Path;
use std::process::ExitCode;

use starlane::pacer::FramePacer;
use starlane::pipeline::Engine;
use starlane::sim::Command;
use starlane::{EngineError, SceneTransition, Settings, demo};

/// Frame at which the demo pilot asks the autopilot to land
const LAND_AT_FRAME: u64 = 120;

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let settings = match std::env::args_os().nth(1) {
        Some(path) => match Settings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("starlane: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Simulation stopped: {err}");
            eprintln!("starlane: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<(), EngineError> {
    log::info!("Starlane (headless) starting...");
    let world = demo::world(settings)?;
    let mut engine = Engine::new(world)?;
    let mut pacer = FramePacer::new(settings.target_fps, settings.max_lag());

    let mut last_step = None;
    let mut landings = 0;
    let mut peak_draw = 0;
    for frame in 0..settings.demo_frames {
        let input = Command {
            land: frame == LAND_AT_FRAME,
            ..Default::default()
        };
        match engine.begin_tick(true, &input)? {
            Some(SceneTransition::EnteredSystem { name, .. }) => log::info!("Now in {name}"),
            Some(SceneTransition::FlagshipDestroyed) => {
                println!("Flagship destroyed at frame {frame}");
                break;
            }
            Some(SceneTransition::Landed(_)) | None => {}
        }

        if let Some(panel) = engine.panel_to_show() {
            // The null renderer leaves the planet straight away
            println!("Landed on {}", panel.name);
            landings += 1;
            engine.take_off();
        }

        let scene = engine.snapshot();
        if last_step != Some(scene.step) {
            last_step = Some(scene.step);
            for message in scene.messages.iter().filter(|m| m.fade >= 1.0) {
                println!("[{:>5}] {}", scene.step, message.text);
            }
        }
        peak_draw = peak_draw.max(scene.draw.len());
        pacer.wait();
    }

    println!(
        "Ran {} frames: {} landings, at most {} draw items, {} pacer resets",
        settings.demo_frames,
        landings,
        peak_draw,
        pacer.resets()
    );
    Ok(())
}
