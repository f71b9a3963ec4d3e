//! Star Blade entry point
//!
//! Runs the simulation headless on a fixed clock against a recording
//! renderer, logs gameplay events, and prints a JSON summary at the end.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use star_blade::Settings;
use star_blade::platform::{Clock, FixedClock, SystemClock};
use star_blade::renderer::RecordingRenderer;
use star_blade::sim::steering::is_pursuing;
use star_blade::sim::{GameEvent, GameState, PlayerPhase, RunStats, TickInput, tick};

/// End-of-run report
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    frames: u64,
    sim_secs: f64,
    wall_secs: f64,
    swept_ray: &'static str,
    phase: PlayerPhase,
    lives: i32,
    enemies_alive: usize,
    enemies_pursuing: usize,
    draws: u64,
    /// Size of the final frame's packed instance batch
    last_batch_bytes: usize,
    stats: RunStats,
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::EnemySpawned { .. } | GameEvent::BulletFired { .. } => {
            log::debug!("{:?}", event)
        }
        _ => log::info!("{:?}", event),
    }
}

fn main() {
    env_logger::init();
    log::info!("Star Blade (headless) starting...");

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings: {e}");
            std::process::exit(1);
        }
    };

    let seed = settings.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    log::info!(
        "Seed {seed}, swept ray: {}, autopilot: {}",
        settings.tuning.swept_ray.as_str(),
        settings.autopilot
    );

    let mut state = GameState::new(seed, settings.tuning.clone());
    let mut renderer = RecordingRenderer::new();
    let mut clock = FixedClock::new(settings.frame_dt);
    let wall = SystemClock::new();
    let input = TickInput {
        autopilot: settings.autopilot,
        ..Default::default()
    };

    while state.frame < settings.max_frames {
        let dt = clock.frame_delta();
        tick(&mut state, &input, dt, &mut renderer);
        for event in state.drain_events() {
            log_event(&event);
        }
        if state.should_exit() {
            break;
        }
    }

    if !state.should_exit() {
        log::warn!("Stopped after {} frames without game over", state.frame);
    }

    let summary = RunSummary {
        seed,
        frames: state.frame,
        sim_secs: clock.now(),
        wall_secs: wall.now(),
        swept_ray: settings.tuning.swept_ray.as_str(),
        phase: state.player.phase(),
        lives: state.player.lives,
        enemies_alive: state.live_enemies().count(),
        enemies_pursuing: state.live_enemies().filter(|e| is_pursuing(e)).count(),
        draws: renderer.total_draws,
        last_batch_bytes: renderer.as_bytes().len(),
        stats: state.stats.clone(),
    };
    match serde_json::to_string(&summary) {
        Ok(json) => {
            log::info!("Run summary: {json}");
            println!("{json}");
        }
        Err(e) => {
            log::error!("Failed to encode run summary: {e}");
            std::process::exit(1);
        }
    }
}
