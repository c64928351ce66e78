//! Pellet Runtime
//!
//! Headless driver: loads settings, feeds a scripted pointer session into
//! the simulation and logs what happened.

mod script;

use anyhow::{Context, Result};
use pellet_core::time::FrameClock;
use pellet_core::{FrameInput, InputQueue, Simulation};
use pellet_metrics::{Counter, FrameTimer};
use pellet_services::{PointerTracker, Settings};
use script::PointerScript;
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS_PATH: &str = "pellet.json";

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Pellet v{}", pellet_core::VERSION);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
    let settings = Settings::load(&path).with_context(|| format!("loading {path}"))?;

    run(&settings);
    Ok(())
}

fn run(settings: &Settings) {
    let viewport = settings.viewport();
    let config = settings.solver_config();
    let frames = settings.runtime.frames;
    tracing::info!(
        width = viewport.width,
        height = viewport.height,
        steps = config.steps,
        stiffness = config.stiffness,
        frames,
        "simulation starting"
    );

    let mut sim = Simulation::with_style(settings.runtime.seed, settings.spawn_style());
    let script = PointerScript::new(frames, viewport);
    let mut tracker = PointerTracker::new();
    let mut pending = InputQueue::new();
    let mut clock = FrameClock::new(settings.runtime.target_fps);
    let mut timer = FrameTimer::new(60);
    let mut totals = Counter::new();
    let report_every = (settings.runtime.target_fps.max(1.0) as u64).max(1);
    let input = FrameInput::new(viewport);

    for frame in 0..frames {
        clock.begin_frame();
        timer.begin();

        tracker.sample(script.sample(frame), &mut pending);
        for event in pending.drain() {
            sim.push_input(event);
        }
        let stats = sim.frame(&input, &config);

        totals.increment("spawned", stats.spawned);
        totals.increment("deleted", stats.deleted);
        totals.increment("pair_tests", stats.step.pair_tests);
        totals.increment("collisions", stats.step.total_collisions);

        timer.end();
        if settings.runtime.paced {
            clock.end_frame();
        } else {
            clock.end_frame_unpaced();
        }

        if (frame + 1) % report_every == 0 {
            tracing::info!(
                frame = frame + 1,
                alive = stats.alive,
                collisions = stats.step.collisions,
                frame_ms = format!("{:.3}", timer.frame_time_ms()),
                fps = clock.fps(),
                "progress"
            );
        }
    }

    for (name, value) in totals.iter() {
        tracing::info!(counter = name, value, "total");
    }
    for (phase, timing) in sim.solver().profiler().iter() {
        tracing::info!(
            phase,
            calls = timing.calls,
            avg_us = timing.average().as_micros() as u64,
            "solver phase"
        );
    }
    let (min_ms, max_ms) = timer.frame_time_range_ms();
    tracing::info!(
        frames = clock.frame_count(),
        alive = sim.alive(),
        min_ms = format!("{min_ms:.3}"),
        max_ms = format!("{max_ms:.3}"),
        "simulation finished"
    );
}
