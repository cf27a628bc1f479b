//! Headless demo: two scripted players trade grenades for ten seconds
//!
//! Usage: craterfall [seed] [tuning.json]
//!
//! Prints per-tick events at debug level (RUST_LOG=debug) and a summary at
//! the end. Mostly useful for eyeballing balance changes and for profiling
//! the simulation without a renderer.

use std::path::PathBuf;
use std::process::ExitCode;

use craterfall::Tuning;
use craterfall::consts::SIM_DT;
use craterfall::events::{Event, EventKind};
use craterfall::sim::{PlayerInput, SimState, tick};

const DEMO_SECONDS: u64 = 10;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = match args.next().map(|s| s.parse()).transpose() {
        Ok(seed) => seed.unwrap_or(42),
        Err(e) => {
            eprintln!("invalid seed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let tuning = match args.next().map(PathBuf::from) {
        Some(path) => match Tuning::from_file(&path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    log::info!("seed {seed}, {DEMO_SECONDS} s at {:.0} Hz", 1.0 / SIM_DT);

    let mut state = SimState::new(seed, &tuning);
    state.players.add_player(1_000.0);
    state.players.add_player(3_000.0);

    let mut explosions = 0u64;
    let mut shots = 0u64;
    let ticks = DEMO_SECONDS * (1.0 / SIM_DT) as u64;

    for i in 0..ticks {
        let inputs = [
            scripted_input(i, 1.0, 0),
            scripted_input(i, -1.0, 120),
        ];
        tick(&mut state, &inputs);

        for event in state.bus.outbox() {
            match event.kind() {
                EventKind::FireWeapon => shots += 1,
                EventKind::Explosion => {
                    explosions += 1;
                    if let Event::Explosion(e) = event {
                        log::debug!(
                            "tick {i}: explosion at ({:.0}, {:.0}), radius {:.0}",
                            e.position.x,
                            e.position.y,
                            e.radius
                        );
                    }
                }
                _ => {}
            }
        }
    }

    let alive = state.players.players().iter().filter(|p| p.alive).count();
    log::info!(
        "done: {} ticks, {shots} shots, {explosions} explosions, {alive} of {} players alive",
        state.time_ticks,
        state.players.players().len()
    );
    println!(
        "seed {seed}: {shots} shots, {explosions} explosions, {alive} players alive after {DEMO_SECONDS} s"
    );

    ExitCode::SUCCESS
}

/// Canned input: run toward the middle, hop occasionally, lob a grenade
/// every two seconds with the players' volleys offset from each other.
fn scripted_input(tick_index: u64, direction: f32, fire_offset: u64) -> PlayerInput {
    PlayerInput {
        axes: [direction, -0.6],
        jump: tick_index % 300 == 150,
        fire: tick_index % 240 == fire_offset,
        cycle_weapon: tick_index % 480 == 0 && tick_index > 0,
        ..Default::default()
    }
}
