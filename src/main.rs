//! Pinball Physics headless runner
//!
//! Usage: `pinball-physics [table.json] [frames]`
//!
//! Loads a table (the built-in demo table by default), plays it with a
//! scripted flipper pattern at ~60 Hz and logs every game event.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::process::ExitCode;

    use pinball_physics::game::{GameState, TableDescriptor, TickInput, tick};

    const FRAME_MS: u32 = 16;
    const DEFAULT_FRAMES: u32 = 3_600;
    const SEED: u64 = 0x5eed;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let table = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read {path}: {err}"))
            .and_then(|json| TableDescriptor::from_json(&json).map_err(|err| err.to_string())),
        None => TableDescriptor::demo().map_err(|err| err.to_string()),
    };
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let state = table.and_then(|table| GameState::new(table, SEED).map_err(|err| err.to_string()));
    let mut state = match state {
        Ok(state) => state,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("Pinball Physics (native) running {frames} frames, seed {SEED:#x}");

    let mut collisions = 0usize;
    for frame in 0..frames {
        let input = TickInput {
            left_flipper: frame % 90 < 10,
            right_flipper: frame % 150 < 10,
        };
        let output = tick(&mut state, &input, FRAME_MS);
        collisions += output.manifolds.len();
        for event in &output.events {
            log::info!("[{:>6}ms] {:?}", state.timestamp, event);
        }
    }

    log::info!(
        "Finished: score {} multiplier x{} balls {} collisions {} underworld {}",
        state.score,
        state.multiplier,
        state.balls.len(),
        collisions,
        if state.underworld_unlocked { "open" } else { "closed" }
    );
    ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
