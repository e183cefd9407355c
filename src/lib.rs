//! Number City core crate.
//!
//! A counting game for young children: a number is shown, the child taps the
//! matching answer, and every correct answer adds a colourful building to their
//! city. Gameplay (levels, rounds, countdown, sound plans, view projection) is
//! plain Rust and runs on the host; `dom` and `audio` are the browser shell.

use wasm_bindgen::prelude::*;

pub mod audio;
pub mod config;
mod dom;
pub mod error;
pub mod game;
pub mod level;
pub mod rng;
pub mod session;
pub mod timer;
pub mod tone;
pub mod view;

pub use config::GameConfig;
pub use game::Game;
pub use session::{Feedback, Reward, TOTAL_ROUNDS};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // Err only means a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Info);
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Mount the game on `document.body` with default settings.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    dom::mount(GameConfig::default())
}

/// Apply a JSON settings document (`timed_mode`, `round_seconds`, `volume`,
/// `muted`; missing keys keep their defaults) to the running game.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn configure(json: &str) -> Result<(), JsValue> {
    let cfg = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let now = performance_now();
    if dom::with_game(|game| game.apply_config(cfg, now)) {
        Ok(())
    } else {
        Err(JsValue::from_str("game not started"))
    }
}

/// Milliseconds on the same clock as requestAnimationFrame timestamps.
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
