//! Emoji Match core crate.
//!
//! A find / match / pairs game for small children. Game logic is a pure,
//! clock-driven core (`engine`, `manager`) behind two host traits, so it runs
//! natively with the headless collaborators and in the browser through
//! `start_game()`.

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod headless;
pub mod manager;
pub mod mode;
pub mod session;
pub mod surface;
pub mod tone;
pub mod web;

pub use catalog::{Catalog, Category, CategoryFilter, Token};
pub use config::GameConfig;
pub use engine::{Completion, RoundEngine};
pub use error::{GameError, InsufficientPool};
pub use manager::{Command, ModeManager};
pub use mode::GameMode;
pub use surface::{BestTimeStore, Handle, Position, Surface, Visual};
pub use tone::{Cue, ToneSynth};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).ok();
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Wires the page and starts the frame loop with the default configuration.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    web::launch(GameConfig::default())?;
    Ok(())
}

/// Same as [`start_game`] with a JSON configuration override.
#[wasm_bindgen]
pub fn start_game_with_config(json: &str) -> Result<(), JsValue> {
    let config = GameConfig::from_json(json)?;
    web::launch(config)?;
    Ok(())
}

/// Restricts the challenge pool at runtime: `"all"` or a comma separated
/// category list. Applied on the next frame; a running round restarts.
#[wasm_bindgen]
pub fn set_categories(categories: &str) -> Result<(), JsValue> {
    let filter: CategoryFilter = categories.parse()?;
    web::enqueue(Command::SetCategories(filter));
    Ok(())
}
