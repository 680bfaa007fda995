use std::cell::RefCell;
use wasm_bindgen::prelude::*;

pub mod game;
#[cfg(target_arch = "wasm32")]
mod logging;

use game::error::GameError;
use game::Game;

thread_local! {
    static GAME: RefCell<Option<Game>> = RefCell::new(None);
}

fn with_game_mut<R>(f: impl FnOnce(&mut Game) -> R) -> Result<R, GameError> {
    GAME.with(|cell| {
        let mut opt = cell.borrow_mut();
        match opt.as_mut() {
            Some(game) => Ok(f(game)),
            None => Err(GameError::NotInitialized),
        }
    })
}

fn install(game: Game) {
    // Both write to the browser console, which only exists on wasm.
    #[cfg(all(target_arch = "wasm32", feature = "console_error_panic_hook"))]
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    logging::init(log::LevelFilter::Info);

    GAME.with(|g| {
        *g.borrow_mut() = Some(game);
    });
}

#[wasm_bindgen]
pub fn init_game(seed: u64) {
    install(Game::new(seed));
}

/// Start a game from a JSON config. Returns an empty string on success and
/// the error message otherwise.
#[wasm_bindgen]
pub fn init_game_with_config(seed: u64, config_json: &str) -> String {
    match Game::from_json(seed, config_json) {
        Ok(game) => {
            install(game);
            String::new()
        }
        Err(e) => e.to_string(),
    }
}

#[wasm_bindgen]
pub fn tick() -> String {
    match with_game_mut(|game| game.tick().to_string()) {
        Ok(v) => v,
        Err(e) => e.to_string(),
    }
}

#[wasm_bindgen]
pub fn drop_planet(x: f64, y: f64) -> String {
    match with_game_mut(|game| game.drop_planet(x, y).0.to_string()) {
        Ok(v) => v,
        Err(e) => e.to_string(),
    }
}

#[wasm_bindgen]
pub fn release_planet(x: f64, y: f64) -> String {
    match with_game_mut(|game| game.release_planet(x, y)).and_then(|r| r) {
        Ok(id) => id.0.to_string(),
        Err(e) => e.to_string(),
    }
}

#[wasm_bindgen]
pub fn toggle_pause() -> String {
    match with_game_mut(|game| game.toggle_pause().to_string()) {
        Ok(v) => v,
        Err(e) => e.to_string(),
    }
}

#[wasm_bindgen]
pub fn snapshot() -> String {
    match with_game_mut(|game| game.snapshot_json()) {
        Ok(v) => v,
        Err(e) => e.to_string(),
    }
}

/// Lifecycle events since the last call, as a JSON array.
#[wasm_bindgen]
pub fn drain_events() -> String {
    let events = with_game_mut(|game| game.simulation_mut().drain_events());
    match events {
        Ok(events) => serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()),
        Err(e) => e.to_string(),
    }
}
