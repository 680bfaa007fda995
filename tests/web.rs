//! Browser tests for the wasm exports. Run with `wasm-pack test --headless`.

#![cfg(target_arch = "wasm32")]

use gravity_garden::{drop_planet, init_game, release_planet, snapshot, tick};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn exports_drive_a_round() {
    init_game(12);
    assert_eq!(release_planet(0.0, 0.0), "no planet is being placed");

    let id = drop_planet(12.0, 0.0);
    assert_eq!(release_planet(12.0, 14.0), id);
    assert_eq!(tick(), "1");

    let json: serde_json::Value = serde_json::from_str(&snapshot()).unwrap();
    assert_eq!(json["planets"].as_array().map(Vec::len), Some(1));
}
