//! dragon-flight
//!
//! "Journey of a Dragon": a first-person flight over a heightmap terrain under
//! a turning skybox that cycles through day, dusk and night, with a flock of
//! dragons circling the map. Runs natively and in the browser.
//!
//! High-level modules
//! - `camera`: flight camera, projection, terrain collision and input controller
//! - `config`: every tunable constant of the game
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: terrain, models, skyboxes, textures and instances
//! - `flow`: the event loop and the flow abstraction driving the game
//! - `game`: the menu and flight flow
//! - `pipelines`: render pipelines and their WGSL shaders
//! - `render`: render composition and pipeline batching
//! - `resources`: OBJ/MTL parsing and asset loading
//! - `scene`: per-frame animation state
//! - `snapshot`: frame capture to PNG

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod game;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    flow::run(vec![game::GameFlow::constructor(config::GameConfig::default())])
        .map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
