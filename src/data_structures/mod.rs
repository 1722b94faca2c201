//! Engine data structures: terrain, models, skyboxes, textures and instances.
//!
//! - `terrain` turns a heightmap into a lit, coloured strip mesh
//! - `model` assembles OBJ data into draw lists and GPU models
//! - `skybox` splits cross images and holds the shared sky cube
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data

pub mod instance;
pub mod model;
pub mod skybox;
pub mod terrain;
pub mod texture;
