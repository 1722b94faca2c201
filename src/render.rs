//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`] tree. The frame loop
//! flattens the trees of all flows into one bucket per pipeline and then draws
//! the buckets back to front: sky, terrain, models and finally overlays.

use crate::data_structures::{
    model::Model,
    skybox::{SkyMesh, Skybox},
};

/// A model drawn `amount` times with the transforms in `instance`.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Indexed geometry without instancing: the terrain and overlays.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    /// Bound at group 0 when present.
    pub group: Option<&'a wgpu::BindGroup>,
    pub amount: usize,
}

/// One skybox on the shared cube, turned by the single instance in `rotation`.
pub struct Sky<'a> {
    pub mesh: &'a SkyMesh,
    pub skybox: &'a Skybox,
    pub rotation: &'a wgpu::Buffer,
}

/// Specifies how a flow's objects should be rendered.
///
/// # Variants
///
/// - `None` renders nothing
/// - `Sky(Sky)` renders the background box
/// - `Terrain(Flat)` renders a terrain strip mesh
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced models
/// - `GUI(Flat)` renders an unlit overlay on top of the scene
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Sky(Sky<'a>),
    Terrain(Flat<'a>),
    Defaults(Vec<Instanced<'a>>),
    GUI(Flat<'a>),
    Composed(Vec<Render<'a>>),
}

/// Per pipeline buckets collected from all flows for one frame.
pub(crate) struct Batches<'a> {
    pub skies: Vec<Sky<'a>>,
    pub terrain: Vec<Flat<'a>>,
    pub models: Vec<Instanced<'a>>,
    pub guis: Vec<Flat<'a>>,
}

impl Default for Batches<'_> {
    fn default() -> Self {
        Self {
            skies: Vec::new(),
            terrain: Vec::new(),
            models: Vec::new(),
            guis: Vec::new(),
        }
    }
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Sky(sky) => batches.skies.push(sky),
            Render::Terrain(flat) => batches.terrain.push(flat),
            Render::Defaults(mut vec) => batches.models.append(&mut vec),
            Render::GUI(flat) => batches.guis.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
            Render::None => (),
        }
    }
}
