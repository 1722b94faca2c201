//! Render pipelines, one per kind of geometry, and the bind group layouts they
//! share with the loaders.

pub mod basic;
pub mod gui;
pub mod light;
pub mod sky;
pub mod terrain;

use crate::resources::texture::{material_layout, texture_layout};

/// Bind group layouts resources are created against.
#[derive(Debug, Clone)]
pub struct Layouts {
    /// One texture and its sampler: sky faces and overlays.
    pub texture: wgpu::BindGroupLayout,
    /// All texture maps of a model material.
    pub material: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(
        device: &wgpu::Device,
        camera: &wgpu::BindGroupLayout,
        light: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            texture: texture_layout(device),
            material: material_layout(device),
            camera: camera.clone(),
            light: light.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Pipelines {
    pub sky: wgpu::RenderPipeline,
    pub terrain: wgpu::RenderPipeline,
    pub model: wgpu::RenderPipeline,
    pub gui: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        layouts: &Layouts,
    ) -> Self {
        Self {
            sky: sky::mk_sky_pipeline(device, config, &layouts.texture, &layouts.camera),
            terrain: terrain::mk_terrain_pipeline(device, config, &layouts.camera, &layouts.light),
            model: basic::mk_model_pipeline(
                device,
                config,
                &layouts.material,
                &layouts.camera,
                &layouts.light,
            ),
            gui: gui::mk_gui_pipeline(device, config, &layouts.texture),
        }
    }
}
