use crate::{
    data_structures::{model::Vertex, terrain::TerrainVertex},
    pipelines::basic::{default_primitive, depth_state, mk_render_pipeline},
};

/// Vertex coloured, lit terrain drawn as one strip per heightmap row.
pub fn mk_terrain_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
    light_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Terrain Pipeline Layout"),
        bind_group_layouts: &[Some(camera_bind_group_layout), Some(light_bind_group_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Terrain Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("terrain.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        "Terrain Pipeline",
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: Some(wgpu::IndexFormat::Uint32),
            cull_mode: None,
            ..default_primitive()
        },
        Some(depth_state(true)),
        &[TerrainVertex::desc()],
        shader,
    )
}
