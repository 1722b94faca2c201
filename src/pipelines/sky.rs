use crate::{
    data_structures::{
        instance::InstanceRaw,
        model::{TexturedVertex, Vertex},
        skybox::{SkyMesh, Skybox},
    },
    pipelines::basic::{default_primitive, depth_state, mk_render_pipeline},
};

/// Textured cube around the world. It writes no depth so the scene drawn
/// afterwards always covers it.
pub fn mk_sky_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    texture_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sky Pipeline Layout"),
        bind_group_layouts: &[Some(texture_bind_group_layout), Some(camera_bind_group_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Sky Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sky.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        "Sky Pipeline",
        config.format,
        Some(wgpu::BlendState::REPLACE),
        wgpu::PrimitiveState {
            cull_mode: None,
            ..default_primitive()
        },
        Some(depth_state(false)),
        &[TexturedVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}

pub trait DrawSky<'a> {
    fn draw_sky(
        &mut self,
        mesh: &'a SkyMesh,
        skybox: &'a Skybox,
        rotation: &'a wgpu::Buffer,
        camera_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawSky<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_sky(
        &mut self,
        mesh: &'b SkyMesh,
        skybox: &'b Skybox,
        rotation: &'b wgpu::Buffer,
        camera_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, rotation.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        self.set_bind_group(1, camera_bind_group, &[]);
        for (face, group) in skybox.bind_groups.iter().enumerate() {
            let first = face as u32 * 6;
            self.set_bind_group(0, group, &[]);
            self.draw_indexed(first..first + 6, 0, 0..1);
        }
    }
}
