use wgpu::util::DeviceExt;

use crate::{
    data_structures::model::{TexturedVertex, Vertex},
    pipelines::basic::{default_primitive, depth_state, mk_render_pipeline},
    render::Flat,
};

/// Corners of a quad covering the whole viewport, in clip space.
pub fn fullscreen_quad() -> ([TexturedVertex; 4], [u16; 6]) {
    let vertex = |x: f32, y: f32, u: f32, v: f32| TexturedVertex {
        position: [x, y, 0.0],
        tex_coords: [u, v],
    };
    (
        [
            vertex(-1.0, -1.0, 0.0, 1.0),
            vertex(1.0, -1.0, 1.0, 1.0),
            vertex(1.0, 1.0, 1.0, 0.0),
            vertex(-1.0, 1.0, 0.0, 0.0),
        ],
        [0, 1, 2, 0, 2, 3],
    )
}

/// A textured full screen overlay such as the main menu.
#[derive(Debug)]
pub struct Overlay {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, bind_group: wgpu::BindGroup) -> Self {
        let (vertices, indices) = fullscreen_quad();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Overlay Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            bind_group,
        }
    }
}

impl<'a> From<&'a Overlay> for Flat<'a> {
    fn from(overlay: &'a Overlay) -> Self {
        Flat {
            vertex: &overlay.vertex_buffer,
            index: &overlay.index_buffer,
            group: Some(&overlay.bind_group),
            amount: 6,
        }
    }
}

/// Unlit overlays drawn on top of everything else.
pub fn mk_gui_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    texture_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Menu Render Pipeline Layout"),
        bind_group_layouts: &[Some(texture_bind_group_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Menu Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("gui.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        "Menu Render Pipeline",
        config.format,
        Some(wgpu::BlendState {
            color: wgpu::BlendComponent::OVER,
            alpha: wgpu::BlendComponent::OVER,
        }),
        default_primitive(),
        Some(depth_state(false)),
        &[TexturedVertex::desc()],
        shader,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quad_is_counter_clockwise_and_covers_the_viewport() {
        let (vertices, indices) = fullscreen_quad();
        let [a, b, c] = [0, 1, 2].map(|i| vertices[indices[i] as usize].position);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(cross > 0.0);
        assert!(vertices.iter().all(|v| v.position[0].abs() == 1.0 && v.position[1].abs() == 1.0));
        // The image's top row lands at the top of the screen.
        assert_eq!(vertices[3].tex_coords, [0.0, 0.0]);
    }
}
