//! Skybox built from a single cross-layout image.
//!
//! The image is a 4×3 grid: the top face sits in the second column of the first
//! row, the four sides fill the middle row and the bottom face is below the
//! top one. Each face becomes its own texture; all skyboxes share one cube mesh
//! and differ only in their bind groups.

use anyhow::{Result, bail};
use wgpu::util::DeviceExt;

use crate::data_structures::{
    model::TexturedVertex,
    texture::{Texture, Wrap},
};

/// Pixel rectangle `(x, y, width, height)` of one face inside the cross image.
pub type FaceRect = (u32, u32, u32, u32);

/// Face rectangles in draw order: top, the four sides, bottom.
pub fn cross_faces(image_width: u32, image_height: u32) -> [FaceRect; 6] {
    let w = image_width / 4;
    let h = image_height / 3;
    [
        (w, 0, w, h),
        (0, h, w, h),
        (w, h, w, h),
        (2 * w, h, w, h),
        (3 * w, h, w, h),
        (w, 2 * h, w, h),
    ]
}

/// Cut a cross image into its six faces.
pub fn split_cross(img: &image::DynamicImage) -> Result<[image::DynamicImage; 6]> {
    if img.width() < 4 || img.height() < 3 {
        bail!(
            "skybox image of {}x{} is too small for a 4x3 cross",
            img.width(),
            img.height()
        );
    }
    Ok(cross_faces(img.width(), img.height()).map(|(x, y, w, h)| img.crop_imm(x, y, w, h)))
}

fn quad(corners: [[f32; 3]; 4], uvs: [[f32; 2]; 4]) -> [TexturedVertex; 4] {
    [0, 1, 2, 3].map(|i| TexturedVertex {
        position: corners[i],
        tex_coords: uvs[i],
    })
}

/// Cube of half width `width` spanning `[down, up]` vertically, four vertices
/// and six indices per face in the order of [`cross_faces`].
pub fn box_geometry(width: f32, up: f32, down: f32) -> (Vec<TexturedVertex>, Vec<u16>) {
    let w = width;
    let faces = [
        quad(
            [[-w, up, -w], [w, up, -w], [w, up, w], [-w, up, w]],
            [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        ),
        quad(
            [[-w, down, -w], [w, down, -w], [w, up, -w], [-w, up, -w]],
            [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        ),
        quad(
            [[-w, down, -w], [-w, up, -w], [-w, up, w], [-w, down, w]],
            [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        ),
        quad(
            [[-w, down, w], [-w, up, w], [w, up, w], [w, down, w]],
            [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        ),
        quad(
            [[w, down, -w], [w, down, w], [w, up, w], [w, up, -w]],
            [[1.0, 1.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        ),
        quad(
            [[-w, down, -w], [-w, down, w], [w, down, w], [w, down, -w]],
            [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        ),
    ];
    let vertices: Vec<TexturedVertex> = faces.into_iter().flatten().collect();
    let indices = (0..6u16)
        .flat_map(|face| [0, 1, 2, 0, 2, 3].map(|i| face * 4 + i))
        .collect();
    (vertices, indices)
}

/// Cube geometry shared by every skybox.
#[derive(Debug)]
pub struct SkyMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
}

impl SkyMesh {
    pub fn new(device: &wgpu::Device, width: f32, up: f32, down: f32) -> Self {
        let (vertices, indices) = box_geometry(width, up, down);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sky Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
        }
    }
}

/// The six face textures of one skybox and their bind groups.
#[derive(Debug)]
pub struct Skybox {
    pub name: String,
    pub faces: Vec<Texture>,
    pub bind_groups: Vec<wgpu::BindGroup>,
}

impl Skybox {
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        img: &image::DynamicImage,
        name: &str,
    ) -> Result<Self> {
        let mut faces = Vec::with_capacity(6);
        let mut bind_groups = Vec::with_capacity(6);
        for (idx, face) in split_cross(img)?.iter().enumerate() {
            let label = format!("{name} face {idx}");
            let texture = Texture::from_image(device, queue, face, Some(&label), Wrap::Clamp)?;
            bind_groups.push(texture.bind_group(device, layout, &label));
            faces.push(texture);
        }
        log::info!("skybox {name} loaded");
        Ok(Self {
            name: name.to_string(),
            faces,
            bind_groups,
        })
    }
}
