//! Heightmap terrain.
//!
//! A grayscale image is turned into an altitude grid ([`Heightmap`]), every
//! grid cell gets a normal and a height-banded colour, and the grid is baked
//! once into a triangle-strip mesh ([`TerrainMesh`]) that is uploaded to the GPU
//! as an immutable [`Terrain`] and drawn unchanged every frame.

use anyhow::{Result, bail};
use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::{config::TerrainExtents, render::Flat};

/// Separates the per-row strips inside the shared index buffer.
pub const STRIP_RESTART: u32 = u32::MAX;

/// Scalar altitude per heightmap pixel, stored column-major as `[x][z]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    width: usize,
    height: usize,
    max_altitude: f32,
    altitude: Vec<f32>,
}

impl Heightmap {
    /// Decode the red channel of `img`: `altitude = red / 255 * max_altitude`.
    pub fn from_image(img: &image::DynamicImage, max_altitude: f32) -> Result<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        if width < 2 || height < 2 {
            bail!("heightmap must be at least 2x2 pixels, got {width}x{height}");
        }
        let mut altitude = Vec::with_capacity(width * height);
        for x in 0..width {
            for z in 0..height {
                let red = rgba.get_pixel(x as u32, z as u32).0[0];
                altitude.push(red as f32 / 255.0 * max_altitude);
            }
        }
        Ok(Self {
            width,
            height,
            max_altitude,
            altitude,
        })
    }

    /// Build a heightmap from raw altitudes laid out as `altitude[x * height + z]`.
    pub fn from_raw(
        width: usize,
        height: usize,
        max_altitude: f32,
        altitude: Vec<f32>,
    ) -> Result<Self> {
        if width < 2 || height < 2 {
            bail!("heightmap must be at least 2x2 cells, got {width}x{height}");
        }
        if altitude.len() != width * height {
            bail!(
                "heightmap of {width}x{height} needs {} altitudes, got {}",
                width * height,
                altitude.len()
            );
        }
        Ok(Self {
            width,
            height,
            max_altitude,
            altitude,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_altitude(&self) -> f32 {
        self.max_altitude
    }

    pub fn altitude(&self, x: usize, z: usize) -> f32 {
        self.altitude[x * self.height + z]
    }

    pub fn get(&self, x: usize, z: usize) -> Option<f32> {
        if x < self.width && z < self.height {
            Some(self.altitude(x, z))
        } else {
            None
        }
    }

    /// Surface normal of a grid cell.
    ///
    /// Interior cells use the backward difference along x and the forward
    /// difference along z. Cells on the `x = 0` or `z = height - 1` border point
    /// straight up.
    pub fn normal(&self, x: usize, z: usize) -> Vector3<f32> {
        if x == 0 || z == self.height - 1 {
            return Vector3::unit_y();
        }
        let here = self.altitude(x, z);
        let dx = here - self.altitude(x - 1, z);
        let dz = here - self.altitude(x, z + 1);
        Vector3::new(-dx, 1.0, -dz).normalize()
    }

    pub fn color(&self, x: usize, z: usize) -> [f32; 4] {
        height_color(self.altitude(x, z) / self.max_altitude)
    }
}

/// One stop of the height colour ramp.
struct Stop {
    at: f32,
    rgb: [u8; 3],
    alpha: f32,
}

const WATER: Stop = Stop { at: 0.2, rgb: [128, 128, 255], alpha: 0.7 };

/// Ascending stops. Between two stops colour and alpha are interpolated
/// linearly; below the first and above the last the colour is constant.
const RAMP: [Stop; 6] = [
    WATER,
    Stop { at: 0.38, rgb: [236, 238, 182], alpha: 1.0 },
    Stop { at: 0.45, rgb: [118, 54, 35], alpha: 1.0 },
    Stop { at: 0.7, rgb: [120, 99, 33], alpha: 1.0 },
    Stop { at: 0.8, rgb: [230, 230, 230], alpha: 1.0 },
    Stop { at: 0.85, rgb: [255, 255, 255], alpha: 1.0 },
];

fn stop_color(stop: &Stop) -> [f32; 4] {
    [
        stop.rgb[0] as f32 / 255.0,
        stop.rgb[1] as f32 / 255.0,
        stop.rgb[2] as f32 / 255.0,
        stop.alpha,
    ]
}

/// RGBA colour of a cell whose altitude is `ratio` of the maximum altitude.
pub fn height_color(ratio: f32) -> [f32; 4] {
    if ratio <= RAMP[0].at {
        return stop_color(&RAMP[0]);
    }
    for band in RAMP.windows(2) {
        let (lo, hi) = (&band[0], &band[1]);
        if ratio <= hi.at {
            let i = (ratio - lo.at) / (hi.at - lo.at);
            let (from, to) = (stop_color(lo), stop_color(hi));
            return [
                from[0] * (1.0 - i) + to[0] * i,
                from[1] * (1.0 - i) + to[1] * i,
                from[2] * (1.0 - i) + to[2] * i,
                from[3] * (1.0 - i) + to[3] * i,
            ];
        }
    }
    stop_color(&RAMP[RAMP.len() - 1])
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

impl crate::data_structures::model::Vertex for TerrainVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// CPU side of the terrain: one vertex per heightmap cell and one strip per row.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub vertices: Vec<TerrainVertex>,
    /// Strip indices, rows separated by [`STRIP_RESTART`].
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    /// Lay the heightmap out over `[-extents.width, extents.width]` on Z and
    /// `[-extents.height, extents.height]` on X.
    ///
    /// Grid index `i` runs along the image's x axis and becomes world Z, index
    /// `j` runs along the image's y axis and becomes world X.
    pub fn generate(heightmap: &Heightmap, extents: &TerrainExtents) -> Self {
        let (w, h) = (heightmap.width(), heightmap.height());
        let mut vertices = Vec::with_capacity(w * h);
        for i in 0..w {
            for j in 0..h {
                let x = j as f32 * 2.0 / (h - 1) as f32 * extents.height - extents.height;
                let z = i as f32 * 2.0 / (w - 1) as f32 * extents.width - extents.width;
                let y = heightmap.altitude(i, j) + extents.y_offset;
                vertices.push(TerrainVertex {
                    position: [x, y, z],
                    normal: heightmap.normal(i, j).into(),
                    color: heightmap.color(i, j),
                });
            }
        }

        let mut indices = Vec::with_capacity((w - 1) * (2 * h + 1));
        for i in 0..w - 1 {
            if i > 0 {
                indices.push(STRIP_RESTART);
            }
            for j in 0..h {
                indices.push((i * h + j) as u32);
                indices.push(((i + 1) * h + j) as u32);
            }
        }

        Self { vertices, indices }
    }
}

/// The baked terrain as uploaded to the GPU.
#[derive(Debug)]
pub struct Terrain {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Terrain {
    pub fn new(device: &wgpu::Device, mesh: &TerrainMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        log::info!(
            "terrain baked: {} vertices, {} strip indices",
            mesh.vertices.len(),
            mesh.indices.len()
        );
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.indices.len() as u32,
        }
    }
}

impl<'a> From<&'a Terrain> for Flat<'a> {
    fn from(terrain: &'a Terrain) -> Self {
        Flat {
            vertex: &terrain.vertex_buffer,
            index: &terrain.index_buffer,
            group: None,
            amount: terrain.num_indices as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slope(width: usize, height: usize) -> Heightmap {
        let altitude = (0..width)
            .flat_map(|x| (0..height).map(move |z| (x * 7 + z * 3) as f32 % 50.0))
            .collect();
        Heightmap::from_raw(width, height, 300.0, altitude).unwrap()
    }

    #[test]
    fn interior_normals_are_unit_and_point_up() {
        let map = slope(6, 5);
        for x in 1..map.width() {
            for z in 0..map.height() - 1 {
                let n = map.normal(x, z);
                assert!((n.magnitude() - 1.0).abs() < 1e-5, "normal at ({x},{z}) is {n:?}");
                assert!(n.y > 0.0);
            }
        }
    }

    #[test]
    fn border_normals_point_straight_up() {
        let map = slope(4, 4);
        for z in 0..4 {
            assert_eq!(map.normal(0, z), Vector3::unit_y());
        }
        for x in 0..4 {
            assert_eq!(map.normal(x, 3), Vector3::unit_y());
        }
    }

    #[test]
    fn interior_normal_uses_backward_x_and_forward_z() {
        let altitude = vec![
            0.0, 0.0, 0.0, // x = 0
            2.0, 1.0, 0.0, // x = 1
        ];
        let map = Heightmap::from_raw(2, 3, 300.0, altitude).unwrap();
        let n = map.normal(1, 0);
        // dx = 2 - 0, dz = 2 - 1
        let expected = Vector3::new(-2.0, 1.0, -1.0).normalize();
        assert!((n - expected).magnitude() < 1e-6);
    }

    #[test]
    fn ramp_is_continuous_at_band_boundaries() {
        for boundary in [0.2, 0.38, 0.45, 0.7, 0.8, 0.85] {
            let below = height_color(boundary - 1e-5);
            let above = height_color(boundary + 1e-5);
            for c in 0..4 {
                assert!(
                    (below[c] - above[c]).abs() < 1e-3,
                    "discontinuity at {boundary}: {below:?} vs {above:?}"
                );
            }
        }
    }

    #[test]
    fn ramp_end_points() {
        assert_eq!(height_color(0.0), [128.0 / 255.0, 128.0 / 255.0, 1.0, 0.7]);
        assert_eq!(height_color(0.9), [1.0, 1.0, 1.0, 1.0]);
        let grass = height_color(0.38);
        assert!((grass[0] - 236.0 / 255.0).abs() < 1e-6);
        assert!((grass[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn water_alpha_rises_towards_the_shore() {
        let shallow = height_color(0.3)[3];
        assert!(shallow > 0.7 && shallow < 1.0);
    }

    #[test]
    fn mesh_spans_extents_and_applies_offset() {
        let map = slope(3, 5);
        let extents = TerrainExtents {
            width: 100.0,
            height: 50.0,
            y_offset: -10.0,
        };
        let mesh = TerrainMesh::generate(&map, &extents);
        assert_eq!(mesh.vertices.len(), 15);
        let first = mesh.vertices[0].position;
        let last = mesh.vertices[14].position;
        assert_eq!(first, [-50.0, map.altitude(0, 0) - 10.0, -100.0]);
        assert_eq!(last, [50.0, map.altitude(2, 4) - 10.0, 100.0]);
    }

    #[test]
    fn one_strip_per_row() {
        let map = slope(4, 3);
        let mesh = TerrainMesh::generate(&map, &TerrainExtents::default());
        let strips: Vec<&[u32]> = mesh.indices.split(|&i| i == STRIP_RESTART).collect();
        assert_eq!(strips.len(), 3);
        for (row, strip) in strips.iter().enumerate() {
            assert_eq!(strip.len(), 6);
            assert_eq!(strip[0] as usize, row * 3);
            assert_eq!(strip[1] as usize, (row + 1) * 3);
        }
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert!(Heightmap::from_raw(1, 4, 300.0, vec![0.0; 4]).is_err());
        assert!(Heightmap::from_raw(2, 2, 300.0, vec![0.0; 3]).is_err());
    }
}
