//! Drawable models loaded from OBJ files.
//!
//! [`assemble`] flattens a parsed [`ObjModel`] into one vertex per face corner.
//! Material colours are baked into every vertex so that the whole dragon can be
//! drawn with a handful of draw calls; only the material textures still need a
//! bind group switch, which happens between [`DrawRange`]s.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::Texture,
    resources::{
        mtl::{MaterialDesc, TextureSlot},
        obj::{IndexKind, ObjError, ObjModel},
    },
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Set in `params[3]` when the vertex carries a normal from the file.
pub const HAS_NORMAL: u32 = 1;
/// Set in `params[3]` when the vertex carries a texture coordinate.
pub const HAS_TEX_COORDS: u32 = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub ambient: [f32; 3],
    /// dissolve, shininess, illumination model and attribute flags.
    pub params: [f32; 4],
}

impl ModelVertex {
    pub fn flags(&self) -> u32 {
        self.params[3] as u32
    }
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 14]>() as wgpu::BufferAddress,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 17]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Position and texture coordinates only; used by the skybox and the menu quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for TexturedVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TexturedVertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// A run of consecutive vertices sharing one material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawRange {
    pub vertices: Range<u32>,
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    pub vertices: Vec<ModelVertex>,
    pub ranges: Vec<DrawRange>,
}

fn lookup<T: Copy>(list: &[T], kind: IndexKind, index: u32) -> Result<T, ObjError> {
    index
        .checked_sub(1)
        .and_then(|i| list.get(i as usize))
        .copied()
        .ok_or(ObjError::IndexOutOfRange {
            kind,
            index,
            len: list.len(),
        })
}

/// Flatten the parsed model into a non-indexed vertex list.
///
/// Every face contributes three vertices in face order. Texture coordinates are
/// flipped vertically because OBJ puts `v = 0` at the bottom of the image.
pub fn assemble(obj: &ObjModel) -> Result<DrawList, ObjError> {
    let default_material = MaterialDesc::default();
    let mut list = DrawList {
        vertices: Vec::with_capacity(obj.faces.len() * 3),
        ranges: Vec::new(),
    };

    for face in &obj.faces {
        let material = match face.material {
            None => &default_material,
            Some(idx) => obj
                .materials
                .get(idx)
                .ok_or(ObjError::IndexOutOfRange {
                    kind: IndexKind::Material,
                    index: idx as u32,
                    len: obj.materials.len(),
                })?,
        };

        let mut flags = 0;
        if face.normals.is_some() {
            flags |= HAS_NORMAL;
        }
        if face.tex_coords.is_some() {
            flags |= HAS_TEX_COORDS;
        }

        for corner in 0..3 {
            let position = lookup(&obj.positions, IndexKind::Position, face.vertices[corner])?;
            let tex_coords = match face.tex_coords {
                Some(idx) => {
                    let [u, v] = lookup(&obj.tex_coords, IndexKind::TexCoord, idx[corner])?;
                    [u, 1.0 - v]
                }
                None => [0.0, 0.0],
            };
            let normal = match face.normals {
                Some(idx) => lookup(&obj.normals, IndexKind::Normal, idx[corner])?,
                None => [0.0, 0.0, 0.0],
            };
            list.vertices.push(ModelVertex {
                position,
                tex_coords,
                normal,
                diffuse: material.diffuse,
                specular: material.specular,
                ambient: material.ambient,
                params: [
                    material.dissolve,
                    material.shininess,
                    material.illum as f32,
                    flags as f32,
                ],
            });
        }

        let end = list.vertices.len() as u32;
        match list.ranges.last_mut() {
            Some(range) if range.material == face.material => range.vertices.end = end,
            _ => list.ranges.push(DrawRange {
                vertices: end - 3..end,
                material: face.material,
            }),
        }
    }
    Ok(list)
}

/// A material on the GPU: its description and one bind group over all five
/// texture slots. Empty slots are filled with a white texel.
#[derive(Debug)]
pub struct Material {
    pub desc: MaterialDesc,
    pub textures: [Option<Texture>; 5],
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        desc: MaterialDesc,
        textures: [Option<Texture>; 5],
        blank: &Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let bound: Vec<&Texture> = TextureSlot::ALL
            .iter()
            .map(|slot| textures[*slot as usize].as_ref().unwrap_or(blank))
            .collect();
        let samplers: Vec<wgpu::Sampler> = bound
            .iter()
            .map(|texture| {
                texture
                    .sampler
                    .clone()
                    .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device))
            })
            .collect();
        let entries: Vec<wgpu::BindGroupEntry> = bound
            .iter()
            .zip(&samplers)
            .enumerate()
            .flat_map(|(slot, (texture, sampler))| {
                [
                    wgpu::BindGroupEntry {
                        binding: 2 * slot as u32,
                        resource: wgpu::BindingResource::TextureView(&texture.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2 * slot as u32 + 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ]
            })
            .collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &entries,
            label: Some(&desc.name),
        });
        Self {
            desc,
            textures,
            bind_group,
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub num_vertices: u32,
    pub ranges: Vec<DrawRange>,
    pub materials: Vec<Material>,
    /// Bound for faces that appear before any `usemtl`.
    pub default_material: Material,
}

impl Model {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        list: DrawList,
        materials: Vec<Material>,
        default_material: Material,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&list.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        log::info!(
            "model {name}: {} vertices in {} material runs",
            list.vertices.len(),
            list.ranges.len()
        );
        Self {
            name: name.to_string(),
            vertex_buffer,
            num_vertices: list.vertices.len() as u32,
            ranges: list.ranges,
            materials,
            default_material,
        }
    }

    pub fn material(&self, idx: Option<usize>) -> &Material {
        idx.and_then(|i| self.materials.get(i))
            .unwrap_or(&self.default_material)
    }
}

pub trait DrawModel<'a> {
    fn draw_model_instanced(
        &mut self,
        model: &'a Model,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_model_instanced(
        &mut self,
        model: &'b Model,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, model.vertex_buffer.slice(..));
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        for range in &model.ranges {
            self.set_bind_group(0, &model.material(range.material).bind_group, &[]);
            self.draw(range.vertices.clone(), instances.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{
        mtl::MaterialLibrary,
        obj::{Face, ObjModel},
    };

    fn face(vertices: [u32; 3], material: Option<usize>) -> Face {
        Face {
            vertices,
            tex_coords: None,
            normals: None,
            material,
        }
    }

    fn quad_model() -> ObjModel {
        ObjModel {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            tex_coords: vec![[0.0, 0.0], [1.0, 0.25]],
            normals: vec![[0.0, 0.0, 1.0]],
            faces: vec![face([1, 2, 3], None), face([1, 3, 4], None)],
            materials: MaterialLibrary::default(),
        }
    }

    #[test]
    fn emits_three_vertices_per_face_in_order() {
        let list = assemble(&quad_model()).unwrap();
        let positions: Vec<_> = list.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ]
        );
    }

    #[test]
    fn faces_without_material_use_defaults() {
        let list = assemble(&quad_model()).unwrap();
        let defaults = MaterialDesc::default();
        for v in &list.vertices {
            assert_eq!(v.diffuse, defaults.diffuse);
            assert_eq!(v.ambient, defaults.ambient);
            assert_eq!(v.params[0], 1.0);
            assert_eq!(v.flags(), 0);
        }
        assert_eq!(
            list.ranges,
            vec![DrawRange {
                vertices: 0..6,
                material: None
            }]
        );
    }

    #[test]
    fn attributes_are_looked_up_one_based() {
        let mut obj = quad_model();
        obj.faces = vec![Face {
            vertices: [1, 2, 3],
            tex_coords: Some([2, 1, 2]),
            normals: Some([1, 1, 1]),
            material: None,
        }];
        let list = assemble(&obj).unwrap();
        assert_eq!(list.vertices[0].tex_coords, [1.0, 0.75]);
        assert_eq!(list.vertices[1].tex_coords, [0.0, 1.0]);
        assert_eq!(list.vertices[2].normal, [0.0, 0.0, 1.0]);
        assert_eq!(list.vertices[0].flags(), HAS_NORMAL | HAS_TEX_COORDS);
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        let mut obj = quad_model();
        obj.faces = vec![face([1, 2, 5], None)];
        let err = assemble(&obj).unwrap_err();
        assert!(matches!(
            err,
            ObjError::IndexOutOfRange {
                kind: IndexKind::Position,
                index: 5,
                len: 4
            }
        ));

        obj.faces = vec![face([0, 1, 2], None)];
        assert!(assemble(&obj).is_err());

        obj.faces = vec![Face {
            normals: Some([1, 2, 1]),
            ..face([1, 2, 3], None)
        }];
        let err = assemble(&obj).unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { kind: IndexKind::Normal, .. }));
    }

    #[test]
    fn consecutive_faces_share_a_range() {
        let mut obj = quad_model();
        obj.materials = crate::resources::mtl::parse_mtl("newmtl A\nKd 1 0 0\nnewmtl B\n".as_bytes())
            .unwrap();
        obj.faces = vec![
            face([1, 2, 3], Some(0)),
            face([1, 3, 4], Some(0)),
            face([1, 2, 3], Some(1)),
            face([1, 2, 3], None),
            face([1, 3, 4], Some(0)),
        ];
        let list = assemble(&obj).unwrap();
        let ranges: Vec<_> = list.ranges.iter().map(|r| (r.vertices.clone(), r.material)).collect();
        assert_eq!(
            ranges,
            vec![
                (0..6, Some(0)),
                (6..9, Some(1)),
                (9..12, None),
                (12..15, Some(0)),
            ]
        );
        assert_eq!(list.vertices[0].diffuse, [1.0, 0.0, 0.0]);
        assert_eq!(list.vertices[6].diffuse, [0.8; 3]);
    }

    #[test]
    fn unknown_material_index_is_an_error() {
        let mut obj = quad_model();
        obj.faces = vec![face([1, 2, 3], Some(3))];
        let err = assemble(&obj).unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { kind: IndexKind::Material, index: 3, len: 0 }));
    }
}
