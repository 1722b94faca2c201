//! Per-instance transforms for the dragons and the sky.
//!
//! An [`Instance`] is position, rotation and scale; [`InstanceRaw`] is the same
//! transform packed for a vertex buffer with instance step mode. Instances
//! compose with `*` like nested model matrices, which is how the orbiting
//! dragons are built from a turn around the world axis and a local offset.

use std::ops::Mul;

use cgmath::{One, Rotation3};
use wgpu::util::DeviceExt;

use crate::data_structures::model;

/// Translation, rotation and scale, applied as `T · R · S`.
#[derive(Clone, Debug)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A pure turn of `angle` degrees around the world Y axis.
    pub fn turn_y(angle: f32) -> Self {
        Self {
            rotation: cgmath::Quaternion::from_angle_y(cgmath::Deg(angle)),
            ..Self::new()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = cgmath::Vector3::new(scale, scale, scale);
        self
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// The packed instance as stored in the instance buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

/// Locations 8 to 14: the model matrix as four columns and the normal matrix as
/// three. Vertex attributes of the meshes stay below 8.
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // normal matrix
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 13,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 14,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Vertex buffer holding `instances`, writable for per-frame updates.
pub fn mk_instance_buffer(device: &wgpu::Device, instances: &[Instance], label: &str) -> wgpu::Buffer {
    let raw: Vec<InstanceRaw> = instances.iter().map(Instance::to_raw).collect();
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&raw),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    })
}

#[cfg(test)]
mod tests {
    use cgmath::{Matrix4, Vector3, Vector4};

    use super::*;

    fn assert_matrix_eq(a: Matrix4<f32>, b: Matrix4<f32>) {
        let a: [[f32; 4]; 4] = a.into();
        let b: [[f32; 4]; 4] = b.into();
        for (col_a, col_b) in a.iter().zip(b.iter()) {
            for (x, y) in col_a.iter().zip(col_b.iter()) {
                assert!((x - y).abs() < 1e-4, "{a:?} != {b:?}");
            }
        }
    }

    #[test]
    fn product_matches_nested_matrices() {
        let outer = Instance::turn_y(30.0).with_uniform_scale(2.5);
        let inner = Instance {
            position: Vector3::new(100.0, -20.0, 40.0),
            ..Instance::turn_y(90.0)
        };
        assert_matrix_eq(
            (&outer * &inner).to_matrix(),
            outer.to_matrix() * inner.to_matrix(),
        );
    }

    #[test]
    fn raw_packs_model_and_normal_matrices_only() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), (16 + 9) * 4);
        let raw = Instance::turn_y(45.0).with_uniform_scale(3.0).to_raw();
        let moved: Vector4<f32> = Matrix4::from(raw.model) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(moved, Vector4::new(0.0, 0.0, 0.0, 1.0));
    }
}
