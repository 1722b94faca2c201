use std::io::{BufReader, Cursor};

use anyhow::Context;

use crate::{
    data_structures::{
        model::{self, Material},
        texture::{Texture, Wrap},
    },
    resources::{
        mtl::{MaterialDesc, TextureSlot},
        texture::{load_string, load_texture},
    },
};

/**
 * This module contains all logic for loading mesh/textures/etc. from external files.
 */
pub mod mtl;
pub mod obj;
pub mod texture;

/// Load the texture maps a material names, in slot order.
async fn load_material_textures(
    desc: &MaterialDesc,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<[Option<Texture>; 5]> {
    let mut textures: [Option<Texture>; 5] = Default::default();
    for slot in TextureSlot::ALL {
        if let Some(file_name) = desc.texture_map(slot) {
            let texture = load_texture(file_name, device, queue, Wrap::Repeat)
                .await
                .with_context(|| format!("material {}: missing {:?} map", desc.name, slot))?;
            textures[slot as usize] = Some(texture);
        }
    }
    Ok(textures)
}

/// Load an OBJ model, its material libraries and every texture they reference.
pub async fn load_model_obj(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<model::Model> {
    let obj_text = load_string(file_name)
        .await
        .with_context(|| format!("could not read model {file_name}"))?;
    let obj_reader = BufReader::new(Cursor::new(obj_text));

    let obj = obj::load_obj_buf_async(obj_reader, |p| async move { load_string(&p).await })
        .await
        .with_context(|| format!("could not parse model {file_name}"))?;
    let list = model::assemble(&obj).with_context(|| format!("invalid model {file_name}"))?;

    let blank = Texture::create_solid([255, 255, 255, 255], device, queue, "blank texel");
    let mut materials = Vec::with_capacity(obj.materials.len());
    for desc in obj.materials.materials {
        let textures = load_material_textures(&desc, device, queue).await?;
        materials.push(Material::new(device, desc, textures, &blank, layout));
    }
    let default_material = Material::new(
        device,
        MaterialDesc::default(),
        Default::default(),
        &blank,
        layout,
    );

    Ok(model::Model::new(
        device,
        file_name,
        list,
        materials,
        default_material,
    ))
}
