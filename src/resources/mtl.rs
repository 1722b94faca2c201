//! Wavefront material library (`.mtl`) parsing.
//!
//! Only the records the dragon models use are understood: colours, dissolve,
//! shininess, transparency, illumination model and the five texture maps.
//! Texture maps are recorded by file name; [`crate::resources::load_model_obj`]
//! loads the images right after the library is parsed.

use std::{collections::HashMap, io::BufRead};

use crate::resources::obj::{ObjError, parse_f32, parse_u32};

/// Texture map slots in the order the shader expects them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse = 0,
    Specular = 1,
    Ambient = 2,
    Dissolve = 3,
    Shininess = 4,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 5] = [
        TextureSlot::Diffuse,
        TextureSlot::Specular,
        TextureSlot::Ambient,
        TextureSlot::Dissolve,
        TextureSlot::Shininess,
    ];

    fn from_record(record: &str) -> Option<Self> {
        match record {
            "map_Kd" => Some(TextureSlot::Diffuse),
            "map_Ks" => Some(TextureSlot::Specular),
            "map_Ka" => Some(TextureSlot::Ambient),
            "map_d" => Some(TextureSlot::Dissolve),
            "map_Ns" => Some(TextureSlot::Shininess),
            _ => None,
        }
    }
}

/// Material attributes as read from the library, before any GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDesc {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub dissolve: f32,
    pub shininess: f32,
    pub transparency: f32,
    pub illum: u32,
    /// File names of the texture maps, indexed by [`TextureSlot`].
    pub texture_maps: [Option<String>; 5],
}

impl MaterialDesc {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn texture_map(&self, slot: TextureSlot) -> Option<&str> {
        self.texture_maps[slot as usize].as_deref()
    }
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: [0.2; 3],
            diffuse: [0.8; 3],
            specular: [0.0; 3],
            dissolve: 1.0,
            shininess: 0.0,
            transparency: 0.0,
            illum: 2,
            texture_maps: Default::default(),
        }
    }
}

/// All materials of one `.mtl` file plus the name lookup used by `usemtl`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<MaterialDesc>,
    index: HashMap<String, usize>,
}

impl MaterialLibrary {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, idx: usize) -> Option<&MaterialDesc> {
        self.materials.get(idx)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    fn push(&mut self, material: MaterialDesc) {
        self.index.insert(material.name.clone(), self.materials.len());
        self.materials.push(material);
    }

    /// Merge another library; its materials are appended after ours.
    pub fn extend(&mut self, other: MaterialLibrary) {
        for material in other.materials {
            self.push(material);
        }
    }
}

fn parse_color(line: usize, record: &str, values: &[&str]) -> Result<[f32; 3], ObjError> {
    match values {
        [] => Err(ObjError::MissingToken {
            line,
            record: record.to_string(),
        }),
        [grey] => {
            let grey = parse_f32(line, grey)?;
            Ok([grey; 3])
        }
        [r, g, b, ..] => Ok([parse_f32(line, r)?, parse_f32(line, g)?, parse_f32(line, b)?]),
        [_, _] => Err(ObjError::MissingToken {
            line,
            record: record.to_string(),
        }),
    }
}

fn first<'a>(line: usize, record: &str, values: &[&'a str]) -> Result<&'a str, ObjError> {
    values.first().copied().ok_or_else(|| ObjError::MissingToken {
        line,
        record: record.to_string(),
    })
}

/// Parse a material library.
///
/// Materials are numbered from 0 in the order their `newmtl` records appear.
pub fn parse_mtl<R: BufRead>(reader: R) -> Result<MaterialLibrary, ObjError> {
    let mut library = MaterialLibrary::default();
    let mut current: Option<MaterialDesc> = None;

    for (number, text) in reader.lines().enumerate() {
        let text = text?;
        let line = number + 1;
        let mut tokens = text.split_whitespace();
        let Some(record) = tokens.next() else {
            continue;
        };
        if record.starts_with('#') {
            continue;
        }
        let values: Vec<&str> = tokens.collect();

        if record == "newmtl" {
            let name = first(line, record, &values)?;
            if let Some(done) = current.replace(MaterialDesc::named(name)) {
                library.push(done);
            }
            continue;
        }

        let Some(material) = current.as_mut() else {
            log::warn!("mtl line {line}: `{record}` before any newmtl is ignored");
            continue;
        };
        match record {
            "Ns" => material.shininess = parse_f32(line, first(line, record, &values)?)?,
            "d" => material.dissolve = parse_f32(line, first(line, record, &values)?)?,
            "Tr" => material.transparency = parse_f32(line, first(line, record, &values)?)?,
            "illum" => material.illum = parse_u32(line, first(line, record, &values)?)?,
            "Kd" => material.diffuse = parse_color(line, record, &values)?,
            "Ks" => material.specular = parse_color(line, record, &values)?,
            "Ka" => material.ambient = parse_color(line, record, &values)?,
            other => match TextureSlot::from_record(other) {
                // Map options may precede the file name, which always comes last.
                Some(slot) => {
                    let file = values.last().ok_or_else(|| ObjError::MissingToken {
                        line,
                        record: record.to_string(),
                    })?;
                    material.texture_maps[slot as usize] = Some(file.to_string());
                }
                None => log::debug!("mtl line {line}: skipping `{other}`"),
            },
        }
    }
    if let Some(done) = current {
        library.push(done);
    }
    Ok(library)
}
