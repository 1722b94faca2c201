//! Wavefront geometry (`.obj`) parsing.
//!
//! The parser keeps the four attribute lists of the file (positions, texture
//! coordinates, normals and faces) exactly as written; indices stay 1-based so
//! that [`crate::data_structures::model::assemble`] can bounds check them
//! against the final lists. Material libraries referenced by `mtllib` are
//! fetched through a caller supplied loader so that native and wasm builds
//! can share the parser.

use std::{fmt, future::Future, io::BufRead};

use thiserror::Error;

use crate::resources::mtl::{MaterialLibrary, parse_mtl};

/// Attribute a face index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    Position,
    TexCoord,
    Normal,
    Material,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Position => write!(f, "position"),
            IndexKind::TexCoord => write!(f, "texture coordinate"),
            IndexKind::Normal => write!(f, "normal"),
            IndexKind::Material => write!(f, "material"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read model source")]
    Io(#[from] std::io::Error),
    #[error("line {line}: `{record}` record is missing a value")]
    MissingToken { line: usize, record: String },
    #[error("line {line}: `{token}` is not a valid number")]
    InvalidNumber { line: usize, token: String },
    #[error("line {line}: only triangles are supported, face has {count} vertices")]
    UnsupportedFace { line: usize, count: usize },
    #[error("line {line}: face vertex `{token}` lacks an attribute the first vertex has")]
    MalformedFace { line: usize, token: String },
    #[error("line {line}: material `{name}` is not defined")]
    UnknownMaterial { line: usize, name: String },
    #[error("{kind} index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        kind: IndexKind,
        index: u32,
        len: usize,
    },
    #[error("failed to load material library `{name}`")]
    MaterialLibrary {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// One triangle. All indices are 1-based as in the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face {
    pub vertices: [u32; 3],
    pub tex_coords: Option<[u32; 3]>,
    pub normals: Option<[u32; 3]>,
    /// Index into [`ObjModel::materials`], `None` before the first `usemtl`.
    pub material: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjModel {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
    pub materials: MaterialLibrary,
}

pub(crate) fn parse_f32(line: usize, token: &str) -> Result<f32, ObjError> {
    token.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

pub(crate) fn parse_u32(line: usize, token: &str) -> Result<u32, ObjError> {
    token.parse().map_err(|_| ObjError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

fn parse_floats<const N: usize>(
    line: usize,
    record: &str,
    values: &[&str],
) -> Result<[f32; N], ObjError> {
    if values.len() < N {
        return Err(ObjError::MissingToken {
            line,
            record: record.to_string(),
        });
    }
    let mut out = [0.0; N];
    for (slot, token) in out.iter_mut().zip(values) {
        *slot = parse_f32(line, token)?;
    }
    Ok(out)
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn` split into its optional parts.
fn split_vertex(token: &str) -> [Option<&str>; 3] {
    let mut parts = token.split('/');
    let mut next = || parts.next().filter(|part| !part.is_empty());
    [next(), next(), next()]
}

type FaceIndices = ([u32; 3], Option<[u32; 3]>, Option<[u32; 3]>);

fn parse_face(line: usize, records: &[&str]) -> Result<FaceIndices, ObjError> {
    if records.len() != 3 {
        return Err(ObjError::UnsupportedFace {
            line,
            count: records.len(),
        });
    }
    let layout = split_vertex(records[0]);
    let mut vertices = [0; 3];
    let mut tex_coords = layout[1].map(|_| [0; 3]);
    let mut normals = layout[2].map(|_| [0; 3]);

    for (i, record) in records.iter().enumerate() {
        let parts = split_vertex(record);
        let malformed = || ObjError::MalformedFace {
            line,
            token: record.to_string(),
        };
        vertices[i] = parse_u32(line, parts[0].ok_or_else(malformed)?)?;
        if let Some(tex_coords) = tex_coords.as_mut() {
            tex_coords[i] = parse_u32(line, parts[1].ok_or_else(malformed)?)?;
        }
        if let Some(normals) = normals.as_mut() {
            normals[i] = parse_u32(line, parts[2].ok_or_else(malformed)?)?;
        }
    }
    Ok((vertices, tex_coords, normals))
}

/// Parse an OBJ file.
///
/// `material_loader` receives the file name of every `mtllib` record and
/// returns the library's text. Materials of all libraries share one index
/// space in the order they were loaded.
pub async fn load_obj_buf_async<R, F, Fut>(
    reader: R,
    mut material_loader: F,
) -> Result<ObjModel, ObjError>
where
    R: BufRead,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = anyhow::Result<String>>,
{
    let mut model = ObjModel::default();
    let mut material = None;

    for (number, text) in reader.lines().enumerate() {
        let text = text?;
        let line = number + 1;
        let mut tokens = text.split_whitespace();
        let Some(record) = tokens.next() else {
            continue;
        };
        let values: Vec<&str> = tokens.collect();
        match record {
            "v" => model.positions.push(parse_floats(line, record, &values)?),
            "vt" => model.tex_coords.push(parse_floats(line, record, &values)?),
            "vn" => model.normals.push(parse_floats(line, record, &values)?),
            "f" => {
                let (vertices, tex_coords, normals) = parse_face(line, &values)?;
                model.faces.push(Face {
                    vertices,
                    tex_coords,
                    normals,
                    material,
                });
            }
            "usemtl" => {
                let name = values.first().ok_or_else(|| ObjError::MissingToken {
                    line,
                    record: record.to_string(),
                })?;
                let idx = model.materials.index_of(name).ok_or_else(|| {
                    ObjError::UnknownMaterial {
                        line,
                        name: name.to_string(),
                    }
                })?;
                material = Some(idx);
            }
            "mtllib" => {
                let name = values.first().ok_or_else(|| ObjError::MissingToken {
                    line,
                    record: record.to_string(),
                })?;
                let text = material_loader(name.to_string()).await.map_err(|e| {
                    ObjError::MaterialLibrary {
                        name: name.to_string(),
                        source: e.into(),
                    }
                })?;
                let library = parse_mtl(text.as_bytes())?;
                log::debug!("loaded {} materials from {}", library.len(), name);
                model.materials.extend(library);
            }
            comment if comment.starts_with('#') => {}
            other => log::trace!("obj line {line}: skipping `{other}`"),
        }
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use futures::executor::block_on;

    use super::*;

    const TRIANGLE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
vn 0 0 1
vn 0 0 1
";

    fn parse(text: &str) -> Result<ObjModel, ObjError> {
        block_on(load_obj_buf_async(Cursor::new(text), |name| async move {
            match name.as_str() {
                "two.mtl" => Ok("newmtl A\nKd 1 0 0\nnewmtl B\nKd 0 1 0\n".to_string()),
                _ => anyhow::bail!("no such library {name}"),
            }
        }))
    }

    #[test]
    fn parses_full_face() {
        let model = parse(&format!("{TRIANGLE}f 1/1/1 2/2/2 3/3/3\n")).unwrap();
        assert_eq!(model.positions.len(), 3);
        assert_eq!(model.tex_coords.len(), 3);
        assert_eq!(model.normals.len(), 3);
        let face = &model.faces[0];
        assert_eq!(face.vertices, [1, 2, 3]);
        assert_eq!(face.tex_coords, Some([1, 2, 3]));
        assert_eq!(face.normals, Some([1, 2, 3]));
        assert_eq!(face.material, None);
    }

    #[test]
    fn missing_attributes_follow_first_vertex() {
        let model = parse(&format!("{TRIANGLE}f 1//1 2//2 3//3\nf 1 2 3\n")).unwrap();
        assert_eq!(model.faces[0].tex_coords, None);
        assert_eq!(model.faces[0].normals, Some([1, 2, 3]));
        assert_eq!(model.faces[1].tex_coords, None);
        assert_eq!(model.faces[1].normals, None);
    }

    #[test]
    fn faces_use_material_index_in_library_order() {
        let text = format!("mtllib two.mtl\n{TRIANGLE}f 1 2 3\nusemtl B\nf 1 2 3\nusemtl A\nf 3 2 1\n");
        let model = parse(&text).unwrap();
        assert_eq!(model.materials.len(), 2);
        let materials: Vec<_> = model.faces.iter().map(|f| f.material).collect();
        assert_eq!(materials, vec![None, Some(1), Some(0)]);
    }

    #[test]
    fn unknown_material_is_an_error() {
        let err = parse(&format!("mtllib two.mtl\n{TRIANGLE}usemtl C\n")).unwrap_err();
        assert!(matches!(err, ObjError::UnknownMaterial { line: 11, ref name } if name == "C"));
    }

    #[test]
    fn usemtl_without_library_is_an_error() {
        let err = parse("usemtl A\n").unwrap_err();
        assert!(matches!(err, ObjError::UnknownMaterial { line: 1, .. }));
    }

    #[test]
    fn quads_are_rejected() {
        let err = parse("v 0 0 0\nf 1 1 1 1\n").unwrap_err();
        assert!(matches!(err, ObjError::UnsupportedFace { line: 2, count: 4 }));
    }

    #[test]
    fn inconsistent_face_is_rejected() {
        let err = parse(&format!("{TRIANGLE}f 1/1 2 3/3\n")).unwrap_err();
        assert!(matches!(err, ObjError::MalformedFace { ref token, .. } if token == "2"));
    }

    #[test]
    fn bad_numbers_report_their_line() {
        let err = parse("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, ObjError::InvalidNumber { line: 1, ref token } if token == "zero"));
        let err = parse("vn 0 1\n").unwrap_err();
        assert!(matches!(err, ObjError::MissingToken { line: 1, .. }));
    }

    #[test]
    fn failing_library_load_propagates() {
        let err = parse("mtllib missing.mtl\n").unwrap_err();
        assert!(matches!(err, ObjError::MaterialLibrary { ref name, .. } if name == "missing.mtl"));
    }

    #[test]
    fn comments_and_unknown_records_are_skipped() {
        let model = parse(&format!("# dragon\no Body\ns off\n{TRIANGLE}f 1 2 3\n")).unwrap();
        assert_eq!(model.faces.len(), 1);
    }
}
