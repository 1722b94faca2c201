use dragon_flight::{
    data_structures::model::{HAS_NORMAL, HAS_TEX_COORDS, assemble},
    resources::{mtl::TextureSlot, obj::ObjError},
};

use crate::common::fixtures::{WING_OBJ, parse_wing};

mod common;

#[test]
fn wing_parses_with_both_materials() {
    let obj = parse_wing(WING_OBJ).unwrap();

    assert_eq!(obj.positions.len(), 5);
    assert_eq!(obj.tex_coords.len(), 4);
    assert_eq!(obj.normals.len(), 1);
    assert_eq!(obj.faces.len(), 3);
    assert_eq!(obj.materials.len(), 2);

    let scale = obj.materials.get(0).unwrap();
    assert_eq!(scale.name, "Scale");
    assert_eq!(scale.diffuse, [0.2, 0.6, 0.1]);
    assert_eq!(scale.texture_map(TextureSlot::Diffuse), Some("scales.png"));

    let claw = obj.materials.get(1).unwrap();
    assert_eq!(claw.diffuse, [0.9, 0.9, 0.9]);
    assert_eq!(claw.dissolve, 0.5);
    assert_eq!(claw.texture_map(TextureSlot::Diffuse), None);
}

#[test]
fn assembled_wing_has_one_range_per_material_run() {
    let obj = parse_wing(WING_OBJ).unwrap();
    let list = assemble(&obj).unwrap();

    assert_eq!(list.vertices.len(), 9);
    assert_eq!(list.ranges.len(), 2);
    assert_eq!(list.ranges[0].vertices, 0..6);
    assert_eq!(list.ranges[0].material, Some(0));
    assert_eq!(list.ranges[1].vertices, 6..9);
    assert_eq!(list.ranges[1].material, Some(1));

    let first = &list.vertices[0];
    assert_eq!(first.flags(), HAS_NORMAL | HAS_TEX_COORDS);
    assert_eq!(first.diffuse, [0.2, 0.6, 0.1]);
    // v = 0 in the file is the bottom row of the texture.
    assert_eq!(first.tex_coords, [0.0, 1.0]);

    let tip = &list.vertices[8];
    assert_eq!(tip.position, [1.0, 1.0, 3.0]);
    assert_eq!(tip.flags(), 0);
    assert_eq!(tip.params[0], 0.5);
}

#[test]
fn faces_before_usemtl_use_the_default_material() {
    let obj = parse_wing("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    let list = assemble(&obj).unwrap();

    assert_eq!(list.ranges.len(), 1);
    assert_eq!(list.ranges[0].material, None);
    assert_eq!(list.vertices[0].params[0], 1.0);
}

#[test]
fn dangling_index_is_rejected_on_assembly() {
    let obj = parse_wing("v 0 0 0\nv 1 0 0\nf 1 2 7\n").unwrap();
    let err = assemble(&obj).unwrap_err();
    assert!(matches!(
        err,
        ObjError::IndexOutOfRange { index: 7, len: 2, .. }
    ));
}

#[test]
fn missing_material_library_fails_the_load() {
    let err = parse_wing("mtllib body.mtl\n").unwrap_err();
    assert!(matches!(err, ObjError::MaterialLibrary { ref name, .. } if name == "body.mtl"));
}
