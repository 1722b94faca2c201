use cgmath::Point3;
use dragon_flight::{
    camera::{Camera, CameraController, GroundMap},
    config::{CameraConfig, GameConfig, TerrainExtents},
    data_structures::terrain::{Heightmap, STRIP_RESTART, TerrainMesh},
};
use instant::Duration;
use winit::{event::ElementState, keyboard::KeyCode};

use crate::common::fixtures::ramp_image;

mod common;

fn flat_ground() -> GroundMap {
    let heightmap = Heightmap::from_raw(4, 4, 300.0, vec![0.0; 16]).unwrap();
    GroundMap::new(&heightmap, -400.0, 4.0, 4.0, 3200.0)
}

#[test]
fn heightmap_image_becomes_altitudes_and_mesh() {
    let heightmap = Heightmap::from_image(&ramp_image(5), 300.0).unwrap();
    assert_eq!(heightmap.altitude(0, 2), 0.0);
    assert_eq!(heightmap.altitude(4, 2), 300.0);

    let mesh = TerrainMesh::generate(&heightmap, &TerrainExtents::default());
    assert_eq!(mesh.vertices.len(), 25);
    // Four strips of ten indices with a restart between each pair.
    assert_eq!(mesh.indices.len(), 4 * 10 + 3);
    assert_eq!(
        mesh.indices.iter().filter(|&&i| i == STRIP_RESTART).count(),
        3
    );

    assert_eq!(mesh.vertices[0].position, [-1600.0, -400.0, -1600.0]);
    assert_eq!(mesh.vertices[24].position, [1600.0, -100.0, 1600.0]);
}

#[test]
fn tiny_heightmap_is_rejected() {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 8));
    assert!(Heightmap::from_image(&img, 300.0).is_err());
}

#[test]
fn ground_follows_the_heightmap_and_is_the_sky_off_the_map() {
    let heightmap = Heightmap::from_image(&ramp_image(5), 300.0).unwrap();
    let ground = GroundMap::new(&heightmap, -400.0, 5.0, 5.0, 3200.0);

    assert_eq!(ground.cell(Point3::new(0.0, 0.0, 0.0)), Some((2, 2)));
    assert_eq!(
        ground.ground_at(Point3::new(0.0, 0.0, 0.0)),
        heightmap.altitude(2, 2) - 400.0
    );
    assert_eq!(ground.ground_at(Point3::new(0.0, 0.0, 100.0)), 3200.0);
    assert_eq!(ground.ground_at(Point3::new(-100.0, 0.0, 0.0)), 3200.0);
}

#[test]
fn ground_under_each_mesh_vertex_is_that_vertex() {
    let (w, h) = (64, 48);
    let altitude = (0..w * h).map(|k| (k % 97) as f32).collect();
    let heightmap = Heightmap::from_raw(w, h, 300.0, altitude).unwrap();
    let extents = TerrainExtents::default();
    let mesh = TerrainMesh::generate(&heightmap, &extents);
    let ground = GroundMap::new(
        &heightmap,
        extents.y_offset,
        extents.width,
        extents.height,
        3200.0,
    );

    for (i, j) in [(0, 0), (1, 2), (31, 23), (40, 7), (62, 46), (63, 47)] {
        let [x, y, z] = mesh.vertices[i * h + j].position;
        // Half a world unit inside the cell keeps truncation off the edge.
        let inside = Point3::new(x + 0.5, 0.0, z + 0.5);
        assert_eq!(ground.cell(inside), Some((i, j)), "vertex ({i}, {j})");
        assert_eq!(ground.ground_at(inside), y);
        assert_eq!(y, heightmap.altitude(i, j) + extents.y_offset);
    }
}

#[test]
fn forward_flight_from_the_origin_over_default_terrain() {
    let config = GameConfig::default();
    let heightmap = Heightmap::from_raw(64, 48, 300.0, vec![0.0; 64 * 48]).unwrap();
    let ground = GroundMap::new(
        &heightmap,
        config.terrain.y_offset,
        config.terrain.width,
        config.terrain.height,
        config.sky_height,
    );
    let mut controller = CameraController::new(config.camera);
    controller.set_active(true);
    controller.process_key(KeyCode::KeyW, ElementState::Pressed);

    let mut camera = Camera::new((0.0, 0.0, 0.0));
    for _ in 0..3 {
        controller.update(&mut camera, &ground, Duration::from_millis(10));
    }
    assert!((camera.position.z + 3.0).abs() < 1e-4);
    assert!(camera.position.x.abs() < 1e-4);
    assert_eq!(camera.position.y, 0.0);
}

#[test]
fn climbing_stops_below_the_sky() {
    let ground = flat_ground();
    let mut controller = CameraController::new(CameraConfig::default());
    controller.set_active(true);
    controller.process_key(KeyCode::KeyZ, ElementState::Pressed);
    controller.process_key(KeyCode::KeyQ, ElementState::Pressed);

    let mut camera = Camera::new((0.0, 3000.0, 0.0));
    for _ in 0..20 {
        controller.update(&mut camera, &ground, Duration::from_millis(100));
    }
    assert_eq!(camera.position.y, 3200.0 - 124.0);
}

#[test]
fn menu_controller_ignores_input() {
    let ground = flat_ground();
    let mut controller = CameraController::new(CameraConfig::default());
    controller.process_key(KeyCode::KeyW, ElementState::Pressed);

    let mut camera = Camera::new((0.0, 0.0, 0.0));
    controller.update(&mut camera, &ground, Duration::from_millis(100));
    assert_eq!(camera.position, Point3::new(0.0, 0.0, 0.0));
}
