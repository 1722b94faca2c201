use dragon_flight::{
    camera::Camera,
    config::GameConfig,
    scene::{SceneState, hud_text},
};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn a_full_day_passes_through_every_skybox() {
    let config = GameConfig::default();
    let mut scene = SceneState::new(&config, &mut StdRng::seed_from_u64(3));
    assert_eq!(scene.dragons.len(), config.dragons);

    let mut seen = Vec::new();
    for _ in 0..3000 {
        let index = scene.day_cycle.skybox_index();
        if seen.last() != Some(&index) {
            seen.push(index);
        }
        scene.advance();
    }
    assert_eq!(&seen[..4], &[0, 1, 2, 0]);
}

#[test]
fn dragons_stay_in_their_spawn_volume() {
    let config = GameConfig::default();
    let scene = SceneState::new(&config, &mut StdRng::seed_from_u64(11));
    for orbit in &scene.dragons {
        assert!((-400.0..400.0).contains(&orbit.position.x));
        assert!((-50.0..350.0).contains(&orbit.position.y));
        assert!((-400.0..400.0).contains(&orbit.position.z));
    }
    assert_eq!(scene.dragon_instances().len(), config.dragons);
}

#[test]
fn hud_shows_the_rounded_camera_position() {
    let camera = Camera::new((12.345, -3.0, 0.5));
    assert_eq!(hud_text(&camera), "Position: x = 12.35, y = -3, z = 0.5");
}
