//! Per-frame scene state: the turning sky, the day/night cycle and the dragons
//! circling the map. Everything here is plain data advanced once per frame, so
//! it can be tested without a GPU.

use cgmath::Vector3;
use rand::Rng;

use crate::{
    camera::{Camera, camera_relative, wrap_degrees},
    config::{DayCycleConfig, GameConfig},
    data_structures::instance::Instance,
};

/// Orbit scale per dragon, repeated when there are more dragons than entries.
pub const DRAGON_SCALES: [f32; 10] = [1.0, 2.0, 2.5, 3.0, 1.5, 2.5, 3.0, 1.0, 2.8, 3.2];
/// Degrees per frame per dragon.
pub const DRAGON_SPEEDS: [f32; 10] = [0.1, 0.2, 0.03, 0.05, 0.15, 0.17, 0.2, 0.08, 0.05, 0.04];

/// Frame counter choosing between the day, dusk and night skyboxes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayCycle {
    counter: u32,
    config: DayCycleConfig,
}

impl DayCycle {
    pub fn new(config: DayCycleConfig) -> Self {
        Self {
            counter: config.start,
            config,
        }
    }

    pub fn with_counter(config: DayCycleConfig, counter: u32) -> Self {
        Self { counter, config }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn skybox_index(&self) -> usize {
        if self.counter < self.config.dusk {
            0
        } else if self.counter < self.config.night {
            1
        } else {
            2
        }
    }

    /// Step one frame. Past the cycle length at night the counter restarts at 0.
    pub fn advance(&mut self) {
        if self.skybox_index() == 2 && self.counter > self.config.length {
            self.counter = 0;
        } else {
            self.counter += 1;
        }
    }
}

/// Slow spin of the skybox around the vertical axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkyRotation {
    pub angle: f32,
    pub step: f32,
}

impl SkyRotation {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    pub fn advance(&mut self) {
        self.angle = wrap_degrees(self.angle + self.step);
    }

    pub fn instance(&self) -> Instance {
        Instance::turn_y(self.angle)
    }
}

/// A dragon circling the world origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub rotation: f32,
    pub speed: f32,
    pub scale: f32,
    pub position: Vector3<f32>,
}

impl Orbit {
    pub fn random<R: Rng>(rng: &mut R, scale: f32, speed: f32) -> Self {
        Self {
            rotation: 0.0,
            speed,
            scale,
            position: Vector3::new(
                rng.gen_range(-400.0..400.0),
                rng.gen_range(-50.0..350.0),
                rng.gen_range(-400.0..400.0),
            ),
        }
    }

    pub fn advance(&mut self) {
        self.rotation = wrap_degrees(self.rotation + self.speed);
    }

    /// `Ry(rotation) · S(scale) · T(position) · Ry(90°)`
    pub fn instance(&self) -> Instance {
        let turn = Instance::turn_y(self.rotation).with_uniform_scale(self.scale);
        let local = Instance {
            position: self.position,
            ..Instance::turn_y(90.0)
        };
        turn * local
    }
}

/// Placement of the player's dragon, fixed in front of the camera.
pub fn player_instance(camera: &Camera, distance: f32) -> Instance {
    let (position, rotation) = camera_relative(camera, distance);
    Instance {
        position,
        rotation,
        ..Instance::new()
    }
}

/// Format like `#.##`: at most two decimals, trailing zeros dropped.
pub fn format_coordinate(value: f32) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    match text {
        "-0" => "-0".to_string(),
        "" => "0".to_string(),
        other => other.to_string(),
    }
}

pub fn hud_text(camera: &Camera) -> String {
    format!(
        "Position: x = {}, y = {}, z = {}",
        format_coordinate(camera.position.x),
        format_coordinate(camera.position.y),
        format_coordinate(camera.position.z)
    )
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneState {
    pub sky: SkyRotation,
    pub day_cycle: DayCycle,
    pub dragons: Vec<Orbit>,
}

impl SceneState {
    pub fn new<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        let dragons = (0..config.dragons)
            .map(|i| {
                Orbit::random(
                    rng,
                    DRAGON_SCALES[i % DRAGON_SCALES.len()],
                    DRAGON_SPEEDS[i % DRAGON_SPEEDS.len()],
                )
            })
            .collect();
        Self {
            sky: SkyRotation::new(config.sky_spin),
            day_cycle: DayCycle::new(config.day_cycle),
            dragons,
        }
    }

    /// Advance all animation counters by one frame.
    pub fn advance(&mut self) {
        self.sky.advance();
        self.day_cycle.advance();
        self.dragons.iter_mut().for_each(Orbit::advance);
    }

    pub fn dragon_instances(&self) -> Vec<Instance> {
        self.dragons.iter().map(Orbit::instance).collect()
    }
}
