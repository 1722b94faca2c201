//! Tunable constants of the game.
//!
//! Everything that used to be a magic number in the game loop lives in
//! [`GameConfig`]. The defaults describe the "Journey of a Dragon" world: a
//! 1600×1600 terrain sunk 400 units below the origin inside a 3200 unit skybox.

/// World-space placement of the terrain mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainExtents {
    /// Half extent along X; vertices span `[-width, width]`.
    pub width: f32,
    /// Half extent along Z; vertices span `[-height, height]`.
    pub height: f32,
    /// Added to every altitude when placing vertices in the world.
    pub y_offset: f32,
}

impl Default for TerrainExtents {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1600.0,
            y_offset: -400.0,
        }
    }
}

/// Speeds and limits of the flight camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraConfig {
    /// Base speed in world units per millisecond.
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    /// Maximum pitch in degrees, both up and down.
    pub max_look: f32,
    pub fovy: f32,
    /// Window height at which the field of view equals `fovy`.
    pub fovy_reference_height: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.1,
            mouse_sensitivity: 0.03,
            max_look: 85.0,
            fovy: 45.0,
            fovy_reference_height: 540.0,
            znear: 1.0,
            zfar: 20000.0,
        }
    }
}

/// Thresholds of the day/night skybox cycle, measured in frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayCycleConfig {
    pub start: u32,
    /// Below this the first (day) skybox is shown.
    pub dusk: u32,
    /// Below this the second (dusk) skybox is shown, above it night.
    pub night: u32,
    /// Once the counter exceeds this while it is night, it restarts at zero.
    pub length: u32,
}

impl Default for DayCycleConfig {
    fn default() -> Self {
        Self {
            start: 900,
            dusk: 1000,
            night: 1500,
            length: 2500,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub window_title: String,
    pub heightmap: String,
    pub model: String,
    pub menu_image: String,
    /// Skybox cross images in day, dusk, night order.
    pub skyboxes: [String; 3],
    /// Altitude of a fully red heightmap pixel.
    pub max_altitude: f32,
    pub terrain: TerrainExtents,
    /// Half width of the skybox cube.
    pub sky_width: f32,
    /// Height of the skybox ceiling; also the camera's upper bound.
    pub sky_height: f32,
    /// Degrees the skybox turns every frame.
    pub sky_spin: f32,
    pub camera: CameraConfig,
    pub day_cycle: DayCycleConfig,
    /// Number of dragons circling around the player.
    pub dragons: usize,
    /// Distance in front of the camera at which the player's dragon is drawn.
    pub player_distance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Journey of a Dragon".to_string(),
            heightmap: "heightMap.png".to_string(),
            model: "dragon.obj".to_string(),
            menu_image: "mainMenu.png".to_string(),
            skyboxes: [
                "day.jpg".to_string(),
                "dust.jpg".to_string(),
                "night.jpg".to_string(),
            ],
            max_altitude: 300.0,
            terrain: TerrainExtents::default(),
            sky_width: 3200.0,
            sky_height: 3200.0,
            sky_spin: 0.05,
            camera: CameraConfig::default(),
            day_cycle: DayCycleConfig::default(),
            dragons: 5,
            player_distance: 20.0,
        }
    }
}
