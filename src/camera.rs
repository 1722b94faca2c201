//! Flight camera, its projection and the terrain aware input controller.
//!
//! The camera keeps Euler angles in degrees (pitch, yaw, roll) and builds its
//! view matrix as `Rx(pitch) · Ry(yaw) · Rz(roll) · T(-position)`. Collision
//! against the terrain is approximate: a move that would end below the local
//! ground is replaced by a small nudge towards the origin.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Quaternion, Rotation3, Vector3, perspective};
use instant::Duration;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{config::CameraConfig, data_structures::terrain::Heightmap};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Sideways step applied instead of a move that would hit the ground.
pub const COLLISION_NUDGE: f32 = 5.0;
/// Vertical step used to push the camera back above ground.
pub const LIFT: f32 = 4.0;
/// Closest the camera may get to the ground.
pub const GROUND_CLEARANCE: f32 = 2.0;
/// Moves ending closer than this to the sky ceiling are snapped down.
pub const SKY_MARGIN: f32 = 120.0;
/// Distance below the sky ceiling the camera is snapped to.
pub const SKY_CAP: f32 = 124.0;
/// A move ending this far below ground additionally drops the camera.
pub const DEEP_BELOW: f32 = 100.0;

/// Wrap an angle once into `[-360, 360]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    if angle > 360.0 {
        angle - 360.0
    } else if angle < -360.0 {
        angle + 360.0
    } else {
        angle
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    /// Pitch, yaw and roll in degrees.
    pub rotation: Vector3<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>>(position: V) -> Self {
        Self {
            position: position.into(),
            rotation: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// Orientation of the world as seen from the camera.
    pub fn orientation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_x(Deg(self.rotation.x))
            * Quaternion::from_angle_y(Deg(self.rotation.y))
            * Quaternion::from_angle_z(Deg(self.rotation.z))
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.orientation())
            * Matrix4::from_translation(-self.position.to_homogeneous().truncate())
    }

    pub fn wrap_yaw(&mut self) {
        self.rotation.y = wrap_degrees(self.rotation.y);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: f32,
    reference_height: f32,
    height: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, config: &CameraConfig) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: config.fovy,
            reference_height: config.fovy_reference_height,
            height: height.max(1) as f32,
            znear: config.znear,
            zfar: config.zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
        self.height = height.max(1) as f32;
    }

    /// Vertical field of view, scaled by window height over the reference height.
    pub fn fovy(&self) -> Deg<f32> {
        Deg((self.fovy * self.height / self.reference_height).min(170.0))
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy(), self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Altitude lookup the controller collides against.
///
/// The grid is the heightmap shifted by the terrain offset, so its values are
/// in world units. Positions outside the grid report the sky height, which keeps
/// the camera from flying off the map.
#[derive(Clone, Debug, PartialEq)]
pub struct GroundMap {
    rows: usize,
    cols: usize,
    altitude: Vec<f32>,
    world_width: f32,
    world_height: f32,
    sky_height: f32,
}

impl GroundMap {
    pub fn new(
        heightmap: &Heightmap,
        y_offset: f32,
        world_width: f32,
        world_height: f32,
        sky_height: f32,
    ) -> Self {
        let rows = heightmap.width();
        let cols = heightmap.height();
        let mut altitude = Vec::with_capacity(rows * cols);
        for x in 0..heightmap.width() {
            for z in 0..heightmap.height() {
                altitude.push(heightmap.altitude(x, z) + y_offset);
            }
        }
        Self {
            rows,
            cols,
            altitude,
            world_width,
            world_height,
            sky_height,
        }
    }

    pub fn sky_height(&self) -> f32 {
        self.sky_height
    }

    /// Grid cell under a world position, if any.
    ///
    /// Inverse of the terrain mesh layout: world Z spans `[-world_width,
    /// world_width]` over the grid rows, world X spans `[-world_height,
    /// world_height]` over the columns.
    pub fn cell(&self, position: Point3<f32>) -> Option<(usize, usize)> {
        let rows = self.rows as f32;
        let cols = self.cols as f32;
        // Truncation toward zero is part of the lookup.
        let gx = ((position.z + self.world_width) * (rows - 1.0) / (2.0 * self.world_width)) as i64;
        let gz =
            ((position.x + self.world_height) * (cols - 1.0) / (2.0 * self.world_height)) as i64;
        if gx < 0 || gz < 0 || gx as usize >= self.rows || gz as usize >= self.cols {
            return None;
        }
        Some((gx as usize, gz as usize))
    }

    pub fn ground_at(&self, position: Point3<f32>) -> f32 {
        match self.cell(position) {
            Some((x, z)) => self.altitude[x * self.cols + z],
            None => self.sky_height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Keys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    fast: bool,
    slow: bool,
}

#[derive(Debug)]
pub struct CameraController {
    config: CameraConfig,
    active: bool,
    suppress_next: bool,
    focused: bool,
    pointer_inside: bool,
    keys: Keys,
    primary: bool,
    secondary: bool,
    mouse_dx: f64,
    mouse_dy: f64,
}

impl CameraController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            active: false,
            suppress_next: false,
            focused: true,
            pointer_inside: true,
            keys: Keys::default(),
            primary: false,
            secondary: false,
            mouse_dx: 0.0,
            mouse_dy: 0.0,
        }
    }

    /// Switch between the passive (menu) and active (flight) state.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Swallow the next input tick, e.g. right after a mode switch.
    pub fn suppress_next_tick(&mut self) {
        self.suppress_next = true;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_pointer_inside(&mut self, inside: bool) {
        self.pointer_inside = inside;
    }

    pub fn process_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state.is_pressed();
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => self.keys.forward = pressed,
            KeyCode::KeyS | KeyCode::ArrowDown => self.keys.backward = pressed,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.keys.left = pressed,
            KeyCode::KeyD | KeyCode::ArrowRight => self.keys.right = pressed,
            KeyCode::KeyZ => self.keys.up = pressed,
            KeyCode::KeyX => self.keys.down = pressed,
            KeyCode::KeyQ => self.keys.fast = pressed,
            KeyCode::KeyE => self.keys.slow = pressed,
            _ => return false,
        }
        true
    }

    pub fn process_button(&mut self, button: MouseButton, state: ElementState) -> bool {
        let pressed = state.is_pressed();
        match button {
            MouseButton::Left => self.primary = pressed,
            MouseButton::Right => self.secondary = pressed,
            _ => return false,
        }
        true
    }

    /// Track keys, buttons, focus and pointer presence.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => self.process_key(code, event.state),
                PhysicalKey::Unidentified(_) => false,
            },
            WindowEvent::MouseInput { state, button, .. } => self.process_button(*button, *state),
            WindowEvent::Focused(focused) => {
                self.set_focused(*focused);
                true
            }
            WindowEvent::CursorEntered { .. } => {
                self.set_pointer_inside(true);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.set_pointer_inside(false);
                true
            }
            _ => false,
        }
    }

    /// Accumulate raw mouse motion until the next update.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.mouse_dx += dx;
        self.mouse_dy += dy;
    }

    fn speed(&self, delta: f32) -> f32 {
        let base = if self.keys.fast {
            self.config.move_speed * 5.0
        } else if self.keys.slow {
            self.config.move_speed / 2.0
        } else {
            self.config.move_speed
        };
        base * delta
    }

    /// Apply one input tick of `dt` to the camera.
    pub fn update(&mut self, camera: &mut Camera, ground: &GroundMap, dt: Duration) {
        let (dx, dy) = (self.mouse_dx as f32, self.mouse_dy as f32);
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;

        if !self.active || !self.focused {
            return;
        }
        if self.suppress_next {
            self.suppress_next = false;
            return;
        }

        let delta = dt.as_secs_f32() * 1000.0;
        let speed = self.speed(delta);
        let sky = ground.sky_height();

        if self.pointer_inside {
            let alt = ground.ground_at(camera.position);
            if self.primary {
                move_x(camera, speed, 0.0, 1.0, alt);
                move_y(camera, speed, 0.0, -1.0, alt, sky);
                move_z(camera, speed, 0.0, -1.0, alt);
            } else if self.secondary {
                move_x(camera, speed, 0.0, -1.0, alt);
                move_y(camera, speed, 0.0, 1.0, alt, sky);
                move_z(camera, speed, 0.0, 1.0, alt);
            }
            if dx.abs() > 2.0 || dy.abs() > 2.0 {
                self.look(camera, dx, dy, delta);
            }
        }

        let alt = ground.ground_at(camera.position);
        if self.keys.up {
            let motion = camera.position.y + speed;
            camera.position.y = if motion >= sky - SKY_MARGIN {
                sky - SKY_CAP
            } else {
                motion
            };
        }
        if self.keys.down {
            let motion = camera.position.y - speed;
            camera.position.y = if motion <= alt + GROUND_CLEARANCE {
                camera.position.y + LIFT
            } else {
                motion
            };
        }
        if self.keys.backward {
            move_x(camera, speed, 0.0, -1.0, alt);
            move_y(camera, speed, 0.0, 1.0, alt, sky);
            move_z(camera, speed, 0.0, 1.0, alt);
        }
        if self.keys.forward {
            move_x(camera, speed, 0.0, 1.0, alt);
            move_y(camera, speed, 0.0, -1.0, alt, sky);
            move_z(camera, speed, 0.0, -1.0, alt);
        }
        if self.keys.left {
            move_x(camera, speed, -90.0, 1.0, alt);
            move_z(camera, speed, -90.0, -1.0, alt);
        }
        if self.keys.right {
            move_x(camera, speed, 90.0, 1.0, alt);
            move_z(camera, speed, 90.0, -1.0, alt);
        }

        camera.wrap_yaw();
    }

    fn look(&self, camera: &mut Camera, dx: f32, dy: f32, delta: f32) {
        let sensitivity = self.config.mouse_sensitivity;
        let pitch = &mut camera.rotation.x;
        if *pitch > 90.0 {
            *pitch = 90.0;
        } else if *pitch < -90.0 {
            *pitch = -90.0;
        } else {
            *pitch += dy * sensitivity * delta;
        }
        *pitch = (*pitch).clamp(-self.config.max_look, self.config.max_look);
        camera.rotation.y += dx * sensitivity * delta;
    }
}

fn nudge_towards_origin(coordinate: f32) -> f32 {
    if coordinate > 0.0 {
        -COLLISION_NUDGE
    } else {
        COLLISION_NUDGE
    }
}

fn trial_height(camera: &Camera, speed: f32, angle: f32, forward: f32) -> f32 {
    camera.position.y + forward * (camera.rotation.x + angle).to_radians().sin() * speed
}

fn move_x(camera: &mut Camera, speed: f32, angle: f32, forward: f32, alt: f32) {
    let trial_y = trial_height(camera, speed, angle, forward);
    let motion = camera.position.x + forward * (camera.rotation.y + angle).to_radians().sin() * speed;
    camera.position.x = if alt > trial_y {
        camera.position.x + nudge_towards_origin(camera.position.x)
    } else {
        motion
    };
}

fn move_z(camera: &mut Camera, speed: f32, angle: f32, forward: f32, alt: f32) {
    let trial_y = trial_height(camera, speed, angle, forward);
    let motion = camera.position.z + forward * (camera.rotation.y + angle).to_radians().cos() * speed;
    camera.position.z = if alt > trial_y {
        camera.position.z + nudge_towards_origin(camera.position.z)
    } else {
        motion
    };
}

fn move_y(camera: &mut Camera, speed: f32, angle: f32, forward: f32, alt: f32, sky: f32) {
    let motion = trial_height(camera, speed, angle, forward);
    let y = &mut camera.position.y;
    *y = if motion <= alt + GROUND_CLEARANCE {
        *y + LIFT
    } else {
        motion
    };
    if alt - motion > DEEP_BELOW {
        *y -= LIFT;
    }
    if motion >= sky - SKY_MARGIN {
        *y = sky - SKY_CAP;
    }
}

/// Placement of a model fixed in front of the camera at `distance` units.
pub fn camera_relative(camera: &Camera, distance: f32) -> (Vector3<f32>, Quaternion<f32>) {
    use cgmath::EuclideanSpace;

    let inverse = camera.orientation().conjugate();
    let offset = inverse * Vector3::new(0.0, 0.0, -distance);
    (camera.position.to_vec() + offset, inverse.normalize())
}

/// GPU side of the camera plus the controller driving it.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    /// Set once the terrain is loaded; no movement happens without it.
    pub ground: Option<GroundMap>,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn update(&mut self, dt: Duration) {
        if let Some(ground) = &self.ground {
            self.controller.update(&mut self.camera, ground, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, Transform};

    use super::*;

    const TICK: Duration = Duration::from_millis(10);

    fn flat_ground(level: f32) -> GroundMap {
        let heightmap = Heightmap::from_raw(4, 4, 300.0, vec![level + 400.0; 16]).unwrap();
        GroundMap::new(&heightmap, -400.0, 4.0, 4.0, 3200.0)
    }

    fn active_controller() -> CameraController {
        let mut controller = CameraController::new(CameraConfig::default());
        controller.set_active(true);
        controller
    }

    #[test]
    fn yaw_wraps_once_past_a_full_turn() {
        assert_eq!(wrap_degrees(350.0 + 20.0), 10.0);
        assert_eq!(wrap_degrees(-370.0), -10.0);
        assert_eq!(wrap_degrees(360.0), 360.0);
        assert_eq!(wrap_degrees(-45.0), -45.0);
    }

    #[test]
    fn ground_outside_the_grid_is_the_sky() {
        let ground = flat_ground(10.0);
        assert_eq!(ground.ground_at(Point3::new(0.0, 0.0, 0.0)), 10.0);
        assert_eq!(ground.ground_at(Point3::new(0.0, 0.0, -10.0)), 3200.0);
        assert_eq!(ground.ground_at(Point3::new(0.0, 0.0, 5000.0)), 3200.0);
    }

    #[test]
    fn ground_lookup_rescales_position() {
        let heightmap =
            Heightmap::from_raw(4, 4, 300.0, (0..16).map(|a| a as f32).collect()).unwrap();
        let ground = GroundMap::new(&heightmap, 0.0, 4.0, 4.0, 1000.0);
        // gx = trunc((z + 4) * 3 / 8), gz = trunc((x + 4) * 3 / 8)
        assert_eq!(ground.cell(Point3::new(0.0, 0.0, 0.0)), Some((1, 1)));
        assert_eq!(ground.cell(Point3::new(2.0, 0.0, 4.0)), Some((3, 2)));
        assert_eq!(ground.ground_at(Point3::new(2.0, 0.0, 4.0)), 14.0);
        // -0.375 truncates to 0 rather than flooring to -1
        assert_eq!(ground.cell(Point3::new(-5.0, 0.0, -5.0)), Some((0, 0)));
    }

    #[test]
    fn ground_lookup_spans_the_full_world_extents() {
        let heightmap = Heightmap::from_raw(64, 48, 300.0, vec![0.0; 64 * 48]).unwrap();
        let ground = GroundMap::new(&heightmap, -400.0, 1600.0, 1600.0, 3200.0);
        assert_eq!(ground.cell(Point3::new(0.0, 0.0, 0.0)), Some((31, 23)));
        assert_eq!(ground.cell(Point3::new(-1600.0, 0.0, -1600.0)), Some((0, 0)));
        assert_eq!(ground.cell(Point3::new(1600.0, 0.0, 1600.0)), Some((63, 47)));
        assert_eq!(ground.cell(Point3::new(1700.0, 0.0, 0.0)), None);
        assert_eq!(ground.ground_at(Point3::new(0.0, 0.0, 0.0)), -400.0);
    }

    #[test]
    fn yaw_wraps_after_mouse_turn() {
        let ground = flat_ground(0.0);
        let mut controller = CameraController::new(CameraConfig {
            mouse_sensitivity: 0.5,
            ..CameraConfig::default()
        });
        controller.set_active(true);
        let mut camera = Camera::new((0.0, 50.0, 0.0));
        camera.rotation.y = 350.0;

        // 4 * 0.5 * 10 ms = 20 degrees
        controller.handle_mouse(4.0, 0.0);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.rotation.y, 10.0);
    }

    #[test]
    fn forward_motion_above_ground_is_accepted() {
        let ground = flat_ground(0.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((0.0, 50.0, 0.0));
        controller.process_key(KeyCode::KeyW, ElementState::Pressed);
        controller.update(&mut camera, &ground, TICK);
        // Facing -z with zero pitch: one unit per tick at 0.1 units/ms.
        assert!((camera.position.z + 1.0).abs() < 1e-4);
        assert!(camera.position.x.abs() < 1e-4);
        assert!((camera.position.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn motion_into_the_ground_is_replaced_by_nudge() {
        let ground = flat_ground(100.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((2.0, 50.0, -3.0));
        assert_eq!(ground.ground_at(camera.position), 100.0);
        controller.process_key(KeyCode::KeyW, ElementState::Pressed);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.position.x, -3.0);
        assert_eq!(camera.position.z, 2.0);
        // Still below ground after the vertical lift: 50 + 4.
        assert_eq!(camera.position.y, 54.0);
    }

    #[test]
    fn descending_stops_above_ground() {
        let ground = flat_ground(0.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((0.0, 2.5, 0.0));
        controller.process_key(KeyCode::KeyX, ElementState::Pressed);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.position.y, 6.5);
    }

    #[test]
    fn climbing_is_capped_below_the_sky() {
        let ground = flat_ground(0.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((0.0, 3075.0, 0.0));
        controller.process_key(KeyCode::KeyZ, ElementState::Pressed);
        controller.process_key(KeyCode::KeyQ, ElementState::Pressed);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.position.y, 3200.0 - SKY_CAP);
    }

    #[test]
    fn look_applies_deadzone_and_pitch_limit() {
        let ground = flat_ground(0.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((0.0, 50.0, 0.0));

        controller.handle_mouse(2.0, -1.0);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.rotation, Vector3::new(0.0, 0.0, 0.0));

        controller.handle_mouse(10.0, 1000.0);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.rotation.x, 85.0);
        assert!((camera.rotation.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn passive_controller_ignores_input() {
        let ground = flat_ground(0.0);
        let mut controller = CameraController::new(CameraConfig::default());
        let mut camera = Camera::new((0.0, 50.0, 0.0));
        controller.process_key(KeyCode::KeyW, ElementState::Pressed);
        controller.handle_mouse(50.0, 50.0);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera, Camera::new((0.0, 50.0, 0.0)));
    }

    #[test]
    fn suppressed_tick_discards_input_once() {
        let ground = flat_ground(0.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((0.0, 50.0, 0.0));
        controller.process_key(KeyCode::KeyW, ElementState::Pressed);
        controller.handle_mouse(500.0, 0.0);
        controller.suppress_next_tick();

        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera, Camera::new((0.0, 50.0, 0.0)));

        controller.update(&mut camera, &ground, TICK);
        assert!(camera.position.z < 0.0);
        assert_eq!(camera.rotation.y, 0.0);
    }

    #[test]
    fn unfocused_window_freezes_camera() {
        let ground = flat_ground(0.0);
        let mut controller = active_controller();
        let mut camera = Camera::new((0.0, 50.0, 0.0));
        controller.set_focused(false);
        controller.process_key(KeyCode::KeyW, ElementState::Pressed);
        controller.update(&mut camera, &ground, TICK);
        assert_eq!(camera.position.z, 0.0);
    }

    #[test]
    fn view_matrix_moves_world_opposite_to_camera() {
        let camera = Camera::new((10.0, 20.0, 30.0));
        let eye = camera.calc_matrix().transform_point(camera.position);
        assert!(eye.to_vec().magnitude() < 1e-4);
    }

    #[test]
    fn camera_relative_placement_lands_in_front_of_view() {
        let mut camera = Camera::new((5.0, 60.0, -3.0));
        camera.rotation = Vector3::new(20.0, 135.0, 0.0);
        let (position, _) = camera_relative(&camera, 20.0);
        let in_view = camera
            .calc_matrix()
            .transform_point(Point3::from_vec(position));
        assert!((in_view - Point3::new(0.0, 0.0, -20.0)).magnitude() < 1e-3);
    }
}
