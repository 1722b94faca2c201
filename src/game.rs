//! The game flow: main menu and free flight over the terrain.
//!
//! In the menu only the title image is drawn and the camera ignores input.
//! Enter starts the flight, Escape goes back to the menu (or quits from the
//! menu), F toggles fullscreen and P saves a snapshot while flying.

use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Fullscreen, Window},
};

use crate::{
    camera::{CameraController, GroundMap, Projection},
    config::GameConfig,
    context::{Context, InitContext},
    data_structures::{
        instance::{Instance, InstanceRaw, mk_instance_buffer},
        model::Model,
        skybox::{SkyMesh, Skybox},
        terrain::{Heightmap, Terrain, TerrainMesh},
        texture::Wrap,
    },
    flow::{FlowConsturctor, GraphicsFlow, Out},
    pipelines::gui::Overlay,
    render::{Instanced, Render, Sky},
    resources::{
        load_model_obj,
        texture::{load_image, load_texture},
    },
    scene::{SceneState, hud_text, player_instance},
};

/// File the P key writes to.
pub const SNAPSHOT_FILE: &str = "snapshot.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Flight,
}

/// What a key press does in a given mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    StartFlight,
    ToMenu,
    Quit,
    ToggleFullscreen,
    Snapshot,
}

pub fn action_for(mode: Mode, key: KeyCode) -> Option<Action> {
    match (mode, key) {
        (Mode::Menu, KeyCode::Enter | KeyCode::NumpadEnter) => Some(Action::StartFlight),
        (Mode::Menu, KeyCode::Escape) => Some(Action::Quit),
        (Mode::Flight, KeyCode::Escape) => Some(Action::ToMenu),
        (Mode::Flight, KeyCode::KeyP) => Some(Action::Snapshot),
        (_, KeyCode::KeyF) => Some(Action::ToggleFullscreen),
        _ => None,
    }
}

/// Mode after `action`, plus whether the controller must drop its next tick.
pub fn apply(mode: Mode, action: Action) -> (Mode, bool) {
    match action {
        Action::StartFlight => (Mode::Flight, true),
        Action::ToMenu => (Mode::Menu, false),
        Action::ToggleFullscreen => (mode, true),
        Action::Quit | Action::Snapshot => (mode, false),
    }
}

fn grab_cursor(window: &Window, grab: bool) {
    let result = if grab {
        window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(e) = result {
        log::warn!("could not change the cursor grab: {e}");
    }
    window.set_cursor_visible(!grab);
}

fn toggle_fullscreen(window: &Window) {
    let next = match window.fullscreen() {
        Some(_) => None,
        None => Some(Fullscreen::Borderless(None)),
    };
    window.set_fullscreen(next);
}

pub struct GameFlow {
    config: GameConfig,
    mode: Mode,
    scene: SceneState,
    heightmap: Heightmap,
    terrain: Terrain,
    sky_mesh: SkyMesh,
    skyboxes: Vec<Skybox>,
    sky_rotation: wgpu::Buffer,
    dragon: Model,
    dragons: wgpu::Buffer,
    player: wgpu::Buffer,
    menu: Overlay,
    hud: String,
}

impl GameFlow {
    /// Load every asset named in `config`.
    pub async fn load(ctx: InitContext, config: GameConfig) -> anyhow::Result<Self> {
        use anyhow::Context as _;

        let device = &ctx.device;
        let queue = &ctx.queue;

        let img = load_image(&config.heightmap).await?;
        let heightmap = Heightmap::from_image(&img, config.max_altitude)
            .with_context(|| format!("invalid heightmap {}", config.heightmap))?;
        let terrain = Terrain::new(device, &TerrainMesh::generate(&heightmap, &config.terrain));

        let mut skyboxes = Vec::with_capacity(config.skyboxes.len());
        for name in &config.skyboxes {
            let img = load_image(name).await?;
            skyboxes.push(
                Skybox::from_image(device, queue, &ctx.layouts.texture, &img, name)
                    .with_context(|| format!("invalid skybox {name}"))?,
            );
        }
        let sky_mesh = SkyMesh::new(
            device,
            config.sky_width,
            config.sky_height,
            -config.sky_height,
        );

        let dragon = load_model_obj(&config.model, device, queue, &ctx.layouts.material).await?;

        let menu_texture = load_texture(&config.menu_image, device, queue, Wrap::Clamp)
            .await
            .with_context(|| format!("could not load menu image {}", config.menu_image))?;
        let menu = Overlay::new(
            device,
            menu_texture.bind_group(device, &ctx.layouts.texture, "menu"),
        );

        let scene = SceneState::new(&config, &mut rand::thread_rng());
        let sky_rotation = mk_instance_buffer(device, &[scene.sky.instance()], "Sky Rotation");
        let dragons = mk_instance_buffer(device, &scene.dragon_instances(), "Dragon Instances");
        let player = mk_instance_buffer(device, &[Instance::new()], "Player Instance");

        Ok(Self {
            config,
            mode: Mode::Menu,
            scene,
            heightmap,
            terrain,
            sky_mesh,
            skyboxes,
            sky_rotation,
            dragon,
            dragons,
            player,
            menu,
            hud: String::new(),
        })
    }

    /// Constructor for [`crate::flow::run`].
    pub fn constructor(config: GameConfig) -> FlowConsturctor {
        let constructor: FlowConsturctor = Box::new(move |ctx| {
            Box::pin(async move {
                let flow: Box<dyn GraphicsFlow> = Box::new(GameFlow::load(ctx, config).await?);
                Ok(flow)
            })
        });
        constructor
    }

    fn on_key(&mut self, event: &KeyEvent) -> Out {
        if event.state != ElementState::Pressed || event.repeat {
            return Out::Empty;
        }
        let PhysicalKey::Code(key) = event.physical_key else {
            return Out::Empty;
        };
        let Some(action) = action_for(self.mode, key) else {
            return Out::Empty;
        };
        let (mode, suppress) = apply(self.mode, action);
        let entering = mode != self.mode;
        self.mode = mode;
        if entering && mode == Mode::Menu {
            self.hud.clear();
        }
        let title = self.config.window_title.clone();
        log::debug!("{action:?} in {mode:?}");

        Out::Configure(Box::new(move |ctx: &mut Context| {
            match action {
                Action::Quit => ctx.request_exit(),
                Action::Snapshot => ctx.request_snapshot(SNAPSHOT_FILE),
                Action::ToggleFullscreen => toggle_fullscreen(ctx.window()),
                Action::StartFlight => {
                    ctx.camera.controller.set_active(true);
                    grab_cursor(ctx.window(), true);
                }
                Action::ToMenu => {
                    ctx.camera.controller.set_active(false);
                    grab_cursor(ctx.window(), false);
                    ctx.window().set_title(&title);
                }
            }
            if suppress {
                ctx.camera.controller.suppress_next_tick();
            }
        }))
    }
}

impl GraphicsFlow for GameFlow {
    fn on_init(&mut self, ctx: &mut Context) -> Out {
        let size = ctx.window().inner_size();
        ctx.projection = Projection::new(size.width, size.height, &self.config.camera);
        ctx.camera.controller = CameraController::new(self.config.camera);
        ctx.camera.ground = Some(GroundMap::new(
            &self.heightmap,
            self.config.terrain.y_offset,
            self.config.terrain.width,
            self.config.terrain.height,
            self.config.sky_height,
        ));
        ctx.window().set_title(&self.config.window_title);
        ctx.write_camera();
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _dt: Duration) -> Out {
        if self.mode != Mode::Flight {
            return Out::Empty;
        }
        self.scene.advance();

        let sky: InstanceRaw = self.scene.sky.instance().to_raw();
        ctx.queue
            .write_buffer(&self.sky_rotation, 0, bytemuck::cast_slice(&[sky]));
        let dragons: Vec<InstanceRaw> = self
            .scene
            .dragon_instances()
            .iter()
            .map(Instance::to_raw)
            .collect();
        ctx.queue
            .write_buffer(&self.dragons, 0, bytemuck::cast_slice(&dragons));
        let player = player_instance(&ctx.camera.camera, self.config.player_distance).to_raw();
        ctx.queue
            .write_buffer(&self.player, 0, bytemuck::cast_slice(&[player]));

        let hud = hud_text(&ctx.camera.camera);
        if hud != self.hud {
            ctx.window()
                .set_title(&format!("{} | {}", self.config.window_title, hud));
            self.hud = hud;
        }
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, event: &WindowEvent) -> Out {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event),
            _ => Out::Empty,
        }
    }

    fn on_render(&self) -> Render<'_> {
        match self.mode {
            Mode::Menu => Render::GUI((&self.menu).into()),
            Mode::Flight => {
                let sky = self
                    .skyboxes
                    .get(self.scene.day_cycle.skybox_index())
                    .map_or(Render::None, |skybox| {
                        Render::Sky(Sky {
                            mesh: &self.sky_mesh,
                            skybox,
                            rotation: &self.sky_rotation,
                        })
                    });
                Render::Composed(vec![
                    sky,
                    Render::Terrain((&self.terrain).into()),
                    Render::Defaults(vec![
                        Instanced {
                            instance: &self.dragons,
                            model: &self.dragon,
                            amount: self.scene.dragons.len(),
                        },
                        Instanced {
                            instance: &self.player,
                            model: &self.dragon,
                            amount: 1,
                        },
                    ]),
                ])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_keys() {
        assert_eq!(action_for(Mode::Menu, KeyCode::Enter), Some(Action::StartFlight));
        assert_eq!(action_for(Mode::Menu, KeyCode::Escape), Some(Action::Quit));
        assert_eq!(action_for(Mode::Menu, KeyCode::KeyF), Some(Action::ToggleFullscreen));
        assert_eq!(action_for(Mode::Menu, KeyCode::KeyP), None);
    }

    #[test]
    fn flight_keys() {
        assert_eq!(action_for(Mode::Flight, KeyCode::Escape), Some(Action::ToMenu));
        assert_eq!(action_for(Mode::Flight, KeyCode::KeyP), Some(Action::Snapshot));
        assert_eq!(action_for(Mode::Flight, KeyCode::KeyF), Some(Action::ToggleFullscreen));
        assert_eq!(action_for(Mode::Flight, KeyCode::Enter), None);
        assert_eq!(action_for(Mode::Flight, KeyCode::KeyW), None);
    }

    #[test]
    fn mode_switches_suppress_the_next_tick() {
        assert_eq!(apply(Mode::Menu, Action::StartFlight), (Mode::Flight, true));
        assert_eq!(apply(Mode::Flight, Action::ToggleFullscreen), (Mode::Flight, true));
        assert_eq!(apply(Mode::Menu, Action::ToggleFullscreen), (Mode::Menu, true));
        assert_eq!(apply(Mode::Flight, Action::ToMenu), (Mode::Menu, false));
        assert_eq!(apply(Mode::Flight, Action::Snapshot), (Mode::Flight, false));
    }
}
