//! Flow control and application event loop.
//!
//! A "flow" is a self contained part of the game (the world, the menu) that
//! reacts to input, advances its state and says what to draw each frame. The
//! engine owns the window and GPU context and drives all flows in order.
//!
//! # Lifecycle
//!
//! Each frame the loop:
//! 1. forwards window and device events to the camera controller and window
//!    events to every flow
//! 2. collects `on_render` of all flows into per pipeline batches
//! 3. draws sky, terrain, models and overlays, in that order, and presents
//! 4. writes a snapshot if one was requested
//! 5. moves the camera and calls `on_update`

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::Instant;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::{model::DrawModel, texture::Texture},
    pipelines::sky::DrawSky,
    render::{Batches, Render},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

///
/// This is the Output Type for every lifecycle hook.
///
/// `Out::Configure` modifies the Context at runtime, for instance to toggle the camera
/// controller or request a snapshot.
///
/// `Empty` is the default output used when nothing needs to change.
///
pub enum Out {
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl Default for Out {
    fn default() -> Self {
        Self::Empty
    }
}

impl Out {
    /// Run the configuration against `ctx`, if there is one.
    pub fn apply(self, ctx: &mut Context) {
        match self {
            Out::Configure(f) => f(ctx),
            Out::Empty => (),
        }
    }
}

/// Trait for a renderable part of the game.
///
/// 1. `on_init()` is called once after every flow was constructed
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame after the camera moved
/// 4. `on_render()` is called each frame and specifies how to render `self`
pub trait GraphicsFlow {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context) -> Out;

    /// Called every frame with the elapsed time `dt`.
    fn on_update(&mut self, ctx: &Context, dt: instant::Duration) -> Out;

    /// Handle window events (keyboard, focus, resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, event: &WindowEvent) -> Out;

    /// What to draw this frame.
    fn on_render(&self) -> Render<'_>;
}

// Dummy impl to make wasm work
impl Debug for dyn GraphicsFlow + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// A flow factory. Loading happens in the returned future so that it can run
/// on the async runtime of the platform; a failed load aborts startup.
pub type FlowConsturctor = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow>>>>>,
>;

/// Application state bundle: GPU context and surface status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

/// Record one full frame of all flows into `encoder`.
fn encode_frame(
    ctx: &Context,
    graphics_flows: &[Box<dyn GraphicsFlow>],
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    depth: &wgpu::TextureView,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(ctx.clear_colour),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
        multiview_mask: None,
    });

    let mut batches = Batches::default();
    graphics_flows
        .iter()
        .for_each(|flow| flow.on_render().set_pipelines(&mut batches));

    render_pass.set_pipeline(&ctx.pipelines.sky);
    for sky in batches.skies {
        render_pass.draw_sky(sky.mesh, sky.skybox, sky.rotation, &ctx.camera.bind_group);
    }

    render_pass.set_pipeline(&ctx.pipelines.terrain);
    render_pass.set_bind_group(0, &ctx.camera.bind_group, &[]);
    render_pass.set_bind_group(1, &ctx.light.bind_group, &[]);
    for terrain in batches.terrain {
        render_pass.set_vertex_buffer(0, terrain.vertex.slice(..));
        render_pass.set_index_buffer(terrain.index.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..terrain.amount as u32, 0, 0..1);
    }

    render_pass.set_pipeline(&ctx.pipelines.model);
    for instanced in batches.models {
        if instanced.amount == 0 || instanced.instance.size() == 0 {
            log::warn!("you attemted to render something with zero instances");
            continue;
        }
        render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
        render_pass.draw_model_instanced(
            instanced.model,
            0..instanced.amount as u32,
            &ctx.camera.bind_group,
            &ctx.light.bind_group,
        );
    }

    render_pass.set_pipeline(&ctx.pipelines.gui);
    for overlay in batches.guis {
        if let Some(group) = overlay.group {
            render_pass.set_bind_group(0, group, &[]);
        }
        render_pass.set_vertex_buffer(0, overlay.vertex.slice(..));
        render_pass.set_index_buffer(overlay.index.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..overlay.amount as u32, 0, 0..1);
    }
}

impl AppState {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    fn render(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow>],
        #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    ) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        encode_frame(
            &self.ctx,
            graphics_flows,
            &mut encoder,
            &view,
            &self.ctx.depth_texture.view,
        );
        self.ctx.queue.submit(iter::once(encoder.finish()));

        if let Some(path) = self.ctx.snapshot.take() {
            #[cfg(not(target_arch = "wasm32"))]
            self.snapshot(graphics_flows, async_runtime, &path);
            #[cfg(target_arch = "wasm32")]
            log::warn!("snapshots are not available in the browser, skipping {}", path.display());
        }

        output.present();
        Ok(())
    }

    /// Draw the frame again offscreen and write it to `path`.
    #[cfg(not(target_arch = "wasm32"))]
    fn snapshot(
        &self,
        graphics_flows: &[Box<dyn GraphicsFlow>],
        async_runtime: &tokio::runtime::Runtime,
        path: &std::path::Path,
    ) {
        let snapshot = crate::snapshot::Snapshot::new(&self.ctx.device, &self.ctx.config);
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Snapshot Encoder"),
            });
        encode_frame(
            &self.ctx,
            graphics_flows,
            &mut encoder,
            &snapshot.view(),
            &snapshot.depth.view,
        );
        snapshot.copy(&mut encoder);
        self.ctx.queue.submit(iter::once(encoder.finish()));
        if let Err(e) = async_runtime.block_on(snapshot.save(&self.ctx.device, path)) {
            log::error!("snapshot failed: {e:#}");
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[cfg(target_arch = "wasm32")]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow>>,
    // Taken on the first `resumed`.
    constructors: Option<Vec<FlowConsturctor>>,
    last_time: Instant,
}

impl App {
    fn new(
        #[allow(unused_variables)] event_loop: &EventLoop<FlowEvent>,
        constructors: Vec<FlowConsturctor>,
    ) -> anyhow::Result<Self> {
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            #[cfg(target_arch = "wasm32")]
            proxy: event_loop.create_proxy(),
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        })
    }

    fn init_flows(&mut self, app_state: &mut AppState) {
        self.graphics_flows
            .iter_mut()
            .for_each(|flow| flow.on_init(&mut app_state.ctx).apply(&mut app_state.ctx));
    }
}

/// Messages from the browser's async loader back into the event loop.
///
/// Native builds load synchronously on the tokio runtime and never send any.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) enum FlowEvent {
    Initialized {
        state: AppState,
        flows: Vec<Box<dyn GraphicsFlow>>,
    },
    Exit,
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            // Already initialised, e.g. resumed again after a suspend.
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes();

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create the window: {e}");
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;

            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows = futures::future::join_all(flow_futures)
                .await
                .into_iter()
                .collect::<anyhow::Result<Vec<_>>>()?;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((mut app_state, flows)) => {
                    self.graphics_flows = flows;
                    self.init_flows(&mut app_state);
                    self.state = Some(app_state);
                }
                Err(e) => {
                    log::error!("App initialization failed: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok((state, flows)) => {
                        assert!(
                            proxy
                                .send_event(FlowEvent::Initialized { state, flows })
                                .is_ok()
                        );
                    }
                    Err(e) => {
                        log::error!("App initialization failed: {e:#}");
                        let _ = proxy.send_event(FlowEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // This is the message from our wasm `spawn_local`
                let mut app_state = state;
                self.graphics_flows = flows;

                // Important: Trigger a resize and redraw now that we are initialized
                let size = app_state.ctx.window.inner_size();
                app_state.resize(size.width, size.height);
                self.init_flows(&mut app_state);
                app_state.ctx.window.request_redraw();
                self.state = Some(app_state);
            }
            FlowEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // general stuff
        state.ctx.camera.controller.handle_window_events(&event);

        self.graphics_flows.iter_mut().for_each(|f| {
            f.on_window_events(&state.ctx, &event).apply(&mut state.ctx);
        });

        if state.ctx.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(
                    &self.graphics_flows,
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                ) {
                    Ok(_) => {
                        // Move the camera
                        state.ctx.camera.update(dt);
                        state.ctx.write_camera();
                        // Update custom stuff
                        self.graphics_flows.iter_mut().for_each(|f| {
                            f.on_update(&state.ctx, dt).apply(&mut state.ctx);
                        });
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn run(constructors: Vec<FlowConsturctor>) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_changes_nothing() {
        assert!(matches!(Out::default(), Out::Empty));
    }
}
