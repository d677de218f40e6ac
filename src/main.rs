use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use ring_road::cli::Cli;
use ring_road::config::SceneParams;
use ring_road::core::{Clock, FpsCounter, InputAction, WinitController};
use ring_road::driver::{FrameDriver, FrameState};
use ring_road::error::RenderError;
use ring_road::gui::DebugGui;
use ring_road::loaders::{load_alpha_map, AlphaMap};
use ring_road::renderer::SceneRenderer;
use ring_road::scene::{compose_scene, Scene};

// === Constants ===

const FPS_UPDATE_INTERVAL: f32 = 1.0;
const INITIAL_WINDOW_WIDTH: u32 = 800;
const INITIAL_WINDOW_HEIGHT: u32 = 600;

// === Application State ===

struct App {
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    scene: Scene,
    /// Taken out for the duration of each driver step
    state: Option<FrameState>,
    driver: FrameDriver,
    rng: StdRng,
    star_alpha: AlphaMap,
    controller: WinitController,
    gui: DebugGui,
    clock: Clock,
    fps: FpsCounter,
}

impl App {
    /// Load parameters and assets and compose the scene; nothing here needs a window
    fn from_cli(cli: &Cli) -> Result<Self> {
        let params = match &cli.config {
            Some(path) => SceneParams::load(path)
                .with_context(|| format!("Failed to load scene parameters from {}", path.display()))?,
            None => SceneParams::default(),
        };
        let driver = FrameDriver::new(&params).context("Invalid scene parameters")?;

        let mut rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let texture_path = cli.star_texture_or(&params.stars.texture);
        let star_alpha = load_alpha_map(&texture_path).context("Failed to load star texture")?;

        let aspect = INITIAL_WINDOW_WIDTH as f32 / INITIAL_WINDOW_HEIGHT as f32;
        let composition = compose_scene(&params, aspect, &mut rng);
        let state = FrameState::from_composition(&composition);

        log::info!(
            "Scene composed: {} stars, ring with {} segments at z={}",
            params.stars.count,
            params.ring.initial_segments,
            params.ring.initial_z
        );

        Ok(Self {
            window: None,
            renderer: None,
            gui: DebugGui::from_scene(&composition.scene, !cli.no_ui),
            scene: composition.scene,
            state: Some(state),
            driver,
            rng,
            star_alpha,
            controller: WinitController::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT),
            clock: Clock::new(),
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
        })
    }

    fn apply_action(&mut self, event_loop: &ActiveEventLoop, action: InputAction) {
        match action {
            InputAction::Walk(direction) => self.scene.camera.walk(direction),
            InputAction::Look { x, y } => self.scene.camera.look(x, y),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    let fullscreen = window.fullscreen().is_none();
                    window.set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
                    log::info!("Fullscreen {}", if fullscreen { "on" } else { "off" });
                }
            }
            InputAction::Exit => event_loop.exit(),
        }
    }

    /// Window size or scale factor changed
    fn resize(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        let size = window.inner_size();
        self.controller.set_viewport(size.width, size.height);
        self.scene.camera.set_viewport(size.width, size.height);
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(window);
            let (width, height) = renderer.size();
            log::info!(
                "Resized to {}x{} (drawing at {}x{}, scale {:.2})",
                size.width,
                size.height,
                width,
                height,
                window.scale_factor()
            );
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let frame = self.clock.tick();
        if let Some(fps) = self.fps.tick(frame.delta) {
            log::debug!("{:.1} FPS", fps);
        }

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };
        let Some(state) = self.state.take() else {
            return;
        };

        let (state, output) = self
            .driver
            .step(&self.scene, state, frame.elapsed, &mut self.rng);

        if output.started {
            log::debug!("Ring {:?} advancing at t={:.2}", state.ring.node.id, frame.elapsed);
        }
        if let Some(recycled) = output.recycled {
            log::debug!(
                "Recycled ring {:?} -> {:?} with {} segments",
                recycled.retired,
                recycled.spawned,
                recycled.theta_segments
            );
            renderer.sync_ring(recycled.retired, &state.ring.node);
        }

        self.gui.sync_from(&self.scene);
        match renderer.render(window, &self.scene, &output.commands, &mut self.gui, self.fps.fps()) {
            Ok(true) => self.gui.apply(&mut self.scene),
            Ok(false) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("Out of GPU memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {}", e),
        }

        self.state = Some(state);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Ring Road")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    INITIAL_WINDOW_WIDTH,
                    INITIAL_WINDOW_HEIGHT,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let Some(state) = &self.state else {
            return;
        };
        let renderer = match pollster::block_on(SceneRenderer::new(
            window.clone(),
            &self.scene,
            &state.ring.node,
            &self.star_alpha,
        )) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.controller.set_viewport(size.width, size.height);
        self.scene.camera.set_viewport(size.width, size.height);

        self.window = Some(window);
        self.renderer = Some(renderer);
        // Time starts with the first frame the window can show
        self.clock = Clock::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => self.resize(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                if let Some(action) = self.controller.process_event(&other) {
                    self.apply_action(event_loop, action);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut app = App::from_cli(&cli).inspect_err(|e| log::error!("{:#}", e))?;
    let event_loop = EventLoop::new().context("Failed to create event loop")?;

    log::info!("Ring Road - Controls: W/S or arrows to walk, mouse to look, double-click for fullscreen, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
