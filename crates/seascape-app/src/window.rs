//! Window creation and event handling via winit.
//!
//! [`SeascapeApp`] implements winit's [`ApplicationHandler`]. Each
//! `RedrawRequested` is one display refresh: queued events are applied, the
//! render loop ticks once, and the tick re-arms the next redraw.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use seascape_config::Config;
use seascape_panel::{HttpPanel, PanelServer, PanelState, SharedPanelState, create_panel_server};
use seascape_scene::{
    AssetLoader, EventReceiver, EventSender, FileAssetLoader, FrameScheduler, LoadCallbacks,
    RenderLoop, SceneContext, SceneEvent, event_queue,
};
use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::gpu::init_gpu_blocking;
use crate::renderer::WgpuRenderer;

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Re-arms the loop through the window's redraw request.
struct RedrawScheduler<'a> {
    window: &'a Window,
}

impl FrameScheduler for RedrawScheduler<'_> {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }
}

pub struct SeascapeApp {
    config: Config,
    resource_root: PathBuf,
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    render_loop: RenderLoop,
    events_tx: EventSender,
    events_rx: EventReceiver,
    panel_state: SharedPanelState,
    panel: HttpPanel,
    panel_server: Option<PanelServer>,
    start_time: Instant,
}

impl SeascapeApp {
    /// `resource_root` resolves relative model paths.
    pub fn new(config: Config, resource_root: PathBuf) -> Self {
        let ctx = SceneContext::from_config(&config);
        let panel_state = PanelState::shared();
        let mut panel = HttpPanel::new(panel_state.clone());
        panel.resync(&ctx.panel_parameters());

        let (events_tx, events_rx) = event_queue();
        let render_loop = RenderLoop::new(ctx, config.render_loop.clone());
        let panel_server = create_panel_server(&config.panel);

        Self {
            config,
            resource_root,
            window: None,
            renderer: None,
            render_loop,
            events_tx,
            events_rx,
            panel_state,
            panel,
            panel_server,
            start_time: Instant::now(),
        }
    }

    fn start_airplane_load(&self) {
        let path = self.config.airplane.model_path.clone();
        info!("loading airplane from {}", path.display());
        let callbacks = LoadCallbacks::new(path.clone(), self.events_tx.clone());
        FileAssetLoader::new(&self.resource_root).load(&path, callbacks);
    }

    fn start_panel(&mut self) {
        let Some(server) = self.panel_server.as_mut() else {
            return;
        };
        if let Err(e) = server.start(self.panel_state.clone(), self.events_tx.clone()) {
            warn!("failed to start control panel: {e}");
            self.panel_server = None;
        }
    }

    fn queue_resize(&self, width: u32, height: u32) {
        // The receiver lives in self, so the queue cannot be closed here.
        let _ = self.events_tx.send(SceneEvent::Resize { width, height });
    }

    /// Publish frame statistics and return whether a quit was requested.
    fn publish_stats(&self) -> bool {
        let Some(window) = &self.window else {
            return false;
        };
        let size = window.inner_size();
        match self.panel_state.lock() {
            Ok(mut state) => {
                state.stats = self.render_loop.stats();
                state.uptime_seconds = self.start_time.elapsed().as_secs_f64();
                state.window_width = size.width;
                state.window_height = size.height;
                state.quit_requested
            }
            Err(_) => false,
        }
    }
}

impl ApplicationHandler for SeascapeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match init_gpu_blocking(window.clone(), self.config.window.vsync) {
            Ok(gpu) => self.renderer = Some(WgpuRenderer::new(gpu)),
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        }

        let size = window.inner_size();
        info!(
            "window created: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );
        self.queue_resize(size.width, size.height);
        self.start_panel();
        self.start_airplane_load();

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.queue_resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.queue_resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
                    return;
                };
                self.render_loop.drain(&self.events_rx, renderer);
                if let Some(params) = self.render_loop.take_panel_resync() {
                    self.panel.resync(&params);
                }
                let now = self.start_time.elapsed().as_secs_f64();
                let mut scheduler = RedrawScheduler { window };
                self.render_loop.tick(now, renderer, &mut scheduler);

                if self.publish_stats() {
                    info!("quit requested from control panel");
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}

/// Create an event loop and run the app until the window closes.
pub fn run(config: Config, resource_root: PathBuf) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = SeascapeApp::new(config, resource_root);
    event_loop.run_app(&mut app)
}
