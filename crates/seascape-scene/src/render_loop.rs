//! Per-frame orchestration.
//!
//! The host calls [`RenderLoop::drain`] and then [`RenderLoop::tick`] from its
//! display-refresh callback. A tick advances animation exactly once, renders
//! exactly once, and re-arms the scheduler whether or not rendering failed.

use seascape_config::{RenderLoopConfig, WaveStep};
use serde::Serialize;

use crate::camera::PerspectiveCamera;
use crate::context::SceneContext;
use crate::environment::{EnvironmentLighting, SceneParameters};
use crate::error::{RenderError, SceneError};
use crate::events::{EventReceiver, SceneEvent};
use crate::graph::Scene;
use crate::lights::LightUniforms;
use crate::loader::LoadEvent;
use crate::panel::{self, EditOutcome, PanelParameters};
use crate::sky::SkyUniforms;
use crate::water::WaterUniforms;

/// Borrowed view of everything a renderer needs for one frame.
pub struct SceneFrame<'a> {
    pub scene: &'a Scene,
    pub camera: &'a PerspectiveCamera,
    pub params: &'a SceneParameters,
    pub sky: &'a SkyUniforms,
    pub water: &'a WaterUniforms,
    pub lights: LightUniforms,
    pub environment: &'a EnvironmentLighting,
}

/// Draws frames.
pub trait Renderer {
    fn render(&mut self, frame: &SceneFrame<'_>) -> Result<(), RenderError>;
    fn set_viewport_size(&mut self, width: u32, height: u32);
}

/// Arranges for the next tick at the host's next display refresh.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    /// Ticking every refresh. There is no stopped state; the loop ends with
    /// its host.
    Running,
}

/// Frame statistics published to the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub frame_count: u64,
    /// Clamped delta of the last tick, in seconds.
    pub last_delta: f64,
    /// Exponentially smoothed frames per second.
    pub fps: f64,
    pub render_errors: u64,
    pub wave_time: f64,
}

impl FrameStats {
    const FPS_SMOOTHING: f64 = 0.1;

    fn record(&mut self, delta: f64) {
        self.frame_count += 1;
        self.last_delta = delta;
        if delta > 0.0 {
            let instant = 1.0 / delta;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                self.fps + (instant - self.fps) * Self::FPS_SMOOTHING
            };
        }
    }
}

pub struct RenderLoop {
    ctx: SceneContext,
    config: RenderLoopConfig,
    last_time: Option<f64>,
    stats: FrameStats,
    state: LoopState,
    /// Set when the panel may show a value the scene did not take.
    panel_stale: bool,
}

impl RenderLoop {
    pub fn new(ctx: SceneContext, config: RenderLoopConfig) -> Self {
        Self {
            ctx,
            config,
            last_time: None,
            stats: FrameStats::default(),
            state: LoopState::Running,
            panel_stale: false,
        }
    }

    pub fn context(&self) -> &SceneContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut SceneContext {
        &mut self.ctx
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run one frame at host time `now_seconds`. Returns the delta used.
    pub fn tick(
        &mut self,
        now_seconds: f64,
        renderer: &mut dyn Renderer,
        scheduler: &mut dyn FrameScheduler,
    ) -> f64 {
        let delta = self.frame_delta(now_seconds);

        self.ctx.airplane.tick(&mut self.ctx.scene, delta as f32);
        let step = match self.config.wave_step {
            WaveStep::Fixed(step) => step,
            WaveStep::Scaled(rate) => rate * delta as f32,
        };
        self.ctx.environment.advance_wave_clock(step);

        let frame = SceneFrame {
            scene: &self.ctx.scene,
            camera: &self.ctx.camera,
            params: self.ctx.environment.params(),
            sky: self.ctx.environment.sky(),
            water: self.ctx.environment.water(),
            lights: self.ctx.lights.to_uniform(),
            environment: self.ctx.environment.lighting(),
        };
        if let Err(e) = renderer.render(&frame) {
            self.stats.render_errors += 1;
            tracing::error!("frame {} failed to render: {e}", self.stats.frame_count);
        }

        self.stats.record(delta);
        self.stats.wave_time = self.ctx.environment.wave_time();
        scheduler.request_frame();
        delta
    }

    fn frame_delta(&mut self, now: f64) -> f64 {
        let previous = self.last_time.replace(now);
        let Some(previous) = previous else {
            return 0.0;
        };
        let delta = (now - previous).max(0.0);
        if delta > self.config.max_frame_time {
            tracing::warn!(
                "frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                delta * 1000.0,
                self.config.max_frame_time * 1000.0
            );
            return self.config.max_frame_time;
        }
        delta
    }

    /// Apply one queued event.
    pub fn dispatch(
        &mut self,
        event: SceneEvent,
        renderer: &mut dyn Renderer,
    ) -> Result<(), SceneError> {
        match event {
            SceneEvent::Panel(edit) => {
                if panel::apply_edit(&mut self.ctx, edit)? == EditOutcome::Skipped {
                    tracing::debug!(field = edit.field.key(), "edit skipped, target not loaded");
                    self.panel_stale = true;
                }
            }
            SceneEvent::Load(LoadEvent::Progress { path, fraction }) => {
                tracing::info!("{}: {:.0}% loaded", path.display(), fraction * 100.0);
            }
            SceneEvent::Load(LoadEvent::Loaded(asset)) => {
                self.ctx.airplane.attach(&mut self.ctx.scene, &asset);
                self.panel_stale = true;
            }
            SceneEvent::Load(LoadEvent::Failed { path, error }) => {
                tracing::error!("failed to load {}: {error}", path.display());
            }
            SceneEvent::Resize { width, height } => {
                let (width, height) = (width.max(1), height.max(1));
                self.ctx.camera.set_aspect_ratio(width, height);
                renderer.set_viewport_size(width, height);
                tracing::debug!(width, height, "viewport resized");
            }
        }
        Ok(())
    }

    /// Current parameters if the panel needs rebinding since the last call:
    /// an edit was skipped, or the airplane attached. Clears the flag.
    pub fn take_panel_resync(&mut self) -> Option<PanelParameters> {
        std::mem::take(&mut self.panel_stale).then(|| self.ctx.panel_parameters())
    }

    /// Apply every pending event without blocking. Returns how many were
    /// applied; rejected events are logged and dropped.
    pub fn drain(&mut self, events: &EventReceiver, renderer: &mut dyn Renderer) -> usize {
        let mut applied = 0;
        for event in events.try_iter() {
            match self.dispatch(event, renderer) {
                Ok(()) => applied += 1,
                Err(e) => tracing::warn!("dropping event: {e}"),
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ModelAsset;
    use crate::panel::{PanelEdit, ParamField};
    use seascape_config::Config;

    #[derive(Default)]
    struct NullRenderer {
        frames: usize,
    }

    impl Renderer for NullRenderer {
        fn render(&mut self, _frame: &SceneFrame<'_>) -> Result<(), RenderError> {
            self.frames += 1;
            Ok(())
        }
        fn set_viewport_size(&mut self, _width: u32, _height: u32) {}
    }

    #[derive(Default)]
    struct CountingScheduler(usize);

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) {
            self.0 += 1;
        }
    }

    fn render_loop() -> RenderLoop {
        let config = Config::default();
        RenderLoop::new(SceneContext::from_config(&config), config.render_loop)
    }

    #[test]
    fn test_first_delta_is_zero() {
        let mut rl = render_loop();
        let (mut r, mut s) = (NullRenderer::default(), CountingScheduler::default());
        assert_eq!(rl.tick(100.0, &mut r, &mut s), 0.0);
        let delta = rl.tick(100.25, &mut r, &mut s);
        assert!((delta - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_delta_clamped() {
        let mut rl = render_loop();
        let (mut r, mut s) = (NullRenderer::default(), CountingScheduler::default());
        rl.tick(0.0, &mut r, &mut s);
        assert_eq!(rl.tick(5.0, &mut r, &mut s), 0.25);
        assert_eq!(rl.tick(4.0, &mut r, &mut s), 0.0);
    }

    #[test]
    fn test_stats_track_frames() {
        let mut rl = render_loop();
        let (mut r, mut s) = (NullRenderer::default(), CountingScheduler::default());
        for i in 0..4 {
            rl.tick(f64::from(i) * 0.02, &mut r, &mut s);
        }
        let stats = rl.stats();
        assert_eq!(stats.frame_count, 4);
        assert!((stats.fps - 50.0).abs() < 1e-6);
        assert_eq!(r.frames, 4);
        assert_eq!(s.0, 4);
        assert_eq!(rl.state(), LoopState::Running);
    }

    #[test]
    fn test_scaled_wave_step() {
        let mut config = Config::default();
        config.render_loop.wave_step = WaveStep::Scaled(2.0);
        let mut rl = RenderLoop::new(SceneContext::from_config(&config), config.render_loop);
        let (mut r, mut s) = (NullRenderer::default(), CountingScheduler::default());
        rl.tick(1.0, &mut r, &mut s);
        rl.tick(1.125, &mut r, &mut s);
        assert!((rl.context().environment.wave_time() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_skipped_edit_and_attach_request_panel_resync() {
        let mut rl = render_loop();
        let mut r = NullRenderer::default();
        assert!(rl.take_panel_resync().is_none());

        let toggle = PanelEdit::boolean(ParamField::AirplaneRotation, false);
        rl.dispatch(SceneEvent::Panel(toggle), &mut r).unwrap();
        let params = rl.take_panel_resync().unwrap();
        assert!(params.airplane_rotation);
        assert!(rl.take_panel_resync().is_none());

        let size = PanelEdit::number(ParamField::WaterSize, 3.0);
        rl.dispatch(SceneEvent::Panel(size), &mut r).unwrap();
        assert!(rl.take_panel_resync().is_none());

        let asset = ModelAsset {
            source: "resources/A380/scene.gltf".into(),
            bytes: b"glTF".to_vec(),
        };
        rl.dispatch(SceneEvent::Load(LoadEvent::Loaded(asset)), &mut r)
            .unwrap();
        assert!(rl.take_panel_resync().is_some());

        rl.dispatch(SceneEvent::Panel(toggle), &mut r).unwrap();
        assert!(rl.take_panel_resync().is_none());
        assert!(!rl.context().airplane.state().rotation_enabled);
    }
}
