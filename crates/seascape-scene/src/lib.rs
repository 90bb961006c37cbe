//! Scene core: environment, lights, airplane, panel binding and the render loop.
//!
//! All mutation happens on the thread that owns the [`RenderLoop`]. Panel
//! edits, asset-load callbacks and viewport resizes arrive as [`SceneEvent`]s
//! on a single queue and are applied between frames.

pub mod airplane;
pub mod camera;
pub mod color;
pub mod context;
pub mod environment;
pub mod error;
pub mod events;
pub mod graph;
pub mod lights;
pub mod loader;
pub mod panel;
pub mod render_loop;
pub mod sky;
pub mod sun;
pub mod water;

pub use airplane::{AirplaneActor, AirplaneState, Axis};
pub use camera::{CameraUniform, OrbitLimits, PerspectiveCamera};
pub use color::{ParseRgbError, Rgb};
pub use context::SceneContext;
pub use environment::{
    EnvironmentBaker, EnvironmentLighting, EnvironmentModel, Layer, SceneParameters, SkyLightBaker,
};
pub use error::{LoadError, RenderError, SceneError};
pub use events::{EventReceiver, EventSender, SceneEvent, event_queue};
pub use graph::{NodeId, NodeKind, Scene, SceneNode, Transform};
pub use lights::{AmbientLight, LightRig, LightUniforms, PointLight};
pub use loader::{AssetLoader, FileAssetLoader, LoadCallbacks, LoadEvent, ModelAsset};
pub use panel::{
    ControlKind, ControlPanel, EditOutcome, Folder, NumberRange, PanelEdit, PanelParameters,
    ParamField, ParamValue, apply_edit, bind_controls,
};
pub use render_loop::{FrameScheduler, FrameStats, LoopState, RenderLoop, Renderer, SceneFrame};
pub use sky::SkyUniforms;
pub use sun::{SunAngles, sun_direction};
pub use water::{WaterUniforms, WaveClock};
