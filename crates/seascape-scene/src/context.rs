use seascape_config::Config;

use crate::airplane::AirplaneActor;
use crate::camera::PerspectiveCamera;
use crate::environment::{EnvironmentBaker, EnvironmentModel, SkyLightBaker};
use crate::graph::Scene;
use crate::lights::LightRig;
use crate::panel::PanelParameters;

/// Everything the render loop and panel edits operate on.
pub struct SceneContext {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub environment: EnvironmentModel,
    pub lights: LightRig,
    pub airplane: AirplaneActor,
}

impl SceneContext {
    pub fn from_config(config: &Config) -> Self {
        Self::with_baker(config, Box::new(SkyLightBaker::new()))
    }

    /// Build with a custom environment baker.
    pub fn with_baker(config: &Config, baker: Box<dyn EnvironmentBaker>) -> Self {
        let mut scene = Scene::new();
        let aspect = config.window.width.max(1) as f32 / config.window.height.max(1) as f32;
        let camera = PerspectiveCamera::from_config(&config.camera, aspect);
        let environment = EnvironmentModel::new(&mut scene, config, baker);
        let lights = LightRig::new(&mut scene, &config.lighting);
        let airplane = AirplaneActor::new(&config.airplane);

        tracing::debug!(nodes = scene.len(), "scene context ready");
        Self {
            scene,
            camera,
            environment,
            lights,
            airplane,
        }
    }

    /// Current values of every panel-bound field.
    pub fn panel_parameters(&self) -> PanelParameters {
        PanelParameters::capture(self)
    }
}
