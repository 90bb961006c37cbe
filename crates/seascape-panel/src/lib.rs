//! HTTP control panel for a running Seascape.
//!
//! The scene registers its parameters through [`HttpPanel`], which records the
//! folder/control layout into a [`PanelState`] shared with the
//! [`PanelServer`]. Edits posted to the server are clamped to the control's
//! bounds and forwarded to the render loop as scene events.

pub mod server;

pub use server::{PanelServer, PanelServerError};


use std::sync::{Arc, Mutex};

use seascape_config::PanelConfig;
use seascape_scene::{
    ControlKind, ControlPanel, Folder, FrameStats, NumberRange, PanelParameters, ParamField,
    ParamValue, Rgb, bind_controls,
};
use serde::Serialize;

/// One bound control as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelControl {
    pub field: ParamField,
    pub label: &'static str,
    pub kind: ControlKind,
    pub value: ParamValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<NumberRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelFolder {
    pub folder: Folder,
    pub label: &'static str,
    pub controls: Vec<PanelControl>,
}

/// State shared between the render loop and the panel server.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PanelState {
    pub folders: Vec<PanelFolder>,
    pub stats: FrameStats,
    pub uptime_seconds: f64,
    pub window_width: u32,
    pub window_height: u32,
    pub quit_requested: bool,
}

pub type SharedPanelState = Arc<Mutex<PanelState>>;

impl PanelState {
    pub fn shared() -> SharedPanelState {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn control(&self, field: ParamField) -> Option<&PanelControl> {
        self.folders
            .iter()
            .flat_map(|folder| folder.controls.iter())
            .find(|control| control.field == field)
    }

    /// Store a new value for a bound control. Returns `false` if the field
    /// was never bound.
    pub fn set_value(&mut self, field: ParamField, value: ParamValue) -> bool {
        let control = self
            .folders
            .iter_mut()
            .flat_map(|folder| folder.controls.iter_mut())
            .find(|control| control.field == field);
        match control {
            Some(control) => {
                control.value = value;
                true
            }
            None => false,
        }
    }

    fn folder_mut(&mut self, folder: Folder) -> &mut PanelFolder {
        let index = match self.folders.iter().position(|f| f.folder == folder) {
            Some(index) => index,
            None => {
                self.folders.push(PanelFolder {
                    folder,
                    label: folder.label(),
                    controls: Vec::new(),
                });
                self.folders.len() - 1
            }
        };
        &mut self.folders[index]
    }

    fn bind(&mut self, field: ParamField, value: ParamValue, range: Option<NumberRange>) {
        let control = PanelControl {
            field,
            label: field.label(),
            kind: field.kind(),
            value,
            range,
        };
        let folder = self.folder_mut(field.folder());
        match folder.controls.iter_mut().find(|c| c.field == field) {
            Some(existing) => *existing = control,
            None => folder.controls.push(control),
        }
    }
}

/// [`ControlPanel`] that records bindings into the shared panel state.
#[derive(Debug, Clone)]
pub struct HttpPanel {
    state: SharedPanelState,
}

impl HttpPanel {
    pub fn new(state: SharedPanelState) -> Self {
        Self { state }
    }

    /// Rewrite every control from the scene's live values. Used when posted
    /// values were not taken by the scene.
    pub fn resync(&mut self, params: &PanelParameters) {
        bind_controls(self, params);
    }

    fn with_state(&self, f: impl FnOnce(&mut PanelState)) {
        match self.state.lock() {
            Ok(mut state) => f(&mut state),
            Err(_) => tracing::error!("panel state poisoned, binding dropped"),
        }
    }
}

impl ControlPanel for HttpPanel {
    fn add_folder(&mut self, folder: Folder) {
        self.with_state(|state| {
            state.folder_mut(folder);
        });
    }

    fn bind_number(&mut self, field: ParamField, initial: f64, range: NumberRange) {
        self.with_state(|state| state.bind(field, ParamValue::Number(initial), Some(range)));
    }

    fn bind_boolean(&mut self, field: ParamField, initial: bool) {
        self.with_state(|state| state.bind(field, ParamValue::Boolean(initial), None));
    }

    fn bind_color(&mut self, field: ParamField, initial: Rgb) {
        self.with_state(|state| state.bind(field, ParamValue::Color(initial), None));
    }
}

/// Create a panel server if the panel is enabled.
pub fn create_panel_server(config: &PanelConfig) -> Option<PanelServer> {
    config
        .enabled
        .then(|| PanelServer::new(get_panel_port(config.port)))
}

/// Port from `SEASCAPE_PANEL_PORT`, or `default`.
pub fn get_panel_port(default: u16) -> u16 {
    std::env::var("SEASCAPE_PANEL_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
