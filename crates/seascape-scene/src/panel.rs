//! Control-panel binding.
//!
//! A flat, named parameter set ([`ParamField`]) is registered with an external
//! [`ControlPanel`] and every edit coming back is translated into exactly one
//! mutation on the environment, light rig or airplane. Edits never render;
//! drawing belongs to the render loop alone.

use serde::{Deserialize, Serialize};

use crate::airplane::Axis;
use crate::color::Rgb;
use crate::context::SceneContext;
use crate::environment::Layer;
use crate::error::SceneError;

/// Panel sections, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Folder {
    Sky,
    Water,
    Airplane,
    Lighting,
    Layers,
}

impl Folder {
    pub const ALL: [Folder; 5] = [
        Folder::Sky,
        Folder::Water,
        Folder::Airplane,
        Folder::Lighting,
        Folder::Layers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Folder::Sky => "Sky",
            Folder::Water => "Water",
            Folder::Airplane => "Airplane",
            Folder::Lighting => "Lighting",
            Folder::Layers => "Layers",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    Number,
    Boolean,
    Color,
}

/// Slider bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumberRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NumberRange {
    const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp to `[min, max]` and snap to the step grid anchored at `min`.
    pub fn snap(&self, value: f64) -> f64 {
        let clamped = value.clamp(self.min, self.max);
        if self.step <= 0.0 {
            return clamped;
        }
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

/// A value carried by a panel control.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Boolean(bool),
    Color(Rgb),
}

impl ParamValue {
    pub fn kind(&self) -> ControlKind {
        match self {
            ParamValue::Number(_) => ControlKind::Number,
            ParamValue::Boolean(_) => ControlKind::Boolean,
            ParamValue::Color(_) => ControlKind::Color,
        }
    }
}

/// Every field the panel binds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    SunInclination,
    SunAzimuth,
    DistortionScale,
    WaterSize,
    AirplaneRotation,
    AirplanePositionX,
    AirplanePositionY,
    AirplanePositionZ,
    AirplaneScale,
    AmbientColor,
    AmbientIntensity,
    PointColor,
    PointIntensity,
    PointDecay,
    PointRange,
    SkyVisible,
    WaterVisible,
    TerrainVisible,
}

impl ParamField {
    pub const ALL: [ParamField; 18] = [
        ParamField::SunInclination,
        ParamField::SunAzimuth,
        ParamField::DistortionScale,
        ParamField::WaterSize,
        ParamField::AirplaneRotation,
        ParamField::AirplanePositionX,
        ParamField::AirplanePositionY,
        ParamField::AirplanePositionZ,
        ParamField::AirplaneScale,
        ParamField::AmbientColor,
        ParamField::AmbientIntensity,
        ParamField::PointColor,
        ParamField::PointIntensity,
        ParamField::PointDecay,
        ParamField::PointRange,
        ParamField::SkyVisible,
        ParamField::WaterVisible,
        ParamField::TerrainVisible,
    ];

    /// Stable machine name, as used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            ParamField::SunInclination => "sun_inclination",
            ParamField::SunAzimuth => "sun_azimuth",
            ParamField::DistortionScale => "distortion_scale",
            ParamField::WaterSize => "water_size",
            ParamField::AirplaneRotation => "airplane_rotation",
            ParamField::AirplanePositionX => "airplane_position_x",
            ParamField::AirplanePositionY => "airplane_position_y",
            ParamField::AirplanePositionZ => "airplane_position_z",
            ParamField::AirplaneScale => "airplane_scale",
            ParamField::AmbientColor => "ambient_color",
            ParamField::AmbientIntensity => "ambient_intensity",
            ParamField::PointColor => "point_color",
            ParamField::PointIntensity => "point_intensity",
            ParamField::PointDecay => "point_decay",
            ParamField::PointRange => "point_range",
            ParamField::SkyVisible => "sky_visible",
            ParamField::WaterVisible => "water_visible",
            ParamField::TerrainVisible => "terrain_visible",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }

    /// Human-facing label shown next to the control.
    pub fn label(self) -> &'static str {
        match self {
            ParamField::SunInclination => "inclination",
            ParamField::SunAzimuth => "azimuth",
            ParamField::DistortionScale => "distortionScale",
            ParamField::WaterSize => "size",
            ParamField::AirplaneRotation => "rotation",
            ParamField::AirplanePositionX => "positionX",
            ParamField::AirplanePositionY => "positionY",
            ParamField::AirplanePositionZ => "positionZ",
            ParamField::AirplaneScale => "scale",
            ParamField::AmbientColor => "ambient color",
            ParamField::AmbientIntensity => "ambient intensity",
            ParamField::PointColor => "pointLight color",
            ParamField::PointIntensity => "pointLight intensity",
            ParamField::PointDecay => "pointLight decay",
            ParamField::PointRange => "pointLight range",
            ParamField::SkyVisible => "sky",
            ParamField::WaterVisible => "water",
            ParamField::TerrainVisible => "terrain",
        }
    }

    pub fn folder(self) -> Folder {
        use ParamField::*;
        match self {
            SunInclination | SunAzimuth => Folder::Sky,
            DistortionScale | WaterSize => Folder::Water,
            AirplaneRotation | AirplanePositionX | AirplanePositionY | AirplanePositionZ
            | AirplaneScale => Folder::Airplane,
            AmbientColor | AmbientIntensity | PointColor | PointIntensity | PointDecay
            | PointRange => Folder::Lighting,
            SkyVisible | WaterVisible | TerrainVisible => Folder::Layers,
        }
    }

    pub fn kind(self) -> ControlKind {
        use ParamField::*;
        match self {
            AirplaneRotation | SkyVisible | WaterVisible | TerrainVisible => ControlKind::Boolean,
            AmbientColor | PointColor => ControlKind::Color,
            _ => ControlKind::Number,
        }
    }

    /// Slider bounds for numeric fields.
    pub fn range(self) -> Option<NumberRange> {
        use ParamField::*;
        let range = match self {
            SunInclination => NumberRange::new(0.0, 0.5, 0.0001),
            SunAzimuth => NumberRange::new(0.0, 1.0, 0.0001),
            DistortionScale => NumberRange::new(0.0, 8.0, 0.1),
            WaterSize => NumberRange::new(0.1, 10.0, 0.1),
            AirplanePositionX | AirplanePositionZ => NumberRange::new(-50.0, 50.0, 0.1),
            AirplanePositionY => NumberRange::new(-10.0, 50.0, 0.1),
            AirplaneScale => NumberRange::new(0.5, 2.0, 0.1),
            AmbientIntensity => NumberRange::new(0.001, 1.0, 0.0001),
            PointIntensity => NumberRange::new(0.001, 2.0, 0.0001),
            PointDecay => NumberRange::new(0.0, 4.0, 0.1),
            PointRange => NumberRange::new(0.0, 500.0, 1.0),
            _ => return None,
        };
        Some(range)
    }

    /// Coerce an incoming value into this field's kind and bounds, the way a
    /// slider would. Integral numbers are accepted for color fields.
    pub fn sanitize(self, value: ParamValue) -> Result<ParamValue, SceneError> {
        let mismatch = || SceneError::ValueKind {
            field: self,
            expected: self.kind(),
        };
        match (self.kind(), value) {
            (ControlKind::Number, ParamValue::Number(v)) if v.is_finite() => {
                let range = self.range().ok_or_else(mismatch)?;
                Ok(ParamValue::Number(range.snap(v)))
            }
            (ControlKind::Boolean, ParamValue::Boolean(_)) => Ok(value),
            (ControlKind::Color, ParamValue::Color(_)) => Ok(value),
            (ControlKind::Color, ParamValue::Number(v))
                if v.fract() == 0.0 && (0.0..=f64::from(0x00ff_ffff_u32)).contains(&v) =>
            {
                Ok(ParamValue::Color(Rgb::from_hex(v as u32)))
            }
            _ => Err(mismatch()),
        }
    }
}

/// One edit coming back from the panel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelEdit {
    pub field: ParamField,
    pub value: ParamValue,
}

impl PanelEdit {
    pub fn new(field: ParamField, value: ParamValue) -> Self {
        Self { field, value }
    }

    pub fn number(field: ParamField, value: f64) -> Self {
        Self::new(field, ParamValue::Number(value))
    }

    pub fn boolean(field: ParamField, value: bool) -> Self {
        Self::new(field, ParamValue::Boolean(value))
    }

    pub fn color(field: ParamField, value: Rgb) -> Self {
        Self::new(field, ParamValue::Color(value))
    }
}

/// Result of applying an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The target does not exist yet (e.g. the airplane is still loading).
    Skipped,
}

/// The flat record of values shown by the panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelParameters {
    pub sun_inclination: f32,
    pub sun_azimuth: f32,
    pub distortion_scale: f32,
    pub water_size: f32,
    pub airplane_rotation: bool,
    pub airplane_position: [f32; 3],
    pub airplane_scale: f32,
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub point_color: Rgb,
    pub point_intensity: f32,
    pub point_decay: f32,
    pub point_range: f32,
    pub sky_visible: bool,
    pub water_visible: bool,
    pub terrain_visible: bool,
}

impl PanelParameters {
    /// Read the live values out of a scene context.
    pub fn capture(ctx: &SceneContext) -> Self {
        let env = ctx.environment.params();
        let water = ctx.environment.water();
        let airplane = ctx.airplane.state();
        let ambient = ctx.lights.ambient();
        let point = ctx.lights.point();
        Self {
            sun_inclination: env.sun_inclination,
            sun_azimuth: env.sun_azimuth,
            distortion_scale: water.distortion_scale,
            water_size: water.size,
            airplane_rotation: airplane.rotation_enabled,
            airplane_position: airplane.position.to_array(),
            airplane_scale: airplane.scale,
            ambient_color: ambient.color,
            ambient_intensity: ambient.intensity,
            point_color: point.color,
            point_intensity: point.intensity,
            point_decay: point.decay,
            point_range: point.range,
            sky_visible: env.sky_visible,
            water_visible: env.water_visible,
            terrain_visible: env.terrain_visible,
        }
    }

    pub fn get(&self, field: ParamField) -> ParamValue {
        use ParamField::*;
        let number = |v: f32| ParamValue::Number(f64::from(v));
        match field {
            SunInclination => number(self.sun_inclination),
            SunAzimuth => number(self.sun_azimuth),
            DistortionScale => number(self.distortion_scale),
            WaterSize => number(self.water_size),
            AirplaneRotation => ParamValue::Boolean(self.airplane_rotation),
            AirplanePositionX => number(self.airplane_position[0]),
            AirplanePositionY => number(self.airplane_position[1]),
            AirplanePositionZ => number(self.airplane_position[2]),
            AirplaneScale => number(self.airplane_scale),
            AmbientColor => ParamValue::Color(self.ambient_color),
            AmbientIntensity => number(self.ambient_intensity),
            PointColor => ParamValue::Color(self.point_color),
            PointIntensity => number(self.point_intensity),
            PointDecay => number(self.point_decay),
            PointRange => number(self.point_range),
            SkyVisible => ParamValue::Boolean(self.sky_visible),
            WaterVisible => ParamValue::Boolean(self.water_visible),
            TerrainVisible => ParamValue::Boolean(self.terrain_visible),
        }
    }
}

/// An external control panel the scene registers its fields with.
///
/// The panel owns layout and widgets; the scene only supplies initial values
/// and receives edits back as [`PanelEdit`]s.
pub trait ControlPanel {
    fn add_folder(&mut self, folder: Folder);
    fn bind_number(&mut self, field: ParamField, initial: f64, range: NumberRange);
    fn bind_boolean(&mut self, field: ParamField, initial: bool);
    fn bind_color(&mut self, field: ParamField, initial: Rgb);
}

/// Register every field with `panel`, folder by folder.
pub fn bind_controls(panel: &mut dyn ControlPanel, params: &PanelParameters) {
    for folder in Folder::ALL {
        panel.add_folder(folder);
        for field in ParamField::ALL.into_iter().filter(|f| f.folder() == folder) {
            match (params.get(field), field.range()) {
                (ParamValue::Number(v), Some(range)) => panel.bind_number(field, v, range),
                (ParamValue::Boolean(b), _) => panel.bind_boolean(field, b),
                (ParamValue::Color(c), _) => panel.bind_color(field, c),
                (ParamValue::Number(_), None) => {
                    tracing::warn!(field = field.key(), "numeric field without a range");
                }
            }
        }
    }
}

/// Apply one edit to the scene. Performs exactly one mutation and never
/// renders. Values are applied as given; bounds are the panel's job.
pub fn apply_edit(ctx: &mut SceneContext, edit: PanelEdit) -> Result<EditOutcome, SceneError> {
    use ParamField::*;
    let field = edit.field;
    let mismatch = || SceneError::ValueKind {
        field,
        expected: field.kind(),
    };
    let number = || match edit.value {
        ParamValue::Number(v) => Ok(v as f32),
        _ => Err(mismatch()),
    };
    let boolean = || match edit.value {
        ParamValue::Boolean(b) => Ok(b),
        _ => Err(mismatch()),
    };
    let color = || match edit.value {
        ParamValue::Color(c) => Ok(c),
        _ => Err(mismatch()),
    };

    let env = &mut ctx.environment;
    let scene = &mut ctx.scene;
    let outcome = match field {
        SunInclination => {
            let azimuth = env.params().sun_azimuth;
            env.set_sun_angles(number()?, azimuth);
            EditOutcome::Applied
        }
        SunAzimuth => {
            let inclination = env.params().sun_inclination;
            env.set_sun_angles(inclination, number()?);
            EditOutcome::Applied
        }
        DistortionScale => {
            env.set_distortion_scale(number()?);
            EditOutcome::Applied
        }
        WaterSize => {
            env.set_water_size(number()?);
            EditOutcome::Applied
        }
        AirplaneRotation => ctx.airplane.set_rotation_enabled(boolean()?),
        AirplanePositionX => ctx.airplane.set_position_axis(scene, Axis::X, number()?),
        AirplanePositionY => ctx.airplane.set_position_axis(scene, Axis::Y, number()?),
        AirplanePositionZ => ctx.airplane.set_position_axis(scene, Axis::Z, number()?),
        AirplaneScale => ctx.airplane.set_scale(scene, number()?),
        AmbientColor => {
            ctx.lights.set_ambient_color(color()?);
            EditOutcome::Applied
        }
        AmbientIntensity => {
            ctx.lights.set_ambient_intensity(number()?);
            EditOutcome::Applied
        }
        PointColor => {
            ctx.lights.set_point_color(color()?);
            EditOutcome::Applied
        }
        PointIntensity => {
            ctx.lights.set_point_intensity(number()?);
            EditOutcome::Applied
        }
        PointDecay => {
            ctx.lights.set_point_decay(number()?);
            EditOutcome::Applied
        }
        PointRange => {
            ctx.lights.set_point_range(number()?);
            EditOutcome::Applied
        }
        SkyVisible => {
            env.set_visible(scene, Layer::Sky, boolean()?);
            EditOutcome::Applied
        }
        WaterVisible => {
            env.set_visible(scene, Layer::Water, boolean()?);
            EditOutcome::Applied
        }
        TerrainVisible => {
            env.set_visible(scene, Layer::Terrain, boolean()?);
            EditOutcome::Applied
        }
    };
    tracing::trace!(field = field.key(), ?outcome, "panel edit");
    Ok(outcome)
}
