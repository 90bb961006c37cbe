//! Procedural sky shader inputs.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use seascape_config::SkyConfig;

/// GPU uniform for the sky dome, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SkyUniforms {
    /// Sun position on the unit sphere (not re-normalized here).
    pub sun_position: [f32; 3],
    /// Atmospheric turbidity.
    pub turbidity: f32,
    /// Rayleigh scattering coefficient.
    pub rayleigh: f32,
    /// Mie scattering coefficient.
    pub mie_coefficient: f32,
    /// Mie directional anisotropy.
    pub mie_directional_g: f32,
    pub _padding: f32,
}

impl SkyUniforms {
    pub fn from_config(config: &SkyConfig) -> Self {
        Self {
            sun_position: [0.0, 1.0, 0.0],
            turbidity: config.turbidity,
            rayleigh: config.rayleigh,
            mie_coefficient: config.mie_coefficient,
            mie_directional_g: config.mie_directional_g,
            _padding: 0.0,
        }
    }

    pub fn sun_position(&self) -> Vec3 {
        Vec3::from_array(self.sun_position)
    }
}

impl Default for SkyUniforms {
    fn default() -> Self {
        Self::from_config(&SkyConfig::default())
    }
}
