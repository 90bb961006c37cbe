//! Water surface shader inputs and the wave clock that animates them.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use seascape_config::WaterConfig;

use crate::color::Rgb;

/// GPU uniform for the water surface, 64 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    /// Normalized direction toward the sun.
    pub sun_direction: [f32; 3],
    /// Animated wave phase in seconds.
    pub time: f32,
    /// Sun highlight color (linear RGB).
    pub sun_color: [f32; 3],
    /// Normal-map distortion strength.
    pub distortion_scale: f32,
    /// Water body color (linear RGB).
    pub water_color: [f32; 3],
    /// Normal-map tiling size.
    pub size: f32,
    /// Surface opacity.
    pub alpha: f32,
    pub _padding: [f32; 3],
}

impl WaterUniforms {
    pub fn from_config(config: &WaterConfig) -> Self {
        Self {
            sun_direction: [0.0, 1.0, 0.0],
            time: 0.0,
            sun_color: Rgb::from_hex(config.sun_color).to_linear().to_array(),
            distortion_scale: config.distortion_scale,
            water_color: Rgb::from_hex(config.water_color).to_linear().to_array(),
            size: config.size,
            alpha: config.alpha,
            _padding: [0.0; 3],
        }
    }

    pub fn sun_direction(&self) -> Vec3 {
        Vec3::from_array(self.sun_direction)
    }
}

impl Default for WaterUniforms {
    fn default() -> Self {
        Self::from_config(&WaterConfig::default())
    }
}

/// Monotonic accumulator feeding the water `time` uniform.
///
/// Never wraps or resets; the shader applies the trigonometry. Accumulates
/// in f64 so a 1/60 step still registers after weeks of uptime.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaveClock {
    time: f64,
}

impl WaveClock {
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Add `step` seconds and return the new phase. Non-positive or
    /// non-finite steps leave the clock untouched.
    pub fn advance(&mut self, step: f32) -> f64 {
        if step.is_finite() && step > 0.0 {
            self.time += f64::from(step);
        }
        self.time
    }

    /// The phase narrowed for the shader uniform.
    pub fn uniform_time(&self) -> f32 {
        self.time as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_is_16_byte_multiple() {
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 64);
    }

    #[test]
    fn test_clock_accumulates() {
        let mut clock = WaveClock::default();
        let mut last = clock.time();
        for _ in 0..600 {
            let now = clock.advance(1.0 / 60.0);
            assert!(now > last);
            last = now;
        }
        assert!((clock.time() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_clock_ignores_bad_steps() {
        let mut clock = WaveClock::default();
        clock.advance(0.5);
        clock.advance(-1.0);
        clock.advance(f32::NAN);
        assert_eq!(clock.time(), 0.5);
    }

    #[test]
    fn test_clock_keeps_advancing_after_long_uptime() {
        // One week in, where an f32 accumulator can no longer absorb 1/60.
        let start = 7.0 * 24.0 * 3600.0;
        let mut clock = WaveClock::default();
        clock.advance(start as f32);
        let mut last = clock.time();
        for _ in 0..120 {
            let now = clock.advance(1.0 / 60.0);
            assert!(now > last);
            last = now;
        }
        assert!((clock.time() - f64::from(start as f32) - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_colors_are_linearized() {
        let water = WaterUniforms::default();
        assert!(water.sun_color.iter().all(|c| (c - 1.0).abs() < 1e-6));
        assert_eq!(water.water_color[0], 0.0);
        assert!(water.water_color[1] > water.water_color[2]);
    }
}
