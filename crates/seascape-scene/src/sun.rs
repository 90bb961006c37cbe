//! Sun placement from the panel's inclination/azimuth pair.

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Valid inclination range.
pub const INCLINATION_RANGE: (f32, f32) = (0.0, 0.5);
/// Valid azimuth range.
pub const AZIMUTH_RANGE: (f32, f32) = (0.0, 1.0);

/// Sun angles as normalized fractions of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SunAngles {
    pub inclination: f32,
    pub azimuth: f32,
}

impl Default for SunAngles {
    fn default() -> Self {
        Self {
            inclination: 0.4373,
            azimuth: 0.287,
        }
    }
}

impl SunAngles {
    /// Unit direction toward the sun. See [`sun_direction`].
    pub fn direction(&self) -> Vec3 {
        sun_direction(self.inclination, self.azimuth)
    }
}

/// Spherical to Cartesian conversion of the sun angles.
///
/// With `theta = π(inclination − 0.5)` and `phi = 2π(azimuth − 0.5)`:
/// `x = cos φ`, `y = sin φ · sin θ`, `z = sin φ · cos θ`. The result has unit
/// length for every input; it is computed in f64 and narrowed once.
pub fn sun_direction(inclination: f32, azimuth: f32) -> Vec3 {
    let theta = std::f64::consts::PI * (f64::from(inclination) - 0.5);
    let phi = std::f64::consts::TAU * (f64::from(azimuth) - 0.5);
    DVec3::new(phi.cos(), phi.sin() * theta.sin(), phi.sin() * theta.cos()).as_vec3()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_length_across_ranges() {
        for i in 0..=50 {
            for a in 0..=100 {
                let inclination = i as f32 * 0.01;
                let azimuth = a as f32 * 0.01;
                let len = sun_direction(inclination, azimuth).length();
                assert!(
                    (len - 1.0).abs() < 1e-6,
                    "({inclination}, {azimuth}) gave length {len}"
                );
            }
        }
    }

    #[test]
    fn test_default_angles_vector() {
        let dir = SunAngles::default().direction();
        let expected = Vec3::new(0.230_389_43, 0.190_441_73, -0.954_281_2);
        assert!(
            (dir - expected).abs().max_element() < 1e-6,
            "got {dir:?}"
        );
        assert!(dir.y > 0.0, "default sun sits above the horizon");
    }

    #[test]
    fn test_centre_angles_point_along_negative_x() {
        // theta = 0, phi = 0 -> (1, 0, 0); azimuth 0 wraps to phi = -π -> (-1, 0, 0).
        let dir = sun_direction(0.5, 0.5);
        assert!((dir - Vec3::X).length() < 1e-6);
        let dir = sun_direction(0.5, 0.0);
        assert!((dir + Vec3::X).length() < 1e-6);
    }
}
