//! Perspective camera and the orbit bounds the viewer's controller honors.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use seascape_config::CameraConfig;

/// Camera data in GPU layout, 80 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz = eye position, w unused.
    pub position: [f32; 4],
}

/// Orbit constraints around the camera target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitLimits {
    /// Largest angle from +Y, in radians. Just under π/2 keeps the eye above
    /// the water plane.
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitLimits {
    /// Project `eye` onto the allowed shell around `target`. An eye already
    /// inside the limits is returned unchanged.
    pub fn constrain(&self, target: Vec3, eye: Vec3) -> Vec3 {
        let offset = eye - target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return target + Vec3::Z * self.min_distance;
        }
        let in_range = (self.min_distance..=self.max_distance).contains(&distance);
        if in_range && (offset.y / distance).clamp(-1.0, 1.0).acos() <= self.max_polar_angle {
            return eye;
        }
        let distance = distance.clamp(self.min_distance, self.max_distance);
        let dir = offset / offset.length();

        let polar = dir.y.clamp(-1.0, 1.0).acos();
        let polar = polar.min(self.max_polar_angle);
        let horizontal = Vec3::new(dir.x, 0.0, dir.z);
        let horizontal = horizontal.try_normalize().unwrap_or(Vec3::Z);
        let dir = horizontal * polar.sin() + Vec3::Y * polar.cos();

        target + dir * distance
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    position: Vec3,
    target: Vec3,
    limits: OrbitLimits,
}

impl PerspectiveCamera {
    /// Build from config. A configured eye outside the orbit limits is
    /// pulled back onto them.
    pub fn from_config(config: &CameraConfig, aspect_ratio: f32) -> Self {
        let target = Vec3::from_array(config.target);
        let limits = OrbitLimits {
            max_polar_angle: config.max_polar_angle,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        };
        let position = limits.constrain(target, Vec3::from_array(config.position));
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect_ratio,
            near: config.near,
            far: config.far,
            position,
            target,
            limits,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn limits(&self) -> &OrbitLimits {
        &self.limits
    }

    /// Update the aspect ratio from viewport dimensions. Zero-sized
    /// dimensions are treated as 1.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.aspect_ratio = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let camera = PerspectiveCamera::default();
        assert!((camera.fov_y - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position(), Vec3::new(15.0, 15.0, 20.0));
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn test_aspect_ratio_ignores_zero() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect_ratio(1920, 1080);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(800, 0);
        assert_eq!(camera.aspect_ratio, 800.0);
    }

    #[test]
    fn test_view_matrix_places_target_ahead() {
        let camera = PerspectiveCamera::default();
        let target_in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(target_in_view.z < 0.0);
        assert!(target_in_view.x.abs() < 1e-4 && target_in_view.y.abs() < 1e-4);
    }

    fn camera_at(position: [f32; 3]) -> PerspectiveCamera {
        let config = CameraConfig {
            position,
            ..CameraConfig::default()
        };
        PerspectiveCamera::from_config(&config, 1.0)
    }

    #[test]
    fn test_configured_eye_distance_clamped() {
        let near = camera_at([0.0, 1.0, 1.0]).position();
        assert!((near.length() - 10.0).abs() < 1e-4);
        let far = camera_at([0.0, 500.0, 500.0]).position();
        assert!((far.length() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_configured_eye_kept_above_horizon() {
        let camera = camera_at([30.0, -20.0, 0.0]);
        let eye = camera.position();
        let polar = (eye.y / eye.length()).acos();
        assert!(polar <= camera.limits().max_polar_angle + 1e-5);
        assert!(eye.y > 0.0);
        assert!(eye.x > 0.0);
    }

    #[test]
    fn test_eye_inside_limits_untouched() {
        let limits = *PerspectiveCamera::default().limits();
        let eye = Vec3::new(-12.5, 3.0, 40.0);
        assert_eq!(limits.constrain(Vec3::ZERO, eye), eye);
    }

    #[test]
    fn test_uniform_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
    }
}
