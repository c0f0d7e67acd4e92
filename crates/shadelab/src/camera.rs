//! Orbiting camera.
//!
//! The eye circles the Y axis while bobbing up and down, always looking at
//! the origin with +Y up:
//!
//! ```text
//! eye(t) = (R·sin(ω·t), H + A·sin(ν·t), R·cos(ω·t))
//! ```
//!
//! Speeds are stored in degrees per second so config files stay readable.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Orbit path plus perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitCamera {
    /// Horizontal distance from the Y axis.
    pub radius: f32,
    /// Mean eye height.
    pub height: f32,
    /// Vertical bob amplitude.
    pub bob_amplitude: f32,
    /// Degrees per second around the Y axis.
    pub orbit_speed: f32,
    /// Degrees per second of the bob phase.
    pub bob_speed: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            radius: 3.0,
            height: 5.0,
            bob_amplitude: 5.0,
            orbit_speed: 90.0,
            bob_speed: 45.0,
            fov_y: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl OrbitCamera {
    /// Eye position after `t` seconds.
    pub fn eye(&self, t: f32) -> Vec3 {
        let orbit = (self.orbit_speed * t).to_radians();
        let bob = (self.bob_speed * t).to_radians();
        Vec3::new(
            self.radius * orbit.sin(),
            self.height + self.bob_amplitude * bob.sin(),
            self.radius * orbit.cos(),
        )
    }

    pub fn view(&self, t: f32) -> Mat4 {
        Mat4::look_at_rh(self.eye(t), Vec3::ZERO, Vec3::Y)
    }

    /// OpenGL-style perspective (clip z in -1..1).
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), aspect, self.near, self.far)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "camera radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.fov_y > 0.0 && self.fov_y < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera fov_y must be in (0, 180), got {}",
                self.fov_y
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "camera clip planes must satisfy 0 < near < far, got near {} far {}",
                self.near, self.far
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn eye_starts_in_front() {
        let cam = OrbitCamera::default();
        assert!(close(cam.eye(0.0), Vec3::new(0.0, 5.0, 3.0)));
    }

    #[test]
    fn eye_quarter_orbit_after_one_second() {
        // 90°/s orbit, 45°/s bob.
        let cam = OrbitCamera::default();
        let expected = Vec3::new(3.0, 5.0 + 5.0 * std::f32::consts::FRAC_1_SQRT_2, 0.0);
        assert!(close(cam.eye(1.0), expected));
    }

    #[test]
    fn eye_peaks_after_two_seconds() {
        let cam = OrbitCamera::default();
        assert!(close(cam.eye(2.0), Vec3::new(0.0, 10.0, -3.0)));
    }

    #[test]
    fn view_maps_origin_in_front_of_eye() {
        let cam = OrbitCamera::default();
        for t in [0.0, 0.7, 1.3, 3.9] {
            let origin = cam.view(t).transform_point3(Vec3::ZERO);
            assert!(origin.z < 0.0, "origin behind camera at t={t}");
            assert!(origin.x.abs() < 1e-4 && origin.y.abs() < 1e-4);
            assert!((origin.z + cam.eye(t).length()).abs() < 1e-4);
        }
    }

    #[test]
    fn projection_maps_near_plane_to_minus_one() {
        let cam = OrbitCamera::default();
        let p = cam.projection(1.0).project_point3(Vec3::new(0.0, 0.0, -cam.near));
        assert!((p.z + 1.0).abs() < 1e-4);
    }

    #[test]
    fn validate_rejects_bad_clip_planes() {
        let cam = OrbitCamera { near: 1.0, far: 0.5, ..Default::default() };
        assert!(matches!(cam.validate(), Err(ConfigError::Invalid(_))));
        assert!(OrbitCamera::default().validate().is_ok());
    }
}
