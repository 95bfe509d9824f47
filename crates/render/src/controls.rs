use glam::Vec3;

use crate::camera::OrbitCamera;

/// Keeps the polar angle off the exact pole so look-at stays well defined.
const MIN_POLAR: f32 = 1e-4;

/// Threshold below which pending motion is considered settled.
const REST_EPSILON: f32 = 1e-6;

/// Interactive orbit controller with damped inertia.
///
/// Pointer input accumulates into pending deltas; `update` applies a damped
/// fraction each cycle, clamps the orbit, and writes the camera transform.
#[derive(Debug, Clone)]
pub struct OrbitController {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub screen_space_panning: bool,

    radius: f32,
    /// Azimuth around the Y axis.
    theta: f32,
    /// Polar angle from the Y axis.
    phi: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl OrbitController {
    /// Controller seeded from the camera's current orbit around its target.
    pub fn new(camera: &OrbitCamera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(MIN_POLAR);
        Self {
            damping_factor: 0.03,
            min_distance: 1.0,
            max_distance: 100.0,
            max_polar_angle: std::f32::consts::PI * 0.9,
            rotate_speed: 0.4,
            zoom_speed: 0.6,
            pan_speed: 0.8,
            screen_space_panning: false,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }

    /// Queue an orbit rotation. Inputs are in radians of drag, typically
    /// `2*PI * pixels / viewport_height`.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.theta_delta -= dx * self.rotate_speed;
        self.phi_delta -= dy * self.rotate_speed;
    }

    /// Queue a zoom by scroll steps; positive steps move the camera closer.
    pub fn zoom(&mut self, steps: f32) {
        self.scale *= 0.95_f32.powf(steps * self.zoom_speed);
    }

    /// Queue a pan in world units. With screen-space panning disabled the
    /// vertical component slides the focus along the ground plane instead of
    /// the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &OrbitCamera) {
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up_dir = if self.screen_space_panning {
            right.cross(forward)
        } else {
            Vec3::Y.cross(right)
        };
        self.pan_offset += (-dx * right + dy * up_dir) * self.pan_speed;
    }

    /// Apply one damping step and write the resulting orbit into the camera.
    /// Returns true while motion is still settling.
    pub fn update(&mut self, camera: &mut OrbitCamera) -> bool {
        let d = self.damping_factor;

        self.theta += self.theta_delta * d;
        self.phi += self.phi_delta * d;
        self.theta_delta *= 1.0 - d;
        self.phi_delta *= 1.0 - d;

        self.phi = self.phi.clamp(MIN_POLAR, self.max_polar_angle);
        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.scale = 1.0;

        camera.target += self.pan_offset;
        self.pan_offset = Vec3::ZERO;

        let sin_phi = self.phi.sin();
        camera.position = camera.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                );

        self.theta_delta.abs() > REST_EPSILON || self.phi_delta.abs() > REST_EPSILON
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (OrbitCamera, OrbitController) {
        let camera = OrbitCamera::new(800, 600);
        let controller = OrbitController::new(&camera);
        (camera, controller)
    }

    #[test]
    fn seeded_orbit_round_trips() {
        let (mut camera, mut controller) = rig();
        controller.update(&mut camera);
        assert!((camera.position - Vec3::new(5.0, 5.0, 5.0)).length() < 1e-4);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn zoom_distance_is_clamped() {
        let (mut camera, mut controller) = rig();
        controller.zoom(500.0);
        controller.update(&mut camera);
        assert_eq!(controller.distance(), 1.0);

        controller.zoom(-500.0);
        controller.update(&mut camera);
        assert_eq!(controller.distance(), 100.0);
    }

    #[test]
    fn polar_angle_never_flips_under_the_floor() {
        let (mut camera, mut controller) = rig();
        controller.rotate(0.0, -100.0);
        for _ in 0..500 {
            controller.update(&mut camera);
        }
        assert!(controller.polar_angle() <= std::f32::consts::PI * 0.9 + 1e-6);
        assert!(camera.position.is_finite());
    }

    #[test]
    fn damping_settles() {
        let (mut camera, mut controller) = rig();
        controller.rotate(1.0, 0.0);
        assert!(controller.update(&mut camera));
        for _ in 0..2000 {
            controller.update(&mut camera);
        }
        assert!(!controller.update(&mut camera));
    }

    #[test]
    fn ground_plane_pan_keeps_focus_height() {
        let (mut camera, mut controller) = rig();
        assert!(!controller.screen_space_panning);
        let y0 = camera.target.y;
        controller.pan(0.5, 0.5, &camera);
        controller.update(&mut camera);
        assert!((camera.target.y - y0).abs() < 1e-6);
        assert!(camera.target.length() > 0.0);
    }
}
