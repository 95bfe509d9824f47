use glam::{Mat4, Vec3};

/// Perspective camera orbited around a focus point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    /// Camera for a viewport of the given pixel dimensions: 50 degree FOV,
    /// eye at (5,5,5) looking at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Vec3::new(5.0, 5.0, 5.0),
            target: Vec3::ZERO,
            fov: 50.0_f32.to_radians(),
            aspect: width as f32 / height as f32,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Update the aspect ratio for a new viewport. The projection matrix is
    /// derived on demand, so this is the whole recompute.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_exact_ratio() {
        let cam = OrbitCamera::new(800, 600);
        assert_eq!(cam.aspect, 800.0 / 600.0);
        let cam = OrbitCamera::new(1920, 1080);
        assert_eq!(cam.aspect, 1920.0 / 1080.0);
    }

    #[test]
    fn initial_placement() {
        let cam = OrbitCamera::new(640, 480);
        assert_eq!(cam.position, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(cam.target, Vec3::ZERO);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 1000.0);
        assert!((cam.fov - 50.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn set_viewport_updates_aspect_only() {
        let mut cam = OrbitCamera::new(800, 600);
        let pos = cam.position;
        cam.set_viewport(1024, 512);
        assert_eq!(cam.aspect, 2.0);
        assert_eq!(cam.position, pos);
    }

    #[test]
    fn view_projection_is_finite() {
        let cam = OrbitCamera::new(800, 600);
        let vp = cam.view_projection();
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
