use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::config::CameraParams;

/// Highest device pixel ratio the renderer will honor
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Walking direction along the travel axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Forward,
    Backward,
}

/// Perspective camera with an XYZ Euler rotation.
///
/// Input maps straight onto the transform: walking moves along world z
/// regardless of heading, and the pointer sets yaw/pitch absolutely.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    walk_speed: f32,
    look_sensitivity: f32,
}

impl Camera {
    pub fn new(params: &CameraParams, aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, params.height, params.z),
            rotation: Vec3::new(params.rotation_x, 0.0, 0.0),
            fov_degrees: params.fov,
            aspect,
            near: params.near,
            far: params.far,
            walk_speed: params.walk_speed,
            look_sensitivity: params.look_sensitivity,
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    /// Update the aspect ratio after a viewport resize; zero-sized viewports are ignored
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// One key-down event worth of travel
    pub fn walk(&mut self, direction: Walk) {
        match direction {
            Walk::Forward => self.position.z -= self.walk_speed,
            Walk::Backward => self.position.z += self.walk_speed,
        }
    }

    /// Aim from the pointer's offset to the viewport center, `y` pointing up
    pub fn look(&mut self, offset_x: f32, offset_y: f32) {
        self.rotation.y = -(offset_x * self.look_sensitivity);
        self.rotation.x = offset_y * self.look_sensitivity;
    }
}

/// Pointer offset from the viewport center with y flipped to point up
pub fn pointer_offset(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    (x - width / 2.0, -(y - height / 2.0))
}

/// Cap a window scale factor the way the renderer does
pub fn clamp_pixel_ratio(scale_factor: f64) -> f32 {
    (scale_factor as f32).min(MAX_PIXEL_RATIO)
}

/// Drawing-buffer size for a window: its logical size times the capped pixel ratio
pub fn render_size(physical_width: u32, physical_height: u32, scale_factor: f64) -> (u32, u32) {
    if scale_factor <= 0.0 {
        return (physical_width.max(1), physical_height.max(1));
    }
    let ratio = f64::from(clamp_pixel_ratio(scale_factor)) / scale_factor;
    let scale = |pixels: u32| ((f64::from(pixels) * ratio).round() as u32).max(1);
    (scale(physical_width), scale(physical_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraParams::default(), 16.0 / 9.0)
    }

    #[test]
    fn starts_above_road_looking_down() {
        let cam = camera();
        assert_eq!(cam.position, Vec3::new(0.0, 3.0, 20.0));
        assert_eq!(cam.rotation.x, -0.2);
        assert!(cam.forward().y < 0.0);
        assert!(cam.forward().z < 0.0);
    }

    #[test]
    fn walking_moves_along_z_only() {
        let mut cam = camera();
        cam.walk(Walk::Forward);
        assert!((cam.position.z - 19.94).abs() < 1e-5);
        cam.walk(Walk::Backward);
        cam.walk(Walk::Backward);
        assert!((cam.position.z - 20.06).abs() < 1e-5);
        assert_eq!(cam.position.x, 0.0);
        assert_eq!(cam.position.y, 3.0);
    }

    #[test]
    fn look_is_linear_and_absolute() {
        let mut cam = camera();
        cam.look(100.0, 50.0);
        assert!((cam.rotation.y - -0.1).abs() < 1e-6);
        assert!((cam.rotation.x - 0.05).abs() < 1e-6);
        cam.look(0.0, 0.0);
        assert_eq!(cam.rotation.x, 0.0);
        assert_eq!(cam.rotation.y, 0.0);
    }

    #[test]
    fn pointer_offset_flips_y() {
        assert_eq!(pointer_offset(400.0, 300.0, 800.0, 600.0), (0.0, 0.0));
        assert_eq!(pointer_offset(500.0, 200.0, 800.0, 600.0), (100.0, 100.0));
    }

    #[test]
    fn viewport_updates_aspect() {
        let mut cam = camera();
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn view_inverts_world() {
        let cam = camera();
        let product = cam.view_matrix() * cam.world_matrix();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(clamp_pixel_ratio(1.0), 1.0);
        assert_eq!(clamp_pixel_ratio(3.0), 2.0);
    }

    #[test]
    fn render_size_follows_window_below_cap() {
        assert_eq!(render_size(1600, 1200, 2.0), (1600, 1200));
        assert_eq!(render_size(800, 600, 1.0), (800, 600));
    }

    #[test]
    fn render_size_is_capped_on_dense_displays() {
        // 1000x500 logical at 3x: drawn at 2x
        assert_eq!(render_size(3000, 1500, 3.0), (2000, 1000));
        assert_eq!(render_size(2000, 1000, 3.0), (1333, 667));
        assert_eq!(render_size(1, 1, 4.0), (1, 1));
    }
}
