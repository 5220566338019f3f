//! Fly camera and view management.

use glam::{Mat4, Vec2, Vec3};

/// Directions for keyboard-driven camera movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// A free-flying perspective camera.
///
/// Yaw/pitch are stored in degrees. The default orientation looks down -Z.
#[derive(Debug, Clone)]
pub struct Camera {
    /// World-space position.
    pub position: Vec3,
    /// Yaw angle in degrees (-90 looks down -Z).
    pub yaw: f32,
    /// Pitch angle in degrees, clamped to avoid gimbal flip.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Viewport resolution in pixels; shaders use it to turn fragment
    /// coordinates back into normalized screen positions.
    pub resolution: Vec2,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Mouse-look sensitivity in degrees per pixel.
    pub sensitivity: f32,
}

impl Camera {
    /// Creates a camera at `position` with default orientation and optics.
    pub fn new(position: Vec3, aspect: f32) -> Self {
        Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            fov_y: 45.0,
            aspect,
            near: 0.1,
            far: 100.0,
            resolution: Vec2::new(800.0, 600.0),
            speed: 2.5,
            sensitivity: 0.1,
        }
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize()
    }

    /// Unit vector to the camera's right.
    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// The world-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// The view-to-clip matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    /// Updates aspect ratio and stored resolution after a viewport resize.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.resolution = Vec2::new(width as f32, height as f32);
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Moves the camera in a view-relative direction.
    pub fn process_keyboard(&mut self, movement: CameraMovement, dt: f32) {
        let velocity = self.speed * dt;
        let delta = match movement {
            CameraMovement::Forward => self.forward(),
            CameraMovement::Backward => -self.forward(),
            CameraMovement::Left => -self.right(),
            CameraMovement::Right => self.right(),
            CameraMovement::Up => Vec3::Y,
            CameraMovement::Down => -Vec3::Y,
        };
        self.position += delta * velocity;
    }

    /// Applies a mouse-look delta in pixels.
    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-89.0, 89.0);
    }

    /// Applies a scroll-wheel zoom delta.
    pub fn process_scroll(&mut self, dy: f32) {
        self.fov_y = (self.fov_y - dy).clamp(1.0, 60.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = Camera::new(Vec3::ZERO, 4.0 / 3.0);
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn test_pitch_clamp() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.process_mouse(0.0, 10_000.0);
        assert!(camera.pitch <= 89.0);
        camera.process_mouse(0.0, -20_000.0);
        assert!(camera.pitch >= -89.0);
    }

    #[test]
    fn test_view_matrix_places_camera_at_origin() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 1.0);
        let view = camera.view_matrix();
        let eye_in_view = view.transform_point3(camera.position);
        assert!(eye_in_view.length() < 1e-5);
    }
}
