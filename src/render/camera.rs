use crate::math::Ray;
use glam::Vec3;

#[derive(Debug, Clone, Copy, Default)]
pub struct CameraMovement {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub aim_left: bool,
    pub aim_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
}

/// Pixel rectangle of the 3D scene inside the window. Clicks outside it
/// belong to UI panels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_deg: f32,
}

impl CameraController {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            fov_y_deg: 60.0,
        }
    }

    pub fn with_fov(mut self, fov_y_deg: f32) -> Self {
        self.fov_y_deg = fov_y_deg.clamp(1.0, 179.0);
        self
    }

    /// Place the camera at `position` looking at `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let (yaw, pitch) = forward_to_yaw_pitch(target - position);
        Self::new(position, yaw, pitch)
    }

    pub fn forward(&self) -> Vec3 {
        self.basis().0
    }

    pub fn nudge(&mut self, yaw_delta: f32, pitch_delta: f32, zoom_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch += pitch_delta;
        wrap_angles(&mut self.yaw, &mut self.pitch);
        if zoom_delta != 0.0 {
            let (forward, _, _) = self.basis();
            self.position += forward * zoom_delta;
        }
    }

    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    pub fn move_horizontal(&mut self, right: f32, up: f32, forward: f32) {
        let yaw = self.yaw;
        let forward_dir = Vec3::new(yaw.cos(), 0.0, yaw.sin());
        let right_dir = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
        self.position += right_dir * right + Vec3::Y * up + forward_dir * forward;
    }

    pub fn update_movement(&mut self, input: &CameraMovement, frame_dt: f32) -> bool {
        let move_speed = 1.5 * frame_dt;
        let aim_speed = 1.8 * frame_dt;
        let mut changed = false;

        if input.aim_left {
            self.yaw -= aim_speed;
            changed = true;
        }
        if input.aim_right {
            self.yaw += aim_speed;
            changed = true;
        }
        if input.aim_up {
            self.pitch += aim_speed;
            changed = true;
        }
        if input.aim_down {
            self.pitch -= aim_speed;
            changed = true;
        }

        let mut forward = 0.0;
        let mut right = 0.0;
        let mut up = 0.0;
        if input.move_forward {
            forward += move_speed;
        }
        if input.move_backward {
            forward -= move_speed;
        }
        if input.move_left {
            right -= move_speed;
        }
        if input.move_right {
            right += move_speed;
        }
        if input.move_up {
            up += move_speed;
        }
        if input.move_down {
            up -= move_speed;
        }

        if forward != 0.0 || right != 0.0 || up != 0.0 {
            self.move_horizontal(right, up, forward);
            changed = true;
        }

        changed
    }

    /// World-space ray through pixel `(x, y)` of `viewport` (top-left origin).
    pub fn ray_from_screen_point(&self, x: f32, y: f32, viewport: &Viewport) -> Ray {
        let (forward, right, up) = self.basis();
        let ndc_x = 2.0 * (x - viewport.x) / viewport.width - 1.0;
        let ndc_y = 1.0 - 2.0 * (y - viewport.y) / viewport.height;
        let tan_half = (self.fov_y_deg.to_radians() * 0.5).tan();
        let direction =
            forward + right * (ndc_x * tan_half * viewport.aspect()) + up * (ndc_y * tan_half);
        Ray::new(self.position, direction)
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward / forward.length().max(1e-6);
    let yaw = n.z.atan2(n.x);
    let pitch = n.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}

fn wrap_angles(yaw: &mut f32, pitch: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
    if pitch.is_finite() {
        *pitch = (*pitch + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraController, CameraMovement, Viewport};
    use glam::Vec3;

    #[test]
    fn movement_update_keeps_finite_values() {
        let mut camera = CameraController::new(Vec3::new(0.0, 0.0, 5.0), 0.0, 0.0);
        let movement = CameraMovement {
            move_forward: true,
            move_right: true,
            move_up: true,
            aim_right: true,
            aim_up: true,
            ..CameraMovement::default()
        };
        let changed = camera.update_movement(&movement, 1.0 / 60.0);
        assert!(changed);
        assert!(camera.position.is_finite());
        assert!(camera.yaw.is_finite());
        assert!(camera.pitch.is_finite());
    }

    #[test]
    fn centre_pixel_ray_follows_forward() {
        let camera = CameraController::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let ray = camera.ray_from_screen_point(400.0, 300.0, &viewport);
        assert!((ray.origin - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-5);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn top_left_pixel_ray_points_up_and_left() {
        let camera = CameraController::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        let viewport = Viewport::new(0.0, 0.0, 800.0, 600.0);
        let ray = camera.ray_from_screen_point(0.0, 0.0, &viewport);
        let (_, right, up) = camera.basis();
        assert!(ray.direction.dot(right) < 0.0);
        assert!(ray.direction.dot(up) > 0.0);
        assert!((ray.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn viewport_excludes_panel_area() {
        let viewport = Viewport::new(0.0, 0.0, 600.0, 400.0);
        assert!(viewport.contains(10.0, 10.0));
        assert!(!viewport.contains(650.0, 10.0));
        assert!(!viewport.contains(-1.0, 10.0));
    }

    #[test]
    fn nudge_zoom_moves_along_forward() {
        let mut camera = CameraController::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        camera.nudge(0.0, 0.0, 1.0);
        assert!((camera.position.z - 9.0).abs() < 1e-4);
    }
}
