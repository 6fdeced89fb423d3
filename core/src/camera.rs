//! Fly camera used to view the avatar.
//!
//! Direction is kept as yaw/pitch in degrees; `front` is derived from them:
//!
//! ```text
//! front = normalize(cos(yaw) * cos(pitch), sin(pitch), sin(yaw) * cos(pitch))
//! ```
//!
//! The camera interprets movement intents ([`CameraInput`]); mapping keys or
//! devices to intents is the application's job.

use crate::math::{self, Mat4, Vec3};

/// Camera configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Yaw in degrees. -90 looks down -Z.
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub up: [f32; 3],
    /// Movement speed multiplier in units per second.
    pub move_speed: f32,
    /// Multiplier used while the fast modifier is held.
    pub fast_move_speed: f32,
    /// Look speed in degrees per second per unit of speed multiplier.
    pub look_rate: f32,
    /// Flip the projection's Y axis for clip spaces with Y pointing down.
    pub flip_y: bool,
}

impl CameraConfig {
    /// Set the vertical field of view in degrees.
    #[must_use]
    pub fn with_fov(mut self, degrees: f32) -> Self {
        self.fov_y_degrees = degrees;
        self
    }

    /// Set the near and far clip distances.
    #[must_use]
    pub fn with_clip(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Set the initial position.
    #[must_use]
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    /// Set the initial yaw and pitch in degrees.
    #[must_use]
    pub fn with_orientation(mut self, yaw_degrees: f32, pitch_degrees: f32) -> Self {
        self.yaw_degrees = yaw_degrees;
        self.pitch_degrees = pitch_degrees;
        self
    }

    /// Set whether the projection flips Y.
    #[must_use]
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

impl Default for CameraConfig {
    /// Framed on the upper body of a standing avatar about 1.5 units tall.
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 190.0,
            position: [0.0, 1.38, 1.32],
            yaw_degrees: -85.32,
            pitch_degrees: -17.5714,
            up: [0.0, 1.0, 0.0],
            move_speed: 4.0,
            fast_move_speed: 16.0,
            look_rate: 10.0,
            flip_y: true,
        }
    }
}

/// Movement intents for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub look_up: bool,
    pub look_down: bool,
    pub look_left: bool,
    pub look_right: bool,
    /// Use the fast speed multiplier.
    pub fast: bool,
}

impl CameraInput {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// A perspective fly camera.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    front: Vec3,
    up: Vec3,
    aspect: f32,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            config,
            position: Vec3::from(config.position),
            yaw: config.yaw_degrees,
            pitch: config.pitch_degrees,
            front: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::from(config.up),
            aspect: 1.0,
        };
        camera.update_front();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio from viewport dimensions.
    ///
    /// A zero-height (minimized) viewport leaves the aspect unchanged.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            log::trace!("Ignoring zero-height viewport ({width}x{height})");
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Apply one frame of movement intents over `dt` seconds.
    pub fn apply_input(&mut self, input: &CameraInput, dt: f32) {
        if input.is_idle() {
            return;
        }
        let speed_mult = if input.fast {
            self.config.fast_move_speed
        } else {
            self.config.move_speed
        };
        let step = dt * speed_mult;
        let right = self.front.cross(&self.up).normalize();

        if input.forward {
            self.position += self.front * step;
        }
        if input.backward {
            self.position -= self.front * step;
        }
        if input.left {
            self.position -= right * step;
        }
        if input.right {
            self.position += right * step;
        }
        if input.down {
            self.position -= self.up * step;
        }
        if input.up {
            self.position += self.up * step;
        }

        let look = self.config.look_rate * dt * speed_mult;
        if input.look_up {
            self.pitch += look;
        }
        if input.look_down {
            self.pitch -= look;
        }
        if input.look_left {
            self.yaw -= look;
        }
        if input.look_right {
            self.yaw += look;
        }
        if self.yaw <= -360.0 || self.yaw >= 360.0 {
            self.yaw = 0.0;
        }

        self.update_front();
    }

    fn update_front(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        let direction = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos());
        self.front = direction.normalize();
    }

    /// View matrix looking from the position along `front`.
    pub fn view(&self) -> Mat4 {
        let target = self.position + self.front;
        math::look_at_rh(&self.position, &target, &self.up)
    }

    /// Perspective projection with depth in [0, 1], Y flipped if configured.
    pub fn projection(&self) -> Mat4 {
        let mut proj = math::perspective_rh(
            self.config.fov_y_degrees.to_radians(),
            self.aspect,
            self.config.near,
            self.config.far,
        );
        if self.config.flip_y {
            proj[(1, 1)] *= -1.0;
        }
        proj
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_front_matches_orientation() {
        let camera = Camera::default();
        let front = camera.front();
        // Mostly down -Z, tilted down.
        assert!(front.z < -0.9);
        assert!(front.y < -0.25);
        assert!((front.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn zero_height_viewport_is_ignored() {
        let mut camera = Camera::default();
        camera.set_viewport(1600, 900);
        let aspect = camera.aspect();
        camera.set_viewport(1600, 0);
        assert_eq!(camera.aspect(), aspect);
        assert!((aspect - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn forward_moves_along_front() {
        let mut camera = Camera::default();
        let start = camera.position();
        let front = camera.front();
        camera.apply_input(
            &CameraInput {
                forward: true,
                ..Default::default()
            },
            0.5,
        );
        let moved = camera.position() - start;
        assert!((moved - front * 2.0).norm() < 1e-5);
    }

    #[test]
    fn fast_modifier_uses_fast_speed() {
        let mut camera = Camera::default();
        let start = camera.position();
        camera.apply_input(
            &CameraInput {
                up: true,
                fast: true,
                ..Default::default()
            },
            0.25,
        );
        assert!((camera.position().y - start.y - 4.0).abs() < 1e-5);
    }

    #[test]
    fn yaw_wraps_to_zero() {
        let config = CameraConfig::default().with_orientation(359.0, 0.0);
        let mut camera = Camera::new(config);
        camera.apply_input(
            &CameraInput {
                look_right: true,
                ..Default::default()
            },
            1.0,
        );
        assert_eq!(camera.yaw(), 0.0);
    }

    #[test]
    fn projection_flips_y_when_configured() {
        let mut flipped = Camera::new(CameraConfig::default());
        let mut plain = Camera::new(CameraConfig::default().with_flip_y(false));
        flipped.set_viewport(800, 600);
        plain.set_viewport(800, 600);
        let a = flipped.projection();
        let b = plain.projection();
        assert_eq!(a[(1, 1)], -b[(1, 1)]);
        assert_eq!(a[(0, 0)], b[(0, 0)]);
    }

    #[test]
    fn view_places_camera_at_origin() {
        let camera = Camera::default();
        let eye = camera.view() * camera.position().push(1.0);
        assert!(eye.xyz().norm() < 1e-4);
    }
}
