//! Frame configuration.

use avatar_core::camera::CameraConfig;
use avatar_core::math::Mat4;

/// Configuration for the per-frame driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameConfig {
    /// Number of frame slots. Must be at least 1.
    pub frames_in_flight: usize,
    /// Model matrix applied to every primitive.
    pub model_transform: Mat4,
    pub camera: CameraConfig,
}

impl FrameConfig {
    /// Set the number of frames in flight.
    #[must_use]
    pub fn with_frames_in_flight(mut self, frames: usize) -> Self {
        self.frames_in_flight = frames;
        self
    }

    /// Set the model matrix applied to every primitive.
    #[must_use]
    pub fn with_model_transform(mut self, model: Mat4) -> Self {
        self.model_transform = model;
        self
    }

    /// Set the camera configuration.
    #[must_use]
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Set whether the projection flips Y for clip spaces with Y pointing down.
    #[must_use]
    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.camera.flip_y = flip_y;
        self
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            model_transform: Mat4::identity(),
            camera: CameraConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FrameConfig::default();
        assert_eq!(config.frames_in_flight, 2);
        assert_eq!(config.model_transform, Mat4::identity());
        assert!(config.camera.flip_y);
    }

    #[test]
    fn builders() {
        let config = FrameConfig::default()
            .with_frames_in_flight(3)
            .with_flip_y(false);
        assert_eq!(config.frames_in_flight, 3);
        assert!(!config.camera.flip_y);
    }
}
