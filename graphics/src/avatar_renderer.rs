//! Per-frame driver.
//!
//! [`AvatarRenderer::frame`] runs one frame strictly in this order:
//!
//! 1. morph weight validation
//! 2. camera input (aspect from the renderer's viewport)
//! 3. node edits
//! 4. transform propagation
//! 5. joint matrices
//! 6. wait for the frame slot
//! 7. per-node uniform, joint palette and morph weight writes
//! 8. submit

use avatar_core::camera::{Camera, CameraInput};
use avatar_core::gltf::{AvatarAsset, load_avatar};
use avatar_core::math::Vec3;
use avatar_core::scene::{ScenePose, SkinPose, compute_joint_matrices, propagate_transforms};

use crate::config::FrameConfig;
use crate::error::GraphicsError;
use crate::frame_resources::FrameResources;
use crate::renderer::Renderer;
use crate::sync::Fence;

/// Rotation applied to a node's local transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRotation {
    pub node: usize,
    pub axis: Vec3,
    /// Angle in radians.
    pub angle: f32,
}

/// Everything that changes between two frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the previous frame.
    pub dt: f32,
    pub camera: CameraInput,
    /// Restore the rest pose before applying rotations.
    pub reset_pose: bool,
    pub node_rotations: Vec<NodeRotation>,
    /// New blend-shape weights, by primitive.
    pub morph_weights: Vec<(usize, Vec<f32>)>,
}

impl FrameInput {
    /// Input that only advances time.
    pub fn idle(dt: f32) -> Self {
        Self {
            dt,
            ..Default::default()
        }
    }
}

/// Drives one avatar through the frame loop.
#[derive(Debug)]
pub struct AvatarRenderer {
    asset: AvatarAsset,
    skin_pose: SkinPose,
    camera: Camera,
    resources: FrameResources,
    config: FrameConfig,
    /// Current weights per primitive, empty for primitives without targets.
    morph_weights: Vec<Vec<f32>>,
    elapsed: f32,
}

impl AvatarRenderer {
    /// Set up frame resources for an already loaded asset.
    pub fn new<R: Renderer + ?Sized>(
        renderer: &mut R,
        asset: AvatarAsset,
        config: FrameConfig,
    ) -> Result<Self, GraphicsError> {
        let resources = FrameResources::new(renderer, &asset, config.frames_in_flight)?;
        let mut skin_pose = SkinPose::new(&asset.pose, &asset.skins);
        compute_joint_matrices(&asset.pose, &asset.skins, &mut skin_pose);

        let mut camera = Camera::new(config.camera);
        let (width, height) = renderer.viewport();
        camera.set_viewport(width, height);

        let morph_weights = asset
            .primitives
            .iter()
            .map(|p| p.default_weights.clone())
            .collect();

        Ok(Self {
            asset,
            skin_pose,
            camera,
            resources,
            config,
            morph_weights,
            elapsed: 0.0,
        })
    }

    /// Load an avatar container and set up its frame resources.
    pub fn from_bytes<R: Renderer + ?Sized>(
        renderer: &mut R,
        data: &[u8],
        config: FrameConfig,
    ) -> Result<Self, GraphicsError> {
        let asset = load_avatar(data)?;
        Self::new(renderer, asset, config)
    }

    pub fn asset(&self) -> &AvatarAsset {
        &self.asset
    }

    pub fn pose(&self) -> &ScenePose {
        &self.asset.pose
    }

    pub fn skin_pose(&self) -> &SkinPose {
        &self.skin_pose
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resources(&self) -> &FrameResources {
        &self.resources
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Seconds of frame time accumulated so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Current blend-shape weights of a primitive.
    pub fn morph_weights(&self, primitive: usize) -> Option<&[f32]> {
        self.morph_weights.get(primitive).map(Vec::as_slice)
    }

    /// Run one frame and return the fence of its submission.
    ///
    /// Blocks until the next frame slot is free.
    pub fn frame<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        input: &FrameInput,
    ) -> Result<Fence, GraphicsError> {
        avatar_core::profile_scope!("avatar_frame");
        // Validate every weight update before touching any state.
        for (primitive, weights) in &input.morph_weights {
            self.check_morph_weights(*primitive, weights)?;
        }
        for (primitive, weights) in &input.morph_weights {
            if let Some(current) = self.morph_weights.get_mut(*primitive) {
                current.copy_from_slice(weights);
            }
        }

        let (width, height) = renderer.viewport();
        self.camera.set_viewport(width, height);
        self.camera.apply_input(&input.camera, input.dt);

        self.elapsed += input.dt;
        let pose = &mut self.asset.pose;
        if input.reset_pose {
            pose.reset_to_rest();
        }
        for rotation in &input.node_rotations {
            if !pose.rotate_local(rotation.node, rotation.axis, rotation.angle) {
                log::warn!("Ignoring rotation of missing node {}", rotation.node);
            }
        }

        propagate_transforms(&mut self.asset.pose);
        compute_joint_matrices(&self.asset.pose, &self.asset.skins, &mut self.skin_pose);

        let view = self.camera.view();
        let proj = self.camera.projection();

        let mut writer = self.resources.begin_frame(renderer);
        writer.write_scene(
            &self.config.model_transform,
            &view,
            &proj,
            self.elapsed,
            &self.asset.pose,
        )?;
        writer.write_joint_palette(&self.skin_pose)?;
        for (primitive, weights) in self.morph_weights.iter().enumerate() {
            writer.write_morph_weights(primitive, weights)?;
        }
        let fence = writer.submit()?;
        avatar_core::frame_mark!();
        Ok(fence)
    }

    fn check_morph_weights(&self, primitive: usize, weights: &[f32]) -> Result<(), GraphicsError> {
        let current = self.morph_weights.get(primitive).ok_or_else(|| {
            GraphicsError::InvalidParameter(format!("primitive {primitive} out of range"))
        })?;
        if current.len() != weights.len() {
            return Err(GraphicsError::InvalidParameter(format!(
                "{} morph weights for {} targets on primitive {primitive}",
                weights.len(),
                current.len()
            )));
        }
        Ok(())
    }

    /// Wait for every in-flight frame, then release all GPU resources.
    pub fn shutdown<R: Renderer + ?Sized>(self, renderer: &mut R) {
        self.resources.shutdown(renderer);
    }
}
