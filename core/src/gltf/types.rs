//! Data types for avatar loading results.

use crate::material::{Material, Texture};
use crate::mesh::AvatarPrimitive;
use crate::scene::{ScenePose, Skin};

/// A loaded avatar: hierarchy, skins, flattened primitives and materials.
///
/// Everything except the pose is immutable after loading. The pose is
/// returned already propagated, so globals are valid for the rest pose.
#[derive(Debug, Clone)]
pub struct AvatarAsset {
    /// Node hierarchy at rest pose.
    pub pose: ScenePose,
    pub skins: Vec<Skin>,
    /// One entry per (mesh, primitive) pair, in document order.
    pub primitives: Vec<AvatarPrimitive>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    /// Number of meshes in the document.
    pub mesh_count: usize,
}

impl AvatarAsset {
    /// Sum of joint counts over all skins.
    pub fn total_joint_count(&self) -> usize {
        self.skins.iter().map(Skin::joint_count).sum()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Skin bound to a primitive, through the first node that references its mesh.
    pub fn primitive_skin(&self, primitive: usize) -> Option<usize> {
        let mesh = self.primitives.get(primitive)?.mesh_index;
        let node = self.pose.node_for_mesh(mesh)?;
        self.pose.node(node).skin
    }

    /// Material of a primitive, falling back to the default material.
    pub fn primitive_material(&self, primitive: usize) -> Material {
        self.primitives
            .get(primitive)
            .and_then(|p| p.material)
            .and_then(|m| self.materials.get(m))
            .cloned()
            .unwrap_or_default()
    }
}
