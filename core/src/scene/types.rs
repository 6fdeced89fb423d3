//! Scene graph data types.
//!
//! Nodes live in one flat array and refer to each other by index. There are
//! no owning links between nodes, so the tree can never form an ownership
//! cycle.

use crate::math::{self, Mat4, Vec3};

/// Node transform decomposed into translation, rotation, and scale.
///
/// Uses plain arrays so it maps one-to-one onto the document fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Translation [x, y, z].
    pub translation: [f32; 3],
    /// Rotation quaternion [x, y, z, w].
    pub rotation: [f32; 4],
    /// Scale [x, y, z].
    pub scale: [f32; 3],
}

impl NodeTransform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    /// Returns this transform with a different translation.
    #[must_use]
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    /// Compose as `T * R * S`.
    pub fn to_matrix(&self) -> Mat4 {
        math::mat4_from_translation_rotation_scale(
            Vec3::from(self.translation),
            math::quat_from_array(self.rotation),
            Vec3::from(self.scale),
        )
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Input to the hierarchy builder: one entry of the flat node list.
#[derive(Debug, Clone)]
pub struct NodeDesc {
    pub name: Option<String>,
    /// Local transform, already composed.
    pub local_transform: Mat4,
    /// Declared children, in declaration order.
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

impl NodeDesc {
    /// Creates an unnamed leaf with an identity transform.
    pub fn new() -> Self {
        Self {
            name: None,
            local_transform: Mat4::identity(),
            children: Vec::new(),
            mesh: None,
            skin: None,
        }
    }

    /// Set the node name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the local transform from TRS components.
    #[must_use]
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.local_transform = transform.to_matrix();
        self
    }

    /// Set the local transform matrix directly.
    #[must_use]
    pub fn with_matrix(mut self, local_transform: Mat4) -> Self {
        self.local_transform = local_transform;
        self
    }

    /// Set the declared children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    /// Set the mesh index.
    #[must_use]
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Set the skin index.
    #[must_use]
    pub fn with_skin(mut self, skin: usize) -> Self {
        self.skin = Some(skin);
        self
    }
}

impl Default for NodeDesc {
    fn default() -> Self {
        Self::new()
    }
}

/// A node in the built hierarchy.
///
/// `parent`, `first_child` and `next_sibling` are indices into the same
/// node array.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    /// Transform relative to the parent.
    pub local_transform: Mat4,
    /// World transform. Equal to `local_transform` until the first
    /// propagation pass for non-root nodes.
    pub global_transform: Mat4,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
    /// `None` for roots.
    pub parent: Option<usize>,
    /// `None` for leaves.
    pub first_child: Option<usize>,
    /// `None` for the last child of a parent (and for roots).
    pub next_sibling: Option<usize>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

// -- Skins --

/// A skin: joint node indices plus one inverse bind matrix per joint.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    /// Skin name.
    pub name: Option<String>,
    /// Joint node indices (referencing nodes in the hierarchy).
    pub joints: Vec<usize>,
    /// One inverse bind matrix per joint, same order as `joints`.
    pub inverse_bind_matrices: Vec<Mat4>,
    /// Common root of the joint hierarchy, if declared.
    pub skeleton: Option<usize>,
}

impl Skin {
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}
