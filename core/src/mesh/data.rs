//! CPU-side mesh data structures.

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex as uploaded to the vertex buffer.
///
/// All fields are 4-byte scalars so the struct has no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AvatarVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Joint indices, local to the primitive's skin.
    pub joints: [u32; 4],
    pub weights: [f32; 4],
    /// Index of this vertex within its primitive (used to look up morph deltas).
    pub index: u32,
}

impl AvatarVertex {
    /// Normal used when the primitive has no `NORMAL` attribute.
    pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
    /// UV used when the primitive has no `TEXCOORD_0` attribute.
    pub const DEFAULT_UV: [f32; 2] = [0.0, 0.0];
    /// Joints used when the primitive has no `JOINTS_0` attribute.
    pub const DEFAULT_JOINTS: [u32; 4] = [0; 4];
    /// Weights used when the primitive has no `WEIGHTS_0` attribute: fully
    /// bound to joint 0.
    pub const DEFAULT_WEIGHTS: [f32; 4] = [1.0, 0.0, 0.0, 0.0];

    /// A vertex at `position` with every other attribute defaulted.
    pub fn at(position: [f32; 3], index: u32) -> Self {
        Self {
            position,
            normal: Self::DEFAULT_NORMAL,
            uv: Self::DEFAULT_UV,
            joints: Self::DEFAULT_JOINTS,
            weights: Self::DEFAULT_WEIGHTS,
            index,
        }
    }
}

/// Position deltas of one morph target, one `[x, y, z, 1]` per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphTarget {
    pub position_deltas: Vec<[f32; 4]>,
}

/// One primitive of one mesh, flattened out of the document's mesh list.
#[derive(Debug, Clone)]
pub struct AvatarPrimitive {
    /// Index of the owning mesh in the document.
    pub mesh_index: usize,
    /// Index of this primitive within the mesh.
    pub primitive_index: usize,
    pub vertices: Vec<AvatarVertex>,
    /// Triangle-list indices. Sequential when the document has none.
    pub indices: Vec<u32>,
    /// Material index; `None` means the default material.
    pub material: Option<usize>,
    pub morph_targets: Vec<MorphTarget>,
    /// Initial blend-shape weights, one per morph target.
    pub default_weights: Vec<f32>,
}

impl AvatarPrimitive {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn has_morph_targets(&self) -> bool {
        !self.morph_targets.is_empty()
    }

    /// Vertex data as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data as raw bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
