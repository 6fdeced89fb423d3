//! Joint matrix computation.
//!
//! Joint matrices are stored per skin, indexed by the joint's position in
//! that skin's joint list. Each skin is evaluated relative to its owner: the
//! lowest-indexed node that references it.
//!
//! ```text
//! joint[j] = inverse(owner.global) * (joints[j].global * inverse_bind[j])
//! ```
//!
//! All skins are also laid out back to back in one palette, so a single
//! shared joint buffer can hold every joint of every skin.

use super::pose::ScenePose;
use super::types::Skin;
use crate::math::{self, Mat4};

/// Joint matrices of every skin, recomputed each frame.
#[derive(Debug, Clone)]
pub struct SkinPose {
    /// Joint matrices of all skins, back to back.
    palette: Vec<Mat4>,
    /// Start of each skin's block inside `palette`.
    offsets: Vec<usize>,
    /// Owning node of each skin, if any node references it.
    owners: Vec<Option<usize>>,
}

impl SkinPose {
    /// Allocate storage for `skins` and resolve each skin's owner node.
    ///
    /// Matrices start as identity.
    pub fn new(pose: &ScenePose, skins: &[Skin]) -> Self {
        let mut offsets = Vec::with_capacity(skins.len());
        let mut total = 0;
        for skin in skins {
            offsets.push(total);
            total += skin.joint_count();
        }

        let mut owners = vec![None; skins.len()];
        for (index, node) in pose.nodes().iter().enumerate() {
            let Some(skin) = node.skin else { continue };
            match owners.get_mut(skin) {
                Some(slot @ None) => *slot = Some(index),
                Some(Some(owner)) => log::debug!(
                    "Skin {skin} is referenced by nodes {owner} and {index}; evaluating against node {owner}"
                ),
                None => log::warn!("Node {index} references missing skin {skin}"),
            }
        }

        Self {
            palette: vec![Mat4::identity(); total],
            offsets,
            owners,
        }
    }

    pub fn skin_count(&self) -> usize {
        self.offsets.len()
    }

    /// Total number of joints across all skins.
    pub fn total_joint_count(&self) -> usize {
        self.palette.len()
    }

    /// Offset of a skin's first joint in the palette.
    pub fn joint_offset(&self, skin: usize) -> Option<usize> {
        self.offsets.get(skin).copied()
    }

    /// Node whose world transform the skin is evaluated against.
    pub fn owner(&self, skin: usize) -> Option<usize> {
        self.owners.get(skin).copied().flatten()
    }

    /// Joint matrices of one skin, indexed by local joint index.
    pub fn joint_matrices(&self, skin: usize) -> &[Mat4] {
        let Some(&start) = self.offsets.get(skin) else {
            return &[];
        };
        let end = self
            .offsets
            .get(skin + 1)
            .copied()
            .unwrap_or(self.palette.len());
        &self.palette[start..end]
    }

    /// All joint matrices of all skins, back to back.
    pub fn palette(&self) -> &[Mat4] {
        &self.palette
    }

    /// Palette flattened to column-major arrays, ready for upload.
    pub fn palette_columns(&self) -> impl Iterator<Item = [f32; 16]> + '_ {
        self.palette.iter().map(math::mat4_to_cols_array)
    }

    /// Recompute every skin's joint matrices from the current globals.
    pub fn update(&mut self, pose: &ScenePose, skins: &[Skin]) {
        compute_joint_matrices(pose, skins, self);
    }
}

/// Compute joint matrices for every skin that has an owner node.
///
/// Must run after propagation in the same frame. Skins with no owner keep
/// their previous (initially identity) matrices.
pub fn compute_joint_matrices(pose: &ScenePose, skins: &[Skin], out: &mut SkinPose) {
    crate::profile_function!();
    crate::profile_plot!("palette_joints", out.total_joint_count());
    for (skin_index, skin) in skins.iter().enumerate() {
        let Some(owner) = out.owner(skin_index) else {
            continue;
        };
        let Some(start) = out.joint_offset(skin_index) else {
            continue;
        };
        let node_inverse = math::inverse_or_identity(&pose.node(owner).global_transform);

        for (j, (&joint, inverse_bind)) in skin
            .joints
            .iter()
            .zip(&skin.inverse_bind_matrices)
            .enumerate()
        {
            let joint_global = pose.node(joint).global_transform;
            out.palette[start + j] = node_inverse * (joint_global * inverse_bind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq_mat4, mat4_from_translation, Vec3, MATRIX_EPSILON};
    use crate::scene::types::{NodeDesc, NodeTransform};

    /// Mesh node 0 (skinned, identity) plus a joint chain 1 -> 2 -> 3.
    fn rig(joint_locals: [Mat4; 3]) -> ScenePose {
        ScenePose::build(vec![
            NodeDesc::new().with_mesh(0).with_skin(0),
            NodeDesc::new()
                .with_matrix(joint_locals[0])
                .with_children(vec![2]),
            NodeDesc::new()
                .with_matrix(joint_locals[1])
                .with_children(vec![3]),
            NodeDesc::new().with_matrix(joint_locals[2]),
        ])
        .unwrap()
    }

    fn skin_from_rest(pose: &ScenePose, joints: Vec<usize>) -> Skin {
        let inverse_bind_matrices = joints
            .iter()
            .map(|&j| pose.node(j).global_transform.try_inverse().unwrap())
            .collect();
        Skin {
            name: None,
            joints,
            inverse_bind_matrices,
            skeleton: None,
        }
    }

    #[test]
    fn identity_joints_give_identity_matrices() {
        let mut pose = rig([Mat4::identity(); 3]);
        pose.propagate();
        let skins = vec![skin_from_rest(&pose, vec![1, 2, 3])];
        let mut skin_pose = SkinPose::new(&pose, &skins);
        skin_pose.update(&pose, &skins);
        for m in skin_pose.joint_matrices(0) {
            assert!(approx_eq_mat4(m, &Mat4::identity(), MATRIX_EPSILON));
        }
    }

    #[test]
    fn rest_pose_gives_identity_matrices() {
        let locals = [
            NodeTransform::IDENTITY
                .with_translation([0.0, 1.0, 0.0])
                .with_rotation([0.0, 0.382_683_4, 0.0, 0.923_879_5])
                .to_matrix(),
            NodeTransform::IDENTITY
                .with_translation([0.2, 0.5, 0.0])
                .with_scale([1.0, 2.0, 1.0])
                .to_matrix(),
            mat4_from_translation(Vec3::new(0.0, 0.3, 0.1)),
        ];
        let mut pose = rig(locals);
        pose.propagate();
        let skins = vec![skin_from_rest(&pose, vec![1, 2, 3])];

        let mut skin_pose = SkinPose::new(&pose, &skins);
        skin_pose.update(&pose, &skins);
        assert_eq!(skin_pose.joint_matrices(0).len(), 3);
        for m in skin_pose.joint_matrices(0) {
            assert!(approx_eq_mat4(m, &Mat4::identity(), MATRIX_EPSILON));
        }
    }

    #[test]
    fn moving_a_joint_changes_only_its_subtree() {
        let mut pose = rig([Mat4::identity(); 3]);
        pose.propagate();
        let skins = vec![skin_from_rest(&pose, vec![1, 2, 3])];
        let mut skin_pose = SkinPose::new(&pose, &skins);

        pose.set_local_transform(2, mat4_from_translation(Vec3::new(0.0, 0.0, 1.0)));
        pose.propagate();
        skin_pose.update(&pose, &skins);

        let m = skin_pose.joint_matrices(0);
        assert!(approx_eq_mat4(&m[0], &Mat4::identity(), MATRIX_EPSILON));
        let moved = mat4_from_translation(Vec3::new(0.0, 0.0, 1.0));
        assert!(approx_eq_mat4(&m[1], &moved, MATRIX_EPSILON));
        assert!(approx_eq_mat4(&m[2], &moved, MATRIX_EPSILON));
    }

    #[test]
    fn owner_transform_is_factored_out() {
        let owner = mat4_from_translation(Vec3::new(5.0, 0.0, 0.0));
        let mut pose = ScenePose::build(vec![
            NodeDesc::new().with_matrix(owner).with_skin(0),
            NodeDesc::new(),
        ])
        .unwrap();
        pose.propagate();
        let skins = vec![Skin {
            name: None,
            joints: vec![1],
            inverse_bind_matrices: vec![Mat4::identity()],
            skeleton: None,
        }];
        let mut skin_pose = SkinPose::new(&pose, &skins);
        skin_pose.update(&pose, &skins);
        let expected = owner.try_inverse().unwrap();
        assert!(approx_eq_mat4(
            &skin_pose.joint_matrices(0)[0],
            &expected,
            MATRIX_EPSILON
        ));
    }

    #[test]
    fn palette_offsets_follow_skin_order() {
        let pose = ScenePose::build(vec![
            NodeDesc::new().with_skin(0).with_children(vec![1, 2, 3]),
            NodeDesc::new().with_skin(1),
            NodeDesc::new(),
            NodeDesc::new(),
        ])
        .unwrap();
        let skin = |joints: Vec<usize>| Skin {
            name: None,
            inverse_bind_matrices: vec![Mat4::identity(); joints.len()],
            joints,
            skeleton: None,
        };
        let skins = vec![skin(vec![2, 3]), skin(vec![2, 3, 1]), skin(vec![3])];
        let skin_pose = SkinPose::new(&pose, &skins);

        assert_eq!(skin_pose.total_joint_count(), 6);
        assert_eq!(skin_pose.joint_offset(0), Some(0));
        assert_eq!(skin_pose.joint_offset(1), Some(2));
        assert_eq!(skin_pose.joint_offset(2), Some(5));
        assert_eq!(skin_pose.joint_matrices(1).len(), 3);
        assert_eq!(skin_pose.owner(0), Some(0));
        assert_eq!(skin_pose.owner(1), Some(1));
        assert_eq!(skin_pose.owner(2), None);
        assert!(skin_pose.joint_matrices(9).is_empty());
        assert_eq!(skin_pose.palette_columns().count(), 6);
    }
}
