//! The mutable scene pose and transform propagation.
//!
//! A [`ScenePose`] owns the node array. Local transforms may be edited
//! between frames; [`ScenePose::propagate`] then recomputes every global
//! transform in the precomputed traversal order:
//!
//! ```text
//! root:      global = local
//! non-root:  global = local * parent.global
//! ```
//!
//! The parent's global is multiplied on the right. Joint math downstream
//! relies on this exact order.

use super::types::Node;
use crate::math::{self, Mat4, Vec3};

/// Node array plus the derived traversal order.
#[derive(Debug, Clone)]
pub struct ScenePose {
    pub(super) nodes: Vec<Node>,
    pub(super) roots: Vec<usize>,
    /// Every parent precedes its children.
    pub(super) order: Vec<usize>,
    /// Local transforms as loaded, for [`ScenePose::reset_to_rest`].
    pub(super) rest_locals: Vec<Mat4>,
}

impl ScenePose {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Parent-before-child order used by [`ScenePose::propagate`].
    pub fn traversal_order(&self) -> &[usize] {
        &self.order
    }

    pub fn local_transform(&self, index: usize) -> Option<&Mat4> {
        self.nodes.get(index).map(|n| &n.local_transform)
    }

    pub fn global_transform(&self, index: usize) -> Option<&Mat4> {
        self.nodes.get(index).map(|n| &n.global_transform)
    }

    /// Replace a node's local transform. Returns `false` if `index` is out of range.
    ///
    /// Globals are stale until the next [`ScenePose::propagate`].
    pub fn set_local_transform(&mut self, index: usize, local: Mat4) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.local_transform = local;
                true
            }
            None => false,
        }
    }

    /// Rotate a node about `axis` (in its local frame) by `angle` radians.
    ///
    /// The rotation is multiplied on the right of the current local transform.
    pub fn rotate_local(&mut self, index: usize, axis: Vec3, angle: f32) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.local_transform *= math::mat4_from_axis_angle(axis, angle);
                true
            }
            None => false,
        }
    }

    /// Restore every local transform to its loaded value.
    pub fn reset_to_rest(&mut self) {
        for (node, rest) in self.nodes.iter_mut().zip(&self.rest_locals) {
            node.local_transform = *rest;
        }
    }

    /// First node (by index) that references `mesh`.
    pub fn node_for_mesh(&self, mesh: usize) -> Option<usize> {
        self.nodes.iter().position(|n| n.mesh == Some(mesh))
    }

    /// Recompute every global transform from the locals.
    pub fn propagate(&mut self) {
        propagate_transforms(self);
    }
}

/// Recompute global transforms in traversal order.
///
/// Iterative over the precomputed order, so it cannot recurse or loop no
/// matter what the node links contain.
pub fn propagate_transforms(pose: &mut ScenePose) {
    crate::profile_function!();
    for &index in &pose.order {
        let global = match pose.nodes[index].parent {
            None => pose.nodes[index].local_transform,
            Some(parent) => pose.nodes[index].local_transform * pose.nodes[parent].global_transform,
        };
        pose.nodes[index].global_transform = global;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{MATRIX_EPSILON, approx_eq_mat4, mat4_from_translation, mat4_translation};
    use crate::scene::types::NodeDesc;
    use rstest::rstest;

    fn translate(x: f32, y: f32, z: f32) -> Mat4 {
        mat4_from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn chain_scenario_right_multiplies_parent() {
        // root -> A -> B
        let mut pose = ScenePose::build(vec![
            NodeDesc::new()
                .with_matrix(translate(0.0, 1.0, 0.0))
                .with_children(vec![1]),
            NodeDesc::new()
                .with_matrix(translate(1.0, 0.0, 0.0))
                .with_children(vec![2]),
            NodeDesc::new(),
        ])
        .unwrap();
        pose.propagate();

        let expected = Mat4::identity() * translate(1.0, 0.0, 0.0) * translate(0.0, 1.0, 0.0);
        let b = pose.node(2).global_transform;
        assert!(approx_eq_mat4(&b, &expected, MATRIX_EPSILON));
        let t = mat4_translation(&b);
        assert!((t - Vec3::new(1.0, 1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn right_multiply_order_is_observable_with_rotation() {
        // Parent rotated 90 degrees about Z, child translated along X.
        let parent = math::mat4_from_axis_angle(Vec3::z(), std::f32::consts::FRAC_PI_2);
        let child = translate(1.0, 0.0, 0.0);
        let mut pose = ScenePose::build(vec![
            NodeDesc::new().with_matrix(parent).with_children(vec![1]),
            NodeDesc::new().with_matrix(child),
        ])
        .unwrap();
        pose.propagate();

        let expected = child * parent;
        assert!(approx_eq_mat4(
            &pose.node(1).global_transform,
            &expected,
            MATRIX_EPSILON
        ));
        // local * parent keeps the child's translation unrotated.
        let t = mat4_translation(&pose.node(1).global_transform);
        assert!((t - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn roots_keep_local_transform() {
        let a = translate(3.0, 0.0, 0.0);
        let b = translate(0.0, 0.0, -2.0);
        let mut pose = ScenePose::build(vec![
            NodeDesc::new().with_matrix(a),
            NodeDesc::new().with_matrix(b).with_children(vec![2]),
            NodeDesc::new(),
        ])
        .unwrap();
        pose.propagate();
        assert_eq!(pose.node(0).global_transform, a);
        assert_eq!(pose.node(1).global_transform, b);
    }

    #[test]
    fn children_stored_before_parents_still_propagate() {
        // Index order is the reverse of hierarchy order: 2 is the root.
        let mut pose = ScenePose::build(vec![
            NodeDesc::new().with_matrix(translate(0.0, 0.0, 1.0)),
            NodeDesc::new()
                .with_matrix(translate(0.0, 1.0, 0.0))
                .with_children(vec![0]),
            NodeDesc::new()
                .with_matrix(translate(1.0, 0.0, 0.0))
                .with_children(vec![1]),
        ])
        .unwrap();
        assert_eq!(pose.traversal_order(), &[2, 1, 0]);
        pose.propagate();
        let t = mat4_translation(&pose.node(0).global_transform);
        assert!((t - Vec3::new(1.0, 1.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn rotate_local_right_multiplies() {
        let start = translate(0.0, 2.0, 0.0);
        let mut pose = ScenePose::build(vec![NodeDesc::new().with_matrix(start)]).unwrap();
        let angle = 1.0f32.to_radians();
        assert!(pose.rotate_local(0, Vec3::y(), angle));
        let expected = start * math::mat4_from_axis_angle(Vec3::y(), angle);
        assert!(approx_eq_mat4(
            pose.local_transform(0).unwrap(),
            &expected,
            MATRIX_EPSILON
        ));
        assert!(!pose.rotate_local(7, Vec3::y(), angle));
    }

    #[test]
    fn edits_are_picked_up_by_next_pass_and_reset_restores_rest() {
        let mut pose = ScenePose::build(vec![
            NodeDesc::new().with_children(vec![1]),
            NodeDesc::new().with_matrix(translate(1.0, 0.0, 0.0)),
        ])
        .unwrap();
        pose.propagate();
        assert!(pose.set_local_transform(0, translate(0.0, 5.0, 0.0)));
        pose.propagate();
        let t = mat4_translation(&pose.node(1).global_transform);
        assert!((t - Vec3::new(1.0, 5.0, 0.0)).norm() < 1e-6);

        pose.reset_to_rest();
        pose.propagate();
        let t = mat4_translation(&pose.node(1).global_transform);
        assert!((t - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn node_for_mesh_finds_first_reference() {
        let pose = ScenePose::build(vec![
            NodeDesc::new().with_children(vec![1, 2]),
            NodeDesc::new().with_mesh(3),
            NodeDesc::new().with_mesh(3),
        ])
        .unwrap();
        assert_eq!(pose.node_for_mesh(3), Some(1));
        assert_eq!(pose.node_for_mesh(0), None);
    }

    /// A `depth`-long chain stored leaf first, so array order is the reverse
    /// of parent order.
    fn reversed_chain(depth: usize) -> Vec<NodeDesc> {
        (0..depth)
            .map(|i| {
                let desc = NodeDesc::new().with_matrix(translate(0.0, 1.0, 0.0));
                if i == 0 { desc } else { desc.with_children(vec![i - 1]) }
            })
            .collect()
    }

    /// One root stored last, with `width` children before it.
    fn fan_out(width: usize) -> Vec<NodeDesc> {
        let mut descs: Vec<NodeDesc> = (0..width)
            .map(|i| NodeDesc::new().with_matrix(translate(i as f32, 0.0, 0.5)))
            .collect();
        descs.push(
            NodeDesc::new()
                .with_matrix(translate(0.0, 2.0, 0.0))
                .with_children((0..width).collect()),
        );
        descs
    }

    #[rstest]
    #[case::chain_of_five(reversed_chain(5))]
    #[case::fan_out_of_fifty(fan_out(50))]
    fn test_parents_precede_children_and_globals_compose(#[case] descs: Vec<NodeDesc>) {
        let mut pose = ScenePose::build(descs).unwrap();
        for i in 0..pose.len() {
            assert!(pose.rotate_local(i, Vec3::new(0.3, 1.0, 0.2), 0.1 * (i + 1) as f32));
        }
        pose.propagate();

        let order = pose.traversal_order();
        assert_eq!(order.len(), pose.len());
        let mut position = vec![usize::MAX; pose.len()];
        for (pos, &node) in order.iter().enumerate() {
            position[node] = pos;
        }

        for i in 0..pose.len() {
            let node = pose.node(i);
            match node.parent {
                None => assert_eq!(node.global_transform, node.local_transform),
                Some(parent) => {
                    assert!(position[parent] < position[i], "node {i} visited before parent {parent}");
                    let expected = node.local_transform * pose.node(parent).global_transform;
                    assert!(approx_eq_mat4(&node.global_transform, &expected, MATRIX_EPSILON));
                }
            }
        }
    }
}
