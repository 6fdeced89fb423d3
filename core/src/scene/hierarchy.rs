//! Hierarchy construction from a flat node list.
//!
//! Each entry lists its children by index. Building turns that into
//! parent / first-child / next-sibling links and computes, once, a traversal
//! order in which every parent precedes all of its descendants:
//!
//! ```text
//! desc[0].children = [1, 2]        0 ── first_child ──> 1 ── next_sibling ──> 2
//! desc[1].children = [3]                               │
//! desc[2].children = []                                └─ first_child ──> 3
//!
//! traversal order (BFS from roots): 0, 1, 2, 3
//! ```

use std::collections::VecDeque;

use super::pose::ScenePose;
use super::types::{Node, NodeDesc};
use crate::gltf::GltfError;

impl ScenePose {
    /// Build the hierarchy from a flat node list.
    ///
    /// Rejects, as format errors: a child index out of range, a node listing
    /// itself as a child, a node listed as a child of two parents (or twice
    /// by the same parent), and any node not reachable from a root. Under
    /// the single-parent rule an unreachable node can only sit on a cycle, so
    /// a successful build is always a forest.
    ///
    /// Every node's global transform starts equal to its local transform.
    pub fn build(descs: Vec<NodeDesc>) -> Result<Self, GltfError> {
        let count = descs.len();
        let mut parent: Vec<Option<usize>> = vec![None; count];
        let mut next_sibling: Vec<Option<usize>> = vec![None; count];

        for (index, desc) in descs.iter().enumerate() {
            for &child in &desc.children {
                if child >= count {
                    return Err(GltfError::format(format!(
                        "node {index}: child index {child} out of range ({count} nodes)"
                    )));
                }
                if child == index {
                    return Err(GltfError::format(format!(
                        "node {index} lists itself as a child"
                    )));
                }
                if let Some(existing) = parent[child] {
                    return Err(GltfError::format(format!(
                        "node {child} has more than one parent ({existing} and {index})"
                    )));
                }
                parent[child] = Some(index);
            }
            for pair in desc.children.windows(2) {
                next_sibling[pair[0]] = Some(pair[1]);
            }
        }

        let nodes: Vec<Node> = descs
            .into_iter()
            .enumerate()
            .map(|(index, desc)| Node {
                name: desc.name,
                local_transform: desc.local_transform,
                global_transform: desc.local_transform,
                mesh: desc.mesh,
                skin: desc.skin,
                parent: parent[index],
                first_child: desc.children.first().copied(),
                next_sibling: next_sibling[index],
            })
            .collect();

        let roots: Vec<usize> = (0..count).filter(|&i| parent[i].is_none()).collect();
        let order = traversal_order(&nodes, &roots);
        if order.len() != count {
            return Err(GltfError::format(format!(
                "{} node(s) are unreachable from any root; the hierarchy contains a cycle",
                count - order.len()
            )));
        }

        log::debug!(
            "Built hierarchy: {} nodes, {} root(s)",
            nodes.len(),
            roots.len()
        );

        let rest_locals = nodes.iter().map(|n| n.local_transform).collect();
        Ok(Self {
            nodes,
            roots,
            order,
            rest_locals,
        })
    }
}

/// Breadth-first order from the roots over first-child / next-sibling links.
///
/// Each node is enqueued at most once because it has at most one parent and
/// appears at most once in that parent's sibling chain, so this terminates
/// even on malformed input.
fn traversal_order(nodes: &[Node], roots: &[usize]) -> Vec<usize> {
    let mut order = Vec::with_capacity(nodes.len());
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();

    while let Some(index) = queue.pop_front() {
        order.push(index);
        let mut child = nodes[index].first_child;
        while let Some(c) = child {
            queue.push_back(c);
            child = nodes[c].next_sibling;
        }
    }

    order
}
