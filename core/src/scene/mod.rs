//! Scene hierarchy, transform propagation and skinning.
//!
//! - [`NodeDesc`] - One entry of the flat, serialized node list
//! - [`ScenePose`] - Built node array with index links and a traversal order
//! - [`Node`] - A node with local/global transforms and hierarchy links
//! - [`Skin`] - Joint node indices plus inverse bind matrices
//! - [`SkinPose`] - Per-skin joint matrices, laid out as one palette
//!
//! Per frame, callers run [`ScenePose::propagate`] and then
//! [`SkinPose::update`], in that order.

mod hierarchy;
mod pose;
mod skinning;
mod types;

pub use pose::{propagate_transforms, ScenePose};
pub use skinning::{compute_joint_matrices, SkinPose};
pub use types::{Node, NodeDesc, NodeTransform, Skin};
