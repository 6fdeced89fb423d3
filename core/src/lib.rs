//! # Avatar Core
//!
//! CPU-side half of the avatar viewer: container loading, the node
//! hierarchy, per-frame transform propagation and skinning, plus the camera.
//! Nothing in this crate touches GPU state.

pub mod camera;
pub mod gltf;
pub mod material;
pub mod math;
pub mod mesh;
pub mod profiling;
pub mod scene;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
