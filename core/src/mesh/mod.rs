//! CPU-side mesh data for skinned, morphable avatar primitives.
//!
//! - [`AvatarVertex`] - Interleaved vertex with skinning attributes
//! - [`MorphTarget`] - Per-vertex position deltas for one blend shape
//! - [`AvatarPrimitive`] - One drawable primitive with vertices, indices and morphs
//!
//! All of this is immutable once loaded.

mod data;

pub use data::{AvatarPrimitive, AvatarVertex, MorphTarget};
