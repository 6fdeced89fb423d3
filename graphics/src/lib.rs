//! # Avatar Graphics
//!
//! Frame-pipelined GPU resource management for a skinned, morphable avatar.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Renderer`] - The narrow buffer/descriptor/submit contract a GPU backend implements
//! - [`FramePipeline`] - Frame slot state machine gated by [`Fence`]s
//! - [`FrameResources`] - N copies of every per-frame buffer plus descriptor sets
//! - [`FrameWriter`] - The only way to write a slot, valid while the slot is `Writing`
//! - [`AvatarRenderer`] - Runs propagate, skin, write and submit once per frame
//! - [`DummyRenderer`] - In-memory renderer for tests
//!
//! ## Example
//!
//! ```no_run
//! use avatar_graphics::{AvatarRenderer, DummyRenderer, FrameConfig, FrameInput};
//!
//! let data = std::fs::read("avatar.vrm").unwrap();
//! let mut renderer = DummyRenderer::new();
//! let mut avatar = AvatarRenderer::from_bytes(&mut renderer, &data, FrameConfig::default()).unwrap();
//!
//! for _ in 0..3 {
//!     avatar.frame(&mut renderer, &FrameInput::idle(1.0 / 60.0)).unwrap();
//! }
//! avatar.shutdown(&mut renderer);
//! ```

pub mod avatar_renderer;
pub mod config;
pub mod descriptors;
pub mod dummy;
pub mod error;
pub mod frame_resources;
pub mod pipeline;
pub mod renderer;
pub mod sync;
pub mod types;
pub mod uniforms;

pub use avatar_renderer::{AvatarRenderer, FrameInput, NodeRotation};
pub use config::FrameConfig;
pub use descriptors::{DescriptorPoolSizes, ResourceCounts};
pub use dummy::{DummyRenderer, FenceMode};
pub use error::GraphicsError;
pub use frame_resources::{DrawInfo, FrameResources, FrameWriter};
pub use pipeline::{FramePipeline, SlotState};
pub use renderer::{DrawCommand, FrameSubmission, Renderer};
pub use sync::{Fence, FenceStatus};
pub use types::{
    BindingResource, BufferDescriptor, BufferHandle, BufferUsage, DescriptorBinding,
    DescriptorPoolHandle, DescriptorSetDesc, DescriptorSetHandle, DescriptorType,
};
pub use uniforms::{DrawPushConstants, MaterialBlock, MorphHeader, ObjectUniforms};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
