//! The renderer contract.
//!
//! Device bring-up, pipelines, shaders and presentation live behind
//! [`Renderer`]. The frame resources only create buffers and descriptor
//! sets, write mapped memory, and hand over a draw list per frame slot.

use avatar_core::material::AlphaMode;

use crate::descriptors::DescriptorPoolSizes;
use crate::error::GraphicsError;
use crate::sync::Fence;
use crate::types::{
    BufferDescriptor, BufferHandle, DescriptorPoolHandle, DescriptorSetDesc, DescriptorSetHandle,
};
use crate::uniforms::DrawPushConstants;

/// One indexed draw of one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Index of the primitive in the asset.
    pub primitive: usize,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    /// Per-slot set holding the joint palette and textures.
    pub scene_set: DescriptorSetHandle,
    /// Per-slot, per-primitive set holding uniforms, material and morph data.
    pub primitive_set: DescriptorSetHandle,
    pub push_constants: DrawPushConstants,
    /// Pipeline selection hints.
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
}

/// Everything the renderer needs to record and submit one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameSubmission<'a> {
    /// Frame slot whose resources the draws reference.
    pub slot: usize,
    /// Monotonic frame number, starting at 1.
    pub frame: u64,
    pub draws: &'a [DrawCommand],
}

/// A GPU backend that owns buffers, descriptor pools and submission.
///
/// Buffers created with [`BufferUsage::MAP_WRITE`](crate::BufferUsage::MAP_WRITE)
/// are persistently mapped; [`write_buffer`](Self::write_buffer) on them is a
/// plain memory write with no synchronization. Callers must not write a
/// buffer referenced by a submission whose fence is unsignaled.
pub trait Renderer {
    /// Create a buffer, optionally filled with `contents`.
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> Result<BufferHandle, GraphicsError>;

    /// Write `data` at `offset` into a buffer's mapped memory.
    fn write_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError>;

    fn destroy_buffer(&mut self, buffer: BufferHandle);

    /// Create a descriptor pool. Fails with
    /// [`GraphicsError::ResourcePoolExhausted`] if the device cannot provide it.
    fn create_descriptor_pool(
        &mut self,
        sizes: &DescriptorPoolSizes,
    ) -> Result<DescriptorPoolHandle, GraphicsError>;

    /// Allocate and write a descriptor set. Fails with
    /// [`GraphicsError::ResourcePoolExhausted`] if the pool is out of capacity.
    fn allocate_descriptor_set(
        &mut self,
        pool: DescriptorPoolHandle,
        set: &DescriptorSetDesc,
    ) -> Result<DescriptorSetHandle, GraphicsError>;

    /// Destroy a pool and every set allocated from it.
    fn destroy_descriptor_pool(&mut self, pool: DescriptorPoolHandle);

    /// Record and submit a frame. The returned fence is signaled when the GPU
    /// no longer reads any resource referenced by the draws.
    fn submit(&mut self, frame: &FrameSubmission<'_>) -> Result<Fence, GraphicsError>;

    /// Current viewport size in pixels.
    fn viewport(&self) -> (u32, u32);
}
