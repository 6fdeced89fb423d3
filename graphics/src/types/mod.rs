//! Common types and descriptors for graphics resources.
//!
//! This module contains usage flags, handles and descriptor structs passed
//! across the [`Renderer`](crate::Renderer) boundary.

mod buffer;
mod descriptor;

pub use buffer::{BufferDescriptor, BufferHandle, BufferUsage};
pub use descriptor::{
    BindingResource, DescriptorBinding, DescriptorPoolHandle, DescriptorSetDesc,
    DescriptorSetHandle, DescriptorType,
};
