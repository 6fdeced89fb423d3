//! Descriptor set layouts and handles.

use super::BufferHandle;

/// Handle to a descriptor pool owned by a [`Renderer`](crate::Renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorPoolHandle(pub u64);

/// Handle to a descriptor set allocated from a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorSetHandle(pub u64);

/// Kind of descriptor consumed from a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorType {
    UniformBuffer,
    StorageBuffer,
    CombinedImageSampler,
}

/// Resource bound at one binding of a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingResource {
    UniformBuffer(BufferHandle),
    StorageBuffer(BufferHandle),
    /// An array of `count` sampled textures, indexed by the asset's texture order.
    Textures { count: u32 },
}

impl BindingResource {
    pub fn descriptor_type(&self) -> DescriptorType {
        match self {
            Self::UniformBuffer(_) => DescriptorType::UniformBuffer,
            Self::StorageBuffer(_) => DescriptorType::StorageBuffer,
            Self::Textures { .. } => DescriptorType::CombinedImageSampler,
        }
    }

    /// Number of descriptors this binding consumes.
    pub fn descriptor_count(&self) -> u32 {
        match self {
            Self::Textures { count } => *count,
            _ => 1,
        }
    }

    /// The buffer referenced by this binding, if any.
    pub fn buffer(&self) -> Option<BufferHandle> {
        match self {
            Self::UniformBuffer(b) | Self::StorageBuffer(b) => Some(*b),
            Self::Textures { .. } => None,
        }
    }
}

/// A single binding within a descriptor set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub resource: BindingResource,
}

/// Contents of a descriptor set to allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSetDesc {
    pub label: Option<String>,
    pub bindings: Vec<DescriptorBinding>,
}

impl DescriptorSetDesc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a binding. Bindings with zero descriptors are skipped.
    pub fn with_binding(mut self, binding: u32, resource: BindingResource) -> Self {
        if resource.descriptor_count() > 0 {
            self.bindings.push(DescriptorBinding { binding, resource });
        }
        self
    }

    /// Number of descriptors of `ty` this set consumes.
    pub fn count(&self, ty: DescriptorType) -> u32 {
        self.bindings
            .iter()
            .filter(|b| b.resource.descriptor_type() == ty)
            .map(|b| b.resource.descriptor_count())
            .sum()
    }

    /// Buffers referenced by this set.
    pub fn buffers(&self) -> impl Iterator<Item = BufferHandle> + '_ {
        self.bindings.iter().filter_map(|b| b.resource.buffer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_texture_array_is_skipped() {
        let desc = DescriptorSetDesc::new()
            .with_binding(0, BindingResource::StorageBuffer(BufferHandle(1)))
            .with_binding(1, BindingResource::Textures { count: 0 });
        assert_eq!(desc.bindings.len(), 1);
        assert_eq!(desc.count(DescriptorType::CombinedImageSampler), 0);
    }

    #[test]
    fn counts_by_type() {
        let desc = DescriptorSetDesc::new()
            .with_binding(0, BindingResource::UniformBuffer(BufferHandle(1)))
            .with_binding(1, BindingResource::StorageBuffer(BufferHandle(2)))
            .with_binding(2, BindingResource::StorageBuffer(BufferHandle(2)))
            .with_binding(3, BindingResource::Textures { count: 5 });
        assert_eq!(desc.count(DescriptorType::UniformBuffer), 1);
        assert_eq!(desc.count(DescriptorType::StorageBuffer), 2);
        assert_eq!(desc.count(DescriptorType::CombinedImageSampler), 5);
        assert_eq!(desc.buffers().count(), 3);
    }
}
