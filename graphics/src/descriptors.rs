//! Descriptor pool sizing.
//!
//! Every frame slot gets one scene set and one set per primitive:
//!
//! ```text
//! scene set      binding 0  joint palette     (storage)
//!                binding 1  textures[T]       (sampled)
//!
//! primitive set  binding 0  object uniforms   (uniform)
//!                binding 1  material block    (storage)
//!                binding 2  morph block       (storage, material block if no targets)
//! ```
//!
//! The pool is sized for the full fan-out up front. A pool that is too small
//! fails at setup instead of at draw time.

use crate::types::{DescriptorSetDesc, DescriptorType};

/// Number of frame slots, textures and primitives a renderer must provision for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceCounts {
    pub frames_in_flight: usize,
    pub textures: usize,
    pub primitives: usize,
}

/// Descriptor capacity of a pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DescriptorPoolSizes {
    pub uniform_buffers: u32,
    pub storage_buffers: u32,
    pub sampled_textures: u32,
    pub max_sets: u32,
}

impl DescriptorPoolSizes {
    /// Worst-case sizes for the given resource counts.
    pub fn for_counts(counts: ResourceCounts) -> Self {
        let frames = counts.frames_in_flight as u32;
        let textures = counts.textures as u32;
        let primitives = counts.primitives as u32;

        Self {
            uniform_buffers: frames * primitives,
            storage_buffers: frames * (2 * primitives + 1),
            sampled_textures: frames * textures,
            max_sets: frames * (primitives + 1),
        }
    }

    /// Capacity for descriptors of type `ty`.
    pub fn capacity(&self, ty: DescriptorType) -> u32 {
        match ty {
            DescriptorType::UniformBuffer => self.uniform_buffers,
            DescriptorType::StorageBuffer => self.storage_buffers,
            DescriptorType::CombinedImageSampler => self.sampled_textures,
        }
    }

    /// Sizes needed to allocate every set in `sets`.
    pub fn required_for(sets: &[DescriptorSetDesc]) -> Self {
        sets.iter().fold(Self::default(), |acc, set| Self {
            uniform_buffers: acc.uniform_buffers + set.count(DescriptorType::UniformBuffer),
            storage_buffers: acc.storage_buffers + set.count(DescriptorType::StorageBuffer),
            sampled_textures: acc.sampled_textures
                + set.count(DescriptorType::CombinedImageSampler),
            max_sets: acc.max_sets + 1,
        })
    }

    /// Whether every capacity is at least as large as `other`'s.
    pub fn covers(&self, other: &Self) -> bool {
        self.uniform_buffers >= other.uniform_buffers
            && self.storage_buffers >= other.storage_buffers
            && self.sampled_textures >= other.sampled_textures
            && self.max_sets >= other.max_sets
    }
}
