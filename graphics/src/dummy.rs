//! Dummy renderer for testing and development.
//!
//! Doesn't touch a GPU, but keeps buffer contents in memory, enforces
//! descriptor pool capacity, and tracks which buffers every in-flight
//! submission reads. A write to such a buffer before its fence is signaled
//! is recorded as a violation.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::descriptors::DescriptorPoolSizes;
use crate::error::GraphicsError;
use crate::renderer::{DrawCommand, FrameSubmission, Renderer};
use crate::sync::Fence;
use crate::types::{
    BufferDescriptor, BufferHandle, DescriptorPoolHandle, DescriptorSetDesc, DescriptorSetHandle,
};

/// How the dummy renderer completes submitted frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceMode {
    /// Every fence is signaled as soon as it is returned.
    #[default]
    Immediate,
    /// Fences stay unsignaled until the test completes them.
    Manual,
}

#[derive(Debug)]
struct DummyBuffer {
    descriptor: BufferDescriptor,
    data: Vec<u8>,
}

#[derive(Debug)]
struct DummyPool {
    capacity: DescriptorPoolSizes,
    used: DescriptorPoolSizes,
    sets: Vec<DescriptorSetHandle>,
}

#[derive(Debug)]
struct InFlight {
    frame: u64,
    slot: usize,
    fence: Fence,
    buffers: HashSet<BufferHandle>,
}

/// In-memory [`Renderer`].
#[derive(Debug)]
pub struct DummyRenderer {
    next_id: u64,
    buffers: HashMap<BufferHandle, DummyBuffer>,
    pools: HashMap<DescriptorPoolHandle, DummyPool>,
    sets: HashMap<DescriptorSetHandle, DescriptorSetDesc>,
    in_flight: VecDeque<InFlight>,
    fence_mode: FenceMode,
    pool_limit: Option<DescriptorPoolSizes>,
    max_buffers: Option<usize>,
    viewport: (u32, u32),
    violations: usize,
    frames_submitted: u64,
    last_draws: Vec<DrawCommand>,
}

impl DummyRenderer {
    /// Create a new dummy renderer with a 1280x720 viewport.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            buffers: HashMap::new(),
            pools: HashMap::new(),
            sets: HashMap::new(),
            in_flight: VecDeque::new(),
            fence_mode: FenceMode::Immediate,
            pool_limit: None,
            max_buffers: None,
            viewport: (1280, 720),
            violations: 0,
            frames_submitted: 0,
            last_draws: Vec::new(),
        }
    }

    /// Set how submitted frames complete.
    pub fn with_fence_mode(mut self, mode: FenceMode) -> Self {
        self.fence_mode = mode;
        self
    }

    /// Largest descriptor pool the device can create.
    pub fn with_pool_limit(mut self, limit: DescriptorPoolSizes) -> Self {
        self.pool_limit = Some(limit);
        self
    }

    /// Maximum number of live buffers.
    pub fn with_max_buffers(mut self, max: usize) -> Self {
        self.max_buffers = Some(max);
        self
    }

    /// Get the renderer name.
    pub fn name(&self) -> &'static str {
        "Dummy Renderer"
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Drop bookkeeping for submissions whose fences have been signaled.
    fn retire(&mut self) {
        self.in_flight.retain(|s| !s.fence.is_signaled());
    }

    /// Whether an unfinished submission reads `buffer`.
    fn in_use(&mut self, buffer: BufferHandle) -> Option<(u64, usize)> {
        self.retire();
        self.in_flight
            .iter()
            .find(|s| s.buffers.contains(&buffer))
            .map(|s| (s.frame, s.slot))
    }

    /// Signal the oldest unfinished submission. Returns `false` if none is pending.
    pub fn complete_oldest(&mut self) -> bool {
        self.retire();
        match self.in_flight.pop_front() {
            Some(submission) => {
                log::trace!(
                    "DummyRenderer: completing frame {} (slot {})",
                    submission.frame,
                    submission.slot
                );
                submission.fence.signal();
                true
            }
            None => false,
        }
    }

    /// Signal every unfinished submission.
    pub fn complete_all(&mut self) {
        while self.complete_oldest() {}
    }

    /// Number of submissions whose fences are still unsignaled.
    pub fn pending_count(&mut self) -> usize {
        self.retire();
        self.in_flight.len()
    }

    /// Fences of unfinished submissions, oldest first.
    pub fn pending_fences(&mut self) -> Vec<Fence> {
        self.retire();
        self.in_flight.iter().map(|s| s.fence.clone()).collect()
    }

    /// Writes or destroys that hit a buffer still read by the GPU.
    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames_submitted
    }

    /// Draws of the most recent submission.
    pub fn last_draws(&self) -> &[DrawCommand] {
        &self.last_draws
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Current contents of a buffer.
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.data.as_slice())
    }

    pub fn buffer_descriptor(&self, buffer: BufferHandle) -> Option<&BufferDescriptor> {
        self.buffers.get(&buffer).map(|b| &b.descriptor)
    }

    pub fn descriptor_set(&self, set: DescriptorSetHandle) -> Option<&DescriptorSetDesc> {
        self.sets.get(&set)
    }
}

impl Default for DummyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for DummyRenderer {
    fn create_buffer(
        &mut self,
        descriptor: &BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> Result<BufferHandle, GraphicsError> {
        log::trace!(
            "DummyRenderer: creating buffer {:?} (size: {})",
            descriptor.label,
            descriptor.size
        );
        if let Some(max) = self.max_buffers
            && self.buffers.len() >= max
        {
            return Err(GraphicsError::ResourcePoolExhausted(format!(
                "buffer limit of {max} reached creating {:?}",
                descriptor.label
            )));
        }

        let mut data = vec![0u8; descriptor.size as usize];
        if let Some(contents) = contents {
            if contents.len() > data.len() {
                return Err(GraphicsError::InvalidParameter(format!(
                    "{} initial bytes for a buffer of {} bytes",
                    contents.len(),
                    data.len()
                )));
            }
            data[..contents.len()].copy_from_slice(contents);
        }

        let handle = BufferHandle(self.next_id());
        self.buffers.insert(
            handle,
            DummyBuffer {
                descriptor: descriptor.clone(),
                data,
            },
        );
        Ok(handle)
    }

    fn write_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> Result<(), GraphicsError> {
        log::trace!(
            "DummyRenderer: write_buffer {:?} offset={} len={}",
            buffer,
            offset,
            data.len()
        );
        if let Some((frame, slot)) = self.in_use(buffer) {
            log::error!(
                "DummyRenderer: {buffer:?} written while frame {frame} (slot {slot}) is in flight"
            );
            self.violations += 1;
        }

        let target = self
            .buffers
            .get_mut(&buffer)
            .ok_or_else(|| GraphicsError::InvalidParameter(format!("unknown buffer {buffer:?}")))?;
        if !target.descriptor.is_mapped() {
            return Err(GraphicsError::InvalidParameter(format!(
                "buffer {:?} is not mapped",
                target.descriptor.label
            )));
        }
        let start = offset as usize;
        let end = start + data.len();
        if end > target.data.len() {
            return Err(GraphicsError::InvalidParameter(format!(
                "write of {}..{end} past the end of {:?} ({} bytes)",
                start,
                target.descriptor.label,
                target.data.len()
            )));
        }
        target.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        log::trace!("DummyRenderer: destroying buffer {buffer:?}");
        if let Some((frame, slot)) = self.in_use(buffer) {
            log::error!(
                "DummyRenderer: {buffer:?} destroyed while frame {frame} (slot {slot}) is in flight"
            );
            self.violations += 1;
        }
        self.buffers.remove(&buffer);
    }

    fn create_descriptor_pool(
        &mut self,
        sizes: &DescriptorPoolSizes,
    ) -> Result<DescriptorPoolHandle, GraphicsError> {
        log::trace!("DummyRenderer: creating descriptor pool {sizes:?}");
        if let Some(limit) = self.pool_limit
            && !limit.covers(sizes)
        {
            return Err(GraphicsError::ResourcePoolExhausted(format!(
                "descriptor pool {sizes:?} exceeds device limit {limit:?}"
            )));
        }

        let handle = DescriptorPoolHandle(self.next_id());
        self.pools.insert(
            handle,
            DummyPool {
                capacity: *sizes,
                used: DescriptorPoolSizes::default(),
                sets: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn allocate_descriptor_set(
        &mut self,
        pool: DescriptorPoolHandle,
        set: &DescriptorSetDesc,
    ) -> Result<DescriptorSetHandle, GraphicsError> {
        if let Some(missing) = set.buffers().find(|b| !self.buffers.contains_key(b)) {
            return Err(GraphicsError::InvalidParameter(format!(
                "set {:?} binds unknown buffer {missing:?}",
                set.label
            )));
        }

        let target = self
            .pools
            .get_mut(&pool)
            .ok_or_else(|| GraphicsError::InvalidParameter(format!("unknown pool {pool:?}")))?;
        let needed = DescriptorPoolSizes::required_for(std::slice::from_ref(set));
        let after = DescriptorPoolSizes {
            uniform_buffers: target.used.uniform_buffers + needed.uniform_buffers,
            storage_buffers: target.used.storage_buffers + needed.storage_buffers,
            sampled_textures: target.used.sampled_textures + needed.sampled_textures,
            max_sets: target.used.max_sets + needed.max_sets,
        };
        if !target.capacity.covers(&after) {
            return Err(GraphicsError::ResourcePoolExhausted(format!(
                "pool {pool:?} cannot fit set {:?} (capacity {:?}, used {:?})",
                set.label, target.capacity, target.used
            )));
        }
        target.used = after;

        let handle = DescriptorSetHandle(self.next_id);
        self.next_id += 1;
        if let Some(target) = self.pools.get_mut(&pool) {
            target.sets.push(handle);
        }
        self.sets.insert(handle, set.clone());
        log::trace!("DummyRenderer: allocated set {:?} ({handle:?})", set.label);
        Ok(handle)
    }

    fn destroy_descriptor_pool(&mut self, pool: DescriptorPoolHandle) {
        log::trace!("DummyRenderer: destroying descriptor pool {pool:?}");
        if let Some(removed) = self.pools.remove(&pool) {
            for set in removed.sets {
                self.sets.remove(&set);
            }
        }
    }

    fn submit(&mut self, frame: &FrameSubmission<'_>) -> Result<Fence, GraphicsError> {
        log::trace!(
            "DummyRenderer: submitting frame {} (slot {}) with {} draws",
            frame.frame,
            frame.slot,
            frame.draws.len()
        );

        let mut buffers = HashSet::new();
        for draw in frame.draws {
            buffers.insert(draw.vertex_buffer);
            buffers.insert(draw.index_buffer);
            for set in [draw.scene_set, draw.primitive_set] {
                let desc = self.sets.get(&set).ok_or_else(|| {
                    GraphicsError::InvalidParameter(format!("unknown descriptor set {set:?}"))
                })?;
                buffers.extend(desc.buffers());
            }
        }

        let fence = Fence::new_unsignaled();
        match self.fence_mode {
            FenceMode::Immediate => fence.signal(),
            FenceMode::Manual => self.in_flight.push_back(InFlight {
                frame: frame.frame,
                slot: frame.slot,
                fence: fence.clone(),
                buffers,
            }),
        }

        self.frames_submitted += 1;
        self.last_draws = frame.draws.to_vec();
        Ok(fence)
    }

    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }
}
