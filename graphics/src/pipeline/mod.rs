//! Frame pipeline for managing multiple frames in flight.
//!
//! This module provides [`FramePipeline`], which coordinates CPU-GPU synchronization
//! across multiple frame slots, enabling frame overlap (the CPU prepares frame N+1
//! while the GPU renders frame N).
//!
//! # Slot States
//!
//! Every slot moves through three states:
//!
//! ```text
//!          begin_frame (waits on fence)          end_frame(fence)
//!   Idle ─────────────────────────────► Writing ─────────────────► Submitted
//!    ▲                                     │                           │
//!    │            abandon_frame            │                           │
//!    ├─────────────────────────────────────┘                           │
//!    │                   fence signaled by the renderer                │
//!    └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A slot only becomes `Writing` after its previous fence is signaled, so CPU
//! writes never touch memory the GPU may still read.
//!
//! # Frame Overlap (Pipelining)
//!
//! With 2 frames in flight, the CPU and GPU work in parallel:
//!
//! ```text
//! Frame 0: [CPU write] [submit] ─────────────────────────────────────────────►
//!                               [GPU execute frame 0] ───────────────────────►
//!
//! Frame 1:              [CPU write] [submit] ────────────────────────────────►
//!                                            [GPU execute frame 1] ──────────►
//!
//! Frame 2:                          [wait F0] [CPU write] [submit] ──────────►
//!                                                         [GPU execute F2] ──►
//!
//! Time ──────────────────────────────────────────────────────────────────────►
//! ```
//!
//! # Graceful Shutdown
//!
//! Call [`FramePipeline::wait_idle`] before destroying per-frame resources, so
//! every slot is `Idle` when its buffers and descriptor sets are released.
//!
//! # Example
//!
//! ```
//! use avatar_graphics::{Fence, FramePipeline, SlotState};
//!
//! let mut pipeline = FramePipeline::new(2);
//!
//! let slot = pipeline.begin_frame();
//! assert_eq!(pipeline.slot_state(slot), SlotState::Writing);
//!
//! // ... write this slot's buffers, submit ...
//! let fence = Fence::new_unsignaled();
//! pipeline.end_frame(fence.clone());
//! assert_eq!(pipeline.slot_state(slot), SlotState::Submitted);
//!
//! fence.signal();
//! assert_eq!(pipeline.slot_state(slot), SlotState::Idle);
//! pipeline.wait_idle();
//! ```

use crate::sync::Fence;
use std::time::Duration;

/// Lifecycle state of a frame slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// The GPU finished with the slot; it is safe to write.
    Idle,
    /// The CPU is writing the slot's resources.
    Writing,
    /// Handed to the renderer; the GPU may be reading it.
    Submitted,
}

/// Manages multiple frames in flight for CPU-GPU parallelism.
///
/// With N frames in flight there are N slots used round-robin:
///
/// ```text
/// frames_in_flight = 2
///
/// Slot 0: [Frame 1] ──► [Frame 3] ──► [Frame 5] ──►
/// Slot 1: [Frame 2] ──► [Frame 4] ──► [Frame 6] ──►
/// ```
///
/// # Thread Safety
///
/// `FramePipeline` is **not thread-safe**. It should be owned by a single
/// thread (typically the render thread). Only fences cross threads.
#[derive(Debug)]
pub struct FramePipeline {
    /// Fences for each frame slot. `None` if slot hasn't been submitted yet.
    frame_fences: Vec<Option<Fence>>,

    /// Whether the current slot is between begin and end.
    writing: bool,

    /// Current frame slot index (0 to frames_in_flight - 1).
    current_slot: usize,

    /// Total number of frames in flight.
    frames_in_flight: usize,

    /// Total frames started.
    frame_count: u64,
}

impl FramePipeline {
    /// Create a new frame pipeline.
    ///
    /// # Panics
    ///
    /// Panics if `frames_in_flight` is 0.
    pub fn new(frames_in_flight: usize) -> Self {
        assert!(frames_in_flight > 0, "frames_in_flight must be at least 1");

        Self {
            frame_fences: (0..frames_in_flight).map(|_| None).collect(),
            writing: false,
            current_slot: 0,
            frames_in_flight,
            frame_count: 0,
        }
    }

    /// Begin a new frame, returning the slot to write.
    ///
    /// Blocks until the GPU has finished the previous frame in this slot.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin_frame(&mut self) -> usize {
        assert!(!self.writing, "begin_frame called while a frame is in progress");

        if let Some(fence) = &self.frame_fences[self.current_slot] {
            fence.wait();
        }

        self.start_writing()
    }

    /// Begin a new frame only if the slot is available without waiting.
    pub fn try_begin_frame(&mut self) -> Option<usize> {
        assert!(!self.writing, "begin_frame called while a frame is in progress");

        if !self.is_slot_ready(self.current_slot) {
            return None;
        }

        Some(self.start_writing())
    }

    /// Begin a new frame, waiting at most `timeout` for the slot.
    ///
    /// Returns `None` if the timeout elapsed; the slot stays untouched.
    pub fn begin_frame_timeout(&mut self, timeout: Duration) -> Option<usize> {
        assert!(!self.writing, "begin_frame called while a frame is in progress");

        if let Some(fence) = &self.frame_fences[self.current_slot]
            && !fence.wait_timeout(timeout)
        {
            return None;
        }

        Some(self.start_writing())
    }

    fn start_writing(&mut self) -> usize {
        debug_assert_eq!(self.slot_state(self.current_slot), SlotState::Idle);

        self.writing = true;
        self.frame_count += 1;

        log::trace!(
            "Begin frame {} (slot {})",
            self.frame_count,
            self.current_slot
        );

        self.current_slot
    }

    /// End the current frame.
    ///
    /// Records the submission fence for this slot and advances to the next slot.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress.
    pub fn end_frame(&mut self, fence: Fence) {
        assert!(self.writing, "end_frame called without begin_frame");

        log::trace!(
            "End frame {} (slot {})",
            self.frame_count,
            self.current_slot
        );

        self.frame_fences[self.current_slot] = Some(fence);
        self.writing = false;
        self.current_slot = (self.current_slot + 1) % self.frames_in_flight;
    }

    /// Return the current slot to `Idle` without submitting.
    ///
    /// The next [`begin_frame`](Self::begin_frame) reuses the same slot.
    pub fn abandon_frame(&mut self) {
        if self.writing {
            log::trace!(
                "Abandon frame {} (slot {})",
                self.frame_count,
                self.current_slot
            );
            self.writing = false;
        }
    }

    /// Wait for all in-flight GPU work to complete.
    ///
    /// After this returns every slot is `Idle` (unless a frame is being written).
    pub fn wait_idle(&self) {
        log::trace!("Waiting for GPU idle ({} slots)", self.frames_in_flight);

        for (i, fence) in self.frame_fences.iter().enumerate() {
            if let Some(f) = fence {
                log::trace!("Waiting for slot {}...", i);
                f.wait();
            }
        }

        log::trace!("GPU idle");
    }

    /// Wait for all in-flight GPU work with a timeout.
    ///
    /// Returns `true` if the GPU is idle, `false` if the timeout elapsed.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();

        for fence in self.frame_fences.iter().flatten() {
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return self.is_idle();
            }

            if !fence.wait_timeout(timeout - elapsed) {
                return false;
            }
        }

        true
    }

    /// Get the number of frames in flight.
    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Get the current frame slot index.
    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    /// Get the total number of frames started.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Whether a frame is between begin and end.
    pub fn is_writing(&self) -> bool {
        self.writing
    }

    /// State of a slot.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn slot_state(&self, slot: usize) -> SlotState {
        assert!(slot < self.frames_in_flight, "Invalid slot index");

        if self.writing && slot == self.current_slot {
            SlotState::Writing
        } else if self.is_slot_ready(slot) {
            SlotState::Idle
        } else {
            SlotState::Submitted
        }
    }

    /// Check if a specific frame slot's GPU work is done (non-blocking).
    ///
    /// Returns `true` if the slot's fence is signaled or if the slot
    /// hasn't been submitted yet.
    pub fn is_slot_ready(&self, slot: usize) -> bool {
        assert!(slot < self.frames_in_flight, "Invalid slot index");

        match &self.frame_fences[slot] {
            Some(fence) => fence.is_signaled(),
            None => true,
        }
    }

    /// Check if all frame slots are ready (non-blocking).
    pub fn is_idle(&self) -> bool {
        self.frame_fences
            .iter()
            .all(|f| f.as_ref().is_none_or(|fence| fence.is_signaled()))
    }
}

impl Default for FramePipeline {
    /// Creates a pipeline with 2 frames in flight.
    fn default() -> Self {
        Self::new(2)
    }
}
