//! Per-frame GPU resources for one avatar.
//!
//! [`FrameResources`] owns N copies of everything the CPU rewrites per frame
//! plus the static vertex and index buffers:
//!
//! ```text
//!                    ┌──────────── slot 0 ────────────┐ ┌──── slot 1 ────┐
//! static             per primitive        shared
//! vertex, index  →   uniforms             joint palette      (same layout)
//!                    material block       scene set
//!                    morph block
//!                    primitive set
//! ```
//!
//! Writes are only possible through a [`FrameWriter`], which exists only
//! while its slot is [`SlotState::Writing`]. Getting one waits on the
//! slot's previous fence, so mapped memory the GPU may still read is never
//! written.

use std::time::Duration;

use avatar_core::gltf::AvatarAsset;
use avatar_core::material::AlphaMode;
use avatar_core::math::Mat4;
use avatar_core::scene::{ScenePose, SkinPose};

use crate::descriptors::{DescriptorPoolSizes, ResourceCounts};
use crate::error::GraphicsError;
use crate::pipeline::{FramePipeline, SlotState};
use crate::renderer::{DrawCommand, FrameSubmission, Renderer};
use crate::sync::Fence;
use crate::types::{
    BindingResource, BufferDescriptor, BufferHandle, BufferUsage, DescriptorPoolHandle,
    DescriptorSetDesc, DescriptorSetHandle,
};
use crate::uniforms::{DrawPushConstants, MaterialBlock, MorphHeader, ObjectUniforms};

const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// How a primitive is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInfo {
    /// The morph binding holds real targets (not the material placeholder).
    pub has_morph: bool,
    /// Node holding the primitive's mesh; its global transform positions the draw.
    pub node: Option<usize>,
    /// Skin bound to the primitive through its mesh node.
    pub skin: Option<usize>,
    /// Offset of that skin in the joint palette.
    pub joint_offset: Option<usize>,
    pub push_constants: DrawPushConstants,
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
}

#[derive(Debug)]
struct PrimitiveResources {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    index_count: u32,
    morph: Option<MorphHeader>,
    info: DrawInfo,
}

#[derive(Debug)]
struct SlotResources {
    joint_palette: BufferHandle,
    scene_set: DescriptorSetHandle,
    uniforms: Vec<BufferHandle>,
    materials: Vec<BufferHandle>,
    morphs: Vec<Option<BufferHandle>>,
    primitive_sets: Vec<DescriptorSetHandle>,
}

/// GPU resources for N frames in flight.
#[derive(Debug)]
pub struct FrameResources {
    pipeline: FramePipeline,
    primitives: Vec<PrimitiveResources>,
    slots: Vec<SlotResources>,
    pool: Option<DescriptorPoolHandle>,
    /// Every buffer created, in creation order.
    buffers: Vec<BufferHandle>,
    counts: ResourceCounts,
    palette_capacity: usize,
    shut_down: bool,
}

impl FrameResources {
    /// Create every buffer and descriptor set for `asset`.
    ///
    /// Fails with [`GraphicsError::ResourcePoolExhausted`] if the renderer
    /// cannot provide the descriptor pool, a set, or a buffer. Anything
    /// created before the failure is released again.
    ///
    /// # Panics
    ///
    /// Panics if `frames_in_flight` is 0.
    pub fn new<R: Renderer + ?Sized>(
        renderer: &mut R,
        asset: &AvatarAsset,
        frames_in_flight: usize,
    ) -> Result<Self, GraphicsError> {
        let counts = ResourceCounts {
            frames_in_flight,
            textures: asset.texture_count(),
            primitives: asset.primitives.len(),
        };
        let mut resources = Self {
            pipeline: FramePipeline::new(frames_in_flight),
            primitives: Vec::with_capacity(counts.primitives),
            slots: Vec::with_capacity(frames_in_flight),
            pool: None,
            buffers: Vec::new(),
            counts,
            palette_capacity: asset.total_joint_count().max(1),
            shut_down: false,
        };

        match resources.setup(renderer, asset) {
            Ok(()) => {
                log::info!(
                    "Frame resources ready: {} slots, {} primitives, {} textures, {} buffers",
                    counts.frames_in_flight,
                    counts.primitives,
                    counts.textures,
                    resources.buffers.len()
                );
                Ok(resources)
            }
            Err(err) => {
                log::error!("Frame resource setup failed: {err}");
                resources.release(renderer);
                Err(err)
            }
        }
    }

    fn setup<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        asset: &AvatarAsset,
    ) -> Result<(), GraphicsError> {
        let sizes = DescriptorPoolSizes::for_counts(self.counts);
        log::debug!(
            "Descriptor pool for {:?}: {} uniform, {} storage, {} textures, {} sets",
            self.counts,
            sizes.uniform_buffers,
            sizes.storage_buffers,
            sizes.sampled_textures,
            sizes.max_sets
        );
        let pool = renderer.create_descriptor_pool(&sizes)?;
        self.pool = Some(pool);

        let mut skin_offsets = Vec::with_capacity(asset.skins.len());
        let mut total = 0;
        for skin in &asset.skins {
            skin_offsets.push(total);
            total += skin.joint_count();
        }

        for (index, primitive) in asset.primitives.iter().enumerate() {
            let vertex_buffer = self.create_buffer(
                renderer,
                BufferDescriptor::new(primitive.vertex_bytes().len() as u64, BufferUsage::VERTEX)
                    .with_label(format!("primitive {index} vertices")),
                Some(primitive.vertex_bytes()),
            )?;
            let index_buffer = self.create_buffer(
                renderer,
                BufferDescriptor::new(primitive.index_bytes().len() as u64, BufferUsage::INDEX)
                    .with_label(format!("primitive {index} indices")),
                Some(primitive.index_bytes()),
            )?;

            let material = asset.primitive_material(index);
            let skin = asset.primitive_skin(index);
            let joint_offset = skin.and_then(|s| skin_offsets.get(s).copied());
            let morph = primitive
                .has_morph_targets()
                .then(|| MorphHeader::new(primitive.morph_targets.len(), primitive.vertex_count()));

            self.primitives.push(PrimitiveResources {
                vertex_buffer,
                index_buffer,
                index_count: primitive.index_count() as u32,
                morph,
                info: DrawInfo {
                    has_morph: morph.is_some(),
                    node: asset.pose.node_for_mesh(primitive.mesh_index),
                    skin,
                    joint_offset,
                    push_constants: DrawPushConstants {
                        material_index: primitive.material.map_or(-1, |m| m as i32),
                        morph_enabled: morph.is_some() as u32,
                        vertex_count: primitive.vertex_count() as u32,
                        joint_offset: joint_offset.map_or(-1, |o| o as i32),
                    },
                    alpha_mode: material.alpha_mode,
                    double_sided: material.double_sided,
                },
            });
        }

        for slot in 0..self.counts.frames_in_flight {
            let resources = self.setup_slot(renderer, asset, pool, slot)?;
            self.slots.push(resources);
        }

        Ok(())
    }

    fn setup_slot<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        asset: &AvatarAsset,
        pool: DescriptorPoolHandle,
        slot: usize,
    ) -> Result<SlotResources, GraphicsError> {
        let mapped = |usage: BufferUsage| usage | BufferUsage::MAP_WRITE;

        let joint_palette = self.create_buffer(
            renderer,
            BufferDescriptor::new(
                self.palette_capacity as u64 * MAT4_SIZE,
                mapped(BufferUsage::STORAGE),
            )
            .with_label(format!("slot {slot} joint palette")),
            Some(bytemuck::cast_slice(&identity_palette(self.palette_capacity))),
        )?;
        let scene_set = renderer.allocate_descriptor_set(
            pool,
            &DescriptorSetDesc::new()
                .with_label(format!("slot {slot} scene"))
                .with_binding(0, BindingResource::StorageBuffer(joint_palette))
                .with_binding(
                    1,
                    BindingResource::Textures {
                        count: self.counts.textures as u32,
                    },
                ),
        )?;

        let mut resources = SlotResources {
            joint_palette,
            scene_set,
            uniforms: Vec::with_capacity(self.counts.primitives),
            materials: Vec::with_capacity(self.counts.primitives),
            morphs: Vec::with_capacity(self.counts.primitives),
            primitive_sets: Vec::with_capacity(self.counts.primitives),
        };

        for index in 0..self.primitives.len() {
            let uniforms = self.create_buffer(
                renderer,
                BufferDescriptor::new(
                    std::mem::size_of::<ObjectUniforms>() as u64,
                    mapped(BufferUsage::UNIFORM),
                )
                .with_label(format!("slot {slot} primitive {index} uniforms")),
                Some(bytemuck::bytes_of(&ObjectUniforms::default())),
            )?;

            let block = MaterialBlock::from(&asset.primitive_material(index));
            let material = self.create_buffer(
                renderer,
                BufferDescriptor::new(
                    std::mem::size_of::<MaterialBlock>() as u64,
                    mapped(BufferUsage::STORAGE),
                )
                .with_label(format!("slot {slot} primitive {index} material")),
                Some(bytemuck::bytes_of(&block)),
            )?;

            let morph = match self.primitives[index].morph {
                Some(header) => {
                    let contents = morph_block(&header, &asset.primitives[index]);
                    Some(self.create_buffer(
                        renderer,
                        BufferDescriptor::new(header.block_size(), mapped(BufferUsage::STORAGE))
                            .with_label(format!("slot {slot} primitive {index} morph")),
                        Some(&contents),
                    )?)
                }
                None => None,
            };

            let set = renderer.allocate_descriptor_set(
                pool,
                &DescriptorSetDesc::new()
                    .with_label(format!("slot {slot} primitive {index}"))
                    .with_binding(0, BindingResource::UniformBuffer(uniforms))
                    .with_binding(1, BindingResource::StorageBuffer(material))
                    .with_binding(
                        2,
                        BindingResource::StorageBuffer(morph.unwrap_or(material)),
                    ),
            )?;

            resources.uniforms.push(uniforms);
            resources.materials.push(material);
            resources.morphs.push(morph);
            resources.primitive_sets.push(set);
        }

        Ok(resources)
    }

    fn create_buffer<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        descriptor: BufferDescriptor,
        contents: Option<&[u8]>,
    ) -> Result<BufferHandle, GraphicsError> {
        let handle = renderer.create_buffer(&descriptor, contents)?;
        self.buffers.push(handle);
        Ok(handle)
    }

    /// Destroy the pool and every buffer. Callers ensure nothing is in flight.
    fn release<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        if let Some(pool) = self.pool.take() {
            renderer.destroy_descriptor_pool(pool);
        }
        for buffer in self.buffers.drain(..) {
            renderer.destroy_buffer(buffer);
        }
        self.slots.clear();
        self.primitives.clear();
    }

    /// Start writing the next slot, blocking until the GPU is done with it.
    pub fn begin_frame<'a, R: Renderer + ?Sized>(
        &'a mut self,
        renderer: &'a mut R,
    ) -> FrameWriter<'a, R> {
        let slot = self.pipeline.begin_frame();
        FrameWriter::new(self, renderer, slot)
    }

    /// Start writing the next slot if the GPU is already done with it.
    pub fn try_begin_frame<'a, R: Renderer + ?Sized>(
        &'a mut self,
        renderer: &'a mut R,
    ) -> Option<FrameWriter<'a, R>> {
        let slot = self.pipeline.try_begin_frame()?;
        Some(FrameWriter::new(self, renderer, slot))
    }

    /// Start writing the next slot, waiting at most `timeout` for it.
    pub fn begin_frame_timeout<'a, R: Renderer + ?Sized>(
        &'a mut self,
        renderer: &'a mut R,
        timeout: Duration,
    ) -> Option<FrameWriter<'a, R>> {
        let slot = self.pipeline.begin_frame_timeout(timeout)?;
        Some(FrameWriter::new(self, renderer, slot))
    }

    /// Frame slots, textures and primitives the resources were sized for.
    pub fn resource_counts(&self) -> ResourceCounts {
        self.counts
    }

    /// Draw parameters of a primitive.
    pub fn draw_info(&self, primitive: usize) -> Option<&DrawInfo> {
        self.primitives.get(primitive).map(|p| &p.info)
    }

    pub fn frames_in_flight(&self) -> usize {
        self.pipeline.frames_in_flight()
    }

    /// Slot the next frame will write.
    pub fn current_slot(&self) -> usize {
        self.pipeline.current_slot()
    }

    pub fn frame_count(&self) -> u64 {
        self.pipeline.frame_count()
    }

    /// # Panics
    ///
    /// Panics if `slot` is out of range.
    pub fn slot_state(&self, slot: usize) -> SlotState {
        self.pipeline.slot_state(slot)
    }

    pub fn is_idle(&self) -> bool {
        self.pipeline.is_idle()
    }

    /// Block until every slot is `Idle`.
    pub fn wait_idle(&self) {
        self.pipeline.wait_idle();
    }

    /// Number of joints the shared palette buffer holds.
    pub fn palette_capacity(&self) -> usize {
        self.palette_capacity
    }

    pub fn joint_palette_buffer(&self, slot: usize) -> Option<BufferHandle> {
        self.slots.get(slot).map(|s| s.joint_palette)
    }

    pub fn object_uniform_buffer(&self, slot: usize, primitive: usize) -> Option<BufferHandle> {
        self.slots.get(slot)?.uniforms.get(primitive).copied()
    }

    pub fn material_buffer(&self, slot: usize, primitive: usize) -> Option<BufferHandle> {
        self.slots.get(slot)?.materials.get(primitive).copied()
    }

    /// Morph block of a primitive, `None` if it has no targets.
    pub fn morph_buffer(&self, slot: usize, primitive: usize) -> Option<BufferHandle> {
        self.slots.get(slot)?.morphs.get(primitive).copied().flatten()
    }

    /// Number of buffers owned.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Wait for every slot to drain, then destroy all buffers and descriptor sets.
    pub fn shutdown<R: Renderer + ?Sized>(mut self, renderer: &mut R) {
        log::debug!("Shutting down frame resources ({} slots)", self.slots.len());
        self.pipeline.wait_idle();
        self.release(renderer);
        self.shut_down = true;
    }
}

impl Drop for FrameResources {
    fn drop(&mut self) {
        if cfg!(debug_assertions) && !self.shut_down && !self.buffers.is_empty() {
            log::warn!(
                "FrameResources dropped without shutdown; {} buffers leaked",
                self.buffers.len()
            );
        }
    }
}

fn identity_palette(joints: usize) -> Vec<[f32; 16]> {
    vec![avatar_core::math::mat4_to_cols_array(&Mat4::identity()); joints]
}

/// Header, default weights and deltas of one primitive's morph block.
fn morph_block(header: &MorphHeader, primitive: &avatar_core::mesh::AvatarPrimitive) -> Vec<u8> {
    let mut data = vec![0u8; header.block_size() as usize];
    let header_bytes = bytemuck::bytes_of(header);
    data[..header_bytes.len()].copy_from_slice(header_bytes);

    let weights: &[u8] = bytemuck::cast_slice(&primitive.default_weights);
    let start = header.weights_offset() as usize;
    let count = weights.len().min(header.target_count as usize * 4);
    data[start..start + count].copy_from_slice(&weights[..count]);

    let mut offset = header.deltas_offset() as usize;
    for target in &primitive.morph_targets {
        let deltas: &[u8] = bytemuck::cast_slice(&target.position_deltas);
        data[offset..offset + deltas.len()].copy_from_slice(deltas);
        offset += header.vertex_count as usize * 16;
    }
    data
}

/// Write access to one frame slot.
///
/// Exists only while the slot is `Writing`. [`submit`](Self::submit) hands
/// the slot to the renderer; dropping the writer without submitting returns
/// the slot to `Idle`.
pub struct FrameWriter<'a, R: Renderer + ?Sized> {
    resources: &'a mut FrameResources,
    renderer: &'a mut R,
    slot: usize,
    submitted: bool,
}

impl<'a, R: Renderer + ?Sized> FrameWriter<'a, R> {
    fn new(resources: &'a mut FrameResources, renderer: &'a mut R, slot: usize) -> Self {
        Self {
            resources,
            renderer,
            slot,
            submitted: false,
        }
    }

    /// Slot being written.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Frame number, starting at 1.
    pub fn frame(&self) -> u64 {
        self.resources.pipeline.frame_count()
    }

    fn slot_resources(&self) -> &SlotResources {
        &self.resources.slots[self.slot]
    }

    fn check_primitive(&self, primitive: usize) -> Result<(), GraphicsError> {
        if primitive >= self.resources.primitives.len() {
            return Err(GraphicsError::InvalidParameter(format!(
                "primitive {primitive} out of range ({} primitives)",
                self.resources.primitives.len()
            )));
        }
        Ok(())
    }

    /// Write one primitive's uniform block.
    pub fn write_object_uniforms(
        &mut self,
        primitive: usize,
        uniforms: &ObjectUniforms,
    ) -> Result<(), GraphicsError> {
        self.check_primitive(primitive)?;
        let buffer = self.slot_resources().uniforms[primitive];
        self.renderer
            .write_buffer(buffer, 0, bytemuck::bytes_of(uniforms))
    }

    /// Write the same transforms and time into every primitive's uniform block.
    pub fn write_camera(
        &mut self,
        model: &Mat4,
        view: &Mat4,
        proj: &Mat4,
        time: f32,
    ) -> Result<(), GraphicsError> {
        let uniforms = ObjectUniforms::new(model, view, proj, time);
        for primitive in 0..self.resources.primitives.len() {
            self.write_object_uniforms(primitive, &uniforms)?;
        }
        Ok(())
    }

    /// Write camera and time for every primitive, placing each one at
    /// `model * global` of the node holding its mesh.
    ///
    /// Skinned primitives go through the same path: their joint matrices are
    /// relative to the owner node, whose global transform is applied here.
    /// Primitives whose mesh no node references get `model` alone.
    pub fn write_scene(
        &mut self,
        model: &Mat4,
        view: &Mat4,
        proj: &Mat4,
        time: f32,
        pose: &ScenePose,
    ) -> Result<(), GraphicsError> {
        for primitive in 0..self.resources.primitives.len() {
            let node = self.resources.primitives[primitive].info.node;
            let world = match node.and_then(|n| pose.global_transform(n)) {
                Some(global) => model * global,
                None => *model,
            };
            let uniforms = ObjectUniforms::new(&world, view, proj, time);
            self.write_object_uniforms(primitive, &uniforms)?;
        }
        Ok(())
    }

    /// Replace one primitive's material block.
    pub fn write_material(
        &mut self,
        primitive: usize,
        block: &MaterialBlock,
    ) -> Result<(), GraphicsError> {
        self.check_primitive(primitive)?;
        let buffer = self.slot_resources().materials[primitive];
        self.renderer.write_buffer(buffer, 0, bytemuck::bytes_of(block))
    }

    /// Write blend-shape weights, one per morph target.
    pub fn write_morph_weights(
        &mut self,
        primitive: usize,
        weights: &[f32],
    ) -> Result<(), GraphicsError> {
        self.check_primitive(primitive)?;
        let Some(header) = self.resources.primitives[primitive].morph else {
            if weights.is_empty() {
                return Ok(());
            }
            return Err(GraphicsError::InvalidParameter(format!(
                "primitive {primitive} has no morph targets"
            )));
        };
        if weights.len() != header.target_count as usize {
            return Err(GraphicsError::InvalidParameter(format!(
                "{} morph weights for {} targets on primitive {primitive}",
                weights.len(),
                header.target_count
            )));
        }

        let Some(buffer) = self.slot_resources().morphs[primitive] else {
            return Err(GraphicsError::Internal(format!(
                "primitive {primitive} has morph targets but no morph buffer"
            )));
        };
        self.renderer.write_buffer(
            buffer,
            header.weights_offset(),
            bytemuck::cast_slice(weights),
        )
    }

    /// Upload the joint matrices of every skin into the shared palette.
    pub fn write_joint_palette(&mut self, skins: &SkinPose) -> Result<(), GraphicsError> {
        let joints = skins.total_joint_count();
        if joints > self.resources.palette_capacity {
            return Err(GraphicsError::InvalidParameter(format!(
                "{joints} joints exceed palette capacity {}",
                self.resources.palette_capacity
            )));
        }
        if joints == 0 {
            return Ok(());
        }

        let columns: Vec<[f32; 16]> = skins.palette_columns().collect();
        let buffer = self.slot_resources().joint_palette;
        self.renderer
            .write_buffer(buffer, 0, bytemuck::cast_slice(&columns))
    }

    /// Draw list for this slot, one draw per primitive in asset order.
    pub fn draws(&self) -> Vec<DrawCommand> {
        let slot = self.slot_resources();
        self.resources
            .primitives
            .iter()
            .enumerate()
            .map(|(index, p)| DrawCommand {
                primitive: index,
                vertex_buffer: p.vertex_buffer,
                index_buffer: p.index_buffer,
                index_count: p.index_count,
                scene_set: slot.scene_set,
                primitive_set: slot.primitive_sets[index],
                push_constants: p.info.push_constants,
                alpha_mode: p.info.alpha_mode,
                double_sided: p.info.double_sided,
            })
            .collect()
    }

    /// Hand the slot to the renderer. The slot is `Submitted` until the
    /// returned fence is signaled.
    ///
    /// If the renderer rejects the submission the slot returns to `Idle`.
    pub fn submit(mut self) -> Result<Fence, GraphicsError> {
        let draws = self.draws();
        let submission = FrameSubmission {
            slot: self.slot,
            frame: self.frame(),
            draws: &draws,
        };
        let fence = self.renderer.submit(&submission)?;

        self.resources.pipeline.end_frame(fence.clone());
        self.submitted = true;
        Ok(fence)
    }
}

impl<R: Renderer + ?Sized> Drop for FrameWriter<'_, R> {
    fn drop(&mut self) {
        if !self.submitted {
            log::warn!("Frame {} dropped without submit (slot {})", self.frame(), self.slot);
            self.resources.pipeline.abandon_frame();
        }
    }
}

impl<R: Renderer + ?Sized> std::fmt::Debug for FrameWriter<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameWriter")
            .field("slot", &self.slot)
            .field("submitted", &self.submitted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{DummyRenderer, FenceMode};
    use avatar_core::mesh::{AvatarPrimitive, AvatarVertex, MorphTarget};
    use avatar_core::scene::{NodeDesc, ScenePose};

    fn morph_asset() -> AvatarAsset {
        let primitive = AvatarPrimitive {
            mesh_index: 0,
            primitive_index: 0,
            vertices: (0..3).map(|i| AvatarVertex::at([i as f32, 0.0, 0.0], i)).collect(),
            indices: vec![0, 1, 2],
            material: None,
            morph_targets: vec![
                MorphTarget {
                    position_deltas: vec![[0.0, 1.0, 0.0, 1.0]; 3],
                },
                MorphTarget {
                    position_deltas: vec![[0.0, 2.0, 0.0, 1.0]; 3],
                },
            ],
            default_weights: vec![0.5, 0.0],
        };
        let pose =
            ScenePose::build(vec![NodeDesc::new().with_mesh(0)]).expect("valid hierarchy");
        AvatarAsset {
            pose,
            skins: Vec::new(),
            primitives: vec![primitive],
            materials: Vec::new(),
            textures: Vec::new(),
            mesh_count: 1,
        }
    }

    #[test]
    fn morph_block_is_initialized() {
        let mut renderer = DummyRenderer::new();
        let resources = FrameResources::new(&mut renderer, &morph_asset(), 2).unwrap();

        let buffer = resources.morph_buffer(1, 0).unwrap();
        let data = renderer.buffer_contents(buffer).unwrap();
        let header: MorphHeader = bytemuck::pod_read_unaligned(&data[..16]);
        assert_eq!(header, MorphHeader::new(2, 3));
        let weights: [f32; 2] = bytemuck::pod_read_unaligned(&data[16..24]);
        assert_eq!(weights, [0.5, 0.0]);
        let second: [f32; 4] = bytemuck::pod_read_unaligned(&data[32 + 48..32 + 64]);
        assert_eq!(second, [0.0, 2.0, 0.0, 1.0]);

        resources.shutdown(&mut renderer);
    }

    #[test]
    fn morph_weight_count_is_checked() {
        let mut renderer = DummyRenderer::new();
        let mut resources = FrameResources::new(&mut renderer, &morph_asset(), 2).unwrap();

        let mut writer = resources.begin_frame(&mut renderer);
        assert!(writer.write_morph_weights(0, &[1.0]).is_err());
        writer.write_morph_weights(0, &[1.0, 0.25]).unwrap();
        writer.submit().unwrap();

        let buffer = resources.morph_buffer(0, 0).unwrap();
        let data = renderer.buffer_contents(buffer).unwrap();
        let weights: [f32; 2] = bytemuck::pod_read_unaligned(&data[16..24]);
        assert_eq!(weights, [1.0, 0.25]);

        resources.shutdown(&mut renderer);
    }

    #[test]
    fn unskinned_primitive_draw_info() {
        let mut renderer = DummyRenderer::new();
        let resources = FrameResources::new(&mut renderer, &morph_asset(), 2).unwrap();

        let info = resources.draw_info(0).unwrap();
        assert!(info.has_morph);
        assert_eq!(info.skin, None);
        assert_eq!(info.push_constants.joint_offset, -1);
        assert_eq!(info.push_constants.material_index, -1);
        assert_eq!(info.push_constants.morph_enabled, 1);
        assert_eq!(resources.palette_capacity(), 1);
        assert!(resources.draw_info(1).is_none());

        resources.shutdown(&mut renderer);
    }

    #[test]
    fn dropped_writer_returns_slot_to_idle() {
        let mut renderer = DummyRenderer::new().with_fence_mode(FenceMode::Manual);
        let mut resources = FrameResources::new(&mut renderer, &morph_asset(), 2).unwrap();

        {
            let writer = resources.begin_frame(&mut renderer);
            assert_eq!(writer.slot(), 0);
        }
        assert_eq!(resources.slot_state(0), SlotState::Idle);
        assert_eq!(resources.current_slot(), 0);
        assert_eq!(renderer.frames_submitted(), 0);

        resources.shutdown(&mut renderer);
    }

    #[test]
    fn try_begin_frame_refuses_pending_slot() {
        let mut renderer = DummyRenderer::new().with_fence_mode(FenceMode::Manual);
        let mut resources = FrameResources::new(&mut renderer, &morph_asset(), 1).unwrap();

        resources.begin_frame(&mut renderer).submit().unwrap();
        assert_eq!(resources.slot_state(0), SlotState::Submitted);
        assert!(resources.try_begin_frame(&mut renderer).is_none());
        assert!(resources
            .begin_frame_timeout(&mut renderer, Duration::from_millis(5))
            .is_none());

        renderer.complete_all();
        assert!(resources.try_begin_frame(&mut renderer).is_some());

        resources.shutdown(&mut renderer);
        assert_eq!(renderer.violations(), 0);
    }
}
