//! GPU block layouts.
//!
//! Every block is `#[repr(C)]` and [`Pod`] so it can be written to mapped
//! memory with [`bytemuck::bytes_of`]. Sizes are multiples of 16 bytes.

use avatar_core::material::Material;
use avatar_core::math::{self, Mat4};
use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;

/// Per-primitive uniform block: transforms and time.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Seconds since the renderer started.
    pub time: f32,
    pub _pad: [f32; 3],
}

impl ObjectUniforms {
    pub fn new(model: &Mat4, view: &Mat4, proj: &Mat4, time: f32) -> Self {
        Self {
            model: to_cols(model),
            view: to_cols(view),
            proj: to_cols(proj),
            time,
            _pad: [0.0; 3],
        }
    }
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        let identity = Mat4::identity();
        Self::new(&identity, &identity, &identity, 0.0)
    }
}

fn to_cols(m: &Mat4) -> [[f32; 4]; 4] {
    bytemuck::cast(math::mat4_to_cols_array(m))
}

/// Texture slot value meaning "no texture".
pub const NO_TEXTURE: i32 = -1;

/// Per-primitive material block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialBlock {
    pub base_color_factor: [f32; 4],
    /// 0 = mask, 1 = opaque or blend.
    pub alpha_mode: i32,
    pub alpha_cutoff: f32,
    pub double_sided: u32,
    pub base_color_texture: i32,
    pub normal_texture: i32,
    pub emissive_texture: i32,
    pub _pad: [u32; 2],
}

impl From<&Material> for MaterialBlock {
    fn from(material: &Material) -> Self {
        let slot = |t: Option<usize>| t.map_or(NO_TEXTURE, |i| i as i32);
        Self {
            base_color_factor: material.base_color_factor,
            alpha_mode: material.alpha_mode.shader_code(),
            alpha_cutoff: material.alpha_mode.cutoff(),
            double_sided: material.double_sided as u32,
            base_color_texture: slot(material.base_color_texture),
            normal_texture: slot(material.normal_texture),
            emissive_texture: slot(material.emissive_texture),
            _pad: [0; 2],
        }
    }
}

/// Header of a morph block.
///
/// The block is laid out as header, then `target_count` weights padded to 16
/// bytes, then `target_count * vertex_count` deltas of `[f32; 4]`, target
/// major.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct MorphHeader {
    pub target_count: u32,
    pub vertex_count: u32,
    pub _pad: [u32; 2],
}

impl MorphHeader {
    pub fn new(target_count: usize, vertex_count: usize) -> Self {
        Self {
            target_count: target_count as u32,
            vertex_count: vertex_count as u32,
            _pad: [0; 2],
        }
    }

    /// Byte offset of the weights array.
    pub fn weights_offset(&self) -> u64 {
        std::mem::size_of::<Self>() as u64
    }

    /// Byte offset of the first delta.
    pub fn deltas_offset(&self) -> u64 {
        let weights = self.target_count as u64 * 4;
        self.weights_offset() + weights.next_multiple_of(16)
    }

    /// Total size of the block in bytes.
    pub fn block_size(&self) -> u64 {
        let deltas = self.target_count as u64 * self.vertex_count as u64 * 16;
        self.deltas_offset() + deltas
    }
}

/// Push constants for one draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawPushConstants {
    pub material_index: i32,
    /// 1 when the morph binding holds real targets.
    pub morph_enabled: u32,
    pub vertex_count: u32,
    /// Offset of the primitive's skin in the joint palette, -1 if unskinned.
    pub joint_offset: i32,
}

const_assert_eq!(std::mem::size_of::<ObjectUniforms>(), 208);
const_assert_eq!(std::mem::size_of::<MaterialBlock>(), 48);
const_assert_eq!(std::mem::size_of::<MorphHeader>(), 16);
const_assert_eq!(std::mem::size_of::<DrawPushConstants>(), 16);

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_core::material::AlphaMode;
    use avatar_core::math::{Vec3, mat4_from_translation};

    #[test]
    fn model_is_column_major() {
        let model = mat4_from_translation(Vec3::new(1.0, 2.0, 3.0));
        let identity = Mat4::identity();
        let block = ObjectUniforms::new(&model, &identity, &identity, 0.5);
        assert_eq!(block.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(block.time, 0.5);
    }

    #[test]
    fn material_block_from_material() {
        let material = Material::new()
            .with_alpha_mode(AlphaMode::Mask { cutoff: 0.3 })
            .with_double_sided(true)
            .with_base_color_texture(2);
        let block = MaterialBlock::from(&material);
        assert_eq!(block.alpha_mode, 0);
        assert_eq!(block.alpha_cutoff, 0.3);
        assert_eq!(block.double_sided, 1);
        assert_eq!(block.base_color_texture, 2);
        assert_eq!(block.normal_texture, NO_TEXTURE);
    }

    #[test]
    fn morph_layout() {
        let header = MorphHeader::new(3, 10);
        assert_eq!(header.weights_offset(), 16);
        assert_eq!(header.deltas_offset(), 32);
        assert_eq!(header.block_size(), 32 + 3 * 10 * 16);

        let empty = MorphHeader::new(0, 10);
        assert_eq!(empty.block_size(), 16);
    }
}
