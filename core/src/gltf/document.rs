//! Typed model of the metadata chunk.
//!
//! Only the subset the loader consumes is modelled; unknown fields and
//! extensions (including the VRM extension blocks) are ignored by serde.
//! Every optional field carries the default the format documents.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Root of the metadata document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Document {
    pub nodes: Vec<DocNode>,
    pub meshes: Vec<DocMesh>,
    pub materials: Vec<DocMaterial>,
    pub skins: Vec<DocSkin>,
    pub accessors: Vec<DocAccessor>,
    #[serde(rename = "bufferViews")]
    pub buffer_views: Vec<DocBufferView>,
    pub images: Vec<DocImage>,
    pub textures: Vec<DocTexture>,
    pub scenes: Vec<DocScene>,
    pub scene: Option<usize>,
}

impl Document {
    /// Parse the metadata chunk.
    pub fn from_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }
}

/// One scene-graph entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocNode {
    pub name: Option<String>,
    pub children: Vec<usize>,
    pub translation: Option<[f32; 3]>,
    /// Quaternion `[x, y, z, w]`.
    pub rotation: Option<[f32; 4]>,
    pub scale: Option<[f32; 3]>,
    /// Column-major matrix; used only when no TRS field is present.
    pub matrix: Option<[f32; 16]>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocMesh {
    pub name: Option<String>,
    pub primitives: Vec<DocPrimitive>,
    /// Default blend-shape weights, one per morph target.
    pub weights: Vec<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocPrimitive {
    /// Attribute semantic (`POSITION`, `JOINTS_0`, ...) to accessor index.
    pub attributes: BTreeMap<String, usize>,
    pub indices: Option<usize>,
    pub material: Option<usize>,
    /// Morph targets, each mapping a semantic to an accessor.
    pub targets: Vec<BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocMaterial {
    pub name: Option<String>,
    pub pbr_metallic_roughness: DocPbr,
    pub normal_texture: Option<DocTextureRef>,
    pub emissive_texture: Option<DocTextureRef>,
    pub alpha_mode: String,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for DocMaterial {
    fn default() -> Self {
        Self {
            name: None,
            pbr_metallic_roughness: DocPbr::default(),
            normal_texture: None,
            emissive_texture: None,
            alpha_mode: "OPAQUE".to_string(),
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocPbr {
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<DocTextureRef>,
}

impl Default for DocPbr {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DocTextureRef {
    pub index: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocSkin {
    pub name: Option<String>,
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Option<usize>,
    pub skeleton: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocAccessor {
    pub buffer_view: Option<usize>,
    #[serde(default)]
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub normalized: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocBufferView {
    #[serde(default)]
    pub buffer: usize,
    #[serde(default)]
    pub byte_offset: usize,
    pub byte_length: usize,
    pub byte_stride: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocImage {
    pub name: Option<String>,
    pub buffer_view: Option<usize>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocTexture {
    pub source: Option<usize>,
    pub sampler: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocScene {
    pub name: Option<String>,
    pub nodes: Vec<usize>,
}
