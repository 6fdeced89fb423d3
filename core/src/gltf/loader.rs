//! Internal avatar loading logic.
//!
//! The [`LoadContext`] borrows the parsed metadata document and the binary
//! payload and turns them into scene, mesh and material data.

use std::collections::BTreeMap;

use crate::material::{AlphaMode, Material, Texture};
use crate::math::{self, Mat4};
use crate::mesh::{AvatarPrimitive, AvatarVertex, MorphTarget};
use crate::scene::{NodeDesc, NodeTransform, Skin};

use super::accessor::{component, AccessorResolver, AccessorView};
use super::document::{DocNode, DocPrimitive, DocTextureRef, Document};
use super::error::GltfError;

/// Internal loading context that holds borrowed data during loading.
pub(crate) struct LoadContext<'a> {
    /// The parsed metadata document.
    document: &'a Document,
    /// Resolver over the binary payload.
    resolver: AccessorResolver<'a>,
}

impl<'a> LoadContext<'a> {
    pub fn new(document: &'a Document, binary: &'a [u8]) -> Self {
        Self {
            document,
            resolver: AccessorResolver::new(document, binary),
        }
    }

    /// Convert the flat node list, defaulting any missing transform field.
    pub fn load_nodes(&self) -> Result<Vec<NodeDesc>, GltfError> {
        let mesh_count = self.document.meshes.len();
        let skin_count = self.document.skins.len();

        self.document
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                if let Some(mesh) = node.mesh.filter(|&m| m >= mesh_count) {
                    return Err(GltfError::format(format!(
                        "node {index}: mesh index {mesh} out of range ({mesh_count} meshes)"
                    )));
                }
                if let Some(skin) = node.skin.filter(|&s| s >= skin_count) {
                    return Err(GltfError::format(format!(
                        "node {index}: skin index {skin} out of range ({skin_count} skins)"
                    )));
                }
                Ok(NodeDesc {
                    name: node.name.clone(),
                    local_transform: local_transform(node),
                    children: node.children.clone(),
                    mesh: node.mesh,
                    skin: node.skin,
                })
            })
            .collect()
    }

    /// Load all skins. Missing inverse bind matrices default to identity.
    pub fn load_skins(&self) -> Result<Vec<Skin>, GltfError> {
        let node_count = self.document.nodes.len();
        let mut result = Vec::with_capacity(self.document.skins.len());

        for (index, skin) in self.document.skins.iter().enumerate() {
            if let Some(&joint) = skin.joints.iter().find(|&&j| j >= node_count) {
                return Err(GltfError::format(format!(
                    "skin {index}: joint node {joint} out of range ({node_count} nodes)"
                )));
            }

            let inverse_bind_matrices = match skin.inverse_bind_matrices {
                Some(accessor) => {
                    let view = self.resolver.view::<[f32; 16]>(Some(accessor))?;
                    if view.len() != skin.joints.len() {
                        return Err(GltfError::format(format!(
                            "skin {index}: {} inverse bind matrices for {} joints",
                            view.len(),
                            skin.joints.len()
                        )));
                    }
                    view.iter().map(|m| math::mat4_from_cols_array(&m)).collect()
                }
                None => vec![Mat4::identity(); skin.joints.len()],
            };

            result.push(Skin {
                name: skin.name.clone(),
                joints: skin.joints.clone(),
                inverse_bind_matrices,
                skeleton: skin.skeleton,
            });
        }

        Ok(result)
    }

    /// Load embedded images referenced by textures. Images are not decoded.
    pub fn load_textures(&self) -> Result<Vec<Texture>, GltfError> {
        let mut result = Vec::with_capacity(self.document.textures.len());

        for (index, texture) in self.document.textures.iter().enumerate() {
            let Some(source) = texture.source else {
                log::warn!("Texture {index} has no source image");
                result.push(Texture::default());
                continue;
            };
            let image = self.document.images.get(source).ok_or_else(|| {
                GltfError::format(format!("texture {index}: image {source} out of range"))
            })?;
            let data = match image.buffer_view {
                Some(view) => self.resolver.buffer_view_bytes(view)?.to_vec(),
                None => {
                    log::warn!("Image {source} is not embedded in the binary chunk");
                    Vec::new()
                }
            };
            result.push(Texture {
                name: image.name.clone(),
                mime_type: image.mime_type.clone(),
                data,
            });
        }

        Ok(result)
    }

    /// Load all materials.
    pub fn load_materials(&self) -> Result<Vec<Material>, GltfError> {
        let texture_count = self.document.textures.len();
        let texture_index = |material: usize, slot: Option<DocTextureRef>| match slot {
            Some(t) if t.index >= texture_count => Err(GltfError::format(format!(
                "material {material}: texture {} out of range ({texture_count} textures)",
                t.index
            ))),
            Some(t) => Ok(Some(t.index)),
            None => Ok(None),
        };

        self.document
            .materials
            .iter()
            .enumerate()
            .map(|(index, m)| -> Result<Material, GltfError> {
                Ok(Material {
                    name: m.name.clone(),
                    alpha_mode: AlphaMode::from_document(&m.alpha_mode, m.alpha_cutoff),
                    double_sided: m.double_sided,
                    base_color_factor: m.pbr_metallic_roughness.base_color_factor,
                    base_color_texture: texture_index(
                        index,
                        m.pbr_metallic_roughness.base_color_texture,
                    )?,
                    normal_texture: texture_index(index, m.normal_texture)?,
                    emissive_texture: texture_index(index, m.emissive_texture)?,
                })
            })
            .collect()
    }

    /// Flatten every primitive of every mesh.
    pub fn load_primitives(&self) -> Result<Vec<AvatarPrimitive>, GltfError> {
        let mut result = Vec::new();

        for (mesh_index, mesh) in self.document.meshes.iter().enumerate() {
            for (primitive_index, primitive) in mesh.primitives.iter().enumerate() {
                let mut loaded = self.load_primitive(mesh_index, primitive_index, primitive)?;
                loaded.default_weights = (0..loaded.morph_targets.len())
                    .map(|t| mesh.weights.get(t).copied().unwrap_or(0.0))
                    .collect();
                result.push(loaded);
            }
        }

        Ok(result)
    }

    fn load_primitive(
        &self,
        mesh: usize,
        primitive: usize,
        doc: &DocPrimitive,
    ) -> Result<AvatarPrimitive, GltfError> {
        let attrs = &doc.attributes;
        let positions = self.resolver.attribute::<[f32; 3]>(attrs, "POSITION")?;
        if positions.is_empty() {
            return Err(GltfError::MissingPositions { mesh, primitive });
        }
        let normals = self.resolver.attribute::<[f32; 3]>(attrs, "NORMAL")?;
        let uvs = if self.is_float_attribute(attrs, "TEXCOORD_0")? {
            self.resolver.attribute::<[f32; 2]>(attrs, "TEXCOORD_0")?
        } else {
            log::warn!("Mesh {mesh} primitive {primitive}: non-float TEXCOORD_0 ignored");
            AccessorView::empty()
        };
        let joints = self.resolver.joints(attrs, "JOINTS_0")?;
        let weights = self.resolver.weights(attrs, "WEIGHTS_0")?;

        let vertices: Vec<AvatarVertex> = positions
            .iter()
            .enumerate()
            .map(|(i, position)| AvatarVertex {
                position,
                normal: normals.get_or(i, AvatarVertex::DEFAULT_NORMAL),
                uv: uvs.get_or(i, AvatarVertex::DEFAULT_UV),
                joints: joints.get(i).copied().unwrap_or(AvatarVertex::DEFAULT_JOINTS),
                weights: weights
                    .get(i)
                    .copied()
                    .unwrap_or(AvatarVertex::DEFAULT_WEIGHTS),
                index: i as u32,
            })
            .collect();

        let vertex_count = vertices.len();
        let indices = match self.resolver.indices(doc.indices)? {
            Some(indices) => {
                if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(GltfError::format(format!(
                        "mesh {mesh} primitive {primitive}: index {bad} out of range ({vertex_count} vertices)"
                    )));
                }
                indices
            }
            None => (0..vertex_count as u32).collect(),
        };

        if let Some(material) = doc.material.filter(|&m| m >= self.document.materials.len()) {
            return Err(GltfError::format(format!(
                "mesh {mesh} primitive {primitive}: material {material} out of range"
            )));
        }

        let morph_targets = doc
            .targets
            .iter()
            .map(|target| -> Result<MorphTarget, GltfError> {
                let deltas = self.resolver.view::<[f32; 3]>(target.get("POSITION").copied())?;
                Ok(MorphTarget {
                    position_deltas: (0..vertex_count)
                        .map(|i| {
                            let [x, y, z] = deltas.get_or(i, [0.0; 3]);
                            [x, y, z, 1.0]
                        })
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AvatarPrimitive {
            mesh_index: mesh,
            primitive_index: primitive,
            vertices,
            indices,
            material: doc.material,
            morph_targets,
            default_weights: Vec::new(),
        })
    }

    fn is_float_attribute(
        &self,
        attrs: &BTreeMap<String, usize>,
        name: &str,
    ) -> Result<bool, GltfError> {
        match attrs.get(name) {
            Some(&accessor) => Ok(self.resolver.component_type(accessor)? == component::FLOAT),
            None => Ok(true),
        }
    }
}

/// Compose a node's local transform.
///
/// TRS fields take precedence; an explicit matrix is used only when none of
/// them is present. Missing TRS fields take their identity defaults.
fn local_transform(node: &DocNode) -> Mat4 {
    let has_trs = node.translation.is_some() || node.rotation.is_some() || node.scale.is_some();
    if let (false, Some(matrix)) = (has_trs, node.matrix.as_ref()) {
        return math::mat4_from_cols_array(matrix);
    }

    let defaults = NodeTransform::IDENTITY;
    NodeTransform {
        translation: node.translation.unwrap_or(defaults.translation),
        rotation: node.rotation.unwrap_or(defaults.rotation),
        scale: node.scale.unwrap_or(defaults.scale),
    }
    .to_matrix()
}
