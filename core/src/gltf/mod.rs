//! Binary avatar container (GLB / VRM) loader.
//!
//! Loading runs in a fixed sequence, and any failure aborts the whole load:
//!
//! 1. [`parse_container`] validates the preamble and chunk framing.
//! 2. The metadata chunk is parsed into a [`Document`].
//! 3. Textures, materials, primitives and skins are resolved through an
//!    [`AccessorResolver`] over the binary chunk.
//! 4. The flat node list becomes a [`ScenePose`](crate::scene::ScenePose),
//!    which is propagated once so the rest pose is ready to use.
//!
//! # Example
//!
//! ```ignore
//! use avatar_core::gltf::load_avatar;
//!
//! let data = std::fs::read("avatar.vrm").unwrap();
//! let asset = load_avatar(&data).unwrap();
//!
//! println!("Nodes: {}", asset.pose.len());
//! println!("Primitives: {}", asset.primitives.len());
//! println!("Joints: {}", asset.total_joint_count());
//! ```

mod accessor;
mod container;
mod document;
mod error;
mod loader;
#[cfg(test)]
mod tests;
pub mod types;

pub use accessor::{component, AccessorResolver, AccessorView};
pub use container::{
    parse_container, write_container, Container, CHUNK_TYPE_BIN, CHUNK_TYPE_JSON, GLB_MAGIC,
};
pub use document::Document;
pub use error::GltfError;
pub use types::*;

use crate::scene::ScenePose;

use loader::LoadContext;

/// Load an avatar from the bytes of a binary container.
pub fn load_avatar(data: &[u8]) -> Result<AvatarAsset, GltfError> {
    let container = parse_container(data)?;
    let document = Document::from_slice(container.json)?;
    load_document(&document, container.binary)
}

/// Load an avatar from an already-parsed document and its binary payload.
pub fn load_document(document: &Document, binary: &[u8]) -> Result<AvatarAsset, GltfError> {
    let ctx = LoadContext::new(document, binary);

    let textures = ctx.load_textures()?;
    let materials = ctx.load_materials()?;
    let primitives = ctx.load_primitives()?;
    let skins = ctx.load_skins()?;
    let mut pose = ScenePose::build(ctx.load_nodes()?)?;
    pose.propagate();

    let asset = AvatarAsset {
        pose,
        skins,
        primitives,
        materials,
        textures,
        mesh_count: document.meshes.len(),
    };

    log::info!(
        "Loaded avatar: {} nodes, {} primitives, {} skins ({} joints), {} materials, {} textures",
        asset.pose.len(),
        asset.primitives.len(),
        asset.skins.len(),
        asset.total_joint_count(),
        asset.materials.len(),
        asset.textures.len()
    );

    Ok(asset)
}
