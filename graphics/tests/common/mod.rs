//! Shared fixtures for the frame loop integration tests.

#![allow(dead_code)]

use avatar_core::gltf::AvatarAsset;
use avatar_core::material::{AlphaMode, Material, Texture};
use avatar_core::math::{Mat4, Vec3, mat4_from_translation};
use avatar_core::mesh::{AvatarPrimitive, AvatarVertex, MorphTarget};
use avatar_core::scene::{NodeDesc, NodeTransform, ScenePose, Skin};
use avatar_graphics::{BufferHandle, DummyRenderer};

/// Node indices of [`rigged_avatar`].
pub const ARMATURE: usize = 0;
pub const BODY: usize = 1;
pub const HIPS: usize = 2;
pub const HEAD: usize = 3;

/// Number of primitives in [`rigged_avatar`].
pub const PRIMITIVES: usize = 3;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn triangle(mesh_index: usize, primitive_index: usize, material: Option<usize>) -> AvatarPrimitive {
    let mut vertices: Vec<AvatarVertex> = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        .into_iter()
        .enumerate()
        .map(|(i, p)| AvatarVertex::at(p, i as u32))
        .collect();
    vertices[1].joints = [1, 0, 0, 0];
    AvatarPrimitive {
        mesh_index,
        primitive_index,
        vertices,
        indices: vec![0, 1, 2],
        material,
        morph_targets: Vec::new(),
        default_weights: Vec::new(),
    }
}

/// Armature with a skinned, two-primitive body and an unskinned head mesh.
///
/// ```text
/// 0 Armature ─┬─ 1 Body (mesh 0, skin 0)
///             └─ 2 Hips (0, 1, 0) ── 3 Head (0, 0.5, 0) (mesh 1)
/// ```
///
/// Primitive 0 has two morph targets, primitive 1 none, primitive 2 belongs
/// to the head and has no material.
pub fn rigged_avatar() -> AvatarAsset {
    let descs = vec![
        NodeDesc::new().with_name("Armature").with_children(vec![BODY, HIPS]),
        NodeDesc::new().with_name("Body").with_mesh(0).with_skin(0),
        NodeDesc::new()
            .with_name("Hips")
            .with_transform(NodeTransform::IDENTITY.with_translation([0.0, 1.0, 0.0]))
            .with_children(vec![HEAD]),
        NodeDesc::new()
            .with_name("Head")
            .with_transform(NodeTransform::IDENTITY.with_translation([0.0, 0.5, 0.0]))
            .with_mesh(1),
    ];
    let mut pose = ScenePose::build(descs).expect("valid hierarchy");
    pose.propagate();

    let skin = Skin {
        name: Some("Body".into()),
        joints: vec![HIPS, HEAD],
        inverse_bind_matrices: vec![
            mat4_from_translation(Vec3::new(0.0, -1.0, 0.0)),
            mat4_from_translation(Vec3::new(0.0, -1.5, 0.0)),
        ],
        skeleton: Some(HIPS),
    };

    let mut face = triangle(0, 0, Some(0));
    face.morph_targets = vec![
        MorphTarget {
            position_deltas: vec![[0.0, 0.1, 0.0, 1.0]; 3],
        },
        MorphTarget {
            position_deltas: vec![[0.1, 0.0, 0.0, 1.0]; 3],
        },
    ];
    face.default_weights = vec![0.0, 0.0];

    AvatarAsset {
        pose,
        skins: vec![skin],
        primitives: vec![face, triangle(0, 1, Some(1)), triangle(1, 0, None)],
        materials: vec![
            Material::new()
                .with_name("Face")
                .with_base_color_texture(0),
            Material::new()
                .with_name("Hair")
                .with_alpha_mode(AlphaMode::Mask { cutoff: 0.5 })
                .with_double_sided(true)
                .with_base_color_texture(1),
        ],
        textures: vec![
            Texture {
                name: Some("face".into()),
                mime_type: Some("image/png".into()),
                data: vec![0x89, b'P', b'N', b'G'],
            },
            Texture {
                name: Some("hair".into()),
                mime_type: Some("image/png".into()),
                data: vec![0x89, b'P', b'N', b'G'],
            },
        ],
        mesh_count: 2,
    }
}

/// Read a column-major matrix out of a buffer.
pub fn read_mat4(renderer: &DummyRenderer, buffer: BufferHandle, index: usize) -> Mat4 {
    let data = renderer.buffer_contents(buffer).expect("live buffer");
    let start = index * 64;
    let cols: [f32; 16] = bytemuck::pod_read_unaligned(&data[start..start + 64]);
    avatar_core::math::mat4_from_cols_array(&cols)
}

/// Read `count` f32 values at `offset` bytes.
pub fn read_f32s(renderer: &DummyRenderer, buffer: BufferHandle, offset: usize, count: usize) -> Vec<f32> {
    let data = renderer.buffer_contents(buffer).expect("live buffer");
    data[offset..offset + count * 4]
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
