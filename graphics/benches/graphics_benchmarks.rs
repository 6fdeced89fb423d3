use criterion::{Criterion, black_box, criterion_group, criterion_main};

use avatar_core::gltf::AvatarAsset;
use avatar_core::math::{Mat4, Vec3, mat4_from_translation};
use avatar_core::mesh::{AvatarPrimitive, AvatarVertex, MorphTarget};
use avatar_core::scene::{NodeDesc, ScenePose, Skin, SkinPose};
use avatar_graphics::{
    AvatarRenderer, DescriptorPoolSizes, DummyRenderer, FrameConfig, FrameInput, FrameResources,
    ResourceCounts,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A root holding `primitives` morphable meshes, skinned to a `joints`-long chain.
fn avatar(primitives: usize, joints: usize) -> AvatarAsset {
    let mut descs = vec![NodeDesc::new().with_children(vec![1]).with_skin(0)];
    for j in 0..joints {
        let mut desc =
            NodeDesc::new().with_matrix(mat4_from_translation(Vec3::new(0.0, 0.1, 0.0)));
        if j + 1 < joints {
            desc = desc.with_children(vec![j + 2]);
        }
        descs.push(desc);
    }
    for (i, desc) in descs.iter_mut().enumerate().skip(1).take(primitives) {
        *desc = desc.clone().with_mesh(i - 1);
    }
    let mut pose = ScenePose::build(descs).unwrap();
    pose.propagate();

    let vertex_count = 512;
    let primitive = |mesh_index| AvatarPrimitive {
        mesh_index,
        primitive_index: 0,
        vertices: (0..vertex_count)
            .map(|i| AvatarVertex::at([i as f32, 0.0, 0.0], i))
            .collect(),
        indices: (0..vertex_count).collect(),
        material: None,
        morph_targets: vec![
            MorphTarget {
                position_deltas: vec![[0.0, 0.01, 0.0, 1.0]; vertex_count as usize],
            };
            4
        ],
        default_weights: vec![0.0; 4],
    };

    AvatarAsset {
        pose,
        skins: vec![Skin {
            name: None,
            joints: (1..=joints).collect(),
            inverse_bind_matrices: vec![Mat4::identity(); joints],
            skeleton: None,
        }],
        primitives: (0..primitives).map(primitive).collect(),
        materials: Vec::new(),
        textures: Vec::new(),
        mesh_count: primitives,
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn bench_pool_sizing(c: &mut Criterion) {
    c.bench_function("descriptor_pool_sizes", |b| {
        b.iter(|| {
            DescriptorPoolSizes::for_counts(black_box(ResourceCounts {
                frames_in_flight: 2,
                textures: 32,
                primitives: 64,
            }))
        });
    });
}

fn bench_setup(c: &mut Criterion) {
    let asset = avatar(16, 64);
    c.bench_function("frame_resources_setup_16_primitives", |b| {
        b.iter(|| {
            let mut renderer = DummyRenderer::new();
            let resources = FrameResources::new(&mut renderer, black_box(&asset), 2).unwrap();
            resources.shutdown(&mut renderer);
        });
    });
}

// ---------------------------------------------------------------------------
// Per-frame work
// ---------------------------------------------------------------------------

fn bench_slot_writes(c: &mut Criterion) {
    let asset = avatar(16, 64);
    let mut renderer = DummyRenderer::new();
    let mut resources = FrameResources::new(&mut renderer, &asset, 2).unwrap();
    let mut skin_pose = SkinPose::new(&asset.pose, &asset.skins);
    skin_pose.update(&asset.pose, &asset.skins);
    let identity = Mat4::identity();

    c.bench_function("slot_writes_16_primitives_64_joints", |b| {
        b.iter(|| {
            let mut writer = resources.begin_frame(&mut renderer);
            writer
                .write_camera(&identity, &identity, &identity, 0.0)
                .unwrap();
            writer.write_joint_palette(black_box(&skin_pose)).unwrap();
            for primitive in 0..16 {
                writer
                    .write_morph_weights(primitive, &[0.25, 0.5, 0.0, 1.0])
                    .unwrap();
            }
            writer.submit().unwrap()
        });
    });

    resources.shutdown(&mut renderer);
}

fn bench_full_frame(c: &mut Criterion) {
    let mut renderer = DummyRenderer::new();
    let mut avatar_renderer =
        AvatarRenderer::new(&mut renderer, avatar(16, 64), FrameConfig::default()).unwrap();
    let input = FrameInput::idle(1.0 / 60.0);

    c.bench_function("avatar_frame_16_primitives_64_joints", |b| {
        b.iter(|| avatar_renderer.frame(&mut renderer, black_box(&input)).unwrap());
    });

    avatar_renderer.shutdown(&mut renderer);
}

criterion_group!(
    benches,
    bench_pool_sizing,
    bench_setup,
    bench_slot_writes,
    bench_full_frame
);
criterion_main!(benches);
