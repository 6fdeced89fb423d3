use criterion::{Criterion, black_box, criterion_group, criterion_main};

use avatar_core::math::{Mat4, Vec3, mat4_from_translation};
use avatar_core::scene::{NodeDesc, ScenePose, Skin, SkinPose};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A humanoid-sized rig: a root with `chains` joint chains of `depth` joints.
fn rig(chains: usize, depth: usize) -> (Vec<NodeDesc>, Skin) {
    let mut descs = vec![NodeDesc::new().with_skin(0)];
    let mut joints = Vec::new();
    let mut root_children = Vec::new();

    for _ in 0..chains {
        let start = descs.len();
        root_children.push(start);
        for d in 0..depth {
            let index = start + d;
            let mut desc =
                NodeDesc::new().with_matrix(mat4_from_translation(Vec3::new(0.0, 0.1, 0.0)));
            if d + 1 < depth {
                desc = desc.with_children(vec![index + 1]);
            }
            descs.push(desc);
            joints.push(index);
        }
    }
    descs[0] = descs[0].clone().with_children(root_children);

    let skin = Skin {
        name: None,
        inverse_bind_matrices: vec![Mat4::identity(); joints.len()],
        joints,
        skeleton: None,
    };
    (descs, skin)
}

// ---------------------------------------------------------------------------
// Hierarchy construction
// ---------------------------------------------------------------------------

fn bench_build_hierarchy(c: &mut Criterion) {
    let (descs, _) = rig(16, 8);
    c.bench_function("build_hierarchy_129_nodes", |b| {
        b.iter(|| ScenePose::build(black_box(descs.clone())));
    });
}

// ---------------------------------------------------------------------------
// Per-frame work
// ---------------------------------------------------------------------------

fn bench_propagate(c: &mut Criterion) {
    let (descs, _) = rig(16, 8);
    let mut pose = ScenePose::build(descs).unwrap();
    c.bench_function("propagate_129_nodes", |b| {
        b.iter(|| {
            pose.propagate();
            black_box(pose.node(128).global_transform);
        });
    });
}

fn bench_propagate_and_skin(c: &mut Criterion) {
    let (descs, skin) = rig(32, 16);
    let mut pose = ScenePose::build(descs).unwrap();
    let skins = vec![skin];
    let mut skin_pose = SkinPose::new(&pose, &skins);
    c.bench_function("propagate_and_skin_512_joints", |b| {
        b.iter(|| {
            pose.propagate();
            skin_pose.update(&pose, &skins);
            black_box(skin_pose.palette().len());
        });
    });
}

criterion_group!(
    benches,
    bench_build_hierarchy,
    bench_propagate,
    bench_propagate_and_skin,
);
criterion_main!(benches);
