//! Classification Benchmarks
//!
//! Performance benchmarks for the grouping engine over synthetic scenes

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use hangar_repair::{classify, resolve_key, ClassifyOptions, RepairSession, Vehicle};
use hangar_scene::{Material, MemoryScene, MeshObject, ObjectKind};

const TEXTURES: &[&str] = &[
    "body_main.dds",
    "body_add_01.dds",
    "turret_01.dds",
    "turret_02.dds",
    "gun_barrel.dds",
    "glass_cockpit.dds",
    "misc_fittings.dds",
];

fn synthetic_scene(object_count: usize) -> MemoryScene {
    let mut scene = MemoryScene::new();
    scene.add_collection("Ground_Work", None);
    for (i, texture) in TEXTURES.iter().enumerate() {
        scene.add_material(Material::with_base_color(format!("Import_{i}"), *texture));
    }
    for i in 0..object_count {
        let mut obj = MeshObject::new(format!("Part_{i:04}"), ObjectKind::Mesh);
        obj.material_slots
            .push(format!("Import_{}", i % TEXTURES.len()));
        scene.add_object(obj, Some("Ground_Work"));
    }
    scene
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_ground");

    for count in [100, 1000, 5000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || synthetic_scene(count),
                |mut scene| {
                    let mut session = RepairSession::new(Vehicle::Ground);
                    classify(&mut scene, &mut session, ClassifyOptions::default()).unwrap();
                    (scene, session)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_resolve_key(c: &mut Criterion) {
    let scene = synthetic_scene(1000);

    c.bench_function("resolve_key", |b| {
        b.iter(|| {
            for i in 0..1000 {
                black_box(resolve_key(&scene, &format!("Part_{i:04}")));
            }
        });
    });
}

criterion_group!(benches, bench_classify, bench_resolve_key);
criterion_main!(benches);
