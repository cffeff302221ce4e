//! Benchmarks for pipeline export
//!
//! Run with: cargo bench

use cle_assistant::catalog::StaticCatalog;
use cle_assistant::config::GeneratorSettings;
use cle_assistant::pipeline::{GeneratorKind, GraphExtractor, NamingScheme, Pipeline, TopologicalOrderer};
use cle_assistant::scene::{OperationRecord, Scene, SceneNode};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// A source followed by `len` alternating blur / top-hat steps.
fn chain_scene(len: u32) -> Scene {
    let mut scene = Scene::new().with_node(
        SceneNode::new(0, "raw")
            .with_source("raw.tif")
            .with_display_range(0.0, 4095.0),
    );
    for id in 1..=len {
        let operation = if id % 2 == 0 {
            OperationRecord::new("top_hat_box").literal(10).literal(10).literal(0)
        } else {
            OperationRecord::new("gaussian_blur").literal(1.5).literal(1.5)
        };
        scene.push(
            SceneNode::new(id, format!("Result of step {}", id))
                .with_operation(operation.input((id - 1).into())),
        );
    }
    scene
}

/// Independent branches fanning out of one source.
fn fan_out_scene(width: u32) -> Scene {
    let mut scene = Scene::new().with_node(SceneNode::new(0, "raw").with_source("raw.tif"));
    for id in 1..=width {
        scene.push(
            SceneNode::new(id, format!("Result of branch {}", id))
                .with_operation(OperationRecord::new("mean_box").input(0.into())),
        );
    }
    scene
}

fn bench_extract_and_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_and_order");
    let catalog = StaticCatalog::builtin();

    for len in [10u32, 100, 1000] {
        let scene = chain_scene(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("chain", len), &scene, |b, scene| {
            b.iter(|| {
                let extraction = GraphExtractor::new(&catalog).extract(black_box(scene));
                TopologicalOrderer::order(&extraction.graph)
            })
        });
    }

    for width in [10u32, 100, 1000] {
        let scene = fan_out_scene(width);
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("fan_out", width), &scene, |b, scene| {
            b.iter(|| {
                let extraction = GraphExtractor::new(&catalog).extract(black_box(scene));
                TopologicalOrderer::order(&extraction.graph)
            })
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    let settings = GeneratorSettings::default();
    let scene = chain_scene(500);
    let pipeline =
        match Pipeline::from_scene_with(&scene, &StaticCatalog::builtin(), NamingScheme::DisplayName) {
            Ok(pipeline) => pipeline,
            Err(e) => panic!("benchmark scene should export: {e}"),
        };

    for &kind in GeneratorKind::all() {
        group.bench_with_input(BenchmarkId::new("chain_500", kind), &kind, |b, &kind| {
            b.iter(|| pipeline.generate(black_box(kind), &settings))
        });
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let scene = chain_scene(200);

    c.bench_function("scene_to_notebook_200", |b| {
        b.iter(|| {
            Pipeline::from_scene(black_box(&scene))
                .and_then(|p| p.render(GeneratorKind::Notebook, None))
        })
    });
}

criterion_group!(benches, bench_extract_and_order, bench_generate, bench_end_to_end);
criterion_main!(benches);
