use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use diagram_geometry_cache::cache::{CacheConfig, NodeGeometryCache, SnapshotPolicy};
use diagram_geometry_cache::{shared, Diagram, DiagramType, Node, NodeKind, Rectangle, Shared};

const KINDS: [NodeKind; 4] = [
    NodeKind::Package,
    NodeKind::Class,
    NodeKind::Note,
    NodeKind::Object,
];

/// Stand-in for text measurement: walks every character of the name.
fn measure(node: &Node) -> Rectangle {
    let width = node
        .name()
        .chars()
        .map(|c| if c.is_uppercase() { 9 } else { 7 })
        .sum::<i32>()
        .max(80);
    let position = node.position();
    Rectangle::new(position.x, position.y, width, 60)
}

fn build_nodes(count: usize, diagram: &Diagram) -> Vec<Shared<Node>> {
    (0..count)
        .map(|i| {
            let name = format!("{:?}Element{}WithAFairlyLongDisplayName", KINDS[i % 4], i);
            let node = shared(Node::named(KINDS[i % 4], name));
            node.borrow_mut().attach(diagram);
            node
        })
        .collect()
}

fn bench_translated_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_bounds_translated");
    let diagram = Diagram::new(DiagramType::Class);

    for &count in &[1usize, 3, 10] {
        let nodes = build_nodes(count, &diagram);

        group.bench_with_input(BenchmarkId::new("no_cache", count), &count, |b, _| {
            b.iter(|| {
                for node in &nodes {
                    node.borrow_mut().translate(1, 1);
                    black_box(measure(&node.borrow()));
                }
            });
        });

        for policy in [SnapshotPolicy::Position, SnapshotPolicy::Structural] {
            let id = format!("cached_{}", policy);
            group.bench_with_input(BenchmarkId::new(id, count), &count, |b, _| {
                let config = CacheConfig::builder().snapshot_policy(policy).build();
                let mut cache = NodeGeometryCache::new(config);
                b.iter(|| {
                    for node in &nodes {
                        node.borrow_mut().translate(1, 1);
                        black_box(cache.get_bounds(node, measure));
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_static_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("node_bounds_static");
    let diagram = Diagram::new(DiagramType::Class);

    for &count in &[1usize, 3, 10] {
        let nodes = build_nodes(count, &diagram);

        group.bench_with_input(BenchmarkId::new("no_cache", count), &count, |b, _| {
            b.iter(|| {
                for node in &nodes {
                    black_box(measure(&node.borrow()));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("cached", count), &count, |b, _| {
            let mut cache = NodeGeometryCache::default();
            b.iter(|| {
                for node in &nodes {
                    black_box(cache.get_bounds(node, measure));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_translated_nodes, bench_static_nodes);
criterion_main!(benches);
