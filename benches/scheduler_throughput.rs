use criterion::{Criterion, criterion_group, criterion_main};
use loomgraph::graph::scheduler::schedule;
use loomgraph::graph::{Edge, Node};
use rustc_hash::FxHashMap;
use std::hint::black_box;

fn linear_chain(n: usize) -> (Vec<Node>, Vec<Edge>) {
    let nodes = (0..n)
        .map(|i| Node { id: i.to_string(), node_type: Some("textOutput".to_string()), data: FxHashMap::default() })
        .collect();
    let edges = (0..n.saturating_sub(1))
        .map(|i| Edge { source: i.to_string(), target: (i + 1).to_string(), target_handle: None })
        .collect();
    (nodes, edges)
}

fn wide_diamond(width: usize) -> (Vec<Node>, Vec<Edge>) {
    let mut nodes = vec![Node { id: "root".to_string(), node_type: Some("textOutput".to_string()), data: FxHashMap::default() }];
    let mut edges = Vec::new();
    for i in 0..width {
        let id = format!("mid-{i}");
        nodes.push(Node { id: id.clone(), node_type: Some("textOutput".to_string()), data: FxHashMap::default() });
        edges.push(Edge { source: "root".to_string(), target: id.clone(), target_handle: None });
        edges.push(Edge { source: id, target: "sink".to_string(), target_handle: None });
    }
    nodes.push(Node { id: "sink".to_string(), node_type: Some("textOutput".to_string()), data: FxHashMap::default() });
    (nodes, edges)
}

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler");

    for size in [10usize, 100, 1000] {
        let (nodes, edges) = linear_chain(size);
        group.bench_function(format!("linear_chain/{size}"), |b| {
            b.iter(|| black_box(schedule(black_box(&nodes), black_box(&edges)).unwrap()));
        });
    }

    for width in [10usize, 100, 1000] {
        let (nodes, edges) = wide_diamond(width);
        group.bench_function(format!("wide_diamond/{width}"), |b| {
            b.iter(|| black_box(schedule(black_box(&nodes), black_box(&edges)).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scheduler);
criterion_main!(benches);
