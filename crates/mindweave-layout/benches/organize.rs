use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use mindweave_core::geom::LogicalBox;
use mindweave_core::{NodeRecord, NodeTree, Positions, logical_point};
use mindweave_layout::{ForceLayout, LayoutSettings, XorShift64Star, place_unpositioned};
use std::hint::black_box;
use std::time::Duration;

/// A balanced tree with `fanout` children per node, `depth` levels below the root.
fn balanced_tree(fanout: usize, depth: usize) -> NodeTree {
    let mut nodes = Vec::new();
    let mut frontier = vec!["root".to_string()];
    let mut next_id = 0usize;
    let mut records = vec![NodeRecord::new("root", "root")];

    for _ in 0..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            let kids: Vec<String> = (0..fanout)
                .map(|_| {
                    next_id += 1;
                    format!("n{next_id}")
                })
                .collect();
            if let Some(rec) = records.iter_mut().find(|r| &r.id == parent) {
                rec.children = kids.clone();
            }
            for k in &kids {
                nodes.push(NodeRecord::new(k.clone(), k.clone()));
            }
            next.extend(kids);
        }
        records.append(&mut nodes);
        frontier = next;
    }

    NodeTree::from_nodes(records).unwrap_or_default()
}

fn organize(c: &mut Criterion) {
    let mut group = c.benchmark_group("organize");
    group.measurement_time(Duration::from_secs(5));
    let area = LogicalBox::new(logical_point(0.0, 0.0), logical_point(1280.0, 800.0));

    for (fanout, depth) in [(3usize, 2usize), (4, 3), (6, 3)] {
        let tree = balanced_tree(fanout, depth);
        group.bench_with_input(
            BenchmarkId::new("run_to_end", tree.len()),
            &tree,
            |b, tree| {
                b.iter_batched(
                    || {
                        let engine = ForceLayout::new(LayoutSettings::default())
                            .with_random_source(XorShift64Star::new(1));
                        (engine, Positions::new())
                    },
                    |(mut engine, mut positions)| {
                        engine.start(tree, &mut positions, area);
                        black_box(engine.run_to_end(&mut positions));
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

fn tidy(c: &mut Criterion) {
    let tree = balanced_tree(5, 4);
    c.bench_function("place_unpositioned", |b| {
        b.iter(|| {
            let mut positions = Positions::new();
            black_box(place_unpositioned(&tree, &mut positions, 144.0));
        });
    });
}

criterion_group!(benches, organize, tidy);
criterion_main!(benches);
