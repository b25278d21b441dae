//! Benchmarks for chain recomputation and block edits.
//!
//! Run with: cargo bench -p domino-layout

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domino_core::{Axis, Direction, Point, Rgb};
use domino_layout::{Domino, LinearBlock, NodeArena, NodeId, TableSource};
use domino_typed::{Id, IdCategory, IdType, TypedGroupSet, TypedSet, TypedSetGroup};
use std::hint::black_box;

fn tag() -> IdType {
    IdType::new("sample", IdCategory::new("sample"))
}

/// `rows` ids starting at `offset`, split into four equal groups.
fn grouped(offset: Id, rows: Id) -> TypedGroupSet {
    let quarter = (rows / 4).max(1);
    let all = TypedSet::from_ids(offset..offset + rows, tag());
    let groups = (0..4)
        .map(|g| {
            let start = offset + g * quarter;
            let end = if g == 3 { offset + rows } else { start + quarter };
            TypedSetGroup::new(TypedSet::from_ids(start..end, tag()), format!("g{g}"), Rgb::RED)
        })
        .collect();
    TypedGroupSet::new(all, groups)
}

fn build_chain(arena: &mut NodeArena, nodes: usize, rows: Id) -> (LinearBlock, Vec<NodeId>) {
    let ids: Vec<NodeId> = (0..nodes)
        .map(|i| arena.insert(TableSource::new(format!("n{i}")).with_rows(grouped(i as Id * 7, rows))))
        .collect();
    let mut chain = LinearBlock::new(Axis::Horizontal, ids[0], arena, true);
    for pair in ids.windows(2) {
        chain.add(arena, pair[0], Direction::East, pair[1]);
    }
    (chain, ids)
}

fn bench_chain_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain/refresh");
    for &(nodes, rows) in &[(2usize, 256u32), (5, 256), (5, 4096)] {
        let mut arena = NodeArena::new();
        let (mut chain, ids) = build_chain(&mut arena, nodes, rows);
        let _ = chain.limit_data_to(&mut arena, ids[0]);
        group.bench_with_input(
            BenchmarkId::new("union", format!("{nodes}x{rows}")),
            &(),
            |b, _| {
                b.iter(|| {
                    chain.refresh(&mut arena);
                    black_box(chain.data().len())
                })
            },
        );
    }
    group.finish();
}

fn bench_block_edit(c: &mut Criterion) {
    c.bench_function("block/insert_remove", |b| {
        let mut domino = Domino::new();
        let ids: Vec<NodeId> = (0..4)
            .map(|i| domino.create_node(TableSource::new(format!("n{i}")).with_rows(grouped(i * 3, 512))))
            .collect();
        let block = domino.add_block(ids[0], Point::ZERO).expect("fresh node");
        for pair in ids.windows(2) {
            domino
                .add_node(block, pair[0], Direction::East, pair[1])
                .expect("chain end is free");
        }
        let extra = domino.create_node(TableSource::new("extra").with_rows(grouped(100, 512)));
        b.iter(|| {
            domino
                .add_node(block, ids[1], Direction::East, extra)
                .expect("splice");
            black_box(domino.remove_node(extra).expect("placed"))
        })
    });
}

criterion_group!(benches, bench_chain_refresh, bench_block_edit);
criterion_main!(benches);
