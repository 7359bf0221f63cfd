//! End-to-end pipelines and cross-stage laws.

mod common;

use std::cmp::Ordering;

use common::{assert_released, collect, opaque, pseudo_random};
use flatseq::{from_slice, Allocator, Sequence, SequenceExt};
use flatseq_operators::Natural;

#[test]
fn test_distinct_natural() {
    let alloc = Allocator::unbounded();
    assert_eq!(collect(&from_slice(&[3, 1, 2, 1]).distinct(&alloc)), vec![1, 2, 3]);
    assert_released(&alloc);
}

#[test]
fn test_skip_then_take() {
    assert_eq!(collect(&from_slice(&[1, 2, 3, 4, 5]).skip(2).take(2)), vec![3, 4]);
}

#[test]
fn test_take_last_preserves_order() {
    let alloc = Allocator::unbounded();
    let data = [1, 2, 3, 4, 5];
    assert_eq!(collect(&from_slice(&data).take_last(3, &alloc)), vec![3, 4, 5]);
    assert_eq!(collect(&opaque(&data).take_last(3, &alloc)), vec![3, 4, 5]);
    assert_released(&alloc);
}

#[test]
fn test_group_by_first_component() {
    let alloc = Allocator::unbounded();
    let rows = [("A", 1), ("B", 2), ("A", 3)];
    let groups: Vec<(&str, Vec<i32>)> = collect(&from_slice(&rows).group_by_with(
        |r| r.0,
        |r| r.1,
        flatseq_operators::DefaultEq,
        &alloc,
    ))
    .into_iter()
    .map(|g| (*g.key(), g.elements().to_vec()))
    .collect();
    assert_eq!(groups, vec![("A", vec![1, 3]), ("B", vec![2])]);
    assert_released(&alloc);
}

#[test]
fn test_join_on_equality() {
    let alloc = Allocator::unbounded();
    let outer = [1, 2];
    let inner = [(1, "a"), (1, "b"), (2, "c")];
    let seq = from_slice(&outer).join(from_slice(&inner), |o| *o, |i| i.0, |o, i| (o, i.1), &alloc);
    assert_eq!(collect(&seq), vec![(1, "a"), (1, "b"), (2, "c")]);
    assert_released(&alloc);
}

#[test]
fn test_filter_count_independent_of_windowing() {
    let alloc = Allocator::unbounded();
    let data = pseudo_random(77, 257, 100);
    let expected = data.iter().filter(|x| **x < 40).count();

    let direct = from_slice(&data).filter(|x| *x < 40).count().unwrap();
    let chunked: usize = collect(&from_slice(&data).buffer(16, &alloc))
        .iter()
        .map(|chunk| chunk.iter().filter(|x| **x < 40).count())
        .sum();
    let summed = from_slice(&data)
        .buffer(7, &alloc)
        .select(|chunk| chunk.iter().filter(|x| **x < 40).count())
        .aggregate(0, |acc, n| acc + n)
        .unwrap();

    assert_eq!(direct, expected);
    assert_eq!(chunked, expected);
    assert_eq!(summed, expected);
    assert_released(&alloc);
}

#[test]
fn test_copy_round_trip_matches_materialization() {
    let alloc = Allocator::unbounded();
    let data = pseudo_random(5, 40, 50);
    let pipeline = from_slice(&data)
        .distinct(&alloc)
        .reverse(&alloc)
        .skip(3)
        .append(999);

    let expected = collect(&pipeline);
    let mut dest = vec![0; expected.len()];
    let written = pipeline.copy_to(&mut dest).unwrap();
    assert_eq!(written, expected.len());
    assert_eq!(collect(&from_slice(&dest)), expected);
    assert_released(&alloc);
}

#[test]
fn test_order_then_by_law() {
    let alloc = Allocator::unbounded();
    let data: Vec<(u64, u64)> = pseudo_random(13, 300, 1 << 20)
        .into_iter()
        .map(|r| (r % 6, r >> 8))
        .collect();
    let sorted = collect(
        &from_slice(&data)
            .order_by(|p| p.0, Natural, &alloc)
            .then_by_descending(|p| p.1, Natural),
    );

    for w in sorted.windows(2) {
        match w[0].0.cmp(&w[1].0) {
            Ordering::Less => {}
            Ordering::Equal => assert!(w[0].1 >= w[1].1),
            Ordering::Greater => panic!("primary key out of order: {w:?}"),
        }
    }
}

#[test]
fn test_long_pipeline_leaves_arena_empty() {
    let alloc = Allocator::with_capacities(1 << 16, Default::default());
    let data = pseudo_random(101, 500, 1000);

    let top_decades = from_slice(&data)
        .filter(|x| x % 2 == 0)
        .group_by(|x| x / 100, &alloc)
        .select(|g| (*g.key(), g.len()))
        .order_by_key_descending(|p| p.1, &alloc)
        .then_by_key(|p| p.0)
        .take(3)
        .to_vec()
        .unwrap();

    assert_eq!(top_decades.len(), 3);
    assert!(top_decades.windows(2).all(|w| w[0].1 >= w[1].1));
    assert_released(&alloc);
}
