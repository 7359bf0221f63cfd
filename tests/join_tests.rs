//! Join engine: Join (nested loop) and GroupJoin (key table + index views).

mod common;

use common::{assert_released, collect, opaque, opaque_probe, probe};
use flatseq_operators::{empty, from_slice, Allocator, Cursor, Sequence, SequenceExt};

#[test]
fn test_join_pairs_in_outer_then_inner_order() {
    let alloc = Allocator::unbounded();
    let outer = [1, 2];
    let inner = [(1, "a"), (1, "b"), (2, "c")];
    let seq = from_slice(&outer).join(
        from_slice(&inner),
        |o| *o,
        |i| i.0,
        |o, i| (o, i.1),
        &alloc,
    );
    assert_eq!(collect(&seq), vec![(1, "a"), (1, "b"), (2, "c")]);
    assert_released(&alloc);
}

#[test]
fn test_join_without_matches() {
    let alloc = Allocator::unbounded();
    let outer = [7, 8];
    let inner = [1, 2, 3];
    let seq = from_slice(&outer).join(from_slice(&inner), |o| *o, |i| *i, |o, i| o + i, &alloc);
    assert!(collect(&seq).is_empty());
    assert_released(&alloc);
}

#[test]
fn test_join_with_unknown_inner_count() {
    let caps = flatseq_core::config::Capacities {
        join_initial: 2,
        ..Default::default()
    };
    let alloc = Allocator::with_capacities(usize::MAX, caps);
    let outer = [3u32, 1];
    let inner: Vec<u32> = (0..10).map(|i| i % 4).collect();
    let seq = opaque(&outer).join(opaque(&inner), |o| *o, |i| *i, |o, _| o * 10, &alloc);
    assert_eq!(collect(&seq), vec![30, 30, 10, 10, 10]);
    assert_released(&alloc);
}

#[test]
fn test_join_by_custom_equality() {
    let alloc = Allocator::unbounded();
    let outer = ["Ada", "bob"];
    let inner = [("ADA", 1), ("BOB", 2), ("ada", 3)];
    let ignore_case = |a: &String, b: &String| a.eq_ignore_ascii_case(b);
    let seq = from_slice(&outer).join_by(
        from_slice(&inner),
        |o| o.to_string(),
        |i| i.0.to_string(),
        |o, i| (o, i.1),
        ignore_case,
        &alloc,
    );
    assert_eq!(collect(&seq), vec![("Ada", 1), ("Ada", 3), ("bob", 2)]);
}

#[test]
fn test_join_skips_inner_when_outer_empty() {
    let alloc = Allocator::unbounded();
    let inner = [1, 2, 3];
    let (inner_seq, stats) = probe(&inner);
    let seq = empty::<i32>().join(inner_seq, |o| *o, |i| *i, |o, i| o + i, &alloc);
    assert_eq!(seq.fast_count(), Some(0));
    assert!(collect(&seq).is_empty());
    assert_eq!(stats.opened(), 0);
    assert_eq!(alloc.peak_bytes(), 0);
}

#[test]
fn test_join_inner_materialized_once() {
    let alloc = Allocator::unbounded();
    let outer = [1, 2, 3, 1];
    let inner = [1, 3];
    let (inner_seq, stats) = opaque_probe(&inner);
    let seq = from_slice(&outer).join(inner_seq, |o| *o, |i| *i, |o, _| o, &alloc);
    assert_eq!(collect(&seq), vec![1, 3, 1]);
    assert_eq!(stats.opened(), 1);
    assert_eq!(stats.pulled(), 2);
}

#[test]
fn test_abandoned_join_releases_inner_rows() {
    let alloc = Allocator::unbounded();
    let outer = [1, 1, 1];
    let inner = [1, 1];
    let seq = from_slice(&outer).join(from_slice(&inner), |o| *o, |i| *i, |o, i| o + i, &alloc);
    let mut cursor = seq.cursor().unwrap();
    assert_eq!(cursor.try_advance().unwrap(), Some(2));
    assert!(alloc.used_bytes() > 0);
    drop(cursor);
    assert_released(&alloc);
}

#[test]
fn test_group_join_pairs_every_outer_row() {
    let alloc = Allocator::unbounded();
    let outer = [1, 2, 9];
    let inner = [(1, 'a'), (2, 'b'), (1, 'c')];
    let seq = from_slice(&outer).group_join(
        from_slice(&inner),
        |o| *o,
        |i| i.0,
        |o, matches| (o, matches.select(|m| m.1).to_vec().unwrap()),
        &alloc,
    );
    assert_eq!(seq.fast_count(), Some(3));
    assert_eq!(
        collect(&seq),
        vec![(1, vec!['a', 'c']), (2, vec!['b']), (9, vec![])]
    );
    assert_released(&alloc);
}

#[test]
fn test_group_join_key_table_outlives_cursor_while_matches_live() {
    let alloc = Allocator::unbounded();
    let outer = [2];
    let inner = [1, 2, 2, 3];
    let seq = from_slice(&outer).group_join(from_slice(&inner), |o| *o, |i| *i, |_, m| m, &alloc);

    let mut cursor = seq.cursor().unwrap();
    let matches = cursor.try_advance().unwrap().unwrap();
    assert_eq!(matches.count().unwrap(), 2);
    assert!(cursor.try_advance().unwrap().is_none());
    drop(cursor);

    // The matches view still shares the key table.
    assert!(alloc.used_bytes() > 0);
    assert_eq!(collect(&matches), vec![2, 2]);
    drop(matches);
    assert_released(&alloc);
}

#[test]
fn test_group_join_by_custom_equality() {
    let alloc = Allocator::unbounded();
    let outer = [10, 25];
    let inner = [11, 19, 21, 30];
    let same_decade = |a: &i32, b: &i32| a / 10 == b / 10;
    let seq = from_slice(&outer).group_join_by(
        from_slice(&inner),
        |o| *o,
        |i| *i,
        |o, m| (o, m.count().unwrap()),
        same_decade,
        &alloc,
    );
    assert_eq!(collect(&seq), vec![(10, 2), (25, 1)]);
}

#[test]
fn test_group_join_empty_outer_never_reads_inner() {
    let alloc = Allocator::unbounded();
    let inner = [1, 2];
    let (inner_seq, stats) = probe(&inner);
    let seq = empty::<i32>().group_join(inner_seq, |o| *o, |i| *i, |o, m| (o, m.count()), &alloc);
    assert!(collect(&seq).is_empty());
    assert_eq!(stats.opened(), 0);
}
