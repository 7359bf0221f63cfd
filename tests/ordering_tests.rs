//! Ordering engine: OrderBy, OrderByDescending, ThenBy chains.

mod common;

use std::cmp::Ordering;

use common::{assert_released, collect, fail_after, opaque, pseudo_random};
use flatseq_operators::{from_slice, Allocator, Comparer, Natural, SeqError, SequenceExt};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Employee {
    dept: u8,
    age: u8,
    id: u16,
}

fn staff() -> Vec<Employee> {
    pseudo_random(42, 200, 1 << 16)
        .into_iter()
        .enumerate()
        .map(|(i, r)| Employee {
            dept: (r % 5) as u8,
            age: (20 + (r >> 3) % 40) as u8,
            id: i as u16,
        })
        .collect()
}

#[test]
fn test_order_by_key_ascending_and_descending() {
    let alloc = Allocator::unbounded();
    let data = [3, 1, 4, 1, 5, 9, 2, 6];
    assert_eq!(
        collect(&from_slice(&data).order_by_key(|x| *x, &alloc)),
        vec![1, 1, 2, 3, 4, 5, 6, 9]
    );
    assert_eq!(
        collect(&opaque(&data).order_by_key_descending(|x| *x, &alloc)),
        vec![9, 6, 5, 4, 3, 2, 1, 1]
    );
    assert_released(&alloc);
}

#[test]
fn test_then_by_breaks_ties_only() {
    let alloc = Allocator::unbounded();
    let rows = staff();
    let sorted = collect(
        &from_slice(&rows)
            .order_by_key(|e| e.dept, &alloc)
            .then_by_key_descending(|e| e.age)
            .then_by_key(|e| e.id),
    );

    assert_eq!(sorted.len(), rows.len());
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        match a.dept.cmp(&b.dept) {
            Ordering::Less => {}
            Ordering::Greater => panic!("dept out of order: {a:?} before {b:?}"),
            Ordering::Equal => match b.age.cmp(&a.age) {
                Ordering::Less => {}
                Ordering::Greater => panic!("age out of order: {a:?} before {b:?}"),
                Ordering::Equal => assert!(a.id < b.id),
            },
        }
    }
    assert_released(&alloc);
}

#[test]
fn test_custom_key_comparer() {
    let alloc = Allocator::unbounded();
    let words = ["pear", "Fig", "apple", "kiwi"];
    let case_insensitive = |a: &&str, b: &&str| a.to_lowercase().cmp(&b.to_lowercase());
    let sorted = collect(&from_slice(&words).order_by(|w| *w, case_insensitive, &alloc));
    assert_eq!(sorted, vec!["apple", "Fig", "kiwi", "pear"]);

    let by_len_then_alpha = collect(
        &from_slice(&words)
            .order_by(|w| w.len(), Natural, &alloc)
            .then_by(|w| *w, case_insensitive),
    );
    assert_eq!(by_len_then_alpha, vec!["Fig", "kiwi", "pear", "apple"]);
}

#[test]
fn test_order_by_whole_element_comparer() {
    let alloc = Allocator::unbounded();
    let data = [-3, 2, -1, 0];
    let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
    let seq = from_slice(&data)
        .order_by_cmp(by_abs, &alloc)
        .then_by_cmp(|a: &i32, b: &i32| b.cmp(a));
    assert_eq!(collect(&seq), vec![0, -1, 2, -3]);
    assert_eq!(by_abs.compare(&-1, &1), Ordering::Equal);
}

#[test]
fn test_descending_presents_operands_swapped() {
    let alloc = Allocator::unbounded();
    let data = [(1, 'a'), (2, 'b'), (3, 'c')];
    let seq = from_slice(&data)
        .order_by_descending(|p| p.0, Natural, &alloc)
        .then_by_descending(|p| p.1, Natural);
    assert_eq!(collect(&seq), vec![(3, 'c'), (2, 'b'), (1, 'a')]);
}

#[test]
fn test_order_by_does_not_buffer_until_first_pull() {
    let alloc = Allocator::unbounded();
    let data = [2, 1];
    let seq = from_slice(&data).order_by_key(|x| *x, &alloc);
    let _cursor = flatseq_operators::Sequence::cursor(&seq).unwrap();
    assert_eq!(alloc.peak_bytes(), 0);
}

#[test]
fn test_upstream_error_propagates_and_releases() {
    let alloc = Allocator::unbounded();
    let data = [5, 4, 3, 2, 1];
    let seq = fail_after(&data, 3).order_by_key(|x| *x, &alloc);
    let err = seq.to_vec().unwrap_err();
    assert_eq!(err, common::boom());
    assert!(matches!(err, SeqError::Unsupported { .. }));
    assert_released(&alloc);
}

#[test]
fn test_empty_source_sorts_to_empty() {
    let alloc = Allocator::unbounded();
    let data: [u8; 0] = [];
    assert!(collect(&from_slice(&data).order_by_key(|x| *x, &alloc)).is_empty());
    assert_released(&alloc);
}
