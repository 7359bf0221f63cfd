//! Allocator discipline: lazy acquisition, release on every exit path, hard caps.

mod common;

use common::{assert_released, boom, collect, fail_after, opaque, pseudo_random};
use flatseq::PipelineConfig;
use flatseq_mem::Error as AllocError;
use flatseq_operators::{from_slice, Allocator, Cursor, Natural, SeqError, Sequence, SequenceExt};

/// Open a cursor, pull `n` elements, then abandon it.
fn pull_and_abandon<S: Sequence>(seq: &S, n: usize) {
    let mut cursor = seq.cursor().unwrap();
    for _ in 0..n {
        cursor.try_advance().unwrap();
    }
}

#[test]
fn test_cursor_creation_never_allocates() {
    let alloc = Allocator::unbounded();
    let data = [5, 1, 4, 1, 3];
    let src = from_slice(&data);

    let _a = src.order_by_key(|x| *x, &alloc).cursor().unwrap();
    let _b = src.distinct(&alloc).cursor().unwrap();
    let _c = src.reverse(&alloc).cursor().unwrap();
    let _d = opaque(&data).reverse(&alloc).cursor().unwrap();
    let _e = src.skip_last(2, &alloc).cursor().unwrap();
    let _f = src.take_last(2, &alloc).cursor().unwrap();
    let _g = src.buffer(2, &alloc).cursor().unwrap();
    let _h = src.group_by(|x| *x, &alloc).cursor().unwrap();
    let _i = src.intersect(src, Natural, &alloc).cursor().unwrap();
    let _j = src.except(src, Natural, &alloc).cursor().unwrap();
    let _k = src.join(src, |o| *o, |i| *i, |o, _| o, &alloc).cursor().unwrap();
    let _l = src.group_join(src, |o| *o, |i| *i, |o, _| o, &alloc).cursor().unwrap();

    assert_eq!(alloc.peak_bytes(), 0);
}

#[test]
fn test_early_abandonment_releases_scratch() {
    let alloc = Allocator::unbounded();
    let data = pseudo_random(9, 50, 20);
    let src = from_slice(&data);

    pull_and_abandon(&src.order_by_key(|x| *x, &alloc), 1);
    pull_and_abandon(&src.distinct(&alloc), 2);
    pull_and_abandon(&opaque(&data).reverse(&alloc), 3);
    pull_and_abandon(&src.skip_last(5, &alloc), 1);
    pull_and_abandon(&opaque(&data).take_last(5, &alloc), 1);
    pull_and_abandon(&src.group_by(|x| x % 3, &alloc), 1);
    pull_and_abandon(&src.except(src.take(10), Natural, &alloc), 1);
    pull_and_abandon(&src.join(src, |o| *o, |i| *i, |o, _| o, &alloc), 1);

    assert!(alloc.peak_bytes() > 0);
    assert_released(&alloc);
}

#[test]
fn test_upstream_failure_releases_blocking_stages() {
    let alloc = Allocator::unbounded();
    let data = [6, 2, 9, 4, 1];
    let failing = fail_after(&data, 4);

    assert_eq!(failing.order_by_key(|x| *x, &alloc).to_vec(), Err(boom()));
    assert_eq!(failing.distinct(&alloc).to_vec(), Err(boom()));
    assert_eq!(failing.reverse(&alloc).to_vec(), Err(boom()));
    assert_eq!(failing.take_last(2, &alloc).to_vec(), Err(boom()));
    assert_eq!(failing.skip_last(2, &alloc).to_vec(), Err(boom()));
    assert_eq!(failing.buffer(3, &alloc).count(), Err(boom()));
    assert_eq!(
        from_slice(&data).intersect(failing, Natural, &alloc).to_vec(),
        Err(boom())
    );
    assert_eq!(
        from_slice(&data)
            .join(failing, |o| *o, |i| *i, |o, i| o + i, &alloc)
            .to_vec(),
        Err(boom())
    );
    assert_released(&alloc);
}

#[test]
fn test_cap_refusal_propagates_through_stages() {
    let alloc = Allocator::new(16);
    let data: Vec<u32> = (0..10).collect();
    let err = from_slice(&data)
        .select(|x| x * 2)
        .order_by_key(|x| *x, &alloc)
        .filter(|x| *x > 3)
        .to_vec()
        .unwrap_err();

    match err {
        SeqError::Alloc(AllocError::BudgetExceeded {
            tag,
            requested,
            capacity,
            ..
        }) => {
            assert_eq!(tag, "order_by");
            assert_eq!(requested, 40);
            assert_eq!(capacity, 16);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_released(&alloc);
}

#[test]
fn test_growth_beyond_cap_is_refused_mid_drain() {
    // Room for the initial 16 slots but not the doubled buffer.
    let alloc = Allocator::new(16 * 8 + 8);
    let data: Vec<u64> = (0..40).collect();
    let err = opaque(&data).reverse(&alloc).to_vec().unwrap_err();
    assert!(matches!(err, SeqError::Alloc(AllocError::BudgetExceeded { .. })));
    assert_released(&alloc);
}

#[test]
fn test_peak_covers_sort_buffer() {
    let alloc = Allocator::unbounded();
    let data: Vec<u32> = (0..100).rev().collect();
    let sorted = collect(&from_slice(&data).order_by_key(|x| *x, &alloc));
    assert_eq!(sorted.first(), Some(&0));
    assert!(alloc.peak_bytes() >= 100 * std::mem::size_of::<u32>());
    assert_released(&alloc);
}

#[test]
fn test_nested_blocking_stage_releases_per_outer_element() {
    let alloc = Allocator::unbounded();
    let rows: Vec<Vec<u16>> = vec![vec![3, 1, 2], vec![9, 8], vec![5]];
    let inner_alloc = alloc.clone();
    let seq = from_slice(&[0usize, 1, 2]).select_many(|i| {
        from_slice(rows[i].as_slice()).order_by_key(|x| *x, &inner_alloc)
    });

    let mut cursor = seq.cursor().unwrap();
    let mut out = Vec::new();
    while let Some(x) = cursor.try_advance().unwrap() {
        out.push(x);
        // At most one inner sort buffer is alive at a time.
        assert!(alloc.used_bytes() <= 3 * std::mem::size_of::<u16>());
    }
    assert_eq!(out, vec![1, 2, 3, 8, 9, 5]);
    assert_released(&alloc);
}

#[test]
fn test_allocator_from_json_config() {
    let cfg = PipelineConfig::from_json_str(
        r#"{"mem_cap_bytes": 4096, "join_initial_capacity": 4, "group_initial_capacity": 2}"#,
    )
    .unwrap();
    let alloc = Allocator::from_config(&cfg);
    assert_eq!(alloc.capacity_bytes(), 4096);
    assert_eq!(alloc.capacities().join_initial, 4);
    assert_eq!(alloc.capacities().group_initial, 2);
    assert_eq!(alloc.capacities().group_table_initial, 8);

    let outer = [1, 2];
    let inner: Vec<i32> = (0..10).collect();
    let joined = opaque(&outer).join(opaque(&inner), |o| *o, |i| *i, |o, i| (o, i), &alloc);
    assert_eq!(collect(&joined), vec![(1, 1), (2, 2)]);
    assert_released(&alloc);
}

#[test]
fn test_config_round_trips_through_json() {
    let cfg = PipelineConfig {
        mem_cap_bytes: Some(1 << 20),
        ..PipelineConfig::default()
    };
    let json = serde_json::to_string(&cfg).unwrap();
    assert_eq!(PipelineConfig::from_json_str(&json).unwrap(), cfg);
}
