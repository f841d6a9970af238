use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }

    fn gen_range_u32(&mut self, start: u32, end_exclusive: u32) -> u32 {
        self.gen_range_u64(start as u64, end_exclusive as u64) as u32
    }
}

fn expected_offsets(sizes: &[u32]) -> Vec<u64> {
    let mut out = Vec::with_capacity(sizes.len() + 1);
    let mut off = 0u64;
    out.push(off);
    for &size in sizes {
        off += size as u64;
        out.push(off);
    }
    out
}

fn expected_range(sizes: &[u32], viewport: Viewport, overscan: usize) -> VirtualRange {
    let count = sizes.len();
    if count == 0 || viewport.extent == 0 {
        return VirtualRange::EMPTY;
    }
    let offsets = expected_offsets(sizes);

    // Last item starting at or before the scroll offset.
    let mut raw_start = 0usize;
    for (i, &start) in offsets[..count].iter().enumerate() {
        if start <= viewport.offset {
            raw_start = i;
        }
    }

    let mut raw_end = raw_start;
    let mut covered = offsets[raw_start] + sizes[raw_start] as u64;
    while covered < viewport.end() && raw_end + 1 < count {
        raw_end += 1;
        covered += sizes[raw_end] as u64;
    }

    VirtualRange {
        start_index: raw_start.saturating_sub(overscan),
        end_index: (raw_end + 1 + overscan).min(count),
    }
}

fn counting_estimator(size: u32) -> (Arc<AtomicUsize>, impl Fn(usize) -> u32 + Send + Sync) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    (calls, move |_| {
        seen.fetch_add(1, Ordering::Relaxed);
        size
    })
}

#[test]
fn uniform_list_at_top_includes_trailing_overscan() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(1000, |_| 40).with_overscan(2));
    let w = v.query(Viewport::new(0, 400));
    // 10 visible + 2 overscan at the end, nothing before index 0.
    assert_eq!(w.start_index, 0);
    assert_eq!(w.last_index(), Some(11));
    assert_eq!(w.len(), 12);
    assert_eq!(w.placements[11], Placement {
        index: 11,
        start: 440,
        size: 40
    });
}

#[test]
fn scrolled_window_has_overscan_on_both_sides() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(1000, |_| 40).with_overscan(2));
    assert_eq!(v.offset_of(100), Some(4000));
    let w = v.query(Viewport::new(4000, 400));
    assert_eq!(w.start_index, 98);
    assert_eq!(w.last_index(), Some(111));
    assert_eq!(w.get(100).map(|p| p.start), Some(4000));
    assert_eq!(w.get(97), None);
}

#[test]
fn measurement_shifts_only_later_offsets_by_delta() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(1000, |_| 40));
    let before_4 = v.offset_of(4).unwrap();
    let before_5 = v.offset_of(5).unwrap();
    let before_6 = v.offset_of(6).unwrap();
    let total = v.total_extent();

    assert_eq!(
        v.report_measurement(5, 80),
        MeasureOutcome::Applied { delta: 40 }
    );

    assert_eq!(v.offset_of(4), Some(before_4));
    assert_eq!(v.offset_of(5), Some(before_5));
    assert_eq!(v.offset_of(6), Some(before_6 + 40));
    assert_eq!(v.offset_of(999), Some(999 * 40 + 40));
    assert_eq!(v.total_extent(), total + 40);
}

#[test]
fn empty_collection_yields_empty_window() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(0, |_| 40));
    let w = v.query(Viewport::new(0, 400));
    assert!(w.is_empty());
    assert_eq!(w.last_index(), None);
    assert_eq!(v.total_extent(), 0);
    assert_eq!(v.index_at_offset(0), None);
    assert_eq!(v.offset_of(0), Some(0));
    assert_eq!(v.offset_of(1), None);
}

#[test]
fn zero_extent_viewport_yields_empty_window() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10, |_| 40));
    assert!(v.query(Viewport::new(0, 0)).is_empty());
    assert!(v.range(Viewport::new(80, 0)).is_empty());
}

#[test]
fn scroll_past_end_clamps_to_last_item() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(20, |_| 10).with_overscan(3));
    let w = v.query(Viewport::new(10_000, 50));
    assert_eq!(w.range().as_range(), 16..20);
    assert_eq!(v.visible_range(Viewport::new(10_000, 50)).as_range(), 19..20);
}

#[test]
fn overscan_never_leaves_bounds() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(3, |_| 10).with_overscan(100));
    let w = v.query(Viewport::new(0, 5));
    assert_eq!(w.range().as_range(), 0..3);
}

#[test]
fn default_overscan_is_five() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(100, |_| 10));
    assert_eq!(v.overscan(), DEFAULT_OVERSCAN);
    assert_eq!(v.range(Viewport::new(500, 100)).as_range(), 45..65);
}

#[test]
fn partially_visible_items_are_included() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(100, |_| 40).with_overscan(0));
    // [10, 410) touches items 0..=10.
    assert_eq!(v.range(Viewport::new(10, 400)).as_range(), 0..11);
    // [40, 440) is exactly items 1..=10.
    assert_eq!(v.range(Viewport::new(40, 400)).as_range(), 1..11);
}

#[test]
fn zero_sized_items_do_not_start_the_window() {
    let sizes = [40u32, 0, 0, 40, 40];
    let mut v = Virtualizer::new(VirtualizerOptions::new(5, move |i| sizes[i]).with_overscan(0));
    assert_eq!(v.index_at_offset(40), Some(3));
    assert_eq!(v.index_at_offset(39), Some(0));
    assert_eq!(v.range(Viewport::new(40, 40)).as_range(), 3..4);
}

#[test]
fn repeated_queries_are_identical() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(500, |i| 10 + (i % 7) as u32));
    v.report_measurement(3, 55);
    let a = v.query(Viewport::new(1234, 300));
    let b = v.query(Viewport::new(1234, 300));
    assert_eq!(a, b);
}

#[test]
fn measurement_converges_regardless_of_estimate() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(50, |i| (i as u32 * 13) % 29));
    for (i, s) in [(0usize, 7u32), (10, 0), (25, 100), (49, 3)] {
        v.report_measurement(i, s);
        let start = v.offset_of(i).unwrap();
        assert_eq!(v.offset_of(i + 1), Some(start + s as u64));
    }
}

#[test]
fn dirty_boundary_follows_the_first_changed_index() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(100, |_| 10));
    assert_eq!(v.total_extent(), 1000);
    assert_eq!(v.dirty_boundary(), 101);

    v.report_measurement(40, 30);
    assert_eq!(v.dirty_boundary(), 41);

    // The total is tracked incrementally; no walk is needed.
    assert_eq!(v.total_extent(), 1020);
    assert_eq!(v.dirty_boundary(), 41);

    // Offsets up to the changed item are still clean.
    assert_eq!(v.offset_of(40), Some(400));
    assert_eq!(v.dirty_boundary(), 41);

    // Only the requested part of the stale suffix is recomputed.
    assert_eq!(v.offset_of(45), Some(470));
    assert_eq!(v.dirty_boundary(), 46);

    // A later change does not move the boundary forward.
    v.report_measurement(90, 0);
    assert_eq!(v.dirty_boundary(), 46);
    // An earlier one moves it back.
    v.report_measurement(2, 12);
    assert_eq!(v.dirty_boundary(), 3);
    assert_eq!(v.offset_of(100), Some(1012));
}

#[test]
fn estimator_is_only_consulted_for_touched_items() {
    let (calls, estimate) = counting_estimator(40);
    let mut v = Virtualizer::new(VirtualizerOptions::new(1_000_000, estimate).with_overscan(2));
    assert_eq!(calls.load(Ordering::Relaxed), 0);

    let w = v.query(Viewport::new(0, 400));
    assert_eq!(w.len(), 12);
    assert_eq!(calls.load(Ordering::Relaxed), 12);
    assert_eq!(v.item_state(11), Some(ItemState::Estimated));
    assert_eq!(v.item_state(12), Some(ItemState::Unseen));

    // Re-querying the same window resolves nothing new.
    v.query(Viewport::new(0, 400));
    assert_eq!(calls.load(Ordering::Relaxed), 12);
}

#[test]
fn item_state_machine() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(3, |_| 10));
    assert_eq!(v.item_state(0), Some(ItemState::Unseen));
    assert_eq!(v.item_state(3), None);

    assert_eq!(v.item_size(0), Some(10));
    assert_eq!(v.item_state(0), Some(ItemState::Estimated));

    assert_eq!(v.report_measurement(0, 10), MeasureOutcome::Unchanged);
    assert!(v.is_measured(0));

    v.report_measurement(0, 12);
    assert_eq!(v.item_state(0), Some(ItemState::Measured));

    // Measuring an unseen item goes straight to measured.
    v.report_measurement(2, 4);
    assert_eq!(v.item_state(2), Some(ItemState::Measured));

    v.reset();
    assert_eq!(v.item_state(0), Some(ItemState::Unseen));
    assert_eq!(v.item_state(2), Some(ItemState::Unseen));
    assert_eq!(v.measurement_cache_len(), 0);
    assert_eq!(v.total_extent(), 30);
}

#[test]
fn out_of_range_measurement_is_ignored() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(5, |_| 10));
    assert!(v.report_measurement(5, 100).is_ignored());
    assert!(v.report_measurement(usize::MAX, 100).is_ignored());
    assert_eq!(v.total_extent(), 50);
    assert_eq!(v.measurement_cache_len(), 0);
}

#[test]
fn fractional_measurements_are_validated_and_rounded_up() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(5, |_| 10));
    v.report_measurement(1, 20);

    assert!(v.report_measurement_f32(1, -1.0).is_ignored());
    assert!(v.report_measurement_f32(1, f32::NAN).is_ignored());
    assert!(v.report_measurement_f32(1, f32::INFINITY).is_ignored());
    assert_eq!(v.item_size(1), Some(20));

    assert_eq!(
        v.report_measurement_f32(1, 12.25),
        MeasureOutcome::Applied { delta: -7 }
    );
    assert_eq!(v.item_size(1), Some(13));
    assert_eq!(v.report_measurement_f32(1, 13.0), MeasureOutcome::Unchanged);
    assert_eq!(v.report_measurement_f32(2, 0.0).delta(), -10);
}

#[test]
fn report_measurements_returns_net_delta() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10, |_| 10));
    let net = v.report_measurements([(0, 15), (1, 5), (2, 10), (42, 99)]);
    assert_eq!(net, 0);
    assert!(v.is_measured(0));
    assert!(v.is_measured(2));
    assert_eq!(v.offset_of(2), Some(20));
    assert_eq!(v.total_extent(), 100);
}

#[test]
fn measurements_follow_keys_after_reorder() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(2, |_| 1));
    v.report_measurement(0, 10);
    assert_eq!(v.item_size(0), Some(10));
    assert_eq!(v.item_size(1), Some(1));

    // Simulate data reorder by changing the key mapping.
    v.set_get_item_key(|i| if i == 0 { 1 } else { 0 });

    // The measured size (10) follows key=0, now at index 1.
    assert_eq!(v.item_size(0), Some(1));
    assert_eq!(v.item_size(1), Some(10));
    assert_eq!(v.offset_of(1), Some(1));
    assert_eq!(v.total_extent(), 11);
}

#[test]
fn insertion_does_not_misattribute_measurements() {
    let keys: Arc<Vec<u64>> = Arc::new(alloc::vec![10, 11, 12]);
    let k = Arc::clone(&keys);
    let mut v = Virtualizer::new(VirtualizerOptions::new_with_key(3, |_| 20, move |i| k[i]));
    v.report_measurement(1, 50);
    assert_eq!(v.offset_of(3), Some(90));

    // Insert key 99 at the front.
    let keys: Arc<Vec<u64>> = Arc::new(alloc::vec![99, 10, 11, 12]);
    v.update_options(|o| {
        o.count = 4;
        o.get_item_key = Arc::new(move |i| keys[i]);
    });

    assert_eq!(v.item_size(1), Some(20));
    assert_eq!(v.item_size(2), Some(50));
    assert!(v.is_measured(2));
    assert!(!v.is_measured(1));
    assert_eq!(v.offset_of(3), Some(90));
    assert_eq!(v.total_extent(), 110);
}

#[test]
fn sync_item_keys_rebinds_positions() {
    let order = Arc::new(AtomicUsize::new(0));
    let o = Arc::clone(&order);
    let mut v = Virtualizer::new(VirtualizerOptions::new_with_key(
        3,
        |_| 5,
        move |i| {
            // Order 1 is the reverse of order 0.
            if o.load(Ordering::Relaxed) == 0 {
                i as u64
            } else {
                2 - i as u64
            }
        },
    ));
    v.report_measurement(0, 40);
    assert_eq!(v.offset_of(1), Some(40));

    order.store(1, Ordering::Relaxed);
    v.sync_item_keys();
    assert_eq!(v.item_size(2), Some(40));
    assert_eq!(v.item_size(0), Some(5));
    assert_eq!(v.offset_of(2), Some(10));
}

#[test]
fn set_count_preserves_existing_sizes_and_appends_estimates() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(2, |_| 1));
    v.report_measurement(0, 10);
    assert_eq!(v.total_extent(), 11);

    v.set_count(4);
    assert_eq!(v.item_size(0), Some(10));
    assert_eq!(v.item_size(1), Some(1));
    assert_eq!(v.item_size(3), Some(1));
    assert_eq!(v.total_extent(), 13);

    v.set_count(1);
    assert_eq!(v.item_size(0), Some(10));
    assert_eq!(v.item_size(1), None);
    assert_eq!(v.total_extent(), 10);

    v.set_count(0);
    assert_eq!(v.total_extent(), 0);
    assert!(v.query(Viewport::new(0, 10)).is_empty());

    v.set_count(2);
    assert_eq!(v.item_size(0), Some(10));
    assert_eq!(v.total_extent(), 11);
}

#[test]
fn measured_items_stay_measured_across_count_and_key_changes() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10, |_| 20));
    v.report_measurement(3, 50);

    v.set_count(11);
    assert_eq!(v.item_state(3), Some(ItemState::Measured));
    assert_eq!(v.item_state(10), Some(ItemState::Unseen));

    v.sync_item_keys();
    assert_eq!(v.item_state(3), Some(ItemState::Measured));
    assert!(v.is_measured(3));
    assert_eq!(v.item_state(4), Some(ItemState::Unseen));

    // Swap neighbours pairwise: key 3 now lives at index 2.
    v.set_get_item_key(|i| (i as u64) ^ 1);
    assert_eq!(v.item_state(2), Some(ItemState::Measured));
    assert_eq!(v.item_state(3), Some(ItemState::Unseen));
    assert_eq!(v.item_size(2), Some(50));
    assert_eq!(v.item_state(2), Some(ItemState::Measured));

    let mut w = Virtualizer::new(VirtualizerOptions::new(10, |_| 20));
    w.import_measurement_cache([(5, 7)]);
    assert_eq!(w.item_state(5), Some(ItemState::Measured));

    w.reset();
    assert_eq!(w.item_state(5), Some(ItemState::Unseen));
}

#[test]
fn appending_items_only_estimates_the_new_ones() {
    let (calls, estimate) = counting_estimator(7);
    let mut v = Virtualizer::new(VirtualizerOptions::new(100_000, estimate));
    assert_eq!(v.total_extent(), 700_000);
    assert_eq!(calls.load(Ordering::Relaxed), 100_000);

    v.set_count(100_001);
    assert_eq!(v.dirty_boundary(), 100_001);
    assert_eq!(v.total_extent(), 700_007);
    assert_eq!(calls.load(Ordering::Relaxed), 100_001);
    assert_eq!(v.dirty_boundary(), 100_002);

    // Truncation keeps the clean prefix and needs no estimates at all.
    v.set_count(50_000);
    assert_eq!(v.total_extent(), 350_000);
    assert_eq!(v.offset_of(49_999), Some(349_993));
    assert_eq!(calls.load(Ordering::Relaxed), 100_001);
}

#[test]
fn set_estimate_size_drops_measurements() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(4, |_| 10));
    v.report_measurement(1, 100);
    assert_eq!(v.total_extent(), 130);

    v.set_estimate_size(|_| 20);
    assert_eq!(v.measurement_cache_len(), 0);
    assert_eq!(v.item_state(1), Some(ItemState::Unseen));
    assert_eq!(v.total_extent(), 80);
}

#[test]
fn set_options_rebuilds_only_what_changed() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10, |_| 10));
    v.report_measurement(3, 30);

    v.update_options(|o| o.overscan = 0);
    assert_eq!(v.overscan(), 0);
    assert!(v.is_measured(3));
    assert_eq!(v.total_extent(), 120);

    v.update_options(|o| o.count = 12);
    assert_eq!(v.item_size(3), Some(30));
    assert_eq!(v.total_extent(), 140);

    let next = v.options().clone().with_estimate_size(|_| 1);
    v.set_options(next);
    assert_eq!(v.measurement_cache_len(), 0);
    assert_eq!(v.total_extent(), 12);
}

#[test]
fn scroll_to_index_offset_alignments() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(5, |_| 1));
    v.report_measurement(2, 10);
    // sizes = [1, 1, 10, 1, 1], total = 14
    let view = Viewport::new(0, 3);

    assert_eq!(v.scroll_to_index_offset(2, Align::Start, view), 2);
    assert_eq!(v.scroll_to_index_offset(4, Align::End, view), 11);
    // center of item 2 is 7, minus half the viewport (1)
    assert_eq!(v.scroll_to_index_offset(2, Align::Center, view), 6);
    assert_eq!(v.scroll_to_index_offset(0, Align::Auto, view), 0);
    assert_eq!(v.scroll_to_index_offset(3, Align::Auto, view), 10);
    assert_eq!(
        v.scroll_to_index_offset(0, Align::Auto, Viewport::new(5, 3)),
        0
    );
    // Out-of-range indexes clamp to the last item.
    assert_eq!(v.scroll_to_index_offset(99, Align::Start, view), 11);
    assert_eq!(v.clamp_scroll_offset(1000, 3), 11);
}

#[test]
fn measurement_cache_can_roundtrip() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10, |_| 1));
    v.report_measurement(2, 10);
    v.report_measurement(7, 3);

    let mut cache = v.export_measurement_cache();
    cache.sort_unstable();
    assert_eq!(cache, alloc::vec![(2, 10), (7, 3)]);

    let mut w = Virtualizer::new(VirtualizerOptions::new(10, |_| 1));
    w.import_measurement_cache(cache);
    assert_eq!(w.measurement_cache_len(), 2);
    assert_eq!(w.item_size(2), Some(10));
    assert_eq!(w.total_extent(), v.total_extent());
}

#[test]
fn collect_placements_matches_query() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(200, |i| 5 + (i % 3) as u32));
    let view = Viewport::new(333, 120);
    let w = v.query(view);

    let mut out = alloc::vec![Placement {
        index: 0,
        start: 0,
        size: 0
    }];
    v.collect_placements(view, &mut out);
    assert_eq!(out, w.placements);

    let mut seen = Vec::new();
    v.for_each_placement(view, |p| seen.push(p.index));
    assert_eq!(seen, w.range().as_range().collect::<Vec<_>>());
}

#[test]
#[should_panic(expected = "estimator exploded")]
fn estimator_panics_reach_the_caller() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(10, |i| {
        if i == 3 {
            panic!("estimator exploded");
        }
        10
    }));
    v.query(Viewport::new(0, 100));
}

#[test]
fn property_random_layout_invariants() {
    let mut rng = Lcg::new(0x5eed_0001);

    for _case in 0..40 {
        let count = rng.gen_range_usize(0, 300);
        let base: Vec<u32> = (0..count).map(|_| rng.gen_range_u32(0, 60)).collect();
        let estimates = Arc::new(base.clone());
        let overscan = rng.gen_range_usize(0, 6);
        let mut sizes = base;

        let e = Arc::clone(&estimates);
        let mut v =
            Virtualizer::new(VirtualizerOptions::new(count, move |i| e[i]).with_overscan(overscan));

        for _step in 0..60 {
            if count > 0 && rng.gen_range_u32(0, 3) == 0 {
                let i = rng.gen_range_usize(0, count);
                let s = rng.gen_range_u32(0, 120);
                let prev = sizes[i];
                let outcome = v.report_measurement(i, s);
                assert_eq!(outcome.delta(), s as i64 - prev as i64);
                sizes[i] = s;
            }

            let offsets = expected_offsets(&sizes);
            let total = offsets[count];
            assert_eq!(v.total_extent(), total);

            let scroll = rng.gen_range_u64(0, total + 200);
            let extent = rng.gen_range_u32(0, 400);
            let view = Viewport::new(scroll, extent);
            let w = v.query(view);

            assert_eq!(w.range(), expected_range(&sizes, view, overscan));
            for p in &w {
                assert_eq!(p.start, offsets[p.index]);
                assert_eq!(p.size, sizes[p.index]);
            }
            for pair in w.placements.windows(2) {
                assert_eq!(pair[0].index + 1, pair[1].index);
                assert_eq!(pair[0].end(), pair[1].start);
            }

            // The window covers the viewport, clipped to the content.
            if extent > 0 && scroll < total {
                let first = w.placements.first().unwrap();
                let last = w.placements.last().unwrap();
                assert!(first.start <= scroll);
                assert!(last.end() >= view.end().min(total));
            }

            if count > 0 {
                let i = rng.gen_range_usize(0, count);
                let a = v.offset_of(i).unwrap();
                let b = v.offset_of(i + 1).unwrap();
                assert!(a <= b);
                assert_eq!(b - a, sizes[i] as u64);

                let target = rng.gen_range_u64(0, total + 10);
                let idx = v.index_at_offset(target).unwrap();
                assert!(offsets[idx] <= target);
                assert!(idx + 1 == count || offsets[idx + 1] > target);
            }
        }
    }
}
