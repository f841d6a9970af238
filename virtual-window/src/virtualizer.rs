use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::StableKey;
use crate::offset_table::OffsetTable;
use crate::range;
use crate::size_model::SizeModel;
use crate::{
    Align, ItemKey, ItemState, MeasureOutcome, Placement, Viewport, VirtualRange,
    VirtualizerOptions, VisibleWindow,
};

/// A headless windowed virtualization engine for one-dimensional collections.
///
/// This type is intentionally UI-agnostic:
/// - It does not hold any UI objects or a reference to the caller's collection.
/// - The caller passes the current [`Viewport`] on every query.
/// - Real item sizes are fed back through [`Virtualizer::report_measurement`].
///
/// Query methods take `&mut self` because start offsets are memoized behind a dirty boundary;
/// apart from that cache, queries do not change anything the caller can observe.
#[derive(Clone, Debug)]
pub struct Virtualizer<K = ItemKey> {
    options: VirtualizerOptions<K>,
    sizes: SizeModel<K>,
    offsets: OffsetTable,
}

impl<K: StableKey> Virtualizer<K> {
    pub fn new(options: VirtualizerOptions<K>) -> Self {
        vdebug!(
            count = options.count,
            overscan = options.overscan,
            "Virtualizer::new"
        );
        let sizes = SizeModel::new(
            options.count,
            Arc::clone(&options.estimate_size),
            Arc::clone(&options.get_item_key),
        );
        let offsets = OffsetTable::new(options.count);
        Self {
            options,
            sizes,
            offsets,
        }
    }

    pub fn options(&self) -> &VirtualizerOptions<K> {
        &self.options
    }

    /// Replaces the options, rebuilding only what the change requires:
    /// - a new `estimate_size` closure resets all measurements,
    /// - a new `get_item_key` closure re-resolves measurements by key,
    /// - a `count` change extends or truncates, keeping the clean prefix,
    /// - an overscan change is free.
    pub fn set_options(&mut self, options: VirtualizerOptions<K>) {
        let prev_count = self.options.count;
        let estimate_size_unchanged =
            Arc::ptr_eq(&self.options.estimate_size, &options.estimate_size);
        let get_item_key_unchanged = Arc::ptr_eq(&self.options.get_item_key, &options.get_item_key);
        self.options = options;
        vtrace!(
            count = self.options.count,
            overscan = self.options.overscan,
            "Virtualizer::set_options"
        );

        if !get_item_key_unchanged {
            self.sizes
                .set_get_item_key(Arc::clone(&self.options.get_item_key));
        }
        if !estimate_size_unchanged {
            self.sizes
                .set_estimate_size(Arc::clone(&self.options.estimate_size));
        }
        if self.options.count != prev_count {
            self.resize(self.options.count);
        }
        if !estimate_size_unchanged || !get_item_key_unchanged {
            self.offsets.invalidate_all();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualizerOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
    }

    /// Updates the item count after items were appended or removed at the end.
    ///
    /// Surviving indexes keep their resolved sizes and the clean offset prefix is kept, so an
    /// append only estimates the new items. If items were inserted, removed or reordered
    /// elsewhere, follow this with [`Virtualizer::sync_item_keys`] (or install a new key
    /// function) so measurements are re-attached by key.
    pub fn set_count(&mut self, count: usize) {
        if self.options.count == count {
            return;
        }
        self.options.count = count;
        self.resize(count);
    }

    fn resize(&mut self, count: usize) {
        vdebug!(count, cached = self.sizes.measurement_cache_len(), "resize");
        self.sizes.set_len(count);
        self.offsets.set_len(count);
    }

    /// Replaces the estimator. Every measurement is dropped, since a new size policy makes
    /// them stale.
    pub fn set_estimate_size(&mut self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        self.options.estimate_size = Arc::new(f);
        self.sizes
            .set_estimate_size(Arc::clone(&self.options.estimate_size));
        self.offsets.invalidate_all();
    }

    pub fn set_get_item_key(&mut self, f: impl Fn(usize) -> K + Send + Sync + 'static) {
        self.options.get_item_key = Arc::new(f);
        self.sizes
            .set_get_item_key(Arc::clone(&self.options.get_item_key));
        self.offsets.invalidate_all();
    }

    /// Re-resolves every index against the key cache.
    ///
    /// Call this after the collection was reordered or replaced while `count` stayed the same.
    pub fn sync_item_keys(&mut self) {
        vdebug!(
            count = self.options.count,
            cached = self.sizes.measurement_cache_len(),
            "sync_item_keys"
        );
        self.sizes.sync_keys();
        self.offsets.invalidate_all();
    }

    /// Clears all measurements; every item goes back to `Unseen`.
    pub fn reset(&mut self) {
        vdebug!(
            count = self.options.count,
            cached = self.sizes.measurement_cache_len(),
            "reset"
        );
        self.sizes.reset();
        self.offsets.invalidate_all();
    }

    /// Returns the number of cached measured sizes (key → size).
    pub fn measurement_cache_len(&self) -> usize {
        self.sizes.measurement_cache_len()
    }

    /// Iterates over the cached measured sizes (key → size) without allocations.
    pub fn for_each_cached_size(&self, f: impl FnMut(&K, u32)) {
        self.sizes.for_each_cached_size(f);
    }

    /// Exports the cached measured sizes as a `Vec`.
    pub fn export_measurement_cache(&self) -> Vec<(K, u32)>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.sizes.measurement_cache_len());
        self.for_each_cached_size(|k, v| out.push((k.clone(), v)));
        out
    }

    /// Replaces the cached measured sizes, then re-resolves every index by key.
    pub fn import_measurement_cache(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.sizes.import_measurements(entries);
        vdebug!(
            cached = self.sizes.measurement_cache_len(),
            "import_measurement_cache"
        );
        self.offsets.invalidate_all();
    }

    /// Records the real size of the item at `index`.
    ///
    /// Offsets after `index` become stale and are recomputed lazily by the next query that
    /// needs them. Reports for indexes outside `[0, count)` are expected during fast scrolling
    /// (an item unmounts after the collection shrank) and are ignored.
    pub fn report_measurement(&mut self, index: usize, size: u32) -> MeasureOutcome {
        let outcome = self.sizes.record_measurement(index, size);
        match outcome {
            MeasureOutcome::Applied { delta } => {
                vtrace!(index, size, delta, "report_measurement");
                self.offsets.invalidate_after(index, delta);
            }
            MeasureOutcome::Unchanged => {}
            MeasureOutcome::Ignored => {
                vtrace!(
                    index,
                    size,
                    count = self.options.count,
                    "report_measurement: index out of range"
                );
            }
        }
        outcome
    }

    /// Like [`Self::report_measurement`], for hosts whose layout produces fractional sizes.
    ///
    /// Negative and non-finite sizes are rejected and the previous size is kept. Fractional
    /// sizes round up so the window never under-covers the viewport.
    pub fn report_measurement_f32(&mut self, index: usize, size: f32) -> MeasureOutcome {
        if !size.is_finite() || size < 0.0 {
            vwarn!(index, size, "report_measurement_f32: rejected size");
            return MeasureOutcome::Ignored;
        }
        // `as` saturates at u32::MAX.
        let whole = size as u32;
        let whole = if (whole as f32) < size {
            whole.saturating_add(1)
        } else {
            whole
        };
        self.report_measurement(index, whole)
    }

    /// Applies a batch of measurements; returns the net change in total extent.
    pub fn report_measurements(
        &mut self,
        measurements: impl IntoIterator<Item = (usize, u32)>,
    ) -> i64 {
        let mut net = 0i64;
        for (index, size) in measurements {
            net = net.saturating_add(self.report_measurement(index, size).delta());
        }
        net
    }

    pub fn item_state(&self, index: usize) -> Option<ItemState> {
        self.sizes.state(index)
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.item_state(index) == Some(ItemState::Measured)
    }

    /// Effective size of `index` (measured if known, else estimated).
    pub fn item_size(&mut self, index: usize) -> Option<u32> {
        self.sizes.estimate(index)
    }

    pub fn key_for(&self, index: usize) -> K {
        self.sizes.key_for(index)
    }

    /// Total scrollable extent, for sizing the caller's scroll container.
    pub fn total_extent(&mut self) -> u64 {
        let sizes = &mut self.sizes;
        self.offsets.total(|i| sizes.size_of(i))
    }

    /// Start offset of `index`; `offset_of(count)` is the total extent.
    pub fn offset_of(&mut self, index: usize) -> Option<u64> {
        if index > self.options.count {
            return None;
        }
        let sizes = &mut self.sizes;
        Some(self.offsets.offset_of(index, |i| sizes.size_of(i)))
    }

    /// Largest index whose start offset is at or before `offset` (clamped to the last item).
    pub fn index_at_offset(&mut self, offset: u64) -> Option<usize> {
        let sizes = &mut self.sizes;
        self.offsets.index_at_offset(offset, |i| sizes.size_of(i))
    }

    /// Indexes strictly intersecting the viewport (no overscan).
    pub fn visible_range(&mut self, viewport: Viewport) -> VirtualRange {
        let sizes = &mut self.sizes;
        range::visible_range(&mut self.offsets, |i| sizes.size_of(i), viewport)
    }

    /// Indexes to materialize: the visible range widened by `overscan` on both sides.
    pub fn range(&mut self, viewport: Viewport) -> VirtualRange {
        let overscan = self.options.overscan;
        let sizes = &mut self.sizes;
        range::compute_range(&mut self.offsets, |i| sizes.size_of(i), viewport, overscan)
    }

    /// Calls `f` with the placement of every materialized item, in ascending index order,
    /// without allocating.
    pub fn for_each_placement(&mut self, viewport: Viewport, f: impl FnMut(Placement)) {
        let range = self.range(viewport);
        self.place(range, f);
    }

    fn place(&mut self, range: VirtualRange, mut f: impl FnMut(Placement)) {
        if range.is_empty() {
            return;
        }

        let sizes = &mut self.sizes;
        let mut start = self
            .offsets
            .offset_of(range.start_index, |i| sizes.size_of(i));
        for index in range.as_range() {
            let size = self.sizes.size_of(index);
            f(Placement { index, start, size });
            start = start.saturating_add(size as u64);
        }
    }

    /// Computes the materialized window for `viewport`.
    ///
    /// Calling this twice with the same viewport and no measurement in between yields the same
    /// window.
    pub fn query(&mut self, viewport: Viewport) -> VisibleWindow {
        let range = self.range(viewport);
        let mut placements = Vec::with_capacity(range.len());
        self.place(range, |p| placements.push(p));
        vtrace!(
            offset = viewport.offset,
            extent = viewport.extent,
            start = range.start_index,
            end = range.end_index,
            "query"
        );
        VisibleWindow {
            start_index: range.start_index,
            end_index: range.end_index,
            placements,
        }
    }

    /// Collects placements into `out` (clears `out` first), reusing its allocation.
    pub fn collect_placements(&mut self, viewport: Viewport, out: &mut Vec<Placement>) {
        out.clear();
        self.for_each_placement(viewport, |p| out.push(p));
    }

    pub fn max_scroll_offset(&mut self, viewport_extent: u32) -> u64 {
        self.total_extent().saturating_sub(viewport_extent as u64)
    }

    pub fn clamp_scroll_offset(&mut self, offset: u64, viewport_extent: u32) -> u64 {
        offset.min(self.max_scroll_offset(viewport_extent))
    }

    /// Scroll offset that brings `index` into view with the given alignment (clamped).
    ///
    /// `Align::Auto` keeps `viewport.offset` when the item is already fully visible, otherwise
    /// scrolls the minimum distance.
    pub fn scroll_to_index_offset(&mut self, index: usize, align: Align, viewport: Viewport) -> u64 {
        let count = self.options.count;
        if count == 0 {
            return 0;
        }
        let index = index.min(count - 1);
        let sizes = &mut self.sizes;
        let start = self.offsets.offset_of(index, |i| sizes.size_of(i));
        let size = self.sizes.size_of(index) as u64;
        let end = start.saturating_add(size);
        let view = viewport.extent as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = viewport.offset;
                let cur_end = viewport.end();
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target, viewport.extent)
    }

    #[cfg(test)]
    pub(crate) fn dirty_boundary(&self) -> usize {
        self.offsets.dirty_from()
    }
}
