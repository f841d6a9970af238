use alloc::sync::Arc;

use crate::ItemKey;

/// Default number of extra items materialized on each side of the visible range.
pub const DEFAULT_OVERSCAN: usize = 5;

/// Configuration for [`crate::Virtualizer`].
///
/// Closures are stored in `Arc`s so options are cheap to clone; adapters can tweak a field and
/// hand the result to `Virtualizer::set_options` without reallocating them.
pub struct VirtualizerOptions<K = ItemKey> {
    pub count: usize,
    /// Estimated size of item `i` along the scroll axis, used until the item is measured.
    pub estimate_size: Arc<dyn Fn(usize) -> u32 + Send + Sync>,
    /// Stable identity of the item at index `i`. Measurements follow keys, not positions.
    pub get_item_key: Arc<dyn Fn(usize) -> K + Send + Sync>,
    /// Items (not pixels) materialized beyond each edge of the viewport.
    pub overscan: usize,
}

impl<K> Clone for VirtualizerOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            get_item_key: Arc::clone(&self.get_item_key),
            overscan: self.overscan,
        }
    }
}

impl VirtualizerOptions<ItemKey> {
    /// Creates options for a list keyed by index (`ItemKey = u64`).
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::new_with_key(count, estimate_size, |i| i as u64)
    }
}

impl<K> VirtualizerOptions<K> {
    /// Creates options with a custom key mapping.
    ///
    /// Use this when items can be inserted, removed or reordered: `get_item_key(i)` should
    /// return a stable identity for the item currently at index `i`.
    pub fn new_with_key(
        count: usize,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            get_item_key: Arc::new(get_item_key),
            overscan: DEFAULT_OVERSCAN,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn with_estimate_size(
        mut self,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.estimate_size = Arc::new(estimate_size);
        self
    }

    pub fn with_get_item_key(
        mut self,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        self.get_item_key = Arc::new(get_item_key);
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }
}

impl<K> core::fmt::Debug for VirtualizerOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizerOptions")
            .field("count", &self.count)
            .field("overscan", &self.overscan)
            .finish_non_exhaustive()
    }
}
