use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::{MeasurementMap, StableKey};
use crate::{ItemState, MeasureOutcome};

pub(crate) type EstimateFn = Arc<dyn Fn(usize) -> u32 + Send + Sync>;
pub(crate) type KeyFn<K> = Arc<dyn Fn(usize) -> K + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Unseen,
    Estimated(u32),
    Measured(u32),
}

impl Slot {
    fn state(self) -> ItemState {
        match self {
            Self::Unseen => ItemState::Unseen,
            Self::Estimated(_) => ItemState::Estimated,
            Self::Measured(_) => ItemState::Measured,
        }
    }
}

/// Per-item extents: estimates until an item is measured, measurements afterwards.
///
/// Measurements are stored by stable key rather than by position, so that an item keeps its
/// measured size when the collection is reordered or items are inserted/removed elsewhere. The
/// positional `slots` are only a cache of "what is the effective size at index `i` right now"
/// and are resolved lazily.
#[derive(Clone)]
pub(crate) struct SizeModel<K> {
    estimate_size: EstimateFn,
    get_item_key: KeyFn<K>,
    slots: Vec<Slot>,
    measured: MeasurementMap<K>,
}

impl<K: StableKey> SizeModel<K> {
    pub(crate) fn new(len: usize, estimate_size: EstimateFn, get_item_key: KeyFn<K>) -> Self {
        Self {
            estimate_size,
            get_item_key,
            slots: alloc::vec![Slot::Unseen; len],
            measured: MeasurementMap::<K>::new(),
        }
    }

    pub(crate) fn key_for(&self, index: usize) -> K {
        (self.get_item_key)(index)
    }

    /// State of `index` without resolving it.
    ///
    /// An `Unseen` slot whose key has a cached measurement reports `Measured`: the slot was only
    /// forgotten positionally (count or key change) and resolves to that measurement on next use.
    pub(crate) fn state(&self, index: usize) -> Option<ItemState> {
        let slot = *self.slots.get(index)?;
        if slot == Slot::Unseen
            && !self.measured.is_empty()
            && self.measured.contains_key(&self.key_for(index))
        {
            return Some(ItemState::Measured);
        }
        Some(slot.state())
    }

    pub(crate) fn estimate(&mut self, index: usize) -> Option<u32> {
        (index < self.slots.len()).then(|| self.size_of(index))
    }

    /// Effective size of `index`, resolving an `Unseen` slot on first use.
    ///
    /// `index` must be in bounds.
    pub(crate) fn size_of(&mut self, index: usize) -> u32 {
        match self.slots[index] {
            Slot::Estimated(size) | Slot::Measured(size) => size,
            Slot::Unseen => {
                let (slot, size) = self.resolve(index);
                self.slots[index] = slot;
                size
            }
        }
    }

    fn resolve(&self, index: usize) -> (Slot, u32) {
        if !self.measured.is_empty() {
            let key = self.key_for(index);
            if let Some(&size) = self.measured.get(&key) {
                return (Slot::Measured(size), size);
            }
        }
        let size = (self.estimate_size)(index);
        (Slot::Estimated(size), size)
    }

    pub(crate) fn record_measurement(&mut self, index: usize, size: u32) -> MeasureOutcome {
        if index >= self.slots.len() {
            return MeasureOutcome::Ignored;
        }
        let prev = self.size_of(index);
        let key = self.key_for(index);
        self.measured.insert(key, size);
        self.slots[index] = Slot::Measured(size);
        if prev == size {
            MeasureOutcome::Unchanged
        } else {
            MeasureOutcome::Applied {
                delta: size as i64 - prev as i64,
            }
        }
    }

    /// Drops every measurement; estimates are re-derived on next use.
    pub(crate) fn reset(&mut self) {
        self.measured.clear();
        self.slots.fill(Slot::Unseen);
    }

    /// Forgets which size belongs to which position. Each index re-resolves its measurement by
    /// its current key on next use.
    pub(crate) fn sync_keys(&mut self) {
        self.slots.fill(Slot::Unseen);
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        self.slots.resize(len, Slot::Unseen);
    }

    pub(crate) fn set_estimate_size(&mut self, estimate_size: EstimateFn) {
        self.estimate_size = estimate_size;
        self.reset();
    }

    pub(crate) fn set_get_item_key(&mut self, get_item_key: KeyFn<K>) {
        self.get_item_key = get_item_key;
        self.sync_keys();
    }

    pub(crate) fn measurement_cache_len(&self) -> usize {
        self.measured.len()
    }

    pub(crate) fn for_each_cached_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.measured.iter() {
            f(k, *v);
        }
    }

    pub(crate) fn import_measurements(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.measured.clear();
        self.measured.extend(entries);
        self.sync_keys();
    }
}

impl<K> core::fmt::Debug for SizeModel<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SizeModel")
            .field("len", &self.slots.len())
            .field("cached", &self.measured.len())
            .finish_non_exhaustive()
    }
}
