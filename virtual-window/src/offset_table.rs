use alloc::vec::Vec;

/// Cumulative start offsets with an explicit dirty boundary.
///
/// `offsets[i]` is the start of item `i` and `offsets[len]` is the total extent. Only the prefix
/// `offsets[..dirty_from]` is trustworthy; everything at or after `dirty_from` is stale and gets
/// recomputed on demand by walking forward from `offsets[dirty_from - 1]`. A size change at
/// index `k` can only move offsets after `k`, so invalidation never goes below `k + 1`.
///
/// The total is tracked separately and adjusted by each size delta, so it stays O(1) once known
/// even while the suffix is dirty.
#[derive(Clone, Debug)]
pub(crate) struct OffsetTable {
    offsets: Vec<u64>, // len + 1 entries, offsets[0] == 0
    dirty_from: usize, // >= 1
    total: Option<u64>,
}

impl OffsetTable {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            offsets: alloc::vec![0; len + 1],
            dirty_from: 1,
            total: if len == 0 { Some(0) } else { None },
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// First entry that may be stale (`len + 1` when the whole table is clean).
    #[cfg(test)]
    pub(crate) fn dirty_from(&self) -> usize {
        self.dirty_from
    }

    /// Marks every offset after `index` as stale, and adjusts the known total by `delta`.
    pub(crate) fn invalidate_after(&mut self, index: usize, delta: i64) {
        if index >= self.len() {
            return;
        }
        self.dirty_from = self.dirty_from.min(index + 1);
        if let Some(total) = self.total {
            self.total = Some(if delta >= 0 {
                total.saturating_add(delta as u64)
            } else {
                total.saturating_sub(delta.unsigned_abs())
            });
        }
    }

    /// Marks the whole table stale (all sizes may have changed).
    pub(crate) fn invalidate_all(&mut self) {
        self.dirty_from = 1;
        self.total = if self.len() == 0 { Some(0) } else { None };
    }

    pub(crate) fn set_len(&mut self, len: usize) {
        let cur = self.len();
        if len == cur {
            return;
        }
        self.offsets.resize(len + 1, 0);
        // Entries 0..=len stay valid on shrink; on grow, the new tail is unknown.
        self.dirty_from = self.dirty_from.min(len + 1);
        self.total = if len == 0 {
            Some(0)
        } else if self.dirty_from > len {
            Some(self.offsets[len])
        } else {
            None
        };
    }

    /// Makes `offsets[..=through]` clean, walking forward from the dirty boundary.
    pub(crate) fn ensure(&mut self, through: usize, mut size_of: impl FnMut(usize) -> u32) {
        let through = through.min(self.len());
        while self.dirty_from <= through {
            let i = self.dirty_from;
            let next = self.offsets[i - 1].saturating_add(size_of(i - 1) as u64);
            self.offsets[i] = next;
            self.dirty_from += 1;
        }
        if self.dirty_from > self.len() {
            let total = self.offsets[self.len()];
            debug_assert!(
                self.total.is_none_or(|t| t == total),
                "tracked total diverged from prefix sums (tracked={:?}, walked={total})",
                self.total
            );
            self.total = Some(total);
        }
    }

    /// Start offset of `index` (`index == len` yields the total extent).
    pub(crate) fn offset_of(&mut self, index: usize, size_of: impl FnMut(usize) -> u32) -> u64 {
        let index = index.min(self.len());
        self.ensure(index, size_of);
        self.offsets[index]
    }

    pub(crate) fn total(&mut self, size_of: impl FnMut(usize) -> u32) -> u64 {
        if let Some(total) = self.total {
            return total;
        }
        let len = self.len();
        self.ensure(len, size_of);
        self.offsets[len]
    }

    /// Largest index whose start offset is `<= target`, clamped to `len - 1`.
    ///
    /// Only extends the clean prefix as far as needed to pass `target`; the lookup itself is a
    /// binary search over the clean prefix.
    pub(crate) fn index_at_offset(
        &mut self,
        target: u64,
        mut size_of: impl FnMut(usize) -> u32,
    ) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        if self.total.is_some_and(|t| target >= t) {
            return Some(len - 1);
        }
        while self.dirty_from <= len && self.offsets[self.dirty_from - 1] <= target {
            let next = self.dirty_from;
            self.ensure(next, &mut size_of);
        }
        let clean = &self.offsets[..self.dirty_from.min(len + 1)];
        let consumed = clean.partition_point(|&start| start <= target);
        Some(consumed.saturating_sub(1).min(len - 1))
    }
}
