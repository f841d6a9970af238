use core::ops::Range;

use virtual_window::{Placement, VirtualRange, VisibleWindow};

/// Row/column position of a flat item index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridCell {
    pub row: usize,
    pub column: usize,
}

/// A materialized row: its placement along the scroll axis and the flat items it holds.
///
/// Laying `items` out across the row's width is up to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRow {
    pub row: usize,
    pub start: u64,
    pub size: u32,
    pub items: Range<usize>,
}

impl GridRow {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }

    /// Flat item index at `column` of this row, if the row has that many items.
    pub fn item_at(&self, column: usize) -> Option<usize> {
        let index = self.items.start.checked_add(column)?;
        (index < self.items.end).then_some(index)
    }
}

/// Flat items of `row`: `[row * columns, min(count, (row + 1) * columns))`.
pub(crate) fn row_items(row: usize, column_count: usize, count: usize) -> Range<usize> {
    let start = row.saturating_mul(column_count).min(count);
    let end = row
        .saturating_add(1)
        .saturating_mul(column_count)
        .min(count);
    start..end
}

/// The materialized rows returned by [`crate::GridVirtualizer::query`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridWindow {
    pub rows: VisibleWindow,
    pub column_count: usize,
    pub count: usize,
}

impl GridWindow {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_range(&self) -> VirtualRange {
        self.rows.range()
    }

    /// Flat items covered by all materialized rows.
    pub fn item_range(&self) -> Range<usize> {
        if self.rows.is_empty() {
            return 0..0;
        }
        let first = row_items(self.rows.start_index, self.column_count, self.count);
        let last = row_items(self.rows.end_index - 1, self.column_count, self.count);
        first.start..last.end
    }

    pub fn get(&self, row: usize) -> Option<GridRow> {
        self.rows.get(row).map(|p| self.to_row(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = GridRow> + '_ {
        self.rows.iter().map(|p| self.to_row(p))
    }

    fn to_row(&self, p: &Placement) -> GridRow {
        GridRow {
            row: p.index,
            start: p.start,
            size: p.size,
            items: row_items(p.index, self.column_count, self.count),
        }
    }
}
