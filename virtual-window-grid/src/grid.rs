use alloc::sync::Arc;
use core::ops::Range;

use virtual_window::{
    Align, ItemKey, MeasureOutcome, Viewport, VirtualRange, Virtualizer, VirtualizerOptions,
};

use crate::types::row_items;
use crate::{GridCell, GridError, GridOptions, GridRow, GridWindow};

/// A row-based grid virtualizer.
///
/// A grid of `count` items in `column_count` columns is virtualized as
/// `ceil(count / column_count)` rows along the scroll axis. Rows are handled by an inner
/// [`Virtualizer`] keyed by row index; this type only does the flat-index bookkeeping.
#[derive(Clone, Debug)]
pub struct GridVirtualizer {
    options: GridOptions,
    rows: Virtualizer<ItemKey>,
}

fn row_count_for(count: usize, column_count: usize) -> usize {
    count.div_ceil(column_count)
}

impl GridVirtualizer {
    pub fn new(options: GridOptions) -> Result<Self, GridError> {
        if options.column_count == 0 {
            return Err(GridError::ZeroColumns);
        }
        let row_count = row_count_for(options.count, options.column_count);
        gdebug!(
            count = options.count,
            column_count = options.column_count,
            row_count,
            "GridVirtualizer::new"
        );
        let rows = Virtualizer::new(VirtualizerOptions {
            count: row_count,
            estimate_size: Arc::clone(&options.estimate_row_height),
            get_item_key: Arc::new(|row: usize| row as u64),
            overscan: options.overscan,
        });
        Ok(Self { options, rows })
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Read-only access to the row virtualizer.
    pub fn virtualizer(&self) -> &Virtualizer<ItemKey> {
        &self.rows
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn column_count(&self) -> usize {
        self.options.column_count
    }

    pub fn row_count(&self) -> usize {
        self.rows.count()
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        self.options.overscan = overscan;
        self.rows.set_overscan(overscan);
    }

    /// Changes the number of columns.
    ///
    /// Rows are rebuilt from scratch, so every row measurement is dropped. On error the grid is
    /// left untouched.
    pub fn set_column_count(&mut self, column_count: usize) -> Result<(), GridError> {
        if column_count == 0 {
            return Err(GridError::ZeroColumns);
        }
        if column_count == self.options.column_count {
            return Ok(());
        }
        self.options.column_count = column_count;
        let row_count = row_count_for(self.options.count, column_count);
        gdebug!(column_count, row_count, "GridVirtualizer::set_column_count");
        self.rows.reset();
        self.rows.set_count(row_count);
        Ok(())
    }

    /// Changes the number of items. Measurements of rows that still exist are kept.
    pub fn set_count(&mut self, count: usize) {
        self.options.count = count;
        self.rows
            .set_count(row_count_for(count, self.options.column_count));
    }

    /// Replaces the row height estimator and drops all row measurements.
    pub fn set_estimate_row_height(&mut self, f: impl Fn(usize) -> u32 + Send + Sync + 'static) {
        let estimate: Arc<dyn Fn(usize) -> u32 + Send + Sync> = Arc::new(f);
        self.options.estimate_row_height = Arc::clone(&estimate);
        self.rows.update_options(|o| o.estimate_size = estimate);
    }

    /// Drops all row measurements; row heights fall back to the estimator.
    pub fn reset(&mut self) {
        self.rows.reset();
    }

    pub fn cell_of(&self, index: usize) -> Option<GridCell> {
        if index >= self.options.count {
            return None;
        }
        let columns = self.options.column_count;
        Some(GridCell {
            row: index / columns,
            column: index % columns,
        })
    }

    pub fn index_of(&self, row: usize, column: usize) -> Option<usize> {
        if column >= self.options.column_count {
            return None;
        }
        let index = row
            .checked_mul(self.options.column_count)?
            .checked_add(column)?;
        (index < self.options.count).then_some(index)
    }

    /// Flat items laid out in `row`; the last row may be partial.
    pub fn row_items(&self, row: usize) -> Option<Range<usize>> {
        (row < self.row_count())
            .then(|| row_items(row, self.options.column_count, self.options.count))
    }

    pub fn report_row_measurement(&mut self, row: usize, height: u32) -> MeasureOutcome {
        self.rows.report_measurement(row, height)
    }

    pub fn report_row_measurement_f32(&mut self, row: usize, height: f32) -> MeasureOutcome {
        self.rows.report_measurement_f32(row, height)
    }

    pub fn total_extent(&mut self) -> u64 {
        self.rows.total_extent()
    }

    pub fn row_offset(&mut self, row: usize) -> Option<u64> {
        self.rows.offset_of(row)
    }

    pub fn row_at_offset(&mut self, offset: u64) -> Option<usize> {
        self.rows.index_at_offset(offset)
    }

    /// Materialized rows (visible rows plus overscan) for `viewport`.
    pub fn row_range(&mut self, viewport: Viewport) -> VirtualRange {
        self.rows.range(viewport)
    }

    pub fn query(&mut self, viewport: Viewport) -> GridWindow {
        let rows = self.rows.query(viewport);
        gtrace!(
            offset = viewport.offset,
            extent = viewport.extent,
            rows = rows.len(),
            "GridVirtualizer::query"
        );
        GridWindow {
            rows,
            column_count: self.options.column_count,
            count: self.options.count,
        }
    }

    /// Calls `f` for each materialized row without allocating.
    pub fn for_each_row(&mut self, viewport: Viewport, mut f: impl FnMut(GridRow)) {
        let columns = self.options.column_count;
        let count = self.options.count;
        self.rows.for_each_placement(viewport, |p| {
            f(GridRow {
                row: p.index,
                start: p.start,
                size: p.size,
                items: row_items(p.index, columns, count),
            })
        });
    }

    /// Scroll offset that brings the row holding flat item `index` into view.
    pub fn scroll_to_item_offset(&mut self, index: usize, align: Align, viewport: Viewport) -> u64 {
        if self.options.count == 0 {
            return 0;
        }
        let row = index.min(self.options.count - 1) / self.options.column_count;
        self.rows.scroll_to_index_offset(row, align, viewport)
    }
}
