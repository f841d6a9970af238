use alloc::sync::Arc;

/// Default number of extra rows materialized on each side of the visible rows.
pub const DEFAULT_ROW_OVERSCAN: usize = 2;

/// Configuration for [`crate::GridVirtualizer`].
pub struct GridOptions {
    /// Number of flat items laid out left-to-right, top-to-bottom.
    pub count: usize,
    /// Items per row. Must be greater than zero.
    pub column_count: usize,
    /// Estimated height of row `r`, used until the row is measured.
    pub estimate_row_height: Arc<dyn Fn(usize) -> u32 + Send + Sync>,
    /// Rows (not items) materialized beyond each edge of the viewport.
    pub overscan: usize,
}

impl Clone for GridOptions {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            column_count: self.column_count,
            estimate_row_height: Arc::clone(&self.estimate_row_height),
            overscan: self.overscan,
        }
    }
}

impl GridOptions {
    pub fn new(
        count: usize,
        column_count: usize,
        estimate_row_height: impl Fn(usize) -> u32 + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            column_count,
            estimate_row_height: Arc::new(estimate_row_height),
            overscan: DEFAULT_ROW_OVERSCAN,
        }
    }

    /// Options for rows of a single fixed height.
    pub fn uniform(count: usize, column_count: usize, row_height: u32) -> Self {
        Self::new(count, column_count, move |_| row_height)
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_column_count(mut self, column_count: usize) -> Self {
        self.column_count = column_count;
        self
    }
}

impl core::fmt::Debug for GridOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GridOptions")
            .field("count", &self.count)
            .field("column_count", &self.column_count)
            .field("overscan", &self.overscan)
            .finish_non_exhaustive()
    }
}
