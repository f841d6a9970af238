use core::cmp;

use crate::offset_table::OffsetTable;
use crate::{Viewport, VirtualRange};

/// Strictly visible range (no overscan) for `viewport`.
///
/// The start is the last item whose start offset is at or before `viewport.offset`; the end is
/// found by accumulating effective sizes from there until the viewport's far edge is covered. A
/// scroll offset past the end of the content clamps to the last item.
pub(crate) fn visible_range(
    table: &mut OffsetTable,
    mut size_of: impl FnMut(usize) -> u32,
    viewport: Viewport,
) -> VirtualRange {
    let count = table.len();
    if count == 0 || viewport.extent == 0 {
        return VirtualRange::EMPTY;
    }

    let Some(raw_start) = table.index_at_offset(viewport.offset, &mut size_of) else {
        return VirtualRange::EMPTY;
    };
    let view_end = viewport.end();

    let mut raw_end = raw_start;
    let mut covered = table
        .offset_of(raw_start, &mut size_of)
        .saturating_add(size_of(raw_start) as u64);
    while covered < view_end && raw_end + 1 < count {
        raw_end += 1;
        covered = covered.saturating_add(size_of(raw_end) as u64);
    }

    VirtualRange {
        start_index: raw_start,
        end_index: raw_end + 1,
    }
}

/// Widens `visible` by `overscan` items on both sides, clamped to `[0, count)`.
pub(crate) fn overscan_range(visible: VirtualRange, overscan: usize, count: usize) -> VirtualRange {
    if visible.is_empty() {
        return visible;
    }
    VirtualRange {
        start_index: visible.start_index.saturating_sub(overscan),
        end_index: cmp::min(count, visible.end_index.saturating_add(overscan)),
    }
}

/// The materialized range: the visible range plus overscan.
pub(crate) fn compute_range(
    table: &mut OffsetTable,
    size_of: impl FnMut(usize) -> u32,
    viewport: Viewport,
    overscan: usize,
) -> VirtualRange {
    let count = table.len();
    let visible = visible_range(table, size_of, viewport);
    overscan_range(visible, overscan, count)
}
