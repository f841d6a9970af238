use alloc::vec::Vec;

/// Stable identity of an item when no custom key function is supplied (the index itself).
pub type ItemKey = u64;

/// Viewport geometry along the scroll axis, supplied fresh on every query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    /// Scroll offset from the start of the content.
    pub offset: u64,
    /// Visible length of the scroll container.
    pub extent: u32,
}

impl Viewport {
    pub fn new(offset: u64, extent: u32) -> Self {
        Self { offset, extent }
    }

    /// Offset just past the visible area (`offset + extent`, saturating).
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.extent as u64)
    }
}

/// Where a scroll-to target should land inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    /// Item start at the viewport start.
    Start,
    /// Item centered in the viewport.
    Center,
    /// Item end at the viewport end.
    End,
    /// Keep the current offset if the item is fully visible, else scroll the least distance.
    Auto,
}

/// Lifecycle of a single index in the size model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemState {
    /// Nothing is known yet; the estimator has not been consulted.
    Unseen,
    /// The estimator's value is in use.
    Estimated,
    /// A real measurement has been recorded.
    Measured,
}

/// Result of reporting a measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MeasureOutcome {
    /// The effective size changed by `delta`; offsets after the item were invalidated.
    Applied { delta: i64 },
    /// The item is now measured but its effective size did not change.
    Unchanged,
    /// The report was dropped (stale index or unusable size); previous state is retained.
    Ignored,
}

impl MeasureOutcome {
    pub fn delta(&self) -> i64 {
        match self {
            Self::Applied { delta } => *delta,
            Self::Unchanged | Self::Ignored => 0,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl VirtualRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// Inclusive last index, or `None` for an empty range.
    pub fn last_index(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.end_index - 1)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    pub fn as_range(&self) -> core::ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// Where a materialized item goes along the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub index: usize,
    /// Cumulative offset of the item's start.
    pub start: u64,
    /// Effective size (measured if known, else estimated).
    pub size: u32,
}

impl Placement {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// The materialized window returned by [`crate::Virtualizer::query`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub start_index: usize,
    pub end_index: usize, // exclusive
    /// One placement per index in `start_index..end_index`, ascending.
    pub placements: Vec<Placement>,
}

impl VisibleWindow {
    pub fn range(&self) -> VirtualRange {
        VirtualRange {
            start_index: self.start_index,
            end_index: self.end_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.range().last_index()
    }

    pub fn get(&self, index: usize) -> Option<&Placement> {
        if !self.range().contains(index) {
            return None;
        }
        self.placements.get(index - self.start_index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Placement> {
        self.placements.iter()
    }
}

impl<'a> IntoIterator for &'a VisibleWindow {
    type Item = &'a Placement;
    type IntoIter = core::slice::Iter<'a, Placement>;

    fn into_iter(self) -> Self::IntoIter {
        self.placements.iter()
    }
}
