/// Configuration errors reported by [`crate::GridVirtualizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A grid needs at least one column to map flat indexes onto rows.
    #[error("grid column count must be greater than zero")]
    ZeroColumns,
}
