#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Measured sizes indexed by stable item key.
#[cfg(feature = "std")]
pub(crate) type MeasurementMap<K> = HashMap<K, u32>;
#[cfg(not(feature = "std"))]
pub(crate) type MeasurementMap<K> = BTreeMap<K, u32>;

/// Bound for caller-supplied item keys.
///
/// With `std` the measurement cache is a `HashMap`, so keys must be `Hash + Eq`; without `std`
/// a `BTreeMap` is used and keys must be `Ord`.
#[cfg(feature = "std")]
pub trait StableKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> StableKey for K {}

#[cfg(not(feature = "std"))]
pub trait StableKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> StableKey for K {}
