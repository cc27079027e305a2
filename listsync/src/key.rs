#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

#[cfg(feature = "std")]
pub type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub type KeyMap<K, V> = BTreeMap<K, V>;

#[cfg(feature = "std")]
pub type KeySet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub type KeySet<K> = BTreeSet<K>;

/// Bound for anything used as a lookup key (identities, index paths, diff elements).
///
/// With `std` this is `Hash + Eq`; without it the maps fall back to B-trees and the bound is `Ord`.
#[cfg(feature = "std")]
pub trait KeyCacheKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> KeyCacheKey for K {}

#[cfg(not(feature = "std"))]
pub trait KeyCacheKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> KeyCacheKey for K {}
