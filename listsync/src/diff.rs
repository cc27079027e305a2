use alloc::vec::Vec;

use crate::key::{KeyCacheKey, KeyMap};
use crate::RowSet;

/// One classified edit between two identity sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Change<K> {
    /// `element` left the sequence at `offset` in the old sequence.
    ///
    /// `associated_with` is the new offset when the element was re-inserted elsewhere.
    Remove {
        offset: usize,
        element: K,
        associated_with: Option<usize>,
    },
    /// `element` entered the sequence at `offset` in the new sequence.
    ///
    /// `associated_with` is the old offset when the element was removed elsewhere.
    Insert {
        offset: usize,
        element: K,
        associated_with: Option<usize>,
    },
}

impl<K> Change<K> {
    pub fn offset(&self) -> usize {
        match self {
            Self::Remove { offset, .. } | Self::Insert { offset, .. } => *offset,
        }
    }

    pub fn element(&self) -> &K {
        match self {
            Self::Remove { element, .. } | Self::Insert { element, .. } => element,
        }
    }

    pub fn associated_with(&self) -> Option<usize> {
        match self {
            Self::Remove {
                associated_with, ..
            }
            | Self::Insert {
                associated_with, ..
            } => *associated_with,
        }
    }
}

/// An element that was removed and re-inserted, i.e. an effective move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move<'a, K> {
    pub element: &'a K,
    pub from: usize,
    pub to: usize,
}

/// Result of [`diff`].
///
/// Removals are ordered by descending old offset and insertions by ascending new offset, which is
/// the order they must be applied in: removing back-to-front keeps pending old offsets valid, and
/// inserting front-to-back lands every element at its final offset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Difference<K> {
    removals: Vec<Change<K>>,
    insertions: Vec<Change<K>>,
}

impl<K> Default for Difference<K> {
    fn default() -> Self {
        Self {
            removals: Vec::new(),
            insertions: Vec::new(),
        }
    }
}

impl<K> Difference<K> {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.insertions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.removals.len() + self.insertions.len()
    }

    pub fn removals(&self) -> &[Change<K>] {
        &self.removals
    }

    pub fn insertions(&self) -> &[Change<K>] {
        &self.insertions
    }

    /// Every change, removals first.
    pub fn iter(&self) -> impl Iterator<Item = &Change<K>> {
        self.removals.iter().chain(self.insertions.iter())
    }

    pub fn removed_offsets(&self) -> RowSet {
        self.removals.iter().map(Change::offset).collect()
    }

    pub fn inserted_offsets(&self) -> RowSet {
        self.insertions.iter().map(Change::offset).collect()
    }

    /// Pairs each removal with the insertion of the same element.
    ///
    /// Moves are inferred; the removal and insertion are still reported individually.
    pub fn moves(&self) -> Vec<Move<'_, K>> {
        let mut out: Vec<Move<'_, K>> = self
            .insertions
            .iter()
            .filter_map(|change| match change {
                Change::Insert {
                    offset,
                    element,
                    associated_with: Some(from),
                } => Some(Move {
                    element,
                    from: *from,
                    to: *offset,
                }),
                _ => None,
            })
            .collect();
        out.sort_by_key(|m| m.from);
        out
    }

    /// Applies the difference to `old`, producing the new sequence.
    pub fn apply_to(&self, old: &[K]) -> Vec<K>
    where
        K: Clone,
    {
        let mut out = old.to_vec();
        for change in &self.removals {
            let offset = change.offset();
            if offset < out.len() {
                out.remove(offset);
            } else {
                debug_assert!(offset < out.len(), "Difference::apply_to: removal out of range");
            }
        }
        for change in &self.insertions {
            let offset = change.offset().min(out.len());
            out.insert(offset, change.element().clone());
        }
        out
    }
}

/// Computes the removals and insertions that turn `old` into `new`.
///
/// Both sequences must hold unique elements. Elements common to both sequences that stay in
/// the same relative order (a longest common subsequence) produce no change; every other common
/// element is reported as a removal plus an insertion.
///
/// With unique elements the LCS is the longest increasing run of new offsets taken in old order,
/// found by patience sorting in `O(n log n)`.
pub fn diff<K: KeyCacheKey + Clone>(old: &[K], new: &[K]) -> Difference<K> {
    if old.is_empty() && new.is_empty() {
        return Difference::default();
    }

    let mut new_offsets: KeyMap<&K, usize> = KeyMap::default();
    for (i, element) in new.iter().enumerate() {
        let _prev = new_offsets.insert(element, i);
        debug_assert!(_prev.is_none(), "diff: duplicate element in new sequence");
    }

    // (old offset, new offset) of every common element, in old order.
    let mut common: Vec<(usize, usize)> = Vec::new();
    let mut old_to_new: Vec<Option<usize>> = Vec::with_capacity(old.len());
    for (i, element) in old.iter().enumerate() {
        let to = new_offsets.get(element).copied();
        if let Some(to) = to {
            common.push((i, to));
        }
        old_to_new.push(to);
    }

    let kept = longest_increasing(&common);
    let mut kept_old = alloc::vec![false; old.len()];
    let mut kept_new = alloc::vec![false; new.len()];
    for &c in &kept {
        let (from, to) = common[c];
        kept_old[from] = true;
        kept_new[to] = true;
    }

    let mut new_to_old: Vec<Option<usize>> = alloc::vec![None; new.len()];
    for &(from, to) in &common {
        new_to_old[to] = Some(from);
    }

    let removals: Vec<Change<K>> = (0..old.len())
        .rev()
        .filter(|&i| !kept_old[i])
        .map(|i| Change::Remove {
            offset: i,
            element: old[i].clone(),
            associated_with: old_to_new[i],
        })
        .collect();

    let insertions: Vec<Change<K>> = (0..new.len())
        .filter(|&i| !kept_new[i])
        .map(|i| Change::Insert {
            offset: i,
            element: new[i].clone(),
            associated_with: new_to_old[i],
        })
        .collect();

    ltrace!(
        old = old.len(),
        new = new.len(),
        removals = removals.len(),
        insertions = insertions.len(),
        "diff"
    );

    Difference {
        removals,
        insertions,
    }
}

/// Indexes into `pairs` forming a longest strictly increasing run of the second component.
fn longest_increasing(pairs: &[(usize, usize)]) -> Vec<usize> {
    if pairs.is_empty() {
        return Vec::new();
    }
    // tails[k]: index of the smallest tail of an increasing run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = alloc::vec![None; pairs.len()];

    for (i, &(_, value)) in pairs.iter().enumerate() {
        let pos = tails.partition_point(|&t| pairs[t].1 < value);
        if pos > 0 {
            prev[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut out = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        out.push(i);
        cursor = prev[i];
    }
    out.reverse();
    out
}
