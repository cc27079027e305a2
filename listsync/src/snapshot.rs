use alloc::vec::Vec;
use core::fmt;

use crate::key::KeyMap;
use crate::{Identity, ItemRef, RowSet, SnapshotError};

/// Ordered collection of items with `O(1)` identity lookup.
///
/// The position index is rebuilt on every mutation, so it is always exactly consistent with the
/// item order. Identities are unique: the lenient constructor keeps the first occurrence of an
/// identity and records every rejected duplicate in [`Snapshot::duplicates`].
#[derive(Clone, Default)]
pub struct Snapshot {
    items: Vec<ItemRef>,
    positions: KeyMap<Identity, usize>,
    duplicates: Vec<Identity>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot, dropping later items whose identity was already seen.
    ///
    /// Dropped duplicates are logged and reported by [`Snapshot::duplicates`].
    pub fn new(items: impl IntoIterator<Item = ItemRef>) -> Self {
        let mut out = Self::default();
        for item in items {
            let id = item.identity();
            if let Some(&_first) = out.positions.get(&id) {
                lwarn!(
                    identity = %id,
                    first = _first,
                    duplicate = out.items.len() + out.duplicates.len(),
                    "Snapshot: duplicate identity dropped"
                );
                out.duplicates.push(id);
                continue;
            }
            out.positions.insert(id, out.items.len());
            out.items.push(item);
        }
        ldebug!(
            len = out.items.len(),
            duplicates = out.duplicates.len(),
            "Snapshot::new"
        );
        out
    }

    /// Builds a snapshot, failing on the first duplicate identity.
    pub fn try_new(items: impl IntoIterator<Item = ItemRef>) -> Result<Self, SnapshotError> {
        let mut out = Self::default();
        for item in items {
            let id = item.identity();
            if let Some(&first) = out.positions.get(&id) {
                return Err(SnapshotError::DuplicateIdentity {
                    identity: id,
                    first,
                    duplicate: out.items.len(),
                });
            }
            out.positions.insert(id, out.items.len());
            out.items.push(item);
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&ItemRef> {
        self.items.get(row)
    }

    pub fn get_by_id(&self, id: &Identity) -> Option<&ItemRef> {
        self.positions.get(id).map(|&row| &self.items[row])
    }

    pub fn index_of(&self, id: &Identity) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.positions.contains_key(id)
    }

    /// Rows of the given identities; unknown identities are skipped.
    pub fn indexes_of<'a>(&self, ids: impl IntoIterator<Item = &'a Identity>) -> RowSet {
        ids.into_iter()
            .filter_map(|id| self.positions.get(id).copied())
            .collect()
    }

    /// Identities in display order.
    pub fn identifiers(&self) -> Vec<Identity> {
        self.items.iter().map(|item| item.identity()).collect()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ItemRef> {
        self.items.iter()
    }

    pub fn items(&self) -> &[ItemRef] {
        &self.items
    }

    /// Identities rejected as duplicates at construction, in encounter order.
    pub fn duplicates(&self) -> &[Identity] {
        &self.duplicates
    }

    /// Moves the items at `rows` as one block so it starts before the item that was at `to`.
    ///
    /// `to` is a pre-move row in `0..=len`; the block keeps its internal order.
    pub fn move_rows(&mut self, rows: &RowSet, to: usize) {
        if rows.is_empty() {
            return;
        }
        let to = to.min(self.items.len());
        let target = to - rows.count_below(to);

        let mut moving = Vec::with_capacity(rows.len());
        let mut kept = Vec::with_capacity(self.items.len());
        for (row, item) in self.items.drain(..).enumerate() {
            if rows.contains(row) {
                moving.push(item);
            } else {
                kept.push(item);
            }
        }
        let tail = kept.split_off(target.min(kept.len()));
        kept.extend(moving);
        kept.extend(tail);
        self.items = kept;
        self.rebuild_positions();
    }

    /// Swaps in `item` for the stored item of the same identity. Returns the row it lives at.
    ///
    /// Unknown identities are ignored.
    pub fn replace_item(&mut self, item: ItemRef) -> Option<usize> {
        let row = self.index_of(&item.identity())?;
        self.items[row] = item;
        Some(row)
    }

    fn rebuild_positions(&mut self) {
        self.positions.clear();
        for (row, item) in self.items.iter().enumerate() {
            self.positions.insert(item.identity(), row);
        }
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("identifiers", &self.identifiers())
            .field("duplicates", &self.duplicates)
            .finish()
    }
}
