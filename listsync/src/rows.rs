use alloc::vec::Vec;

/// Sorted, duplicate-free set of display rows (or child offsets within one parent).
///
/// Widgets take row batches in ascending order; `RowSet` keeps that invariant so callers never
/// have to sort before issuing a removal or insertion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowSet(Vec<usize>);

impl RowSet {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(row: usize) -> Self {
        Self(alloc::vec![row])
    }

    pub fn insert(&mut self, row: usize) -> bool {
        match self.0.binary_search(&row) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, row);
                true
            }
        }
    }

    pub fn remove(&mut self, row: usize) -> bool {
        match self.0.binary_search(&row) {
            Ok(pos) => {
                self.0.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, row: usize) -> bool {
        self.0.binary_search(&row).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Number of rows strictly below `row`.
    pub fn count_below(&self, row: usize) -> usize {
        self.0.partition_point(|&r| r < row)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = usize> + ExactSizeIterator + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl FromIterator<usize> for RowSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut rows: Vec<usize> = iter.into_iter().collect();
        rows.sort_unstable();
        rows.dedup();
        Self(rows)
    }
}

impl Extend<usize> for RowSet {
    fn extend<I: IntoIterator<Item = usize>>(&mut self, iter: I) {
        self.0.extend(iter);
        self.0.sort_unstable();
        self.0.dedup();
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = usize;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl From<RowSet> for Vec<usize> {
    fn from(value: RowSet) -> Self {
        value.0
    }
}
