use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::PayloadError;

/// Stable, type-erased identity of an item.
///
/// Items of different kinds can share one collection as long as their identities are drawn from
/// these variants. Two identities are equal only when both the variant and the value match, so
/// `Identity::Int(1)` and `Identity::Str("1")` never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Identity {
    Int(i64),
    Str(Arc<str>),
    Uuid(u128),
}

impl Identity {
    pub fn str(value: impl AsRef<str>) -> Self {
        Self::Str(Arc::from(value.as_ref()))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(v) => f.write_str(v),
            Self::Uuid(v) => write!(f, "{v:032x}"),
        }
    }
}

macro_rules! identity_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Identity {
                fn from(value: $ty) -> Self {
                    Self::Int(value as i64)
                }
            }
        )*
    };
}

identity_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self::Str(Arc::from(value))
    }
}

impl From<Arc<str>> for Identity {
    fn from(value: Arc<str>) -> Self {
        Self::Str(value)
    }
}

#[cfg(feature = "uuid")]
impl From<uuid::Uuid> for Identity {
    fn from(value: uuid::Uuid) -> Self {
        Self::Uuid(value.as_u128())
    }
}

/// Location of a tree node as per-level child offsets from the root.
///
/// The empty path addresses the (invisible) root itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(components: impl Into<Vec<usize>>) -> Self {
        Self(components.into())
    }

    pub fn single(offset: usize) -> Self {
        Self(alloc::vec![offset])
    }

    /// Returns the path of the `offset`-th child of this path.
    pub fn child(&self, offset: usize) -> Self {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend_from_slice(&self.0);
        components.push(offset);
        Self(components)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, head) = self.0.split_last()?;
        Some(Self(head.to_vec()))
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn components(&self) -> &[usize] {
        &self.0
    }

    /// `true` when `self` equals `other` or is an ancestor of it.
    pub fn is_prefix_of(&self, other: &IndexPath) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Encodes the path for the reserved index pasteboard type.
    ///
    /// Layout: component count as little-endian `u32`, then each component as little-endian `u64`.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.0.len() * 8);
        out.extend_from_slice(&(self.0.len() as u32).to_le_bytes());
        for &component in &self.0 {
            out.extend_from_slice(&(component as u64).to_le_bytes());
        }
        out
    }

    pub fn from_payload(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.is_empty() {
            return Err(PayloadError::Empty);
        }
        let Some((count, rest)) = bytes.split_first_chunk::<4>() else {
            return Err(PayloadError::Truncated { len: bytes.len() });
        };
        let count = u32::from_le_bytes(*count) as usize;
        if rest.len() != count.saturating_mul(8) {
            return Err(PayloadError::LengthMismatch {
                expected: count,
                actual: rest.len() / 8,
            });
        }
        let components = rest
            .chunks_exact(8)
            .enumerate()
            .map(|(index, chunk)| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                let value = u64::from_le_bytes(buf);
                usize::try_from(value)
                    .map_err(|_| PayloadError::ComponentOverflow { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(components))
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(value: Vec<usize>) -> Self {
        Self(value)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("]")
    }
}

/// Identity plus current index path of an outline item, as handed to outline handlers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeIndex {
    pub id: Identity,
    pub index_path: IndexPath,
}

impl TreeIndex {
    pub fn new(id: Identity, index_path: IndexPath) -> Self {
        Self { id, index_path }
    }
}

/// Placement relative to an existing sibling.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelativeLocation {
    After(Identity),
    Before(Identity),
}
