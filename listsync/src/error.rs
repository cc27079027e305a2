use crate::Identity;

/// Errors reported by the strict snapshot constructors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// Two items in one snapshot share an identity.
    ///
    /// `first` and `duplicate` are display positions for flat snapshots and pre-order positions
    /// for tree snapshots.
    #[error("duplicate identity `{identity}` at positions {first} and {duplicate}")]
    DuplicateIdentity {
        identity: Identity,
        first: usize,
        duplicate: usize,
    },
}

/// Errors reported while decoding the reserved index payload.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("index payload is empty")]
    Empty,
    #[error("index payload truncated ({len} bytes)")]
    Truncated { len: usize },
    #[error("index payload declares {expected} components but carries {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    /// A component does not fit the platform's `usize`.
    #[error("index payload component {index} ({value}) does not fit in usize")]
    ComponentOverflow { index: usize, value: u64 },
}
