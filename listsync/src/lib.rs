//! Snapshot diffing and reconciliation for list and outline widgets.
//!
//! For widget-facing adapters (batched updates, selection, drag and drop routing), see the
//! `listsync-adapter` crate.
//!
//! This crate holds the UI-agnostic part: identity-addressed snapshots, a sequence diff specialised
//! to unique identities, planners that turn two snapshots into row operations, and the drop policy
//! registry that classifies and routes drops.
//!
//! A host layer is expected to provide:
//! - items implementing [`Item`] (identity, content equality, row and drag configuration)
//! - the widget itself, driven through the adapter crate
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod diff;
mod drag;
mod drop;
mod error;
mod identity;
mod item;
mod key;
mod reconcile;
mod rows;
mod snapshot;
mod tree;
mod types;


pub use diff::{Change, Difference, Move, diff};
pub use drag::{
    DragConfiguration, DragPreview, PasteboardItem, PayloadProvider, PayloadType, offered_types,
};
pub use drop::{
    DeleteHandler, DeleteValidator, DragInfo, DropConfiguration, DropDestination, DropIndex,
    DropIntoHandler, DropIntoValidator, DropOnHandler, DropOnValidator, InsertHandler,
    InsertValidator, ListDropConfiguration, ListDropOperation, LocalDrag, OutlineDropConfiguration,
    TransferHandler, TransferValidator,
};
pub use error::{PayloadError, SnapshotError};
pub use identity::{Identity, IndexPath, RelativeLocation, TreeIndex};
pub use item::{Item, ItemRef, RowAction, RowConfiguration, content_eq};
pub use reconcile::{
    HandleChanges, ListPlan, OutlineOp, OutlinePlan, Rebind, plan_list, plan_outline,
};
pub use rows::RowSet;
pub use snapshot::Snapshot;
pub use tree::{TreeNode, TreeSnapshot};
pub use types::{
    Animation, Color, DragOperations, DragSource, DropOutcome, FeedbackStyle, RowActionEdge,
    RowActionStyle, Tint,
};

#[doc(hidden)]
pub use key::{KeyCacheKey, KeyMap, KeySet};

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing as __tracing;
