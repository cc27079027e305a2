//! Widget adapters for the `listsync` crate.
//!
//! `listsync` plans reconciliations and routes drops without knowing about widgets. This crate
//! binds those plans to a host widget:
//!
//! - [`ListAdapter`] drives a single-column table from a flat snapshot
//! - [`OutlineAdapter`] drives an outline view from a tree snapshot, keyed by stable handles
//! - batched updates with a selection-changed guard ([`EditingFlag`])
//! - drag and drop routing, with handler calls deferred to the next event-loop turn
//! - scroll anchoring across full reloads
//!
//! The host implements [`ListWidget`] or [`OutlineWidget`] over its native control and forwards
//! the control's callbacks to the adapter.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

macro_rules! atrace {
    ($($tt:tt)*) => {
        listsync::__event!(trace, "listsync::adapter", $($tt)*)
    };
}

macro_rules! adebug {
    ($($tt:tt)*) => {
        listsync::__event!(debug, "listsync::adapter", $($tt)*)
    };
}

macro_rules! awarn {
    ($($tt:tt)*) => {
        listsync::__event!(warn, "listsync::adapter", $($tt)*)
    };
}

mod anchor;
mod handles;
mod list;
mod list_drag;
mod options;
mod outline;
mod outline_drag;
mod pending;
mod selection;
mod widget;

#[cfg(test)]
mod tests;

pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use handles::{HandleArena, HandleId};
pub use list::ListAdapter;
pub use options::AdapterOptions;
pub use outline::OutlineAdapter;
pub use pending::{Dispatch, PendingDispatches};
pub use selection::{
    EditingFlag, ListSelectHandler, OutlineSelectAction, OutlineSelectValidator,
    SelectionProvider, effective_selection,
};
pub use widget::{DraggingInfo, ListWidget, OutlineWidget, ReusableCell, RowWidget, WidgetId};
