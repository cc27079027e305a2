use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use crate::{DragConfiguration, Identity, RowActionEdge, RowActionStyle, Tint};

/// Shared handle to an item stored in a snapshot.
pub type ItemRef = Arc<dyn Item>;

/// Per-row presentation flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowConfiguration {
    pub selectable: bool,
    /// Row height in the scroll axis. `None` uses the widget's default height.
    pub height: Option<u32>,
    pub is_group: bool,
}

impl RowConfiguration {
    pub fn new(selectable: bool, height: Option<u32>) -> Self {
        Self {
            selectable,
            height,
            is_group: false,
        }
    }

    pub fn group(mut self, is_group: bool) -> Self {
        self.is_group = is_group;
        self
    }
}

impl Default for RowConfiguration {
    fn default() -> Self {
        Self::new(true, None)
    }
}

/// Swipe action shown at one edge of a list row. The handler receives the row it was
/// triggered on.
#[derive(Clone)]
pub struct RowAction {
    pub title: String,
    pub style: RowActionStyle,
    handler: Arc<dyn Fn(usize) + Send + Sync>,
}

impl RowAction {
    pub fn new(
        title: impl Into<String>,
        style: RowActionStyle,
        handler: impl Fn(usize) + Send + Sync + 'static,
    ) -> Self {
        Self {
            title: title.into(),
            style,
            handler: Arc::new(handler),
        }
    }

    pub fn perform(&self, row: usize) {
        (self.handler)(row);
    }
}

impl fmt::Debug for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("title", &self.title)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

/// A row model that can live in a snapshot.
///
/// Identity decides *which* row an item is; [`Item::content_equals`] decides whether a row that
/// kept its identity has to be re-rendered.
pub trait Item: Any {
    fn identity(&self) -> Identity;

    /// Compares visible content with another item of the same identity.
    ///
    /// Implementations typically downcast via [`content_eq`].
    fn content_equals(&self, other: &dyn Item) -> bool;

    fn configuration(&self) -> RowConfiguration {
        RowConfiguration::default()
    }

    fn drag_configuration(&self) -> DragConfiguration {
        DragConfiguration::default()
    }

    /// Reuse pool key for the visual cell that renders this item.
    fn reuse_identifier(&self) -> &str {
        "cell"
    }

    /// Called when the row becomes part of a user-driven selection.
    fn did_select(&self) {}

    /// Swipe actions revealed from `edge`. Empty by default.
    fn row_actions(&self, edge: RowActionEdge) -> Vec<RowAction> {
        let _ = edge;
        Vec::new()
    }

    fn tint(&self) -> Tint {
        Tint::Accent
    }

    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("identity", &self.identity())
            .finish_non_exhaustive()
    }
}

/// Content equality for items whose concrete type implements `PartialEq`.
///
/// Items of different concrete types are never content-equal.
pub fn content_eq<T: PartialEq + 'static>(this: &T, other: &dyn Item) -> bool {
    other
        .as_any()
        .downcast_ref::<T>()
        .is_some_and(|other| this == other)
}
