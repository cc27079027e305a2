use alloc::vec::Vec;

use listsync::{
    Animation, DragInfo, DragOperations, DragSource, FeedbackStyle, ItemRef, PasteboardItem,
    PayloadType, RowSet,
};

use crate::HandleId;

/// Identity of a widget instance, used to tell local drags from internal ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WidgetId(pub u64);

/// A visual cell the widget recycles between rows.
pub trait ReusableCell {
    fn bind(&mut self, item: &ItemRef);

    fn set_focused(&mut self, _focused: bool) {}
}

/// Capabilities shared by list and outline widgets.
///
/// Rows are display rows as the widget currently lays them out (for outlines: only expanded
/// branches contribute rows).
pub trait RowWidget {
    type Cell: ReusableCell;

    fn id(&self) -> WidgetId;

    /// Drops every row and re-queries the adapter.
    fn reload_data(&mut self);

    fn begin_updates(&mut self);
    fn end_updates(&mut self);

    fn selected_rows(&self) -> RowSet;
    /// Row under the last click, if the click landed on a row.
    fn clicked_row(&self) -> Option<usize>;
    fn select_rows(&mut self, rows: &RowSet, extend: bool);

    fn scroll_row_to_visible(&mut self, row: usize, animated: bool);

    /// The bound cell currently displayed at `row`, without creating one.
    fn visible_cell_mut(&mut self, row: usize) -> Option<&mut Self::Cell>;
    fn dequeue_reusable_cell(&mut self, reuse_identifier: &str) -> Option<Self::Cell>;
    fn make_cell(&mut self, reuse_identifier: &str, item: &ItemRef) -> Self::Cell;

    /// Replaces the set of payload types the widget accepts as a drop target.
    fn register_drag_types(&mut self, types: &[PayloadType]);
    fn set_drag_source_operations(&mut self, operations: DragOperations, local: bool);
    fn set_feedback_style(&mut self, style: FeedbackStyle);

    /// First visible row and how far the viewport is scrolled past its top edge.
    fn visible_anchor(&self) -> Option<(usize, u64)> {
        None
    }

    fn scroll_to_row_offset(&mut self, _row: usize, _offset_in_row: u64) {}
}

/// Single-column table widget.
pub trait ListWidget: RowWidget {
    fn remove_rows(&mut self, rows: &RowSet, animation: Animation);
    fn insert_rows(&mut self, rows: &RowSet, animation: Animation);
    fn move_row(&mut self, from: usize, to: usize);
    /// Retargets the current drop indicator at the whole list.
    fn redirect_drop_to_root(&mut self);
}

/// Outline (tree) widget. Items are addressed by adapter-owned handles; `None` is the root.
pub trait OutlineWidget: RowWidget {
    /// Display row of a handle, `None` while it is collapsed out of view.
    fn row_for_handle(&self, handle: HandleId) -> Option<usize>;
    fn handle_at_row(&self, row: usize) -> Option<HandleId>;

    fn remove_items(&mut self, parent: Option<HandleId>, offsets: &RowSet, animation: Animation);
    fn insert_items(&mut self, parent: Option<HandleId>, offsets: &RowSet, animation: Animation);
    fn reload_item(&mut self, item: Option<HandleId>, reload_children: bool);
    fn expand_item(&mut self, item: HandleId, expand_children: bool, animated: bool);
}

/// Drag state the widget reports to drop callbacks.
#[derive(Clone, Debug, Default)]
pub struct DraggingInfo {
    /// Widget the drag started in, `None` for drags from outside the process.
    pub origin: Option<WidgetId>,
    /// Operations the drag source allows; exactly `COPY` while the copy modifier is held.
    pub operation_mask: DragOperations,
    pub items: Vec<PasteboardItem>,
}

impl DraggingInfo {
    pub fn source_for(&self, receiver: WidgetId) -> DragSource {
        match self.origin {
            Some(origin) if origin == receiver => DragSource::Local,
            Some(_) => DragSource::Internal,
            None => DragSource::External,
        }
    }

    /// Decoded index payloads; items without a valid index are skipped.
    pub fn index_paths(&self) -> Vec<listsync::IndexPath> {
        self.items.iter().filter_map(PasteboardItem::index).collect()
    }

    /// Application payload types on the pasteboard, keyed by `source`. The reserved index type is
    /// left out.
    pub fn offered(&self, source: DragSource) -> Vec<DragInfo> {
        listsync::offered_types(&self.items)
            .into_iter()
            .filter(|ty| !ty.is_reserved())
            .map(|ty| DragInfo::new(ty, source))
            .collect()
    }

    /// Payload bytes of `ty` across every dragged item.
    pub fn payloads(&self, ty: &PayloadType) -> Vec<Vec<u8>> {
        self.items
            .iter()
            .filter_map(|item| item.data(ty).map(<[u8]>::to_vec))
            .collect()
    }
}
