use std::any::Any;
use std::sync::Arc;

use listsync::{
    Animation, DragConfiguration, DragOperations, FeedbackStyle, Identity, Item, ItemRef,
    ListDropConfiguration, ListDropOperation, PayloadType, RowSet, content_eq,
};
use listsync_adapter::{
    AdapterOptions, DraggingInfo, ListAdapter, ListWidget, ReusableCell, RowWidget, WidgetId,
};

#[derive(Debug, PartialEq)]
struct Track {
    id: u32,
    title: &'static str,
}

impl Item for Track {
    fn identity(&self) -> Identity {
        Identity::from(self.id)
    }

    fn content_equals(&self, other: &dyn Item) -> bool {
        content_eq(self, other)
    }

    fn drag_configuration(&self) -> DragConfiguration {
        DragConfiguration::new(true, false, false)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn track(id: u32, title: &'static str) -> ItemRef {
    Arc::new(Track { id, title })
}

struct Label(String);

impl ReusableCell for Label {
    fn bind(&mut self, item: &ItemRef) {
        if let Some(track) = item.as_any().downcast_ref::<Track>() {
            self.0 = track.title.to_string();
        }
    }
}

/// Prints every call a real table view would receive.
#[derive(Default)]
struct PrintTable {
    selected: RowSet,
}

impl RowWidget for PrintTable {
    type Cell = Label;

    fn id(&self) -> WidgetId {
        WidgetId(1)
    }

    fn reload_data(&mut self) {
        println!("  reload_data");
    }

    fn begin_updates(&mut self) {
        println!("  begin_updates");
    }

    fn end_updates(&mut self) {
        println!("  end_updates");
    }

    fn selected_rows(&self) -> RowSet {
        self.selected.clone()
    }

    fn clicked_row(&self) -> Option<usize> {
        None
    }

    fn select_rows(&mut self, rows: &RowSet, extend: bool) {
        println!("  select_rows {rows:?} extend={extend}");
        self.selected = rows.clone();
    }

    fn scroll_row_to_visible(&mut self, row: usize, _animated: bool) {
        println!("  scroll_row_to_visible {row}");
    }

    fn visible_cell_mut(&mut self, _row: usize) -> Option<&mut Label> {
        None
    }

    fn dequeue_reusable_cell(&mut self, _reuse_identifier: &str) -> Option<Label> {
        None
    }

    fn make_cell(&mut self, _reuse_identifier: &str, _item: &ItemRef) -> Label {
        Label(String::new())
    }

    fn register_drag_types(&mut self, types: &[PayloadType]) {
        println!("  register_drag_types {types:?}");
    }

    fn set_drag_source_operations(&mut self, _operations: DragOperations, _local: bool) {}

    fn set_feedback_style(&mut self, _style: FeedbackStyle) {}
}

impl ListWidget for PrintTable {
    fn remove_rows(&mut self, rows: &RowSet, _animation: Animation) {
        println!("  remove_rows {rows:?}");
    }

    fn insert_rows(&mut self, rows: &RowSet, _animation: Animation) {
        println!("  insert_rows {rows:?}");
    }

    fn move_row(&mut self, from: usize, to: usize) {
        println!("  move_row {from} -> {to}");
    }

    fn redirect_drop_to_root(&mut self) {}
}

fn main() {
    let mut adapter = ListAdapter::new(PrintTable::default(), AdapterOptions::default());

    println!("initial load:");
    adapter.apply([track(1, "intro"), track(2, "verse"), track(3, "outro")], true);

    // Example: the selection follows identity through an animated update.
    adapter.select(&[Identity::from(3u32)]);
    println!("insert a bridge, drop the verse:");
    adapter.apply(
        [track(1, "intro"), track(4, "bridge"), track(3, "outro")],
        true,
    );

    // Example: a local reorder is mirrored at once; the handler runs on the next turn.
    adapter.set_drop_configuration(ListDropConfiguration::new().on_move(|rows, destination| {
        println!("  on_move {rows:?} -> {destination:?}");
    }));
    let dragged = adapter
        .pasteboard_writer(0)
        .into_iter()
        .collect::<Vec<_>>();
    let info = DraggingInfo {
        origin: Some(WidgetId(1)),
        operation_mask: DragOperations::ALL,
        items: dragged,
    };
    println!("drag the intro to the end:");
    let accepted = adapter.accept_drop(&info, Some(3), ListDropOperation::Above);
    println!("  accepted={accepted} pending={}", adapter.has_pending());
    adapter.run_pending();

    let order: Vec<String> = adapter
        .snapshot()
        .identifiers()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("final order: {}", order.join(", "));
}
