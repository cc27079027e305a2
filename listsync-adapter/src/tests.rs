use crate::*;

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;
use std::sync::Mutex;

use listsync::{
    Animation, Color, DragConfiguration, DragOperations, DragPreview, DragSource,
    DropDestination, DropOutcome, FeedbackStyle, Identity, IndexPath, Item, ItemRef,
    ListDropConfiguration, ListDropOperation, OutlineDropConfiguration, PasteboardItem,
    PayloadType, RowAction, RowActionEdge, RowActionStyle, RowConfiguration, RowSet, Tint,
    TreeIndex, TreeNode, content_eq,
};

const TEXT: PayloadType = PayloadType::from_static("public.text");
const URL: PayloadType = PayloadType::from_static("public.url");

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: u64) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Row {
    id: i64,
    label: &'static str,
    reorderable: bool,
    deletable: bool,
    copyable: bool,
    text: bool,
    preview: bool,
}

impl Row {
    fn new(id: i64, label: &'static str) -> Self {
        Self {
            id,
            label,
            reorderable: true,
            deletable: false,
            copyable: false,
            text: false,
            preview: false,
        }
    }

    fn fixed(mut self) -> Self {
        self.reorderable = false;
        self
    }

    fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }

    fn copyable(mut self) -> Self {
        self.copyable = true;
        self
    }

    fn with_text(mut self) -> Self {
        self.text = true;
        self
    }

    fn with_preview(mut self) -> Self {
        self.preview = true;
        self
    }

    fn item(self) -> ItemRef {
        Arc::new(self)
    }
}

impl Item for Row {
    fn identity(&self) -> Identity {
        Identity::Int(self.id)
    }

    fn content_equals(&self, other: &dyn Item) -> bool {
        content_eq(self, other)
    }

    fn configuration(&self) -> RowConfiguration {
        RowConfiguration::new(true, Some(20 + self.id as u32))
    }

    fn drag_configuration(&self) -> DragConfiguration {
        let mut configuration =
            DragConfiguration::new(self.reorderable, self.deletable, self.copyable);
        if self.text {
            let label = self.label;
            configuration = configuration.on_drag(TEXT, move || label.as_bytes().to_vec());
        }
        if self.preview {
            configuration = configuration.with_preview(DragPreview {
                width: 4,
                height: 2,
                bytes: Arc::from(vec![0u8; 8]),
            });
        }
        configuration
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn rows(values: &[(i64, &'static str)]) -> Vec<ItemRef> {
    values
        .iter()
        .map(|&(id, label)| Row::new(id, label).item())
        .collect()
}

fn ids(values: &[i64]) -> Vec<Identity> {
    values.iter().map(|&v| Identity::Int(v)).collect()
}

fn id(value: i64) -> Identity {
    Identity::Int(value)
}

fn leaf(id: i64) -> TreeNode {
    TreeNode::leaf(Row::new(id, "leaf").item())
}

fn branch(id: i64, children: Vec<TreeNode>) -> TreeNode {
    TreeNode::with_children(Row::new(id, "branch").item(), children)
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Event {
    Reload,
    Begin,
    End,
    Remove(Vec<usize>),
    Insert(Vec<usize>),
    Move(usize, usize),
    /// Rows, extend, editing flag while selecting.
    Select(Vec<usize>, bool, bool),
    ScrollTo(usize),
    ScrollOffset(usize, u64),
    RedirectRoot,
    RemoveItems(Option<HandleId>, Vec<usize>),
    InsertItems(Option<HandleId>, Vec<usize>),
    ReloadItem(Option<HandleId>, bool),
    Expand(HandleId, bool),
}

#[derive(Clone, Debug, Default)]
struct MockCell {
    label: Option<&'static str>,
    binds: usize,
    focused: bool,
}

impl ReusableCell for MockCell {
    fn bind(&mut self, item: &ItemRef) {
        self.label = item.as_any().downcast_ref::<Row>().map(|row| row.label);
        self.binds += 1;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

/// Records every mutation; implements both widget shapes.
#[derive(Debug, Default)]
struct MockWidget {
    id: u64,
    events: Vec<Event>,
    selected: RowSet,
    clicked: Option<usize>,
    cells: HashMap<usize, MockCell>,
    pool: Vec<MockCell>,
    made: usize,
    registered: Vec<PayloadType>,
    source_operations: Option<(DragOperations, bool)>,
    feedback: FeedbackStyle,
    anchor: Option<(usize, u64)>,
    editing: Option<EditingFlag>,
    /// Outline layout: the handle shown at each display row.
    layout: Vec<HandleId>,
}

impl MockWidget {
    fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn is_editing(&self) -> bool {
        self.editing.as_ref().is_some_and(EditingFlag::is_set)
    }

    fn show_cells(&mut self, count: usize) {
        self.cells = (0..count).map(|row| (row, MockCell::default())).collect();
    }
}

impl RowWidget for MockWidget {
    type Cell = MockCell;

    fn id(&self) -> WidgetId {
        WidgetId(self.id)
    }

    fn reload_data(&mut self) {
        self.events.push(Event::Reload);
    }

    fn begin_updates(&mut self) {
        self.events.push(Event::Begin);
    }

    fn end_updates(&mut self) {
        self.events.push(Event::End);
    }

    fn selected_rows(&self) -> RowSet {
        self.selected.clone()
    }

    fn clicked_row(&self) -> Option<usize> {
        self.clicked
    }

    fn select_rows(&mut self, rows: &RowSet, extend: bool) {
        let editing = self.is_editing();
        self.events
            .push(Event::Select(rows.as_slice().to_vec(), extend, editing));
        if extend {
            self.selected.extend(rows.iter());
        } else {
            self.selected = rows.clone();
        }
    }

    fn scroll_row_to_visible(&mut self, row: usize, _animated: bool) {
        self.events.push(Event::ScrollTo(row));
    }

    fn visible_cell_mut(&mut self, row: usize) -> Option<&mut MockCell> {
        self.cells.get_mut(&row)
    }

    fn dequeue_reusable_cell(&mut self, reuse_identifier: &str) -> Option<MockCell> {
        assert_eq!(reuse_identifier, "cell");
        self.pool.pop()
    }

    fn make_cell(&mut self, _reuse_identifier: &str, _item: &ItemRef) -> MockCell {
        self.made += 1;
        MockCell::default()
    }

    fn register_drag_types(&mut self, types: &[PayloadType]) {
        self.registered = types.to_vec();
    }

    fn set_drag_source_operations(&mut self, operations: DragOperations, local: bool) {
        self.source_operations = Some((operations, local));
    }

    fn set_feedback_style(&mut self, style: FeedbackStyle) {
        self.feedback = style;
    }

    fn visible_anchor(&self) -> Option<(usize, u64)> {
        self.anchor
    }

    fn scroll_to_row_offset(&mut self, row: usize, offset_in_row: u64) {
        self.events.push(Event::ScrollOffset(row, offset_in_row));
    }
}

impl ListWidget for MockWidget {
    fn remove_rows(&mut self, rows: &RowSet, animation: Animation) {
        assert_eq!(animation, Animation::FADE | Animation::SLIDE_DOWN);
        self.events.push(Event::Remove(rows.as_slice().to_vec()));
    }

    fn insert_rows(&mut self, rows: &RowSet, animation: Animation) {
        assert_eq!(animation, Animation::FADE | Animation::SLIDE_LEFT);
        self.events.push(Event::Insert(rows.as_slice().to_vec()));
    }

    fn move_row(&mut self, from: usize, to: usize) {
        self.events.push(Event::Move(from, to));
    }

    fn redirect_drop_to_root(&mut self) {
        self.events.push(Event::RedirectRoot);
    }
}

impl OutlineWidget for MockWidget {
    fn row_for_handle(&self, handle: HandleId) -> Option<usize> {
        self.layout.iter().position(|&shown| shown == handle)
    }

    fn handle_at_row(&self, row: usize) -> Option<HandleId> {
        self.layout.get(row).copied()
    }

    fn remove_items(&mut self, parent: Option<HandleId>, offsets: &RowSet, _animation: Animation) {
        self.events
            .push(Event::RemoveItems(parent, offsets.as_slice().to_vec()));
    }

    fn insert_items(&mut self, parent: Option<HandleId>, offsets: &RowSet, _animation: Animation) {
        self.events
            .push(Event::InsertItems(parent, offsets.as_slice().to_vec()));
    }

    fn reload_item(&mut self, item: Option<HandleId>, reload_children: bool) {
        self.events.push(Event::ReloadItem(item, reload_children));
    }

    fn expand_item(&mut self, item: HandleId, expand_children: bool, _animated: bool) {
        self.events.push(Event::Expand(item, expand_children));
    }
}

fn list_adapter(values: &[(i64, &'static str)]) -> ListAdapter<MockWidget> {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    let flag = adapter.editing_flag();
    adapter.widget_mut().editing = Some(flag);
    adapter.apply(rows(values), false);
    adapter.widget_mut().events.clear();
    adapter
}

fn list_ids(adapter: &ListAdapter<MockWidget>) -> Vec<Identity> {
    adapter.snapshot().identifiers()
}

fn local_drag(items: Vec<PasteboardItem>, operation_mask: DragOperations) -> DraggingInfo {
    DraggingInfo {
        origin: Some(WidgetId(1)),
        operation_mask,
        items,
    }
}

fn text_drag(origin: Option<WidgetId>, payloads: &[&[u8]]) -> DraggingInfo {
    let items = payloads
        .iter()
        .map(|bytes| {
            let mut item = PasteboardItem::new();
            item.set_data(TEXT, bytes.to_vec());
            item
        })
        .collect();
    DraggingInfo {
        origin,
        operation_mask: DragOperations::COPY,
        items,
    }
}

// ---------------------------------------------------------------------------------------------
// ListAdapter: reconciliation
// ---------------------------------------------------------------------------------------------

#[test]
fn list_binds_to_widget_on_creation() {
    let adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    assert_eq!(adapter.widget().registered, vec![PayloadType::INDEX]);
    assert_eq!(
        adapter.widget().source_operations,
        Some((DragOperations::COPY | DragOperations::DELETE, false))
    );
    assert_eq!(adapter.row_count(), 0);
}

#[test]
fn list_content_update_rebinds_without_structural_changes() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c")]);
    adapter.widget_mut().show_cells(3);

    adapter.apply(rows(&[(1, "a"), (2, "B"), (3, "c")]), true);

    assert_eq!(
        adapter.widget().events,
        vec![Event::Begin, Event::End, Event::Select(vec![], false, true)]
    );
    let cells = &adapter.widget().cells;
    assert_eq!(cells[&0].binds, 0);
    assert_eq!(cells[&1].binds, 1);
    assert_eq!(cells[&1].label, Some("B"));
    assert_eq!(cells[&2].binds, 0);
}

#[test]
fn list_insert_and_remove_only_touch_changed_rows() {
    // A=1, B=2, C=3, D=4
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c")]);

    adapter.apply(rows(&[(1, "a"), (3, "c"), (4, "d")]), true);

    assert_eq!(
        adapter.widget().events,
        vec![
            Event::Begin,
            Event::Remove(vec![1]),
            Event::Insert(vec![2]),
            Event::End,
            Event::Select(vec![], false, true),
        ]
    );
    assert_eq!(list_ids(&adapter), ids(&[1, 3, 4]));
    assert!(!adapter.is_editing());
}

#[test]
fn list_restores_selection_by_identity_under_the_guard() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c")]);
    adapter.widget_mut().selected = [0usize, 2].into_iter().collect();

    adapter.apply(rows(&[(0, "z"), (3, "c"), (4, "d"), (1, "a")]), true);

    let last = adapter.widget().events.last().cloned();
    assert_eq!(last, Some(Event::Select(vec![1, 3], false, true)));
    assert!(!adapter.editing_flag().is_set());
}

#[test]
fn list_full_reload_skips_selection_restore_by_default() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);
    adapter.widget_mut().selected = RowSet::single(1);

    adapter.apply(rows(&[(2, "b"), (3, "c")]), false);
    assert_eq!(adapter.widget().events, vec![Event::Reload]);

    // An empty side forces a reload even when animating.
    adapter.widget_mut().events.clear();
    adapter.apply(Vec::new(), true);
    assert_eq!(adapter.widget().events, vec![Event::Reload]);
    assert_eq!(adapter.row_count(), 0);
}

#[test]
fn list_full_reload_can_restore_selection() {
    let options = AdapterOptions::new().with_restore_selection_on_reload(true);
    let mut adapter = ListAdapter::new(MockWidget::new(1), options);
    adapter.apply(rows(&[(1, "a"), (2, "b")]), false);
    adapter.widget_mut().selected = RowSet::single(1);
    adapter.widget_mut().events.clear();

    adapter.apply(rows(&[(2, "b"), (3, "c")]), false);

    assert_eq!(
        adapter.widget().events,
        vec![Event::Reload, Event::Select(vec![0], false, false)]
    );
}

#[test]
fn list_full_reload_keeps_the_first_visible_row_anchored() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c")]);
    adapter.widget_mut().anchor = Some((1, 7));

    // Prepend two rows: the anchored row (id 2) moves from row 1 to row 3.
    adapter.apply(rows(&[(8, "x"), (9, "y"), (1, "a"), (2, "b"), (3, "c")]), false);

    assert_eq!(
        adapter.widget().events,
        vec![Event::Reload, Event::ScrollOffset(3, 7)]
    );
}

#[test]
fn list_anchor_is_skipped_when_disabled_or_gone() {
    let options = AdapterOptions::new().with_preserve_scroll_on_reload(false);
    let mut adapter = ListAdapter::new(MockWidget::new(1), options);
    adapter.apply(rows(&[(1, "a"), (2, "b")]), false);
    adapter.widget_mut().anchor = Some((0, 3));
    adapter.widget_mut().events.clear();
    adapter.apply(rows(&[(0, "z"), (1, "a")]), false);
    assert_eq!(adapter.widget().events, vec![Event::Reload]);

    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);
    adapter.widget_mut().anchor = Some((0, 3));
    adapter.apply(rows(&[(2, "b")]), false);
    assert_eq!(adapter.widget().events, vec![Event::Reload]);
}

#[test]
fn list_randomized_updates_keep_snapshot_and_rows_in_step() {
    let mut rng = Lcg(0x5eed);
    let mut adapter = list_adapter(&[(0, "a")]);
    let mut rendered: Vec<i64> = vec![0];
    for _ in 0..200 {
        let mut values: Vec<i64> = (0..12).filter(|_| rng.below(3) != 0).collect();
        for i in (1..values.len()).rev() {
            let j = rng.below(i as u64 + 1) as usize;
            values.swap(i, j);
        }
        let items: Vec<(i64, &'static str)> = values.iter().map(|&v| (v, "row")).collect();
        adapter.widget_mut().events.clear();
        adapter.apply(rows(&items), true);

        if rendered.is_empty() || values.is_empty() {
            rendered = values.clone();
        } else {
            for event in &adapter.widget().events {
                match event {
                    Event::Remove(removed) => {
                        for &row in removed.iter().rev() {
                            rendered.remove(row);
                        }
                    }
                    Event::Insert(inserted) => {
                        for &row in inserted {
                            rendered.insert(row, values[row]);
                        }
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(rendered, values);
        assert_eq!(list_ids(&adapter), ids(&values));
    }
}

// ---------------------------------------------------------------------------------------------
// ListAdapter: widget queries
// ---------------------------------------------------------------------------------------------

#[test]
fn list_cells_are_recycled_and_bound() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);

    let cell = adapter.cell_for_row(0).expect("row 0 exists");
    assert_eq!(cell.label, Some("a"));
    assert_eq!(adapter.widget().made, 1);

    adapter.widget_mut().pool.push(cell);
    let cell = adapter.cell_for_row(1).expect("row 1 exists");
    assert_eq!(cell.label, Some("b"));
    assert_eq!(cell.binds, 2);
    assert_eq!(adapter.widget().made, 1);

    assert_eq!(adapter.row_height(1), Some(22));
    assert!(adapter.should_select_row(0));
    assert!(!adapter.is_group_row(0));
    assert_eq!(adapter.row_height(9), None);
}

#[test]
fn list_selection_notifications_are_suppressed_while_editing() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);
    let calls = Arc::new(Mutex::new(Vec::<Vec<usize>>::new()));
    let seen = calls.clone();
    adapter.on_select(move |rows| seen.lock().unwrap().push(rows.as_slice().to_vec()));

    adapter.widget_mut().selected = RowSet::single(1);
    adapter.selection_did_change();
    adapter.editing.set(true);
    adapter.selection_did_change();
    adapter.editing.set(false);

    assert_eq!(*calls.lock().unwrap(), vec![vec![1]]);
}

#[test]
fn list_selected_identities_follow_the_clicked_row() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c")]);
    adapter.widget_mut().selected = [1usize, 2].into_iter().collect();

    assert_eq!(adapter.selected_identities(), ids(&[2, 3]));

    adapter.widget_mut().clicked = Some(2);
    assert_eq!(adapter.selected_identities(), ids(&[2, 3]));

    adapter.widget_mut().clicked = Some(0);
    assert_eq!(adapter.selected_identities(), ids(&[1]));
}

#[test]
fn list_navigation_ignores_absent_identities() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c")]);
    adapter.widget_mut().show_cells(3);

    adapter.scroll_to(&id(99), true);
    adapter.set_focus(&id(99));
    assert!(adapter.widget().events.is_empty());
    assert!(adapter.widget().cells.values().all(|cell| !cell.focused));

    adapter.scroll_to(&id(3), false);
    adapter.select(&[id(2), id(99)]);
    adapter.set_focus(&id(2));
    assert_eq!(
        adapter.widget().events,
        vec![Event::ScrollTo(2), Event::Select(vec![1], false, false)]
    );
    let cells = &adapter.widget().cells;
    assert!(cells[&1].focused);
    assert!(!cells[&0].focused && !cells[&2].focused);
}

#[test]
fn list_force_update_rebinds_one_cell() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);
    adapter.widget_mut().show_cells(2);

    adapter.force_update(Row::new(2, "b2").item());
    adapter.force_update(Row::new(7, "nope").item());

    assert_eq!(adapter.widget().cells[&1].label, Some("b2"));
    assert_eq!(adapter.widget().cells[&0].binds, 0);
    assert!(adapter.widget().events.is_empty());
    assert_eq!(list_ids(&adapter), ids(&[1, 2]));
}

// ---------------------------------------------------------------------------------------------
// ListAdapter: drag and drop
// ---------------------------------------------------------------------------------------------

#[test]
fn list_pasteboard_writer_adds_the_index_for_structural_rows() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.apply(
        vec![
            Row::new(1, "a").item(),
            Row::new(2, "b").fixed().item(),
            Row::new(3, "c").fixed().with_text().item(),
        ],
        false,
    );

    let first = adapter.pasteboard_writer(0).expect("reorderable row");
    assert_eq!(first.index(), Some(IndexPath::single(0)));

    assert!(adapter.pasteboard_writer(1).is_none());

    let third = adapter.pasteboard_writer(2).expect("row with a payload");
    assert_eq!(third.index(), None);
    assert_eq!(third.data(&TEXT), Some(&b"c"[..]));
}

#[test]
fn list_set_drop_configuration_registers_types() {
    let mut adapter = list_adapter(&[(1, "a")]);
    adapter.set_drop_configuration(
        ListDropConfiguration::new()
            .on_drop(TEXT, DragSource::External, |_| {})
            .on_insert(URL, DragSource::Internal, |_, _, _| {})
            .on_insert(TEXT, DragSource::Internal, |_, _, _| {}),
    );
    assert_eq!(
        adapter.widget().registered,
        vec![TEXT, URL, PayloadType::INDEX]
    );
}

#[test]
fn list_local_reorder_is_mirrored_then_dispatched_next_turn() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    let moves = Arc::new(Mutex::new(Vec::new()));
    let seen = moves.clone();
    adapter.set_drop_configuration(ListDropConfiguration::new().on_move(move |rows, dest| {
        seen.lock().unwrap().push((rows.to_vec(), dest.clone()));
    }));

    let items = vec![adapter.pasteboard_writer(0).expect("row 0")];
    let info = local_drag(items, DragOperations::ALL);
    assert_eq!(
        adapter.validate_drop(&info, Some(3), ListDropOperation::Above),
        DropOutcome::Move
    );

    assert!(adapter.accept_drop(&info, Some(3), ListDropOperation::Above));
    assert_eq!(
        adapter.widget().events,
        vec![Event::Begin, Event::Move(0, 2), Event::End]
    );
    assert_eq!(list_ids(&adapter), ids(&[2, 3, 1, 4]));
    assert!(moves.lock().unwrap().is_empty());
    assert!(adapter.has_pending());

    assert_eq!(adapter.run_pending(), 1);
    assert_eq!(
        *moves.lock().unwrap(),
        vec![(
            vec![0usize],
            DropDestination::Insert {
                parent: None,
                offset: 3,
            }
        )]
    );
    assert!(!adapter.has_pending());
}

#[test]
fn list_multi_row_reorder_matches_snapshot_move() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")]);
    adapter.set_drop_configuration(ListDropConfiguration::new().on_move(|_, _| {}));

    let items = vec![
        adapter.pasteboard_writer(0).expect("row 0"),
        adapter.pasteboard_writer(3).expect("row 3"),
    ];
    let info = local_drag(items, DragOperations::ALL);
    assert!(adapter.accept_drop(&info, Some(2), ListDropOperation::Above));

    assert_eq!(
        adapter.widget().events,
        vec![Event::Begin, Event::Move(0, 1), Event::Move(3, 2), Event::End]
    );
    assert_eq!(list_ids(&adapter), ids(&[2, 1, 4, 3, 5]));
}

#[test]
fn list_reorder_of_every_row_is_rejected() {
    for n in 1..6usize {
        let values: Vec<(i64, &'static str)> = (0..n as i64).map(|v| (v, "row")).collect();
        let mut adapter = list_adapter(&values);
        adapter.set_drop_configuration(ListDropConfiguration::new().on_move(|_, _| {}));

        let items: Vec<PasteboardItem> = (0..n)
            .map(|row| adapter.pasteboard_writer(row).expect("row"))
            .collect();
        let info = local_drag(items, DragOperations::ALL);
        for to in 0..=n {
            assert_eq!(
                adapter.validate_drop(&info, Some(to), ListDropOperation::Above),
                DropOutcome::None
            );
            assert!(!adapter.accept_drop(&info, Some(to), ListDropOperation::Above));
        }
        assert!(!adapter.has_pending());
    }
}

#[test]
fn list_reorder_needs_a_move_handler_and_reorderable_rows() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.apply(
        vec![
            Row::new(1, "a").item(),
            Row::new(2, "b").fixed().copyable().item(),
            Row::new(3, "c").item(),
        ],
        false,
    );
    let movable = local_drag(vec![adapter.pasteboard_writer(0).expect("row 0")], DragOperations::ALL);
    assert_eq!(
        adapter.validate_drop(&movable, Some(2), ListDropOperation::Above),
        DropOutcome::None
    );

    adapter.set_drop_configuration(ListDropConfiguration::new().on_move(|_, _| {}));
    assert_eq!(
        adapter.validate_drop(&movable, Some(2), ListDropOperation::Above),
        DropOutcome::Move
    );

    let fixed = local_drag(vec![adapter.pasteboard_writer(1).expect("row 1")], DragOperations::ALL);
    assert_eq!(
        adapter.validate_drop(&fixed, Some(0), ListDropOperation::Above),
        DropOutcome::None
    );
}

#[test]
fn list_forced_copy_needs_a_copy_handler_and_copyable_rows() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.apply(
        vec![
            Row::new(1, "a").copyable().item(),
            Row::new(2, "b").item(),
            Row::new(3, "c").item(),
        ],
        false,
    );
    adapter.widget_mut().events.clear();
    let copies = Arc::new(Mutex::new(Vec::new()));

    let copyable = local_drag(vec![adapter.pasteboard_writer(0).expect("row 0")], DragOperations::COPY);
    let plain = local_drag(vec![adapter.pasteboard_writer(1).expect("row 1")], DragOperations::COPY);

    adapter.set_drop_configuration(ListDropConfiguration::new().on_move(|_, _| {}));
    assert_eq!(
        adapter.validate_drop(&copyable, Some(3), ListDropOperation::Above),
        DropOutcome::None
    );

    let seen = copies.clone();
    adapter.set_drop_configuration(ListDropConfiguration::new().on_copy(move |rows, dest| {
        seen.lock().unwrap().push((rows.to_vec(), dest.clone()));
    }));
    assert_eq!(
        adapter.validate_drop(&plain, Some(3), ListDropOperation::Above),
        DropOutcome::None
    );
    assert!(adapter.accept_drop(&copyable, Some(3), ListDropOperation::Above));
    assert!(adapter.widget().events.is_empty());
    assert_eq!(list_ids(&adapter), ids(&[1, 2, 3]));
    assert!(copies.lock().unwrap().is_empty());

    assert_eq!(adapter.run_pending(), 1);
    assert_eq!(
        *copies.lock().unwrap(),
        vec![(
            vec![0usize],
            DropDestination::Insert {
                parent: None,
                offset: 3,
            }
        )]
    );
}

#[test]
fn list_foreign_insert_is_deferred_until_run_pending() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);
    let inserted = Arc::new(Mutex::new(Vec::new()));
    let seen = inserted.clone();
    adapter.set_drop_configuration(ListDropConfiguration::new().on_insert(
        TEXT,
        DragSource::External,
        move |parent: Option<&usize>, offset, data: &[Vec<u8>]| {
            seen.lock()
                .unwrap()
                .push((parent.copied(), offset, data.to_vec()));
        },
    ));

    let external = text_drag(None, &[b"hello"]);
    assert_eq!(
        adapter.validate_drop(&external, Some(1), ListDropOperation::Above),
        DropOutcome::Copy
    );
    assert!(adapter.accept_drop(&external, Some(1), ListDropOperation::Above));
    assert!(inserted.lock().unwrap().is_empty());

    assert_eq!(adapter.run_pending(), 1);
    assert_eq!(
        *inserted.lock().unwrap(),
        vec![(None, 1usize, vec![b"hello".to_vec()])]
    );

    // Registered for external drags only.
    let internal = text_drag(Some(WidgetId(2)), &[b"hello"]);
    assert_eq!(
        adapter.validate_drop(&internal, Some(1), ListDropOperation::Above),
        DropOutcome::None
    );
    assert!(!adapter.accept_drop(&internal, Some(1), ListDropOperation::Above));
    assert_eq!(adapter.run_pending(), 0);
}

#[test]
fn list_drop_outside_rows_goes_to_the_root_handler() {
    let mut adapter = list_adapter(&[(1, "a"), (2, "b")]);
    let dropped = Arc::new(AtomicUsize::new(0));
    let into = Arc::new(AtomicUsize::new(0));
    let (seen_drop, seen_into) = (dropped.clone(), into.clone());
    adapter.set_drop_configuration(
        ListDropConfiguration::new()
            .on_drop(TEXT, DragSource::External, move |_| {
                seen_drop.fetch_add(1, Ordering::SeqCst);
            })
            .on_drop_into(TEXT, DragSource::External, move |row, _| {
                assert_eq!(*row, 0);
                seen_into.fetch_add(1, Ordering::SeqCst);
            }),
    );
    let info = text_drag(None, &[b"x"]);

    assert!(adapter.accept_drop(&info, None, ListDropOperation::On));
    assert!(adapter.accept_drop(&info, Some(0), ListDropOperation::On));
    assert_eq!(adapter.run_pending(), 2);
    assert_eq!(dropped.load(Ordering::SeqCst), 1);
    assert_eq!(into.load(Ordering::SeqCst), 1);
}

#[test]
fn list_drop_into_an_empty_list_is_redirected_to_the_root() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.set_drop_configuration(
        ListDropConfiguration::new().on_drop(TEXT, DragSource::External, |_| {}),
    );

    let info = text_drag(None, &[b"x"]);
    assert_eq!(
        adapter.validate_drop(&info, Some(0), ListDropOperation::Above),
        DropOutcome::Copy
    );
    assert_eq!(adapter.widget().events, vec![Event::RedirectRoot]);
}

#[test]
fn list_payload_drop_dispatches_every_offered_type_in_order() {
    let mut adapter = list_adapter(&[(1, "a")]);
    let order = Arc::new(Mutex::new(Vec::new()));
    let (text_seen, url_seen) = (order.clone(), order.clone());
    adapter.set_drop_configuration(
        ListDropConfiguration::new()
            .on_drop(URL, DragSource::External, move |_| {
                url_seen.lock().unwrap().push("url");
            })
            .on_drop(TEXT, DragSource::External, move |_| {
                text_seen.lock().unwrap().push("text");
            }),
    );

    let mut item = PasteboardItem::new();
    item.set_data(TEXT, b"t".to_vec());
    item.set_data(URL, b"u".to_vec());
    let info = DraggingInfo {
        origin: None,
        operation_mask: DragOperations::COPY,
        items: vec![item],
    };
    assert!(adapter.accept_drop(&info, None, ListDropOperation::On));
    assert_eq!(adapter.run_pending(), 2);
    assert_eq!(*order.lock().unwrap(), vec!["text", "url"]);
}

#[test]
fn list_delete_runs_synchronously_at_session_end() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.apply(
        vec![
            Row::new(1, "a").deletable().item(),
            Row::new(2, "b").deletable().item(),
            Row::new(3, "c").deletable().item(),
        ],
        false,
    );
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let seen = deleted.clone();
    adapter.set_drop_configuration(
        ListDropConfiguration::new()
            .on_delete(move |rows| seen.lock().unwrap().push(rows.to_vec())),
    );
    let items = vec![
        adapter.pasteboard_writer(2).expect("row 2"),
        adapter.pasteboard_writer(0).expect("row 0"),
    ];

    assert!(!adapter.dragging_session_ended(&items, DragOperations::MOVE));
    assert!(adapter.dragging_session_ended(&items, DragOperations::DELETE));
    assert_eq!(*deleted.lock().unwrap(), vec![vec![0usize, 2]]);
    assert!(!adapter.has_pending());

    // Malformed index payloads are skipped.
    let mut broken = PasteboardItem::new();
    broken.set_data(PayloadType::INDEX, vec![1, 2, 3]);
    assert!(!adapter.dragging_session_ended(&[broken], DragOperations::DELETE));
}

#[test]
fn list_drag_session_sets_feedback_style_and_collects_previews() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.apply(
        vec![
            Row::new(1, "a").with_preview().item(),
            Row::new(2, "b").item(),
        ],
        false,
    );
    let first = adapter.pasteboard_writer(0).expect("row 0");
    let second = adapter.pasteboard_writer(1).expect("row 1");

    let previews = adapter.dragging_session_will_begin(core::slice::from_ref(&first));
    assert_eq!(adapter.widget().feedback, FeedbackStyle::Gap);
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].0, 0);
    assert_eq!(previews[0].1.width, 4);

    let previews = adapter.dragging_session_will_begin(&[first.clone(), second]);
    assert_eq!(adapter.widget().feedback, FeedbackStyle::Regular);
    assert_eq!(previews.len(), 1);

    adapter.dragging_session_will_begin(core::slice::from_ref(&first));
    adapter.dragging_session_ended(&[first], DragOperations::MOVE);
    assert_eq!(adapter.widget().feedback, FeedbackStyle::Regular);
}

// ---------------------------------------------------------------------------------------------
// OutlineAdapter
// ---------------------------------------------------------------------------------------------

/// Shows every item as if the whole tree was expanded.
fn lay_out(adapter: &mut OutlineAdapter<MockWidget>) {
    let layout: Vec<HandleId> = adapter
        .snapshot()
        .preorder()
        .iter()
        .filter_map(|id| adapter.handle_for(id))
        .collect();
    adapter.widget_mut().layout = layout;
}

fn outline_adapter(roots: &[TreeNode]) -> OutlineAdapter<MockWidget> {
    let mut adapter = OutlineAdapter::new(MockWidget::new(1), AdapterOptions::default());
    let flag = adapter.editing_flag();
    adapter.widget_mut().editing = Some(flag);
    adapter.apply(roots, false);
    lay_out(&mut adapter);
    adapter.widget_mut().events.clear();
    adapter
}

fn handle(adapter: &OutlineAdapter<MockWidget>, value: i64) -> HandleId {
    adapter.handle_for(&id(value)).expect("identity has a handle")
}

fn tree_index(adapter: &OutlineAdapter<MockWidget>, value: i64) -> TreeIndex {
    adapter.snapshot().index(&id(value)).expect("identity is in the tree")
}

#[test]
fn outline_partial_update_reloads_parent_and_keeps_handles() {
    // R=1 with children X=2, Y=3; Z=4 is appended under R.
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)])]);
    let (r, x, y) = (handle(&adapter, 1), handle(&adapter, 2), handle(&adapter, 3));

    adapter.apply(&[branch(1, vec![leaf(2), leaf(3), leaf(4)])], true);

    assert_eq!(
        adapter.widget().events,
        vec![
            Event::Begin,
            Event::ReloadItem(Some(r), false),
            Event::InsertItems(Some(r), vec![2]),
            Event::End,
            Event::Select(vec![], false, true),
        ]
    );
    assert_eq!(handle(&adapter, 1), r);
    assert_eq!(handle(&adapter, 2), x);
    assert_eq!(handle(&adapter, 3), y);
    let z = handle(&adapter, 4);
    assert!(z != r && z != x && z != y);
    assert_eq!(adapter.handles().len(), 4);
    assert_eq!(adapter.children_count(Some(r)), 3);
}

#[test]
fn outline_removal_releases_handles_of_the_whole_subtree() {
    let mut adapter = outline_adapter(&[
        branch(1, vec![branch(2, vec![leaf(5)]), leaf(3)]),
        leaf(4),
    ]);
    let stale = handle(&adapter, 2);

    adapter.apply(&[branch(1, vec![leaf(3)]), leaf(4)], true);

    let r = handle(&adapter, 1);
    assert_eq!(
        adapter.widget().events,
        vec![
            Event::Begin,
            Event::ReloadItem(Some(r), false),
            Event::RemoveItems(Some(r), vec![0]),
            Event::End,
            Event::Select(vec![], false, true),
        ]
    );
    assert!(adapter.handle_for(&id(2)).is_none());
    assert!(adapter.handle_for(&id(5)).is_none());
    assert!(adapter.handles().identity(stale).is_none());
    assert_eq!(adapter.handles().len(), 3);
}

#[test]
fn outline_root_level_changes_use_the_root_parent() {
    let mut adapter = outline_adapter(&[leaf(1), leaf(2)]);

    adapter.apply(&[leaf(2), leaf(3)], true);

    assert_eq!(
        adapter.widget().events,
        vec![
            Event::Begin,
            Event::ReloadItem(None, false),
            Event::RemoveItems(None, vec![0]),
            Event::InsertItems(None, vec![1]),
            Event::End,
            Event::Select(vec![], false, true),
        ]
    );
}

#[test]
fn outline_content_change_rebinds_the_visible_cell_only() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)])]);
    adapter.widget_mut().show_cells(3);

    let renamed = TreeNode::leaf(Row::new(3, "renamed").item());
    adapter.apply(&[branch(1, vec![leaf(2), renamed])], true);

    assert_eq!(
        adapter.widget().events,
        vec![Event::Begin, Event::End, Event::Select(vec![], false, true)]
    );
    assert_eq!(adapter.widget().cells[&2].label, Some("renamed"));
    assert_eq!(adapter.widget().cells[&1].binds, 0);
}

#[test]
fn outline_reload_syncs_handles_and_reloads_everything() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2)]), leaf(3)]);
    let kept = handle(&adapter, 1);

    adapter.apply(&[branch(1, vec![leaf(4)])], false);

    assert_eq!(adapter.widget().events, vec![Event::Reload]);
    assert_eq!(handle(&adapter, 1), kept);
    assert!(adapter.handle_for(&id(2)).is_none());
    assert!(adapter.handle_for(&id(3)).is_none());
    assert!(adapter.handle_for(&id(4)).is_some());
    assert_eq!(adapter.handles().len(), 2);
}

#[test]
fn outline_restores_selection_by_identity() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)])]);
    adapter.widget_mut().selected = [1usize, 2].into_iter().collect();

    // X=2 leaves the tree; Y=3 keeps its handle and therefore its row.
    adapter.apply(&[branch(1, vec![leaf(3)])], true);

    let r = handle(&adapter, 1);
    assert_eq!(
        adapter.widget().events,
        vec![
            Event::Begin,
            Event::ReloadItem(Some(r), false),
            Event::RemoveItems(Some(r), vec![0]),
            Event::End,
            Event::Select(vec![2], false, true),
        ]
    );
    assert!(!adapter.is_editing());
}

#[test]
fn outline_data_source_queries() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)]), leaf(4)]);
    let (r, x, y) = (handle(&adapter, 1), handle(&adapter, 2), handle(&adapter, 3));

    assert_eq!(adapter.children_count(None), 2);
    assert_eq!(adapter.child(None, 0), Some(r));
    assert_eq!(adapter.children_count(Some(r)), 2);
    assert_eq!(adapter.child(Some(r), 1), Some(y));
    assert_eq!(adapter.child(Some(r), 2), None);
    assert!(adapter.is_expandable(r));
    assert!(!adapter.is_expandable(x));
    assert!(adapter.should_select(x));
    assert!(adapter.should_show_disclosure(r));
    assert_eq!(adapter.row_height(y), Some(23));

    let cell = adapter.cell_for_handle(x).expect("bound cell");
    assert_eq!(cell.label, Some("leaf"));
}

/// Row with swipe actions and an optional icon color; `None` opts out of tinting.
#[derive(Debug, PartialEq)]
struct Swatch {
    id: i64,
    color: Option<Color>,
}

static ARCHIVED: AtomicUsize = AtomicUsize::new(usize::MAX);

impl Item for Swatch {
    fn identity(&self) -> Identity {
        Identity::Int(self.id)
    }

    fn content_equals(&self, other: &dyn Item) -> bool {
        content_eq(self, other)
    }

    fn row_actions(&self, edge: RowActionEdge) -> Vec<RowAction> {
        match edge {
            RowActionEdge::Leading => vec![RowAction::new(
                "Archive",
                RowActionStyle::Regular,
                |row| ARCHIVED.store(row, Ordering::SeqCst),
            )],
            RowActionEdge::Trailing => vec![
                RowAction::new("Flag", RowActionStyle::Regular, |_| {}),
                RowAction::new("Delete", RowActionStyle::Destructive, |_| {}),
            ],
        }
    }

    fn tint(&self) -> Tint {
        self.color.into()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn list_row_actions_come_from_the_item_per_edge() {
    let mut adapter = ListAdapter::new(MockWidget::new(1), AdapterOptions::default());
    let swatch: ItemRef = Arc::new(Swatch { id: 7, color: None });
    adapter.apply([Row::new(1, "plain").item(), swatch], false);

    assert!(adapter.row_actions(0, RowActionEdge::Leading).is_empty());
    assert!(adapter.row_actions(0, RowActionEdge::Trailing).is_empty());
    assert!(adapter.row_actions(5, RowActionEdge::Trailing).is_empty());

    let trailing = adapter.row_actions(1, RowActionEdge::Trailing);
    let titles: Vec<&str> = trailing.iter().map(|action| action.title.as_str()).collect();
    assert_eq!(titles, ["Flag", "Delete"]);
    assert_eq!(trailing[1].style, RowActionStyle::Destructive);

    let leading = adapter.row_actions(1, RowActionEdge::Leading);
    assert_eq!(leading.len(), 1);
    leading[0].perform(1);
    assert_eq!(ARCHIVED.load(Ordering::SeqCst), 1);
}

#[test]
fn outline_tint_follows_the_item_color() {
    let red = Color::rgb(255, 0, 0);
    let mut adapter = outline_adapter(&[
        TreeNode::with_children(
            Arc::new(Swatch {
                id: 1,
                color: Some(red),
            }),
            vec![TreeNode::leaf(Arc::new(Swatch { id: 2, color: None }))],
        ),
        leaf(3),
    ]);
    let (tinted, plain, default) = (handle(&adapter, 1), handle(&adapter, 2), handle(&adapter, 3));

    assert_eq!(adapter.tint(tinted), Tint::Preferred(red));
    assert_eq!(adapter.tint(plain), Tint::Monochrome);
    assert_eq!(adapter.tint(default), Tint::Accent);

    adapter.apply(&[leaf(3)], false);
    assert_eq!(adapter.tint(tinted), Tint::Accent);
}

#[test]
fn outline_selection_uses_the_clicked_row_and_provider_validator() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)])]);
    adapter.widget_mut().selected = [1usize, 2].into_iter().collect();
    let x = tree_index(&adapter, 2);
    let y = tree_index(&adapter, 3);
    let r = tree_index(&adapter, 1);

    assert_eq!(adapter.get_selection(), vec![x.clone(), y.clone()]);
    adapter.widget_mut().clicked = Some(0);
    assert_eq!(adapter.get_selection(), vec![r]);

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let seen = delivered.clone();
    adapter.set_selection_provider(
        SelectionProvider::new(move |selection| seen.lock().unwrap().push(selection.to_vec()))
            .with_validator(|selection| selection.len() == 1),
    );

    adapter.selection_did_change();
    adapter.widget_mut().selected = RowSet::single(1);
    adapter.selection_did_change();
    adapter.editing.set(true);
    adapter.selection_did_change();
    adapter.editing.set(false);

    assert_eq!(*delivered.lock().unwrap(), vec![vec![x]]);
}

#[test]
fn outline_navigation_and_expansion() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)])]);
    let r = handle(&adapter, 1);

    adapter.expand(&id(1), true, true);
    adapter.expand(&id(99), true, false);
    adapter.scroll_to(&id(3), true);
    adapter.scroll_to(&id(99), true);

    // Collapse R: its children have no row any more.
    adapter.widget_mut().layout = vec![r];
    adapter.scroll_to(&id(2), true);
    adapter.select(&[id(1), id(2)], true);

    assert_eq!(
        adapter.widget().events,
        vec![
            Event::Expand(r, true),
            Event::ScrollTo(2),
            Event::Select(vec![0], true, false),
        ]
    );
}

#[test]
fn outline_focus_and_force_update_target_visible_cells() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2), leaf(3)])]);
    adapter.widget_mut().show_cells(3);

    adapter.set_focus(&id(2));
    assert!(adapter.widget().cells[&1].focused);
    assert!(!adapter.widget().cells[&0].focused);

    adapter.force_update(Row::new(3, "fresh").item());
    adapter.force_update(Row::new(42, "absent").item());
    assert_eq!(adapter.widget().cells[&2].label, Some("fresh"));
    assert!(adapter.widget().events.is_empty());
}

#[test]
fn outline_local_drag_rejects_drops_into_its_own_subtree() {
    // R=1 [X=2 [Z=5], Y=3], S=4
    let mut adapter = outline_adapter(&[
        branch(1, vec![branch(2, vec![leaf(5)]), leaf(3)]),
        leaf(4),
    ]);
    let moves = Arc::new(Mutex::new(Vec::new()));
    let seen = moves.clone();
    adapter.set_drop_configuration(OutlineDropConfiguration::new().on_move(move |dragged, dest| {
        seen.lock().unwrap().push((dragged.to_vec(), dest.clone()));
    }));
    let (r, x, z, s) = (
        handle(&adapter, 1),
        handle(&adapter, 2),
        handle(&adapter, 5),
        handle(&adapter, 4),
    );

    let info = local_drag(vec![adapter.pasteboard_writer(r).expect("R")], DragOperations::ALL);
    assert_eq!(adapter.validate_drop(&info, Some(r), None), DropOutcome::None);
    assert_eq!(adapter.validate_drop(&info, Some(x), None), DropOutcome::None);
    assert_eq!(adapter.validate_drop(&info, Some(z), Some(0)), DropOutcome::None);
    assert_eq!(adapter.validate_drop(&info, Some(r), Some(1)), DropOutcome::None);
    assert_eq!(adapter.validate_drop(&info, Some(s), None), DropOutcome::Move);
    assert_eq!(adapter.validate_drop(&info, None, Some(2)), DropOutcome::Move);

    assert!(adapter.accept_drop(&info, None, Some(2)));
    assert!(adapter.widget().events.is_empty());
    assert!(moves.lock().unwrap().is_empty());
    assert_eq!(adapter.run_pending(), 1);
    assert_eq!(
        *moves.lock().unwrap(),
        vec![(
            vec![tree_index(&adapter, 1)],
            DropDestination::Insert {
                parent: None,
                offset: 2,
            }
        )]
    );
}

#[test]
fn outline_reorder_of_every_visible_row_of_a_collapsed_tree_is_rejected() {
    // 1 [2], 3 [4], both collapsed: only 1 and 3 are rows.
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2)]), branch(3, vec![leaf(4)])]);
    adapter.set_drop_configuration(OutlineDropConfiguration::new().on_move(|_, _| {}));
    let (a, b) = (handle(&adapter, 1), handle(&adapter, 3));
    adapter.widget_mut().layout = vec![a, b];

    let drag = |handles: &[HandleId]| {
        let items = handles
            .iter()
            .filter_map(|&h| adapter.pasteboard_writer(h))
            .collect();
        local_drag(items, DragOperations::ALL)
    };
    let all = drag(&[a, b]);
    // A parent dragged together with its own child still leaves the other subtree behind.
    let nested = drag(&[a, handle(&adapter, 2)]);
    let one = drag(&[a]);

    for offset in 0..=2 {
        assert_eq!(adapter.validate_drop(&all, None, Some(offset)), DropOutcome::None);
    }
    assert_eq!(adapter.validate_drop(&nested, None, Some(2)), DropOutcome::Move);
    assert_eq!(adapter.validate_drop(&one, None, Some(2)), DropOutcome::Move);
    assert!(!adapter.accept_drop(&all, None, Some(0)));
    assert!(!adapter.has_pending());
}

#[test]
fn outline_drop_on_a_released_handle_is_rejected() {
    let mut adapter = outline_adapter(&[leaf(1), leaf(2)]);
    adapter.set_drop_configuration(
        OutlineDropConfiguration::new().on_drop_into(TEXT, DragSource::External, |_, _| {}),
    );
    let stale = handle(&adapter, 2);
    let info = text_drag(None, &[b"x"]);
    assert_eq!(adapter.validate_drop(&info, Some(stale), None), DropOutcome::Copy);

    adapter.apply(&[leaf(1)], true);
    assert_eq!(adapter.validate_drop(&info, Some(stale), None), DropOutcome::None);
    assert!(!adapter.accept_drop(&info, Some(stale), None));
}

#[test]
fn outline_foreign_drop_into_item_is_deferred() {
    let mut adapter = outline_adapter(&[branch(1, vec![leaf(2)])]);
    let received = Arc::new(Mutex::new(Vec::new()));
    let seen = received.clone();
    adapter.set_drop_configuration(OutlineDropConfiguration::new().on_drop_into(
        TEXT,
        DragSource::Internal,
        move |target: &TreeIndex, data: &[Vec<u8>]| {
            seen.lock()
                .unwrap()
                .push((target.clone(), data.to_vec()));
        },
    ));
    assert_eq!(
        adapter.widget().registered,
        vec![TEXT, PayloadType::INDEX]
    );

    let x = handle(&adapter, 2);
    let info = text_drag(Some(WidgetId(7)), &[b"one", b"two"]);
    assert!(adapter.accept_drop(&info, Some(x), None));
    assert!(received.lock().unwrap().is_empty());

    assert_eq!(adapter.run_pending(), 1);
    assert_eq!(
        *received.lock().unwrap(),
        vec![(tree_index(&adapter, 2), vec![b"one".to_vec(), b"two".to_vec()])]
    );
}

#[test]
fn outline_forced_copy_and_delete() {
    let mut adapter = OutlineAdapter::new(MockWidget::new(1), AdapterOptions::default());
    adapter.apply(
        &[
            TreeNode::leaf(Row::new(1, "a").copyable().deletable().item()),
            TreeNode::leaf(Row::new(2, "b").fixed().copyable().item()),
        ],
        false,
    );
    lay_out(&mut adapter);
    let copies = Arc::new(AtomicUsize::new(0));
    let deleted = Arc::new(Mutex::new(Vec::new()));
    let (seen_copy, seen_delete) = (copies.clone(), deleted.clone());
    adapter.set_drop_configuration(
        OutlineDropConfiguration::new()
            .on_copy(move |_, _| {
                seen_copy.fetch_add(1, Ordering::SeqCst);
            })
            .on_delete(move |items| seen_delete.lock().unwrap().push(items.to_vec())),
    );
    let a = handle(&adapter, 1);
    let b = handle(&adapter, 2);

    // Copy-only rows still carry their index: copyable under the modifier, never moved.
    let copy_only = local_drag(vec![adapter.pasteboard_writer(b).expect("b")], DragOperations::COPY);
    assert_eq!(adapter.validate_drop(&copy_only, None, Some(0)), DropOutcome::Copy);
    let moved = local_drag(copy_only.items.clone(), DragOperations::MOVE);
    assert_eq!(adapter.validate_drop(&moved, None, Some(0)), DropOutcome::None);

    let info = local_drag(vec![adapter.pasteboard_writer(a).expect("a")], DragOperations::COPY);
    assert_eq!(adapter.validate_drop(&info, None, Some(2)), DropOutcome::Copy);
    assert!(adapter.accept_drop(&info, None, Some(2)));
    assert_eq!(adapter.run_pending(), 1);
    assert_eq!(copies.load(Ordering::SeqCst), 1);

    assert!(adapter.dragging_session_ended(&info.items, DragOperations::DELETE));
    assert_eq!(*deleted.lock().unwrap(), vec![vec![tree_index(&adapter, 1)]]);
}

#[test]
fn outline_drag_session_feedback() {
    let mut adapter = outline_adapter(&[leaf(1), leaf(2)]);
    let a = adapter.pasteboard_writer(handle(&adapter, 1)).expect("a");
    let b = adapter.pasteboard_writer(handle(&adapter, 2)).expect("b");

    assert!(adapter.dragging_session_will_begin(&[a.clone()]).is_empty());
    assert_eq!(adapter.widget().feedback, FeedbackStyle::Gap);
    adapter.dragging_session_will_begin(&[a.clone(), b]);
    assert_eq!(adapter.widget().feedback, FeedbackStyle::Regular);
    adapter.dragging_session_will_begin(&[a.clone()]);
    assert!(!adapter.dragging_session_ended(&[a], DragOperations::MOVE));
    assert_eq!(adapter.widget().feedback, FeedbackStyle::Regular);
}

// ---------------------------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------------------------

#[test]
fn handle_arena_keeps_handles_for_persisting_identities() {
    let mut arena = HandleArena::new();
    let a = arena.ensure(&id(1));
    let b = arena.ensure(&id(2));
    assert_eq!(arena.ensure(&id(1)), a);
    assert_ne!(a.as_raw(), b.as_raw());

    arena.apply(&listsync::HandleChanges {
        created: ids(&[3]),
        dropped: ids(&[2]),
    });
    assert_eq!(arena.get(&id(1)), Some(a));
    assert_eq!(arena.get(&id(2)), None);
    assert_eq!(arena.identity(b), None);
    assert_eq!(arena.identity(arena.get(&id(3)).expect("created")), Some(&id(3)));
    assert_eq!(arena.len(), 2);

    assert_eq!(arena.release(&id(1)), Some(a));
    assert_eq!(arena.release(&id(1)), None);
}

#[test]
fn effective_selection_prefers_the_clicked_row() {
    let selected: RowSet = [1usize, 3].into_iter().collect();
    assert_eq!(effective_selection(&selected, None), selected);
    assert_eq!(effective_selection(&selected, Some(3)), selected);
    assert_eq!(effective_selection(&selected, Some(0)), RowSet::single(0));
    assert_eq!(
        effective_selection(&RowSet::new(), Some(2)),
        RowSet::single(2)
    );
}

#[test]
fn anchor_helpers_need_a_visible_row_that_still_exists() {
    let mut widget = MockWidget::new(1);
    assert_eq!(capture_first_visible_anchor(&widget, |_| Some(id(1))), None);

    widget.anchor = Some((4, 9));
    let anchor = capture_first_visible_anchor(&widget, |row| Some(id(row as i64)))
        .expect("anchor");
    assert_eq!(
        anchor,
        ScrollAnchor {
            id: id(4),
            offset_in_row: 9
        }
    );

    assert!(!apply_anchor(&mut widget, &anchor, |_| None));
    assert!(apply_anchor(&mut widget, &anchor, |_| Some(6)));
    assert_eq!(widget.events, vec![Event::ScrollOffset(6, 9)]);
}

#[test]
fn update_batch_closes_on_every_path() {
    let mut widget = MockWidget::new(1);
    let editing = EditingFlag::default();
    {
        let _batch = crate::selection::UpdateBatch::begin(&mut widget, &editing);
        assert!(editing.is_set());
    }
    assert!(!editing.is_set());
    assert_eq!(widget.events, vec![Event::Begin, Event::End]);

    let out = crate::selection::while_editing(&editing, || editing.is_set());
    assert!(out);
    assert!(!editing.is_set());
}

#[test]
fn adapter_options_defaults_and_builders() {
    let options = AdapterOptions::default();
    assert_eq!(options.remove_animation, Animation::FADE | Animation::SLIDE_DOWN);
    assert_eq!(options.insert_animation, Animation::FADE | Animation::SLIDE_LEFT);
    assert_eq!(options.outline_animation, Animation::FADE);
    assert!(!options.restore_selection_on_reload);
    assert!(options.preserve_scroll_on_reload);

    let options = AdapterOptions::new()
        .with_outline_animation(Animation::NONE)
        .with_external_drag_operations(DragOperations::COPY);
    assert!(options.outline_animation.is_none());
    assert_eq!(options.external_drag_operations, DragOperations::COPY);
}

#[test]
fn dragging_info_classifies_sources_and_hides_the_index_type() {
    let mut item = PasteboardItem::new();
    item.write_index(&IndexPath::new(vec![0, 2]));
    item.set_data(TEXT, b"t".to_vec());
    let info = DraggingInfo {
        origin: Some(WidgetId(3)),
        operation_mask: DragOperations::ALL,
        items: vec![item],
    };

    assert_eq!(info.source_for(WidgetId(3)), DragSource::Local);
    assert_eq!(info.source_for(WidgetId(4)), DragSource::Internal);
    assert_eq!(
        DraggingInfo::default().source_for(WidgetId(3)),
        DragSource::External
    );
    assert_eq!(info.index_paths(), vec![IndexPath::new(vec![0, 2])]);
    let offered = info.offered(DragSource::Internal);
    assert_eq!(offered.len(), 1);
    assert_eq!(offered[0].ty, TEXT);
    assert_eq!(info.payloads(&TEXT), vec![b"t".to_vec()]);
}
