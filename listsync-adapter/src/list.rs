use alloc::sync::Arc;
use alloc::vec::Vec;

use listsync::{
    Identity, ItemRef, ListDropConfiguration, PayloadType, RowAction, RowActionEdge, RowSet,
    Snapshot, plan_list,
};

use crate::pending::PendingDispatches;
use crate::selection::{ListSelectHandler, UpdateBatch, while_editing};
use crate::{
    AdapterOptions, EditingFlag, ListWidget, ReusableCell, apply_anchor,
    capture_first_visible_anchor, effective_selection,
};

/// Binds a [`ListWidget`] to a flat [`Snapshot`].
///
/// The adapter owns the current snapshot and replaces it on every [`ListAdapter::apply`]. Widget
/// callbacks (row count, cell for row, selection and drag events) are forwarded by the host to the
/// matching methods here.
pub struct ListAdapter<W: ListWidget> {
    pub(crate) widget: W,
    pub(crate) snapshot: Snapshot,
    pub(crate) options: AdapterOptions,
    pub(crate) drop_configuration: Arc<ListDropConfiguration>,
    pub(crate) on_select: Option<ListSelectHandler>,
    pub(crate) editing: EditingFlag,
    pub(crate) pending: PendingDispatches<usize>,
}

impl<W: ListWidget> ListAdapter<W> {
    pub fn new(mut widget: W, options: AdapterOptions) -> Self {
        widget.set_drag_source_operations(options.external_drag_operations, false);
        widget.register_drag_types(&[PayloadType::INDEX]);
        Self {
            widget,
            snapshot: Snapshot::empty(),
            options,
            drop_configuration: Arc::new(ListDropConfiguration::new()),
            on_select: None,
            editing: EditingFlag::default(),
            pending: PendingDispatches::default(),
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    pub fn into_widget(self) -> W {
        self.widget
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    /// Flag that is set while the adapter mutates rows or selection programmatically.
    pub fn editing_flag(&self) -> EditingFlag {
        self.editing.clone()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_set()
    }

    /// Builds a snapshot from `items` and reconciles the widget with it.
    pub fn apply(&mut self, items: impl IntoIterator<Item = ItemRef>, animate: bool) {
        self.apply_snapshot(Snapshot::new(items), animate);
    }

    /// Reconciles the widget with `new`.
    ///
    /// Without animation, or when either side is empty, the widget is fully reloaded. Otherwise
    /// changed rows are rebound in place, removals and insertions run inside one batch, and the
    /// previous selection is re-resolved by identity.
    pub fn apply_snapshot(&mut self, new: Snapshot, animate: bool) {
        let selected: Vec<Identity> = self
            .widget
            .selected_rows()
            .iter()
            .filter_map(|row| self.snapshot.get(row).map(|item| item.identity()))
            .collect();

        if !animate || self.snapshot.is_empty() || new.is_empty() {
            self.reload(new, &selected);
            return;
        }

        let plan = plan_list(&self.snapshot, &new);
        for rebind in &plan.rebinds {
            if let Some(cell) = self.widget.visible_cell_mut(rebind.position) {
                cell.bind(&rebind.item);
            }
        }

        {
            let mut batch = UpdateBatch::begin(&mut self.widget, &self.editing);
            if plan.is_structural() {
                batch.remove_rows(&plan.removed, self.options.remove_animation);
                batch.insert_rows(&plan.inserted, self.options.insert_animation);
            }
            self.snapshot = new;
        }

        self.restore_selection(&selected);
        adebug!(
            rows = self.snapshot.len(),
            rebinds = plan.rebinds.len(),
            removed = plan.removed.len(),
            inserted = plan.inserted.len(),
            "ListAdapter::apply"
        );
    }

    fn reload(&mut self, new: Snapshot, selected: &[Identity]) {
        let anchor = if self.options.preserve_scroll_on_reload {
            capture_first_visible_anchor(&self.widget, |row| {
                self.snapshot.get(row).map(|item| item.identity())
            })
        } else {
            None
        };

        self.snapshot = new;
        self.widget.reload_data();

        if let Some(anchor) = &anchor {
            apply_anchor(&mut self.widget, anchor, |id| self.snapshot.index_of(id));
        }
        if self.options.restore_selection_on_reload {
            self.restore_selection(selected);
        }
        adebug!(rows = self.snapshot.len(), "ListAdapter::reload");
    }

    fn restore_selection(&mut self, selected: &[Identity]) {
        let rows = self.snapshot.indexes_of(selected);
        let widget = &mut self.widget;
        while_editing(&self.editing, || widget.select_rows(&rows, false));
    }

    pub fn row_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Returns a bound cell for `row`, recycling one from the widget's pool when possible.
    pub fn cell_for_row(&mut self, row: usize) -> Option<W::Cell> {
        let Some(item) = self.snapshot.get(row) else {
            awarn!(row, rows = self.snapshot.len(), "cell_for_row: row out of bounds");
            debug_assert!(row < self.snapshot.len(), "cell_for_row: row {row} out of bounds");
            return None;
        };
        let reuse_identifier = item.reuse_identifier();
        let mut cell = match self.widget.dequeue_reusable_cell(reuse_identifier) {
            Some(cell) => cell,
            None => self.widget.make_cell(reuse_identifier, item),
        };
        cell.bind(item);
        Some(cell)
    }

    pub fn row_height(&self, row: usize) -> Option<u32> {
        self.snapshot.get(row)?.configuration().height
    }

    pub fn is_group_row(&self, row: usize) -> bool {
        self.snapshot
            .get(row)
            .is_some_and(|item| item.configuration().is_group)
    }

    pub fn should_select_row(&self, row: usize) -> bool {
        self.snapshot
            .get(row)
            .is_some_and(|item| item.configuration().selectable)
    }

    /// Swipe actions of `row` for `edge`; empty for out-of-range rows.
    pub fn row_actions(&self, row: usize, edge: RowActionEdge) -> Vec<RowAction> {
        self.snapshot
            .get(row)
            .map(|item| item.row_actions(edge))
            .unwrap_or_default()
    }

    /// Registers the handler for user-driven selection changes.
    pub fn on_select(&mut self, handler: impl Fn(&RowSet) + Send + Sync + 'static) {
        self.on_select = Some(Arc::new(handler));
    }

    /// Forwarded native selection-changed notification.
    ///
    /// Dropped while the adapter itself is changing the selection.
    pub fn selection_did_change(&self) {
        if self.editing.is_set() {
            atrace!("ListAdapter::selection_did_change: suppressed");
            return;
        }
        let rows = self.widget.selected_rows();
        for row in rows.iter() {
            if let Some(item) = self.snapshot.get(row) {
                item.did_select();
            }
        }
        if let Some(handler) = &self.on_select {
            handler(&rows);
        }
    }

    /// Identities a context action applies to, honouring the clicked row.
    pub fn selected_identities(&self) -> Vec<Identity> {
        effective_selection(&self.widget.selected_rows(), self.widget.clicked_row())
            .iter()
            .filter_map(|row| self.snapshot.get(row).map(|item| item.identity()))
            .collect()
    }

    pub fn scroll_to(&mut self, id: &Identity, animated: bool) {
        let Some(row) = self.snapshot.index_of(id) else {
            adebug!(id = %id, "ListAdapter::scroll_to: identity not present");
            return;
        };
        self.widget.scroll_row_to_visible(row, animated);
    }

    /// Replaces the selection with the rows of `ids`; absent identities are skipped.
    pub fn select(&mut self, ids: &[Identity]) {
        let rows = self.snapshot.indexes_of(ids);
        self.widget.select_rows(&rows, false);
    }

    /// Moves focus to the cell of `id` and clears it from every other visible cell.
    pub fn set_focus(&mut self, id: &Identity) {
        let Some(focused) = self.snapshot.index_of(id) else {
            adebug!(id = %id, "ListAdapter::set_focus: identity not present");
            return;
        };
        for row in 0..self.snapshot.len() {
            if let Some(cell) = self.widget.visible_cell_mut(row) {
                cell.set_focused(row == focused);
            }
        }
    }

    /// Replaces one item without diffing and rebinds its visible cell.
    pub fn force_update(&mut self, item: ItemRef) {
        let Some(row) = self.snapshot.replace_item(item.clone()) else {
            adebug!(id = %item.identity(), "ListAdapter::force_update: identity not present");
            return;
        };
        if let Some(cell) = self.widget.visible_cell_mut(row) {
            cell.bind(&item);
        }
    }

    pub fn drop_configuration(&self) -> &ListDropConfiguration {
        &self.drop_configuration
    }

    /// Replaces the drop handlers and re-registers the accepted payload types with the widget.
    pub fn set_drop_configuration(&mut self, configuration: ListDropConfiguration) {
        let mut types = configuration.available_types();
        types.push(PayloadType::INDEX);
        self.widget.register_drag_types(&types);
        self.drop_configuration = Arc::new(configuration);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Runs the handler calls deferred by accepted drops. Call on the next event-loop turn.
    pub fn run_pending(&mut self) -> usize {
        self.pending.run()
    }
}

impl<W: ListWidget + core::fmt::Debug> core::fmt::Debug for ListAdapter<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListAdapter")
            .field("widget", &self.widget)
            .field("snapshot", &self.snapshot)
            .field("options", &self.options)
            .field("drop_configuration", &self.drop_configuration)
            .field("editing", &self.editing.is_set())
            .field("pending", &self.pending)
            .finish()
    }
}
