use alloc::sync::Arc;
use alloc::vec::Vec;

use listsync::{
    HandleChanges, Identity, ItemRef, OutlineDropConfiguration, OutlineOp, PayloadType, RowSet,
    Tint, TreeIndex, TreeNode, TreeSnapshot, plan_outline,
};

use crate::pending::PendingDispatches;
use crate::selection::{UpdateBatch, while_editing};
use crate::{
    AdapterOptions, EditingFlag, HandleArena, HandleId, OutlineWidget, ReusableCell,
    SelectionProvider, apply_anchor, capture_first_visible_anchor, effective_selection,
};

/// Binds an [`OutlineWidget`] to a [`TreeSnapshot`].
///
/// The widget addresses items by [`HandleId`]. Handles are created when an identity enters the
/// tree and released when it leaves; a persisting identity keeps its handle, so the widget's
/// expansion state survives every update.
pub struct OutlineAdapter<W: OutlineWidget> {
    pub(crate) widget: W,
    pub(crate) snapshot: TreeSnapshot,
    pub(crate) handles: HandleArena,
    pub(crate) options: AdapterOptions,
    pub(crate) drop_configuration: Arc<OutlineDropConfiguration>,
    pub(crate) selection_provider: Option<SelectionProvider>,
    pub(crate) editing: EditingFlag,
    pub(crate) pending: PendingDispatches<TreeIndex>,
}

impl<W: OutlineWidget> OutlineAdapter<W> {
    pub fn new(mut widget: W, options: AdapterOptions) -> Self {
        widget.set_drag_source_operations(options.external_drag_operations, false);
        widget.register_drag_types(&[PayloadType::INDEX]);
        Self {
            widget,
            snapshot: TreeSnapshot::empty(),
            handles: HandleArena::new(),
            options,
            drop_configuration: Arc::new(OutlineDropConfiguration::new()),
            selection_provider: None,
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

    pub fn snapshot(&self) -> &TreeSnapshot {
        &self.snapshot
    }

    pub fn handles(&self) -> &HandleArena {
        &self.handles
    }

    pub fn handle_for(&self, id: &Identity) -> Option<HandleId> {
        self.handles.get(id)
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    pub fn editing_flag(&self) -> EditingFlag {
        self.editing.clone()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_set()
    }

    /// Builds a tree snapshot from `roots` and reconciles the widget with it.
    pub fn apply(&mut self, roots: &[TreeNode], animate: bool) {
        self.apply_snapshot(TreeSnapshot::new(roots), animate);
    }

    /// Reconciles the widget with `new`.
    ///
    /// Without animation the handles are synced and the widget is fully reloaded. Otherwise
    /// changed items are rebound in place and only the levels whose child order changed are
    /// touched, inside one batch.
    pub fn apply_snapshot(&mut self, new: TreeSnapshot, animate: bool) {
        let selected = self.identities_at(&self.widget.selected_rows());

        if !animate {
            self.reload(new, &selected);
            return;
        }

        let plan = plan_outline(&self.snapshot, &new);
        for rebind in &plan.rebinds {
            let Some(handle) = self.handles.get(&rebind.position) else {
                continue;
            };
            let Some(row) = self.widget.row_for_handle(handle) else {
                continue;
            };
            if let Some(cell) = self.widget.visible_cell_mut(row) {
                cell.bind(&rebind.item);
            }
        }
        self.handles.apply(&plan.handles);

        {
            let mut batch = UpdateBatch::begin(&mut self.widget, &self.editing);
            self.snapshot = new;
            let animation = self.options.outline_animation;
            for op in &plan.ops {
                let parent = match op {
                    OutlineOp::ReloadParent { parent }
                    | OutlineOp::Remove { parent, .. }
                    | OutlineOp::Insert { parent, .. } => parent.as_ref(),
                };
                let parent_handle = match parent {
                    None => None,
                    Some(id) => match self.handles.get(id) {
                        Some(handle) => Some(handle),
                        None => {
                            awarn!(parent = %id, "OutlineAdapter::apply: parent has no handle");
                            debug_assert!(false, "outline parent {id} has no handle");
                            continue;
                        }
                    },
                };
                match op {
                    OutlineOp::ReloadParent { .. } => batch.reload_item(parent_handle, false),
                    OutlineOp::Remove { offset, .. } => {
                        batch.remove_items(parent_handle, &RowSet::single(*offset), animation);
                    }
                    OutlineOp::Insert { offset, .. } => {
                        batch.insert_items(parent_handle, &RowSet::single(*offset), animation);
                    }
                }
            }
        }

        self.restore_selection(&selected);
        adebug!(
            items = self.snapshot.len(),
            handles = self.handles.len(),
            rebinds = plan.rebinds.len(),
            ops = plan.ops.len(),
            "OutlineAdapter::apply"
        );
    }

    fn reload(&mut self, new: TreeSnapshot, selected: &[Identity]) {
        let anchor = if self.options.preserve_scroll_on_reload {
            capture_first_visible_anchor(&self.widget, |row| {
                let handle = self.widget.handle_at_row(row)?;
                self.handles.identity(handle).cloned()
            })
        } else {
            None
        };

        self.handles.apply(&HandleChanges::between(&self.snapshot, &new));
        self.snapshot = new;
        self.widget.reload_data();

        if let Some(anchor) = &anchor {
            let row = self
                .handles
                .get(&anchor.id)
                .and_then(|handle| self.widget.row_for_handle(handle));
            apply_anchor(&mut self.widget, anchor, |_| row);
        }
        if self.options.restore_selection_on_reload {
            self.restore_selection(selected);
        }
        adebug!(
            items = self.snapshot.len(),
            handles = self.handles.len(),
            "OutlineAdapter::reload"
        );
    }

    fn identities_at(&self, rows: &RowSet) -> Vec<Identity> {
        rows.iter()
            .filter_map(|row| self.widget.handle_at_row(row))
            .filter_map(|handle| self.handles.identity(handle).cloned())
            .collect()
    }

    fn rows_of(&self, ids: &[Identity]) -> RowSet {
        ids.iter()
            .filter_map(|id| self.handles.get(id))
            .filter_map(|handle| self.widget.row_for_handle(handle))
            .collect()
    }

    fn restore_selection(&mut self, selected: &[Identity]) {
        let rows = self.rows_of(selected);
        let widget = &mut self.widget;
        while_editing(&self.editing, || widget.select_rows(&rows, false));
    }

    fn identity_of(&self, handle: HandleId) -> Option<&Identity> {
        let id = self.handles.identity(handle);
        if id.is_none() {
            awarn!(handle = handle.as_raw(), "OutlineAdapter: unknown handle");
            debug_assert!(false, "unknown outline handle {handle:?}");
        }
        id
    }

    fn item(&self, handle: HandleId) -> Option<&ItemRef> {
        self.snapshot.get(self.identity_of(handle)?)
    }

    /// Number of children under `parent` (`None` is the root).
    pub fn children_count(&self, parent: Option<HandleId>) -> usize {
        match parent {
            None => self.snapshot.children_count(None),
            Some(handle) => self
                .identity_of(handle)
                .map_or(0, |id| self.snapshot.children_count(Some(id))),
        }
    }

    /// Handle of the child at `offset` under `parent`.
    pub fn child(&self, parent: Option<HandleId>, offset: usize) -> Option<HandleId> {
        let parent = match parent {
            None => None,
            Some(handle) => Some(self.identity_of(handle)?),
        };
        let child = self.snapshot.child_identifier(parent, offset)?;
        self.handles.get(child)
    }

    pub fn is_expandable(&self, handle: HandleId) -> bool {
        self.identity_of(handle)
            .is_some_and(|id| self.snapshot.is_expandable(id))
    }

    /// Returns a bound cell for `handle`, recycling one from the widget's pool when possible.
    pub fn cell_for_handle(&mut self, handle: HandleId) -> Option<W::Cell> {
        let id = self.handles.identity(handle)?;
        let item = self.snapshot.get(id)?;
        let reuse_identifier = item.reuse_identifier();
        let mut cell = match self.widget.dequeue_reusable_cell(reuse_identifier) {
            Some(cell) => cell,
            None => self.widget.make_cell(reuse_identifier, item),
        };
        cell.bind(item);
        Some(cell)
    }

    pub fn row_height(&self, handle: HandleId) -> Option<u32> {
        self.item(handle)?.configuration().height
    }

    pub fn is_group(&self, handle: HandleId) -> bool {
        self.item(handle)
            .is_some_and(|item| item.configuration().is_group)
    }

    pub fn should_select(&self, handle: HandleId) -> bool {
        self.item(handle).is_some_and(|item| {
            let configuration = item.configuration();
            configuration.selectable && !configuration.is_group
        })
    }

    pub fn should_show_disclosure(&self, handle: HandleId) -> bool {
        !self.is_group(handle)
    }

    /// Icon tint for the row of `handle`. Released handles get the accent color.
    pub fn tint(&self, handle: HandleId) -> Tint {
        self.item(handle).map(|item| item.tint()).unwrap_or_default()
    }

    /// Indexes a context action applies to, honouring the clicked row.
    pub fn get_selection(&self) -> Vec<TreeIndex> {
        let rows = effective_selection(&self.widget.selected_rows(), self.widget.clicked_row());
        self.identities_at(&rows)
            .iter()
            .filter_map(|id| self.snapshot.index(id))
            .collect()
    }

    pub fn set_selection_provider(&mut self, provider: SelectionProvider) {
        self.selection_provider = Some(provider);
    }

    /// Forwarded native selection-changed notification.
    ///
    /// Dropped while the adapter itself is changing the selection.
    pub fn selection_did_change(&self) {
        if self.editing.is_set() {
            atrace!("OutlineAdapter::selection_did_change: suppressed");
            return;
        }
        let ids = self.identities_at(&self.widget.selected_rows());
        let mut selection = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(item) = self.snapshot.get(id) {
                item.did_select();
            }
            if let Some(index) = self.snapshot.index(id) {
                selection.push(index);
            }
        }
        if let Some(provider) = &self.selection_provider {
            provider.select(&selection);
        }
    }

    pub fn scroll_to(&mut self, id: &Identity, animated: bool) {
        let row = self
            .handles
            .get(id)
            .and_then(|handle| self.widget.row_for_handle(handle));
        let Some(row) = row else {
            adebug!(id = %id, "OutlineAdapter::scroll_to: identity not visible");
            return;
        };
        self.widget.scroll_row_to_visible(row, animated);
    }

    /// Selects the visible rows of `ids`; absent or collapsed identities are skipped.
    pub fn select(&mut self, ids: &[Identity], extend: bool) {
        let rows = self.rows_of(ids);
        self.widget.select_rows(&rows, extend);
    }

    /// Moves focus to the cell of `id` and clears it from every other visible cell.
    pub fn set_focus(&mut self, id: &Identity) {
        if !self.snapshot.contains(id) {
            adebug!(id = %id, "OutlineAdapter::set_focus: identity not present");
            return;
        }
        for other in self.snapshot.preorder() {
            let Some(handle) = self.handles.get(&other) else {
                continue;
            };
            let Some(row) = self.widget.row_for_handle(handle) else {
                continue;
            };
            if let Some(cell) = self.widget.visible_cell_mut(row) {
                cell.set_focused(other == *id);
            }
        }
    }

    /// Expands the item of `id`, and its whole subtree when `include_children` is set.
    pub fn expand(&mut self, id: &Identity, animated: bool, include_children: bool) {
        let Some(handle) = self.handles.get(id) else {
            adebug!(id = %id, "OutlineAdapter::expand: identity not present");
            return;
        };
        self.widget.expand_item(handle, include_children, animated);
    }

    /// Replaces one item without diffing and rebinds its visible cell.
    pub fn force_update(&mut self, item: ItemRef) {
        let id = item.identity();
        if !self.snapshot.force_update(item.clone()) {
            adebug!(id = %id, "OutlineAdapter::force_update: identity not present");
            return;
        }
        let Some(row) = self
            .handles
            .get(&id)
            .and_then(|handle| self.widget.row_for_handle(handle))
        else {
            return;
        };
        if let Some(cell) = self.widget.visible_cell_mut(row) {
            cell.bind(&item);
        }
    }

    pub fn drop_configuration(&self) -> &OutlineDropConfiguration {
        &self.drop_configuration
    }

    /// Replaces the drop handlers and re-registers the accepted payload types with the widget.
    pub fn set_drop_configuration(&mut self, configuration: OutlineDropConfiguration) {
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

impl<W: OutlineWidget + core::fmt::Debug> core::fmt::Debug for OutlineAdapter<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OutlineAdapter")
            .field("widget", &self.widget)
            .field("snapshot", &self.snapshot)
            .field("handles", &self.handles.len())
            .field("options", &self.options)
            .field("drop_configuration", &self.drop_configuration)
            .field("editing", &self.editing.is_set())
            .field("pending", &self.pending)
            .finish()
    }
}
