use alloc::vec::Vec;

use listsync::{
    DragConfiguration, DragOperations, DragPreview, DragSource, DropDestination, DropOutcome,
    FeedbackStyle, IndexPath, ListDropOperation, LocalDrag, PasteboardItem, RowSet,
};

use crate::pending::Resolved;
use crate::selection::UpdateBatch;
use crate::{DraggingInfo, ListAdapter, ListWidget};

impl<W: ListWidget> ListAdapter<W> {
    /// Pasteboard contents for dragging `row`, or `None` when the row cannot be dragged.
    ///
    /// Reorderable, deletable and copyable rows also carry the reserved index payload.
    pub fn pasteboard_writer(&self, row: usize) -> Option<PasteboardItem> {
        let Some(item) = self.snapshot.get(row) else {
            awarn!(row, "pasteboard_writer: row out of bounds");
            debug_assert!(row < self.snapshot.len(), "pasteboard_writer: row {row} out of bounds");
            return None;
        };
        let configuration = item.drag_configuration();
        let mut pasteboard = PasteboardItem::new();
        pasteboard.write_payloads(&configuration);
        if configuration.is_structural() {
            pasteboard.write_index(&IndexPath::single(row));
        }
        (!pasteboard.is_empty()).then_some(pasteboard)
    }

    /// Rows named by the index payloads of a local drag. Malformed or stale entries are skipped.
    fn dragged_rows(&self, items: &[PasteboardItem]) -> Vec<usize> {
        let rows: RowSet = items
            .iter()
            .filter_map(PasteboardItem::index)
            .filter(|path| path.depth() == 1)
            .filter_map(|path| path.last())
            .filter(|&row| row < self.snapshot.len())
            .collect();
        rows.into()
    }

    fn all_rows(&self, rows: &[usize], check: impl Fn(&DragConfiguration) -> bool) -> bool {
        rows.iter().all(|&row| {
            self.snapshot
                .get(row)
                .is_some_and(|item| check(&item.drag_configuration()))
        })
    }

    fn resolve_drop(
        &mut self,
        info: &DraggingInfo,
        row: Option<usize>,
        operation: ListDropOperation,
    ) -> Resolved<usize> {
        let source = info.source_for(self.widget.id());
        let destination = if self.snapshot.is_empty() {
            self.widget.redirect_drop_to_root();
            DropDestination::Root
        } else {
            DropDestination::from_list_proposal(row, operation, self.snapshot.len())
        };

        let dragged = if source == DragSource::Local && operation == ListDropOperation::Above {
            self.dragged_rows(&info.items)
        } else {
            Vec::new()
        };
        let local = !dragged.is_empty();

        let outcome = if local {
            let drag = LocalDrag {
                dragged: &dragged,
                covered: dragged.len(),
                total: self.snapshot.len(),
                forced_copy: info.operation_mask.is_forced_copy(),
                all_reorderable: self.all_rows(&dragged, |c| c.is_reorderable),
                all_copyable: self.all_rows(&dragged, |c| c.is_copyable),
            };
            self.drop_configuration.validate_local(&drag, &destination)
        } else {
            self.drop_configuration
                .validate_foreign(&info.offered(source), &destination)
        };

        Resolved {
            source,
            local,
            destination,
            dragged,
            outcome,
        }
    }

    /// Decides the drop cursor for a drag hovering over `row`.
    ///
    /// `row == None` means the drag is outside every row. Dropping into an empty list always
    /// targets the root.
    pub fn validate_drop(
        &mut self,
        info: &DraggingInfo,
        row: Option<usize>,
        operation: ListDropOperation,
    ) -> DropOutcome {
        self.resolve_drop(info, row, operation).outcome
    }

    /// Accepts a drop previously validated at the same position.
    ///
    /// Local reorders are mirrored in the widget and the snapshot right away. Every handler call
    /// is queued and runs on [`ListAdapter::run_pending`].
    pub fn accept_drop(
        &mut self,
        info: &DraggingInfo,
        row: Option<usize>,
        operation: ListDropOperation,
    ) -> bool {
        let resolved = self.resolve_drop(info, row, operation);
        if resolved.local && resolved.outcome == DropOutcome::Move {
            if let DropDestination::Insert { offset, .. } = resolved.destination {
                self.mirror_reorder(&resolved.dragged, offset);
            }
        }
        let configuration = self.drop_configuration.clone();
        let accepted = self.pending.accept(&configuration, resolved, info);
        adebug!(accepted, pending = self.pending.len(), "ListAdapter::accept_drop");
        accepted
    }

    /// Moves `rows` (ascending) before `to` in the widget and the snapshot, inside one batch.
    fn mirror_reorder(&mut self, rows: &[usize], to: usize) {
        {
            let mut batch = UpdateBatch::begin(&mut self.widget, &self.editing);
            let mut shifted_up = 0usize;
            let mut inserted = 0usize;
            for &row in rows {
                if row < to {
                    batch.move_row(row - shifted_up, to - 1);
                    shifted_up += 1;
                } else {
                    batch.move_row(row, to + inserted);
                    inserted += 1;
                }
            }
            let rows: RowSet = rows.iter().copied().collect();
            self.snapshot.move_rows(&rows, to);
        }
        atrace!(rows = rows.len(), to, "ListAdapter::mirror_reorder");
    }

    /// Drag session start: gap feedback for single-row drags, and the previews of dragged rows.
    pub fn dragging_session_will_begin(
        &mut self,
        items: &[PasteboardItem],
    ) -> Vec<(usize, DragPreview)> {
        let rows = self.dragged_rows(items);
        let style = if rows.len() == 1 {
            FeedbackStyle::Gap
        } else {
            FeedbackStyle::Regular
        };
        self.widget.set_feedback_style(style);
        rows.into_iter()
            .filter_map(|row| {
                let preview = self.snapshot.get(row)?.drag_configuration().preview?;
                Some((row, preview))
            })
            .collect()
    }

    /// Drag session end. A drag that ended in the trash runs the delete handler right away.
    ///
    /// Returns whether the delete handler ran.
    pub fn dragging_session_ended(
        &mut self,
        items: &[PasteboardItem],
        operation: DragOperations,
    ) -> bool {
        self.widget.set_feedback_style(FeedbackStyle::Regular);
        if !operation.contains(DragOperations::DELETE) {
            return false;
        }
        let rows = self.dragged_rows(items);
        let deleted = self.drop_configuration.handle_delete(&rows);
        adebug!(rows = rows.len(), deleted, "ListAdapter::dragging_session_ended");
        deleted
    }
}
