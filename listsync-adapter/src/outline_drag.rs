use alloc::vec::Vec;

use listsync::{
    DragConfiguration, DragOperations, DragPreview, DragSource, DropDestination, DropOutcome,
    FeedbackStyle, LocalDrag, PasteboardItem, TreeIndex,
};

use crate::pending::Resolved;
use crate::{DraggingInfo, HandleId, OutlineAdapter, OutlineWidget};

impl<W: OutlineWidget> OutlineAdapter<W> {
    /// Pasteboard contents for dragging the item of `handle`.
    ///
    /// Reorderable, deletable and copyable items also carry the reserved index payload.
    pub fn pasteboard_writer(&self, handle: HandleId) -> Option<PasteboardItem> {
        let id = self.handles.identity(handle)?;
        let (item, path) = (self.snapshot.get(id)?, self.snapshot.index_path(id)?);
        let configuration = item.drag_configuration();
        let mut pasteboard = PasteboardItem::new();
        pasteboard.write_payloads(&configuration);
        if configuration.is_structural() {
            pasteboard.write_index(path);
        }
        (!pasteboard.is_empty()).then_some(pasteboard)
    }

    /// Items named by the index payloads of a local drag. Paths that no longer resolve are
    /// skipped.
    fn dragged_indexes(&self, items: &[PasteboardItem]) -> Vec<TreeIndex> {
        let mut out: Vec<TreeIndex> = Vec::new();
        for path in items.iter().filter_map(PasteboardItem::index) {
            let Some(id) = self.snapshot.identifier_at(&path) else {
                continue;
            };
            if out.iter().all(|index| index.id != *id) {
                out.push(TreeIndex::new(id.clone(), path));
            }
        }
        out
    }

    fn all_items(
        &self,
        dragged: &[TreeIndex],
        check: impl Fn(&DragConfiguration) -> bool,
    ) -> bool {
        dragged.iter().all(|index| {
            self.snapshot
                .get(&index.id)
                .is_some_and(|item| check(&item.drag_configuration()))
        })
    }

    fn resolve_drop(
        &self,
        info: &DraggingInfo,
        item: Option<HandleId>,
        child: Option<usize>,
    ) -> Resolved<TreeIndex> {
        let source = info.source_for(self.widget.id());
        let target = match item {
            None => Some(None),
            Some(handle) => self.handles.identity(handle).map(Some),
        };
        let destination = target.and_then(|target| {
            DropDestination::<TreeIndex>::from_outline_proposal(&self.snapshot, target, child)
        });
        let Some(destination) = destination else {
            adebug!("OutlineAdapter::resolve_drop: proposed item is not part of the tree");
            return Resolved {
                source,
                local: false,
                destination: DropDestination::Root,
                dragged: Vec::new(),
                outcome: DropOutcome::None,
            };
        };

        let dragged = if source == DragSource::Local {
            self.dragged_indexes(&info.items)
        } else {
            Vec::new()
        };
        let local = !dragged.is_empty();

        let outcome = if local {
            let drag = LocalDrag {
                dragged: &dragged,
                covered: self
                    .snapshot
                    .covered_len(dragged.iter().map(|index| &index.id)),
                total: self.snapshot.len(),
                forced_copy: info.operation_mask.is_forced_copy(),
                all_reorderable: self.all_items(&dragged, |c| c.is_reorderable),
                all_copyable: self.all_items(&dragged, |c| c.is_copyable),
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

    /// Decides the drop cursor for a drag proposed onto `item` (`None` is the root) at child
    /// offset `child` (`None` drops onto the item itself).
    pub fn validate_drop(
        &self,
        info: &DraggingInfo,
        item: Option<HandleId>,
        child: Option<usize>,
    ) -> DropOutcome {
        self.resolve_drop(info, item, child).outcome
    }

    /// Accepts a drop previously validated at the same proposal.
    ///
    /// Every handler call is queued and runs on [`OutlineAdapter::run_pending`]; the tree is only
    /// updated by the next [`OutlineAdapter::apply`].
    pub fn accept_drop(
        &mut self,
        info: &DraggingInfo,
        item: Option<HandleId>,
        child: Option<usize>,
    ) -> bool {
        let resolved = self.resolve_drop(info, item, child);
        let configuration = self.drop_configuration.clone();
        let accepted = self.pending.accept(&configuration, resolved, info);
        adebug!(accepted, pending = self.pending.len(), "OutlineAdapter::accept_drop");
        accepted
    }

    /// Drag session start: gap feedback for single-item drags, and the previews of dragged items.
    pub fn dragging_session_will_begin(
        &mut self,
        items: &[PasteboardItem],
    ) -> Vec<(TreeIndex, DragPreview)> {
        let dragged = self.dragged_indexes(items);
        let style = if dragged.len() == 1 {
            FeedbackStyle::Gap
        } else {
            FeedbackStyle::Regular
        };
        self.widget.set_feedback_style(style);
        dragged
            .into_iter()
            .filter_map(|index| {
                let preview = self.snapshot.get(&index.id)?.drag_configuration().preview?;
                Some((index, preview))
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
        let dragged = self.dragged_indexes(items);
        let deleted = self.drop_configuration.handle_delete(&dragged);
        adebug!(items = dragged.len(), deleted, "OutlineAdapter::dragging_session_ended");
        deleted
    }
}
