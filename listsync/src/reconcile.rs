//! Pure reconciliation planning.
//!
//! Planners compare two snapshots and describe the widget mutations that turn one into the other.
//! They never touch a widget; adapters replay a plan inside one batched update.

use alloc::vec::Vec;

use crate::{Identity, ItemRef, RowSet, Snapshot, TreeSnapshot, diff};

/// Instruction to re-bind the visible cell at `position` to `item` without structural changes.
#[derive(Clone, Debug)]
pub struct Rebind<P> {
    pub position: P,
    pub item: ItemRef,
}

/// Mutations that turn one flat snapshot into another.
#[derive(Clone, Debug, Default)]
pub struct ListPlan {
    /// Rows (in the old snapshot) whose identity survives but whose content changed.
    pub rebinds: Vec<Rebind<usize>>,
    /// Old rows to remove.
    pub removed: RowSet,
    /// New rows to insert, after the removals.
    pub inserted: RowSet,
}

impl ListPlan {
    pub fn is_structural(&self) -> bool {
        !self.removed.is_empty() || !self.inserted.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.rebinds.is_empty() && !self.is_structural()
    }
}

/// Plans an animated flat update.
///
/// A surviving identity never shows up in `removed`/`inserted` unless its relative order changed;
/// content-only changes become [`Rebind`]s.
pub fn plan_list(old: &Snapshot, new: &Snapshot) -> ListPlan {
    let mut rebinds = Vec::new();
    for (row, old_item) in old.iter().enumerate() {
        let Some(new_item) = new.get_by_id(&old_item.identity()) else {
            continue;
        };
        if !old_item.content_equals(new_item.as_ref()) {
            rebinds.push(Rebind {
                position: row,
                item: new_item.clone(),
            });
        }
    }

    let difference = diff(&old.identifiers(), &new.identifiers());
    let plan = ListPlan {
        rebinds,
        removed: difference.removed_offsets(),
        inserted: difference.inserted_offsets(),
    };
    ltrace!(
        rebinds = plan.rebinds.len(),
        removed = plan.removed.len(),
        inserted = plan.inserted.len(),
        "plan_list"
    );
    plan
}

/// One structural outline mutation, scoped to a parent (`None` is the root level).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutlineOp {
    /// Refresh the parent row itself, leaving its children alone.
    ReloadParent { parent: Option<Identity> },
    Remove {
        parent: Option<Identity>,
        offset: usize,
    },
    Insert {
        parent: Option<Identity>,
        offset: usize,
    },
}

/// Identities entering and leaving the tree; adapters create and drop handles from this.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleChanges {
    pub created: Vec<Identity>,
    pub dropped: Vec<Identity>,
}

impl HandleChanges {
    /// Both lists are sorted so replay order is deterministic.
    pub fn between(old: &TreeSnapshot, new: &TreeSnapshot) -> Self {
        let mut created: Vec<Identity> = new
            .identifiers()
            .iter()
            .filter(|id| !old.contains(id))
            .cloned()
            .collect();
        let mut dropped: Vec<Identity> = old
            .identifiers()
            .iter()
            .filter(|id| !new.contains(id))
            .cloned()
            .collect();
        created.sort_unstable();
        dropped.sort_unstable();
        Self { created, dropped }
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.dropped.is_empty()
    }
}

/// Mutations that turn one tree snapshot into another.
#[derive(Clone, Debug, Default)]
pub struct OutlinePlan {
    /// Surviving identities whose content changed, with their new item.
    pub rebinds: Vec<Rebind<Identity>>,
    pub handles: HandleChanges,
    /// Structural operations in replay order.
    pub ops: Vec<OutlineOp>,
}

/// Plans an animated tree update.
///
/// Levels are diffed top-down. A level whose child order changed emits a parent reload followed
/// by its removals (descending offsets) and insertions (ascending offsets). Recursion continues
/// into every surviving child; levels that did not change emit nothing, so untouched subtrees keep
/// their widget state.
pub fn plan_outline(old: &TreeSnapshot, new: &TreeSnapshot) -> OutlinePlan {
    let mut rebinds = Vec::new();
    for id in old.preorder() {
        let (Some(old_item), Some(new_item)) = (old.get(&id), new.get(&id)) else {
            continue;
        };
        if !old_item.content_equals(new_item.as_ref()) {
            rebinds.push(Rebind {
                position: id,
                item: new_item.clone(),
            });
        }
    }

    let mut ops = Vec::new();
    plan_level(old, new, None, &mut ops);

    let plan = OutlinePlan {
        rebinds,
        handles: HandleChanges::between(old, new),
        ops,
    };
    ltrace!(
        rebinds = plan.rebinds.len(),
        created = plan.handles.created.len(),
        dropped = plan.handles.dropped.len(),
        ops = plan.ops.len(),
        "plan_outline"
    );
    plan
}

fn plan_level(
    old: &TreeSnapshot,
    new: &TreeSnapshot,
    parent: Option<&Identity>,
    ops: &mut Vec<OutlineOp>,
) {
    let old_children = old.children(parent);
    let new_children = new.children(parent);
    if old_children.is_empty() && new_children.is_empty() {
        return;
    }

    let difference = diff(old_children, new_children);
    if !difference.is_empty() {
        ops.push(OutlineOp::ReloadParent {
            parent: parent.cloned(),
        });
        for change in difference.removals() {
            ops.push(OutlineOp::Remove {
                parent: parent.cloned(),
                offset: change.offset(),
            });
        }
        for change in difference.insertions() {
            ops.push(OutlineOp::Insert {
                parent: parent.cloned(),
                offset: change.offset(),
            });
        }
    }

    let removed = difference.removed_offsets();
    for (offset, child) in old_children.iter().enumerate() {
        if removed.contains(offset) {
            continue;
        }
        plan_level(old, new, Some(child), ops);
    }
}
