//! Drop destinations and the drop policy registry.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::{DragSource, DropOutcome, Identity, IndexPath, PayloadType, TreeIndex, TreeSnapshot};

/// Resolved target of a drop gesture.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DropDestination<T> {
    /// Outside every row. Distinct from dropping on, or above, row `0`.
    Root,
    /// Onto an existing item.
    On(T),
    /// Between children of `parent` (`None` is the root level), before child `offset`.
    Insert { parent: Option<T>, offset: usize },
}

impl<T> DropDestination<T> {
    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    /// The item the drop lands on or in, if any.
    pub fn target(&self) -> Option<&T> {
        match self {
            Self::Root => None,
            Self::On(target) => Some(target),
            Self::Insert { parent, .. } => parent.as_ref(),
        }
    }
}

/// How a list widget proposes to drop relative to its proposed row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListDropOperation {
    On,
    Above,
}

impl DropDestination<usize> {
    /// Resolves a list widget's proposal against a list of `len` rows.
    ///
    /// `row == None` (outside every row) and drops on a row that does not exist resolve to
    /// [`DropDestination::Root`]. Insertions past the end are clamped to `len`.
    pub fn from_list_proposal(row: Option<usize>, operation: ListDropOperation, len: usize) -> Self {
        match (row, operation) {
            (None, _) => Self::Root,
            (Some(row), ListDropOperation::On) if row < len => Self::On(row),
            (Some(_), ListDropOperation::On) => Self::Root,
            (Some(row), ListDropOperation::Above) => Self::Insert {
                parent: None,
                offset: row.min(len),
            },
        }
    }
}

impl DropDestination<TreeIndex> {
    /// Index path of the item the drop lands on or in; the root path for root-level drops.
    pub fn index_path(&self) -> IndexPath {
        self.target()
            .map(|target| target.index_path.clone())
            .unwrap_or_default()
    }

    /// Resolves an outline widget's proposal: a proposed parent item (`None` for the root) and
    /// a child offset (`None` for a drop onto the item itself).
    ///
    /// Returns `None` when `item` is not part of `tree`.
    pub fn from_outline_proposal(
        tree: &TreeSnapshot,
        item: Option<&Identity>,
        child: Option<usize>,
    ) -> Option<Self> {
        let target = match item {
            Some(id) => Some(tree.index(id)?),
            None => None,
        };
        Some(match (target, child) {
            (None, None) => Self::Root,
            (Some(target), None) => Self::On(target),
            (parent, Some(offset)) => Self::Insert { parent, offset },
        })
    }
}

/// Index type handed to drop handlers: a row for lists, a [`TreeIndex`] for outlines.
pub trait DropIndex: Clone + fmt::Debug + Send + Sync + 'static {
    /// `true` when dropping `self` at `destination` would place it inside itself.
    fn encloses(&self, destination: &DropDestination<Self>) -> bool;
}

impl DropIndex for usize {
    fn encloses(&self, _destination: &DropDestination<Self>) -> bool {
        false
    }
}

impl DropIndex for TreeIndex {
    fn encloses(&self, destination: &DropDestination<Self>) -> bool {
        match destination.target() {
            Some(target) => self.index_path.is_prefix_of(&target.index_path),
            None => false,
        }
    }
}

/// Registry key: a payload type offered from a given source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragInfo {
    pub ty: PayloadType,
    pub source: DragSource,
}

impl DragInfo {
    pub fn new(ty: impl Into<PayloadType>, source: DragSource) -> Self {
        Self {
            ty: ty.into(),
            source,
        }
    }
}

pub type DropOnHandler = Arc<dyn Fn(&[Vec<u8>]) + Send + Sync>;
pub type DropOnValidator = Arc<dyn Fn() -> bool + Send + Sync>;
pub type DropIntoHandler<T> = Arc<dyn Fn(&T, &[Vec<u8>]) + Send + Sync>;
pub type DropIntoValidator<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
pub type InsertHandler<T> = Arc<dyn Fn(Option<&T>, usize, &[Vec<u8>]) + Send + Sync>;
pub type InsertValidator<T> = Arc<dyn Fn(Option<&T>, usize) -> bool + Send + Sync>;
pub type TransferHandler<T> = Arc<dyn Fn(&[T], &DropDestination<T>) + Send + Sync>;
pub type TransferValidator<T> = Arc<dyn Fn(&[T], &DropDestination<T>) -> bool + Send + Sync>;
pub type DeleteHandler<T> = Arc<dyn Fn(&[T]) + Send + Sync>;
pub type DeleteValidator<T> = Arc<dyn Fn(&[T]) -> bool + Send + Sync>;

struct Entry<H, V> {
    info: DragInfo,
    handler: H,
    validator: Option<V>,
}

impl<H: Clone, V: Clone> Clone for Entry<H, V> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            handler: self.handler.clone(),
            validator: self.validator.clone(),
        }
    }
}

struct Slot<H, V> {
    handler: H,
    validator: Option<V>,
}

impl<H: Clone, V: Clone> Clone for Slot<H, V> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            validator: self.validator.clone(),
        }
    }
}

fn upsert<H, V>(entries: &mut Vec<Entry<H, V>>, info: DragInfo, handler: H, validator: Option<V>) {
    if info.ty.is_reserved() {
        lwarn!(ty = %info.ty, "DropConfiguration: reserved payload type ignored");
        debug_assert!(!info.ty.is_reserved(), "payload type `{}` is reserved", info.ty);
        return;
    }
    match entries.iter_mut().find(|entry| entry.info == info) {
        Some(entry) => {
            entry.handler = handler;
            entry.validator = validator;
        }
        None => entries.push(Entry {
            info,
            handler,
            validator,
        }),
    }
}

/// First entry, in registration order, keyed by an offered `DragInfo` whose validator accepts.
fn first_accepting<'a, H, V>(
    entries: &'a [Entry<H, V>],
    offered: &[DragInfo],
    accepts: impl Fn(&V) -> bool,
) -> Option<&'a Entry<H, V>> {
    entries.iter().find(|entry| {
        offered.contains(&entry.info) && entry.validator.as_ref().is_none_or(&accepts)
    })
}

/// Local drag facts a reorder or forced copy is validated against.
#[derive(Clone, Copy, Debug)]
pub struct LocalDrag<'a, T> {
    /// Dragged indexes decoded from the pasteboard.
    pub dragged: &'a [T],
    /// Rows the dragged items occupy together with their descendants.
    pub covered: usize,
    /// Rows in the dragged items' collection (all rows for lists, all nodes for outlines).
    pub total: usize,
    /// The copy modifier is held.
    pub forced_copy: bool,
    pub all_reorderable: bool,
    pub all_copyable: bool,
}

/// Handlers for every drop family, keyed by payload type and drag source.
///
/// `T` is the index type passed to handlers: [`ListDropConfiguration`] uses display rows and
/// [`OutlineDropConfiguration`] uses [`TreeIndex`]. Built once through the fluent `on_*` methods;
/// adapters hold it behind an `Arc` and only read it while handling events.
pub struct DropConfiguration<T> {
    drop_on: Vec<Entry<DropOnHandler, DropOnValidator>>,
    drop_into: Vec<Entry<DropIntoHandler<T>, DropIntoValidator<T>>>,
    insert: Vec<Entry<InsertHandler<T>, InsertValidator<T>>>,
    on_move: Option<Slot<TransferHandler<T>, TransferValidator<T>>>,
    on_copy: Option<Slot<TransferHandler<T>, TransferValidator<T>>>,
    on_delete: Option<Slot<DeleteHandler<T>, DeleteValidator<T>>>,
}

pub type ListDropConfiguration = DropConfiguration<usize>;
pub type OutlineDropConfiguration = DropConfiguration<TreeIndex>;

impl<T> Default for DropConfiguration<T> {
    fn default() -> Self {
        Self {
            drop_on: Vec::new(),
            drop_into: Vec::new(),
            insert: Vec::new(),
            on_move: None,
            on_copy: None,
            on_delete: None,
        }
    }
}

impl<T> Clone for DropConfiguration<T> {
    fn clone(&self) -> Self {
        Self {
            drop_on: self.drop_on.clone(),
            drop_into: self.drop_into.clone(),
            insert: self.insert.clone(),
            on_move: self.on_move.clone(),
            on_copy: self.on_copy.clone(),
            on_delete: self.on_delete.clone(),
        }
    }
}

impl<T> fmt::Debug for DropConfiguration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn keys<H, V>(entries: &[Entry<H, V>]) -> Vec<&DragInfo> {
            entries.iter().map(|entry| &entry.info).collect()
        }
        f.debug_struct("DropConfiguration")
            .field("drop_on", &keys(&self.drop_on))
            .field("drop_into", &keys(&self.drop_into))
            .field("insert", &keys(&self.insert))
            .field("on_move", &self.on_move.is_some())
            .field("on_copy", &self.on_copy.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .finish()
    }
}

impl<T: DropIndex> DropConfiguration<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles `ty` dropped from `source` outside every row.
    pub fn on_drop(
        mut self,
        ty: impl Into<PayloadType>,
        source: DragSource,
        handler: impl Fn(&[Vec<u8>]) + Send + Sync + 'static,
    ) -> Self {
        upsert(&mut self.drop_on, DragInfo::new(ty, source), Arc::new(handler), None);
        self
    }

    pub fn on_drop_validated(
        mut self,
        ty: impl Into<PayloadType>,
        source: DragSource,
        handler: impl Fn(&[Vec<u8>]) + Send + Sync + 'static,
        validate: impl Fn() -> bool + Send + Sync + 'static,
    ) -> Self {
        let validator: DropOnValidator = Arc::new(validate);
        upsert(
            &mut self.drop_on,
            DragInfo::new(ty, source),
            Arc::new(handler),
            Some(validator),
        );
        self
    }

    /// Handles `ty` dropped from `source` onto an item.
    pub fn on_drop_into(
        mut self,
        ty: impl Into<PayloadType>,
        source: DragSource,
        handler: impl Fn(&T, &[Vec<u8>]) + Send + Sync + 'static,
    ) -> Self {
        upsert(&mut self.drop_into, DragInfo::new(ty, source), Arc::new(handler), None);
        self
    }

    pub fn on_drop_into_validated(
        mut self,
        ty: impl Into<PayloadType>,
        source: DragSource,
        handler: impl Fn(&T, &[Vec<u8>]) + Send + Sync + 'static,
        validate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        let validator: DropIntoValidator<T> = Arc::new(validate);
        upsert(
            &mut self.drop_into,
            DragInfo::new(ty, source),
            Arc::new(handler),
            Some(validator),
        );
        self
    }

    /// Handles `ty` dropped from `source` between rows.
    pub fn on_insert(
        mut self,
        ty: impl Into<PayloadType>,
        source: DragSource,
        handler: impl Fn(Option<&T>, usize, &[Vec<u8>]) + Send + Sync + 'static,
    ) -> Self {
        upsert(&mut self.insert, DragInfo::new(ty, source), Arc::new(handler), None);
        self
    }

    pub fn on_insert_validated(
        mut self,
        ty: impl Into<PayloadType>,
        source: DragSource,
        handler: impl Fn(Option<&T>, usize, &[Vec<u8>]) + Send + Sync + 'static,
        validate: impl Fn(Option<&T>, usize) -> bool + Send + Sync + 'static,
    ) -> Self {
        let validator: InsertValidator<T> = Arc::new(validate);
        upsert(
            &mut self.insert,
            DragInfo::new(ty, source),
            Arc::new(handler),
            Some(validator),
        );
        self
    }

    /// Handles a local reorder. Without a move handler reorders are rejected.
    pub fn on_move(
        mut self,
        handler: impl Fn(&[T], &DropDestination<T>) + Send + Sync + 'static,
    ) -> Self {
        self.on_move = Some(Slot {
            handler: Arc::new(handler),
            validator: None,
        });
        self
    }

    pub fn on_move_validated(
        mut self,
        handler: impl Fn(&[T], &DropDestination<T>) + Send + Sync + 'static,
        validate: impl Fn(&[T], &DropDestination<T>) -> bool + Send + Sync + 'static,
    ) -> Self {
        let validator: TransferValidator<T> = Arc::new(validate);
        self.on_move = Some(Slot {
            handler: Arc::new(handler),
            validator: Some(validator),
        });
        self
    }

    /// Handles a local drag with the copy modifier held.
    pub fn on_copy(
        mut self,
        handler: impl Fn(&[T], &DropDestination<T>) + Send + Sync + 'static,
    ) -> Self {
        self.on_copy = Some(Slot {
            handler: Arc::new(handler),
            validator: None,
        });
        self
    }

    pub fn on_copy_validated(
        mut self,
        handler: impl Fn(&[T], &DropDestination<T>) + Send + Sync + 'static,
        validate: impl Fn(&[T], &DropDestination<T>) -> bool + Send + Sync + 'static,
    ) -> Self {
        let validator: TransferValidator<T> = Arc::new(validate);
        self.on_copy = Some(Slot {
            handler: Arc::new(handler),
            validator: Some(validator),
        });
        self
    }

    /// Handles rows dragged to the trash.
    pub fn on_delete(mut self, handler: impl Fn(&[T]) + Send + Sync + 'static) -> Self {
        self.on_delete = Some(Slot {
            handler: Arc::new(handler),
            validator: None,
        });
        self
    }

    pub fn on_delete_validated(
        mut self,
        handler: impl Fn(&[T]) + Send + Sync + 'static,
        validate: impl Fn(&[T]) -> bool + Send + Sync + 'static,
    ) -> Self {
        let validator: DeleteValidator<T> = Arc::new(validate);
        self.on_delete = Some(Slot {
            handler: Arc::new(handler),
            validator: Some(validator),
        });
        self
    }

    /// Distinct payload types any family accepts, in registration order.
    ///
    /// The reserved index type is not included; widgets register it separately.
    pub fn available_types(&self) -> Vec<PayloadType> {
        let mut out: Vec<PayloadType> = Vec::new();
        let infos = self
            .drop_on
            .iter()
            .map(|entry| &entry.info)
            .chain(self.drop_into.iter().map(|entry| &entry.info))
            .chain(self.insert.iter().map(|entry| &entry.info));
        for info in infos {
            if !out.contains(&info.ty) {
                out.push(info.ty.clone());
            }
        }
        out
    }

    pub fn can_handle_drop_on(&self, offered: &[DragInfo]) -> bool {
        first_accepting(&self.drop_on, offered, |validate| validate()).is_some()
    }

    pub fn can_handle_drop_into(&self, offered: &[DragInfo], target: &T) -> bool {
        first_accepting(&self.drop_into, offered, |validate| validate(target)).is_some()
    }

    pub fn can_handle_insert(&self, offered: &[DragInfo], parent: Option<&T>, offset: usize) -> bool {
        first_accepting(&self.insert, offered, |validate| validate(parent, offset)).is_some()
    }

    /// Routes [`DropConfiguration::can_handle_drop_on`] and friends by destination.
    pub fn can_handle(&self, offered: &[DragInfo], destination: &DropDestination<T>) -> bool {
        match destination {
            DropDestination::Root => self.can_handle_drop_on(offered),
            DropDestination::On(target) => self.can_handle_drop_into(offered, target),
            DropDestination::Insert { parent, offset } => {
                self.can_handle_insert(offered, parent.as_ref(), *offset)
            }
        }
    }

    /// Invokes the handler registered for exactly `info` and the destination's family.
    ///
    /// Unregistered combinations are a no-op.
    pub fn dispatch(&self, info: &DragInfo, destination: &DropDestination<T>, data: &[Vec<u8>]) {
        match destination {
            DropDestination::Root => {
                if let Some(entry) = self.drop_on.iter().find(|entry| entry.info == *info) {
                    (entry.handler)(data);
                }
            }
            DropDestination::On(target) => {
                if let Some(entry) = self.drop_into.iter().find(|entry| entry.info == *info) {
                    (entry.handler)(target, data);
                }
            }
            DropDestination::Insert { parent, offset } => {
                if let Some(entry) = self.insert.iter().find(|entry| entry.info == *info) {
                    (entry.handler)(parent.as_ref(), *offset, data);
                }
            }
        }
    }

    pub fn has_move_handler(&self) -> bool {
        self.on_move.is_some()
    }

    pub fn has_copy_handler(&self) -> bool {
        self.on_copy.is_some()
    }

    pub fn has_delete_handler(&self) -> bool {
        self.on_delete.is_some()
    }

    /// Move handler registered and its validator (if any) accepts.
    pub fn validate_move(&self, dragged: &[T], destination: &DropDestination<T>) -> bool {
        self.on_move.as_ref().is_some_and(|slot| {
            slot.validator
                .as_ref()
                .is_none_or(|validate| validate(dragged, destination))
        })
    }

    /// Copy handler registered and its validator (if any) accepts.
    pub fn validate_copy(&self, dragged: &[T], destination: &DropDestination<T>) -> bool {
        self.on_copy.as_ref().is_some_and(|slot| {
            slot.validator
                .as_ref()
                .is_none_or(|validate| validate(dragged, destination))
        })
    }

    /// Delete handler registered and its validator (if any) accepts.
    pub fn validate_delete(&self, dragged: &[T]) -> bool {
        self.on_delete.as_ref().is_some_and(|slot| {
            slot.validator
                .as_ref()
                .is_none_or(|validate| validate(dragged))
        })
    }

    /// Decides a drag that started in the same widget.
    ///
    /// A forced copy needs a copy handler and every dragged item copyable. A reorder needs the
    /// dragged items to cover fewer than `total` rows, every dragged item reorderable, no dragged item enclosing the
    /// destination, and an accepting move handler.
    pub fn validate_local(
        &self,
        drag: &LocalDrag<'_, T>,
        destination: &DropDestination<T>,
    ) -> DropOutcome {
        if drag.dragged.is_empty() {
            return DropOutcome::None;
        }
        if drag.forced_copy {
            if drag.all_copyable && self.validate_copy(drag.dragged, destination) {
                return DropOutcome::Copy;
            }
            ltrace!(dragged = drag.dragged.len(), "validate_local: copy rejected");
            return DropOutcome::None;
        }
        let accepted = drag.covered < drag.total
            && drag.all_reorderable
            && !drag.dragged.iter().any(|index| index.encloses(destination))
            && self.validate_move(drag.dragged, destination);
        if accepted {
            DropOutcome::Move
        } else {
            ltrace!(
                dragged = drag.dragged.len(),
                covered = drag.covered,
                total = drag.total,
                "validate_local: reorder rejected"
            );
            DropOutcome::None
        }
    }

    /// Decides a drag from another widget or process: a copy when some registration accepts.
    pub fn validate_foreign(
        &self,
        offered: &[DragInfo],
        destination: &DropDestination<T>,
    ) -> DropOutcome {
        if self.can_handle(offered, destination) {
            DropOutcome::Copy
        } else {
            ltrace!(offered = offered.len(), "validate_foreign: rejected");
            DropOutcome::None
        }
    }

    pub fn handle_move(&self, dragged: &[T], destination: &DropDestination<T>) {
        if let Some(slot) = &self.on_move {
            (slot.handler)(dragged, destination);
        }
    }

    pub fn handle_copy(&self, dragged: &[T], destination: &DropDestination<T>) {
        if let Some(slot) = &self.on_copy {
            (slot.handler)(dragged, destination);
        }
    }

    /// Runs the delete handler when its validator accepts. Returns whether it ran.
    pub fn handle_delete(&self, dragged: &[T]) -> bool {
        if dragged.is_empty() || !self.validate_delete(dragged) {
            return false;
        }
        if let Some(slot) = &self.on_delete {
            (slot.handler)(dragged);
        }
        true
    }
}
