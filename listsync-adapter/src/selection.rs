use alloc::sync::Arc;
use core::fmt;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use listsync::{RowSet, TreeIndex};

use crate::RowWidget;

/// Rows a context action should apply to.
///
/// A click on a selected row acts on the whole selection, a click outside the selection acts on
/// the clicked row alone, and without a click the selection is used as-is.
pub fn effective_selection(selected: &RowSet, clicked: Option<usize>) -> RowSet {
    match clicked {
        Some(row) if !selected.contains(row) => RowSet::single(row),
        _ => selected.clone(),
    }
}

/// Shared "programmatic update in progress" flag.
///
/// Set for the whole of a batched reconciliation, including the selection restore that follows
/// it. Hosts forwarding native selection notifications can hold a clone and drop notifications
/// while it is set.
#[derive(Clone, Debug, Default)]
pub struct EditingFlag(Arc<AtomicBool>);

impl EditingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, value: bool) {
        self.0.store(value, Ordering::Release);
    }
}

/// Batched widget update: `begin_updates` on creation, `end_updates` on drop.
///
/// Holding the editing flag for the lifetime of the batch means every exit path (including early
/// returns) closes the batch and clears the flag.
pub(crate) struct UpdateBatch<'a, W: RowWidget> {
    widget: &'a mut W,
    editing: &'a EditingFlag,
}

impl<'a, W: RowWidget> UpdateBatch<'a, W> {
    pub(crate) fn begin(widget: &'a mut W, editing: &'a EditingFlag) -> Self {
        editing.set(true);
        widget.begin_updates();
        atrace!("batch begin");
        Self { widget, editing }
    }
}

impl<W: RowWidget> Deref for UpdateBatch<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.widget
    }
}

impl<W: RowWidget> DerefMut for UpdateBatch<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.widget
    }
}

impl<W: RowWidget> Drop for UpdateBatch<'_, W> {
    fn drop(&mut self) {
        self.widget.end_updates();
        self.editing.set(false);
        atrace!("batch end");
    }
}

/// Runs `f` with the editing flag set, clearing it afterwards.
pub(crate) fn while_editing<R>(editing: &EditingFlag, f: impl FnOnce() -> R) -> R {
    editing.set(true);
    let out = f();
    editing.set(false);
    out
}

pub type ListSelectHandler = Arc<dyn Fn(&RowSet) + Send + Sync>;

pub type OutlineSelectAction = Arc<dyn Fn(&[TreeIndex]) + Send + Sync>;
pub type OutlineSelectValidator = Arc<dyn Fn(&[TreeIndex]) -> bool + Send + Sync>;

/// Receives user-driven outline selections.
#[derive(Clone)]
pub struct SelectionProvider {
    action: OutlineSelectAction,
    validator: Option<OutlineSelectValidator>,
}

impl SelectionProvider {
    pub fn new(action: impl Fn(&[TreeIndex]) + Send + Sync + 'static) -> Self {
        Self {
            action: Arc::new(action),
            validator: None,
        }
    }

    /// Only selections the validator accepts reach the action.
    pub fn with_validator(
        mut self,
        validate: impl Fn(&[TreeIndex]) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validate));
        self
    }

    pub fn validate(&self, selection: &[TreeIndex]) -> bool {
        self.validator
            .as_ref()
            .is_none_or(|validate| validate(selection))
    }

    /// Delivers `selection` if it validates. Returns whether the action ran.
    pub fn select(&self, selection: &[TreeIndex]) -> bool {
        if !self.validate(selection) {
            return false;
        }
        (self.action)(selection);
        true
    }
}

impl fmt::Debug for SelectionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionProvider")
            .field("validator", &self.validator.is_some())
            .finish_non_exhaustive()
    }
}

