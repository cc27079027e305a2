use listsync::{HandleChanges, Identity, KeyMap};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Opaque outline item handle.
    ///
    /// A handle stays valid for as long as its identity is part of the tree, so the widget can key
    /// expansion state and animations on it across updates.
    pub struct HandleId;
}

impl HandleId {
    /// Raw value for hosts that need a numeric id.
    pub fn as_raw(self) -> u64 {
        use slotmap::Key;
        self.data().as_ffi()
    }
}

/// Arena of outline handles indexed by identity.
///
/// Handles are created and released explicitly; a persisting identity keeps its handle.
#[derive(Clone, Debug, Default)]
pub struct HandleArena {
    handles: SlotMap<HandleId, Identity>,
    by_identity: KeyMap<Identity, HandleId>,
}

impl HandleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Returns the handle of `id`, creating one if needed.
    pub fn ensure(&mut self, id: &Identity) -> HandleId {
        if let Some(&handle) = self.by_identity.get(id) {
            return handle;
        }
        let handle = self.handles.insert(id.clone());
        self.by_identity.insert(id.clone(), handle);
        handle
    }

    pub fn release(&mut self, id: &Identity) -> Option<HandleId> {
        let handle = self.by_identity.remove(id)?;
        self.handles.remove(handle);
        Some(handle)
    }

    pub fn get(&self, id: &Identity) -> Option<HandleId> {
        self.by_identity.get(id).copied()
    }

    pub fn identity(&self, handle: HandleId) -> Option<&Identity> {
        self.handles.get(handle)
    }

    pub fn apply(&mut self, changes: &HandleChanges) {
        for id in &changes.dropped {
            self.release(id);
        }
        for id in &changes.created {
            self.ensure(id);
        }
        atrace!(
            created = changes.created.len(),
            dropped = changes.dropped.len(),
            live = self.handles.len(),
            "HandleArena::apply"
        );
    }
}
