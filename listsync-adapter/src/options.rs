use listsync::{Animation, DragOperations};

/// Configuration shared by [`crate::ListAdapter`] and [`crate::OutlineAdapter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdapterOptions {
    /// Hint for list rows removed by an animated update.
    pub remove_animation: Animation,
    /// Hint for list rows inserted by an animated update.
    pub insert_animation: Animation,
    /// Hint for outline items removed or inserted by an animated update.
    pub outline_animation: Animation,
    /// Re-select the previously selected identities after a full reload.
    ///
    /// Animated updates always restore the selection.
    pub restore_selection_on_reload: bool,
    /// Keep the first visible row in place across a full reload.
    pub preserve_scroll_on_reload: bool,
    /// Operations advertised for drags that leave the widget.
    pub external_drag_operations: DragOperations,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            remove_animation: Animation::FADE | Animation::SLIDE_DOWN,
            insert_animation: Animation::FADE | Animation::SLIDE_LEFT,
            outline_animation: Animation::FADE,
            restore_selection_on_reload: false,
            preserve_scroll_on_reload: true,
            external_drag_operations: DragOperations::COPY | DragOperations::DELETE,
        }
    }
}

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_remove_animation(mut self, animation: Animation) -> Self {
        self.remove_animation = animation;
        self
    }

    pub fn with_insert_animation(mut self, animation: Animation) -> Self {
        self.insert_animation = animation;
        self
    }

    pub fn with_outline_animation(mut self, animation: Animation) -> Self {
        self.outline_animation = animation;
        self
    }

    pub fn with_restore_selection_on_reload(mut self, restore: bool) -> Self {
        self.restore_selection_on_reload = restore;
        self
    }

    pub fn with_preserve_scroll_on_reload(mut self, preserve: bool) -> Self {
        self.preserve_scroll_on_reload = preserve;
        self
    }

    pub fn with_external_drag_operations(mut self, operations: DragOperations) -> Self {
        self.external_drag_operations = operations;
        self
    }
}
