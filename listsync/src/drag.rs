use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use crate::IndexPath;

/// Type tag of a pasteboard payload (a UTI or MIME string).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayloadType(Cow<'static, str>);

impl PayloadType {
    /// Private type carrying the dragged row index / index path.
    ///
    /// Registrations for this type are refused so application payloads can never collide with it.
    pub const INDEX: Self = Self::from_static("org.listsync.private.row-index");

    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_reserved(&self) -> bool {
        *self == Self::INDEX
    }
}

impl From<&'static str> for PayloadType {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque drag image.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragPreview {
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<[u8]>,
}

/// Lazily evaluated payload bytes for one pasteboard type.
pub type PayloadProvider = Arc<dyn Fn() -> Vec<u8> + Send + Sync>;

/// Drag capabilities of a single item.
#[derive(Clone, Default)]
pub struct DragConfiguration {
    providers: Vec<(PayloadType, PayloadProvider)>,
    /// The item may be reordered by a local drag.
    pub is_reorderable: bool,
    /// The item may be deleted by dragging it to the trash.
    pub is_deletable: bool,
    /// The item may be copied by a local drag with the copy modifier held.
    pub is_copyable: bool,
    pub preview: Option<DragPreview>,
}

impl DragConfiguration {
    pub fn new(is_reorderable: bool, is_deletable: bool, is_copyable: bool) -> Self {
        Self {
            providers: Vec::new(),
            is_reorderable,
            is_deletable,
            is_copyable,
            preview: None,
        }
    }

    /// Registers a provider for `ty`, replacing any previous provider of the same type.
    ///
    /// The reserved [`PayloadType::INDEX`] is refused.
    pub fn on_drag(
        mut self,
        ty: impl Into<PayloadType>,
        provider: impl Fn() -> Vec<u8> + Send + Sync + 'static,
    ) -> Self {
        let ty = ty.into();
        if ty.is_reserved() {
            lwarn!(ty = %ty, "DragConfiguration::on_drag: reserved payload type ignored");
            debug_assert!(!ty.is_reserved(), "payload type `{ty}` is reserved");
            return self;
        }
        self.providers.retain(|(existing, _)| *existing != ty);
        self.providers.push((ty, Arc::new(provider)));
        self
    }

    pub fn with_preview(mut self, preview: DragPreview) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn remove_provider(&mut self, ty: &PayloadType) {
        self.providers.retain(|(existing, _)| existing != ty);
    }

    pub fn has_data(&self) -> bool {
        !self.providers.is_empty()
    }

    /// `true` when the item takes part in any structural drag (reorder, delete or copy).
    pub fn is_structural(&self) -> bool {
        self.is_reorderable || self.is_deletable || self.is_copyable
    }

    pub fn payload_types(&self) -> impl Iterator<Item = &PayloadType> {
        self.providers.iter().map(|(ty, _)| ty)
    }

    /// Evaluates every provider, in registration order.
    pub fn for_each_payload(&self, mut f: impl FnMut(&PayloadType, Vec<u8>)) {
        for (ty, provider) in &self.providers {
            f(ty, provider());
        }
    }
}

impl fmt::Debug for DragConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragConfiguration")
            .field(
                "providers",
                &self.providers.iter().map(|(ty, _)| ty).collect::<Vec<_>>(),
            )
            .field("is_reorderable", &self.is_reorderable)
            .field("is_deletable", &self.is_deletable)
            .field("is_copyable", &self.is_copyable)
            .field("preview", &self.preview.is_some())
            .finish()
    }
}

/// One dragged row on the pasteboard: payload bytes keyed by type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PasteboardItem {
    entries: Vec<(PayloadType, Vec<u8>)>,
}

impl PasteboardItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, ty: PayloadType, data: Vec<u8>) {
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == ty) {
            entry.1 = data;
        } else {
            self.entries.push((ty, data));
        }
    }

    pub fn data(&self, ty: &PayloadType) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == ty)
            .map(|(_, data)| data.as_slice())
    }

    pub fn types(&self) -> impl Iterator<Item = &PayloadType> {
        self.entries.iter().map(|(ty, _)| ty)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes every payload of `configuration`. Returns `false` when it has none.
    pub fn write_payloads(&mut self, configuration: &DragConfiguration) -> bool {
        if !configuration.has_data() {
            return false;
        }
        configuration.for_each_payload(|ty, data| self.set_data(ty.clone(), data));
        true
    }

    pub fn write_index(&mut self, path: &IndexPath) {
        self.set_data(PayloadType::INDEX, path.to_payload());
    }

    /// Decodes the reserved index payload.
    ///
    /// A missing or malformed payload yields `None`; the dependent operation is then skipped.
    pub fn index(&self) -> Option<IndexPath> {
        let bytes = self.data(&PayloadType::INDEX)?;
        match IndexPath::from_payload(bytes) {
            Ok(path) => Some(path),
            Err(_err) => {
                lwarn!(error = %_err, "PasteboardItem::index: malformed index payload");
                None
            }
        }
    }
}

/// Collects the distinct payload types of `items` in first-seen order.
pub fn offered_types<'a>(items: impl IntoIterator<Item = &'a PasteboardItem>) -> Vec<PayloadType> {
    let mut out: Vec<PayloadType> = Vec::new();
    for item in items {
        for ty in item.types() {
            if !out.contains(ty) {
                out.push(ty.clone());
            }
        }
    }
    out
}
