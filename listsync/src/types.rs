bitflags::bitflags! {
    /// Animation hint passed to the widget with row insertions and removals.
    ///
    /// Hints are flags: `Animation::FADE | Animation::SLIDE_DOWN` asks for both effects. The widget
    /// is free to ignore any of them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Animation: u8 {
        const FADE = 1 << 0;
        const SLIDE_DOWN = 1 << 1;
        const SLIDE_UP = 1 << 2;
        const SLIDE_LEFT = 1 << 3;
        const SLIDE_RIGHT = 1 << 4;
    }
}

impl Animation {
    pub const NONE: Self = Self::empty();

    pub fn is_none(self) -> bool {
        self.is_empty()
    }
}

bitflags::bitflags! {
    /// Operations a drag gesture offers or a drop resolves to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct DragOperations: u8 {
        const COPY = 1 << 0;
        const MOVE = 1 << 1;
        const DELETE = 1 << 2;
    }
}

impl DragOperations {
    pub const NONE: Self = Self::empty();
    pub const ALL: Self = Self::all();

    /// `true` when the gesture is restricted to copying, which is what the platform reports while
    /// the copy modifier is held during a local drag.
    pub fn is_forced_copy(self) -> bool {
        self == Self::COPY
    }
}

/// Outcome of drop validation, shown by the widget as the drop cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DropOutcome {
    #[default]
    None,
    Copy,
    Move,
}

/// Where a drag gesture came from, relative to the widget receiving it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragSource {
    /// Started in the same widget instance.
    Local,
    /// Started in another widget of the same process.
    Internal,
    /// Started outside the process.
    External,
}

/// Drop indicator style while dragging over the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedbackStyle {
    #[default]
    Regular,
    /// Rows part to open a gap at the insertion point.
    Gap,
}

/// Edge of a row that swipe actions are revealed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowActionEdge {
    Leading,
    Trailing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RowActionStyle {
    #[default]
    Regular,
    Destructive,
}

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: u8::MAX }
    }
}

/// Icon tint of an outline row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tint {
    /// The platform accent color.
    #[default]
    Accent,
    Monochrome,
    Preferred(Color),
}

impl From<Option<Color>> for Tint {
    /// `None` means the item opted out of color.
    fn from(color: Option<Color>) -> Self {
        color.map_or(Self::Monochrome, Self::Preferred)
    }
}
