use listsync::Identity;

use crate::RowWidget;

/// A scroll anchor that keeps the viewport on an item identity across a full reload.
///
/// Typical use cases:
/// - a forced reload that prepends or removes rows above the viewport
/// - any replace where you want the viewport to stay anchored to an item identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollAnchor {
    pub id: Identity,
    /// The distance from the anchor row's top edge to the viewport's scroll offset.
    pub offset_in_row: u64,
}

/// Captures an anchor for the first visible row.
///
/// `row_to_id` maps a display row to its identity in the *current* data. Returns `None` when the
/// widget reports no visible rows.
pub fn capture_first_visible_anchor<W: RowWidget>(
    widget: &W,
    row_to_id: impl FnOnce(usize) -> Option<Identity>,
) -> Option<ScrollAnchor> {
    let (row, offset_in_row) = widget.visible_anchor()?;
    let id = row_to_id(row)?;
    Some(ScrollAnchor { id, offset_in_row })
}

/// Applies a previously captured anchor by scrolling its row back to the same position.
///
/// `id_to_row` maps an identity to its display row in the *new* data.
///
/// Returns `true` when the anchor was successfully applied.
pub fn apply_anchor<W: RowWidget>(
    widget: &mut W,
    anchor: &ScrollAnchor,
    id_to_row: impl FnOnce(&Identity) -> Option<usize>,
) -> bool {
    let Some(row) = id_to_row(&anchor.id) else {
        adebug!(id = %anchor.id, "apply_anchor: anchor row is gone");
        return false;
    };
    widget.scroll_to_row_offset(row, anchor.offset_in_row);
    true
}
