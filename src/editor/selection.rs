use std::ops::Range;

use crate::document::{DocumentTree, NodeId};
use crate::layout::ComponentLayout;

use super::source::{word_end_boundary, word_start_boundary};
use super::VisualCursor;

/// A selection between two cursor positions. The endpoints are kept in
/// visual order (`start` is line-order first); a selection is empty when
/// either endpoint is invalid or both are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub start: VisualCursor,
    pub end: VisualCursor,
}

impl Selection {
    pub const EMPTY: Selection = Selection {
        start: VisualCursor::INVALID,
        end: VisualCursor::INVALID,
    };

    pub fn is_empty(&self) -> bool {
        !self.start.is_valid() || !self.end.is_valid() || self.start == self.end
    }

    /// Whether the selection's endpoints live in different components.
    pub fn spans_components(&self) -> bool {
        !self.is_empty() && self.start.component != self.end.component
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Visual-order comparison of two cursors: line order between components,
/// offset order within one.
pub fn cursor_before(layout: &ComponentLayout, a: VisualCursor, b: VisualCursor) -> bool {
    if a.component == b.component {
        return a.offset <= b.offset;
    }
    layout.is_before(a.component, b.component)
}

fn ordered(layout: &ComponentLayout, anchor: VisualCursor, focus: VisualCursor) -> Selection {
    if cursor_before(layout, anchor, focus) {
        Selection {
            start: anchor,
            end: focus,
        }
    } else {
        Selection {
            start: focus,
            end: anchor,
        }
    }
}

/// Advance a selection for a cursor that moved from `old_cursor` to
/// `new_cursor`.
///
/// A reset (plain click, Escape) empties the selection. An empty selection
/// starts fresh between the two cursors. Otherwise the endpoint equal to
/// `old_cursor` is the dragged handle: the opposite endpoint stays fixed
/// and the pair is re-ordered, which lets a drag flip the selection
/// direction past the fixed end. If neither endpoint matches the old
/// cursor, the selection no longer describes what the user sees and is
/// collapsed rather than guessed at.
pub fn update_selection(
    layout: &ComponentLayout,
    should_reset: bool,
    selection: Selection,
    old_cursor: VisualCursor,
    new_cursor: VisualCursor,
) -> Selection {
    if should_reset {
        return Selection::EMPTY;
    }
    if !old_cursor.is_valid() || !new_cursor.is_valid() {
        return Selection::EMPTY;
    }
    if selection.is_empty() {
        return ordered(layout, old_cursor, new_cursor);
    }
    if old_cursor == selection.start {
        return ordered(layout, selection.end, new_cursor);
    }
    if old_cursor == selection.end {
        return ordered(layout, selection.start, new_cursor);
    }
    Selection::EMPTY
}

/// Project a selection into source coordinates through each endpoint's own
/// component mapping: start of the start mapping to end of the end mapping.
/// A side whose mapping cannot represent the position defaults to zero.
pub fn source_selection(layout: &ComponentLayout, selection: &Selection) -> Range<usize> {
    let start = endpoint_source(layout, selection.start)
        .map(|range| range.start)
        .unwrap_or(0);
    let end = endpoint_source(layout, selection.end)
        .map(|range| range.end)
        .unwrap_or(0);
    start..end
}

fn endpoint_source(layout: &ComponentLayout, cursor: VisualCursor) -> Option<Range<usize>> {
    let component = layout.get(cursor.component).ok()?;
    let offset = component.clamp_offset(cursor.offset);
    component.mapping.to_source(&(offset..offset))
}

/// How a document node relates to a source selection, most specific
/// classification first. Formatting commands use this to tell a fully
/// selected node from a partially covered or unaffected one without
/// re-walking offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    /// The node contains the whole selection.
    ContainsSelection,
    /// The node contains the selection's start but not its end.
    ContainsStart,
    /// The node contains the selection's end but not its start.
    ContainsEnd,
    /// The node lies fully inside the selection without touching either
    /// endpoint: its siblings on both sides are partially selected.
    Engulfed,
    /// The node does not intersect the selection.
    Outside,
}

pub fn selection_mode(
    tree: &DocumentTree,
    node: NodeId,
    selection: &Range<usize>,
) -> SelectionMode {
    let Ok(node) = tree.node(node) else {
        return SelectionMode::Outside;
    };
    let range = &node.source_range;
    let contains_start = selection.start >= range.start && selection.start <= range.end;
    let contains_end = selection.end >= range.start && selection.end <= range.end;
    if contains_start && contains_end {
        SelectionMode::ContainsSelection
    } else if contains_start {
        SelectionMode::ContainsStart
    } else if contains_end {
        SelectionMode::ContainsEnd
    } else if selection.start <= range.start && range.end <= selection.end {
        SelectionMode::Engulfed
    } else {
        SelectionMode::Outside
    }
}

/// The word around a cursor position, for double-click selection. `None`
/// when the component has no text there.
pub fn word_boundaries_at(
    layout: &ComponentLayout,
    cursor: VisualCursor,
) -> Option<(VisualCursor, VisualCursor)> {
    let component = layout.get(cursor.component).ok()?;
    if !component.has_text {
        return None;
    }
    let chars = component.shape.chars();
    let relative = component.relative_offset(cursor.offset);
    let start = word_start_boundary(chars, relative);
    let end = word_end_boundary(chars, relative);
    if start == end {
        return None;
    }
    let base = component.visual_range.start;
    Some((
        VisualCursor::new(cursor.component, base + start),
        VisualCursor::new(cursor.component, base + end),
    ))
}
