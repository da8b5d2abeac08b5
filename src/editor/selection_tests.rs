use ratatui::layout::Rect;

use crate::document::parse;
use crate::layout::{ComponentLayout, InteractiveComponent, InteractiveId};
use crate::mapping::TextMapping;

use super::selection::{
    cursor_before, selection_mode, source_selection, update_selection, word_boundaries_at,
    Selection, SelectionMode,
};
use super::VisualCursor;

fn rect(x: u16, y: u16, width: u16, height: u16) -> Rect {
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn at(id: i64, offset: usize) -> VisualCursor {
    VisualCursor::new(InteractiveId(id), offset)
}

/// The two-component scenario: A renders source 0..5, B renders 7..10,
/// side by side on one line.
fn scenario_layout() -> ComponentLayout {
    let mut layout = ComponentLayout::new();
    layout.register(
        InteractiveComponent::new(InteractiveId(0))
            .with_text("hello")
            .with_bounds(rect(0, 0, 5, 1))
            .with_mapping(TextMapping::direct(0..5, 0..5)),
    );
    layout.register(
        InteractiveComponent::new(InteractiveId(1))
            .with_text("cat")
            .with_bounds(rect(6, 0, 3, 1))
            .with_mapping(TextMapping::direct(0..3, 7..10)),
    );
    layout
}

#[test]
fn cursor_ordering_uses_line_order_and_offsets() {
    let layout = scenario_layout();
    assert!(cursor_before(&layout, at(0, 3), at(1, 0)));
    assert!(!cursor_before(&layout, at(1, 0), at(0, 3)));
    assert!(cursor_before(&layout, at(0, 1), at(0, 4)));
}

#[test]
fn reset_empties_the_selection() {
    let layout = scenario_layout();
    let selection = Selection {
        start: at(0, 1),
        end: at(1, 2),
    };
    let updated = update_selection(&layout, true, selection, at(1, 2), at(1, 1));
    assert!(updated.is_empty());
}

#[test]
fn a_fresh_selection_is_ordered_visually() {
    let layout = scenario_layout();
    // Dragging backwards: the new cursor is visually first.
    let updated = update_selection(&layout, false, Selection::EMPTY, at(1, 1), at(0, 2));
    assert_eq!(updated.start, at(0, 2));
    assert_eq!(updated.end, at(1, 1));
}

#[test]
fn dragging_an_endpoint_keeps_the_other_fixed() {
    let layout = scenario_layout();
    let selection = Selection {
        start: at(0, 2),
        end: at(1, 1),
    };
    // Moving the end handle further right.
    let updated = update_selection(&layout, false, selection, at(1, 1), at(1, 2));
    assert_eq!(updated.start, at(0, 2));
    assert_eq!(updated.end, at(1, 2));
}

#[test]
fn dragging_past_the_fixed_end_flips_the_selection() {
    let layout = scenario_layout();
    let selection = Selection {
        start: at(0, 2),
        end: at(1, 1),
    };
    // The start handle is dragged beyond the fixed end.
    let updated = update_selection(&layout, false, selection, at(0, 2), at(1, 2));
    assert_eq!(updated.start, at(1, 1));
    assert_eq!(updated.end, at(1, 2));
}

#[test]
fn a_stale_drag_collapses_instead_of_guessing() {
    let layout = scenario_layout();
    let selection = Selection {
        start: at(0, 2),
        end: at(1, 1),
    };
    // Neither endpoint matches the old cursor: the selection changed
    // underneath the drag.
    let updated = update_selection(&layout, false, selection, at(0, 4), at(1, 2));
    assert!(updated.is_empty());
}

#[test]
fn produced_selections_keep_start_before_end() {
    let layout = scenario_layout();
    let cursors = [at(0, 0), at(0, 3), at(1, 0), at(1, 2)];
    for &old in &cursors {
        for &new in &cursors {
            let updated = update_selection(&layout, false, Selection::EMPTY, old, new);
            if !updated.is_empty() {
                assert!(cursor_before(&layout, updated.start, updated.end));
            }
        }
    }
}

#[test]
fn source_projection_spans_both_mappings() {
    let layout = scenario_layout();
    let selection = Selection {
        start: at(0, 2),
        end: at(1, 1),
    };
    assert!(selection.spans_components());
    assert_eq!(source_selection(&layout, &selection), 2..8);
}

#[test]
fn unrepresentable_endpoints_default_to_zero() {
    let mut layout = ComponentLayout::new();
    layout.register(
        InteractiveComponent::new(InteractiveId(0))
            .with_text("x")
            .with_bounds(rect(0, 0, 1, 1))
            .with_mapping(TextMapping::zero()),
    );
    let selection = Selection {
        start: at(0, 0),
        end: at(0, 1),
    };
    assert_eq!(source_selection(&layout, &selection), 0..0);
}

#[test]
fn selection_mode_classifies_nodes_against_a_source_range() {
    let source = "# Title\n\nHello *world*\n";
    let tree = parse(source).unwrap();
    let heading = tree.children(tree.root())[0];
    let paragraph = tree.children(tree.root())[1];
    let emphasis = tree
        .ids()
        .find(|&id| tree.node(id).unwrap().data == crate::document::NodeData::Emphasis)
        .unwrap();

    // Selection from inside the heading to inside the paragraph text.
    let selection = 2..12;
    assert_eq!(
        selection_mode(&tree, heading, &selection),
        SelectionMode::ContainsStart
    );
    assert_eq!(
        selection_mode(&tree, paragraph, &selection),
        SelectionMode::ContainsEnd
    );
    assert_eq!(
        selection_mode(&tree, tree.root(), &selection),
        SelectionMode::ContainsSelection
    );
    assert_eq!(
        selection_mode(&tree, emphasis, &selection),
        SelectionMode::Outside
    );

    // A selection swallowing the emphasis node whole.
    let emphasis_range = tree.node(emphasis).unwrap().source_range.clone();
    let selection = emphasis_range.start.saturating_sub(2)..emphasis_range.end + 1;
    assert_eq!(
        selection_mode(&tree, emphasis, &selection),
        SelectionMode::Engulfed
    );
}

#[test]
fn selection_mode_of_an_unknown_node_is_outside() {
    let tree = parse("plain\n").unwrap();
    assert_eq!(
        selection_mode(&tree, crate::document::NodeId(999), &(0..3)),
        SelectionMode::Outside
    );
}

#[test]
fn word_boundaries_cover_the_word_under_the_cursor() {
    let mut layout = ComponentLayout::new();
    layout.register(
        InteractiveComponent::new(InteractiveId(0))
            .with_text("foo bar")
            .with_bounds(rect(0, 0, 7, 1)),
    );
    let (start, end) = word_boundaries_at(&layout, at(0, 5)).unwrap();
    assert_eq!(start, at(0, 4));
    assert_eq!(end, at(0, 7));
}

#[test]
fn word_boundaries_need_text() {
    let mut layout = ComponentLayout::new();
    layout.register(
        InteractiveComponent::new(InteractiveId(0)).with_bounds(rect(0, 0, 1, 1)),
    );
    assert!(word_boundaries_at(&layout, at(0, 0)).is_none());
}
