use crate::layout::{ComponentLayout, InteractiveComponent};

use super::{Direction, VerticalDirection, VisualCursor};

/// Rendered caret position of an offset inside a component: line plus
/// column. Used to decide whether a one-step move actually went anywhere on
/// screen.
fn rendered_position(component: &InteractiveComponent, offset: usize) -> (usize, u16) {
    let relative = component.relative_offset(offset);
    (
        component.shape.line_for_offset(relative),
        component.shape.column_at(relative),
    )
}

/// Move the cursor by one rendered position. Zero-width glyph clusters are
/// skipped by advancing until the rendered position changes; at the
/// component's text boundary the cursor crosses to the line neighbor and
/// lands on its near boundary. Returns the old position unchanged when no
/// movement is possible (line boundary), which callers use as the "can't
/// move further" signal.
pub fn move_char(
    layout: &ComponentLayout,
    cursor: VisualCursor,
    direction: Direction,
) -> VisualCursor {
    let Ok(component) = layout.get(cursor.component) else {
        return cursor;
    };
    let offset = component.clamp_offset(cursor.offset);
    let here = rendered_position(component, offset);
    let mut candidate = offset;
    loop {
        let next = match direction {
            Direction::Forward if candidate < component.visual_range.end => candidate + 1,
            Direction::Backward if candidate > component.visual_range.start => candidate - 1,
            _ => break,
        };
        candidate = next;
        if rendered_position(component, candidate) != here {
            return VisualCursor::new(cursor.component, candidate);
        }
    }

    // No rendered movement within this component: cross to the neighbor on
    // the line. The registry clamps at the ends, so getting the same
    // component back means the document boundary.
    let neighbor = match direction {
        Direction::Forward => layout.next_on_line(cursor.component),
        Direction::Backward => layout.previous_on_line(cursor.component),
    };
    let Ok(neighbor) = neighbor else {
        return cursor;
    };
    if neighbor.id == cursor.component {
        return cursor;
    }
    let landing = match direction {
        Direction::Forward => neighbor.visual_range.start,
        Direction::Backward => neighbor.visual_range.end,
    };
    VisualCursor::new(neighbor.id, landing)
}

/// Word movement as repeated char movement. Stops after the last non-space
/// character once a whitespace boundary is crossed, or as soon as movement
/// crosses into a different component: components seldom split a word, so
/// the component edge counts as a word boundary.
pub fn move_word(
    layout: &ComponentLayout,
    cursor: VisualCursor,
    direction: Direction,
) -> VisualCursor {
    let mut current = cursor;
    let mut seen_content = false;
    loop {
        let next = move_char(layout, current, direction);
        if next == current {
            return current;
        }
        if next.component != current.component {
            return next;
        }
        let Ok(component) = layout.get(current.component) else {
            return next;
        };
        let crossed_offset = match direction {
            Direction::Forward => current.offset,
            Direction::Backward => next.offset,
        };
        let crossed = component
            .shape
            .char_at(component.relative_offset(crossed_offset));
        match crossed {
            Some(ch) if ch.is_whitespace() => {
                if seen_content {
                    return current;
                }
            }
            Some(_) => seen_content = true,
            None => {}
        }
        current = next;
    }
}

/// Move to the equivalent column on the adjacent line: within the same
/// component if it has another line, otherwise on the component above or
/// below the caret's screen position. Column equivalence is the offset from
/// the line start, clamped to the target line's length; a target without
/// text is entered at offset zero.
pub fn move_vertical(
    layout: &ComponentLayout,
    cursor: VisualCursor,
    direction: VerticalDirection,
) -> VisualCursor {
    let Ok(component) = layout.get(cursor.component) else {
        return cursor;
    };
    let relative = component.relative_offset(cursor.offset);
    let line = component.shape.line_for_offset(relative);
    let from_line_start = relative - component.shape.line_range(line).start;

    let within = match direction {
        VerticalDirection::Up => line.checked_sub(1),
        VerticalDirection::Down => (line + 1 < component.shape.line_count()).then_some(line + 1),
    };
    if let Some(target_line) = within {
        let target = component.shape.line_range(target_line);
        let offset = (target.start + from_line_start).min(target.end);
        return VisualCursor::new(cursor.component, component.visual_range.start + offset);
    }

    let Some(position) = component.caret_position(cursor.offset) else {
        return cursor;
    };
    let neighbor = match direction {
        VerticalDirection::Up => layout.above(position),
        VerticalDirection::Down => layout.below(position),
    };
    let Ok(neighbor) = neighbor else {
        return cursor;
    };
    if neighbor.id == cursor.component {
        return cursor;
    }
    if !neighbor.has_text {
        return VisualCursor::new(neighbor.id, neighbor.visual_range.start);
    }
    let target_line = match direction {
        VerticalDirection::Up => neighbor.shape.line_count() - 1,
        VerticalDirection::Down => 0,
    };
    let target = neighbor.shape.line_range(target_line);
    let offset = (target.start + from_line_start).min(target.end);
    VisualCursor::new(neighbor.id, neighbor.visual_range.start + offset)
}

/// Move to the start of the current visual line. Stays within the
/// component; a cursor already at the line start is a no-op.
// TODO: home should be able to cross into an earlier component on the same
// screen line once the registry can enumerate a screen line's components.
pub fn move_line_start(layout: &ComponentLayout, cursor: VisualCursor) -> VisualCursor {
    let Ok(component) = layout.get(cursor.component) else {
        return cursor;
    };
    let relative = component.relative_offset(cursor.offset);
    let line = component.shape.line_for_offset(relative);
    let start = component.shape.line_range(line).start;
    VisualCursor::new(cursor.component, component.visual_range.start + start)
}

/// Move to the end of the current visual line within the same component.
pub fn move_line_end(layout: &ComponentLayout, cursor: VisualCursor) -> VisualCursor {
    let Ok(component) = layout.get(cursor.component) else {
        return cursor;
    };
    let relative = component.relative_offset(cursor.offset);
    let line = component.shape.line_for_offset(relative);
    let end = component.shape.line_range(line).end;
    VisualCursor::new(cursor.component, component.visual_range.start + end)
}
