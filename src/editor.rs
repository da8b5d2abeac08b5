use std::ops::Range;

use ratatui::layout::Position;

use crate::document::{parse, DocumentTree, TreeError};
use crate::history::UndoManager;
use crate::layout::{ComponentLayout, InteractiveId};

pub mod cursor;
pub mod selection;
pub mod source;

use selection::Selection;
use source::SourceEditor;

const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// A cursor position: a component plus a visual offset into its rendered
/// text. The offset is only meaningful relative to the component's current
/// visual range and is clamped into it by every producer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisualCursor {
    pub component: InteractiveId,
    pub offset: usize,
}

impl VisualCursor {
    pub const INVALID: VisualCursor = VisualCursor {
        component: InteractiveId::INVALID,
        offset: 0,
    };

    pub fn new(component: InteractiveId, offset: usize) -> Self {
        Self { component, offset }
    }

    pub fn is_valid(&self) -> bool {
        self.component.is_valid()
    }
}

impl Default for VisualCursor {
    fn default() -> Self {
        Self::INVALID
    }
}

/// The discrete commands the input collaborator delivers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditCommand {
    Type(String),
    Delete { direction: Direction, count: usize },
    DeleteWord { direction: Direction },
    NewLine,
    Copy,
    Cut,
    Paste(String),
    ReplaceRange {
        range: Range<usize>,
        text: String,
        cursor: usize,
    },
    Undo,
    Redo,
}

/// What applying a command did. `copied` carries the text for the
/// clipboard collaborator; `layout_stale` tells the rendering collaborator
/// to rebuild the component registry from the new document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub changed: bool,
    pub layout_stale: bool,
    pub copied: Option<String>,
}

/// The orchestrating edit loop: source text, parsed tree, undo history,
/// component layout and the cursor/selection pair. All mutation runs
/// synchronously on the UI thread in response to discrete commands.
#[derive(Debug)]
pub struct EditorCore {
    source: SourceEditor,
    tree: DocumentTree,
    history: UndoManager<SourceEditor>,
    layout: ComponentLayout,
    cursor: VisualCursor,
    selection: Selection,
    preferred_column: Option<usize>,
    last_view_height: usize,
}

impl EditorCore {
    pub fn new(source: &str) -> Result<Self, TreeError> {
        Self::with_history_capacity(source, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(source: &str, capacity: usize) -> Result<Self, TreeError> {
        Ok(Self {
            source: SourceEditor::new(source, 0),
            tree: parse(source)?,
            history: UndoManager::new(capacity),
            layout: ComponentLayout::new(),
            cursor: VisualCursor::INVALID,
            selection: Selection::EMPTY,
            preferred_column: None,
            last_view_height: 1,
        })
    }

    pub fn source(&self) -> &SourceEditor {
        &self.source
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    pub fn layout(&self) -> &ComponentLayout {
        &self.layout
    }

    /// The rendering collaborator registers and unregisters components
    /// here whenever layout changes.
    pub fn layout_mut(&mut self) -> &mut ComponentLayout {
        &mut self.layout
    }

    pub fn cursor(&self) -> VisualCursor {
        self.cursor
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_cursor(&mut self, cursor: VisualCursor) {
        self.cursor = match self.layout.get(cursor.component) {
            Ok(component) => VisualCursor::new(cursor.component, component.clamp_offset(cursor.offset)),
            Err(_) => cursor,
        };
        self.preferred_column = None;
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::EMPTY;
    }

    /// Place the source cursor directly, for callers that track source
    /// offsets themselves (e.g. search).
    pub fn source_cursor_to(&mut self, offset: usize) {
        self.source = self.source.with_cursor(offset);
    }

    /// The current selection projected into source coordinates, `None`
    /// while nothing is selected.
    pub fn selection_source_range(&self) -> Option<Range<usize>> {
        (!self.selection.is_empty())
            .then(|| selection::source_selection(&self.layout, &self.selection))
    }

    /// Apply one edit command. A command that changes the source re-parses
    /// the document and records history; the very first change also
    /// captures the unedited baseline so it stays reachable by undo.
    pub fn apply(&mut self, command: EditCommand) -> Result<EditOutcome, TreeError> {
        tracing::debug!(?command, "apply edit command");
        match command {
            EditCommand::Undo => return self.restore(false),
            EditCommand::Redo => return self.restore(true),
            _ => {}
        }

        let before = self.synced_source();
        let selected = self.selection_source_range();
        let mut copied = None;
        let after = match command {
            EditCommand::Type(text) => match &selected {
                Some(range) => before.delete_selection(range).insert(&text),
                None => before.insert(&text),
            },
            EditCommand::NewLine => match &selected {
                Some(range) => before.delete_selection(range).type_newline(),
                None => before.type_newline(),
            },
            EditCommand::Delete { direction, count } => match &selected {
                Some(range) => before.delete_selection(range),
                None => match direction {
                    Direction::Backward => before.delete_before(count),
                    Direction::Forward => before.delete_after(count),
                },
            },
            EditCommand::DeleteWord { direction } => match &selected {
                Some(range) => before.delete_selection(range),
                None => match direction {
                    Direction::Backward => before.delete_word_before(),
                    Direction::Forward => before.delete_word_after(),
                },
            },
            EditCommand::Copy => {
                copied = selected.as_ref().and_then(|range| self.slice(range));
                before.clone()
            }
            EditCommand::Cut => match &selected {
                Some(range) => {
                    copied = self.slice(range);
                    before.delete_selection(range)
                }
                None => before.clone(),
            },
            EditCommand::Paste(text) => match &selected {
                Some(range) => before.delete_selection(range).insert(&text),
                None => before.insert(&text),
            },
            EditCommand::ReplaceRange {
                range,
                text,
                cursor,
            } => before.replace_range(&range, &text, cursor),
            // Handled above; listed to keep the match exhaustive.
            EditCommand::Undo | EditCommand::Redo => before.clone(),
        };

        if after == before {
            return Ok(EditOutcome {
                changed: false,
                layout_stale: false,
                copied,
            });
        }

        if self.history.is_empty() {
            self.history.add(before);
        }
        self.tree = parse(after.text())?;
        self.source = after;
        self.history.add(self.source.clone());
        self.selection = Selection::EMPTY;
        self.preferred_column = None;
        Ok(EditOutcome {
            changed: true,
            layout_stale: true,
            copied,
        })
    }

    fn restore(&mut self, redo: bool) -> Result<EditOutcome, TreeError> {
        let moved = if redo {
            self.history.redo()
        } else {
            self.history.undo()
        };
        if !moved {
            return Ok(EditOutcome::default());
        }
        let Some(snapshot) = self.history.current() else {
            return Ok(EditOutcome::default());
        };
        let snapshot = snapshot.clone();
        tracing::debug!(redo, "restore history snapshot");
        self.tree = parse(snapshot.text())?;
        self.source = snapshot;
        self.selection = Selection::EMPTY;
        self.preferred_column = None;
        Ok(EditOutcome {
            changed: true,
            layout_stale: true,
            copied: None,
        })
    }

    fn slice(&self, range: &Range<usize>) -> Option<String> {
        self.source.text().get(range.clone()).map(str::to_string)
    }

    /// The source editor with its cursor projected from the visual cursor,
    /// when the cursor resolves through a registered component's mapping.
    fn synced_source(&self) -> SourceEditor {
        let Ok(component) = self.layout.get(self.cursor.component) else {
            return self.source.clone();
        };
        let offset = component.clamp_offset(self.cursor.offset);
        match component.mapping.to_source(&(offset..offset)) {
            Some(range) => self.source.with_cursor(range.start),
            None => self.source.clone(),
        }
    }

    pub fn move_left(&mut self, extend: bool) -> bool {
        let target = cursor::move_char(&self.layout, self.cursor, Direction::Backward);
        self.commit_move(target, extend)
    }

    pub fn move_right(&mut self, extend: bool) -> bool {
        let target = cursor::move_char(&self.layout, self.cursor, Direction::Forward);
        self.commit_move(target, extend)
    }

    pub fn move_word_left(&mut self, extend: bool) -> bool {
        let target = cursor::move_word(&self.layout, self.cursor, Direction::Backward);
        self.commit_move(target, extend)
    }

    pub fn move_word_right(&mut self, extend: bool) -> bool {
        let target = cursor::move_word(&self.layout, self.cursor, Direction::Forward);
        self.commit_move(target, extend)
    }

    pub fn move_up(&mut self, extend: bool) -> bool {
        self.vertical(VerticalDirection::Up, extend)
    }

    pub fn move_down(&mut self, extend: bool) -> bool {
        self.vertical(VerticalDirection::Down, extend)
    }

    pub fn move_line_start(&mut self, extend: bool) -> bool {
        let target = cursor::move_line_start(&self.layout, self.cursor);
        self.commit_move(target, extend)
    }

    pub fn move_line_end(&mut self, extend: bool) -> bool {
        let target = cursor::move_line_end(&self.layout, self.cursor);
        self.commit_move(target, extend)
    }

    /// Place the cursor from a click. Resolves through the registry's
    /// geometric fallbacks, so any click lands somewhere.
    pub fn click(&mut self, position: Position, extend: bool) -> bool {
        let target = {
            let Ok(component) = self.layout.at(position) else {
                return false;
            };
            let offset = component
                .offset_at(position)
                .unwrap_or(component.visual_range.start);
            VisualCursor::new(component.id, offset)
        };
        self.commit_move(target, extend)
    }

    /// Select the word under the cursor (double click).
    pub fn select_word_at_cursor(&mut self) -> bool {
        let Some((start, end)) = selection::word_boundaries_at(&self.layout, self.cursor) else {
            return false;
        };
        self.selection = Selection { start, end };
        self.cursor = end;
        self.preferred_column = None;
        true
    }

    pub fn set_view_height(&mut self, height: usize) {
        self.last_view_height = height.max(1);
    }

    pub fn page_jump_distance(&self) -> usize {
        let viewport = self.last_view_height.max(1);
        let approx = ((viewport as f32) * 0.9).round() as usize;
        approx.max(1)
    }

    pub fn move_page(&mut self, direction: VerticalDirection, extend: bool) -> bool {
        let mut moved = false;
        for _ in 0..self.page_jump_distance() {
            if !self.vertical(direction, extend) {
                break;
            }
            moved = true;
        }
        moved
    }

    fn commit_move(&mut self, target: VisualCursor, extend: bool) -> bool {
        let old = self.cursor;
        self.selection =
            selection::update_selection(&self.layout, !extend, self.selection, old, target);
        self.cursor = target;
        self.preferred_column = None;
        target != old
    }

    /// Vertical movement with the preferred-column rule: repeated up/down
    /// steps keep aiming for the column the cursor started in, even across
    /// shorter lines.
    fn vertical(&mut self, direction: VerticalDirection, extend: bool) -> bool {
        let Ok(component) = self.layout.get(self.cursor.component) else {
            return false;
        };
        let relative = component.relative_offset(self.cursor.offset);
        let line = component.shape.line_for_offset(relative);
        let line_start = component.shape.line_range(line).start;
        let column = self.preferred_column.unwrap_or(relative - line_start);

        let target = cursor::move_vertical(&self.layout, self.cursor, direction);
        if target == self.cursor {
            return false;
        }
        // Land on the preferred column of whatever line the move reached.
        let target = match self.layout.get(target.component) {
            Ok(neighbor) => {
                let landed = neighbor.relative_offset(target.offset);
                let range = neighbor.shape.line_range(neighbor.shape.line_for_offset(landed));
                VisualCursor::new(
                    target.component,
                    neighbor.visual_range.start + (range.start + column).min(range.end),
                )
            }
            Err(_) => target,
        };
        let old = self.cursor;
        self.selection =
            selection::update_selection(&self.layout, !extend, self.selection, old, target);
        self.cursor = target;
        self.preferred_column = Some(column);
        true
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod editor_tests;


#[cfg(test)]
#[path = "editor/selection_tests.rs"]
mod selection_tests;
