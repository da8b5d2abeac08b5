use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::document::TreeError;
use crate::editor::{Direction, EditCommand, EditOutcome, EditorCore, VerticalDirection};

/// What a key event asks the editor to do. Paste is a request: the
/// clipboard lives outside the core, so the embedding loop fetches the text
/// and applies [`EditCommand::Paste`] itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
    Edit(EditCommand),
    Move { motion: Motion, extend: bool },
    ClearSelection,
    RequestPaste,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    WordLeft,
    WordRight,
    Up,
    Down,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
}

/// Translate a terminal key event into an editor action. Returns `None`
/// for keys the editing core does not handle.
pub fn translate(key: KeyEvent) -> Option<InputAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let word = ctrl || key.modifiers.contains(KeyModifiers::ALT);

    let action = match key.code {
        KeyCode::Char('z' | 'Z') if ctrl && shift => InputAction::Edit(EditCommand::Redo),
        KeyCode::Char('z') if ctrl => InputAction::Edit(EditCommand::Undo),
        KeyCode::Char('y') if ctrl => InputAction::Edit(EditCommand::Redo),
        KeyCode::Char('c') if ctrl => InputAction::Edit(EditCommand::Copy),
        KeyCode::Char('x') if ctrl => InputAction::Edit(EditCommand::Cut),
        KeyCode::Char('v') if ctrl => InputAction::RequestPaste,
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(ch) => InputAction::Edit(EditCommand::Type(ch.to_string())),
        KeyCode::Enter => InputAction::Edit(EditCommand::NewLine),
        KeyCode::Backspace if word => InputAction::Edit(EditCommand::DeleteWord {
            direction: Direction::Backward,
        }),
        KeyCode::Backspace => InputAction::Edit(EditCommand::Delete {
            direction: Direction::Backward,
            count: 1,
        }),
        KeyCode::Delete if word => InputAction::Edit(EditCommand::DeleteWord {
            direction: Direction::Forward,
        }),
        KeyCode::Delete => InputAction::Edit(EditCommand::Delete {
            direction: Direction::Forward,
            count: 1,
        }),
        KeyCode::Left if word => InputAction::Move {
            motion: Motion::WordLeft,
            extend: shift,
        },
        KeyCode::Left => InputAction::Move {
            motion: Motion::Left,
            extend: shift,
        },
        KeyCode::Right if word => InputAction::Move {
            motion: Motion::WordRight,
            extend: shift,
        },
        KeyCode::Right => InputAction::Move {
            motion: Motion::Right,
            extend: shift,
        },
        KeyCode::Up => InputAction::Move {
            motion: Motion::Up,
            extend: shift,
        },
        KeyCode::Down => InputAction::Move {
            motion: Motion::Down,
            extend: shift,
        },
        KeyCode::Home => InputAction::Move {
            motion: Motion::LineStart,
            extend: shift,
        },
        KeyCode::End => InputAction::Move {
            motion: Motion::LineEnd,
            extend: shift,
        },
        KeyCode::PageUp => InputAction::Move {
            motion: Motion::PageUp,
            extend: shift,
        },
        KeyCode::PageDown => InputAction::Move {
            motion: Motion::PageDown,
            extend: shift,
        },
        KeyCode::Esc => InputAction::ClearSelection,
        _ => return None,
    };
    Some(action)
}

/// Run an action against the editor. Movement reports `changed` so the
/// embedding loop knows whether to redraw the caret.
pub fn dispatch(core: &mut EditorCore, action: InputAction) -> Result<EditOutcome, TreeError> {
    match action {
        InputAction::Edit(command) => core.apply(command),
        InputAction::Move { motion, extend } => {
            let moved = match motion {
                Motion::Left => core.move_left(extend),
                Motion::Right => core.move_right(extend),
                Motion::WordLeft => core.move_word_left(extend),
                Motion::WordRight => core.move_word_right(extend),
                Motion::Up => core.move_up(extend),
                Motion::Down => core.move_down(extend),
                Motion::LineStart => core.move_line_start(extend),
                Motion::LineEnd => core.move_line_end(extend),
                Motion::PageUp => core.move_page(VerticalDirection::Up, extend),
                Motion::PageDown => core.move_page(VerticalDirection::Down, extend),
            };
            Ok(EditOutcome {
                changed: moved,
                ..EditOutcome::default()
            })
        }
        InputAction::ClearSelection => {
            core.clear_selection();
            Ok(EditOutcome::default())
        }
        InputAction::RequestPaste => Ok(EditOutcome::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn plain_characters_type() {
        assert_eq!(
            translate(press(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some(InputAction::Edit(EditCommand::Type("a".into())))
        );
    }

    #[test]
    fn control_shortcuts_map_to_history_and_clipboard() {
        assert_eq!(
            translate(press(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            Some(InputAction::Edit(EditCommand::Undo))
        );
        assert_eq!(
            translate(press(
                KeyCode::Char('z'),
                KeyModifiers::CONTROL | KeyModifiers::SHIFT
            )),
            Some(InputAction::Edit(EditCommand::Redo))
        );
        assert_eq!(
            translate(press(KeyCode::Char('v'), KeyModifiers::CONTROL)),
            Some(InputAction::RequestPaste)
        );
    }

    #[test]
    fn shifted_arrows_extend_the_selection() {
        assert_eq!(
            translate(press(KeyCode::Right, KeyModifiers::SHIFT)),
            Some(InputAction::Move {
                motion: Motion::Right,
                extend: true
            })
        );
        assert_eq!(
            translate(press(KeyCode::Left, KeyModifiers::CONTROL)),
            Some(InputAction::Move {
                motion: Motion::WordLeft,
                extend: false
            })
        );
    }

    #[test]
    fn release_events_are_ignored() {
        let mut key = press(KeyCode::Char('a'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(translate(key), None);
    }

    #[test]
    fn unhandled_keys_pass_through() {
        assert_eq!(translate(press(KeyCode::F(5), KeyModifiers::NONE)), None);
    }
}
