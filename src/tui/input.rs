// SPDX-License-Identifier: MIT
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    OpenPicker,
    PickerUp,
    PickerDown,
    PickerApply,
    PickerCancel,
    None,
}

/// Maps a decoded key event to an action. The picker rebinds the arrows,
/// `Enter`, and `Esc` while it is open.
#[must_use]
pub fn handle_key(key: KeyEvent, in_picker: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Esc if in_picker => Action::PickerCancel,
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('t') if !in_picker => Action::OpenPicker,
        KeyCode::Up if in_picker => Action::PickerUp,
        KeyCode::Down if in_picker => Action::PickerDown,
        KeyCode::Enter if in_picker => Action::PickerApply,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn quit_bindings() {
        assert_eq!(handle_key(key(KeyCode::Char('q')), false), Action::Quit);
        assert_eq!(handle_key(key(KeyCode::Esc), false), Action::Quit);
        assert_eq!(
            handle_key(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                false
            ),
            Action::Quit,
        );
    }

    #[test]
    fn picker_rebinds_navigation() {
        assert_eq!(
            handle_key(key(KeyCode::Char('t')), false),
            Action::OpenPicker
        );
        assert_eq!(handle_key(key(KeyCode::Up), true), Action::PickerUp);
        assert_eq!(handle_key(key(KeyCode::Down), true), Action::PickerDown);
        assert_eq!(handle_key(key(KeyCode::Enter), true), Action::PickerApply);
        assert_eq!(handle_key(key(KeyCode::Esc), true), Action::PickerCancel);
    }

    #[test]
    fn arrows_are_inert_outside_the_picker() {
        assert_eq!(handle_key(key(KeyCode::Up), false), Action::None);
        assert_eq!(handle_key(key(KeyCode::Down), false), Action::None);
        assert_eq!(handle_key(key(KeyCode::Enter), false), Action::None);
    }

    #[test]
    fn reopening_the_picker_from_inside_is_inert() {
        assert_eq!(handle_key(key(KeyCode::Char('t')), true), Action::None);
    }
}
