//! Maps terminal input to [`Action`]s. Keys mean different things depending
//! on whether the focused slot accepts text, so the mapping consults the
//! current app state.

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

use crate::app::App;
use crate::event::Action;

pub fn handle_event(app: &App, event: Event) -> Option<Action> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Tab | KeyCode::Right => Some(Action::NextSection),
        KeyCode::BackTab | KeyCode::Left => Some(Action::PrevSection),
        KeyCode::Up => Some(Action::FocusPrev),
        KeyCode::Down => Some(Action::FocusNext),
        KeyCode::Enter => Some(Action::Activate),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c) => {
            let slot = app.current_slot();
            if app.slot_editable(slot) {
                Some(Action::Input(c))
            } else if c == 'd' && app.slot_deletable(slot) {
                Some(Action::DeleteEntry)
            } else {
                None
            }
        }
        _ => None,
    }
}
