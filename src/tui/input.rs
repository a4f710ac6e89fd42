use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::shared::InputEvent;

use super::mode::TuiState;

// poll for input, resolving raw keys into semantic input events for the
// middle layer; with the add-song form open the keyboard belongs to the form
pub fn poll_input(timeout: Duration, ts: &TuiState) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        if ts.form_open {
            return Ok(handle_form_key(key.code));
        }
        return Ok(handle_key(key.code));
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::Quit],
        KeyCode::Char(' ') => vec![InputEvent::PlayPress],
        KeyCode::Char('t') => vec![InputEvent::Tap],

        // set list
        KeyCode::Up | KeyCode::Char('k') => vec![InputEvent::SelectPrev],
        KeyCode::Down | KeyCode::Char('j') => vec![InputEvent::SelectNext],
        KeyCode::Enter => vec![InputEvent::LoadSelected],
        KeyCode::Char('a') => vec![InputEvent::OpenForm],
        KeyCode::Char('i') => vec![InputEvent::Import],
        KeyCode::Char('x') => vec![InputEvent::Export],

        // tempo fields, coarse and fine
        KeyCode::Char('-') => vec![InputEvent::NudgeBpm(-1)],
        KeyCode::Char('=') => vec![InputEvent::NudgeBpm(1)],
        KeyCode::Char('[') => vec![InputEvent::NudgeBpm(-5)],
        KeyCode::Char(']') => vec![InputEvent::NudgeBpm(5)],
        KeyCode::Char(',') => vec![InputEvent::NudgeBeats(-1)],
        KeyCode::Char('.') => vec![InputEvent::NudgeBeats(1)],
        KeyCode::Char('s') => vec![InputEvent::CycleSubdivision],
        KeyCode::Char('m') => vec![InputEvent::ToggleAccentMode],

        // volume
        KeyCode::Char('v') => vec![InputEvent::NudgeVolume(-5)],
        KeyCode::Char('V') => vec![InputEvent::NudgeVolume(5)],

        _ => vec![],
    }
}

fn handle_form_key(code: KeyCode) -> Vec<InputEvent> {
    match code {
        KeyCode::Esc => vec![InputEvent::CancelForm],
        KeyCode::Enter => vec![InputEvent::SubmitForm],
        KeyCode::Tab => vec![InputEvent::FormNextField],
        KeyCode::Backspace => vec![InputEvent::FormBackspace],
        KeyCode::Up | KeyCode::Down => vec![InputEvent::FormCycleSubdivision],
        KeyCode::Char(c) => vec![InputEvent::FormInput(c)],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_keys_resolve_to_semantic_events() {
        assert_eq!(handle_key(KeyCode::Char(' ')), vec![InputEvent::PlayPress]);
        assert_eq!(handle_key(KeyCode::Char('t')), vec![InputEvent::Tap]);
        assert_eq!(handle_key(KeyCode::Enter), vec![InputEvent::LoadSelected]);
        assert_eq!(handle_key(KeyCode::Char(']')), vec![InputEvent::NudgeBpm(5)]);
        assert_eq!(handle_key(KeyCode::Char('V')), vec![InputEvent::NudgeVolume(5)]);
        assert_eq!(handle_key(KeyCode::Esc), vec![InputEvent::Quit]);
        assert!(handle_key(KeyCode::Char('?')).is_empty());
    }

    #[test]
    fn form_captures_the_keyboard_when_open() {
        assert_eq!(handle_form_key(KeyCode::Esc), vec![InputEvent::CancelForm]);
        assert_eq!(handle_form_key(KeyCode::Enter), vec![InputEvent::SubmitForm]);
        assert_eq!(
            handle_form_key(KeyCode::Char(' ')),
            vec![InputEvent::FormInput(' ')]
        );
        assert_eq!(
            handle_form_key(KeyCode::Up),
            vec![InputEvent::FormCycleSubdivision]
        );
    }
}
