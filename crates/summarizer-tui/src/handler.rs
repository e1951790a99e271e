use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use summarizer_core::{Key, KeyDown};
use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    app.reap_submit_task().await;
    Ok(())
}

/// Map a terminal key press onto the controller's key model. Most terminals
/// can't report Ctrl+Enter and send Ctrl+J (line feed) for it instead.
pub fn to_key_down(key: &KeyEvent) -> KeyDown {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let key = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Char('j') if ctrl => Key::Enter,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    KeyDown { key, ctrl }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Tab => {
            app.focus_next();
            return;
        }
        KeyCode::BackTab => {
            app.focus_prev();
            return;
        }
        _ => {}
    }

    match app.input_mode {
        InputMode::Editing => handle_editing(app, key),
        InputMode::Normal => handle_normal(app, key),
    }
}

fn handle_editing(app: &mut App, key: KeyEvent) {
    if to_key_down(&key).is_submit_chord() {
        app.click_submit();
        return;
    }

    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    let Some(form) = app.form() else {
        return;
    };

    let mut state = form.lock();
    match key.code {
        KeyCode::Enter => state.input.insert_char('\n'),
        KeyCode::Backspace => state.input.backspace(),
        KeyCode::Delete => state.input.delete(),
        KeyCode::Left => state.input.move_left(),
        KeyCode::Right => state.input.move_right(),
        KeyCode::Home => state.input.move_home(),
        KeyCode::End => state.input.move_end(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.input.clear();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.input.insert_char(c);
        }
        _ => {}
    }
}

fn handle_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Char('e') => app.set_focus(FocusPane::Input),
        KeyCode::Char('s') => app.click_submit(),
        _ => match app.focus {
            FocusPane::Input => {
                if key.code == KeyCode::Enter {
                    app.input_mode = InputMode::Editing;
                }
            }
            FocusPane::Length => match key.code {
                KeyCode::Left | KeyCode::Char('h') => app.select_length(false),
                KeyCode::Right | KeyCode::Char('l') => app.select_length(true),
                _ => {}
            },
            FocusPane::Submit => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    app.click_submit();
                }
            }
            FocusPane::Output => match key.code {
                KeyCode::Down | KeyCode::Char('j') => app.scroll_output_down(),
                KeyCode::Up | KeyCode::Char('k') => app.scroll_output_up(),
                KeyCode::Home | KeyCode::Char('g') => app.output_scroll = 0,
                _ => {}
            },
        },
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_input = app.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_submit = app.submit_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_output = app.output_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if in_submit {
                app.set_focus(FocusPane::Submit);
                app.click_submit();
            } else if in_input {
                app.set_focus(FocusPane::Input);
            } else if in_output {
                app.set_focus(FocusPane::Output);
            }
        }
        MouseEventKind::ScrollDown if in_output => app.scroll_output_down(),
        MouseEventKind::ScrollUp if in_output => app.scroll_output_up(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn input_value(app: &App) -> String {
        app.form().unwrap().lock().input.value.clone()
    }

    #[test]
    fn test_ctrl_enter_and_ctrl_j_are_submit_chords() {
        assert!(to_key_down(&press(KeyCode::Enter, KeyModifiers::CONTROL)).is_submit_chord());
        assert!(to_key_down(&press(KeyCode::Char('j'), KeyModifiers::CONTROL)).is_submit_chord());
        assert!(!to_key_down(&press(KeyCode::Enter, KeyModifiers::NONE)).is_submit_chord());
        assert!(!to_key_down(&press(KeyCode::Char('j'), KeyModifiers::NONE)).is_submit_chord());
    }

    #[tokio::test]
    async fn test_typing_edits_input_and_plain_enter_adds_newline() {
        let mut app = test_app();
        for c in "hi".chars() {
            handle_key(&mut app, press(KeyCode::Char(c), KeyModifiers::NONE));
        }
        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        handle_key(&mut app, press(KeyCode::Char('x'), KeyModifiers::SHIFT));

        assert_eq!(input_value(&app), "hi\nx");
        assert!(app.submit_task.is_none());
    }

    #[tokio::test]
    async fn test_ctrl_enter_in_input_starts_submission() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::CONTROL));
        assert!(app.submit_task.is_some());
    }

    #[tokio::test]
    async fn test_ctrl_enter_does_nothing_while_button_disabled() {
        let mut app = test_app();
        for c in "some text".chars() {
            handle_key(&mut app, press(KeyCode::Char(c), KeyModifiers::NONE));
        }
        app.form().unwrap().lock().submit.disabled = true;

        app.click_submit();
        assert!(app.submit_task.is_none());

        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::CONTROL));
        handle_key(&mut app, press(KeyCode::Char('j'), KeyModifiers::CONTROL));
        assert!(app.submit_task.is_none());
        assert_eq!(input_value(&app), "some text");
    }

    #[tokio::test]
    async fn test_q_quits_only_outside_the_input() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(!app.should_quit);
        assert_eq!(input_value(&app), "q");

        handle_key(&mut app, press(KeyCode::Esc, KeyModifiers::NONE));
        handle_key(&mut app, press(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_enter_on_focused_button_submits() {
        let mut app = test_app();
        handle_key(&mut app, press(KeyCode::Tab, KeyModifiers::NONE));
        handle_key(&mut app, press(KeyCode::Tab, KeyModifiers::NONE));
        assert_eq!(app.focus, FocusPane::Submit);

        handle_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.submit_task.is_some());
    }

    #[tokio::test]
    async fn test_click_on_button_area_submits() {
        let mut app = test_app();
        app.submit_area = Some(Rect::new(10, 5, 12, 3));

        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column: 12,
                row: 6,
                modifiers: KeyModifiers::NONE,
            },
        );

        assert_eq!(app.focus, FocusPane::Submit);
        assert!(app.submit_task.is_some());
    }

    #[test]
    fn test_point_in_rect_edges() {
        let rect = Rect::new(2, 2, 3, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(4, 4, rect));
        assert!(!point_in_rect(5, 4, rect));
        assert!(!point_in_rect(1, 2, rect));
    }
}
