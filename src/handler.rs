use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, FocusPane, InputMode};
use crate::form::FieldKind;
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.focus {
        FocusPane::Form => handle_form_key(app, key),
        FocusPane::Input => match app.input_mode {
            InputMode::Editing => handle_input_editing(app, key),
            InputMode::Normal => handle_input_normal(app, key),
        },
    }
}

fn handle_input_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('g') => app.transcript_scroll = 0,
        KeyCode::Char('G') => app.scroll_to_bottom(),

        // Back to typing
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
            app.input_cursor = app.input.chars().count();
        }

        // Into the parameter form, if the server asked for one
        KeyCode::Tab => {
            if app.form.visible {
                app.focus = FocusPane::Form;
            }
        }

        _ => {}
    }
}

fn handle_input_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_message();
        }
        KeyCode::Tab => {
            if app.form.visible {
                app.input_mode = InputMode::Normal;
                app.focus = FocusPane::Form;
            }
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// The form is modeless: typing edits the focused text field directly,
/// arrows move between fields, Enter submits the whole set.
fn handle_form_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter => {
            app.submit_form();
        }
        KeyCode::Tab | KeyCode::Down => {
            app.form.focus_next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.focus_prev();
        }
        KeyCode::Left => {
            if let Some(field) = app.form.focused_field_mut() {
                match &mut field.kind {
                    FieldKind::Select { options, selected } => {
                        *selected = (*selected + options.len() - 1) % options.len();
                    }
                    FieldKind::Text { cursor, .. } => {
                        *cursor = cursor.saturating_sub(1);
                    }
                }
            }
        }
        KeyCode::Right => {
            if let Some(field) = app.form.focused_field_mut() {
                match &mut field.kind {
                    FieldKind::Select { options, selected } => {
                        *selected = (*selected + 1) % options.len();
                    }
                    FieldKind::Text { value, cursor } => {
                        *cursor = (*cursor + 1).min(value.chars().count());
                    }
                }
            }
        }
        KeyCode::Home => {
            if let Some(field) = app.form.focused_field_mut() {
                if let FieldKind::Text { cursor, .. } = &mut field.kind {
                    *cursor = 0;
                }
            }
        }
        KeyCode::End => {
            if let Some(field) = app.form.focused_field_mut() {
                if let FieldKind::Text { value, cursor } = &mut field.kind {
                    *cursor = value.chars().count();
                }
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = app.form.focused_field_mut() {
                if let FieldKind::Text { value, cursor } = &mut field.kind {
                    if *cursor > 0 {
                        *cursor -= 1;
                        let byte_pos = char_to_byte_index(value, *cursor);
                        value.remove(byte_pos);
                    }
                }
            }
            app.form_hint = None;
        }
        KeyCode::Delete => {
            if let Some(field) = app.form.focused_field_mut() {
                if let FieldKind::Text { value, cursor } = &mut field.kind {
                    if *cursor < value.chars().count() {
                        let byte_pos = char_to_byte_index(value, *cursor);
                        value.remove(byte_pos);
                    }
                }
            }
            app.form_hint = None;
        }
        KeyCode::Char(' ') => {
            // Space also cycles a dropdown; in a text field it is just a space
            if let Some(field) = app.form.focused_field_mut() {
                match &mut field.kind {
                    FieldKind::Select { options, selected } => {
                        *selected = (*selected + 1) % options.len();
                    }
                    FieldKind::Text { value, cursor } => {
                        let byte_pos = char_to_byte_index(value, *cursor);
                        value.insert(byte_pos, ' ');
                        *cursor += 1;
                    }
                }
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = app.form.focused_field_mut() {
                if let FieldKind::Text { value, cursor } = &mut field.kind {
                    let byte_pos = char_to_byte_index(value, *cursor);
                    value.insert(byte_pos, c);
                    *cursor += 1;
                }
            }
            app.form_hint = None;
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => {
            app.scroll_down();
            app.scroll_down();
            app.scroll_down();
        }
        MouseEventKind::ScrollUp => {
            app.scroll_up();
            app.scroll_up();
            app.scroll_up();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Sender;
    use crate::client::{ChatClient, ChatResponse};

    fn test_app() -> App {
        App::new(ChatClient::new("http://localhost:5000"))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn form_response(required: &[&str], optional: &[&str]) -> ChatResponse {
        ChatResponse {
            reply: Some("Please provide the following".to_string()),
            ask_params: true,
            required: required.iter().map(|s| s.to_string()).collect(),
            optional: optional.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_typing_edits_message_input() {
        let mut app = test_app();
        for c in "hi".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.input, "hi");
        assert_eq!(app.input_cursor, 2);

        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input, "h");
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = test_app();
        app.apply_response(form_response(&["item"], &[]));
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_form_typing_fills_focused_field() {
        let mut app = test_app();
        app.apply_response(form_response(&["item", "model_item"], &[]));
        assert_eq!(app.focus, FocusPane::Form);

        for c in "AB-100".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }
        handle_key(&mut app, key(KeyCode::Tab));
        for c in "M7".chars() {
            handle_key(&mut app, key(KeyCode::Char(c)));
        }

        let params = app.form.collect();
        assert_eq!(params.get("item").map(String::as_str), Some("AB-100"));
        assert_eq!(params.get("model_item").map(String::as_str), Some("M7"));
    }

    #[test]
    fn test_dropdown_cycles_through_fixed_options() {
        let mut app = test_app();
        app.apply_response(form_response(&["report_name"], &[]));

        assert_eq!(app.form.fields[0].value(), "Packslip");
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.form.fields[0].value(), "CommercialInvoice");
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.form.fields[0].value(), "SLI");
        handle_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.form.fields[0].value(), "Packslip");
        handle_key(&mut app, key(KeyCode::Left));
        assert_eq!(app.form.fields[0].value(), "SLI");
    }

    #[test]
    fn test_typing_into_dropdown_is_ignored() {
        let mut app = test_app();
        app.apply_response(form_response(&["report_name"], &[]));
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.form.fields[0].value(), "Packslip");
    }

    #[test]
    fn test_esc_returns_focus_to_message_input() {
        let mut app = test_app();
        app.apply_response(form_response(&["item"], &[]));
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.focus, FocusPane::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert!(app.form.visible, "escaping the form does not dismiss it");
    }

    #[tokio::test]
    async fn test_form_enter_submits_when_complete() {
        let mut app = test_app();
        app.apply_response(form_response(&["report_name"], &["country_query"]));

        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.pending.is_some(), "dropdown default satisfies required");

        if let Some((_, task)) = app.pending.take() {
            task.abort();
        }
    }

    #[test]
    fn test_mouse_scroll_moves_transcript() {
        let mut app = test_app();
        app.transcript_height = 5;
        app.transcript_width = 40;
        for _ in 0..30 {
            app.push_message("line", Sender::Bot);
        }
        let bottom = app.transcript_scroll;
        handle_mouse(
            &mut app,
            MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 0,
                row: 0,
                modifiers: KeyModifiers::NONE,
            },
        );
        assert!(app.transcript_scroll < bottom);
    }
}
