use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode, Sender};
use crate::form::{FieldKind, ParamField};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let form_height = if app.form.visible {
        app.form.fields.len() as u16 + 2 // +2 for borders
    } else {
        0
    };

    let [header_area, transcript_area, form_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(form_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, transcript_area);
    if app.form.visible {
        render_form(app, frame, form_area);
    }
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" GTM Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            app.client.endpoint().to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store inner dimensions for the scroll-to-bottom calculation
    app.transcript_height = area.height.saturating_sub(2);
    app.transcript_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        match msg.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
            }
            Sender::Bot => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )));
            }
        }
        if msg.text.is_empty() {
            lines.push(Line::default());
        }
        for line in msg.text.lines() {
            lines.push(Line::from(line.to_string()));
        }
        lines.push(Line::default());
    }

    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn field_prefix(field: &ParamField) -> String {
    if field.required {
        format!("{} (required): ", field.label)
    } else {
        format!("{}: ", field.label)
    }
}

fn render_form(app: &App, frame: &mut Frame, area: Rect) {
    let form_focused = app.focus == FocusPane::Form;
    let border_color = if form_focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Parameters (Enter to submit) ");

    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in app.form.fields.iter().enumerate() {
        let focused = form_focused && i == app.form.focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let mut spans = vec![Span::styled(field_prefix(field), label_style)];
        match &field.kind {
            FieldKind::Select { options, selected } => {
                let value = options.get(*selected).map(|s| s.as_str()).unwrap_or("");
                let value_style = if focused {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(format!("< {} >", value), value_style));
            }
            FieldKind::Text { value, .. } => {
                spans.push(Span::raw(value.clone()));
            }
        }
        lines.push(Line::from(spans));
    }

    let form = Paragraph::new(Text::from(lines)).block(block);
    frame.render_widget(form, area);

    // Cursor inside the focused text field
    if form_focused {
        if let Some(field) = app.form.fields.get(app.form.focus) {
            if let FieldKind::Text { cursor, .. } = &field.kind {
                let prefix_width = field_prefix(field).chars().count() as u16;
                frame.set_cursor_position((
                    area.x + 1 + prefix_width + *cursor as u16,
                    area.y + 1 + app.form.focus as u16,
                ));
            }
        }
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_active = app.focus == FocusPane::Input && app.input_mode == InputMode::Editing;
    let border_color = if input_active {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message (Enter to send) ");

    // Horizontal scroll keeps the cursor visible in a narrow box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if input_active {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    // A blocked form submission takes over the footer until the next edit
    if let Some(hint) = &app.form_hint {
        let warning = Paragraph::new(Line::from(Span::styled(
            format!(" {} ", hint),
            Style::default().bg(Color::Red).fg(Color::White).bold(),
        )));
        frame.render_widget(warning, area);
        return;
    }

    let hints: Vec<Span> = match app.focus {
        FocusPane::Form => vec![
            Span::styled(" Tab/↑↓ ", key_style),
            Span::styled(" field ", label_style),
            Span::styled(" ←/→ ", key_style),
            Span::styled(" choose ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" submit ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" message ", label_style),
        ],
        FocusPane::Input => match app.input_mode {
            InputMode::Editing => {
                let mut hints = vec![
                    Span::styled(" Enter ", key_style),
                    Span::styled(" send ", label_style),
                    Span::styled(" Esc ", key_style),
                    Span::styled(" scroll ", label_style),
                ];
                if app.form.visible {
                    hints.extend(vec![
                        Span::styled(" Tab ", key_style),
                        Span::styled(" form ", label_style),
                    ]);
                }
                hints.extend(vec![
                    Span::styled(" Ctrl-C ", key_style),
                    Span::styled(" quit ", label_style),
                ]);
                hints
            }
            InputMode::Normal => vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" g/G ", key_style),
                Span::styled(" top/bottom ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        },
    };

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}
