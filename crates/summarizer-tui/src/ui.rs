use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use summarizer_core::{FormState, SummaryLength};
use unicode_width::UnicodeWidthChar;
use crate::app::{App, FocusPane, InputMode};

/// Split input into display rows: hard breaks on '\n', then at `width`
/// terminal columns. A wide char that would straddle the edge starts the
/// next row instead.
fn input_rows(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = vec![String::new()];
    let mut col = 0;

    for c in text.chars() {
        if c == '\n' {
            rows.push(String::new());
            col = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if col > 0 && col + w > width {
            rows.push(String::new());
            col = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push(c);
        }
        col += w;
        if col >= width {
            rows.push(String::new());
            col = 0;
        }
    }

    rows
}

/// Row and display column of a char-indexed cursor within [`input_rows`].
fn cursor_row_col(text: &str, cursor: usize, width: usize) -> (usize, usize) {
    let width = width.max(1);
    let mut row = 0;
    let mut col = 0;

    for (i, c) in text.chars().enumerate() {
        if i == cursor {
            break;
        }
        if c == '\n' {
            row += 1;
            col = 0;
            continue;
        }
        let w = c.width().unwrap_or(0);
        if col > 0 && col + w > width {
            row += 1;
            col = 0;
        }
        col += w;
        if col >= width {
            row += 1;
            col = 0;
        }
    }

    (row, col)
}

/// Keep `row` inside a window of `height` rows starting at `scroll`.
fn scroll_to_row(scroll: u16, row: usize, height: usize) -> u16 {
    let height = height.max(1);
    let scroll = scroll as usize;
    let scroll = if row < scroll {
        row
    } else if row >= scroll + height {
        row + 1 - height
    } else {
        scroll
    };
    scroll.min(u16::MAX as usize) as u16
}

fn border_color(focused: bool) -> Color {
    if focused { Color::Cyan } else { Color::DarkGray }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    // Snapshot so a submit task finishing mid-draw can't tear the frame
    let snapshot = app.form().map(|form| form.lock().clone());
    match snapshot {
        Some(state) => render_summarizer(app, &state, frame, body_area),
        None => render_unavailable(frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Summarizer ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(app.endpoint.clone(), Style::default().fg(Color::Gray)),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::White);

    let hints: &[(&str, &str)] = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => &[("C-Enter", "summarize"), ("Esc", "done"), ("Tab", "next")],
        (InputMode::Normal, FocusPane::Length) => &[("←/→", "length"), ("Tab", "next"), ("q", "quit")],
        (InputMode::Normal, FocusPane::Submit) => &[("Enter", "summarize"), ("Tab", "next"), ("q", "quit")],
        (InputMode::Normal, FocusPane::Output) => &[("j/k", "scroll"), ("Tab", "next"), ("q", "quit")],
        (InputMode::Normal, FocusPane::Input) => &[("Enter", "edit"), ("s", "summarize"), ("q", "quit")],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    let year = app
        .footer_year
        .as_ref()
        .map(|year| format!("© {} ", year))
        .unwrap_or_default();

    let [hints_area, year_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(year.chars().count() as u16),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(Line::from(spans)), hints_area);
    frame.render_widget(
        Paragraph::new(year)
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        year_area,
    );
}

fn render_unavailable(frame: &mut Frame, area: Rect) {
    let message = Paragraph::new("Summarizer unavailable: the form could not be set up.")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(message, area);
}

fn render_summarizer(app: &mut App, state: &FormState, frame: &mut Frame, area: Rect) {
    let [input_area, controls_area, output_area] = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(3),
        Constraint::Min(3),
    ])
    .areas(area);

    let [length_area, submit_area, loading_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(15),
        Constraint::Length(18),
    ])
    .areas(controls_area);

    // Store areas for mouse hit-testing
    app.input_area = Some(input_area);
    app.submit_area = Some(submit_area);
    app.output_area = Some(output_area);

    render_input(app, state, frame, input_area);
    render_length_selector(app, state, frame, length_area);
    render_submit_button(app, state, frame, submit_area);
    render_loading_indicator(app, state, frame, loading_area);
    render_output(app, state, frame, output_area);
}

fn render_input(app: &mut App, state: &FormState, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            Color::Yellow
        } else {
            border_color(app.focus == FocusPane::Input)
        }))
        .title(" Text to summarize ");

    let inner = block.inner(area);
    let width = inner.width as usize;
    let height = inner.height as usize;

    let input = &state.input;
    if input.value.is_empty() && !editing {
        let placeholder = Paragraph::new("Paste or type the text you want summarized...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let (cursor_row, cursor_col) = cursor_row_col(&input.value, input.cursor, width);
    app.input_scroll = scroll_to_row(app.input_scroll, cursor_row, height);

    let lines: Vec<Line> = input_rows(&input.value, width)
        .into_iter()
        .map(Line::from)
        .collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .style(Style::default().fg(Color::Cyan))
        .scroll((app.input_scroll, 0))
        .block(block);
    frame.render_widget(paragraph, area);

    // Show cursor when editing
    if editing && width > 0 && height > 0 {
        let visible_row = cursor_row.saturating_sub(app.input_scroll as usize);
        frame.set_cursor_position((
            inner.x + cursor_col as u16,
            inner.y + visible_row as u16,
        ));
    }
}

fn render_length_selector(app: &App, state: &FormState, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Length;
    let mut spans = Vec::new();
    for length in SummaryLength::all() {
        let label = format!(" {} ", length.display_name());
        if length == state.length.selected {
            spans.push(Span::styled(
                label,
                Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::styled(label, Style::default().fg(Color::Gray)));
        }
        spans.push(Span::raw(" "));
    }

    let selector = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color(focused)))
            .title(" Length "),
    );
    frame.render_widget(selector, area);
}

fn render_submit_button(app: &App, state: &FormState, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Submit;
    let style = if !state.is_submit_enabled() {
        Style::default().fg(Color::DarkGray)
    } else if focused {
        Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let button = Paragraph::new(Span::styled(" Summarize ", style))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(focused))),
        );
    frame.render_widget(button, area);
}

fn render_loading_indicator(app: &App, state: &FormState, frame: &mut Frame, area: Rect) {
    if !state.is_indicator_visible() {
        return;
    }
    let dots = ".".repeat(app.animation_frame as usize + 1);
    let indicator = Paragraph::new(Span::styled(
        format!("Summarizing{}", dots),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
    ))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(indicator, area);
}

fn render_output(app: &App, state: &FormState, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Output;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(focused)))
        .title(" Summary ");

    // Plain text only; control characters were replaced when the message was built
    let text = match state.output.message() {
        Some(message) if message.is_error() => {
            Text::styled(message.text().to_string(), Style::default().fg(Color::Red))
        }
        Some(message) => Text::raw(message.text().to_string()),
        None if state.output.loading => Text::default(),
        None => Text::styled(
            "Your summary will appear here.",
            Style::default().fg(Color::DarkGray),
        ),
    };

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0))
        .block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};
    use summarizer_core::OutputMessage;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_input_rows_wrap_by_char_and_newline() {
        assert_eq!(input_rows("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(input_rows("ab\ncd", 4), vec!["ab", "cd"]);
        assert_eq!(input_rows("", 4), vec![""]);
    }

    #[test]
    fn test_cursor_tracks_wrapping() {
        assert_eq!(cursor_row_col("abcdef", 0, 4), (0, 0));
        assert_eq!(cursor_row_col("abcdef", 5, 4), (1, 1));
        assert_eq!(cursor_row_col("ab\ncd", 3, 4), (1, 0));
        assert_eq!(cursor_row_col("abcd", 4, 4), (1, 0));
    }

    #[test]
    fn test_wide_chars_wrap_by_display_width() {
        assert_eq!(input_rows("日本語", 4), vec!["日本", "語"]);
        // A wide char never straddles the right edge.
        assert_eq!(input_rows("a日本", 4), vec!["a日", "本"]);
        assert_eq!(input_rows("é", 4), vec!["é"]);
    }

    #[test]
    fn test_cursor_counts_columns_for_wide_chars() {
        assert_eq!(cursor_row_col("日本語", 1, 4), (0, 2));
        assert_eq!(cursor_row_col("日本語", 2, 4), (1, 0));
        assert_eq!(cursor_row_col("日本語", 3, 4), (1, 2));
        assert_eq!(cursor_row_col("a日本", 3, 4), (1, 2));
    }

    #[test]
    fn test_scroll_keeps_row_visible() {
        assert_eq!(scroll_to_row(0, 2, 5), 0);
        assert_eq!(scroll_to_row(0, 7, 5), 3);
        assert_eq!(scroll_to_row(4, 1, 5), 1);
    }

    #[test]
    fn test_markup_in_summary_is_drawn_literally() {
        let mut app = test_app();
        app.form()
            .unwrap()
            .lock()
            .output
            .replace_with(OutputMessage::summary("<b>bold</b>"));

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("<b>bold</b>"));
        assert!(screen.contains("© 2026"));
    }
}
