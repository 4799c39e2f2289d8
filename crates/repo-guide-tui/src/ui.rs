use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use repo_guide_core::{AnswerArea, Block as Entry, Phase};

use crate::app::{App, FocusPane, InputMode};

const QA_HEIGHT: u16 = 10;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let qa_visible = app.controller.view().qa_visible;

    // Main layout: header, url form, loader, results, q&a, footer
    let [header_area, url_area, loader_area, results_area, qa_area, footer_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(if qa_visible { QA_HEIGHT } else { 0 }),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, frame, header_area);
    render_url_form(app, frame, url_area);
    render_loader(app, frame, loader_area);
    render_results(app, frame, results_area);
    if qa_visible {
        render_qa(app, frame, qa_area);
    }
    render_footer(app, frame, footer_area);
}

fn focus_border(app: &App, pane: FocusPane) -> Style {
    if app.focus != pane {
        Style::default().fg(Color::DarkGray)
    } else if app.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Repo Guide ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("[{}] ", app.server_url),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Draw a single-line input and, while it is being edited, place the cursor.
fn render_input(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    title: &str,
    pane: FocusPane,
    text: &str,
    cursor: usize,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, pane))
        .title(title.to_string());
    let inner = block.inner(area);

    // Keep the cursor inside the box by scrolling long input horizontally
    let width = inner.width.max(1) as usize;
    let offset = cursor.saturating_sub(width.saturating_sub(1));
    let visible: String = text.chars().skip(offset).take(width).collect();

    frame.render_widget(Paragraph::new(visible).block(block), area);

    if app.focus == pane && app.input_mode == InputMode::Editing {
        let x = inner.x + (cursor - offset) as u16;
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

fn render_url_form(app: &App, frame: &mut Frame, area: Rect) {
    let view = app.controller.view();
    render_input(
        app,
        frame,
        area,
        " Repository URL ",
        FocusPane::Url,
        &view.url_input,
        app.url_cursor,
    );
}

fn render_loader(app: &App, frame: &mut Frame, area: Rect) {
    if !app.controller.view().loader_visible {
        return;
    }
    let loader = Paragraph::new(Line::from(Span::styled(
        format!(" {}", app.loader_text()),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
    )));
    frame.render_widget(loader, area);
}

fn entry_lines(entry: &Entry) -> Vec<Line<'static>> {
    match entry {
        Entry::Explanation { file, text } => {
            let mut lines = vec![Line::from(vec![
                Span::styled(
                    file.clone(),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(":"),
            ])];
            lines.extend(text.lines().map(|l| Line::from(l.to_string())));
            lines.push(Line::default());
            lines
        }
        Entry::Error { message } => vec![Line::from(Span::styled(
            format!("Error: {message}"),
            Style::default().fg(Color::Red),
        ))],
    }
}

fn render_results(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app, FocusPane::Results))
        .title(" Explanations ");
    let inner = block.inner(area);

    app.results_area = Some(area);
    app.results_height = inner.height;
    app.results_width = inner.width;

    let view = app.controller.view();
    let text = if view.results_visible {
        Text::from(
            view.explanations
                .blocks()
                .iter()
                .flat_map(entry_lines)
                .collect::<Vec<_>>(),
        )
    } else {
        let hint = match app.phase() {
            Phase::Analyzing => "Waiting for the first explanation...",
            _ => "Enter a repository URL and press Enter to analyze it.",
        };
        Text::from(Line::from(Span::styled(
            hint,
            Style::default().fg(Color::DarkGray),
        )))
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.results_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_qa(app: &App, frame: &mut Frame, area: Rect) {
    let [question_area, answer_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let view = app.controller.view();
    render_input(
        app,
        frame,
        question_area,
        " Ask about this repository ",
        FocusPane::Question,
        &view.question_input,
        app.question_cursor,
    );

    let title = if app.phase() == Phase::Asking {
        format!(" Answer - {} ", app.loader_text())
    } else {
        " Answer ".to_string()
    };
    let style = match view.answer {
        AnswerArea::Error(_) => Style::default().fg(Color::Red),
        AnswerArea::Processing => Style::default().fg(Color::Yellow),
        AnswerArea::Empty | AnswerArea::Answer(_) => Style::default(),
    };

    let answer = Paragraph::new(view.answer.text())
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(answer, answer_area);
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
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!(" {notice} "), Style::default().fg(Color::Red)));
    } else {
        let hints: &[(&str, &str)] = match app.input_mode {
            InputMode::Editing => &[
                (" Enter ", " submit "),
                (" Esc ", " stop editing "),
                (" Tab ", " focus "),
            ],
            InputMode::Normal => &[
                (" i ", " edit "),
                (" j/k ", " scroll "),
                (" Tab ", " focus "),
                (" q ", " quit "),
            ],
        };
        for (key, label) in hints {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::styled(*label, label_style));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
