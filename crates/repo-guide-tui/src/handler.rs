use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use repo_guide_core::{consume_stream, Backend, Config};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Anything the TUI can submit to: cloned into each request task.
pub trait SharedBackend: Backend + Clone + 'static {}

impl<B: Backend + Clone + 'static> SharedBackend for B {}

pub fn handle_event<B: SharedBackend>(
    app: &mut App,
    event: AppEvent,
    backend: &B,
    tx: &UnboundedSender<AppEvent>,
) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, backend, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        other => app.apply_event(other),
    }
    Ok(())
}

fn handle_key<B: SharedBackend>(
    app: &mut App,
    key: KeyEvent,
    backend: &B,
    tx: &UnboundedSender<AppEvent>,
) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    app.notice = None;

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key, backend, tx),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Tab cycles focus; the question input only exists once Q&A is open
        KeyCode::Tab => app.focus_next(),

        // Start editing the focused form
        KeyCode::Enter | KeyCode::Char('i') => match app.focus {
            FocusPane::Url | FocusPane::Question => app.input_mode = InputMode::Editing,
            FocusPane::Results => {}
        },

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('g') => {
            app.results_scroll = 0;
            app.follow_results = false;
        }
        KeyCode::Char('G') => {
            app.scroll_results_to_bottom();
            app.follow_results = true;
        }
        _ => {}
    }
}

fn handle_editing_mode<B: SharedBackend>(
    app: &mut App,
    key: KeyEvent,
    backend: &B,
    tx: &UnboundedSender<AppEvent>,
) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus_next();
        }
        KeyCode::Enter => match app.focus {
            FocusPane::Url => submit_analysis(app, backend, tx),
            FocusPane::Question => submit_question(app, backend, tx),
            FocusPane::Results => {}
        },
        _ => {
            let App {
                controller,
                url_cursor,
                question_cursor,
                focus,
                ..
            } = app;
            match focus {
                FocusPane::Url => edit_field(controller.url_input_mut(), url_cursor, key),
                FocusPane::Question => {
                    edit_field(controller.question_input_mut(), question_cursor, key)
                }
                FocusPane::Results => {}
            }
        }
    }
}

/// Line-editing keys shared by both inputs.
fn edit_field(field: &mut String, cursor: &mut usize, key: KeyEvent) {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(field, *cursor);
                field.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = field.chars().count();
            if *cursor < char_count {
                let byte_pos = char_to_byte_index(field, *cursor);
                field.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = field.chars().count();
            *cursor = (*cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            *cursor = 0;
        }
        KeyCode::End => {
            *cursor = field.chars().count();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            field.clear();
            *cursor = 0;
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(field, *cursor);
            field.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => {}
    }
}

fn submit_analysis<B: SharedBackend>(app: &mut App, backend: &B, tx: &UnboundedSender<AppEvent>) {
    if app.controller.view().url_input.trim().is_empty() {
        return;
    }

    let url = match app.controller.begin_analysis() {
        Ok(url) => url,
        Err(err) => {
            app.notice = Some(err.to_string());
            return;
        }
    };

    app.input_mode = InputMode::Normal;
    app.focus = FocusPane::Results;
    app.results_scroll = 0;
    app.follow_results = true;

    // File I/O stays off the event loop
    if let Some(path) = app.config_path.clone() {
        let url = url.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(err) = Config::save_last_repo_url_to(&path, &url) {
                warn!(error = %err, "could not remember repository url");
            }
        });
    }

    // Spawn background task to stream the analysis back as events
    tokio::spawn(stream_analysis(backend.clone(), url, tx.clone()));
}

/// Send every record as it is decoded, then exactly one closing event.
async fn stream_analysis<B: Backend>(backend: B, url: String, tx: UnboundedSender<AppEvent>) {

    let outcome = match backend.analyze(&url).await {
        Ok(chunks) => {
            consume_stream(chunks, |record| {
                let _ = tx.send(AppEvent::Record(record));
            })
            .await
        }
        Err(err) => Err(err),
    };

    let _ = tx.send(match outcome {
        Ok(_) => AppEvent::AnalysisFinished,
        Err(err) => AppEvent::AnalysisFailed(err.to_string()),
    });
}

fn submit_question<B: SharedBackend>(app: &mut App, backend: &B, tx: &UnboundedSender<AppEvent>) {
    if app.controller.view().question_input.trim().is_empty() {
        return;
    }

    let question = match app.controller.begin_question() {
        Ok(question) => question,
        Err(err) => {
            app.notice = Some(err.to_string());
            return;
        }
    };

    app.input_mode = InputMode::Normal;

    // Spawn background task to query the service
    let backend = backend.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = backend.ask(&question).await.map_err(|err| err.to_string());
        let _ = tx.send(AppEvent::Answer(outcome));
    });
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let over_results = app
        .results_area
        .is_some_and(|area| point_in_rect(mouse.column, mouse.row, area));
    if !over_results {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::Down(_) => {
            app.focus = FocusPane::Results;
            app.input_mode = InputMode::Normal;
        }
        _ => {}
    }
}
