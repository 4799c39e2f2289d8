use std::path::PathBuf;

use ratatui::layout::Rect;
use repo_guide_core::{Block, Controller, Phase};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Url,
    Results,
    Question,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Forms and output regions
    pub controller: Controller,
    pub server_url: String,
    // Where submitted repository URLs are remembered; None keeps them in memory
    pub config_path: Option<PathBuf>,
    pub url_cursor: usize,
    pub question_cursor: usize,

    // Results scrolling
    pub results_scroll: u16,
    pub results_height: u16,
    pub results_width: u16,
    pub follow_results: bool,

    // Last refused submission, shown in the footer until the next key
    pub notice: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub results_area: Option<Rect>,
}

impl App {
    pub fn new(server_url: impl Into<String>, initial_url: Option<String>) -> Self {
        let controller = Controller::with_url(initial_url.unwrap_or_default());
        let url_cursor = controller.view().url_input.chars().count();

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Url,

            controller,
            server_url: server_url.into(),
            config_path: None,
            url_cursor,
            question_cursor: 0,

            results_scroll: 0,
            results_height: 0,
            results_width: 0,
            follow_results: true,

            notice: None,

            animation_frame: 0,

            results_area: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Apply a background request event to the controller.
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Record(record) => {
                self.controller.apply_record(record);
                if self.follow_results {
                    self.scroll_results_to_bottom();
                }
            }
            AppEvent::AnalysisFinished => {
                self.controller.finish_analysis();
            }
            AppEvent::AnalysisFailed(message) => {
                self.controller.fail_analysis(message);
                self.results_scroll = 0;
            }
            AppEvent::Answer(outcome) => {
                self.controller.finish_question(outcome);
                self.question_cursor = 0;
            }
            AppEvent::Key(_) | AppEvent::Mouse(_) | AppEvent::Resize(_, _) | AppEvent::Tick => {}
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.phase().is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn focus_next(&mut self) {
        let qa_visible = self.controller.view().qa_visible;
        self.focus = match self.focus {
            FocusPane::Url => FocusPane::Results,
            FocusPane::Results if qa_visible => FocusPane::Question,
            FocusPane::Results | FocusPane::Question => FocusPane::Url,
        };
    }

    /// Total wrapped lines the results panel needs at the current width.
    pub fn results_line_count(&self) -> u16 {
        // Use actual panel width for wrap calculation, default to 50 if not set
        let wrap_width = if self.results_width > 0 {
            self.results_width as usize
        } else {
            50
        };

        let wrapped = |line: &str| {
            // Use character count, not byte length, for proper UTF-8 handling
            let char_count = line.chars().count();
            if char_count == 0 {
                1
            } else {
                char_count.div_ceil(wrap_width)
            }
        };

        let mut total = 0usize;
        for block in self.controller.view().explanations.blocks() {
            match block {
                Block::Explanation { file, text } => {
                    total += wrapped(&format!("{file}:"));
                    total += text.lines().map(wrapped).sum::<usize>();
                    total += 1; // Blank line after each explanation
                }
                Block::Error { message } => {
                    total += wrapped(&format!("Error: {message}"));
                }
            }
        }
        total.min(u16::MAX as usize) as u16
    }

    fn max_results_scroll(&self) -> u16 {
        let visible_height = if self.results_height > 0 {
            self.results_height
        } else {
            20
        };
        self.results_line_count().saturating_sub(visible_height)
    }

    pub fn scroll_results_to_bottom(&mut self) {
        self.results_scroll = self.max_results_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_results_scroll();
        self.results_scroll = self.results_scroll.saturating_add(lines).min(max);
        self.follow_results = self.results_scroll == max;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.results_scroll = self.results_scroll.saturating_sub(lines);
        self.follow_results = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.results_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.results_height / 2).max(1));
    }

    /// "Analyzing", "Analyzing.", ... driven by `tick_animation`.
    pub fn loader_text(&self) -> String {
        let dots = ".".repeat(self.animation_frame as usize);
        match self.phase() {
            Phase::Asking => format!("Thinking{dots}"),
            _ => format!("Analyzing repository{dots}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_guide_core::{AnswerRecord, StreamRecord};

    fn app() -> App {
        App::new("http://127.0.0.1:9", Some("https://github.com/octo/demo".into()))
    }

    fn success(file: &str) -> AppEvent {
        AppEvent::Record(StreamRecord::Success {
            file: file.into(),
            explanation: "line one\nline two".into(),
        })
    }

    #[test]
    fn starts_editing_the_prefilled_url() {
        let app = app();
        assert_eq!(app.focus, FocusPane::Url);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.url_cursor, "https://github.com/octo/demo".chars().count());
    }

    #[test]
    fn events_drive_the_controller() {
        let mut app = app();
        app.controller.begin_analysis().unwrap();

        app.apply_event(success("a.py"));
        app.apply_event(AppEvent::AnalysisFinished);

        let view = app.controller.view();
        assert!(view.results_visible);
        assert!(view.qa_visible);
        assert_eq!(app.phase(), Phase::Ready);

        app.controller.question_input_mut().push_str("why?");
        app.question_cursor = 4;
        app.controller.begin_question().unwrap();
        app.apply_event(AppEvent::Answer(Ok(AnswerRecord::Success {
            answer: "because".into(),
        })));

        assert_eq!(app.controller.view().answer.text(), "because");
        assert!(app.controller.view().question_input.is_empty());
        assert_eq!(app.question_cursor, 0);
    }

    #[test]
    fn question_focus_requires_qa_section() {
        let mut app = app();
        app.focus_next();
        assert_eq!(app.focus, FocusPane::Results);
        app.focus_next();
        assert_eq!(app.focus, FocusPane::Url);

        app.controller.begin_analysis().unwrap();
        app.apply_event(AppEvent::AnalysisFinished);
        app.focus_next();
        app.focus_next();
        assert_eq!(app.focus, FocusPane::Question);
    }

    #[test]
    fn line_count_wraps_and_scroll_clamps() {
        let mut app = app();
        app.results_width = 10;
        app.results_height = 4;
        app.controller.begin_analysis().unwrap();
        app.apply_event(success("a.py"));
        app.apply_event(AppEvent::Record(StreamRecord::Error {
            message: "exactly 18 chars!!".into(),
        }));

        // "a.py:" 1 + "line one" 1 + "line two" 1 + blank 1 + 25-char error 3
        assert_eq!(app.results_line_count(), 7);
        assert_eq!(app.results_scroll, 3);

        app.scroll_up(10);
        assert_eq!(app.results_scroll, 0);
        assert!(!app.follow_results);

        app.scroll_down(100);
        assert_eq!(app.results_scroll, 3);
        assert!(app.follow_results);
    }
}
