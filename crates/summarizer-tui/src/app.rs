use std::sync::Arc;

use ratatui::layout::Rect;
use summarizer_core::{
    Config, FormParts, HttpSummaryClient, InteractionController, SharedForm, SubmitOutcome,
    SummaryLength,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub type Controller = InteractionController<SharedForm, HttpSummaryClient>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Length,
    Submit,
    Output,
}

impl FocusPane {
    pub fn next(&self) -> Self {
        match self {
            FocusPane::Input => FocusPane::Length,
            FocusPane::Length => FocusPane::Submit,
            FocusPane::Submit => FocusPane::Output,
            FocusPane::Output => FocusPane::Input,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FocusPane::Input => FocusPane::Output,
            FocusPane::Length => FocusPane::Input,
            FocusPane::Submit => FocusPane::Length,
            FocusPane::Output => FocusPane::Submit,
        }
    }
}

/// Resolved startup settings (flags, environment and config file merged).
#[derive(Debug, Clone)]
pub struct Settings {
    pub summarize_url: String,
    pub length: SummaryLength,
    pub client: HttpSummaryClient,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Summarizer (None when the form could not be bound)
    pub controller: Option<Arc<Controller>>,
    pub submit_task: Option<JoinHandle<SubmitOutcome>>,
    pub footer_year: Option<String>,
    pub endpoint: String,

    // View state
    pub output_scroll: u16,
    pub input_scroll: u16,
    pub animation_frame: u8, // 0-2 for ellipsis animation
    pub persist_length: bool,

    // Panel areas for mouse hit-testing (updated during render)
    pub input_area: Option<Rect>,
    pub submit_area: Option<Rect>,
    pub output_area: Option<Rect>,
}

impl App {
    pub fn new(settings: Settings, year: i32) -> Self {
        Self::from_parts(
            FormParts::complete(Some(settings.summarize_url.clone()), settings.length),
            settings,
            year,
        )
    }

    pub fn from_parts(mut parts: FormParts, settings: Settings, year: i32) -> Self {
        parts.fill_footer_year(year);
        let footer_year = parts.year.as_ref().and_then(|y| y.text.clone());

        let controller = InteractionController::bind(parts, Arc::new(settings.client))
            .map(Arc::new);
        if controller.is_none() {
            warn!("summarizer form incomplete, not binding");
        }

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,
            controller,
            submit_task: None,
            footer_year,
            endpoint: settings.summarize_url,
            output_scroll: 0,
            input_scroll: 0,
            animation_frame: 0,
            persist_length: true,
            input_area: None,
            submit_area: None,
            output_area: None,
        }
    }

    pub fn form(&self) -> Option<&SharedForm> {
        self.controller.as_ref().map(|c| c.form())
    }

    pub fn is_loading(&self) -> bool {
        self.form().map(|f| f.lock().is_loading()).unwrap_or(false)
    }

    /// Button press. Ignored while the button is disabled, like a real
    /// disabled control. The mouse, the focused button and the Ctrl+Enter
    /// shortcut all come through here.
    pub fn click_submit(&mut self) {
        let enabled = self
            .form()
            .map(|f| f.lock().is_submit_enabled())
            .unwrap_or(false);
        if enabled {
            self.submit();
        }
    }

    /// Start a submission in the background.
    fn submit(&mut self) {
        let Some(controller) = self.controller.clone() else {
            return;
        };
        if self.submit_task.as_ref().is_some_and(|t| !t.is_finished()) {
            debug!("submit ignored, previous task still running");
            return;
        }
        self.output_scroll = 0;
        self.submit_task = Some(tokio::spawn(async move { controller.submit().await }));
    }

    /// Collect a finished submission, if there is one.
    pub async fn reap_submit_task(&mut self) -> Option<SubmitOutcome> {
        if !self.submit_task.as_ref().is_some_and(|t| t.is_finished()) {
            return None;
        }
        let task = self.submit_task.take()?;
        match task.await {
            Ok(outcome) => {
                debug!(?outcome, "submission finished");
                Some(outcome)
            }
            Err(err) => {
                warn!(%err, "submission task failed");
                None
            }
        }
    }

    pub fn select_length(&mut self, forward: bool) {
        let Some(form) = self.form() else {
            return;
        };
        let length = {
            let mut state = form.lock();
            state.length.selected = if forward {
                state.length.selected.next()
            } else {
                state.length.selected.prev()
            };
            state.length.selected
        };
        if self.persist_length {
            if let Err(err) = Config::save_default_length(length) {
                warn!(%err, "could not save default length");
            }
        }
    }

    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
        self.sync_input_mode();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
        self.sync_input_mode();
    }

    pub fn set_focus(&mut self, focus: FocusPane) {
        self.focus = focus;
        self.sync_input_mode();
    }

    fn sync_input_mode(&mut self) {
        self.input_mode = if self.focus == FocusPane::Input {
            InputMode::Editing
        } else {
            InputMode::Normal
        };
    }

    pub fn scroll_output_down(&mut self) {
        self.output_scroll = self.output_scroll.saturating_add(1);
    }

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }
}
