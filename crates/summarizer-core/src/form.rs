//! UI-agnostic form model
//!
//! The summarizer screen is made of a handful of named parts: a container
//! that carries the endpoint URL, a text input, a length selector, a submit
//! control, an output region, a loading indicator and a footer year. Front
//! ends build a [`FormParts`] from whatever they actually have and hand it to
//! the controller, which only binds when every required part is present.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::length::SummaryLength;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Replace control characters (other than newline and tab) so text coming
/// back from the server is always shown literally and can never emit
/// terminal escape sequences.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect()
}

/// The single message shown in the output region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMessage {
    text: String,
    is_error: bool,
}

impl OutputMessage {
    pub fn new(text: &str, is_error: bool) -> Self {
        Self {
            text: sanitize_text(text),
            is_error,
        }
    }

    pub fn summary(text: &str) -> Self {
        Self::new(text, false)
    }

    pub fn error(text: &str) -> Self {
        Self::new(text, true)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// Holds the endpoint URL the page was configured with.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub summarize_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize, // in chars, not bytes
}

impl TextInput {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let char_count = self.value.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LengthSelector {
    pub selected: SummaryLength,
}

#[derive(Debug, Clone, Default)]
pub struct SubmitButton {
    pub disabled: bool,
}

/// Output region. Holds at most one message; `loading` is purely
/// presentational.
#[derive(Debug, Clone, Default)]
pub struct OutputRegion {
    message: Option<OutputMessage>,
    pub loading: bool,
}

impl OutputRegion {
    pub fn message(&self) -> Option<&OutputMessage> {
        self.message.as_ref()
    }

    /// Replace whatever is shown with exactly one message.
    pub fn replace_with(&mut self, message: OutputMessage) {
        self.message = Some(message);
    }

    pub fn clear(&mut self) {
        self.message = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    pub visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct YearPlaceholder {
    pub text: Option<String>,
}

/// Whatever parts a front end found. Missing parts stay `None`.
#[derive(Debug, Clone, Default)]
pub struct FormParts {
    pub container: Option<Container>,
    pub input: Option<TextInput>,
    pub length: Option<LengthSelector>,
    pub submit: Option<SubmitButton>,
    pub output: Option<OutputRegion>,
    pub loading_indicator: Option<LoadingIndicator>,
    pub year: Option<YearPlaceholder>,
}

impl FormParts {
    /// Every part present, with the given endpoint and starting length.
    pub fn complete(summarize_url: Option<String>, length: SummaryLength) -> Self {
        Self {
            container: Some(Container { summarize_url }),
            input: Some(TextInput::default()),
            length: Some(LengthSelector { selected: length }),
            submit: Some(SubmitButton::default()),
            output: Some(OutputRegion::default()),
            loading_indicator: Some(LoadingIndicator::default()),
            year: Some(YearPlaceholder::default()),
        }
    }

    /// Fill the footer year if there is a placeholder for it. Independent of
    /// whether the summarizer binds.
    pub fn fill_footer_year(&mut self, year: i32) {
        if let Some(placeholder) = self.year.as_mut() {
            placeholder.text = Some(year.to_string());
        }
    }
}

/// A fully bound form: the five required parts plus the optional ones.
#[derive(Debug, Clone)]
pub struct FormState {
    pub container: Container,
    pub input: TextInput,
    pub length: LengthSelector,
    pub submit: SubmitButton,
    pub output: OutputRegion,
    pub loading_indicator: Option<LoadingIndicator>,
    pub year: Option<YearPlaceholder>,
}

impl FormState {
    /// `None` unless container, input, length selector, submit control and
    /// output region are all present.
    pub fn from_parts(parts: FormParts) -> Option<Self> {
        Some(Self {
            container: parts.container?,
            input: parts.input?,
            length: parts.length?,
            submit: parts.submit?,
            output: parts.output?,
            loading_indicator: parts.loading_indicator,
            year: parts.year,
        })
    }

    pub fn is_loading(&self) -> bool {
        self.output.loading
    }

    pub fn is_submit_enabled(&self) -> bool {
        !self.submit.disabled
    }

    pub fn is_indicator_visible(&self) -> bool {
        self.loading_indicator
            .as_ref()
            .map(|indicator| indicator.visible)
            .unwrap_or(false)
    }

    pub fn footer_year(&self) -> Option<&str> {
        self.year.as_ref().and_then(|y| y.text.as_deref())
    }
}

/// What the interaction controller needs from a form. Everything is read or
/// written at the moment the controller asks, never cached.
pub trait SummaryForm: Send + Sync {
    /// Endpoint URL as currently configured on the container.
    fn endpoint(&self) -> Option<String>;
    fn text(&self) -> String;
    fn length(&self) -> String;
    /// Toggle indicator visibility, submit enablement and the output's
    /// loading flag together.
    fn set_loading(&self, loading: bool);
    fn clear_output(&self);
    /// Replace all output with exactly one message.
    fn render_message(&self, message: OutputMessage);
}

/// [`FormState`] shared between the renderer and submit tasks.
#[derive(Debug, Clone)]
pub struct SharedForm(Arc<Mutex<FormState>>);

impl SharedForm {
    pub fn new(state: FormState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    pub fn lock(&self) -> MutexGuard<'_, FormState> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SummaryForm for SharedForm {
    fn endpoint(&self) -> Option<String> {
        self.lock().container.summarize_url.clone()
    }

    fn text(&self) -> String {
        self.lock().input.value.clone()
    }

    fn length(&self) -> String {
        self.lock().length.selected.as_str().to_string()
    }

    fn set_loading(&self, loading: bool) {
        let mut state = self.lock();
        if let Some(indicator) = state.loading_indicator.as_mut() {
            indicator.visible = loading;
        }
        state.submit.disabled = loading;
        state.output.loading = loading;
    }

    fn clear_output(&self) {
        self.lock().output.clear();
    }

    fn render_message(&self, message: OutputMessage) {
        self.lock().output.replace_with(message);
    }
}
