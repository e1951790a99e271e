//! Interaction controller: one submission lifecycle per trigger.
//!
//! `Idle -> Validating -> (Rejected | Submitting -> Succeeded | Failed | Errored) -> Idle`
//!
//! The controller holds an explicit in-flight flag so a second trigger that
//! slips past the disabled submit control is turned away, and tags every
//! request with a sequence number so only the latest one is ever rendered.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{ServerReply, SummarizeError, SummaryBackend, SummaryRequest};
use crate::form::{FormParts, FormState, OutputMessage, SharedForm, SummaryForm};

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text to summarize.";
pub const TRANSPORT_ERROR_MESSAGE: &str = "An unexpected network error occurred. Please try again.";

/// Which branch a submission ended on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input; nothing was sent.
    Rejected,
    /// Server returned a summary.
    Succeeded,
    /// Server returned an error payload.
    Failed,
    /// Transport or decode failure.
    Errored,
    /// Another submission was already in flight; nothing was sent.
    Busy,
    /// A newer request was issued before this one resolved; not rendered.
    Superseded,
}

/// Key identity as far as the shortcut cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

/// A key press delivered to the text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyDown {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyDown {
    pub fn is_submit_chord(&self) -> bool {
        self.ctrl && self.key == Key::Enter
    }
}

/// Monotonic request numbering.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    /// Issue the next ticket; it becomes the latest.
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::Acquire) == ticket
    }
}

/// Restores the idle state when a submission leaves `Submitting`, whichever
/// way it leaves.
struct SubmittingGuard<'a, F: SummaryForm> {
    form: &'a F,
    in_flight: &'a AtomicBool,
}

impl<'a, F: SummaryForm> SubmittingGuard<'a, F> {
    fn enter(form: &'a F, in_flight: &'a AtomicBool) -> Self {
        form.set_loading(true);
        form.clear_output();
        Self { form, in_flight }
    }
}

impl<F: SummaryForm> Drop for SubmittingGuard<'_, F> {
    fn drop(&mut self) {
        self.form.set_loading(false);
        self.in_flight.store(false, Ordering::Release);
    }
}

pub struct InteractionController<F, B> {
    form: F,
    backend: Arc<B>,
    in_flight: AtomicBool,
    sequence: RequestSequence,
}

impl<B: SummaryBackend> InteractionController<SharedForm, B> {
    /// Bind to the given parts. Returns `None`, binding nothing, when any of
    /// the required parts is missing.
    pub fn bind(parts: FormParts, backend: Arc<B>) -> Option<Self> {
        let state = FormState::from_parts(parts)?;
        Some(Self::new(SharedForm::new(state), backend))
    }
}

impl<F: SummaryForm, B: SummaryBackend> InteractionController<F, B> {
    pub fn new(form: F, backend: Arc<B>) -> Self {
        Self {
            form,
            backend,
            in_flight: AtomicBool::new(false),
            sequence: RequestSequence::default(),
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one submission against the current form contents.
    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("submit ignored, a request is already in flight");
            return SubmitOutcome::Busy;
        }

        let text = self.form.text().trim().to_string();
        let length = self.form.length();

        if text.is_empty() {
            self.form.render_message(OutputMessage::error(EMPTY_INPUT_MESSAGE));
            self.in_flight.store(false, Ordering::Release);
            return SubmitOutcome::Rejected;
        }

        let ticket = self.sequence.issue();
        let _submitting = SubmittingGuard::enter(&self.form, &self.in_flight);

        let request = SummaryRequest { text, length };
        let result = match self.form.endpoint() {
            Some(url) => {
                info!(
                    %url,
                    length = %request.length,
                    chars = request.text.chars().count(),
                    ticket,
                    "sending summarize request"
                );
                self.backend.summarize(&url, &request).await
            }
            None => Err(SummarizeError::MissingEndpoint),
        };

        let (outcome, message) = match result {
            Ok(ServerReply::Summary(summary)) => {
                info!(ticket, chars = summary.chars().count(), "summary received");
                (SubmitOutcome::Succeeded, OutputMessage::summary(&summary))
            }
            Ok(ServerReply::Error(error)) => {
                info!(ticket, %error, "server reported an error");
                (
                    SubmitOutcome::Failed,
                    OutputMessage::error(&format!("Error: {}", error)),
                )
            }
            Err(error) => {
                warn!(ticket, %error, "summarize request failed");
                (
                    SubmitOutcome::Errored,
                    OutputMessage::error(TRANSPORT_ERROR_MESSAGE),
                )
            }
        };

        // With the in-flight flag held no newer ticket can be issued before
        // this point, so this only fires if a ticket is issued out of band.
        if !self.sequence.is_current(ticket) {
            debug!(ticket, "dropping stale response");
            return SubmitOutcome::Superseded;
        }

        self.form.render_message(message);
        outcome
    }

    /// Key press in the text input. The submit chord goes through
    /// [`submit`](Self::submit); anything else is ignored.
    pub async fn key_down(&self, event: KeyDown) -> Option<SubmitOutcome> {
        if event.is_submit_chord() {
            Some(self.submit().await)
        } else {
            None
        }
    }
}
