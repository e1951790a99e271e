pub mod client;
pub mod config;
pub mod controller;
pub mod form;
pub mod length;

// Re-export main types for convenience
pub use client::{HttpSummaryClient, ServerReply, SummarizeError, SummaryBackend, SummaryRequest};
pub use config::Config;
pub use controller::{InteractionController, Key, KeyDown, SubmitOutcome};
pub use form::{FormParts, FormState, OutputMessage, SharedForm, SummaryForm};
pub use length::SummaryLength;
