pub mod client;
pub mod registrar;
pub mod types;

pub use client::BackendClient;
pub use registrar::SessionRegistrar;
pub use types::{CallbackEvent, CallbackKind, ExecutionContext, HistoryMessage, Role};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),
    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}
