use ar_agent::events::partial_text_blocks;
use ar_agent::RuntimeEvent;
use ar_backend::{BackendClient, CallbackEvent, CallbackKind, SessionRegistrar};
use serde_json::{Map, Value};

pub const PARTIAL_SUBTYPE: &str = "partial";
pub const DEFAULT_COMPLETION: &str = "Task completed";
pub const DEFAULT_ERROR: &str = "Unknown error";

/// What a single runtime event means for the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    Ignore,
    SessionInit(String),
    Progress(CallbackEvent),
    Completed(String),
    Failed(String),
}

pub fn translate(event: &RuntimeEvent) -> Translation {
    match event {
        RuntimeEvent::System { .. } => match event.init_session_id() {
            Some(id) => Translation::SessionInit(id.to_string()),
            None => Translation::Ignore,
        },
        RuntimeEvent::Assistant { message } => {
            let text = message.text_blocks().collect::<Vec<_>>().join("\n");
            if text.is_empty() {
                Translation::Ignore
            } else {
                Translation::Progress(CallbackEvent::assistant_text(text))
            }
        }
        RuntimeEvent::StreamEvent { event } => {
            let text = partial_text_blocks(event).concat();
            if text.is_empty() {
                Translation::Ignore
            } else {
                Translation::Progress(
                    CallbackEvent::assistant_text(text).with_subtype(PARTIAL_SUBTYPE),
                )
            }
        }
        RuntimeEvent::Result {
            subtype,
            result,
            errors,
        } => {
            if subtype == "success" {
                let text = result
                    .as_deref()
                    .filter(|r| !r.is_empty())
                    .unwrap_or(DEFAULT_COMPLETION);
                Translation::Completed(text.to_string())
            } else {
                let message = errors
                    .as_ref()
                    .filter(|e| !e.is_empty())
                    .map(|e| e.join(", "))
                    .unwrap_or_else(|| DEFAULT_ERROR.to_string());
                Translation::Failed(message)
            }
        }
        RuntimeEvent::Unknown => Translation::Ignore,
    }
}

/// A terminal event withheld while an attempt may still be discarded.
#[derive(Debug, Clone, PartialEq)]
enum Held {
    Completed(String),
    Failed(String),
}

/// Applies translations in order, keeping track of the terminal report.
#[derive(Debug)]
pub struct Relay {
    client: BackendClient,
    registrar: SessionRegistrar,
    terminal: Option<CallbackKind>,
    holding: bool,
    held: Option<Held>,
}

impl Relay {
    pub fn new(client: BackendClient) -> Self {
        Self {
            registrar: SessionRegistrar::new(client.clone()),
            client,
            terminal: None,
            holding: false,
            held: None,
        }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    pub fn terminal_reported(&self) -> bool {
        self.terminal.is_some()
    }

    /// Withhold terminal results until [`Relay::release_held`] or
    /// [`Relay::discard_held`]. Progress and session events still go out.
    pub fn hold_terminal(&mut self) {
        self.holding = true;
    }

    /// Send the withheld terminal result, if any, and stop holding.
    pub async fn release_held(&mut self) {
        self.holding = false;
        match self.held.take() {
            Some(Held::Completed(text)) => self.complete(&text).await,
            Some(Held::Failed(message)) => self.fail(&message, None).await,
            None => {}
        }
    }

    /// Drop the withheld terminal result and stop holding. Returns whether
    /// one was dropped.
    pub fn discard_held(&mut self) -> bool {
        self.holding = false;
        self.held.take().is_some()
    }

    pub async fn forward(&mut self, event: &RuntimeEvent) {
        match translate(event) {
            Translation::Ignore => {}
            Translation::SessionInit(session_id) => {
                self.registrar.save_session(&session_id).await;
            }
            Translation::Progress(callback) => self.client.report(&callback).await,
            Translation::Completed(text) if self.holding => self.hold(Held::Completed(text)),
            Translation::Failed(message) if self.holding => self.hold(Held::Failed(message)),
            Translation::Completed(text) => self.complete(&text).await,
            Translation::Failed(message) => self.fail(&message, None).await,
        }
    }

    fn hold(&mut self, held: Held) {
        if self.terminal.is_some() || self.held.is_some() {
            tracing::warn!(?held, "Terminal event already pending; dropping");
            return;
        }
        self.held = Some(held);
    }

    pub async fn complete(&mut self, text: &str) {
        if self.claim_terminal(CallbackKind::Completed) {
            self.client.report_completed(text).await;
        }
    }

    pub async fn fail(&mut self, message: &str, metadata: Option<Map<String, Value>>) {
        if self.claim_terminal(CallbackKind::Error) {
            self.client.report_error(message, metadata).await;
        }
    }

    fn claim_terminal(&mut self, kind: CallbackKind) -> bool {
        if let Some(previous) = self.terminal {
            tracing::warn!(?previous, ?kind, "Terminal event already reported; dropping");
            return false;
        }
        self.terminal = Some(kind);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
