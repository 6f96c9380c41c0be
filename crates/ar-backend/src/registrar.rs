use crate::client::BackendClient;
use crate::types::CallbackEvent;

/// Persists the agent's session id to the backend so a later invocation can
/// resume it. Write-only: read-back happens through `fetch_context`.
#[derive(Debug)]
pub struct SessionRegistrar {
    client: BackendClient,
    saved: Option<String>,
}

impl SessionRegistrar {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client,
            saved: None,
        }
    }

    pub async fn save_session(&mut self, session_id: &str) {
        if self.saved.as_deref() == Some(session_id) {
            tracing::debug!(session_id, "Session already registered");
            return;
        }
        tracing::info!(session_id, "Registering agent session");
        self.client
            .report(&CallbackEvent::session_init(session_id))
            .await;
        self.saved = Some(session_id.to_string());
    }

    pub fn saved_session(&self) -> Option<&str> {
        self.saved.as_deref()
    }
}
