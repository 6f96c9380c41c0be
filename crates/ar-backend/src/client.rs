use ar_config::RelayConfig;
use reqwest::Url;
use serde_json::{Map, Value};

use crate::types::{CallbackEvent, ExecutionContext};
use crate::BackendError;

/// HTTP gateway to the activity backend, scoped to one activity.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    activity_id: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, activity_id: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            activity_id: activity_id.into(),
        }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.backend_url.clone(), config.activity_id.clone())
    }

    pub fn activity_id(&self) -> &str {
        &self.activity_id
    }

    pub fn context_url(&self) -> Result<Url, BackendError> {
        self.endpoint(&["activities", &self.activity_id, "agent-context"])
    }

    pub fn callback_url(&self) -> Result<Url, BackendError> {
        self.endpoint(&["agent", "callback", &self.activity_id])
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let invalid = || BackendError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn fetch_context(&self) -> Result<ExecutionContext, BackendError> {
        let resp = self.http.get(self.context_url()?).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let context: ExecutionContext = resp.json().await?;
        tracing::info!(
            activity_id = %self.activity_id,
            has_session = context.resumable_session().is_some(),
            system_prompts = context.system_prompts.len(),
            messages = context.messages.len(),
            "Fetched agent context"
        );
        Ok(context)
    }

    /// Post a callback event. Best-effort: failures are logged, never returned.
    pub async fn report(&self, event: &CallbackEvent) {
        if let Err(e) = self.try_report(event).await {
            tracing::warn!(
                activity_id = %self.activity_id,
                kind = ?event.kind,
                "Failed to send callback: {}",
                e
            );
        }
    }

    async fn try_report(&self, event: &CallbackEvent) -> Result<(), BackendError> {
        let resp = self
            .http
            .post(self.callback_url()?)
            .json(event)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }
        Ok(())
    }

    pub async fn report_completed(&self, result: &str) {
        self.report(&CallbackEvent::completed(result)).await;
    }

    pub async fn report_error(&self, message: &str, metadata: Option<Map<String, Value>>) {
        let mut event = CallbackEvent::error(message);
        event.metadata = metadata;
        self.report(&event).await;
    }
}
