use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

/// Everything the backend knows about the activity being executed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub system_prompts: Vec<String>,
    #[serde(default)]
    pub current_prompt: String,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
}

impl ExecutionContext {
    /// Session to resume, ignoring blank ids.
    pub fn resumable_session(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallbackKind {
    Progress,
    Completed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallbackEvent {
    #[serde(rename = "type")]
    pub kind: CallbackKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl CallbackEvent {
    fn new(kind: CallbackKind) -> Self {
        Self {
            kind,
            role: None,
            content: None,
            metadata: None,
            subtype: None,
        }
    }

    pub fn progress() -> Self {
        Self::new(CallbackKind::Progress)
    }

    pub fn completed(content: impl Into<String>) -> Self {
        Self::new(CallbackKind::Completed).with_content(content)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CallbackKind::Error).with_content(message)
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::progress().with_role(Role::Assistant).with_content(text)
    }

    pub fn session_init(session_id: &str) -> Self {
        let mut metadata = Map::new();
        metadata.insert("sessionId".to_string(), Value::String(session_id.to_string()));
        Self::progress()
            .with_subtype("session_init")
            .with_metadata(metadata)
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }
}
