use serde::Deserialize;
use serde_json::Value;

/// One line of `stream-json` output from the agent CLI.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    System {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        session_id: Option<String>,
    },
    Assistant {
        message: AssistantMessage,
    },
    /// Partial assistant output, emitted while the model is still generating.
    StreamEvent {
        #[serde(default)]
        event: Value,
    },
    Result {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        errors: Option<Vec<String>>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl RuntimeEvent {
    /// Parse a single output line. Blank and non-JSON lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::debug!("Skipping unparseable agent output line: {}", e);
                None
            }
        }
    }

    /// Session id carried by the runtime's init signal.
    pub fn init_session_id(&self) -> Option<&str> {
        match self {
            RuntimeEvent::System {
                subtype,
                session_id: Some(id),
            } if subtype == "init" => Some(id.as_str()),
            _ => None,
        }
    }
}

impl AssistantMessage {
    pub fn text_blocks(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other => None,
        })
    }
}

/// Text fragments carried by a partial-message stream event.
pub fn partial_text_blocks(event: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    match event.get("type").and_then(Value::as_str) {
        Some("content_block_start") => {
            let block = &event["content_block"];
            if block["type"] == "text" {
                if let Some(text) = block["text"].as_str() {
                    out.push(text);
                }
            }
        }
        Some("content_block_delta") => {
            let delta = &event["delta"];
            if delta["type"] == "text_delta" {
                if let Some(text) = delta["text"].as_str() {
                    out.push(text);
                }
            }
        }
        _ => {}
    }
    out
}
