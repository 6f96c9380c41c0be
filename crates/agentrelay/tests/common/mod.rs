#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ar_agent::{
    AgentRuntime, AssistantMessage, ContentBlock, EventStream, QueryOptions, RuntimeError,
    RuntimeEvent,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use serde_json::Value;

// -- Fake backend ------------------------------------------------------------

#[derive(Clone)]
pub struct FakeBackend {
    context_status: StatusCode,
    context_body: Value,
    context_hits: Arc<AtomicUsize>,
    callbacks: Arc<Mutex<Vec<Value>>>,
}

impl FakeBackend {
    pub fn new(context_status: StatusCode, context_body: Value) -> Self {
        Self {
            context_status,
            context_body,
            context_hits: Arc::new(AtomicUsize::new(0)),
            callbacks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn ok(context_body: Value) -> Self {
        Self::new(StatusCode::OK, context_body)
    }

    pub fn callbacks(&self) -> Vec<Value> {
        self.callbacks.lock().unwrap().clone()
    }

    pub fn callback_types(&self) -> Vec<String> {
        self.callbacks()
            .iter()
            .map(|c| c["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn terminal_callbacks(&self) -> Vec<Value> {
        self.callbacks()
            .into_iter()
            .filter(|c| c["type"] == "completed" || c["type"] == "error")
            .collect()
    }

    pub fn context_hits(&self) -> usize {
        self.context_hits.load(Ordering::SeqCst)
    }

    pub fn request_count(&self) -> usize {
        self.context_hits() + self.callbacks.lock().unwrap().len()
    }

    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/activities/{id}/agent-context", get(context))
            .route("/agent/callback/{id}", post(callback))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn context(State(backend): State<FakeBackend>) -> (StatusCode, Json<Value>) {
    backend.context_hits.fetch_add(1, Ordering::SeqCst);
    (backend.context_status, Json(backend.context_body.clone()))
}

async fn callback(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> StatusCode {
    backend.callbacks.lock().unwrap().push(body);
    StatusCode::OK
}

// -- Scripted runtime --------------------------------------------------------

pub type Script = Vec<Result<RuntimeEvent, RuntimeError>>;

/// Replays one script per query and records every query it receives.
#[derive(Clone, Default)]
pub struct ScriptedRuntime {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    calls: Arc<Mutex<Vec<(String, QueryOptions)>>>,
}

impl ScriptedRuntime {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<(String, QueryOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl AgentRuntime for ScriptedRuntime {
    fn query(&self, prompt: String, options: QueryOptions) -> EventStream {
        self.calls.lock().unwrap().push((prompt, options));
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or_default();
        futures::stream::iter(script).boxed()
    }
}

// -- Event builders ----------------------------------------------------------

pub fn init(session_id: &str) -> RuntimeEvent {
    RuntimeEvent::System {
        subtype: "init".to_string(),
        session_id: Some(session_id.to_string()),
    }
}

pub fn assistant(text: &str) -> RuntimeEvent {
    RuntimeEvent::Assistant {
        message: AssistantMessage {
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        },
    }
}

pub fn success(result: Option<&str>) -> RuntimeEvent {
    RuntimeEvent::Result {
        subtype: "success".to_string(),
        result: result.map(String::from),
        errors: None,
    }
}

pub fn failure(subtype: &str, errors: &[&str]) -> RuntimeEvent {
    RuntimeEvent::Result {
        subtype: subtype.to_string(),
        result: None,
        errors: Some(errors.iter().map(|e| e.to_string()).collect()),
    }
}

pub fn expired_session() -> RuntimeError {
    RuntimeError::Exited {
        code: Some(1),
        stderr: "No conversation found with session ID".to_string(),
    }
}
