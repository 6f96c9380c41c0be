pub mod claude;
pub mod events;
pub mod runners;
pub mod runtime;

pub use claude::ClaudeCodeRunner;
pub use events::{AssistantMessage, ContentBlock, RuntimeEvent};
pub use runtime::{AgentRuntime, EventStream, PermissionMode, QueryOptions, RuntimeError};
