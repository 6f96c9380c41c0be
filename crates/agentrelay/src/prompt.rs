//! Prompt construction for runs that cannot resume an existing session.

use ar_backend::{ExecutionContext, HistoryMessage, Role};

pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

fn join_system_prompts(system_prompts: &[String]) -> String {
    system_prompts
        .iter()
        .map(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_message(message: &HistoryMessage) -> String {
    let prefix = match message.role {
        Role::User => "User",
        Role::Assistant => "Assistant",
        Role::System => "System",
    };
    format!("{}: {}", prefix, message.content)
}

/// First-conversation prompt: system prompts, then the request.
pub fn build_full_prompt(system_prompts: &[String], current_prompt: &str) -> String {
    let system = join_system_prompts(system_prompts);
    if system.is_empty() {
        return current_prompt.to_string();
    }
    format!("{system}{SECTION_SEPARATOR}User Request:\n{current_prompt}")
}

/// Replays history inline for when the agent session is gone.
pub fn build_fallback_prompt(
    system_prompts: &[String],
    messages: &[HistoryMessage],
    current_prompt: &str,
) -> String {
    let history = messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n");

    [
        join_system_prompts(system_prompts),
        history,
        format!("User: {current_prompt}"),
    ]
    .into_iter()
    .filter(|section| !section.is_empty())
    .collect::<Vec<_>>()
    .join(SECTION_SEPARATOR)
}

pub fn build_prompt(context: &ExecutionContext) -> String {
    if context.messages.is_empty() {
        build_full_prompt(&context.system_prompts, &context.current_prompt)
    } else {
        build_fallback_prompt(
            &context.system_prompts,
            &context.messages,
            &context.current_prompt,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn msg(role: Role, content: &str) -> HistoryMessage {
        HistoryMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn full_prompt_with_system_prompts() {
        assert_eq!(
            build_full_prompt(&strings(&["S1", "S2"]), "P"),
            "S1\n\nS2\n\n---\n\nUser Request:\nP"
        );
    }

    #[test]
    fn full_prompt_without_system_prompts_is_verbatim() {
        assert_eq!(build_full_prompt(&[], "P"), "P");
        assert_eq!(build_full_prompt(&strings(&["", ""]), "P"), "P");
    }

    #[test]
    fn fallback_prompt_with_history() {
        assert_eq!(
            build_fallback_prompt(&strings(&["S"]), &[msg(Role::User, "hi")], "P"),
            "S\n\n---\n\nUser: hi\n\n---\n\nUser: P"
        );
    }

    #[test]
    fn fallback_prompt_renders_roles_in_order() {
        let history = [
            msg(Role::User, "q1"),
            msg(Role::Assistant, "a1"),
            msg(Role::User, "q2"),
        ];
        assert_eq!(
            build_fallback_prompt(&[], &history, "P"),
            "User: q1\n\nAssistant: a1\n\nUser: q2\n\n---\n\nUser: P"
        );
    }

    #[test]
    fn fallback_prompt_filters_empty_system_prompts() {
        assert_eq!(
            build_fallback_prompt(&strings(&["", "S", ""]), &[msg(Role::User, "hi")], "P"),
            "S\n\n---\n\nUser: hi\n\n---\n\nUser: P"
        );
    }

    #[test]
    fn build_prompt_without_history_has_no_history_block() {
        let ctx = ExecutionContext {
            session_id: Some("s".to_string()),
            system_prompts: strings(&["S"]),
            current_prompt: "P".to_string(),
            messages: vec![],
        };
        let prompt = build_prompt(&ctx);
        assert!(!prompt.contains("User:"));
        assert!(!prompt.contains("Assistant:"));
        assert_eq!(prompt, "S\n\n---\n\nUser Request:\nP");
    }

    #[test]
    fn build_prompt_with_history_uses_fallback() {
        let ctx = ExecutionContext {
            session_id: None,
            system_prompts: vec![],
            current_prompt: "P".to_string(),
            messages: vec![msg(Role::Assistant, "earlier")],
        };
        assert_eq!(build_prompt(&ctx), "Assistant: earlier\n\n---\n\nUser: P");
    }
}
