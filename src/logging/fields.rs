//! Field extraction helpers for structured logging

use crate::agent::InferenceResponse;
use crate::routing::AttemptRecord;

/// Token counts as (prompt, completion, total), zeros without usage.
pub fn extract_tokens(response: &InferenceResponse) -> (u32, u32, u32) {
    match &response.usage {
        Some(usage) => (
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens,
        ),
        None => (0, 0, 0),
    }
}

/// Providers tried for one request, in order: `a -> b -> c`.
pub fn route_chain(attempts: &[AttemptRecord]) -> String {
    attempts
        .iter()
        .map(|a| a.provider_id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::Usage;
    use crate::agent::{ChatMessage, InferenceResponse};
    use crate::routing::AttemptOutcome;

    fn response(usage: Option<Usage>) -> InferenceResponse {
        InferenceResponse {
            id: "chatcmpl-1".to_string(),
            object: "chat.completion".to_string(),
            created: 0,
            model: "llama3".to_string(),
            choices: vec![crate::agent::types::Choice {
                index: 0,
                message: ChatMessage::assistant("hi"),
                finish_reason: None,
            }],
            usage,
        }
    }

    #[test]
    fn test_extract_tokens() {
        let usage = Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        };
        assert_eq!(extract_tokens(&response(Some(usage))), (10, 5, 15));
        assert_eq!(extract_tokens(&response(None)), (0, 0, 0));
    }

    #[test]
    fn test_route_chain() {
        let attempt = |id: &str, outcome| AttemptRecord {
            provider_id: id.to_string(),
            endpoint: format!("http://{}:3001", id),
            latency_ms: 1,
            outcome,
            last_resort: false,
        };
        let attempts = vec![
            attempt("a", AttemptOutcome::Failed("refused".to_string())),
            attempt("b", AttemptOutcome::Success),
        ];
        assert_eq!(route_chain(&attempts), "a -> b");
        assert_eq!(route_chain(&[]), "");
    }
}
