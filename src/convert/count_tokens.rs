//! Token counting heuristics.
//!
//! Out of scope per spec.md §1 ("token-count estimation heuristics" is named
//! as a thin external collaborator) — kept intentionally simple. The
//! context-window lookup here backs the SSE emitter's input-token formula
//! (§9 open question), which is in scope.

use crate::model::anthropic::AnthropicRequest;

/// Context window assumed for a given *upstream* model name, used to turn
/// `contextUsagePercentage` into an absolute token count (§4.5, §9).
///
/// The source hard-codes a single 200k window; we keep that default but look
/// it up per mapped model name so a future per-model window doesn't require
/// touching the emitter.
pub fn context_window_for(upstream_model: &str) -> u32 {
    match upstream_model {
        "upstream-opus" | "upstream-sonnet" | "upstream-haiku" => 200_000,
        _ => 200_000,
    }
}

pub fn input_tokens_from_percentage(upstream_model: &str, percentage: f64) -> u32 {
    let window = context_window_for(upstream_model) as f64;
    (percentage / 100.0 * window).round().max(0.0) as u32
}

/// Rough input-token estimate for `POST /v1/messages/count_tokens` (§4.8).
/// A thin character-count heuristic, not a tokenizer.
pub fn estimate_input_tokens(req: &AnthropicRequest) -> u32 {
    let mut chars = 0usize;

    if let Some(system) = &req.system {
        chars += system.as_text().len();
    }

    for message in &req.messages {
        for block in message.content.as_blocks() {
            if let crate::model::anthropic::ContentBlock::Text { text } = block {
                chars += text.len();
            }
        }
    }

    ((chars as f64) / 4.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifty_percent_of_default_window_is_100k() {
        assert_eq!(input_tokens_from_percentage("upstream-sonnet", 50.0), 100_000);
    }

    #[test]
    fn zero_percent_is_zero_tokens() {
        assert_eq!(input_tokens_from_percentage("upstream-sonnet", 0.0), 0);
    }
}
