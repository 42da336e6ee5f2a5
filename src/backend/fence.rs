//! Model output often arrives wrapped in a markdown code fence. Everything that
//! parses JSON produced by a model goes through here.

use serde::de::DeserializeOwned;

use crate::backend::error::BackendError;

/// Strips one surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn unwrap_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_fenced_json<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T, BackendError> {
    let inner = unwrap_code_fence(text);
    serde_json::from_str(inner).map_err(|err| BackendError::malformed(endpoint, format!("invalid JSON: {err}")))
}
