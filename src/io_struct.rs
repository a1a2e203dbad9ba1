use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateReqInput {
    #[serde(default)]
    pub prompt: String,
}

impl GenerateReqInput {
    pub fn trimmed_prompt(&self) -> &str {
        self.prompt.trim()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GenerateResponse {
    pub generated_text: String,
    pub model_used: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
        }
    }
}

/// Pull the generated text out of an upstream success body. The upstream
/// surfaces disagree on envelope shape, so probe in a fixed order:
/// a raw-generation array, a raw-generation dict, then a chat envelope.
/// Returns None when none of the known shapes match.
pub fn normalize_completion(body: &Value) -> Option<String> {
    if let Some(first) = body.as_array().and_then(|items| items.first()) {
        if let Some(text) = first.get("generated_text").and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    if let Some(text) = body.get("generated_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }
    if let Some(text) = body
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
    {
        return Some(text.to_string());
    }
    None
}

/// Some generation endpoints echo the input at the head of the output.
/// Strip one leading occurrence of the prompt, then trim whitespace.
pub fn strip_prompt_echo(text: &str, prompt: &str) -> String {
    match text.strip_prefix(prompt) {
        Some(rest) => rest.trim().to_string(),
        None => text.to_string(),
    }
}
