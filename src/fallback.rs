use crate::io_struct::{normalize_completion, strip_prompt_echo};
use reqwest::StatusCode;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub enum UpstreamSurface {
    Chat,
    RawGeneration,
}

impl UpstreamSurface {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            UpstreamSurface::Chat => "https://router.huggingface.co/v1",
            UpstreamSurface::RawGeneration => "https://api-inference.huggingface.co/models",
        }
    }

    pub fn endpoint(&self, base_url: &str, model: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            UpstreamSurface::Chat => format!("{}/chat/completions", base),
            UpstreamSurface::RawGeneration => format!("{}/{}", base, model),
        }
    }

    pub fn build_body(&self, model: &str, prompt: &str, params: &SamplingParams) -> Value {
        match self {
            UpstreamSurface::Chat => json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
            }),
            UpstreamSurface::RawGeneration => json!({
                "inputs": prompt,
                "parameters": {
                    "max_new_tokens": params.max_new_tokens,
                    "temperature": params.temperature,
                    "top_p": params.top_p,
                    "do_sample": params.do_sample,
                },
            }),
        }
    }

    // The hosted generation endpoints repeat the input at the head of the
    // output; the chat surface does not.
    pub fn echoes_prompt(&self) -> bool {
        match self {
            UpstreamSurface::Chat => false,
            UpstreamSurface::RawGeneration => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SamplingParams {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        SamplingParams {
            max_new_tokens: 250,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
        }
    }
}

/// Why a single candidate attempt did not produce usable text. Every variant
/// is recovered locally by moving on to the next candidate.
#[derive(Debug)]
pub enum AttemptFailure {
    Transport(String),
    Unavailable(u16),
    RejectedStatus(u16),
    Malformed(String),
    EmptyOutput,
}

impl AttemptFailure {
    pub fn to_string(&self) -> String {
        match self {
            AttemptFailure::Transport(detail) => format!("transport error: {}", detail),
            AttemptFailure::Unavailable(status) => {
                format!("upstream unavailable (status {})", status)
            }
            AttemptFailure::RejectedStatus(status) => format!("upstream status {}", status),
            AttemptFailure::Malformed(detail) => format!("malformed response body: {}", detail),
            AttemptFailure::EmptyOutput => "empty generated text".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum PipelineResult {
    Success { text: String, model_used: String },
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct FallbackPipeline {
    pub surface: UpstreamSurface,
    pub base_url: String,
    pub models: Vec<String>,
    pub api_key: String,
    pub params: SamplingParams,
}

impl FallbackPipeline {
    pub fn new(
        surface: UpstreamSurface,
        base_url: String,
        models: Vec<String>,
        api_key: String,
        params: SamplingParams,
    ) -> Self {
        FallbackPipeline {
            surface,
            base_url,
            models,
            api_key,
            params,
        }
    }

    /// Try every configured model in order and return the first non-empty
    /// generation. The prompt must already be trimmed and non-empty; the
    /// handler rejects empty prompts before this point.
    pub async fn run(&self, client: &reqwest::Client, prompt: &str) -> PipelineResult {
        for model in &self.models {
            log::info!("Trying model {}", model);
            match self.try_model(client, model, prompt).await {
                Ok(text) => {
                    log::info!("Success: generated text from {}", model);
                    return PipelineResult::Success {
                        text,
                        model_used: model.clone(),
                    };
                }
                Err(failure) => {
                    log::warn!("Model {} failed: {}", model, failure.to_string());
                }
            }
        }
        log::error!("All {} candidate models failed", self.models.len());
        PipelineResult::Exhausted
    }

    async fn try_model(
        &self,
        client: &reqwest::Client,
        model: &str,
        prompt: &str,
    ) -> Result<String, AttemptFailure> {
        let url = self.surface.endpoint(&self.base_url, model);
        let body = self.surface.build_body(model, prompt, &self.params);
        let resp = client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            // Model loading or upstream overload; the next candidate may be warm.
            return Err(AttemptFailure::Unavailable(status.as_u16()));
        }
        if !status.is_success() {
            return Err(AttemptFailure::RejectedStatus(status.as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AttemptFailure::Transport(e.to_string()))?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| AttemptFailure::Malformed(e.to_string()))?;

        let text = match normalize_completion(&value) {
            Some(text) => text,
            // Last resort: hand back the whole body as a string.
            None => value.to_string(),
        };
        let text = if self.surface.echoes_prompt() {
            strip_prompt_echo(&text, prompt)
        } else {
            text
        };
        if text.trim().is_empty() {
            return Err(AttemptFailure::EmptyOutput);
        }
        Ok(text)
    }
}
