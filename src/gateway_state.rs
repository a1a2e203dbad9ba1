use crate::fallback::{FallbackPipeline, PipelineResult, SamplingParams, UpstreamSurface};
use crate::io_struct::{ErrorResponse, GenerateResponse};
use actix_web::HttpResponse;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub surface: String,
    pub base_url: Option<String>,
    pub models: Vec<String>,
    pub api_key: String,
    pub timeout: u64,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone)]
pub struct GatewayState {
    pub pipeline: FallbackPipeline,
    pub client: reqwest::Client,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("Upstream API key is not set");
        }
        if config.models.is_empty() {
            anyhow::bail!("At least one candidate model is required");
        }
        let surface = match config.surface.as_str() {
            "chat" => UpstreamSurface::Chat,
            "generation" => UpstreamSurface::RawGeneration,
            _ => anyhow::bail!("Invalid surface"),
        };
        let base_url = config
            .base_url
            .unwrap_or_else(|| surface.default_base_url().to_string());
        let params = SamplingParams {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            ..SamplingParams::default()
        };
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        let pipeline =
            FallbackPipeline::new(surface, base_url, config.models, config.api_key, params);
        Ok(Self { pipeline, client })
    }

    pub async fn generate(&self, prompt: &str) -> HttpResponse {
        match self.pipeline.run(&self.client, prompt).await {
            PipelineResult::Success { text, model_used } => {
                HttpResponse::Ok().json(GenerateResponse {
                    generated_text: text,
                    model_used,
                })
            }
            PipelineResult::Exhausted => HttpResponse::ServiceUnavailable().json(
                ErrorResponse::new("All models are currently unavailable, please try again later"),
            ),
        }
    }
}
