use clap::Parser;
use textgen_gateway::gateway_state::{GatewayConfig, GatewayState};
use textgen_gateway::server::startup;

#[derive(Parser, Debug)]
#[command(name = "textgen-gateway")]
#[command(about = "HTTP gateway that forwards prompts to a text-generation API with model fallback")]
struct CliArgs {
    /// Host address to bind the gateway server
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the gateway server (falls back to the PORT environment
    /// variable, then 5000)
    #[arg(long)]
    port: Option<u16>,

    /// Upstream surface: "chat" or "generation"
    #[arg(long, default_value = "chat")]
    surface: String,

    /// Upstream base URL (defaults to the standard endpoint for the surface)
    #[arg(long)]
    base_url: Option<String>,

    /// Candidate models, attempted in order until one succeeds
    #[arg(long = "model", default_values_t = vec![String::from("openai/gpt-oss-20b:groq")])]
    models: Vec<String>,

    /// Per-attempt upstream timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Maximum tokens to generate (generation surface only)
    #[arg(long, default_value_t = 250)]
    max_new_tokens: u32,

    /// Sampling temperature (generation surface only)
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Nucleus sampling threshold (generation surface only)
    #[arg(long, default_value_t = 0.9)]
    top_p: f32,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let api_key = std::env::var("HUGGINGFACE_API_KEY").unwrap_or_default();
    let port = args
        .port
        .or_else(|| std::env::var("PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(5000);

    let config = GatewayConfig {
        host: args.host,
        port,
        surface: args.surface,
        base_url: args.base_url,
        models: args.models,
        api_key,
        timeout: args.timeout,
        max_new_tokens: args.max_new_tokens,
        temperature: args.temperature,
        top_p: args.top_p,
    };
    let state = GatewayState::new(config.clone())?;

    actix_web::rt::System::new().block_on(async move {
        startup(config, state).await?;
        Ok(())
    })
}
