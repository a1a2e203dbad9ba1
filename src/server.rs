use crate::gateway_state::{GatewayConfig, GatewayState};
use crate::io_struct::{ErrorResponse, GenerateReqInput};
use actix_web::{HttpRequest, HttpResponse, HttpServer, get, post, web};
use serde_json::json;
use std::io::Write;

#[get("/health")]
pub async fn health(_req: HttpRequest, _: web::Data<GatewayState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "healthy"}))
}

#[post("/generate")]
pub async fn generate(
    _req: HttpRequest,
    req: web::Json<GenerateReqInput>,
    app_state: web::Data<GatewayState>,
) -> HttpResponse {
    let prompt = req.trimmed_prompt();
    if prompt.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("No prompt provided"));
    }
    log::info!("Received prompt ({} chars)", prompt.len());
    app_state.generate(prompt).await
}

/// Masked preview of the configured credential. Never exposes or logs the
/// full key.
#[get("/debug-token")]
pub async fn debug_token(_req: HttpRequest, app_state: web::Data<GatewayState>) -> HttpResponse {
    let key = &app_state.pipeline.api_key;
    HttpResponse::Ok().json(json!({
        "token_found": true,
        "token_preview": mask_api_key(key),
        "token_length": key.len(),
        "starts_with_hf": key.starts_with("hf_"),
    }))
}

pub fn mask_api_key(key: &str) -> String {
    match (key.get(..7), key.get(key.len().saturating_sub(4)..)) {
        (Some(prefix), Some(suffix)) if key.len() > 11 => format!("{}...{}", prefix, suffix),
        _ => "TOO_SHORT".to_string(),
    }
}

pub async fn startup(config: GatewayConfig, state: GatewayState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);

    println!("Starting server at {}:{}", config.host, config.port);

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(app_state.clone())
            .service(health)
            .service(generate)
            .service(debug_token)
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
