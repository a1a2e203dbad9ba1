use axum::{
    Router,
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted behavior for one candidate model.
#[derive(Clone)]
pub enum MockBehavior {
    /// 200 with a chat-completion envelope around the given text
    ChatCompletion(String),
    /// 200 with `{"generated_text": ...}`
    GeneratedDict(String),
    /// 200 with `[{"generated_text": ...}]`
    GeneratedArray(String),
    /// 200 with an arbitrary JSON body
    ArbitraryJson(Value),
    /// 200 with a non-JSON body
    PlainText(String),
    /// 503, mimicking the model-loading response
    Unavailable,
    /// An arbitrary failure status
    Failure(u16),
    /// Sleep before answering, to trip client timeouts
    Hang(u64),
}

struct MockState {
    behaviors: HashMap<String, MockBehavior>,
    calls: Mutex<Vec<String>>,
}

/// Mock inference upstream serving both the chat surface
/// (`POST /chat/completions`) and the raw-generation surface
/// (`POST /{model}`), with per-model scripted behaviors and a record of
/// which models were called, in order.
pub struct MockUpstream {
    state: Arc<MockState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl MockUpstream {
    pub fn new(behaviors: HashMap<String, MockBehavior>) -> Self {
        Self {
            state: Arc::new(MockState {
                behaviors,
                calls: Mutex::new(Vec::new()),
            }),
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind an ephemeral port and start serving. Returns the base URL.
    pub async fn start(&mut self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock upstream");
        let addr = listener.local_addr().unwrap();

        let app = Router::new()
            .route("/chat/completions", post(chat_completions_handler))
            .route("/{model}", post(raw_generation_handler))
            .with_state(self.state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });
        self.shutdown_tx = Some(shutdown_tx);
        self.handle = Some(handle);

        format!("http://{}", addr)
    }

    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// Models called so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }
}

async fn chat_completions_handler(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    let model = body["model"].as_str().unwrap_or_default().to_string();
    respond(state, model).await
}

async fn raw_generation_handler(
    State(state): State<Arc<MockState>>,
    Path(model): Path<String>,
    Json(_body): Json<Value>,
) -> Response {
    respond(state, model).await
}

async fn respond(state: Arc<MockState>, model: String) -> Response {
    state.calls.lock().unwrap().push(model.clone());
    match state.behaviors.get(&model) {
        Some(MockBehavior::ChatCompletion(text)) => Json(json!({
            "choices": [{"message": {"role": "assistant", "content": text}}],
        }))
        .into_response(),
        Some(MockBehavior::GeneratedDict(text)) => {
            Json(json!({"generated_text": text})).into_response()
        }
        Some(MockBehavior::GeneratedArray(text)) => {
            Json(json!([{"generated_text": text}])).into_response()
        }
        Some(MockBehavior::ArbitraryJson(value)) => Json(value.clone()).into_response(),
        Some(MockBehavior::PlainText(text)) => text.clone().into_response(),
        Some(MockBehavior::Unavailable) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": format!("Model {} is currently loading", model),
                "estimated_time": 20.0,
            })),
        )
            .into_response(),
        Some(MockBehavior::Failure(code)) => (
            StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({"error": "upstream failure"})),
        )
            .into_response(),
        Some(MockBehavior::Hang(ms)) => {
            tokio::time::sleep(Duration::from_millis(*ms)).await;
            Json(json!({"generated_text": "late"})).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": format!("Unknown model {}", model)})),
        )
            .into_response(),
    }
}
