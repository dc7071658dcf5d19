//! HTTP liveness server.
//!
//! Spawned as a background task next to the gateway. A bind failure is
//! logged and the bot keeps running without it.

use axum::{extract::State, response::Json, routing::get, Router};
use prompter_core::config::ApiConfig;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    inner: Arc<ApiInfo>,
}

struct ApiInfo {
    bot_name: String,
    model: String,
    prompt_source: String,
    uptime: Instant,
}

impl ApiState {
    pub fn new(
        bot_name: impl Into<String>,
        model: impl Into<String>,
        prompt_source: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiInfo {
                bot_name: bot_name.into(),
                model: model.into(),
                prompt_source: prompt_source.into(),
                uptime: Instant::now(),
            }),
        }
    }
}

async fn root(State(state): State<ApiState>) -> String {
    format!("{} is running!", state.inner.bot_name)
}

async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.inner.uptime.elapsed().as_secs(),
        "model": state.inner.model,
        "prompt_source": state.inner.prompt_source,
    }))
}

/// Build the axum router with shared state.
fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Start the API server. Runs until the task is aborted.
pub async fn serve(config: ApiConfig, state: ApiState) {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("API server failed to bind to {addr}: {e}");
            return;
        }
    };

    info!("API server listening on {addr}");

    if let Err(e) = axum::serve(listener, app).await {
        error!("API server error: {e}");
    }
}
