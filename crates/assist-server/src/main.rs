use axum::{Json, Router, routing::get};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use assist_api::ApiState;
use assist_core::AssistConfig;
use assist_store::create_store;
use assist_webhook::{WebhookDispatcher, WebhookState};

#[derive(Debug, Parser)]
#[command(name = "assist-server", about = "Assist platform server")]
struct Args {
    /// Path to assist.yaml. Defaults apply when absent.
    #[arg(long, env = "ASSIST_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AssistConfig::load_from_file(path)?,
        None => AssistConfig::from_env(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    if config.stripe.webhook_secret.is_empty() {
        tracing::warn!("STRIPE_WEBHOOK_SECRET is not set; webhook deliveries will be rejected");
    }

    // Store initialization failure is terminal for the process.
    let store = create_store(&config.store)?;

    let api_state = Arc::new(ApiState::new(store.clone(), &config));
    let webhook_state = Arc::new(WebhookState {
        dispatcher: WebhookDispatcher::new(store, config.stripe.clone()),
    });

    let project = config.project.clone().unwrap_or_else(|| "assist".to_string());
    let app = Router::new()
        .route("/healthz", get(healthz))
        .merge(assist_api::router(api_state))
        .merge(assist_webhook::router(webhook_state))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.bind_addr.clone();
    tracing::info!(project, "assist-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": "assist-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
