mod config;
mod conversation_store;
mod db_types;
mod error;
mod handlers;
mod openai_types;
mod relevance;
mod relevance_types;
mod types;
mod utils;
mod vapi_types;

use crate::config::Config;
use crate::conversation_store::ConversationStore;
use crate::relevance::RelevanceClient;
use crate::types::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

pub fn app(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/server/messages/",
            post(handlers::vapi_server_messages).fallback(error::method_not_allowed),
        )
        .route(
            "/server/messages",
            post(handlers::vapi_server_messages).fallback(error::method_not_allowed),
        )
        .route(
            "/chat/completions",
            post(handlers::chat_completions).fallback(error::method_not_allowed),
        )
        .route("/health", get(handlers::health))
        .route("/", get(|| async { "VAPI relevance.ai bridge" }))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(true)
                .with_line_number(true),
        )
        .with(tracing_subscriber::filter::Targets::new().with_targets([
            ("hyper", tracing_subscriber::filter::LevelFilter::OFF),
            ("sqlx", tracing_subscriber::filter::LevelFilter::WARN),
            ("tower_http", tracing_subscriber::filter::LevelFilter::DEBUG),
            (
                "vapi_relevance_rs",
                tracing_subscriber::filter::LevelFilter::DEBUG,
            ),
        ]));
    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");

    let config = Config::from_env().expect("invalid configuration");
    let store = match &config.database_url {
        Some(database_url) => ConversationStore::connect(database_url)
            .await
            .expect("failed to open conversation store"),
        None => {
            warn!("DATABASE_URL not set; conversations are kept in memory");
            ConversationStore::memory()
        }
    };
    let relevance = RelevanceClient::from_config(&config).expect("failed to build http client");
    info!(
        base_url = %config.relevance_base_url(),
        project_id = %config.relevance_project_id,
        max_poll_attempts = config.max_poll_attempts,
        "relevance client ready"
    );

    let app_state = Arc::new(AppState { store, relevance });

    let addr = config.bind_addr();
    info!(%addr, "listening");
    axum::Server::bind(&addr)
        .serve(app(app_state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error=%e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutting down");
}
