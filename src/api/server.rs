//! HTTP façade over the operations registry
//!
//! JSON in, JSON out, for low-code automation tools that cannot speak MCP.
//! `POST /mcp` carries MCP JSON-RPC messages over HTTP, minus the tools
//! that read files on the server.

use super::error::ApiError;
use crate::config::ServerConfig;
use crate::error::{Result, ScribeError};
use crate::mcp::{JsonRpcError, JsonRpcResponse, McpServer, ToolHandler};
use crate::operations::Operations;
use crate::types::{PostFilter, TermQuery};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

type ApiResult = std::result::Result<Json<Value>, ApiError>;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    operations: Arc<Operations>,
    mcp: McpServer,
    wordpress_url: String,
}

impl AppState {
    pub fn new(operations: Arc<Operations>, wordpress_url: impl Into<String>) -> Self {
        let mcp = McpServer::new(ToolHandler::without_local_files(operations.clone()));
        Self {
            operations,
            mcp,
            wordpress_url: wordpress_url.into(),
        }
    }
}

/// Build the router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        // WordPress
        .route("/posts", get(list_posts_handler))
        .route("/posts/create", post(create_post_handler))
        .route("/categories", get(list_categories_handler))
        .route("/tags", get(list_tags_handler))
        // AI
        .route("/ai/generate-post", post(generate_post_handler))
        .route("/ai/generate-content", post(generate_content_handler))
        .route("/ai/improve-post", post(improve_post_handler))
        // MCP over HTTP
        .route("/mcp", post(mcp_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl-C, shutting down");
    }
}

async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "scribe",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "ai_available": state.operations.ai_available(),
        "wordpress_url": state.wordpress_url,
    }))
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "wordpress": true,
        "ai": state.operations.ai_available(),
    }))
}

async fn list_posts_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<PostFilter>, QueryRejection>,
) -> ApiResult {
    let Query(filter) = query?;
    let args = serde_json::to_value(filter).map_err(ScribeError::from)?;
    Ok(Json(state.operations.list_posts(args).await?))
}

async fn list_categories_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<TermQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let args = serde_json::to_value(query).map_err(ScribeError::from)?;
    Ok(Json(state.operations.list_categories(args).await?))
}

async fn list_tags_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<TermQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query?;
    let args = serde_json::to_value(query).map_err(ScribeError::from)?;
    Ok(Json(state.operations.list_tags(args).await?))
}

async fn create_post_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(args) = body?;
    Ok(Json(state.operations.create_post(args).await?))
}

async fn generate_post_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(args) = body?;
    Ok(Json(state.operations.generate_post_with_ai(args).await?))
}

async fn generate_content_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(args) = body?;
    Ok(Json(state.operations.generate_content_from_prompt(args).await?))
}

async fn improve_post_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let Json(args) = body?;
    Ok(Json(state.operations.improve_post_with_ai(args).await?))
}

/// One JSON-RPC message per request; notifications get 202 with no body
async fn mcp_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Response {
    let message = match body {
        Ok(Json(message)) => message,
        Err(rejection) => {
            return Json(JsonRpcResponse::error(
                None,
                JsonRpcError::parse_error(rejection.body_text()),
            ))
            .into_response();
        }
    };

    match state.mcp.handle_value(message).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
