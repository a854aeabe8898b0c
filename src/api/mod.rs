//! Streamable HTTP transport for the MCP server.

use axum::{routing::get, Json, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::mcp::{shutdown_signal, McpServer};

/// `/mcp` serves the protocol, `/health` answers liveness probes.
///
/// Every HTTP session gets a clone of `server`, so all sessions share one
/// corpus and one session state.
pub fn create_router(server: McpServer) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", mcp)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve on `127.0.0.1:port` until Ctrl-C or SIGTERM, then flush state.
pub async fn run_http_server(server: McpServer, port: u16) -> anyhow::Result<()> {
    let state = server.state().clone();
    let app = create_router(server);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("SkillForge MCP listening on http://127.0.0.1:{}/mcp", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.flush()?;
    Ok(())
}
