// Run and routing helpers (build_router, run_server).

use std::net::SocketAddr;

use axum::{response::IntoResponse, routing::get, Json, Router};
use tower_http::services::ServeDir;

use crate::server::RelayState;
use anyhow::{Context, Result};

pub fn build_router(state: RelayState) -> Router {
    // Browser build, as produced by wasm-pack. Assumes CWD is the repo root.
    let serve_dir = ServeDir::new("pkg").append_index_html_on_directories(true);

    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({ "ok": true })) }),
        )
        .route("/token", get(crate::server::token::token_handler))
        .route("/ws", get(crate::server::ws::ws_handler))
        .nest_service("/pkg", serve_dir)
        .route("/", get(serve_index))
        .with_state(state)
}

pub async fn run_server(addr: SocketAddr, state: RelayState) -> Result<()> {
    let app = build_router(state);

    let display_addr = if addr.ip().is_loopback() {
        format!("localhost:{}", addr.port())
    } else {
        addr.to_string()
    };

    tracing::info!(display_addr = %display_addr, "KAD-Kings relay running");

    println!("\n\x1b[1;36m=== Relay Available ===\x1b[0m");
    println!(
        "\x1b[1mTokens:\x1b[0m    \x1b[4;34mhttp://{}/token?room=<room>&name=<name>\x1b[0m",
        display_addr
    );
    println!(
        "\x1b[1mWeb UI:\x1b[0m    \x1b[4;34mhttp://{}\x1b[0m",
        display_addr
    );
    println!("\x1b[1;36m=======================\x1b[0m\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", display_addr))?;
    axum::serve(listener, app)
        .await
        .context("relay server stopped")?;
    Ok(())
}

/// Serve index.html file
async fn serve_index() -> impl IntoResponse {
    match tokio::fs::read_to_string("index.html").await {
        Ok(content) => (
            axum::http::StatusCode::OK,
            [("content-type", "text/html")],
            content,
        )
            .into_response(),
        Err(_) => (axum::http::StatusCode::NOT_FOUND, "index.html not found").into_response(),
    }
}
