mod api;
mod dto;
mod state;

use crate::state::AppState;
use axum::routing::{get, post};
use bandobast::prelude::*;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

const PORT: u32 = 3000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();

    info!("Starting server...");
    let store = match std::env::args().nth(1) {
        Some(path) => {
            info!("Seeding store from {path}");
            match load_seed(&path).await {
                Ok(root) => MemoryStore::with_value(root),
                Err(err) => {
                    error!("Failed to load seed {path}: {err}");
                    std::process::exit(1);
                }
            }
        }
        None => MemoryStore::new(),
    };

    let session = MapSession::open(Arc::new(store), Config::default());
    let state = Arc::new(AppState::new(session));

    let app = axum::Router::new()
        .route("/overlays", get(api::overlays))
        .route("/personnel", get(api::personnel))
        .route("/draw", post(api::draw))
        .route("/draft", get(api::draft).put(api::update_draft))
        .route("/draft/submit", post(api::submit))
        .route("/draft/cancel", post(api::cancel))
        .with_state(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", PORT)).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind port {PORT}: {err}");
            std::process::exit(1);
        }
    };
    info!("Listening to port {PORT}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
    }
}

async fn load_seed(path: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}
