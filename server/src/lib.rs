//! Game progress and unlock service for the Frequency Match mini-game.
//!
//! Anonymous players report scores under a client-held session id; the
//! service keeps one durable record per session (best score, play totals,
//! unlocked catalog items, earned achievements) and answers read-only
//! status queries for the storefront.
//!
//! # General Infrastructure
//! - Stateless axum frontend over Redis, one record per session
//! - The catalog and the achievement rule set are reference data owned by
//!   the CMS, loaded once at startup
//! - All writes go through the unlock engine's compare-and-set cycle, so
//!   retried or parallel submissions for a session merge instead of
//!   clobbering each other
//! - Sessions never share state, so there is no cross-session coordination
//!   anywhere

use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod progress;
pub mod routes;
pub mod state;
pub mod utils;

use routes::{progress_handler, score_handler, unlock_status_handler};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new().await;

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/game/frequency-match", post(score_handler))
        .route("/game/progress/{session_id}", get(progress_handler))
        .route(
            "/game/unlock-status/{session_id}/{item_id}",
            get(unlock_status_handler),
        )
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
