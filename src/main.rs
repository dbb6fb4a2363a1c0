use axum::{
    http::{HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use dotenvy::dotenv;
use once_cell::sync::Lazy;
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

mod controllers;
mod db;
mod models;
mod realtime;
mod routes;
mod services;
mod state;
mod utils;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let database = match db::connection::init_db().await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    // The registry and dispatcher live for the whole process; the
    // dispatcher task drains vote updates until the queue closes at exit.
    let registry = Arc::new(realtime::registry::SubscriptionRegistry::new());
    let updates = realtime::dispatcher::spawn_dispatcher(registry.clone());

    let app_state = state::AppState::new(database, registry, updates);

    let cors = match std::env::var("CORS_ORIGIN") {
        Ok(cors_origin) => {
            let origin = cors_origin.parse::<HeaderValue>().unwrap_or_else(|_| {
                error!("Failed to parse CORS origin: {}", cors_origin);
                std::process::exit(1);
            });

            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::ACCEPT,
                ])
        }
        Err(_) => {
            info!("CORS_ORIGIN not set, allowing any origin");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    let app = Router::new()
        .route("/", get(root))
        .merge(
            Router::new()
                .route("/ws", get(realtime::socket::ws_handler))
                .with_state(app_state.clone()),
        )
        .nest("/api/users", routes::user_routes::user_routes(app_state.clone()))
        .nest("/api/polls", routes::poll_routes::poll_routes(app_state.clone()))
        .nest("/api/votes", routes::vote_routes::vote_routes(app_state.clone()))
        .layer(cors);

    let server_addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| {
        info!("SERVER_ADDR environment variable not set, using default 0.0.0.0:8000");
        "0.0.0.0:8000".to_string()
    });

    let addr: SocketAddr = server_addr.parse().unwrap_or_else(|_| {
        error!("Failed to parse SERVER_ADDR: {}", server_addr);
        std::process::exit(1);
    });

    info!("Server running at http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn root() -> Json<serde_json::Value> {
    let elapsed = START_TIME.elapsed();
    let seconds = elapsed.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    let uptime_message = if days > 0 {
        format!("{}d {}h {}m {}s", days, hours % 24, minutes % 60, seconds % 60)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes % 60, seconds % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    };

    Json(json!({
        "status": "ok",
        "message": format!("Real-Time Polling API is running! Uptime: {}", uptime_message)
    }))
}
