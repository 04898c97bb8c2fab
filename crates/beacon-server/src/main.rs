use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use beacon_api::{AppState, AppStateInner, auth, entries};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = env_or("BEACON_DB_PATH", "beacon.db");
    let pool_size: usize = env_or("BEACON_DB_POOL_SIZE", "10").parse()?;
    let host = env_or("BEACON_HOST", "0.0.0.0");
    let port: u16 = env_or("BEACON_PORT", "4000").parse()?;
    let admin_user = env_or("BEACON_ADMIN_USER", "admin");
    let admin_password = env_or("BEACON_ADMIN_PASSWORD", "admin123");

    // Init database and bootstrap admin
    let db = beacon_db::Database::open(&PathBuf::from(&db_path), pool_size)?;
    auth::seed_default_admin(&db, &admin_user, &admin_password)?;

    let state: AppState = Arc::new(AppStateInner { db });

    // Routes
    let app = Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/login-attempts", get(auth::login_attempts))
        .route(
            "/api/data-entries",
            post(entries::create_entry).get(entries::list_entries),
        )
        .route(
            "/api/data-entries/{id}",
            get(entries::get_entry).delete(entries::delete_entry),
        )
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Beacon API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}
