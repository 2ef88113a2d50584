use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
};
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

/// Upload body limit, matching the original deployment's 50 MiB cap.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting drive-gateway on {} (origin: {})",
        cfg.addr(),
        cfg.origin
    );

    // --- Ensure spool directory exists ---
    if !Path::new(&cfg.spool_dir).exists() {
        fs::create_dir_all(&cfg.spool_dir)?;
        tracing::info!("Created spool directory at {}", cfg.spool_dir);
    }

    // --- Assemble shared state ---
    let auth = services::auth_service::AuthService::new(&cfg)
        .map_err(|e| anyhow::anyhow!("building OAuth2 client: {e}"))?;
    let connector = Arc::new(services::drive_client::HttpDriveConnector::new());
    let origin = cfg
        .origin
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("invalid origin `{}`: {e}", cfg.origin))?;
    let state = services::AppState::new(cfg.clone(), auth, connector);

    // --- Build router ---
    // Credentials are allowed, so CORS must name origin/methods/headers
    // explicitly rather than using wildcards.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let app: Router = routes::routes::routes()
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
