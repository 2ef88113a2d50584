//! Defines routes for the auth flow and all file operations.
//!
//! ## Structure
//! - **Auth endpoints**
//!   - `GET  /auth/login`          — redirect to the provider consent URL
//!   - `GET  /auth/oauth2callback` — code exchange, sets the session cookie
//!   - `GET  /auth/me`             — session introspection
//!
//! - **File endpoints** (session cookie required)
//!   - `GET    /files`               — list with search/sort
//!   - `POST   /files/upload`        — multipart upload
//!   - `POST   /files/create-folder` — create a folder
//!   - `GET    /files/download/{id}` — attachment stream
//!   - `DELETE /files/{id}`          — delete an entry

use crate::{
    handlers::{
        auth_handlers::{login, me, oauth2_callback},
        file_handlers::{create_folder, delete_file, download_file, list_files, upload_file},
        health_handlers::{healthz, readyz},
    },
    services::AppState,
};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build and return the router for all gateway routes.
///
/// The router carries shared state (`AppState`) to all handlers; the
/// file routes additionally require a valid session via the `Session`
/// extractor.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // auth flow
        .route("/auth/login", get(login))
        .route("/auth/oauth2callback", get(oauth2_callback))
        .route("/auth/me", get(me))
        // file operations
        .route("/files", get(list_files))
        .route("/files/upload", post(upload_file))
        .route("/files/create-folder", post(create_folder))
        .route("/files/download/{id}", get(download_file))
        .route("/files/{id}", delete(delete_file))
}
