//! Service layer: authentication, the access guard, the provider client,
//! and the listing/storage pipelines built on top of it.

pub mod access_guard;
pub mod auth_service;
pub mod catalog_service;
pub mod drive_client;
pub mod session_cookie;
pub mod storage_gateway;
pub mod upload_spool;

use crate::config::AppConfig;
use self::auth_service::AuthService;
use self::drive_client::DriveConnector;
use std::sync::Arc;

/// Shared router state. Everything here is immutable; per-request values
/// (the credential and its provider client) are created by the guard.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub auth: Arc<AuthService>,
    pub connector: Arc<dyn DriveConnector>,
}

impl AppState {
    pub fn new(
        cfg: AppConfig,
        auth: AuthService,
        connector: Arc<dyn DriveConnector>,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            auth: Arc::new(auth),
            connector,
        }
    }
}
