//! Request-level access guard.
//!
//! `Session` is an extractor: handlers that take one are unreachable
//! without a session cookie. The decoded credential is bound to a provider
//! client constructed for this request alone, so credentials never leak
//! across concurrent requests. Validity is not checked here; an invalid or
//! expired token surfaces as `CredentialExpired` from the first provider
//! call that uses it.

use crate::{
    errors::GatewayError,
    models::credential::Credential,
    services::{AppState, drive_client::DriveApi, session_cookie},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

/// An authenticated request: the caller's credential plus a provider
/// client bound to it.
pub struct Session {
    pub credential: Credential,
    pub client: Box<dyn DriveApi>,
}

impl Session {
    pub fn api(&self) -> &dyn DriveApi {
        self.client.as_ref()
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| GatewayError::Unauthenticated)?;

        let credential = session_cookie::read(&jar).ok_or(GatewayError::Unauthenticated)?;
        let client = state.connector.bind(credential.clone());

        Ok(Self { credential, client })
    }
}
