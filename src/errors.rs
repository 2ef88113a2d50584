use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the gateway.
///
/// Validation failures are raised locally before any provider call;
/// provider failures are translated at the operation boundary and never
/// leaked raw to the caller. Logging happens here, at translation time,
/// rather than inside business logic.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No session cookie was presented.
    #[error("not authenticated")]
    Unauthenticated,

    /// A credential was presented but the provider rejected it.
    #[error("session expired")]
    CredentialExpired,

    /// Malformed caller input; never reaches the provider.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The referenced id does not exist at the provider.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The provider rejected or failed a call. When a partial failure left
    /// an object behind (created but not granted public access), its id is
    /// carried so the caller can react instead of losing track of it.
    #[error("provider call failed: {message}")]
    Provider {
        message: String,
        created_id: Option<String>,
    },
}

impl GatewayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider {
            message: msg.into(),
            created_id: None,
        }
    }

    /// Provider failure that happened after `created_id` was created.
    pub fn provider_partial(msg: impl Into<String>, created_id: impl Into<String>) -> Self {
        Self::Provider {
            message: msg.into(),
            created_id: Some(created_id.into()),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "authenticated": false })),
            )
                .into_response(),
            GatewayError::CredentialExpired => {
                tracing::warn!("credential rejected by provider, clearing session cookie");
                let removal = crate::services::session_cookie::clear();
                (
                    StatusCode::UNAUTHORIZED,
                    [(header::SET_COOKIE, removal.to_string())],
                    Json(json!({ "authenticated": false, "error": "session expired" })),
                )
                    .into_response()
            }
            GatewayError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            GatewayError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{} not found", resource) })),
            )
                .into_response(),
            GatewayError::Provider {
                message,
                created_id,
            } => {
                // Original cause stays server-side; the caller gets a
                // generic message plus the orphan id when one exists.
                tracing::error!("provider failure: {}", message);
                let body = match created_id {
                    Some(id) => json!({ "error": "storage provider request failed", "fileId": id }),
                    None => json!({ "error": "storage provider request failed" }),
                };
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            GatewayError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::validation("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::not_found("file abc").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::provider("boom").into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn expired_credential_clears_cookie() {
        let response = GatewayError::CredentialExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("removal cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("access_token="));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
