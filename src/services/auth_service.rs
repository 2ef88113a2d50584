//! OAuth2 authorization-code flow against the provider's token endpoint.

use crate::{
    config::AppConfig,
    errors::{GatewayError, GatewayResult},
    models::credential::Credential,
};
use chrono::{Duration, Utc};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl, basic::BasicClient, reqwest::async_http_client,
};
use std::future::Future;

/// OAuth2 authorization endpoint.
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// OAuth2 token endpoint.
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Scope limiting access to files the app itself created or opened.
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Builds authorization URLs and exchanges authorization codes for
/// credentials. Holds no per-user state; the resulting credential lives in
/// the browser cookie only.
pub struct AuthService {
    client: BasicClient,
}

impl AuthService {
    pub fn new(cfg: &AppConfig) -> GatewayResult<Self> {
        let client = BasicClient::new(
            ClientId::new(cfg.client_id.clone()),
            Some(ClientSecret::new(cfg.client_secret.clone())),
            AuthUrl::new(AUTH_URL.to_string())
                .map_err(|e| GatewayError::validation(format!("invalid auth URL: {e}")))?,
            Some(
                TokenUrl::new(TOKEN_URL.to_string())
                    .map_err(|e| GatewayError::validation(format!("invalid token URL: {e}")))?,
            ),
        )
        .set_redirect_uri(
            RedirectUrl::new(cfg.redirect_url())
                .map_err(|e| GatewayError::validation(format!("invalid redirect URL: {e}")))?,
        );

        Ok(Self { client })
    }

    /// Build the provider consent URL. Pure construction, no side effects.
    ///
    /// A random `state` parameter is included as the oauth2 crate requires;
    /// with no server-side session store there is nothing to verify it
    /// against on callback, which is a recorded limitation of the
    /// cookie-only session model.
    pub fn authorization_url(&self) -> String {
        let (auth_url, _csrf) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
            .add_extra_param("access_type", "offline")
            .url();

        auth_url.to_string()
    }

    /// Exchange an authorization code for a credential.
    ///
    /// Fails with a validation error on an empty code and with a provider
    /// error when the token endpoint rejects it (invalid or expired code,
    /// revoked client). The expiry is derived from the token response's
    /// lifetime field, defaulting to one hour.
    pub async fn exchange_code(&self, code: &str) -> GatewayResult<Credential> {
        self.exchange_code_with(code, async_http_client).await
    }

    /// `exchange_code` with the token-endpoint HTTP client injected, so the
    /// exchange can run against a stubbed endpoint.
    pub async fn exchange_code_with<C, F, RE>(
        &self,
        code: &str,
        http_client: C,
    ) -> GatewayResult<Credential>
    where
        C: FnOnce(oauth2::HttpRequest) -> F,
        F: Future<Output = Result<oauth2::HttpResponse, RE>>,
        RE: std::error::Error + 'static,
    {
        if code.trim().is_empty() {
            return Err(GatewayError::validation("missing authorization code"));
        }

        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(http_client)
            .await
            .map_err(|e| GatewayError::provider(format!("token exchange failed: {e}")))?;

        let expires_in = token
            .expires_in()
            .unwrap_or_else(|| std::time::Duration::from_secs(3600));
        let expires_at =
            Utc::now() + Duration::from_std(expires_in).unwrap_or_else(|_| Duration::hours(1));

        Ok(Credential {
            access_token: token.access_token().secret().clone(),
            expires_at: Some(expires_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            host: "0.0.0.0".into(),
            port: 3000,
            client_id: "test-client".into(),
            client_secret: "test-secret".into(),
            server_url: "http://localhost:3000".into(),
            origin: "http://localhost:5173".into(),
            root_folder_id: "root".into(),
            spool_dir: "./data/spool".into(),
            same_site: "lax".into(),
            production: false,
        }
    }

    #[test]
    fn authorization_url_contains_expected_parameters() {
        let auth = AuthService::new(&test_config()).unwrap();
        let url = auth.authorization_url();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
        assert!(url.contains("client_id=test-client"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("scope="));
        assert!(url.contains("drive.file"));

        let parsed = url::Url::parse(&url).unwrap();
        let redirect = parsed
            .query_pairs()
            .find(|(k, _)| k == "redirect_uri")
            .map(|(_, v)| v.to_string())
            .unwrap();
        assert_eq!(redirect, "http://localhost:3000/auth/oauth2callback");
    }

    #[tokio::test]
    async fn empty_code_is_rejected_before_any_network_call() {
        let auth = AuthService::new(&test_config()).unwrap();
        let err = auth.exchange_code("  ").await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    fn token_response(status: oauth2::http::StatusCode, body: &str) -> oauth2::HttpResponse {
        let mut headers = oauth2::http::HeaderMap::new();
        headers.insert(
            oauth2::http::header::CONTENT_TYPE,
            oauth2::http::HeaderValue::from_static("application/json"),
        );
        oauth2::HttpResponse {
            status_code: status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    async fn stub_token_endpoint(
        _request: oauth2::HttpRequest,
    ) -> Result<oauth2::HttpResponse, std::convert::Infallible> {
        Ok(token_response(
            oauth2::http::StatusCode::OK,
            r#"{"access_token":"stub-token","token_type":"bearer","expires_in":3600}"#,
        ))
    }

    async fn rejecting_token_endpoint(
        _request: oauth2::HttpRequest,
    ) -> Result<oauth2::HttpResponse, std::convert::Infallible> {
        Ok(token_response(
            oauth2::http::StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant"}"#,
        ))
    }

    #[tokio::test]
    async fn exchanged_code_yields_cookie_that_the_session_reader_accepts() {
        use crate::services::session_cookie;
        use axum_extra::extract::cookie::CookieJar;

        let cfg = test_config();
        let auth = AuthService::new(&cfg).unwrap();

        let credential = auth
            .exchange_code_with("good-code", stub_token_endpoint)
            .await
            .unwrap();
        assert_eq!(credential.access_token, "stub-token");
        assert!(credential.expires_at.is_some());

        let jar = CookieJar::new().add(session_cookie::issue(&credential, &cfg));
        let restored = session_cookie::read(&jar).expect("cookie should restore the credential");
        assert_eq!(restored.access_token, "stub-token");
    }

    #[tokio::test]
    async fn rejected_code_surfaces_as_a_provider_error() {
        let auth = AuthService::new(&test_config()).unwrap();
        let err = auth
            .exchange_code_with("stale-code", rejecting_token_endpoint)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Provider { .. }));
    }
}
