//! HTTP handlers for the OAuth2 login flow and session introspection.

use crate::{
    errors::{GatewayError, GatewayResult},
    services::{AppState, session_cookie},
};
use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `GET /auth/login` — redirect the browser to the provider consent page.
pub async fn login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.auth.authorization_url())
}

/// `GET /auth/oauth2callback` — exchange the authorization code, set the
/// session cookie and bounce back to the configured origin.
pub async fn oauth2_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> GatewayResult<(CookieJar, Redirect)> {
    let code = params
        .code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| GatewayError::validation("missing authorization code"))?;

    let credential = state.auth.exchange_code(code).await?;
    tracing::info!("authorization code exchanged, issuing session cookie");

    let jar = jar.add(session_cookie::issue(&credential, &state.cfg));
    let target = format!("{}/oauth2callback", state.cfg.origin);
    Ok((jar, Redirect::to(&target)))
}

/// `GET /auth/me` — report whether a session cookie is present. The token
/// is echoed for the client's own provider calls; its validity is not
/// checked here.
pub async fn me(jar: CookieJar) -> GatewayResult<Json<MeResponse>> {
    let credential = session_cookie::read(&jar).ok_or(GatewayError::Unauthenticated)?;
    Ok(Json(MeResponse {
        authenticated: true,
        token: Some(credential.access_token),
    }))
}
