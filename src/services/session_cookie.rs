//! Session cookie codec: the credential travels as an opaque HTTP-only
//! cookie and is never stored server-side.

use crate::{config::AppConfig, models::credential::Credential};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use cookie::time::Duration;

/// Cookie carrying the bearer token.
pub const COOKIE_NAME: &str = "access_token";

/// Fixed cookie lifetime, independent of the token's true remaining
/// lifetime. A token that outlives its cookie simply forces a re-login;
/// one that dies earlier surfaces lazily as a provider rejection.
pub const COOKIE_MAX_AGE_SECS: i64 = 3600;

/// Build the session cookie for a freshly exchanged credential.
pub fn issue(credential: &Credential, cfg: &AppConfig) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, credential.access_token.clone()))
        .path("/")
        .http_only(true)
        .secure(cfg.production)
        .same_site(same_site_policy(&cfg.same_site))
        .max_age(Duration::seconds(COOKIE_MAX_AGE_SECS))
        .build()
}

/// Removal cookie used on logout-equivalent paths (expired credential).
pub fn clear() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .max_age(Duration::ZERO)
        .build()
}

/// Decode the credential from the incoming jar, if present and non-empty.
pub fn read(jar: &CookieJar) -> Option<Credential> {
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|token| !token.is_empty())
        .map(Credential::from_token)
}

fn same_site_policy(value: &str) -> SameSite {
    match value {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(production: bool, same_site: &str) -> AppConfig {
        AppConfig {
            host: "0.0.0.0".into(),
            port: 3000,
            client_id: "id".into(),
            client_secret: "secret".into(),
            server_url: "http://localhost:3000".into(),
            origin: "http://localhost:5173".into(),
            root_folder_id: "root".into(),
            spool_dir: "./data/spool".into(),
            same_site: same_site.into(),
            production,
        }
    }

    #[test]
    fn issued_cookie_carries_expected_attributes() {
        let cred = Credential::from_token("tok-123");
        let cookie = issue(&cred, &test_config(true, "strict"));

        assert_eq!(cookie.name(), COOKIE_NAME);
        assert_eq!(cookie.value(), "tok-123");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(3600)));
    }

    #[test]
    fn secure_flag_is_gated_on_environment() {
        let cred = Credential::from_token("tok");
        let cookie = issue(&cred, &test_config(false, "lax"));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn read_rejects_missing_and_empty_cookies() {
        let jar = CookieJar::new();
        assert!(read(&jar).is_none());

        let jar = jar.add(Cookie::new(COOKIE_NAME, ""));
        assert!(read(&jar).is_none());

        let jar = jar.add(Cookie::new(COOKIE_NAME, "tok"));
        assert_eq!(read(&jar).unwrap().access_token, "tok");
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear();
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.value(), "");
    }
}
