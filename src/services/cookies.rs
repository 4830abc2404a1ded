//! Cookie building utilities for session management
//!
//! Centralizes cookie formatting so register, login, refresh and logout
//! emit identical attributes.

use axum::http::{HeaderValue, StatusCode};
use tracing::error;

use crate::config::CookieSettings;

/// Cookie configuration constants
pub mod config {
    /// Access token cookie name
    pub const ACCESS_TOKEN_NAME: &str = "access_token";
    /// Refresh token cookie name
    pub const REFRESH_TOKEN_NAME: &str = "refresh_token";
    /// Access token max-age in seconds (10 minutes)
    pub const ACCESS_TOKEN_MAX_AGE_SECS: u32 = 600;
    /// Refresh token max-age in seconds (30 days)
    pub const REFRESH_TOKEN_MAX_AGE_SECS: u32 = 30 * 24 * 60 * 60;
    pub const COOKIE_PATH: &str = "/";
}

fn build_cookie(
    name: &str,
    value: &str,
    max_age_secs: u32,
    settings: &CookieSettings,
) -> Result<HeaderValue, StatusCode> {
    let secure = if settings.secure { " Secure;" } else { "" };
    let cookie = format!(
        "{}={}; HttpOnly;{} SameSite={}; Path={}; Max-Age={}",
        name,
        value,
        secure,
        settings.same_site,
        config::COOKIE_PATH,
        max_age_secs
    );
    cookie.parse().map_err(|_| {
        error!(cookie = name, "failed to build cookie header");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Build an access token Set-Cookie header value
pub fn build_access_cookie(
    token: &str,
    settings: &CookieSettings,
) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::ACCESS_TOKEN_NAME,
        token,
        config::ACCESS_TOKEN_MAX_AGE_SECS,
        settings,
    )
}

/// Build a refresh token Set-Cookie header value
pub fn build_refresh_cookie(
    token: &str,
    settings: &CookieSettings,
) -> Result<HeaderValue, StatusCode> {
    build_cookie(
        config::REFRESH_TOKEN_NAME,
        token,
        config::REFRESH_TOKEN_MAX_AGE_SECS,
        settings,
    )
}

/// Set-Cookie headers that expire both session cookies
pub fn build_clear_cookies(settings: &CookieSettings) -> Result<[HeaderValue; 2], StatusCode> {
    Ok([
        build_cookie(config::ACCESS_TOKEN_NAME, "", 0, settings)?,
        build_cookie(config::REFRESH_TOKEN_NAME, "", 0, settings)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_cookie_has_session_attributes() {
        let settings = CookieSettings {
            secure: true,
            same_site: "Strict",
        };
        let header = build_access_cookie("abc.def", &settings).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            "access_token=abc.def; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=600"
        );
    }

    #[test]
    fn dev_cookies_are_not_secure() {
        let header = build_refresh_cookie("r1", &CookieSettings::default()).unwrap();
        let value = header.to_str().unwrap();
        assert!(value.starts_with("refresh_token=r1; HttpOnly; SameSite=Lax;"));
        assert!(!value.contains("Secure"));
        assert!(value.ends_with(&format!("Max-Age={}", config::REFRESH_TOKEN_MAX_AGE_SECS)));
    }

    #[test]
    fn clear_cookies_expire_immediately() {
        let [access, refresh] = build_clear_cookies(&CookieSettings::default()).unwrap();
        assert!(access.to_str().unwrap().starts_with("access_token=;"));
        assert!(refresh.to_str().unwrap().starts_with("refresh_token=;"));
        assert!(access.to_str().unwrap().ends_with("Max-Age=0"));
    }

    #[test]
    fn cookie_values_with_control_characters_are_rejected() {
        assert_eq!(
            build_access_cookie("bad\nvalue", &CookieSettings::default()),
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }
}
