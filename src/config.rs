//! Environment-driven configuration

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::constants::{DEFAULT_EXTRACTION_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/everything";
const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub video_search_url: String,
    pub news_api_url: String,
    pub news_api_key: Option<String>,
    pub otp_service_url: String,
    pub otp_api_key: Option<String>,
    pub ytdlp_path: String,
    pub extraction_timeout: Duration,
    pub http_timeout: Duration,
    pub cors_origin: Option<String>,
    pub cookies: CookieSettings,
}

/// Attributes applied to every session cookie
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: &'static str,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: "Lax",
        }
    }
}

impl CookieSettings {
    fn from_env() -> Self {
        cookie_settings(
            env::var("ENV").ok().as_deref(),
            env::var("COOKIE_SAMESITE").ok().as_deref(),
        )
    }
}

/// Browsers drop `SameSite=None` cookies that lack `Secure`, so that
/// combination always sets it regardless of environment.
fn cookie_settings(environment: Option<&str>, same_site: Option<&str>) -> CookieSettings {
    let same_site = parse_same_site(same_site);
    CookieSettings {
        secure: environment == Some("prod") || same_site == "None",
        same_site,
    }
}

fn parse_same_site(value: Option<&str>) -> &'static str {
    match value.map(str::to_lowercase).as_deref() {
        Some("none") => "None",
        Some("strict") => "Strict",
        _ => "Lax",
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let video_search_url = required("VIDEO_SEARCH_URL")?;
        let otp_service_url = required("OTP_SERVICE_URL")?;

        let db_max_connections = match optional("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS is not a number: {v}"))?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };

        let extraction_timeout =
            positive_secs("EXTRACTION_TIMEOUT_SECS", DEFAULT_EXTRACTION_TIMEOUT_SECS)?;
        let http_timeout = positive_secs("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        Ok(Self {
            bind_address: optional("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into()),
            database_url,
            db_max_connections,
            jwt_secret,
            video_search_url,
            news_api_url: optional("NEWS_API_URL").unwrap_or_else(|| DEFAULT_NEWS_API_URL.into()),
            news_api_key: optional("NEWS_API_KEY"),
            otp_service_url,
            otp_api_key: optional("OTP_API_KEY"),
            ytdlp_path: optional("YTDLP_PATH").unwrap_or_else(|| DEFAULT_YTDLP_PATH.into()),
            extraction_timeout,
            http_timeout,
            cors_origin: optional("CORS_ORIGIN"),
            cookies: CookieSettings::from_env(),
        })
    }
}

/// Non-empty, trimmed value of an environment variable
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow!("{key} must be set"))
}

fn positive_secs(key: &str, default: u64) -> Result<Duration> {
    let secs = match optional(key) {
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| anyhow!("{key} must be a positive integer"))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
