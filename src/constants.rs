//! Application constants

/// Title used when neither the extractor nor the URL yields one
pub const UNTITLED_VIDEO: &str = "Untitled Video";

/// Uploader attribution when none is reported
pub const UNKNOWN_UPLOADER: &str = "Unknown";

/// Fallback description when no platform could be detected
pub const GENERIC_DESCRIPTION: &str = "Saved video";

/// Maximum stored description length, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Maximum length of a title derived from a URL path segment, in characters
pub const MAX_FALLBACK_TITLE_CHARS: usize = 100;

/// Shortest input that can plausibly be an absolute video URL
pub const MIN_URL_LENGTH: usize = 10;

/// Default per-call extraction timeout (seconds)
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 30;

/// Default request timeout for outbound HTTP clients (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Default page size for paginated list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Maximum page size for paginated list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;
