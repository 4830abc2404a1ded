//! Shared data models used across modules

use serde::Serialize;

use crate::ingest::Platform;

/// Normalized metadata for one video, always fully populated.
///
/// Built per request by the extractor (or from a search hit) and handed to
/// the library for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub title: String,
    pub url: String,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Whole seconds; 0 means unknown
    pub duration: u64,
    pub platform: Option<Platform>,
    pub uploader_name: String,
    pub extraction_succeeded: bool,
    pub extraction_error: Option<String>,
}

/// How a video entered a user's library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoSource {
    Search,
    Import,
}

impl VideoSource {
    /// Convert to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSource::Search => "search",
            VideoSource::Import => "import",
        }
    }
}

/// UI feedback message, shaped for a frontend flash area
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Error,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }
}
