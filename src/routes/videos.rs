//! Video library endpoints (/videos, /videos/import, /videos/{id})

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::AuthUser;
use crate::AppState;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::videos::{self, VideoRow};
use crate::ingest::{self, IngestOutcome, Platform, format_duration, is_valid_video_url};
use crate::models::{Flash, VideoRecord, VideoSource};
use crate::services::error::LogErr;
use crate::services::library::{self, PgVideoStore, SaveOutcome};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/videos", post(save_videos).get(list_videos))
        .route("/videos/import", post(import_video))
        .route("/videos/{id}", delete(delete_video))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Saved,
    AlreadySaved,
    Rejected,
}

// ============================================================================
// Save selected search results
// ============================================================================

#[derive(Deserialize)]
struct SelectedVideo {
    #[serde(default)]
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct SaveVideosRequest {
    videos: Vec<SelectedVideo>,
}

#[derive(Serialize)]
struct SaveResult {
    url: String,
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    flash: Flash,
}

#[derive(Serialize)]
struct SaveVideosResponse {
    results: Vec<SaveResult>,
}

/// POST /videos - Save videos picked from search results, one outcome per item
async fn save_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveVideosRequest>,
) -> Result<Json<SaveVideosResponse>, StatusCode> {
    let store = PgVideoStore::new(state.db.clone());
    let mut results = Vec::with_capacity(payload.videos.len());

    for video in payload.videos {
        let raw_url = video.url.trim();
        let canonical = is_valid_video_url(raw_url)
            .then(|| ingest::canonical_url(raw_url))
            .flatten();

        let Some(url) = canonical else {
            results.push(SaveResult {
                url: video.url,
                outcome: Outcome::Rejected,
                id: None,
                flash: Flash::error("Invalid video URL."),
            });
            continue;
        };

        let record = library::record_from_search_hit(&video.title, &url, &video.description);
        let result = match library::save_video(&store, user_id, &record, VideoSource::Search)
            .await
            .log_500("Save video error")?
        {
            SaveOutcome::Saved(id) => SaveResult {
                url,
                outcome: Outcome::Saved,
                id: Some(id),
                flash: Flash::success("Video saved successfully!"),
            },
            SaveOutcome::AlreadySaved => SaveResult {
                url,
                outcome: Outcome::AlreadySaved,
                id: None,
                flash: Flash::info("Video already saved."),
            },
        };
        results.push(result);
    }

    Ok(Json(SaveVideosResponse { results }))
}

// ============================================================================
// Import a pasted URL
// ============================================================================

#[derive(Deserialize)]
struct ImportRequest {
    url: String,
}

#[derive(Serialize)]
struct SavedVideo {
    id: i64,
    #[serde(flatten)]
    record: VideoRecord,
    duration_display: String,
}

#[derive(Serialize)]
struct ImportResponse {
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<SavedVideo>,
    flash: Flash,
}

/// POST /videos/import - Extract metadata for a pasted URL and save it
async fn import_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ImportRequest>,
) -> Result<(StatusCode, Json<ImportResponse>), StatusCode> {
    let store = PgVideoStore::new(state.db.clone());

    let outcome = ingest::ingest_url(state.extractor.as_ref(), &store, user_id, &payload.url)
        .await
        .log_500("Import video error")?;

    let (status, response) = match outcome {
        IngestOutcome::Saved { id, record } => {
            let platform = record.platform.unwrap_or(Platform::Other);
            (
                StatusCode::CREATED,
                ImportResponse {
                    outcome: Outcome::Saved,
                    flash: Flash::success(format!("Video imported from {platform}!")),
                    video: Some(SavedVideo {
                        id,
                        duration_display: format_duration(record.duration),
                        record,
                    }),
                },
            )
        }
        IngestOutcome::AlreadySaved => (
            StatusCode::OK,
            ImportResponse {
                outcome: Outcome::AlreadySaved,
                video: None,
                flash: Flash::info("Video already saved."),
            },
        ),
        IngestOutcome::Rejected => (
            StatusCode::BAD_REQUEST,
            ImportResponse {
                outcome: Outcome::Rejected,
                video: None,
                flash: Flash::error("Invalid or unsupported video URL."),
            },
        ),
    };

    Ok((status, Json(response)))
}

// ============================================================================
// Library listing and removal
// ============================================================================

#[derive(Deserialize)]
struct ListVideosQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Serialize)]
struct VideoResponse {
    id: i64,
    title: String,
    url: String,
    description: String,
    thumbnail: Option<String>,
    duration: i64,
    duration_display: String,
    platform: Option<Platform>,
    uploader: String,
    source: String,
    extraction_succeeded: bool,
    created_at: DateTime<Utc>,
}

impl From<VideoRow> for VideoResponse {
    fn from(row: VideoRow) -> Self {
        Self {
            duration_display: format_duration(u64::try_from(row.duration_secs).unwrap_or(0)),
            id: row.id,
            title: row.title,
            url: row.url,
            description: row.description,
            thumbnail: row.thumbnail,
            duration: row.duration_secs,
            platform: row.platform.as_deref().and_then(Platform::parse),
            uploader: row.uploader,
            source: row.source,
            extraction_succeeded: row.extraction_succeeded,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize)]
struct ListVideosResponse {
    items: Vec<VideoResponse>,
    total: i64,
    has_more: bool,
}

/// Clamp client paging to a sane window
fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// GET /videos - The user's library, newest first
async fn list_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListVideosQuery>,
) -> Result<Json<ListVideosResponse>, StatusCode> {
    let (limit, offset) = page_bounds(query.limit, query.offset);

    let (rows, total) = videos::list_videos(&state.db, user_id, limit, offset)
        .await
        .log_500("List videos error")?;

    let has_more = offset + (rows.len() as i64) < total;

    Ok(Json(ListVideosResponse {
        items: rows.into_iter().map(VideoResponse::from).collect(),
        total,
        has_more,
    }))
}

/// DELETE /videos/{id} - Remove a video from the user's library
async fn delete_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let deleted = videos::delete_video(&state.db, user_id, video_id)
        .await
        .log_500("Delete video error")?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
