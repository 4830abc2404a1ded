//! Video domain - DB queries for a user's saved videos
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};

use crate::models::{VideoRecord, VideoSource};

#[derive(Debug, sqlx::FromRow)]
pub struct VideoRow {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub duration_secs: i64,
    pub platform: Option<String>,
    pub uploader: String,
    pub source: String,
    pub extraction_succeeded: bool,
    pub created_at: DateTime<Utc>,
}

/// Video row with total count from window function
#[derive(Debug, sqlx::FromRow)]
struct VideoRowWithTotal {
    #[sqlx(flatten)]
    video: VideoRow,
    total_count: i64,
}

/// Find the id of a user's video by URL
pub async fn find_video_id_by_url<'e, E>(
    executor: E,
    user_id: i64,
    url: &str,
) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT id FROM videos
        WHERE url = $1 AND user_id = $2
        "#,
    )
    .bind(url)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(id,)| id))
}

/// Insert a video; returns None if the user already saved this URL
pub async fn insert_video<'e, E>(
    executor: E,
    user_id: i64,
    record: &VideoRecord,
    source: VideoSource,
) -> Result<Option<i64>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let duration_secs = i64::try_from(record.duration).unwrap_or(i64::MAX);

    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO videos (user_id, title, url, description, thumbnail, duration_secs,
                            platform, uploader, source, extraction_succeeded, extraction_error)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (url, user_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&record.title)
    .bind(&record.url)
    .bind(&record.description)
    .bind(&record.thumbnail)
    .bind(duration_secs)
    .bind(record.platform.map(|p| p.as_str()))
    .bind(&record.uploader_name)
    .bind(source.as_str())
    .bind(record.extraction_succeeded)
    .bind(&record.extraction_error)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(|(id,)| id))
}

/// List a user's videos, newest first, with the total count in the same query
pub async fn list_videos<'e, E>(
    executor: E,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<(Vec<VideoRow>, i64), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows: Vec<VideoRowWithTotal> = sqlx::query_as(
        r#"
        SELECT id, title, url, description, thumbnail, duration_secs, platform,
               uploader, source, extraction_succeeded, created_at,
               COUNT(*) OVER() as total_count
        FROM videos
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    let total = rows.first().map(|r| r.total_count).unwrap_or(0);
    let videos = rows.into_iter().map(|r| r.video).collect();

    Ok((videos, total))
}

/// Delete one of a user's videos; false if no such video
pub async fn delete_video<'e, E>(
    executor: E,
    user_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND user_id = $2")
        .bind(video_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
