//! Keyword search across the video search proxy and the news API

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::auth::AuthUser;
use crate::AppState;
use crate::ingest::{Platform, detect_platform};
use crate::services::news::Article;
use crate::services::search::VideoHit;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/search", get(search))
}

#[derive(Deserialize)]
struct SearchQuery {
    keyword: Option<String>,
}

#[derive(Serialize)]
struct VideoResult {
    #[serde(flatten)]
    hit: VideoHit,
    platform: Option<Platform>,
}

#[derive(Serialize)]
struct SearchResponse {
    keyword: String,
    videos: Vec<VideoResult>,
    articles: Vec<Article>,
}

/// GET /search?keyword= - Videos and news for a keyword.
/// Either upstream failing yields an empty list for that half only.
async fn search(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Response {
    let Some(keyword) = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing keyword parameter" })),
        )
            .into_response();
    };

    let (videos, articles) = tokio::join!(state.search.search(keyword), state.news.search(keyword));

    let videos = videos.unwrap_or_else(|e| {
        warn!(error = %e, keyword, "video search failed");
        Vec::new()
    });
    let articles = articles.unwrap_or_else(|e| {
        warn!(error = %e, keyword, "news search failed");
        Vec::new()
    });

    let videos = videos
        .into_iter()
        .map(|hit| VideoResult {
            platform: detect_platform(&hit.url),
            hit,
        })
        .collect();

    Json(SearchResponse {
        keyword: keyword.to_string(),
        videos,
        articles,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{auth_cookie, json_body, test_app, test_state};
    use axum::body::Body;
    use axum::http::{Request, header};
    use mockito::{Matcher, Server};
    use tower::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, auth_cookie(1))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn missing_keyword_is_bad_request() {
        for uri in ["/search", "/search?keyword=", "/search?keyword=%20%20"] {
            let app = test_app(test_state("http://127.0.0.1:1", "http://127.0.0.1:1"));
            let response = app.oneshot(get(uri)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(
                json_body(response).await,
                json!({"error": "Missing keyword parameter"})
            );
        }
    }

    #[tokio::test]
    async fn requires_session() {
        let app = test_app(test_state("http://127.0.0.1:1", "http://127.0.0.1:1"));
        let response = app
            .oneshot(Request::get("/search?keyword=x").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn combines_videos_and_articles() {
        let mut search = Server::new_async().await;
        let mut news = Server::new_async().await;
        let encoded = json!([
            {"title": "Budgeting", "url": "https://www.youtube.com/watch?v=abc123", "description": "d"},
            {"title": "Elsewhere", "url": "https://example.org/v/1", "description": ""}
        ])
        .to_string();
        let search_mock = search
            .mock("POST", "/")
            .with_status(200)
            .with_body(json!({ "body": encoded }).to_string())
            .create_async()
            .await;
        let news_mock = news
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("q".into(), "budget".into()))
            .with_status(200)
            .with_body(json!({"articles": [{"title": "A", "url": "https://n.example/a"}]}).to_string())
            .create_async()
            .await;

        let app = test_app(test_state(&search.url(), &news.url()));
        let response = app.oneshot(get("/search?keyword=budget")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["keyword"], "budget");
        assert_eq!(body["videos"][0]["platform"], "YouTube");
        assert_eq!(body["videos"][0]["title"], "Budgeting");
        assert_eq!(body["videos"][1]["platform"], "Other");
        assert_eq!(body["articles"][0]["url"], "https://n.example/a");
        search_mock.assert_async().await;
        news_mock.assert_async().await;
    }

    #[tokio::test]
    async fn failing_upstreams_degrade_to_empty_lists() {
        let mut search = Server::new_async().await;
        let search_mock = search
            .mock("POST", "/")
            .with_status(500)
            .create_async()
            .await;

        let app = test_app(test_state(&search.url(), "http://127.0.0.1:1"));
        let response = app.oneshot(get("/search?keyword=budget")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["videos"], json!([]));
        assert_eq!(body["articles"], json!([]));
        search_mock.assert_async().await;
    }
}
