//! News API client for articles related to a search keyword

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("news api returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub source: ArticleSource,
    pub published_at: Option<String>,
}

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Clone)]
pub struct NewsClient {
    endpoint: String,
    api_key: Option<String>,
    http: Client,
}

impl NewsClient {
    pub fn new(
        endpoint: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.map(str::to_string),
            http,
        })
    }

    /// Articles matching `keyword`; empty when no API key is configured
    pub async fn search(&self, keyword: &str) -> Result<Vec<Article>, NewsError> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("news api key not configured, skipping article search");
            return Ok(Vec::new());
        };

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("q", keyword), ("language", "en"), ("apiKey", api_key)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(NewsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let news: NewsResponse = resp.json().await?;
        Ok(news.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn returns_articles_for_keyword() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "index funds".into()),
                Matcher::UrlEncoded("language".into(), "en".into()),
                Matcher::UrlEncoded("apiKey".into(), "k1".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "status": "ok",
                    "articles": [{
                        "title": "Markets rally",
                        "description": null,
                        "url": "https://news.example/a",
                        "urlToImage": "https://news.example/a.jpg",
                        "source": {"id": null, "name": "Example News"},
                        "publishedAt": "2024-05-01T10:00:00Z"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = NewsClient::new(&server.url(), Some("k1"), TIMEOUT).unwrap();
        let articles = client.search("index funds").await.unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title.as_deref(), Some("Markets rally"));
        assert_eq!(articles[0].source.name.as_deref(), Some("Example News"));
        assert_eq!(
            articles[0].url_to_image.as_deref(),
            Some("https://news.example/a.jpg")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_is_an_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"status":"error","code":"apiKeyMissing"}"#)
            .create_async()
            .await;

        let client = NewsClient::new(&server.url(), Some("revoked"), TIMEOUT).unwrap();
        let err = client.search("x").await.unwrap_err();

        assert!(matches!(err, NewsError::Api { status: 401, .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_key_skips_the_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = NewsClient::new(&server.url(), None, TIMEOUT).unwrap();
        assert!(client.search("x").await.unwrap().is_empty());

        mock.assert_async().await;
    }
}
