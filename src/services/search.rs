//! Client for the video search proxy
//!
//! The proxy wraps its results in a Lambda-style envelope:
//! `{"body": "<JSON-encoded array of hits>"}`. Some deployments return the
//! array directly under `body`, so both shapes are accepted.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search proxy returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("malformed search response: {0}")]
    Malformed(String),
}

/// One result as returned by the proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoHit {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct Envelope {
    body: Value,
}

#[derive(Clone)]
pub struct VideoSearchClient {
    endpoint: String,
    http: Client,
}

impl VideoSearchClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            http,
        })
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<VideoHit>, SearchError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&SearchRequest { query: keyword })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(SearchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope = resp
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.to_string()))?;

        parse_hits(envelope.body)
    }
}

fn parse_hits(body: Value) -> Result<Vec<VideoHit>, SearchError> {
    let hits = match body {
        Value::String(encoded) => serde_json::from_str(&encoded),
        other => serde_json::from_value(other),
    };
    hits.map_err(|e| SearchError::Malformed(e.to_string()))
}
