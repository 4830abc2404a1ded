//! One-time-passcode service client used for password resets

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OtpError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("otp service returned {status}: {body}")]
    Api { status: u16, body: String },
}

#[derive(Serialize)]
struct SendRequest<'a> {
    recipient: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    recipient: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct VerifyResponse {
    valid: bool,
}

#[derive(Clone)]
pub struct OtpClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl OtpClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.map(str::to_string),
            http,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let req = self.http.post(format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    /// Ask the service to deliver a code to `recipient`
    pub async fn send_code(&self, recipient: &str) -> Result<(), OtpError> {
        let resp = self
            .post("/otp/send")
            .json(&SendRequest { recipient })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(OtpError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Whether `code` is the current code for `recipient`
    pub async fn verify_code(&self, recipient: &str, code: &str) -> Result<bool, OtpError> {
        let resp = self
            .post("/otp/verify")
            .json(&VerifyRequest { recipient, code })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            return Err(OtpError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let verdict: VerifyResponse = resp.json().await?;
        Ok(verdict.valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn send_code_posts_recipient_with_bearer_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/otp/send")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({"recipient": "a@example.com"})))
            .with_status(202)
            .create_async()
            .await;

        let client =
            OtpClient::new(&format!("{}/", server.url()), Some("secret"), TIMEOUT).unwrap();
        client.send_code("a@example.com").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn verify_code_reads_verdict() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/otp/verify")
            .match_body(Matcher::Json(
                json!({"recipient": "a@example.com", "code": "123456"}),
            ))
            .with_status(200)
            .with_body(r#"{"valid": false}"#)
            .create_async()
            .await;

        let client = OtpClient::new(&server.url(), None, TIMEOUT).unwrap();
        assert!(!client.verify_code("a@example.com", "123456").await.unwrap());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn service_failure_is_an_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/otp/verify")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = OtpClient::new(&server.url(), None, TIMEOUT).unwrap();
        let err = client.verify_code("a@example.com", "1").await.unwrap_err();

        assert!(matches!(err, OtpError::Api { status: 500, .. }));
        mock.assert_async().await;
    }
}
