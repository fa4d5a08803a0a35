use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use quiz_core::model::ScoreReport;

use super::reporter::ScoreReporter;
use crate::error::{ConfigError, ReportError};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Location of and credentials for the remote score endpoints.
#[derive(Clone, Debug)]
pub struct ScoreApiConfig {
    base_url: Url,
    token: Option<String>,
}

impl ScoreApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            raw: base_url.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: parsed,
            token: None,
        })
    }

    /// Bearer token sent with every request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads `QUIZ_API_BASE_URL` and `QUIZ_API_TOKEN`.
    ///
    /// Returns `Ok(None)` when no token is set: the endpoints require one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` for an unparsable base URL.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(token) = lookup("QUIZ_API_TOKEN").filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let base_url = lookup("QUIZ_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        Ok(Some(Self::new(&base_url)?.with_token(token)))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// One row of the remote score history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteScore {
    pub score: u32,
    pub total: u32,
    #[serde(default, alias = "date", alias = "timestamp")]
    pub created_at: Option<String>,
}

/// Reports scores to `POST /api/quiz/save` and reads `GET /api/quiz/my-scores`.
#[derive(Clone)]
pub struct HttpScoreReporter {
    client: Client,
    config: Option<ScoreApiConfig>,
}

impl HttpScoreReporter {
    /// # Errors
    ///
    /// Returns `ConfigError` if the environment holds an invalid base URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(ScoreApiConfig::from_env()?))
    }

    #[must_use]
    pub fn new(config: Option<ScoreApiConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Fetch the signed-in player's score history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` when disabled, on transport failure, or on a
    /// non-success status.
    pub async fn fetch_history(&self) -> Result<Vec<RemoteScore>, ReportError> {
        let config = self.config.as_ref().ok_or(ReportError::Disabled)?;
        let mut request = self.client.get(config.endpoint("api/quiz/my-scores"));
        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ReportError::HttpStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ScoreReporter for HttpScoreReporter {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn report(&self, report: ScoreReport) -> Result<(), ReportError> {
        let config = self.config.as_ref().ok_or(ReportError::Disabled)?;
        let mut request = self
            .client
            .post(config.endpoint("api/quiz/save"))
            .json(&report);
        if let Some(token) = &config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ReportError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, replies with `status` and `body`, and returns
    /// the raw request it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0_u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&raw) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).into_owned()
        });

        (base, task)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..split]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        text.len() >= split + 4 + length
    }

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[tokio::test]
    async fn posts_score_json_with_bearer_token() {
        let (base, server) = serve_once("200 OK", r#"{"message":"saved"}"#).await;
        let config = ScoreApiConfig::new(&base).unwrap().with_token("secret");
        let reporter = HttpScoreReporter::new(Some(config));

        reporter
            .report(ScoreReport::new(8, 10).unwrap())
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/quiz/save HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json, serde_json::json!({"score": 8, "total": 10}));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, server) = serve_once("500 Internal Server Error", "{}").await;
        let reporter = HttpScoreReporter::new(Some(ScoreApiConfig::new(&base).unwrap()));

        let err = reporter
            .report(ScoreReport::new(1, 10).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::HttpStatus(status) if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn disabled_reporter_does_not_send() {
        let reporter = HttpScoreReporter::new(None);
        assert!(!reporter.enabled());
        let err = reporter
            .report(ScoreReport::new(1, 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Disabled));
    }

    #[tokio::test]
    async fn fetches_history_with_alternate_timestamp_keys() {
        let body = r#"[
            {"score": 9, "total": 10, "created_at": "2025-01-02T10:00:00"},
            {"score": 4, "total": 10, "date": "2025-01-01"},
            {"score": 2, "total": 10}
        ]"#;
        let (base, server) = serve_once("200 OK", body).await;
        let reporter = HttpScoreReporter::new(Some(
            ScoreApiConfig::new(&base).unwrap().with_token("t"),
        ));

        let history = reporter.fetch_history().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/quiz/my-scores HTTP/1.1"));
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].created_at.as_deref(), Some("2025-01-02T10:00:00"));
        assert_eq!(history[1].created_at.as_deref(), Some("2025-01-01"));
        assert_eq!(history[2].created_at, None);
    }

    #[test]
    fn config_requires_a_token() {
        let none = ScoreApiConfig::from_lookup(lookup(&[])).unwrap();
        assert!(none.is_none());

        let blank = ScoreApiConfig::from_lookup(lookup(&[("QUIZ_API_TOKEN", "  ")])).unwrap();
        assert!(blank.is_none());
    }

    #[test]
    fn config_defaults_base_url_and_trims_slashes() {
        let config = ScoreApiConfig::from_lookup(lookup(&[("QUIZ_API_TOKEN", "abc")]))
            .unwrap()
            .unwrap();
        assert_eq!(config.base_url().as_str(), "http://127.0.0.1:8000/");
        assert_eq!(
            config.endpoint("api/quiz/save"),
            "http://127.0.0.1:8000/api/quiz/save"
        );
    }

    #[test]
    fn config_rejects_relative_base_url() {
        let err = ScoreApiConfig::from_lookup(lookup(&[
            ("QUIZ_API_TOKEN", "abc"),
            ("QUIZ_API_BASE_URL", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}
