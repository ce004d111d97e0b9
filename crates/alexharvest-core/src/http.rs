//! Blocking HTTP transport over a shared async reqwest client.
//!
//! Uses async reqwest internally, driven by a shared tokio runtime,
//! but presents a sync interface so rayon workers and sequential crawls
//! can call it directly.

use std::sync::LazyLock;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{FetchError, FetchOutcome};

/// Per-request timeouts and pool sizing
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            pool_max_idle_per_host: 8,
        }
    }
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Raw response: final URL (with query string), status and body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body, classifying non-success statuses and bad JSON.
    pub fn json<T: DeserializeOwned>(&self) -> FetchOutcome<T> {
        if !self.is_success() {
            return FetchOutcome::from_error(FetchError::Status {
                url: self.url.clone(),
                status: self.status,
            });
        }
        match serde_json::from_str(&self.body) {
            Ok(v) => FetchOutcome::Success(v),
            Err(e) => FetchOutcome::from_error(FetchError::Decode {
                url: self.url.clone(),
                message: e.to_string(),
            }),
        }
    }
}

/// One blocking GET against the upstream API.
///
/// Implementations return `Err` only when no response was received;
/// a non-success status is still an `Ok(HttpResponse)`.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, FetchError>;
}

/// GET + decode in one step
pub fn get_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    query: &[(&str, String)],
) -> FetchOutcome<T> {
    match transport.get(url, query) {
        Ok(resp) => resp.json(),
        Err(e) => FetchOutcome::from_error(e),
    }
}

/// `Transport` backed by reqwest, with an optional bearer token.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token
        f.debug_struct("ReqwestTransport")
            .field("authenticated", &self.bearer_token.is_some())
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig, bearer_token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;
        Ok(Self {
            client,
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
        })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, FetchError> {
        SHARED_RUNTIME.handle().block_on(async {
            let mut request = self.client.get(url).query(query);
            if let Some(token) = &self.bearer_token {
                request = request.bearer_auth(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;

            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let body = response
                .text()
                .await
                .map_err(|e| FetchError::from_reqwest(&final_url, &e))?;

            Ok(HttpResponse {
                url: final_url,
                status,
                body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            url: "https://api.test/authors".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn json_success() {
        let out: FetchOutcome<serde_json::Value> = response(200, r#"{"a": 1}"#).json();
        assert_eq!(out.ok().unwrap()["a"], 1);
    }

    #[test]
    fn json_non_success_status() {
        let out: FetchOutcome<serde_json::Value> = response(503, "busy").json();
        match out {
            FetchOutcome::Retryable(FetchError::Status { status, url }) => {
                assert_eq!(status, 503);
                assert_eq!(url, "https://api.test/authors");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn json_bad_body_is_decode_error() {
        let out: FetchOutcome<serde_json::Value> = response(200, "<html>").json();
        assert!(matches!(
            out,
            FetchOutcome::Retryable(FetchError::Decode { .. })
        ));
    }

    #[test]
    fn debug_hides_token() {
        let t = ReqwestTransport::new(&HttpConfig::default(), Some("secret".into())).unwrap();
        let dbg = format!("{t:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("authenticated: true"));
    }

    #[test]
    fn empty_token_is_ignored() {
        let t = ReqwestTransport::new(&HttpConfig::default(), Some(String::new())).unwrap();
        assert!(t.bearer_token.is_none());
    }
}
