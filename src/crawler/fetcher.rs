//! Fetch sessions
//!
//! The fetch capability behind the crawl: given a URL, return fully
//! rendered HTML or a classified error. Each worker task gets its own
//! session with a freshly built client, a user agent drawn at random from
//! the configured pool, and a fixed referer header; sessions are never
//! shared across tasks, to reduce fingerprinting correlation.

use crate::config::SessionConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors a fetch attempt can fail with
///
/// The retry loop branches on the result rather than catching anything;
/// every failure mode is an explicit variant.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Other(String),

    #[error("Failed to build session client: {0}")]
    Client(String),
}

/// An exclusive rendering session for one task
///
/// Implementations fetch fully rendered HTML for a URL or fail. The trait
/// is object-safe so tests can script sessions without a network.
#[async_trait]
pub trait FetchSession: Send + Sync {
    /// Fetches a URL and returns the page HTML
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Creates fresh, isolated sessions on demand
pub trait SessionFactory: Send + Sync {
    /// Builds a new session; called once per worker task
    fn create(&self) -> Result<Box<dyn FetchSession>, FetchError>;
}

/// Factory for HTTP-backed sessions
pub struct HttpSessionFactory {
    config: SessionConfig,
    referer: String,
}

impl HttpSessionFactory {
    /// Creates a factory from session configuration and the effective
    /// referer (already resolved from config or the start URL origin)
    pub fn new(config: SessionConfig, referer: String) -> Self {
        Self { config, referer }
    }
}

impl SessionFactory for HttpSessionFactory {
    fn create(&self) -> Result<Box<dyn FetchSession>, FetchError> {
        let user_agent =
            &self.config.user_agents[fastrand::usize(..self.config.user_agents.len())];

        let mut headers = HeaderMap::new();
        if !self.referer.is_empty() {
            let value = HeaderValue::from_str(&self.referer)
                .map_err(|e| FetchError::Client(e.to_string()))?;
            headers.insert(REFERER, value);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Box::new(HttpSession { client }))
    }
}

/// One reqwest client, owned by one task for its lifetime
struct HttpSession {
    client: Client,
}

#[async_trait]
impl FetchSession for HttpSession {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Connect(error.to_string())
    } else {
        FetchError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> SessionConfig {
        SessionConfig {
            referer: String::new(),
            user_agents: vec!["TestAgent/1.0".to_string()],
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        }
    }

    #[test]
    fn test_factory_builds_session() {
        let factory =
            HttpSessionFactory::new(test_config(), "https://example.com/".to_string());
        assert!(factory.create().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let factory = HttpSessionFactory::new(test_config(), String::new());
        let session = factory.create().unwrap();
        let body = session.fetch(&format!("{}/page", server.uri())).await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "TestAgent/1.0"))
            .and(header("referer", "https://catalog.example.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let factory = HttpSessionFactory::new(
            test_config(),
            "https://catalog.example.com/".to_string(),
        );
        let session = factory.create().unwrap();
        session.fetch(&format!("{}/page", server.uri())).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let factory = HttpSessionFactory::new(test_config(), String::new());
        let session = factory.create().unwrap();
        let error = session
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(error, FetchError::Status { status: 404 }));
    }
}
