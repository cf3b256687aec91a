// src/utils/http.rs

//! HTTP client utilities.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::Config;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &Config) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

/// Source of response bodies for the site checks.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL and return the body as text. Non-success statuses are errors.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(create_async_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        log::debug!("GET {} -> {}", url, response.status());
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_text_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/homes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new());
        let body = fetcher
            .fetch_text(&format!("{}/homes", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Client::new());
        let err = fetcher.fetch_text(&server.uri()).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
    }

    #[test]
    fn test_create_client_from_config() {
        let config = Config::from_toml_str(crate::models::MINIMAL_CONFIG).unwrap();
        assert!(HttpFetcher::from_config(&config).is_ok());
    }
}
