use crate::core::ConfigProvider;
use crate::utils::error::Result;
use reqwest::{Client, StatusCode};

/// HTTP access to the two mirror directory endpoints.
///
/// Both fetches share one contract: the body is returned only for a
/// `200 OK` response with a non-empty body. Anything else, including
/// transport errors and timeouts, is logged and reported as an empty string
/// so the rest of the pipeline degrades to empty results.
pub struct MirrorsClient {
    client: Client,
    tier1_url: String,
    status_url: String,
}

impl MirrorsClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base = config.base_url().trim_end_matches('/');
        Ok(Self {
            client,
            tier1_url: format!("{}{}", base, config.tier1_path()),
            status_url: format!("{}{}", base, config.status_path()),
        })
    }

    pub fn tier1_url(&self) -> &str {
        &self.tier1_url
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    /// Tier 1 mirror page HTML, or `""` when it could not be fetched.
    pub async fn fetch_tier1_html(&self) -> String {
        self.fetch_document(&self.tier1_url).await
    }

    /// Raw mirror status JSON, or `""` when it could not be fetched.
    pub async fn fetch_status_json(&self) -> String {
        self.fetch_document(&self.status_url).await
    }

    async fn fetch_document(&self, url: &str) -> String {
        tracing::debug!("Making request to: {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::warn!("Request to {} timed out, treating as no data", url);
                return String::new();
            }
            Err(e) => {
                tracing::warn!("Request to {} failed: {}, treating as no data", url, e);
                return String::new();
            }
        };

        let status = response.status();
        tracing::debug!("Response status from {}: {}", url, status);

        // reqwest exposes only the status code; HTTP/2 carries no reason phrase.
        if status != StatusCode::OK {
            tracing::warn!("{} returned {}, treating as no data", url, status);
            return String::new();
        }

        match response.text().await {
            Ok(body) if body.is_empty() => {
                tracing::warn!("{} returned an empty body, treating as no data", url);
                String::new()
            }
            Ok(body) => {
                tracing::debug!("Fetched {} bytes from {}", body.len(), url);
                body
            }
            Err(e) => {
                tracing::warn!("Reading body from {} failed: {}, treating as no data", url, e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TomlConfig;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn config_for(server: &MockServer) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.source.base_url = server.base_url();
        config
    }

    #[tokio::test]
    async fn test_fetch_tier1_html_ok() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/mirrors/tier/1/");
                then.status(200)
                    .header("Content-Type", "text/html")
                    .body("<html><body>mirrors</body></html>");
            })
            .await;

        let client = MirrorsClient::new(&config_for(&server)).unwrap();
        let html = client.fetch_tier1_html().await;

        page.assert_async().await;
        assert_eq!(html, "<html><body>mirrors</body></html>");
    }

    #[tokio::test]
    async fn test_fetch_tier1_html_not_found_is_empty() {
        let server = MockServer::start_async().await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET).path("/mirrors/tier/1/");
                then.status(404).body("not found");
            })
            .await;

        let client = MirrorsClient::new(&config_for(&server)).unwrap();
        let html = client.fetch_tier1_html().await;

        page.assert_async().await;
        assert!(html.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_non_ok_success_status_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/mirrors/tier/1/");
                then.status(203).body("<html></html>");
            })
            .await;

        let client = MirrorsClient::new(&config_for(&server)).unwrap();
        assert!(client.fetch_tier1_html().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_ok_with_empty_body_is_empty() {
        let server = MockServer::start_async().await;
        let feed = server
            .mock_async(|when, then| {
                when.method(GET).path("/mirrors/status/json/");
                then.status(200).body("");
            })
            .await;

        let client = MirrorsClient::new(&config_for(&server)).unwrap();
        let json = client.fetch_status_json().await;

        feed.assert_async().await;
        assert!(json.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_status_json_gates_on_status() {
        let server = MockServer::start_async().await;
        let feed = server
            .mock_async(|when, then| {
                when.method(GET).path("/mirrors/status/json/");
                then.status(500).body(r#"{"urls": []}"#);
            })
            .await;

        let client = MirrorsClient::new(&config_for(&server)).unwrap();
        let json = client.fetch_status_json().await;

        feed.assert_async().await;
        assert!(json.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/mirrors/status/json/");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .body(r#"{"urls": []}"#);
            })
            .await;

        let mut config = config_for(&server);
        config.source.timeout_seconds = 1;
        let client = MirrorsClient::new(&config).unwrap();

        assert!(client.fetch_status_json().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_empty() {
        let mut config = TomlConfig::default();
        // Port 9 (discard) on loopback is not expected to accept connections.
        config.source.base_url = "http://127.0.0.1:9".to_string();
        let client = MirrorsClient::new(&config).unwrap();

        assert!(client.fetch_tier1_html().await.is_empty());
    }

    #[test]
    fn test_urls_join_base_and_paths() {
        let mut config = TomlConfig::default();
        config.source.base_url = "https://mirror.example/".to_string();
        let client = MirrorsClient::new(&config).unwrap();

        assert_eq!(client.tier1_url(), "https://mirror.example/mirrors/tier/1/");
        assert_eq!(client.status_url(), "https://mirror.example/mirrors/status/json/");
    }
}
