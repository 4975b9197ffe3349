// src/checker/http.rs
// =============================================================================
// This module owns the HTTP client shared by every worker.
//
// Key functionality:
// - One reqwest client for the whole run (connection pooling is internal,
//   so workers never need a lock to use it)
// - Large idle pool per host: a sitemap crawl hammers a single host with
//   hundreds of concurrent requests
// - A generous per-request timeout: slow pages get reported, not aborted
//   early, but a dead host still can't stall the run forever
// - Every request carries our User-Agent
//
// There are two underlying clients:
// - `pages` never follows redirects, so a 301 on a listed URL is visible
//   to the checker and can be reported
// - `documents` follows redirects, for sitemaps and canonical validation
//
// Rust concepts:
// - Clone: reqwest::Client is an Arc internally, so cloning is cheap
// - Result<T, E>: Network calls can fail in many ways
// =============================================================================

use reqwest::{redirect, Client, Response};
use std::time::Duration;

use crate::error::CrawlError;

/// Default User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "SitemapGuardian/1.0";

/// Default per-request timeout (pages can be very slow to render)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1500);

const DEFAULT_MAX_IDLE_PER_HOST: usize = 4000;
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const MAX_DOCUMENT_REDIRECTS: usize = 10;

// Settings for the shared HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_idle_per_host: DEFAULT_MAX_IDLE_PER_HOST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    pages: Client,
    documents: Client,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, CrawlError> {
        let pages = base_builder(config)
            .redirect(redirect::Policy::none())
            .build()?;
        let documents = base_builder(config)
            .redirect(redirect::Policy::limited(MAX_DOCUMENT_REDIRECTS))
            .build()?;

        Ok(Self { pages, documents })
    }

    // Downloads a sitemap (or any other document) as text
    //
    // Follows redirects. A non-2xx status is an error here: an HTML error
    // page is never a usable sitemap.
    pub async fn fetch_document(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.documents.get(url).send().await?.error_for_status()?;
        response.text().await
    }

    /// GET a listed page without following redirects
    pub async fn get_page(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.pages.get(url).send().await
    }

    /// HEAD a listed page without following redirects
    pub async fn head_page(&self, url: &str) -> Result<Response, reqwest::Error> {
        self.pages.head(url).send().await
    }

    // Checks that a canonical URL is reachable
    //
    // Returns true only for a final HTTP 200. Network failures mean
    // "not reachable" rather than an error.
    pub async fn validate_canonical(&self, url: &str) -> bool {
        match self.documents.head(url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::debug!(url, error = %e, "canonical validation failed");
                false
            }
        }
    }
}

// Reads at most `limit` bytes of a response body
//
// The rest of the body is never downloaded. Bytes that aren't valid UTF-8
// (or a character cut in half at the limit) are replaced, not rejected.
pub async fn read_body_prefix(mut response: Response, limit: usize) -> Result<String, reqwest::Error> {
    let mut body: Vec<u8> = Vec::new();
    while body.len() < limit {
        match response.chunk().await? {
            Some(chunk) => {
                let take = chunk.len().min(limit - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn base_builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(IDLE_TIMEOUT)
}

// Turns a reqwest error into a short human-readable reason
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
pub fn describe_error(error: &reqwest::Error) -> String {
    let error_string = error.to_string();
    let lowered = error_string.to_lowercase();

    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_redirect() {
        "Too many redirects".to_string()
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if lowered.contains("dns") {
            "Could not resolve hostname".to_string()
        } else {
            "Connection failed".to_string()
        }
    } else if lowered.contains("certificate") || lowered.contains("ssl") {
        "SSL certificate error".to_string()
    } else {
        error_string
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::new(&ClientConfig {
            timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_document_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client()
            .fetch_document(&format!("{}/sitemap.xml", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<urlset/>");
    }

    #[tokio::test]
    async fn test_read_body_prefix_stops_at_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(50_000)))
            .mount(&server)
            .await;

        let response = client().get_page(&server.uri()).await.unwrap();
        assert_eq!(read_body_prefix(response, 1_000).await.unwrap().len(), 1_000);

        let response = client().get_page(&server.uri()).await.unwrap();
        assert_eq!(read_body_prefix(response, 100_000).await.unwrap().len(), 50_000);
    }

    #[tokio::test]
    async fn test_fetch_document_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client()
            .fetch_document(&format!("{}/missing.xml", server.uri()))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_page_does_not_follow_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;

        let response = client()
            .get_page(&format!("{}/old", server.uri()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 301);
    }

    #[tokio::test]
    async fn test_validate_canonical() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let client = client();
        assert!(client.validate_canonical(&format!("{}/ok", server.uri())).await);
        assert!(!client.validate_canonical(&format!("{}/gone", server.uri())).await);
    }

    #[tokio::test]
    async fn test_validate_canonical_unreachable_is_false() {
        // Nothing listens on port 9 (discard) on a test machine
        assert!(!client().validate_canonical("http://127.0.0.1:9/").await);
    }
}
