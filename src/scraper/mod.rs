//! Scraper module for fetching HTML content from the source site
//!
//! Provides the page fetcher: a reqwest client with a fixed desktop-browser
//! User-Agent that follows up to five redirects, reports the URL it finally
//! landed on, and detects interstitial redirect stubs on entry points that
//! are known to redirect (the random endpoint).

use reqwest::{redirect, Client};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Fixed desktop-browser identification sent with every page fetch
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Bodies shorter than this after a redirect are candidate interstitial stubs
const STUB_BODY_THRESHOLD: usize = 1000;

/// Redirects followed transparently per fetch
const MAX_REDIRECTS: usize = 5;

/// Errors that can occur during scraping operations
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Network-related errors (connection timeout, DNS failure, etc.)
    #[error("Failed to connect to server: {0}")]
    NetworkError(String),

    /// HTTP non-success status code errors
    #[error("Server returned status {0}")]
    HttpError(u16),

    /// Error reading response body
    #[error("Failed to read response body: {0}")]
    ResponseError(String),
}

/// Result of a successful page fetch
#[derive(Debug)]
pub struct FetchedPage {
    /// The URL the request finally landed on after redirects
    pub final_url: String,
    /// The HTML content of the page
    pub html: String,
}

/// True when a response looks like an interstitial stub rather than content
///
/// Some redirect targets are not followed transparently by the transport
/// layer (content negotiation, JavaScript redirects); the giveaway is a
/// short body on a changed URL that lacks the expected content marker.
fn is_redirect_stub(requested: &str, landed: &str, body: &str, marker: &str) -> bool {
    landed != requested && body.len() < STUB_BODY_THRESHOLD && !body.contains(marker)
}

/// HTTP client for fetching pages from the source site
pub struct Scraper {
    client: Client,
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper {
    /// Create a new Scraper with the fixed redirect policy and timeouts
    pub fn new() -> Self {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Fetch a page, returning the landed URL alongside the body
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpError(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;

        Ok(FetchedPage { final_url, html })
    }

    /// Fetch an entry point known to redirect, settling on the real page
    ///
    /// When the first response is an interstitial stub (see
    /// [`is_redirect_stub`]), the landed URL is fetched once more explicitly
    /// and its body replaces the stub. `marker` is a substring present on
    /// every real content page.
    pub async fn fetch_page_settling(
        &self,
        url: &str,
        marker: &str,
    ) -> Result<FetchedPage, ScraperError> {
        let first = self.fetch_page(url).await?;

        if is_redirect_stub(url, &first.final_url, &first.html, marker) {
            debug!(
                final_url = %first.final_url,
                body_len = first.html.len(),
                "Landed on a redirect stub, re-fetching the final URL"
            );
            return self.fetch_page(&first.final_url).await;
        }

        Ok(first)
    }

    /// Fetch raw bytes, for proxying images to the local client
    ///
    /// Returns the upstream Content-Type when the upstream sent one.
    pub async fn fetch_bytes(
        &self,
        url: &str,
    ) -> Result<(Option<String>, Vec<u8>), ScraperError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpError(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| ScraperError::ResponseError(e.to_string()))?;

        Ok((content_type, body.to_vec()))
    }
}

fn map_send_error(e: reqwest::Error) -> ScraperError {
    if e.is_timeout() {
        ScraperError::NetworkError("Connection timeout".to_string())
    } else if e.is_connect() {
        ScraperError::NetworkError("Failed to connect to server".to_string())
    } else {
        ScraperError::NetworkError(e.to_string())
    }
}
