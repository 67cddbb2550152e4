//! Clients for the third-party JSON upstreams
//!
//! Two upstreams are consumed: the episode-links API and the landing-page
//! link resolver. Both have inconsistent success/error shapes (the episode
//! API reports some misses as 200 OK with a `detail` message), so every
//! payload is classified into the typed error taxonomy here, at the
//! boundary, before any caller logic runs. Nothing is retried.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::constants::endpoints;
use crate::models::ResolvedLinks;

/// Errors classified from upstream API calls
#[derive(Error, Debug)]
pub enum ClientError {
    /// Upstream payload was not JSON or not an object
    #[error("Received invalid data format from the anime API")]
    InvalidUpstreamFormat,

    /// Upstream reported "not found", or the result was structurally empty
    #[error("{0}")]
    NotFound(String),

    /// The resolver produced neither a kwik nor an mp4 link
    #[error("No direct links could be resolved for this URL")]
    NoLinksResolved,

    /// Network-level failure, no response received
    #[error("No response from the external anime service: {0}")]
    UpstreamUnavailable(String),

    /// Upstream responded with a non-success status
    #[error("Upstream returned status {status}: {message}")]
    UpstreamError { status: u16, message: String },
}

/// HTTP client for the JSON upstreams
pub struct ApiClient {
    client: Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create a new client with default transport timeouts
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Fetch episode download links for an anime and classify the payload
    ///
    /// The returned payload is the upstream's own, proxied verbatim once it
    /// passes validation (shape documented by `models::EpisodeLinks`).
    pub async fn episode_links(
        &self,
        base_url: &str,
        anime: &str,
        episode: &str,
    ) -> Result<Value, ClientError> {
        let url = endpoints::episode_api(base_url, anime, episode);
        let payload = self.get_json(&url).await?;
        classify_episode_payload(payload, anime, episode)
    }

    /// Resolve an intermediate landing-page URL into direct media links
    pub async fn resolve_links(
        &self,
        base_url: &str,
        page_url: &str,
    ) -> Result<ResolvedLinks, ClientError> {
        let url = endpoints::resolver(base_url, page_url);
        let payload = self.get_json(&url).await?;
        classify_resolver_payload(payload)
    }

    /// GET a JSON payload, classifying transport and status failures
    async fn get_json(&self, url: &str) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::UpstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Pass the upstream's own detail message through when it sent one.
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| {
                    format!("Error from external anime API: status {}", status.as_u16())
                });
            return Err(ClientError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|_| ClientError::InvalidUpstreamFormat)
    }
}

/// Normalize the episode API's success/error shapes into a typed result
///
/// Classification order matches the upstream's conventions:
/// 1. non-object payload: invalid format;
/// 2. a `detail` message without title/links: the upstream's
///    200-OK-with-error shape, reported as not found;
/// 3. a title but neither sub nor dub links: not found;
/// 4. otherwise success, the payload passed through untouched.
fn classify_episode_payload(
    payload: Value,
    anime: &str,
    episode: &str,
) -> Result<Value, ClientError> {
    if !payload.is_object() {
        return Err(ClientError::InvalidUpstreamFormat);
    }

    let has_title = payload
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|title| !title.is_empty());
    let has_links = payload.get("links").is_some_and(Value::is_object);

    if let Some(detail) = payload.get("detail").and_then(Value::as_str) {
        if !has_title || !has_links {
            return Err(ClientError::NotFound(detail.to_string()));
        }
    }

    let group_has_entries = |group: &str| {
        payload
            .get("links")
            .and_then(|links| links.get(group))
            .and_then(Value::as_object)
            .is_some_and(|map| !map.is_empty())
    };

    if !has_title || !(group_has_entries("sub") || group_has_entries("dub")) {
        return Err(ClientError::NotFound(format!(
            "Anime \"{}\" episode {} not found or no download links available.",
            anime, episode
        )));
    }

    Ok(payload)
}

/// Validate a resolver payload; at least one direct link is required
fn classify_resolver_payload(payload: Value) -> Result<ResolvedLinks, ClientError> {
    if !payload.is_object() {
        return Err(ClientError::InvalidUpstreamFormat);
    }

    let resolved: ResolvedLinks =
        serde_json::from_value(payload).map_err(|_| ClientError::InvalidUpstreamFormat)?;

    if resolved.kwik_link.is_none() && resolved.mp4_link.is_none() {
        return Err(ClientError::NoLinksResolved);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_payload_is_invalid_format() {
        let result = classify_episode_payload(json!("oops"), "X", "1");
        assert!(matches!(result, Err(ClientError::InvalidUpstreamFormat)));

        let result = classify_episode_payload(json!(null), "X", "1");
        assert!(matches!(result, Err(ClientError::InvalidUpstreamFormat)));
    }

    #[test]
    fn test_detail_message_without_title_is_not_found() {
        let payload = json!({"detail": "not found"});
        match classify_episode_payload(payload, "NoSuchAnime", "1") {
            Err(ClientError::NotFound(msg)) => assert_eq!(msg, "not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_title_with_empty_link_groups_is_not_found() {
        // 200-level transport success, but no usable links.
        let payload = json!({"title": "X", "links": {"sub": {}, "dub": {}}});
        match classify_episode_payload(payload, "X", "1") {
            Err(ClientError::NotFound(msg)) => {
                assert!(msg.contains("X"));
                assert!(msg.contains("no download links"));
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_payload_is_proxied() {
        let payload = json!({
            "title": "Cowboy Bebop",
            "links": {
                "sub": {"720p": "https://dl.example/720"},
                "dub": {}
            }
        });

        let links = classify_episode_payload(payload, "Cowboy Bebop", "1").unwrap();
        assert_eq!(links["title"], "Cowboy Bebop");
        assert_eq!(links["links"]["sub"]["720p"], "https://dl.example/720");
    }

    #[test]
    fn test_valid_payload_keeps_unknown_upstream_keys() {
        let payload = json!({
            "title": "X",
            "links": {"sub": {"360p": "https://dl.example/360"}, "dub": {}},
            "session": "abc123",
            "total_episodes": 26
        });

        let proxied = classify_episode_payload(payload.clone(), "X", "1").unwrap();
        assert_eq!(proxied, payload);
        assert_eq!(proxied["session"], "abc123");
    }

    #[test]
    fn test_dub_only_payload_is_valid() {
        let payload = json!({
            "title": "X",
            "links": {"sub": {}, "dub": {"1080p": "https://dl.example/1080"}}
        });
        assert!(classify_episode_payload(payload, "X", "1").is_ok());
    }

    #[test]
    fn test_resolver_requires_at_least_one_link() {
        let result = classify_resolver_payload(json!({}));
        assert!(matches!(result, Err(ClientError::NoLinksResolved)));
    }

    #[test]
    fn test_resolver_accepts_single_link() {
        let resolved =
            classify_resolver_payload(json!({"mp4Link": "https://dl.example/ep1.mp4"})).unwrap();
        assert_eq!(resolved.mp4_link.as_deref(), Some("https://dl.example/ep1.mp4"));
        assert!(resolved.kwik_link.is_none());
    }

    #[test]
    fn test_resolver_non_object_is_invalid_format() {
        let result = classify_resolver_payload(json!([1, 2]));
        assert!(matches!(result, Err(ClientError::InvalidUpstreamFormat)));
    }
}
