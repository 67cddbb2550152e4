//! Data models for the Anime Gateway API
//!
//! Every record served to clients is fully shaped: a field that could not be
//! extracted is encoded with its documented default from [`defaults`], never
//! by omitting the key.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Documented default values for fields absent from the source markup
pub mod defaults {
    /// Detail-page title when no title rule matched
    pub const TITLE_MISSING: &str = "Title not found";
    /// Japanese/alternate title when absent
    pub const JAPANESE_MISSING: &str = "Not available";
    /// Synopsis when absent
    pub const SUMMARY_MISSING: &str = "Summary not available.";
    /// Episode count, year, rating, tags when absent
    pub const UNKNOWN: &str = "N/A";
    /// Summary id when the source link carries no query fragment
    pub const UNKNOWN_ID: &str = "unknown";
    /// Image shown for list entries without a usable thumbnail
    pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/225x318?text=No+Image";
}

/// Full metadata record extracted from one detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetail {
    /// From div.infotitle, falling back to h1.entry-title and og:title
    pub english_name: String,
    /// From div.infotitlejp
    pub japanese_name: String,
    /// From div.infodes, falling back to og:description
    pub summary: String,
    /// Absolute poster URL, empty when no rule matched
    pub poster: String,
    /// Episode count text (e.g. "24")
    pub episodes: String,
    /// Release year text
    pub year: String,
    /// Score text from the detail page
    pub rating: String,
    /// Genre tags; never empty, defaults to a single "N/A" entry
    pub tags: Vec<String>,
}

/// One entry from a listing page (new releases, popular)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnimeSummary {
    /// Query fragment of the detail link (e.g. "one-piece"), "unknown" if absent
    pub id: String,
    /// Absolute URL of the detail page
    pub link: String,
    /// Absolute thumbnail URL or the fixed placeholder
    pub image: String,
    /// Required; blocks without it are dropped during extraction
    pub english_name: String,
    /// Japanese title, "Not available" if absent
    pub japanese_name: String,
    /// Freshness label from the listing (e.g. "12 hours ago")
    pub time: String,
}

/// One entry served by the suggestions endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionEntry {
    /// Absolute thumbnail URL or the fixed placeholder
    pub image: String,
    /// Display name; entries without one are filtered out
    pub english_name: String,
    /// Japanese title, "Not available" if absent
    pub japanese_name: String,
    /// Absolute URL of the detail page; entries without one are filtered out
    pub link: String,
}

/// Episode download links proxied from the episode API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeLinks {
    /// Upstream's title for the matched anime
    pub title: String,
    /// Sub/dub link groups
    pub links: EpisodeLinkGroups,
}

/// Label-to-URL maps for subtitled and dubbed downloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeLinkGroups {
    /// Subtitled downloads, keyed by quality/server label
    #[serde(default)]
    pub sub: HashMap<String, String>,
    /// Dubbed downloads, keyed by quality/server label
    #[serde(default)]
    pub dub: HashMap<String, String>,
}

/// Direct media links resolved from an intermediate landing page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLinks {
    /// Kwik player link, if the resolver produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kwik_link: Option<String>,
    /// Direct mp4 link, if the resolver produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp4_link: Option<String>,
}

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was fetched
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
