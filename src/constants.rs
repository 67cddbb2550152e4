//! Constants module for the Anime Gateway API
//!
//! Contains endpoint URL builders that take their base URLs from
//! configuration, plus fixed markers used by the fetcher.

/// Class name present on every real detail page; its absence from a short
/// redirected body marks an interstitial stub
pub const DETAIL_PAGE_MARKER: &str = "infotitle";

/// URL builder functions for the consumed upstreams
pub mod endpoints {
    /// New-releases listing page
    pub fn new_releases(base_url: &str) -> String {
        format!("{}/new.php", base_url)
    }

    /// Popular listing page
    pub fn popular(base_url: &str) -> String {
        format!("{}/popular.php", base_url)
    }

    /// Random-entry endpoint; redirects to a detail page
    pub fn random(base_url: &str) -> String {
        format!("{}/random.php", base_url)
    }

    /// Episode download-links API
    pub fn episode_api(base_url: &str, anime: &str, episode: &str) -> String {
        format!(
            "{}/api/episode?anime={}&ep={}",
            base_url,
            urlencoding::encode(anime),
            urlencoding::encode(episode)
        )
    }

    /// Landing-page link resolver API
    pub fn resolver(base_url: &str, page_url: &str) -> String {
        format!("{}/resolvex?url={}", base_url, urlencoding::encode(page_url))
    }
}

#[cfg(test)]
mod tests {
    use super::endpoints;

    #[test]
    fn test_episode_api_encodes_query_values() {
        let url = endpoints::episode_api("https://api.example", "One Piece", "1");
        assert_eq!(url, "https://api.example/api/episode?anime=One%20Piece&ep=1");
    }

    #[test]
    fn test_resolver_encodes_page_url() {
        let url = endpoints::resolver("https://api.example", "https://pahe.example/play/1?x=2");
        assert!(url.starts_with("https://api.example/resolvex?url=https%3A%2F%2F"));
        assert!(!url.contains("play/1?x"));
    }

    #[test]
    fn test_listing_builders() {
        assert_eq!(endpoints::new_releases("https://s"), "https://s/new.php");
        assert_eq!(endpoints::popular("https://s"), "https://s/popular.php");
        assert_eq!(endpoints::random("https://s"), "https://s/random.php");
    }
}
