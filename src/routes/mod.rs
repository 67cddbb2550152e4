//! API Routes module for the Anime Gateway API
//!
//! This module contains all HTTP route handlers for the public API
//! endpoints. Handlers compose the fetcher, the parsers and the upstream
//! clients, and surface classified failures through [`AppError`].

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::time::Instant;
use tracing::info;
use utoipa::{IntoParams, OpenApi, ToSchema};

use crate::cache::{self, SuggestionsCache};
use crate::clients::ApiClient;
use crate::config::Config;
use crate::constants::{endpoints, DETAIL_PAGE_MARKER};
use crate::error::{AppError, AppResult};
use crate::models::{
    AnimeDetail, AnimeSummary, ApiError, ApiResponse, EpisodeLinks, ResolvedLinks,
    SuggestionEntry,
};
use crate::parser;
use crate::scraper::Scraper;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub scraper: Scraper,
    pub api: ApiClient,
    pub suggestions: SuggestionsCache,
}

/// Query parameters for the episode-links endpoint
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchAnimeQuery {
    /// Anime name to look up (required)
    pub animename: Option<String>,
    /// Episode number, defaults to "1"
    pub episode: Option<String>,
}

/// Query parameters for endpoints taking a page URL
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PageUrlQuery {
    /// Target URL (required)
    pub url: Option<String>,
}

fn require_param<'a>(value: &'a Option<String>, message: &str) -> Result<&'a str, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim()),
        _ => Err(AppError::validation(message)),
    }
}

/// GET /api/search-anime - Episode download links from the episode API
///
/// The validated upstream payload is proxied through as-is.
#[utoipa::path(
    get,
    path = "/api/search-anime",
    tag = "anime",
    params(SearchAnimeQuery),
    responses(
        (status = 200, description = "Episode links retrieved successfully", body = EpisodeLinks),
        (status = 400, description = "Anime name is required", body = ApiError),
        (status = 404, description = "Anime or episode not found", body = ApiError),
        (status = 503, description = "No response from the episode API", body = ApiError)
    )
)]
pub async fn search_anime(
    data: web::Data<AppState>,
    query: web::Query<SearchAnimeQuery>,
) -> AppResult<HttpResponse> {
    let anime = require_param(&query.animename, "Anime name is required")?;
    let episode = query
        .episode
        .as_deref()
        .map(str::trim)
        .filter(|ep| !ep.is_empty())
        .unwrap_or("1");

    info!("Fetching episode links for {} ep {}", anime, episode);
    let links = data
        .api
        .episode_links(&data.config.episode_api_url, anime, episode)
        .await?;

    Ok(HttpResponse::Ok().json(links))
}

/// GET /api/anime-info - Extract a detail record from a detail page
#[utoipa::path(
    get,
    path = "/api/anime-info",
    tag = "anime",
    params(PageUrlQuery),
    responses(
        (status = 200, description = "Anime detail extracted successfully", body = ApiResponse<AnimeDetail>),
        (status = 400, description = "Page URL is required", body = ApiError),
        (status = 404, description = "Page layout matched no extraction rule", body = ApiError)
    )
)]
pub async fn anime_info(
    data: web::Data<AppState>,
    query: web::Query<PageUrlQuery>,
) -> AppResult<HttpResponse> {
    let url = require_param(&query.url, "Anime page URL is required")?;
    let origin = &data.config.source_base_url;
    let url = parser::absolute_url(url, origin);

    info!("Fetching anime detail page: {}", url);
    let page = data.scraper.fetch_page(&url).await?;
    let detail = parser::parse_anime_detail(&page.html, origin)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(detail)))
}

/// GET /api/random-anime - Detail record from the random-entry endpoint
///
/// The random endpoint answers with a redirect chain that sometimes ends on
/// an interstitial stub; the fetcher settles on the real detail page before
/// extraction runs.
#[utoipa::path(
    get,
    path = "/api/random-anime",
    tag = "anime",
    responses(
        (status = 200, description = "Random anime detail extracted successfully", body = ApiResponse<AnimeDetail>),
        (status = 404, description = "Landed page matched no extraction rule", body = ApiError),
        (status = 503, description = "Source site unreachable", body = ApiError)
    )
)]
pub async fn random_anime(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let origin = &data.config.source_base_url;
    let url = endpoints::random(origin);

    info!("Fetching random anime");
    let page = data
        .scraper
        .fetch_page_settling(&url, DETAIL_PAGE_MARKER)
        .await?;
    info!("Random anime landed on {}", page.final_url);
    let detail = parser::parse_anime_detail(&page.html, origin)?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(detail)))
}

/// GET /api/new-releases - Summaries from the new-releases listing
#[utoipa::path(
    get,
    path = "/api/new-releases",
    tag = "anime",
    responses(
        (status = 200, description = "New releases retrieved successfully", body = ApiResponse<Vec<AnimeSummary>>),
        (status = 404, description = "Listing page yielded no usable records", body = ApiError)
    )
)]
pub async fn new_releases(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let origin = &data.config.source_base_url;
    let page = data
        .scraper
        .fetch_page(&endpoints::new_releases(origin))
        .await?;
    let items = parser::parse_anime_list(&page.html, origin)?;

    info!("Parsed {} new releases", items.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(items)))
}

/// GET /api/popular - Summaries from the popular listing
#[utoipa::path(
    get,
    path = "/api/popular",
    tag = "anime",
    responses(
        (status = 200, description = "Popular anime retrieved successfully", body = ApiResponse<Vec<AnimeSummary>>),
        (status = 404, description = "Listing page yielded no usable records", body = ApiError)
    )
)]
pub async fn popular(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    let origin = &data.config.source_base_url;
    let page = data.scraper.fetch_page(&endpoints::popular(origin)).await?;
    let items = parser::parse_anime_list(&page.html, origin)?;

    info!("Parsed {} popular anime", items.len());
    Ok(HttpResponse::Ok().json(ApiResponse::new(items)))
}

/// GET /api/suggestions - Random sample from the popular listing, cached
///
/// Serves the cached selection while it is fresh (3-minute TTL); on a miss
/// the popular page is scraped again and the cache state replaced wholesale.
#[utoipa::path(
    get,
    path = "/api/suggestions",
    tag = "anime",
    responses(
        (status = 200, description = "Suggestions retrieved successfully", body = ApiResponse<Vec<SuggestionEntry>>),
        (status = 404, description = "Popular page yielded no usable entries", body = ApiError)
    )
)]
pub async fn suggestions(data: web::Data<AppState>) -> AppResult<HttpResponse> {
    if let Some(entries) = data.suggestions.get(Instant::now()) {
        info!("Returning cached suggestions");
        return Ok(HttpResponse::Ok().json(ApiResponse::new(entries)));
    }

    let origin = &data.config.source_base_url;
    info!("Suggestions cache stale, scraping popular page");
    let page = data.scraper.fetch_page(&endpoints::popular(origin)).await?;
    let entries = parser::parse_suggestions(&page.html, origin)?;
    let picked = cache::sample_entries(entries, cache::SUGGESTIONS_COUNT);

    data.suggestions.set(picked.clone(), Instant::now());
    Ok(HttpResponse::Ok().json(ApiResponse::new(picked)))
}

/// GET /api/resolve-links - Direct media links for a landing-page URL
#[utoipa::path(
    get,
    path = "/api/resolve-links",
    tag = "anime",
    params(PageUrlQuery),
    responses(
        (status = 200, description = "Direct links resolved successfully", body = ResolvedLinks),
        (status = 400, description = "URL is required", body = ApiError),
        (status = 404, description = "No direct links could be resolved", body = ApiError)
    )
)]
pub async fn resolve_links(
    data: web::Data<AppState>,
    query: web::Query<PageUrlQuery>,
) -> AppResult<HttpResponse> {
    let url = require_param(&query.url, "URL to resolve is required")?;

    info!("Resolving direct links for {}", url);
    let resolved = data
        .api
        .resolve_links(&data.config.resolver_api_url, url)
        .await?;

    Ok(HttpResponse::Ok().json(resolved))
}

/// GET /api/image-proxy - Proxy an image through the gateway
///
/// Forwards the upstream Content-Type when present; when the upstream
/// omitted it, none is set and the browser infers the type.
#[utoipa::path(
    get,
    path = "/api/image-proxy",
    tag = "anime",
    params(PageUrlQuery),
    responses(
        (status = 200, description = "Image bytes proxied successfully"),
        (status = 400, description = "Image URL is required", body = ApiError),
        (status = 503, description = "No response from the image source", body = ApiError)
    )
)]
pub async fn image_proxy(
    data: web::Data<AppState>,
    query: web::Query<PageUrlQuery>,
) -> AppResult<HttpResponse> {
    let url = require_param(&query.url, "Image URL is required")?;

    let (content_type, body) = data.scraper.fetch_bytes(url).await?;

    let mut response = HttpResponse::Ok();
    if let Some(content_type) = content_type {
        response.insert_header(("Content-Type", content_type));
    }
    Ok(response.body(body))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Anime Gateway API",
        version = "0.1.0",
        description = "Gateway that scrapes anime metadata from the source site and proxies episode and link-resolver APIs"
    ),
    paths(
        search_anime,
        anime_info,
        random_anime,
        new_releases,
        popular,
        suggestions,
        resolve_links,
        image_proxy
    ),
    components(
        schemas(
            AnimeDetail,
            AnimeSummary,
            SuggestionEntry,
            EpisodeLinks,
            ResolvedLinks,
            ApiError,
            SearchAnimeQuery,
            PageUrlQuery
        )
    ),
    tags(
        (name = "anime", description = "Anime data endpoints")
    )
)]
pub struct ApiDoc;

/// Configure API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/search-anime", web::get().to(search_anime))
            .route("/anime-info", web::get().to(anime_info))
            .route("/random-anime", web::get().to(random_anime))
            .route("/new-releases", web::get().to(new_releases))
            .route("/popular", web::get().to(popular))
            .route("/suggestions", web::get().to(suggestions))
            .route("/resolve-links", web::get().to(resolve_links))
            .route("/image-proxy", web::get().to(image_proxy)),
    );
}
