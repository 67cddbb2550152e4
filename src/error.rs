//! Global error handling module for the Anime Gateway API
//!
//! Unifies the per-module error types into one application error that maps
//! onto HTTP responses with a consistent JSON structure. Failures are
//! classified at the component boundaries (`scraper`, `parser`, `clients`)
//! and only typed results cross them; this module decides the status code
//! and the user-facing message.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::clients::ClientError;
use crate::models::ApiError;
use crate::parser::ParseError;
use crate::scraper::ScraperError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Page-fetch errors (network, HTTP status, body read)
    #[error("Scraping error: {0}")]
    Scraping(#[from] ScraperError),

    /// Extraction errors (layout mismatch, empty result)
    #[error("Extraction error: {0}")]
    Extraction(#[from] ParseError),

    /// Upstream API errors, already classified at the client boundary
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    /// Invalid input (missing required parameter)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Get the HTTP status code for this error
    ///
    /// 4xx means the client should not retry identically; 503 and the 5xx
    /// pass-throughs signal an upstream or transport issue where retrying
    /// later is reasonable.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            AppError::Extraction(ParseError::ScrapeFailed)
            | AppError::Extraction(ParseError::NoResultsFound) => StatusCode::NOT_FOUND,

            AppError::Upstream(client_err) => match client_err {
                ClientError::NotFound(_) | ClientError::NoLinksResolved => StatusCode::NOT_FOUND,
                ClientError::InvalidUpstreamFormat => StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                // Pass the upstream's own status through where possible.
                ClientError::UpstreamError { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
            },

            AppError::Scraping(scraper_err) => match scraper_err {
                ScraperError::NetworkError(_) => StatusCode::SERVICE_UNAVAILABLE,
                ScraperError::HttpError(status) => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                ScraperError::ResponseError(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),

            AppError::Extraction(ParseError::ScrapeFailed) => {
                "Anime details could not be extracted from the page".to_string()
            }
            AppError::Extraction(ParseError::NoResultsFound) => "No results found".to_string(),

            AppError::Upstream(client_err) => match client_err {
                ClientError::NotFound(msg) => msg.clone(),
                ClientError::NoLinksResolved => {
                    "No downloadable links could be resolved for this URL".to_string()
                }
                ClientError::InvalidUpstreamFormat => {
                    "Received invalid data format from the anime API".to_string()
                }
                ClientError::UpstreamUnavailable(_) => {
                    "Service unavailable: no response from the external anime service".to_string()
                }
                ClientError::UpstreamError { message, .. } => message.clone(),
            },

            AppError::Scraping(scraper_err) => match scraper_err {
                ScraperError::NetworkError(msg) => {
                    format!("Failed to connect to the source site: {}", msg)
                }
                ScraperError::HttpError(status) => {
                    format!("Source site returned error status: {}", status)
                }
                ScraperError::ResponseError(_) => {
                    "Failed to read response from the source site".to_string()
                }
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiError::new(self.user_message()))
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;
