//! Anime Gateway API Library
//!
//! This library scrapes anime metadata from the source site, proxies two
//! third-party JSON APIs (episode links and a link resolver), normalizes
//! everything into a stable schema and re-serves it over REST.

pub mod cache;
pub mod clients;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod routes;
pub mod scraper;
