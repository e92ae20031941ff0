//! Remote catalog access.
//!
//! [`CatalogClient`] is the seam between the reconciliation logic and the network:
//! [`HttpCatalogClient`] talks to the real catalog, tests substitute fakes or the
//! generated `MockCatalogClient`.
//!
//! A catalog addon lists files for every flavor of a game. [`apply_flavor_filter`]
//! keeps only the files usable by one flavor; an addon with no such file is treated
//! as absent rather than as an error.

pub mod http;

pub use http::HttpCatalogClient;

use crate::models::{AddonInfo, GameInfo, SortOrder};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from catalog requests
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Catalog has no {what} with id {id}")]
    NotFound { what: &'static str, id: u32 },

    #[error("Unexpected catalog response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Invalid catalog URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Parameters of a catalog search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub game_id: u32,
    pub flavor: String,
    pub game_version: String,
    pub page_size: u32,
    pub sort: SortOrder,
}

impl SearchQuery {
    pub fn new(query: &str, game_id: u32, flavor: &str) -> Self {
        Self {
            query: query.to_string(),
            game_id,
            flavor: flavor.to_string(),
            game_version: String::new(),
            page_size: 50,
            sort: SortOrder::default(),
        }
    }
}

/// Lookups the core needs from the remote catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Game metadata, including location hints and category sections.
    async fn game_info(&self, game_id: u32) -> Result<GameInfo, CatalogError>;

    /// One addon, filtered to `flavor`. `Ok(None)` when no file matches the flavor.
    async fn addon(&self, addon_id: u32, flavor: &str) -> Result<Option<AddonInfo>, CatalogError>;

    /// Search results, each filtered to the query's flavor; addons without a
    /// matching file are dropped.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<AddonInfo>, CatalogError>;
}

/// Keep only files without a flavor or with the requested one, newest first.
///
/// Returns `None` when no file is left.
pub fn apply_flavor_filter(mut addon: AddonInfo, flavor: &str) -> Option<AddonInfo> {
    addon.latest_files.retain(|file| {
        file.flavor
            .as_deref()
            .filter(|f| !f.is_empty())
            .is_none_or(|f| f == flavor)
    });

    if addon.latest_files.is_empty() {
        return None;
    }

    addon
        .latest_files
        .sort_by(|a, b| b.file_date.cmp(&a.file_date));
    Some(addon)
}
