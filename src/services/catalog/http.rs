//! HTTP client for the addon catalog REST API.
//!
//! The catalog speaks camelCase JSON; the `Wire*` types below mirror it and are
//! converted into the stored model types right after decoding.

use super::{CatalogClient, CatalogError, SearchQuery, apply_flavor_filter};
use crate::models::{
    AddonFile, AddonInfo, CatalogSettings, CategorySection, GameFile, GameInfo, HintKind,
    LocationHint,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Catalog client backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|source| CatalogError::Http {
                url: settings.base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CatalogError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| CatalogError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| CatalogError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }
}

fn not_found_as(what: &'static str, id: u32) -> impl FnOnce(CatalogError) -> CatalogError {
    move |e| match e {
        CatalogError::Status { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            CatalogError::NotFound { what, id }
        }
        other => other,
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn game_info(&self, game_id: u32) -> Result<GameInfo, CatalogError> {
        let url = self.endpoint(&format!("game/{}", game_id))?;
        let wire: WireGame = self
            .get_json(url)
            .await
            .map_err(not_found_as("game", game_id))?;

        tracing::info!("Fetched catalog metadata for {} (id {})", wire.name, wire.id);
        Ok(wire.into())
    }

    async fn addon(&self, addon_id: u32, flavor: &str) -> Result<Option<AddonInfo>, CatalogError> {
        let url = self.endpoint(&format!("addon/{}", addon_id))?;
        let wire: WireAddon = self
            .get_json(url.clone())
            .await
            .map_err(not_found_as("addon", addon_id))?;

        let addon = wire.into_model(url.as_str())?;
        Ok(apply_flavor_filter(addon, flavor))
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<AddonInfo>, CatalogError> {
        let base = self.endpoint("addon/search")?;
        let url = Url::parse_with_params(
            base.as_str(),
            &[
                ("gameId", query.game_id.to_string()),
                ("searchFilter", query.query.clone()),
                ("gameVersion", query.game_version.clone()),
                ("pageSize", query.page_size.to_string()),
                ("sort", query.sort.wire_value().to_string()),
            ],
        )
        .map_err(|e| CatalogError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        let rows: Vec<WireAddon> = self.get_json(url.clone()).await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(addon) = apply_flavor_filter(row.into_model(url.as_str())?, &query.flavor) {
                results.push(addon);
            }
        }

        tracing::info!("Search '{}' returned {} addons", query.query, results.len());
        Ok(results)
    }
}

// Wire format

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGame {
    id: u32,
    name: String,
    slug: String,
    #[serde(default)]
    game_files: Vec<WireGameFile>,
    #[serde(default)]
    game_detection_hints: Vec<WireHint>,
    #[serde(default)]
    category_sections: Vec<WireCategorySection>,
    addon_settings_folder_filter: Option<String>,
    addon_settings_starting_folder: Option<String>,
    addon_settings_file_filter: Option<String>,
    addon_settings_file_removal_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGameFile {
    #[serde(default)]
    is_required: bool,
    file_name: String,
    #[serde(default)]
    file_type: u32,
    #[serde(default)]
    platform_type: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireHint {
    hint_type: u32,
    hint_path: String,
    hint_key: Option<String>,
    #[serde(default)]
    hint_options: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCategorySection {
    name: String,
    #[serde(default)]
    package_type: u32,
    path: String,
    #[serde(default)]
    initial_inclusion_pattern: String,
    extra_include_pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDependency {
    addon_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WireModule {
    foldername: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFile {
    id: u64,
    display_name: String,
    file_name: String,
    file_date: String,
    download_url: Option<String>,
    #[serde(default)]
    dependencies: Vec<WireDependency>,
    #[serde(default)]
    modules: Vec<WireModule>,
    project_id: u32,
    #[serde(default)]
    game_id: u32,
    #[serde(default)]
    game_version: Vec<String>,
    game_version_flavor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAddon {
    id: u32,
    name: String,
    #[serde(default)]
    authors: Vec<WireAuthor>,
    #[serde(default)]
    website_url: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    download_count: f64,
    #[serde(default)]
    latest_files: Vec<WireFile>,
    category_section: WireCategorySection,
    slug: String,
}

impl From<WireHint> for LocationHint {
    fn from(wire: WireHint) -> Self {
        Self {
            kind: HintKind::from(wire.hint_type),
            path: wire.hint_path,
            key: wire.hint_key,
            options: wire.hint_options,
        }
    }
}

impl From<WireCategorySection> for CategorySection {
    fn from(wire: WireCategorySection) -> Self {
        Self {
            name: wire.name,
            package_kind: wire.package_type,
            relative_path: wire.path,
            inclusion_pattern: wire.initial_inclusion_pattern,
            extra_include_pattern: wire.extra_include_pattern,
        }
    }
}

impl From<WireGame> for GameInfo {
    fn from(wire: WireGame) -> Self {
        Self {
            catalog_id: wire.id,
            name: wire.name,
            slug: wire.slug,
            game_files: wire
                .game_files
                .into_iter()
                .map(|f| GameFile {
                    is_required: f.is_required,
                    file_name: f.file_name,
                    file_type: f.file_type,
                    platform_type: f.platform_type,
                })
                .collect(),
            location_hints: wire.game_detection_hints.into_iter().map(Into::into).collect(),
            category_sections: wire.category_sections.into_iter().map(Into::into).collect(),
            addon_settings_folder_filter: wire.addon_settings_folder_filter,
            addon_settings_starting_folder: wire.addon_settings_starting_folder,
            addon_settings_file_filter: wire.addon_settings_file_filter,
            addon_settings_file_removal_filter: wire.addon_settings_file_removal_filter,
        }
    }
}

impl WireFile {
    fn into_model(self, url: &str) -> Result<AddonFile, CatalogError> {
        let file_date = parse_file_date(&self.file_date).ok_or_else(|| CatalogError::Decode {
            url: url.to_string(),
            reason: format!("file {} has unreadable date '{}'", self.id, self.file_date),
        })?;

        Ok(AddonFile {
            id: self.id,
            display_name: self.display_name,
            file_name: self.file_name,
            file_date,
            url: self.download_url.unwrap_or_default(),
            dependencies: self.dependencies.into_iter().filter_map(|d| d.addon_id).collect(),
            modules: self.modules.into_iter().map(|m| m.foldername).collect(),
            project_id: self.project_id,
            game_id: self.game_id,
            game_versions: self.game_version,
            flavor: self.game_version_flavor,
        })
    }
}

impl WireAddon {
    fn into_model(self, url: &str) -> Result<AddonInfo, CatalogError> {
        let latest_files = self
            .latest_files
            .into_iter()
            .map(|f| f.into_model(url))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AddonInfo {
            catalog_id: self.id,
            name: self.name,
            authors: self.authors.into_iter().map(|a| a.name).collect(),
            url: self.website_url,
            summary: self.summary,
            download_count: self.download_count.max(0.0) as u64,
            latest_files,
            category_section: self.category_section.into(),
            slug: self.slug,
        })
    }
}

/// Catalog timestamps are ISO 8601, usually with a `Z` suffix and a variable
/// number of fractional digits.
fn parse_file_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
