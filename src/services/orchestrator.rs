//! Load → Discover → Reconcile → Ready.
//!
//! [`Orchestrator::resolve_installation`] is the entry point for every flow that
//! needs an installation: it returns the stored record when there is one and runs
//! a fresh discovery otherwise. Either way the addon inventory is reconciled
//! against the catalog before it is returned.
//!
//! Reconciliation lookups run concurrently, bounded by a semaphore. Each lookup
//! writes only to the addon at its own index, so scan order survives whatever
//! order the lookups complete in, and one failed lookup never affects another.

use crate::metrics::Metrics;
use crate::models::{AddonInfo, GameInfo, InstalledGame, SortOrder};
use crate::services::catalog::{CatalogClient, CatalogError, SearchQuery};
use crate::services::descriptor::{DescriptorRegistry, GameDescriptor, UnsupportedGame};
use crate::services::location::{ConfigStore, DiscoveryError, LocationResolver};
use crate::services::paths::PathPlaceholders;
use crate::services::scanner::AddonScanner;
use crate::state::{InstallationStore, StoreError};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Errors that abort a whole orchestration
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    UnsupportedGame(#[from] UnsupportedGame),

    #[error("Failed to fetch catalog metadata for {slug}: {source}")]
    Catalog {
        slug: String,
        #[source]
        source: CatalogError,
    },

    #[error("Could not locate {slug}: {source}")]
    Discovery {
        slug: String,
        #[source]
        source: DiscoveryError,
    },

    #[error("Installation record for {slug}: {source}")]
    Store {
        slug: String,
        #[source]
        source: StoreError,
    },

    #[error("{path} cannot be used for {slug}: {reason}")]
    InvalidPath {
        slug: String,
        path: Utf8PathBuf,
        reason: String,
    },
}

impl ResolveError {
    /// Whether the user should supply the installation path by hand.
    pub fn needs_manual_path(&self) -> bool {
        matches!(
            self,
            ResolveError::Discovery {
                source: DiscoveryError::NoInstallationFound
                    | DiscoveryError::AmbiguousInstallation { .. },
                ..
            }
        )
    }
}

/// Result of the catalog lookup for one addon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The manifest carries no catalog id; nothing was looked up
    NoCatalogId,
    Attached,
    /// The catalog has no file for this flavor
    Missing,
    Failed(String),
}

/// Per-addon lookup outcomes, index-aligned with [`InstalledGame::addons`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: Vec<LookupOutcome>,
}

impl ReconcileReport {
    fn count(&self, wanted: fn(&LookupOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| wanted(o)).count()
    }

    pub fn attached(&self) -> usize {
        self.count(|o| matches!(o, LookupOutcome::Attached))
    }

    pub fn missing(&self) -> usize {
        self.count(|o| matches!(o, LookupOutcome::Missing))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LookupOutcome::Failed(_)))
    }
}

const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Drives discovery, scanning, reconciliation and persistence for one process.
///
/// # Related Types
///
/// - [`DescriptorRegistry`]: immutable slug → descriptor map, borrowed for the
///   orchestrator's lifetime
/// - [`CatalogClient`]: remote metadata; shared with lookup tasks through an `Arc`
/// - [`ConfigStore`]: registry access for location hints
/// - [`InstallationStore`]: persisted [`InstalledGame`] records
pub struct Orchestrator<'a, C, S>
where
    C: CatalogClient + 'static,
    S: ConfigStore,
{
    registry: &'a DescriptorRegistry,
    catalog: Arc<C>,
    config_store: S,
    store: InstallationStore,
    placeholders: PathPlaceholders,
    max_concurrent_lookups: usize,
    metrics: Metrics,
}

impl<'a, C, S> Orchestrator<'a, C, S>
where
    C: CatalogClient + 'static,
    S: ConfigStore,
{
    pub fn new(
        registry: &'a DescriptorRegistry,
        catalog: Arc<C>,
        config_store: S,
        store: InstallationStore,
        placeholders: PathPlaceholders,
    ) -> Self {
        Self {
            registry,
            catalog,
            config_store,
            store,
            placeholders,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
            metrics: Metrics::new(),
        }
    }

    /// Values below one are treated as one.
    pub fn with_max_concurrent_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_lookups = limit.max(1);
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn store(&self) -> &InstallationStore {
        &self.store
    }

    /// The installation for `slug`, reconciled against the catalog.
    ///
    /// A stored record is re-reconciled but not re-saved; a freshly discovered
    /// installation is saved after reconciliation.
    ///
    /// # Errors
    ///
    /// Unknown slugs, catalog failures while fetching game metadata, discovery
    /// failures, and store failures other than a missing record.
    pub async fn resolve_installation(&self, slug: &str) -> Result<InstalledGame, ResolveError> {
        let descriptor = self.registry.get(slug)?;

        let result = match self.store.load(slug) {
            Ok(mut game) => {
                tracing::info!("Using stored installation of {} at {}", slug, game.root_path);
                self.reconcile(&mut game, &descriptor.flavor).await;
                Ok(game)
            }
            Err(e) if e.is_not_discovered() => {
                tracing::info!("{} not discovered yet, searching for an installation", slug);
                self.discover_and_save(descriptor).await
            }
            Err(source) => Err(ResolveError::Store {
                slug: slug.to_string(),
                source,
            }),
        };

        self.metrics.log_summary();
        result
    }

    /// Use `path` as the installation root of `slug` instead of automatic discovery.
    ///
    /// The path must be an existing directory and, for editions that install into
    /// a dedicated folder, must end in that folder. Any stored record is replaced.
    pub async fn register_path(
        &self,
        slug: &str,
        path: &Utf8Path,
    ) -> Result<InstalledGame, ResolveError> {
        let descriptor = self.registry.get(slug)?;

        let invalid = |reason: String| ResolveError::InvalidPath {
            slug: slug.to_string(),
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_dir() {
            return Err(invalid("not an existing directory".to_string()));
        }
        if !descriptor.accepts_root(path) {
            return Err(invalid(format!(
                "expected a folder named {}",
                descriptor.expected_folder_suffix.as_deref().unwrap_or_default()
            )));
        }

        let root = std::path::absolute(path.as_std_path())
            .ok()
            .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
            .unwrap_or_else(|| path.to_path_buf());

        let game_info = self.fetch_game_info(descriptor).await?;
        let mut game = self.build_game(descriptor, root, game_info);
        self.reconcile(&mut game, &descriptor.flavor).await;
        self.save(&game)?;

        self.metrics.log_summary();
        Ok(game)
    }

    /// Folder where `slug` keeps addon saved variables (`WTF`, `SavedVariables`).
    ///
    /// Uses the stored installation root; without one, the game is discovered and saved first.
    pub async fn settings_directory(&self, slug: &str) -> Result<Utf8PathBuf, ResolveError> {
        let descriptor = self.registry.get(slug)?;

        let root = match self.store.load(slug) {
            Ok(game) => game.root_path,
            Err(e) if e.is_not_discovered() => self.discover_and_save(descriptor).await?.root_path,
            Err(source) => {
                return Err(ResolveError::Store {
                    slug: slug.to_string(),
                    source,
                });
            }
        };

        Ok(descriptor.config_directory(&root))
    }

    /// Delete the stored record of `slug`; the next resolve runs discovery again.
    pub fn forget(&self, slug: &str) -> Result<(), ResolveError> {
        self.registry.get(slug)?;
        self.store.remove(slug).map_err(|source| ResolveError::Store {
            slug: slug.to_string(),
            source,
        })
    }

    /// Search the catalog for addons usable by `slug`'s flavor.
    pub async fn search(
        &self,
        slug: &str,
        query: &str,
        page_size: u32,
        sort: SortOrder,
    ) -> Result<Vec<AddonInfo>, ResolveError> {
        let descriptor = self.registry.get(slug)?;

        let mut search = SearchQuery::new(query, descriptor.catalog_id, &descriptor.flavor);
        search.page_size = page_size;
        search.sort = sort;

        self.catalog
            .search(&search)
            .await
            .map_err(|source| ResolveError::Catalog {
                slug: slug.to_string(),
                source,
            })
    }

    /// Discover a fresh installation: catalog metadata, location hints, scan.
    pub async fn discover(&self, descriptor: &GameDescriptor) -> Result<InstalledGame, ResolveError> {
        let game_info = self.fetch_game_info(descriptor).await?;

        let resolver = LocationResolver::new(&self.config_store, &self.placeholders);
        let root = resolver
            .resolve(
                &game_info.location_hints,
                descriptor.expected_folder_suffix.as_deref(),
            )
            .map_err(|source| {
                tracing::warn!("Discovery of {} failed: {}", descriptor.slug, source);
                ResolveError::Discovery {
                    slug: descriptor.slug.clone(),
                    source,
                }
            })?;

        Ok(self.build_game(descriptor, root, game_info))
    }

    /// Attach remote info to every addon with a catalog id.
    ///
    /// Existing remote info is cleared first, so an addon whose lookup fails ends
    /// up without remote info rather than with stale data.
    pub async fn reconcile(&self, game: &mut InstalledGame, flavor: &str) -> ReconcileReport {
        let mut outcomes = vec![LookupOutcome::NoCatalogId; game.addons.len()];
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_lookups));
        let mut lookups = JoinSet::new();

        for (index, addon) in game.addons.iter_mut().enumerate() {
            addon.remote_info = None;

            let Some(addon_id) = addon.local_info.catalog_id else {
                continue;
            };

            // Replaced below unless the task dies before reporting back
            outcomes[index] = LookupOutcome::Failed("lookup did not complete".to_string());
            self.metrics.record_lookup_attempt();

            let catalog = Arc::clone(&self.catalog);
            let semaphore = Arc::clone(&semaphore);
            let flavor = flavor.to_string();

            lookups.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (index, addon_id, catalog.addon(addon_id, &flavor).await)
            });
        }

        while let Some(joined) = lookups.join_next().await {
            let (index, addon_id, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!("Addon lookup task failed: {}", e);
                    self.metrics.record_lookup_failed();
                    continue;
                }
            };

            let folder = &game.addons[index].local_info.folder_name;
            outcomes[index] = match result {
                Ok(Some(info)) => {
                    tracing::debug!("Attached catalog addon {} to {}", addon_id, folder);
                    self.metrics.record_lookup_attached();
                    game.addons[index].remote_info = Some(info);
                    LookupOutcome::Attached
                }
                Ok(None) => {
                    tracing::debug!("Catalog addon {} has no {} file ({})", addon_id, flavor, folder);
                    self.metrics.record_lookup_missing();
                    LookupOutcome::Missing
                }
                Err(e) => {
                    tracing::warn!("Lookup of catalog addon {} for {} failed: {}", addon_id, folder, e);
                    self.metrics.record_lookup_failed();
                    LookupOutcome::Failed(e.to_string())
                }
            };
        }

        let report = ReconcileReport { outcomes };
        tracing::info!(
            "Reconciled {}: {} attached, {} missing, {} failed",
            game.slug,
            report.attached(),
            report.missing(),
            report.failed()
        );
        report
    }

    async fn discover_and_save(&self, descriptor: &GameDescriptor) -> Result<InstalledGame, ResolveError> {
        let mut game = self.discover(descriptor).await?;
        self.reconcile(&mut game, &descriptor.flavor).await;
        self.save(&game)?;
        Ok(game)
    }

    async fn fetch_game_info(&self, descriptor: &GameDescriptor) -> Result<GameInfo, ResolveError> {
        self.catalog
            .game_info(descriptor.catalog_id)
            .await
            .map_err(|source| ResolveError::Catalog {
                slug: descriptor.slug.clone(),
                source,
            })
    }

    fn build_game(&self, descriptor: &GameDescriptor, root: Utf8PathBuf, game_info: GameInfo) -> InstalledGame {
        let scanner = AddonScanner::new(descriptor, &self.placeholders);
        let report = scanner.scan(&root, &game_info.category_sections);

        self.metrics.record_scan(
            report.addons.len(),
            report.failures.len(),
            report.malformed_lines,
        );
        for failure in &report.failures {
            tracing::debug!("Scan of {}: {}", descriptor.slug, failure);
        }

        InstalledGame {
            slug: descriptor.slug.clone(),
            root_path: root,
            game_info,
            addons: report.addons,
        }
    }

    fn save(&self, game: &InstalledGame) -> Result<(), ResolveError> {
        self.store
            .save(game)
            .map(|_| ())
            .map_err(|source| ResolveError::Store {
                slug: game.slug.clone(),
                source,
            })
    }
}
