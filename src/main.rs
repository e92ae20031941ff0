//! cfaddons - command-line entry point.
//!
//! # Overview
//!
//! Thin wrapper over the library: it parses arguments, loads settings, sets up
//! logging and a tokio runtime, then hands off to the [`Orchestrator`].
//!
//! ```text
//! cfaddons <GAME> list
//! cfaddons <GAME> search <QUERY> [--page-size N] [--sort ORDER]
//! cfaddons <GAME> add-path <DIR>
//! cfaddons <GAME> forget
//! cfaddons <GAME> config-dir
//! cfaddons <GAME> app-config-dir
//! ```
//!
//! Settings live in `settings.yaml` inside the configuration directory
//! (`--config-dir`, or the platform default). Relative `data_dir` and `log_dir`
//! settings are resolved against that directory.

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use cfaddons::models::SortOrder;
use cfaddons::services::{HttpCatalogClient, SystemConfigStore};
use cfaddons::{
    APP_NAME, AddonInfo, ConfigManager, DescriptorRegistry, InstallationStore, InstalledGame,
    Orchestrator, ResolveError, StoreError, VERSION,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "cfaddons", version, about = "Manage CurseForge addons for installed games")]
struct Cli {
    /// Game to manage (wow_retail, wow_classic, wow_tbc, teso)
    game: String,

    #[command(subcommand)]
    command: Command,

    /// Configuration directory holding settings.yaml
    #[arg(long, global = true)]
    config_dir: Option<Utf8PathBuf>,

    /// Debug logging, also echoed to stderr
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List installed addons
    List,

    /// Search the catalog
    Search {
        query: String,

        #[arg(long, default_value_t = 50)]
        page_size: u32,

        #[arg(long, value_enum, default_value_t = SortArg::Popularity)]
        sort: SortArg,
    },

    /// Use DIR as the installation instead of automatic discovery
    AddPath { dir: Utf8PathBuf },

    /// Forget the stored installation so it is discovered again
    Forget,

    /// Print the game's addon settings folder (WTF, SavedVariables)
    ConfigDir,

    /// Print the directory holding cfaddons' own settings.yaml
    AppConfigDir,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Featured,
    Popularity,
    LastUpdate,
    Name,
    Author,
    TotalDownloads,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Featured => SortOrder::Featured,
            SortArg::Popularity => SortOrder::Popularity,
            SortArg::LastUpdate => SortOrder::LastUpdate,
            SortArg::Name => SortOrder::Name,
            SortArg::Author => SortOrder::Author,
            SortArg::TotalDownloads => SortOrder::TotalDownloads,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(ConfigManager::default_config_dir);
    let config_manager = ConfigManager::new(&config_dir)?;

    if let Command::AppConfigDir = cli.command {
        println!("{}", config_manager.config_dir());
        return Ok(ExitCode::SUCCESS);
    }

    let settings = config_manager.load_settings()?;
    let debug_mode = cli.debug || settings.debug_mode;

    let log_dir = config_manager.resolve_path(&settings.log_dir);
    let _log_guard =
        cfaddons::logging::setup_logging_with_console(&log_dir, APP_NAME, debug_mode, debug_mode)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let registry = DescriptorRegistry::builtin();
    if let Err(e) = registry.get(&cli.game) {
        eprintln!("Error: {}", e);
        return Ok(ExitCode::FAILURE);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(settings.catalog.max_concurrent_lookups.max(1))
        .thread_name("cfaddons-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let catalog = Arc::new(
        HttpCatalogClient::new(&settings.catalog).context("Failed to create catalog client")?,
    );
    let store = InstallationStore::new(config_manager.resolve_path(&settings.data_dir));
    let orchestrator = Orchestrator::new(
        &registry,
        catalog,
        SystemConfigStore,
        store,
        ConfigManager::placeholders(&settings),
    )
    .with_max_concurrent_lookups(settings.catalog.max_concurrent_lookups);

    let outcome = runtime.block_on(run(&orchestrator, &cli.game, cli.command));

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    match outcome {
        Ok(()) => {
            tracing::info!("Done");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("{}", e);
            report_failure(&cli.game, &e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(
    orchestrator: &Orchestrator<'_, HttpCatalogClient, SystemConfigStore>,
    slug: &str,
    command: Command,
) -> Result<(), ResolveError> {
    match command {
        Command::List => {
            let game = orchestrator.resolve_installation(slug).await?;
            print_installed(&game);
        }
        Command::Search {
            query,
            page_size,
            sort,
        } => {
            let results = orchestrator
                .search(slug, &query, page_size, sort.into())
                .await?;
            print_search_results(&query, &results);
        }
        Command::AddPath { dir } => {
            let game = orchestrator.register_path(slug, &dir).await?;
            println!(
                "Registered {} at {} ({} addons)",
                game.game_info.name,
                game.root_path,
                game.addons.len()
            );
        }
        Command::Forget => {
            orchestrator.forget(slug)?;
            println!("Forgot the stored installation of {}", slug);
        }
        Command::ConfigDir => {
            println!("{}", orchestrator.settings_directory(slug).await?);
        }
        Command::AppConfigDir => {}
    }

    Ok(())
}

fn print_installed(game: &InstalledGame) {
    if game.addons.is_empty() {
        println!("No addons installed for {}", game.game_info.name);
        return;
    }

    println!(
        "{} at {} ({} addons, {} known to the catalog)",
        game.game_info.name,
        game.root_path,
        game.addons.len(),
        game.reconciled_count()
    );

    for addon in &game.addons {
        match &addon.remote_info {
            Some(remote) => {
                let version = remote
                    .latest_file()
                    .map(|f| f.display_name.as_str())
                    .unwrap_or("-");
                println!("  {} [{}] {}", addon.display_name(), version, remote.summary);
            }
            None => println!("  {}", addon.display_name()),
        }
    }
}

fn print_search_results(query: &str, results: &[AddonInfo]) {
    if results.is_empty() {
        println!("No addons found for '{}'", query);
        return;
    }

    for addon in results {
        println!(
            "{:>8}  {} by {} ({} downloads)",
            addon.catalog_id,
            addon.name,
            addon.authors.join(", "),
            addon.download_count
        );
        if !addon.summary.is_empty() {
            println!("          {}", addon.summary);
        }
    }
}

fn report_failure(slug: &str, error: &ResolveError) {
    eprintln!("Error: {}", error);

    if error.needs_manual_path() {
        eprintln!("Point cfaddons at the installation folder with:");
        eprintln!("    cfaddons {} add-path <DIR>", slug);
    }

    if let ResolveError::Store {
        source: StoreError::Serialization { .. },
        ..
    } = error
    {
        eprintln!("Discard the damaged record with:");
        eprintln!("    cfaddons {} forget", slug);
    }
}
