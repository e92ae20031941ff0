// cfaddons - addon discovery and catalog reconciliation for WoW and ESO
//
// This is the library crate containing the core logic and data structures.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{AddonInfo, AddonLocalInfo, GameInfo, InstalledAddon, InstalledGame, Settings};
pub use services::{DescriptorRegistry, Orchestrator, ResolveError};
pub use state::{InstallationStore, StoreError};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
