//! Data models for cfaddons.
//!
//! - [`catalog`]: catalog metadata snapshots ([`GameInfo`], [`AddonInfo`], [`LocationHint`],
//!   [`CategorySection`]) as they are stored, independent of the catalog's wire format
//! - [`installed`]: the local inventory ([`AddonLocalInfo`], [`InstalledAddon`]) and its
//!   root aggregate [`InstalledGame`]
//! - [`settings`]: [`Settings`] loaded by [`ConfigManager`](crate::config::ConfigManager)
//!
//! Everything here derives `Serialize`/`Deserialize` and `PartialEq` so that a stored
//! [`InstalledGame`] can be compared field-for-field with the one that was saved.

pub mod catalog;
pub mod installed;
pub mod settings;

pub use catalog::{
    AddonFile, AddonInfo, CategorySection, GameFile, GameInfo, HintKind, LocationHint, SortOrder,
};
pub use installed::{AddonLocalInfo, InstalledAddon, InstalledGame};
pub use settings::{CatalogSettings, PlaceholderOverride, Settings};
