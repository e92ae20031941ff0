//! Services module - discovery, inventory and reconciliation of game addons.
//!
//! The services are framework-agnostic: nothing here prints, prompts, or knows
//! about the command line. Every collaborator with side effects outside the
//! filesystem sits behind a trait so tests can replace it.
//!
//! # Components
//!
//! - [`location`]: turns catalog location hints into exactly one installation
//!   directory ([`LocationResolver`]), reading the registry through [`ConfigStore`]
//! - [`descriptor`]: the supported games ([`DescriptorRegistry`]) and their manifest
//!   dialects
//! - [`manifest`]: permissive parsing of `## Key: Value` addon manifests
//! - [`scanner`]: lists addon folders of every category and parses them ([`AddonScanner`])
//! - [`catalog`]: the [`CatalogClient`] trait, its HTTP implementation and the
//!   flavor filter
//! - [`paths`]: catalog path splitting and `%TOKEN%` placeholders ([`PathPlaceholders`])
//! - [`orchestrator`]: load, discover, reconcile and persist ([`Orchestrator`])
//!
//! # Fault containment
//!
//! Errors are contained at the smallest unit that can fail:
//! - a malformed manifest line is skipped and recorded ([`manifest::MalformedLine`])
//! - an addon folder without a manifest is left out of the scan ([`ScanError`])
//! - a failed catalog lookup leaves that one addon without remote info
//!   ([`LookupOutcome`])
//!
//! Only discovery failures and unusable stored records abort a whole
//! [`Orchestrator::resolve_installation`] call ([`ResolveError`]).

pub mod catalog;
pub mod descriptor;
pub mod location;
pub mod manifest;
pub mod orchestrator;
pub mod paths;
pub mod scanner;

pub use catalog::{CatalogClient, CatalogError, HttpCatalogClient, SearchQuery};
pub use descriptor::{DescriptorRegistry, GameDescriptor, ManifestDialect, UnsupportedGame};
pub use location::{ConfigStore, DiscoveryError, LocationResolver, SystemConfigStore};
pub use manifest::{ManifestError, MalformedLine, ParsedManifest};
pub use orchestrator::{LookupOutcome, Orchestrator, ReconcileReport, ResolveError};
pub use paths::{PathError, PathPlaceholders};
pub use scanner::{AddonScanner, ScanError, ScanReport};
