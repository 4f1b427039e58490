//! # Index Module
//!
//! Discovers the public layout of a versioned registry package and documents
//! the modules that represent each directory.
//!
//! ## Key Components
//!
//! - [`meta`] - Package listings, versions and descriptions from the registry
//! - [`layout`] - Directory and index-module selection over a listing
//! - [`builder`] - Index construction and static index snapshots
//! - [`structure`] - The serialized index shape

pub mod builder;
pub mod layout;
pub mod meta;
pub mod outputs;
pub mod structure;
pub mod tools;

pub use builder::{IndexBuilder, module_url};
pub use meta::{ListingEntry, ListingType, PackageMeta, PackageVersions, RegistryClient};
pub use structure::IndexStructure;
