//! # Cache Module
//!
//! In-memory caches for fetched resources and documented modules.
//!
//! ## Key Components
//!
//! - [`loader`] - Fetches a single remote resource over HTTP
//! - [`resources`] - Byte-budgeted LRU cache of fetched resources
//! - [`redirect`] - Detects locators that resolve somewhere else
//! - [`entries`] - Merged declaration lists per module, with static seeding
//! - [`utils`] - Size formatting for log lines and status output

pub mod entries;
pub mod loader;
pub mod redirect;
pub mod resources;
pub mod utils;

pub use entries::EntriesCache;
pub use loader::{HttpLoader, LoadFuture, Resource, ResourceLoader};
pub use redirect::resolve_redirect;
pub use resources::{CacheStats, ResourceCache};
