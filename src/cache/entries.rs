//! Merged declaration lists per module
//!
//! Entries live for the lifetime of the process. They only hold the
//! declaration skeleton, not source text, so they are not budgeted.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::resources::ResourceCache;
use crate::docs::analyzer::{Analyzer, AnalyzerError};
use crate::docs::merge::merge_entries;
use crate::docs::nodes::DocNode;
use crate::error::{DocsError, Result, UNABLE_TO_LOAD_SPECIFIER};

/// Locators that may be served from a pre-built snapshot start with this.
const STATIC_PREFIX: &str = "deno";

#[derive(Clone)]
pub struct EntriesCache {
    entries: Arc<RwLock<HashMap<String, Arc<Vec<DocNode>>>>>,
    resources: ResourceCache,
    analyzer: Arc<dyn Analyzer>,
    static_dir: PathBuf,
}

impl EntriesCache {
    pub fn new(
        resources: ResourceCache,
        analyzer: Arc<dyn Analyzer>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            resources,
            analyzer,
            static_dir: static_dir.into(),
        }
    }

    /// The resource cache handed to the analyzer as its loader
    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Return the merged declarations of `url`, running the analyzer on a miss.
    pub async fn get_entries(&self, url: &str) -> Result<Arc<Vec<DocNode>>> {
        if let Some(entries) = self.get(url) {
            return Ok(entries);
        }

        let started = Instant::now();
        let nodes = self
            .analyzer
            .analyze(url, &self.resources)
            .await
            .map_err(|err| classify_failure(url, err))?;

        let entries = Arc::new(merge_entries(nodes));
        tracing::debug!(
            "Documented {} with {} entries in {:?}",
            url,
            entries.len(),
            started.elapsed()
        );
        self.entries
            .write()
            .insert(url.to_string(), entries.clone());
        Ok(entries)
    }

    pub fn get(&self, url: &str) -> Option<Arc<Vec<DocNode>>> {
        self.entries.read().get(url).cloned()
    }

    /// Store raw nodes for `url`, merging them first. Existing entries are kept.
    pub fn insert(&self, url: &str, nodes: Vec<DocNode>) -> Arc<Vec<DocNode>> {
        self.entries
            .write()
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(merge_entries(nodes)))
            .clone()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.read().contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seed the entries of a built-in `deno/...` locator from its snapshot.
    ///
    /// `host` is `lib` or `lib@version`, read from
    /// `<static_dir>/<lib>[_<version>].json`. Failures are logged and leave
    /// the cache untouched.
    pub async fn maybe_cache_static(&self, url: &str, host: &str) {
        if !url.starts_with(STATIC_PREFIX) || self.contains(url) {
            return;
        }

        let Some(path) = snapshot_path(&self.static_dir, host) else {
            tracing::warn!("Refusing static snapshot name for host {:?}", host);
            return;
        };

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("error fetching static {}: {}", path.display(), e);
                return;
            }
        };

        match serde_json::from_slice::<Vec<DocNode>>(&data) {
            Ok(nodes) => {
                let entries = self.insert(url, nodes);
                tracing::info!(
                    "Seeded {} from {} ({} entries)",
                    url,
                    path.display(),
                    entries.len()
                );
            }
            Err(e) => tracing::warn!("error parsing static {}: {}", path.display(), e),
        }
    }
}

/// Map an analyzer failure onto the public error taxonomy.
fn classify_failure(url: &str, err: AnalyzerError) -> DocsError {
    match err {
        AnalyzerError::Failed(message) if message.contains(UNABLE_TO_LOAD_SPECIFIER) => {
            DocsError::not_found(url)
        }
        AnalyzerError::Failed(message) => DocsError::bad_request(&message),
        AnalyzerError::Unexpected(detail) => {
            tracing::error!("Analyzer failed on {}: {}", url, detail);
            DocsError::Internal("Unexpected object.".to_string())
        }
    }
}

/// Snapshot file for `lib[@version]`, or `None` if the name could escape
/// `static_dir`.
fn snapshot_path(static_dir: &Path, host: &str) -> Option<PathBuf> {
    let (lib, version) = match host.split_once('@') {
        Some((lib, version)) => (lib, Some(version)),
        None => (host, None),
    };

    let is_safe = |part: &str| !part.contains("..") && !part.contains('/') && !part.contains('\\');
    if lib.is_empty() || !is_safe(lib) || !version.is_none_or(is_safe) {
        return None;
    }

    let file = match version {
        Some(version) if !version.is_empty() => format!("{lib}_{version}.json"),
        _ => format!("{lib}.json"),
    };
    Some(static_dir.join(file))
}
