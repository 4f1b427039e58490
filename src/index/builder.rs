//! Package index building
//!
//! Selects the representative modules of every public directory of a package
//! release and documents each of them. Modules that fail to document are left
//! out; an index is whatever could be documented.

use futures::{StreamExt, stream};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::entries::EntriesCache;
use crate::docs::nodes::DocNode;
use crate::index::layout;
use crate::index::meta::RegistryClient;
use crate::index::structure::IndexStructure;

/// Modules documented at once while building an index.
const INDEX_CONCURRENCY: usize = 4;

/// Registry package whose modules live at `<host>/std@<version>` rather than
/// under `/x/`.
const STD_PACKAGE: &str = "std";

#[derive(Clone)]
pub struct IndexBuilder {
    registry: RegistryClient,
    entries: EntriesCache,
    static_dir: PathBuf,
    built: Arc<RwLock<HashMap<String, Arc<IndexStructure>>>>,
    snapshots: Arc<RwLock<HashMap<String, Arc<IndexStructure>>>>,
}

impl IndexBuilder {
    pub fn new(
        registry: RegistryClient,
        entries: EntriesCache,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            entries,
            static_dir: static_dir.into(),
            built: Arc::new(RwLock::new(HashMap::new())),
            snapshots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Build the documentation index of `package@version` below `path`.
    ///
    /// Returns `None` when the package metadata is unavailable, nothing under
    /// `path` is indexable, or no module could be documented.
    pub async fn build_index(
        &self,
        registry_host: &str,
        package: &str,
        version: &str,
        path: &str,
    ) -> Option<Arc<IndexStructure>> {
        let key = format!("{registry_host}|{package}@{version}{path}");
        let cached = self.built.read().get(&key).cloned();
        if cached.is_some() {
            return cached;
        }

        let meta = self.registry.package_meta(package, version).await?;
        let Some(structure) = layout::index_structure(path, &meta) else {
            tracing::debug!("Nothing indexable in {}@{}{}", package, version, path);
            return None;
        };

        let entries = self
            .index_entries(registry_host, package, version, &structure)
            .await;
        if entries.is_empty() {
            tracing::debug!("No documented modules in {}@{}{}", package, version, path);
            return None;
        }

        tracing::info!(
            "Indexed {}@{}{}: {} directories, {} documented modules",
            package,
            version,
            path,
            structure.len(),
            entries.len()
        );

        let index = Arc::new(IndexStructure { structure, entries });
        self.built.write().insert(key, index.clone());
        Some(index)
    }

    async fn index_entries(
        &self,
        registry_host: &str,
        package: &str,
        version: &str,
        structure: &IndexMap<String, Vec<String>>,
    ) -> IndexMap<String, Vec<DocNode>> {
        let modules = structure.values().flatten().cloned();

        let documented: Vec<(String, Option<Arc<Vec<DocNode>>>)> = stream::iter(modules)
            .map(|module| async move {
                let url = module_url(registry_host, package, version, &module);
                match self.entries.get_entries(&url).await {
                    Ok(entries) => (module, Some(entries)),
                    Err(e) => {
                        tracing::debug!("Skipping {} in index: {}", url, e);
                        (module, None)
                    }
                }
            })
            .buffered(INDEX_CONCURRENCY)
            .collect()
            .await;

        documented
            .into_iter()
            .filter_map(|(module, entries)| {
                entries
                    .filter(|entries| !entries.is_empty())
                    .map(|entries| (module, entries.as_ref().clone()))
            })
            .collect()
    }

    /// Pre-built index of `package@version`, read from
    /// `<static_dir>/<package>_<version>.json`. Only successful reads are kept.
    pub async fn static_index(&self, package: &str, version: &str) -> Option<Arc<IndexStructure>> {
        let key = format!("{package}_{version}");
        let cached = self.snapshots.read().get(&key).cloned();
        if cached.is_some() {
            return cached;
        }

        let path = snapshot_path(&self.static_dir, &key)?;
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("No static index at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<IndexStructure>(&data) {
            Ok(index) => {
                let index = Arc::new(index);
                self.snapshots.write().insert(key, index.clone());
                Some(index)
            }
            Err(e) => {
                tracing::warn!("Malformed static index {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn snapshot_path(static_dir: &Path, key: &str) -> Option<PathBuf> {
    if key.contains("..") || key.contains('/') || key.contains('\\') {
        return None;
    }
    Some(static_dir.join(format!("{key}.json")))
}

/// Locator of `module` (a package-relative path such as `/http/mod.ts`).
pub fn module_url(registry_host: &str, package: &str, version: &str, module: &str) -> String {
    let host = registry_host.trim_end_matches('/');
    if package == STD_PACKAGE {
        format!("{host}/std@{version}{module}")
    } else {
        format!("{host}/x/{package}@{version}{module}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_url() {
        assert_eq!(
            module_url("https://deno.land/", "std", "0.120.0", "/http/mod.ts"),
            "https://deno.land/std@0.120.0/http/mod.ts"
        );
        assert_eq!(
            module_url("https://deno.land", "oak", "v10.0.0", "/mod.ts"),
            "https://deno.land/x/oak@v10.0.0/mod.ts"
        );
    }

    #[test]
    fn test_snapshot_path_rejects_traversal() {
        let dir = Path::new("/srv/static");
        assert_eq!(
            snapshot_path(dir, "std_0.120.0"),
            Some(dir.join("std_0.120.0.json"))
        );
        assert_eq!(snapshot_path(dir, "../x_1"), None);
    }
}
