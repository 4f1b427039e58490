//! Registry metadata
//!
//! Package listings, version lists and descriptions are small and stable, so
//! every successful lookup is kept for the life of the process. Failed
//! lookups are retried on the next call.

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::loader::ResourceLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    File,
    Dir,
}

/// One entry of a package's directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: ListingType,
}

impl ListingEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: 0,
            kind: ListingType::File,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: 0,
            kind: ListingType::Dir,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == ListingType::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ListingType::Dir
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub repository: String,
    #[serde(rename = "ref", default)]
    pub git_ref: String,
}

/// Metadata of one published package version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMeta {
    #[serde(default)]
    pub uploaded_at: String,
    #[serde(default)]
    pub directory_listing: Vec<ListingEntry>,
    #[serde(default)]
    pub upload_options: UploadOptions,
}

impl PackageMeta {
    pub fn from_listing(directory_listing: Vec<ListingEntry>) -> Self {
        Self {
            directory_listing,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageVersions {
    pub latest: String,
    #[serde(default)]
    pub versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiModuleData {
    data: ApiModule,
}

#[derive(Debug, Deserialize)]
struct ApiModule {
    #[serde(default)]
    description: Option<String>,
}

/// Reads package metadata from the registry's storage and API.
#[derive(Clone)]
pub struct RegistryClient {
    loader: Arc<dyn ResourceLoader>,
    storage_base: String,
    api_base: String,
    metas: Arc<RwLock<HashMap<(String, String), Arc<PackageMeta>>>>,
    versions: Arc<RwLock<HashMap<String, Arc<PackageVersions>>>>,
    descriptions: Arc<RwLock<HashMap<String, Option<String>>>>,
}

impl RegistryClient {
    pub fn new(
        loader: Arc<dyn ResourceLoader>,
        storage_base: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            storage_base: storage_base.into(),
            api_base: api_base.into(),
            metas: Arc::new(RwLock::new(HashMap::new())),
            versions: Arc::new(RwLock::new(HashMap::new())),
            descriptions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn meta_url(&self, package: &str, version: &str) -> String {
        join_url(
            &self.storage_base,
            &format!("{package}/versions/{version}/meta/meta.json"),
        )
    }

    pub fn versions_url(&self, package: &str) -> String {
        join_url(&self.storage_base, &format!("{package}/meta/versions.json"))
    }

    pub fn description_url(&self, package: &str) -> String {
        join_url(&self.api_base, package)
    }

    /// Directory listing and upload details of `package@version`
    pub async fn package_meta(&self, package: &str, version: &str) -> Option<Arc<PackageMeta>> {
        let key = (package.to_string(), version.to_string());
        let cached = self.metas.read().get(&key).cloned();
        if cached.is_some() {
            return cached;
        }

        let meta: Arc<PackageMeta> =
            Arc::new(self.fetch_json(&self.meta_url(package, version)).await?);
        self.metas.write().insert(key, meta.clone());
        Some(meta)
    }

    pub async fn package_versions(&self, package: &str) -> Option<Arc<PackageVersions>> {
        let cached = self.versions.read().get(package).cloned();
        if cached.is_some() {
            return cached;
        }

        let versions: Arc<PackageVersions> =
            Arc::new(self.fetch_json(&self.versions_url(package)).await?);
        self.versions
            .write()
            .insert(package.to_string(), versions.clone());
        Some(versions)
    }

    pub async fn latest_version(&self, package: &str) -> Option<String> {
        self.package_versions(package)
            .await
            .map(|versions| versions.latest.clone())
    }

    pub async fn package_description(&self, package: &str) -> Option<String> {
        let cached = self.descriptions.read().get(package).cloned();
        if let Some(description) = cached {
            return description;
        }

        let data: ApiModuleData = self.fetch_json(&self.description_url(package)).await?;
        let description = data.data.description;
        self.descriptions
            .write()
            .insert(package.to_string(), description.clone());
        description
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let resource = self.loader.load(url).await?;
        match serde_json::from_str(&resource.content) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Malformed registry metadata at {}: {}", url, e);
                None
            }
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/{}", path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::loader::{LoadFuture, Resource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct JsonLoader {
        documents: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl ResourceLoader for JsonLoader {
        fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let resource = self
                .documents
                .get(locator)
                .map(|content| Arc::new(Resource::new(locator, content.clone())));
            Box::pin(async move { resource })
        }
    }

    fn client(documents: &[(&str, &str)]) -> (RegistryClient, Arc<JsonLoader>) {
        let loader = Arc::new(JsonLoader {
            documents: documents
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        });
        let client = RegistryClient::new(
            loader.clone(),
            "https://storage.test/",
            "https://api.test/modules/",
        );
        (client, loader)
    }

    #[tokio::test]
    async fn test_package_meta_is_cached() {
        let body = r#"{
            "uploaded_at": "2021-11-30T12:00:00.000Z",
            "directory_listing": [
                { "path": "", "size": 120, "type": "dir" },
                { "path": "/mod.ts", "size": 120, "type": "file" }
            ],
            "upload_options": { "type": "github", "repository": "oak/oak", "ref": "v10.0.0" }
        }"#;
        let url = "https://storage.test/oak/versions/v10.0.0/meta/meta.json";
        let (client, loader) = client(&[(url, body)]);

        let meta = client.package_meta("oak", "v10.0.0").await.unwrap();
        assert_eq!(meta.directory_listing.len(), 2);
        assert!(meta.directory_listing[0].is_dir());
        assert_eq!(meta.upload_options.git_ref, "v10.0.0");

        client.package_meta("oak", "v10.0.0").await.unwrap();
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_metadata_is_retried() {
        let (client, loader) = client(&[]);
        assert!(client.package_meta("nope", "1.0.0").await.is_none());
        assert!(client.package_meta("nope", "1.0.0").await.is_none());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_versions_and_description() {
        let versions = r#"{ "latest": "v10.1.0", "versions": ["v10.1.0", "v10.0.0"] }"#;
        let description = r#"{
            "data": { "name": "oak", "description": "A middleware framework", "star_count": 4000 }
        }"#;
        let (client, _loader) = client(&[
            ("https://storage.test/oak/meta/versions.json", versions),
            ("https://api.test/modules/oak", description),
        ]);

        let versions = client.package_versions("oak").await.unwrap();
        assert_eq!(versions.latest, "v10.1.0");
        assert_eq!(versions.versions.len(), 2);
        assert_eq!(
            client.latest_version("oak").await.as_deref(),
            Some("v10.1.0")
        );
        assert_eq!(
            client.package_description("oak").await.as_deref(),
            Some("A middleware framework")
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_absent() {
        let (client, _loader) =
            client(&[("https://storage.test/bad/meta/versions.json", "<html>")]);
        assert!(client.package_versions("bad").await.is_none());
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a.test/", "/x/y"), "https://a.test/x/y");
        assert_eq!(join_url("https://a.test", "x"), "https://a.test/x");
    }
}
