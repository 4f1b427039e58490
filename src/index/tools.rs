use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::docs::outputs::DocsErrorOutput;
use crate::error::DocsError;
use crate::index::{
    builder::IndexBuilder,
    outputs::{IndexSource, PackageIndexOutput, PackageInfoOutput},
};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetPackageIndexParams {
    #[schemars(description = "The registry package name (e.g., 'std', 'oak')")]
    pub package: String,
    #[schemars(description = "The package version (defaults to the latest published version)")]
    pub version: Option<String>,
    #[schemars(description = "Directory to index, relative to the package root (default: '/')")]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetPackageInfoParams {
    #[schemars(description = "The registry package name")]
    pub package: String,
}

#[derive(Clone)]
pub struct IndexTools {
    builder: IndexBuilder,
    registry_host: String,
}

impl IndexTools {
    pub fn new(builder: IndexBuilder, registry_host: impl Into<String>) -> Self {
        Self {
            builder,
            registry_host: registry_host.into(),
        }
    }

    pub async fn get_package_index(
        &self,
        params: GetPackageIndexParams,
    ) -> Result<PackageIndexOutput, DocsErrorOutput> {
        let package = params.package;
        let version = match params.version {
            Some(version) => version,
            None => self.latest_version(&package).await?,
        };
        let path = params.path.unwrap_or_else(|| "/".to_string());

        // Snapshots only cover whole packages
        if is_root(&path) {
            if let Some(index) = self.builder.static_index(&package, &version).await {
                return Ok(PackageIndexOutput::new(
                    &package,
                    &version,
                    &path,
                    IndexSource::Static,
                    index.as_ref().clone(),
                ));
            }
        }

        match self
            .builder
            .build_index(&self.registry_host, &package, &version, &path)
            .await
        {
            Some(index) => Ok(PackageIndexOutput::new(
                &package,
                &version,
                &path,
                IndexSource::Built,
                index.as_ref().clone(),
            )),
            None => Err(DocsError::NotFound(format!(
                "No documented modules found for \"{package}@{version}{path}\""
            ))
            .into()),
        }
    }

    pub async fn get_package_info(
        &self,
        params: GetPackageInfoParams,
    ) -> Result<PackageInfoOutput, DocsErrorOutput> {
        let registry = self.builder.registry();
        let Some(versions) = registry.package_versions(&params.package).await else {
            return Err(package_not_found(&params.package).into());
        };
        let description = registry.package_description(&params.package).await;

        Ok(PackageInfoOutput {
            package: params.package,
            latest: versions.latest.clone(),
            versions: versions.versions.clone(),
            description,
        })
    }

    async fn latest_version(&self, package: &str) -> Result<String, DocsErrorOutput> {
        self.builder
            .registry()
            .latest_version(package)
            .await
            .ok_or_else(|| package_not_found(package).into())
    }
}

fn package_not_found(package: &str) -> DocsError {
    DocsError::NotFound(format!("The package \"{package}\" cannot be found"))
}

fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}
