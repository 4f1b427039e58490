//! Output types for package index tools

use serde::{Deserialize, Serialize};

use crate::index::structure::IndexStructure;

/// Where a package index came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSource {
    /// Pre-built snapshot from the static directory
    Static,
    /// Built from package metadata and the analyzer
    Built,
}

/// Output from get_package_index operation
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PackageIndexOutput {
    pub package: String,
    pub version: String,
    pub path: String,
    pub source: IndexSource,
    pub module_count: usize,
    pub documented_count: usize,
    #[serde(flatten)]
    pub index: IndexStructure,
}

impl PackageIndexOutput {
    pub fn new(
        package: &str,
        version: &str,
        path: &str,
        source: IndexSource,
        index: IndexStructure,
    ) -> Self {
        Self {
            package: package.to_string(),
            version: version.to_string(),
            path: path.to_string(),
            source,
            module_count: index.module_count(),
            documented_count: index.documented_count(),
            index,
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from get_package_info operation
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PackageInfoOutput {
    pub package: String,
    pub latest: String,
    pub versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PackageInfoOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_index_output_is_flattened() {
        let mut index = IndexStructure::default();
        index
            .structure
            .insert("".to_string(), vec!["/mod.ts".to_string()]);
        let output = PackageIndexOutput::new("oak", "v10.0.0", "/", IndexSource::Built, index);

        let value: Value = serde_json::from_str(&output.to_json()).unwrap();
        assert_eq!(value["source"], "built");
        assert_eq!(value["module_count"], 1);
        assert_eq!(value["documented_count"], 0);
        assert_eq!(value["structure"][""][0], "/mod.ts");
        assert!(value["entries"].as_object().unwrap().is_empty());
    }
}
