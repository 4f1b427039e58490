//! Output types for documentation tools
//!
//! These types are used as the return values from docs tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use crate::cache::resources::CacheStats;
use crate::cache::utils::human_size;
use crate::docs::nodes::DocNode;
use crate::error::DocsError;

/// Output from get_module_docs operation
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "status")]
pub enum ModuleDocsOutput {
    /// The requested locator resolves elsewhere; document `location` instead
    #[serde(rename = "redirect")]
    Redirect { url: String, location: String },
    #[serde(rename = "success")]
    Entries { url: String, entries: Vec<DocNode> },
}

impl ModuleDocsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from get_symbol_docs operation
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "status")]
pub enum SymbolDocsOutput {
    #[serde(rename = "redirect")]
    Redirect { url: String, location: String },
    #[serde(rename = "success")]
    Symbol {
        url: String,
        symbol: String,
        nodes: Vec<DocNode>,
    },
}

impl SymbolDocsOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from resolve_redirect operation
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct RedirectOutput {
    pub url: String,
    /// Canonical locator, or null when `url` is already canonical or unreachable
    pub location: Option<String>,
}

impl RedirectOutput {
    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Output from cache_status operation
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CacheStatusOutput {
    pub resources: usize,
    pub resource_bytes: usize,
    pub resource_bytes_human: String,
    pub budget_bytes: usize,
    pub budget_bytes_human: String,
    pub documented_modules: usize,
}

impl CacheStatusOutput {
    pub fn new(stats: CacheStats, documented_modules: usize) -> Self {
        Self {
            resources: stats.entries,
            resource_bytes: stats.total_bytes,
            resource_bytes_human: human_size(stats.total_bytes),
            budget_bytes: stats.budget_bytes,
            budget_bytes_human: human_size(stats.budget_bytes),
            documented_modules,
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize response"}"#.to_string())
    }
}

/// Error output for documentation and index operations
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct DocsErrorOutput {
    pub error: String,
    pub kind: String,
}

impl DocsErrorOutput {
    pub fn new(message: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            kind: kind.into(),
        }
    }

    /// Convert to JSON string for MCP response
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"Failed to serialize error"}"#.to_string())
    }
}

impl From<DocsError> for DocsErrorOutput {
    fn from(err: DocsError) -> Self {
        Self::new(err.to_string(), err.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::nodes::DocNodeDef;
    use serde_json::{Value, json};

    #[test]
    fn test_module_docs_output_shapes() {
        let redirect = ModuleDocsOutput::Redirect {
            url: "https://deno.land/x/oak/mod.ts".to_string(),
            location: "https://deno.land/x/oak@v10.0.0/mod.ts".to_string(),
        };
        let value: Value = serde_json::from_str(&redirect.to_json()).unwrap();
        assert_eq!(value["status"], "redirect");
        assert_eq!(value["location"], "https://deno.land/x/oak@v10.0.0/mod.ts");

        let entries = ModuleDocsOutput::Entries {
            url: "https://deno.land/x/oak@v10.0.0/mod.ts".to_string(),
            entries: vec![DocNode::new(
                "listen",
                DocNodeDef::Function {
                    function_def: json!({}),
                },
            )],
        };
        let json = entries.to_json();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["entries"][0]["kind"], "function");

        let back: ModuleDocsOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn test_error_output_from_docs_error() {
        let output = DocsErrorOutput::from(DocsError::not_found("https://x.test/a.ts"));
        assert_eq!(output.kind, "not_found");
        assert_eq!(
            serde_json::from_str::<Value>(&output.to_json()).unwrap(),
            json!({
                "error": "The module \"https://x.test/a.ts\" cannot be found",
                "kind": "not_found"
            })
        );
    }

    #[test]
    fn test_cache_status_output() {
        let stats = CacheStats {
            entries: 2,
            total_bytes: 1_500,
            budget_bytes: 25_000_000,
        };
        let output = CacheStatusOutput::new(stats, 7);
        assert_eq!(output.resources, 2);
        assert_eq!(output.resource_bytes_human, human_size(1_500));
        assert_eq!(output.documented_modules, 7);
    }
}
