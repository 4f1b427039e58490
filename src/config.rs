//! Process configuration
//!
//! Everything is read once at startup from command line flags, each with an
//! environment variable fallback.

use clap::Parser;
use std::path::PathBuf;

/// Byte budget of the resource cache when `MAX_CACHE_SIZE` is unset or unusable.
pub const DEFAULT_MAX_CACHE_SIZE: usize = 25_000_000;

pub const DEFAULT_REGISTRY_HOST: &str = "https://deno.land";
pub const DEFAULT_STORAGE_BASE: &str =
    "http://deno-registry2-prod-storagebucket-b3a31d16.s3-website-us-east-1.amazonaws.com/";
pub const DEFAULT_API_BASE: &str = "https://api.deno.land/modules/";
pub const DEFAULT_ANALYZER: &str = "deno";

/// MCP server that documents remote JavaScript and TypeScript modules
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Total bytes of fetched source kept in memory before LRU eviction
    #[arg(
        long,
        env = "MAX_CACHE_SIZE",
        default_value_t = DEFAULT_MAX_CACHE_SIZE,
        value_parser = parse_cache_size
    )]
    pub max_cache_size: usize,

    /// Directory holding pre-built documentation snapshots
    #[arg(long, env = "MODULE_DOCS_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Program invoked as `<analyzer> doc --json <url>` to document a module
    #[arg(long, env = "MODULE_DOCS_ANALYZER", default_value = DEFAULT_ANALYZER)]
    pub analyzer: String,

    /// Registry host module URLs are built from when indexing packages
    #[arg(long, env = "MODULE_DOCS_REGISTRY_HOST", default_value = DEFAULT_REGISTRY_HOST)]
    pub registry_host: String,

    /// Base URL of the registry's package metadata storage
    #[arg(long, env = "MODULE_DOCS_STORAGE_BASE", default_value = DEFAULT_STORAGE_BASE)]
    pub storage_base: String,

    /// Base URL of the registry API used for package descriptions
    #[arg(long, env = "MODULE_DOCS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            static_dir: PathBuf::from("static"),
            analyzer: DEFAULT_ANALYZER.to_string(),
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
            storage_base: DEFAULT_STORAGE_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Lenient cache size parsing: leading digits are used, anything unusable
/// (empty, non-numeric, zero) falls back to the default.
fn parse_cache_size(value: &str) -> Result<usize, String> {
    Ok(cache_size_from_str(value))
}

pub fn cache_size_from_str(value: &str) -> usize {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<usize>() {
        Ok(0) | Err(_) => DEFAULT_MAX_CACHE_SIZE,
        Ok(size) => size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_size_from_str() {
        assert_eq!(cache_size_from_str("1000"), 1000);
        assert_eq!(cache_size_from_str(" 42 "), 42);
        assert_eq!(cache_size_from_str("300kb"), 300);
        assert_eq!(cache_size_from_str(""), DEFAULT_MAX_CACHE_SIZE);
        assert_eq!(cache_size_from_str("lots"), DEFAULT_MAX_CACHE_SIZE);
        assert_eq!(cache_size_from_str("0"), DEFAULT_MAX_CACHE_SIZE);
    }

    #[test]
    fn test_config_from_args() {
        let config = Config::parse_from([
            "module-docs-mcp",
            "--max-cache-size",
            "nope",
            "--static-dir",
            "/tmp/snapshots",
        ]);
        assert_eq!(config.max_cache_size, DEFAULT_MAX_CACHE_SIZE);
        assert_eq!(config.static_dir, PathBuf::from("/tmp/snapshots"));
        assert_eq!(config.analyzer, DEFAULT_ANALYZER);
    }
}
