use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::cache::entries::EntriesCache;
use crate::cache::redirect::resolve_redirect;
use crate::docs::{
    nodes::{DocNode, find_symbol},
    outputs::{
        CacheStatusOutput, DocsErrorOutput, ModuleDocsOutput, RedirectOutput, SymbolDocsOutput,
    },
};
use crate::error::DocsError;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetModuleDocsParams {
    #[schemars(
        description = "The module locator, e.g. 'https://deno.land/std@0.120.0/http/server.ts' or a built-in library such as 'deno/stable'"
    )]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetSymbolDocsParams {
    #[schemars(description = "The module locator")]
    pub url: String,
    #[schemars(
        description = "The symbol name. Use dots to reach into namespaces (e.g., 'Deno.Listener')"
    )]
    pub symbol: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ResolveRedirectParams {
    #[schemars(description = "The module locator to resolve")]
    pub url: String,
}

#[derive(Clone)]
pub struct DocsTools {
    entries: EntriesCache,
}

impl DocsTools {
    pub fn new(entries: EntriesCache) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &EntriesCache {
        &self.entries
    }

    pub async fn get_module_docs(
        &self,
        params: GetModuleDocsParams,
    ) -> Result<ModuleDocsOutput, DocsErrorOutput> {
        let url = params.url;
        if let Some(location) = resolve_redirect(self.entries.resources(), &url).await {
            return Ok(ModuleDocsOutput::Redirect { url, location });
        }

        let entries = self.documented(&url).await?;
        Ok(ModuleDocsOutput::Entries {
            url,
            entries: entries.as_ref().clone(),
        })
    }

    pub async fn get_symbol_docs(
        &self,
        params: GetSymbolDocsParams,
    ) -> Result<SymbolDocsOutput, DocsErrorOutput> {
        let GetSymbolDocsParams { url, symbol } = params;
        if let Some(location) = resolve_redirect(self.entries.resources(), &url).await {
            return Ok(SymbolDocsOutput::Redirect { url, location });
        }

        let entries = self.documented(&url).await?;
        let nodes: Vec<_> = find_symbol(&entries, &symbol)
            .into_iter()
            .cloned()
            .collect();
        if nodes.is_empty() {
            return Err(DocsError::NotFound(format!(
                "The symbol \"{symbol}\" cannot be found in \"{url}\""
            ))
            .into());
        }

        Ok(SymbolDocsOutput::Symbol { url, symbol, nodes })
    }

    pub async fn resolve_redirect(&self, params: ResolveRedirectParams) -> RedirectOutput {
        let location = resolve_redirect(self.entries.resources(), &params.url).await;
        RedirectOutput {
            url: params.url,
            location,
        }
    }

    pub fn cache_status(&self) -> CacheStatusOutput {
        CacheStatusOutput::new(self.entries.resources().stats(), self.entries.len())
    }

    async fn documented(&self, url: &str) -> Result<Arc<Vec<DocNode>>, DocsErrorOutput> {
        if let Some(host) = static_host(url) {
            self.entries.maybe_cache_static(url, host).await;
        }
        self.entries.get_entries(url).await.map_err(|e| {
            tracing::debug!("Failed to document {}: {}", url, e);
            DocsErrorOutput::from(e)
        })
    }
}

/// `lib[@version]` of a built-in `deno/<lib>[@version]` locator.
fn static_host(url: &str) -> Option<&str> {
    let mut segments = url.split('/');
    match (segments.next(), segments.next()) {
        (Some("deno"), Some(host)) if !host.is_empty() => Some(host),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_host() {
        assert_eq!(static_host("deno/stable"), Some("stable"));
        assert_eq!(static_host("deno/unstable@1.18.0"), Some("unstable@1.18.0"));
        assert_eq!(static_host("deno/"), None);
        assert_eq!(static_host("https://deno.land/x/oak/mod.ts"), None);
    }
}
