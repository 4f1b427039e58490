use std::sync::Arc;

use anyhow::Result;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::cache::{EntriesCache, HttpLoader, ResourceCache, ResourceLoader};
use crate::config::Config;
use crate::docs::{
    analyzer::{Analyzer, CommandAnalyzer},
    tools::{DocsTools, GetModuleDocsParams, GetSymbolDocsParams, ResolveRedirectParams},
};
use crate::index::{
    builder::IndexBuilder,
    meta::RegistryClient,
    tools::{GetPackageIndexParams, GetPackageInfoParams, IndexTools},
};

#[derive(Clone)]
pub struct ModuleDocsService {
    docs_tools: DocsTools,
    index_tools: IndexTools,
    tool_router: ToolRouter<Self>,
}

impl ModuleDocsService {
    pub fn new(config: &Config) -> Result<Self> {
        let loader = Arc::new(HttpLoader::new()?);
        let analyzer = Arc::new(CommandAnalyzer::new(&config.analyzer));
        Ok(Self::from_parts(loader, analyzer, config))
    }

    /// Assemble the service around an arbitrary loader and analyzer.
    ///
    /// Module sources and registry metadata share one resource cache.
    pub fn from_parts(
        loader: Arc<dyn ResourceLoader>,
        analyzer: Arc<dyn Analyzer>,
        config: &Config,
    ) -> Self {
        let resources = ResourceCache::new(loader, config.max_cache_size);
        let entries = EntriesCache::new(resources.clone(), analyzer, &config.static_dir);
        let registry = RegistryClient::new(
            Arc::new(resources),
            &config.storage_base,
            &config.api_base,
        );
        let builder = IndexBuilder::new(registry, entries.clone(), &config.static_dir);

        Self {
            docs_tools: DocsTools::new(entries),
            index_tools: IndexTools::new(builder, &config.registry_host),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl ModuleDocsService {
    // Docs tools
    #[tool(
        description = "Get the documentation of a JavaScript or TypeScript module by its URL. Returns the merged top-level declarations (functions, classes, interfaces, namespaces, ...). If the URL redirects (e.g. an unversioned URL), returns a redirect with the canonical location instead; call again with that location. Built-in runtime libraries are available as 'deno/<lib>' or 'deno/<lib>@<version>'."
    )]
    pub async fn get_module_docs(&self, params: Parameters<GetModuleDocsParams>) -> String {
        match self.docs_tools.get_module_docs(params.0).await {
            Ok(output) => output.to_json(),
            Err(e) => e.to_json(),
        }
    }

    #[tool(
        description = "Get the documentation of a single symbol in a module. Use dotted names to reach into namespaces (e.g., 'Deno.Listener'). Returns every declaration with that name, including overloads."
    )]
    pub async fn get_symbol_docs(&self, params: Parameters<GetSymbolDocsParams>) -> String {
        match self.docs_tools.get_symbol_docs(params.0).await {
            Ok(output) => output.to_json(),
            Err(e) => e.to_json(),
        }
    }

    #[tool(
        description = "Check whether a module URL resolves to a different canonical location, such as the versioned URL of an unversioned import or the type declarations named by an X-TypeScript-Types header. Returns null when the URL is already canonical or cannot be fetched."
    )]
    pub async fn resolve_redirect(&self, params: Parameters<ResolveRedirectParams>) -> String {
        self.docs_tools.resolve_redirect(params.0).await.to_json()
    }

    #[tool(
        description = "Show how many fetched resources and documented modules are held in memory, and the resource cache's byte budget."
    )]
    pub async fn cache_status(&self) -> String {
        self.docs_tools.cache_status().to_json()
    }

    // Index tools
    #[tool(
        description = "Build a documentation index of a registry package: every public directory mapped to the modules that represent it, plus the declarations of each documented module. Defaults to the latest version and the package root. Use get_package_info first to see the available versions."
    )]
    pub async fn get_package_index(&self, params: Parameters<GetPackageIndexParams>) -> String {
        match self.index_tools.get_package_index(params.0).await {
            Ok(output) => output.to_json(),
            Err(e) => e.to_json(),
        }
    }

    #[tool(
        description = "Get the latest version, all published versions and the description of a registry package."
    )]
    pub async fn get_package_info(&self, params: Parameters<GetPackageInfoParams>) -> String {
        match self.index_tools.get_package_info(params.0).await {
            Ok(output) => output.to_json(),
            Err(e) => e.to_json(),
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for ModuleDocsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "MCP server for reading the documentation of remote JavaScript and TypeScript modules. Use get_module_docs with a module URL to list its declarations, following any redirect it returns. Use get_symbol_docs to narrow down to one symbol. For registry packages, use get_package_info to find versions and get_package_index to see the package layout and the documentation of its entry modules.".to_string(),
            ),
            ..Default::default()
        }
    }
}
