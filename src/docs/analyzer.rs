//! Documentation analyzer boundary
//!
//! The analyzer turns a module locator into its declaration list. It is an
//! external tool; [`CommandAnalyzer`] drives one as a subprocess.

use futures::future::BoxFuture;
use serde::Deserialize;
use tokio::process::Command;

use crate::cache::loader::ResourceLoader;
use crate::docs::nodes::DocNode;
use crate::error::UNABLE_TO_LOAD_SPECIFIER;

/// How an analyzer run can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    /// The analyzer reported an error with a message.
    #[error("{0}")]
    Failed(String),

    /// The analyzer failed in a way that carries no usable message.
    #[error("unexpected analyzer failure: {0}")]
    Unexpected(String),
}

pub type AnalyzeFuture<'a> = BoxFuture<'a, Result<Vec<DocNode>, AnalyzerError>>;

/// Produces the raw declaration list for a module.
///
/// `loader` resolves any resource the analyzer needs.
pub trait Analyzer: Send + Sync {
    fn analyze<'a>(&'a self, url: &'a str, loader: &'a dyn ResourceLoader) -> AnalyzeFuture<'a>;
}

/// Both shapes `doc --json` has printed over time.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzerOutput {
    Nodes(Vec<DocNode>),
    Versioned { nodes: Vec<DocNode> },
}

impl AnalyzerOutput {
    fn into_nodes(self) -> Vec<DocNode> {
        match self {
            AnalyzerOutput::Nodes(nodes) | AnalyzerOutput::Versioned { nodes } => nodes,
        }
    }
}

/// Runs `<program> doc --json <url>` and parses its stdout.
///
/// The root module is loaded through the supplied loader first, so a module
/// that cannot be fetched fails fast with the analyzer's not-found wording
/// and the root source lands in the resource cache. Imports are resolved by
/// the subprocess itself.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    program: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: vec!["doc".to_string(), "--json".to_string()],
        }
    }

    /// Replace the arguments placed before the module URL
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    async fn run(
        &self,
        url: &str,
        loader: &dyn ResourceLoader,
    ) -> Result<Vec<DocNode>, AnalyzerError> {
        if loader.load(url).await.is_none() {
            return Err(AnalyzerError::Failed(format!(
                "{UNABLE_TO_LOAD_SPECIFIER} \"{url}\""
            )));
        }

        tracing::debug!("Running {} {} {}", self.program, self.args.join(" "), url);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AnalyzerError::Unexpected(format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnalyzerError::Failed(stderr.trim().to_string()));
        }

        serde_json::from_slice::<AnalyzerOutput>(&output.stdout)
            .map(AnalyzerOutput::into_nodes)
            .map_err(|e| AnalyzerError::Unexpected(format!("unreadable analyzer output: {e}")))
    }
}

impl Analyzer for CommandAnalyzer {
    fn analyze<'a>(&'a self, url: &'a str, loader: &'a dyn ResourceLoader) -> AnalyzeFuture<'a> {
        Box::pin(self.run(url, loader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::loader::{LoadFuture, Resource};
    use std::sync::Arc;

    struct OneModule;

    impl ResourceLoader for OneModule {
        fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a> {
            let found = (locator == "https://example.com/mod.ts")
                .then(|| Arc::new(Resource::new(locator, "export const a = 1;")));
            Box::pin(async move { found })
        }
    }

    #[derive(Default)]
    struct CountingLoader {
        requested: parking_lot::Mutex<Vec<String>>,
    }

    impl ResourceLoader for CountingLoader {
        fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a> {
            self.requested.lock().push(locator.to_string());
            let resource = Arc::new(Resource::new(locator, "export {};"));
            Box::pin(async move { Some(resource) })
        }
    }

    #[tokio::test]
    async fn test_unloadable_module_reports_not_found_wording() {
        let analyzer = CommandAnalyzer::new("definitely-not-an-installed-analyzer");
        let err = analyzer
            .analyze("https://example.com/missing.ts", &OneModule)
            .await
            .unwrap_err();

        match err {
            AnalyzerError::Failed(message) => assert!(message.contains(UNABLE_TO_LOAD_SPECIFIER)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_unexpected() {
        let analyzer = CommandAnalyzer::new("definitely-not-an-installed-analyzer");
        let err = analyzer
            .analyze("https://example.com/mod.ts", &OneModule)
            .await
            .unwrap_err();

        assert!(matches!(err, AnalyzerError::Unexpected(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_output_is_parsed() {
        let analyzer = CommandAnalyzer::new("sh").with_args([
            "-c",
            r#"echo '{"version":1,"nodes":[{"kind":"function","name":"a","functionDef":{}}]}'"#,
        ]);
        let nodes = analyzer
            .analyze("https://example.com/mod.ts", &OneModule)
            .await
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].name, "a");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_root_is_loaded_through_the_loader_once() {
        let loader = CountingLoader::default();
        let analyzer = CommandAnalyzer::new("sh").with_args(["-c", "echo '[]'"]);

        let nodes = analyzer
            .analyze("https://example.com/mod.ts", &loader)
            .await
            .unwrap();

        assert!(nodes.is_empty());
        assert_eq!(
            *loader.requested.lock(),
            vec!["https://example.com/mod.ts".to_string()]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        let analyzer =
            CommandAnalyzer::new("sh").with_args(["-c", "echo 'syntax error' >&2; exit 1"]);
        let err = analyzer
            .analyze("https://example.com/mod.ts", &OneModule)
            .await
            .unwrap_err();

        assert_eq!(err, AnalyzerError::Failed("syntax error".to_string()));
    }
}
