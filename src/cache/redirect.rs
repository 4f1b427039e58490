//! Redirect detection
//!
//! Tells callers whether a locator lands somewhere else once fetched, so they
//! can point at the canonical locator instead of re-serving under the
//! original one.

use url::Url;

use crate::cache::loader::Resource;
use crate::cache::resources::ResourceCache;

/// Header naming the type declarations that document an implementation file.
pub const X_TYPESCRIPT_TYPES: &str = "x-typescript-types";

/// The locator a resource should be documented under.
///
/// An `x-typescript-types` header wins over the response locator, resolved
/// relative to it.
pub fn documentation_locator(resource: &Resource) -> String {
    let Some(types) = resource.header(X_TYPESCRIPT_TYPES) else {
        return resource.locator.clone();
    };

    let base = Url::parse(&resource.locator);
    match base.and_then(|base| base.join(types)) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!(
                "Ignoring unresolvable {} header {:?} on {}: {}",
                X_TYPESCRIPT_TYPES,
                types,
                resource.locator,
                e
            );
            resource.locator.clone()
        }
    }
}

/// Return the canonical locator for `locator` when it differs from the
/// requested one. Failed fetches and already-canonical locators yield `None`.
pub async fn resolve_redirect(cache: &ResourceCache, locator: &str) -> Option<String> {
    if !locator.starts_with("http") {
        return None;
    }

    let resource = cache.get_or_load(locator).await?;
    let canonical = documentation_locator(&resource);

    if canonical == locator {
        None
    } else {
        tracing::debug!("{} redirects to {}", locator, canonical);
        Some(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::loader::{LoadFuture, ResourceLoader};
    use std::collections::HashMap;
    use std::sync::Arc;

    const REACT_TYPES: &str = "https://cdn.esm.sh/v64/@types/react@17.0.38/index.d.ts";

    struct RedirectingLoader {
        responses: HashMap<&'static str, Resource>,
    }

    impl ResourceLoader for RedirectingLoader {
        fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a> {
            let resource = self.responses.get(locator).cloned().map(Arc::new);
            Box::pin(async move { resource })
        }
    }

    fn cache() -> ResourceCache {
        let mut responses = HashMap::new();
        responses.insert(
            "https://deno.land/std/http/mod.ts",
            Resource::new("https://deno.land/std@0.120.0/http/mod.ts", "export {};"),
        );
        responses.insert(
            "https://deno.land/std@0.120.0/http/mod.ts",
            Resource::new("https://deno.land/std@0.120.0/http/mod.ts", "export {};"),
        );
        responses.insert(
            "https://cdn.esm.sh/react",
            Resource::new("https://cdn.esm.sh/v64/react@17.0.2/index.js", "export {};")
                .with_header("X-TypeScript-Types", "/v64/@types/react@17.0.38/index.d.ts"),
        );
        responses.insert(
            "https://cdn.esm.sh/v64/react@17.0.2/index.js",
            Resource::new("https://cdn.esm.sh/v64/react@17.0.2/index.js", "export {};")
                .with_header("x-typescript-types", "../@types/react@17.0.38/index.d.ts"),
        );
        ResourceCache::new(Arc::new(RedirectingLoader { responses }), 1_000)
    }

    #[tokio::test]
    async fn test_redirected_locator_resolves_to_final_url() {
        let cache = cache();
        assert_eq!(
            resolve_redirect(&cache, "https://deno.land/std/http/mod.ts").await,
            Some("https://deno.land/std@0.120.0/http/mod.ts".to_string())
        );
    }

    #[tokio::test]
    async fn test_canonical_locator_has_no_redirect() {
        let cache = cache();
        assert_eq!(
            resolve_redirect(&cache, "https://deno.land/std@0.120.0/http/mod.ts").await,
            None
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_and_non_http_have_no_redirect() {
        let cache = cache();
        assert_eq!(
            resolve_redirect(&cache, "https://deno.land/x/nope/mod.ts").await,
            None
        );
        assert_eq!(resolve_redirect(&cache, "deno/stable").await, None);
    }

    #[tokio::test]
    async fn test_types_header_takes_precedence() {
        let cache = cache();
        assert_eq!(
            resolve_redirect(&cache, "https://cdn.esm.sh/react").await,
            Some(REACT_TYPES.to_string())
        );
        assert_eq!(
            resolve_redirect(&cache, "https://cdn.esm.sh/v64/react@17.0.2/index.js").await,
            Some(REACT_TYPES.to_string())
        );
    }
}
