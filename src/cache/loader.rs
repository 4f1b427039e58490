//! Remote resource loading
//!
//! A loader turns a locator into the body the transport finally landed on.
//! Every failure, including non-2xx responses, is reported as `None`.

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// A fetched resource.
///
/// `locator` is the canonical locator, after redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename = "module")]
pub struct Resource {
    #[serde(rename = "specifier")]
    pub locator: String,
    pub headers: BTreeMap<String, String>,
    pub content: String,
}

impl Resource {
    pub fn new(locator: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            headers: BTreeMap::new(),
            content: content.into(),
        }
    }

    /// Add a header, lower-casing its name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn size_bytes(&self) -> usize {
        self.content.len()
    }
}

pub type LoadFuture<'a> = BoxFuture<'a, Option<Arc<Resource>>>;

/// Anything that can resolve a locator to a resource.
///
/// This is also the callback shape handed to the documentation analyzer for
/// resolving imports.
pub trait ResourceLoader: Send + Sync {
    fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a>;
}

/// Loader backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    /// Create a loader with a client that follows redirects
    pub fn new() -> Result<Self> {
        let user_agent = Self::format_user_agent();

        tracing::info!("Creating HTTP client with User-Agent: {}", user_agent);

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn format_user_agent() -> String {
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    async fn fetch(&self, locator: &str) -> Option<Resource> {
        let url = match Url::parse(locator) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Unparsable specifier {}: {}", locator, e);
                return None;
            }
        };

        match url.scheme() {
            "http" | "https" => {}
            "file" => {
                tracing::error!("local specifier requested: {}", locator);
                return None;
            }
            scheme => {
                tracing::debug!("Unsupported scheme {} for {}", scheme, locator);
                return None;
            }
        }

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", locator, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Fetching {} returned HTTP {}", locator, response.status());
            // drain the body so the connection can be reused
            let _ = response.bytes().await;
            return None;
        }

        let final_locator = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        match response.text().await {
            Ok(content) => Some(Resource {
                locator: final_locator,
                headers,
                content,
            }),
            Err(e) => {
                tracing::debug!("Failed to read body of {}: {}", locator, e);
                None
            }
        }
    }
}

impl ResourceLoader for HttpLoader {
    fn load<'a>(&'a self, locator: &'a str) -> LoadFuture<'a> {
        Box::pin(async move { self.fetch(locator).await.map(Arc::new) })
    }
}
