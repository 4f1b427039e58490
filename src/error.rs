//! Error taxonomy surfaced by documentation lookups
//!
//! Loader and cache failures never show up here: they collapse to `None` and
//! callers read that as "not found".

/// Substring of the analyzer's error text that marks an unresolvable module.
pub const UNABLE_TO_LOAD_SPECIFIER: &str = "Unable to load specifier";

pub type Result<T> = std::result::Result<T, DocsError>;

/// Errors produced while documenting a module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocsError {
    /// The module could not be resolved or fetched by the analyzer.
    #[error("{0}")]
    NotFound(String),

    /// The analyzer rejected the module for a reason other than not-found.
    #[error("{0}")]
    BadRequest(String),

    /// The analyzer failed without a recognizable error.
    #[error("{0}")]
    Internal(String),
}

impl DocsError {
    pub fn not_found(url: &str) -> Self {
        Self::NotFound(format!("The module \"{url}\" cannot be found"))
    }

    pub fn bad_request(message: &str) -> Self {
        Self::BadRequest(format!("Bad request: {message}"))
    }

    /// Short machine-readable name, used in tool outputs.
    pub fn kind(&self) -> &'static str {
        match self {
            DocsError::NotFound(_) => "not_found",
            DocsError::BadRequest(_) => "bad_request",
            DocsError::Internal(_) => "internal",
        }
    }

    /// HTTP status a web front end would answer with.
    pub fn status(&self) -> u16 {
        match self {
            DocsError::NotFound(_) => 404,
            DocsError::BadRequest(_) => 400,
            DocsError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DocsError::not_found("https://deno.land/x/missing/mod.ts");
        assert_eq!(
            err.to_string(),
            "The module \"https://deno.land/x/missing/mod.ts\" cannot be found"
        );
        assert_eq!(err.kind(), "not_found");
        assert_eq!(err.status(), 404);

        let err = DocsError::bad_request("unexpected token");
        assert_eq!(err.to_string(), "Bad request: unexpected token");
        assert_eq!(err.status(), 400);
    }
}
