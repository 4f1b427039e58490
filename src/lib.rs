pub mod cache;
pub mod config;
pub mod docs;
pub mod error;
pub mod index;
pub mod service;

pub use config::Config;
pub use error::DocsError;
pub use service::ModuleDocsService;
