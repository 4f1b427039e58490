//! # Docs Module
//!
//! Declaration nodes, declaration merging, the analyzer boundary and the
//! module documentation tools.

pub mod analyzer;
pub mod merge;
pub mod nodes;
pub mod outputs;
pub mod tools;

pub use analyzer::{Analyzer, AnalyzerError, CommandAnalyzer};
pub use merge::merge_entries;
pub use nodes::{DocNode, DocNodeDef, InterfaceDef, JsDoc, NamespaceDef, find_symbol};
