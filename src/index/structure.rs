use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::docs::nodes::DocNode;

/// An "index" of a package release.
///
/// Both maps keep insertion order through JSON round trips; group display
/// order depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStructure {
    /// Containing directory to the modules that represent its contents
    pub structure: IndexMap<String, Vec<String>>,
    /// Declarations of every module in `structure` that produced any
    pub entries: IndexMap<String, Vec<DocNode>>,
}

impl IndexStructure {
    pub fn module_count(&self) -> usize {
        self.structure.values().map(Vec::len).sum()
    }

    pub fn documented_count(&self) -> usize {
        self.entries.len()
    }
}
