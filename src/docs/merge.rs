//! Declaration merging
//!
//! The analyzer emits one node per declaration, so a namespace or interface
//! declared several times shows up several times. Those are folded into the
//! first occurrence. Nothing else is deduplicated: function overloads and
//! other same-named declarations stay separate, and a class never merges with
//! an interface of the same name.

use std::collections::HashMap;

use crate::docs::nodes::{DocNode, DocNodeDef, InterfaceDef};

/// Merge repeated namespace and interface declarations, keeping first-seen
/// order. The first doc comment found for a merged symbol wins.
pub fn merge_entries(nodes: Vec<DocNode>) -> Vec<DocNode> {
    let mut merged: Vec<DocNode> = Vec::with_capacity(nodes.len());
    let mut namespaces: HashMap<String, usize> = HashMap::new();
    let mut interfaces: HashMap<String, usize> = HashMap::new();

    for node in nodes {
        let seen = match &node.def {
            DocNodeDef::Namespace { .. } => namespaces.get(&node.name).copied(),
            DocNodeDef::Interface { .. } => interfaces.get(&node.name).copied(),
            _ => None,
        };

        match seen {
            Some(index) => absorb(&mut merged[index], node),
            None => {
                match &node.def {
                    DocNodeDef::Namespace { .. } => {
                        namespaces.insert(node.name.clone(), merged.len());
                    }
                    DocNodeDef::Interface { .. } => {
                        interfaces.insert(node.name.clone(), merged.len());
                    }
                    _ => {}
                }
                merged.push(node);
            }
        }
    }

    merged
}

/// Fold `node` into `target`, which is known to be the same kind and name.
fn absorb(target: &mut DocNode, node: DocNode) {
    if target.js_doc.is_none() {
        target.js_doc = node.js_doc;
    }

    match (&mut target.def, node.def) {
        (
            DocNodeDef::Namespace { namespace_def: dst },
            DocNodeDef::Namespace { namespace_def: src },
        ) => {
            dst.elements.extend(src.elements);
        }
        (
            DocNodeDef::Interface { interface_def: dst },
            DocNodeDef::Interface { interface_def: src },
        ) => merge_interface(dst, src),
        _ => {}
    }
}

fn merge_interface(into: &mut InterfaceDef, from: InterfaceDef) {
    into.call_signatures.extend(from.call_signatures);
    into.index_signatures.extend(from.index_signatures);
    into.methods.extend(from.methods);
    into.properties.extend(from.properties);
}
