//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 3: each `unique` statement's descendant leaf tuple is
//! unique across the sibling entries of its list. Entries missing one
//! or more of the tuple's leaves are excluded from the uniqueness set
//! rather than treated as a collision, per RFC 7950 §7.8.3.

use std::collections::HashSet;

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_yang::{NodeKind, SchemaDomain};

use crate::pathfmt::instance_path;

pub fn check_unique(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) {
    let Some(schema_id) = tree.get(node).schema else {
        for child in tree.children(node) {
            check_unique(domain, tree, child, errors);
        }
        return;
    };

    if let NodeKind::List { unique, .. } = &domain.tree.get(schema_id).kind {
        let list_name = domain.tree.get(schema_id).name.clone();
        let entries: Vec<NodeId> = tree.children(node).filter(|&c| tree.get(c).name == list_name).collect();
        for descriptor in unique {
            let mut seen: HashSet<Vec<String>> = HashSet::new();
            for &entry in &entries {
                if let Some(tuple) = unique_tuple(tree, entry, descriptor) {
                    if !seen.insert(tuple.clone()) {
                        errors.push(
                            RpcError::new(ErrorTag::OperationFailed)
                                .path(instance_path(tree, domain, entry))
                                .app_tag("data-not-unique")
                                .message(format!(
                                    "entries of list '{list_name}' are not unique on {descriptor:?}"
                                )),
                        );
                    }
                }
            }
        }
    }

    for child in tree.children(node) {
        check_unique(domain, tree, child, errors);
    }
}

/// Resolves a `unique` descriptor's slash-separated leaf paths relative
/// to a list entry. `None` if any member leaf is absent.
fn unique_tuple(tree: &InstanceTree, entry: NodeId, descriptor: &[String]) -> Option<Vec<String>> {
    descriptor
        .iter()
        .map(|path| resolve_relative_leaf(tree, entry, path))
        .collect()
}

fn resolve_relative_leaf(tree: &InstanceTree, start: NodeId, path: &str) -> Option<String> {
    let mut node = start;
    for segment in path.split('/') {
        let local = segment.split(':').next_back().unwrap_or(segment);
        node = tree.children(node).find(|&c| tree.get(c).name == local)?;
    }
    tree.get(node).text().map(str::to_owned)
}
