//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 2: every list entry carries all its key leaves, and
//! the key tuple is unique among the entries of the same list instance.

use std::collections::HashSet;

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_yang::{NodeKind, SchemaDomain};

use crate::pathfmt::instance_path;

pub fn check_keys(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) {
    let Some(schema_id) = tree.get(node).schema else {
        for child in tree.children(node) {
            check_keys(domain, tree, child, errors);
        }
        return;
    };

    if let NodeKind::List { keys, .. } = &domain.tree.get(schema_id).kind {
        let list_name = domain.tree.get(schema_id).name.clone();
        let mut seen: HashSet<Vec<String>> = HashSet::new();
        for entry in tree.children(node).filter(|&c| tree.get(c).name == list_name) {
            match tree.key_tuple(entry, keys) {
                Some(values) => {
                    if !seen.insert(values.clone()) {
                        errors.push(
                            RpcError::new(ErrorTag::BadElement)
                                .path(instance_path(tree, domain, entry))
                                .message(format!("duplicate key tuple {values:?} in list '{list_name}'")),
                        );
                    }
                }
                None => {
                    errors.push(
                        RpcError::new(ErrorTag::MissingElement)
                            .path(instance_path(tree, domain, entry))
                            .message(format!("list entry is missing one or more of its key leaves {keys:?}")),
                    );
                }
            }
        }
    }

    for child in tree.children(node) {
        check_keys(domain, tree, child, errors);
    }
}
