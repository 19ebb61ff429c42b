//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 8: `min-elements`/`max-elements` on lists and
//! leaf-lists.

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_yang::{NodeKind, SchemaDomain};

use crate::pathfmt::instance_path;

pub fn check_min_max(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) {
    let Some(schema_id) = tree.get(node).schema else {
        for child in tree.children(node) {
            check_min_max(domain, tree, child, errors);
        }
        return;
    };

    for &child_schema in &domain.tree.data_children(schema_id) {
        let schema_node = domain.tree.get(child_schema);
        let (min, max) = match &schema_node.kind {
            NodeKind::List { min_elements, max_elements, .. } => (*min_elements, *max_elements),
            NodeKind::LeafList { min_elements, max_elements, .. } => (*min_elements, *max_elements),
            _ => continue,
        };
        let count = tree.children(node).filter(|&c| tree.get(c).name == schema_node.name).count() as u32;
        if count < min {
            errors.push(
                RpcError::new(ErrorTag::OperationFailed)
                    .path(format!("{}/{}", instance_path(tree, domain, node), schema_node.name))
                    .message(format!(
                        "'{}' has {count} entries, fewer than the declared min-elements {min}",
                        schema_node.name
                    )),
            );
        }
        if let Some(max) = max {
            if count > max {
                errors.push(
                    RpcError::new(ErrorTag::OperationFailed)
                        .path(format!("{}/{}", instance_path(tree, domain, node), schema_node.name))
                        .message(format!(
                            "'{}' has {count} entries, more than the declared max-elements {max}",
                            schema_node.name
                        )),
                );
            }
        }
    }

    for child in tree.children(node) {
        check_min_max(domain, tree, child, errors);
    }
}
