//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 7: every `require-instance true` leafref's target
//! path resolves, against the bound instance tree, to at least one node
//! whose string-value equals the leaf's own value.

use std::collections::HashMap;

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_xpath::Value;
use ncd_yang::types::Builtin;
use ncd_yang::{NodeKind, SchemaDomain};

use crate::pathfmt::instance_path;

pub fn check_leafrefs(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) -> Result<(), ncd_xpath::EvalError> {
    if let Some(schema_id) = tree.get(node).schema {
        let type_spec = match &domain.tree.get(schema_id).kind {
            NodeKind::Leaf { type_spec, .. } | NodeKind::LeafList { type_spec, .. } => Some(type_spec),
            _ => None,
        };
        if let Some(type_spec) = type_spec {
            if let Builtin::LeafRef { path, require_instance: true } = &type_spec.builtin {
                if let Some(own_value) = tree.get(node).text() {
                    let variables = HashMap::new();
                    let ctx = ncd_xpath::Context::root(tree, domain, node, &variables);
                    let targets = match ncd_xpath::evaluate(&ctx, path)? {
                        Value::NodeSet(ns) => ns,
                        _ => Vec::new(),
                    };
                    let satisfied = targets
                        .iter()
                        .any(|&t| tree.get(t).text() == Some(own_value));
                    if !satisfied {
                        errors.push(
                            RpcError::new(ErrorTag::DataMissing)
                                .path(instance_path(tree, domain, node))
                                .message(format!("leafref target for value '{own_value}' does not exist")),
                        );
                    }
                }
            }
        }
    }

    for child in tree.children(node) {
        check_leafrefs(domain, tree, child, errors)?;
    }
    Ok(())
}
