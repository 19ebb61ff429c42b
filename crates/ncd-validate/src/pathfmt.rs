//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Renders an instance node's position as the canonical XPath carried
//! in `error-path` (RFC 6241 §4.3), module-qualifying each step and
//! appending key predicates for list entries.

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_yang::{NodeKind, SchemaDomain};

pub fn instance_path(tree: &InstanceTree, domain: &SchemaDomain, node: NodeId) -> String {
    let mut steps = Vec::new();
    let mut current = Some(node);
    while let Some(id) = current {
        if id == tree.root {
            break;
        }
        steps.push(step_text(tree, domain, id));
        current = tree.parent(id);
    }
    steps.reverse();
    format!("/{}", steps.join("/"))
}

fn step_text(tree: &InstanceTree, domain: &SchemaDomain, node: NodeId) -> String {
    let inst = tree.get(node);
    let module = module_prefix(domain, &inst.namespace).unwrap_or_else(|| inst.name.clone());
    let base = format!("{module}:{}", inst.name);
    let Some(schema_id) = inst.schema else {
        return base;
    };
    if let NodeKind::List { keys, .. } = &domain.tree.get(schema_id).kind {
        if let Some(values) = tree.key_tuple(node, keys) {
            let predicate: String = keys
                .iter()
                .zip(values.iter())
                .map(|(k, v)| format!("[{k}='{v}']"))
                .collect();
            return format!("{base}{predicate}");
        }
    }
    base
}

fn module_prefix(domain: &SchemaDomain, namespace: &str) -> Option<String> {
    domain
        .modules
        .values()
        .find(|m| m.namespace == namespace)
        .map(|m| m.name.clone())
}
