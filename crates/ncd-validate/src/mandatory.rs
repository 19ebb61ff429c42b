//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation steps 4-5 collapsed into a single pass that runs *after*
//! `when`-pruning (see [`crate::when`]): the distilled checklist lists
//! "mandatory" and "when-pruning re-checks mandatory" as separate
//! steps, but since the pruned tree is the only one worth checking
//! mandatory-ness against, running the check twice would just repeat
//! the same work on a superset tree and report phantom violations for
//! nodes a `when` condition had already legitimately pruned.

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_yang::{NodeKind, SchemaDomain, SchemaNodeId};

use crate::pathfmt::instance_path;

pub fn check_mandatory(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) {
    let schema_id = match tree.get(node).schema {
        Some(id) => id,
        None => {
            for child in tree.children(node) {
                check_mandatory(domain, tree, child, errors);
            }
            return;
        }
    };

    for &child_schema in &domain.tree.data_children(schema_id) {
        check_child(domain, tree, node, child_schema, errors);
    }

    for child in tree.children(node) {
        check_mandatory(domain, tree, child, errors);
    }
}

fn check_child(domain: &SchemaDomain, tree: &InstanceTree, parent: NodeId, schema_id: SchemaNodeId, errors: &mut Vec<RpcError>) {
    let schema_node = domain.tree.get(schema_id);
    let instance_child = tree.children(parent).find(|&c| tree.get(c).name == schema_node.name);

    match &schema_node.kind {
        NodeKind::Leaf { mandatory: true, .. } => {
            if instance_child.is_none() {
                errors.push(
                    RpcError::new(ErrorTag::MissingElement)
                        .path(format!("{}/{}", instance_path(tree, domain, parent), schema_node.name))
                        .message(format!("mandatory leaf '{}' is absent", schema_node.name)),
                );
            }
        }
        NodeKind::Container { presence: None } => match instance_child {
            Some(id) => {
                // Recursion into its children happens via the caller's
                // top-level walk once it reaches this node itself.
                let _ = id;
            }
            None if schema_requires_mandatory(domain, schema_id) => {
                errors.push(
                    RpcError::new(ErrorTag::MissingElement)
                        .path(format!("{}/{}", instance_path(tree, domain, parent), schema_node.name))
                        .message(format!(
                            "non-presence container '{}' is absent but hosts a mandatory descendant",
                            schema_node.name
                        )),
                );
            }
            None => {}
        },
        NodeKind::Choice { mandatory: true, default_case: None } => {
            let chosen = domain
                .tree
                .data_children(schema_id)
                .iter()
                .any(|&case_child| tree.children(parent).any(|c| tree.get(c).name == domain.tree.get(case_child).name));
            if !chosen {
                errors.push(
                    RpcError::new(ErrorTag::MissingElement)
                        .path(instance_path(tree, domain, parent))
                        .message(format!("mandatory choice '{}' has no case materialized", schema_node.name)),
                );
            }
        }
        _ => {}
    }
}

/// Whether an absent non-presence container would, if materialized
/// empty, still violate a mandatory statement somewhere inside it.
/// Stops descending into presence containers and lists: their absence
/// is always legal regardless of what they'd mandate if present.
fn schema_requires_mandatory(domain: &SchemaDomain, schema_id: SchemaNodeId) -> bool {
    domain.tree.data_children(schema_id).iter().any(|&child| {
        let node = domain.tree.get(child);
        match &node.kind {
            NodeKind::Leaf { mandatory, .. } => *mandatory,
            NodeKind::Choice { mandatory, default_case, .. } => *mandatory && default_case.is_none(),
            NodeKind::Container { presence: None } => schema_requires_mandatory(domain, child),
            NodeKind::Container { presence: Some(_) } | NodeKind::List { .. } | NodeKind::LeafList { .. } => false,
            _ => false,
        }
    })
}
