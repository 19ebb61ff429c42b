//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Default augmentation, run before the numbered validation steps: adds
//! explicit default leaves for any `default`-bearing leaf absent from
//! its container, materializing empty non-presence containers along the
//! way when a descendant needs one to exist in. Choice `default-case`
//! handling only reaches the default case's own leaves/leaf-lists, not
//! containers nested inside it — a deliberately narrow slice of RFC
//! 7950 §7.9.3 that covers the common case (a handful of scalar
//! defaults per case) without a second copy of the container-recursion
//! logic duplicated under a case boundary.

use indextree::NodeId;
use ncd_instance::{InstanceNode, InstanceTree};
use ncd_yang::{NodeKind, SchemaDomain, SchemaNodeId};

pub fn apply_defaults(domain: &SchemaDomain, tree: &mut InstanceTree, node: NodeId) {
    let schema_children = match tree.get(node).schema {
        Some(schema_id) => domain.tree.data_children(schema_id),
        None => domain.tree.roots.clone(),
    };

    for child_schema in schema_children {
        apply_default_child(domain, tree, node, child_schema);
    }

    if let Some(schema_id) = tree.get(node).schema {
        if let NodeKind::Choice { default_case: Some(case_name), .. } = &domain.tree.get(schema_id).kind {
            apply_default_case(domain, tree, node, schema_id, case_name);
        }
    }

    let children: Vec<NodeId> = tree.children(node).collect();
    for child in children {
        apply_defaults(domain, tree, child);
    }
}

fn apply_default_child(domain: &SchemaDomain, tree: &mut InstanceTree, parent: NodeId, child_schema: SchemaNodeId) {
    let schema_node = domain.tree.get(child_schema);
    let name = schema_node.name.clone();
    let namespace = schema_node.namespace.clone();
    let present = tree.children(parent).any(|c| tree.get(c).name == name);

    match &schema_node.kind {
        NodeKind::Leaf { default: Some(value), .. } if !present => {
            insert_default_leaf(tree, parent, &name, &namespace, value.clone(), child_schema);
        }
        NodeKind::LeafList { defaults, .. } if !defaults.is_empty() && !present => {
            for value in defaults.clone() {
                insert_default_leaf(tree, parent, &name, &namespace, value, child_schema);
            }
        }
        NodeKind::Container { presence: None } if !present && schema_has_default(domain, child_schema) => {
            let mut container = InstanceNode::element(name, namespace);
            container.schema = Some(child_schema);
            container.is_default = true;
            let id = tree.create_node(container);
            tree.append_child(parent, id);
        }
        _ => {}
    }
}

fn insert_default_leaf(
    tree: &mut InstanceTree,
    parent: NodeId,
    name: &str,
    namespace: &str,
    value: String,
    schema_id: SchemaNodeId,
) {
    let mut leaf = InstanceNode::leaf(name.to_owned(), namespace.to_owned(), value);
    leaf.schema = Some(schema_id);
    leaf.is_default = true;
    let id = tree.create_node(leaf);
    tree.append_child(parent, id);
}

fn apply_default_case(domain: &SchemaDomain, tree: &mut InstanceTree, parent: NodeId, choice_id: SchemaNodeId, case_name: &str) {
    let Some(&case_id) = domain
        .tree
        .get(choice_id)
        .children
        .iter()
        .find(|&&c| domain.tree.get(c).name == case_name)
    else {
        return;
    };
    for leaf_schema in domain.tree.data_children(case_id) {
        apply_default_child(domain, tree, parent, leaf_schema);
    }
}

/// Whether materializing `schema_id` as an empty container would still
/// need at least one default value placed somewhere inside it.
fn schema_has_default(domain: &SchemaDomain, schema_id: SchemaNodeId) -> bool {
    domain.tree.data_children(schema_id).iter().any(|&child| match &domain.tree.get(child).kind {
        NodeKind::Leaf { default: Some(_), .. } => true,
        NodeKind::LeafList { defaults, .. } => !defaults.is_empty(),
        NodeKind::Container { presence: None } => schema_has_default(domain, child),
        NodeKind::Choice { default_case: Some(_), .. } => true,
        _ => false,
    })
}
