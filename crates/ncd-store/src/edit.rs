//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! `edit-config` merge semantics (RFC 6241 §7.2): applies an instance
//! fragment, whose descendants may each carry their own `operation`
//! attribute inherited from the nearest ancestor that declared one,
//! onto a target tree.

use indextree::NodeId;
use ncd_instance::{effective_operation, Content, InstanceNode, InstanceTree, InsertHint, Operation};
use ncd_utils::{ErrorTag, RpcError, RpcErrors};
use ncd_validate::instance_path;
use ncd_yang::{NodeKind, SchemaDomain, SchemaNodeId};

/// Applies `edit`'s fragment (rooted at its synthetic document node)
/// onto `target`'s corresponding position, per-child operation
/// semantics all the way down.
pub fn apply_edit_config(domain: &SchemaDomain, target: &mut InstanceTree, edit: &InstanceTree) -> Result<(), RpcErrors> {
    let mut errors = Vec::new();
    merge_children(domain, target, target.root, edit, edit.root, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RpcErrors(errors))
    }
}

fn merge_children(
    domain: &SchemaDomain,
    target: &mut InstanceTree,
    target_parent: NodeId,
    edit: &InstanceTree,
    edit_parent: NodeId,
    errors: &mut Vec<RpcError>,
) {
    let edit_children: Vec<NodeId> = edit.children(edit_parent).collect();
    for edit_child in edit_children {
        let op = effective_operation(edit, edit_child);
        let schema_id = edit.get(edit_child).schema;
        let name = edit.get(edit_child).name.clone();
        let key_tuple = list_key_tuple(domain, edit, edit_child, schema_id);
        let target_match = find_matching_child(domain, target, target_parent, &name, key_tuple.as_ref(), schema_id);

        match op {
            Operation::Merge => match target_match {
                Some(t) => merge_one(domain, target, t, edit, edit_child, errors),
                None => {
                    create_subtree(target, target_parent, edit, edit_child);
                }
            },
            Operation::Replace => {
                if let Some(t) = target_match {
                    target.detach_subtree(t);
                }
                create_subtree(target, target_parent, edit, edit_child);
            }
            Operation::Create => match target_match {
                Some(t) => errors.push(
                    RpcError::new(ErrorTag::DataExists)
                        .path(instance_path(target, domain, t))
                        .message(format!("'{name}' already exists")),
                ),
                None => {
                    create_subtree(target, target_parent, edit, edit_child);
                }
            },
            Operation::Delete => match target_match {
                Some(t) => target.detach_subtree(t),
                None => errors.push(
                    RpcError::new(ErrorTag::DataMissing)
                        .path(instance_path(target, domain, target_parent))
                        .message(format!("'{name}' does not exist")),
                ),
            },
            Operation::Remove => {
                if let Some(t) = target_match {
                    target.detach_subtree(t);
                }
            }
            Operation::None => {
                if let Some(t) = target_match {
                    merge_children(domain, target, t, edit, edit_child, errors);
                }
            }
        }
    }
}

fn merge_one(domain: &SchemaDomain, target: &mut InstanceTree, target_node: NodeId, edit: &InstanceTree, edit_node: NodeId, errors: &mut Vec<RpcError>) {
    match edit.get(edit_node).text() {
        Some(text) => target.get_mut(target_node).content = Content::Text(text.to_owned()),
        None => merge_children(domain, target, target_node, edit, edit_node, errors),
    }
}

fn list_key_tuple(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, schema_id: Option<SchemaNodeId>) -> Option<Vec<String>> {
    let schema_id = schema_id?;
    match &domain.tree.get(schema_id).kind {
        NodeKind::List { keys, .. } => tree.key_tuple(node, keys),
        _ => None,
    }
}

fn find_matching_child(
    domain: &SchemaDomain,
    tree: &InstanceTree,
    parent: NodeId,
    name: &str,
    key_tuple: Option<&Vec<String>>,
    schema_id: Option<SchemaNodeId>,
) -> Option<NodeId> {
    match (schema_id, key_tuple) {
        (Some(sid), Some(tuple)) => {
            if let NodeKind::List { keys, .. } = &domain.tree.get(sid).kind {
                tree.children(parent)
                    .filter(|&c| tree.get(c).name == name)
                    .find(|&c| tree.key_tuple(c, keys).as_ref() == Some(tuple))
            } else {
                None
            }
        }
        _ => tree.children(parent).find(|&c| tree.get(c).name == name),
    }
}

/// Deep-copies `edit_node`'s subtree under `target_parent`, honoring a
/// RESTCONF `insert`/`point` or NETCONF `yang:insert`/`yang:key`
/// anchor if the source node carried one.
fn create_subtree(target: &mut InstanceTree, target_parent: NodeId, edit: &InstanceTree, edit_node: NodeId) -> NodeId {
    let src = edit.get(edit_node);
    let mut node = match &src.content {
        Content::Element => InstanceNode::element(src.name.clone(), src.namespace.clone()),
        Content::Text(text) => InstanceNode::leaf(src.name.clone(), src.namespace.clone(), text.clone()),
    };
    node.schema = src.schema;
    let insert: Option<InsertHint> = src.insert.clone();
    let new_id = target.create_node(node);

    match &insert {
        Some(hint) if !(hint.first || hint.last) => {
            let anchor = hint
                .anchor
                .as_ref()
                .and_then(|value| target.children(target_parent).find(|&c| target.get(c).text() == Some(value.as_str())));
            target.insert_ordered(target_parent, new_id, anchor, hint.before);
        }
        Some(hint) if hint.first => target.insert_ordered(target_parent, new_id, None, true),
        _ => target.append_child(target_parent, new_id),
    }

    for child in edit.children(edit_node).collect::<Vec<_>>() {
        create_subtree(target, new_id, edit, child);
    }
    new_id
}
