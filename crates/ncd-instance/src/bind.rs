//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Binds a parsed XML document to a schema domain: walks it in document
//! order, resolving each element's name within the ancestor namespace
//! context against the expected schema children. Comments are pruned
//! for free (the XML reader never surfaces them as elements); unknown
//! well-formed nodes are rejected unless they land at a mount-point
//! boundary or under a declared `anydata`.

use std::fmt;

use indextree::NodeId;
use ncd_yang::schema::MountPointKind;
use ncd_yang::{NodeKind, SchemaDomain, SchemaNodeId};
use xml::attribute::OwnedAttribute;
use xml::name::OwnedName;
use xml::reader::XmlEvent;
use xml::ParserConfig;

use crate::node::{Content, InstanceNode, Operation};
use crate::tree::InstanceTree;

#[derive(Debug)]
pub enum BindError {
    Xml(String),
    UnexpectedElement { parent: String, name: String },
    UnknownTopLevel { name: String },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Xml(e) => write!(f, "malformed XML: {e}"),
            BindError::UnexpectedElement { parent, name } => {
                write!(f, "unexpected element '{name}' under '{parent}'")
            }
            BindError::UnknownTopLevel { name } => {
                write!(f, "unknown top-level element '{name}'")
            }
        }
    }
}

impl std::error::Error for BindError {}

/// Resolves the mounted schema domain for a mount-point instance the
/// first time it is touched, per RFC 8528 §3.1. Implemented by
/// `ncd-mount`; kept as a trait object here so `ncd-instance` never
/// depends back on it.
pub trait MountResolver {
    fn resolve_mount(&mut self, mount_point: SchemaNodeId, canonical_xpath: &str) -> Option<SchemaNodeId>;
}

pub struct NoMounts;

impl MountResolver for NoMounts {
    fn resolve_mount(&mut self, _mount_point: SchemaNodeId, _canonical_xpath: &str) -> Option<SchemaNodeId> {
        None
    }
}

/// Binds `xml` as the content of a synthetic `root_name` wrapper
/// against `domain`'s top-level data nodes.
pub fn bind_document(
    xml: &str,
    domain: &SchemaDomain,
    root_name: &str,
    mount: &mut dyn MountResolver,
) -> Result<InstanceTree, BindError> {
    bind_document_impl(xml, domain, root_name, None, mount)
}

/// Binds `xml` as the content of a synthetic `root_name` wrapper
/// against `parent_schema`'s own schema children instead of the
/// domain's top-level roots — for content that sits one level below a
/// root node in the schema tree without being a root itself, such as
/// an rpc's `input`/`output` wrapper.
pub fn bind_document_at(
    xml: &str,
    domain: &SchemaDomain,
    root_name: &str,
    parent_schema: SchemaNodeId,
    mount: &mut dyn MountResolver,
) -> Result<InstanceTree, BindError> {
    bind_document_impl(xml, domain, root_name, Some(parent_schema), mount)
}

fn bind_document_impl(
    xml: &str,
    domain: &SchemaDomain,
    root_name: &str,
    initial_schema: Option<SchemaNodeId>,
    mount: &mut dyn MountResolver,
) -> Result<InstanceTree, BindError> {
    let mut tree = InstanceTree::new(root_name);
    let reader = ParserConfig::new()
        .trim_whitespace(true)
        .ignore_comments(true)
        .create_reader(xml.as_bytes());

    // One entry per open element: (instance node id, schema node id or
    // None for unbound/anydata content, accumulated text).
    let mut stack: Vec<(NodeId, Option<SchemaNodeId>, String)> = vec![(tree.root, initial_schema, String::new())];

    for event in reader {
        let event = event.map_err(|e| BindError::Xml(e.to_string()))?;
        match event {
            XmlEvent::StartElement {
                name, attributes, ..
            } => {
                let (parent_id, parent_schema, _) = *stack.last().unwrap();
                let schema = resolve_child_schema(domain, parent_schema, &name, mount);
                let node_id = tree.create_node(InstanceNode::element(
                    name.local_name.clone(),
                    name.namespace.clone().unwrap_or_default(),
                ));
                apply_attributes(&mut tree, node_id, &attributes);
                if let Some(schema_id) = schema {
                    tree.get_mut(node_id).schema = Some(schema_id);
                } else if parent_schema.is_some() {
                    return Err(BindError::UnexpectedElement {
                        parent: stack_name(&tree, parent_id),
                        name: name.local_name.clone(),
                    });
                } else if parent_id == tree.root {
                    return Err(BindError::UnknownTopLevel {
                        name: name.local_name.clone(),
                    });
                }
                tree.append_child(parent_id, node_id);
                stack.push((node_id, schema, String::new()));
            }
            XmlEvent::EndElement { .. } => {
                let (node_id, schema, text) = stack.pop().expect("balanced XML");
                let is_leaf = schema
                    .map(|s| matches!(domain.tree.get(s).kind, NodeKind::Leaf { .. } | NodeKind::LeafList { .. }))
                    .unwrap_or(false);
                if is_leaf {
                    tree.get_mut(node_id).content = Content::Text(text);
                }
            }
            XmlEvent::Characters(text) | XmlEvent::CData(text) => {
                if let Some(top) = stack.last_mut() {
                    top.2.push_str(&text);
                }
            }
            _ => {}
        }
    }

    Ok(tree)
}

fn resolve_child_schema(
    domain: &SchemaDomain,
    parent_schema: Option<SchemaNodeId>,
    name: &OwnedName,
    mount: &mut dyn MountResolver,
) -> Option<SchemaNodeId> {
    let candidates = match parent_schema {
        Some(id) => {
            if let NodeKind::Leaf { .. } | NodeKind::LeafList { .. } | NodeKind::Anydata | NodeKind::Anyxml =
                &domain.tree.get(id).kind
            {
                return None;
            }
            if let NodeKind::Container { .. } = &domain.tree.get(id).kind {
                if domain.tree.get(id).mount_point != MountPointKind::None {
                    let canonical = name.local_name.clone();
                    return mount.resolve_mount(id, &canonical);
                }
            }
            domain.tree.data_children(id)
        }
        None => domain.tree.roots.clone(),
    };
    candidates
        .into_iter()
        .find(|&c| domain.tree.get(c).name == name.local_name)
}

fn apply_attributes(tree: &mut InstanceTree, node_id: NodeId, attributes: &[OwnedAttribute]) {
    for attr in attributes {
        if attr.name.local_name == "operation" {
            if let Some(op) = Operation::from_attr(&attr.value) {
                tree.get_mut(node_id).operation = Some(op);
            }
        }
    }
}

fn stack_name(tree: &InstanceTree, id: NodeId) -> String {
    tree.get(id).name.clone()
}

/// Resolves the effective operation for `node`, inheriting from the
/// nearest ancestor that declares one, defaulting to `merge` at the
/// document root per RFC 6241 §7.2.
pub fn effective_operation(tree: &InstanceTree, mut node: NodeId) -> Operation {
    loop {
        if let Some(op) = tree.get(node).operation {
            return op;
        }
        match tree.parent(node) {
            Some(parent) => node = parent,
            None => return Operation::Merge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_yang::load_domain;

    const EX_MODULE: &str = r#"
        module ex {
          namespace "urn:example:ex";
          prefix ex;
          container top {
            leaf name { type string; }
            list ifs {
              key "name";
              leaf name { type string; }
            }
          }
        }
    "#;

    #[test]
    fn binds_simple_document() {
        let domain = load_domain(vec![("ex".to_owned(), EX_MODULE.to_owned())], &[]).unwrap();
        let xml = r#"<top xmlns="urn:example:ex"><name>hi</name></top>"#;
        let tree = bind_document(xml, &domain, "config", &mut NoMounts).unwrap();
        let top = tree.children(tree.root).next().unwrap();
        assert_eq!(tree.get(top).name, "top");
        let name_leaf = tree.children(top).next().unwrap();
        assert_eq!(tree.get(name_leaf).text(), Some("hi"));
    }

    #[test]
    fn rejects_unknown_top_level_element() {
        let domain = load_domain(vec![("ex".to_owned(), EX_MODULE.to_owned())], &[]).unwrap();
        let xml = r#"<bogus xmlns="urn:example:ex"/>"#;
        let err = bind_document(xml, &domain, "config", &mut NoMounts).unwrap_err();
        assert!(matches!(err, BindError::UnknownTopLevel { .. }));
    }

    const RPC_MODULE: &str = r#"
        module ex {
          namespace "urn:example:ex";
          prefix ex;
          rpc reverse {
            input {
              leaf s { type string; }
            }
            output {
              leaf s { type string; }
            }
          }
        }
    "#;

    #[test]
    fn binds_document_at_an_interior_schema_node() {
        use ncd_yang::schema::NodeKind;

        let domain = load_domain(vec![("ex".to_owned(), RPC_MODULE.to_owned())], &[]).unwrap();
        let rpc = domain.tree.roots.iter().copied().find(|&id| matches!(domain.tree.get(id).kind, NodeKind::Rpc)).unwrap();
        let output = domain.tree.data_children(rpc).into_iter().find(|&id| matches!(domain.tree.get(id).kind, NodeKind::Output)).unwrap();

        let tree = bind_document_at("<s>cba</s>", &domain, "output", output, &mut NoMounts).unwrap();
        let s = tree.children(tree.root).next().unwrap();
        assert_eq!(tree.get(s).text(), Some("cba"));
    }
}
