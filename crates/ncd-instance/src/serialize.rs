//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Serialization to XML (canonical form: each node uses its own
//! module's prefix, declared at first use) and to JSON per RFC 7951
//! (object keys are `module:name` only when the owning module differs
//! from the parent's).

use std::collections::HashMap;
use std::io::Cursor;

use indextree::NodeId;
use ncd_yang::{NodeKind, SchemaDomain};
use serde_json::{Map, Value as Json};
use xml::writer::XmlEvent as WriterEvent;
use xml::EmitterConfig;

use crate::node::Content;
use crate::tree::InstanceTree;

pub fn to_xml(tree: &InstanceTree, domain: &SchemaDomain, root: NodeId) -> String {
    let mut buf = Vec::new();
    {
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .create_writer(Cursor::new(&mut buf));
        for child in tree.children(root) {
            write_node(tree, domain, child, &mut writer, &mut HashMap::new());
        }
    }
    String::from_utf8(buf).expect("XML writer only emits UTF-8")
}

fn write_node(
    tree: &InstanceTree,
    domain: &SchemaDomain,
    id: NodeId,
    writer: &mut xml::writer::EventWriter<Cursor<&mut Vec<u8>>>,
    declared: &mut HashMap<String, String>,
) {
    let node = tree.get(id);
    let mut start = WriterEvent::start_element(node.name.as_str());
    let needs_decl = declared.get("xmlns").map(|d| d != &node.namespace).unwrap_or(true);
    if needs_decl {
        start = start.default_ns(node.namespace.as_str());
        declared.insert("xmlns".to_owned(), node.namespace.clone());
    }
    writer.write(start).expect("in-memory XML writer cannot fail");

    match &node.content {
        Content::Text(text) => {
            writer
                .write(WriterEvent::characters(text))
                .expect("in-memory XML writer cannot fail");
        }
        Content::Element => {
            for child in tree.children(id) {
                write_node(tree, domain, child, writer, &mut declared.clone());
            }
        }
    }
    writer
        .write(WriterEvent::end_element())
        .expect("in-memory XML writer cannot fail");
}

/// Converts `root`'s children to an RFC 7951 JSON object, qualifying a
/// key with its module name only when that module differs from
/// `parent_module`.
pub fn to_json(tree: &InstanceTree, domain: &SchemaDomain, root: NodeId, parent_module: &str) -> Json {
    let mut obj = Map::new();
    let mut arrays: HashMap<String, Vec<Json>> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for child in tree.children(root) {
        let node = tree.get(child);
        let module = module_owning(domain, node.schema).unwrap_or_else(|| parent_module.to_owned());
        let key = if module == parent_module {
            node.name.clone()
        } else {
            format!("{module}:{}", node.name)
        };

        let is_listlike = node
            .schema
            .map(|s| matches!(domain.tree.get(s).kind, NodeKind::List { .. } | NodeKind::LeafList { .. }))
            .unwrap_or(false);

        let value = node_value(tree, domain, child, &module);
        if is_listlike {
            if !order.contains(&key) {
                order.push(key.clone());
            }
            arrays.entry(key).or_default().push(value);
        } else {
            order.push(key.clone());
            obj.insert(key, value);
        }
    }
    for (key, values) in arrays {
        obj.insert(key, Json::Array(values));
    }
    Json::Object(obj)
}

fn node_value(tree: &InstanceTree, domain: &SchemaDomain, id: NodeId, module: &str) -> Json {
    let node = tree.get(id);
    match &node.content {
        Content::Text(text) => leaf_json(text, node.schema, domain),
        Content::Element => to_json(tree, domain, id, module),
    }
}

/// Maps a leaf's lexical value to its RFC 7951 §6.1 JSON representation:
/// booleans and 8/16/32-bit integers as JSON numbers/booleans, 64-bit
/// integers and decimal64 as JSON strings, `empty` as JSON `null`.
fn leaf_json(text: &str, schema: Option<ncd_yang::SchemaNodeId>, domain: &SchemaDomain) -> Json {
    use ncd_yang::schema::NodeKind as Nk;
    use ncd_yang::types::Builtin;

    let builtin = schema.and_then(|s| match &domain.tree.get(s).kind {
        Nk::Leaf { type_spec, .. } | Nk::LeafList { type_spec, .. } => Some(&type_spec.builtin),
        _ => None,
    });

    match builtin {
        Some(Builtin::Empty) => Json::Null,
        Some(Builtin::Boolean) => text.parse::<bool>().map(Json::Bool).unwrap_or(Json::String(text.to_owned())),
        Some(Builtin::Int8 | Builtin::Int16 | Builtin::Int32 | Builtin::Uint8 | Builtin::Uint16 | Builtin::Uint32) => {
            text.parse::<i64>()
                .map(Json::from)
                .unwrap_or(Json::String(text.to_owned()))
        }
        // 64-bit integers and decimal64 are strings per RFC 7951 §6.1,
        // since JSON numbers cannot losslessly represent their range.
        Some(Builtin::Int64 | Builtin::Uint64 | Builtin::Decimal64 { .. }) => Json::String(text.to_owned()),
        _ => Json::String(text.to_owned()),
    }
}

fn module_owning(domain: &SchemaDomain, schema: Option<ncd_yang::SchemaNodeId>) -> Option<String> {
    let schema = schema?;
    let namespace = &domain.tree.get(schema).namespace;
    domain
        .modules
        .values()
        .find(|m| &m.namespace == namespace)
        .map(|m| m.name.clone())
}
