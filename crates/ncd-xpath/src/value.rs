//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use indextree::NodeId;
use ncd_instance::InstanceTree;

/// An XPath 1.0 value: a node-set, number, string, or boolean, with the
/// conversion rules of the 1.0 spec (§3.x) implemented on top.
#[derive(Clone, Debug)]
pub enum Value {
    NodeSet(Vec<NodeId>),
    Number(f64),
    String(String),
    Boolean(bool),
}

impl Value {
    pub fn boolean(&self, _tree: &InstanceTree) -> bool {
        match self {
            Value::NodeSet(ns) => !ns.is_empty(),
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }

    pub fn number(&self, tree: &InstanceTree) -> f64 {
        match self {
            Value::NodeSet(ns) => ns
                .first()
                .map(|&n| string_value_of_node(tree, n))
                .map(|s| s.trim().parse().unwrap_or(f64::NAN))
                .unwrap_or(f64::NAN),
            Value::Number(n) => *n,
            Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn string(&self, tree: &InstanceTree) -> String {
        match self {
            Value::NodeSet(ns) => ns
                .first()
                .map(|&n| string_value_of_node(tree, n))
                .unwrap_or_default(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

/// The XPath "string-value" of a node: its leaf text, or the
/// concatenation of all descendant leaf text in document order for an
/// element node (RFC XPath 1.0 §5.1-5.7; YANG instance trees never have
/// mixed content, so this reduces to "the text of the first descendant
/// leaf" for a container/list entry in practice).
pub fn string_value_of_node(tree: &InstanceTree, node: NodeId) -> String {
    if let Some(text) = tree.get(node).text() {
        return text.to_owned();
    }
    let mut out = String::new();
    for child in tree.children(node) {
        out.push_str(&string_value_of_node(tree, child));
    }
    out
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
