//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use ncd_yang::SchemaNodeId;

/// The edit-config operation attribute (RFC 6241 §7.2), carried
/// explicitly on a node or inherited from the nearest ancestor that
/// declares one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    Merge,
    Replace,
    Create,
    Delete,
    Remove,
    None,
}

impl Operation {
    pub fn from_attr(raw: &str) -> Option<Operation> {
        Some(match raw {
            "merge" => Operation::Merge,
            "replace" => Operation::Replace,
            "create" => Operation::Create,
            "delete" => Operation::Delete,
            "remove" => Operation::Remove,
            "none" => Operation::None,
            _ => return None,
        })
    }
}

/// `insert`/`key`/`value` attributes (RFC 6241 §7.2, `yang:insert` for
/// the RESTCONF-native form) on a user-ordered list or leaf-list entry.
#[derive(Clone, Debug)]
pub struct InsertHint {
    pub first: bool,
    pub last: bool,
    /// For lists: the key predicate of the `before`/`after` sibling.
    /// For leaf-lists: the `value` attribute content.
    pub anchor: Option<String>,
    pub before: bool,
}

#[derive(Clone, Debug)]
pub enum Content {
    /// A container, list entry, choice/case wrapper, or anydata root:
    /// its value lives entirely in its indextree children.
    Element,
    /// A leaf or leaf-list entry's lexical value, exactly as it
    /// appeared in the source document (pre-type-validation).
    Text(String),
}

/// One node of a bound instance tree. Stored as the payload type of an
/// [`indextree::Arena`]; structure (parent/children/siblings) lives in
/// the arena, not here.
#[derive(Clone, Debug)]
pub struct InstanceNode {
    pub name: String,
    /// The owning module's namespace URI, resolved from the XML prefix
    /// at binding time (or inherited from the parent for unprefixed
    /// elements, per RFC 7950 §7.21.5 instance-data conventions).
    pub namespace: String,
    /// `None` for nodes under an unresolved mount-point boundary or for
    /// `anydata` payload content, whose descendants are opaque.
    pub schema: Option<SchemaNodeId>,
    pub content: Content,
    pub operation: Option<Operation>,
    pub insert: Option<InsertHint>,
    /// True once this leaf's value was synthesized by default-insertion
    /// rather than read from the source document (validator pass 0).
    pub is_default: bool,
}

impl InstanceNode {
    pub fn element(name: impl Into<String>, namespace: impl Into<String>) -> InstanceNode {
        InstanceNode {
            name: name.into(),
            namespace: namespace.into(),
            schema: None,
            content: Content::Element,
            operation: None,
            insert: None,
            is_default: false,
        }
    }

    pub fn leaf(name: impl Into<String>, namespace: impl Into<String>, value: impl Into<String>) -> InstanceNode {
        InstanceNode {
            name: name.into(),
            namespace: namespace.into(),
            schema: None,
            content: Content::Text(value.into()),
            operation: None,
            insert: None,
            is_default: false,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(s) => Some(s),
            Content::Element => None,
        }
    }
}
