//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The cooked schema tree: one [`SchemaNode`] per data-defining statement
//! (and per `input`/`output`/`case` wrapper), stored in a
//! [`generational_arena::Arena`] so that leafref targets, augment
//! destinations and mount-point bindings can all be plain
//! [`SchemaNodeId`] values instead of owned subtrees.

use generational_arena::{Arena, Index};

use crate::types::TypeSpec;

pub type SchemaNodeId = Index;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderedBy {
    System,
    User,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MountPointKind {
    None,
    /// The extension statement carries no `module-set`; the host must
    /// solicit one per instance via a callback, per RFC 8528 §3.2.
    Inline,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Container {
        presence: Option<String>,
    },
    Leaf {
        type_spec: TypeSpec,
        default: Option<String>,
        mandatory: bool,
    },
    LeafList {
        type_spec: TypeSpec,
        defaults: Vec<String>,
        ordered_by: OrderedBy,
        min_elements: u32,
        max_elements: Option<u32>,
    },
    List {
        keys: Vec<String>,
        unique: Vec<Vec<String>>,
        ordered_by: OrderedBy,
        min_elements: u32,
        max_elements: Option<u32>,
    },
    Choice {
        default_case: Option<String>,
        mandatory: bool,
    },
    Case,
    Anydata,
    Anyxml,
    Rpc,
    Action,
    Notification,
    Input,
    Output,
}

#[derive(Clone, Debug)]
pub struct MustStatement {
    pub expr: ncd_xpath_ast::Expr,
    pub error_app_tag: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SchemaNode {
    pub kind: NodeKind,
    pub name: String,
    /// The namespace (module URI) owning this node's name, per RFC 7950
    /// §7.21.5 (not necessarily the enclosing module's, after `augment`).
    pub namespace: String,
    pub config: bool,
    pub when: Option<ncd_xpath_ast::Expr>,
    pub musts: Vec<MustStatement>,
    pub mount_point: MountPointKind,
    pub parent: Option<SchemaNodeId>,
    pub children: Vec<SchemaNodeId>,
}

impl SchemaNode {
    pub fn is_data_node(&self) -> bool {
        !matches!(self.kind, NodeKind::Case)
    }

    pub fn is_presence_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container { presence: Some(_) })
    }

    pub fn is_list_like(&self) -> bool {
        matches!(self.kind, NodeKind::List { .. } | NodeKind::LeafList { .. })
    }
}

/// The resolved schema tree shared by an entire schema domain (the main
/// server schema, or one mounted schema per RFC 8528).
#[derive(Debug, Default)]
pub struct SchemaTree {
    pub arena: Arena<SchemaNode>,
    /// Top-level data nodes, rpcs and notifications, in source order.
    pub roots: Vec<SchemaNodeId>,
}

impl SchemaTree {
    pub fn get(&self, id: SchemaNodeId) -> &SchemaNode {
        &self.arena[id]
    }

    /// Enumerates the data-node children of `id`, flattening `choice`
    /// and `case` wrappers so callers never see them directly, per the
    /// schema-tree child enumeration contract.
    pub fn data_children<'a>(&'a self, id: SchemaNodeId) -> Vec<SchemaNodeId> {
        let mut out = Vec::new();
        self.collect_data_children(id, &mut out);
        out
    }

    fn collect_data_children(&self, id: SchemaNodeId, out: &mut Vec<SchemaNodeId>) {
        for &child in &self.arena[id].children {
            match &self.arena[child].kind {
                NodeKind::Choice { .. } => {
                    for &case in &self.arena[child].children {
                        self.collect_data_children(case, out);
                    }
                }
                NodeKind::Case => {
                    self.collect_data_children(child, out);
                }
                _ => out.push(child),
            }
        }
    }

    /// Finds a schema node by its canonical `/module:name/module:name...`
    /// path, descending from the module roots.
    pub fn find_by_path(&self, path: &str) -> Option<SchemaNodeId> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let mut candidates: Vec<SchemaNodeId> = self.roots.clone();
        let mut found = None;
        for (depth, seg) in segments.iter().enumerate() {
            let local = seg.split(':').next_back().unwrap_or(seg);
            let hit = candidates.iter().find(|&&id| self.arena[id].name == local)?;
            found = Some(*hit);
            if depth + 1 < segments.len() {
                candidates = self.data_children(*hit);
            }
        }
        found
    }
}
