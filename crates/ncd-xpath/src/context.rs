//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_yang::SchemaDomain;

use crate::value::Value;

/// The evaluation context of RFC XPath 1.0 §1: a context node, its
/// position and the size of the containing node-set, the active
/// namespace bindings, and any bound variables. `current_node` is the
/// *initial* context node for the whole expression, used only by the
/// `current()` function, which must not change as nested steps move
/// the context node.
pub struct Context<'a> {
    pub tree: &'a InstanceTree,
    pub domain: &'a SchemaDomain,
    pub node: NodeId,
    pub position: usize,
    pub size: usize,
    pub variables: &'a HashMap<String, Value>,
    pub current_node: NodeId,
}

impl<'a> Context<'a> {
    pub fn root(tree: &'a InstanceTree, domain: &'a SchemaDomain, node: NodeId, variables: &'a HashMap<String, Value>) -> Context<'a> {
        Context {
            tree,
            domain,
            node,
            position: 1,
            size: 1,
            variables,
            current_node: node,
        }
    }

    pub fn with_node(&self, node: NodeId, position: usize, size: usize) -> Context<'a> {
        Context {
            tree: self.tree,
            domain: self.domain,
            node,
            position,
            size,
            variables: self.variables,
            current_node: self.current_node,
        }
    }
}
