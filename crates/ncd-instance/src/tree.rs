//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use indextree::{Arena, NodeId};

use crate::node::InstanceNode;

/// A bound XML instance tree: an [`indextree::Arena`] of [`InstanceNode`]
/// values rooted at a synthetic document node (never itself a real YANG
/// node — `<config>` for a datastore, `<rpc>` for a request, or a bare
/// wrapper for a single detached fragment).
#[derive(Clone, Debug)]
pub struct InstanceTree {
    pub arena: Arena<InstanceNode>,
    pub root: NodeId,
}

impl InstanceTree {
    pub fn new(root_name: impl Into<String>) -> InstanceTree {
        let mut arena = Arena::new();
        let root = arena.new_node(InstanceNode::element(root_name, ""));
        InstanceTree { arena, root }
    }

    pub fn get(&self, id: NodeId) -> &InstanceNode {
        self.arena[id].get()
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut InstanceNode {
        self.arena[id].get_mut()
    }

    pub fn create_node(&mut self, node: InstanceNode) -> NodeId {
        self.arena.new_node(node)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Inserts `child` honoring an ordered-by-user anchor: before/after
    /// a named sibling, or at the first/last position, per RESTCONF
    /// `insert`/`point` and NETCONF `yang:insert`/`yang:key`/`yang:value`.
    pub fn insert_ordered(&mut self, parent: NodeId, child: NodeId, anchor: Option<NodeId>, before: bool) {
        match anchor {
            Some(sibling) if before => sibling.insert_before(child, &mut self.arena),
            Some(sibling) => sibling.insert_after(child, &mut self.arena),
            None if before => match parent.children(&self.arena).next() {
                Some(first) => first.insert_before(child, &mut self.arena),
                None => parent.append(child, &mut self.arena),
            },
            None => parent.append(child, &mut self.arena),
        }
    }

    pub fn detach_subtree(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    pub fn find_by_name(&self, parent: NodeId, namespace: &str, name: &str) -> Option<NodeId> {
        parent
            .children(&self.arena)
            .find(|&c| self.get(c).namespace == namespace && self.get(c).name == name)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].parent()
    }

    /// The key tuple of a list entry, in schema key order, read
    /// straight from its already-bound key leaf children.
    pub fn key_tuple(&self, entry: NodeId, keys: &[String]) -> Option<Vec<String>> {
        keys.iter()
            .map(|key| {
                self.children(entry)
                    .find(|&c| self.get(c).name == *key)
                    .and_then(|c| self.get(c).text())
                    .map(str::to_owned)
            })
            .collect()
    }
}
