//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use indextree::NodeId;

use crate::tree::InstanceTree;

/// Short-circuit control returned by a visitor callback, per the
/// document-order traversal contract: `Continue` into children,
/// `SkipSubtree` to move to the next sibling without descending,
/// `StopOk`/`StopErr` to abandon the walk entirely.
pub enum WalkControl<E> {
    Continue,
    SkipSubtree,
    StopOk,
    StopErr(E),
}

/// Walks `root`'s subtree in document order, calling `visit` on each
/// node before descending into its children. Returns `Err` only when
/// the visitor itself requested `StopErr`.
pub fn walk_document_order<E>(
    tree: &InstanceTree,
    root: NodeId,
    visit: &mut impl FnMut(&InstanceTree, NodeId) -> WalkControl<E>,
) -> Result<bool, E> {
    match visit(tree, root) {
        WalkControl::StopErr(e) => return Err(e),
        WalkControl::StopOk => return Ok(false),
        WalkControl::SkipSubtree => return Ok(true),
        WalkControl::Continue => {}
    }
    for child in root.children(&tree.arena) {
        if !walk_document_order(tree, child, visit)? {
            return Ok(false);
        }
    }
    Ok(true)
}
