//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 5's pruning half: detaches any subtree whose `when`
//! evaluates false. Non-fatal by construction — this never appends to
//! the error list, it only mutates the tree that later steps see.

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_xpath::EvalError;
use ncd_yang::SchemaDomain;
use std::collections::HashMap;

pub fn prune_when(domain: &SchemaDomain, tree: &mut InstanceTree) -> Result<(), EvalError> {
    let mut to_detach = Vec::new();
    collect_pruned(domain, tree, tree.root, &mut to_detach)?;
    for id in to_detach {
        tree.detach_subtree(id);
    }
    Ok(())
}

fn collect_pruned(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, out: &mut Vec<NodeId>) -> Result<(), EvalError> {
    let children: Vec<NodeId> = tree.children(node).collect();
    for child in children {
        let when_expr = tree
            .get(child)
            .schema
            .and_then(|schema_id| domain.tree.get(schema_id).when.as_ref());
        let keep = match when_expr {
            Some(expr) => {
                let variables = HashMap::new();
                let ctx = ncd_xpath::Context::root(tree, domain, child, &variables);
                ncd_xpath::evaluate_boolean(&ctx, expr)?
            }
            None => true,
        };
        if keep {
            collect_pruned(domain, tree, child, out)?;
        } else {
            out.push(child);
        }
    }
    Ok(())
}
