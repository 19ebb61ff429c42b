//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 6: every `must` expression attached to a present
//! node evaluates true. A false result carries the statement's own
//! `error-app-tag`/`error-message` when it declared them.

use std::collections::HashMap;

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_yang::SchemaDomain;

use crate::pathfmt::instance_path;

pub fn check_must(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) -> Result<(), ncd_xpath::EvalError> {
    if let Some(schema_id) = tree.get(node).schema {
        for must in &domain.tree.get(schema_id).musts {
            let variables = HashMap::new();
            let ctx = ncd_xpath::Context::root(tree, domain, node, &variables);
            if !ncd_xpath::evaluate_boolean(&ctx, &must.expr)? {
                let mut error = RpcError::new(ErrorTag::OperationFailed).path(instance_path(tree, domain, node));
                if let Some(tag) = &must.error_app_tag {
                    error = error.app_tag(tag.clone());
                }
                error = error.message(
                    must.error_message
                        .clone()
                        .unwrap_or_else(|| "'must' condition failed".to_owned()),
                );
                errors.push(error);
            }
        }
    }

    for child in tree.children(node) {
        check_must(domain, tree, child, errors)?;
    }
    Ok(())
}
