//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The restricted schema-path evaluator (RFC 7950 §9.9.2, "path-arg"):
//! resolves a `leafref` `path` expression to a single target schema
//! node at schema-load time. Only `child`/`parent` axes and equality
//! predicates on key leaves are legal; predicates never narrow the
//! schema-level result, since they constrain instance values rather
//! than schema identity.

use ncd_xpath_ast::{Axis, Expr, PathRoot, Step};

use crate::domain::SchemaDomain;
use crate::error::SchemaError;
use crate::schema::SchemaNodeId;

/// Resolves a path-arg expression starting from `context`, the leafref's
/// own leaf node (used both as the schema starting point for a relative
/// path and as the binding for any `current()` call).
pub fn resolve_path_arg(
    domain: &SchemaDomain,
    expr: &Expr,
    context: SchemaNodeId,
    leaf_name: &str,
) -> Result<SchemaNodeId, SchemaError> {
    let path = match expr {
        Expr::Path(p) => p,
        _ => {
            return Err(SchemaError::InvalidPathArg {
                leaf: leaf_name.to_owned(),
                reason: "path-arg must be a location path".to_owned(),
            })
        }
    };

    let mut current = match &path.root {
        PathRoot::Absolute => None,
        PathRoot::Relative => Some(context),
        PathRoot::Filter(inner) => {
            if !matches!(**inner, Expr::Call(ref q, ref args) if q.local == "current" && args.is_empty())
            {
                return Err(SchemaError::InvalidPathArg {
                    leaf: leaf_name.to_owned(),
                    reason: "only current() is allowed as a filter expression root".to_owned(),
                });
            }
            Some(context)
        }
    };

    for step in &path.steps {
        current = apply_step(domain, current, step, leaf_name)?;
    }

    current.ok_or_else(|| SchemaError::LeafrefTargetMissing {
        leaf: leaf_name.to_owned(),
        path: String::new(),
    })
}

fn apply_step(
    domain: &SchemaDomain,
    current: Option<SchemaNodeId>,
    step: &Step,
    leaf_name: &str,
) -> Result<Option<SchemaNodeId>, SchemaError> {
    for pred in &step.predicates {
        validate_key_predicate(pred, leaf_name)?;
    }

    match step.axis {
        Axis::Parent => Ok(current.and_then(|id| domain.tree.get(id).parent)),
        Axis::Child => {
            let name = match &step.test {
                ncd_xpath_ast::NodeTest::Name(q) => q.local.clone(),
                _ => {
                    return Err(SchemaError::InvalidPathArg {
                        leaf: leaf_name.to_owned(),
                        reason: "path-arg node test must be a plain name".to_owned(),
                    })
                }
            };
            let candidates = match current {
                Some(id) => domain.tree.data_children(id),
                None => domain.tree.roots.clone(),
            };
            Ok(candidates
                .into_iter()
                .find(|&id| domain.tree.get(id).name == name))
        }
        _ => Err(SchemaError::InvalidPathArg {
            leaf: leaf_name.to_owned(),
            reason: "only child and parent axes are allowed".to_owned(),
        }),
    }
}

/// Equality predicates on key leaves are accepted but never evaluated at
/// schema level (RFC 7950 §9.9.2): this only checks the predicate has
/// the right shape.
fn validate_key_predicate(pred: &Expr, leaf_name: &str) -> Result<(), SchemaError> {
    match pred {
        Expr::Binary(ncd_xpath_ast::BinOp::Eq, lhs, rhs) => {
            let is_path_or_current = |e: &Expr| {
                matches!(e, Expr::Path(_))
                    || matches!(e, Expr::Call(q, args) if q.local == "current" && args.is_empty())
            };
            if is_path_or_current(lhs) && is_path_or_current(rhs) {
                Ok(())
            } else {
                Err(SchemaError::InvalidPathArg {
                    leaf: leaf_name.to_owned(),
                    reason: "predicate must equate a key leaf with current()/..".to_owned(),
                })
            }
        }
        _ => Err(SchemaError::InvalidPathArg {
            leaf: leaf_name.to_owned(),
            reason: "only equality predicates are allowed in a path-arg".to_owned(),
        }),
    }
}
