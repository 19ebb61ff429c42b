//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! XPath 1.0 evaluation over a bound [`ncd_instance::InstanceTree`],
//! used for `when`/`must` condition checking during validation and for
//! the restricted schema-path grammar's instance-mode counterpart.
//! Parsing itself lives in `ncd-xpath-ast`, shared with `ncd-yang`'s
//! `leafref` `path` resolution; this crate only evaluates the resulting
//! [`ncd_xpath_ast::Expr`] against real instance data.

pub mod context;
pub mod eval;
pub mod functions;
pub mod value;

use std::collections::HashMap;

pub use context::Context;
pub use eval::{evaluate, evaluate_boolean, EvalError};
pub use value::Value;

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_xpath_ast::Expr;
use ncd_yang::SchemaDomain;

/// Evaluates `expr` as a boolean (`when`/`must` condition check) with
/// `node` as both the context node and the `current()` node, and no
/// bound variables.
pub fn evaluate_condition(
    tree: &InstanceTree,
    domain: &SchemaDomain,
    node: NodeId,
    expr: &Expr,
) -> Result<bool, EvalError> {
    let variables = HashMap::new();
    let ctx = Context::root(tree, domain, node, &variables);
    evaluate_boolean(&ctx, expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_instance::bind::{bind_document, NoMounts};
    use ncd_xpath_ast::parse;
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module ex {
  namespace "urn:ex";
  prefix ex;

  container top {
    leaf a {
      type string;
    }
    leaf b {
      type string;
    }
  }
}
"#;

    fn domain() -> SchemaDomain {
        load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn evaluates_equality_predicate_over_bound_tree() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex"><a>hello</a><b>hello</b></top>"#;
        let tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        let expr = parse("a = b").unwrap();
        assert!(evaluate_condition(&tree, &domain, tree.root, &expr).unwrap());
    }

    #[test]
    fn evaluates_string_function_call() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex"><a>hello</a><b>world</b></top>"#;
        let tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        let expr = parse("string-length(a) = 5").unwrap();
        assert!(evaluate_condition(&tree, &domain, tree.root, &expr).unwrap());
    }

    #[test]
    fn boolean_path_short_circuits_without_predicates() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex"><a>x</a></top>"#;
        let tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        let expr = parse("a").unwrap();
        assert!(evaluate_condition(&tree, &domain, tree.root, &expr).unwrap());
        let expr = parse("missing").unwrap();
        assert!(!evaluate_condition(&tree, &domain, tree.root, &expr).unwrap());
    }
}
