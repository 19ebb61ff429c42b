//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Instance tree validation (component D): runs the numbered checklist
//! of RFC 6241/7950 semantics against a bound [`ncd_instance::InstanceTree`]
//! and reports every violation found as an [`ncd_utils::RpcErrors`]
//! document, rather than stopping at the first one — a candidate commit
//! or a `<validate>` RPC both want the full list, not a single failure.

mod defaults;
mod keys;
mod leafref;
mod mandatory;
mod minmax;
mod must;
mod pathfmt;
mod types;
mod unique;
mod when;

use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError, RpcErrors};
use ncd_yang::SchemaDomain;

pub use pathfmt::instance_path;

/// Validates `tree` against `domain`, mutating it in place to add
/// explicit defaults and to prune `when`-false subtrees (both are part
/// of what "a validated candidate" means, not side effects the caller
/// needs to undo). Returns `Ok(())` if every check passes, otherwise
/// every violation collected across the whole tree.
pub fn validate(domain: &SchemaDomain, tree: &mut InstanceTree) -> Result<(), RpcErrors> {
    defaults::apply_defaults(domain, tree, tree.root);

    let mut errors = Vec::new();

    types::check_types(domain, tree, tree.root, &mut errors);
    keys::check_keys(domain, tree, tree.root, &mut errors);
    unique::check_unique(domain, tree, tree.root, &mut errors);

    if let Err(e) = when::prune_when(domain, tree) {
        errors.push(
            RpcError::new(ErrorTag::OperationFailed).message(format!("'when' evaluation failed: {e}")),
        );
    }

    mandatory::check_mandatory(domain, tree, tree.root, &mut errors);

    if let Err(e) = must::check_must(domain, tree, tree.root, &mut errors) {
        errors.push(
            RpcError::new(ErrorTag::OperationFailed).message(format!("'must' evaluation failed: {e}")),
        );
    }

    if let Err(e) = leafref::check_leafrefs(domain, tree, tree.root, &mut errors) {
        errors.push(
            RpcError::new(ErrorTag::OperationFailed).message(format!("leafref evaluation failed: {e}")),
        );
    }

    minmax::check_min_max(domain, tree, tree.root, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(violation_count = errors.len(), "validation failed");
        Err(RpcErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_instance::bind::{bind_document, NoMounts};
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module ex {
  namespace "urn:ex";
  prefix ex;

  container top {
    list ifs {
      key "name";
      leaf name { type string; }
      leaf mtu {
        type uint16 { range "68..9000"; }
        default "1500";
      }
    }
    leaf active-if {
      type leafref {
        path "/ex:top/ex:ifs/ex:name";
      }
      mandatory true;
    }
  }
}
"#;

    fn domain() -> SchemaDomain {
        load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn fills_in_leaf_defaults_and_passes() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex">
            <ifs><name>eth0</name></ifs>
            <active-if>eth0</active-if>
        </top>"#;
        let mut tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        validate(&domain, &mut tree).unwrap();
        let ifs = tree.children(tree.root).find(|&c| tree.get(c).name == "ifs").unwrap();
        let mtu = tree.children(ifs).find(|&c| tree.get(c).name == "mtu").unwrap();
        assert_eq!(tree.get(mtu).text(), Some("1500"));
        assert!(tree.get(mtu).is_default);
    }

    #[test]
    fn rejects_dangling_leafref() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex">
            <ifs><name>eth0</name></ifs>
            <active-if>eth1</active-if>
        </top>"#;
        let mut tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        let err = validate(&domain, &mut tree).unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::DataMissing)));
    }

    #[test]
    fn rejects_out_of_range_value() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex">
            <ifs><name>eth0</name><mtu>70000</mtu></ifs>
            <active-if>eth0</active-if>
        </top>"#;
        let mut tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        let err = validate(&domain, &mut tree).unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::InvalidValue)));
    }

    #[test]
    fn rejects_duplicate_key() {
        let domain = domain();
        let xml = r#"<top xmlns="urn:ex">
            <ifs><name>eth0</name></ifs>
            <ifs><name>eth0</name></ifs>
            <active-if>eth0</active-if>
        </top>"#;
        let mut tree = bind_document(xml, &domain, "top", &mut NoMounts).unwrap();
        let err = validate(&domain, &mut tree).unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::BadElement)));
    }
}
