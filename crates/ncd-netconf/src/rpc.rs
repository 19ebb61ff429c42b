//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The open half of the rpc dispatch table (component F's "closed
//! tagged variant for built-ins, plus an open registry for plugins"):
//! anything beyond the twelve base operations reaches [`Operation::Invoke`]
//! instead of a fixed match arm, and is looked up here by its
//! `(namespace, name)` pair. A name the schema never declared as an
//! `rpc` statement and a declared `rpc` with no registered handler both
//! fail the same way — neither is distinguishable to a client, since
//! both mean "the server will not run this."

use std::collections::HashMap;

use ncd_utils::{ErrorTag, RpcError, RpcErrors};
use ncd_yang::schema::NodeKind;
use ncd_yang::SchemaDomain;

/// Takes the `<input>` element's children already re-serialized as
/// XML, returns the `<output>` element's children the same way, or
/// `None` for an rpc that declares no output (or that ran and simply
/// has nothing to report back).
pub type RpcHandler = Box<dyn Fn(&str) -> Result<Option<String>, RpcErrors> + Send + Sync>;

#[derive(Default)]
pub struct RpcRegistry {
    handlers: HashMap<(String, String), RpcHandler>,
}

impl RpcRegistry {
    pub fn new() -> RpcRegistry {
        RpcRegistry::default()
    }

    pub fn register(&mut self, namespace: impl Into<String>, name: impl Into<String>, handler: RpcHandler) {
        self.handlers.insert((namespace.into(), name.into()), handler);
    }

    /// Confirms `namespace`/`name` names a real `rpc` statement before
    /// ever consulting the registry, so a client misspelling an rpc
    /// name gets the same error whether or not a handler happens to be
    /// registered under that name.
    pub fn invoke(&self, domain: &SchemaDomain, namespace: &str, name: &str, input_xml: &str) -> Result<Option<String>, RpcErrors> {
        let declared = domain.tree.roots.iter().any(|&id| {
            let node = domain.tree.get(id);
            matches!(node.kind, NodeKind::Rpc) && node.name == name && node.namespace == namespace
        });
        if !declared {
            return Err(not_supported(format!("no rpc '{name}' in any loaded module")));
        }
        let handler = self
            .handlers
            .get(&(namespace.to_owned(), name.to_owned()))
            .ok_or_else(|| not_supported(format!("rpc '{name}' has no registered handler")))?;
        handler(input_xml)
    }
}

fn not_supported(message: String) -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::OperationNotSupported).message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module example {
  namespace "urn:example";
  prefix ex;

  rpc reverse {
    input {
      leaf s { type string; }
    }
    output {
      leaf s { type string; }
    }
  }
}
"#;

    fn domain() -> SchemaDomain {
        load_domain(vec![("example".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn invokes_a_registered_handler() {
        let domain = domain();
        let mut registry = RpcRegistry::new();
        registry.register(
            "urn:example",
            "reverse",
            Box::new(|input| Ok(Some(input.replace("abc", "cba")))),
        );

        let output = registry.invoke(&domain, "urn:example", "reverse", "<s>abc</s>").unwrap();
        assert_eq!(output.unwrap(), "<s>cba</s>");
    }

    #[test]
    fn unknown_rpc_name_is_not_supported() {
        let domain = domain();
        let registry = RpcRegistry::new();
        let err = registry.invoke(&domain, "urn:example", "made-up", "").unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::OperationNotSupported)));
    }

    #[test]
    fn declared_rpc_without_handler_is_not_supported() {
        let domain = domain();
        let registry = RpcRegistry::new();
        let err = registry.invoke(&domain, "urn:example", "reverse", "<s>abc</s>").unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::OperationNotSupported)));
    }
}
