//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! YANG statement parsing and schema resolution (component A): turns
//! YANG module text into a resolved [`SchemaDomain`] and exposes the
//! lookups every other crate in the workspace builds on (find module,
//! find schema node by canonical path, enumerate data children,
//! resolve a prefixed identifier).

pub mod domain;
pub mod error;
pub mod module;
pub mod parser;
pub mod pathexpr;
pub mod resolve;
pub mod schema;
pub mod stmt;
pub mod types;

use std::sync::OnceLock;

pub use domain::SchemaDomain;
pub use error::SchemaError;
pub use resolve::Source;
pub use schema::{NodeKind, SchemaNode, SchemaNodeId, SchemaTree};

/// The main server's schema domain, built once at startup from the
/// configured YANG search paths and never rebuilt: a running NETCONF
/// server never exposes a schema change without a restart.
pub static SCHEMA: OnceLock<SchemaDomain> = OnceLock::new();

/// Parses and resolves a set of YANG module sources into a schema
/// domain. Exits the process on fatal schema errors the same way
/// module loading failures are handled elsewhere in the daemon: a
/// server with a broken schema cannot serve any request correctly, so
/// there is no degraded mode to fall back to.
pub fn load_domain(
    sources: Vec<(String, String)>,
    enabled_features: &[String],
) -> Result<SchemaDomain, SchemaError> {
    let module_count = sources.len();
    tracing::debug!(module_count, "loading schema domain");
    let parsed = sources
        .into_iter()
        .map(|(name, text)| {
            let tree = parser::parse(&text)?;
            Ok(resolve::Source { name, tree })
        })
        .collect::<Result<Vec<_>, SchemaError>>()
        .inspect_err(|e| tracing::warn!(error = %e, "schema module failed to parse"))?;
    resolve::resolve(parsed, enabled_features).inspect_err(|e| tracing::warn!(error = %e, "schema resolution failed"))
}

/// A YANG path-arg-shaped string wrapper, preferred over a bare
/// `String` at crate boundaries purely for self-documentation; it
/// carries no validation beyond what produced it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct YangPath(String);

impl YangPath {
    pub fn new(path: impl Into<String>) -> YangPath {
        YangPath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for YangPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EX_MODULE: &str = r#"
        module ex {
          namespace "urn:example:ex";
          prefix ex;

          container top {
            list ifs {
              key "name";
              leaf name { type string; }
              leaf mtu {
                type uint16;
                default "1500";
              }
            }
          }

          leaf active-if {
            type leafref {
              path "/ex:top/ex:ifs/ex:name";
            }
          }
        }
    "#;

    #[test]
    fn resolves_minimal_module_and_links_leafref() {
        let domain = load_domain(vec![("ex".to_owned(), EX_MODULE.to_owned())], &[]).unwrap();
        let top = domain.find_by_path("/ex:top").expect("top container indexed");
        assert_eq!(domain.tree.get(top).name, "top");
        let ifs = domain
            .find_by_path("/ex:top/ex:ifs")
            .expect("ifs list indexed");
        assert!(matches!(domain.tree.get(ifs).kind, NodeKind::List { .. }));
    }

    #[test]
    fn rejects_unknown_import() {
        let source = r#"
            module ex {
              namespace "urn:example:ex";
              prefix ex;
              import nonexistent { prefix nx; }
            }
        "#;
        let err = load_domain(vec![("ex".to_owned(), source.to_owned())], &[]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownImport { .. }));
    }

    #[test]
    fn data_children_flatten_choice_and_case() {
        let source = r#"
            module ex {
              namespace "urn:example:ex";
              prefix ex;
              container top {
                choice mode {
                  case a {
                    leaf x { type string; }
                  }
                  case b {
                    leaf y { type string; }
                  }
                }
              }
            }
        "#;
        let domain = load_domain(vec![("ex".to_owned(), source.to_owned())], &[]).unwrap();
        let top = domain.find_by_path("/ex:top").unwrap();
        let children = domain.tree.data_children(top);
        let names: Vec<&str> = children.iter().map(|&c| domain.tree.get(c).name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
