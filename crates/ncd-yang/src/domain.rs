//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A schema domain: the full set of modules loaded together, their
//! resolved schema tree, and the lookup indices built on top of it. One
//! domain backs the main server schema; each distinct mounted
//! `yang-library` (RFC 8528) gets its own, shared by tree-equality.

use std::collections::HashMap;

use crate::module::Module;
use crate::schema::{SchemaNodeId, SchemaTree};

#[derive(Debug, Default)]
pub struct SchemaDomain {
    pub modules: HashMap<String, Module>,
    pub tree: SchemaTree,
    /// Canonical schema-node path ("/module:top/module:child") to node id,
    /// populated once resolution completes.
    path_index: HashMap<String, SchemaNodeId>,
    /// Identity name ("module:identity") to the set of identities (by the
    /// same key) that derive from it, directly or transitively.
    identity_derived: HashMap<String, Vec<String>>,
}

impl SchemaDomain {
    pub fn new() -> SchemaDomain {
        SchemaDomain::default()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn module_by_prefix<'a>(&'a self, importer: &str, prefix: &str) -> Option<&'a Module> {
        let importer = self.modules.get(importer)?;
        let target = importer.resolve_prefix(Some(prefix))?;
        self.modules.get(target)
    }

    pub fn find_by_path(&self, path: &str) -> Option<SchemaNodeId> {
        self.path_index
            .get(path)
            .copied()
            .or_else(|| self.tree.find_by_path(path))
    }

    pub fn index_path(&mut self, path: String, id: SchemaNodeId) {
        self.path_index.insert(path, id);
    }

    pub fn register_identity_edge(&mut self, base: String, derived: String) {
        self.identity_derived.entry(base).or_default().push(derived);
    }

    /// Direct (non-transitive) identity edges, keyed by base identity.
    /// Used by `ncd-mount` to carry a grafted domain's identity closure
    /// over into the host domain.
    pub fn identity_edges(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.identity_derived.iter()
    }

    /// Whether `candidate` is `base` or derives from it, directly or
    /// transitively, per the closure built in resolution pass 6.
    pub fn identity_derived_from(&self, candidate: &str, base: &str) -> bool {
        if candidate == base {
            return true;
        }
        self.identity_derived
            .get(base)
            .is_some_and(|derived| derived.iter().any(|d| self.identity_derived_from(candidate, d)))
    }
}
