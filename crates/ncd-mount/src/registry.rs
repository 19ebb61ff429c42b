//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Tracks, per mount-point, which grafted schema roots are currently
//! available to bind against, and shares one grafted copy across every
//! mount-point that advertises byte-identical `yang-library` content
//! (RFC 8528 §3.1's "share an existing identical one").

use std::collections::HashMap;

use ncd_instance::bind::MountResolver;
use ncd_yang::schema::SchemaNodeId;
use ncd_yang::SchemaDomain;

use crate::error::MountError;
use crate::graft;
use crate::yanglib::parse_yang_library;

#[derive(Default)]
pub struct MountRegistry {
    by_point: HashMap<SchemaNodeId, Vec<SchemaNodeId>>,
    /// Normalized yang-library text to the grafted root ids it produced,
    /// so a second mount-point advertising the same module-set reuses
    /// the first graft instead of duplicating schema nodes.
    shared: HashMap<String, Vec<SchemaNodeId>>,
}

impl MountRegistry {
    pub fn new() -> MountRegistry {
        MountRegistry::default()
    }

    /// Resolves `yang_library_xml`'s advertised module-set against
    /// `catalog` (module name -> YANG source text, the same catalog the
    /// host loaded its own schema from), grafts the result into `host`
    /// if it hasn't been grafted before, and binds it to `mount_point`.
    pub fn attach(
        &mut self,
        host: &mut SchemaDomain,
        mount_point: SchemaNodeId,
        yang_library_xml: &str,
        catalog: &HashMap<String, String>,
    ) -> Result<(), MountError> {
        let key = yang_library_xml.trim().to_owned();
        if let Some(roots) = self.shared.get(&key) {
            tracing::debug!(root_count = roots.len(), "reusing existing graft for mount-point");
            self.by_point.insert(mount_point, roots.clone());
            return Ok(());
        }

        let module_refs = parse_yang_library(yang_library_xml)?;
        let sources = module_refs
            .iter()
            .map(|m| {
                catalog
                    .get(&m.name)
                    .cloned()
                    .map(|text| (m.name.clone(), text))
                    .ok_or_else(|| MountError::UnknownModule(m.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| tracing::warn!(error = %e, "mount attach failed to resolve module-set"))?;

        let mounted = ncd_yang::load_domain(sources, &[]).map_err(MountError::Schema)?;
        let roots = graft::graft(host, mounted);
        tracing::debug!(root_count = roots.len(), "grafted new mount-point");
        self.shared.insert(key, roots.clone());
        self.by_point.insert(mount_point, roots);
        Ok(())
    }

    pub fn resolve(&self, host: &SchemaDomain, mount_point: SchemaNodeId, name: &str) -> Option<SchemaNodeId> {
        self.by_point
            .get(&mount_point)?
            .iter()
            .copied()
            .find(|&id| host.tree.get(id).name == name)
    }

    pub fn is_attached(&self, mount_point: SchemaNodeId) -> bool {
        self.by_point.contains_key(&mount_point)
    }
}

/// Adapts a [`MountRegistry`] to `ncd-instance::bind`'s [`MountResolver`]
/// boundary. Built fresh per bind call since it only borrows.
pub struct Resolver<'a> {
    pub host: &'a SchemaDomain,
    pub registry: &'a MountRegistry,
}

impl MountResolver for Resolver<'_> {
    fn resolve_mount(&mut self, mount_point: SchemaNodeId, canonical_xpath: &str) -> Option<SchemaNodeId> {
        self.registry.resolve(self.host, mount_point, canonical_xpath)
    }
}
