//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Copies a standalone schema domain's tree into a host domain's arena,
//! remapping every `SchemaNodeId` along the way. A mounted domain's
//! nodes must actually live in the host's arena (not merely be
//! reachable from it) since every caller above `ncd-instance::bind`
//! indexes schema nodes straight through the single `SchemaDomain` it
//! was handed — there is no cross-domain `SchemaNodeId`.

use std::collections::HashMap;

use ncd_yang::schema::SchemaNodeId;
use ncd_yang::SchemaDomain;

/// Grafts every node of `mounted` into `host`'s arena and returns the
/// new ids of `mounted`'s former top-level roots. Module table and
/// identity closure are merged in too so `derived-from()` and
/// prefix resolution keep working across the mount boundary.
pub fn graft(host: &mut SchemaDomain, mounted: SchemaDomain) -> Vec<SchemaNodeId> {
    let old_entries: Vec<(SchemaNodeId, ncd_yang::schema::SchemaNode)> =
        mounted.tree.arena.iter().map(|(id, node)| (id, node.clone())).collect();

    let mut remap: HashMap<SchemaNodeId, SchemaNodeId> = HashMap::with_capacity(old_entries.len());
    for (old_id, node) in &old_entries {
        let new_id = host.tree.arena.insert(node.clone());
        remap.insert(*old_id, new_id);
    }
    for (old_id, _) in &old_entries {
        let new_id = remap[old_id];
        let node = &mut host.tree.arena[new_id];
        node.parent = node.parent.and_then(|p| remap.get(&p).copied());
        node.children = node.children.iter().filter_map(|c| remap.get(c).copied()).collect();
    }

    let new_roots: Vec<SchemaNodeId> = mounted.tree.roots.iter().filter_map(|r| remap.get(r).copied()).collect();

    let identity_pairs: Vec<(String, String)> = mounted
        .identity_edges()
        .flat_map(|(base, derived)| derived.iter().map(move |d| (base.clone(), d.clone())))
        .collect();
    for (name, module) in mounted.modules {
        host.modules.entry(name).or_insert(module);
    }
    for (base, derived) in identity_pairs {
        host.register_identity_edge(base, derived);
    }

    new_roots
}
