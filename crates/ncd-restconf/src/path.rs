//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Resolves a parsed api-path against a schema domain, then renders
//! the result either as a NETCONF subtree filter (for `GET`) or as an
//! edit-config instance fragment (for the mutating verbs), so the
//! RESTCONF verbs can ride the exact same `ncd-netconf` operations a
//! native NETCONF client would issue.

use ncd_yang::schema::NodeKind;
use ncd_yang::{SchemaDomain, SchemaNodeId};

use crate::error::{bad_request, not_found};
use crate::uri::Segment;
use ncd_utils::RpcErrors;

#[derive(Clone, Debug)]
pub struct ResolvedSegment {
    pub schema: SchemaNodeId,
    pub namespace: String,
    pub name: String,
    /// Key leaf name to value, in schema-declared key order.
    pub keys: Vec<(String, String)>,
}

/// Descends `domain`'s data tree one api-path segment at a time,
/// binding each segment's keys (if any) to its list's declared key
/// leaves by position.
pub fn resolve_path(domain: &SchemaDomain, segments: &[Segment]) -> Result<Vec<ResolvedSegment>, RpcErrors> {
    let mut out = Vec::with_capacity(segments.len());
    let mut candidates = domain.tree.roots.clone();
    for seg in segments {
        let schema = find_candidate(domain, &candidates, seg)?;
        let node = domain.tree.get(schema);
        let keys = resolve_keys(node, seg)?;
        out.push(ResolvedSegment {
            schema,
            namespace: node.namespace.clone(),
            name: node.name.clone(),
            keys,
        });
        candidates = domain.tree.data_children(schema);
    }
    Ok(out)
}

fn find_candidate(domain: &SchemaDomain, candidates: &[SchemaNodeId], seg: &Segment) -> Result<SchemaNodeId, RpcErrors> {
    let hit = candidates
        .iter()
        .copied()
        .find(|&id| domain.tree.get(id).name == seg.name)
        .ok_or_else(|| not_found(format!("no data node named '{}' at this point in the api-path", seg.name)))?;
    if let Some(module) = &seg.module {
        let expected_ns = domain
            .module(module)
            .ok_or_else(|| bad_request(format!("unknown module '{module}'")))?
            .namespace
            .clone();
        if domain.tree.get(hit).namespace != expected_ns {
            return Err(bad_request(format!("'{}' does not belong to module '{module}'", seg.name)));
        }
    }
    Ok(hit)
}

fn resolve_keys(node: &ncd_yang::SchemaNode, seg: &Segment) -> Result<Vec<(String, String)>, RpcErrors> {
    if seg.keys.is_empty() {
        return Ok(Vec::new());
    }
    match &node.kind {
        NodeKind::List { keys, .. } => {
            if keys.len() != seg.keys.len() {
                return Err(bad_request(format!(
                    "'{}' has {} key leaf(es), api-path supplied {}",
                    seg.name,
                    keys.len(),
                    seg.keys.len()
                )));
            }
            Ok(keys.iter().cloned().zip(seg.keys.iter().cloned()).collect())
        }
        _ => Err(bad_request(format!("'{}' is not a list and cannot carry key values", seg.name))),
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedRpc {
    pub schema: SchemaNodeId,
    pub namespace: String,
    pub name: String,
}

/// Resolves an `{+restconf}/operations/` api-path to the `rpc`
/// statement it names (RFC 8040 §3.6): exactly one segment, no key
/// values — actions nested under a data resource are not supported.
pub fn resolve_rpc(domain: &SchemaDomain, segments: &[Segment]) -> Result<ResolvedRpc, RpcErrors> {
    let [seg] = segments else {
        return Err(bad_request("the operations api-path must name exactly one rpc"));
    };
    if !seg.keys.is_empty() {
        return Err(bad_request("an rpc name cannot carry key values"));
    }
    let schema = domain
        .tree
        .roots
        .iter()
        .copied()
        .find(|&id| domain.tree.get(id).name == seg.name && matches!(domain.tree.get(id).kind, NodeKind::Rpc))
        .ok_or_else(|| not_found(format!("no rpc named '{}'", seg.name)))?;
    let node = domain.tree.get(schema);
    if let Some(module) = &seg.module {
        let expected_ns = domain
            .module(module)
            .ok_or_else(|| bad_request(format!("unknown module '{module}'")))?
            .namespace
            .clone();
        if node.namespace != expected_ns {
            return Err(bad_request(format!("'{}' does not belong to module '{module}'", seg.name)));
        }
    }
    Ok(ResolvedRpc { schema, namespace: node.namespace.clone(), name: node.name.clone() })
}

/// Resolves a POST-to-datastore-root target: the URI carries no
/// segment at all (RFC 8040 §4.4.1 allows `POST {+restconf}/data`), so
/// the child to create is named by the request body's own sole
/// top-level key instead.
pub fn resolve_root_target(domain: &SchemaDomain, local_name: &str) -> Result<ResolvedSegment, RpcErrors> {
    let schema = domain
        .tree
        .roots
        .iter()
        .copied()
        .find(|&id| domain.tree.get(id).name == local_name)
        .ok_or_else(|| not_found(format!("no top-level data node named '{local_name}'")))?;
    let node = domain.tree.get(schema);
    Ok(ResolvedSegment { schema, namespace: node.namespace.clone(), name: node.name.clone(), keys: Vec::new() })
}

/// Resolves the child resource a `POST` to an existing container/list
/// entry creates, named by the request body's sole top-level key
/// (mirrors [`resolve_root_target`] one level down instead of at the
/// schema roots).
pub fn resolve_child_target(domain: &SchemaDomain, parent: &ResolvedSegment, local_name: &str) -> Result<ResolvedSegment, RpcErrors> {
    let schema = domain
        .tree
        .data_children(parent.schema)
        .into_iter()
        .find(|&id| domain.tree.get(id).name == local_name)
        .ok_or_else(|| not_found(format!("'{}' has no child named '{local_name}'", parent.name)))?;
    let node = domain.tree.get(schema);
    Ok(ResolvedSegment { schema, namespace: node.namespace.clone(), name: node.name.clone(), keys: Vec::new() })
}

fn key_leaves_xml(keys: &[(String, String)]) -> String {
    keys.iter().map(|(k, v)| format!("<{k}>{}</{k}>", escape(v))).collect()
}

/// Builds a NETCONF subtree filter (RFC 6241 §6) that selects exactly
/// the resource named by `resolved`: every ancestor is a containment
/// node narrowed by its own key leaves, the innermost segment is a
/// plain selection node.
pub fn build_filter(resolved: &[ResolvedSegment]) -> String {
    let mut inner: Option<String> = None;
    for seg in resolved.iter().rev() {
        let body = match inner {
            Some(i) => format!("{}{i}", key_leaves_xml(&seg.keys)),
            None => key_leaves_xml(&seg.keys),
        };
        inner = Some(wrap(seg, &body));
    }
    inner.unwrap_or_default()
}

/// Builds an edit-config instance fragment targeting the resource
/// named by `resolved`: ancestors are plain containment wrappers (with
/// their own key leaves where they are list entries), the innermost
/// element carries `operation` and `content` (the converted request
/// body, or just its key leaves for a bodyless `DELETE`).
pub fn build_edit_fragment(resolved: &[ResolvedSegment], operation: &str, content: &str) -> Result<String, RpcErrors> {
    let (target, ancestors) = resolved.split_last().ok_or_else(|| bad_request("empty api-path"))?;
    // A write body already carries the target's own key leaves (RFC
    // 8040 requires the payload to represent the whole resource); only
    // a bodyless `delete` needs the key leaves synthesized here so the
    // edit pipeline's key-tuple matcher can find the entry to remove.
    let target_keys = if content.is_empty() { key_leaves_xml(&target.keys) } else { String::new() };
    let target_xml = format!(
        r#"<{name} xmlns="{ns}" operation="{op}">{target_keys}{content}</{name}>"#,
        name = target.name,
        ns = target.namespace,
        op = operation,
    );
    let mut inner = target_xml;
    for seg in ancestors.iter().rev() {
        let body = format!("{}{inner}", key_leaves_xml(&seg.keys));
        inner = wrap(seg, &body);
    }
    Ok(inner)
}

fn wrap(seg: &ResolvedSegment, body: &str) -> String {
    if body.is_empty() {
        format!(r#"<{name} xmlns="{ns}"/>"#, name = seg.name, ns = seg.namespace)
    } else {
        format!(r#"<{name} xmlns="{ns}">{body}</{name}>"#, name = seg.name, ns = seg.namespace)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uri::parse_api_path;
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module example {
  namespace "urn:example";
  prefix ex;

  container top {
    leaf x { type string; }
    list ifs {
      key "name";
      leaf name { type string; }
      leaf mtu { type uint16; }
    }
  }
}
"#;

    fn domain() -> ncd_yang::SchemaDomain {
        load_domain(vec![("example".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn resolves_nested_leaf_segment() {
        let domain = domain();
        let segs = parse_api_path("example:top/x").unwrap();
        let resolved = resolve_path(&domain, &segs).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].name, "x");
    }

    #[test]
    fn resolves_list_entry_key() {
        let domain = domain();
        let segs = parse_api_path("example:top/ifs=eth0").unwrap();
        let resolved = resolve_path(&domain, &segs).unwrap();
        assert_eq!(resolved[1].keys, vec![("name".to_owned(), "eth0".to_owned())]);
    }

    #[test]
    fn unknown_segment_is_not_found() {
        let domain = domain();
        let segs = parse_api_path("example:top/bogus").unwrap();
        assert!(resolve_path(&domain, &segs).is_err());
    }

    #[test]
    fn builds_filter_with_key_content_match() {
        let domain = domain();
        let segs = parse_api_path("example:top/ifs=eth0").unwrap();
        let resolved = resolve_path(&domain, &segs).unwrap();
        let filter = build_filter(&resolved);
        assert!(filter.contains("<name>eth0</name>"));
        assert!(filter.contains("<top"));
    }

    #[test]
    fn builds_edit_fragment_with_operation_on_target() {
        let domain = domain();
        let segs = parse_api_path("example:top/ifs=eth0").unwrap();
        let resolved = resolve_path(&domain, &segs).unwrap();
        // A real body already carries the key leaf; the builder must
        // not duplicate it alongside supplied content.
        let frag = build_edit_fragment(&resolved, "replace", "<name>eth0</name><mtu>9000</mtu>").unwrap();
        assert!(frag.contains(r#"operation="replace""#));
        assert!(frag.contains("<name>eth0</name><mtu>9000</mtu>"));
        assert_eq!(frag.matches("<name>eth0</name>").count(), 1);
    }

    #[test]
    fn delete_fragment_synthesizes_key_leaf_with_no_body() {
        let domain = domain();
        let segs = parse_api_path("example:top/ifs=eth0").unwrap();
        let resolved = resolve_path(&domain, &segs).unwrap();
        let frag = build_edit_fragment(&resolved, "delete", "").unwrap();
        assert!(frag.contains(r#"operation="delete""#));
        assert!(frag.contains("<name>eth0</name>"));
    }

    const RPC_MODULE: &str = r#"
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

    fn rpc_domain() -> ncd_yang::SchemaDomain {
        load_domain(vec![("example".to_owned(), RPC_MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn resolves_a_declared_rpc() {
        let domain = rpc_domain();
        let segs = parse_api_path("example:reverse").unwrap();
        let rpc = resolve_rpc(&domain, &segs).unwrap();
        assert_eq!(rpc.name, "reverse");
        assert_eq!(rpc.namespace, "urn:example");
    }

    #[test]
    fn unknown_rpc_name_is_not_found() {
        let domain = rpc_domain();
        let segs = parse_api_path("example:made-up").unwrap();
        assert!(resolve_rpc(&domain, &segs).is_err());
    }

    #[test]
    fn nested_rpc_path_is_rejected() {
        let domain = rpc_domain();
        let segs = parse_api_path("example:reverse/extra").unwrap();
        assert!(resolve_rpc(&domain, &segs).is_err());
    }
}
