//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! RFC 7951 JSON body conversion and `Content-Type`/`Accept`
//! negotiation between `application/yang-data+json` and
//! `application/yang-data+xml`.

use ncd_instance::bind::{bind_document, bind_document_at, NoMounts};
use ncd_instance::serialize::to_json;
use ncd_utils::{ErrorTag, RpcError, RpcErrors};
use ncd_yang::schema::NodeKind;
use ncd_yang::{SchemaDomain, SchemaNodeId};
use serde_json::{Map, Value as Json};

use crate::error::bad_request;
use crate::path::ResolvedSegment;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Json => "application/yang-data+json",
            Format::Xml => "application/yang-data+xml",
        }
    }
}

/// Picks the response format from an `Accept` header, defaulting to
/// JSON (matching the JSON-first bodies used throughout this
/// implementation's own fixtures and tests).
pub fn negotiate_accept(accept: Option<&str>) -> Format {
    match accept {
        Some(value) if value.contains("yang-data+xml") && !value.contains("yang-data+json") => Format::Xml,
        _ => Format::Json,
    }
}

/// Picks the request body's format from its `Content-Type`, defaulting
/// to JSON for a missing or unrecognized header.
pub fn negotiate_content_type(content_type: Option<&str>) -> Format {
    match content_type {
        Some(value) if value.contains("yang-data+xml") => Format::Xml,
        _ => Format::Json,
    }
}

/// Converts a request body (whichever format it arrived in) into the
/// inner XML content of the targeted resource: children for a
/// container/list entry, bare text for a leaf.
pub fn body_to_xml_content(domain: &SchemaDomain, target: &ResolvedSegment, format: Format, body: &[u8]) -> Result<String, RpcErrors> {
    match format {
        Format::Xml => {
            let text = std::str::from_utf8(body).map_err(|_| bad_request("request body is not valid UTF-8"))?;
            Ok(text.to_owned())
        }
        Format::Json => {
            let json: Json = serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid JSON body: {e}")))?;
            json_body_to_xml(domain, target, &json)
        }
    }
}

/// The local name of a request body's sole top-level member, used to
/// name the child resource a root-level `POST` creates (RFC 8040
/// §4.4.1: the URI carries no segment for that resource, only the
/// body does).
pub fn body_top_local_name(format: Format, body: &[u8]) -> Result<String, RpcErrors> {
    match format {
        Format::Json => {
            let json: Json = serde_json::from_slice(body).map_err(|e| bad_request(format!("invalid JSON body: {e}")))?;
            let obj = json.as_object().ok_or_else(|| bad_request("request body must be a JSON object"))?;
            if obj.len() != 1 {
                return Err(bad_request("request body must contain exactly one top-level member"));
            }
            let key = obj.keys().next().expect("checked len == 1");
            Ok(key.rsplit(':').next().unwrap_or(key).to_owned())
        }
        Format::Xml => {
            let text = std::str::from_utf8(body).map_err(|_| bad_request("request body is not valid UTF-8"))?;
            let root = ncd_netconf::xmlelem::parse_document(text)
                .map_err(|e| bad_request(format!("invalid XML body: {e}")))?;
            Ok(root.name)
        }
    }
}

fn json_body_to_xml(domain: &SchemaDomain, target: &ResolvedSegment, body: &Json) -> Result<String, RpcErrors> {
    let obj = body.as_object().ok_or_else(|| bad_request("request body must be a JSON object"))?;
    if obj.len() != 1 {
        return Err(bad_request("request body must contain exactly one top-level member"));
    }
    let value = obj.values().next().expect("checked len == 1");
    match &domain.tree.get(target.schema).kind {
        NodeKind::List { .. } => {
            let entry = value
                .as_array()
                .and_then(|a| a.first())
                .ok_or_else(|| bad_request("list resource body must be a one-element JSON array"))?;
            let entry_obj = entry.as_object().ok_or_else(|| bad_request("list entry must be a JSON object"))?;
            children_to_xml(domain, target.schema, entry_obj)
        }
        NodeKind::Leaf { .. } | NodeKind::LeafList { .. } => leaf_text(value),
        _ => {
            let entry_obj = value.as_object().ok_or_else(|| bad_request("resource body must be a JSON object"))?;
            children_to_xml(domain, target.schema, entry_obj)
        }
    }
}

fn children_to_xml(domain: &SchemaDomain, parent: SchemaNodeId, obj: &Map<String, Json>) -> Result<String, RpcErrors> {
    let mut xml = String::new();
    for (key, value) in obj {
        let local = key.rsplit(':').next().unwrap_or(key);
        let child = domain
            .tree
            .data_children(parent)
            .into_iter()
            .find(|&c| domain.tree.get(c).name == local)
            .ok_or_else(|| bad_request(format!("unknown child '{key}'")))?;
        let node = domain.tree.get(child);
        match &node.kind {
            NodeKind::List { .. } | NodeKind::LeafList { .. } => {
                let arr = value.as_array().ok_or_else(|| bad_request(format!("'{key}' must be a JSON array")))?;
                for item in arr {
                    xml.push_str(&element_xml(domain, child, node, item)?);
                }
            }
            _ => xml.push_str(&element_xml(domain, child, node, value)?),
        }
    }
    Ok(xml)
}

fn element_xml(domain: &SchemaDomain, schema: SchemaNodeId, node: &ncd_yang::SchemaNode, value: &Json) -> Result<String, RpcErrors> {
    match &node.kind {
        NodeKind::Leaf { .. } | NodeKind::LeafList { .. } => {
            let text = leaf_text(value)?;
            Ok(format!("<{name}>{text}</{name}>", name = node.name))
        }
        _ => {
            let obj = value.as_object().ok_or_else(|| bad_request(format!("'{}' must be a JSON object", node.name)))?;
            let inner = children_to_xml(domain, schema, obj)?;
            Ok(format!("<{name}>{inner}</{name}>", name = node.name))
        }
    }
}

fn leaf_text(value: &Json) -> Result<String, RpcErrors> {
    match value {
        Json::String(s) => Ok(escape(s)),
        Json::Number(n) => Ok(n.to_string()),
        Json::Bool(b) => Ok(b.to_string()),
        Json::Null => Ok(String::new()),
        _ => Err(bad_request("leaf value must be a JSON scalar")),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Binds the NETCONF backend's already-filtered XML reply and renders
/// just the targeted resource as an RFC 7951 JSON object, qualified at
/// the top since a `GET`'s immediate "parent" is never a real module.
pub fn response_json(domain: &SchemaDomain, resolved: &[ResolvedSegment], data_xml: &str) -> Result<Json, RpcErrors> {
    let tree = bind_document(data_xml, domain, "data", &mut NoMounts)
        .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::OperationFailed).message(e.to_string())))?;
    let mut cur = tree.root;
    for _ in 0..resolved.len().saturating_sub(1) {
        cur = tree
            .children(cur)
            .next()
            .ok_or_else(|| crate::error::not_found("resource not found"))?;
    }
    let parent_module = if resolved.len() <= 1 {
        String::new()
    } else {
        owning_module(domain, &resolved[resolved.len() - 2].namespace)
    };
    let result = to_json(&tree, domain, cur, &parent_module);
    match &result {
        Json::Object(map) if map.is_empty() => Err(crate::error::not_found("resource not found")),
        _ => Ok(result),
    }
}

/// Renders just the targeted resource's XML, by the same descend-past-
/// ancestors navigation `response_json` uses, without binding against
/// the schema at all (raw elements suffice for re-serialization).
pub fn response_xml(resolved: &[ResolvedSegment], data_xml: &str) -> Result<String, RpcErrors> {
    let wrapped = ncd_netconf::xmlelem::parse_document(&format!("<data>{data_xml}</data>"))
        .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::OperationFailed).message(e.to_string())))?;
    let mut cur = &wrapped;
    for _ in 0..resolved.len().saturating_sub(1) {
        cur = cur
            .children
            .first()
            .ok_or_else(|| crate::error::not_found("resource not found"))?;
    }
    if cur.children.is_empty() {
        return Err(crate::error::not_found("resource not found"));
    }
    Ok(cur.children_xml())
}

const RESTCONF_NS: &str = "urn:ietf:params:xml:ns:yang:ietf-restconf";

/// Shapes an [`RpcErrors`] as an RFC 8040 §7.1 error body: the same
/// `error-type`/`error-tag`/`error-path`/`error-message` fields
/// `ncd-netconf::reply` puts on the wire as `<rpc-error>`, wrapped here
/// as `errors/error` instead.
pub fn error_body(errors: &RpcErrors, format: Format) -> Vec<u8> {
    match format {
        Format::Json => {
            let list: Vec<Json> = errors
                .0
                .iter()
                .map(|e| {
                    let mut obj = Map::new();
                    obj.insert(
                        "error-type".to_owned(),
                        Json::String(e.error_type.map(|t| t.to_string()).unwrap_or_else(|| "application".to_owned())),
                    );
                    obj.insert(
                        "error-tag".to_owned(),
                        Json::String(e.error_tag.map(|t| t.to_string()).unwrap_or_else(|| "operation-failed".to_owned())),
                    );
                    if let Some(path) = &e.error_path {
                        obj.insert("error-path".to_owned(), Json::String(path.clone()));
                    }
                    if let Some(message) = &e.error_message {
                        obj.insert("error-message".to_owned(), Json::String(message.clone()));
                    }
                    Json::Object(obj)
                })
                .collect();
            let mut errors_obj = Map::new();
            errors_obj.insert("error".to_owned(), Json::Array(list));
            let mut top = Map::new();
            top.insert("ietf-restconf:errors".to_owned(), Json::Object(errors_obj));
            serde_json::to_vec(&Json::Object(top)).expect("serde_json never fails on a plain Value")
        }
        Format::Xml => {
            let body: String = errors
                .0
                .iter()
                .map(|e| {
                    let mut s = String::from("<error>");
                    s.push_str(&format!(
                        "<error-type>{}</error-type>",
                        e.error_type.map(|t| t.to_string()).unwrap_or_else(|| "application".to_owned())
                    ));
                    s.push_str(&format!(
                        "<error-tag>{}</error-tag>",
                        e.error_tag.map(|t| t.to_string()).unwrap_or_else(|| "operation-failed".to_owned())
                    ));
                    if let Some(path) = &e.error_path {
                        s.push_str(&format!("<error-path>{}</error-path>", escape(path)));
                    }
                    if let Some(message) = &e.error_message {
                        s.push_str(&format!("<error-message>{}</error-message>", escape(message)));
                    }
                    s.push_str("</error>");
                    s
                })
                .collect();
            format!(r#"<errors xmlns="{RESTCONF_NS}">{body}</errors>"#).into_bytes()
        }
    }
}

/// Shapes a custom rpc's `<output>` children as `{module:output}`
/// (RFC 8040 §4.4.2), the response-side counterpart of
/// [`body_to_xml_content`]'s conversion of an rpc's `<input>` body.
pub fn rpc_output_body(
    domain: &SchemaDomain,
    output_schema: SchemaNodeId,
    rpc_module: &str,
    output_xml: &str,
    format: Format,
) -> Result<Vec<u8>, RpcErrors> {
    match format {
        Format::Xml => {
            let ns = &domain.tree.get(output_schema).namespace;
            Ok(format!(r#"<output xmlns="{ns}">{output_xml}</output>"#).into_bytes())
        }
        Format::Json => {
            let tree = bind_document_at(output_xml, domain, "output", output_schema, &mut NoMounts)
                .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::OperationFailed).message(e.to_string())))?;
            let body = to_json(&tree, domain, tree.root, rpc_module);
            let mut top = Map::new();
            top.insert(format!("{rpc_module}:output"), body);
            Ok(serde_json::to_vec(&Json::Object(top)).expect("serde_json never fails on a plain Value"))
        }
    }
}

pub(crate) fn owning_module(domain: &SchemaDomain, namespace: &str) -> String {
    domain
        .modules
        .values()
        .find(|m| m.namespace == namespace)
        .map(|m| m.name.clone())
        .unwrap_or_default()
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

    fn domain() -> SchemaDomain {
        load_domain(vec![("example".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn converts_list_entry_body_to_xml_children() {
        let domain = domain();
        let segs = parse_api_path("example:top/ifs=eth0").unwrap();
        let resolved = crate::path::resolve_path(&domain, &segs).unwrap();
        let body = br#"{"example:ifs":[{"name":"eth0","mtu":9000}]}"#;
        let xml = body_to_xml_content(&domain, &resolved[1], Format::Json, body).unwrap();
        assert!(xml.contains("<name>eth0</name>"));
        assert!(xml.contains("<mtu>9000</mtu>"));
    }

    #[test]
    fn converts_leaf_body_to_bare_text() {
        let domain = domain();
        let segs = parse_api_path("example:top/x").unwrap();
        let resolved = crate::path::resolve_path(&domain, &segs).unwrap();
        let body = br#"{"example:x":"hello"}"#;
        let xml = body_to_xml_content(&domain, &resolved[1], Format::Json, body).unwrap();
        assert_eq!(xml, "hello");
    }

    #[test]
    fn negotiates_xml_only_when_exclusively_requested() {
        assert_eq!(negotiate_accept(Some("application/yang-data+xml")), Format::Xml);
        assert_eq!(negotiate_accept(Some("application/yang-data+json")), Format::Json);
        assert_eq!(negotiate_accept(None), Format::Json);
    }
}
