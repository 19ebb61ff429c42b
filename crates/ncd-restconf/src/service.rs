//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Maps one RESTCONF request to a NETCONF edit-config/commit sequence
//! (or a plain get-config) against the same [`BackendHandle`] a native
//! NETCONF session would use, and shapes the reply per RFC 8040 §4.
//!
//! This is a pure request/response function, not a listener: RFC 8040
//! §6 fronts RESTCONF with a separate HTTP server (FastCGI or native),
//! which is out of scope here and is expected to call [`RestconfService::handle`]
//! per request.

use std::sync::Arc;

use ncd_instance::Operation as EditOp;
use ncd_netconf::backend::BackendReply;
use ncd_netconf::ops::Operation;
use ncd_netconf::BackendHandle;
use ncd_store::DatastoreName;
use ncd_utils::RpcErrors;
use ncd_yang::schema::NodeKind;
use ncd_yang::SchemaDomain;

use crate::error::{bad_request, unsupported};
use crate::media::{self, Format};
use crate::path::{self, ResolvedSegment};
use crate::uri;

/// Every RESTCONF write commits as its own atomic transaction; there
/// is no persistent candidate session behind an HTTP request, so a
/// single reserved session id (never handed to a real NETCONF client)
/// serves all of them. See the crate-level grounding ledger entry for
/// why this is safe under the single backend task's lock accounting.
const RESTCONF_SESSION: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

/// Which of RFC 8040 §3.3's two subtrees an api-path is rooted at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Root {
    Data,
    Operations,
}

pub struct Request {
    pub method: Method,
    pub root: Root,
    /// The path after `{+restconf}/data/` or `{+restconf}/operations/`
    /// (per `root`), with no leading slash.
    pub api_path: String,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: Vec<u8>,
}

pub struct Response {
    pub status: u16,
    pub content_type: Option<String>,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

pub struct RestconfService {
    domain: Arc<SchemaDomain>,
    backend: BackendHandle,
}

impl RestconfService {
    pub fn new(domain: Arc<SchemaDomain>, backend: BackendHandle) -> Self {
        RestconfService { domain, backend }
    }

    pub async fn handle(&self, req: Request) -> Response {
        let accept_format = media::negotiate_accept(req.accept.as_deref());
        match self.dispatch(&req, accept_format).await {
            Ok(response) => response,
            Err(errors) => {
                let status = errors.http_status();
                tracing::debug!(status, api_path = %req.api_path, "restconf request failed");
                let body = media::error_body(&errors, accept_format);
                Response { status, content_type: Some(accept_format.content_type().to_owned()), location: None, body }
            }
        }
    }

    async fn dispatch(&self, req: &Request, accept_format: Format) -> Result<Response, RpcErrors> {
        let segments = uri::parse_api_path(&req.api_path)?;

        if req.root == Root::Operations {
            if req.method != Method::Post {
                return Err(unsupported("operations resources only support POST"));
            }
            return self.post_operations(&segments, req, accept_format).await;
        }

        if segments.is_empty() {
            // Only a root-level POST (RFC 8040 §4.4.1) is meaningful
            // with no api-path; every other verb needs a named target.
            return match req.method {
                Method::Post => self.post_root(req).await,
                _ => Err(bad_request("the api-path must name at least one resource")),
            };
        }
        let resolved = path::resolve_path(&self.domain, &segments)?;

        match req.method {
            Method::Get | Method::Head => self.get(&resolved, req.method, accept_format).await,
            Method::Post => self.post(&resolved, req).await,
            Method::Put => self.put(&resolved, req).await,
            Method::Patch => self.patch(&resolved, req).await,
            Method::Delete => self.delete(&resolved).await,
        }
    }

    /// Invokes a top-level `rpc` statement (RFC 8040 §3.6/§4.4.2):
    /// binds the request body as `{module:input}`, dispatches through
    /// the same [`ncd_netconf::rpc::RpcRegistry`] a native NETCONF
    /// `<rpc>` with an unrecognized name reaches, then shapes the
    /// reply as `{module:output}` or an empty 204 if the rpc declares
    /// no output.
    async fn post_operations(&self, segments: &[uri::Segment], req: &Request, accept_format: Format) -> Result<Response, RpcErrors> {
        let rpc = path::resolve_rpc(&self.domain, segments)?;
        let rpc_module = media::owning_module(&self.domain, &rpc.namespace);

        let input_schema = self
            .domain
            .tree
            .data_children(rpc.schema)
            .into_iter()
            .find(|&c| matches!(self.domain.tree.get(c).kind, NodeKind::Input));
        let input_xml = match input_schema {
            Some(input_schema) if !req.body.is_empty() => {
                let content_format = media::negotiate_content_type(req.content_type.as_deref());
                let target = ResolvedSegment { schema: input_schema, namespace: rpc.namespace.clone(), name: "input".to_owned(), keys: Vec::new() };
                media::body_to_xml_content(&self.domain, &target, content_format, &req.body)?
            }
            _ => String::new(),
        };

        let reply = self
            .backend
            .call(RESTCONF_SESSION, Operation::Invoke { namespace: rpc.namespace.clone(), name: rpc.name.clone(), input_xml })
            .await?;

        match reply {
            BackendReply::Ok => Ok(Response { status: 204, content_type: None, location: None, body: Vec::new() }),
            BackendReply::RpcOutput(output_xml) => {
                let output_schema = self
                    .domain
                    .tree
                    .data_children(rpc.schema)
                    .into_iter()
                    .find(|&c| matches!(self.domain.tree.get(c).kind, NodeKind::Output))
                    .ok_or_else(|| unsupported("rpc returned output but declares none"))?;
                let body = media::rpc_output_body(&self.domain, output_schema, &rpc_module, &output_xml, accept_format)?;
                Ok(Response { status: 200, content_type: Some(accept_format.content_type().to_owned()), location: None, body })
            }
            BackendReply::Data(_) => Err(unsupported("unexpected reply shape for rpc invocation")),
        }
    }

    async fn post_root(&self, req: &Request) -> Result<Response, RpcErrors> {
        let content_format = media::negotiate_content_type(req.content_type.as_deref());
        let local_name = media::body_top_local_name(content_format, &req.body)?;
        let target = path::resolve_root_target(&self.domain, &local_name)?;
        let content = media::body_to_xml_content(&self.domain, &target, content_format, &req.body)?;
        let fragment = path::build_edit_fragment(std::slice::from_ref(&target), "create", &content)?;
        self.edit_and_commit(fragment).await?;
        Ok(Response { status: 201, content_type: None, location: Some(format!("/restconf/data/{}", target.name)), body: Vec::new() })
    }

    async fn get(&self, resolved: &[ResolvedSegment], method: Method, accept_format: Format) -> Result<Response, RpcErrors> {
        let filter = path::build_filter(resolved);
        let reply = self
            .backend
            .call(RESTCONF_SESSION, Operation::GetConfig { source: DatastoreName::Running, filter: Some(filter) })
            .await?;
        let BackendReply::Data(data_xml) = reply else {
            return Err(unsupported("get-config did not return data"));
        };

        let body = match accept_format {
            Format::Json => {
                let json = media::response_json(&self.domain, resolved, &data_xml)?;
                serde_json::to_vec(&json).expect("serde_json never fails on a plain Value")
            }
            Format::Xml => media::response_xml(resolved, &data_xml)?.into_bytes(),
        };
        let body = if method == Method::Head { Vec::new() } else { body };
        Ok(Response { status: 200, content_type: Some(accept_format.content_type().to_owned()), location: None, body })
    }

    async fn post(&self, resolved: &[ResolvedSegment], req: &Request) -> Result<Response, RpcErrors> {
        let target = resolved.last().expect("non-empty path checked by caller");
        let content_format = media::negotiate_content_type(req.content_type.as_deref());
        let content = media::body_to_xml_content(&self.domain, target, content_format, &req.body)?;
        // POST creates a child *of* the named resource, so the new
        // instance's own name comes from the body, not api_path.
        let child_local_name = media::body_top_local_name(content_format, &req.body)?;
        let child = path::resolve_child_target(&self.domain, target, &child_local_name)?;
        let mut path_with_child = resolved.to_vec();
        path_with_child.push(child);
        let fragment = path::build_edit_fragment(&path_with_child, "create", &content)?;
        self.edit_and_commit(fragment).await?;
        let api_path_with_child = format!(
            "{}/{}",
            resolved.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join("/"),
            path_with_child.last().unwrap().name
        );
        Ok(Response {
            status: 201,
            content_type: None,
            location: Some(format!("/restconf/data/{api_path_with_child}")),
            body: Vec::new(),
        })
    }

    async fn put(&self, resolved: &[ResolvedSegment], req: &Request) -> Result<Response, RpcErrors> {
        let target = resolved.last().expect("non-empty path checked by caller");
        let content_format = media::negotiate_content_type(req.content_type.as_deref());
        let content = media::body_to_xml_content(&self.domain, target, content_format, &req.body)?;
        let existed = self.resource_exists(resolved).await?;
        let fragment = path::build_edit_fragment(resolved, "replace", &content)?;
        self.edit_and_commit(fragment).await?;
        let status = if existed { 204 } else { 201 };
        Ok(Response { status, content_type: None, location: None, body: Vec::new() })
    }

    async fn patch(&self, resolved: &[ResolvedSegment], req: &Request) -> Result<Response, RpcErrors> {
        let target = resolved.last().expect("non-empty path checked by caller");
        let content_format = media::negotiate_content_type(req.content_type.as_deref());
        let content = media::body_to_xml_content(&self.domain, target, content_format, &req.body)?;
        let fragment = path::build_edit_fragment(resolved, "merge", &content)?;
        self.edit_and_commit(fragment).await?;
        Ok(Response { status: 204, content_type: None, location: None, body: Vec::new() })
    }

    async fn delete(&self, resolved: &[ResolvedSegment]) -> Result<Response, RpcErrors> {
        let fragment = path::build_edit_fragment(resolved, "delete", "")?;
        self.edit_and_commit(fragment).await?;
        Ok(Response { status: 204, content_type: None, location: None, body: Vec::new() })
    }

    async fn resource_exists(&self, resolved: &[ResolvedSegment]) -> Result<bool, RpcErrors> {
        let filter = path::build_filter(resolved);
        let reply = self
            .backend
            .call(RESTCONF_SESSION, Operation::GetConfig { source: DatastoreName::Running, filter: Some(filter) })
            .await?;
        let BackendReply::Data(data_xml) = reply else {
            return Ok(false);
        };
        Ok(media::response_xml(resolved, &data_xml).is_ok())
    }

    /// Edits candidate and commits as one transaction, discarding the
    /// candidate on either failure so a rejected RESTCONF write never
    /// leaves state behind for the next writer to trip over (the
    /// candidate is process-wide, shared with any NETCONF sessions).
    async fn edit_and_commit(&self, config: String) -> Result<(), RpcErrors> {
        let edit = self
            .backend
            .call(
                RESTCONF_SESSION,
                Operation::EditConfig { target: DatastoreName::Candidate, default_operation: EditOp::Merge, config },
            )
            .await;
        if let Err(e) = edit {
            let _ = self.backend.call(RESTCONF_SESSION, Operation::DiscardChanges).await;
            return Err(e);
        }
        if let Err(e) = self.backend.call(RESTCONF_SESSION, Operation::Commit).await {
            let _ = self.backend.call(RESTCONF_SESSION, Operation::DiscardChanges).await;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_store::Datastores;
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

    fn service() -> RestconfService {
        let domain = Arc::new(load_domain(vec![("example".to_owned(), MODULE.to_owned())], &[]).unwrap());
        let backend = ncd_netconf::backend::spawn(domain.clone(), Datastores::new("top", false));
        RestconfService::new(domain, backend)
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

    fn service_with_reverse_rpc() -> RestconfService {
        let domain = Arc::new(load_domain(vec![("example".to_owned(), RPC_MODULE.to_owned())], &[]).unwrap());
        let mut registry = ncd_netconf::RpcRegistry::new();
        registry.register("urn:example", "reverse", Box::new(|input: &str| Ok(Some(input.replace("abc", "cba")))));
        let backend = ncd_netconf::backend::spawn_with_registry(domain.clone(), Datastores::new("top", false), registry);
        RestconfService::new(domain, backend)
    }

    fn json_req(method: Method, path: &str, body: &str) -> Request {
        Request {
            method,
            root: Root::Data,
            api_path: path.to_owned(),
            content_type: Some("application/yang-data+json".to_owned()),
            accept: Some("application/yang-data+json".to_owned()),
            body: body.as_bytes().to_vec(),
        }
    }

    fn json_rpc_req(path: &str, body: &str) -> Request {
        Request {
            method: Method::Post,
            root: Root::Operations,
            api_path: path.to_owned(),
            content_type: Some("application/yang-data+json".to_owned()),
            accept: Some("application/yang-data+json".to_owned()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let svc = service();
        let create = svc.handle(json_req(Method::Post, "", r#"{"example:top":{"x":"a"}}"#)).await;
        assert_eq!(create.status, 201);

        let read = svc.handle(json_req(Method::Get, "example:top/x", "")).await;
        assert_eq!(read.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&read.body).unwrap();
        assert_eq!(body["example:x"], "a");
    }

    #[tokio::test]
    async fn put_twice_is_create_then_update() {
        let svc = service();
        let body = r#"{"example:ifs":[{"name":"eth0","mtu":1500}]}"#;
        let first = svc.handle(json_req(Method::Put, "example:top/ifs=eth0", body)).await;
        assert_eq!(first.status, 201);
        let second = svc.handle(json_req(Method::Put, "example:top/ifs=eth0", body)).await;
        assert_eq!(second.status, 204);
    }

    #[tokio::test]
    async fn get_missing_resource_is_404() {
        let svc = service();
        let resp = svc.handle(json_req(Method::Get, "example:top/x", "")).await;
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn repeated_create_is_409() {
        let svc = service();
        let body = r#"{"example:top":{"x":"a"}}"#;
        assert_eq!(svc.handle(json_req(Method::Post, "", body)).await.status, 201);
        assert_eq!(svc.handle(json_req(Method::Post, "", body)).await.status, 409);
    }

    #[tokio::test]
    async fn delete_missing_resource_is_404() {
        let svc = service();
        let resp = svc.handle(json_req(Method::Delete, "example:top/ifs=eth0", "")).await;
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn rpc_roundtrip_returns_output() {
        let svc = service_with_reverse_rpc();
        let resp = svc.handle(json_rpc_req("example:reverse", r#"{"example:input":{"s":"abc"}}"#)).await;
        assert_eq!(resp.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["example:output"]["s"], "cba");
    }

    #[tokio::test]
    async fn rpc_with_no_output_is_204() {
        let domain = Arc::new(load_domain(vec![("example".to_owned(), RPC_MODULE.to_owned())], &[]).unwrap());
        let mut registry = ncd_netconf::RpcRegistry::new();
        registry.register("urn:example", "reverse", Box::new(|_: &str| Ok(None)));
        let backend = ncd_netconf::backend::spawn_with_registry(domain.clone(), Datastores::new("top", false), registry);
        let svc = RestconfService::new(domain, backend);

        let resp = svc.handle(json_rpc_req("example:reverse", r#"{"example:input":{"s":"abc"}}"#)).await;
        assert_eq!(resp.status, 204);
        assert!(resp.body.is_empty());
    }

    #[tokio::test]
    async fn unknown_rpc_name_is_404() {
        let svc = service_with_reverse_rpc();
        let resp = svc.handle(json_rpc_req("example:made-up", "")).await;
        assert_eq!(resp.status, 404);
    }

    #[tokio::test]
    async fn get_on_operations_resource_is_rejected() {
        let svc = service_with_reverse_rpc();
        let req = Request {
            method: Method::Get,
            root: Root::Operations,
            api_path: "example:reverse".to_owned(),
            content_type: None,
            accept: Some("application/yang-data+json".to_owned()),
            body: Vec::new(),
        };
        let resp = svc.handle(req).await;
        assert_eq!(resp.status, 405);
    }
}
