//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The backend task: owns the one `Datastores` and `SchemaDomain` for
//! the process and answers every session's request in turn over an
//! `mpsc` channel, replying through a one-shot [`Responder`] — the
//! same daemon/provider split the teacher uses for its northbound
//! request/response pairs, here collapsed to a single in-process task
//! since this implementation has no separate provider processes to
//! fan out to.

use std::sync::Arc;

use ncd_instance::bind::{bind_document, NoMounts};
use ncd_instance::serialize::to_xml;
use ncd_store::{DatastoreName, Datastores};
use ncd_utils::{ErrorTag, RpcError, RpcErrors};
use ncd_utils::Responder;
use ncd_yang::SchemaDomain;
use tokio::sync::{mpsc, oneshot};

use crate::filter;
use crate::ops::{CopySource, Operation};
use crate::rpc::RpcRegistry;
use crate::xmlelem::parse_document;

#[derive(Debug)]
pub enum BackendReply {
    Data(String),
    /// A custom rpc's `<output>` children, already serialized as XML.
    RpcOutput(String),
    Ok,
}

pub struct BackendRequest {
    pub session: u32,
    pub op: Operation,
    pub reply: Responder<Result<BackendReply, RpcErrors>>,
}

#[derive(Clone)]
pub struct BackendHandle {
    tx: mpsc::Sender<BackendRequest>,
}

impl BackendHandle {
    pub async fn call(&self, session: u32, op: Operation) -> Result<BackendReply, RpcErrors> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(BackendRequest { session, op, reply: reply_tx })
            .await
            .map_err(|_| backend_gone())?;
        reply_rx.await.map_err(|_| backend_gone())?
    }

    /// Releases every lock `session` held, run when its transport
    /// connection closes (`<close-session>` or an abrupt disconnect).
    pub async fn close_session(&self, session: u32) {
        let _ = self.call(session, Operation::CloseSession).await;
    }
}

fn backend_gone() -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::OperationFailed).message("backend task is no longer running"))
}

/// Spawns the backend task with an empty rpc handler registry — every
/// custom rpc fails as unsupported until a caller that knows about
/// plugin handlers uses [`spawn_with_registry`] instead.
pub fn spawn(domain: Arc<SchemaDomain>, store: Datastores) -> BackendHandle {
    spawn_with_registry(domain, store, RpcRegistry::new())
}

/// Spawns the backend task and returns a cloneable handle to it. The
/// task runs until every `BackendHandle` clone (and its sender) is
/// dropped.
pub fn spawn_with_registry(domain: Arc<SchemaDomain>, store: Datastores, registry: RpcRegistry) -> BackendHandle {
    let (tx, mut rx) = mpsc::channel::<BackendRequest>(64);
    tokio::spawn(async move {
        let mut store = store;
        while let Some(request) = rx.recv().await {
            let result = handle(&domain, &mut store, &registry, request.session, request.op);
            let _ = request.reply.send(result);
        }
    });
    BackendHandle { tx }
}

fn handle(domain: &SchemaDomain, store: &mut Datastores, registry: &RpcRegistry, session: u32, op: Operation) -> Result<BackendReply, RpcErrors> {
    match op {
        Operation::Get { filter } => {
            let xml = render(domain, &store.running, filter.as_deref())?;
            Ok(BackendReply::Data(xml))
        }
        Operation::GetConfig { source, filter } => {
            let tree = select(store, source)?;
            let xml = render(domain, tree, filter.as_deref())?;
            Ok(BackendReply::Data(xml))
        }
        Operation::EditConfig { target, default_operation, config } => {
            let mut edit = bind_edit(domain, &config)?;
            edit.get_mut(edit.root).operation = Some(default_operation);
            match target {
                DatastoreName::Candidate => store.edit_candidate(domain, &edit)?,
                DatastoreName::Running => ncd_store::apply_edit_config(domain, &mut store.running, &edit)?,
                DatastoreName::Startup => {
                    let startup = store.startup.as_mut().ok_or_else(startup_disabled)?;
                    ncd_store::apply_edit_config(domain, startup, &edit)?;
                }
            }
            Ok(BackendReply::Ok)
        }
        Operation::CopyConfig { source, target } => {
            let replacement = match source {
                CopySource::Datastore(name) => select(store, name)?.clone(),
                CopySource::Config(xml) => bind_edit(domain, &xml)?,
            };
            replace(store, target, replacement)?;
            Ok(BackendReply::Ok)
        }
        Operation::DeleteConfig { target } => {
            if target == DatastoreName::Running {
                return Err(RpcErrors::single(
                    RpcError::new(ErrorTag::OperationNotSupported).message("running cannot be the target of delete-config"),
                ));
            }
            let existing = current(store, target)?;
            let empty_name = existing.get(existing.root).name.clone();
            replace(store, target, ncd_instance::InstanceTree::new(empty_name))?;
            Ok(BackendReply::Ok)
        }
        Operation::Lock { target } => {
            store.locks.lock(target, session).map_err(RpcErrors::from)?;
            Ok(BackendReply::Ok)
        }
        Operation::Unlock { target } => {
            store.locks.unlock(target, session).map_err(RpcErrors::from)?;
            Ok(BackendReply::Ok)
        }
        Operation::Commit => {
            store.commit(domain, session)?;
            Ok(BackendReply::Ok)
        }
        Operation::DiscardChanges => {
            store.discard_changes();
            Ok(BackendReply::Ok)
        }
        Operation::Validate { source } => {
            match source {
                DatastoreName::Candidate => {
                    store.validate_candidate(domain)?;
                }
                other => {
                    let mut copy = select(store, other)?.clone();
                    ncd_validate::validate(domain, &mut copy)?;
                }
            }
            Ok(BackendReply::Ok)
        }
        Operation::CloseSession => {
            store.locks.release_session(session);
            Ok(BackendReply::Ok)
        }
        Operation::KillSession { session_id } => {
            // Terminating another session's live transport connection
            // is out of scope (no session registry crosses task
            // boundaries here); releasing its locks is the part of
            // RFC 6241 §7.9 that the datastore itself owns.
            store.locks.release_session(session_id);
            Ok(BackendReply::Ok)
        }
        Operation::CreateSubscription => Err(RpcErrors::single(
            RpcError::new(ErrorTag::OperationNotSupported).message("notifications are not supported"),
        )),
        Operation::Invoke { namespace, name, input_xml } => {
            tracing::debug!(session, namespace = %namespace, name = %name, "invoking custom rpc");
            match registry.invoke(domain, &namespace, &name, &input_xml)? {
                Some(output_xml) => Ok(BackendReply::RpcOutput(output_xml)),
                None => Ok(BackendReply::Ok),
            }
        }
    }
}

fn select<'a>(store: &'a Datastores, name: DatastoreName) -> Result<&'a ncd_instance::InstanceTree, RpcErrors> {
    match name {
        DatastoreName::Running => Ok(&store.running),
        DatastoreName::Candidate => Ok(&store.candidate),
        DatastoreName::Startup => store.startup.as_ref().ok_or_else(startup_disabled),
    }
}

fn current(store: &Datastores, name: DatastoreName) -> Result<&ncd_instance::InstanceTree, RpcErrors> {
    select(store, name)
}

fn replace(store: &mut Datastores, name: DatastoreName, tree: ncd_instance::InstanceTree) -> Result<(), RpcErrors> {
    match name {
        DatastoreName::Running => store.running = tree,
        DatastoreName::Candidate => {
            store.candidate = tree;
            store.candidate_state.mark_dirty();
        }
        DatastoreName::Startup => {
            let slot = store.startup.as_mut().ok_or_else(startup_disabled)?;
            *slot = tree;
        }
    }
    Ok(())
}

fn bind_edit(domain: &SchemaDomain, config_xml: &str) -> Result<ncd_instance::InstanceTree, RpcErrors> {
    let root = parse_document(&format!("<config>{config_xml}</config>"))
        .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::MalformedMessage).message(e.to_string())))?;
    if root.children.len() > 1 {
        return Err(RpcErrors::single(
            RpcError::new(ErrorTag::OperationNotSupported)
                .message("a single edit-config/copy-config payload may only target one top-level data node"),
        ));
    }
    bind_document(config_xml, domain, "edit", &mut NoMounts)
        .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::MalformedMessage).message(e.to_string())))
}

fn render(domain: &SchemaDomain, tree: &ncd_instance::InstanceTree, filter_xml: Option<&str>) -> Result<String, RpcErrors> {
    let Some(filter_xml) = filter_xml else {
        return Ok(to_xml(tree, domain, tree.root));
    };
    let serialized = to_xml(tree, domain, tree.root);
    let content = parse_document(&format!("<data>{serialized}</data>"))
        .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::OperationFailed).message(e.to_string())))?
        .children;
    let filter = parse_document(&format!("<filter>{filter_xml}</filter>"))
        .map_err(|e| RpcErrors::single(RpcError::new(ErrorTag::MalformedMessage).message(e.to_string())))?
        .children;
    let filtered = filter::apply(&content, &filter);
    Ok(filtered.iter().map(|e| e.to_xml()).collect::<Vec<_>>().join(""))
}

fn startup_disabled() -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::OperationNotSupported).message("the :startup capability is not enabled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module ex {
  namespace "urn:ex";
  prefix ex;

  container top {
    list ifs {
      key "name";
      leaf name { type string; }
      leaf mtu { type uint16; default "1500"; }
    }
  }
}
"#;

    fn domain() -> Arc<SchemaDomain> {
        Arc::new(load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap())
    }

    #[tokio::test]
    async fn edit_config_then_commit_then_get_config_round_trips() {
        let domain = domain();
        let handle = spawn(domain.clone(), Datastores::new("top", true));

        handle
            .call(
                1,
                Operation::EditConfig {
                    target: DatastoreName::Candidate,
                    default_operation: ncd_instance::Operation::Merge,
                    config: r#"<top xmlns="urn:ex"><ifs><name>eth0</name></ifs></top>"#.to_owned(),
                },
            )
            .await
            .unwrap();

        handle.call(1, Operation::Commit).await.unwrap();

        let reply = handle
            .call(1, Operation::GetConfig { source: DatastoreName::Running, filter: None })
            .await
            .unwrap();
        match reply {
            BackendReply::Data(xml) => assert!(xml.contains("eth0")),
            _ => panic!("expected data"),
        }
    }

    #[tokio::test]
    async fn lock_denied_for_second_session() {
        let domain = domain();
        let handle = spawn(domain, Datastores::new("top", false));
        handle.call(1, Operation::Lock { target: DatastoreName::Running }).await.unwrap();
        let err = handle.call(2, Operation::Lock { target: DatastoreName::Running }).await.unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::LockDenied)));
    }

    #[tokio::test]
    async fn delete_config_rejects_running_as_target() {
        let domain = domain();
        let handle = spawn(domain, Datastores::new("top", false));
        let err = handle.call(1, Operation::DeleteConfig { target: DatastoreName::Running }).await.unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::OperationNotSupported)));
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

    #[tokio::test]
    async fn invoke_dispatches_to_a_registered_rpc_handler() {
        let domain = Arc::new(load_domain(vec![("example".to_owned(), RPC_MODULE.to_owned())], &[]).unwrap());
        let mut registry = RpcRegistry::new();
        registry.register(
            "urn:example",
            "reverse",
            Box::new(|input| Ok(Some(input.replace("abc", "cba")))),
        );
        let handle = spawn_with_registry(domain, Datastores::new("top", false), registry);

        let reply = handle
            .call(
                1,
                Operation::Invoke { namespace: "urn:example".to_owned(), name: "reverse".to_owned(), input_xml: "<s>abc</s>".to_owned() },
            )
            .await
            .unwrap();
        match reply {
            BackendReply::RpcOutput(xml) => assert_eq!(xml, "<s>cba</s>"),
            _ => panic!("expected rpc output"),
        }
    }

    #[tokio::test]
    async fn invoke_of_unregistered_rpc_is_not_supported() {
        let domain = domain();
        let handle = spawn(domain, Datastores::new("top", false));
        let err = handle
            .call(1, Operation::Invoke { namespace: "urn:ex".to_owned(), name: "made-up".to_owned(), input_xml: String::new() })
            .await
            .unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::OperationNotSupported)));
    }
}
