//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Parses an `<rpc>` body's operation element into an [`Operation`],
//! reusing `ncd-store`'s own `DatastoreName` for every `<source>`/
//! `<target>` reference rather than inventing a parallel vocabulary.

use ncd_instance::Operation as EditOp;
use ncd_store::DatastoreName;
use ncd_utils::{ErrorTag, RpcError, RpcErrors};

use crate::xmlelem::RawElement;

#[derive(Clone, Debug)]
pub enum CopySource {
    Datastore(DatastoreName),
    /// An inline `<config>` element given directly as `<source>`.
    Config(String),
}

#[derive(Clone, Debug)]
pub enum Operation {
    Get { filter: Option<String> },
    GetConfig { source: DatastoreName, filter: Option<String> },
    EditConfig { target: DatastoreName, default_operation: EditOp, config: String },
    CopyConfig { source: CopySource, target: DatastoreName },
    DeleteConfig { target: DatastoreName },
    Lock { target: DatastoreName },
    Unlock { target: DatastoreName },
    Commit,
    DiscardChanges,
    Validate { source: DatastoreName },
    CloseSession,
    KillSession { session_id: u32 },
    CreateSubscription,
    /// Any top-level `<rpc>` child beyond the built-in operations above
    /// — a custom YANG `rpc` statement, resolved and dispatched through
    /// [`crate::rpc::RpcRegistry`] rather than a fixed match arm here.
    Invoke { namespace: String, name: String, input_xml: String },
}

pub fn parse_operation(body: &RawElement) -> Result<Operation, RpcErrors> {
    match body.name.as_str() {
        "get" => Ok(Operation::Get { filter: parse_filter(body)? }),
        "get-config" => {
            let source_elem = require_child(body, "source")?;
            Ok(Operation::GetConfig {
                source: parse_datastore_ref(source_elem)?,
                filter: parse_filter(body)?,
            })
        }
        "edit-config" => {
            let target_elem = require_child(body, "target")?;
            let target = parse_datastore_ref(target_elem)?;
            let default_operation = match body.child("default-operation").map(|e| e.text.as_str()) {
                Some("replace") => EditOp::Replace,
                Some("none") => EditOp::None,
                Some("merge") | None => EditOp::Merge,
                Some(other) => return Err(bad_element("default-operation", other)),
            };
            let config = body
                .child("config")
                .ok_or_else(|| missing_element("config"))?
                .children_xml();
            Ok(Operation::EditConfig { target, default_operation, config })
        }
        "copy-config" => {
            let target_elem = require_child(body, "target")?;
            let source_elem = require_child(body, "source")?;
            let target = parse_datastore_ref(target_elem)?;
            let source = if let Some(config) = source_elem.child("config") {
                CopySource::Config(config.children_xml())
            } else {
                CopySource::Datastore(parse_datastore_ref(source_elem)?)
            };
            Ok(Operation::CopyConfig { source, target })
        }
        "delete-config" => {
            let target_elem = require_child(body, "target")?;
            Ok(Operation::DeleteConfig { target: parse_datastore_ref(target_elem)? })
        }
        "lock" => Ok(Operation::Lock { target: parse_datastore_ref(require_child(body, "target")?)? }),
        "unlock" => Ok(Operation::Unlock { target: parse_datastore_ref(require_child(body, "target")?)? }),
        "commit" => Ok(Operation::Commit),
        "discard-changes" => Ok(Operation::DiscardChanges),
        "validate" => {
            let source = match body.child("source") {
                Some(elem) => parse_datastore_ref(elem)?,
                None => DatastoreName::Candidate,
            };
            Ok(Operation::Validate { source })
        }
        "close-session" => Ok(Operation::CloseSession),
        "kill-session" => {
            let session_id_text = body
                .child("session-id")
                .map(|e| e.text.as_str())
                .ok_or_else(|| missing_element("session-id"))?;
            let session_id = session_id_text
                .parse()
                .map_err(|_| bad_element("session-id", session_id_text))?;
            Ok(Operation::KillSession { session_id })
        }
        "create-subscription" => Ok(Operation::CreateSubscription),
        other => Ok(Operation::Invoke {
            namespace: body.namespace.clone(),
            name: other.to_owned(),
            input_xml: body.children_xml(),
        }),
    }
}

fn parse_filter(body: &RawElement) -> Result<Option<String>, RpcErrors> {
    let Some(filter) = body.child("filter") else {
        return Ok(None);
    };
    match filter.attr("type") {
        Some("xpath") => Err(RpcErrors::single(
            RpcError::new(ErrorTag::OperationNotSupported).message("xpath filters are not supported, use subtree filtering"),
        )),
        _ => Ok(Some(filter.children_xml())),
    }
}

fn parse_datastore_ref(container: &RawElement) -> Result<DatastoreName, RpcErrors> {
    let name = container
        .children
        .first()
        .ok_or_else(|| missing_element("datastore"))?
        .name
        .as_str();
    match name {
        "running" => Ok(DatastoreName::Running),
        "candidate" => Ok(DatastoreName::Candidate),
        "startup" => Ok(DatastoreName::Startup),
        "url" => Err(RpcErrors::single(
            RpcError::new(ErrorTag::OperationNotSupported).message("the :url capability is not supported"),
        )),
        other => Err(bad_element("datastore", other)),
    }
}

fn require_child<'a>(body: &'a RawElement, name: &str) -> Result<&'a RawElement, RpcErrors> {
    body.child(name).ok_or_else(|| missing_element(name))
}

fn missing_element(name: &str) -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::MissingElement).message(format!("missing '{name}' element")))
}

fn bad_element(name: &str, value: &str) -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::BadElement).message(format!("unexpected '{name}' value '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmlelem::parse_document;

    #[test]
    fn parses_get_config_with_subtree_filter() {
        let body = parse_document(
            r#"<get-config><source><running/></source><filter type="subtree"><top xmlns="urn:ex"/></filter></get-config>"#,
        )
        .unwrap();
        let op = parse_operation(&body).unwrap();
        match op {
            Operation::GetConfig { source, filter } => {
                assert_eq!(source, DatastoreName::Running);
                assert!(filter.unwrap().contains("top"));
            }
            _ => panic!("wrong operation"),
        }
    }

    #[test]
    fn parses_edit_config_default_operation_and_payload() {
        let body = parse_document(
            r#"<edit-config><target><candidate/></target><default-operation>replace</default-operation><config><top xmlns="urn:ex"><name>eth0</name></top></config></edit-config>"#,
        )
        .unwrap();
        let op = parse_operation(&body).unwrap();
        match op {
            Operation::EditConfig { target, default_operation, config } => {
                assert_eq!(target, DatastoreName::Candidate);
                assert!(matches!(default_operation, EditOp::Replace));
                assert!(config.contains("eth0"));
            }
            _ => panic!("wrong operation"),
        }
    }

    #[test]
    fn rejects_xpath_filters() {
        let body = parse_document(r#"<get><filter type="xpath" select="/top"/></get>"#).unwrap();
        let err = parse_operation(&body).unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::OperationNotSupported)));
    }

    #[test]
    fn non_builtin_operation_name_parses_as_invoke() {
        let body = parse_document(r#"<reverse xmlns="urn:example"><s>abc</s></reverse>"#).unwrap();
        let op = parse_operation(&body).unwrap();
        match op {
            Operation::Invoke { namespace, name, input_xml } => {
                assert_eq!(namespace, "urn:example");
                assert_eq!(name, "reverse");
                assert!(input_xml.contains("<s>abc</s>"));
            }
            _ => panic!("wrong operation"),
        }
    }
}
