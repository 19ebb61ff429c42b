//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Parses one NETCONF protocol message (after framing has already
//! split it off the wire) into an `<rpc>` envelope: its `message-id`
//! and the single operation element inside it.

use crate::error::NetconfError;
use crate::xmlelem::{parse_document, RawElement};

#[derive(Debug)]
pub struct RpcRequest {
    pub message_id: String,
    pub body: RawElement,
}

/// Parses a `<hello>` document's advertised capability URIs, used to
/// decide whether to switch to chunked framing per RFC 6242 §4.1.
pub fn parse_hello(xml: &str) -> Result<Vec<String>, NetconfError> {
    let root = parse_document(xml)?;
    let caps = root
        .child("capabilities")
        .ok_or_else(|| NetconfError::MalformedRpc("hello has no capabilities element".to_owned()))?;
    Ok(caps.children.iter().map(|c| c.text.clone()).collect())
}

pub fn hello_document(capabilities: &[&str]) -> String {
    let caps: String = capabilities.iter().map(|c| format!("<capability>{c}</capability>")).collect();
    format!(
        r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities>{caps}</capabilities></hello>"#
    )
}

/// Parses an `<rpc>` document into its `message-id` and sole operation
/// child. A request with zero or more than one operation element, or
/// missing `message-id`, is malformed per RFC 6241 §4.1.
pub fn parse_rpc(xml: &str) -> Result<RpcRequest, NetconfError> {
    let root = parse_document(xml)?;
    if root.name != "rpc" {
        return Err(NetconfError::MalformedRpc(format!("expected 'rpc', found '{}'", root.name)));
    }
    let message_id = root
        .attr("message-id")
        .ok_or_else(|| NetconfError::MalformedRpc("missing message-id attribute".to_owned()))?
        .to_owned();
    match root.children.as_slice() {
        [body] => Ok(RpcRequest { message_id, body: body.clone() }),
        [] => Err(NetconfError::MalformedRpc("rpc has no operation element".to_owned())),
        _ => Err(NetconfError::MalformedRpc("rpc has more than one operation element".to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_id_and_operation() {
        let req = parse_rpc(r#"<rpc message-id="42" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><get/></rpc>"#).unwrap();
        assert_eq!(req.message_id, "42");
        assert_eq!(req.body.name, "get");
    }

    #[test]
    fn missing_message_id_is_malformed() {
        let err = parse_rpc(r#"<rpc><get/></rpc>"#).unwrap_err();
        assert!(matches!(err, NetconfError::MalformedRpc(_)));
    }

    #[test]
    fn parses_hello_capabilities() {
        let caps = parse_hello(
            r#"<hello xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><capabilities><capability>urn:ietf:params:netconf:base:1.1</capability></capabilities></hello>"#,
        )
        .unwrap();
        assert_eq!(caps, vec!["urn:ietf:params:netconf:base:1.1"]);
    }
}
