//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Serves one NETCONF session over any byte stream. `Transport` is the
//! boundary RESTCONF/CLI/SNMP adapters are described as binding to
//! instead (per the daemon's own design): they call
//! [`crate::backend::BackendHandle`] directly rather than going
//! through framing and XML at all, since they aren't raw NETCONF byte
//! streams. Only the daemon's own Unix and TCP listeners drive a
//! session through this module.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::backend::BackendHandle;
use crate::framing::{self, FramingMode};
use crate::message::{self, RpcRequest};
use crate::ops;
use crate::reply;

/// Any duplex byte stream a NETCONF session can be served over (a
/// Unix-domain or TCP connection, or an in-memory pipe in tests).
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

const SERVER_CAPABILITIES: &[&str] = &[
    "urn:ietf:params:netconf:base:1.0",
    "urn:ietf:params:netconf:base:1.1",
    "urn:ietf:params:netconf:capability:candidate:1.0",
    "urn:ietf:params:netconf:capability:startup:1.0",
];

/// Runs the `<hello>` exchange, negotiates framing, then serves
/// `<rpc>` requests until the peer closes the connection or sends
/// `<close-session>`. Releases every lock the session held on exit.
pub async fn serve_session<T: Transport>(mut stream: T, session: u32, backend: BackendHandle, max_message_bytes: usize) {
    let mode = match run_hello(&mut stream, max_message_bytes).await {
        Ok(mode) => mode,
        Err(e) => {
            tracing::warn!(session, error = %e, "hello exchange failed");
            return;
        }
    };

    loop {
        let Ok(Some(raw)) = framing::read_message(&mut stream, mode, max_message_bytes).await else {
            break;
        };

        let request = match message::parse_rpc(&raw) {
            Ok(req) => req,
            Err(e) => {
                tracing::warn!(session, error = %e, "malformed rpc, closing session");
                break;
            }
        };

        let reply_xml = dispatch(&backend, session, &request).await;
        let is_close = request.body.name == "close-session";
        if framing::write_message(&mut stream, mode, &reply_xml).await.is_err() {
            break;
        }
        if is_close {
            break;
        }
    }

    backend.close_session(session).await;
}

const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

/// Exchanges `<hello>` documents and negotiates framing: chunked only
/// once both sides have advertised `base:1.1` (RFC 6242 §4.1),
/// end-of-message marker framing otherwise.
async fn run_hello<T: Transport>(stream: &mut T, max_message_bytes: usize) -> Result<FramingMode, std::io::Error> {
    let hello = message::hello_document(SERVER_CAPABILITIES);
    framing::write_eom(stream, &hello).await?;
    let peer_hello = framing::read_eom(stream, max_message_bytes)
        .await?
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "peer closed before hello"))?;
    let peer_caps = message::parse_hello(&peer_hello).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
    let chunked = peer_caps.iter().any(|c| c == BASE_1_1) && SERVER_CAPABILITIES.contains(&BASE_1_1);
    Ok(if chunked { FramingMode::Chunked } else { FramingMode::EndOfMessage })
}

async fn dispatch(backend: &BackendHandle, session: u32, request: &RpcRequest) -> String {
    let op = match ops::parse_operation(&request.body) {
        Ok(op) => op,
        Err(errors) => return reply::errors(&request.message_id, &errors),
    };
    match backend.call(session, op).await {
        Ok(crate::backend::BackendReply::Ok) => reply::ok(&request.message_id),
        Ok(crate::backend::BackendReply::Data(xml)) => reply::data(&request.message_id, &xml),
        Ok(crate::backend::BackendReply::RpcOutput(xml)) => reply::rpc_output(&request.message_id, &xml),
        Err(errors) => reply::errors(&request.message_id, &errors),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::duplex;

    use super::*;
    use crate::backend;
    use ncd_store::Datastores;
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module ex {
  namespace "urn:ex";
  prefix ex;

  container top {
    leaf name { type string; }
  }
}
"#;

    #[tokio::test]
    async fn hello_exchange_then_get_config_then_close() {
        let domain = Arc::new(load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap());
        let handle = backend::spawn(domain, Datastores::new("top", false));

        let (client, server) = duplex(64 * 1024);
        let server_task = tokio::spawn(serve_session(server, 1, handle, 1 << 20));

        let mut client = client;
        let _server_hello = framing::read_eom(&mut client, 1 << 20).await.unwrap().unwrap();
        framing::write_eom(&mut client, &message::hello_document(&["urn:ietf:params:netconf:base:1.0"]))
            .await
            .unwrap();

        framing::write_eom(
            &mut client,
            r#"<rpc message-id="1" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><get-config><source><running/></source></get-config></rpc>"#,
        )
        .await
        .unwrap();
        let reply = framing::read_eom(&mut client, 1 << 20).await.unwrap().unwrap();
        assert!(reply.contains("<data>"));

        framing::write_eom(
            &mut client,
            r#"<rpc message-id="2" xmlns="urn:ietf:params:xml:ns:netconf:base:1.0"><close-session/></rpc>"#,
        )
        .await
        .unwrap();
        let reply = framing::read_eom(&mut client, 1 << 20).await.unwrap().unwrap();
        assert!(reply.contains("<ok/>"));

        server_task.await.unwrap();
    }
}
