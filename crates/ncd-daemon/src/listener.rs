//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Accept loops binding `ncd_netconf::serve_session` to real sockets —
//! the concrete `Transport` implementations the crate's own doc
//! comments describe as external to it. RESTCONF/CLI/SNMP adapters
//! bind to `ncd_netconf::BackendHandle` directly instead and have no
//! equivalent accept loop here.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use ncd_netconf::BackendHandle;
use tokio::net::{TcpListener, UnixListener};

/// Session ids handed to real NETCONF connections. Starts at 1 and
/// never reaches `u32::MAX`, the id `ncd-restconf` reserves for its
/// own per-request pseudo-sessions, under any realistic connection
/// count.
static NEXT_SESSION: AtomicU32 = AtomicU32::new(1);

fn next_session() -> u32 {
    NEXT_SESSION.fetch_add(1, Ordering::Relaxed)
}

pub async fn serve_unix(path: &Path, backend: BackendHandle, max_message_bytes: usize) -> std::io::Result<()> {
    let _ = std::fs::remove_file(path);
    let listener = UnixListener::bind(path)?;
    tracing::info!(path = %path.display(), "netconf unix listener ready");
    loop {
        let (stream, _addr) = listener.accept().await?;
        let backend = backend.clone();
        let session = next_session();
        tokio::spawn(async move {
            ncd_netconf::serve_session(stream, session, backend, max_message_bytes).await;
        });
    }
}

pub async fn serve_tcp(addr: &str, backend: BackendHandle, max_message_bytes: usize) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr, "netconf tcp listener ready");
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!(%peer, "netconf tcp connection accepted");
        let backend = backend.clone();
        let session = next_session();
        tokio::spawn(async move {
            ncd_netconf::serve_session(stream, session, backend, max_message_bytes).await;
        });
    }
}

/// Runs whichever listeners `options` configures side by side; returns
/// when the first one fails (the other's task is left running until
/// the process exits since there is no peer shutdown channel for it).
pub async fn serve(
    socket_path: &Path,
    tcp_addr: Option<&str>,
    backend: BackendHandle,
    max_message_bytes: usize,
) -> std::io::Result<()> {
    match tcp_addr {
        Some(addr) => {
            let unix_backend = backend.clone();
            let socket_path = socket_path.to_owned();
            let addr = addr.to_owned();
            tokio::select! {
                res = serve_unix(&socket_path, unix_backend, max_message_bytes) => res,
                res = serve_tcp(&addr, backend, max_message_bytes) => res,
            }
        }
        None => serve_unix(socket_path, backend, max_message_bytes).await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ncd_store::Datastores;
    use ncd_yang::load_domain;
    use tokio::net::UnixStream;

    use super::*;

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
    async fn unix_listener_accepts_a_hello_exchange() {
        let path = std::env::temp_dir().join(format!("ncd-listener-test-{}.sock", std::process::id()));
        let domain = Arc::new(load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap());
        let backend = ncd_netconf::backend::spawn(domain, Datastores::new("top", false));

        let accept_path = path.clone();
        tokio::spawn(async move {
            let _ = serve_unix(&accept_path, backend, 1 << 20).await;
        });
        // Yield so the listener task binds before the client connects.
        tokio::task::yield_now().await;

        let mut client = UnixStream::connect(&path).await.unwrap();
        let hello = ncd_netconf::framing::read_eom(&mut client, 1 << 20).await.unwrap().unwrap();
        assert!(hello.contains("<hello"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn session_ids_increase_monotonically() {
        let first = next_session();
        let second = next_session();
        assert!(second > first);
    }
}
