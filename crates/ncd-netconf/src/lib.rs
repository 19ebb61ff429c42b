//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The NETCONF RPC layer (component F): message framing, the `<rpc>`/
//! `<rpc-reply>` envelope, the built-in operation set, and the backend
//! task that owns the process's datastores and answers every session
//! serially.

pub mod backend;
pub mod error;
pub mod filter;
pub mod framing;
pub mod message;
pub mod ops;
pub mod reply;
pub mod rpc;
pub mod transport;
pub mod xmlelem;

pub use backend::{BackendHandle, BackendReply};
pub use error::NetconfError;
pub use framing::FramingMode;
pub use ops::Operation;
pub use rpc::{RpcHandler, RpcRegistry};
pub use transport::{serve_session, Transport};
