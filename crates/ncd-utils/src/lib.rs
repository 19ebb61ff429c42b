//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Shared plumbing used by every crate in the workspace: the NETCONF error
//! taxonomy, the startup options document, and the one-shot response
//! channel type used for in-process request/response pairs.

pub mod error;
pub mod options;
pub mod responder;

pub use error::{ErrorTag, ErrorType, RpcError, RpcErrors};
pub use responder::Responder;
