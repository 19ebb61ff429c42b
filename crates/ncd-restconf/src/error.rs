//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Wraps the shared NETCONF error taxonomy for the HTTP-facing layer:
//! every failure in this crate ends up as an [`RpcErrors`] so the same
//! `error-tag` vocabulary that `ncd-netconf::reply` renders to XML gets
//! rendered to an RFC 8040 §7.1 `errors` body here instead.

use ncd_utils::{ErrorTag, RpcError, RpcErrors};

pub fn not_found(message: impl Into<String>) -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::DataMissing).message(message))
}

pub fn bad_request(message: impl Into<String>) -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::InvalidValue).message(message))
}

pub fn unsupported(message: impl Into<String>) -> RpcErrors {
    RpcErrors::single(RpcError::new(ErrorTag::OperationNotSupported).message(message))
}
