//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fmt;

#[derive(Debug)]
pub enum NetconfError {
    Xml(String),
    /// The `<rpc>` envelope itself was unparsable (missing `message-id`,
    /// no recognized operation element, ...); there is no `message-id`
    /// to reply against, so this can only become a `<hello>`-time
    /// session teardown rather than an `<rpc-reply>`.
    MalformedRpc(String),
}

impl fmt::Display for NetconfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetconfError::Xml(e) => write!(f, "malformed XML: {e}"),
            NetconfError::MalformedRpc(e) => write!(f, "malformed rpc: {e}"),
        }
    }
}

impl std::error::Error for NetconfError {}
