//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Fatal startup errors: schema load, datastore persistence, and
//! socket binding failures that abort process initialization before
//! any session is ever served.

use std::fmt;

#[derive(Debug)]
pub enum DaemonError {
    Schema(ncd_yang::SchemaError),
    Datastore { path: String, reason: String },
    Io(std::io::Error),
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonError::Schema(e) => write!(f, "schema failed to load: {e}"),
            DaemonError::Datastore { path, reason } => {
                write!(f, "failed to load datastore document {path}: {reason}")
            }
            DaemonError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DaemonError {}

impl From<std::io::Error> for DaemonError {
    fn from(e: std::io::Error) -> DaemonError {
        DaemonError::Io(e)
    }
}

impl From<ncd_yang::SchemaError> for DaemonError {
    fn from(e: ncd_yang::SchemaError) -> DaemonError {
        DaemonError::Schema(e)
    }
}
