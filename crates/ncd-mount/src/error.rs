//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::fmt;

#[derive(Debug)]
pub enum MountError {
    Xml(String),
    UnknownModule(String),
    Schema(ncd_yang::SchemaError),
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountError::Xml(e) => write!(f, "malformed yang-library document: {e}"),
            MountError::UnknownModule(name) => {
                write!(f, "mounted module '{name}' is not in the module catalog")
            }
            MountError::Schema(e) => write!(f, "mounted schema failed to resolve: {e}"),
        }
    }
}

impl std::error::Error for MountError {}
