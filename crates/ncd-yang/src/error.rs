//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Fatal schema-load-time errors. None of these are recoverable: a
//! schema domain that fails to resolve is never exposed to callers.

use std::fmt;

use crate::parser::SyntaxError;

#[derive(Debug)]
pub enum SchemaError {
    Syntax(SyntaxError),
    UnknownImport {
        module: String,
        importer: String,
    },
    CyclicGroupingUse {
        grouping: String,
    },
    LeafrefTargetMissing {
        leaf: String,
        path: String,
    },
    DuplicateKey {
        list: String,
        key: String,
    },
    AmbiguousAugmentTarget {
        target: String,
    },
    InvalidPathArg {
        leaf: String,
        reason: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Syntax(e) => write!(f, "syntax error: {e}"),
            SchemaError::UnknownImport { module, importer } => {
                write!(f, "module '{importer}' imports unknown module '{module}'")
            }
            SchemaError::CyclicGroupingUse { grouping } => {
                write!(f, "cyclic 'uses' of grouping '{grouping}'")
            }
            SchemaError::LeafrefTargetMissing { leaf, path } => {
                write!(f, "leafref '{leaf}' path '{path}' resolves to no schema node")
            }
            SchemaError::DuplicateKey { list, key } => {
                write!(f, "list '{list}' declares key leaf '{key}' more than once")
            }
            SchemaError::AmbiguousAugmentTarget { target } => {
                write!(f, "augment target '{target}' is ambiguous")
            }
            SchemaError::InvalidPathArg { leaf, reason } => {
                write!(f, "leafref '{leaf}': invalid path-arg: {reason}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

impl From<SyntaxError> for SchemaError {
    fn from(e: SyntaxError) -> Self {
        SchemaError::Syntax(e)
    }
}
