//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The NETCONF error taxonomy (RFC 6241 §4.3, §7) shared by every layer
//! above the datastore: the validator, the edit pipeline, the NETCONF RPC
//! layer and the RESTCONF translator all report failures as an [`RpcError`]
//! rather than a layer-specific error type, so that a single `<rpc-error>`
//! (or RFC 8040 `errors/error`) shaping function can serve all of them.

use std::fmt;

/// `error-type` (RFC 6241 §4.3).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorType {
    Transport,
    Rpc,
    Protocol,
    Application,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::Transport => "transport",
            ErrorType::Rpc => "rpc",
            ErrorType::Protocol => "protocol",
            ErrorType::Application => "application",
        };
        write!(f, "{s}")
    }
}

/// `error-tag` (RFC 6241 §4.3).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorTag {
    InUse,
    InvalidValue,
    TooBig,
    MissingAttribute,
    BadAttribute,
    UnknownAttribute,
    MissingElement,
    BadElement,
    UnknownElement,
    UnknownNamespace,
    AccessDenied,
    LockDenied,
    ResourceDenied,
    RollbackFailed,
    DataExists,
    DataMissing,
    OperationNotSupported,
    OperationFailed,
    MalformedMessage,
}

impl ErrorTag {
    /// The default `error-type` a bare tag maps to when the caller hasn't
    /// classified it otherwise. Some tags (e.g. `data-exists`) are always
    /// `application`; others depend on context, so callers may override.
    pub fn default_error_type(self) -> ErrorType {
        match self {
            ErrorTag::InUse
            | ErrorTag::InvalidValue
            | ErrorTag::TooBig
            | ErrorTag::MissingAttribute
            | ErrorTag::BadAttribute
            | ErrorTag::UnknownAttribute
            | ErrorTag::MissingElement
            | ErrorTag::BadElement
            | ErrorTag::UnknownElement
            | ErrorTag::UnknownNamespace
            | ErrorTag::MalformedMessage => ErrorType::Protocol,
            ErrorTag::AccessDenied
            | ErrorTag::LockDenied
            | ErrorTag::ResourceDenied
            | ErrorTag::RollbackFailed
            | ErrorTag::DataExists
            | ErrorTag::DataMissing
            | ErrorTag::OperationNotSupported
            | ErrorTag::OperationFailed => ErrorType::Application,
        }
    }

    /// RESTCONF status code for this tag (RFC 8040 §7.1, Appendix B).
    pub fn http_status(self) -> u16 {
        match self {
            ErrorTag::InUse
            | ErrorTag::LockDenied
            | ErrorTag::ResourceDenied
            | ErrorTag::DataExists => 409,
            ErrorTag::InvalidValue
            | ErrorTag::MissingAttribute
            | ErrorTag::BadAttribute
            | ErrorTag::UnknownAttribute
            | ErrorTag::MissingElement
            | ErrorTag::BadElement
            | ErrorTag::UnknownElement
            | ErrorTag::UnknownNamespace
            | ErrorTag::MalformedMessage => 400,
            ErrorTag::TooBig => 413,
            ErrorTag::AccessDenied => 403,
            ErrorTag::RollbackFailed | ErrorTag::OperationFailed => 500,
            ErrorTag::DataMissing => 404,
            ErrorTag::OperationNotSupported => 405,
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorTag::InUse => "in-use",
            ErrorTag::InvalidValue => "invalid-value",
            ErrorTag::TooBig => "too-big",
            ErrorTag::MissingAttribute => "missing-attribute",
            ErrorTag::BadAttribute => "bad-attribute",
            ErrorTag::UnknownAttribute => "unknown-attribute",
            ErrorTag::MissingElement => "missing-element",
            ErrorTag::BadElement => "bad-element",
            ErrorTag::UnknownElement => "unknown-element",
            ErrorTag::UnknownNamespace => "unknown-namespace",
            ErrorTag::AccessDenied => "access-denied",
            ErrorTag::LockDenied => "lock-denied",
            ErrorTag::ResourceDenied => "resource-denied",
            ErrorTag::RollbackFailed => "rollback-failed",
            ErrorTag::DataExists => "data-exists",
            ErrorTag::DataMissing => "data-missing",
            ErrorTag::OperationNotSupported => "operation-not-supported",
            ErrorTag::OperationFailed => "operation-failed",
            ErrorTag::MalformedMessage => "malformed-message",
        };
        write!(f, "{s}")
    }
}

/// A single `<rpc-error>` (or RESTCONF `errors/error`) element.
#[derive(Clone, Debug, Default)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct RpcError {
    pub error_type: Option<ErrorType>,
    pub error_tag: Option<ErrorTag>,
    pub error_app_tag: Option<String>,
    pub error_path: Option<String>,
    pub error_message: Option<String>,
}

impl RpcError {
    pub fn new(tag: ErrorTag) -> Self {
        RpcError {
            error_type: Some(tag.default_error_type()),
            error_tag: Some(tag),
            error_app_tag: None,
            error_path: None,
            error_message: None,
        }
    }

    #[must_use]
    pub fn error_type(mut self, error_type: ErrorType) -> Self {
        self.error_type = Some(error_type);
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.error_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    #[must_use]
    pub fn app_tag(mut self, app_tag: impl Into<String>) -> Self {
        self.error_app_tag = Some(app_tag.into());
        self
    }

    pub fn tag(&self) -> Option<ErrorTag> {
        self.error_tag
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error_tag, &self.error_message) {
            (Some(tag), Some(msg)) => write!(f, "{tag}: {msg}"),
            (Some(tag), None) => write!(f, "{tag}"),
            (None, Some(msg)) => write!(f, "{msg}"),
            (None, None) => write!(f, "unspecified rpc-error"),
        }
    }
}

impl std::error::Error for RpcError {}

/// A document of one or more `<rpc-error>` elements, as carried by a failed
/// `<rpc-reply>` or an RFC 8040 error body.
#[derive(Clone, Debug, Default)]
#[derive(serde::Deserialize, serde::Serialize)]
pub struct RpcErrors(pub Vec<RpcError>);

impl RpcErrors {
    pub fn single(error: RpcError) -> Self {
        RpcErrors(vec![error])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The HTTP status code to use when this error set is surfaced over
    /// RESTCONF: the status of the first error, per RFC 8040 §7.1.
    pub fn http_status(&self) -> u16 {
        self.0
            .first()
            .and_then(|e| e.error_tag)
            .map(ErrorTag::http_status)
            .unwrap_or(500)
    }
}

impl From<RpcError> for RpcErrors {
    fn from(error: RpcError) -> Self {
        RpcErrors::single(error)
    }
}
