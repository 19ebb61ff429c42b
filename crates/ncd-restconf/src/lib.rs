//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The RESTCONF translator (component G): api-path parsing, schema-
//! aware NETCONF filter/edit-fragment synthesis, and RFC 7951 JSON/XML
//! negotiation, all riding the same [`ncd_netconf::BackendHandle`] a
//! native NETCONF session uses.

pub mod error;
pub mod media;
pub mod path;
pub mod service;
pub mod uri;

pub use media::Format;
pub use service::{Method, Request, Response, RestconfService};
