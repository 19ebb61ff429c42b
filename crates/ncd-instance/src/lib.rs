//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Bound instance trees (component B): an XML DOM bound against a
//! resolved YANG schema, with visitor traversal and XML/JSON
//! serialization.

pub mod bind;
pub mod node;
pub mod serialize;
pub mod tree;
pub mod visitor;

pub use bind::{bind_document, effective_operation, BindError, MountResolver, NoMounts};
pub use node::{Content, InsertHint, InstanceNode, Operation};
pub use tree::InstanceTree;
pub use visitor::{walk_document_order, WalkControl};
