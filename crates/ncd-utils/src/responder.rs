//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

/// One-shot reply channel used across every request/response pair crossing
/// a crate boundary in this workspace (daemon -> provider, northbound ->
/// store, etc), so that request structs stay `Send` and testable without
/// standing up a full event loop.
pub type Responder<T> = tokio::sync::oneshot::Sender<T>;
