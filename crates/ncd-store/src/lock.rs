//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Named-datastore locking (RFC 6241 §7.5-§7.6): `<lock>`/`<unlock>`
//! on `running` or `candidate`, released in bulk by `kill-session`.

use std::collections::HashMap;

use ncd_utils::{ErrorTag, RpcError};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DatastoreName {
    Running,
    Candidate,
    Startup,
}

#[derive(Debug, Default)]
pub struct Locks {
    held: HashMap<DatastoreName, u32>,
}

impl Locks {
    pub fn new() -> Locks {
        Locks::default()
    }

    pub fn lock(&mut self, name: DatastoreName, session: u32) -> Result<(), RpcError> {
        match self.held.get(&name) {
            Some(&holder) if holder != session => Err(RpcError::new(ErrorTag::LockDenied)
                .message(format!("datastore is locked by session {holder}"))),
            _ => {
                self.held.insert(name, session);
                Ok(())
            }
        }
    }

    pub fn unlock(&mut self, name: DatastoreName, session: u32) -> Result<(), RpcError> {
        match self.held.get(&name) {
            Some(&holder) if holder == session => {
                self.held.remove(&name);
                Ok(())
            }
            Some(_) => Err(RpcError::new(ErrorTag::OperationFailed).message("not the lock owner")),
            None => Err(RpcError::new(ErrorTag::OperationFailed).message("datastore is not locked")),
        }
    }

    /// Force-releases every lock held by `session`, per `kill-session`.
    pub fn release_session(&mut self, session: u32) {
        self.held.retain(|_, &mut holder| holder != session);
    }

    pub fn is_locked_by_other(&self, name: DatastoreName, session: u32) -> bool {
        self.held.get(&name).is_some_and(|&holder| holder != session)
    }
}
