//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The datastore set (running/candidate/startup) and the two-phase
//! commit that moves a validated candidate into running, grounded on
//! the teacher's own `CommitPhase` vocabulary for staged configuration
//! application.

use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError, RpcErrors};
use ncd_yang::SchemaDomain;

use crate::edit;
use crate::lock::{DatastoreName, Locks};
use crate::session::CandidateState;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CommitPhase {
    Prepare,
    Abort,
    Apply,
}

/// A named commit callback, mirroring the teacher's own three-phase
/// shape: `prepare` may still fail the commit (e.g. a resource the new
/// configuration needs isn't available), `apply` commits the change
/// and is not allowed to fail, `abort` undoes whatever `prepare`
/// provisioned when a later hook's `prepare` fails.
pub struct CommitHook {
    pub name: String,
    pub prepare: Option<fn(&InstanceTree) -> Result<(), String>>,
    pub apply: Option<fn(&InstanceTree)>,
    pub abort: Option<fn(&InstanceTree)>,
}

pub struct Datastores {
    pub running: InstanceTree,
    pub candidate: InstanceTree,
    /// `None` when `:startup` isn't advertised for this server.
    pub startup: Option<InstanceTree>,
    pub locks: Locks,
    pub candidate_state: CandidateState,
    pub hooks: Vec<CommitHook>,
}

impl Datastores {
    pub fn new(root_name: &str, startup_capable: bool) -> Datastores {
        let running = InstanceTree::new(root_name);
        let candidate = running.clone();
        let startup = startup_capable.then(|| running.clone());
        Datastores {
            running,
            candidate,
            startup,
            locks: Locks::new(),
            candidate_state: CandidateState::Clean,
            hooks: Vec::new(),
        }
    }

    pub fn edit_candidate(&mut self, domain: &SchemaDomain, fragment: &InstanceTree) -> Result<(), RpcErrors> {
        edit::apply_edit_config(domain, &mut self.candidate, fragment)?;
        self.candidate_state.mark_dirty();
        Ok(())
    }

    /// `<validate>`: runs the full validator against a scratch copy of
    /// the candidate so a caller can check soundness without mutating
    /// the candidate's defaults/pruning in place before they actually
    /// commit.
    pub fn validate_candidate(&self, domain: &SchemaDomain) -> Result<InstanceTree, RpcErrors> {
        let mut copy = self.candidate.clone();
        ncd_validate::validate(domain, &mut copy)?;
        Ok(copy)
    }

    /// Validates, runs every hook's `prepare` phase against the
    /// validated candidate without touching `running` yet, and only
    /// once every hook has agreed does it replace `running` and run
    /// `apply`. A `prepare` failure runs `abort` on the hooks that had
    /// already prepared and leaves `running` untouched — cheaper and
    /// just as correct as snapshot-then-restore, since nothing durable
    /// has changed until every hook has signed off.
    pub fn commit(&mut self, domain: &SchemaDomain, session: u32) -> Result<(), RpcErrors> {
        tracing::debug!(session, hook_count = self.hooks.len(), "starting commit");
        if self.locks.is_locked_by_other(DatastoreName::Running, session) {
            tracing::warn!(session, "commit denied, running is locked by another session");
            return Err(RpcErrors::single(
                RpcError::new(ErrorTag::LockDenied).message("running is locked by another session"),
            ));
        }

        let validated = self.validate_candidate(domain)?;
        self.candidate = validated.clone();
        self.candidate_state.mark_validated();

        let mut prepared: Vec<Option<fn(&InstanceTree)>> = Vec::new();
        for hook in &self.hooks {
            if let Some(prepare) = hook.prepare {
                if let Err(reason) = prepare(&validated) {
                    tracing::warn!(session, hook = %hook.name, reason = %reason, "commit hook failed in prepare, aborting");
                    for abort in prepared.into_iter().rev().flatten() {
                        abort(&validated);
                    }
                    return Err(RpcErrors::single(
                        RpcError::new(ErrorTag::OperationFailed)
                            .message(format!("commit hook '{}' failed in prepare: {reason}", hook.name)),
                    ));
                }
            }
            prepared.push(hook.abort);
        }

        self.running = validated;
        for hook in &self.hooks {
            if let Some(apply) = hook.apply {
                apply(&self.running);
            }
        }

        if let Some(startup) = &mut self.startup {
            *startup = self.running.clone();
        }
        self.candidate_state.mark_clean();
        tracing::debug!(session, "commit applied to running");
        Ok(())
    }

    /// `<discard-changes>`: replaces candidate with a fresh copy of
    /// running, dropping every uncommitted edit.
    pub fn discard_changes(&mut self) {
        self.candidate = self.running.clone();
        self.candidate_state.mark_clean();
    }
}
