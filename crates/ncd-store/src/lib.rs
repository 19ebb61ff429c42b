//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The datastore and edit/commit pipeline (component E): candidate,
//! running and (optionally) startup instance trees, `edit-config`
//! merge semantics, named-datastore locking, and two-phase commit.

mod commit;
mod edit;
mod lock;
mod session;

pub use commit::{CommitHook, CommitPhase, Datastores};
pub use edit::apply_edit_config;
pub use lock::{DatastoreName, Locks};
pub use session::CandidateState;

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_instance::bind::{bind_document, NoMounts};
    use ncd_utils::ErrorTag;
    use ncd_yang::{load_domain, SchemaDomain};

    const MODULE: &str = r#"
module ex {
  namespace "urn:ex";
  prefix ex;

  container top {
    list ifs {
      key "name";
      leaf name { type string; }
      leaf mtu { type uint16; default "1500"; }
    }
  }
}
"#;

    fn domain() -> SchemaDomain {
        load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    fn fragment(domain: &SchemaDomain, xml: &str) -> ncd_instance::InstanceTree {
        bind_document(xml, domain, "top", &mut NoMounts).unwrap()
    }

    #[test]
    fn merge_creates_then_merges_list_entry() {
        let domain = domain();
        let mut store = Datastores::new("top", true);

        let first = fragment(&domain, r#"<top xmlns="urn:ex"><ifs><name>eth0</name></ifs></top>"#);
        store.edit_candidate(&domain, &first).unwrap();
        assert_eq!(store.candidate_state, CandidateState::Dirty);

        let second = fragment(&domain, r#"<top xmlns="urn:ex"><ifs><name>eth0</name><mtu>9000</mtu></ifs></top>"#);
        store.edit_candidate(&domain, &second).unwrap();

        let ifs = store.candidate.children(store.candidate.root).find(|&c| store.candidate.get(c).name == "ifs").unwrap();
        let mtu = store.candidate.children(ifs).find(|&c| store.candidate.get(c).name == "mtu").unwrap();
        assert_eq!(store.candidate.get(mtu).text(), Some("9000"));
    }

    #[test]
    fn create_operation_rejects_existing_entry() {
        let domain = domain();
        let mut store = Datastores::new("top", false);
        let first = fragment(&domain, r#"<top xmlns="urn:ex"><ifs><name>eth0</name></ifs></top>"#);
        store.edit_candidate(&domain, &first).unwrap();

        let xml = r#"<top xmlns="urn:ex"><ifs nc:operation="create"><name>eth0</name></ifs></top>"#
            .replace("nc:operation", "operation");
        let dup = fragment(&domain, &xml);
        let err = store.edit_candidate(&domain, &dup).unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::DataExists)));
    }

    #[test]
    fn commit_moves_candidate_into_running_and_startup() {
        let domain = domain();
        let mut store = Datastores::new("top", true);
        let edit = fragment(&domain, r#"<top xmlns="urn:ex"><ifs><name>eth0</name></ifs></top>"#);
        store.edit_candidate(&domain, &edit).unwrap();
        store.commit(&domain, 1).unwrap();

        assert_eq!(store.candidate_state, CandidateState::Clean);
        assert!(store.running.children(store.running.root).any(|c| store.running.get(c).name == "ifs"));
        assert!(store
            .startup
            .as_ref()
            .unwrap()
            .children(store.startup.as_ref().unwrap().root)
            .any(|c| store.startup.as_ref().unwrap().get(c).name == "ifs"));
    }

    #[test]
    fn commit_fails_when_running_locked_by_other_session() {
        let domain = domain();
        let mut store = Datastores::new("top", false);
        store.locks.lock(DatastoreName::Running, 7).unwrap();
        let edit = fragment(&domain, r#"<top xmlns="urn:ex"><ifs><name>eth0</name></ifs></top>"#);
        store.edit_candidate(&domain, &edit).unwrap();
        let err = store.commit(&domain, 1).unwrap_err();
        assert!(err.0.iter().any(|e| e.tag() == Some(ErrorTag::LockDenied)));
    }

    #[test]
    fn discard_changes_drops_uncommitted_edits() {
        let domain = domain();
        let mut store = Datastores::new("top", false);
        let edit = fragment(&domain, r#"<top xmlns="urn:ex"><ifs><name>eth0</name></ifs></top>"#);
        store.edit_candidate(&domain, &edit).unwrap();
        store.discard_changes();
        assert_eq!(store.candidate_state, CandidateState::Clean);
        assert!(!store.candidate.children(store.candidate.root).any(|c| store.candidate.get(c).name == "ifs"));
    }
}
