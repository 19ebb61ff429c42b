//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Loads/saves a datastore's instance tree as an XML document on disk
//! (original spec §6: "each of running, candidate, and startup is an
//! XML document"). An absent file is an empty datastore, not an error —
//! the common case for a server's first boot.

use ncd_instance::bind::{bind_document, NoMounts};
use ncd_instance::serialize::to_xml;
use ncd_instance::InstanceTree;
use ncd_yang::SchemaDomain;

use crate::error::DaemonError;

pub fn load(path: &std::path::Path, domain: &SchemaDomain, root_name: &str) -> Result<InstanceTree, DaemonError> {
    match std::fs::read_to_string(path) {
        Ok(xml) if !xml.trim().is_empty() => bind_document(&xml, domain, root_name, &mut NoMounts).map_err(|e| {
            DaemonError::Datastore { path: path.display().to_string(), reason: e.to_string() }
        }),
        Ok(_) => Ok(InstanceTree::new(root_name)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InstanceTree::new(root_name)),
        Err(e) => Err(e.into()),
    }
}

pub fn save(path: &std::path::Path, tree: &InstanceTree, domain: &SchemaDomain) -> Result<(), DaemonError> {
    let xml = to_xml(tree, domain, tree.root);
    std::fs::write(path, xml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncd_yang::load_domain;

    const MODULE: &str = r#"
module ex {
  namespace "urn:ex";
  prefix ex;

  container top {
    leaf name { type string; }
  }
}
"#;

    fn domain() -> SchemaDomain {
        load_domain(vec![("ex".to_owned(), MODULE.to_owned())], &[]).unwrap()
    }

    #[test]
    fn missing_file_is_an_empty_tree() {
        let domain = domain();
        let path = std::path::Path::new("/nonexistent/ncd-running.xml");
        let tree = load(path, &domain, "config").unwrap();
        assert_eq!(tree.children(tree.root).count(), 0);
    }

    #[test]
    fn round_trips_through_disk() {
        let domain = domain();
        let path = std::env::temp_dir().join(format!("ncd-persistence-test-{}.xml", std::process::id()));
        std::fs::write(&path, r#"<top xmlns="urn:ex"><name>eth0</name></top>"#).unwrap();

        let tree = load(&path, &domain, "config").unwrap();
        save(&path, &tree, &domain).unwrap();
        let reread = load(&path, &domain, "config").unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(reread.children(reread.root).count(), 1);
    }
}
