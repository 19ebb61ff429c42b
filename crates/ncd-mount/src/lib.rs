//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! RFC 8528 YANG schema mount (component H): resolves the schema
//! domain a mount-point's instance subtree should bind against,
//! grafting it into the host domain's arena so every downstream
//! consumer (validator, XPath engine) keeps working with a single
//! `SchemaDomain` reference across the mount boundary.

mod error;
mod graft;
mod registry;
mod yanglib;

pub use error::MountError;
pub use registry::{MountRegistry, Resolver};
pub use yanglib::{parse_yang_library, ModuleRef};

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use ncd_instance::bind::{bind_document, NoMounts};
    use ncd_yang::load_domain;

    use super::*;

    const HOST_MODULE: &str = r#"
module host {
  namespace "urn:host";
  prefix host;

  container top {
    container mnt {
      hmnt:mount-point "label";
    }
  }
}
"#;

    const MOUNTED_MODULE: &str = r#"
module mounted {
  namespace "urn:mounted";
  prefix mtd;

  container inner {
    leaf value { type string; }
  }
}
"#;

    const YANG_LIBRARY: &str = r#"
<yang-library xmlns="urn:ietf:params:xml:ns:yang:ietf-yang-library">
  <module-set>
    <name>mounted-set</name>
    <module><name>mounted</name></module>
  </module-set>
</yang-library>
"#;

    fn host_domain() -> ncd_yang::SchemaDomain {
        load_domain(vec![("host".to_owned(), HOST_MODULE.to_owned())], &[]).unwrap()
    }

    fn catalog() -> HashMap<String, String> {
        HashMap::from([("mounted".to_owned(), MOUNTED_MODULE.to_owned())])
    }

    fn mount_point_id(domain: &ncd_yang::SchemaDomain) -> ncd_yang::SchemaNodeId {
        domain.find_by_path("/host:top/host:mnt").unwrap()
    }

    #[test]
    fn attaches_and_binds_across_the_mount_boundary() {
        let mut domain = host_domain();
        let mnt = mount_point_id(&domain);

        let mut registry = MountRegistry::new();
        registry.attach(&mut domain, mnt, YANG_LIBRARY, &catalog()).unwrap();
        assert!(registry.is_attached(mnt));

        let xml = r#"<top xmlns="urn:host"><mnt><inner xmlns="urn:mounted"><value>hi</value></inner></mnt></top>"#;
        let mut resolver = Resolver { host: &domain, registry: &registry };
        let tree = bind_document(xml, &domain, "top", &mut resolver).unwrap();

        let mnt_node = tree.children(tree.root).next().unwrap();
        let inner = tree.children(mnt_node).next().unwrap();
        assert_eq!(tree.get(inner).name, "inner");
        assert!(tree.get(inner).schema.is_some());
    }

    #[test]
    fn rejects_unbound_children_before_attach() {
        let domain = host_domain();
        let xml = r#"<top xmlns="urn:host"><mnt><inner xmlns="urn:mounted"><value>hi</value></inner></mnt></top>"#;
        let err = bind_document(xml, &domain, "top", &mut NoMounts).unwrap_err();
        assert!(matches!(err, ncd_instance::bind::BindError::UnexpectedElement { .. }));
    }

    #[test]
    fn shares_one_graft_across_identical_yang_library_mounts() {
        let mut domain = host_domain();
        let mnt = mount_point_id(&domain);
        let mut registry = MountRegistry::new();
        registry.attach(&mut domain, mnt, YANG_LIBRARY, &catalog()).unwrap();
        let first = registry.resolve(&domain, mnt, "inner").unwrap();

        // A second, distinct mount-point instance (here the same schema
        // node stands in for a second one) advertising byte-identical
        // yang-library content reuses the already-grafted nodes.
        registry.attach(&mut domain, mnt, YANG_LIBRARY, &catalog()).unwrap();
        let second = registry.resolve(&domain, mnt, "inner").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_catalog_module_is_an_error() {
        let mut domain = host_domain();
        let mnt = mount_point_id(&domain);
        let mut registry = MountRegistry::new();
        let err = registry.attach(&mut domain, mnt, YANG_LIBRARY, &HashMap::new()).unwrap_err();
        assert!(matches!(err, MountError::UnknownModule(name) if name == "mounted"));
    }
}
