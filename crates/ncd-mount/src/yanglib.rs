//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A minimal RFC 8525 `ietf-yang-library` reader: pulls out the
//! `(name, revision)` of every `module` entry advertised by a
//! mount-point, which is all a mount attach needs to pick sources out
//! of the host's module catalog. Deviations, submodules and the
//! `schema`/`datastore` containers are not modeled.

use std::fmt;

use xml::reader::XmlEvent;
use xml::ParserConfig;

use crate::error::MountError;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleRef {
    pub name: String,
    pub revision: Option<String>,
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.revision {
            Some(rev) => write!(f, "{}@{rev}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

pub fn parse_yang_library(xml: &str) -> Result<Vec<ModuleRef>, MountError> {
    let reader = ParserConfig::new()
        .trim_whitespace(true)
        .ignore_comments(true)
        .create_reader(xml.as_bytes());

    let mut modules = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<ModuleRef> = None;
    let mut text = String::new();

    for event in reader {
        let event = event.map_err(|e| MountError::Xml(e.to_string()))?;
        match event {
            XmlEvent::StartElement { name, .. } => {
                if name.local_name == "module" {
                    current = Some(ModuleRef { name: String::new(), revision: None });
                }
                stack.push(name.local_name);
                text.clear();
            }
            XmlEvent::Characters(t) | XmlEvent::CData(t) => text.push_str(&t),
            XmlEvent::EndElement { .. } => {
                let tag = stack.pop().unwrap_or_default();
                match tag.as_str() {
                    "name" => {
                        if let Some(module) = current.as_mut() {
                            module.name = text.trim().to_owned();
                        }
                    }
                    "revision" => {
                        if let Some(module) = current.as_mut() {
                            let rev = text.trim();
                            module.revision = (!rev.is_empty()).then(|| rev.to_owned());
                        }
                    }
                    "module" => {
                        if let Some(module) = current.take() {
                            modules.push(module);
                        }
                    }
                    _ => {}
                }
                text.clear();
            }
            _ => {}
        }
    }

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
<yang-library xmlns="urn:ietf:params:xml:ns:yang:ietf-yang-library">
  <module-set>
    <name>mounted</name>
    <module>
      <name>ietf-interfaces</name>
      <revision>2018-02-20</revision>
    </module>
    <module>
      <name>iana-if-type</name>
    </module>
  </module-set>
</yang-library>
"#;

    #[test]
    fn parses_module_names_and_revisions() {
        let modules = parse_yang_library(DOC).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "ietf-interfaces");
        assert_eq!(modules[0].revision.as_deref(), Some("2018-02-20"));
        assert_eq!(modules[1].name, "iana-if-type");
        assert_eq!(modules[1].revision, None);
    }
}
