//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A tiny generic XML element tree for protocol-level documents
//! (`<rpc>`, `<hello>`, RPC payloads) that aren't bound against a YANG
//! schema the way `ncd-instance::bind` binds datastore content. Reuses
//! the same xml-rs stack-walking shape as `ncd-instance::bind`'s
//! document-order walk.

use std::io::Cursor;

use xml::reader::XmlEvent as ReaderEvent;
use xml::writer::XmlEvent as WriterEvent;
use xml::{EmitterConfig, ParserConfig};

use crate::error::NetconfError;

#[derive(Clone, Debug, Default)]
pub struct RawElement {
    pub name: String,
    pub namespace: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<RawElement>,
    pub text: String,
}

impl RawElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&RawElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Re-serializes this element and its subtree as an XML fragment.
    pub fn to_xml(&self) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = EmitterConfig::new().create_writer(Cursor::new(&mut buf));
            write_elem(self, &mut writer);
        }
        String::from_utf8(buf).expect("xml writer only emits UTF-8")
    }

    /// Re-serializes this element's children concatenated as siblings,
    /// used for `<config>` payloads where the wrapper itself is not
    /// part of the bound instance tree.
    pub fn children_xml(&self) -> String {
        let mut buf = Vec::new();
        {
            let mut writer = EmitterConfig::new().create_writer(Cursor::new(&mut buf));
            for child in &self.children {
                write_elem(child, &mut writer);
            }
        }
        String::from_utf8(buf).expect("xml writer only emits UTF-8")
    }
}

fn write_elem(elem: &RawElement, writer: &mut xml::writer::EventWriter<Cursor<&mut Vec<u8>>>) {
    let mut start = WriterEvent::start_element(elem.name.as_str());
    if !elem.namespace.is_empty() {
        start = start.default_ns(elem.namespace.as_str());
    }
    let attr_pairs: Vec<(&str, &str)> = elem.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    for (k, v) in &attr_pairs {
        start = start.attr(*k, v);
    }
    writer.write(start).expect("in-memory XML writer cannot fail");
    if elem.children.is_empty() {
        if !elem.text.is_empty() {
            writer.write(WriterEvent::characters(&elem.text)).expect("in-memory XML writer cannot fail");
        }
    } else {
        for child in &elem.children {
            write_elem(child, writer);
        }
    }
    writer.write(WriterEvent::end_element()).expect("in-memory XML writer cannot fail");
}

/// Parses a single top-level XML document (one root element) into a
/// [`RawElement`] tree.
pub fn parse_document(xml: &str) -> Result<RawElement, NetconfError> {
    let reader = ParserConfig::new()
        .trim_whitespace(true)
        .ignore_comments(true)
        .create_reader(xml.as_bytes());

    let mut stack: Vec<RawElement> = Vec::new();
    let mut root: Option<RawElement> = None;

    for event in reader {
        let event = event.map_err(|e| NetconfError::Xml(e.to_string()))?;
        match event {
            ReaderEvent::StartElement { name, attributes, .. } => {
                let elem = RawElement {
                    name: name.local_name,
                    namespace: name.namespace.unwrap_or_default(),
                    attributes: attributes.into_iter().map(|a| (a.name.local_name, a.value)).collect(),
                    children: Vec::new(),
                    text: String::new(),
                };
                stack.push(elem);
            }
            ReaderEvent::EndElement { .. } => {
                let finished = stack.pop().ok_or_else(|| NetconfError::Xml("unbalanced XML".to_owned()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(finished),
                    None => root = Some(finished),
                }
            }
            ReaderEvent::Characters(text) | ReaderEvent::CData(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            _ => {}
        }
    }

    root.ok_or_else(|| NetconfError::Xml("empty document".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = parse_document(r#"<rpc message-id="7"><get-config><source><running/></source></get-config></rpc>"#).unwrap();
        assert_eq!(root.name, "rpc");
        assert_eq!(root.attr("message-id"), Some("7"));
        let get_config = root.child("get-config").unwrap();
        let source = get_config.child("source").unwrap();
        assert_eq!(source.children[0].name, "running");
    }

    #[test]
    fn round_trips_children_xml_for_config_payload() {
        let root = parse_document(r#"<config><top xmlns="urn:ex"><name>eth0</name></top></config>"#).unwrap();
        let xml = root.children_xml();
        assert!(xml.contains("<top"));
        assert!(xml.contains("eth0"));
        assert!(!xml.contains("<config"));
    }
}
