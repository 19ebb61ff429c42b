//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! RFC 6241 §6 subtree filtering, applied structurally over the raw
//! serialized XML rather than the bound instance tree: a filter node
//! with no children and no text is a *selection node* (include the
//! whole matching subtree), one with text is a *content match* node
//! (keep only same-valued siblings), and one with children is a
//! *containment node* (recurse, keep only matches with a non-empty
//! filtered remainder).

use crate::xmlelem::RawElement;

pub fn apply(content: &[RawElement], filter: &[RawElement]) -> Vec<RawElement> {
    let mut kept = Vec::new();
    for f in filter {
        for c in content
            .iter()
            .filter(|c| c.name == f.name && (f.namespace.is_empty() || c.namespace == f.namespace))
        {
            if f.children.is_empty() && f.text.is_empty() {
                kept.push(c.clone());
            } else if !f.text.is_empty() {
                if c.text == f.text {
                    kept.push(c.clone());
                }
            } else {
                let filtered_children = apply(&c.children, &f.children);
                if !filtered_children.is_empty() {
                    let mut clone = c.clone();
                    clone.children = filtered_children;
                    kept.push(clone);
                }
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmlelem::parse_document;

    fn children_of(xml: &str) -> Vec<RawElement> {
        parse_document(xml).unwrap().children
    }

    #[test]
    fn selection_node_keeps_whole_subtree() {
        let content = children_of(r#"<config><top><ifs><name>eth0</name><mtu>1500</mtu></ifs></top></config>"#);
        let filter = children_of(r#"<config><top><ifs/></top></config>"#);
        let result = apply(&content, &filter);
        assert_eq!(result.len(), 1);
        let top = &result[0];
        let ifs = top.child("ifs").unwrap();
        assert!(ifs.child("mtu").is_some());
    }

    #[test]
    fn containment_node_drops_non_matching_siblings() {
        let content = children_of(r#"<config><top><ifs><name>eth0</name></ifs><ifs><name>eth1</name></ifs></top></config>"#);
        let filter = children_of(r#"<config><top><ifs><name>eth1</name></ifs></top></config>"#);
        let result = apply(&content, &filter);
        let top = &result[0];
        let names: Vec<&str> = top.children.iter().map(|c| c.child("name").unwrap().text.as_str()).collect();
        assert_eq!(names, vec!["eth1"]);
    }

    #[test]
    fn no_match_drops_the_branch() {
        let content = children_of(r#"<config><top><ifs><name>eth0</name></ifs></top></config>"#);
        let filter = children_of(r#"<config><other/></config>"#);
        assert!(apply(&content, &filter).is_empty());
    }
}
