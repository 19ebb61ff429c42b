//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Validation step 1: per-leaf value conformance to its resolved type
//! (RFC 7950 §9). Leafref target existence is deliberately NOT checked
//! here even though the distilled checklist mentions it alongside the
//! lexical checks — it needs the bound instance tree walked from the
//! leaf's position, which [`crate::leafref`] already does for the
//! `require-instance` check, so doing it twice would just duplicate
//! that traversal for no extra coverage.

use indextree::NodeId;
use ncd_instance::InstanceTree;
use ncd_utils::{ErrorTag, RpcError};
use ncd_yang::types::{Builtin, TypeSpec};
use ncd_yang::{NodeKind, SchemaDomain};
use regex::Regex;

use crate::pathfmt::instance_path;

pub fn check_types(domain: &SchemaDomain, tree: &InstanceTree, node: NodeId, errors: &mut Vec<RpcError>) {
    let Some(schema_id) = tree.get(node).schema else {
        for child in tree.children(node) {
            check_types(domain, tree, child, errors);
        }
        return;
    };

    match &domain.tree.get(schema_id).kind {
        NodeKind::Leaf { type_spec, .. } => {
            if let Some(text) = tree.get(node).text() {
                if let Err(reason) = check_value(domain, type_spec, text) {
                    errors.push(leaf_error(tree, domain, node, &reason));
                }
            }
        }
        NodeKind::LeafList { type_spec, .. } => {
            if let Some(text) = tree.get(node).text() {
                if let Err(reason) = check_value(domain, type_spec, text) {
                    errors.push(leaf_error(tree, domain, node, &reason));
                }
            }
        }
        _ => {}
    }

    for child in tree.children(node) {
        check_types(domain, tree, child, errors);
    }
}

fn leaf_error(tree: &InstanceTree, domain: &SchemaDomain, node: NodeId, reason: &str) -> RpcError {
    RpcError::new(ErrorTag::InvalidValue)
        .path(instance_path(tree, domain, node))
        .message(reason.to_owned())
}

fn check_value(domain: &SchemaDomain, type_spec: &TypeSpec, value: &str) -> Result<(), String> {
    match &type_spec.builtin {
        Builtin::Int8 => check_integer(type_spec, value, -128, 127),
        Builtin::Int16 => check_integer(type_spec, value, i16::MIN as i128, i16::MAX as i128),
        Builtin::Int32 => check_integer(type_spec, value, i32::MIN as i128, i32::MAX as i128),
        Builtin::Int64 => check_integer(type_spec, value, i64::MIN as i128, i64::MAX as i128),
        Builtin::Uint8 => check_integer(type_spec, value, 0, u8::MAX as i128),
        Builtin::Uint16 => check_integer(type_spec, value, 0, u16::MAX as i128),
        Builtin::Uint32 => check_integer(type_spec, value, 0, u32::MAX as i128),
        Builtin::Uint64 => check_integer(type_spec, value, 0, u64::MAX as i128),
        Builtin::Decimal64 { .. } => value
            .parse::<f64>()
            .map(|_| ())
            .map_err(|_| format!("'{value}' is not a valid decimal64")),
        Builtin::String => check_string(type_spec, value),
        Builtin::Boolean => match value {
            "true" | "false" => Ok(()),
            _ => Err(format!("'{value}' is not a valid boolean")),
        },
        Builtin::Enumeration(values) => {
            if values.iter().any(|e| e.name == value) {
                Ok(())
            } else {
                Err(format!("'{value}' is not a declared enum value"))
            }
        }
        Builtin::Bits(values) => {
            if value.split_whitespace().all(|b| values.iter().any(|v| v.name == b)) {
                Ok(())
            } else {
                Err(format!("'{value}' names an undeclared bit"))
            }
        }
        Builtin::Binary => base64_decode(value).map(|_| ()),
        Builtin::LeafRef { .. } => check_string(type_spec, value),
        Builtin::Identityref { bases } => {
            if bases.iter().any(|base| domain.identity_derived_from(value, base)) {
                Ok(())
            } else {
                Err(format!("'{value}' does not derive from a permitted base identity"))
            }
        }
        Builtin::Empty => {
            if value.is_empty() {
                Ok(())
            } else {
                Err("an 'empty' leaf must carry no value".to_owned())
            }
        }
        Builtin::Union(members) => {
            if members.iter().any(|m| check_value(domain, m, value).is_ok()) {
                Ok(())
            } else {
                Err(format!("'{value}' matches no member type of the union"))
            }
        }
        // Full instance-identifier resolution needs a bound tree and a
        // target namespace context this function doesn't have; accepted
        // here on lexical shape alone (must start with '/').
        Builtin::InstanceIdentifier { .. } => {
            if value.starts_with('/') {
                Ok(())
            } else {
                Err(format!("'{value}' is not a well-formed instance-identifier"))
            }
        }
    }
}

fn check_integer(type_spec: &TypeSpec, value: &str, builtin_lo: i128, builtin_hi: i128) -> Result<(), String> {
    let n: i128 = value.parse().map_err(|_| format!("'{value}' is not a valid integer"))?;
    if n < builtin_lo || n > builtin_hi {
        return Err(format!("{n} is outside the representable range for this type"));
    }
    if !type_spec.ranges.is_empty() && !type_spec.ranges.iter().any(|r| in_range(r, n, builtin_lo, builtin_hi)) {
        return Err(format!("{n} is outside the declared 'range'"));
    }
    Ok(())
}

fn in_range(range: &ncd_yang::types::NumericRange, n: i128, lo: i128, hi: i128) -> bool {
    let range_lo = range.lo.unwrap_or(lo);
    let range_hi = range.hi.unwrap_or(hi);
    n >= range_lo && n <= range_hi
}

fn check_string(type_spec: &TypeSpec, value: &str) -> Result<(), String> {
    let len = value.chars().count() as i128;
    if !type_spec.lengths.is_empty() && !type_spec.lengths.iter().any(|l| in_range(l, len, 0, i128::MAX)) {
        return Err(format!("'{value}' has a length outside the declared 'length'"));
    }
    for pattern in &type_spec.patterns {
        let anchored = format!("^(?:{pattern})$");
        match Regex::new(&anchored) {
            Ok(re) if re.is_match(value) => {}
            Ok(_) => return Err(format!("'{value}' does not match pattern '{pattern}'")),
            // An unparseable XSD-regex construct `regex` can't express is
            // treated as non-restrictive rather than failing every value.
            Err(_) => {}
        }
    }
    Ok(())
}

fn base64_decode(value: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(value.trim())
        .map_err(|_| format!("'{value}' is not valid base64"))
}
