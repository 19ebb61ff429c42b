//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Resolved YANG type information (RFC 7950 §7.3, §9).

use ncd_xpath_ast::Expr;

#[derive(Clone, Debug)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

#[derive(Clone, Debug)]
pub struct BitValue {
    pub name: String,
    pub position: u32,
}

#[derive(Clone, Debug)]
pub struct NumericRange {
    /// `None` bound means `min`/`max` for that side, per RFC 7950 §9.2.4.
    pub lo: Option<i128>,
    pub hi: Option<i128>,
}

#[derive(Clone, Debug)]
pub enum Builtin {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Decimal64 { fraction_digits: u8 },
    String,
    Boolean,
    Enumeration(Vec<EnumValue>),
    Bits(Vec<BitValue>),
    Binary,
    LeafRef {
        /// The parsed path-arg expression, resolved to a schema node id
        /// by the leafref-path resolution pass.
        path: Expr,
        require_instance: bool,
    },
    Identityref {
        bases: Vec<String>,
    },
    Empty,
    Union(Vec<TypeSpec>),
    InstanceIdentifier { require_instance: bool },
}

/// A fully resolved type: the builtin representation plus any
/// restrictions applied directly or inherited through a typedef chain.
#[derive(Clone, Debug)]
pub struct TypeSpec {
    pub name: String,
    pub builtin: Builtin,
    pub ranges: Vec<NumericRange>,
    pub lengths: Vec<NumericRange>,
    pub patterns: Vec<String>,
    pub default: Option<String>,
}

impl TypeSpec {
    pub fn new(name: impl Into<String>, builtin: Builtin) -> TypeSpec {
        TypeSpec {
            name: name.into(),
            builtin,
            ranges: Vec::new(),
            lengths: Vec::new(),
            patterns: Vec::new(),
            default: None,
        }
    }

    pub fn builtin_name(name: &str) -> Option<Builtin> {
        Some(match name {
            "int8" => Builtin::Int8,
            "int16" => Builtin::Int16,
            "int32" => Builtin::Int32,
            "int64" => Builtin::Int64,
            "uint8" => Builtin::Uint8,
            "uint16" => Builtin::Uint16,
            "uint32" => Builtin::Uint32,
            "uint64" => Builtin::Uint64,
            "string" => Builtin::String,
            "boolean" => Builtin::Boolean,
            "binary" => Builtin::Binary,
            "empty" => Builtin::Empty,
            "instance-identifier" => Builtin::InstanceIdentifier {
                require_instance: true,
            },
            // enumeration, bits, union, leafref, identityref, decimal64
            // all need statement-level substatements and are built by
            // the resolver directly, not from the bare name.
            _ => return None,
        })
    }
}
