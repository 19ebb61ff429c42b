//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The raw statement tree produced by [`crate::parser`]: every YANG
//! statement (`module`, `container`, `leaf`, `must`, an unrecognized
//! extension, ...) becomes one [`Statement`] node in a
//! [`generational_arena::Arena`]. Resolution passes in [`crate::resolve`]
//! walk and rewrite this tree; [`crate::schema`] is the cooked view that
//! callers actually use.

use generational_arena::{Arena, Index};

pub type StmtId = Index;

/// A YANG statement keyword: either one of the core/extension keywords
/// defined by RFC 7950, or an unrecognized extension keyword carried
/// through verbatim as `(module-prefix, extension-name)`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Keyword {
    Module,
    Submodule,
    Namespace,
    Prefix,
    Import,
    Include,
    RevisionDate,
    BelongsTo,
    Organization,
    Contact,
    Description,
    Reference,
    Revision,
    Extension,
    Feature,
    IfFeature,
    Identity,
    Base,
    Typedef,
    Type,
    Units,
    Default,
    Status,
    Container,
    Leaf,
    LeafList,
    List,
    Key,
    Unique,
    OrderedBy,
    Choice,
    Case,
    Anydata,
    Anyxml,
    Grouping,
    Uses,
    Refine,
    Augment,
    When,
    Must,
    MinElements,
    MaxElements,
    Presence,
    Config,
    Mandatory,
    Path,
    RequireInstance,
    Range,
    Length,
    Pattern,
    FractionDigits,
    Enum,
    Bit,
    Position,
    Value,
    Rpc,
    Action,
    Input,
    Output,
    Notification,
    Deviation,
    Deviate,
    YangVersion,
    /// An extension instance: `(module-prefix, extension-name)`, e.g.
    /// `("ymnt", "mount-point")`.
    Extended(String, String),
}

impl Keyword {
    pub fn from_raw(raw: &str) -> Keyword {
        match raw {
            "module" => Keyword::Module,
            "submodule" => Keyword::Submodule,
            "namespace" => Keyword::Namespace,
            "prefix" => Keyword::Prefix,
            "import" => Keyword::Import,
            "include" => Keyword::Include,
            "revision-date" => Keyword::RevisionDate,
            "belongs-to" => Keyword::BelongsTo,
            "organization" => Keyword::Organization,
            "contact" => Keyword::Contact,
            "description" => Keyword::Description,
            "reference" => Keyword::Reference,
            "revision" => Keyword::Revision,
            "extension" => Keyword::Extension,
            "feature" => Keyword::Feature,
            "if-feature" => Keyword::IfFeature,
            "identity" => Keyword::Identity,
            "base" => Keyword::Base,
            "typedef" => Keyword::Typedef,
            "type" => Keyword::Type,
            "units" => Keyword::Units,
            "default" => Keyword::Default,
            "status" => Keyword::Status,
            "container" => Keyword::Container,
            "leaf" => Keyword::Leaf,
            "leaf-list" => Keyword::LeafList,
            "list" => Keyword::List,
            "key" => Keyword::Key,
            "unique" => Keyword::Unique,
            "ordered-by" => Keyword::OrderedBy,
            "choice" => Keyword::Choice,
            "case" => Keyword::Case,
            "anydata" => Keyword::Anydata,
            "anyxml" => Keyword::Anyxml,
            "grouping" => Keyword::Grouping,
            "uses" => Keyword::Uses,
            "refine" => Keyword::Refine,
            "augment" => Keyword::Augment,
            "when" => Keyword::When,
            "must" => Keyword::Must,
            "min-elements" => Keyword::MinElements,
            "max-elements" => Keyword::MaxElements,
            "presence" => Keyword::Presence,
            "config" => Keyword::Config,
            "mandatory" => Keyword::Mandatory,
            "path" => Keyword::Path,
            "require-instance" => Keyword::RequireInstance,
            "range" => Keyword::Range,
            "length" => Keyword::Length,
            "pattern" => Keyword::Pattern,
            "fraction-digits" => Keyword::FractionDigits,
            "enum" => Keyword::Enum,
            "bit" => Keyword::Bit,
            "position" => Keyword::Position,
            "value" => Keyword::Value,
            "rpc" => Keyword::Rpc,
            "action" => Keyword::Action,
            "input" => Keyword::Input,
            "output" => Keyword::Output,
            "notification" => Keyword::Notification,
            "deviation" => Keyword::Deviation,
            "deviate" => Keyword::Deviate,
            "yang-version" => Keyword::YangVersion,
            other => match other.split_once(':') {
                Some((prefix, ext)) => Keyword::Extended(prefix.to_owned(), ext.to_owned()),
                None => Keyword::Extended(String::new(), other.to_owned()),
            },
        }
    }

    /// True for statements that introduce a schema-tree data node
    /// (as opposed to purely descriptive or organizational statements).
    pub fn is_data_defining(&self) -> bool {
        matches!(
            self,
            Keyword::Container
                | Keyword::Leaf
                | Keyword::LeafList
                | Keyword::List
                | Keyword::Choice
                | Keyword::Case
                | Keyword::Anydata
                | Keyword::Anyxml
                | Keyword::Rpc
                | Keyword::Action
                | Keyword::Notification
                | Keyword::Input
                | Keyword::Output
        )
    }
}

#[derive(Clone, Debug)]
pub struct Statement {
    pub keyword: Keyword,
    pub argument: Option<String>,
    pub children: Vec<StmtId>,
    pub parent: Option<StmtId>,
    /// 1-based line number in the source file, for diagnostics.
    pub line: usize,
}

/// The raw statement tree for a single module or submodule source file.
#[derive(Debug, Default)]
pub struct StmtTree {
    pub arena: Arena<Statement>,
    pub root: Option<StmtId>,
}

impl StmtTree {
    pub fn get(&self, id: StmtId) -> &Statement {
        &self.arena[id]
    }

    pub fn children_with_keyword<'a>(
        &'a self,
        id: StmtId,
        keyword: &'a Keyword,
    ) -> impl Iterator<Item = StmtId> + 'a {
        self.arena[id]
            .children
            .iter()
            .copied()
            .filter(move |c| &self.arena[*c].keyword == keyword)
    }

    pub fn child_argument(&self, id: StmtId, keyword: &Keyword) -> Option<&str> {
        self.children_with_keyword(id, keyword)
            .next()
            .and_then(|c| self.arena[c].argument.as_deref())
    }
}
