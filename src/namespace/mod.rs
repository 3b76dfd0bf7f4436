//! Per-file namespace and symbol resolution (§5 "Namespace", §9 "Overload
//! resolution").
//!
//! Grounded in `original_source/include/parser/ast/namespace.hpp`'s split
//! between public and private symbol tables and its aliased-import model;
//! the castability oracle ([`crate::castability`]) is what
//! `get_functions_from_call_types` consults to narrow overload candidates.

use crate::ast::{Definition, Span};
use crate::castability::Castability;
use crate::hash::FileHash;
use crate::types::table::NamespaceTypeTable;
use crate::types::{Type, TypeId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub definition_index: usize,
    pub is_public: bool,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub target_file: FileHash,
    /// `use foo as bar` — `alias` is `Some("bar")`; bare `use foo` leaves it
    /// `None` and the imported file's public symbols become visible under
    /// their own names directly.
    pub alias: Option<String>,
}

/// One compiled file's namespace: its symbol tables, its per-namespace type
/// table for nominal types, and a back-pointer to the file it was built
/// from (§5: "a namespace is always backed by exactly one file, except core
/// modules which are backed by none").
#[derive(Clone)]
pub struct Namespace {
    pub file: FileHash,
    pub file_path: Option<String>,
    pub definitions: Vec<Definition>,
    public_symbols: HashMap<String, Symbol>,
    private_symbols: HashMap<String, Symbol>,
    pub imports: Vec<Import>,
    pub types: NamespaceTypeTable,
    /// `use "foo" as bar` — alias string to the file it resolves to, filled
    /// in by the resolver's import-resolution pass (§4.3 item 3).
    pub aliased_imports: HashMap<String, FileHash>,
    /// Non-aliased `use "foo"` targets, whose public symbols this namespace
    /// sees as private (re-export is not allowed, §4.3 item 3).
    pub private_import_targets: Vec<FileHash>,
    /// First-use location of each `Unknown` placeholder still keyed by name
    /// in `types`, so a surviving `Unknown` after resolution can be reported
    /// with a real position (§4.3 item 4: `ErrUnknownType{name, location}`).
    unknown_spans: HashMap<String, Span>,
}

impl Namespace {
    pub fn new(file: FileHash, file_path: Option<String>) -> Self {
        Self {
            file,
            file_path,
            definitions: Vec::new(),
            public_symbols: HashMap::new(),
            private_symbols: HashMap::new(),
            imports: Vec::new(),
            types: NamespaceTypeTable::new(),
            aliased_imports: HashMap::new(),
            private_import_targets: Vec::new(),
            unknown_spans: HashMap::new(),
        }
    }

    /// A namespace with no backing file — used for core modules synthesized
    /// directly in this crate rather than parsed from source (SPEC_FULL.md
    /// §D, `CompilationContext`'s core-module registry).
    pub fn core(name: &str) -> Self {
        Self::new(FileHash::from_key(name), None)
    }

    pub fn declare_symbol(&mut self, name: String, definition_index: usize, is_public: bool) {
        let symbol = Symbol {
            name: name.clone(),
            definition_index,
            is_public,
        };
        if is_public {
            self.public_symbols.insert(name, symbol);
        } else {
            self.private_symbols.insert(name, symbol);
        }
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Symbol> {
        self.public_symbols.get(name).or_else(|| self.private_symbols.get(name))
    }

    pub fn public_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.public_symbols.values()
    }

    pub fn get_type_from_str(&self, name: &str) -> Option<TypeId> {
        if let Some(id) = self.types.get_type_from_str(name) {
            return Some(id);
        }
        let mut table = crate::types::table::GLOBAL_TYPES.write().expect("type table poisoned");
        table.get_type_from_str(name)
    }

    pub fn add_type(&mut self, name: String, ty: crate::types::Type) -> Result<TypeId, TypeId> {
        if ty.can_be_global() {
            let mut table = crate::types::table::GLOBAL_TYPES.write().expect("type table poisoned");
            Ok(table.intern_global(ty))
        } else {
            self.types.add_type(name, ty)
        }
    }

    /// Register a named nominal type definition (`data`/`enum`/`variant`/
    /// `error`/`type alias`), resolving an `Unknown` placeholder of the same
    /// name in place if one was created earlier in this file by a forward
    /// reference, rather than rejecting the insert outright the way plain
    /// [`add_type`](Self::add_type) does (§5 invariant 4: no `Unknown`
    /// survives once its definition is seen).
    pub fn define_named_type(&mut self, name: String, ty: Type) -> TypeId {
        if ty.can_be_global() {
            let mut table = crate::types::table::GLOBAL_TYPES.write().expect("type table poisoned");
            return table.intern_global(ty);
        }
        if let Some(existing) = self.types.get_type_from_str(&name) {
            if self.types.get(existing).is_unknown() {
                self.types.resolve_unknown(existing, ty);
                self.unknown_spans.remove(&name);
            }
            return existing;
        }
        match self.types.add_type(name, ty) {
            Ok(id) | Err(id) => id,
        }
    }

    /// Create (or reuse) an `Unknown` placeholder for a type name not yet
    /// visible in this namespace, recording where it was first referenced.
    pub fn declare_unknown_type(&mut self, name: &str, span: Span) -> TypeId {
        let id = self.types.declare_unknown(name);
        self.unknown_spans.entry(name.to_string()).or_insert(span);
        id
    }

    /// Whether `name` was declared `pub`-visible in this namespace (i.e. an
    /// importer sees it): every top-level definition except imports and
    /// tests declares itself this way (§4.3's definition pass).
    pub fn is_public(&self, name: &str) -> bool {
        self.public_symbols.contains_key(name)
    }

    /// Every `Unknown` placeholder still unresolved in this namespace, with
    /// its first-use location.
    pub fn unknown_entries(&self) -> Vec<(TypeId, String, Span)> {
        self.types
            .unknown_names()
            .into_iter()
            .map(|(id, name)| {
                let span = self
                    .unknown_spans
                    .get(&name)
                    .copied()
                    .unwrap_or(Span::new(self.file, 0, 0));
                (id, name, span)
            })
            .collect()
    }

    /// Resolve a still-`Unknown` placeholder named `name` to `ty`, returning
    /// whether it actually resolved something (a no-op if `name` has no
    /// pending `Unknown` in this namespace).
    pub fn resolve_unknown_by_name(&mut self, name: &str, ty: Type) -> bool {
        match self.types.get_type_from_str(name) {
            Some(id) if self.types.get(id).is_unknown() => {
                self.types.resolve_unknown(id, ty);
                self.unknown_spans.remove(name);
                true
            }
            _ => false,
        }
    }

    /// Resolve a type name against imports, visible this namespace only
    /// through an aliased import (`bar.Widget`) or directly (unaliased
    /// imports expose their public symbols as if declared locally).
    pub fn resolve_type(&self, name: &str, imported: &[&Namespace]) -> Option<TypeId> {
        if let Some(id) = self.get_type_from_str(name) {
            return Some(id);
        }
        for ns in imported {
            if let Some(id) = ns.get_type_from_str(name) {
                return Some(id);
            }
        }
        None
    }

    /// Narrow a set of overload candidates down using the castability
    /// oracle, per §9's open question: ambiguity among multiple survivors is
    /// reported rather than silently resolved (SPEC_FULL.md §H).
    pub fn get_functions_from_call_types(
        &self,
        candidates: &[(&str, &[TypeId])],
        call_types: &[TypeId],
        oracle: &dyn Castability,
    ) -> Vec<usize> {
        candidates
            .iter()
            .enumerate()
            .filter(|(_, (_, params))| {
                params.len() == call_types.len()
                    && params
                        .iter()
                        .zip(call_types)
                        .all(|(&param, &arg)| oracle.castable_rhs_to_lhs(arg, param))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Look up a function by name among this namespace's core-module
    /// registry fallbacks (functions implicitly available without an
    /// explicit `use`, e.g. built-in intrinsics).
    pub fn find_core_function<'a>(&self, name: &str, core_modules: &'a [Namespace]) -> Option<&'a Symbol> {
        core_modules.iter().find_map(|ns| ns.lookup_local(name))
    }

    /// A cheap snapshot handed to one worker thread during parallel body
    /// parsing: the worker may intern new namespace-local wrapper types or
    /// declare `Unknown` placeholders while parsing expressions, but none of
    /// that needs to be visible to sibling bodies, so a full clone per
    /// worker is simpler than synchronizing a shared `&mut`.
    pub fn clone_for_body_parsing(&self) -> Self {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castability::DefaultCastability;
    use crate::types::table::GLOBAL_TYPES;
    use crate::types::PrimitiveKind;

    #[test]
    fn ambiguous_overloads_return_more_than_one_candidate() {
        let ns = Namespace::new(FileHash::NONE, None);
        let i32_id = GLOBAL_TYPES.read().unwrap().get_primitive_type(PrimitiveKind::I32);
        let candidates: Vec<(&str, &[TypeId])> = vec![("f", &[i32_id]), ("g", &[i32_id])];
        let oracle = DefaultCastability;
        let survivors = ns.get_functions_from_call_types(&candidates, &[i32_id], &oracle);
        assert_eq!(survivors.len(), 2, "both overloads accept an exact i32 argument");
    }
}
