//! The type interning tables (§5, §9 "Global mutable state").
//!
//! Two tables exist side by side, mirroring `original_source`'s split
//! between a process-wide `std::shared_mutex`-guarded table for globally
//! shareable types (`type.cpp`'s `global_type_table`) and per-namespace
//! interning for user-defined nominal types: `Data`/`Enum`/`Variant`/
//! `ErrorSet`/`Alias`/`Opaque` types only make sense relative to the
//! namespace that declared them, so they never pollute the shared table.

use super::{PrimitiveKind, Type, TypeId, TypeResolver};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::RwLock;

/// The process-wide table for globally shareable types: primitives, multis,
/// and any array/optional/pointer/range/group/func wrapper built entirely
/// out of other globally shareable types. Guarded by a readers-writer lock
/// the way the original guards its table with `std::shared_mutex` — many
/// readers resolving type references concurrently, occasional writers
/// interning a newly seen composite type.
pub static GLOBAL_TYPES: Lazy<RwLock<TypeTable>> = Lazy::new(|| RwLock::new(TypeTable::with_primitives()));

#[derive(Default)]
pub struct TypeTable {
    types: Vec<Type>,
    by_key: HashMap<String, TypeId>,
}

impl TypeResolver for TypeTable {
    fn key_of(&self, id: TypeId) -> String {
        self.structural_key(id)
    }
}

impl TypeTable {
    fn with_primitives() -> Self {
        let mut table = Self::default();
        for &kind in super::primitive::ALL {
            table.intern_global(Type::Primitive(kind));
        }
        table
    }

    fn index(id: TypeId) -> usize {
        match id {
            TypeId::Global(i) => i as usize,
            TypeId::Local(_) => panic!("namespace-local TypeId used against the global type table"),
        }
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[Self::index(id)]
    }

    pub fn structural_key(&self, id: TypeId) -> String {
        self.get(id).structural_key(self)
    }

    /// Intern a globally shareable type, returning the existing handle if an
    /// equal type was already present (§5 invariant 2: "interning must be
    /// idempotent").
    pub fn intern_global(&mut self, ty: Type) -> TypeId {
        debug_assert!(ty.can_be_global(), "attempted to intern a namespace-scoped type globally");
        let key = ty.structural_key(self);
        if let Some(&existing) = self.by_key.get(&key) {
            return existing;
        }
        let id = TypeId::Global(self.types.len() as u32);
        self.types.push(ty);
        self.by_key.insert(key, id);
        id
    }

    pub fn get_primitive_type(&self, kind: PrimitiveKind) -> TypeId {
        *self
            .by_key
            .get(super::primitive::name(kind))
            .expect("primitives are interned at table construction")
    }

    pub fn get_type_from_str(&self, key: &str) -> Option<TypeId> {
        self.by_key.get(key).copied()
    }

    pub fn equals(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.structural_key(a) == self.structural_key(b)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Per-namespace interning for user-defined nominal types (§5's
/// `Data`/`Enum`/`ErrorSet`/`Variant`/`Alias`/`Opaque` variations) and for
/// any wrapper type built over one of them (e.g. `[Widget]`). Each
/// `Namespace` owns one of these; nothing here is shared across files.
#[derive(Default, Clone)]
pub struct NamespaceTypeTable {
    types: Vec<Type>,
    by_name: HashMap<String, TypeId>,
}

impl TypeResolver for NamespaceTypeTable {
    fn key_of(&self, id: TypeId) -> String {
        match id {
            TypeId::Local(_) => self.get(id).structural_key(self),
            TypeId::Global(_) => {
                let table = GLOBAL_TYPES.read().expect("type table poisoned");
                table.structural_key(id)
            }
        }
    }
}

impl NamespaceTypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(id: TypeId) -> usize {
        match id {
            TypeId::Local(i) => i as usize,
            TypeId::Global(_) => panic!("global TypeId used against a namespace type table"),
        }
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[Self::index(id)]
    }

    pub fn add_type(&mut self, name: String, ty: Type) -> Result<TypeId, TypeId> {
        debug_assert!(!ty.can_be_global(), "globally shareable types belong in the process-wide table");
        if let Some(&existing) = self.by_name.get(&name) {
            return Err(existing);
        }
        let id = TypeId::Local(self.types.len() as u32);
        self.types.push(ty);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Intern a wrapper type (array/optional/pointer/range/group/func) that
    /// wraps at least one namespace-local base, keyed structurally the same
    /// way the global table keys its own wrappers.
    pub fn intern_local_wrapper(&mut self, ty: Type) -> TypeId {
        debug_assert!(!ty.can_be_global(), "globally shareable wrapper belongs in the process-wide table");
        let key = ty.structural_key(self);
        if let Some(&existing) = self.by_name.get(&key) {
            return existing;
        }
        let id = TypeId::Local(self.types.len() as u32);
        self.types.push(ty);
        self.by_name.insert(key, id);
        id
    }

    pub fn get_type_from_str(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Every `Unknown` placeholder currently interned, by name. Used by the
    /// resolver's unknown-type resolution pass (§4.3 item 4) to know what
    /// still needs to be found.
    pub fn unknown_names(&self) -> Vec<(TypeId, String)> {
        self.by_name
            .iter()
            .filter(|(_, id)| self.get(**id).is_unknown())
            .map(|(name, &id)| (id, name.clone()))
            .collect()
    }

    pub fn declare_unknown(&mut self, name: &str) -> TypeId {
        if let Some(&existing) = self.by_name.get(name) {
            return existing;
        }
        let id = TypeId::Local(self.types.len() as u32);
        self.types.push(Type::Unknown(name.to_string()));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Replace a previously-declared `Unknown` placeholder with its resolved
    /// type once the unknown-type resolution pass (§9) finds a definition.
    pub fn resolve_unknown(&mut self, id: TypeId, resolved: Type) {
        debug_assert!(self.get(id).is_unknown());
        self.types[Self::index(id)] = resolved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_array_type_twice_returns_the_same_id() {
        let mut table = TypeTable::with_primitives();
        let i32_id = table.get_primitive_type(PrimitiveKind::I32);
        let a = table.intern_global(Type::Array(i32_id, 1));
        let b = table.intern_global(Type::Array(i32_id, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn namespace_table_rejects_duplicate_names() {
        let mut ns = NamespaceTypeTable::new();
        ns.add_type("Point".into(), Type::Data("Point".into(), crate::hash::FileHash::NONE))
            .unwrap();
        let err = ns
            .add_type("Point".into(), Type::Data("Point".into(), crate::hash::FileHash::NONE))
            .unwrap_err();
        assert_eq!(ns.get(err).structural_key(&ns), "Point");
    }

    #[test]
    fn unknown_placeholder_resolves_in_place() {
        let mut ns = NamespaceTypeTable::new();
        let id = ns.declare_unknown("Widget");
        assert!(ns.get(id).is_unknown());
        ns.resolve_unknown(id, Type::Data("Widget".into(), crate::hash::FileHash::NONE));
        assert!(!ns.get(id).is_unknown());
    }

    #[test]
    fn array_of_local_type_interns_locally() {
        let mut ns = NamespaceTypeTable::new();
        let widget = ns
            .add_type("Widget".into(), Type::Data("Widget".into(), crate::hash::FileHash::NONE))
            .unwrap();
        let array_ty = Type::Array(widget, 1);
        assert!(!array_ty.can_be_global());
        let a = ns.intern_local_wrapper(array_ty.clone());
        let b = ns.intern_local_wrapper(array_ty);
        assert_eq!(a, b);
    }
}
