//! The type system (§5 "Types").
//!
//! Grounded in `original_source/include/parser/type/type.hpp` and
//! `src/parser/type.cpp` for the variation set and interning rules; the
//! teacher contributes the concurrency primitive (`std::sync::RwLock`
//! standing in for the original's `std::shared_mutex` around the
//! process-wide type table).

pub mod primitive;
pub mod table;

use crate::hash::FileHash;
use std::sync::Arc;

/// An opaque handle into a type table — cheap to copy, compared by identity
/// once interned (§5 invariant: "two occurrences of the same type intern to
/// the same handle"). Tagged with which table it indexes into: globally
/// shareable types live in the one process-wide [`table::TypeTable`], while
/// every namespace owns its own [`table::NamespaceTypeTable`] for nominal
/// types — an index alone could not tell the two apart, and a wrapper type
/// built over a namespace-local base (e.g. `Widget[]`) is itself
/// namespace-local, not shareable, even though `Array` is structurally a
/// shareable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    Global(u32),
    Local(u32),
}

impl TypeId {
    pub fn is_global(&self) -> bool {
        matches!(self, TypeId::Global(_))
    }
}

/// The full variation set from §5's Data Model table, plus the `Range`
/// supplement recovered from `original_source` (SPEC_FULL.md §G.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveKind),
    /// A SIMD-lane "multi" type: a primitive repeated `lanes` times.
    Multi(PrimitiveKind, u8),
    /// An array of `dimensionality` dimensions over an element type, e.g.
    /// `i32[]` (dimensionality 1) or `i32[,]` (dimensionality 2) — §4.3's
    /// postfix bracket groups, one `,` short of the dimensionality count.
    Array(TypeId, u32),
    Optional(TypeId),
    Pointer(TypeId),
    /// A range over a base type (`0..10`), e.g. used as a `for` loop operand.
    Range(TypeId),
    /// An unnamed product of types, e.g. `(i32, str)`.
    Group(Vec<TypeId>),
    /// A named tuple-like aggregate with positional fields.
    Tuple(String, Vec<TypeId>),
    Data(String, FileHash),
    Enum(String, FileHash, Vec<String>),
    ErrorSet(String, FileHash, Vec<String>),
    Variant(String, FileHash, Vec<(String, Option<TypeId>)>),
    Func(Vec<TypeId>, TypeId),
    Alias(String, TypeId),
    /// A type declared but not given a body in this compilation (e.g. an
    /// `extern` declaration without a definition available yet).
    Opaque(String, FileHash),
    /// A transient placeholder produced while parsing, resolved to a
    /// concrete type during the unknown-type resolution pass (§5, §9).
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    AnyError,
}

impl Type {
    /// Whether this type may live in the process-wide global table (§3
    /// invariant 2: "globally shareable types are interned once, process
    /// wide"). User-defined nominal types intern per namespace instead, and
    /// a structurally-shareable wrapper (array, optional, ...) built over a
    /// namespace-local base is itself namespace-local — its structural key
    /// is only meaningful relative to the namespace that owns that base.
    pub fn can_be_global(&self) -> bool {
        match self {
            Type::Primitive(_) => true,
            Type::Multi(_, _) => true,
            Type::Array(of, _) => of.is_global(),
            Type::Optional(of) | Type::Pointer(of) | Type::Range(of) => of.is_global(),
            Type::Group(parts) => parts.iter().all(TypeId::is_global),
            Type::Func(params, ret) => ret.is_global() && params.iter().all(TypeId::is_global),
            Type::Tuple(_, _)
            | Type::Data(_, _)
            | Type::Enum(_, _, _)
            | Type::ErrorSet(_, _, _)
            | Type::Variant(_, _, _)
            | Type::Alias(_, _)
            | Type::Opaque(_, _)
            | Type::Unknown(_) => false,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown(_))
    }

    /// A stable textual key used for structural interning (e.g. `"i32"`,
    /// `"i32[]"`, `"i32?"`). `resolver` resolves nested `TypeId`s back to
    /// their own keys — a [`table::TypeTable`] for globally shareable
    /// wrappers (whose nested ids are themselves always `Global`, by
    /// [`Type::can_be_global`]'s definition), or a
    /// [`table::NamespaceTypeTable`] for namespace-local ones.
    pub fn structural_key(&self, resolver: &dyn TypeResolver) -> String {
        match self {
            Type::Primitive(p) => primitive::name(*p).to_string(),
            Type::Multi(p, lanes) => format!("{}x{}", primitive::name(*p), lanes),
            Type::Array(of, dimensionality) => {
                let commas = ",".repeat((*dimensionality as usize).saturating_sub(1));
                format!("{}[{}]", resolver.key_of(*of), commas)
            }
            Type::Optional(of) => format!("{}?", resolver.key_of(*of)),
            Type::Pointer(of) => format!("{}*", resolver.key_of(*of)),
            Type::Range(of) => format!("{}..{}", resolver.key_of(*of), resolver.key_of(*of)),
            Type::Group(parts) => {
                let inner: Vec<_> = parts.iter().map(|t| resolver.key_of(*t)).collect();
                format!("({})", inner.join(","))
            }
            Type::Func(params, ret) => {
                let inner: Vec<_> = params.iter().map(|t| resolver.key_of(*t)).collect();
                format!("({}) -> {}", inner.join(","), resolver.key_of(*ret))
            }
            Type::Tuple(name, _)
            | Type::Data(name, _)
            | Type::Opaque(name, _)
            | Type::Alias(name, _)
            | Type::Unknown(name) => name.clone(),
            Type::Enum(name, _, _) | Type::ErrorSet(name, _, _) | Type::Variant(name, _, _) => name.clone(),
        }
    }
}

/// Resolves a `TypeId` to its structural key, implemented by whichever
/// table actually owns the id.
pub trait TypeResolver {
    fn key_of(&self, id: TypeId) -> String;
}

pub type SharedType = Arc<Type>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_types_are_the_structural_wrappers() {
        assert!(Type::Primitive(PrimitiveKind::I32).can_be_global());
        assert!(Type::Array(TypeId::Global(0), 1).can_be_global());
        assert!(!Type::Array(TypeId::Local(0), 1).can_be_global());
        assert!(!Type::Data("Point".into(), FileHash::NONE).can_be_global());
        assert!(!Type::Unknown("T".into()).can_be_global());
    }
}
