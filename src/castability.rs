//! The castability oracle used by overload resolution (§9).
//!
//! A three-valued relation rather than a boolean: two types can be mutually
//! incompatible, castable in one direction only (widening), or castable both
//! ways (identical or interchangeable primitives).

use crate::types::table::{TypeTable, GLOBAL_TYPES};
use crate::types::{PrimitiveKind, Type, TypeId};

pub trait Castability {
    fn castable_lhs_to_rhs(&self, lhs: TypeId, rhs: TypeId) -> bool;
    fn castable_rhs_to_lhs(&self, rhs: TypeId, lhs: TypeId) -> bool;
    fn incompatible(&self, a: TypeId, b: TypeId) -> bool {
        !self.castable_lhs_to_rhs(a, b) && !self.castable_rhs_to_lhs(b, a)
    }
}

/// Widening rank among the numeric primitives: a lower-ranked primitive
/// casts implicitly to any higher-ranked one of the same family (§8's
/// overload-resolution scenario — a `u8` argument must be accepted by an
/// `i32` parameter). Cross-family widening (e.g. integer to float) is not
/// attempted; `original_source` gates that behind an explicit cast operator
/// rather than overload resolution.
fn numeric_rank(kind: PrimitiveKind) -> Option<(u8, u8)> {
    // (family, rank) — family 0 is unsigned integers, 1 signed integers, 2 floats.
    Some(match kind {
        PrimitiveKind::U8 => (0, 0),
        PrimitiveKind::U16 => (0, 1),
        PrimitiveKind::U32 => (0, 2),
        PrimitiveKind::U64 => (0, 3),
        PrimitiveKind::I8 => (1, 0),
        PrimitiveKind::I16 => (1, 1),
        PrimitiveKind::I32 => (1, 2),
        PrimitiveKind::I64 => (1, 3),
        PrimitiveKind::F32 => (2, 0),
        PrimitiveKind::F64 => (2, 1),
        _ => return None,
    })
}

fn widens_to(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    match numeric_rank(from).zip(numeric_rank(to)) {
        Some(((ff, fr), (tf, tr))) => ff == tf && fr <= tr,
        None => false,
    }
}

/// The castability rule this crate ships with: identical types cast both
/// ways; primitive numeric types additionally widen one-directionally along
/// `numeric_rank` (unsigned, signed, float families kept separate, per
/// `original_source`'s implicit-cast rules). Everything else (nominal types,
/// wrappers) is castable only when identical — a full structural widening
/// table for those is left to [`StructuralCastability`].
pub struct DefaultCastability;

impl DefaultCastability {
    fn primitive_of(id: TypeId) -> Option<PrimitiveKind> {
        match id {
            TypeId::Global(_) => {
                let table = GLOBAL_TYPES.read().expect("type table poisoned");
                match table.get(id) {
                    Type::Primitive(kind) => Some(*kind),
                    _ => None,
                }
            }
            TypeId::Local(_) => None,
        }
    }
}

impl Castability for DefaultCastability {
    fn castable_lhs_to_rhs(&self, lhs: TypeId, rhs: TypeId) -> bool {
        lhs == rhs
            || matches!(
                (Self::primitive_of(lhs), Self::primitive_of(rhs)),
                (Some(a), Some(b)) if widens_to(a, b)
            )
    }
    fn castable_rhs_to_lhs(&self, rhs: TypeId, lhs: TypeId) -> bool {
        self.castable_lhs_to_rhs(rhs, lhs)
    }
}

/// A castability oracle backed by a live type table, able to compare types
/// structurally (e.g. two independently-interned `Array(i32, 1)` handles)
/// rather than only by handle identity.
pub struct StructuralCastability<'t> {
    pub table: &'t TypeTable,
}

impl<'t> Castability for StructuralCastability<'t> {
    fn castable_lhs_to_rhs(&self, lhs: TypeId, rhs: TypeId) -> bool {
        self.table.equals(lhs, rhs)
    }
    fn castable_rhs_to_lhs(&self, rhs: TypeId, lhs: TypeId) -> bool {
        self.table.equals(rhs, lhs)
    }
}
