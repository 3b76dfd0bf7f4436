//! Primitive type name table, shared by the lexer's keyword set and the
//! type table's structural-key computation.

use super::PrimitiveKind;

pub fn name(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Void => "void",
        PrimitiveKind::Bool => "bool",
        PrimitiveKind::I8 => "i8",
        PrimitiveKind::I16 => "i16",
        PrimitiveKind::I32 => "i32",
        PrimitiveKind::I64 => "i64",
        PrimitiveKind::U8 => "u8",
        PrimitiveKind::U16 => "u16",
        PrimitiveKind::U32 => "u32",
        PrimitiveKind::U64 => "u64",
        PrimitiveKind::F32 => "f32",
        PrimitiveKind::F64 => "f64",
        PrimitiveKind::Str => "str",
        PrimitiveKind::AnyError => "anyerror",
    }
}

pub fn from_name(text: &str) -> Option<PrimitiveKind> {
    Some(match text {
        "void" => PrimitiveKind::Void,
        "bool" => PrimitiveKind::Bool,
        "i8" => PrimitiveKind::I8,
        "i16" => PrimitiveKind::I16,
        "i32" => PrimitiveKind::I32,
        "i64" => PrimitiveKind::I64,
        "u8" => PrimitiveKind::U8,
        "u16" => PrimitiveKind::U16,
        "u32" => PrimitiveKind::U32,
        "u64" => PrimitiveKind::U64,
        "f32" => PrimitiveKind::F32,
        "f64" => PrimitiveKind::F64,
        "str" => PrimitiveKind::Str,
        "anyerror" => PrimitiveKind::AnyError,
        _ => return None,
    })
}

pub const ALL: &[PrimitiveKind] = &[
    PrimitiveKind::Void,
    PrimitiveKind::Bool,
    PrimitiveKind::I8,
    PrimitiveKind::I16,
    PrimitiveKind::I32,
    PrimitiveKind::I64,
    PrimitiveKind::U8,
    PrimitiveKind::U16,
    PrimitiveKind::U32,
    PrimitiveKind::U64,
    PrimitiveKind::F32,
    PrimitiveKind::F64,
    PrimitiveKind::Str,
    PrimitiveKind::AnyError,
];
