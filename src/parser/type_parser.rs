//! Parses a type expression out of a token slice (§4.3, §5).
//!
//! A type string is terminated by whatever follows it grammatically —
//! `]`, `>` (inside generic-looking contexts reserved for a future type
//! parameter feature), `?`, or simply running out of postfix markers — so
//! this is written as a small state machine over suffix markers layered on
//! top of a base-type parse, mirroring how `original_source` scans a type
//! string left to right applying modifiers as it goes.

use crate::ast::Span;
use crate::error::{ErrorKind, ProductionError};
use crate::namespace::Namespace;
use crate::token::{Token, TokenKind};
use crate::types::table::GLOBAL_TYPES;
use crate::types::{primitive, PrimitiveKind, Type, TypeId};

pub struct TypeParser<'a, 'src> {
    pub tokens: &'a [Token<'src>],
    pub namespace: &'a mut Namespace,
}

impl<'a, 'src> TypeParser<'a, 'src> {
    pub fn new(tokens: &'a [Token<'src>], namespace: &'a mut Namespace) -> Self {
        Self { tokens, namespace }
    }

    /// Parse a full type starting at `start`: a base type followed by
    /// zero or more postfix modifiers — a `[` (`,`)* `]` array group
    /// (dimensionality one plus the comma count), `?` (optional), `*`
    /// (pointer) or `..` (range) — applied in the order they're
    /// encountered, each wrapping everything parsed so far. Returns
    /// `(type, end_index)`. `original_source`'s `create_type` peels the same
    /// modifiers off the *end* of the token range instead, recursing on
    /// whatever remains to its left; processing left to right here produces
    /// the identical nesting by induction (whichever modifier is rightmost
    /// becomes the outermost wrapper either way), without rebuilding the
    /// remaining-range slice at each step (§4.3).
    pub fn parse(&mut self, start: usize) -> Result<(TypeId, usize), ProductionError> {
        let (base, cursor) = self.parse_base_or_group(start)?;
        let mut ty = base;
        let mut cursor = cursor;

        loop {
            match self.tokens.get(cursor).map(|t| t.kind) {
                Some(TokenKind::LeftBracket) => {
                    let mut commas = 0u32;
                    let mut inner_cursor = cursor + 1;
                    while self.tokens.get(inner_cursor).map(|t| t.kind) == Some(TokenKind::Comma) {
                        commas += 1;
                        inner_cursor += 1;
                    }
                    match self.tokens.get(inner_cursor).map(|t| t.kind) {
                        Some(TokenKind::RightBracket) => {
                            ty = self.intern_wrapper(Type::Array(ty, commas + 1));
                            cursor = inner_cursor + 1;
                        }
                        _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `]` to close array type")),
                    }
                }
                Some(TokenKind::Question) => {
                    ty = self.intern_wrapper(Type::Optional(ty));
                    cursor += 1;
                }
                Some(TokenKind::Mult) => {
                    ty = self.intern_wrapper(Type::Pointer(ty));
                    cursor += 1;
                }
                Some(TokenKind::Range) => {
                    ty = self.intern_wrapper(Type::Range(ty));
                    cursor += 1;
                }
                _ => break,
            }
        }
        Ok((ty, cursor))
    }

    fn parse_base_or_group(&mut self, start: usize) -> Result<(TypeId, usize), ProductionError> {
        match self.tokens.get(start).map(|t| t.kind) {
            Some(TokenKind::LeftParen) => self.parse_group_or_func(start),
            _ => self.parse_base(start),
        }
    }

    fn parse_group_or_func(&mut self, start: usize) -> Result<(TypeId, usize), ProductionError> {
        let mut parts = Vec::new();
        let mut cursor = start + 1;
        if self.tokens.get(cursor).map(|t| t.kind) != Some(TokenKind::RightParen) {
            loop {
                let (part, next) = self.parse(cursor)?;
                parts.push(part);
                cursor = next;
                match self.tokens.get(cursor).map(|t| t.kind) {
                    Some(TokenKind::Comma) => cursor += 1,
                    Some(TokenKind::RightParen) => break,
                    _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `,` or `)` in type list")),
                }
            }
        }
        cursor += 1; // consume `)`

        if self.tokens.get(cursor).map(|t| t.kind) == Some(TokenKind::Arrow) {
            let (ret, end) = self.parse(cursor + 1)?;
            return Ok((self.intern_wrapper(Type::Func(parts, ret)), end));
        }
        Ok((self.intern_wrapper(Type::Group(parts)), cursor))
    }

    fn parse_base(&mut self, start: usize) -> Result<(TypeId, usize), ProductionError> {
        let token = self
            .tokens
            .get(start)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a type, found end of input"))?;

        if let Some(prim) = primitive::from_name(token.lexeme) {
            let mut table = GLOBAL_TYPES.write().expect("type table poisoned");
            return Ok((table.get_primitive_type(prim), start + 1));
        }

        if let Some((prim, lanes)) = multi_lane_kind(token.kind) {
            let mut table = GLOBAL_TYPES.write().expect("type table poisoned");
            return Ok((table.intern_global(Type::Multi(prim, lanes)), start + 1));
        }

        if token.kind == TokenKind::Identifier {
            let span = span_of(token);
            let id = self
                .namespace
                .get_type_from_str(token.lexeme)
                .unwrap_or_else(|| self.namespace.declare_unknown_type(token.lexeme, span));
            return Ok((id, start + 1));
        }

        Err(ProductionError::validation(
            ErrorKind::ErrParsing,
            format!("expected a type, found {:?}", token.kind),
        ))
    }

    /// Intern a wrapper type, routing to the process-wide table when every
    /// component is itself globally shareable and to this namespace's local
    /// table otherwise (§5: a wrapper over a nominal type is only as shared
    /// as its base).
    fn intern_wrapper(&mut self, ty: Type) -> TypeId {
        if ty.can_be_global() {
            let mut table = GLOBAL_TYPES.write().expect("type table poisoned");
            table.intern_global(ty)
        } else {
            self.namespace.types.intern_local_wrapper(ty)
        }
    }
}

pub fn span_of(token: &Token) -> Span {
    Span::new(token.file, token.line, token.column)
}

/// Map a lane-width keyword token to its base primitive and lane count
/// (SPEC_FULL.md §G.3 — `original_source`'s multi/SIMD type keywords).
fn multi_lane_kind(kind: TokenKind) -> Option<(PrimitiveKind, u8)> {
    Some(match kind {
        TokenKind::Bool8 => (PrimitiveKind::Bool, 8),
        TokenKind::U8x2 => (PrimitiveKind::U8, 2),
        TokenKind::U8x3 => (PrimitiveKind::U8, 3),
        TokenKind::U8x4 => (PrimitiveKind::U8, 4),
        TokenKind::U8x8 => (PrimitiveKind::U8, 8),
        TokenKind::I32x2 => (PrimitiveKind::I32, 2),
        TokenKind::I32x3 => (PrimitiveKind::I32, 3),
        TokenKind::I32x4 => (PrimitiveKind::I32, 4),
        TokenKind::I32x8 => (PrimitiveKind::I32, 8),
        TokenKind::I64x2 => (PrimitiveKind::I64, 2),
        TokenKind::I64x3 => (PrimitiveKind::I64, 3),
        TokenKind::I64x4 => (PrimitiveKind::I64, 4),
        TokenKind::F32x2 => (PrimitiveKind::F32, 2),
        TokenKind::F32x3 => (PrimitiveKind::F32, 3),
        TokenKind::F32x4 => (PrimitiveKind::F32, 4),
        TokenKind::F32x8 => (PrimitiveKind::F32, 8),
        TokenKind::F64x2 => (PrimitiveKind::F64, 2),
        TokenKind::F64x3 => (PrimitiveKind::F64, 3),
        TokenKind::F64x4 => (PrimitiveKind::F64, 4),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FileHash;
    use crate::lexer::Lexer;
    use crate::source::SourceCode;

    fn parse_type_str(text: &str) -> TypeId {
        let source = SourceCode::new(text);
        let lexer = Lexer::new(&source, FileHash::NONE);
        let tokens = lexer.tokenize().unwrap();
        // Skip the leading Indent token the lexer always emits for a
        // non-blank line.
        let start = if tokens.first().map(|t| t.kind) == Some(TokenKind::Indent) { 1 } else { 0 };
        let mut ns = Namespace::new(FileHash::NONE, None);
        let mut parser = TypeParser::new(&tokens, &mut ns);
        parser.parse(start).unwrap().0
    }

    #[test]
    fn parses_array_of_primitive() {
        let id = parse_type_str("i32[]\n");
        let table = GLOBAL_TYPES.read().unwrap();
        assert_eq!(table.structural_key(id), "i32[]");
    }

    #[test]
    fn parses_two_dimensional_array_from_a_single_comma() {
        let id = parse_type_str("i32[,]\n");
        let table = GLOBAL_TYPES.read().unwrap();
        let Type::Array(_, dimensionality) = table.get(id) else { panic!("expected an array type") };
        assert_eq!(*dimensionality, 2);
        assert_eq!(table.structural_key(id), "i32[,]");
    }

    #[test]
    fn parses_pointer_to_identifier_as_a_namespace_local_type() {
        let source = SourceCode::new("Widget*\n");
        let lexer = Lexer::new(&source, FileHash::NONE);
        let tokens = lexer.tokenize().unwrap();
        let start = if tokens.first().map(|t| t.kind) == Some(TokenKind::Indent) { 1 } else { 0 };
        let mut ns = Namespace::new(FileHash::NONE, None);
        let id = TypeParser::new(&tokens, &mut ns).parse(start).unwrap().0;
        assert!(!id.is_global(), "a wrapper over an unresolved nominal type must stay namespace-local");
        assert_eq!(ns.types.get(id).structural_key(&ns.types), "Widget*");
    }

    #[test]
    fn parses_optional_identifier_as_a_namespace_local_type() {
        let source = SourceCode::new("Widget?\n");
        let lexer = Lexer::new(&source, FileHash::NONE);
        let tokens = lexer.tokenize().unwrap();
        let start = if tokens.first().map(|t| t.kind) == Some(TokenKind::Indent) { 1 } else { 0 };
        let mut ns = Namespace::new(FileHash::NONE, None);
        let id = TypeParser::new(&tokens, &mut ns).parse(start).unwrap().0;
        assert!(!id.is_global(), "a wrapper over an unresolved nominal type must stay namespace-local");
        assert_eq!(ns.types.get(id).structural_key(&ns.types), "Widget?");
    }

    #[test]
    fn parses_function_type() {
        let id = parse_type_str("(i32, i32) -> i32\n");
        let table = GLOBAL_TYPES.read().unwrap();
        assert_eq!(table.structural_key(id), "(i32,i32) -> i32");
    }
}
