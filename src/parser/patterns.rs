//! A library of reusable [`crate::matcher::Matcher`] fragments for
//! recognizing a definition's header line or an expression's postfix
//! operators, built from the combinators in [`crate::matcher`]. Grounded in
//! `original_source/include/matcher/matcher.hpp`'s static pattern table:
//! each function here corresponds to one named pattern there.
//! `definition_pass::parse_top_level` (and the entity member dispatch
//! nested inside it) tests a line against these patterns to decide which
//! handler owns it, before that handler does the detailed recursive-descent
//! extraction of names, params and types — the patterns classify, the
//! handlers consume. The expression-postfix patterns stay useful standalone
//! too, e.g. for a caller that only needs to ask "does this token run start
//! a stacked access" without running a full parse.

use crate::matcher::Matcher;
use crate::token::TokenKind;

pub fn function_signature() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Def),
        Matcher::token(TokenKind::Identifier),
        Matcher::balanced(TokenKind::LeftParen, TokenKind::RightParen),
    ])
}

pub fn extern_function_declaration() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Extern),
        Matcher::token(TokenKind::Def),
        Matcher::token(TokenKind::Identifier),
        Matcher::balanced(TokenKind::LeftParen, TokenKind::RightParen),
    ])
}

pub fn data_definition() -> Matcher {
    Matcher::sequence(vec![
        Matcher::repeat(Matcher::one_of(vec![
            Matcher::token(TokenKind::Shared),
            Matcher::token(TokenKind::Immutable),
            Matcher::token(TokenKind::Aligned),
        ])),
        Matcher::token(TokenKind::Data),
        Matcher::token(TokenKind::Identifier),
    ])
}

pub fn func_definition() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Func),
        Matcher::token(TokenKind::Identifier),
        Matcher::optional(Matcher::sequence(vec![
            Matcher::token(TokenKind::Requires),
            Matcher::balanced(TokenKind::LeftParen, TokenKind::RightParen),
        ])),
    ])
}

pub fn error_definition() -> Matcher {
    Matcher::sequence(vec![Matcher::token(TokenKind::Error), Matcher::token(TokenKind::Identifier)])
}

pub fn enum_definition() -> Matcher {
    Matcher::sequence(vec![Matcher::token(TokenKind::Enum), Matcher::token(TokenKind::Identifier)])
}

pub fn variant_definition() -> Matcher {
    Matcher::sequence(vec![Matcher::token(TokenKind::Variant), Matcher::token(TokenKind::Identifier)])
}

pub fn test_definition() -> Matcher {
    Matcher::sequence(vec![Matcher::token(TokenKind::Test), Matcher::token(TokenKind::StrValue)])
}

pub fn entity_definition() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Entity),
        Matcher::token(TokenKind::Identifier),
        Matcher::optional(Matcher::sequence(vec![
            Matcher::token(TokenKind::Extends),
            Matcher::token(TokenKind::Identifier),
        ])),
        Matcher::repeat(Matcher::sequence(vec![
            Matcher::token(TokenKind::Link),
            Matcher::token(TokenKind::Identifier),
        ])),
    ])
}

pub fn use_statement() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Use),
        Matcher::token(TokenKind::StrValue),
        Matcher::optional(Matcher::sequence(vec![
            Matcher::token(TokenKind::As),
            Matcher::token(TokenKind::Identifier),
        ])),
    ])
}

pub fn type_alias() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Type),
        Matcher::token(TokenKind::Identifier),
        Matcher::token(TokenKind::Alias),
    ])
}

/// Stacked access: `a.b.c`, used by the expression parser to recognize a
/// chain of member accesses before folding it left-associatively.
pub fn stacked_access() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::Identifier),
        Matcher::repeat(Matcher::sequence(vec![
            Matcher::token(TokenKind::Dot),
            Matcher::token(TokenKind::Identifier),
        ])),
    ])
}

pub fn optional_chaining() -> Matcher {
    Matcher::sequence(vec![Matcher::token(TokenKind::Question), Matcher::token(TokenKind::Dot)])
}

pub fn force_unwrap() -> Matcher {
    Matcher::token(TokenKind::Exclamation)
}

pub fn variant_extraction() -> Matcher {
    Matcher::sequence(vec![
        Matcher::token(TokenKind::As),
        Matcher::token(TokenKind::Dot),
        Matcher::token(TokenKind::Identifier),
    ])
}

pub fn array_initializer() -> Matcher {
    Matcher::balanced(TokenKind::LeftBracket, TokenKind::RightBracket)
}

pub fn type_cast() -> Matcher {
    Matcher::sequence(vec![Matcher::token(TokenKind::As), Matcher::token(TokenKind::Identifier)])
}

pub fn group_expression() -> Matcher {
    Matcher::balanced(TokenKind::LeftParen, TokenKind::RightParen)
}
