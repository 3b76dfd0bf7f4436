//! The static keyword table, grounded in `original_source`'s pattern table
//! (`matcher.hpp`) and carried into a [`FieldTree`] the way the teacher's
//! `Punctuations` lexeme builds its own trie in `lexeme/punctuation.rs`.

use crate::field_tree::FieldTree;
use crate::token::TokenKind;
use once_cell::sync::Lazy;

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("none", TokenKind::None_),
    ("void", TokenKind::Void),
    ("bool", TokenKind::Bool),
    ("i8", TokenKind::I8),
    ("i16", TokenKind::I16),
    ("i32", TokenKind::I32),
    ("i64", TokenKind::I64),
    ("u8", TokenKind::U8),
    ("u16", TokenKind::U16),
    ("u32", TokenKind::U32),
    ("u64", TokenKind::U64),
    ("f32", TokenKind::F32),
    ("f64", TokenKind::F64),
    ("str", TokenKind::Str),
    ("anyerror", TokenKind::AnyError),
    ("bool8", TokenKind::Bool8),
    ("u8x2", TokenKind::U8x2),
    ("u8x3", TokenKind::U8x3),
    ("u8x4", TokenKind::U8x4),
    ("u8x8", TokenKind::U8x8),
    ("i32x2", TokenKind::I32x2),
    ("i32x3", TokenKind::I32x3),
    ("i32x4", TokenKind::I32x4),
    ("i32x8", TokenKind::I32x8),
    ("i64x2", TokenKind::I64x2),
    ("i64x3", TokenKind::I64x3),
    ("i64x4", TokenKind::I64x4),
    ("f32x2", TokenKind::F32x2),
    ("f32x3", TokenKind::F32x3),
    ("f32x4", TokenKind::F32x4),
    ("f32x8", TokenKind::F32x8),
    ("f64x2", TokenKind::F64x2),
    ("f64x3", TokenKind::F64x3),
    ("f64x4", TokenKind::F64x4),
    ("def", TokenKind::Def),
    ("extern", TokenKind::Extern),
    ("data", TokenKind::Data),
    ("shared", TokenKind::Shared),
    ("immutable", TokenKind::Immutable),
    ("aligned", TokenKind::Aligned),
    ("enum", TokenKind::Enum),
    ("variant", TokenKind::Variant),
    ("error", TokenKind::Error),
    ("entity", TokenKind::Entity),
    ("extends", TokenKind::Extends),
    ("link", TokenKind::Link),
    ("func", TokenKind::Func),
    ("requires", TokenKind::Requires),
    ("test", TokenKind::Test),
    ("use", TokenKind::Use),
    ("as", TokenKind::As),
    ("type", TokenKind::Type),
    ("alias", TokenKind::Alias),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("switch", TokenKind::Switch),
    ("for", TokenKind::For),
    ("while", TokenKind::While),
    ("parallel", TokenKind::Parallel),
    ("in", TokenKind::In),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("return", TokenKind::Return),
    ("throw", TokenKind::Throw),
    ("catch", TokenKind::Catch),
    ("spawn", TokenKind::Spawn),
    ("sync", TokenKind::Sync),
    ("lock", TokenKind::Lock),
    ("const", TokenKind::Const),
    ("mut", TokenKind::Mut),
    ("persistent", TokenKind::Persistent),
    ("and", TokenKind::And),
    ("or", TokenKind::Or),
    ("not", TokenKind::Not),
];

pub static KEYWORD_TREE: Lazy<FieldTree<TokenKind>> = Lazy::new(|| {
    let mut tree = FieldTree::new();
    for (text, kind) in KEYWORDS {
        tree.insert(text.as_bytes(), *kind)
            .unwrap_or_else(|_| panic!("duplicate keyword `{text}`"));
    }
    tree
});

/// The punctuation/operator table, longest-match first so the trie sees `**`
/// before `*`, `..` before nothing shorter could collide, etc. (the teacher's
/// `Punctuations::new` sorts by length for the same reason, though the trie
/// itself is length-agnostic — sorting only affects detection of duplicate
/// prefixes at construction time).
const PUNCTUATION: &[(&str, TokenKind)] = &[
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    ("..", TokenKind::Range),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
    (":=", TokenKind::ColonEqual),
    ("?", TokenKind::Question),
    ("??", TokenKind::OptDefault),
    ("!", TokenKind::Exclamation),
    ("_", TokenKind::Underscore),
    ("@", TokenKind::Annotation),
    ("$", TokenKind::Dollar),
    ("->", TokenKind::Arrow),
    ("|", TokenKind::Pipe),
    ("&", TokenKind::Reference),
    ("+", TokenKind::Plus),
    ("++", TokenKind::Increment),
    ("+=", TokenKind::PlusEquals),
    ("-", TokenKind::Minus),
    ("--", TokenKind::Decrement),
    ("-=", TokenKind::MinusEquals),
    ("*", TokenKind::Mult),
    ("**", TokenKind::Pow),
    ("*=", TokenKind::MultEquals),
    ("/", TokenKind::Div),
    ("/=", TokenKind::DivEquals),
    ("%", TokenKind::Mod),
    ("=", TokenKind::Equal),
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::NotEqual),
    ("<", TokenKind::Less),
    ("<=", TokenKind::LessEqual),
    ("<<", TokenKind::ShiftLeft),
    (">", TokenKind::Greater),
    (">=", TokenKind::GreaterEqual),
    (">>", TokenKind::ShiftRight),
    ("^", TokenKind::BitXor),
    ("~", TokenKind::BitNeg),
];

pub static PUNCTUATION_TREE: Lazy<FieldTree<TokenKind>> = Lazy::new(|| {
    let mut fields: Vec<_> = PUNCTUATION.to_vec();
    fields.sort_by_key(|(s, _)| s.len());
    let mut tree = FieldTree::new();
    for (text, kind) in fields {
        tree.insert(text.as_bytes(), kind)
            .unwrap_or_else(|_| panic!("duplicate punctuation `{text}`"));
    }
    tree
});

/// `&`/`|` double as bitwise-and/or when doubled is not part of the
/// grammar (booleans use the `and`/`or` keywords per §G.3's operator set);
/// `&` alone may also be an address-of/reference marker disambiguated by the
/// parser, not the lexer.
pub fn bit_and_or() -> (TokenKind, TokenKind) {
    (TokenKind::BitAnd, TokenKind::BitOr)
}
