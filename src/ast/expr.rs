//! Expression nodes (§4.3's expression grammar: stacked access, optional
//! chaining, force-unwrap, variant extraction, casts, calls).

use super::Span;
use crate::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,
    BitXor,
    Range,
    OptDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNeg,
    Reference,
    ForceUnwrap,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLiteral(i64, Span),
    FloatLiteral(f64, Span),
    StrLiteral(String, Span),
    /// A `$"..."` interpolated string: alternating literal segments and
    /// embedded expressions.
    InterpolatedStr(Vec<InterpolationPart>, Span),
    CharLiteral(char, Span),
    BoolLiteral(bool, Span),
    NoneLiteral(Span),
    Identifier(String, Span),
    Unary(UnaryOp, Box<Expr>, Span),
    Binary(BinaryOp, Box<Expr>, Box<Expr>, Span),
    Call(Box<Expr>, Vec<Expr>, Span),
    /// `a.b` stacked field/method access.
    Member(Box<Expr>, String, Span),
    /// `a?.b` optional-chaining access: short-circuits to `none` if `a` is
    /// `none`.
    OptionalMember(Box<Expr>, String, Span),
    Index(Box<Expr>, Box<Expr>, Span),
    ArrayLiteral(Vec<Expr>, Span),
    GroupLiteral(Vec<Expr>, Span),
    Cast(Box<Expr>, TypeId, Span),
    /// Variant case extraction, e.g. `shape as .circle(radius)`.
    VariantExtract(Box<Expr>, String, Vec<String>, Span),
    /// Force-extract: like `VariantExtract` but panics instead of falling
    /// through on mismatch.
    VariantForceExtract(Box<Expr>, String, Vec<String>, Span),
}

#[derive(Debug, Clone)]
pub enum InterpolationPart {
    Literal(String),
    Embedded(Expr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral(_, s)
            | Expr::FloatLiteral(_, s)
            | Expr::StrLiteral(_, s)
            | Expr::InterpolatedStr(_, s)
            | Expr::CharLiteral(_, s)
            | Expr::BoolLiteral(_, s)
            | Expr::NoneLiteral(s)
            | Expr::Identifier(_, s)
            | Expr::Unary(_, _, s)
            | Expr::Binary(_, _, _, s)
            | Expr::Call(_, _, s)
            | Expr::Member(_, _, s)
            | Expr::OptionalMember(_, _, s)
            | Expr::Index(_, _, s)
            | Expr::ArrayLiteral(_, s)
            | Expr::GroupLiteral(_, s)
            | Expr::Cast(_, _, s)
            | Expr::VariantExtract(_, _, _, s)
            | Expr::VariantForceExtract(_, _, _, s) => *s,
        }
    }
}
