//! Crate-wide error taxonomy.
//!
//! Grounded in the teacher's three-tier split (`lib.rs`/`error.rs`):
//! `ImplementationError` for invariants the crate itself must never violate,
//! `ProductionError` for recoverable matcher/parser failures that simply mean
//! "this alternative did not apply", and `ParseError` for the failure that
//! finally gets reported. This crate keeps the same three tiers, generalized
//! to the taxonomy tags a fixed-grammar compiler reports (§6) rather than the
//! teacher's generic production-engine shape.

use std::fmt::{Debug, Display, Formatter};

/// An invariant the crate assumes internally and never expects a caller to
/// trip — reaching one indicates a bug in this crate, not in the source
/// being compiled.
#[derive(Debug, Clone)]
pub struct ImplementationError {
    pub what: String,
    pub message: String,
}

impl ImplementationError {
    pub fn new(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            message: message.into(),
        }
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImplementationError: {}-{}", self.what, self.message)
    }
}

impl std::error::Error for ImplementationError {}

/// The taxonomy tags from §6, attached to every reported `Diagnostic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ErrLex,
    ErrParsing,
    ErrUnknownType,
    ErrTypeTupleMultiTypeOverlap,
    ErrNotImplementedYet,
    /// Pass-through placeholder: code generation is out of scope for this
    /// crate, but the tag exists so a downstream consumer can recognize
    /// "this diagnostic belongs to a later stage" without this crate needing
    /// to know what that stage does.
    ErrGenerating,
}

impl ErrorKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ErrorKind::ErrLex => "ErrLex",
            ErrorKind::ErrParsing => "ErrParsing",
            ErrorKind::ErrUnknownType => "ErrUnknownType",
            ErrorKind::ErrTypeTupleMultiTypeOverlap => "ErrTypeTupleMultiTypeOverlap",
            ErrorKind::ErrNotImplementedYet => "ErrNotImplementedYet",
            ErrorKind::ErrGenerating => "ErrGenerating",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A recoverable failure produced while trying one grammar alternative.
/// Matchers and parser rules return `Result<T, ProductionError>` the way the
/// teacher's productions return `Result<SuccessData, ProductionError>`:
/// failing to match is routine control flow, not a crash.
#[derive(Debug, Clone)]
pub enum ProductionError {
    /// The matcher consumed nothing; the alternative simply does not apply
    /// at this position.
    Unparsed,
    /// The matcher consumed tokens but what followed violates a grammar
    /// constraint (e.g. unbalanced brackets) — this alternative is the only
    /// one that could have applied, so the caller should report rather than
    /// keep trying siblings.
    Validation(ErrorKind, String),
}

impl ProductionError {
    pub fn is_unparsed(&self) -> bool {
        matches!(self, ProductionError::Unparsed)
    }
    pub fn is_invalid(&self) -> bool {
        matches!(self, ProductionError::Validation(_, _))
    }

    pub fn validation(kind: ErrorKind, message: impl Into<String>) -> Self {
        ProductionError::Validation(kind, message.into())
    }
}

impl Display for ProductionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductionError::Unparsed => write!(f, "unparsed"),
            ProductionError::Validation(kind, message) => write!(f, "[{kind}] {message}"),
        }
    }
}

impl std::error::Error for ProductionError {}

/// The final, reported failure: a production error promoted once every
/// alternative at a given point has been exhausted.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub pointer: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(kind: ErrorKind, pointer: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            pointer,
            message: message.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}
