//! Turns one file's token stream into a populated [`Namespace`] in two
//! passes: [`definition_pass`] registers every top-level symbol and type
//! without looking inside function/test bodies, then [`body_pass`] parses
//! those bodies using the now-complete symbol table. Splitting the work this
//! way means a function can forward-reference a sibling defined later in
//! the same file, and a definition-only query (e.g. "what does this file
//! export") never needs to parse a single statement.

pub mod body_pass;
pub mod definition_pass;
pub mod expr_parser;
pub mod patterns;
pub mod stmt_parser;
pub mod type_parser;

use crate::error::ProductionError;
use crate::namespace::Namespace;
use crate::token::Token;

pub use definition_pass::{BodyTarget, PendingBody};

/// Parse one file's tokens into `namespace`, running both passes. Body
/// parsing runs in parallel across the file's own definitions when it has
/// more than one pending body; pass `parallel = false` to force serial body
/// parsing (minimal-tree / single-definition mode).
pub fn parse_file(tokens: &[Token], namespace: &mut Namespace, parallel: bool) -> Result<(), ProductionError> {
    let pending = definition_pass::DefinitionPass::new(tokens, namespace).run()?;
    body_pass::run(tokens, namespace, &pending, parallel)
}
