//! A compiler front end: lexer, token-pattern matcher, multi-pass parser,
//! type system, namespace, and cross-file resolver for a small statically
//! typed language. This crate stops at a resolved, fully type-checked AST —
//! code generation, an LSP server, a CLI, FFI bindings, and profiling are
//! all out of scope and live in downstream crates.
//!
//! # Overview
//!
//! Compiling one file goes through two parser passes backed by a shared
//! [`Namespace`](namespace::Namespace): the [`definition_pass`](parser::definition_pass)
//! registers every top-level symbol and type without looking inside
//! function/test bodies, and the [`body_pass`](parser::body_pass) then
//! parses those bodies against the now-complete symbol table, in parallel
//! across a file's own definitions. A file rarely stands alone, so
//! [`resolver::DependencyGraph`] drives the whole thing across every file an
//! `import` reaches: it lexes and runs the definition pass over the
//! transitive import closure, binds every import to its target namespace,
//! resolves the `Unknown` type placeholders the definition pass left behind
//! against that now-complete set of namespaces, and only then runs the body
//! passes.
//!
//! # Example
//!
//! ```no_run
//! use langfront::context::CompilationContext;
//! use langfront::resolver::DependencyGraph;
//! use std::path::Path;
//!
//! let ctx = CompilationContext::new();
//! let mut graph = DependencyGraph::build(Path::new("main.lang"), &ctx, false)?;
//! graph.resolve_all_imports(&ctx)?;
//! graph.resolve_all_unknown_types()?;
//! graph.parse_all_bodies(true)?;
//! # Ok::<(), langfront::error::ParseError>(())
//! ```

pub mod ast;
pub mod castability;
pub mod context;
pub mod diagnostics;
pub mod error;
mod field_tree;
pub mod hash;
pub mod lexer;
pub mod log;
pub mod matcher;
pub mod namespace;
pub mod parser;
pub mod resolver;
pub mod source;
pub mod token;
pub mod types;

use std::path::Path;

/// Compile `root_path` and every file it transitively imports into a
/// resolved [`resolver::DependencyGraph`]: definitions, imports, and
/// `Unknown` type placeholders are all resolved before this returns, and
/// every pending function/test body has been parsed.
///
/// This is the single entry point a downstream crate (codegen, an LSP
/// server, a CLI) is expected to call; everything it needs — the resolved
/// namespaces, the type tables, the diagnostics collected along the way —
/// hangs off the returned graph and `ctx`.
pub fn compile(root_path: &Path) -> Result<(context::CompilationContext, resolver::DependencyGraph), error::ParseError> {
    let ctx = context::CompilationContext::new();
    let mut graph = resolver::DependencyGraph::build(root_path, &ctx, false)?;
    graph.resolve_all_imports(&ctx)?;
    graph.resolve_all_unknown_types()?;
    graph.parse_all_bodies(true)?;
    Ok((ctx, graph))
}
