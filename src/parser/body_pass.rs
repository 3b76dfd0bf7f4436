//! Pass 2 of 2: parse the body of every function/test definition left
//! pending by the definition pass, filling in `FunctionDef::body` and
//! `TestDef::body`.
//!
//! Each pending body is independent of every other one at this stage — a
//! function's statements can only reference types and symbols that the
//! definition pass already registered — so when more than one body is
//! pending they are parsed in parallel. A caller building a minimal tree for
//! a single function (e.g. an editor asking "what does this one function
//! look like") can skip straight to `parse_one` instead.

use crate::ast::stmt::Stmt;
use crate::ast::Definition;
use crate::error::ProductionError;
use crate::namespace::Namespace;
use crate::parser::definition_pass::{BodyTarget, PendingBody};
use crate::parser::stmt_parser::StmtParser;
use crate::token::Token;
use rayon::prelude::*;

/// Parse every pending body's statements directly against `namespace`,
/// serially. Used when running in minimal-tree mode, where only one
/// definition's body is being parsed and spinning up a thread pool buys
/// nothing.
pub fn run_serial(tokens: &[Token], namespace: &mut Namespace, pending: &[PendingBody]) -> Result<(), ProductionError> {
    for body in pending {
        let (stmts, _) = StmtParser::new(tokens, namespace).parse_block(body.body_start, body.depth)?;
        attach_body(namespace, body.target, stmts);
    }
    Ok(())
}

/// Parse every pending body against its own scratch namespace (so each
/// thread gets an exclusive `&mut Namespace` over symbols/types already
/// registered by the definition pass, cloned once up front) and then fold
/// the parsed bodies back into `namespace` on the calling thread.
///
/// Bodies cannot introduce new top-level symbols or types (`§4.3`'s
/// definition pass already owns that), so parsing each body against a clone
/// of the namespace-so-far is sound: a body can read any symbol/type the
/// definition pass registered, and nothing it does is visible to siblings.
pub fn run_parallel(tokens: &[Token], namespace: &Namespace, pending: &[PendingBody]) -> Result<Vec<(BodyTarget, Vec<Stmt>)>, ProductionError>
where
{
    pending
        .par_iter()
        .map(|body| {
            let mut scratch = namespace.clone_for_body_parsing();
            let (stmts, _) = StmtParser::new(tokens, &mut scratch).parse_block(body.body_start, body.depth)?;
            Ok((body.target, stmts))
        })
        .collect()
}

fn attach_body(namespace: &mut Namespace, target: BodyTarget, stmts: Vec<Stmt>) {
    match target {
        BodyTarget::TopLevel(definition_index) => match &mut namespace.definitions[definition_index] {
            Definition::Function(def) => def.body = Some(stmts),
            Definition::Test(def) => def.body = stmts,
            _ => unreachable!("only Function/Test definitions are ever queued as top-level pending bodies"),
        },
        BodyTarget::EntityFunction { entity_index, function_index } => match &mut namespace.definitions[entity_index] {
            Definition::Entity(def) => def.functions[function_index].body = Some(stmts),
            _ => unreachable!("EntityFunction targets always point at an Entity definition"),
        },
    }
}

/// Run the body pass, choosing the parallel strategy unless `parallel` is
/// false (minimal-tree / single-definition mode), and fold the results back
/// into `namespace`.
pub fn run(tokens: &[Token], namespace: &mut Namespace, pending: &[PendingBody], parallel: bool) -> Result<(), ProductionError> {
    if !parallel || pending.len() <= 1 {
        return run_serial(tokens, namespace, pending);
    }
    let results = run_parallel(tokens, namespace, pending)?;
    for (target, stmts) in results {
        attach_body(namespace, target, stmts);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FunctionDef, Span};
    use crate::hash::FileHash;
    use crate::lexer::Lexer;
    use crate::source::SourceCode;
    use crate::types::table::GLOBAL_TYPES;
    use crate::types::PrimitiveKind;

    fn make_namespace_with_function(body_src: &str) -> (Vec<crate::token::Token<'static>>, Namespace, PendingBody) {
        let leaked: &'static str = Box::leak(body_src.to_string().into_boxed_str());
        let source = Box::leak(Box::new(SourceCode::new(leaked)));
        let lexer = Lexer::new(source, FileHash::NONE);
        let tokens = lexer.tokenize().unwrap();

        let mut ns = Namespace::new(FileHash::NONE, None);
        let void = GLOBAL_TYPES.read().unwrap().get_primitive_type(PrimitiveKind::Void);
        ns.definitions.push(Definition::Function(FunctionDef {
            name: "f".into(),
            params: Vec::new(),
            return_type: void,
            is_extern: false,
            extern_name_alias: None,
            body: None,
            span: Span::new(FileHash::NONE, 1, 1),
        }));
        let pending = PendingBody { target: BodyTarget::TopLevel(0), body_start: 0, depth: 0 };
        (tokens, ns, pending)
    }

    #[test]
    fn serial_pass_fills_in_the_function_body() {
        let (tokens, mut ns, pending) = make_namespace_with_function("return 1\n");
        run_serial(&tokens, &mut ns, std::slice::from_ref(&pending)).unwrap();
        match &ns.definitions[0] {
            Definition::Function(def) => assert_eq!(def.body.as_ref().unwrap().len(), 1),
            _ => panic!("expected a function definition"),
        }
    }
}
