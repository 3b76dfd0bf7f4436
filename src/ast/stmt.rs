//! Statement nodes for function/test bodies (§4.3).

use super::{Expr, Param, Span};

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        name: String,
        is_mut: bool,
        value: Expr,
        span: Span,
    },
    Assign {
        target: Expr,
        value: Expr,
        span: Span,
    },
    ExprStmt(Expr, Span),
    Return(Option<Expr>, Span),
    Break(Span),
    Continue(Span),
    Throw(Expr, Span),
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
        span: Span,
    },
    Switch {
        subject: Expr,
        cases: Vec<(Expr, Vec<Stmt>)>,
        default: Option<Vec<Stmt>>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    For {
        binding: String,
        iterable: Expr,
        body: Vec<Stmt>,
        is_parallel: bool,
        span: Span,
    },
    Catch {
        body: Vec<Stmt>,
        binding: String,
        handler: Vec<Stmt>,
        span: Span,
    },
    Spawn {
        body: Vec<Stmt>,
        span: Span,
    },
    Sync {
        body: Vec<Stmt>,
        span: Span,
    },
    Lock {
        target: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    /// A nested function-local data/closure parameter list, kept distinct
    /// from `FunctionDef` because local bindings never go through the
    /// definition pass (§4.3: "only top-level definitions are two-pass").
    LocalParams(Vec<Param>, Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Let { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::ExprStmt(_, span)
            | Stmt::Return(_, span)
            | Stmt::Break(span)
            | Stmt::Continue(span)
            | Stmt::Throw(_, span)
            | Stmt::If { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::Catch { span, .. }
            | Stmt::Spawn { span, .. }
            | Stmt::Sync { span, .. }
            | Stmt::Lock { span, .. }
            | Stmt::LocalParams(_, span) => *span,
        }
    }
}
