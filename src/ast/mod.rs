//! The typed abstract syntax tree (§4.3 "Parsing").
//!
//! A closed set of definition/statement/expression node kinds, each
//! carrying the `(file, line, column)` triple the teacher's `ASTNode<TNode>`
//! carries as `(start, end)` byte offsets — this crate tracks line/column
//! instead since diagnostics (§6) are reported in those terms and recovering
//! them from byte offsets on every report would be wasteful.

pub mod expr;
pub mod stmt;

use crate::hash::FileHash;
use crate::types::TypeId;
use expr::Expr;
use stmt::Stmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub file: FileHash,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(file: FileHash, line: usize, column: usize) -> Self {
        Self { file, line, column }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: TypeId,
    /// Whether this binding was declared `mut` (§3 Data Model: "parameter
    /// vector `[(type, name, is_mutable)]`"). Data fields reuse the same
    /// shape and leave this `false` unless written `mut name: T`.
    pub is_mutable: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Definition {
    Function(FunctionDef),
    Data(DataDef),
    Enum(EnumDef),
    Variant(VariantDef),
    ErrorSet(ErrorSetDef),
    Entity(EntityDef),
    Test(TestDef),
    Import(ImportDef),
    TypeAlias(TypeAliasDef),
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeId,
    pub is_extern: bool,
    /// `extern def foo() as bar` — the symbol name the linker should bind to
    /// when it differs from `name` (§3: "a flag `is_extern` or
    /// `extern_name_alias`").
    pub extern_name_alias: Option<String>,
    pub body: Option<Vec<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DataDef {
    pub name: String,
    pub fields: Vec<Param>,
    pub is_shared: bool,
    pub is_immutable: bool,
    pub is_aligned: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariantDef {
    pub name: String,
    pub cases: Vec<(String, Option<TypeId>)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ErrorSetDef {
    pub name: String,
    /// The error set this one is declared to extend (`error Foo: anyerror`);
    /// `None` only for the implicit root `anyerror` itself (§3: "Error
    /// definitions form a linear hierarchy via `parent_error`, rooted at
    /// `anyerror`").
    pub parent_error: Option<String>,
    pub members: Vec<ErrorValue>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ErrorValue {
    pub name: String,
    /// `parent.value_count + local_index` (§3) — globally unique within the
    /// error hierarchy rooted at `anyerror`, computed once the parent's
    /// total value count is known (resolver time, since the parent may live
    /// in another file).
    pub id: u32,
}

#[derive(Debug, Clone)]
pub struct EntityDef {
    pub name: String,
    pub extends: Option<String>,
    pub links: Vec<String>,
    pub functions: Vec<FunctionDef>,
    pub data: Vec<DataDef>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TestDef {
    pub name: String,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDef {
    pub path: String,
    pub alias: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDef {
    pub name: String,
    pub aliased: TypeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Expression(pub Expr);

pub use expr::Expr as ExprNode;
pub use stmt::Stmt as StmtNode;
