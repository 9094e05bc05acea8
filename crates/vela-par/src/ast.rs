//! Concrete syntax tree node definitions, per spec.md §3.
//!
//! Every node keeps its originating token(s) (or at least a `Span`) so the
//! resolver and IR emitter can still point diagnostics at source text after
//! lowering discards the concrete syntax.

use vela_lex::Token;
use vela_util::{Span, Symbol};

/// `(root_prefix?, parts[])` — a possibly-absolute dotted name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifiedIdentifier {
    pub root_prefix: bool,
    pub parts: Vec<Symbol>,
    pub span: Span,
}

impl QualifiedIdentifier {
    pub fn simple(name: Symbol, span: Span) -> Self {
        Self { root_prefix: false, parts: vec![name], span }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub module_name: Option<QualifiedIdentifier>,
    pub imports: Vec<Symbol>,
    pub declarations: Vec<Declaration>,
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Visibility(VisibilityDecl),
    Namespace(NamespaceDecl),
    Function(FunctionDecl),
    Variable(VariableDecl),
}

impl Declaration {
    pub fn span(&self) -> Span {
        match self {
            Declaration::Visibility(d) => d.span,
            Declaration::Namespace(d) => d.span,
            Declaration::Function(d) => d.span,
            Declaration::Variable(d) => d.span,
        }
    }
}

/// `('public'|'protected'|'private') ':'` — sets the default visibility for
/// declarations that follow it in the enclosing namespace.
#[derive(Clone, Debug)]
pub struct VisibilityDecl {
    pub visibility: Visibility,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct NamespaceDecl {
    pub name: Option<Symbol>,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

/// A declaration-site type annotation.
#[derive(Clone, Debug)]
pub enum TypeSpecifier {
    Identified(QualifiedIdentifier),
    Keyword { keyword: vela_lex::token::PrimitiveKeyword, unsigned: bool, span: Span },
}

impl TypeSpecifier {
    pub fn span(&self) -> Span {
        match self {
            TypeSpecifier::Identified(q) => q.span,
            TypeSpecifier::Keyword { span, .. } => *span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeSpecifier,
    pub span: Span,
}

/// Grammar's `specifier*` prefix on functions and variables. The current
/// token set defines no storage-class keywords beyond the visibility-block
/// form (`public:` etc.), so this always parses as an empty list today; it
/// exists so a future specifier keyword doesn't require a grammar change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Specifier {}

#[derive(Clone, Debug)]
pub struct FunctionDecl {
    pub specifiers: Vec<Specifier>,
    pub name: Symbol,
    pub params: Vec<Param>,
    pub return_type: Option<TypeSpecifier>,
    /// `Some` for a defined function, `None` for a `;`-terminated
    /// declaration-only form.
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct VariableDecl {
    pub specifiers: Vec<Specifier>,
    pub name: Symbol,
    pub ty: TypeSpecifier,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Block(Block),
    Return { value: Option<Expr>, span: Span },
    IfElse { cond: Expr, then_branch: Box<Stmt>, else_branch: Option<Box<Stmt>>, span: Span },
    While { cond: Expr, body: Box<Stmt>, span: Span },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
        span: Span,
    },
    ExpressionStmt { expr: Expr, span: Span },
    VariableDecl(VariableDecl),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block(b) => b.span,
            Stmt::Return { span, .. }
            | Stmt::IfElse { span, .. }
            | Stmt::While { span, .. }
            | Stmt::For { span, .. }
            | Stmt::ExpressionStmt { span, .. } => *span,
            Stmt::VariableDecl(v) => v.span,
        }
    }
}

/// Concrete expression tree: unary/binary/ternary/n-ary nodes carrying the
/// operator token that produced them, for diagnostics and later operator
/// classification during lowering.
#[derive(Clone, Debug)]
pub enum Expr {
    IntLiteral { token: Token },
    FloatLiteral { token: Token },
    CharLiteral { token: Token },
    StringLiteral { token: Token },
    BoolLiteral { token: Token },
    NullLiteral { token: Token },
    Identifier(QualifiedIdentifier),
    /// Prefix (`!x`, `-x`, `++x`) or postfix (`x++`) unary operator.
    Unary { op: Token, operand: Box<Expr>, is_postfix: bool, span: Span },
    Binary { op: Token, lhs: Box<Expr>, rhs: Box<Expr>, span: Span },
    Assign { op: Token, target: Box<Expr>, value: Box<Expr>, span: Span },
    Ternary { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr>, span: Span },
    Cast { ty: TypeSpecifier, operand: Box<Expr>, span: Span },
    Call { callee: Box<Expr>, args: Vec<Expr>, span: Span },
    Index { base: Box<Expr>, index: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral { token }
            | Expr::FloatLiteral { token }
            | Expr::CharLiteral { token }
            | Expr::StringLiteral { token }
            | Expr::BoolLiteral { token }
            | Expr::NullLiteral { token } => token.span,
            Expr::Identifier(q) => q.span,
            Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Cast { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }
}
