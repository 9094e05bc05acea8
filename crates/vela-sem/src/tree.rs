//! The semantic tree: a set of flat arenas linked by the typed ids in
//! [`crate::ids`], per spec.md §3's representation (restated in
//! `SPEC_FULL.md` §3's "Representation decision").
//!
//! Owning edges (parent → child) are `Vec<ChildId>` fields on the parent's
//! arena entry. Non-owning back-references (child → parent, expression →
//! enclosing statement) are plain ids with no lifetime tied to them.

use vela_util::index_vec::IndexVec;
use vela_util::{FxHashMap, Span, Symbol};

use crate::ids::{BlockId, ExprId, FunctionId, GlobalId, LocalId, NamespaceId, ParamId, StmtId};
use crate::types::Type;

/// What a resolved `symbol_expression` points to (spec.md §3 "referent
/// slot").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Referent {
    Unresolved,
    Variable(VariableId),
    Function(FunctionId),
}

/// A variable referent: global, local, or parameter (spec.md §3's
/// "variable" umbrella over declaration contexts).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariableId {
    Global(GlobalId),
    Local(LocalId),
    Param(ParamId),
}

/// What a name in a scope table resolves to, pre-dereference - the
/// `FxHashMap<Symbol, VarOrFuncId>` SPEC_FULL.md §4.4 calls for, collapsing
/// `faxc-sem::scope::Rib`'s separate scope-tree idiom into the owning arena
/// entries themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    Variable(VariableId),
    Function(FunctionId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    LogicalAnd,
    LogicalOr,
    /// `.*` / `->*` - the C-family precedence ladder carries pointer-to-member
    /// operators over even though the language has no pointer/struct types.
    /// Lowering always accepts them (only declaration contexts can reject a
    /// node); the resolver rejects every use as a forbidden operator.
    MemberPointer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    LogicalNot,
    Increment,
    Decrement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

#[derive(Debug)]
pub struct Namespace {
    pub parent: Option<NamespaceId>,
    pub name: Option<Symbol>,
    pub namespaces: Vec<NamespaceId>,
    pub functions: Vec<FunctionId>,
    pub globals: Vec<GlobalId>,
    pub scope: FxHashMap<Symbol, Binding>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Function {
    pub parent: NamespaceId,
    pub name: Symbol,
    pub params: Vec<ParamId>,
    /// Parameter scope table, kept alongside `params` the same way
    /// [`Namespace::scope`] sits alongside `functions`/`globals` - per
    /// SPEC_FULL.md §4.4, scope tables live directly on the owning arena
    /// entry rather than a parallel scope tree.
    pub param_scope: FxHashMap<Symbol, ParamId>,
    pub return_type: Type,
    pub body: Option<BlockId>,
    pub span: Span,
}

#[derive(Debug)]
pub struct Param {
    pub parent: FunctionId,
    pub name: Symbol,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug)]
pub struct Global {
    pub parent: NamespaceId,
    pub name: Symbol,
    pub ty: Type,
    pub initializer: Option<ExprId>,
    pub span: Span,
}

/// The block/for-header/function a [`Block`] or [`Local`] is nested in -
/// whichever context introduced it, for ascending resolution walks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockParent {
    Function(FunctionId),
    Block(BlockId),
    /// The block is a `for`-loop body whose header-declared local lives in
    /// `for_scope` rather than this block's own scope.
    For(StmtId),
}

#[derive(Debug)]
pub struct Block {
    pub parent: BlockParent,
    pub locals: Vec<LocalId>,
    pub stmts: Vec<StmtId>,
    pub scope: FxHashMap<Symbol, VariableId>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocalParent {
    Block(BlockId),
    For(StmtId),
}

#[derive(Debug)]
pub struct Local {
    pub parent: LocalParent,
    pub name: Symbol,
    pub ty: Type,
    pub initializer: Option<ExprId>,
    pub span: Span,
}

#[derive(Debug)]
pub enum Stmt {
    Block(BlockId),
    Return { value: Option<ExprId>, span: Span },
    IfElse { cond: ExprId, then_branch: StmtId, else_branch: Option<StmtId>, span: Span },
    While { cond: ExprId, body: StmtId, span: Span },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
        /// The for-header's own scope (its declared loop variable, if any)
        /// - not owned by the body block, since it is visible to `cond`
        /// and `step` too.
        scope: FxHashMap<Symbol, LocalId>,
        /// Back-reference to whatever this `for` statement is nested in
        /// (a block, directly a function body, or another `for`-header),
        /// needed to continue an ascending scope lookup past the
        /// for-header (spec.md §4.4 step 3: "Continue to the parent
        /// element").
        enclosing: BlockParent,
        span: Span,
    },
    ExpressionStmt { expr: ExprId, span: Span },
    LocalDecl { local: LocalId, span: Span },
}

#[derive(Debug)]
pub enum Expr {
    /// The literal's numeric/textual value is decoded on demand from
    /// `token.text` by whichever stage needs it (spec.md §4.1: "The
    /// decoded numeric value is computed on demand from the textual
    /// body"), which in this pipeline is the IR emitter building an LLVM
    /// constant; the semantic tree only needs the token's width/signedness
    /// metadata to compute `ty`.
    IntLiteral { token: vela_lex::Token, ty: Type },
    FloatLiteral { token: vela_lex::Token, ty: Type },
    CharLiteral { token: vela_lex::Token, ty: Type },
    StringLiteral { token: vela_lex::Token, ty: Type },
    BoolLiteral { token: vela_lex::Token, ty: Type },
    /// The language has no pointer/reference types (spec.md §1 Non-goals),
    /// so a `null_literal` has no admissible target type; it resolves with
    /// `ty: Type::Pending` and the resolver reports
    /// `RESOLVE_NO_ADMISSIBLE_CAST` if it is ever used where a type is
    /// required. No end-to-end scenario exercises this.
    NullLiteral { token: vela_lex::Token },
    /// `parts` is the dotted name exactly as written (spec.md §4.4 steps
    /// 1-2: a single part is an ascending simple-name lookup; multiple
    /// parts walk the namespace tree). `root_prefix` is carried for parity
    /// with [`cst::QualifiedIdentifier`] but the grammar never produces
    /// `true` - there is no absolute-path syntax - so it is always `false`
    /// in practice.
    Symbol { parts: Vec<Symbol>, root_prefix: bool, referent: Referent, ty: Type, span: Span },
    Unary { op: UnaryOp, operand: ExprId, is_postfix: bool, ty: Type, span: Span },
    Binary { op: BinaryOp, lhs: ExprId, rhs: ExprId, ty: Type, span: Span },
    Assign { op: AssignOp, target: ExprId, value: ExprId, ty: Type, span: Span },
    Ternary { cond: ExprId, then_branch: ExprId, else_branch: ExprId, ty: Type, span: Span },
    Cast { target: Type, operand: ExprId, span: Span },
    Call { callee: ExprId, args: Vec<ExprId>, ty: Type, span: Span },
    Index { base: ExprId, index: ExprId, ty: Type, span: Span },
}

impl Expr {
    /// The resolved (or not-yet-resolved) type of this expression.
    pub fn ty(&self) -> &Type {
        match self {
            Expr::IntLiteral { ty, .. }
            | Expr::FloatLiteral { ty, .. }
            | Expr::CharLiteral { ty, .. }
            | Expr::StringLiteral { ty, .. }
            | Expr::BoolLiteral { ty, .. }
            | Expr::Symbol { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Assign { ty, .. }
            | Expr::Ternary { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::Index { ty, .. } => ty,
            Expr::Cast { target, .. } => target,
            Expr::NullLiteral { .. } => &Type::Pending,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral { token, .. }
            | Expr::FloatLiteral { token, .. }
            | Expr::CharLiteral { token, .. }
            | Expr::StringLiteral { token, .. }
            | Expr::BoolLiteral { token, .. }
            | Expr::NullLiteral { token } => token.span,
            Expr::Symbol { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Cast { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. } => *span,
        }
    }

    /// Overwrites this expression's type slot in place - the resolver's
    /// core mutation (spec.md §3: "The resolver mutates the semantic tree
    /// in-place").
    pub fn set_ty(&mut self, new_ty: Type) {
        match self {
            Expr::IntLiteral { ty, .. }
            | Expr::FloatLiteral { ty, .. }
            | Expr::CharLiteral { ty, .. }
            | Expr::StringLiteral { ty, .. }
            | Expr::BoolLiteral { ty, .. }
            | Expr::Symbol { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Assign { ty, .. }
            | Expr::Ternary { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::Index { ty, .. } => *ty = new_ty,
            Expr::Cast { .. } | Expr::NullLiteral { .. } => {}
        }
    }
}

/// One compilation unit's fully built semantic tree (spec.md §3 "unit").
#[derive(Debug)]
pub struct SemanticTree {
    pub unit_name: Option<Symbol>,
    pub root: NamespaceId,
    pub namespaces: IndexVec<NamespaceId, Namespace>,
    pub functions: IndexVec<FunctionId, Function>,
    pub params: IndexVec<ParamId, Param>,
    pub globals: IndexVec<GlobalId, Global>,
    pub blocks: IndexVec<BlockId, Block>,
    pub locals: IndexVec<LocalId, Local>,
    pub stmts: IndexVec<StmtId, Stmt>,
    pub exprs: IndexVec<ExprId, Expr>,
}

impl SemanticTree {
    pub fn new() -> Self {
        let mut namespaces = IndexVec::new();
        let root = namespaces.push(Namespace {
            parent: None,
            name: None,
            namespaces: Vec::new(),
            functions: Vec::new(),
            globals: Vec::new(),
            scope: FxHashMap::default(),
            span: Span::DUMMY,
        });
        Self {
            unit_name: None,
            root,
            namespaces,
            functions: IndexVec::new(),
            params: IndexVec::new(),
            globals: IndexVec::new(),
            blocks: IndexVec::new(),
            locals: IndexVec::new(),
            stmts: IndexVec::new(),
            exprs: IndexVec::new(),
        }
    }
}

impl Default for SemanticTree {
    fn default() -> Self {
        Self::new()
    }
}
