//! Typed arena ids for the semantic tree, one per node kind.
//!
//! Each id is a distinct newtype so the arena containers in [`crate::tree`]
//! reject cross-indexing (an `ExprId` cannot be used to index the function
//! arena) at compile time.

vela_util::define_idx! {
    /// A lexical container of declarations; the tree rooted at the unit's
    /// anonymous absolute root (spec §3 "namespace").
    pub struct NamespaceId;
}

vela_util::define_idx! {
    pub struct FunctionId;
}

vela_util::define_idx! {
    pub struct ParamId;
}

vela_util::define_idx! {
    /// A namespace-owned global variable.
    pub struct GlobalId;
}

vela_util::define_idx! {
    pub struct BlockId;
}

vela_util::define_idx! {
    /// A block-owned (or for-header-owned) local variable.
    pub struct LocalId;
}

vela_util::define_idx! {
    pub struct StmtId;
}

vela_util::define_idx! {
    pub struct ExprId;
}
