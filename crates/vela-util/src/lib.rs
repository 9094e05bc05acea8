//! vela-util - foundation types shared by every compiler stage.
//!
//! This crate carries no language-specific knowledge. It provides:
//! - [`span`] - source coordinates and spans
//! - [`symbol`] - interned identifier/string storage
//! - [`index_vec`] - typed arena storage (`IndexVec<I, T>` + `Idx`)
//! - [`diagnostic`] - structured, coded diagnostics and the shared `Handler`

pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use diagnostic::{Diagnostic, DiagnosticBuilder, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::{Coord, Span};
pub use symbol::Symbol;

pub use rustc_hash::{FxHashMap, FxHashSet};
