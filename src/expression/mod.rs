//! Constrained expression language embedded in documents.
//!
//! Expressions are parsed once into a [`Program`] and evaluated by walking the tree. The only
//! names in reach are a fixed set of constants and functions plus whatever the caller binds
//! in the [`Scope`]: `this`, `dt`, and registry lookups.

pub(crate) mod ast;
pub(crate) mod error;
pub(crate) mod eval;
pub(crate) mod lexer;
pub(crate) mod parser;
pub(crate) mod value;

pub use error::ExprError;
pub use eval::{Program, Scope, evaluate};
pub use value::Value;

/// Leading character that marks a document string as an expression.
pub const EXPRESSION_MARKER: char = '=';
/// Leading character that marks a document string as a reference to a built entity.
pub const REFERENCE_MARKER: char = '@';
