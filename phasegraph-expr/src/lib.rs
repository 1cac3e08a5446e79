//! # phasegraph-expr
//!
//! Condition expression language for phasegraph.
//!
//! This crate provides:
//! - The tagged [`Value`] scalar and its coercion rules
//! - A lexer and recursive-descent parser for boolean conditions
//! - A pure evaluator over the [`Scope`] lookup trait
//!
//! The language has short-circuit `&&`/`||`, prefix `!`, one comparison per
//! chain (`==`, `!=`, `<`, `<=`, `>`, `>=`), parentheses, and literals for
//! booleans, numbers (including negative literals), and double-quoted
//! strings. Identifiers may be dotted; the `properties.` prefix routes
//! lookup to the property bag.

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod value;

pub use ast::{CmpOp, Expr, Leaf};
pub use error::{CompileError, EvalError};
pub use eval::{Scope, PROPERTY_PREFIX};
pub use parser::compile;
pub use value::Value;
