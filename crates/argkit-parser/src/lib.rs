//! Permissive argv tokenizer.
//!
//! Turns a flat argument list into a [`ParseResult`]: positional arguments plus
//! a map of flags with typed, accumulated values. Flags are looked up in an
//! [`AliasTable`] so `-o`, `-O` and `--output` can all land under `output`.
//!
//! The tokenizer has no schema and no failure modes: unknown flags are kept
//! under their raw name. Schema-driven behavior (help, defaults, subcommands)
//! lives in the `argkit` crate.

pub mod alias;
pub mod tokenize;
pub mod value;

pub use alias::{AliasTable, Spellings};
pub use tokenize::{ParseResult, tokenize};
pub use value::{Scalar, Value};

/// Key under which positional arguments are serialized.
///
/// A flag that resolves to this name appends to the positional sequence.
pub const POSITIONAL_KEY: &str = "__";
