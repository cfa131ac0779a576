//! A small T-SQL statement tree and its renderer.
//!
//! Statements are built once per query specification. Any part that depends
//! on a runtime argument is left as a hole ([`stmt::HoleId`]) and filled in
//! by [`stmt::Substitutions`] when the statement is rendered.

pub mod serializer;
pub use serializer::Serializer;

pub mod stmt;
pub use stmt::{Batch, Statement};
