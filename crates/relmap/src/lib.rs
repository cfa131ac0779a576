//! Compiles declarative query specifications into T-SQL and folds the
//! joined result rows back into nested values.
//!
//! A [`Compiler`] binds a specification's output and argument field trees
//! onto a relational schema, building [`Relations`](relation::Relations)
//! that infer joins through foreign keys and junction tables. The result
//! is a [`Compiled`] statement holding holes for everything that depends
//! on runtime arguments; [`Compiled::bind`] fills them and renders the
//! command text. [`Db`] runs the whole pipeline through a
//! [`Driver`](relmap_core::Driver).

pub mod compiler;
pub use compiler::{Bound, Compiled, Compiler, CompilerOptions, Inflection, JunctionPolicy};

pub mod db;
pub use db::Db;

mod lower;

pub mod materialize;

pub mod relation;

mod token;

pub use relmap_core::{
    async_trait,
    driver::{self, Driver, Params, Rows},
    schema, spec,
    stmt::{self, Path, Type, Value, ValueRecord},
    Error, Result,
};
