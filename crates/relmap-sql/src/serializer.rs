#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod ident;
use ident::{Ident, Variable};

// Fragment serializers
mod expr;
mod statement;
mod ty;

use crate::stmt::{Batch, Fragment, HoleId, Substitutions};

/// Separates the statements of a batch.
const STATEMENT_DELIMITER: &str = ";\n";

/// Renders statement batches to T-SQL text.
///
/// Identifiers are always double-quoted, parameters are written as `@name`
/// and statements in a batch are separated by `;` and a newline.
#[derive(Debug, Default)]
pub struct Serializer {
    _priv: (),
}

struct Formatter<'a> {
    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Fragments that replace holes
    subs: &'a Substitutions,
}

impl Serializer {
    pub fn new() -> Serializer {
        Serializer::default()
    }

    /// Serializes a batch with no holes.
    pub fn serialize(&self, batch: &Batch) -> String {
        self.serialize_with(batch, &Substitutions::new())
    }

    /// Serializes a batch, replacing every hole with its bound fragment.
    ///
    /// # Panics
    ///
    /// Panics if the batch references a hole that `subs` does not bind.
    pub fn serialize_with(&self, batch: &Batch, subs: &Substitutions) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            dst: &mut ret,
            subs,
        };

        fmt!(&mut fmt, Delimited(&batch.statements, STATEMENT_DELIMITER));

        ret.push(';');
        ret
    }
}

impl<'a> Formatter<'a> {
    fn fragment(&self, hole: HoleId) -> &'a Fragment {
        let subs = self.subs;
        subs.get(hole)
            .unwrap_or_else(|| panic!("no fragment bound for {hole:?}"))
    }
}
