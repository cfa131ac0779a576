//! Deferred rewrites.
//!
//! Statement builders cannot finish every fragment at compile time: an
//! equality becomes `IS NULL` when its argument is null, an IN list grows
//! one parameter per element, an ignore-if-null predicate collapses to
//! `1 = 1`. Builders leave a hole in the AST for each such fragment and
//! record a [`Token`] describing how to fill it. Binding walks the tokens
//! against the argument value, producing the substitutions the renderer
//! consumes and the final parameter map.

mod bind;
pub(crate) use bind::bind;

use relmap_core::{
    schema::db::TableId,
    spec::{Ignore, Like},
    stmt::{Path, Value},
};
use relmap_sql::stmt::{BinaryOp, Expr, HoleId};

/// A hole and the rule that fills it.
#[derive(Debug, Clone)]
pub(crate) struct Token {
    pub(crate) hole: HoleId,

    /// Location of the driving value in the argument record.
    pub(crate) path: Path,

    pub(crate) action: Action,
}

#[derive(Debug, Clone)]
pub(crate) enum Action {
    /// A column comparison.
    Predicate(Predicate),

    /// Keeps `expr` unless the value is absent, in which case the hole
    /// becomes a tautology.
    Guard { ignore: Ignore, expr: Expr },

    OrderBy(OrderTerm),

    /// One SET assignment, dropped when ignored.
    Assign {
        column: String,
        param: String,
        ignore: Option<Ignore>,
    },

    /// VALUES rows for a lookup table or a plain insert.
    Rows(RowsSource),

    /// Matches rows by key against one entity or a collection of entities.
    KeyMatch {
        columns: Vec<(Expr, Path)>,
        param: String,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Predicate {
    pub(crate) column: Expr,
    pub(crate) kind: PredicateKind,
    pub(crate) negate: bool,
    pub(crate) ignore: Option<Ignore>,

    /// Parameter holding the bound value. IN lists derive one parameter
    /// per element from it.
    pub(crate) param: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PredicateKind {
    Eq,
    Compare(BinaryOp),
    Like,
    InList,
}

#[derive(Debug, Clone)]
pub(crate) enum OrderTerm {
    /// Fixed column; the value is the direction.
    Fixed { expr: Expr },

    /// The value names the columns (and optionally tables) to order by.
    Dynamic { targets: Vec<OrderTarget> },
}

/// A table a dynamic ordering may name.
#[derive(Debug, Clone)]
pub(crate) struct OrderTarget {
    pub(crate) alias: String,
    pub(crate) table: TableId,

    /// Output path of the navigation; root for the target table.
    pub(crate) path: Path,
}

#[derive(Debug, Clone)]
pub(crate) struct RowsSource {
    pub(crate) names: RowNames,

    /// Path of each nesting level below the token's value, relative to an
    /// element of the previous level.
    pub(crate) levels: Vec<Path>,

    pub(crate) columns: Vec<RowColumn>,

    /// An absent or empty top level is an error rather than zero rows.
    pub(crate) required: bool,
}

/// How row parameters are named.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RowNames {
    /// A single row, one reserved name per column.
    Fields(Vec<String>),

    /// `{base}_r{row}_c{column}`
    Derived(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RowColumn {
    /// Position of the element among all elements of its level.
    Index,

    /// Position of the owning element in the previous level.
    ParentIndex,

    /// A field of the element.
    Field(Path),

    Null,
}

/// A named parameter and where its value comes from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamPath {
    pub(crate) name: String,
    pub(crate) path: Path,
    pub(crate) transform: Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transform {
    None,

    /// Escapes LIKE wildcards and adds the directive's wildcards.
    Like(Like),

    /// Offset and fetch bounds: a null value is an error.
    Required,
}

impl Transform {
    pub(crate) fn apply(self, path: &Path, value: &Value) -> relmap_core::Result<Value> {
        match self {
            Transform::None => Ok(value.clone()),
            Transform::Required if value.is_null() => Err(relmap_core::Error::invalid_argument(
                format!("paging argument `{path}` is null"),
            )),
            Transform::Required => Ok(value.clone()),
            Transform::Like(like) => Ok(match value {
                Value::String(s) => Value::String(like_pattern(like, s)),
                other => other.clone(),
            }),
        }
    }
}

/// Escapes `%`, `_` and `[` and wraps the value with wildcards.
pub(crate) fn like_pattern(like: Like, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);

    for c in value.chars() {
        match c {
            '%' => escaped.push_str("[%]"),
            '_' => escaped.push_str("[_]"),
            '[' => escaped.push_str("[[]"),
            c => escaped.push(c),
        }
    }

    match like {
        Like::StartsWith => format!("{escaped}%"),
        Like::Contains => format!("%{escaped}%"),
        Like::EndsWith => format!("%{escaped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Like::StartsWith, "50%"), "50[%]%");
        assert_eq!(like_pattern(Like::Contains, "a_b"), "%a[_]b%");
        assert_eq!(like_pattern(Like::EndsWith, "[x]"), "%[[]x]");
    }

    #[test]
    fn required_rejects_null() {
        let err = Transform::Required
            .apply(&Path::parse("take"), &Value::Null)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
