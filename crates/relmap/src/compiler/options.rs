use relmap_core::schema::{Exact, Inflector, Pluralize};

use std::sync::Arc;

/// Settings that shape compiled statements, independent of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct CompilerOptions {
    pub junction_policy: JunctionPolicy,

    /// Alias of the derived table that pages root keys when a paged select
    /// joins navigations.
    pub key_window_alias: String,

    pub inflection: Inflection,
}

/// What to do when more than one junction table could link two tables
/// equally well.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum JunctionPolicy {
    /// Log a warning and use the first candidate in schema order.
    #[default]
    Warn,

    /// Fail with an ambiguous relation error.
    Error,
}

/// Built-in name matching strategies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Inflection {
    /// Match plural and singular forms.
    #[default]
    Pluralize,

    /// Match names as written, ignoring case.
    Exact,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        CompilerOptions {
            junction_policy: JunctionPolicy::default(),
            key_window_alias: "__page".to_string(),
            inflection: Inflection::default(),
        }
    }
}

impl Inflection {
    pub(crate) fn inflector(self) -> Arc<dyn Inflector> {
        match self {
            Inflection::Pluralize => Arc::new(Pluralize),
            Inflection::Exact => Arc::new(Exact),
        }
    }
}
