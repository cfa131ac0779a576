use crate::{stmt::Path, Error, Result};

/// Directive metadata attached to a field.
///
/// Directives on output fields control projection (`column`, `exclude`,
/// `via`). Directives on argument fields control how the argument becomes a
/// predicate, an ordering, a paging bound or an assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Directives {
    /// Column name override; the field name is used otherwise.
    pub column: Option<String>,

    /// Collapse the predicate to a tautology when the bound value is absent.
    pub ignore: Option<Ignore>,

    pub negate: bool,

    /// Inequality comparison instead of equality.
    pub compare: Option<Compare>,

    /// LIKE comparison with wildcards added around the bound value.
    pub like: Option<Like>,

    /// Explicit relation path, bypassing foreign key inference.
    pub via: Option<Via>,

    /// Navigation path in the output shape whose joined table the argument
    /// is compared against.
    pub join: Option<Path>,

    /// The argument is the number of rows to skip.
    pub offset: bool,

    /// The argument is the number of rows to return.
    pub fetch: bool,

    pub order_by: Option<OrderBy>,

    /// The field takes no part in mapping.
    pub exclude: bool,

    /// The argument is assigned by an update instead of filtering it.
    pub set: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignore {
    IfNull,
    IfNullOrEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Like {
    StartsWith,
    Contains,
    EndsWith,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderBy {
    /// Fixed table and column; the bound value supplies the direction.
    Column {
        table: Option<String>,
        column: String,
    },

    /// The argument's own name (or column override) is the column; the bound
    /// value supplies the direction.
    Direction,

    /// The bound value is one record, or a list of records, with `column`,
    /// optional `table` and optional `direction` fields.
    Dynamic,
}

/// A caller-declared relation chain: `Table[.Column] -> Table[.Column] -> ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Via {
    pub path: String,

    /// Column compared (or projected) on the final table.
    pub column: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaHop {
    pub table: String,
    pub column: Option<String>,
}

impl Directives {
    /// Rejects directive combinations that cannot be compiled.
    pub fn validate(&self, path: &Path, is_integer: bool) -> Result<()> {
        if self.like.is_some() && self.compare.is_some() {
            return Err(Error::invalid_attribute(format!(
                "`{path}` combines a LIKE directive with an inequality"
            )));
        }

        if self.offset && self.fetch {
            return Err(Error::invalid_attribute(format!(
                "`{path}` is marked both offset and fetch"
            )));
        }

        if (self.offset || self.fetch) && !is_integer {
            return Err(Error::invalid_attribute(format!(
                "paging argument `{path}` must be an integer"
            )));
        }

        let roles = [
            self.order_by.is_some(),
            self.offset || self.fetch,
            self.set,
        ];
        if roles.iter().filter(|role| **role).count() > 1 {
            return Err(Error::invalid_attribute(format!(
                "`{path}` mixes order-by, paging and set directives"
            )));
        }

        if self.via.is_some() && self.join.is_some() {
            return Err(Error::invalid_attribute(format!(
                "`{path}` declares both a via-relation and a join-relation path"
            )));
        }

        if let Some(via) = &self.via {
            via.hops(path)?;
        }

        Ok(())
    }

    /// True if the argument filters rows (as opposed to ordering, paging or
    /// assigning).
    pub fn is_filter(&self) -> bool {
        !self.exclude && self.order_by.is_none() && !self.offset && !self.fetch && !self.set
    }
}

impl Via {
    pub fn new(path: impl Into<String>) -> Via {
        Via {
            path: path.into(),
            column: None,
        }
    }

    /// Parses the hop chain. At least two hops are required and every hop
    /// must name a table.
    pub fn hops(&self, field: &Path) -> Result<Vec<ViaHop>> {
        let mut hops = vec![];

        for raw in self.path.split("->") {
            let raw = raw.trim();
            let mut parts = raw.splitn(2, '.');
            let table = parts.next().unwrap_or("").trim();

            if table.is_empty() {
                return Err(Error::invalid_attribute(format!(
                    "via-relation `{}` on `{field}` has an empty hop",
                    self.path
                )));
            }

            let column = parts
                .next()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from);

            hops.push(ViaHop {
                table: table.to_string(),
                column,
            });
        }

        if hops.len() < 2 {
            return Err(Error::invalid_attribute(format!(
                "via-relation `{}` on `{field}` needs at least two hops",
                self.path
            )));
        }

        Ok(hops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn via_hops_with_and_without_columns() {
        let via = Via::new("Employee.DepartmentId -> Department -> Company.Id");
        let hops = via.hops(&Path::parse("departmentName")).unwrap();

        assert_eq!(hops.len(), 3);
        assert_eq!(hops[0].table, "Employee");
        assert_eq!(hops[0].column.as_deref(), Some("DepartmentId"));
        assert_eq!(hops[1].column, None);
        assert_eq!(hops[2].column.as_deref(), Some("Id"));
    }

    #[test]
    fn via_single_hop_is_rejected() {
        let via = Via::new("Employee");
        let err = via.hops(&Path::parse("x")).unwrap_err();
        assert!(err.is_invalid_attribute());
    }

    #[test]
    fn like_with_compare_is_rejected() {
        let directives = Directives {
            like: Some(Like::Contains),
            compare: Some(Compare::Gt),
            ..Directives::default()
        };

        let err = directives.validate(&Path::parse("Name"), false).unwrap_err();
        assert!(err.is_invalid_attribute());
    }

    #[test]
    fn paging_requires_integer() {
        let directives = Directives {
            fetch: true,
            ..Directives::default()
        };

        assert!(directives.validate(&Path::parse("take"), true).is_ok());
        assert!(directives.validate(&Path::parse("take"), false).is_err());
    }
}
