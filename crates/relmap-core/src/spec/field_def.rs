use super::{Compare, Directives, Ignore, Like, OrderBy, Via};
use crate::stmt::{Path, Type};

/// A declared field of a shape, or an argument of a query specification.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub nullable: bool,
    pub directives: Directives,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> FieldDef {
        FieldDef {
            name: name.into(),
            ty,
            nullable: false,
            directives: Directives::default(),
        }
    }

    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    pub fn column(&mut self, column: &str) -> &mut Self {
        self.directives.column = Some(column.to_string());
        self
    }

    pub fn ignore_if_null(&mut self) -> &mut Self {
        self.directives.ignore = Some(Ignore::IfNull);
        self
    }

    pub fn ignore_if_null_or_empty(&mut self) -> &mut Self {
        self.directives.ignore = Some(Ignore::IfNullOrEmpty);
        self
    }

    pub fn negate(&mut self) -> &mut Self {
        self.directives.negate = true;
        self
    }

    pub fn compare(&mut self, compare: Compare) -> &mut Self {
        self.directives.compare = Some(compare);
        self
    }

    pub fn like(&mut self, like: Like) -> &mut Self {
        self.directives.like = Some(like);
        self
    }

    pub fn via(&mut self, path: &str) -> &mut Self {
        self.directives.via = Some(Via::new(path));
        self
    }

    /// Via-relation path with the column compared or projected on the final
    /// table.
    pub fn via_column(&mut self, path: &str, column: &str) -> &mut Self {
        self.directives.via = Some(Via {
            path: path.to_string(),
            column: Some(column.to_string()),
        });
        self
    }

    pub fn join(&mut self, path: &str) -> &mut Self {
        self.directives.join = Some(Path::parse(path));
        self
    }

    pub fn offset(&mut self) -> &mut Self {
        self.directives.offset = true;
        self
    }

    pub fn fetch(&mut self) -> &mut Self {
        self.directives.fetch = true;
        self
    }

    pub fn order_by(&mut self, order_by: OrderBy) -> &mut Self {
        self.directives.order_by = Some(order_by);
        self
    }

    pub fn exclude(&mut self) -> &mut Self {
        self.directives.exclude = true;
        self
    }

    pub fn set(&mut self) -> &mut Self {
        self.directives.set = true;
        self
    }
}
