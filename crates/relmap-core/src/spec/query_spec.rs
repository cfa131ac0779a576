use super::{FieldDef, FieldTree, Shapes};
use crate::{
    stmt::{Path, Type},
    Error, Result,
};

/// The statement kind a query specification compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,

    /// Insert unmatched rows by key, then update every row.
    Upsert,

    /// Upsert, then delete children no longer present in the input.
    Sync,
}

/// What the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    /// A single object, or null.
    One,

    /// An ordered collection.
    Many,

    /// The number of matching root rows.
    Count,

    /// The number of affected rows.
    Affected,

    Nothing,
}

/// A complete query specification: the operation, its arguments and the
/// expected result shape.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub operation: Operation,

    /// Target table. When absent it is inferred from the output shape, or
    /// from the single entity argument of a write.
    pub table: Option<String>,

    pub args: FieldTree,

    /// Output tree, present for `One` and `Many`.
    pub output: Option<FieldTree>,

    pub output_kind: Output,
}

#[derive(Debug)]
pub struct QuerySpecBuilder {
    operation: Operation,
    table: Option<String>,
    args: Vec<FieldDef>,
    output: Option<(Output, Type)>,
    count: bool,
    affected: bool,
}

impl QuerySpec {
    pub fn builder(operation: Operation) -> QuerySpecBuilder {
        QuerySpecBuilder {
            operation,
            table: None,
            args: vec![],
            output: None,
            count: false,
            affected: false,
        }
    }

    /// The element shape of the output, if any.
    pub fn output_shape(&self) -> Option<&str> {
        self.output
            .as_ref()
            .and_then(|output| output.root().ty.shape_name())
    }
}

impl QuerySpecBuilder {
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    /// Declares an argument.
    pub fn arg(&mut self, name: &str, ty: Type) -> &mut FieldDef {
        self.args.push(FieldDef::new(name, ty));
        self.args.last_mut().unwrap()
    }

    /// The result is a single object of `shape`.
    pub fn returns_one(&mut self, shape: &str) -> &mut Self {
        self.output = Some((Output::One, Type::shape(shape)));
        self
    }

    /// The result is an ordered collection of `shape`.
    pub fn returns_many(&mut self, shape: &str) -> &mut Self {
        self.output = Some((Output::Many, Type::list(Type::shape(shape))));
        self
    }

    /// The result is the number of matching root rows.
    pub fn returns_count(&mut self) -> &mut Self {
        self.count = true;
        self
    }

    /// The result is the number of affected rows.
    pub fn returns_affected(&mut self) -> &mut Self {
        self.affected = true;
        self
    }

    pub fn build(&self, shapes: &Shapes) -> Result<QuerySpec> {
        let outputs = [self.output.is_some(), self.count, self.affected];
        if outputs.iter().filter(|o| **o).count() > 1 {
            return Err(Error::invalid_attribute(
                "a query specification declares more than one result kind",
            ));
        }

        for (index, arg) in self.args.iter().enumerate() {
            if self.args[..index]
                .iter()
                .any(|other| other.name.eq_ignore_ascii_case(&arg.name))
            {
                return Err(Error::invalid_attribute(format!(
                    "argument `{}` declared more than once",
                    arg.name
                )));
            }

            arg.directives
                .validate(&Path::from_steps([arg.name.as_str()]), arg.ty.is_integer())?;
        }

        let args = FieldTree::from_fields(&self.args, shapes)?;

        for node in args.iter().skip(1) {
            if node.parent != Some(args.root().id) {
                node.directives
                    .validate(&args.path(node.id), node.ty.is_integer())?;
            }
        }

        let (output, output_kind) = match &self.output {
            Some((kind, ty)) => (Some(FieldTree::from_type("", ty.clone(), shapes)?), *kind),
            None if self.count => (None, Output::Count),
            None if self.affected => (None, Output::Affected),
            None => (None, Output::Nothing),
        };

        if output_kind == Output::Count && self.operation != Operation::Select {
            return Err(Error::invalid_attribute(
                "a count result is only available for select",
            ));
        }

        Ok(QuerySpec {
            operation: self.operation,
            table: self.table.clone(),
            args,
            output,
            output_kind,
        })
    }
}
