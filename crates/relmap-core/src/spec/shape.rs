use super::FieldDef;
use crate::stmt::Type;

use indexmap::IndexMap;

/// A named record shape: the explicit stand-in for a struct whose fields
/// would otherwise be discovered by reflection.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,

    /// Table name override. When absent the shape name (and its plural and
    /// singular forms) is matched against the schema.
    pub table: Option<String>,

    pub fields: Vec<FieldDef>,
}

/// Registry of shapes referenced by query specifications.
#[derive(Debug, Clone, Default)]
pub struct Shapes {
    shapes: IndexMap<String, Shape>,
}

#[derive(Debug, Default)]
pub struct ShapesBuilder {
    shapes: IndexMap<String, Shape>,
}

#[derive(Debug)]
pub struct ShapeBuilder {
    shape: Shape,
}

impl Shapes {
    pub fn builder() -> ShapesBuilder {
        ShapesBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Shape> {
        self.shapes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.values()
    }
}

impl Shape {
    /// The name matched against the schema when resolving this shape to a
    /// table.
    pub fn table_name(&self) -> &str {
        self.table.as_deref().unwrap_or(&self.name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl ShapesBuilder {
    /// Declares a shape. A later declaration with the same name replaces an
    /// earlier one.
    pub fn shape(&mut self, name: &str, f: impl FnOnce(&mut ShapeBuilder)) -> &mut Self {
        let mut builder = ShapeBuilder {
            shape: Shape {
                name: name.to_string(),
                table: None,
                fields: vec![],
            },
        };
        f(&mut builder);
        self.shapes.insert(name.to_string(), builder.shape);
        self
    }

    pub fn build(&self) -> Shapes {
        Shapes {
            shapes: self.shapes.clone(),
        }
    }
}

impl ShapeBuilder {
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.shape.table = Some(table.to_string());
        self
    }

    pub fn field(&mut self, name: &str, ty: Type) -> &mut FieldDef {
        self.shape.fields.push(FieldDef::new(name, ty));
        self.shape.fields.last_mut().unwrap()
    }
}
