use super::{Directives, FieldDef, Shapes};
use crate::{
    stmt::{Path, Type},
    Error, Result,
};

use std::fmt;

/// Arena of field nodes. Node `0` is the root.
///
/// Parents are referenced by index, never by pointer, so the tree can be
/// walked upwards without ownership cycles.
#[derive(Debug, Clone)]
pub struct FieldTree {
    nodes: Vec<FieldNode>,
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct FieldId(pub usize);

#[derive(Debug, Clone)]
pub struct FieldNode {
    pub id: FieldId,

    pub name: String,

    pub ty: Type,

    pub nullable: bool,

    pub parent: Option<FieldId>,

    pub children: Vec<FieldId>,

    pub directives: Directives,

    /// Table declared by the node's shape, overriding name matching.
    pub table: Option<String>,

    /// Set when the node's shape already appears among its ancestors. Such
    /// a node has no children and is relationally empty at this position.
    pub cyclic: bool,

    /// `(shape, field)` that declared this node, if any.
    origin: Option<(String, String)>,
}

impl FieldTree {
    /// Expands a tree rooted at a value of type `ty` (typically a shape or a
    /// list of shapes).
    pub fn from_type(name: &str, ty: Type, shapes: &Shapes) -> Result<FieldTree> {
        let mut tree = FieldTree { nodes: vec![] };
        let root = tree.push(None, FieldDef::new(name, ty), None);
        tree.expand(root, shapes)?;
        Ok(tree)
    }

    /// Builds a tree whose root is an anonymous record with the given
    /// fields (the argument list of a query specification).
    pub fn from_fields(fields: &[FieldDef], shapes: &Shapes) -> Result<FieldTree> {
        let mut tree = FieldTree { nodes: vec![] };
        let root = tree.push(None, FieldDef::new("", Type::Shape(String::new())), None);

        for field in fields {
            let child = tree.push(Some(root), field.clone(), None);
            tree.expand(child, shapes)?;
        }

        Ok(tree)
    }

    pub fn root(&self) -> &FieldNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: FieldId) -> &FieldNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: FieldId) -> impl ExactSizeIterator<Item = &FieldNode> + '_ {
        self.nodes[id.0]
            .children
            .iter()
            .map(move |child| &self.nodes[child.0])
    }

    /// Finds a direct child by name, ASCII case-insensitive.
    pub fn child(&self, id: FieldId, name: &str) -> Option<&FieldNode> {
        self.children(id)
            .find(|child| child.name.eq_ignore_ascii_case(name))
    }

    /// Ancestors of `id`, nearest first. The node itself is not included.
    pub fn ancestors(&self, id: FieldId) -> impl Iterator<Item = &FieldNode> + '_ {
        let mut next = self.nodes[id.0].parent;
        std::iter::from_fn(move || {
            let node = &self.nodes[next?.0];
            next = node.parent;
            Some(node)
        })
    }

    /// Path of field names from the root (exclusive) to `id` (inclusive).
    pub fn path(&self, id: FieldId) -> Path {
        let mut steps: Vec<&str> = self
            .ancestors(id)
            .filter(|node| node.parent.is_some())
            .map(|node| node.name.as_str())
            .collect();
        steps.reverse();

        if self.nodes[id.0].parent.is_some() {
            steps.push(&self.nodes[id.0].name);
        }

        Path::from_steps(steps)
    }

    /// Finds a node by path from the root.
    pub fn find(&self, path: &Path) -> Option<&FieldNode> {
        let mut current = self.root();

        for step in path.steps() {
            current = self.child(current.id, step)?;
        }

        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldNode> + '_ {
        self.nodes.iter()
    }

    fn push(&mut self, parent: Option<FieldId>, def: FieldDef, origin: Option<(String, String)>) -> FieldId {
        let id = FieldId(self.nodes.len());

        self.nodes.push(FieldNode {
            id,
            name: def.name,
            ty: def.ty,
            nullable: def.nullable,
            parent,
            children: vec![],
            directives: def.directives,
            table: None,
            cyclic: false,
            origin,
        });

        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }

        id
    }

    fn expand(&mut self, id: FieldId, shapes: &Shapes) -> Result<()> {
        let Some(shape_name) = self.nodes[id.0].ty.shape_name().map(String::from) else {
            return Ok(());
        };

        let Some(shape) = shapes.get(&shape_name) else {
            return Err(Error::invalid_identifier(
                self.path(id).to_string(),
                format!("shape `{shape_name}` is not registered"),
            ));
        };

        self.nodes[id.0].table = shape.table.clone();

        if self.is_cyclic(id, &shape_name) {
            self.nodes[id.0].cyclic = true;
            return Ok(());
        }

        for field in &shape.fields {
            let origin = Some((shape.name.clone(), field.name.clone()));
            let child = self.push(Some(id), field.clone(), origin);
            self.expand(child, shapes)?;
        }

        Ok(())
    }

    /// A node is cyclic when an ancestor has the same shape. An explicit
    /// via-relation closes the cycle once: the node expands unless the same
    /// declaring field already appears among its ancestors.
    fn is_cyclic(&self, id: FieldId, shape_name: &str) -> bool {
        let node = &self.nodes[id.0];

        let repeats_shape = self
            .ancestors(id)
            .any(|ancestor| ancestor.ty.shape_name() == Some(shape_name));

        if !repeats_shape {
            return false;
        }

        if node.directives.via.is_none() {
            return true;
        }

        self.ancestors(id)
            .any(|ancestor| ancestor.origin.is_some() && ancestor.origin == node.origin)
    }
}

impl FieldNode {
    /// The column name this field maps to.
    pub fn column_name(&self) -> &str {
        self.directives.column.as_deref().unwrap_or(&self.name)
    }

    pub fn is_list(&self) -> bool {
        self.ty.is_list()
    }

    pub fn is_scalar(&self) -> bool {
        self.ty.is_scalar()
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Shapes;

    fn shapes() -> Shapes {
        Shapes::builder()
            .shape("Employee", |s| {
                s.field("Id", Type::I32);
                s.field("Name", Type::String);
                s.field("Manager", Type::shape("Employee"));
                s.field("Department", Type::shape("Department"));
            })
            .shape("Department", |s| {
                s.field("Id", Type::I32);
                s.field("Employees", Type::list(Type::shape("Employee")));
            })
            .build()
    }

    #[test]
    fn cyclic_fields_are_not_expanded() {
        let tree = FieldTree::from_type("", Type::shape("Employee"), &shapes()).unwrap();

        let manager = tree.find(&Path::parse("Manager")).unwrap();
        assert!(manager.cyclic);
        assert!(manager.children.is_empty());

        let employees = tree.find(&Path::parse("Department.Employees")).unwrap();
        assert!(employees.cyclic);

        let department = tree.find(&Path::parse("Department")).unwrap();
        assert!(!department.cyclic);
        assert_eq!(department.children.len(), 2);
    }

    #[test]
    fn via_closes_a_cycle_once() {
        let shapes = Shapes::builder()
            .shape("Employee", |s| {
                s.field("Id", Type::I32);
                s.field("Manager", Type::shape("Employee"))
                    .via("Employee.ManagerId -> Employee.Id");
            })
            .build();

        let tree = FieldTree::from_type("", Type::shape("Employee"), &shapes).unwrap();

        let manager = tree.find(&Path::parse("Manager")).unwrap();
        assert!(!manager.cyclic);

        let nested = tree.find(&Path::parse("Manager.Manager")).unwrap();
        assert!(nested.cyclic);
    }

    #[test]
    fn unknown_shape_is_an_invalid_identifier() {
        let err = FieldTree::from_type("", Type::shape("Nope"), &shapes()).unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[test]
    fn path_excludes_root() {
        let tree = FieldTree::from_type("", Type::shape("Employee"), &shapes()).unwrap();
        let id = tree.find(&Path::parse("Department.Id")).unwrap().id;
        assert_eq!(tree.path(id).to_string(), "Department.Id");
        assert!(tree.path(tree.root().id).is_root());
    }
}
