//! Query specifications: the typed description of a result shape plus the
//! arguments that filter, order, page or write it.
//!
//! Shapes are declared up front in a [`Shapes`] registry. A [`QuerySpec`]
//! expands the shapes it references into two arena-allocated
//! [`FieldTree`]s, one for the arguments and one for the output.

mod directive;
pub use directive::{Compare, Directives, Ignore, Like, OrderBy, Via, ViaHop};

mod field_def;
pub use field_def::FieldDef;

mod field_tree;
pub use field_tree::{FieldId, FieldNode, FieldTree};

mod query_spec;
pub use query_spec::{Operation, Output, QuerySpec, QuerySpecBuilder};

mod shape;
pub use shape::{Shape, ShapeBuilder, Shapes, ShapesBuilder};
