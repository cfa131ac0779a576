/// The type of a field in a query specification.
///
/// Scalar variants map to columns. `Shape` refers to a registered record
/// shape by name and maps to a table (or, when no table matches, to an
/// embedded projection of the parent table). `List` wraps any element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    Bytes,
    DateTime,
    F64,
    I32,
    I64,
    String,
    Uuid,

    /// A homogeneous collection.
    List(Box<Type>),

    /// A record shape, referenced by its registered name.
    Shape(String),
}

impl Type {
    pub fn list(element: impl Into<Type>) -> Type {
        Type::List(Box::new(element.into()))
    }

    pub fn shape(name: impl Into<String>) -> Type {
        Type::Shape(name.into())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_))
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, Type::Shape(_))
    }

    /// True for column-compatible types, including lists of scalars.
    pub fn is_scalar(&self) -> bool {
        match self {
            Type::List(element) => element.is_scalar(),
            Type::Shape(_) => false,
            _ => true,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I32 | Type::I64)
    }

    /// The element type of a list, or the type itself.
    pub fn element(&self) -> &Type {
        match self {
            Type::List(element) => element.element(),
            ty => ty,
        }
    }

    /// The shape name of this type or of its list element.
    pub fn shape_name(&self) -> Option<&str> {
        match self.element() {
            Type::Shape(name) => Some(name),
            _ => None,
        }
    }
}
