use super::{Formatter, ToSql};

use relmap_core::schema::db;

impl ToSql for &db::Type {
    fn to_sql(self, f: &mut Formatter<'_>) {
        use std::fmt::Write;

        match self {
            db::Type::Boolean => fmt!(f, "bit"),
            db::Type::Integer(1) => fmt!(f, "tinyint"),
            db::Type::Integer(2) => fmt!(f, "smallint"),
            db::Type::Integer(4) => fmt!(f, "int"),
            db::Type::Integer(_) => fmt!(f, "bigint"),
            db::Type::Float => fmt!(f, "float"),
            db::Type::Text => fmt!(f, "nvarchar(max)"),
            db::Type::VarChar(len) => write!(f.dst, "nvarchar({len})").unwrap(),
            db::Type::Binary => fmt!(f, "varbinary(max)"),
            db::Type::Uuid => fmt!(f, "uniqueidentifier"),
            db::Type::DateTime => fmt!(f, "datetime2"),
            db::Type::Custom(name) => fmt!(f, name.as_str()),
        }
    }
}
