use relmap_core::{stmt::Value, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parses a bound direction value. Null means ascending; strings are
    /// matched case-insensitively against `asc`, `ascending`, `desc` and
    /// `descending`.
    pub fn from_value(value: &Value) -> Result<Direction> {
        match value {
            Value::Null => Ok(Direction::Asc),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "" | "asc" | "ascending" => Ok(Direction::Asc),
                "desc" | "descending" => Ok(Direction::Desc),
                other => Err(Error::invalid_argument(format!(
                    "`{other}` is not a sort direction"
                ))),
            },
            value => Err(Error::type_conversion(value.clone(), "Direction")),
        }
    }
}
