use crate::{err, stmt::Value, Result};

/// A fully-drained result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    /// Column names, as aliased by the SELECT.
    columns: Vec<String>,

    /// Row values, positionally matching `columns`.
    rows: Vec<Vec<Value>>,
}

impl Rows {
    pub fn new(columns: Vec<String>) -> Rows {
        Rows {
            columns,
            rows: vec![],
        }
    }

    /// Appends a row. Its width must match the column count.
    pub fn push(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(err!(
                "row {} has {} values for {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            ));
        }

        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[Value]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_rejects_ragged_rows() {
        let mut rows = Rows::new(vec!["Id".to_string(), "Name".to_string()]);

        rows.push(vec![Value::I32(1), Value::from("Ada")]).unwrap();
        assert!(rows.push(vec![Value::I32(2)]).is_err());
        assert!(rows
            .push(vec![Value::I32(3), Value::Null, Value::Null])
            .is_err());

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.columns(), ["Id", "Name"]);
    }
}
