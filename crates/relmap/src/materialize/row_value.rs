use relmap_core::stmt::{Value, ValueRecord};

use indexmap::IndexMap;

/// Identity of a row at one nesting level: the values of its primary key
/// columns, or of every column when the level has no key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(pub Vec<Value>);

/// One distinct entity collected from the physical rows.
#[derive(Debug, Clone)]
pub struct RowValue {
    /// Position of the first physical row the entity appeared in.
    pub row_number: usize,

    /// Own column values, named relative to the level.
    pub values: ValueRecord,

    /// Nested collections by navigation path relative to the level.
    pub relations: IndexMap<String, RowValueCollection>,
}

/// Distinct entities of one level, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RowValueCollection {
    rows: IndexMap<RowKey, RowValue>,
}

impl RowValueCollection {
    /// Returns the entity for `key`, creating it from `values` on first
    /// sight. Later rows with the same key do not overwrite it.
    pub fn upsert(&mut self, key: RowKey, row_number: usize, values: ValueRecord) -> &mut RowValue {
        self.rows.entry(key).or_insert_with(|| RowValue {
            row_number,
            values,
            relations: IndexMap::new(),
        })
    }

    pub fn get(&self, key: &RowKey) -> Option<&RowValue> {
        self.rows.get(key)
    }

    pub fn first(&self) -> Option<&RowValue> {
        self.rows.values().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowValue> + '_ {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
