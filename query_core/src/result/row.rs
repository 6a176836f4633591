//! Generic result rows and field access.

use serde::ser::{Serialize, SerializeMap, Serializer};
use type_mapping::{values_to_json_object, Value};

/// Read access to named fields, shared by rows, records and mappers
pub trait FieldAccess {
    /// Value of a field, or `None` when the field does not exist
    fn field(&self, name: &str) -> Option<Value>;

    /// Field names in declaration order
    fn field_names(&self) -> Vec<String>;

    /// JSON object of every field
    fn to_json(&self) -> serde_json::Value {
        let names = self.field_names();
        let values: Vec<Value> = names
            .iter()
            .map(|name| self.field(name).unwrap_or(Value::Null))
            .collect();
        values_to_json_object(names.iter().map(String::as_str).zip(values.iter()))
    }
}

/// An ordered column → value mapping produced when no mapper is registered
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair column names with the cells of one result row
    pub fn from_columns(columns: &[String], cells: Vec<Value>) -> Self {
        Self {
            columns: columns.iter().cloned().zip(cells).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Set a column, replacing an existing value in place
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, Value)> {
        self.columns
    }
}

impl FieldAccess for Row {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn to_json(&self) -> serde_json::Value {
        values_to_json_object(self.iter())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, &type_mapping::value_to_json(value))?;
        }
        map.end()
    }
}
