//! Key-value records with a declared schema.

use crate::errors::QueryError;
use crate::result::row::FieldAccess;
use serde::Serialize;
use type_mapping::{serialize_to_fields, Value};

/// Field values keyed by name, restricted to a declared set of fields.
///
/// Writes to an undeclared field fail immediately, so a record handed to
/// `insert`/`update` only ever references known columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Vec<String>,
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn new<S: AsRef<str>>(schema: &[S]) -> Self {
        Self {
            schema: schema.iter().map(|s| s.as_ref().to_string()).collect(),
            values: Vec::new(),
        }
    }

    /// Build a record from serializable data; every serialized field must be declared
    pub fn from_serializable<S: AsRef<str>, T: Serialize>(
        schema: &[S],
        data: &T,
    ) -> Result<Self, QueryError> {
        let mut record = Self::new(schema);
        for (name, value) in serialize_to_fields(data) {
            record.set(&name, value)?;
        }
        Ok(record)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), QueryError> {
        if !self.declares(name) {
            return Err(QueryError::validation(format!(
                "field '{}' is not declared in the record schema",
                name
            )));
        }

        let value = value.into();
        match self.values.iter_mut().find(|(field, _)| field == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_string(), value)),
        }
        Ok(())
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, QueryError> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.schema.iter().any(|field| field == name)
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Fields that have been set, in the order they were first set
    pub fn fields(&self) -> &[(String, Value)] {
        &self.values
    }

    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.values
    }
}

impl FieldAccess for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn field_names(&self) -> Vec<String> {
        self.values.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Input accepted by the builder's `insert` and `update`
pub trait IntoFields {
    fn into_fields(self) -> Result<Vec<(String, Value)>, QueryError>;
}

impl IntoFields for Record {
    fn into_fields(self) -> Result<Vec<(String, Value)>, QueryError> {
        Ok(Record::into_fields(self))
    }
}

impl<K: Into<String>, V: Into<Value>> IntoFields for Vec<(K, V)> {
    fn into_fields(self) -> Result<Vec<(String, Value)>, QueryError> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> IntoFields for [(K, V); N] {
    fn into_fields(self) -> Result<Vec<(String, Value)>, QueryError> {
        Ok(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[test]
    fn test_schema_is_enforced_on_write() {
        let mut record = Record::new(&["name", "age"]);
        record.set("name", "Ann").unwrap();
        assert!(matches!(
            record.set("email", "ann@example.com"),
            Err(QueryError::Validation(_))
        ));
        assert_eq!(record.get("name"), Some(&Value::from("Ann")));
        assert_eq!(record.get("email"), None);
    }

    #[test]
    fn test_fields_keep_first_set_order() {
        let record = Record::new(&["name", "age"])
            .with("age", 30)
            .unwrap()
            .with("name", "Ann")
            .unwrap()
            .with("age", 31)
            .unwrap();
        assert_eq!(
            record.into_fields(),
            vec![
                ("age".to_string(), Value::from(31)),
                ("name".to_string(), Value::from("Ann"))
            ]
        );
    }

    #[derive(Serialize)]
    struct NewUser {
        name: String,
        age: i64,
    }

    #[test]
    fn test_from_serializable() {
        let user = NewUser {
            name: "Ann".to_string(),
            age: 30,
        };
        let record = Record::from_serializable(&["name", "age"], &user).unwrap();
        assert_eq!(record.field("age"), Some(Value::from(30)));

        assert!(Record::from_serializable(&["name"], &user).is_err());
    }
}
