//! Result mappers
//!
//! A mapper is a user type that receives the columns of each row. It
//! declares the columns it accepts, may reject a row through
//! [`ResultMapper::register`], and is filled one field at a time.

use crate::result::row::{FieldAccess, Row};
use std::any::Any;
use std::fmt;
use type_mapping::Value;

/// Downcasting support for boxed mappers
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Row-to-object mapping contract
///
/// # Example
/// ```
/// use query_core::prelude::*;
///
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FieldAccess for User {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "id" => Some(Value::from(self.id)),
///             "name" => Some(Value::from(&self.name)),
///             _ => None,
///         }
///     }
///
///     fn field_names(&self) -> Vec<String> {
///         vec!["id".to_string(), "name".to_string()]
///     }
/// }
///
/// impl ResultMapper for User {
///     fn properties(&self) -> &'static [&'static str] {
///         &["id", "name"]
///     }
///
///     fn map_field(&mut self, column: &str, value: Value) {
///         match column {
///             "id" => self.id = value.as_i64().unwrap_or_default(),
///             "name" => self.name = value.to_string(),
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait ResultMapper: FieldAccess + AsAny + Send {
    /// Columns this mapper accepts
    fn properties(&self) -> &'static [&'static str];

    /// Gate called before the row is mapped; `false` skips the row
    fn register(&mut self, row: &Row) -> bool {
        let _ = row;
        true
    }

    fn map_field(&mut self, column: &str, value: Value);

    fn mapper_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Constructor for a boxed mapper instance
pub type MapperFactory = fn() -> Box<dyn ResultMapper>;

pub(crate) fn boxed_mapper<M: ResultMapper + Default>() -> Box<dyn ResultMapper> {
    Box::new(M::default())
}

/// One materialized row: generic, or produced by a registered mapper
pub enum ResultRow {
    Row(Row),
    Mapped(Box<dyn ResultMapper>),
}

impl ResultRow {
    pub fn is_mapped(&self) -> bool {
        matches!(self, ResultRow::Mapped(_))
    }

    pub fn as_row(&self) -> Option<&Row> {
        match self {
            ResultRow::Row(row) => Some(row),
            ResultRow::Mapped(_) => None,
        }
    }

    /// Borrow the mapper instance as its concrete type
    pub fn downcast_ref<M: ResultMapper>(&self) -> Option<&M> {
        match self {
            ResultRow::Mapped(mapper) => (**mapper).as_any().downcast_ref::<M>(),
            ResultRow::Row(_) => None,
        }
    }

    /// Take the mapper instance as its concrete type
    pub fn into_mapped<M: ResultMapper>(self) -> Option<M> {
        match self {
            ResultRow::Mapped(mapper) => mapper.into_any().downcast::<M>().ok().map(|m| *m),
            ResultRow::Row(_) => None,
        }
    }
}

impl FieldAccess for ResultRow {
    fn field(&self, name: &str) -> Option<Value> {
        match self {
            ResultRow::Row(row) => row.field(name),
            ResultRow::Mapped(mapper) => mapper.field(name),
        }
    }

    fn field_names(&self) -> Vec<String> {
        match self {
            ResultRow::Row(row) => row.field_names(),
            ResultRow::Mapped(mapper) => mapper.field_names(),
        }
    }
}

impl fmt::Debug for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultRow::Row(row) => f.debug_tuple("Row").field(row).finish(),
            ResultRow::Mapped(mapper) => f
                .debug_tuple("Mapped")
                .field(&mapper.mapper_name())
                .field(&mapper.to_json())
                .finish(),
        }
    }
}
