//! Convenient re-exports for building and running queries

pub use crate::errors::QueryError;
pub use crate::processor::ExecutionResult;
pub use crate::query_builder::{Operator, ParameterBag, QueryBuilder, QueryType};
pub use crate::result::{
    Collection, FieldAccess, Group, IntoFields, Record, ResultMapper, ResultRow, Row,
};
pub use type_mapping::Value;
