//! Query Core - query construction and execution for Glider
//!
//! This crate provides the fluent query builder, the parameter bag and SQL
//! generator behind it, the processor that executes built queries against a
//! platform, and the result collection rows are materialized into.

pub mod errors;
pub mod prelude;
pub mod processor;
pub mod query_builder;
pub mod result;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::QueryError;
pub use processor::{ExecutionResult, Processor, ResolvedQuery};
pub use query_builder::{Operator, ParamSlot, ParameterBag, QueryBuilder, QueryType, SqlGenerator};
pub use result::{
    Collection, FieldAccess, Group, IntoFields, Record, ResultMapper, ResultRow, Row,
};
pub use validation::{IdentifierKind, ValidatedFieldName, ValidatedTableName, ValidationError};
