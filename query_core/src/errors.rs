use crate::query_builder::parameters::ParamSlot;
use crate::validation::ValidationError;
use platform::BackendError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Number of parameters does not match the placeholders; unmatched: {unmatched:?}")]
    ParameterMismatch {
        unmatched: Vec<String>,
        parameters: Vec<(String, ParamSlot)>,
    },

    #[error("Placeholder ':{name}' appears {occurrences} times but {values} values are bound")]
    PlaceholderCount {
        name: String,
        occurrences: usize,
        values: usize,
    },

    #[error("Parameter '{name}' holds a {kind} value, which cannot be bound")]
    UnbindableValue { name: String, kind: &'static str },

    #[error("Query failed: {message} (SQL: {sql})")]
    Execution { sql: String, message: String },

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Result mapping failed: property '{column}' does not exist in mapper {mapper}")]
    Mapping { mapper: String, column: String },

    #[error("Query already has type {current}; cannot run it as {requested}")]
    QueryTypeConflict {
        current: &'static str,
        requested: &'static str,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl QueryError {
    pub fn execution(sql: impl Into<String>, err: &BackendError) -> Self {
        QueryError::Execution {
            sql: sql.into(),
            message: err.message().to_string(),
        }
    }

    pub fn transaction(err: &BackendError) -> Self {
        QueryError::Transaction(err.message().to_string())
    }

    pub fn mapping(mapper: impl Into<String>, column: impl Into<String>) -> Self {
        QueryError::Mapping {
            mapper: mapper.into(),
            column: column.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        QueryError::Validation(message.into())
    }
}

impl From<ValidationError> for QueryError {
    fn from(err: ValidationError) -> Self {
        QueryError::Validation(err.to_string())
    }
}
