//! Aggregate functions
//!
//! This module provides the aggregate select expressions the builder emits.

/// Aggregate functions supported by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Aggregate::Count => "COUNT",
            Aggregate::Sum => "SUM",
            Aggregate::Avg => "AVG",
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
        }
    }

    /// `FUNC(expression)`
    pub fn apply(&self, expression: &str) -> String {
        format!("{}({})", self.as_sql(), expression)
    }
}

/// `LEAST(a,b,...)`, or `None` for an empty argument list
pub fn least(arguments: &[&str]) -> Option<String> {
    if arguments.is_empty() {
        None
    } else {
        Some(format!("LEAST({})", arguments.join(",")))
    }
}
