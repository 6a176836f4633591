//! Query builder utilities
//!
//! This module provides SQL query construction: the parameter bag, the
//! binder producing fragments, the generator rewriting placeholders and the
//! fluent builder tying them together.

pub mod aggregation;
pub mod binder;
pub mod builder;
pub mod parameters;
pub mod sql_generation;
pub mod statement_type;


pub use aggregation::Aggregate;
pub use binder::{Binding, Fragment, Joiner, Operator, QueryBinder};
pub use builder::QueryBuilder;
pub use parameters::{ParamSlot, ParameterBag};
pub use sql_generation::{GeneratedSql, Placeholder, SqlGenerator};
pub use statement_type::QueryType;
