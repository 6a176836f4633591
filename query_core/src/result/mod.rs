//! Materialized query results.

pub mod collection;
pub mod mapper;
pub mod record;
pub mod row;

pub use collection::{Collection, Group};
pub use mapper::{AsAny, MapperFactory, ResultMapper, ResultRow};
pub use record::{IntoFields, Record};
pub use row::{FieldAccess, Row};
