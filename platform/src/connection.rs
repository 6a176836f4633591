//! Backend capability contract
//!
//! A backend is reached through a [`Connector`], which opens a
//! [`Connection`] for a connection profile. Connections are synchronous and
//! single-threaded from the caller's point of view: every call blocks until
//! the backend has answered.

use crate::dialect::Dialect;
use crate::errors::BackendError;
use config::ConnectionProfile;
use type_mapping::{Value, WireType};

/// A value together with the wire type it is sent as
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    pub value: Value,
    pub wire_type: WireType,
}

/// Rewritten SQL with its positional parameters in marker order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedStatement {
    pub sql: String,
    pub params: Vec<BoundParameter>,
}

impl PreparedStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append a positional parameter
    pub fn bind(mut self, value: Value, wire_type: WireType) -> Self {
        self.params.push(BoundParameter { value, wire_type });
        self
    }

    /// Type codes of all parameters in order, e.g. `"sid"`
    pub fn type_string(&self) -> String {
        self.params.iter().map(|p| p.wire_type.code()).collect()
    }

    pub fn marker_count(&self) -> usize {
        self.params.len()
    }
}

/// Rows and counters produced by one execution
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    rows_affected: u64,
    last_insert_id: Option<i64>,
}

impl ResultSet {
    /// Result of a statement that produced rows
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: 0,
            last_insert_id: None,
        }
    }

    /// Result of a statement that only changed data
    pub fn affected(rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            rows_affected,
            last_insert_id,
        }
    }

    /// Column names in result order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }

    /// Consume into column names and rows
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}

/// A live backend connection
pub trait Connection: Send {
    fn begin_transaction(&mut self) -> Result<(), BackendError>;

    fn commit(&mut self) -> Result<(), BackendError>;

    fn rollback(&mut self) -> Result<(), BackendError>;

    /// Prepare `statement.sql`, bind its parameters and execute it
    fn execute(&mut self, statement: &PreparedStatement) -> Result<ResultSet, BackendError>;
}

/// Opens connections for one backend identifier
pub trait Connector: Send + Sync {
    /// Backend identifier matched against `ConnectionProfile::backend`
    fn backend(&self) -> &str;

    fn dialect(&self) -> Dialect {
        Dialect::from_backend(self.backend())
    }

    fn connect(&self, profile: &ConnectionProfile) -> Result<Box<dyn Connection>, BackendError>;
}
