//! sqlx-backed connector
//!
//! Uses sqlx's `Any` driver so one implementation serves MySQL and SQLite.
//! Each connection owns a current-thread tokio runtime and blocks on it, so
//! callers see a plain synchronous connection.

use crate::connection::{Connection, Connector, PreparedStatement, ResultSet};
use crate::dialect::Dialect;
use crate::errors::BackendError;
use config::ConnectionProfile;
use crate::sql_text::{contains_word, leading_keyword};
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, Column, Executor, Row, Statement};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;
use type_mapping::Value;

/// Connector for one sqlx backend (`mysql` or `sqlite`)
#[derive(Debug, Clone)]
pub struct SqlxConnector {
    backend: String,
}

impl SqlxConnector {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
        }
    }

    pub fn mysql() -> Self {
        Self::new("mysql")
    }

    pub fn sqlite() -> Self {
        Self::new("sqlite")
    }
}

impl Connector for SqlxConnector {
    fn backend(&self) -> &str {
        &self.backend
    }

    fn dialect(&self) -> Dialect {
        Dialect::from_backend(&self.backend)
    }

    fn connect(&self, profile: &ConnectionProfile) -> Result<Box<dyn Connection>, BackendError> {
        Ok(Box::new(SqlxConnection::open(profile)?))
    }
}

/// A blocking sqlx connection
pub struct SqlxConnection {
    runtime: Runtime,
    connection: AnyConnection,
    dialect: Dialect,
}

impl SqlxConnection {
    /// Open a connection for the profile
    pub fn open(profile: &ConnectionProfile) -> Result<Self, BackendError> {
        sqlx::any::install_default_drivers();

        debug!(
            backend = %profile.backend,
            host = %profile.host,
            database = %profile.database,
            "Opening sqlx connection"
        );

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BackendError::Connect(format!("Failed to start runtime: {}", e)))?;

        let url = profile.connection_url();
        let connection = runtime
            .block_on(<AnyConnection as sqlx::Connection>::connect(&url))
            .map_err(|e| BackendError::Connect(e.to_string()))?;

        Ok(Self {
            runtime,
            connection,
            dialect: Dialect::from_backend(&profile.backend),
        })
    }

    fn run_control(&mut self, sql: &str) -> Result<(), BackendError> {
        let Self {
            runtime,
            connection,
            ..
        } = self;
        runtime
            .block_on(sqlx::raw_sql(sql).execute(&mut *connection))
            .map(|_| ())
            .map_err(|e| BackendError::Transaction(format!("{}: {}", sql, e)))
    }
}

impl Connection for SqlxConnection {
    fn begin_transaction(&mut self) -> Result<(), BackendError> {
        self.run_control("BEGIN")
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.run_control("COMMIT")
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        self.run_control("ROLLBACK")
    }

    fn execute(&mut self, statement: &PreparedStatement) -> Result<ResultSet, BackendError> {
        let query = bind_all(sqlx::query(&statement.sql), statement)?;
        let Self {
            runtime,
            connection,
            dialect,
        } = self;

        if returns_rows(&statement.sql) {
            let rows = runtime
                .block_on(query.fetch_all(&mut *connection))
                .map_err(|e| BackendError::Execute(e.to_string()))?;
            if rows.is_empty() {
                let columns = describe_columns(runtime, connection, &statement.sql);
                return Ok(ResultSet::with_rows(columns, Vec::new()));
            }
            return decode_rows(&rows);
        }

        let done = runtime
            .block_on(query.execute(&mut *connection))
            .map_err(|e| BackendError::Execute(e.to_string()))?;

        // The Any driver does not report the SQLite rowid
        let mut last_insert_id = done.last_insert_id;
        if last_insert_id.is_none()
            && *dialect == Dialect::Sqlite
            && done.rows_affected() > 0
            && matches!(leading_keyword(&statement.sql).as_str(), "INSERT" | "REPLACE")
        {
            let rowid = runtime
                .block_on(
                    sqlx::query_scalar::<_, i64>("SELECT last_insert_rowid()")
                        .fetch_one(&mut *connection),
                )
                .map_err(|e| BackendError::Execute(e.to_string()))?;
            last_insert_id = Some(rowid);
        }

        Ok(ResultSet::affected(done.rows_affected(), last_insert_id))
    }
}

/// Column names of a statement that produced no rows to read them from.
///
/// Falls back to no columns when the backend cannot describe the statement.
fn describe_columns(runtime: &Runtime, connection: &mut AnyConnection, sql: &str) -> Vec<String> {
    match runtime.block_on(Executor::prepare(&mut *connection, sql)) {
        Ok(prepared) => prepared
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        Err(e) => {
            debug!(error = %e, "Could not describe result columns");
            Vec::new()
        }
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    statement: &PreparedStatement,
) -> Result<Query<'q, Any, AnyArguments<'q>>, BackendError> {
    for (position, param) in statement.params.iter().enumerate() {
        query = match &param.value {
            Value::Text(s) => query.bind(s.clone()),
            Value::Integer(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            other => {
                return Err(BackendError::Prepare(format!(
                    "parameter {} has unsupported type {}",
                    position + 1,
                    other.kind()
                )));
            }
        };
    }
    Ok(query)
}

/// Whether the statement produces a row set
fn returns_rows(sql: &str) -> bool {
    matches!(
        leading_keyword(sql).as_str(),
        "SELECT" | "WITH" | "SHOW" | "PRAGMA" | "EXPLAIN" | "DESCRIBE" | "VALUES"
    ) || contains_word(sql, "RETURNING")
}

fn decode_rows(rows: &[AnyRow]) -> Result<ResultSet, BackendError> {
    let columns: Vec<String> = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        None => Vec::new(),
    };

    let mut decoded = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(columns.len());
        for index in 0..columns.len() {
            cells.push(decode_cell(row, index, &columns[index])?);
        }
        decoded.push(cells);
    }

    Ok(ResultSet::with_rows(columns, decoded))
}

fn decode_cell(row: &AnyRow, index: usize, column: &str) -> Result<Value, BackendError> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return Ok(v.map(Value::Integer).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return Ok(v.map(Value::Float).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return Ok(v.map(Value::Text).unwrap_or(Value::Null));
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return Ok(v.map(Value::Boolean).unwrap_or(Value::Null));
    }
    Err(BackendError::Decode(format!(
        "column '{}' has a type that cannot be decoded",
        column
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_rows() {
        assert!(returns_rows("SELECT * FROM t"));
        assert!(returns_rows("  (select 1)"));
        assert!(returns_rows("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(!returns_rows("INSERT INTO t (a) VALUES (?)"));
        assert!(!returns_rows("DELETE FROM t"));
        assert!(returns_rows("-- all users\nSELECT * FROM users"));
        assert!(returns_rows("/* report */ SELECT 1"));
        assert!(returns_rows("INSERT INTO t (a) VALUES (?) RETURNING id"));
    }

    #[test]
    fn test_sqlite_round_trip() {
        let profile = ConnectionProfile::new("sqlite", "sqlite::memory:");
        let mut conn = SqlxConnection::open(&profile).unwrap();

        conn.execute(&PreparedStatement::new(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, score REAL)",
        ))
        .unwrap();

        let inserted = conn
            .execute(
                &PreparedStatement::new("INSERT INTO people (name, score) VALUES (?, ?)")
                    .bind(Value::from("Ann"), type_mapping::WireType::String)
                    .bind(Value::from(9.5), type_mapping::WireType::Float),
            )
            .unwrap();
        assert_eq!(inserted.rows_affected(), 1);
        assert_eq!(inserted.last_insert_id(), Some(1));

        let rs = conn
            .execute(&PreparedStatement::new("SELECT id, name, score FROM people"))
            .unwrap();
        assert_eq!(rs.columns(), ["id", "name", "score"]);
        assert_eq!(
            rs.rows()[0],
            vec![Value::Integer(1), Value::from("Ann"), Value::Float(9.5)]
        );
    }

    #[test]
    fn test_empty_result_keeps_columns() {
        let profile = ConnectionProfile::new("sqlite", "sqlite::memory:");
        let mut conn = SqlxConnection::open(&profile).unwrap();
        conn.execute(&PreparedStatement::new("CREATE TABLE t (a INTEGER, b TEXT)"))
            .unwrap();

        let rs = conn
            .execute(&PreparedStatement::new("SELECT a, b FROM t"))
            .unwrap();
        assert_eq!(rs.row_count(), 0);
        assert_eq!(rs.columns(), ["a", "b"]);
    }

    #[test]
    fn test_rollback_discards_changes() {
        let profile = ConnectionProfile::new("sqlite", "sqlite::memory:");
        let mut conn = SqlxConnection::open(&profile).unwrap();
        conn.execute(&PreparedStatement::new("CREATE TABLE t (a INTEGER)"))
            .unwrap();

        conn.begin_transaction().unwrap();
        conn.execute(&PreparedStatement::new("INSERT INTO t (a) VALUES (1)"))
            .unwrap();
        conn.rollback().unwrap();

        let rs = conn
            .execute(&PreparedStatement::new("SELECT COUNT(*) AS n FROM t"))
            .unwrap();
        assert_eq!(rs.rows()[0][0], Value::Integer(0));
    }
}
