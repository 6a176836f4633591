//! The resolved backend a query builder is bound to.

use crate::connection::{Connection, PreparedStatement, ResultSet};
use crate::dialect::Dialect;
use crate::errors::BackendError;
use tracing::warn;

/// A live connection together with the settings of the profile it came from
pub struct Platform {
    profile: String,
    backend: String,
    auto_commit: bool,
    dialect: Dialect,
    connection: Box<dyn Connection>,
}

impl Platform {
    pub fn new(
        profile: impl Into<String>,
        backend: impl Into<String>,
        auto_commit: bool,
        dialect: Dialect,
        connection: Box<dyn Connection>,
    ) -> Self {
        Self {
            profile: profile.into(),
            backend: backend.into(),
            auto_commit,
            dialect,
            connection,
        }
    }

    /// Backend identifier (`mysql`, `sqlite`, ...)
    pub fn name(&self) -> &str {
        &self.backend
    }

    /// Name of the profile the platform was resolved from
    pub fn profile_name(&self) -> &str {
        &self.profile
    }

    pub fn is_autocommit_enabled(&self) -> bool {
        self.auto_commit
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Execute outside any explicit transaction
    pub fn execute(&mut self, statement: &PreparedStatement) -> Result<ResultSet, BackendError> {
        self.connection.execute(statement)
    }

    /// Begin an explicit transaction
    pub fn begin_transaction(&mut self) -> Result<Transaction<'_>, BackendError> {
        self.connection.begin_transaction()?;
        Ok(Transaction {
            connection: self.connection.as_mut(),
            finished: false,
        })
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("profile", &self.profile)
            .field("backend", &self.backend)
            .field("auto_commit", &self.auto_commit)
            .field("dialect", &self.dialect)
            .finish()
    }
}

/// An open explicit transaction
///
/// Dropping the transaction without calling [`Transaction::commit`] or
/// [`Transaction::rollback`] rolls it back.
///
/// # Example
/// ```ignore
/// let mut tx = platform.begin_transaction()?;
/// tx.execute(&statement)?;
/// tx.commit()?;
/// ```
pub struct Transaction<'a> {
    connection: &'a mut dyn Connection,
    finished: bool,
}

impl Transaction<'_> {
    pub fn execute(&mut self, statement: &PreparedStatement) -> Result<ResultSet, BackendError> {
        self.connection.execute(statement)
    }

    /// Commit the transaction; a failed commit leaves it to be rolled back on drop
    pub fn commit(mut self) -> Result<(), BackendError> {
        self.connection.commit()?;
        self.finished = true;
        Ok(())
    }

    /// Rollback the transaction
    pub fn rollback(mut self) -> Result<(), BackendError> {
        self.finished = true;
        self.connection.rollback()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.connection.rollback() {
                warn!(error = %e, "Rollback of abandoned transaction failed");
            }
        }
    }
}
