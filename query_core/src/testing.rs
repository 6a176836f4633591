//! In-memory connection that records every call, for processor and builder tests.

use config::ConnectionProfile;
use platform::{
    BackendError, Connection, Connector, Dialect, Platform, PreparedStatement, ResultSet,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A call observed by [`RecordingConnection`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Begin,
    Commit,
    Rollback,
    Execute(PreparedStatement),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    responses: VecDeque<Result<ResultSet, BackendError>>,
    fail_rollback: bool,
    fail_commit: bool,
}

/// Shared view of the calls made through a recording connection
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<State>>);

impl Journal {
    /// Queue the result of the next `execute`
    pub fn respond(&self, response: Result<ResultSet, BackendError>) -> &Self {
        self.0.lock().unwrap().responses.push_back(response);
        self
    }

    pub fn fail_commit(&self) {
        self.0.lock().unwrap().fail_commit = true;
    }

    pub fn fail_rollback(&self) {
        self.0.lock().unwrap().fail_rollback = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    /// Statements passed to `execute`, in order
    pub fn statements(&self) -> Vec<PreparedStatement> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(statement) => Some(statement),
                _ => None,
            })
            .collect()
    }

    /// Begin/commit/rollback/execute tags in order
    pub fn tags(&self) -> Vec<&'static str> {
        self.calls()
            .iter()
            .map(|call| match call {
                Call::Begin => "begin",
                Call::Commit => "commit",
                Call::Rollback => "rollback",
                Call::Execute(_) => "execute",
            })
            .collect()
    }
}

pub struct RecordingConnection {
    journal: Journal,
}

impl Connection for RecordingConnection {
    fn begin_transaction(&mut self) -> Result<(), BackendError> {
        self.journal.0.lock().unwrap().calls.push(Call::Begin);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        let mut state = self.journal.0.lock().unwrap();
        state.calls.push(Call::Commit);
        if state.fail_commit {
            return Err(BackendError::Transaction("commit refused".to_string()));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BackendError> {
        let mut state = self.journal.0.lock().unwrap();
        state.calls.push(Call::Rollback);
        if state.fail_rollback {
            return Err(BackendError::Transaction("rollback refused".to_string()));
        }
        Ok(())
    }

    fn execute(&mut self, statement: &PreparedStatement) -> Result<ResultSet, BackendError> {
        let mut state = self.journal.0.lock().unwrap();
        state.calls.push(Call::Execute(statement.clone()));
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::affected(1, None)))
    }
}

/// Connector handing out recording connections that share one journal
pub struct RecordingConnector {
    journal: Journal,
}

impl Connector for RecordingConnector {
    fn backend(&self) -> &str {
        "memory"
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn connect(&self, _: &ConnectionProfile) -> Result<Box<dyn Connection>, BackendError> {
        Ok(Box::new(RecordingConnection {
            journal: self.journal.clone(),
        }))
    }
}

/// A MySQL-dialect platform over a recording connection
pub fn platform(auto_commit: bool) -> (Platform, Journal) {
    let journal = Journal::default();
    let connector = RecordingConnector {
        journal: journal.clone(),
    };
    let profile = ConnectionProfile::new("memory", "test").with_auto_commit(auto_commit);
    let connection = connector.connect(&profile).unwrap();
    let platform = Platform::new(
        "test",
        connector.backend(),
        profile.auto_commit,
        connector.dialect(),
        connection,
    );
    (platform, journal)
}

/// Result set with the given columns and rows
pub fn rows(columns: &[&str], rows: Vec<Vec<type_mapping::Value>>) -> ResultSet {
    ResultSet::with_rows(columns.iter().map(|c| c.to_string()).collect(), rows)
}
