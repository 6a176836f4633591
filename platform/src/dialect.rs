//! SQL dialect differences the query builder has to care about.

/// Dialect family of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    MySql,
    Sqlite,
    Generic,
}

impl Dialect {
    /// Dialect for a backend identifier as used in connection profiles
    pub fn from_backend(backend: &str) -> Self {
        match backend.to_ascii_lowercase().as_str() {
            "mysql" | "mysqli" | "mariadb" => Dialect::MySql,
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            _ => Dialect::Generic,
        }
    }

    /// Render `GROUP_CONCAT(column <sep>)`; `separator` must already be a quoted literal
    pub fn group_concat(&self, column: &str, separator: &str) -> String {
        match self {
            Dialect::MySql => format!("GROUP_CONCAT({} SEPARATOR {})", column, separator),
            Dialect::Sqlite | Dialect::Generic => {
                format!("GROUP_CONCAT({}, {})", column, separator)
            }
        }
    }
}
