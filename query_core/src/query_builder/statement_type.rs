//! Query type tags and statement type detection for raw SQL.

use platform::sql_text::leading_keyword;
use serde::Serialize;
use std::fmt;

/// Logical kind of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum QueryType {
    #[default]
    None,
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryType {
    /// Detect the statement type from the leading keyword of `sql`.
    ///
    /// Leading whitespace, opening parentheses and comments (`-- ...`,
    /// `# ...`, `/* ... */`) are skipped. Unknown keywords yield `None`.
    pub fn detect(sql: &str) -> QueryType {
        match leading_keyword(sql).as_str() {
            "SELECT" | "WITH" => QueryType::Select,
            "INSERT" | "REPLACE" => QueryType::Insert,
            "UPDATE" => QueryType::Update,
            "DELETE" => QueryType::Delete,
            _ => QueryType::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::None => "NONE",
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, QueryType::None)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(QueryType::detect("SELECT * FROM t"), QueryType::Select);
        assert_eq!(QueryType::detect("  select 1"), QueryType::Select);
        assert_eq!(QueryType::detect("(SELECT 1) UNION (SELECT 2)"), QueryType::Select);
        assert_eq!(QueryType::detect("insert into t values (1)"), QueryType::Insert);
        assert_eq!(QueryType::detect("UPDATE t SET a = 1"), QueryType::Update);
        assert_eq!(QueryType::detect("DELETE FROM t"), QueryType::Delete);
        assert_eq!(QueryType::detect("CREATE TABLE t (a INT)"), QueryType::None);
        assert_eq!(QueryType::detect(""), QueryType::None);
    }

    #[test]
    fn test_detect_skips_comments() {
        assert_eq!(
            QueryType::detect("-- fetch users\nSELECT * FROM users"),
            QueryType::Select
        );
        assert_eq!(
            QueryType::detect("/* audit */ DELETE FROM logs"),
            QueryType::Delete
        );
        assert_eq!(QueryType::detect("# note\n UPDATE t SET a = 1"), QueryType::Update);
        assert_eq!(QueryType::detect("/* unterminated"), QueryType::None);
    }
}
