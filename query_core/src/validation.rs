//! Identifier validation
//!
//! Table and column names are spliced into SQL text as-is, so the builder
//! checks every identifier it receives for write statements.

use std::fmt;
use thiserror::Error;

/// MySQL identifier length limit, applied per segment
const MAX_SEGMENT_LENGTH: usize = 64;

/// Statement-level keywords that can never be used unquoted as identifiers
const RESERVED_KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "REPLACE", "FROM", "WHERE", "JOIN", "ON", "AS", "AND",
    "OR", "NOT", "NULL", "IN", "LIKE", "BETWEEN", "ORDER", "BY", "GROUP", "HAVING", "LIMIT",
    "OFFSET", "UNION", "DISTINCT", "CREATE", "DROP", "ALTER", "TABLE", "INTO", "VALUES", "SET",
    "BEGIN", "COMMIT", "ROLLBACK",
];

/// What an identifier names, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Table,
    Field,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Table => f.write_str("table"),
            IdentifierKind::Field => f.write_str("field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{kind} name cannot be empty")]
    Empty { kind: IdentifierKind },

    #[error("{kind} name '{name}' may only contain letters, digits and underscores")]
    InvalidCharacters { kind: IdentifierKind, name: String },

    #[error("{kind} name '{name}' must start with a letter or underscore")]
    InvalidStart { kind: IdentifierKind, name: String },

    #[error("{kind} name '{name}' is {length} characters long (max {max})", max = MAX_SEGMENT_LENGTH)]
    TooLong {
        kind: IdentifierKind,
        name: String,
        length: usize,
    },

    #[error("{kind} name '{name}' is a reserved SQL keyword")]
    ReservedKeyword { kind: IdentifierKind, name: String },
}

/// Check one unqualified identifier segment
fn check_segment(kind: IdentifierKind, segment: &str) -> Result<(), ValidationError> {
    let first = segment
        .chars()
        .next()
        .ok_or(ValidationError::Empty { kind })?;
    let name = || segment.to_string();

    if segment.len() > MAX_SEGMENT_LENGTH {
        return Err(ValidationError::TooLong {
            kind,
            name: name(),
            length: segment.len(),
        });
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(ValidationError::InvalidStart { kind, name: name() });
    }
    if !segment.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(ValidationError::InvalidCharacters { kind, name: name() });
    }
    if RESERVED_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(segment))
    {
        return Err(ValidationError::ReservedKeyword { kind, name: name() });
    }
    Ok(())
}

/// A table name, optionally qualified by a database (`app.users`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let kind = IdentifierKind::Table;
        match name.split_once('.') {
            Some((database, table)) => {
                check_segment(kind, database)?;
                check_segment(kind, table)?;
            }
            None => check_segment(kind, name)?,
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A column name used in an insert or update; never qualified, since it
/// doubles as the placeholder name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedFieldName(String);

impl ValidatedFieldName {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        check_segment(IdentifierKind::Field, name)?;
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        let long = "t".repeat(MAX_SEGMENT_LENGTH);
        for name in ["users", "user_profiles", "_audit", "t1", "app.users", long.as_str()] {
            assert!(ValidatedTableName::new(name).is_ok(), "rejected {}", name);
        }
    }

    #[test]
    fn test_invalid_table_names() {
        let table = IdentifierKind::Table;
        let cases = [
            ("", ValidationError::Empty { kind: table }),
            ("app.", ValidationError::Empty { kind: table }),
            (
                "1users",
                ValidationError::InvalidStart {
                    kind: table,
                    name: "1users".to_string(),
                },
            ),
            (
                "users; DROP TABLE users",
                ValidationError::InvalidCharacters {
                    kind: table,
                    name: "users; DROP TABLE users".to_string(),
                },
            ),
            (
                "a.b.c",
                ValidationError::InvalidCharacters {
                    kind: table,
                    name: "b.c".to_string(),
                },
            ),
            (
                "Select",
                ValidationError::ReservedKeyword {
                    kind: table,
                    name: "Select".to_string(),
                },
            ),
        ];

        for (name, expected) in cases {
            assert_eq!(ValidatedTableName::new(name), Err(expected), "name: {:?}", name);
        }
    }

    #[test]
    fn test_segment_length() {
        let name = format!("app.{}", "t".repeat(MAX_SEGMENT_LENGTH + 1));
        assert!(matches!(
            ValidatedTableName::new(&name),
            Err(ValidationError::TooLong { length: 65, .. })
        ));
    }

    #[test]
    fn test_field_names() {
        for name in ["name", "age", "date", "status", "key", "text"] {
            assert!(ValidatedFieldName::new(name).is_ok(), "{}", name);
        }
        let err = ValidatedFieldName::new("users.id").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field name 'users.id' may only contain letters, digits and underscores"
        );
    }
}
