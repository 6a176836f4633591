//! SQL generation
//!
//! Rewrites named placeholders (`:name`) into positional markers (`?`) and
//! checks every placeholder against the parameter bag.

use crate::errors::QueryError;
use crate::query_builder::parameters::ParameterBag;
use std::collections::HashMap;

/// Rewritten query and the parameter name behind each placeholder, in text order
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSql {
    pub query: String,
    pub binding_order: Vec<String>,
}

/// A `:name` occurrence in query text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    /// Byte offset of the colon
    pub start: usize,
    /// Byte offset one past the name
    pub end: usize,
}

pub struct SqlGenerator;

impl SqlGenerator {
    /// Rewrite `query` against `bag`.
    ///
    /// Each placeholder becomes one `?`, except a list slot referenced
    /// exactly once, which expands to one marker per value. A list slot
    /// referenced several times must hold exactly one value per reference.
    pub fn convert_to_sql(query: &str, bag: &ParameterBag) -> Result<GeneratedSql, QueryError> {
        let placeholders = Self::placeholders(query);
        if placeholders.is_empty() {
            return Ok(GeneratedSql {
                query: query.to_string(),
                binding_order: Vec::new(),
            });
        }

        let mut unmatched: Vec<String> = Vec::new();
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for placeholder in &placeholders {
            *occurrences.entry(placeholder.name).or_insert(0) += 1;
            if !bag.contains(placeholder.name) && !unmatched.iter().any(|n| n == placeholder.name) {
                unmatched.push(placeholder.name.to_string());
            }
        }

        if !unmatched.is_empty() {
            return Err(QueryError::ParameterMismatch {
                unmatched,
                parameters: bag.get_all().to_vec(),
            });
        }

        let mut rewritten = String::with_capacity(query.len());
        let mut binding_order = Vec::with_capacity(placeholders.len());
        let mut cursor = 0;

        for placeholder in &placeholders {
            let count = occurrences[placeholder.name];
            let markers = match bag.get_parameter(placeholder.name) {
                Some(slot) if slot.is_list() => {
                    let expected = if count == 1 { slot.len().max(1) } else { count };
                    if slot.len() != expected {
                        return Err(QueryError::PlaceholderCount {
                            name: placeholder.name.to_string(),
                            occurrences: count,
                            values: slot.len(),
                        });
                    }
                    if count == 1 { slot.len() } else { 1 }
                }
                _ => 1,
            };

            rewritten.push_str(&query[cursor..placeholder.start]);
            rewritten.push_str(&vec!["?"; markers].join(", "));
            cursor = placeholder.end;
            binding_order.push(placeholder.name.to_string());
        }
        rewritten.push_str(&query[cursor..]);

        Ok(GeneratedSql {
            query: rewritten,
            binding_order,
        })
    }

    /// Every `:name` in `query`, in text order.
    ///
    /// A name is the run of non-whitespace characters after the colon. `::`
    /// and text inside quoted literals or identifiers are left alone.
    pub fn placeholders(query: &str) -> Vec<Placeholder<'_>> {
        let bytes = query.as_bytes();
        let mut found = Vec::new();
        let mut quote: Option<u8> = None;
        let mut i = 0;

        while i < bytes.len() {
            let b = bytes[i];

            if let Some(q) = quote {
                if b == b'\\' && q != b'`' {
                    i += 2;
                    continue;
                }
                if b == q {
                    quote = None;
                }
                i += 1;
                continue;
            }

            match b {
                b'\'' | b'"' | b'`' => {
                    quote = Some(b);
                    i += 1;
                }
                b':' if bytes.get(i + 1) == Some(&b':') => {
                    i += 2;
                }
                b':' => {
                    let name_start = i + 1;
                    let name_end = query[name_start..]
                        .find(char::is_whitespace)
                        .map_or(query.len(), |offset| name_start + offset);
                    if name_end > name_start {
                        found.push(Placeholder {
                            name: &query[name_start..name_end],
                            start: i,
                            end: name_end,
                        });
                    }
                    i = name_end.max(i + 1);
                }
                _ => i += 1,
            }
        }

        found
    }

    /// Placeholder name for a column: characters outside `[A-Za-z0-9_]` become `_`
    pub fn placeholder_name(column: &str) -> String {
        column
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_builder::parameters::ParamSlot;
    use type_mapping::Value;

    fn bag(pairs: &[(&str, Value)]) -> ParameterBag {
        let mut bag = ParameterBag::new();
        for (name, value) in pairs {
            bag.set_parameter(name, value.clone(), false);
        }
        bag
    }

    #[test]
    fn test_no_placeholders() {
        let generated = SqlGenerator::convert_to_sql("SELECT 1", &ParameterBag::new()).unwrap();
        assert_eq!(generated.query, "SELECT 1");
        assert!(generated.binding_order.is_empty());
    }

    #[test]
    fn test_rewrite_in_text_order() {
        let bag = bag(&[("b", Value::from(2)), ("a", Value::from(1))]);
        let generated =
            SqlGenerator::convert_to_sql("SELECT * FROM t WHERE a=:a AND b=:b", &bag).unwrap();
        assert_eq!(generated.query, "SELECT * FROM t WHERE a=? AND b=?");
        assert_eq!(generated.binding_order, vec!["a", "b"]);
    }

    #[test]
    fn test_unmatched_names_are_reported() {
        let bag = bag(&[("a", Value::from(1))]);
        let err = SqlGenerator::convert_to_sql("WHERE a=:a AND b=:b OR c=:c AND b=:b", &bag)
            .unwrap_err();
        match err {
            QueryError::ParameterMismatch {
                unmatched,
                parameters,
            } => {
                assert_eq!(unmatched, vec!["b", "c"]);
                assert_eq!(
                    parameters,
                    vec![("a".to_string(), ParamSlot::Single(Value::from(1)))]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_name_runs_to_next_whitespace() {
        let bag = bag(&[("a", Value::from(1))]);
        let err = SqlGenerator::convert_to_sql("INSERT INTO t (a) VALUES (:a)", &bag).unwrap_err();
        assert!(matches!(
            err,
            QueryError::ParameterMismatch { ref unmatched, .. } if unmatched == &vec!["a)".to_string()]
        ));

        let generated =
            SqlGenerator::convert_to_sql("INSERT INTO t (a) VALUES ( :a )", &bag).unwrap();
        assert_eq!(generated.query, "INSERT INTO t (a) VALUES ( ? )");
    }

    #[test]
    fn test_scalar_reused_at_every_occurrence() {
        let bag = bag(&[("x", Value::from(1))]);
        let generated = SqlGenerator::convert_to_sql("a=:x OR b=:x", &bag).unwrap();
        assert_eq!(generated.query, "a=? OR b=?");
        assert_eq!(generated.binding_order, vec!["x", "x"]);
    }

    #[test]
    fn test_list_referenced_once_expands() {
        let mut bag = ParameterBag::new();
        bag.set_list("ids", vec![Value::from(1), Value::from(2), Value::from(3)], false);
        let generated = SqlGenerator::convert_to_sql("id IN ( :ids )", &bag).unwrap();
        assert_eq!(generated.query, "id IN ( ?, ?, ? )");
        assert_eq!(generated.binding_order, vec!["ids"]);
    }

    #[test]
    fn test_list_referenced_per_value() {
        let bag = bag(&[("id", Value::from(1)), ("id", Value::from(2))]);
        let generated = SqlGenerator::convert_to_sql("id=:id OR id=:id", &bag).unwrap();
        assert_eq!(generated.query, "id=? OR id=?");
        assert_eq!(generated.binding_order, vec!["id", "id"]);
    }

    #[test]
    fn test_list_count_mismatch() {
        let bag = bag(&[
            ("id", Value::from(1)),
            ("id", Value::from(2)),
            ("id", Value::from(3)),
        ]);
        let err = SqlGenerator::convert_to_sql("id=:id OR id=:id", &bag).unwrap_err();
        assert_eq!(
            err,
            QueryError::PlaceholderCount {
                name: "id".to_string(),
                occurrences: 2,
                values: 3
            }
        );
    }

    #[test]
    fn test_empty_list_is_rejected() {
        let mut bag = ParameterBag::new();
        bag.set_list("ids", Vec::new(), false);
        assert!(matches!(
            SqlGenerator::convert_to_sql("id IN ( :ids )", &bag),
            Err(QueryError::PlaceholderCount { values: 0, .. })
        ));
    }

    #[test]
    fn test_literals_and_casts_are_skipped() {
        let bag = bag(&[("id", Value::from(1))]);
        let generated = SqlGenerator::convert_to_sql(
            "SELECT '10:30', x::int, GROUP_CONCAT(n SEPARATOR ':') FROM t WHERE id=:id",
            &bag,
        )
        .unwrap();
        assert_eq!(
            generated.query,
            "SELECT '10:30', x::int, GROUP_CONCAT(n SEPARATOR ':') FROM t WHERE id=?"
        );
    }

    #[test]
    fn test_placeholder_name() {
        assert_eq!(SqlGenerator::placeholder_name("users.id"), "users_id");
        assert_eq!(SqlGenerator::placeholder_name("age"), "age");
    }
}
