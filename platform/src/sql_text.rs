//! Lexical helpers over raw SQL text shared by statement classification
//! in the builder and row handling in the backends.

/// Strip leading whitespace, opening parentheses and comments
/// (`-- ...`, `# ...`, `/* ... */`)
pub fn skip_preamble(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = sql.strip_prefix("--").or_else(|| sql.strip_prefix('#')) {
            sql = rest.find('\n').map_or("", |pos| &rest[pos + 1..]);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.find("*/").map_or("", |pos| &rest[pos + 2..]);
        } else {
            return sql;
        }
    }
}

/// First keyword after the preamble, uppercased; empty when there is none
pub fn leading_keyword(sql: &str) -> String {
    skip_preamble(sql)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Whether `word` occurs as a whole word in `sql`, ignoring case
pub fn contains_word(sql: &str, word: &str) -> bool {
    sql.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|w| w.eq_ignore_ascii_case(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_keyword() {
        assert_eq!(leading_keyword("  (select 1)"), "SELECT");
        assert_eq!(leading_keyword("-- all users\nSELECT * FROM users"), "SELECT");
        assert_eq!(leading_keyword("/* a */ /* b */ insert into t"), "INSERT");
        assert_eq!(leading_keyword("# note"), "");
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("INSERT INTO t (a) VALUES (?) RETURNING id", "returning"));
        assert!(!contains_word("SELECT returning_id FROM t", "RETURNING"));
    }
}
