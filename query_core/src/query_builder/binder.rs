//! Query binder
//!
//! Turns individual builder calls into SQL fragments. The binder tracks
//! which clause sections are already open for its builder, so the same call
//! yields `WHERE` the first time and a joining keyword afterwards.

use crate::errors::QueryError;
use crate::query_builder::aggregation::{self, Aggregate};
use crate::query_builder::sql_generation::SqlGenerator;
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use platform::Dialect;
use std::fmt;
use type_mapping::Value;

/// Immutable SQL text produced for one builder call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fragment and the named values it references
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub fragment: Fragment,
    pub parameters: Vec<(String, Value)>,
}

impl Binding {
    fn new(text: String, parameters: Vec<(String, Value)>) -> Self {
        Self {
            fragment: Fragment(text),
            parameters,
        }
    }
}

/// Keyword joining a predicate to the previous one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

/// Logical operator injected by `set_operator`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    /// `||`
    DoublePipe,
    /// `&&`
    DoubleAmpersand,
}

impl Operator {
    pub fn parse(op: &str) -> Option<Operator> {
        match op.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Operator::And),
            "OR" => Some(Operator::Or),
            "||" => Some(Operator::DoublePipe),
            "&&" => Some(Operator::DoubleAmpersand),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::DoublePipe => "||",
            Operator::DoubleAmpersand => "&&",
        }
    }
}

/// Per-builder fragment factory
#[derive(Debug, Clone)]
pub struct QueryBinder {
    dialect: Dialect,
    select_open: bool,
    where_open: bool,
    operator_pending: bool,
}

impl QueryBinder {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            select_open: false,
            where_open: false,
            operator_pending: false,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_select_open(&self) -> bool {
        self.select_open
    }

    pub fn is_where_open(&self) -> bool {
        self.where_open
    }

    /// Mark the where-section open for text the binder did not produce
    pub(crate) fn open_where(&mut self) {
        self.where_open = true;
    }

    /// `SELECT a,b`; an empty column list selects `*`
    pub fn select(&mut self, columns: &[&str]) -> Fragment {
        let list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(",")
        };

        if self.select_open {
            Fragment(format!(",{}", list))
        } else {
            self.select_open = true;
            Fragment(format!("SELECT {}", list))
        }
    }

    /// ` FROM table`, preceded by `SELECT *` when nothing was selected yet
    pub fn from(&mut self, table: &str) -> Fragment {
        if self.select_open {
            Fragment(format!(" FROM {}", table))
        } else {
            self.select_open = true;
            Fragment(format!("SELECT * FROM {}", table))
        }
    }

    /// Wrap an expression with `AS alias` as a select item
    pub fn alias(&mut self, expression: &str, alias: &str) -> Fragment {
        if self.select_open {
            Fragment(format!(", {} AS {}", expression, alias))
        } else {
            self.select_open = true;
            Fragment(format!("SELECT {} AS {}", expression, alias))
        }
    }

    pub fn aggregate(&mut self, function: Aggregate, column: &str, alias: &str) -> Fragment {
        self.alias(&function.apply(column), alias)
    }

    pub fn least(&mut self, arguments: &[&str], alias: &str) -> Option<Fragment> {
        aggregation::least(arguments).map(|expression| self.alias(&expression, alias))
    }

    /// `GROUP_CONCAT` with the separator quoted for the dialect
    pub fn group_concat(&mut self, expression: &str, alias: &str, separator: &str) -> Fragment {
        let literal = self.quote_literal(separator);
        let concat = self.dialect.group_concat(expression, &literal);
        self.alias(&concat, alias)
    }

    /// Comparison predicate `column<op>:column`
    pub fn predicate(&mut self, joiner: Joiner, column: &str, op: &str, value: Value) -> Binding {
        let keyword = self.clause_keyword(joiner);
        let name = SqlGenerator::placeholder_name(column);
        Binding::new(
            format!("{} {}{}:{}", keyword, column, op, name),
            vec![(name, value)],
        )
    }

    /// `column [NOT] IN ( :column , ... )`; `None` for an empty value list
    pub fn in_list(
        &mut self,
        joiner: Joiner,
        column: &str,
        values: Vec<Value>,
        negate: bool,
    ) -> Option<Binding> {
        if values.is_empty() {
            return None;
        }

        let keyword = self.clause_keyword(joiner);
        let name = SqlGenerator::placeholder_name(column);
        let markers = vec![format!(":{}", name); values.len()].join(" , ");
        let parameters = values.into_iter().map(|v| (name.clone(), v)).collect();
        let not = if negate { " NOT" } else { "" };

        Some(Binding::new(
            format!("{} {}{} IN ( {} )", keyword, column, not, markers),
            parameters,
        ))
    }

    /// `column [NOT] BETWEEN :column AND :column`
    pub fn between(
        &mut self,
        joiner: Joiner,
        column: &str,
        low: Value,
        high: Value,
        negate: bool,
    ) -> Binding {
        let keyword = self.clause_keyword(joiner);
        let name = SqlGenerator::placeholder_name(column);
        let not = if negate { " NOT" } else { "" };
        Binding::new(
            format!("{} {}{} BETWEEN :{} AND :{}", keyword, column, not, name, name),
            vec![(name.clone(), low), (name, high)],
        )
    }

    /// `column [NOT] LIKE :column`
    pub fn like(&mut self, joiner: Joiner, column: &str, pattern: Value, negate: bool) -> Binding {
        let keyword = self.clause_keyword(joiner);
        let name = SqlGenerator::placeholder_name(column);
        let not = if negate { " NOT" } else { "" };
        Binding::new(
            format!("{} {}{} LIKE :{}", keyword, column, not, name),
            vec![(name, pattern)],
        )
    }

    /// Inject a logical operator; the next predicate omits its own keyword.
    ///
    /// Yields nothing until a `WHERE` section is open, since an operator
    /// cannot join the first condition.
    pub fn operator(&mut self, operator: Operator) -> Option<Fragment> {
        if !self.where_open {
            return None;
        }
        self.operator_pending = true;
        Some(Fragment(format!(" {}", operator.as_sql())))
    }

    pub fn limit(&self, limit: u64, offset: u64) -> Fragment {
        if offset > 0 {
            Fragment(format!(" LIMIT {} OFFSET {}", limit, offset))
        } else {
            Fragment(format!(" LIMIT {}", limit))
        }
    }

    pub fn order_by(&self, columns: &[&str]) -> Fragment {
        Fragment(format!(" ORDER BY {}", columns.join(",")))
    }

    pub fn order_by_field(&self, columns: &[&str]) -> Fragment {
        Fragment(format!(" ORDER BY FIELD({})", columns.join(",")))
    }

    /// `INSERT INTO table (a,b) VALUES ( :a , :b )`
    pub fn insert(&self, table: &str, fields: Vec<(String, Value)>) -> Result<Binding, QueryError> {
        let table = ValidatedTableName::new(table)?;
        let fields = Self::validate_fields(fields)?;

        let columns: Vec<&str> = fields.iter().map(|(f, _)| f.as_str()).collect();
        let markers: Vec<String> = fields.iter().map(|(f, _)| format!(":{}", f)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ( {} )",
            table,
            columns.join(","),
            markers.join(" , ")
        );
        Ok(Binding::new(sql, fields))
    }

    /// `UPDATE table SET a=:a , b=:b`
    pub fn update(&self, table: &str, fields: Vec<(String, Value)>) -> Result<Binding, QueryError> {
        let table = ValidatedTableName::new(table)?;
        let fields = Self::validate_fields(fields)?;

        let assignments: Vec<String> = fields
            .iter()
            .map(|(f, _)| format!("{}=:{}", f, f))
            .collect();
        let sql = format!("UPDATE {} SET {}", table, assignments.join(" , "));
        Ok(Binding::new(sql, fields))
    }

    /// `DELETE FROM table`
    pub fn delete(&self, table: &str) -> Result<Fragment, QueryError> {
        let table = ValidatedTableName::new(table)?;
        Ok(Fragment(format!("DELETE FROM {}", table)))
    }

    fn validate_fields(fields: Vec<(String, Value)>) -> Result<Vec<(String, Value)>, QueryError> {
        if fields.is_empty() {
            return Err(QueryError::validation("at least one field is required"));
        }
        for (field, _) in &fields {
            ValidatedFieldName::new(field)?;
        }
        Ok(fields)
    }

    fn clause_keyword(&mut self, joiner: Joiner) -> &'static str {
        if self.operator_pending {
            self.operator_pending = false;
            self.where_open = true;
            return "";
        }
        if !self.where_open {
            self.where_open = true;
            return " WHERE";
        }
        match joiner {
            Joiner::And => " AND",
            Joiner::Or => " OR",
        }
    }

    fn quote_literal(&self, text: &str) -> String {
        let mut escaped = text.replace('\'', "''");
        if self.dialect == Dialect::MySql {
            escaped = escaped.replace('\\', "\\\\");
        }
        format!("'{}'", escaped)
    }
}
