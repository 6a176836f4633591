//! Query builder
//!
//! The public fluent surface. Every call asks the binder for a fragment,
//! appends it to the accumulated SQL and registers any value in the
//! parameter bag. Terminals consume the builder and hand the query to the
//! processor.

use crate::errors::QueryError;
use crate::processor::{ExecutionResult, Processor, QueryPlan};
use crate::query_builder::aggregation::Aggregate;
use crate::query_builder::binder::{Binding, Fragment, Joiner, Operator, QueryBinder};
use crate::query_builder::parameters::ParameterBag;
use crate::query_builder::statement_type::QueryType;
use crate::result::mapper::boxed_mapper;
use crate::result::{Collection, IntoFields, MapperFactory, ResultMapper, ResultRow};
use platform::Platform;
use std::fmt;
use type_mapping::Value;

/// Fluent builder bound to one platform for its whole lifetime
pub struct QueryBuilder<'p> {
    platform: &'p mut Platform,
    query: String,
    parameters: ParameterBag,
    binder: QueryBinder,
    query_type: QueryType,
    raw: bool,
    mapper: Option<MapperFactory>,
}

impl<'p> QueryBuilder<'p> {
    pub fn new(platform: &'p mut Platform) -> Self {
        let binder = QueryBinder::new(platform.dialect());
        Self {
            platform,
            query: String::new(),
            parameters: ParameterBag::new(),
            binder,
            query_type: QueryType::None,
            raw: false,
            mapper: None,
        }
    }

    /// Replace the query with caller-supplied SQL; `:name` placeholders are still rewritten
    pub fn raw_query(mut self, sql: &str) -> Self {
        self.query = sql.to_string();
        self.raw = true;
        self.query_type = QueryType::detect(sql);
        self.binder = QueryBinder::new(self.platform.dialect());
        if has_top_level_where(sql) {
            self.binder.open_where();
        }
        self
    }

    /// Select columns; an empty list selects `*`
    pub fn select(mut self, columns: &[&str]) -> Self {
        let fragment = self.binder.select(columns);
        self.mark(QueryType::Select);
        self.append(fragment)
    }

    pub fn from(mut self, table: &str) -> Self {
        let fragment = self.binder.from(table);
        self.mark(QueryType::Select);
        self.append(fragment)
    }

    pub fn count(self, column: &str, alias: &str) -> Self {
        self.aggregate(Aggregate::Count, column, alias)
    }

    pub fn sum(self, column: &str, alias: &str) -> Self {
        self.aggregate(Aggregate::Sum, column, alias)
    }

    pub fn avg(self, column: &str, alias: &str) -> Self {
        self.aggregate(Aggregate::Avg, column, alias)
    }

    pub fn min(self, column: &str, alias: &str) -> Self {
        self.aggregate(Aggregate::Min, column, alias)
    }

    pub fn max(self, column: &str, alias: &str) -> Self {
        self.aggregate(Aggregate::Max, column, alias)
    }

    pub fn group_concat(mut self, expression: &str, alias: &str, separator: &str) -> Self {
        let fragment = self.binder.group_concat(expression, alias, separator);
        self.mark(QueryType::Select);
        self.append(fragment)
    }

    /// `LEAST(a,b,...) AS alias`; no-op for an empty argument list
    pub fn least(mut self, arguments: &[&str], alias: &str) -> Self {
        match self.binder.least(arguments, alias) {
            Some(fragment) => {
                self.mark(QueryType::Select);
                self.append(fragment)
            }
            None => self,
        }
    }

    pub fn where_(self, column: &str, value: impl Into<Value>) -> Self {
        self.predicate(Joiner::And, column, "=", value.into())
    }

    pub fn and_where(self, column: &str, value: impl Into<Value>) -> Self {
        self.predicate(Joiner::And, column, "=", value.into())
    }

    pub fn or_where(self, column: &str, value: impl Into<Value>) -> Self {
        self.predicate(Joiner::Or, column, "=", value.into())
    }

    pub fn where_not(self, column: &str, value: impl Into<Value>) -> Self {
        self.predicate(Joiner::And, column, "!=", value.into())
    }

    pub fn and_where_not(self, column: &str, value: impl Into<Value>) -> Self {
        self.predicate(Joiner::And, column, "!=", value.into())
    }

    pub fn or_where_not(self, column: &str, value: impl Into<Value>) -> Self {
        self.predicate(Joiner::Or, column, "!=", value.into())
    }

    /// `column IN (...)`; no-op for an empty value list
    pub fn where_in<V: Into<Value>>(self, column: &str, values: Vec<V>) -> Self {
        self.in_list(column, values, false)
    }

    /// `column NOT IN (...)`; no-op for an empty value list
    pub fn where_not_in<V: Into<Value>>(self, column: &str, values: Vec<V>) -> Self {
        self.in_list(column, values, true)
    }

    pub fn where_between(mut self, column: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        let binding = self
            .binder
            .between(Joiner::And, column, low.into(), high.into(), false);
        self.apply(binding)
    }

    pub fn where_not_between(
        mut self,
        column: &str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        let binding = self
            .binder
            .between(Joiner::And, column, low.into(), high.into(), true);
        self.apply(binding)
    }

    pub fn where_like(mut self, column: &str, pattern: &str) -> Self {
        let binding = self.binder.like(Joiner::And, column, Value::from(pattern), false);
        self.apply(binding)
    }

    pub fn where_not_like(mut self, column: &str, pattern: &str) -> Self {
        let binding = self.binder.like(Joiner::And, column, Value::from(pattern), true);
        self.apply(binding)
    }

    pub fn limit(self, limit: u64, offset: u64) -> Self {
        let fragment = self.binder.limit(limit, offset);
        self.append(fragment)
    }

    pub fn order_by(self, columns: &[&str]) -> Self {
        let fragment = self.binder.order_by(columns);
        self.append(fragment)
    }

    /// `ORDER BY FIELD(...)` (MySQL)
    pub fn order_by_field(self, columns: &[&str]) -> Self {
        let fragment = self.binder.order_by_field(columns);
        self.append(fragment)
    }

    /// Inject a logical operator once a `WHERE` section is open; a no-op before that.
    /// The next predicate then omits its own joining keyword.
    pub fn set_operator(mut self, operator: Operator) -> Self {
        match self.binder.operator(operator) {
            Some(fragment) => self.append(fragment),
            None => self,
        }
    }

    /// Bind a named value for a placeholder written by hand
    pub fn set_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.set_parameter(name, value, false);
        self
    }

    /// Bind a list; a placeholder referencing it once expands to one marker per value
    pub fn set_param_list<V: Into<Value>>(mut self, name: &str, values: Vec<V>) -> Self {
        self.parameters
            .set_list(name, values.into_iter().map(Into::into).collect(), false);
        self
    }

    /// Map every row of `get` into `M`
    pub fn set_result_mapper<M: ResultMapper + Default>(mut self) -> Self {
        self.mapper = Some(boxed_mapper::<M>);
        self
    }

    pub fn result_mapping_enabled(&self) -> bool {
        self.mapper.is_some()
    }

    /// Accumulated SQL with named placeholders
    pub fn get_query(&self) -> &str {
        &self.query
    }

    pub fn get_query_parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    pub fn get_query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Backend name of the bound platform
    pub fn platform_name(&self) -> &str {
        self.platform.name()
    }

    /// Run the query and collect its rows
    pub fn get(self) -> Result<Collection<ResultRow>, QueryError> {
        let query_type = self.require(QueryType::Select)?;
        let mapper = self.mapper;
        let plan = QueryPlan {
            query: &self.query,
            parameters: &self.parameters,
            query_type,
            raw: self.raw,
        };
        Processor::new(self.platform).fetch(plan, mapper)
    }

    /// Run the query and map every row into `M`
    pub fn get_as<M: ResultMapper + Default>(self) -> Result<Collection<M>, QueryError> {
        let query_type = self.require(QueryType::Select)?;
        let plan = QueryPlan {
            query: &self.query,
            parameters: &self.parameters,
            query_type,
            raw: self.raw,
        };
        Processor::new(self.platform).fetch_as::<M>(plan)
    }

    /// Run the accumulated query as-is for its effect
    pub fn execute(self) -> Result<ExecutionResult, QueryError> {
        let plan = QueryPlan {
            query: &self.query,
            parameters: &self.parameters,
            query_type: self.query_type,
            raw: self.raw,
        };
        Processor::new(self.platform).write(plan)
    }

    /// `INSERT INTO table (...) VALUES (...)`; replaces any accumulated SQL and parameters
    pub fn insert(mut self, table: &str, fields: impl IntoFields) -> Result<ExecutionResult, QueryError> {
        self.require_builder_query()?;
        self.require(QueryType::Insert)?;

        let binding = self.binder.insert(table, fields.into_fields()?)?;
        self.query = binding.fragment.into_string();
        self.parameters = ParameterBag::new();
        for (name, value) in binding.parameters {
            self.parameters.set_parameter(&name, value, false);
        }
        self.query_type = QueryType::Insert;
        self.execute()
    }

    /// `UPDATE table SET ...` followed by the accumulated conditions
    pub fn update(mut self, table: &str, fields: impl IntoFields) -> Result<ExecutionResult, QueryError> {
        self.require_builder_query()?;
        self.require(QueryType::Update)?;

        let binding = self.binder.update(table, fields.into_fields()?)?;
        let mut parameters = ParameterBag::new();
        for (name, value) in binding.parameters {
            parameters.set_parameter(&name, value, false);
        }
        parameters.absorb(std::mem::take(&mut self.parameters));

        self.query = Self::prefix(binding.fragment.as_str(), &self.query);
        self.parameters = parameters;
        self.query_type = QueryType::Update;
        self.execute()
    }

    /// `DELETE FROM table` followed by the accumulated conditions
    pub fn delete(mut self, table: &str) -> Result<ExecutionResult, QueryError> {
        self.require_builder_query()?;
        self.require(QueryType::Delete)?;

        let fragment = self.binder.delete(table)?;
        self.query = Self::prefix(fragment.as_str(), &self.query);
        self.query_type = QueryType::Delete;
        self.execute()
    }

    fn aggregate(mut self, function: Aggregate, column: &str, alias: &str) -> Self {
        let fragment = self.binder.aggregate(function, column, alias);
        self.mark(QueryType::Select);
        self.append(fragment)
    }

    fn predicate(mut self, joiner: Joiner, column: &str, op: &str, value: Value) -> Self {
        let binding = self.binder.predicate(joiner, column, op, value);
        self.apply(binding)
    }

    fn in_list<V: Into<Value>>(mut self, column: &str, values: Vec<V>, negate: bool) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        match self.binder.in_list(Joiner::And, column, values, negate) {
            Some(binding) => self.apply(binding),
            None => self,
        }
    }

    fn apply(mut self, binding: Binding) -> Self {
        for (name, value) in binding.parameters {
            self.parameters.set_parameter(&name, value, false);
        }
        self.append(binding.fragment)
    }

    fn append(mut self, fragment: Fragment) -> Self {
        if self.query.is_empty() {
            self.query.push_str(fragment.as_str().trim_start());
        } else {
            self.query.push_str(fragment.as_str());
        }
        self
    }

    /// Statement head followed by the accumulated conditions
    fn prefix(head: &str, conditions: &str) -> String {
        if conditions.is_empty() || conditions.starts_with(char::is_whitespace) {
            format!("{}{}", head, conditions)
        } else {
            format!("{} {}", head, conditions)
        }
    }

    /// Set the query type unless one is already set
    fn mark(&mut self, query_type: QueryType) {
        if self.query_type.is_none() {
            self.query_type = query_type;
        }
    }

    /// Type the query runs as; fails when it already carries a different type
    fn require(&self, requested: QueryType) -> Result<QueryType, QueryError> {
        if self.query_type.is_none() || self.query_type == requested {
            Ok(requested)
        } else {
            Err(QueryError::QueryTypeConflict {
                current: self.query_type.as_str(),
                requested: requested.as_str(),
            })
        }
    }

    fn require_builder_query(&self) -> Result<(), QueryError> {
        if self.raw {
            return Err(QueryError::validation(
                "write helpers cannot extend a raw query; use execute() instead",
            ));
        }
        Ok(())
    }
}

/// Whether `sql` has a `WHERE` outside parentheses, quotes and comments
fn has_top_level_where(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 1);
            }
            b if b.is_ascii_alphabetic() || b == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                if depth == 0 && sql[start..i].eq_ignore_ascii_case("WHERE") {
                    return true;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    false
}

impl fmt::Debug for QueryBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("platform", &self.platform.name())
            .field("query", &self.query)
            .field("parameters", &self.parameters)
            .field("query_type", &self.query_type)
            .field("raw", &self.raw)
            .field("result_mapping", &self.mapper.is_some())
            .finish()
    }
}
