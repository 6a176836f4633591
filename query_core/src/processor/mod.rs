//! Query processor
//!
//! Executes a built query against a platform: the SQL generator rewrites
//! the accumulated text, the values are flattened in binding order and typed,
//! the statement runs inside an explicit transaction when the platform is
//! not in autocommit mode, and rows are materialized into a collection.

use crate::errors::QueryError;
use crate::query_builder::parameters::{ParamSlot, ParameterBag};
use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::statement_type::QueryType;
use crate::result::{Collection, MapperFactory, ResultMapper, ResultRow, Row};
use platform::{BoundParameter, Platform, PreparedStatement, ResultSet};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, trace, warn};


/// Rewritten SQL with its typed positional values
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub sql: String,
    pub binding_order: Vec<String>,
    pub statement: PreparedStatement,
}

/// Summary of an executed statement
///
/// Returned by the write terminals and attached to every collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    sql: String,
    query_type: QueryType,
    raw: bool,
    columns: Vec<String>,
    row_count: usize,
    rows_affected: u64,
    last_insert_id: Option<i64>,
}

impl ExecutionResult {
    fn new(sql: String, query_type: QueryType, raw: bool, result_set: &ResultSet) -> Self {
        Self {
            sql,
            query_type,
            raw,
            columns: result_set.columns().to_vec(),
            row_count: result_set.row_count(),
            rows_affected: result_set.rows_affected(),
            last_insert_id: result_set.last_insert_id(),
        }
    }

    /// Rewritten SQL that was sent to the backend
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Whether the query text was supplied through `raw_query`
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Result column names, as described by the backend
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows returned by the backend, before any mapper skipped rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        self.last_insert_id
    }
}

/// What the builder hands to the processor for one execution
pub(crate) struct QueryPlan<'a> {
    pub query: &'a str,
    pub parameters: &'a ParameterBag,
    pub query_type: QueryType,
    pub raw: bool,
}

pub struct Processor<'p> {
    platform: &'p mut Platform,
}

impl<'p> Processor<'p> {
    pub fn new(platform: &'p mut Platform) -> Self {
        Self { platform }
    }

    /// Rewrite `query` against `bag` and bind every value with its wire type
    pub fn resolve(query: &str, bag: &ParameterBag) -> Result<ResolvedQuery, QueryError> {
        let generated = SqlGenerator::convert_to_sql(query, bag)?;
        let params = Self::bind(&generated.binding_order, bag)?;

        let statement = PreparedStatement {
            sql: generated.query.clone(),
            params,
        };
        debug!(
            sql = %generated.query,
            markers = statement.marker_count(),
            types = %statement.type_string(),
            "Resolved query"
        );

        Ok(ResolvedQuery {
            sql: generated.query,
            binding_order: generated.binding_order,
            statement,
        })
    }

    /// Flatten bag values following `binding_order`.
    ///
    /// A list referenced once is spliced in whole; a list referenced several
    /// times gives up one value per reference, in order.
    pub fn bind(binding_order: &[String], bag: &ParameterBag) -> Result<Vec<BoundParameter>, QueryError> {
        let mut references: HashMap<&str, usize> = HashMap::new();
        for name in binding_order {
            *references.entry(name.as_str()).or_insert(0) += 1;
        }

        let mut consumed: HashMap<&str, usize> = HashMap::new();
        let mut params = Vec::new();

        for name in binding_order {
            let slot = bag.get_parameter(name).ok_or_else(|| QueryError::ParameterMismatch {
                unmatched: vec![name.clone()],
                parameters: bag.get_all().to_vec(),
            })?;

            let values = match slot {
                ParamSlot::List(values) if references[name.as_str()] > 1 => {
                    let position = consumed.entry(name.as_str()).or_insert(0);
                    let value = values.get(*position).ok_or_else(|| QueryError::PlaceholderCount {
                        name: name.clone(),
                        occurrences: references[name.as_str()],
                        values: values.len(),
                    })?;
                    *position += 1;
                    std::slice::from_ref(value)
                }
                slot => slot.values(),
            };

            for value in values {
                let wire_type =
                    ParameterBag::get_type(value).ok_or_else(|| QueryError::UnbindableValue {
                        name: name.clone(),
                        kind: value.kind(),
                    })?;
                params.push(BoundParameter {
                    value: value.clone(),
                    wire_type,
                });
            }
        }

        Ok(params)
    }

    /// Execute, wrapping the statement in a transaction when autocommit is off
    pub fn execute(&mut self, resolved: &ResolvedQuery) -> Result<ResultSet, QueryError> {
        if self.platform.is_autocommit_enabled() {
            return self
                .platform
                .execute(&resolved.statement)
                .map_err(|e| QueryError::execution(&resolved.sql, &e));
        }

        let mut tx = self
            .platform
            .begin_transaction()
            .map_err(|e| QueryError::transaction(&e))?;
        debug!(sql = %resolved.sql, "Transaction started");

        match tx.execute(&resolved.statement) {
            Ok(result_set) => {
                tx.commit().map_err(|e| QueryError::transaction(&e))?;
                debug!(sql = %resolved.sql, "Transaction committed");
                Ok(result_set)
            }
            Err(e) => {
                warn!(sql = %resolved.sql, error = %e, "Query failed, rolling back");
                if let Err(rollback_error) = tx.rollback() {
                    warn!(error = %rollback_error, "Rollback failed");
                }
                Err(QueryError::execution(&resolved.sql, &e))
            }
        }
    }

    /// Run a read query; rows become [`Row`]s, or mapper instances when a factory is given
    pub(crate) fn fetch(
        &mut self,
        plan: QueryPlan<'_>,
        mapper: Option<MapperFactory>,
    ) -> Result<Collection<ResultRow>, QueryError> {
        let (summary, columns, rows) = self.run(&plan)?;

        let mut items = Vec::with_capacity(rows.len());
        for cells in rows {
            let row = Row::from_columns(&columns, cells);
            match mapper {
                Some(factory) => {
                    let mut instance = factory();
                    if Self::fill(instance.as_mut(), &row)? {
                        items.push(ResultRow::Mapped(instance));
                    }
                }
                None => items.push(ResultRow::Row(row)),
            }
        }

        Ok(Collection::with_statement(items, summary))
    }

    /// Run a read query and map every row into `M`
    pub(crate) fn fetch_as<M: ResultMapper + Default>(
        &mut self,
        plan: QueryPlan<'_>,
    ) -> Result<Collection<M>, QueryError> {
        let (summary, columns, rows) = self.run(&plan)?;

        let mut items = Vec::with_capacity(rows.len());
        for cells in rows {
            let row = Row::from_columns(&columns, cells);
            let mut instance = M::default();
            if Self::fill(&mut instance, &row)? {
                items.push(instance);
            }
        }

        Ok(Collection::with_statement(items, summary))
    }

    /// Run a statement for its effect
    pub(crate) fn write(&mut self, plan: QueryPlan<'_>) -> Result<ExecutionResult, QueryError> {
        let resolved = Self::resolve(plan.query, plan.parameters)?;
        let result_set = self.execute(&resolved)?;
        debug!(
            sql = %resolved.sql,
            rows_affected = result_set.rows_affected(),
            "Statement executed"
        );
        Ok(ExecutionResult::new(
            resolved.sql,
            plan.query_type,
            plan.raw,
            &result_set,
        ))
    }

    fn run(
        &mut self,
        plan: &QueryPlan<'_>,
    ) -> Result<(ExecutionResult, Vec<String>, Vec<Vec<type_mapping::Value>>), QueryError> {
        let resolved = Self::resolve(plan.query, plan.parameters)?;
        let result_set = self.execute(&resolved)?;
        let summary = ExecutionResult::new(resolved.sql, plan.query_type, plan.raw, &result_set);
        let (columns, rows) = result_set.into_parts();
        Ok((summary, columns, rows))
    }

    /// Gate and map one row; `Ok(false)` when the mapper skipped it
    fn fill(mapper: &mut dyn ResultMapper, row: &Row) -> Result<bool, QueryError> {
        if !mapper.register(row) {
            trace!(mapper = mapper.mapper_name(), "Row skipped by mapper");
            return Ok(false);
        }

        let properties = mapper.properties();
        for (column, value) in row.iter() {
            if !properties.iter().any(|property| *property == column) {
                return Err(QueryError::mapping(mapper.mapper_name(), column));
            }
            mapper.map_field(column, value.clone());
        }
        trace!(mapper = mapper.mapper_name(), "Row mapped");
        Ok(true)
    }
}
