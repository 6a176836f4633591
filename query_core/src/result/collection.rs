//! Result collection
//!
//! An owned, ordered sequence of materialized rows with query-style
//! accessors. Operations that reshape the sequence consume the collection
//! and return it, so they chain.

use crate::processor::ExecutionResult;
use crate::result::row::{FieldAccess, Row};
use std::cmp::Ordering;
use type_mapping::Value;

/// Ordered result rows plus a summary of the statement that produced them
#[derive(Debug)]
pub struct Collection<T> {
    items: Vec<T>,
    cursor: Option<usize>,
    statement: Option<ExecutionResult>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            statement: None,
        }
    }
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: None,
            statement: None,
        }
    }

    pub(crate) fn with_statement(items: Vec<T>, statement: ExecutionResult) -> Self {
        Self {
            items,
            cursor: None,
            statement: Some(statement),
        }
    }

    /// Summary of the executed statement, when the collection came from a query
    pub fn statement(&self) -> Option<&ExecutionResult> {
        self.statement.as_ref()
    }

    pub fn all(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item; positions the cursor for [`Collection::next`]
    pub fn first(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.cursor = Some(0);
        self.items.first()
    }

    /// Item after the cursor; `None` until `first` or `last` was called
    pub fn next(&mut self) -> Option<&T> {
        let position = self.cursor? + 1;
        self.cursor = Some(position);
        self.items.get(position)
    }

    /// Last item; positions the cursor on it
    pub fn last(&mut self) -> Option<&T> {
        let position = self.items.len().checked_sub(1)?;
        self.cursor = Some(position);
        self.items.last()
    }

    pub fn offset(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn add(mut self, item: T) -> Self {
        self.items.push(item);
        self
    }

    /// Remove the item at `index`; out-of-range indexes are ignored
    pub fn remove(mut self, index: usize) -> Self {
        if index < self.items.len() {
            self.items.remove(index);
        }
        self
    }

    /// Drop every item
    pub fn reset(mut self) -> Self {
        self.items.clear();
        self.cursor = None;
        self
    }

    /// Call `f` with each index and item
    pub fn each<F: FnMut(usize, &T)>(&self, mut f: F) -> &Self {
        for (index, item) in self.items.iter().enumerate() {
            f(index, item);
        }
        self
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Collection<U> {
        Collection {
            items: self.items.into_iter().map(f).collect(),
            cursor: None,
            statement: self.statement,
        }
    }

    /// Split into chunks of `size` items, keyed by chunk index
    pub fn partition(self, size: usize) -> Collection<Group<T>> {
        let size = size.max(1);
        let mut groups: Vec<Group<T>> = Vec::new();
        for (index, item) in self.items.into_iter().enumerate() {
            if index % size == 0 {
                groups.push(Group {
                    key: Value::Integer((index / size) as i64),
                    items: Vec::new(),
                });
            }
            if let Some(group) = groups.last_mut() {
                group.items.push(item);
            }
        }
        Collection {
            items: groups,
            cursor: None,
            statement: self.statement,
        }
    }
}

impl<T: FieldAccess> Collection<T> {
    /// Rows holding only the named columns that exist on each item
    pub fn only(&self, columns: &[&str]) -> Collection<Row> {
        let rows = self
            .items
            .iter()
            .map(|item| {
                let mut row = Row::new();
                for column in columns {
                    if let Some(value) = item.field(column) {
                        row.set(*column, value);
                    }
                }
                row
            })
            .collect();
        Collection::new(rows)
    }

    /// Remove every item whose `key` field equals `value`
    pub fn remove_where(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.items
            .retain(|item| !item.field(key).is_some_and(|v| v.loosely_eq(&value)));
        self
    }

    /// Keep the items matching every `(field, value)` condition
    pub fn where_(mut self, conditions: &[(&str, Value)]) -> Self {
        self.items.retain(|item| {
            conditions.iter().all(|(field, expected)| {
                item.field(field).is_some_and(|v| v.loosely_eq(expected))
            })
        });
        self.cursor = None;
        self
    }

    /// Largest numeric value of `field`
    pub fn max(&self, field: &str) -> Option<Value> {
        self.extreme(field, Ordering::Greater)
    }

    /// Smallest numeric value of `field`
    pub fn min(&self, field: &str) -> Option<Value> {
        self.extreme(field, Ordering::Less)
    }

    /// Group items by the value of `key`, in order of first appearance.
    /// Items without the field are dropped.
    pub fn group_by(self, key: &str) -> Collection<Group<T>> {
        let mut groups: Vec<Group<T>> = Vec::new();
        for item in self.items {
            let Some(group_key) = item.field(key) else {
                continue;
            };
            match groups.iter_mut().find(|g| g.key.loosely_eq(&group_key)) {
                Some(group) => group.items.push(item),
                None => groups.push(Group {
                    key: group_key,
                    items: vec![item],
                }),
            }
        }
        Collection {
            items: groups,
            cursor: None,
            statement: self.statement,
        }
    }

    /// JSON array of every item
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.items.iter().map(FieldAccess::to_json).collect())
    }

    fn extreme(&self, field: &str, wanted: Ordering) -> Option<Value> {
        let mut best: Option<(f64, Value)> = None;
        for value in self.items.iter().filter_map(|item| item.field(field)) {
            let Some(number) = value.as_f64() else {
                continue;
            };
            let replace = match &best {
                None => true,
                Some((current, _)) => number.partial_cmp(current) == Some(wanted),
            };
            if replace {
                best = Some((number, value));
            }
        }
        best.map(|(_, value)| value)
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

/// Items sharing a key, produced by `group_by` and `partition`
#[derive(Debug, Clone, PartialEq)]
pub struct Group<T> {
    pub key: Value,
    pub items: Vec<T>,
}

impl<T: FieldAccess> FieldAccess for Group<T> {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "key" => Some(self.key.clone()),
            "items" => Some(Value::Json(serde_json::Value::Array(
                self.items.iter().map(FieldAccess::to_json).collect(),
            ))),
            _ => None,
        }
    }

    fn field_names(&self) -> Vec<String> {
        vec!["key".to_string(), "items".to_string()]
    }
}
