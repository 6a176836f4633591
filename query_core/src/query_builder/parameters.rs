//! Parameter bag
//!
//! Named values waiting to be bound. Names are unique; setting a name that
//! is already present without overriding turns its slot into an ordered
//! list instead of failing.

use serde::Serialize;
use type_mapping::{Value, WireType};

/// Value stored under one parameter name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamSlot {
    Single(Value),
    List(Vec<Value>),
}

impl ParamSlot {
    /// Number of values held by the slot
    pub fn len(&self) -> usize {
        match self {
            ParamSlot::Single(_) => 1,
            ParamSlot::List(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ParamSlot::List(_))
    }

    /// All values in order
    pub fn values(&self) -> &[Value] {
        match self {
            ParamSlot::Single(value) => std::slice::from_ref(value),
            ParamSlot::List(values) => values,
        }
    }

    fn push(&mut self, value: Value) {
        match self {
            ParamSlot::Single(previous) => {
                let previous = std::mem::replace(previous, Value::Null);
                *self = ParamSlot::List(vec![previous, value]);
            }
            ParamSlot::List(values) => values.push(value),
        }
    }
}

/// Named parameters in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    entries: Vec<(String, ParamSlot)>,
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`.
    ///
    /// An unset name is stored as a single value. An existing name is
    /// replaced when `override_existing` is true, otherwise the value is
    /// appended to the name's list (`[previous, value, ...]`).
    pub fn set_parameter(&mut self, name: &str, value: impl Into<Value>, override_existing: bool) {
        let value = value.into();
        match self.position(name) {
            Some(index) if override_existing => self.entries[index].1 = ParamSlot::Single(value),
            Some(index) => self.entries[index].1.push(value),
            None => self.entries.push((name.to_string(), ParamSlot::Single(value))),
        }
    }

    /// Store a list of values under `name`, following the same collision policy
    pub fn set_list(&mut self, name: &str, values: Vec<Value>, override_existing: bool) {
        match self.position(name) {
            Some(index) if override_existing => self.entries[index].1 = ParamSlot::List(values),
            Some(index) => {
                for value in values {
                    self.entries[index].1.push(value);
                }
            }
            None => self.entries.push((name.to_string(), ParamSlot::List(values))),
        }
    }

    pub fn get_parameter(&self, name: &str) -> Option<&ParamSlot> {
        self.position(name).map(|index| &self.entries[index].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Every name with its slot, in insertion order
    pub fn get_all(&self) -> &[(String, ParamSlot)] {
        &self.entries
    }

    /// Number of distinct names
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wire type of a value; `None` means the value cannot be bound
    pub fn get_type(value: &Value) -> Option<WireType> {
        WireType::of(value)
    }

    /// Append every value of `other` after this bag's values, name by name
    pub fn absorb(&mut self, other: ParameterBag) {
        for (name, slot) in other.entries {
            match slot {
                ParamSlot::Single(value) => self.set_parameter(&name, value, false),
                ParamSlot::List(values) => self.set_list(&name, values, false),
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }
}
