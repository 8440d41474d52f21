use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::{ColumnType, MappingError};

/// A scalar crossing the storage boundary. `Null` is the absent sentinel:
/// rows always carry every mapped column, unset optionals hold `Null`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    String(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
        }
    }

    pub(crate) fn matches(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (Value::String(_), ColumnType::String)
                | (Value::Integer(_), ColumnType::Integer)
                | (Value::Boolean(_), ColumnType::Boolean)
                | (Value::Timestamp(_), ColumnType::Timestamp)
        )
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Extraction of a typed attribute out of a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Column name to scalar value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Attribute values resolved from a row, already checked against the schema.
/// Handed to [`Entity::from_attributes`](super::Entity::from_attributes).
#[derive(Debug)]
pub struct Attributes {
    table: String,
    values: BTreeMap<String, Value>,
}

impl Attributes {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: BTreeMap::new(),
        }
    }

    pub(crate) fn set(&mut self, attribute: &str, value: Value) {
        self.values.insert(attribute.to_string(), value);
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// `Ok(None)` when the attribute holds the null sentinel.
    pub fn optional<T: FromValue>(&self, attribute: &str) -> Result<Option<T>, MappingError> {
        let value = self
            .values
            .get(attribute)
            .ok_or_else(|| MappingError::UnknownAttribute {
                table: self.table.clone(),
                attribute: attribute.to_string(),
            })?;
        if value.is_null() {
            return Ok(None);
        }
        T::from_value(value)
            .map(Some)
            .ok_or_else(|| MappingError::InvalidRecord {
                table: self.table.clone(),
                reason: format!("attribute `{}` cannot hold a {}", attribute, value.kind()),
            })
    }

    pub fn required<T: FromValue>(&self, attribute: &str) -> Result<T, MappingError> {
        self.optional(attribute)?
            .ok_or_else(|| MappingError::InvalidRecord {
                table: self.table.clone(),
                reason: format!("attribute `{}` is null", attribute),
            })
    }
}
