use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{RepositoryError, Result};

/// A single field value on its way into or out of the store.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Integer(_) => "integer",
            FieldValue::Real(_) => "real",
            FieldValue::Text(_) => "text",
            FieldValue::Blob(_) => "blob",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Date(_) => "date",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v.into())
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::Integer(v.into())
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Real(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Blob(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// Typed extraction of a decoded value. The error is a human readable reason.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String>;
}

fn mismatch(expected: &str, got: &FieldValue) -> String {
    format!("expected {expected}, got {}", got.kind())
}

impl FromFieldValue for i64 {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Integer(v) => Ok(v),
            other => Err(mismatch("integer", &other)),
        }
    }
}

impl FromFieldValue for i32 {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        let v = i64::from_field_value(value)?;
        i32::try_from(v).map_err(|err| format!("{v} out of range: {err}"))
    }
}

impl FromFieldValue for u32 {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        let v = i64::from_field_value(value)?;
        u32::try_from(v).map_err(|err| format!("{v} out of range: {err}"))
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Real(v) => Ok(v),
            FieldValue::Integer(v) => Ok(v as f64),
            other => Err(mismatch("real", &other)),
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Boolean(v) => Ok(v),
            FieldValue::Integer(v) => Ok(v != 0),
            other => Err(mismatch("boolean", &other)),
        }
    }
}

impl FromFieldValue for String {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Text(v) => Ok(v),
            other => Err(mismatch("text", &other)),
        }
    }
}

impl FromFieldValue for Vec<u8> {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Blob(v) => Ok(v),
            other => Err(mismatch("blob", &other)),
        }
    }
}

impl FromFieldValue for NaiveDateTime {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Timestamp(v) => Ok(v),
            other => Err(mismatch("timestamp", &other)),
        }
    }
}

impl FromFieldValue for NaiveDate {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Date(v) => Ok(v),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

/// Decoded field values keyed by field name, handed to `Record::from_fields`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(&'static str, FieldValue)>,
}

impl Fields {
    pub fn new(entries: Vec<(&'static str, FieldValue)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the value for `name` and converts it to `V`.
    pub fn take<V: FromFieldValue>(&mut self, name: &str) -> Result<V> {
        let idx = self
            .entries
            .iter()
            .position(|(n, _)| *n == name)
            .ok_or_else(|| RepositoryError::decode(name, "missing from row"))?;
        let (_, value) = self.entries.remove(idx);
        V::from_field_value(value).map_err(|reason| RepositoryError::decode(name, reason))
    }
}
