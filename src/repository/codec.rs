use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Value;

use crate::error::{RepositoryError, Result};
use crate::record::{Field, FieldType, FieldValue, Fields, Pk, Record, RecordDescriptor};

/// Text layout of stored timestamps. Sub-second precision is dropped.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text layout of stored calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Converts a field value into the parameter handed to the driver.
pub fn encode_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Integer(v) => Value::Integer(v),
        FieldValue::Real(v) => Value::Real(v),
        FieldValue::Text(v) => Value::Text(v),
        FieldValue::Blob(v) => Value::Blob(v),
        FieldValue::Boolean(v) => Value::Integer(v as i64),
        FieldValue::Timestamp(v) => Value::Text(v.format(TIMESTAMP_FORMAT).to_string()),
        FieldValue::Date(v) => Value::Text(v.format(DATE_FORMAT).to_string()),
    }
}

/// Converts a stored value back according to the field's declared type.
pub fn decode_value(field: &Field, raw: Value) -> Result<FieldValue> {
    if raw == Value::Null {
        return Ok(FieldValue::Null);
    }
    match (field.ty.non_null(), raw) {
        (FieldType::Timestamp, Value::Text(text)) => {
            NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
                .map(FieldValue::Timestamp)
                .map_err(|source| RepositoryError::Temporal {
                    field: field.name.to_string(),
                    source,
                })
        }
        (FieldType::Date, Value::Text(text)) => NaiveDate::parse_from_str(&text, DATE_FORMAT)
            .map(FieldValue::Date)
            .map_err(|source| RepositoryError::Temporal {
                field: field.name.to_string(),
                source,
            }),
        (FieldType::Timestamp | FieldType::Date, other) => Err(RepositoryError::decode(
            field.name,
            format!("expected temporal text, got {:?}", other.data_type()),
        )),
        (FieldType::Boolean, Value::Integer(v)) => Ok(FieldValue::Boolean(v != 0)),
        (_, raw) => Ok(passthrough(raw)),
    }
}

fn passthrough(raw: Value) -> FieldValue {
    match raw {
        Value::Null => FieldValue::Null,
        Value::Integer(v) => FieldValue::Integer(v),
        Value::Real(v) => FieldValue::Real(v),
        Value::Text(v) => FieldValue::Text(v),
        Value::Blob(v) => FieldValue::Blob(v),
    }
}

/// Marshals records to statement parameters and raw rows back to records.
///
/// A raw row is `[pk, v1, .., vN]` with the values in descriptor order.
pub struct RowCodec<'a> {
    descriptor: &'a RecordDescriptor,
}

impl<'a> RowCodec<'a> {
    pub fn new(descriptor: &'a RecordDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn encode<T: Record>(&self, record: &T) -> Result<Vec<Value>> {
        self.descriptor
            .fields
            .iter()
            .map(|field| {
                record.field_value(field.name).map(encode_value).ok_or_else(|| {
                    RepositoryError::config(
                        T::TYPE_NAME,
                        format!("no value for declared field `{}`", field.name),
                    )
                })
            })
            .collect()
    }

    pub fn decode<T: Record>(&self, row: Vec<Value>) -> Result<T> {
        let expected = self.descriptor.len() + 1;
        if row.len() != expected {
            return Err(RepositoryError::decode(
                &self.descriptor.table_name,
                format!("expected {expected} columns, got {}", row.len()),
            ));
        }

        let mut values = row.into_iter();
        let pk: Pk = match values.next() {
            Some(Value::Integer(pk)) => pk,
            other => {
                return Err(RepositoryError::decode(
                    crate::record::PK_FIELD,
                    format!("expected integer key, got {other:?}"),
                ))
            }
        };

        let entries = self
            .descriptor
            .fields
            .iter()
            .zip(values)
            .map(|(field, raw)| Ok((field.name, decode_value(field, raw)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut record = T::from_fields(Fields::new(entries))?;
        record.set_pk(pk);
        Ok(record)
    }

    /// Reads the `pk` column and every descriptor column off a result row.
    pub fn read_row(&self, row: &rusqlite::Row<'_>) -> rusqlite::Result<Vec<Value>> {
        (0..=self.descriptor.len()).map(|i| row.get(i)).collect()
    }
}
