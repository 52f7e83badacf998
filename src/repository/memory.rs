use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::types::Value;

use crate::error::{RepositoryError, Result};
use crate::record::{Pk, Record, RecordDescriptor, PK_FIELD, UNSAVED_PK};

use super::{codec::encode_value, Filter, Repository, RowCodec};

struct MemoryInner {
    /// Encoded field values in descriptor order, keyed by `pk`.
    rows: BTreeMap<Pk, Vec<Value>>,
    last_pk: Pk,
}

/// In-process repository with the same contract as the SQLite one.
///
/// Rows are kept in their encoded form and decoded on read, so values lose
/// precision and compare the same way they would in the store. Keys grow
/// monotonically and are never handed out twice.
pub struct MemoryRepository<T: Record> {
    descriptor: RecordDescriptor,
    inner: Mutex<MemoryInner>,
    _record: std::marker::PhantomData<fn() -> T>,
}

/// Equality as the store applies it: numbers compare by value across
/// integer and real storage, `Null` only matches `Null`.
fn same_value(stored: &Value, expected: &Value) -> bool {
    match (stored, expected) {
        (Value::Integer(a), Value::Real(b)) | (Value::Real(b), Value::Integer(a)) => {
            (*a as f64) == *b
        }
        (a, b) => a == b,
    }
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: RecordDescriptor::of::<T>()?,
            inner: Mutex::new(MemoryInner {
                rows: BTreeMap::new(),
                last_pk: UNSAVED_PK,
            }),
            _record: std::marker::PhantomData,
        })
    }

    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    fn codec(&self) -> RowCodec<'_> {
        RowCodec::new(&self.descriptor)
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn not_found(&self, pk: Pk) -> RepositoryError {
        RepositoryError::NotFound {
            table: self.descriptor.table_name.clone(),
            pk,
        }
    }

    fn decode(&self, pk: Pk, values: &[Value]) -> Result<T> {
        let mut row = Vec::with_capacity(values.len() + 1);
        row.push(Value::Integer(pk));
        row.extend_from_slice(values);
        self.codec().decode(row)
    }

    /// Resolves each filter column to its position in a stored row, `None`
    /// standing for `pk`. Unknown columns fail like the store does.
    fn filter_columns(&self, filter: &Filter) -> Result<Vec<(Option<usize>, Value)>> {
        filter
            .iter()
            .map(|(column, expected)| {
                let position = if column == PK_FIELD {
                    None
                } else {
                    let index = self
                        .descriptor
                        .field_names()
                        .position(|name| name == column)
                        .ok_or_else(|| {
                            RepositoryError::Store(rusqlite::Error::InvalidColumnName(format!(
                                "no such column: {column}"
                            )))
                        })?;
                    Some(index)
                };
                Ok((position, encode_value(expected.clone())))
            })
            .collect()
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn add(&self, record: &mut T) -> Result<Pk> {
        if record.pk() != UNSAVED_PK {
            return Err(RepositoryError::InvalidArgument(format!(
                "cannot add {record:?}: `pk` is already set"
            )));
        }
        let values = self.codec().encode(record)?;
        let mut inner = self.lock();
        inner.last_pk += 1;
        let pk = inner.last_pk;
        inner.rows.insert(pk, values);
        drop(inner);

        record.set_pk(pk);
        Ok(pk)
    }

    fn get(&self, pk: Pk) -> Result<Option<T>> {
        let inner = self.lock();
        inner
            .rows
            .get(&pk)
            .map(|values| self.decode(pk, values))
            .transpose()
    }

    fn get_all(&self, filter: Option<&Filter>) -> Result<Vec<T>> {
        let conditions = match filter {
            Some(filter) => {
                filter.validate()?;
                self.filter_columns(filter)?
            }
            None => Vec::new(),
        };

        let inner = self.lock();
        inner
            .rows
            .iter()
            .filter(|(pk, values)| {
                conditions.iter().all(|(position, expected)| {
                    match position {
                        Some(i) => same_value(&values[*i], expected),
                        None => same_value(&Value::Integer(**pk), expected),
                    }
                })
            })
            .map(|(pk, values)| self.decode(*pk, values))
            .collect()
    }

    fn update(&self, record: &T) -> Result<()> {
        let values = self.codec().encode(record)?;
        let mut inner = self.lock();
        match inner.rows.get_mut(&record.pk()) {
            Some(stored) => {
                *stored = values;
                Ok(())
            }
            None => Err(self.not_found(record.pk())),
        }
    }

    fn delete(&self, pk: Pk) -> Result<()> {
        match self.lock().rows.remove(&pk) {
            Some(_) => Ok(()),
            None => Err(self.not_found(pk)),
        }
    }
}
