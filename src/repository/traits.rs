use crate::error::Result;
use crate::record::{Pk, Record};

use super::Filter;

/// CRUD surface shared by every backend.
///
/// `get` reports a missing row as `Ok(None)`; `update` and `delete` report
/// one as `RepositoryError::NotFound`.
pub trait Repository<T: Record> {
    /// Persists a record whose pk is still `UNSAVED_PK`, stores the assigned
    /// key on it and returns that key.
    fn add(&self, record: &mut T) -> Result<Pk>;

    fn get(&self, pk: Pk) -> Result<Option<T>>;

    /// Every stored record matching all filter entries, in insertion order.
    fn get_all(&self, filter: Option<&Filter>) -> Result<Vec<T>>;

    fn update(&self, record: &T) -> Result<()>;

    fn delete(&self, pk: Pk) -> Result<()>;
}
