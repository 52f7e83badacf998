use rusqlite::{params_from_iter, types::Value, Connection, OptionalExtension};
use std::marker::PhantomData;
use std::path::Path;

use crate::configuration::StoreConfig;
use crate::error::{RepositoryError, Result};
use crate::record::{Pk, Record, RecordDescriptor, UNSAVED_PK};

use super::{codec::encode_value, Filter, Repository, RowCodec, Statements};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// SQLite-backed repository for one record type.
///
/// Holds no connection: every operation opens the database, runs a single
/// statement and closes it again.
pub struct SqliteRepository<T: Record> {
    config: StoreConfig,
    descriptor: RecordDescriptor,
    statements: Statements,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> SqliteRepository<T> {
    /// Binds to the store and creates the record table if it is missing.
    pub fn new(config: impl Into<StoreConfig>) -> Result<Self> {
        let repo = Self::open_existing(config)?;
        repo.create_table()?;
        Ok(repo)
    }

    /// Binds to the store without touching its schema.
    pub fn open_existing(config: impl Into<StoreConfig>) -> Result<Self> {
        let descriptor = RecordDescriptor::of::<T>()?;
        let statements = Statements::derive(&descriptor);
        Ok(Self {
            config: config.into(),
            descriptor,
            statements,
            _record: PhantomData,
        })
    }

    pub fn create_table(&self) -> Result<()> {
        self.with_conn(Access::Write, |conn| {
            conn.execute(&self.statements.create_table, [])?;
            Ok(())
        })?;
        log::info!(
            "SQLite table `{}` ready in {}",
            self.descriptor.table_name,
            self.config.path.display()
        );
        Ok(())
    }

    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.descriptor
    }

    pub fn statements(&self) -> &Statements {
        &self.statements
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    fn codec(&self) -> RowCodec<'_> {
        RowCodec::new(&self.descriptor)
    }

    /// Open a connection, apply the configured pragmas, and run the closure.
    fn with_conn<F, R>(&self, access: Access, f: F) -> Result<R>
    where
        F: FnOnce(&Connection) -> Result<R>,
    {
        let _span = tracing::debug_span!(
            "sqlite",
            table = %self.descriptor.table_name,
            access = ?access
        )
        .entered();

        let conn = Connection::open(&self.config.path)?;
        if let Some(mode) = &self.config.journal_mode {
            conn.pragma_update(None, "journal_mode", mode)?;
        }
        if let Some(level) = &self.config.synchronous {
            conn.pragma_update(None, "synchronous", level)?;
        }
        conn.busy_timeout(self.config.busy_timeout())?;
        if access == Access::Write && self.config.foreign_keys {
            conn.pragma_update(None, "foreign_keys", true)?;
        }
        f(&conn)
    }

    fn not_found(&self, pk: Pk) -> RepositoryError {
        log::warn!(
            "no `{}` row with pk {}; nothing written",
            self.descriptor.table_name,
            pk
        );
        RepositoryError::NotFound {
            table: self.descriptor.table_name.clone(),
            pk,
        }
    }
}

impl<T: Record> Repository<T> for SqliteRepository<T> {
    fn add(&self, record: &mut T) -> Result<Pk> {
        if record.pk() != UNSAVED_PK {
            return Err(RepositoryError::InvalidArgument(format!(
                "cannot add {record:?}: `pk` is already set"
            )));
        }

        let params = self.codec().encode(record)?;
        let pk = self.with_conn(Access::Write, |conn| {
            log::debug!("{}", self.statements.insert);
            conn.execute(&self.statements.insert, params_from_iter(params.iter()))?;
            Ok(conn.last_insert_rowid())
        })?;

        record.set_pk(pk);
        Ok(pk)
    }

    fn get(&self, pk: Pk) -> Result<Option<T>> {
        let codec = self.codec();
        self.with_conn(Access::Read, |conn| {
            log::debug!("{}", self.statements.select_by_pk);
            let row = conn
                .query_row(&self.statements.select_by_pk, [pk], |row| {
                    codec.read_row(row)
                })
                .optional()?;
            row.map(|values| codec.decode(values)).transpose()
        })
    }

    fn get_all(&self, filter: Option<&Filter>) -> Result<Vec<T>> {
        if let Some(filter) = filter {
            filter.validate()?;
        }
        let sql = self.statements.select_filtered(filter);
        let params: Vec<Value> = filter
            .map(|f| f.iter().map(|(_, v)| encode_value(v.clone())).collect())
            .unwrap_or_default();

        let codec = self.codec();
        self.with_conn(Access::Read, |conn| {
            log::debug!("{sql}");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params.iter()), |row| codec.read_row(row))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows.into_iter().map(|values| codec.decode(values)).collect()
        })
    }

    fn update(&self, record: &T) -> Result<()> {
        let mut params = self.codec().encode(record)?;
        params.push(Value::Integer(record.pk()));

        let affected = self.with_conn(Access::Write, |conn| {
            log::debug!("{}", self.statements.update);
            Ok(conn.execute(&self.statements.update, params_from_iter(params.iter()))?)
        })?;

        if affected == 0 {
            return Err(self.not_found(record.pk()));
        }
        Ok(())
    }

    fn delete(&self, pk: Pk) -> Result<()> {
        let affected = self.with_conn(Access::Write, |conn| {
            log::debug!("{}", self.statements.delete);
            Ok(conn.execute(&self.statements.delete, [pk])?)
        })?;

        if affected == 0 {
            return Err(self.not_found(pk));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::Custom;
    use crate::record::{Field, FieldType, FieldValue, Fields, PK_FIELD};
    use chrono::{NaiveDate, Timelike};
    use tempfile::TempDir;

    fn repo() -> (TempDir, SqliteRepository<Custom>) {
        let dir = tempfile::tempdir().expect("create temp dir for db");
        let repo = SqliteRepository::<Custom>::new(dir.path().join("bookkeeper_test.db"))
            .expect("create repository");
        (dir, repo)
    }

    #[test]
    fn crud_round_trip() {
        let (_dir, repo) = repo();

        let mut added = Custom::new(1337, "test");
        let pk = repo.add(&mut added).unwrap();
        assert_eq!(pk, added.pk);
        assert_ne!(pk, UNSAVED_PK);

        let fetched = repo.get(pk).unwrap().unwrap();
        assert_eq!(fetched, added);

        let now = chrono::Local::now().naive_local().with_nanosecond(0).unwrap();
        let changed = Custom {
            field_int: 2022,
            field_str: "test_new".to_string(),
            field_datetime: now,
            field_date: now.date(),
            pk,
        };
        repo.update(&changed).unwrap();
        assert_eq!(repo.get(pk).unwrap().unwrap(), changed);

        repo.delete(pk).unwrap();
        assert!(repo.get(pk).unwrap().is_none());
    }

    #[test]
    fn add_rejects_persisted_record() {
        let (_dir, repo) = repo();
        let mut record = Custom::new(1, "x");
        record.pk = 1;
        let err = repo.add(&mut record).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArgument(_)));
        assert!(err.to_string().contains("Custom"));
        assert!(repo.get_all(None).unwrap().is_empty());
    }

    #[test]
    fn add_twice_with_same_value_is_rejected() {
        let (_dir, repo) = repo();
        let mut record = Custom::new(1, "x");
        repo.add(&mut record).unwrap();
        assert!(repo.add(&mut record).is_err());
        assert_eq!(repo.get_all(None).unwrap().len(), 1);
    }

    #[test]
    fn update_unknown_pk_is_not_found_and_leaves_store_untouched() {
        let (_dir, repo) = repo();
        let mut kept = Custom::new(5, "kept");
        let kept_pk = repo.add(&mut kept).unwrap();

        let mut ghost = Custom::new(6, "ghost");
        ghost.pk = kept_pk + 100;
        let err = repo.update(&ghost).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(repo.get(kept_pk).unwrap().unwrap(), kept);
    }

    #[test]
    fn get_missing_is_none() {
        let (_dir, repo) = repo();
        assert!(repo.get(-1).unwrap().is_none());
    }

    #[test]
    fn delete_twice_fails_second_time() {
        let (_dir, repo) = repo();
        let mut record = Custom::new(1, "x");
        let pk = repo.add(&mut record).unwrap();
        repo.delete(pk).unwrap();
        assert!(repo.get(pk).unwrap().is_none());
        let err = repo.delete(pk).unwrap_err();
        assert!(
            matches!(err, RepositoryError::NotFound { ref table, pk: missing } if table == "custom" && missing == pk)
        );
    }

    #[test]
    fn deleted_keys_are_not_reused() {
        let (_dir, repo) = repo();
        let mut first = Custom::new(1, "a");
        let pk = repo.add(&mut first).unwrap();
        repo.delete(pk).unwrap();
        let mut second = Custom::new(2, "b");
        assert!(repo.add(&mut second).unwrap() > pk);
    }

    #[test]
    fn get_all_returns_insertion_order() {
        let (_dir, repo) = repo();
        let mut pks = Vec::new();
        for i in 0..5 {
            let mut record = Custom::new(i, "test");
            pks.push(repo.add(&mut record).unwrap());
        }
        let listed: Vec<Pk> = repo.get_all(None).unwrap().iter().map(|r| r.pk).collect();
        assert_eq!(listed, pks);
    }

    #[test]
    fn get_all_with_filter() {
        let (_dir, repo) = repo();
        let mut records = Vec::new();
        for i in 0..5 {
            let mut record = Custom::new(i, "test");
            repo.add(&mut record).unwrap();
            records.push(record);
        }

        let zero = repo
            .get_all(Some(&Filter::new().eq("field_int", 0i64)))
            .unwrap();
        assert_eq!(zero, vec![records[0].clone()]);

        let by_str = repo
            .get_all(Some(&Filter::new().eq("field_str", "test")))
            .unwrap();
        assert_eq!(by_str, records);

        let both = repo
            .get_all(Some(
                &Filter::new().eq("field_str", "test").eq("field_int", 3i64),
            ))
            .unwrap();
        assert_eq!(both, vec![records[3].clone()]);

        let by_date = repo
            .get_all(Some(&Filter::new().eq(
                "field_date",
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            )))
            .unwrap();
        assert_eq!(by_date.len(), 5);

        assert!(repo
            .get_all(Some(&Filter::new().eq("field_str", "nope")))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn filter_on_unknown_column_is_store_error() {
        let (_dir, repo) = repo();
        let err = repo
            .get_all(Some(&Filter::new().eq("missing", 1i64)))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Store(_)));
    }

    #[test]
    fn filter_with_unusable_column_is_invalid_argument() {
        let (_dir, repo) = repo();
        let err = repo
            .get_all(Some(&Filter::new().eq("field_int = 0 OR 1", 1i64)))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArgument(_)));
    }

    #[test]
    fn string_values_are_bound_not_spliced() {
        let (_dir, repo) = repo();
        let mut record = Custom::new(1, "'); DROP TABLE custom; --");
        let pk = repo.add(&mut record).unwrap();
        assert_eq!(
            repo.get(pk).unwrap().unwrap().field_str,
            "'); DROP TABLE custom; --"
        );
    }

    #[test]
    fn repeated_construction_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let first = SqliteRepository::<Custom>::new(&path).unwrap();
        let mut record = Custom::new(1, "persisted");
        first.add(&mut record).unwrap();

        let second = SqliteRepository::<Custom>::new(&path).unwrap();
        let third = SqliteRepository::<Custom>::new(&path).unwrap();
        assert_eq!(second.get_all(None).unwrap(), vec![record.clone()]);
        assert_eq!(third.get_all(None).unwrap(), vec![record]);
    }

    #[test]
    fn open_existing_uses_prepared_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("existing.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS custom (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                field_int int,
                field_str text,
                field_datetime text,
                field_date text
            );
            "#,
        )
        .unwrap();
        drop(conn);

        let repo = SqliteRepository::<Custom>::open_existing(&path).unwrap();
        let mut record = Custom::new(7, "prepared");
        let pk = repo.add(&mut record).unwrap();
        assert_eq!(repo.get(pk).unwrap().unwrap(), record);
    }

    #[test]
    fn open_existing_without_table_fails_on_use() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepository::<Custom>::open_existing(dir.path().join("empty.db")).unwrap();
        assert!(matches!(repo.get(1).unwrap_err(), RepositoryError::Store(_)));
    }

    #[test]
    fn malformed_stored_timestamp_is_reported() {
        let (_dir, repo) = repo();
        let mut record = Custom::new(1, "x");
        let pk = repo.add(&mut record).unwrap();

        let conn = Connection::open(repo.path()).unwrap();
        conn.execute(
            "UPDATE custom SET field_datetime = 'yesterday' WHERE pk = ?1",
            [pk],
        )
        .unwrap();

        assert!(matches!(
            repo.get(pk).unwrap_err(),
            RepositoryError::Temporal { .. }
        ));
    }

    #[derive(Debug)]
    struct Keyless {
        name: String,
    }

    impl Record for Keyless {
        const TYPE_NAME: &'static str = "Keyless";
        const FIELDS: &'static [Field] = &[Field::new("name", FieldType::Text)];

        fn pk(&self) -> Pk {
            UNSAVED_PK
        }

        fn set_pk(&mut self, _pk: Pk) {}

        fn field_value(&self, name: &str) -> Option<FieldValue> {
            (name == "name").then(|| self.name.clone().into())
        }

        fn from_fields(mut fields: Fields) -> Result<Self> {
            Ok(Self {
                name: fields.take("name")?,
            })
        }
    }

    #[test]
    fn record_type_without_pk_is_rejected_at_construction() {
        let dir = tempfile::tempdir().unwrap();
        let err = SqliteRepository::<Keyless>::new(dir.path().join("x.db"))
            .err()
            .expect("construction must fail");
        assert!(matches!(err, RepositoryError::Config { record: "Keyless", .. }));
        assert!(!dir.path().join("x.db").exists());
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Order {
        group: String,
        limit: i64,
        pk: Pk,
    }

    impl Record for Order {
        const TYPE_NAME: &'static str = "Order";
        const FIELDS: &'static [Field] = &[
            Field::new("group", FieldType::Text),
            Field::new("limit", FieldType::Integer),
            Field::new(PK_FIELD, FieldType::Integer),
        ];

        fn pk(&self) -> Pk {
            self.pk
        }

        fn set_pk(&mut self, pk: Pk) {
            self.pk = pk;
        }

        fn field_value(&self, name: &str) -> Option<FieldValue> {
            match name {
                "group" => Some(self.group.clone().into()),
                "limit" => Some(self.limit.into()),
                _ => None,
            }
        }

        fn from_fields(mut fields: Fields) -> Result<Self> {
            Ok(Self {
                group: fields.take("group")?,
                limit: fields.take("limit")?,
                pk: UNSAVED_PK,
            })
        }
    }

    #[test]
    fn keyword_table_and_column_names_work() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepository::<Order>::new(dir.path().join("orders.db")).unwrap();
        assert_eq!(repo.descriptor().table_name, "order");

        let mut first = Order {
            group: "by".into(),
            limit: 10,
            pk: UNSAVED_PK,
        };
        let mut second = Order {
            group: "where".into(),
            limit: 20,
            pk: UNSAVED_PK,
        };
        let pk = repo.add(&mut first).unwrap();
        repo.add(&mut second).unwrap();
        assert_eq!(repo.get(pk).unwrap(), Some(first.clone()));

        let grouped = repo
            .get_all(Some(&Filter::new().eq("group", "where")))
            .unwrap();
        assert_eq!(grouped, vec![second.clone()]);

        first.limit = 11;
        repo.update(&first).unwrap();
        assert_eq!(repo.get(pk).unwrap().unwrap().limit, 11);

        repo.delete(pk).unwrap();
        assert_eq!(repo.get_all(None).unwrap(), vec![second]);
    }

    #[test]
    fn custom_pragmas_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("plain.db"))
            .with_journal_mode(Some("DELETE"))
            .with_foreign_keys(false);
        let repo = SqliteRepository::<Custom>::new(config).unwrap();
        let mut record = Custom::new(1, "x");
        repo.add(&mut record).unwrap();

        let conn = Connection::open(repo.path()).unwrap();
        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "delete");
    }
}
