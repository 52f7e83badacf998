//! Generic SQLite persistence for plain record types.
//!
//! A record type registers its fields through [`record::Record`]; a
//! [`repository::SqliteRepository`] derives the table and the CRUD
//! statements from that registration once, then runs each operation on a
//! connection of its own.
//!
//! The crate logs through the `log` facade. Applications that want that
//! output formatted on stderr, or mirrored to a file, call
//! [`crate::tracing::init`] once at startup and
//! [`crate::tracing::set_log_file`] as needed.

pub mod configuration;
pub mod error;
pub mod models;
pub mod record;
pub mod repository;
pub mod tracing;

pub use configuration::StoreConfig;
pub use error::{RepositoryError, Result};
pub use record::{Field, FieldType, FieldValue, Fields, Pk, Record, PK_FIELD, UNSAVED_PK};
pub use repository::{Filter, MemoryRepository, Repository, SqliteRepository};
