use thiserror::Error;

use crate::record::Pk;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid record type `{record}`: {reason}")]
    Config { record: &'static str, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no row with pk {pk} in table `{table}`")]
    NotFound { table: String, pk: Pk },
    #[error("cannot decode field `{field}`: {reason}")]
    Decode { field: String, reason: String },
    #[error("malformed temporal value in field `{field}`: {source}")]
    Temporal {
        field: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl RepositoryError {
    pub(crate) fn config(record: &'static str, reason: impl Into<String>) -> Self {
        RepositoryError::Config {
            record,
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RepositoryError::Decode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound { .. })
    }
}
