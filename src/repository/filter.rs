use crate::error::{RepositoryError, Result};
use crate::record::{is_identifier, FieldValue};

/// Exact-match predicates for `get_all`, ANDed together.
///
/// Keys name real columns of the target table; any subset may be used. Each
/// column appears at most once, a later `eq` on the same column replaces the
/// earlier value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, FieldValue)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.conditions.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = value,
            None => self.conditions.push((column, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.conditions.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Rejects column names that cannot be placed into a statement.
    pub fn validate(&self) -> Result<()> {
        match self.iter().find(|(c, _)| !is_identifier(c)) {
            Some((column, _)) => Err(RepositoryError::InvalidArgument(format!(
                "filter column `{column}` is not a valid column name"
            ))),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Filter::new(), |f, (k, v)| f.eq(k, v))
    }
}
