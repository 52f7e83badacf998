use crate::error::{RepositoryError, Result};

use super::{Field, FieldType, Record, PK_FIELD};

/// Table name and ordered persistable fields derived from a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub type_name: &'static str,
    pub table_name: String,
    pub fields: Vec<Field>,
}

impl RecordDescriptor {
    pub fn of<T: Record>() -> Result<Self> {
        Self::from_parts(T::TYPE_NAME, T::FIELDS)
    }

    pub fn from_parts(type_name: &'static str, declared: &[Field]) -> Result<Self> {
        let table_name = type_name.to_lowercase();
        if !is_identifier(&table_name) {
            return Err(RepositoryError::config(
                type_name,
                format!("`{table_name}` is not a usable table name"),
            ));
        }

        let pks: Vec<&Field> = declared.iter().filter(|f| f.name == PK_FIELD).collect();
        match pks.as_slice() {
            [] => {
                return Err(RepositoryError::config(
                    type_name,
                    format!("no `{PK_FIELD}` field declared"),
                ))
            }
            [pk] if pk.ty != FieldType::Integer => {
                return Err(RepositoryError::config(
                    type_name,
                    format!("`{PK_FIELD}` must be declared as Integer, found {:?}", pk.ty),
                ))
            }
            [_] => {}
            _ => {
                return Err(RepositoryError::config(
                    type_name,
                    format!("`{PK_FIELD}` declared more than once"),
                ))
            }
        }

        let fields: Vec<Field> = declared
            .iter()
            .filter(|f| f.name != PK_FIELD)
            .copied()
            .collect();
        if fields.is_empty() {
            return Err(RepositoryError::config(
                type_name,
                "no persistable fields besides the primary key",
            ));
        }

        for (i, field) in fields.iter().enumerate() {
            if !is_identifier(field.name) {
                return Err(RepositoryError::config(
                    type_name,
                    format!("`{}` is not a usable column name", field.name),
                ));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(RepositoryError::config(
                    type_name,
                    format!("field `{}` declared more than once", field.name),
                ));
            }
            if let Some(table) = field.references {
                if !is_identifier(table) {
                    return Err(RepositoryError::config(
                        type_name,
                        format!("`{}` references unusable table name `{table}`", field.name),
                    ));
                }
            }
        }

        Ok(Self {
            type_name,
            table_name,
            fields,
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Plain SQL identifier: ASCII letter or underscore, then letters, digits
/// or underscores. Identifiers are the only text spliced into statements.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
