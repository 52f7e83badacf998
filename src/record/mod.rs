//! Record registration.
//!
//! A persistable type declares its fields explicitly through [`Record`]
//! instead of being inspected at runtime. The declared list is the single
//! source of truth for table layout, statement column order and the
//! positional layout of rows read back from the store.

mod column;
mod descriptor;
mod value;

pub use column::{resolve_type, ColumnType};
pub(crate) use descriptor::is_identifier;
pub use descriptor::RecordDescriptor;
pub use value::{FieldValue, Fields, FromFieldValue};

use std::fmt;

use crate::error::Result;

/// Store-assigned identity of a persisted record.
pub type Pk = i64;

/// Reserved name of the identity column.
pub const PK_FIELD: &str = "pk";

/// Identity carried by a record that has not been added yet.
pub const UNSAVED_PK: Pk = 0;

/// Semantic type of a declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Real,
    /// Date and time of day without a zone, stored to the second.
    Timestamp,
    /// Calendar date.
    Date,
    Boolean,
    /// Nullable wrapper around another type.
    Optional(&'static FieldType),
    /// Any of several non-null alternatives.
    Union(&'static [FieldType]),
    /// Opaque named type, persisted as text by the record itself.
    Other(&'static str),
}

impl FieldType {
    /// Strips `Optional` wrappers.
    pub fn non_null(&self) -> &FieldType {
        match self {
            FieldType::Optional(inner) => inner.non_null(),
            other => other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    /// Table whose `pk` this field points to.
    pub references: Option<&'static str>,
}

impl Field {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            references: None,
        }
    }

    pub const fn references(self, table: &'static str) -> Self {
        Self {
            references: Some(table),
            ..self
        }
    }
}

/// A plain data shape with one integer identity field.
///
/// `FIELDS` lists every declared field in declaration order, the identity
/// field included (as `Field::new(PK_FIELD, FieldType::Integer)`). The
/// repository removes the identity entry to obtain the persistable columns.
///
/// `field_value` must answer for every persistable field name, and
/// `from_fields` must consume them; the identity is assigned afterwards
/// through `set_pk`.
pub trait Record: Sized + fmt::Debug {
    /// Type name; the table is named after its lowercase form.
    const TYPE_NAME: &'static str;

    const FIELDS: &'static [Field];

    fn pk(&self) -> Pk;

    fn set_pk(&mut self, pk: Pk);

    fn field_value(&self, name: &str) -> Option<FieldValue>;

    fn from_fields(fields: Fields) -> Result<Self>;
}
