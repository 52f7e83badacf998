use std::fmt;

use super::FieldType;

/// Column type keyword used in generated table definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Timestamp,
}

impl ColumnType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Maps a semantic field type to the column type it is stored in.
///
/// Optional wrappers are removed first. A union resolves to the column its
/// alternatives agree on and falls back to TEXT when they disagree. Dates
/// are kept as ISO text, booleans as 0/1 integers, and anything opaque as
/// TEXT.
///
/// An optional field therefore takes the column of its inner type
/// (`Optional(Integer)` is INTEGER); only a union of disagreeing
/// alternatives falls back to TEXT.
pub fn resolve_type(ty: &FieldType) -> ColumnType {
    match ty.non_null() {
        FieldType::Union(alternatives) => {
            let mut resolved = alternatives.iter().map(resolve_type);
            match resolved.next() {
                Some(first) if resolved.all(|c| c == first) => first,
                _ => ColumnType::Text,
            }
        }
        FieldType::Text => ColumnType::Text,
        FieldType::Integer => ColumnType::Integer,
        FieldType::Real => ColumnType::Real,
        FieldType::Timestamp => ColumnType::Timestamp,
        FieldType::Boolean => ColumnType::Integer,
        FieldType::Date | FieldType::Other(_) | FieldType::Optional(_) => ColumnType::Text,
    }
}
