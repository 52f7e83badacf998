use crate::record::{resolve_type, RecordDescriptor, PK_FIELD};

use super::Filter;

/// SQL templates derived once per record type.
///
/// Values are always bound positionally. Identifiers are validated upstream
/// and double-quoted here, so keyword names such as `order` stay usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statements {
    pub create_table: String,
    pub insert: String,
    pub select_by_pk: String,
    pub select_all: String,
    pub update: String,
    pub delete: String,
}

fn quoted(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

impl Statements {
    pub fn derive(descriptor: &RecordDescriptor) -> Self {
        let table = quoted(&descriptor.table_name);
        let pk = quoted(PK_FIELD);
        let names = descriptor
            .field_names()
            .map(quoted)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; descriptor.len()].join(", ");

        let mut columns = vec![format!("{pk} INTEGER PRIMARY KEY AUTOINCREMENT")];
        columns.extend(descriptor.fields.iter().map(|field| {
            let mut column = format!("{} {}", quoted(field.name), resolve_type(&field.ty));
            if let Some(target) = field.references {
                column.push_str(&format!(" REFERENCES {}({pk})", quoted(target)));
            }
            column
        }));

        let assignments = descriptor
            .field_names()
            .map(|name| format!("{} = ?", quoted(name)))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            create_table: format!(
                "CREATE TABLE IF NOT EXISTS {table} ({})",
                columns.join(", ")
            ),
            insert: format!("INSERT INTO {table} ({names}) VALUES ({placeholders})"),
            select_by_pk: format!("SELECT {pk}, {names} FROM {table} WHERE {pk} = ?"),
            select_all: format!("SELECT {pk}, {names} FROM {table}"),
            update: format!("UPDATE {table} SET {assignments} WHERE {pk} = ?"),
            delete: format!("DELETE FROM {table} WHERE {pk} = ?"),
        }
    }

    /// Select-all narrowed by the filter's own columns, in store order.
    pub fn select_filtered(&self, filter: Option<&Filter>) -> String {
        let mut sql = self.select_all.clone();
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            let conditions = filter
                .iter()
                .map(|(column, value)| {
                    let op = if value.is_null() { "IS" } else { "=" };
                    format!("{} {op} ?", quoted(column))
                })
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }
        sql.push_str(&format!(" ORDER BY {}", quoted(PK_FIELD)));
        sql
    }
}
