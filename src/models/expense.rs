use chrono::{NaiveDateTime, Timelike};

use crate::error::Result;
use crate::record::{Field, FieldType, FieldValue, Fields, Pk, Record, PK_FIELD, UNSAVED_PK};

/// A single spending entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub amount: i64,
    pub category: Pk,
    pub expense_date: NaiveDateTime,
    pub added_date: NaiveDateTime,
    pub comment: String,
    pub pk: Pk,
}

impl Expense {
    /// Expense dated now, with both timestamps truncated to whole seconds.
    pub fn new(amount: i64, category: Pk) -> Self {
        let now = chrono::Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        Self {
            amount,
            category,
            expense_date: now,
            added_date: now,
            comment: String::new(),
            pk: UNSAVED_PK,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_expense_date(mut self, expense_date: NaiveDateTime) -> Self {
        self.expense_date = expense_date;
        self
    }
}

impl Record for Expense {
    const TYPE_NAME: &'static str = "Expense";
    const FIELDS: &'static [Field] = &[
        Field::new("amount", FieldType::Integer),
        Field::new("category", FieldType::Integer).references("category"),
        Field::new("expense_date", FieldType::Timestamp),
        Field::new("added_date", FieldType::Timestamp),
        Field::new("comment", FieldType::Text),
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
            "amount" => Some(self.amount.into()),
            "category" => Some(self.category.into()),
            "expense_date" => Some(self.expense_date.into()),
            "added_date" => Some(self.added_date.into()),
            "comment" => Some(self.comment.clone().into()),
            _ => None,
        }
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            amount: fields.take("amount")?,
            category: fields.take("category")?,
            expense_date: fields.take("expense_date")?,
            added_date: fields.take("added_date")?,
            comment: fields.take("comment")?,
            pk: UNSAVED_PK,
        })
    }
}
