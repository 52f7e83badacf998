use std::{fmt, str::FromStr};

use crate::error::Result;
use crate::record::{
    Field, FieldType, FieldValue, Fields, FromFieldValue, Pk, Record, PK_FIELD, UNSAVED_PK,
};

/// Planning period of a budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Period::Day => "DAY",
            Period::Week => "WEEK",
            Period::Month => "MONTH",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct PeriodParseError(String);

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown period `{}`", self.0)
    }
}

impl std::error::Error for PeriodParseError {}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "DAY" => Ok(Period::Day),
            "WEEK" => Ok(Period::Week),
            "MONTH" => Ok(Period::Month),
            other => Err(PeriodParseError(other.to_string())),
        }
    }
}

impl From<Period> for FieldValue {
    fn from(period: Period) -> Self {
        FieldValue::Text(period.to_string())
    }
}

impl FromFieldValue for Period {
    fn from_field_value(value: FieldValue) -> std::result::Result<Self, String> {
        String::from_field_value(value)?
            .parse()
            .map_err(|err: PeriodParseError| err.to_string())
    }
}

/// Spending limit for a category over a period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub amount: i64,
    pub category_id: Pk,
    pub period: Period,
    pub pk: Pk,
}

impl Budget {
    pub fn new(amount: i64, category_id: Pk, period: Period) -> Self {
        Self {
            amount,
            category_id,
            period,
            pk: UNSAVED_PK,
        }
    }
}

impl Record for Budget {
    const TYPE_NAME: &'static str = "Budget";
    const FIELDS: &'static [Field] = &[
        Field::new("amount", FieldType::Integer),
        Field::new("category_id", FieldType::Integer).references("category"),
        Field::new("period", FieldType::Other("Period")),
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
            "category_id" => Some(self.category_id.into()),
            "period" => Some(self.period.into()),
            _ => None,
        }
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            amount: fields.take("amount")?,
            category_id: fields.take("category_id")?,
            period: fields.take("period")?,
            pk: UNSAVED_PK,
        })
    }
}
